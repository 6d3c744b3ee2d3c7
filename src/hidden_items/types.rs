use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A persisted record of one hidden menu-bar item.
///
/// `hidden_order` is dense: after every mutation the collection's orders form
/// a contiguous `0..n-1` permutation. `id` is unique within the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenItem {
    pub id: String,
    pub owner_app_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// PNG bytes of the owning app's icon, captured at hide time.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "icon_bytes")]
    pub icon: Option<Vec<u8>>,
    pub hidden_order: usize,
    /// Unix epoch milliseconds of the last time this item was seen live.
    pub last_seen_ms: i64,
    /// Where the item sat before it was hidden; restore hint for
    /// environments where attribute repositioning is the only capability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_position: Option<Point>,
}

impl HiddenItem {
    #[cfg(test)]
    pub fn sample(id: &str, order: usize) -> Self {
        Self {
            id: id.to_string(),
            owner_app_id: id.to_string(),
            display_name: id.to_string(),
            title: None,
            icon: None,
            hidden_order: order,
            last_seen_ms: 0,
            original_position: None,
        }
    }
}

/// Current wall-clock time as epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Icon bytes travel inside the JSON record as base64 rather than a number
/// array.
mod icon_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(data) => serializer.serialize_some(&STANDARD.encode(data)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(text) => STANDARD
                .decode(text.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
