//! The ordered collection of hidden items.
//!
//! The model is the single writer: every mutation reorders to keep
//! `hidden_order` dense and writes through to the store immediately. The
//! physical state of the menu bar may lag behind this bookkeeping; the model
//! is the authority on user intent, not on what is currently on screen.

use tracing::warn;

use super::store::HiddenItemsStore;
use super::types::{now_ms, HiddenItem};
use crate::menubar::MenuBarItem;

pub struct HiddenItemsModel {
    items: Vec<HiddenItem>,
    store: HiddenItemsStore,
}

impl HiddenItemsModel {
    /// Load the persisted collection, ordered by `hidden_order`.
    pub fn load(store: HiddenItemsStore) -> Self {
        let mut items = store.load();
        items.sort_by_key(|item| item.hidden_order);
        let mut model = Self { items, store };
        // Repair any gaps a hand-edited or partially-written file left.
        model.reorder();
        model
    }

    pub fn items(&self) -> &[HiddenItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn find(&self, id: &str) -> Option<&HiddenItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Record a live menu-bar item as hidden.
    ///
    /// Hiding the same logical item twice never duplicates the record: an
    /// identity match refreshes `last_seen` and backfills metadata the
    /// earlier sighting lacked. Returns the record's id.
    pub fn add_hidden_item(&mut self, item: &MenuBarItem) -> String {
        let owner = item.owner_key();
        let title = item.title.clone();

        if let Some(existing) = self.items.iter_mut().find(|candidate| {
            candidate.owner_app_id == owner
                && (candidate.title == title || candidate.title.is_none())
        }) {
            existing.last_seen_ms = now_ms();
            if existing.title.is_none() && title.is_some() {
                existing.title = title;
            }
            if existing.icon.is_none() {
                existing.icon = item.icon_png.clone();
            }
            if existing.original_position.is_none() {
                existing.original_position = item.position;
            }
            let id = existing.id.clone();
            self.persist();
            return id;
        }

        let record = HiddenItem {
            id: item.identity(),
            owner_app_id: owner.clone(),
            display_name: title.clone().unwrap_or(owner),
            title,
            icon: item.icon_png.clone(),
            hidden_order: self.items.len(),
            last_seen_ms: now_ms(),
            original_position: item.position,
        };
        let id = record.id.clone();
        self.items.push(record);
        self.persist();
        id
    }

    /// Remove a record by id. Always persists, whether or not anything was
    /// removed, keeping the on-disk order dense.
    pub fn remove_hidden_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        self.reorder();
        self.persist();
        removed
    }

    /// Reorder with list-drop semantics: `to` is the slot the item lands in
    /// front of, as a list view reports drops.
    pub fn move_item(&mut self, from: usize, to: usize) {
        if from == to || from >= self.items.len() || to > self.items.len() {
            return;
        }
        let item = self.items.remove(from);
        let target = if to > from { to - 1 } else { to };
        self.items.insert(target.min(self.items.len()), item);
        self.reorder();
        self.persist();
    }

    /// Write through to the store. Persistence failures are absorbed; the
    /// in-memory state stays authoritative for this session.
    pub fn persist(&self) {
        if let Err(error) = self.store.save(&self.items) {
            warn!(%error, "failed to persist hidden items");
        }
    }

    fn reorder(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.hidden_order = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use tempfile::tempdir;

    fn model() -> (HiddenItemsModel, tempfile::TempDir) {
        let dir = tempdir().expect("tempdir");
        let store = HiddenItemsStore::new(dir.path());
        (HiddenItemsModel::load(store), dir)
    }

    fn live_item(owner: &str, title: Option<&str>) -> MenuBarItem {
        MenuBarItem {
            owner_app_id: Some(owner.to_string()),
            title: title.map(str::to_string),
            pid: 100,
            position: Some(Point::new(1200.0, 4.0)),
            window_id: Some(77),
            icon_png: None,
        }
    }

    fn orders(model: &HiddenItemsModel) -> Vec<usize> {
        model.items().iter().map(|item| item.hidden_order).collect()
    }

    #[test]
    fn add_assigns_dense_orders() {
        let (mut model, _dir) = model();
        model.add_hidden_item(&live_item("com.a", None));
        model.add_hidden_item(&live_item("com.b", None));
        model.add_hidden_item(&live_item("com.c", None));
        assert_eq!(orders(&model), vec![0, 1, 2]);
    }

    #[test]
    fn double_hide_updates_instead_of_duplicating() {
        let (mut model, _dir) = model();
        let first = model.add_hidden_item(&live_item("com.a", Some("CPU")));
        let stamped = model.items()[0].last_seen_ms;
        let second = model.add_hidden_item(&live_item("com.a", Some("CPU")));
        assert_eq!(first, second);
        assert_eq!(model.len(), 1);
        assert!(model.items()[0].last_seen_ms >= stamped);
    }

    #[test]
    fn same_owner_different_titles_coexist() {
        let (mut model, _dir) = model();
        model.add_hidden_item(&live_item("com.a", Some("CPU")));
        model.add_hidden_item(&live_item("com.a", Some("Net")));
        assert_eq!(model.len(), 2);
        assert_eq!(model.items()[0].id, "com.a:CPU");
        assert_eq!(model.items()[1].id, "com.a:Net");
    }

    #[test]
    fn titleless_record_is_claimed_by_titled_sighting() {
        let (mut model, _dir) = model();
        model.add_hidden_item(&live_item("com.a", None));
        model.add_hidden_item(&live_item("com.a", Some("CPU")));
        assert_eq!(model.len(), 1);
        assert_eq!(model.items()[0].title.as_deref(), Some("CPU"));
    }

    #[test]
    fn remove_keeps_orders_dense() {
        let (mut model, _dir) = model();
        model.add_hidden_item(&live_item("com.a", None));
        model.add_hidden_item(&live_item("com.b", None));
        model.add_hidden_item(&live_item("com.c", None));
        assert!(model.remove_hidden_item("com.b"));
        assert_eq!(orders(&model), vec![0, 1]);
        assert_eq!(model.items()[1].id, "com.c");
    }

    #[test]
    fn remove_unknown_id_is_harmless() {
        let (mut model, _dir) = model();
        model.add_hidden_item(&live_item("com.a", None));
        assert!(!model.remove_hidden_item("com.zzz"));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn move_item_swaps_neighbors() {
        let (mut model, _dir) = model();
        model.add_hidden_item(&live_item("a", None));
        model.add_hidden_item(&live_item("b", None));
        model.move_item(1, 0);
        let ids: Vec<_> = model.items().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(orders(&model), vec![0, 1]);
    }

    #[test]
    fn move_item_out_of_range_is_ignored() {
        let (mut model, _dir) = model();
        model.add_hidden_item(&live_item("a", None));
        model.move_item(5, 0);
        model.move_item(0, 9);
        assert_eq!(model.items()[0].id, "a");
    }

    #[test]
    fn reload_round_trips_ordered_collection() {
        let dir = tempdir().expect("tempdir");
        {
            let mut model = HiddenItemsModel::load(HiddenItemsStore::new(dir.path()));
            model.add_hidden_item(&live_item("com.a", Some("CPU")));
            model.add_hidden_item(&live_item("com.b", None));
        }
        let reloaded = HiddenItemsModel::load(HiddenItemsStore::new(dir.path()));
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.items()[0].id, "com.a:CPU");
        assert_eq!(reloaded.items()[1].id, "com.b");
        assert_eq!(orders(&reloaded), vec![0, 1]);
        assert_eq!(
            reloaded.items()[0].original_position,
            Some(Point::new(1200.0, 4.0))
        );
    }

    #[test]
    fn load_repairs_sparse_orders() {
        let dir = tempdir().expect("tempdir");
        let store = HiddenItemsStore::new(dir.path());
        let mut a = HiddenItem::sample("a", 3);
        let b = HiddenItem::sample("b", 7);
        a.last_seen_ms = 1;
        store.save(&[b, a]).expect("save");

        let model = HiddenItemsModel::load(HiddenItemsStore::new(dir.path()));
        let ids: Vec<_> = model.items().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(orders(&model), vec![0, 1]);
    }
}
