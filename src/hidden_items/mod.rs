pub mod model;
pub mod store;
pub mod types;

pub use model::HiddenItemsModel;
pub use store::{HiddenItemsStore, StoreError};
pub use types::HiddenItem;
