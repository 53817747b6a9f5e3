//! Saved-articles registry with change notification

mod index;
mod item;
mod registry;

pub use index::SavedIndex;
pub use item::SavedItem;
pub use registry::{RegistryEvent, SaveOutcome, SavedItemsRegistry, Subscription};
