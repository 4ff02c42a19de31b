// ── Reactive data store ──
//
// Lock-free resource storage with push-based change notification.

mod collection;
mod data_store;

pub(crate) use collection::ResourceCollection;
pub use data_store::DataStore;
