// ── Repositories ──
//
// One façade per resource type, composing the HTTP client, the typed
// endpoint bindings, and the DataStore. Reads refresh the store; writes
// invalidate the affected entries; `watch_*` methods spawn blocking-query
// subscriptions that keep the store current while they run.

mod acl;
mod catalog;
mod intentions;
mod kv;
mod sessions;

pub use acl::{PolicyRepo, RoleRepo, TokenRepo};
pub use catalog::{DatacenterRepo, NodeRepo, ServiceRepo};
pub use intentions::IntentionRepo;
pub use kv::KvRepo;
pub use sessions::SessionRepo;

use crate::error::CoreError;

/// Map a wire-level not-found onto a named domain error; everything
/// else goes through the standard translation.
pub(crate) fn named_not_found(
    err: wayfind_api::Error,
    resource: &str,
    name: &str,
) -> CoreError {
    if err.is_not_found() {
        CoreError::not_found(resource, name)
    } else {
        err.into()
    }
}
