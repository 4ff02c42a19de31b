// ── Domain models ──
//
// Typed views over the control plane's wire shapes, each carrying a
// composite ResourceKey.

mod acl;
mod catalog;
mod intention;
mod key;
mod kv;
mod session;

pub use acl::{LinkRef, Policy, Role, Token};
pub use catalog::{
    CheckStatus, Datacenter, HealthCheck, Node, ServiceInstance, ServiceRef, ServiceSummary,
};
pub use intention::{Intention, IntentionAction, ServiceName};
pub use key::ResourceKey;
pub use kv::KvEntry;
pub use session::{Session, SessionBehavior};
