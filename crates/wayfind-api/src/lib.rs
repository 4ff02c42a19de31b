// wayfind-api: Async client for Consul-compatible control-plane HTTP APIs.
//
// Exposes the raw wire surface: an HTTP client with token/datacenter
// scoping, blocking-query cursor handling, and a watch loop that turns
// repeated long-polls into a subscription. Domain mapping lives in
// wayfind-core.

pub mod acl;
pub mod blocking;
pub mod catalog;
pub mod error;
pub mod health;
pub mod http;
pub mod intentions;
pub mod kv;
pub mod query;
pub mod sessions;
pub mod transport;
pub mod watch;

pub use error::Error;
pub use http::{ConnectionTally, HttpClient};
pub use query::{Cursor, QueryMeta, QueryOptions, WithMeta};
pub use transport::{TlsMode, TransportConfig};
pub use watch::{WatchConfig, WatchEvent, WatchHandle, WatchState, Watcher};
