// wayfind-core: Domain layer over the control-plane API.
//
// Converts raw wire shapes into domain models, keeps them in a reactive
// store keyed by composite resource keys, and exposes per-resource
// repositories plus the Console entry point that owns the client and
// all live subscriptions.

pub mod config;
pub mod console;
pub mod error;
pub mod model;
pub mod repo;
pub mod store;
pub mod stream;

pub use config::{ConsoleConfig, TlsVerification};
pub use console::Console;
pub use error::CoreError;
pub use store::DataStore;
pub use stream::ResourceStream;
