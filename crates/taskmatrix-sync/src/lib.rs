//! Client-side team synchronization: local fallback store, remote
//! sync client, polling, team registry, and the mutation service that
//! ties core operations to the push path.

pub mod client;
pub mod invite;
pub mod registry;
pub mod remote;
pub mod service;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{SyncClient, SyncStatus};
pub use invite::parse_invite;
pub use registry::{TeamRegistration, TeamRegistry};
pub use remote::{HttpRemote, RemoteSync};
pub use service::TeamService;
pub use store::TeamStore;
