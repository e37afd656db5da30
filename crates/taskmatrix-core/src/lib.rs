pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod mutation;
pub mod stats;
pub mod visibility;

pub use config::MatrixConfig;
pub use error::{JoinError, MatrixError, Result};
pub use identity::{resolve_actor, Actor, HostIdentity, GUEST_ACTOR_ID};
pub use model::{
    AccessLevel, Employee, Snapshot, SyncEnvelope, Task, TaskComment, TaskPriority, TaskStatus,
    TeamId,
};
pub use visibility::visible_tasks;
