//! Role-scoped local disk storage and its lifecycle management.
//!
//! All artifacts this service produces are ephemeral files under one storage
//! root, split into role directories (staging / converted / batch). There is
//! no catalog: the role directory is the arena and the generated filename is
//! the key. Correctness under concurrency rests on collision-free names
//! ([`keys`]) and idempotent deletion ([`local::remove_entry`]).

pub mod keys;
pub mod lifecycle;
pub mod local;

pub use lifecycle::{LifecycleConfig, RoleUsage, StorageLifecycle, StorageUsage};
pub use local::{DiskStore, StorageError, StorageResult};
