//! Mounting: deterministic naming, the per-image state machine, outcome
//! classification, and the unmount path.
//!
//! The [`engine::MountEngine`] drives one image at a time through the mount
//! sequence against a [`backend::MountBackend`]; the orchestrator runs many
//! engines' worth of work concurrently and aggregates results in an
//! [`outcome::OutcomeLog`].

pub mod backend;
pub mod engine;
pub mod fstype;
pub mod outcome;
pub mod point;
pub mod release;
pub mod table;

pub use backend::{MountBackend, SystemBackend};
pub use engine::{MountAttempt, MountEngine};
pub use fstype::{FsCandidate, FS_CANDIDATES};
pub use outcome::{MountDisposition, OutcomeLog, OutcomeReport};
pub use point::{derive_mount_point, DEFAULT_MOUNT_ROOT, MOUNT_POINT_PREFIX};
pub use release::release_mount;
pub use table::{active_mounts, ActiveMount};
