//! On-demand download coordination.
//!
//! The [`DownloadCoordinator`] is the single entry point used by demand
//! resolvers: it checks the load path, schedules resolution on a
//! [`DownloadPool`], and blocks the caller with periodic progress logging.

pub mod coordinator;
pub mod listener;
pub mod pool;

pub use coordinator::{DownloadCoordinator, EnsureOutcome, DEFAULT_POLL_INTERVAL};
pub use listener::{DownloadEvent, DownloadListener, Listeners, RecordingListener};
pub use pool::{CancelToken, DownloadPool, DownloadTask};
