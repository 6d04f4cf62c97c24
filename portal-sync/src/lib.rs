pub mod config;
pub mod coordinator;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod portal;
pub mod providers;
pub mod sinks;
pub mod snapshot;
pub mod sources;
pub mod transform;

pub use coordinator::{RefreshCoordinator, RefreshError};
pub use pipeline::{Envelope, Pipeline};
pub use snapshot::{Readings, Snapshot};
