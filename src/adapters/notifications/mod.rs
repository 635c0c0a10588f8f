//! Progress notification adapters.

mod progress_registry;

pub use progress_registry::{ProgressRegistry, ProgressSubscription};
