pub mod forwarder;
pub mod metrics;
pub mod providers;

pub use forwarder::{Operation, RequestForwarder};
pub use providers::{GenerativeApi, ProviderError};
