//! Process-wide tracing setup shared by every pocketbook binary and test
//! harness.

pub mod tracing;

pub use crate::tracing::{LogConfig, LogFormat, ObservabilityError, init};
