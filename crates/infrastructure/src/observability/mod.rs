//! Observability for storage reads
//!
//! - `InstrumentedStore` - spans, metrics and slow-call warnings around every operation
//! - `OperationStats` - per-operation counters kept in process

pub mod instrumented_store;

pub use instrumented_store::{InstrumentedStore, OperationStats};
