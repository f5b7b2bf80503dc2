//! # Scheduler Testing Utils
//!
//! Shared testing utilities for the storage facade crates.
//!
//! ## Features
//!
//! - **In-memory storage**: `InMemoryStorage` implements all seven store contracts
//! - **Mocks**: mockall mocks for every store contract
//! - **Test data builders**: jobs, tasks, locks, host attributes and deploys
//! - **Helpers**: failing and call-counting storage wrappers
//!
//! ## Usage
//!
//! Add this crate as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! scheduler-testing-utils = { path = "../testing-utils" }
//! ```
//!
//! Then use the mocks in your tests:
//!
//! ```rust
//! use scheduler_testing_utils::{InMemoryStorage, JobConfigurationBuilder};
//!
//! let storage = InMemoryStorage::new();
//! storage.save_job("IMMEDIATE", JobConfigurationBuilder::new("www-data", "prod", "hello").build());
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

// Re-export commonly used items
pub use builders::*;
pub use helpers::*;
pub use mocks::*;
