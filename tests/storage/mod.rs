//! Shared storage integration tests.
//!
//! Tests the ResourceStore interface against all implementations.
//! Each implementation module imports these test functions and runs them.

#[macro_use]
pub mod resource_store_tests;
