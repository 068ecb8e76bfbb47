//! Core types and traits for awslive
//!
//! This crate provides the pieces shared by every awslive resource wrapper:
//! the `ApiError` type surfaced by the service access layer, call-status
//! inspection, and test-resource naming (random name draw, existence probing,
//! and the leftover-resource predicate used by cleanup).

pub mod error;
pub mod naming;

pub use error::{is_error_call, ApiError};
pub use naming::{is_test_resource, random_test_name, LiveResource, TEST_PREFIX};
