//! shelfview: controller for a paginated, searchable and taggable bookmark list.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod managers;
pub mod platform;
pub mod services;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;
