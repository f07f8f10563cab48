// src/lib.rs

//! Book Exchange client library
//!
//! Typed access to the textbook marketplace backend: session handling,
//! resource services with local view state, and the purchase flow.

pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(feature = "shim")]
pub mod shim;
