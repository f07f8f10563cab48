// src/shim/mod.rs

//! Legacy login service issuing signed tokens.
//!
//! Standalone: the client signs in through the backend's verify endpoint and
//! never calls the shim.

pub mod directory;
pub mod server;
pub mod token;

pub use directory::{DirectoryUser, UserDirectory};
pub use server::{ShimState, configure, run};
pub use token::{Claims, TokenIssuer};
