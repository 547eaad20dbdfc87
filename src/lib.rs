//! Portfolio site backend library
//!
//! This module exposes the cache, image, quote and server modules for use by the
//! binary and the integration tests.

pub mod cache;
pub mod cli;
pub mod images;
pub mod quotes;
pub mod server;
