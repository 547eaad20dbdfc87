//! Cache module for keeping fetched image lists across restarts
//!
//! This module provides a single-file key/value store. The whole mapping lives
//! in memory and is mirrored to one JSON file after every write. Disk failures
//! never reach callers: a broken file loads as an empty cache, and a failed
//! write leaves the in-memory value in place.

mod store;

pub use store::CacheStore;
