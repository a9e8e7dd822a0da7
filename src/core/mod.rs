//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Result model (ItemOptions, ResultEntry, ResultList)
//! - XML rendering in Alfred's item-list format
//! - JSON payload decoding and error translation
//! - Storage path resolution
//! - Common utilities

pub mod error;
pub mod json;
pub mod model;
pub mod paths;
pub mod render;
pub mod util;
