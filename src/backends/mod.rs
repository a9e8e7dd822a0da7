//! Backends module - External tool integrations
//!
//! Provides:
//! - mdfind: Spotlight search

pub mod mdfind;
