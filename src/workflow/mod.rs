//! Workflow module - Per-invocation session state
//!
//! Provides:
//! - session: directories, result accumulation and rendering
//! - bundle: bundle id lookup from info.plist

pub mod bundle;
pub mod session;

pub use session::Workflow;
