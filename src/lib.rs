//! alfred-workflow - Build Alfred 2 script filter results
//!
//! Accumulate results with [`Workflow::add_result`] (or a bare
//! [`ResultList`]) and render them with [`Workflow::to_xml`] into the
//! `<items>` document Alfred reads from a script filter's stdout.
//!
//! ```no_run
//! use alfred_workflow::{ItemOptions, Payload, Workflow};
//!
//! let mut wf = Workflow::new(Some("com.example.search"))?;
//! wf.add_result(
//!     ItemOptions::new()
//!         .with_uid("home")
//!         .with_title("Home")
//!         .with_arg("~")
//!         .with_icon("filetype:public.folder"),
//! );
//! if let Some(xml) = wf.to_xml(Payload::Empty)? {
//!     println!("{}", xml);
//! }
//! # Ok::<(), alfred_workflow::WorkflowError>(())
//! ```

pub mod backends;
pub mod core;
pub mod workflow;

pub use crate::core::error::{Result, WorkflowError};
pub use crate::core::json::{translate, DecodeStatus, JsonDecodeError};
pub use crate::core::model::{ItemOptions, ResultEntry, ResultList, Valid};
pub use crate::core::paths::{resolve_storage_path, StoragePaths};
pub use crate::core::render::{to_xml, Payload};
pub use crate::workflow::Workflow;
