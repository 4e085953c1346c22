//! # firebat_core - Session Core for the Firebat Decompiler Front End
//!
//! `firebat_core` holds everything the Firebat front ends share: where the
//! panels are, what the engine has told us so far, and the log console.
//! All disassembly, IR construction and decompilation happen in an external
//! engine process reached through the [`bridge`].
//!
//! ## Design Philosophy
//!
//! - **Front-end agnostic**: the GUI and CLI drive the same [`actions::Workbench`]
//! - **Pure layout logic**: panel moves are a function of `(Layout, MoveRequest)`
//! - **Log and continue**: engine failures become log lines, never panics
//!
//! ## Quick Start
//!
//! ```rust
//! use firebat_core::actions::Workbench;
//!
//! let mut bench = Workbench::default();
//!
//! // Nothing is selected yet, so no engine request is produced
//! assert!(bench.decompile_selected().is_none());
//! assert!(bench.log.headline().ends_with("No sections selected"));
//! ```
//!
//! ## Modules
//!
//! - [`layout`] - Panel registry, containers, and the move algorithm
//! - [`drag`] - Drag coordinator state machine
//! - [`session`] - Shared session store (sections, decompilation, hover)
//! - [`log_sink`] - Timestamped log console
//! - [`engine`] - Engine request/response types and address parsing
//! - [`bridge`] - Engine transport and typed client
//! - [`actions`] - Request/complete cycle with log-and-continue errors
//! - [`settings`] - JSON settings file
//! - [`errors`] - Structured error types

pub mod actions;
pub mod bridge;
pub mod drag;
pub mod engine;
pub mod errors;
pub mod layout;
pub mod log_sink;
pub mod session;
pub mod settings;

// Re-export commonly used types at crate root for convenience
pub use actions::{Completion, Request, Workbench};
pub use bridge::{EngineClient, Invoke, ProcessTransport};
pub use errors::{FirebatError, FirebatResult};
pub use layout::{apply_move, ContainerId, DropTarget, Layout, MoveRequest, PanelId};
pub use settings::Settings;
