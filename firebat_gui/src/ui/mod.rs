//! UI module for Firebat GUI
//!
//! # Layout
//! - `navigation` - Files menu (Open), Analyze All, drag status, theme toggle
//! - `panel_rows` - Rows of movable panels with grab handles and drop zones
//! - `log_bar` - Collapsible log console at the bottom
//!
//! # Panels
//! - `section_panel` - Address input, engine commands, known sections
//! - `assembly_panel` - Disassembly of the decompiled sections
//! - `ir_panel` - IR statements, hover highlights the source instruction
//! - `ast_panel` - Decompiled C source
//!
//! # Shared Components
//! - `shared` - Tinted code lines used by the assembly and IR panels

// Frame
pub mod navigation;
pub mod panel_rows;
pub mod log_bar;

// Panels
pub mod section_panel;
pub mod assembly_panel;
pub mod ir_panel;
pub mod ast_panel;

// Shared components
pub mod shared;
