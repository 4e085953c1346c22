//! # Engine Data Types
//!
//! Request and response shapes exchanged with the analysis engine. Field
//! names on the wire are camelCase, matching what the engine emits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{FirebatError, FirebatResult};

/// A discovered address range as reported by the engine.
///
/// The engine does not know about selection; see
/// [`crate::session::KnownSection`] for the local form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    pub start_address: u64,
    #[serde(default)]
    pub end_address: Option<u64>,
    pub analyzed: bool,
}

/// One disassembled instruction of a decompiled block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyLine {
    /// 1-based position across the whole result
    pub index: usize,
    pub parents_start_address: u64,
    pub data: String,
}

/// One IR statement, attributed to the instruction it was lifted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrLine {
    pub parents_assembly_index: usize,
    pub data: String,
}

/// Output of decompiling a set of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecompileResult {
    pub assembly: Vec<AssemblyLine>,
    pub ir: Vec<IrLine>,
    pub decompiled: String,
}

impl DecompileResult {
    /// IR statements lifted from the instruction at `assembly_index`
    pub fn ir_for(&self, assembly_index: usize) -> impl Iterator<Item = &IrLine> {
        self.ir
            .iter()
            .filter(move |line| line.parents_assembly_index == assembly_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrStatement {
    pub statement: String,
}

/// An instruction together with the IR statements it lowers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrInspectResult {
    pub instruction: String,
    pub statements: Vec<IrStatement>,
}

/// Addresses connected to a block, returned by the decompile-from-address
/// and decompile-from-entry commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryResult(pub Vec<u64>);

impl fmt::Display for EntryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, address) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:#x}", address)?;
        }
        Ok(())
    }
}

/// Parse a user-typed address.
///
/// Decimal is tried first, then hexadecimal with an optional `0x`/`0X`
/// prefix. Surrounding whitespace is ignored.
///
/// ```rust
/// use firebat_core::engine::parse_address;
///
/// assert_eq!(parse_address("4096").unwrap(), 4096);
/// assert_eq!(parse_address(" 0x401000 ").unwrap(), 0x401000);
/// assert_eq!(parse_address("dead").unwrap(), 0xdead);
/// assert!(parse_address("0xzz").is_err());
/// ```
pub fn parse_address(input: &str) -> FirebatResult<u64> {
    let trimmed = input.trim();
    if let Ok(address) = trimmed.parse::<u64>() {
        return Ok(address);
    }
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(digits, 16).map_err(|_| FirebatError::invalid_address(input))
}
