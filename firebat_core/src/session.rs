//! # Session Store
//!
//! Cross-panel state shared by every view: the known sections, the last
//! decompilation, and the hovered instruction used for cross-highlighting.
//! The application owns one `SessionStore` and hands each panel a
//! reference; panels read only the slices they render.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{DecompileResult, IrInspectResult, SectionInfo};

/// A discovered address range plus the local selection flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownSection {
    pub start_address: u64,
    pub end_address: Option<u64>,
    pub analyzed: bool,
    pub selected: bool,
}

impl From<SectionInfo> for KnownSection {
    fn from(info: SectionInfo) -> Self {
        KnownSection {
            start_address: info.start_address,
            end_address: info.end_address,
            analyzed: info.analyzed,
            selected: false,
        }
    }
}

/// Display color for an instruction and the IR lifted from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Tint {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Tint { r, g, b }
    }
}

/// Pastel palette, cycled by instruction index
pub const PALETTE: [Tint; 10] = [
    Tint::rgb(0xfe, 0xe2, 0xe2), // red
    Tint::rgb(0xdb, 0xea, 0xfe), // blue
    Tint::rgb(0xdc, 0xfc, 0xe7), // green
    Tint::rgb(0xfe, 0xf9, 0xc3), // yellow
    Tint::rgb(0xf3, 0xe8, 0xff), // purple
    Tint::rgb(0xfc, 0xe7, 0xf3), // pink
    Tint::rgb(0xe0, 0xe7, 0xff), // indigo
    Tint::rgb(0xff, 0xed, 0xd5), // orange
    Tint::rgb(0xcc, 0xfb, 0xf1), // teal
    Tint::rgb(0xcf, 0xfa, 0xfe), // cyan
];

pub fn color_for_index(index: usize) -> Tint {
    PALETTE[index % PALETTE.len()]
}

/// A decompile response together with its per-instruction colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompilation {
    pub data: DecompileResult,
    pub colors: BTreeMap<usize, Tint>,
}

impl Decompilation {
    pub fn new(data: DecompileResult) -> Self {
        let colors = data
            .assembly
            .iter()
            .map(|line| (line.index, color_for_index(line.index)))
            .collect();
        Decompilation { data, colors }
    }

    pub fn color(&self, assembly_index: usize) -> Option<Tint> {
        self.colors.get(&assembly_index).copied()
    }
}

/// Handed out when a decompile request is issued. Only the newest ticket's
/// result is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompileTicket(u64);

/// Identifies which opened file a request was issued against. Responses
/// carrying an older epoch belong to a file that is no longer open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEpoch(u64);

#[derive(Debug, Default)]
pub struct SessionStore {
    known_sections: Vec<KnownSection>,
    decompilation: Option<Decompilation>,
    hovered_assembly_index: Option<usize>,
    entry_result: Option<String>,
    inspect_result: Vec<IrInspectResult>,
    opened_file: Option<PathBuf>,
    generation: u64,
    file_epoch: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Known sections =====

    pub fn known_sections(&self) -> &[KnownSection] {
        &self.known_sections
    }

    /// Fold an analysis response into the known sections.
    ///
    /// Entries sharing a start address with an incoming entry are replaced,
    /// the rest are kept in place. Every merged entry starts unselected.
    pub fn merge_sections(&mut self, incoming: impl IntoIterator<Item = SectionInfo>) {
        let mut fresh: Vec<KnownSection> = Vec::new();
        for info in incoming {
            let section = KnownSection::from(info);
            match fresh.iter_mut().find(|s| s.start_address == section.start_address) {
                Some(existing) => *existing = section,
                None => fresh.push(section),
            }
        }

        self.known_sections
            .retain(|old| !fresh.iter().any(|s| s.start_address == old.start_address));
        self.known_sections.extend(fresh);
    }

    /// Flip the selection of the section starting at `start_address`.
    ///
    /// Returns `false` without changing anything when the section is
    /// unknown or not analyzed yet.
    pub fn toggle_selected(&mut self, start_address: u64) -> bool {
        match self
            .known_sections
            .iter_mut()
            .find(|s| s.start_address == start_address)
        {
            Some(section) if section.analyzed => {
                section.selected = !section.selected;
                true
            }
            _ => false,
        }
    }

    /// Select every analyzed section
    pub fn select_all_analyzed(&mut self) {
        for section in self.known_sections.iter_mut().filter(|s| s.analyzed) {
            section.selected = true;
        }
    }

    pub fn selected_addresses(&self) -> Vec<u64> {
        self.known_sections
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.start_address)
            .collect()
    }

    // ===== Decompilation =====

    pub fn decompilation(&self) -> Option<&Decompilation> {
        self.decompilation.as_ref()
    }

    /// Replace the current decompilation wholesale
    pub fn set_decompile_result(&mut self, result: DecompileResult) {
        self.decompilation = Some(Decompilation::new(result));
        self.hovered_assembly_index = None;
    }

    pub fn begin_decompile(&mut self) -> DecompileTicket {
        self.generation += 1;
        DecompileTicket(self.generation)
    }

    /// Apply `result` if `ticket` is still the newest request.
    /// Returns whether the result was applied.
    pub fn finish_decompile(&mut self, ticket: DecompileTicket, result: DecompileResult) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, current = self.generation, "stale decompile result dropped");
            return false;
        }
        self.set_decompile_result(result);
        true
    }

    // ===== Hover =====

    pub fn hovered(&self) -> Option<usize> {
        self.hovered_assembly_index
    }

    pub fn set_hovered(&mut self, index: Option<usize>) {
        self.hovered_assembly_index = index;
    }

    pub fn is_highlighted(&self, assembly_index: usize) -> bool {
        self.hovered_assembly_index == Some(assembly_index)
    }

    // ===== Misc results =====

    pub fn entry_result(&self) -> Option<&str> {
        self.entry_result.as_deref()
    }

    pub fn set_entry_result(&mut self, text: impl Into<String>) {
        self.entry_result = Some(text.into());
    }

    pub fn inspect_result(&self) -> &[IrInspectResult] {
        &self.inspect_result
    }

    pub fn set_inspect_result(&mut self, result: Vec<IrInspectResult>) {
        self.inspect_result = result;
    }

    pub fn opened_file(&self) -> Option<&Path> {
        self.opened_file.as_deref()
    }

    pub fn file_epoch(&self) -> FileEpoch {
        FileEpoch(self.file_epoch)
    }

    pub fn is_current_file(&self, epoch: FileEpoch) -> bool {
        epoch.0 == self.file_epoch
    }

    /// Forget everything about the previous binary and remember `path`.
    ///
    /// Outstanding decompile tickets and file epochs become stale.
    pub fn reset_for(&mut self, path: impl Into<PathBuf>) {
        let generation = self.generation + 1;
        let file_epoch = self.file_epoch + 1;
        *self = SessionStore {
            opened_file: Some(path.into()),
            generation,
            file_epoch,
            ..SessionStore::default()
        };
    }
}
