//! # Actions
//!
//! User intent in, engine requests out, responses folded back into the
//! session. Engine calls are split in two halves so a front end can run the
//! slow part anywhere:
//!
//! 1. A [`Workbench`] method validates the intent and returns a
//!    [`Request`] (or logs why it refused and returns `None`).
//! 2. [`Request::execute`] performs the call against an [`EngineClient`].
//! 3. [`Workbench::apply`] folds the [`Completion`] into the session.
//!
//! Failures never escape: they end up in the log console with a label such
//! as "Decompile Failed". There is no retry, timeout, cancellation or
//! de-duplication; completions may arrive in any order. Every request
//! after an open remembers which file it was issued for, and responses for
//! a file that has since been replaced are discarded.

use std::path::PathBuf;

use crate::bridge::{EngineClient, Invoke};
use crate::drag::DragCoordinator;
use crate::engine::{parse_address, DecompileResult, EntryResult, IrInspectResult, SectionInfo};
use crate::errors::{FirebatError, FirebatResult};
use crate::layout::{DropTarget, Layout, PanelId};
use crate::log_line;
use crate::log_sink::LogSink;
use crate::session::{DecompileTicket, FileEpoch, SessionStore};
use crate::settings::Settings;

/// A validated engine call, ready to run on any thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    OpenFile(PathBuf),
    DecompileFromAddress {
        address: String,
        epoch: FileEpoch,
    },
    DecompileFromEntry {
        epoch: FileEpoch,
    },
    IrInspect {
        address: String,
        epoch: FileEpoch,
    },
    /// Empty address analyzes from the entry point
    AnalyzeSection {
        address: String,
        epoch: FileEpoch,
    },
    AnalyzeAllSections {
        epoch: FileEpoch,
    },
    DecompileSections {
        addresses: Vec<u64>,
        ticket: DecompileTicket,
    },
}

/// Successful engine response, tagged by what was asked.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Opened(PathBuf),
    Entry(FileEpoch, EntryResult),
    Inspected(FileEpoch, Vec<IrInspectResult>),
    Sections(FileEpoch, Vec<SectionInfo>),
    Decompiled(DecompileTicket, DecompileResult),
}

/// The result of running a [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub failure_label: &'static str,
    pub result: FirebatResult<Outcome>,
}

impl Request {
    /// Label logged in front of the error when this request fails
    pub fn failure_label(&self) -> &'static str {
        match self {
            Request::OpenFile(_) => "Open Failed",
            Request::DecompileFromAddress { .. }
            | Request::DecompileFromEntry { .. }
            | Request::DecompileSections { .. } => "Decompile Failed",
            Request::IrInspect { .. } => "IR Inspect Failed",
            Request::AnalyzeSection { .. } | Request::AnalyzeAllSections { .. } => {
                "Section Analyzation Failed"
            }
        }
    }

    /// Perform the engine call. Blocks until the engine answers.
    pub fn execute<T: Invoke>(self, engine: &EngineClient<T>) -> Completion {
        let failure_label = self.failure_label();
        let result = match self {
            Request::OpenFile(path) => engine.open_file(&path).map(|()| Outcome::Opened(path)),
            Request::DecompileFromAddress { address, epoch } => engine
                .decompile_from_address(&address)
                .map(|result| Outcome::Entry(epoch, result)),
            Request::DecompileFromEntry { epoch } => engine
                .decompile_from_entry()
                .map(|result| Outcome::Entry(epoch, result)),
            Request::IrInspect { address, epoch } => engine
                .ir_inspect(&address)
                .map(|result| Outcome::Inspected(epoch, result)),
            Request::AnalyzeSection { address, epoch } => engine
                .analyze_section(&address)
                .map(|sections| Outcome::Sections(epoch, sections)),
            Request::AnalyzeAllSections { epoch } => engine
                .analyze_all_sections()
                .map(|sections| Outcome::Sections(epoch, sections)),
            Request::DecompileSections { addresses, ticket } => engine
                .decompile_sections(&addresses)
                .map(|result| Outcome::Decompiled(ticket, result)),
        };
        Completion {
            failure_label,
            result,
        }
    }
}

/// Front-end independent application state.
#[derive(Debug)]
pub struct Workbench {
    pub session: SessionStore,
    pub log: LogSink,
    pub layout: Layout,
    pub drag: DragCoordinator,
}

impl Default for Workbench {
    fn default() -> Self {
        Workbench::new(&Settings::default())
    }
}

impl Workbench {
    pub fn new(settings: &Settings) -> Self {
        Workbench {
            session: SessionStore::new(),
            log: LogSink::new(settings.log_capacity),
            layout: settings.layout.clone(),
            drag: DragCoordinator::new(),
        }
    }

    // ===== Requests =====

    /// `picked` is what the file picker returned; `None` means cancelled.
    pub fn open_file(&mut self, picked: Option<PathBuf>) -> Option<Request> {
        log_line!(self.log, "Open Fireball with", picked);
        picked.map(Request::OpenFile)
    }

    pub fn analyze_section(&mut self, address: &str) -> Option<Request> {
        const LABEL: &str = "Section Analyzation Failed";
        let epoch = self.require_file(LABEL)?;
        let address = if address.trim().is_empty() {
            String::new()
        } else {
            self.checked_address(LABEL, address)?
        };
        Some(Request::AnalyzeSection { address, epoch })
    }

    pub fn analyze_all_sections(&mut self) -> Option<Request> {
        let epoch = self.require_file("Section Analyzation Failed")?;
        Some(Request::AnalyzeAllSections { epoch })
    }

    pub fn decompile_from_address(&mut self, address: &str) -> Option<Request> {
        const LABEL: &str = "Decompile Failed";
        let epoch = self.require_file(LABEL)?;
        let address = self.checked_address(LABEL, address)?;
        Some(Request::DecompileFromAddress { address, epoch })
    }

    pub fn decompile_from_entry(&mut self) -> Option<Request> {
        let epoch = self.require_file("Decompile Failed")?;
        Some(Request::DecompileFromEntry { epoch })
    }

    pub fn ir_inspect(&mut self, address: &str) -> Option<Request> {
        const LABEL: &str = "IR Inspect Failed";
        let epoch = self.require_file(LABEL)?;
        let address = self.checked_address(LABEL, address)?;
        Some(Request::IrInspect { address, epoch })
    }

    /// Decompile every selected section. Nothing is sent when the
    /// selection is empty.
    pub fn decompile_selected(&mut self) -> Option<Request> {
        let addresses = self.session.selected_addresses();
        if addresses.is_empty() {
            log_line!(self.log, "No sections selected");
            return None;
        }
        self.require_file("Decompile Failed")?;
        let ticket = self.session.begin_decompile();
        Some(Request::DecompileSections { addresses, ticket })
    }

    fn require_file(&mut self, label: &str) -> Option<FileEpoch> {
        if self.session.opened_file().is_some() {
            return Some(self.session.file_epoch());
        }
        log_line!(self.log, label, FirebatError::NoFileOpen.to_string());
        None
    }

    fn checked_address(&mut self, label: &str, input: &str) -> Option<String> {
        match parse_address(input) {
            Ok(address) => Some(format!("{:#x}", address)),
            Err(e) => {
                log_line!(self.log, label, e.to_string());
                None
            }
        }
    }

    // ===== Completions =====

    /// Fold an engine response into the session and log the outcome.
    pub fn apply(&mut self, completion: Completion) {
        let outcome = match completion.result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error_code = e.error_code(), "{}: {}", completion.failure_label, e);
                log_line!(self.log, completion.failure_label, e.to_string());
                return;
            }
        };

        match outcome {
            Outcome::Opened(path) => {
                self.session.reset_for(path);
                log_line!(self.log, "Open Success");
            }
            Outcome::Entry(epoch, _)
            | Outcome::Inspected(epoch, _)
            | Outcome::Sections(epoch, _)
                if !self.session.is_current_file(epoch) =>
            {
                tracing::debug!(label = completion.failure_label, "response for a replaced file dropped");
                log_line!(self.log, "Discarded result for a previously opened file");
            }
            Outcome::Entry(_, result) => {
                log_line!(self.log, "Decompile Success", result);
                self.session
                    .set_entry_result(format!("Block's Connected Address : {}", result));
            }
            Outcome::Inspected(_, result) => {
                log_line!(self.log, "IR Inspect Success", result.len(), "instructions");
                self.session.set_inspect_result(result);
            }
            Outcome::Sections(_, sections) => {
                log_line!(self.log, "Section Analyzation Success", sections.len(), "sections");
                self.session.merge_sections(sections);
            }
            Outcome::Decompiled(ticket, result) => {
                let instructions = result.assembly.len();
                if self.session.finish_decompile(ticket, result) {
                    log_line!(self.log, "Decompile Success", instructions, "instructions");
                } else {
                    log_line!(self.log, "Discarded outdated decompile result");
                }
            }
        }
    }

    /// Issue and complete a request on the current thread.
    pub fn run<T: Invoke>(&mut self, engine: &EngineClient<T>, request: Option<Request>) {
        if let Some(request) = request {
            let completion = request.execute(engine);
            self.apply(completion);
        }
    }

    // ===== Local interactions =====

    pub fn start_drag(&mut self, panel: PanelId) {
        self.drag.drag_start(&self.layout, panel);
    }

    pub fn drop_on(&mut self, target: Option<DropTarget>) {
        self.layout = self.drag.drag_end(&self.layout, target);
    }

    pub fn cancel_drag(&mut self) {
        self.drag.drag_cancel();
    }

    pub fn toggle_section(&mut self, start_address: u64) {
        self.session.toggle_selected(start_address);
    }

    pub fn hover(&mut self, assembly_index: Option<usize>) {
        self.session.set_hovered(assembly_index);
    }

    pub fn toggle_log(&mut self) {
        self.log.toggle_expanded();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::ScriptedTransport;
    use crate::layout::ContainerId;
    use serde_json::{json, Value};

    fn opened(engine: &EngineClient<ScriptedTransport>) -> Workbench {
        let mut bench = Workbench::default();
        let request = bench.open_file(Some(PathBuf::from("/tmp/a.out")));
        bench.run(engine, request);
        bench
    }

    fn engine() -> EngineClient<ScriptedTransport> {
        EngineClient::new(
            ScriptedTransport::default()
                .reply("open_file", Value::Null)
                .reply("analyze_all_sections", json!([
                    { "startAddress": 16, "endAddress": 32, "analyzed": true },
                    { "startAddress": 48, "endAddress": null, "analyzed": false }
                ]))
                .reply("analyze_section", json!([
                    { "startAddress": 48, "endAddress": 64, "analyzed": true }
                ]))
                .reply("decompile_sections", json!({
                    "assembly": [{ "index": 1, "parentsStartAddress": 16, "data": "ret" }],
                    "ir": [{ "parentsAssemblyIndex": 1, "data": "return" }],
                    "decompiled": "void f(void) {}"
                }))
                .reply("decompile_from_entry", json!([16, 48]))
                .reject("ir_inspect", "Fireball is None"),
        )
    }

    fn last_log(bench: &Workbench) -> &str {
        bench.log.latest().unwrap()
    }

    #[test]
    fn test_open_logs_path_and_resets_session() {
        let engine = engine();
        let bench = opened(&engine);
        let entries: Vec<&str> = bench.log.entries().collect();
        assert!(entries[0].ends_with("Open Fireball with /tmp/a.out"));
        assert!(entries[1].ends_with("Open Success"));
        assert_eq!(bench.session.opened_file().unwrap().to_str(), Some("/tmp/a.out"));
    }

    #[test]
    fn test_cancelled_picker_logs_null_and_sends_nothing() {
        let engine = engine();
        let mut bench = Workbench::default();
        let request = bench.open_file(None);
        assert!(request.is_none());
        assert!(last_log(&bench).ends_with("Open Fireball with null"));
        bench.run(&engine, request);
        assert!(engine.transport().commands().is_empty());
    }

    #[test]
    fn test_decompile_with_nothing_selected_skips_engine() {
        let engine = engine();
        let mut bench = opened(&engine);
        let request = bench.decompile_selected();
        assert!(request.is_none());
        bench.run(&engine, request);

        assert_eq!(engine.transport().commands(), vec!["open_file"]);
        assert!(last_log(&bench).ends_with("No sections selected"));
    }

    #[test]
    fn test_analyze_select_decompile_flow() {
        let engine = engine();
        let mut bench = opened(&engine);

        let request = bench.analyze_all_sections();
        bench.run(&engine, request);
        assert_eq!(bench.session.known_sections().len(), 2);
        assert!(last_log(&bench).ends_with("Section Analyzation Success 2 sections"));

        bench.toggle_section(16);
        bench.toggle_section(48); // not analyzed, ignored
        let request = bench.decompile_selected();
        assert!(matches!(&request, Some(Request::DecompileSections { addresses, .. }) if addresses == &vec![16]));
        bench.run(&engine, request);

        let decompilation = bench.session.decompilation().unwrap();
        assert_eq!(decompilation.data.decompiled, "void f(void) {}");
        assert!(decompilation.color(1).is_some());
        assert!(last_log(&bench).ends_with("Decompile Success 1 instructions"));
    }

    #[test]
    fn test_reanalysis_replaces_section() {
        let engine = engine();
        let mut bench = opened(&engine);
        let request = bench.analyze_all_sections();
        bench.run(&engine, request);
        let request = bench.analyze_section("0x30");
        assert!(matches!(&request, Some(Request::AnalyzeSection { address, .. }) if address == "0x30"));
        bench.run(&engine, request);

        let sections = bench.session.known_sections();
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| s.analyzed));
    }

    #[test]
    fn test_empty_address_analyzes_from_entry() {
        let engine = engine();
        let mut bench = opened(&engine);
        let epoch = bench.session.file_epoch();
        assert_eq!(
            bench.analyze_section("  "),
            Some(Request::AnalyzeSection { address: String::new(), epoch })
        );
    }

    #[test]
    fn test_invalid_address_is_logged_locally() {
        let engine = engine();
        let mut bench = opened(&engine);
        assert!(bench.decompile_from_address("0xnope").is_none());
        assert!(last_log(&bench).contains("Decompile Failed Invalid Address"));
    }

    #[test]
    fn test_engine_rejection_is_logged_not_raised() {
        let engine = engine();
        let mut bench = opened(&engine);
        let request = bench.ir_inspect("16");
        bench.run(&engine, request);
        assert!(last_log(&bench).ends_with("IR Inspect Failed ir_inspect: Fireball is None"));
        assert!(bench.session.inspect_result().is_empty());
    }

    #[test]
    fn test_requests_refused_before_open() {
        let mut bench = Workbench::default();
        assert!(bench.analyze_all_sections().is_none());
        assert!(last_log(&bench).ends_with("Section Analyzation Failed No file is open"));
        assert!(bench.decompile_from_entry().is_none());
    }

    #[test]
    fn test_entry_result_text() {
        let engine = engine();
        let mut bench = opened(&engine);
        let request = bench.decompile_from_entry();
        bench.run(&engine, request);
        assert_eq!(
            bench.session.entry_result(),
            Some("Block's Connected Address : 0x10, 0x30")
        );
        assert!(last_log(&bench).ends_with("Decompile Success [16,48]"));
    }

    #[test]
    fn test_out_of_order_decompile_completions() {
        let engine = engine();
        let mut bench = opened(&engine);
        let request = bench.analyze_all_sections();
        bench.run(&engine, request);
        bench.toggle_section(16);

        let first = bench.decompile_selected().unwrap();
        let second = bench.decompile_selected().unwrap();
        let second_done = second.execute(&engine);
        let first_done = first.execute(&engine);

        bench.apply(second_done);
        bench.apply(first_done);
        assert!(last_log(&bench).ends_with("Discarded outdated decompile result"));
        assert!(bench.session.decompilation().is_some());
    }

    #[test]
    fn test_responses_for_replaced_file_are_discarded() {
        let engine = engine();
        let mut bench = opened(&engine);
        let analyze = bench.analyze_all_sections().unwrap();
        let entry = bench.decompile_from_entry().unwrap();

        let request = bench.open_file(Some(PathBuf::from("/tmp/b.out")));
        bench.run(&engine, request);

        bench.run(&engine, Some(analyze));
        assert!(last_log(&bench).ends_with("Discarded result for a previously opened file"));
        bench.run(&engine, Some(entry));
        assert!(last_log(&bench).ends_with("Discarded result for a previously opened file"));

        assert!(bench.session.known_sections().is_empty());
        assert_eq!(bench.session.entry_result(), None);

        // Requests issued for the new file still land
        let request = bench.analyze_all_sections();
        bench.run(&engine, request);
        assert_eq!(bench.session.known_sections().len(), 2);
    }

    #[test]
    fn test_drag_through_workbench() {
        let mut bench = Workbench::default();
        bench.start_drag(PanelId::Ast);
        bench.drop_on(Some(DropTarget::Container(ContainerId::top())));
        assert_eq!(
            bench.layout.panels_in(&ContainerId::top()).unwrap(),
            &[PanelId::Sections, PanelId::Assembly, PanelId::Ast]
        );

        bench.start_drag(PanelId::Sections);
        bench.cancel_drag();
        bench.drop_on(Some(DropTarget::Panel(PanelId::Ir)));
        assert_eq!(bench.layout.panels_in(&ContainerId::bottom()).unwrap(), &[PanelId::Ir]);
    }
}
