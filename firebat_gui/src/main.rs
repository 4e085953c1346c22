//! # Firebat GUI Application
//!
//! Desktop front end for the Fireball decompiler. Four panels (sections,
//! assembly, IR, decompiled source) sit in two rows and can be dragged
//! between and within rows. A log bar at the bottom collects every engine
//! success and failure.
//!
//! Engine requests run on the tokio blocking pool; the UI stays responsive
//! and folds each completion into the session whenever it arrives.

mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use iced::widget::{column, container};
use iced::{Element, Length, Size, Task, Theme};
use tracing_subscriber::EnvFilter;

use firebat_core::actions::{Completion, Request};
use firebat_core::bridge::{EngineClient, ProcessTransport};
use firebat_core::layout::{DropTarget, PanelId};
use firebat_core::{log_line, FirebatError, Settings, Workbench};

type Engine = EngineClient<ProcessTransport>;

pub fn main() -> iced::Result {
    init_tracing();

    iced::application(App::new, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window_size(Size::new(1280.0, 800.0))
        .run()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("firebat=info")),
        )
        .with_target(false)
        .try_init();
}

#[derive(Debug, Clone)]
pub enum Message {
    // Navigation
    ToggleFilesMenu,
    OpenFile,
    FilePicked(Option<PathBuf>),
    ToggleDarkMode,

    // Section panel
    AddressChanged(String),
    AnalyzeSection,
    AnalyzeFromEntry,
    AnalyzeAll,
    DecompileAddress,
    DecompileEntry,
    InspectIr,
    ToggleSection(u64),
    DecompileSelected,

    // Cross-panel highlight
    Hover(Option<usize>),

    // Layout
    DragStart(PanelId),
    Drop(DropTarget),
    DragCancel,

    ToggleLog,

    EngineCompleted(Completion),
}

pub struct App {
    pub bench: Workbench,
    pub settings: Settings,
    settings_path: Option<PathBuf>,
    pub address_input: String,
    pub files_menu_open: bool,
    pub dark_mode: bool,
    engine: Option<Arc<Engine>>,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let path = Settings::config_path(None);
        // A file that failed to load is left untouched
        let (settings, settings_path, load_error) = match Settings::load_from(&path) {
            Ok(settings) => (settings, Some(path), None),
            Err(e) => (Settings::default(), None, Some(e)),
        };

        let mut app = App {
            bench: Workbench::new(&settings),
            dark_mode: settings.dark_mode,
            settings,
            settings_path,
            address_input: String::new(),
            files_menu_open: false,
            engine: None,
        };

        if let Some(e) = load_error {
            log_line!(app.bench.log, "Settings Load Failed", e.to_string());
        }

        (app, Task::none())
    }

    fn title(&self) -> String {
        match self.bench.session.opened_file() {
            Some(path) => format!("Firebat - {}", path.display()),
            None => "Firebat".to_string(),
        }
    }

    fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// The engine process, started on first use and restarted once its
    /// pipe breaks. A restarted engine has no file loaded.
    fn engine(&mut self) -> Option<Arc<Engine>> {
        if let Some(engine) = &self.engine {
            if engine.transport().is_broken() {
                tracing::warn!(program = engine.transport().program(), "restarting engine");
                log_line!(self.bench.log, "Engine Restarted, reopen the file");
                self.engine = None;
            }
        }

        if self.engine.is_none() {
            match ProcessTransport::spawn(&self.settings.engine_command) {
                Ok(transport) => self.engine = Some(Arc::new(EngineClient::new(transport))),
                Err(e) => {
                    tracing::error!(error = %e, "engine failed to start");
                    log_line!(self.bench.log, "Engine Start Failed", e.to_string());
                    return None;
                }
            }
        }
        self.engine.clone()
    }

    /// Write the current settings back to the file they were loaded from.
    fn persist_settings(&mut self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        self.settings.dark_mode = self.dark_mode;
        self.settings.layout = self.bench.layout.clone();
        if let Err(e) = self.settings.save_to(path) {
            tracing::warn!(error = %e, "settings not saved");
            log_line!(self.bench.log, "Settings Save Failed", e.to_string());
        }
    }

    /// Run `request` off the UI thread and deliver its completion.
    fn dispatch(&mut self, request: Option<Request>) -> Task<Message> {
        let Some(request) = request else {
            return Task::none();
        };
        let Some(engine) = self.engine() else {
            return Task::none();
        };

        let failure_label = request.failure_label();
        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || request.execute(&engine))
                    .await
                    .unwrap_or_else(|e| Completion {
                        failure_label,
                        result: Err(FirebatError::transport("engine task", e.to_string())),
                    })
            },
            Message::EngineCompleted,
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ToggleFilesMenu => {
                self.files_menu_open = !self.files_menu_open;
                Task::none()
            }
            Message::OpenFile => {
                self.files_menu_open = false;
                Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Open binary")
                            .pick_file()
                            .await
                            .map(|handle| handle.path().to_path_buf())
                    },
                    Message::FilePicked,
                )
            }
            Message::FilePicked(path) => {
                let request = self.bench.open_file(path);
                self.dispatch(request)
            }
            Message::ToggleDarkMode => {
                self.dark_mode = !self.dark_mode;
                self.persist_settings();
                Task::none()
            }

            Message::AddressChanged(value) => {
                self.address_input = value;
                Task::none()
            }
            Message::AnalyzeSection => {
                let request = self.bench.analyze_section(&self.address_input);
                self.dispatch(request)
            }
            Message::AnalyzeFromEntry => {
                let request = self.bench.analyze_section("");
                self.dispatch(request)
            }
            Message::AnalyzeAll => {
                self.files_menu_open = false;
                let request = self.bench.analyze_all_sections();
                self.dispatch(request)
            }
            Message::DecompileAddress => {
                let request = self.bench.decompile_from_address(&self.address_input);
                self.dispatch(request)
            }
            Message::DecompileEntry => {
                let request = self.bench.decompile_from_entry();
                self.dispatch(request)
            }
            Message::InspectIr => {
                let request = self.bench.ir_inspect(&self.address_input);
                self.dispatch(request)
            }
            Message::ToggleSection(start_address) => {
                self.bench.toggle_section(start_address);
                Task::none()
            }
            Message::DecompileSelected => {
                let request = self.bench.decompile_selected();
                self.dispatch(request)
            }

            Message::Hover(index) => {
                self.bench.hover(index);
                Task::none()
            }

            Message::DragStart(panel) => {
                self.bench.start_drag(panel);
                Task::none()
            }
            Message::Drop(target) => {
                self.bench.drop_on(Some(target));
                self.persist_settings();
                Task::none()
            }
            Message::DragCancel => {
                self.bench.cancel_drag();
                Task::none()
            }

            Message::ToggleLog => {
                self.bench.toggle_log();
                Task::none()
            }

            Message::EngineCompleted(completion) => {
                self.bench.apply(completion);
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let mut content = column![ui::navigation::view_navigation(
            self.files_menu_open,
            self.bench.drag.state(),
            self.dark_mode,
        )]
        .spacing(6);

        if self.files_menu_open {
            content = content.push(ui::navigation::view_files_menu());
        }

        content = content
            .push(ui::panel_rows::view_rows(self))
            .push(ui::log_bar::view_log_bar(&self.bench.log));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(8)
            .into()
    }
}
