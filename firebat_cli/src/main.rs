//! # Firebat CLI Application
//!
//! Headless driver for the Fireball engine: opens a binary, analyzes it,
//! selects every analyzed section, decompiles them and prints the result.
//! Runs the same request/complete cycle as the GUI, just on one thread.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use firebat_core::bridge::{EngineClient, ProcessTransport};
use firebat_core::session::SessionStore;
use firebat_core::{FirebatError, Settings, Workbench};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Firebat(#[from] FirebatError),
    #[error("open failed, see log above")]
    OpenFailed,
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "firebat_cli", about = "Decompile a binary through the Fireball engine")]
struct Cli {
    /// Binary to analyze
    binary: PathBuf,

    /// Settings file (defaults to $FIREBAT_CONFIG or ./firebat.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Engine command, overriding the settings file
    #[arg(long, env = "FIREBAT_ENGINE", num_args = 1.., value_delimiter = ' ')]
    engine: Option<Vec<String>>,

    /// Analyze from this address instead of the whole binary
    #[arg(long)]
    address: Option<String>,

    /// Also print the IR inspection of this address
    #[arg(long)]
    inspect: Option<String>,

    /// Print the decompilation as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("firebat=warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let mut bench = None;
    let outcome = run(&cli, &mut bench);

    if let Some(bench) = &bench {
        eprintln!();
        eprintln!("Log:");
        for entry in bench.log.entries() {
            eprintln!("  {}", entry);
        }
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, slot: &mut Option<Workbench>) -> Result<(), CliError> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(engine) = &cli.engine {
        settings.engine_command = engine.clone();
    }

    let engine = EngineClient::new(ProcessTransport::spawn(&settings.engine_command)?);
    let bench = slot.insert(Workbench::new(&settings));
    tracing::debug!(
        engine = engine.transport().program(),
        binary = %cli.binary.display(),
        "engine ready"
    );

    let request = bench.open_file(Some(cli.binary.clone()));
    bench.run(&engine, request);
    if bench.session.opened_file().is_none() {
        return Err(CliError::OpenFailed);
    }

    let request = match &cli.address {
        Some(address) => bench.analyze_section(address),
        None => bench.analyze_all_sections(),
    };
    bench.run(&engine, request);
    tracing::debug!(sections = bench.session.known_sections().len(), "analysis finished");

    // Later requests would only repeat the same transport failure
    if engine.transport().is_broken() {
        return Err(FirebatError::transport("analyze", "engine connection lost").into());
    }

    if let Some(address) = &cli.inspect {
        let request = bench.ir_inspect(address);
        bench.run(&engine, request);
    }

    bench.session.select_all_analyzed();
    let request = bench.decompile_selected();
    bench.run(&engine, request);

    if cli.json {
        print_json(&bench.session)?;
    } else {
        print_report(&bench.session);
    }
    Ok(())
}

fn print_report(session: &SessionStore) {
    println!("═══════════════════════════════════════");
    println!("  SECTIONS");
    println!("═══════════════════════════════════════");
    for section in session.known_sections() {
        let end = section
            .end_address
            .map(|e| format!("{:#x}", e))
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {:#x} - {}  {}",
            section.start_address,
            end,
            if section.analyzed { "[analyzed]" } else { "[pending]" }
        );
    }

    if !session.inspect_result().is_empty() {
        println!();
        println!("IR Inspect:");
        for item in session.inspect_result() {
            println!("  {}", item.instruction);
            for statement in &item.statements {
                println!("      {}", statement.statement);
            }
        }
    }

    let Some(decompilation) = session.decompilation() else {
        println!();
        println!("No decompilation produced.");
        return;
    };

    println!();
    println!("Assembly / IR:");
    for line in &decompilation.data.assembly {
        println!("  {:>4}  {:#x}  {}", line.index, line.parents_start_address, line.data);
        for ir in decompilation.data.ir_for(line.index) {
            println!("              {}", ir.data);
        }
    }

    println!();
    println!("═══════════════════════════════════════");
    println!("  DECOMPILED");
    println!("═══════════════════════════════════════");
    println!("{}", decompilation.data.decompiled);
}

fn print_json(session: &SessionStore) -> Result<(), CliError> {
    let report = serde_json::json!({
        "sections": session.known_sections(),
        "inspect": session.inspect_result(),
        "decompiled": session.decompilation().map(|d| &d.data),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
