//! Deskhand - Entry Point
//!
//! Reads commands from stdin, hands them to the orchestrator and prints every
//! report from the result stream as it arrives.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use deskhand::command::sink::{self, ResultStream};
use deskhand::command::{Orchestrator, ReportKind};
use deskhand::core::config::AssistantConfig;
use deskhand::core::error::Result;
use deskhand::llm::{LlmClient, LlmPlanner, PassthroughPlanner, Planner};
use deskhand::shutdown::spawn_signal_handler;
use deskhand::tools::builtin;
use deskhand::worker::WorkerManager;

#[derive(Parser, Debug)]
#[command(name = "deskhand", about = "Natural-language desktop assistant")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Skip the language model; commands must be fenced JSON plans
    #[arg(long)]
    offline: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "deskhand=debug"
    } else {
        "deskhand=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("Deskhand starting...");

    let config = AssistantConfig::load(args.config.as_deref())?;

    // Runtime for LLM calls and signal handling
    let rt = Runtime::new()?;

    let client = if args.offline {
        None
    } else {
        match LlmClient::from_config(&config.llm) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("{} - running with the passthrough planner", e);
                None
            }
        }
    };

    match client {
        Some(client) => {
            tracing::info!(model = %client.model(), "Using language model planner");
            run(LlmPlanner::new(client, rt.handle().clone()), &config, &rt, true)
        }
        None => run(PassthroughPlanner, &config, &rt, false),
    }
}

fn run<P: Planner>(planner: P, config: &AssistantConfig, rt: &Runtime, online: bool) -> Result<()> {
    let registry = Arc::new(builtin::registry());
    let workers = WorkerManager::new();
    let (sink, stream) = sink::channel();
    let grace = config.workers.shutdown_grace();

    spawn_signal_handler(rt.handle(), workers.clone(), grace, |_| {
        println!("\nGoodbye!");
        std::process::exit(0);
    });

    spawn_renderer(stream)?;

    let orchestrator = Orchestrator::spawn(
        planner,
        Arc::clone(&registry),
        workers.clone(),
        sink,
        &config.workers,
    )?;

    println!("\n=== DESKHAND ===");
    println!("{} tools available: {}", registry.len(), registry.names().collect::<Vec<_>>().join(", "));
    println!();
    println!("Commands:");
    println!("  status          - Show the number of running workers");
    println!("  stop            - Stop all running workers");
    println!("  quit / q        - Exit");
    if online {
        println!("  <any text>      - Natural language command");
    } else {
        println!("  <```json plan```> - Plan to execute (no language model configured)");
    }
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        match input {
            "quit" | "q" => break,
            "status" => {
                println!("{} active worker(s)", workers.active_count());
            }
            "stop" => {
                let report = workers.stop_all();
                println!(
                    "Stopped {} worker(s) ({} panicked)",
                    report.joined, report.panicked
                );
            }
            _ => {
                orchestrator.submit(input);
            }
        }
    }

    orchestrator.shutdown();
    let report = workers.stop_all_within(grace);
    if report.detached > 0 {
        tracing::warn!(detached = report.detached, "Some workers did not stop in time");
    }

    println!("\nGoodbye!");
    Ok(())
}

/// Print reports as they arrive
fn spawn_renderer(stream: ResultStream) -> Result<()> {
    thread::Builder::new()
        .name("renderer".into())
        .spawn(move || {
            for report in stream {
                match report.kind() {
                    ReportKind::Succeeded | ReportKind::Notice => println!("{}", report),
                    _ => eprintln!("{}", report),
                }
            }
        })?;
    Ok(())
}
