//! Areawatch CLI
//!
//! Usage:
//!   areawatch --fix "33.0,-96.0,5"          # Single evaluation
//!   areawatch --interactive                 # Read fixes from stdin
//!   areawatch --replay fixes.jsonl          # Replay recorded fixes
//!   areawatch --serve                       # HTTP API server
//!   areawatch --fix "33.0,-96.0" --json     # JSON output

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{error, warn, Level};
use tracing_subscriber::EnvFilter;

use areawatch::core::{run_server, AreaStore, JsonFileAreaStore, Tracker};
use areawatch::types::{Area, Fix, TrackOutput};
use areawatch::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "areawatch",
    version = VERSION,
    about = "Areawatch - smooth location fixes and detect geofence enter/exit",
    long_about = "Areawatch tracks a stream of location fixes, smooths them with an\n\
                  accuracy-weighted average over the last 10 readings, and reports\n\
                  when the position enters or leaves circular areas.\n\n\
                  Modes:\n  \
                  --interactive  One fix per line: lat,lng[,accuracy]  (pin lat,lng to place manually)\n  \
                  --replay       JSON-lines file of {\"lat\",\"lng\",\"accuracy\"}\n  \
                  --serve        HTTP API server mode\n\n\
                  Phases:\n  \
                  IMPROVING - fewer than 3 readings, raw fixes\n  \
                  SMOOTHED  - weighted average of recent readings"
)]
struct Args {
    /// Single fix to evaluate: lat,lng[,accuracy]
    #[arg(short, long, allow_hyphen_values = true)]
    fix: Option<String>,

    /// Interactive mode - read fixes from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Replay a JSON-lines file of fixes
    #[arg(short, long)]
    replay: Option<String>,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Area store file (default: ./areas.json)
    #[arg(long, default_value = "./areas.json")]
    areas: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let store = match JsonFileAreaStore::open(&args.areas) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(path = %args.areas, error = %e, "failed to open area store");
            std::process::exit(1);
        }
    };

    if args.serve {
        run_serve(&args, store).await;
        return;
    }

    let areas = match store.all() {
        Ok(areas) => areas,
        Err(e) => {
            error!(error = %e, "failed to load areas");
            std::process::exit(1);
        }
    };

    let result = if let Some(ref path) = args.replay {
        run_replay(path, &areas, &args)
    } else if let Some(ref fix) = args.fix {
        run_single(fix, &areas, &args)
    } else {
        // Default to interactive if no mode specified
        run_interactive(&areas, &args)
    };

    if let Err(e) = result {
        error!(error = %e, "run failed");
        std::process::exit(1);
    }
}

/// Logs go to stderr; RUST_LOG overrides the default level
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Run single fix evaluation
fn run_single(input: &str, areas: &[Area], args: &Args) -> Result<(), String> {
    let fix = Fix::parse(input).ok_or_else(|| format!("could not parse fix '{}'", input))?;
    let mut tracker = Tracker::new();
    let output = tracker.ingest(fix, areas).map_err(|e| e.to_string())?;
    print_output(&output, args);
    Ok(())
}

/// Run interactive mode
fn run_interactive(areas: &[Area], args: &Args) -> Result<(), String> {
    let mut tracker = Tracker::new();

    print_header(areas.len(), args.no_color);
    println!("Enter fixes as lat,lng[,accuracy]. 'pin lat,lng' places the location manually.");
    println!("Type 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("[{} | {} readings] > ", tracker.phase(), tracker.sample_count());
        stdout.flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("\nSession ended. Fixes: {}", tracker.update_count());
            break;
        }
        if line.is_empty() {
            continue;
        }

        let (pin, text) = match line.strip_prefix("pin ") {
            Some(rest) => (true, rest),
            None => (false, line),
        };

        let Some(fix) = Fix::parse(text) else {
            println!("⚠ Expected lat,lng[,accuracy] (e.g. '33.0,-96.0,5')");
            continue;
        };

        let result = if pin {
            tracker.pin(fix, areas)
        } else {
            tracker.ingest(fix, areas)
        };

        match result {
            Ok(output) => print_output(&output, args),
            Err(e) => println!("⚠ {}", e),
        }
    }

    Ok(())
}

/// Replay a JSON-lines file through one tracker
fn run_replay(path: &str, areas: &[Area], args: &Args) -> Result<(), String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    let mut tracker = Tracker::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fix: Fix = serde_json::from_str(line)
            .map_err(|e| format!("{}:{}: {}", path, lineno + 1, e))?;
        match tracker.ingest(fix, areas) {
            Ok(output) => print_output(&output, args),
            Err(e) => warn!(path, line = lineno + 1, error = %e, "skipped fix"),
        }
    }

    Ok(())
}

fn print_output(output: &TrackOutput, args: &Args) {
    if args.json {
        println!("{}", serde_json::to_string(output).unwrap_or_default());
    } else if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
    }
}

/// Print header
fn print_header(area_count: usize, no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Areawatch v{} - {} areas", VERSION, area_count);
        println!("========================================");
    } else {
        println!("\x1b[1m========================================\x1b[0m");
        println!("\x1b[1m  Areawatch v{} - {} areas\x1b[0m", VERSION, area_count);
        println!("\x1b[1m========================================\x1b[0m");
    }
    println!();
}

/// Run HTTP API server
async fn run_serve(args: &Args, store: Arc<JsonFileAreaStore>) {
    if let Err(e) = run_server(&args.addr, store).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
