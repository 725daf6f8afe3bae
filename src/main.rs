//! chat-guardrails - Pattern-based moderation for chat streams
//!
//! Sits next to a chat bot: reads one JSON event per line from stdin and
//! writes one JSON response per line to stdout.
//!
//! # Usage
//!
//! ```bash
//! echo '{"type":"message","identity":"t!~t@host","nick":"t","channel":"#c","text":"hi"}' | chat-guardrails
//!
//! # Custom pattern file
//! chat-guardrails --patterns=/var/lib/bot/badwords.txt
//!
//! # Dry-run mode (warn only, never remove or ban)
//! chat-guardrails --dry-run
//! ```

use std::env;
use std::io::{self, BufRead, Write};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chat_guardrails::{ChatEvent, Config, ModerationEngine, Response};

/// Print version information
fn print_version() {
    println!("chat-guardrails {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message
fn print_help() {
    println!(
        r##"chat-guardrails - Pattern-based moderation for chat streams

USAGE:
    chat-guardrails [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -v, --version           Print version information
    -c, --config PATH       Path to config file
    -p, --patterns PATH     Path to pattern file (overrides config)
    -d, --dry-run           Warn only: never remove or ban

ENVIRONMENT:
    CHAT_GUARDRAILS_DISABLED=1     Skip moderation (admin commands still work)
    CHAT_GUARDRAILS_WARN_ONLY=1    Same as --dry-run
    CHAT_GUARDRAILS_PASTE_KEY=KEY  Paste service developer key
    CHAT_GUARDRAILS_LOG=FILTER     Log filter (default: chat_guardrails=info)

PROTOCOL:
    stdin, one event per line:
      {{"type":"message","identity":"nick!user@host","nick":"nick","channel":"#c","text":"..."}}
      {{"type":"action", ...same fields...}}
      {{"type":"admin","identity":"...","nick":"...","command":"add 2 darn"}}
    stdout, one response per line:
      {{"actions":[{{"action":"notice","nick":"nick","text":"..."}}],"reply":{{"nick":"...","text":"..."}}}}
"##
    );
}

/// Parse command line arguments
struct Args {
    help: bool,
    version: bool,
    dry_run: bool,
    config_path: Option<String>,
    patterns_path: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut result = Args {
            help: false,
            version: false,
            dry_run: false,
            config_path: None,
            patterns_path: None,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => result.help = true,
                "-v" | "--version" => result.version = true,
                "-d" | "--dry-run" => result.dry_run = true,
                "-c" | "--config" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.config_path = Some(args[i].clone());
                    }
                }
                "-p" | "--patterns" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.patterns_path = Some(args[i].clone());
                    }
                }
                arg if arg.starts_with("--config=") => {
                    let path = arg.trim_start_matches("--config=");
                    result.config_path = Some(path.to_string());
                }
                arg if arg.starts_with("--patterns=") => {
                    let path = arg.trim_start_matches("--patterns=");
                    result.patterns_path = Some(path.to_string());
                }
                _ => {}
            }
            i += 1;
        }

        result
    }
}

/// Logs go to stderr; stdout carries responses only
fn init_tracing() {
    let filter = EnvFilter::try_from_env("CHAT_GUARDRAILS_LOG")
        .unwrap_or_else(|_| EnvFilter::new("chat_guardrails=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

/// Write one response line and flush it through
fn write_response<W: Write>(out: &mut W, response: &Response) -> io::Result<()> {
    writeln!(out, "{}", response.to_json())?;
    out.flush()
}

fn main() {
    let args = Args::parse();

    // Handle help and version
    if args.help {
        print_help();
        return;
    }

    if args.version {
        print_version();
        return;
    }

    init_tracing();

    // Load configuration
    let mut config = if let Some(ref path) = args.config_path {
        Config::load_from(std::path::Path::new(path)).unwrap_or_else(|e| {
            tracing::warn!(path = %path, error = %e, "failed to load config, using defaults");
            Config::default().with_env_overrides()
        })
    } else {
        Config::load()
    };

    if let Some(path) = args.patterns_path {
        config.patterns.file = path;
    }

    // Set up dry-run mode via environment
    if args.dry_run {
        env::set_var("CHAT_GUARDRAILS_WARN_ONLY", "1");
    }

    let engine = ModerationEngine::new(&config);
    tracing::info!(
        patterns = engine.store().len(),
        file = %config.patterns_path().display(),
        "chat-guardrails ready"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        // Malformed events get an empty response so replies stay in step
        // with requests
        let response = match ChatEvent::from_json(&line) {
            Ok(event) => engine.handle(&event),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed event");
                Response::none()
            }
        };

        // Stop once nobody is reading responses
        if let Err(e) = write_response(&mut stdout.lock(), &response) {
            tracing::error!(error = %e, "failed to write response, stopping");
            break;
        }
    }
}
