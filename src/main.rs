//! shellgate - layered authorization gateway for shell commands
//!
//! Reads an evaluation request as JSON from stdin (or `--command`), walks
//! the three authorization layers, and writes the verdict as JSON to
//! stdout. Diagnostics go to stderr; verdicts are appended to the JSONL
//! audit log when configured.
//!
//! # Usage
//!
//! ```bash
//! echo '{"command_text":"rm -rf /"}' | shellgate
//!
//! shellgate --command "ls -la"
//!
//! shellgate --rules /etc/shellgate/rules.toml --command "sudo reboot"
//! ```
//!
//! Without a configured judge backend, escalated commands are blocked:
//! the judge is fail-closed by design.

use std::env;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use shellgate::{
    audit::AuditLogger, config::Config, engine::Gateway, input::CommandRequest,
    output::SourceLayer, output::Verdict, rules::MemoryRuleStore, UnavailableJudge,
};

/// Print version information
fn print_version() {
    println!("shellgate {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message
fn print_help() {
    println!(
        r#"shellgate - layered authorization gateway for shell commands

USAGE:
    shellgate [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -v, --version           Print version information
    -c, --config PATH       Path to config file
    -r, --rules PATH        Path to TOML rules file
    -x, --command TEXT      Evaluate TEXT instead of reading stdin
    -l, --log-level LEVEL   Log level: error, warn, info, debug, trace

INPUT:
    Without --command, one JSON request is read from stdin:
    {{"command_text": "rm -rf /"}}

OUTPUT:
    The verdict as JSON on stdout:
    {{"status":"BLOCKED","source_layer":"GUARD","score":160,"reason":"..."}}
"#
    );
}

/// Parse command line arguments
struct Args {
    help: bool,
    version: bool,
    config_path: Option<String>,
    rules_path: Option<String>,
    command: Option<String>,
    log_level: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut result = Args {
            help: false,
            version: false,
            config_path: None,
            rules_path: None,
            command: None,
            log_level: None,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => result.help = true,
                "-v" | "--version" => result.version = true,
                "-c" | "--config" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.config_path = Some(args[i].clone());
                    }
                }
                "-r" | "--rules" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.rules_path = Some(args[i].clone());
                    }
                }
                "-x" | "--command" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.command = Some(args[i].clone());
                    }
                }
                "-l" | "--log-level" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.log_level = Some(args[i].clone());
                    }
                }
                arg if arg.starts_with("--config=") => {
                    result.config_path = Some(arg.trim_start_matches("--config=").to_string());
                }
                arg if arg.starts_with("--rules=") => {
                    result.rules_path = Some(arg.trim_start_matches("--rules=").to_string());
                }
                arg if arg.starts_with("--command=") => {
                    result.command = Some(arg.trim_start_matches("--command=").to_string());
                }
                arg if arg.starts_with("--log-level=") => {
                    result.log_level = Some(arg.trim_start_matches("--log-level=").to_string());
                }
                _ => {}
            }
            i += 1;
        }

        result
    }
}

fn main() {
    let args = Args::parse();

    if args.help {
        print_help();
        return;
    }

    if args.version {
        print_version();
        return;
    }

    // Load configuration
    let config = if let Some(ref path) = args.config_path {
        Config::load_from(std::path::Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config from {}: {}", path, e);
            Config::default()
        })
    } else {
        Config::load()
    };

    // Stderr diagnostics
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.general.log_level);
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Warn);
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    // Load the rule store; an unreadable file is a store outage, so fail
    // soft and evaluate with no rules, same as the engine does at layer 1.
    let rules_path = args
        .rules_path
        .map(|p| Config::expand_path(&p))
        .or_else(|| config.rules_path());
    let store = match rules_path {
        Some(ref path) if path.exists() => match MemoryRuleStore::from_file(path) {
            Ok(store) => store,
            Err(e) => {
                log::error!("failed to load rules from {}: {e}", path.display());
                MemoryRuleStore::new()
            }
        },
        _ => MemoryRuleStore::new(),
    };

    // No judge backend is wired here; escalations fail closed.
    let gateway = Gateway::new(store, UnavailableJudge);

    // Resolve the command text
    let command_text = match args.command {
        Some(command) => command,
        None => {
            let stdin = io::stdin();
            let mut input_json = String::new();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => input_json.push_str(&line),
                    Err(_) => break,
                }
            }

            match CommandRequest::from_json(&input_json) {
                Ok(request) => request.command_text,
                Err(e) => {
                    // Fail closed on malformed requests; a request that
                    // cannot be parsed cannot be authorized.
                    eprintln!("Error: failed to parse request (blocking): {}", e);
                    let verdict = Verdict::blocked(
                        SourceLayer::Guard,
                        0,
                        format!("Malformed request: {e}"),
                        None,
                    );
                    println!("{}", verdict.to_json());
                    return;
                }
            }
        }
    };

    // Evaluate
    let verdict = gateway.evaluate(&command_text);

    // Audit
    let audit_path = if config.general.audit_log {
        config.audit_path()
    } else {
        None
    };
    let mut logger = AuditLogger::new(audit_path.as_deref());
    if let Err(e) = logger.log_verdict(&command_text, &verdict) {
        eprintln!("Warning: Failed to write audit log: {}", e);
    }

    // Write the verdict to stdout
    let json = verdict.to_json();
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{}", json);
    let _ = handle.flush();
}
