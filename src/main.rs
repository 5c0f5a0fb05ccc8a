use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use wordfind::corpus::{CorpusStore, FileSource};
use wordfind::logging::{LogTarget, init_logger};
use wordfind::lookup::{EndpointReply, LookupService};
use wordfind::output;
use wordfind::server::{self, LookupClient, get_socket_path, is_daemon_running};
use wordfind::utils::{AppConfig, Settings, get_config_path, get_log_path};

const TUI_LOG_FILE: &str = "wordfind.log";
const DAEMON_LOG_FILE: &str = "wordfind-daemon.log";

#[derive(Parser)]
#[command(name = "wordfind", version)]
#[command(about = "Terminal-first, as-you-type prefix search over large word lists")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Query to complete (interactive picker when omitted)
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Line-delimited word list, sorted case-insensitively
    #[arg(long, global = true, value_name = "PATH")]
    words: Option<PathBuf>,

    /// Minimum query length (in characters) before a lookup is made
    #[arg(long, global = true, value_name = "N")]
    min_query_length: Option<usize>,

    /// Maximum number of suggestions per query
    #[arg(long, global = true, value_name = "N")]
    max_results: Option<usize>,

    /// Log filter, e.g. "debug" or "wordfind=trace" (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Always answer in-process, even if the daemon is running
    #[arg(long, global = true)]
    no_daemon: bool,

    /// Print the endpoint reply as JSON (one-shot mode)
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive picker
    Search {
        /// Initial query
        query: Option<String>,
    },
    /// Manage the lookup daemon (keeps the word list warm)
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Show the resolved configuration
    Config {
        /// Write the resolved configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand)]
enum DaemonAction {
    /// Start the daemon in background
    Start,
    /// Stop the running daemon
    Stop,
    /// Check daemon status
    Status,
    /// Run daemon in foreground (for debugging)
    Foreground,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let settings = config
        .clone()
        .resolve()
        .context("Invalid configuration")?;

    match &cli.command {
        Some(Commands::Search { query }) => {
            init_tui_logger(&cli)?;
            run_interactive(&cli, settings, query.clone())?;
        }
        Some(Commands::Daemon { action }) => {
            handle_daemon_command(&cli, action, settings)?;
        }
        Some(Commands::Config { init }) => {
            show_config(&config, &settings, *init)?;
        }
        None => {
            if cli.query.is_empty() {
                init_tui_logger(&cli)?;
                run_interactive(&cli, settings, None)?;
            } else {
                init_logger(
                    cli.log_level.as_deref(),
                    "warn",
                    LogTarget::Stderr { no_color: cli.no_color },
                )?;
                let query = cli.query.join(" ");
                return run_once(&cli, settings, &query);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// The picker owns the terminal, so it logs to a file
fn init_tui_logger(cli: &Cli) -> Result<()> {
    let log_path = get_log_path(TUI_LOG_FILE)?;
    init_logger(cli.log_level.as_deref(), "info", LogTarget::File(log_path))?;
    Ok(())
}

/// Config file, then environment, then command-line flags
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load()?;
    config.apply_env().context("Invalid environment configuration")?;

    if let Some(ref words) = cli.words {
        config.word_list_path = words.clone();
    }
    if let Some(min) = cli.min_query_length {
        config.min_query_length = min;
    }
    if let Some(max) = cli.max_results {
        config.max_autocomplete_results = max;
    }
    Ok(config)
}

fn build_service(settings: Settings) -> Arc<LookupService> {
    let store = CorpusStore::new(FileSource::new(&settings.word_list_path))
        .with_order_audit(settings.verify_order);
    Arc::new(LookupService::new(Arc::new(store), Arc::new(settings)))
}

fn run_interactive(cli: &Cli, settings: Settings, initial_query: Option<String>) -> Result<()> {
    #[cfg(feature = "interactive")]
    {
        let service = build_service(settings);
        if let Some(word) = wordfind::tui::run(service, initial_query, !cli.no_daemon)? {
            println!("{}", word);
        }
        Ok(())
    }

    #[cfg(not(feature = "interactive"))]
    {
        let _ = (cli, settings, initial_query);
        anyhow::bail!("Interactive mode is not available in this build; pass a query instead")
    }
}

/// One-shot lookup: print suggestions and exit non-zero on a lookup fault
fn run_once(cli: &Cli, settings: Settings, query: &str) -> Result<ExitCode> {
    let start = Instant::now();

    let reply = match daemon_client(cli, &settings) {
        Some(mut client) => client.autocomplete(query)?.reply,
        None => build_service(settings).autocomplete(query),
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    if cli.json {
        output::print_json(&reply, Some(elapsed_ms))?;
    } else {
        output::print_suggestions(&reply.body, query.trim(), !cli.no_color)?;
    }

    Ok(exit_code(&reply))
}

fn exit_code(reply: &EndpointReply) -> ExitCode {
    if reply.is_success() {
        ExitCode::SUCCESS
    } else {
        eprintln!("Lookup failed (status {}); see the log for details", reply.status);
        ExitCode::FAILURE
    }
}

/// A daemon connection, if one is running with the same settings
fn daemon_client(cli: &Cli, settings: &Settings) -> Option<LookupClient> {
    if cli.no_daemon {
        return None;
    }
    LookupClient::connect_serving(&get_socket_path(), settings)
}

fn show_config(config: &AppConfig, settings: &Settings, init: bool) -> Result<()> {
    if init {
        let path = config.save()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    match get_config_path() {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not present)", path.display()),
        None => println!("Config file: none"),
    }
    println!("  Word list: {}", settings.word_list_path.display());
    println!("  Min query length: {}", settings.min_query_length);
    println!("  Max results: {}", settings.max_autocomplete_results);
    println!("  Debounce: {}ms", settings.debounce.as_millis());
    println!("  Verify order: {}", settings.verify_order);
    Ok(())
}

fn handle_daemon_command(cli: &Cli, action: &DaemonAction, mut settings: Settings) -> Result<()> {
    match action {
        DaemonAction::Start => {
            if is_daemon_running() {
                println!("Daemon is already running");
                return Ok(());
            }

            // The daemon changes its working directory to "/"
            settings.word_list_path = std::path::absolute(&settings.word_list_path)
                .context("Failed to resolve word list path")?;

            let log_path = get_log_path(DAEMON_LOG_FILE)?;
            init_logger(cli.log_level.as_deref(), "info", LogTarget::File(log_path.clone()))?;
            info!(word_list = %settings.word_list_path.display(), "starting lookup daemon");

            println!("Starting wordfind daemon...");
            server::daemon::daemonize(build_service(settings))?;

            // Wait a moment for daemon to start
            std::thread::sleep(Duration::from_millis(500));

            if is_daemon_running() {
                println!("Daemon started (socket: {})", get_socket_path().display());
            } else {
                println!("Daemon may have failed to start. Check {}", log_path.display());
            }
        }

        DaemonAction::Stop => {
            if !is_daemon_running() {
                println!("Daemon is not running");
                return Ok(());
            }

            println!("Stopping daemon...");

            // Try graceful shutdown via client first
            if let Some(mut client) = LookupClient::connect() {
                let _ = client.shutdown();
                std::thread::sleep(Duration::from_millis(500));
            }

            // Force stop if still running
            if is_daemon_running() {
                server::daemon::stop_daemon()?;
            }

            println!("Daemon stopped");
        }

        DaemonAction::Status => {
            if !is_daemon_running() {
                println!("Daemon is not running");
                return Ok(());
            }

            match LookupClient::connect() {
                Some(mut client) => match client.status() {
                    Ok(status) => {
                        println!("wordfind daemon status:");
                        println!("  Uptime: {}s", status.uptime_secs);
                        println!("  Word list: {}", status.word_list.display());
                        println!("  Corpus: {}", status.corpus_state);
                        println!("  Words loaded: {}", status.words_loaded);
                        println!("  Corpus reads: {}", status.corpus_reads);
                        println!("  Queries served: {}", status.queries_served);
                        println!("  Faults: {}", status.faults);
                        println!(
                            "  Memory (approx): {:.1} MB",
                            status.memory_bytes as f64 / 1024.0 / 1024.0
                        );
                        if let Some(ref error) = status.last_error {
                            println!("  Last error: {}", error);
                        }
                    }
                    Err(e) => {
                        println!("Failed to get status: {}", e);
                    }
                },
                None => {
                    println!("Daemon is running but not responding");
                }
            }
        }

        DaemonAction::Foreground => {
            if is_daemon_running() {
                println!(
                    "Daemon is already running in background. Stop it first with 'wordfind daemon stop'"
                );
                return Ok(());
            }

            init_logger(
                cli.log_level.as_deref(),
                "info",
                LogTarget::Stderr { no_color: cli.no_color },
            )?;
            println!("Running daemon in foreground (Ctrl+C to stop)...");
            server::daemon::run_foreground(build_service(settings))?;
        }
    }

    Ok(())
}
