//! Binary entrypoint for the Dalgona bot CLI.
//!
//! Commands:
//! - `start` - run the bot with the console front end and the keep-alive endpoint
//! - `init` - create a starter `config.toml` and an empty ledger
//! - `status` - print ledger totals and the current leaderboard
//! - `import <file>` - load accounts from a JSON snapshot into the ledger
//! - `export <file>` - write every account to a JSON snapshot
//!
//! See the library crate docs for module-level details: `dalgona::`.
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use dalgona::bot::console::{self, ConsoleInput, ConsoleRouter};
use dalgona::bot::{leaderboard, start_bot, DalgonaBot, RawIdLookup};
use dalgona::config::Config;
use dalgona::keepalive;
use dalgona::ledger::{export_json, import_json, LedgerStore};

#[derive(Parser)]
#[command(name = "dalgona-bot")]
#[command(about = "Honeycomb candy carving game bot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Start {
        /// Do not start the keep-alive HTTP endpoint
        #[arg(long)]
        no_keepalive: bool,
    },
    /// Write a default configuration file and create the ledger
    Init,
    /// Show ledger totals and the leaderboard
    Status,
    /// Import accounts from a JSON snapshot
    Import {
        /// Snapshot file (`{"<id>": {"coins": .., "level": .., "xp": .., "lastDaily": ..}}`)
        file: String,
    },
    /// Export all accounts to a JSON snapshot
    Export {
        /// Destination file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new Dalgona configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            let config = Config::default();
            tokio::fs::create_dir_all(&config.storage.data_dir).await?;
            let ledger = LedgerStore::open(config.ledger_path())?;
            ledger.persist()?;
            info!("Initialized ledger at {}", config.ledger_path().display());
        }
        Commands::Start { no_keepalive } => {
            let config = load_config(&cli.config, cli.verbose).await?;
            run(config, no_keepalive).await?;
        }
        Commands::Status => {
            let config = load_config(&cli.config, cli.verbose).await?;
            let ledger = LedgerStore::open(config.ledger_path())?;
            let accounts = ledger.accounts()?;
            let total: u64 = accounts.iter().map(|(_, a)| a.coins).sum();
            println!("Dalgona v{}", env!("CARGO_PKG_VERSION"));
            println!("Ledger: {}", config.ledger_path().display());
            println!("Players: {}", accounts.len());
            println!("Coins in circulation: {}", total);
            println!(
                "Keep-alive: {}",
                if config.keepalive.enabled {
                    format!("port {}", config.keepalive.port)
                } else {
                    "disabled".to_string()
                }
            );
            let top = leaderboard::top_n(&ledger, config.bot.leaderboard_size)?;
            println!();
            print!("{}", leaderboard::render(&top, &RawIdLookup)?);
        }
        Commands::Import { file } => {
            let config = load_config(&cli.config, cli.verbose).await?;
            let ledger = LedgerStore::open(config.ledger_path())?;
            let n = import_json(&ledger, &file)?;
            info!("Imported {} accounts from {}", n, file);
        }
        Commands::Export { file } => {
            let config = load_config(&cli.config, cli.verbose).await?;
            let ledger = LedgerStore::open(config.ledger_path())?;
            let n = export_json(&ledger, &file)?;
            info!("Exported {} accounts to {}", n, file);
        }
    }

    Ok(())
}

/// Load the config file, apply environment overrides and start logging.
async fn load_config(path: &str, verbosity: u8) -> Result<Config> {
    let mut config = Config::load(path)
        .await
        .with_context(|| format!("run `dalgona-bot init` to create {}", path))?;
    config.apply_env_overrides();
    init_logging(&Some(config.clone()), verbosity);
    Ok(config)
}

async fn run(config: Config, no_keepalive: bool) -> Result<()> {
    info!("Starting {} v{}", config.bot.name, env!("CARGO_PKG_VERSION"));
    if config.bot.token.is_none() {
        warn!("No DISCORD_TOKEN configured; only the console front end is available");
    }

    let ledger = LedgerStore::open(config.ledger_path())?;
    info!(
        "Ledger opened at {} ({} accounts)",
        config.ledger_path().display(),
        ledger.len()
    );

    let keepalive_task = if config.keepalive.enabled && !no_keepalive {
        let listener = keepalive::bind(config.keepalive.port).await?;
        Some(tokio::spawn(async move {
            if let Err(e) = keepalive::serve(listener).await {
                error!("keep-alive server stopped: {}", e);
            }
        }))
    } else {
        None
    };

    let bot = DalgonaBot::from_config(&config, ledger, Box::new(RawIdLookup));
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let (handle, bot_task) = start_bot(bot, out_tx);

    let router = Arc::new(Mutex::new(ConsoleRouter::new()));
    let printer_router = router.clone();
    let printer = tokio::spawn(async move {
        while let Some(reply) = out_rx.recv().await {
            if let Ok(mut r) = printer_router.lock() {
                r.observe(&reply);
            }
            println!("{}", console::render(&reply));
        }
    });

    println!("{}", console::help_text());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let input = match ConsoleInput::parse(&line) {
                    Ok(input) => input,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                match input {
                    ConsoleInput::Quit => break,
                    ConsoleInput::Help => println!("{}", console::help_text()),
                    other => {
                        let routed = match router.lock() {
                            Ok(r) => r.route(other),
                            Err(_) => Err("console state unavailable".to_string()),
                        };
                        match routed {
                            Ok(Some(event)) => {
                                if !handle.send(event) {
                                    warn!("bot loop is gone; exiting");
                                    break;
                                }
                            }
                            Ok(None) => {}
                            Err(e) => println!("{}", e),
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down");
                break;
            }
        }
    }

    handle.shutdown().await?;
    bot_task.await??;
    let _ = printer.await;
    if let Some(task) = keepalive_task {
        task.abort();
    }
    info!("Dalgona stopped");
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });
    if let Some(f) = log_file {
        let file = Mutex::new(f);
        // Mirror to the terminal only in the foreground
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
