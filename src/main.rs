//! Binary entrypoint for the escapade CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and the sample dungeons in `data/dungeons.json`
//! - `status` - print the data directory summary
//! - `dungeons` - list the loaded dungeons
//! - `register <username>` - create an account (password prompted twice, argon2 hashed)
//! - `leaderboard [-n <count>]` - print the best runs and the top players
//!
//! See the library crate docs for module-level details: `escapade::`.
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use escapade::config::Config;
use escapade::game::{AccountRepository, DungeonRepository, EscapeFacade};
use escapade::storage::JsonStore;

#[derive(Parser)]
#[command(name = "escapade")]
#[command(about = "Escape-room dungeons: puzzles, timers and a leaderboard")]
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
    /// Write a default configuration and the sample dungeons
    Init,
    /// Show data directory status
    Status,
    /// List the dungeons in the content file
    Dungeons,
    /// Register a player account
    Register {
        /// Player name
        username: String,
    },
    /// Show the leaderboard
    Leaderboard {
        /// Number of rows (defaults to game.leaderboard_size)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init writes the config, so there is nothing to load yet
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            info!("Initializing new escapade configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            let cfg = Config::default();
            let store = JsonStore::new(&cfg.storage, cfg.game.base_time_budget_ms);
            store.ensure_dirs()?;
            if store.write_sample_dungeons()? {
                println!("Sample dungeons written to {}", store.dungeons_path().display());
            }
            println!("Configuration written to {}", cli.config);
        }
        Commands::Status => {
            let config = require_config(pre_config, &cli.config)?;
            let store = open_store(&config)?;
            let accounts = store.load_accounts()?;
            let dungeons = store.load_dungeons()?;
            let leaderboard = store.load_leaderboard()?;
            println!("escapade v{}", env!("CARGO_PKG_VERSION"));
            println!("Data directory: {}", config.storage.data_dir);
            println!("Accounts: {}", accounts.len());
            println!("Dungeons: {}", dungeons.len());
            println!("Leaderboard entries: {}", leaderboard.len());
            println!(
                "Default difficulty: {} (base budget {} ms)",
                config.game.default_difficulty, config.game.base_time_budget_ms
            );
        }
        Commands::Dungeons => {
            let config = require_config(pre_config, &cli.config)?;
            let store = open_store(&config)?;
            let repo = DungeonRepository::from_dungeons(store.load_dungeons()?);
            if repo.is_empty() {
                println!("No dungeons found. Run `escapade init` to write the samples.");
            }
            for summary in repo.summaries() {
                println!(
                    "{:<12} {:<24} {:<7} {} rooms, {} puzzles",
                    summary.id, summary.name, summary.difficulty, summary.room_count, summary.puzzle_count
                );
            }
        }
        Commands::Register { username } => {
            let config = require_config(pre_config, &cli.config)?;
            let store = open_store(&config)?;
            let accounts = Arc::new(AccountRepository::from_accounts(store.load_accounts()?));
            let dungeons = Arc::new(DungeonRepository::new());
            let mut facade = EscapeFacade::from_config(&config, accounts, dungeons)
                .with_persistence(Box::new(store));

            // Prompt twice without echo
            let pass1 = rpassword::prompt_password("New password: ")?;
            let pass2 = rpassword::prompt_password("Confirm password: ")?;
            if pass1 != pass2 {
                println!("Error: passwords do not match.");
                return Ok(());
            }
            if facade.register(&username, &pass1) {
                println!("Account '{}' registered.", username);
            } else {
                println!(
                    "Error: could not register '{}' (name taken or invalid, or password shorter than {}).",
                    username, config.security.min_password_length
                );
            }
        }
        Commands::Leaderboard { count } => {
            let config = require_config(pre_config, &cli.config)?;
            let store = open_store(&config)?;
            let n = count.unwrap_or(config.game.leaderboard_size);
            let accounts = Arc::new(AccountRepository::from_accounts(store.load_accounts()?));
            let facade = EscapeFacade::from_config(&config, accounts, Arc::new(DungeonRepository::new()))
                .with_leaderboard(store.load_leaderboard()?);

            println!("Best runs");
            for (i, entry) in facade.top_score(n).iter().enumerate() {
                println!(
                    "{:>3}. {:<20} {:>6} pts {:>8.1}s",
                    i + 1,
                    entry.username,
                    entry.score,
                    entry.elapsed_ms as f64 / 1000.0
                );
            }
            println!();
            println!("Top players");
            for player in facade.get_top_players(n) {
                println!("{:>3}. {:<20} {:>6} pts", player.rank, player.username, player.score);
            }
        }
    }

    Ok(())
}

fn require_config(config: Option<Config>, path: &str) -> Result<Config> {
    config.ok_or_else(|| anyhow!("Could not load {}. Run `escapade init` first.", path))
}

fn open_store(config: &Config) -> Result<JsonStore> {
    let store = JsonStore::new(&config.storage, config.game.base_time_budget_ms);
    if let Err(e) = store.ensure_dirs() {
        warn!("Data directory not ready: {}", e);
    }
    Ok(store)
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|cfg| cfg.logging.file.as_ref()).and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .ok()
    });
    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Echo to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
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
