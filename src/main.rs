use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valo_ladder::api::state::AppState;
use valo_ladder::calculate::report;
use valo_ladder::config::AppConfig;
use valo_ladder::ingest::Ingestor;
use valo_ladder::models::{Puuid, Tier};
use valo_ladder::provider::HenrikProvider;
use valo_ladder::storage::{MatchStore, StorageConfig};

#[derive(Parser)]
#[command(name = "valo-ladder")]
#[command(about = "Private Valorant leaderboard with badges and tier lists")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Add a match from a tracker URL, a match id or a saved payload
    Ingest {
        /// Tracker URL or bare match id
        #[arg(long, required_unless_present = "file", conflicts_with = "file")]
        url: Option<String>,

        /// Provider payload saved on disk
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print the career leaderboard
    Leaderboard {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print one player's stats, badges and recent matches
    Player {
        puuid: String,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the tier list
    Tiers {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Delete every stored match
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Serialize)]
struct PlayerReport {
    profile: valo_ladder::models::PlayerProfile,
    badges: Vec<valo_ladder::models::BadgeInfo>,
    agents: Vec<valo_ladder::models::GroupStats>,
    maps: Vec<valo_ladder::models::GroupStats>,
    matches: Vec<valo_ladder::models::MatchHistoryEntry>,
}

fn open_store(config: &AppConfig) -> Result<Arc<MatchStore>> {
    let store = MatchStore::open(StorageConfig::new(config.data_dir.clone()))
        .with_context(|| format!("Failed to open data dir {}", config.data_dir.display()))?;
    Ok(Arc::new(store))
}

fn ingestor(config: &AppConfig, store: Arc<MatchStore>) -> Result<Ingestor> {
    let provider = HenrikProvider::from_config(&config.provider)?;
    Ok(Ingestor::new(store, Arc::new(provider)))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting valo-ladder v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { host, port } => {
            let store = open_store(&config)?;
            let ingestor = ingestor(&config, store.clone())?;
            let state = AppState::new(store, ingestor, &config.server.cors_origin);

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            valo_ladder::api::start_server(&host, port, state).await?;
        }
        Commands::Ingest { url, file } => {
            let store = open_store(&config)?;
            let ingestor = ingestor(&config, store)?;

            let outcome = match (url, file) {
                (Some(url), _) => ingestor.ingest_reference(&url).await?,
                (None, Some(path)) => {
                    let payload = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    ingestor.ingest_payload(&payload)?
                }
                (None, None) => bail!("Pass --url or --file"),
            };

            println!(
                "Stored match {} on {} ({} players)",
                outcome.match_id, outcome.map, outcome.players
            );
        }
        Commands::Leaderboard { json } => {
            let store = open_store(&config)?;
            let board = report::leaderboard(&store.snapshot());

            if json {
                return print_json(&board);
            }
            println!(
                "{:>4}  {:<24} {:>5} {:>7} {:>6} {:>5} {:>6}",
                "#", "Player", "Games", "Win %", "K/D", "ACS", "HS %"
            );
            for row in &board {
                println!(
                    "{:>4}  {:<24} {:>5} {:>7.1} {:>6.2} {:>5} {:>6.1}",
                    row.rank,
                    format!("{}#{}", row.name, row.tag),
                    row.games,
                    row.win_rate,
                    row.kd,
                    row.avg_acs,
                    row.headshot_percent
                );
            }
        }
        Commands::Player { puuid, json } => {
            let store = open_store(&config)?;
            let snapshot = store.snapshot();
            let puuid = Puuid::new(puuid);

            let Some(profile) = report::player_profile(&snapshot, &puuid) else {
                bail!("No matches stored for player {}", puuid);
            };
            let player = PlayerReport {
                profile,
                badges: report::player_badges(&snapshot, &puuid),
                agents: report::agent_stats(&snapshot, &puuid),
                maps: report::map_stats(&snapshot, &puuid),
                matches: report::match_history(&snapshot, &puuid),
            };

            if json {
                return print_json(&player);
            }
            let stats = &player.profile.stats;
            println!("{}", player.profile.player.riot_id());
            println!(
                "  {} games, {}W {}L ({:.1}%)  K/D {:.2}  ACS {}  {} dmg/game",
                stats.total_games,
                stats.wins,
                stats.losses,
                stats.win_rate,
                stats.kd,
                stats.avg_acs,
                stats.avg_damage
            );
            if !player.badges.is_empty() {
                let names: Vec<&str> = player.badges.iter().map(|b| b.name.as_str()).collect();
                println!("  Badges: {}", names.join(", "));
            }
            for agent in &player.agents {
                println!(
                    "  {:<12} {:>3} games  {:>5.1}%  K/D {:.2}",
                    agent.name, agent.games, agent.win_rate, agent.kd
                );
            }
            for m in player.matches.iter().take(5) {
                println!(
                    "  {}  {:<10} {:<10} {}/{}/{}  {}",
                    m.started_at.format("%Y-%m-%d"),
                    m.map,
                    m.agent,
                    m.kills,
                    m.deaths,
                    m.assists,
                    if m.won { "W" } else { "L" }
                );
            }
        }
        Commands::Tiers { json } => {
            let store = open_store(&config)?;
            let tiers = report::tier_list(&store.snapshot());

            if json {
                return print_json(&tiers);
            }
            for tier in Tier::ALL {
                let players = tiers.in_tier(tier);
                let names: Vec<String> = players
                    .iter()
                    .map(|p| format!("{}#{} ({:+.3})", p.name, p.tag, p.composite_score))
                    .collect();
                println!("{}: {}", tier, names.join(", "));
            }
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("Refusing to reset without --yes");
            }
            let store = open_store(&config)?;
            let removed = store.reset()?;
            println!("Removed {} matches", removed);
        }
    }

    Ok(())
}
