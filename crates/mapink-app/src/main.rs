//! Main application entry point.

use anyhow::{Context, Result};
use clap::Parser;
use mapink_app::{Replay, ReplaySummary, Script, ShortcutRegistry};
use mapink_core::{MapConfig, MemoryStore, RestStore, SessionRef, store::StoreRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "mapink",
    version,
    about = "Replay a recorded map annotation session against a row store"
)]
struct Args {
    /// Session script (JSON) to replay.
    #[arg(long, value_name = "PATH", required_unless_present = "shortcuts")]
    script: Option<PathBuf>,

    /// JSON config file. Defaults to GEOBASE_URL / GEOBASE_ANON_KEY, then built-in defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Send commits to this REST store instead of an in-memory one.
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Print keyboard shortcuts and exit.
    #[arg(long)]
    shortcuts: bool,
}

fn load_config(path: Option<&Path>) -> Result<MapConfig> {
    if let Some(path) = path {
        return MapConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    match MapConfig::from_env() {
        Ok(config) => Ok(config),
        Err(e) => {
            log::info!("{}; using default config", e);
            Ok(MapConfig::default())
        }
    }
}

fn print_summary(summary: &ReplaySummary) {
    println!("Replayed {} events", summary.events);
    println!(
        "Commits: {} ({} failed)",
        summary.commits, summary.failed_commits
    );
    println!(
        "Tile refreshes: {}, camera moves: {}, features marked: {}",
        summary.surface.tile_refreshes, summary.surface.camera_moves, summary.surface.marked_features
    );
    println!("Final tool: {}", summary.final_tool.display_name());
    for notice in &summary.notices {
        println!("Notice: {}", notice.message);
    }
}

fn print_requests(requests: &[StoreRequest]) {
    println!("Store requests:");
    for request in requests {
        match request {
            StoreRequest::Insert { table, row } => {
                println!("  INSERT {} {} meta={:?}", table, row.shape, row.meta)
            }
            StoreRequest::Delete { table, id } => println!("  DELETE {} id={}", table, id),
            StoreRequest::Select { table, filters } => {
                println!("  SELECT {} ({} filters)", table, filters.len())
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.shortcuts {
        ShortcutRegistry::print_all();
        return Ok(());
    }

    let mut config = load_config(args.config.as_deref())?;
    if let Some(server) = &args.server {
        config.base_url = server.clone();
        config.validate()?;
    }

    let script_path = args.script.context("--script is required")?;
    let script = Script::from_file(&script_path)?;
    let session = SessionRef::new(script.session.clone());
    log::info!("Replaying {} ({} events)", script_path.display(), script.events.len());

    if args.server.is_some() {
        let store = Arc::new(RestStore::new(config.clone(), session.clone()));
        let summary = Replay::new(config, session, store).run(script);
        print_summary(&summary);
    } else {
        let store = Arc::new(MemoryStore::new());
        let summary = Replay::new(config, session, Arc::clone(&store)).run(script);
        print_summary(&summary);
        print_requests(&store.requests());
    }

    Ok(())
}
