//! Bowling - command-line scorekeeper
//!
//! Every invocation loads the store, applies one operation, saves, and
//! prints the scoreboard.

#![warn(missing_docs)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use bowling_engine::{
    BowlingError, Committed, EngineConfig, GameEngine, GameId, GameView, JsonFileStore, NewPlayer,
    PlayerId,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_STORE: &str = "bowling.json";

/// Ten-pin bowling scorekeeper
#[derive(Parser, Debug)]
#[command(name = "bowling")]
#[command(about = "Keep score for a ten-pin bowling game", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON store (overrides the configured path)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Print the game as JSON instead of a scoreboard
    #[arg(long, global = true)]
    json: bool,

    /// Operation to run
    #[command(subcommand)]
    command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new game with these players, in turn order
    New {
        /// Player names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Add a player to the current game (starts one if needed)
    Add {
        /// Player name
        name: String,

        /// Player id; an existing id replaces that player's name
        #[arg(long)]
        id: Option<String>,
    },

    /// Remove a player from the current game
    Remove {
        /// Player id
        id: String,
    },

    /// Record a roll for the player whose turn it is
    Roll {
        /// Pins knocked down
        pins: u8,
    },

    /// Take back the last change
    Undo,

    /// Show the current game
    Show,

    /// List stored games
    List,

    /// Make a stored game current
    Load {
        /// Game id
        game_id: String,
    },

    /// Delete a stored game
    Delete {
        /// Game id
        game_id: String,
    },

    /// Put the current game aside
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = cli
        .store
        .clone()
        .or_else(|| config.storage_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
    info!(store = %path.display(), "opening store");

    let mut engine = GameEngine::new(JsonFileStore::new(path), &config);
    if let Some(err) = engine.startup_warning() {
        eprintln!("warning: {err}");
    }

    run(&mut engine, cli.command, cli.json)
}

fn run(engine: &mut GameEngine<JsonFileStore>, command: Command, json: bool) -> Result<()> {
    match command {
        Command::New { names } => {
            let players = names.into_iter().map(NewPlayer::named).collect();
            let committed = engine.start_new_game(players)?;
            report(&committed);
        }
        Command::Add { name, id } => {
            let player = match id {
                Some(id) => NewPlayer::new(PlayerId::new(id), name),
                None => NewPlayer::named(name),
            };
            report(&engine.add_player(player)?);
        }
        Command::Remove { id } => {
            report(&engine.remove_player(&PlayerId::new(id))?);
        }
        Command::Roll { pins } => {
            report(&engine.roll(pins)?);
        }
        Command::Undo => match engine.undo() {
            Some(committed) => report(&committed),
            None => println!("Nothing to undo"),
        },
        Command::Show => {}
        Command::List => {
            list(engine);
            return Ok(());
        }
        Command::Load { game_id } => {
            report(&engine.load_game(&GameId::new(game_id))?);
        }
        Command::Delete { game_id } => {
            let committed = engine.delete_game(&GameId::new(game_id))?;
            report(&committed);
            println!("Deleted game {}", committed.value.id());
        }
        Command::Reset => {
            let committed = engine.reset();
            report(&committed);
            if let Some(id) = &committed.value {
                println!("Set aside game {id}");
            }
        }
    }

    show(engine, json)
}

fn report<T>(committed: &Committed<T>) {
    if let Some(err) = &committed.storage_warning {
        eprintln!("warning: change not saved: {err}");
    }
}

fn show(engine: &GameEngine<JsonFileStore>, json: bool) -> Result<()> {
    let Some(view) = engine.view() else {
        if json {
            println!("null");
        } else {
            println!("{}", BowlingError::NoActiveGame);
        }
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{view}");
    }
    Ok(())
}

fn list(engine: &GameEngine<JsonFileStore>) {
    let active = engine.current_game().map(|g| g.id().clone());
    if engine.games().is_empty() {
        println!("No stored games");
    }
    for game in engine.games() {
        let view = GameView::of(game);
        let marker = if active.as_ref() == Some(game.id()) { '*' } else { ' ' };
        let players: Vec<String> = view
            .players
            .iter()
            .map(|p| format!("{} {}", p.name, p.total))
            .collect();
        let status = if view.finished {
            "finished".to_string()
        } else {
            match view.current_frame_index {
                Some(frame) => format!("frame {frame}"),
                None => "waiting".to_string(),
            }
        };
        println!(
            "{marker} {}  {}  [{}]  {}",
            game.id(),
            game.state.created_at.format("%Y-%m-%d %H:%M"),
            status,
            players.join(", ")
        );
    }
}
