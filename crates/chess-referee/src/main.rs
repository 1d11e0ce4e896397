use anyhow::{bail, Context};
use chess_referee::config::RefereeConfig;
use chess_referee::play::{spawn_line_reader, PlaySession};
use chess_referee::record::{save_record, Record};
use chess_referee::replay::{replay_record, starting_game};
use chess_referee::summary::GameSummary;
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-referee")]
#[command(about = "Replay recorded chess games or play one on the terminal")]
struct Cli {
    /// Config file to use instead of searching for referee.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded game and report the final position
    Replay {
        /// Record file, or `-` for stdin
        file: PathBuf,
        /// Starting position; overrides a FEN tag in the record
        #[arg(long)]
        fen: Option<String>,
        /// Print a JSON summary instead of the board
        #[arg(long)]
        json: bool,
        /// Only print the final status line
        #[arg(short, long)]
        quiet: bool,
    },
    /// Play a game, one move per line on stdin
    Play {
        /// Starting position
        #[arg(long)]
        fen: Option<String>,
        /// Seconds per move; overrides move_timeout_secs from the config
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Write the finished game to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RefereeConfig::load_from(path)?,
        None => RefereeConfig::load()?,
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Replay {
            file,
            fen,
            json,
            quiet,
        } => replay(&config, &file, fen.as_deref(), json, quiet),
        Commands::Play { fen, timeout, save } => {
            let move_timeout = timeout.map(Duration::from_secs).or(config.move_timeout());
            play(&config, fen.as_deref(), move_timeout, save)
        }
    }
}

fn read_record(file: &Path) -> anyhow::Result<Record> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read record from stdin")?;
        Ok(Record::parse(&text))
    } else {
        Record::read(file).with_context(|| format!("failed to read {}", file.display()))
    }
}

fn replay(
    config: &RefereeConfig,
    file: &Path,
    fen: Option<&str>,
    json: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let record = read_record(file)?;
    let report = replay_record(&record, fen).context("invalid starting position")?;
    let game = &report.game;

    if json {
        GameSummary::new(game, report.rejected.as_ref()).write_json(io::stdout().lock())?;
    } else {
        if !quiet {
            print!("{}", game.render_board_with(config.board_style()));
            let movetext = chess_rules::transcript::render(game.history());
            if !movetext.is_empty() {
                println!("{}", movetext);
            }
        }
        println!("{} ({})", game.status(), game.status().result_marker());
    }

    if let Some(rejected) = report.rejected {
        bail!(rejected);
    }
    Ok(())
}

fn play(
    config: &RefereeConfig,
    fen: Option<&str>,
    move_timeout: Option<Duration>,
    save: Option<PathBuf>,
) -> anyhow::Result<()> {
    let game = starting_game(fen).context("invalid starting position")?;
    let input = spawn_line_reader(io::BufReader::new(io::stdin()));
    let mut session = PlaySession::new(game, config.board_style(), move_timeout);
    session.play(&input, io::stdout().lock())?;

    if let Some(path) = save {
        save_record(&path, session.game(), fen)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "game saved");
    }
    Ok(())
}
