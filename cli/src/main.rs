use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use sapper_core::*;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

mod config;

use config::FileConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Headless minesweeper engine with an automated player")]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// TOML file with `[game]` and `[bot]` tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    game: GameArgs,

    /// Print machine-readable JSON instead of the board
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GameArgs {
    #[arg(long, global = true, value_enum)]
    preset: Option<Preset>,
    #[arg(long, global = true)]
    rows: Option<usize>,
    #[arg(long, global = true)]
    columns: Option<usize>,
    #[arg(long, global = true)]
    mines: Option<usize>,
    /// Seed for mine placement, random when omitted
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Let the bot play one or more games
    Bot {
        #[arg(long)]
        games: Option<usize>,
        /// Pause between choosing and applying each move
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Cancel a game that is still running after this long
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Trust flags as mines when deducing
        #[arg(long)]
        strict_flags: bool,
    },
    /// Apply scripted moves, e.g. `d:4,4 f:0,1 s:3,3`, then show the board
    Play {
        moves: Vec<PlayerMove>,
        /// Also print the advisor's next move
        #[arg(long)]
        hint: bool,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Preset {
    Beginner,
    Intermediate,
    Expert,
}

impl From<Preset> for Difficulty {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Beginner => Difficulty::Beginner,
            Preset::Intermediate => Difficulty::Intermediate,
            Preset::Expert => Difficulty::Expert,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PlayerMove {
    Dig(Coord2),
    Scan(Coord2),
    Flag(Coord2),
}

impl FromStr for PlayerMove {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, coords) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected <d|s|f>:<row>,<column>, got {s:?}"))?;
        let (row, column) = coords
            .split_once(',')
            .ok_or_else(|| anyhow!("expected <row>,<column>, got {coords:?}"))?;
        let coords = (
            row.trim().parse().context("row")?,
            column.trim().parse().context("column")?,
        );
        Ok(match kind {
            "d" | "dig" => Self::Dig(coords),
            "s" | "scan" => Self::Scan(coords),
            "f" | "flag" => Self::Flag(coords),
            other => bail!("unknown move kind {other:?}"),
        })
    }
}

/// Pacer that sleeps between moves so a human can follow along.
struct SleepPacer(Duration);

impl Pacer for SleepPacer {
    fn pause(&mut self, _game: &Game, advice: &Advice) {
        log::trace!("Next move {:?}", advice.coords);
        if !self.0.is_zero() {
            thread::sleep(self.0);
        }
    }
}

#[derive(Serialize)]
struct GameSummary {
    config: GameConfig,
    state: GameState,
    #[serde(skip_serializing_if = "Option::is_none")]
    bot: Option<BotReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<Advice>,
    board: BoardView,
}

#[derive(Serialize, Default)]
struct Tally {
    won: usize,
    lost: usize,
    cancelled: usize,
    stuck: usize,
}

impl Tally {
    fn add(&mut self, outcome: BotOutcome) {
        match outcome {
            BotOutcome::Won => self.won += 1,
            BotOutcome::Lost => self.lost += 1,
            BotOutcome::Cancelled => self.cancelled += 1,
            BotOutcome::Stuck => self.stuck += 1,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.verbose);

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = resolve_game_config(&cli.game, &file)?;
    let seed = cli.game.seed.or(file.game.seed);

    match cli.command {
        Command::Bot {
            games,
            delay_ms,
            timeout_ms,
            strict_flags,
        } => {
            let flag_semantics = if strict_flags {
                FlagSemantics::Strict
            } else {
                file.bot.flags.unwrap_or_default()
            };
            let bot = Bot::new(AdvisorConfig { flag_semantics });
            let games = games.or(file.bot.games).unwrap_or(1);
            let delay = Duration::from_millis(delay_ms.or(file.bot.delay_ms).unwrap_or(0));
            let timeout = timeout_ms.or(file.bot.timeout_ms).map(Duration::from_millis);
            run_bot(bot, config, seed, games, delay, timeout, cli.json)
        }
        Command::Play { moves, hint } => run_script(config, seed, &moves, hint, cli.json),
    }
}

fn init_logging(verbose: &Verbosity<InfoLevel>) {
    let level = match verbose.log_level_filter() {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_game_config(args: &GameArgs, file: &FileConfig) -> Result<GameConfig> {
    let preset = args
        .preset
        .map(Difficulty::from)
        .or(file.game.preset)
        .unwrap_or(Difficulty::Beginner);
    let base = GameConfig::from(preset);

    let rows = args.rows.or(file.game.rows).unwrap_or(base.rows.into());
    let columns = args.columns.or(file.game.columns).unwrap_or(base.columns.into());
    let mines = args.mines.or(file.game.mines).unwrap_or(base.mines.into());

    GameConfig::new(rows, columns, mines).context("invalid game configuration")
}

fn run_bot(
    bot: Bot,
    config: GameConfig,
    seed: Option<u64>,
    games: usize,
    delay: Duration,
    timeout: Option<Duration>,
    json: bool,
) -> Result<()> {
    let mut tally = Tally::default();
    let mut summaries = Vec::new();

    for index in 0..games {
        let game_seed = seed.map(|seed| seed.wrapping_add(index as u64));
        let mut game = Game::with_config(config, game_seed);
        let cancel = CancelToken::new();
        if let Some(timeout) = timeout {
            // Left detached; it only ever cancels this game's token.
            let cancel = cancel.clone();
            thread::spawn(move || {
                thread::sleep(timeout);
                cancel.cancel();
            });
        }

        let report = bot
            .play(&mut game, &cancel, &mut SleepPacer(delay))
            .with_context(|| format!("bot game {index}"))?;

        log::info!(
            "Game {}: {:?} after {} moves ({} guesses)",
            index + 1,
            report.outcome,
            report.moves.len(),
            report.guesses()
        );
        tally.add(report.outcome);

        if json {
            summaries.push(GameSummary {
                config,
                state: game.state(),
                bot: Some(report),
                hint: None,
                board: game.view(),
            });
        } else if games == 1 {
            print!("{}", game.view());
            println!("{:?}", report.outcome);
        }
    }

    if json {
        #[derive(Serialize)]
        struct Output {
            games: Vec<GameSummary>,
            tally: Tally,
        }
        let output = Output {
            games: summaries,
            tally,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if games > 1 {
        let rate = tally.won as f64 * 100.0 / games as f64;
        println!(
            "won {} / lost {} / cancelled {} / stuck {} ({rate:.1}% wins)",
            tally.won, tally.lost, tally.cancelled, tally.stuck
        );
    }
    Ok(())
}

fn run_script(
    config: GameConfig,
    seed: Option<u64>,
    moves: &[PlayerMove],
    hint: bool,
    json: bool,
) -> Result<()> {
    let mut game = Game::with_config(config, seed);

    for &step in moves {
        match step {
            PlayerMove::Dig(coords) => {
                let outcome = game.dig(coords).with_context(|| format!("dig {coords:?}"))?;
                log::info!("dig {coords:?}: {outcome:?}");
            }
            PlayerMove::Scan(coords) => {
                let result = game.scan(coords).with_context(|| format!("scan {coords:?}"))?;
                log::info!(
                    "scan {coords:?}: {:?}, {} cells uncovered",
                    result.outcome,
                    result.newly_revealed.len()
                );
            }
            PlayerMove::Flag(coords) => {
                game.toggle_flag(coords)
                    .with_context(|| format!("flag {coords:?}"))?;
            }
        }
        if game.is_finished() {
            break;
        }
    }

    let advice = if hint && !game.is_finished() {
        Some(game.bot_move(AdvisorConfig::default())?)
    } else {
        None
    };

    if json {
        let summary = GameSummary {
            config,
            state: game.state(),
            bot: None,
            hint: advice,
            board: game.view(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", game.view());
        println!("{:?} ({} mines left)", game.state(), game.mines_left());
        if let Some(advice) = advice {
            println!("next: {:?} ({:?})", advice.coords, advice.reason);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_player_moves() {
        assert_eq!(
            "d:4,5".parse::<PlayerMove>().unwrap(),
            PlayerMove::Dig((4, 5))
        );
        assert_eq!(
            "scan:0, 1".parse::<PlayerMove>().unwrap(),
            PlayerMove::Scan((0, 1))
        );
        assert_eq!(
            "f:2,2".parse::<PlayerMove>().unwrap(),
            PlayerMove::Flag((2, 2))
        );
        assert!("x:1,1".parse::<PlayerMove>().is_err());
        assert!("d:1".parse::<PlayerMove>().is_err());
        assert!("d:1,300".parse::<PlayerMove>().is_err());
    }

    #[test]
    fn timed_bot_games_each_get_their_own_token() {
        run_bot(
            Bot::default(),
            Difficulty::Beginner.into(),
            Some(7),
            3,
            Duration::ZERO,
            Some(Duration::from_secs(60)),
            false,
        )
        .unwrap();
    }

    #[test]
    fn command_line_overrides_file_and_preset() {
        let file = FileConfig::parse("[game]\npreset = \"expert\"\nmines = 50\n").unwrap();
        let args = GameArgs {
            preset: None,
            rows: None,
            columns: None,
            mines: Some(60),
            seed: None,
        };

        let config = resolve_game_config(&args, &file).unwrap();

        assert_eq!(config, GameConfig::new(16, 30, 60).unwrap());
    }

    #[test]
    fn overfull_board_is_rejected() {
        let args = GameArgs {
            preset: None,
            rows: Some(5),
            columns: Some(5),
            mines: Some(24),
            seed: None,
        };
        assert!(resolve_game_config(&args, &FileConfig::default()).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
