use std::{path::PathBuf, str::FromStr};

use anyhow::Context as _;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg64;
use reversi_engine::{GameObserver, GameResult, GameState, ObservedGame, Player, Position};
use reversi_evaluator::{
    agent::{Agent, RandomAgent, material_agent, positional_agent},
    depth::FixedDepth,
};

use crate::util;

/// Which agent plays one side, e.g. `random`, `material:1.5` or `positional:4,2,0.5`.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display)]
pub(crate) enum AgentSpec {
    #[display("random")]
    Random,
    #[display("material:{weight_ratio}")]
    Material { weight_ratio: f64 },
    #[display("positional:{corner_weight},{side_weight},{insider_ratio}")]
    Positional {
        corner_weight: f64,
        side_weight: f64,
        insider_ratio: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub(crate) enum ParseAgentSpecError {
    #[display("unknown agent kind {kind:?}, expected random, material or positional")]
    UnknownKind { kind: String },
    #[display("{kind} takes {expected} parameter(s), got {actual}")]
    ParameterCount {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display("invalid parameter {value:?}")]
    InvalidParameter { value: String },
}

impl FromStr for AgentSpec {
    type Err = ParseAgentSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, params) = s.split_once(':').unwrap_or((s, ""));
        let params = params
            .split(',')
            .map(str::trim)
            .filter(|param| !param.is_empty())
            .map(|param| {
                param
                    .parse::<f64>()
                    .map_err(|_| ParseAgentSpecError::InvalidParameter {
                        value: param.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let spec = match (kind.trim(), params.as_slice()) {
            ("random", []) => Self::Random,
            ("material", &[weight_ratio]) => Self::Material { weight_ratio },
            ("positional", &[corner_weight, side_weight, insider_ratio]) => Self::Positional {
                corner_weight,
                side_weight,
                insider_ratio,
            },
            ("random", _) => return Err(parameter_count("random", 0, params.len())),
            ("material", _) => return Err(parameter_count("material", 1, params.len())),
            ("positional", _) => return Err(parameter_count("positional", 3, params.len())),
            (kind, _) => {
                return Err(ParseAgentSpecError::UnknownKind {
                    kind: kind.to_owned(),
                });
            }
        };
        Ok(spec)
    }
}

fn parameter_count(kind: &'static str, expected: usize, actual: usize) -> ParseAgentSpecError {
    ParseAgentSpecError::ParameterCount {
        kind,
        expected,
        actual,
    }
}

impl AgentSpec {
    fn build<R>(self, player: Player, depth: u32, rng: &mut R) -> Box<dyn Agent>
    where
        R: Rng + ?Sized,
    {
        let depth = Box::new(FixedDepth(depth));
        match self {
            Self::Random => Box::new(RandomAgent::new(Pcg64::seed_from_u64(rng.random()))),
            Self::Material { weight_ratio } => {
                Box::new(material_agent(player, depth, weight_ratio))
            }
            Self::Positional {
                corner_weight,
                side_weight,
                insider_ratio,
            } => Box::new(positional_agent(
                player,
                depth,
                corner_weight,
                side_weight,
                insider_ratio,
            )),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Agent playing Black
    #[arg(long, default_value = "material:1")]
    black: AgentSpec,
    /// Agent playing White
    #[arg(long, default_value = "positional:4,2,0")]
    white: AgentSpec,
    /// Search depth of Black in half-moves
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
    black_depth: u32,
    /// Search depth of White in half-moves
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
    white_depth: u32,
    /// Seed for random agents
    #[arg(long)]
    seed: Option<u64>,
    /// Start from a snapshot file (JSON or text) instead of the initial position
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Print the board after every move
    #[arg(long)]
    show_board: bool,
}

/// Prints one line per move as the game reports it.
#[derive(Debug, Default)]
struct MovePrinter {
    ply: usize,
    placed: Option<(Position, Player)>,
    flipped: usize,
}

impl MovePrinter {
    fn finish_move(&mut self) {
        if let Some((position, player)) = self.placed.take() {
            self.ply += 1;
            println!(
                "{:3}. {player:5} {position} flips {}",
                self.ply, self.flipped
            );
        }
        self.flipped = 0;
    }
}

impl GameObserver for MovePrinter {
    fn on_cell_change(&mut self, position: Position, owner: Player, previous: Option<Player>) {
        if previous.is_none() {
            self.placed = Some((position, owner));
        } else {
            self.flipped += 1;
        }
    }

    fn on_player_cannot_move(&mut self, skipped: Player) {
        self.finish_move();
        println!("     {skipped} cannot move and passes");
    }

    fn on_normal_move(&mut self, _next: Player) {
        self.finish_move();
    }

    fn on_game_over(&mut self) {
        self.finish_move();
        println!("     Game over");
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let state = match &arg.snapshot {
        Some(path) => {
            let snapshot = util::read_snapshot_file(path)?;
            GameState::from_snapshot(&snapshot)
                .with_context(|| format!("Invalid snapshot: {}", path.display()))?
        }
        None => GameState::new_initial(),
    };

    let mut rng = match arg.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    };
    let mut agents = [
        arg.black.build(Player::Black, arg.black_depth, &mut rng),
        arg.white.build(Player::White, arg.white_depth, &mut rng),
    ];

    eprintln!("Black: {} (depth {})", arg.black, arg.black_depth);
    eprintln!("White: {} (depth {})", arg.white, arg.white_depth);
    println!("{state}");

    let mut game = ObservedGame::new(state, MovePrinter::default());
    while !game.state().is_terminal() {
        let player = game.state().current_player();
        let mv = agents[player.index()]
            .select_move(game.state())
            .with_context(|| format!("{player} failed to choose a move"))?;
        game.apply_move(mv)
            .with_context(|| format!("{player} chose an illegal move"))?;
        if arg.show_board {
            println!("{}", game.state());
        }
    }

    let (state, _) = game.into_parts();
    if !arg.show_board {
        println!("{state}");
    }
    let (black, white) = state.scores();
    println!("Score: Black {black} - White {white}");
    match state.result() {
        Some(GameResult::Winner(player)) => println!("{player} wins"),
        Some(GameResult::Draw) => println!("Draw"),
        None => {}
    }

    Ok(())
}
