use std::path::PathBuf;

use anyhow::Context as _;
use reversi_engine::{GameResult, GameState};
use reversi_evaluator::{agent::material_agent, depth::FixedDepth};

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum SnapshotFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// Snapshot file; `.json` files are read as JSON, anything else as text
    snapshot: PathBuf,
    /// Search the best line to this many half-moves
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    depth: Option<u32>,
    /// Weight ratio of the material heuristic used for the best line
    #[arg(long, default_value_t = 1.0)]
    weight_ratio: f64,
    /// Re-emit the snapshot in this format (json or text)
    #[arg(long)]
    emit: Option<SnapshotFormat>,
    /// Output file path for the re-emitted snapshot
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let snapshot = util::read_snapshot_file(&arg.snapshot)?;
    let state = GameState::from_snapshot(&snapshot)
        .with_context(|| format!("Invalid snapshot: {}", arg.snapshot.display()))?;

    print_summary(&state);

    if let Some(depth) = arg.depth
        && !state.is_terminal()
    {
        let agent = material_agent(
            state.current_player(),
            Box::new(FixedDepth(depth)),
            arg.weight_ratio,
        );
        let result = agent.plan(&state).context("Search failed")?;
        let line = result
            .plan
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        eprintln!("Best line (depth {depth}): {line}");
        match result.value {
            Some(value) => eprintln!("  Value: {value:.3}"),
            None => eprintln!("  Value: not scored (single legal move)"),
        }
        eprintln!("  Nodes: {}", result.nodes);
    }

    if let Some(format) = arg.emit {
        let mut output = Output::from_output_path(arg.output.clone())?;
        match format {
            SnapshotFormat::Json => output.write_json(&snapshot)?,
            SnapshotFormat::Text => output.write_text(&snapshot.to_string())?,
        }
    }

    Ok(())
}

fn print_summary(state: &GameState) {
    eprintln!("{state}");
    let (black, white) = state.scores();
    eprintln!("Score: Black {black} - White {white}");

    match state.result() {
        Some(GameResult::Winner(player)) => eprintln!("Game over: {player} wins"),
        Some(GameResult::Draw) => eprintln!("Game over: draw"),
        None => {
            eprintln!("To move: {}", state.current_player());
            eprintln!("Legal moves:");
            for (position, flips) in state.legal_move_map() {
                eprintln!("  {position} flips {}", flips.len());
            }
        }
    }
}
