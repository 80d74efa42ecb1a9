mod script;
mod session;

use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use shadow_atlas::{AtlasConfig, AtlasStats, TileAtlas};
use tracing::info;

use crate::script::read_script;
use crate::session::{ReplayOutcome, ReplaySession};

#[derive(Parser)]
#[command(author, version, about = "Replay shadow atlas reservation scripts")]
struct Arguments {
    /// JSONL script of reserve/release requests.
    script: PathBuf,
    /// Atlas configuration file (TOML with `size` and `tile_size`).
    #[arg(long, short = 'c', value_parser)]
    config: Option<PathBuf>,
    /// Override the atlas edge length in pixels.
    #[arg(long)]
    size: Option<u32>,
    /// Override the tile edge length in pixels.
    #[arg(long)]
    tile_size: Option<u32>,
    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct StepRecord {
    line: usize,
    #[serde(flatten)]
    outcome: ReplayOutcome,
}

#[derive(Serialize)]
struct Summary {
    summary: AtlasStats,
    held_lights: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let arguments = Arguments::parse();
    let mut config = load_config(arguments.config.as_deref())?;
    if let Some(size) = arguments.size {
        config.size = size;
    }
    if let Some(tile_size) = arguments.tile_size {
        config.tile_size = tile_size;
    }
    let atlas = TileAtlas::from_config(config).context("create shadow atlas")?;
    info!(
        size = atlas.size(),
        tile_size = atlas.tile_size(),
        num_tiles = atlas.num_tiles(),
        "shadow atlas ready"
    );

    let file = File::open(&arguments.script)
        .with_context(|| format!("open script {}", arguments.script.display()))?;
    let lines = read_script(BufReader::new(file))
        .with_context(|| format!("read script {}", arguments.script.display()))?;

    let mut session = ReplaySession::new(atlas);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for line in lines {
        let outcome = session.apply(line.request);
        let record = StepRecord {
            line: line.line_number,
            outcome,
        };
        write_json(&mut out, &record, arguments.pretty)?;
    }

    let summary = Summary {
        summary: session.atlas().stats(),
        held_lights: session.held_lights(),
    };
    write_json(&mut out, &summary, arguments.pretty)?;
    info!(
        used_tiles = summary.summary.used_tiles,
        coverage = summary.summary.coverage,
        "replay finished"
    );
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AtlasConfig> {
    let Some(path) = path else {
        return Ok(AtlasConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

fn write_json(out: &mut impl Write, value: &impl Serialize, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value).context("serialize json")?;
    } else {
        serde_json::to_writer(&mut *out, value).context("serialize json")?;
    }
    writeln!(out).context("write output")?;
    Ok(())
}
