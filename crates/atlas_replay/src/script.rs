use std::io::BufRead;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayRequest {
    /// Square reservation sized for a shadow map resolution in pixels.
    Reserve { light: String, resolution: u32 },
    /// Reservation with an explicit tile extent.
    ReserveTiles {
        light: String,
        width: u32,
        height: u32,
    },
    Release { light: String },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line_number: usize,
    pub request: ReplayRequest,
}

/// Reads JSONL requests, skipping blank lines and `#` comments.
pub fn read_script(reader: impl BufRead) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (line_index, line_result) in reader.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line_result.with_context(|| format!("read script line {line_number}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let request = serde_json::from_str(trimmed)
            .with_context(|| format!("parse script line {line_number}"))?;
        lines.push(ScriptLine {
            line_number,
            request,
        });
    }
    Ok(lines)
}
