// Encode module
// Serializes a finished chart grid into debug JSON, Verilog, hex, and MIF text

pub mod beat_mif;
pub mod hex_dump;
pub mod json;
pub mod mif;
pub mod verilog;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chart::Difficulty;
use crate::groove::ChartGrid;

pub use beat_mif::{decode_beat_mif, encode_beat_mif};
pub use hex_dump::{decode_hex, encode_hex};
pub use json::{decode_json, encode_json, ChartDocument, DocumentMetadata};
pub use mif::{decode_mif, encode_mif};
pub use verilog::{
    decode_verilog_case, decode_verilog_rom, encode_verilog_case, encode_verilog_rom,
};

/// Errors raised while reading an encoded chart back
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid chart document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Address {address} is outside a memory of depth {depth}")]
    AddressOutOfRange { address: usize, depth: usize },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

impl DecodeError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        DecodeError::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

/// Caller-supplied details that the grid itself does not carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub source_name: String,
    pub bpm: f64,
    pub difficulty: Difficulty,
}

impl ChartMetadata {
    pub fn new(source_name: impl Into<String>, bpm: f64, difficulty: Difficulty) -> Self {
        ChartMetadata {
            source_name: source_name.into(),
            bpm,
            difficulty,
        }
    }

    /// Metadata naming the source by its file name only
    pub fn from_source_path(path: &Path, bpm: f64, difficulty: Difficulty) -> Self {
        let source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        ChartMetadata::new(source_name, bpm, difficulty)
    }
}

/// Output targets, in the order they are exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Pretty-printed JSON for debugging and round-trips
    Json,

    /// Dense `chart_rom` module with one assignment per address
    VerilogRom,

    /// Sparse `chart_data` module with a case per non-zero address
    VerilogCase,

    /// One hex digit per step
    Hex,

    /// Quartus memory initialization file
    Mif,

    /// Annotated MIF with decimal addresses and binary steps, 16 per line
    BeatMif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Json,
        OutputFormat::VerilogRom,
        OutputFormat::VerilogCase,
        OutputFormat::Hex,
        OutputFormat::Mif,
        OutputFormat::BeatMif,
    ];

    /// Parse a format name; `None` for unknown names
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "json" => Some(OutputFormat::Json),
            "verilog_rom" | "rom" => Some(OutputFormat::VerilogRom),
            "verilog_case" | "case" => Some(OutputFormat::VerilogCase),
            "hex" => Some(OutputFormat::Hex),
            "mif" => Some(OutputFormat::Mif),
            "beat_mif" | "beats" => Some(OutputFormat::BeatMif),
            _ => None,
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::VerilogRom => "verilog_rom",
            OutputFormat::VerilogCase => "verilog_case",
            OutputFormat::Hex => "hex",
            OutputFormat::Mif => "mif",
            OutputFormat::BeatMif => "beat_mif",
        }
    }

    /// Output file name for a difficulty
    pub fn file_name(&self, difficulty: Difficulty) -> String {
        let d = difficulty.to_string();
        match self {
            OutputFormat::Json => format!("chart_{}.json", d),
            OutputFormat::VerilogRom => format!("chart_rom_{}.v", d),
            OutputFormat::VerilogCase => format!("chart_data_{}.v", d),
            OutputFormat::Hex => format!("chart_{}.hex", d),
            OutputFormat::Mif => format!("chart_{}.mif", d),
            OutputFormat::BeatMif => format!("chart_{}_beats.mif", d),
        }
    }

    pub fn encode(&self, grid: &ChartGrid, metadata: &ChartMetadata) -> String {
        match self {
            OutputFormat::Json => encode_json(grid, metadata),
            OutputFormat::VerilogRom => encode_verilog_rom(grid, metadata),
            OutputFormat::VerilogCase => encode_verilog_case(grid, metadata),
            OutputFormat::Hex => encode_hex(grid),
            OutputFormat::Mif => encode_mif(grid),
            OutputFormat::BeatMif => encode_beat_mif(grid, metadata),
        }
    }
}

/// Address bus width for a memory of `depth` entries (at least 16 bits)
pub fn address_bits(depth: usize) -> usize {
    let highest = depth.saturating_sub(1);
    let needed = (usize::BITS - highest.leading_zeros()) as usize;
    needed.max(16)
}
