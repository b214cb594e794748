// Command-line interface
// `convert` turns a MIDI file into chart files; `decode-status` replays board status bytes

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use crate::chart::Difficulty;
use crate::config::ChartConfig;
use crate::encode::OutputFormat;
use crate::pipeline::{ConvertRequest, Converter};
use crate::playback::PlaybackController;

/// MIDI to rhythm-game chart converter with FPGA memory exports
#[derive(Debug, Parser)]
#[command(name = "notechart")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a MIDI file into chart files for one difficulty
    Convert {
        /// Standard MIDI file to read
        input: PathBuf,

        /// easy, normal or hard (unknown names fall back to normal)
        #[arg(short, long, default_value = "normal")]
        difficulty: String,

        /// Directory for the output files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Use a constant tempo instead of the file's tempo map
        #[arg(long, value_parser = parse_bpm)]
        bpm: Option<f64>,

        /// JSON chart configuration (step duration, margin, column map)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Formats to write (json, verilog_rom, verilog_case, hex, mif, beat_mif); default all
        #[arg(short, long = "format", value_parser = parse_format)]
        formats: Vec<OutputFormat>,

        /// Skip chart_<difficulty>_stats.json
        #[arg(long)]
        no_stats: bool,

        /// Append stage progress to a JSONL trace file
        #[arg(long)]
        trace: Option<PathBuf>,
    },

    /// Run game-board status bytes through the playback state machine
    DecodeStatus {
        /// Status bytes (decimal, 0x hex, or 0b binary)
        #[arg(required = true, value_parser = parse_status_byte)]
        bytes: Vec<u8>,

        /// Print transitions as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_string(s).ok_or_else(|| {
        let known: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.to_string()).collect();
        format!("unknown format '{}' (expected one of: {})", s, known.join(", "))
    })
}

fn parse_bpm(s: &str) -> Result<f64, String> {
    let bpm: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid BPM '{}': {}", s, e))?;
    if bpm.is_finite() && bpm > 0.0 {
        Ok(bpm)
    } else {
        Err(format!("BPM must be a positive number, got {}", s))
    }
}

fn parse_status_byte(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let parsed = if let Some(bits) = s.strip_prefix("0b") {
        u8::from_str_radix(bits, 2)
    } else if let Some(hex) = s.strip_prefix("0x") {
        u8::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid status byte '{}': {}", s, e))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Convert {
            input,
            difficulty,
            out,
            bpm,
            config,
            formats,
            no_stats,
            trace,
        } => {
            let config = match config {
                Some(path) => ChartConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => ChartConfig::default(),
            };

            let request = ConvertRequest {
                input,
                difficulty: Difficulty::from_string(&difficulty),
                out_dir: out,
                bpm_override: bpm,
                formats: if formats.is_empty() {
                    OutputFormat::ALL.to_vec()
                } else {
                    formats
                },
                write_statistics: !no_stats,
            };

            let mut converter = Converter::new(config);
            if let Some(path) = trace {
                converter = converter.with_trace(path);
            }

            let report = converter
                .convert_file(&request)
                .await
                .with_context(|| format!("Conversion of {} failed", request.input.display()))?;

            print!("{}", report);
            if !report.all_succeeded() {
                bail!("{} output(s) failed to export", report.failed_count());
            }
            Ok(())
        }

        Command::DecodeStatus { bytes, json } => {
            let mut controller = PlaybackController::new();
            for raw in bytes {
                let transition = controller.step_raw(raw);
                if json {
                    println!("{}", serde_json::to_string(&transition)?);
                    continue;
                }

                let actions: Vec<String> =
                    transition.actions.iter().map(ToString::to_string).collect();
                println!(
                    "{:#08b}  {:>9} -> {:<9}  {}",
                    raw,
                    transition.from.to_string(),
                    transition.to.to_string(),
                    if actions.is_empty() {
                        "-".to_string()
                    } else {
                        actions.join(", ")
                    }
                );
            }
            Ok(())
        }
    }
}
