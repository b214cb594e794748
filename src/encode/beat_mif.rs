// Beat MIF Export - Annotated MIF with decimal addresses and 16 binary steps per line
// Same memory contents as the plain MIF, laid out for reading next to the song

use std::fmt::Write;

use super::mif::header_value;
use super::{ChartMetadata, DecodeError, DecodeResult};
use crate::groove::{ChartGrid, CHANNEL_COUNT};

/// Steps listed on one content line
pub const STEPS_PER_LINE: usize = 16;

pub fn encode_beat_mif(grid: &ChartGrid, metadata: &ChartMetadata) -> String {
    let values = grid.packed_values();
    let depth = values.len();
    let step_ms = grid.step_duration() * 1000.0;
    let mut out = String::new();

    let _ = writeln!(out, "-- Rhythm game beat data MIF");
    let _ = writeln!(out, "-- Source: {}", metadata.source_name);
    let _ = writeln!(out, "-- BPM: {:.2}", metadata.bpm);
    let _ = writeln!(out, "-- Step: {} ms", step_ms);
    let _ = writeln!(out, "-- Total steps: {}", depth);
    let _ = writeln!(out, "-- Duration: {:.1} seconds", grid.duration_seconds());
    let _ = writeln!(out, "-- Data: bits[3:0] = tracks[4:1] (F4 F3 F2 F1)");
    let _ = writeln!(out, "-- 1 = note, 0 = none");
    out.push('\n');

    let _ = write!(
        out,
        "WIDTH={};\nDEPTH={};\n\nADDRESS_RADIX=DEC;\nDATA_RADIX=BIN;\n\nCONTENT BEGIN\n",
        CHANNEL_COUNT, depth
    );
    for (line, chunk) in values.chunks(STEPS_PER_LINE).enumerate() {
        let bits: Vec<String> = chunk
            .iter()
            .map(|value| format!("{:0width$b}", value, width = CHANNEL_COUNT))
            .collect();
        let _ = writeln!(
            out,
            "    {:6} : {};",
            line * STEPS_PER_LINE,
            bits.join(" ")
        );
    }
    out.push_str("END;\n");
    out
}

/// Packed values from a beat MIF; each line fills consecutive addresses from its start
pub fn decode_beat_mif(text: &str) -> DecodeResult<Vec<u8>> {
    let mut depth: Option<usize> = None;
    let mut values: Option<Vec<u8>> = None;
    let mut in_content = false;
    let mut terminated = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("--") {
            continue;
        }

        if !in_content {
            if let Some(width) = header_value(line, "WIDTH") {
                if width != CHANNEL_COUNT.to_string() {
                    return Err(DecodeError::malformed(
                        line_no,
                        format!("unsupported width {}", width),
                    ));
                }
            } else if let Some(radix) = header_value(line, "ADDRESS_RADIX") {
                if radix != "DEC" {
                    return Err(DecodeError::malformed(
                        line_no,
                        format!("expected decimal addresses, got {}", radix),
                    ));
                }
            } else if let Some(radix) = header_value(line, "DATA_RADIX") {
                if radix != "BIN" {
                    return Err(DecodeError::malformed(
                        line_no,
                        format!("expected binary data, got {}", radix),
                    ));
                }
            } else if let Some(value) = header_value(line, "DEPTH") {
                depth = Some(value.parse().map_err(|_| {
                    DecodeError::malformed(line_no, format!("bad depth '{}'", value))
                })?);
            } else if line == "CONTENT BEGIN" {
                let depth = depth.ok_or_else(|| {
                    DecodeError::malformed(line_no, "CONTENT BEGIN before DEPTH")
                })?;
                values = Some(vec![0; depth]);
                in_content = true;
            }
            continue;
        }

        if line == "END;" {
            terminated = true;
            break;
        }

        let (start, data) = line
            .trim_end_matches(';')
            .split_once(':')
            .ok_or_else(|| DecodeError::malformed(line_no, "expected 'address : bits;'"))?;
        let start: usize = start.trim().parse().map_err(|_| {
            DecodeError::malformed(line_no, format!("bad address '{}'", start.trim()))
        })?;

        let Some(values) = values.as_mut() else {
            continue;
        };
        let depth = values.len();
        for (offset, word) in data.split_whitespace().enumerate() {
            let value = u8::from_str_radix(word, 2)
                .ok()
                .filter(|_| word.len() == CHANNEL_COUNT)
                .ok_or_else(|| DecodeError::malformed(line_no, format!("bad word '{}'", word)))?;
            let address = start + offset;
            let slot = values
                .get_mut(address)
                .ok_or(DecodeError::AddressOutOfRange { address, depth })?;
            *slot = value;
        }
    }

    if !terminated {
        return Err(DecodeError::malformed(0, "missing END; marker"));
    }
    values.ok_or_else(|| DecodeError::malformed(0, "missing CONTENT BEGIN"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Difficulty;

    fn metadata() -> ChartMetadata {
        ChartMetadata::new("lemon.mid", 96.5, Difficulty::Easy)
    }

    #[test]
    fn test_layout() {
        let grid = ChartGrid::from_packed(0.05, &[0x1, 0xC]);
        let text = encode_beat_mif(&grid, &metadata());

        assert!(text.starts_with("-- Rhythm game beat data MIF\n-- Source: lemon.mid\n"));
        assert!(text.contains("-- BPM: 96.50\n-- Step: 50 ms\n-- Total steps: 2\n"));
        assert!(text.contains("-- Duration: 0.1 seconds\n"));
        assert!(text.contains(
            "\n\nWIDTH=4;\nDEPTH=2;\n\nADDRESS_RADIX=DEC;\nDATA_RADIX=BIN;\n\nCONTENT BEGIN\n"
        ));
        assert!(text.ends_with("CONTENT BEGIN\n         0 : 0001 1100;\nEND;\n"));
    }

    #[test]
    fn test_sixteen_steps_per_line() {
        let values: Vec<u8> = (0..40).map(|i| (i % 16) as u8).collect();
        let grid = ChartGrid::from_packed(0.05, &values);
        let text = encode_beat_mif(&grid, &metadata());

        let content: Vec<&str> = text
            .lines()
            .skip_while(|line| *line != "CONTENT BEGIN")
            .skip(1)
            .take_while(|line| *line != "END;")
            .collect();
        assert_eq!(content.len(), 3);
        assert!(content[1].starts_with("        16 : 0000 0001"));
        assert!(content[2].starts_with("        32 : 0000 0001"));
        assert_eq!(content[2].split_whitespace().count(), 2 + 8);

        assert_eq!(decode_beat_mif(&text).unwrap(), values);
    }

    #[test]
    fn test_empty_grid() {
        let grid = ChartGrid::from_packed(0.05, &[]);
        let text = encode_beat_mif(&grid, &metadata());

        assert!(text.ends_with("CONTENT BEGIN\nEND;\n"));
        assert!(decode_beat_mif(&text).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_hex_radix() {
        let text = "WIDTH=4;\nDEPTH=1;\nADDRESS_RADIX=HEX;\nCONTENT BEGIN\n0 : 0001;\nEND;\n";
        assert!(matches!(
            decode_beat_mif(text),
            Err(DecodeError::Malformed { line: 3, .. })
        ));
    }

    #[test]
    fn test_decode_overflowing_line() {
        let text = "WIDTH=4;\nDEPTH=2;\nCONTENT BEGIN\n0 : 0001 0010 0100;\nEND;\n";
        assert!(matches!(
            decode_beat_mif(text),
            Err(DecodeError::AddressOutOfRange { address: 2, depth: 2 })
        ));
    }

    #[test]
    fn test_decode_rejects_short_word() {
        let text = "WIDTH=4;\nDEPTH=1;\nCONTENT BEGIN\n0 : 01;\nEND;\n";
        assert!(decode_beat_mif(text).is_err());
    }
}
