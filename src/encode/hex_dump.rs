// Hex Dump - One uppercase hex digit per step, one step per line

use std::fmt::Write;

use super::{DecodeError, DecodeResult};
use crate::groove::ChartGrid;

pub fn encode_hex(grid: &ChartGrid) -> String {
    let mut out = String::with_capacity(grid.step_count() * 2);
    for value in grid.packed_values() {
        let _ = writeln!(out, "{:X}", value);
    }
    out
}

pub fn decode_hex(text: &str) -> DecodeResult<Vec<u8>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let digit = line.trim();
            match u8::from_str_radix(digit, 16) {
                Ok(value) if digit.len() == 1 => Ok(value),
                _ => Err(DecodeError::malformed(
                    index + 1,
                    format!("expected one hex digit, found '{}'", digit),
                )),
            }
        })
        .collect()
}
