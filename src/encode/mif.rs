// MIF Export - Quartus memory initialization file (hex addresses, hex data)

use std::fmt::Write;

use super::{DecodeError, DecodeResult};
use crate::groove::{ChartGrid, CHANNEL_COUNT};

/// Minimum digits in a MIF address
const MIN_ADDRESS_DIGITS: usize = 4;

/// Hex digits needed to print every address of a memory of `depth` entries
fn address_digits(depth: usize) -> usize {
    let highest = depth.saturating_sub(1);
    let bits = (usize::BITS - highest.leading_zeros()) as usize;
    bits.div_ceil(4).max(MIN_ADDRESS_DIGITS)
}

pub fn encode_mif(grid: &ChartGrid) -> String {
    let values = grid.packed_values();
    let depth = values.len();
    let digits = address_digits(depth);
    let mut out = String::new();

    let _ = write!(
        out,
        "WIDTH={};\nDEPTH={};\n\nADDRESS_RADIX=HEX;\nDATA_RADIX=HEX;\n\nCONTENT BEGIN\n",
        CHANNEL_COUNT, depth
    );
    for (address, value) in values.iter().enumerate() {
        let _ = writeln!(out, "    {:0width$X}  :  {:X};", address, value, width = digits);
    }
    out.push_str("END;\n");
    out
}

/// Packed values listed in a MIF body; addresses not listed stay zero
pub fn decode_mif(text: &str) -> DecodeResult<Vec<u8>> {
    let mut depth: Option<usize> = None;
    let mut values: Option<Vec<u8>> = None;
    let mut in_content = false;
    let mut terminated = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() {
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

        let (address, value) = line
            .trim_end_matches(';')
            .split_once(':')
            .ok_or_else(|| DecodeError::malformed(line_no, "expected 'address : value;'"))?;
        let address = usize::from_str_radix(address.trim(), 16).map_err(|_| {
            DecodeError::malformed(line_no, format!("bad address '{}'", address.trim()))
        })?;
        let value = u8::from_str_radix(value.trim(), 16)
            .ok()
            .filter(|v| *v < 1 << CHANNEL_COUNT)
            .ok_or_else(|| {
                DecodeError::malformed(line_no, format!("bad value '{}'", value.trim()))
            })?;

        if let Some(values) = values.as_mut() {
            let depth = values.len();
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

/// Value of a `KEY=value;` header line
pub(super) fn header_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (name, value) = line.split_once('=')?;
    (name.trim() == key).then(|| value.trim().trim_end_matches(';').trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let grid = ChartGrid::from_packed(0.05, &[0x1, 0xC]);
        let expected = "WIDTH=4;\nDEPTH=2;\n\nADDRESS_RADIX=HEX;\nDATA_RADIX=HEX;\n\n\
                        CONTENT BEGIN\n    0000  :  1;\n    0001  :  C;\nEND;\n";
        assert_eq!(encode_mif(&grid), expected);
    }

    #[test]
    fn test_address_width_grows() {
        assert_eq!(address_digits(0), 4);
        assert_eq!(address_digits(0x10000), 4);
        assert_eq!(address_digits(0x10001), 5);

        let grid = ChartGrid::from_packed(0.05, &vec![0u8; 0x10001]);
        assert!(encode_mif(&grid).contains("    10000  :  0;\n"));
    }

    #[test]
    fn test_empty_grid() {
        let grid = ChartGrid::from_packed(0.05, &[]);
        let text = encode_mif(&grid);

        assert!(text.contains("DEPTH=0;"));
        assert!(text.ends_with("CONTENT BEGIN\nEND;\n"));
        assert!(decode_mif(&text).unwrap().is_empty());
    }

    #[test]
    fn test_decode_round_trip() {
        let values = [0x0, 0x5, 0xF, 0x0, 0x8];
        let grid = ChartGrid::from_packed(0.05, &values);
        assert_eq!(decode_mif(&encode_mif(&grid)).unwrap(), values.to_vec());
    }

    #[test]
    fn test_decode_address_out_of_range() {
        let text = "WIDTH=4;\nDEPTH=1;\nCONTENT BEGIN\n    0003  :  1;\nEND;\n";
        assert!(matches!(
            decode_mif(text),
            Err(DecodeError::AddressOutOfRange { address: 3, depth: 1 })
        ));
    }

    #[test]
    fn test_decode_requires_end_marker() {
        let text = "WIDTH=4;\nDEPTH=1;\nCONTENT BEGIN\n    0000  :  1;\n";
        assert!(decode_mif(text).is_err());
    }
}
