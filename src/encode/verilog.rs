// Verilog Export - ROM and case-table modules describing the chart memory
// The ROM lists every address; the case table lists only non-zero steps over an all-zero default

use std::fmt::Write;

use super::{address_bits, ChartMetadata, DecodeError, DecodeResult};
use crate::groove::ChartGrid;

/// Entries between address-range comments in the ROM body
const ROM_GROUP: usize = 8;

/// Dense `chart_rom` module: one `rom[i] = 4'bXXXX;` per address
pub fn encode_verilog_rom(grid: &ChartGrid, metadata: &ChartMetadata) -> String {
    let values = grid.packed_values();
    let depth = values.len();
    let last_address = depth.saturating_sub(1);
    let mut out = String::new();

    // fmt::Write into a String cannot fail
    let _ = write!(
        out,
        "// Verilog Memory Initialization File\n\
         // Auto-generated from {}\n\
         // BPM: {:.2}\n\
         // Total steps: {}\n\
         // Duration: {:.2}s\n\
         \n\
         module chart_rom (\n    \
             input [{}:0] addr,\n    \
             output reg [3:0] data\n\
         );\n\
         \n    \
             reg [3:0] rom [0:{}];\n\
         \n    \
             initial begin\n",
        metadata.source_name,
        metadata.bpm,
        depth,
        grid.duration_seconds(),
        address_bits(depth) - 1,
        last_address,
    );

    for (address, value) in values.iter().enumerate() {
        if address % ROM_GROUP == 0 {
            let group_end = (address + ROM_GROUP - 1).min(last_address);
            let _ = write!(out, "\n        // Address {:04} - {:04}\n", address, group_end);
        }
        let _ = writeln!(out, "        rom[{}] = 4'b{:04b};", address, value);
    }

    out.push_str(
        "    end\n\
         \n    \
             always @(*) begin\n        \
                 data = rom[addr];\n    \
             end\n\
         \n\
         endmodule\n",
    );
    out
}

/// Sparse `chart_data` module: a case line per non-zero address, zero by default
pub fn encode_verilog_case(grid: &ChartGrid, metadata: &ChartMetadata) -> String {
    let values = grid.packed_values();
    let depth = values.len();
    let width = address_bits(depth);
    let mut out = String::new();

    let _ = write!(
        out,
        "// Verilog Parameter File\n\
         // Auto-generated from {}\n\
         // BPM: {:.2}\n\
         // Total steps: {}\n\
         // Duration: {:.2}s\n\
         \n\
         module chart_data #(\n    \
             parameter CHART_LENGTH = {}\n\
         )(\n    \
             input [{}:0] addr,\n    \
             output reg [3:0] data\n\
         );\n\
         \n    \
             always @(*) begin\n        \
                 case(addr)\n",
        metadata.source_name,
        metadata.bpm,
        depth,
        grid.duration_seconds(),
        depth,
        width - 1,
    );

    for (address, value) in values.iter().enumerate() {
        if *value != 0 {
            let _ = writeln!(
                out,
                "            {}'d{}: data = 4'b{:04b};",
                width, address, value
            );
        }
    }

    out.push_str(
        "            default: data = 4'b0000;\n        \
                 endcase\n    \
             end\n\
         \n\
         endmodule\n",
    );
    out
}

/// Packed values of a `chart_rom` module, which must list addresses in order
pub fn decode_verilog_rom(text: &str) -> DecodeResult<Vec<u8>> {
    let mut values = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        let Some(rest) = line.strip_prefix("rom[") else {
            continue;
        };

        let (address, assignment) = rest
            .split_once(']')
            .ok_or_else(|| DecodeError::malformed(line_no, "unterminated rom index"))?;
        let address: usize = address
            .parse()
            .map_err(|_| DecodeError::malformed(line_no, format!("bad address '{}'", address)))?;
        if address != values.len() {
            return Err(DecodeError::malformed(
                line_no,
                format!("expected address {}, found {}", values.len(), address),
            ));
        }

        values.push(parse_binary_literal(assignment, line_no)?);
    }

    Ok(values)
}

/// Packed values of a `chart_data` module, expanded to `CHART_LENGTH` with zeros
pub fn decode_verilog_case(text: &str) -> DecodeResult<Vec<u8>> {
    let mut depth: Option<usize> = None;
    let mut entries = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.starts_with("//") {
            continue;
        }

        if let Some(rest) = line.strip_prefix("parameter CHART_LENGTH") {
            let value = rest.trim_start_matches([' ', '=']).trim();
            let parsed = value.parse().map_err(|_| {
                DecodeError::malformed(line_no, format!("bad CHART_LENGTH '{}'", value))
            })?;
            depth = Some(parsed);
            continue;
        }

        if line.starts_with("default:") {
            if parse_binary_literal(line, line_no)? != 0 {
                return Err(DecodeError::malformed(line_no, "default value is not zero"));
            }
            continue;
        }

        let Some((label, assignment)) = line.split_once(':') else {
            continue;
        };
        let Some((_, address)) = label.split_once("'d") else {
            continue;
        };
        let address: usize = address
            .trim()
            .parse()
            .map_err(|_| DecodeError::malformed(line_no, format!("bad address '{}'", address)))?;
        entries.push((address, parse_binary_literal(assignment, line_no)?));
    }

    let depth = depth.ok_or_else(|| DecodeError::malformed(0, "missing CHART_LENGTH parameter"))?;
    let mut values = vec![0u8; depth];
    for (address, value) in entries {
        let slot = values
            .get_mut(address)
            .ok_or(DecodeError::AddressOutOfRange { address, depth })?;
        *slot = value;
    }

    Ok(values)
}

/// Value of the `4'bXXXX` literal inside an assignment
fn parse_binary_literal(text: &str, line_no: usize) -> DecodeResult<u8> {
    let digits = text
        .split_once("4'b")
        .map(|(_, rest)| rest.trim_end_matches(';').trim())
        .ok_or_else(|| DecodeError::malformed(line_no, "missing 4-bit binary literal"))?;

    if digits.len() != 4 {
        return Err(DecodeError::malformed(
            line_no,
            format!("expected 4 binary digits, found '{}'", digits),
        ));
    }
    u8::from_str_radix(digits, 2)
        .map_err(|_| DecodeError::malformed(line_no, format!("bad binary literal '{}'", digits)))
}
