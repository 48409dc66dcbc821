//! Reading instruction traces from text commit logs.
//!
//! The expected input is a Spike-style commit log, where each committed
//! instruction appears as:
//!
//! ```text
//! core   0: 3 0x0000000080000040 (0xfe0718e3) x14 0x0000000000000000
//! ```
//!
//! Only the program counter and the instruction encoding are kept. Any line
//! which doesn't contain this pattern is skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, trace};

use crate::branch::*;
use crate::error::*;

/// Parse a hexadecimal field of the form `0x<digits>`.
/// Values wider than 32 bits keep their low 32 bits.
fn parse_hex(s: &str) -> Option<u32> {
    let digits = s.strip_prefix("0x")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok().map(|x| x as u32)
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Try to match `core <n>: <n> 0x<pc> (0x<inst>)` starting at `toks[0]`.
fn match_at(toks: &[&str]) -> Option<TraceRecord> {
    let [core, hart, level, pc, inst, ..] = toks else {
        return None;
    };
    if !core.ends_with("core") {
        return None;
    }
    if !hart.strip_suffix(':').is_some_and(is_decimal) {
        return None;
    }
    if !is_decimal(level) {
        return None;
    }
    let pc = parse_hex(pc)?;

    // Anything may follow the closing parenthesis
    let inst = inst.strip_prefix('(')?;
    let close = inst.find(')')?;
    let inst = parse_hex(&inst[..close])?;

    Some(TraceRecord::new(pc, inst))
}

/// Extract a [TraceRecord] from a single line of a commit log.
pub fn parse_line(line: &str) -> Option<TraceRecord> {
    let toks: Vec<&str> = line.split_whitespace().collect();
    (0..toks.len()).find_map(|i| match_at(&toks[i..]))
}

/// An ordered list of committed instructions read from a commit log.
#[derive(Clone, Debug, Default)]
pub struct TextTrace {
    pub name: String,
    data: Vec<TraceRecord>,

    /// Number of lines that didn't describe a committed instruction
    skipped: usize,
}
impl TextTrace {
    /// Create a trace from records that are already in memory.
    pub fn from_records(name: impl ToString, data: Vec<TraceRecord>) -> Self {
        Self { name: name.to_string(), data, skipped: 0 }
    }

    /// Read a trace from some buffered reader.
    ///
    /// Lines are decoded lossily, so invalid UTF-8 cannot fail the read.
    pub fn from_reader(name: impl ToString, mut reader: impl BufRead)
        -> std::io::Result<Self>
    {
        let mut res = Self::from_records(name, Vec::new());
        let mut buf = Vec::new();
        let mut lineno = 0usize;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            lineno += 1;
            let line = String::from_utf8_lossy(&buf);
            match parse_line(&line) {
                Some(record) => res.data.push(record),
                None => {
                    trace!(lineno, "skipping line");
                    res.skipped += 1;
                },
            }
        }
        Ok(res)
    }

    /// Read a trace from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let io_err = |source| Error::Io { path: path.to_path_buf(), source };

        let f = File::open(path).map_err(io_err)?;
        let name = path.file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let res = Self::from_reader(name, BufReader::new(f)).map_err(io_err)?;

        info!(
            path = %path.display(),
            records = res.num_entries(),
            skipped = res.num_skipped(),
            "loaded trace"
        );
        Ok(res)
    }

    /// Return the number of records
    pub fn num_entries(&self) -> usize { self.data.len() }

    /// Return the number of lines which were skipped
    pub fn num_skipped(&self) -> usize { self.skipped }

    pub fn name(&self) -> &str { &self.name }

    /// Return a slice of records.
    pub fn as_slice(&self) -> &[TraceRecord] { &self.data }

    /// Return a truncated slice of records
    pub fn as_slice_trunc(&self, limit: usize) -> &[TraceRecord] {
        &self.data[..limit.min(self.data.len())]
    }
}
