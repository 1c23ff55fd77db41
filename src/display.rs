//! Display records and the parsers for `ddcutil` text output.
//!
//! This module defines the vocabulary the monitor subsystem shares:
//! [`DisplayRecord`] describes one display block from the detection output,
//! [`VcpFeature`] names the two VCP features the deck controls, and the
//! `parse_*` functions turn `ddcutil`'s line-oriented stdout into structured
//! data.
//!
//! The parsers are pure functions over text so they can be tested without a
//! `ddcutil` binary; the [`DdcBackend`](crate::traits::DdcBackend)
//! implementations feed them real process output.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Header line opening a display block: `Display 1`.
static DISPLAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Display (\d+)$").unwrap());

/// Indented bus line inside a block: `   I2C bus:  /dev/i2c-7`.
static BUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+I2C bus:\s+/dev/i2c-(\d+)$").unwrap());

/// Indented model line inside a block: `   Model:  DELL U2720Q`.
static MODEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s+Model:\s+(.+)$").unwrap());

/// Value line in `getvcp` output: `current value =  50, max value = 100`.
static CURRENT_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"current value =\s*(\d+)").unwrap());

/// A VCP (Virtual Control Panel) feature the deck can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VcpFeature {
    Brightness,
    Contrast,
}

impl VcpFeature {
    /// The feature code `ddcutil` expects on the command line.
    pub fn code(self) -> &'static str {
        match self {
            VcpFeature::Brightness => "10",
            VcpFeature::Contrast => "12",
        }
    }
}

impl fmt::Display for VcpFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcpFeature::Brightness => write!(f, "brightness"),
            VcpFeature::Contrast => write!(f, "contrast"),
        }
    }
}

/// One display block from the detection output.
///
/// Records are immutable once parsed. A record without a [`bus`](Self::bus)
/// is still surfaced (the panel can list the display) but cannot be
/// controlled, since the bus number is how `ddcutil` addresses the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    /// Detection index as printed by the tool (1-based, ascending).
    pub index: u32,
    /// Human-readable label; the model string when present, otherwise the
    /// synthetic `"Display {index}"` fallback.
    pub name: String,
    /// I2C bus number, absent when the tool reported none.
    pub bus: Option<u8>,
}

impl DisplayRecord {
    /// Whether this display can be addressed for VCP reads and writes.
    pub fn controllable(&self) -> bool {
        self.bus.is_some()
    }
}

/// Accumulates one display block until the next header finalizes it.
struct OpenRecord {
    index: u32,
    name: Option<String>,
    bus: Option<u8>,
}

impl OpenRecord {
    fn finalize(self) -> DisplayRecord {
        DisplayRecord {
            index: self.index,
            name: self
                .name
                .unwrap_or_else(|| format!("Display {}", self.index)),
            bus: self.bus,
        }
    }
}

/// Parse `ddcutil detect` stdout into display records.
///
/// Single forward pass over the lines:
///
/// - `Display N` finalizes the open record (if any) and opens a new one.
/// - Inside a record, the first `I2C bus:` line sets the bus and the first
///   `Model:` line sets the name; repeats are ignored.
/// - Lines before the first header (and anything unrecognized) are skipped.
///
/// Records come back in appearance order; a block that never names a model
/// gets the `"Display {index}"` fallback.
pub fn parse_detect(text: &str) -> Vec<DisplayRecord> {
    let mut records = Vec::new();
    let mut current: Option<OpenRecord> = None;

    for line in text.lines() {
        if let Some(caps) = DISPLAY_RE.captures(line) {
            if let Some(open) = current.take() {
                records.push(open.finalize());
            }
            if let Ok(index) = caps[1].parse() {
                current = Some(OpenRecord {
                    index,
                    name: None,
                    bus: None,
                });
            }
            continue;
        }

        let Some(open) = current.as_mut() else {
            continue;
        };

        if open.bus.is_none() {
            if let Some(caps) = BUS_RE.captures(line) {
                open.bus = caps[1].parse().ok();
                continue;
            }
        }
        if open.name.is_none() {
            if let Some(caps) = MODEL_RE.captures(line) {
                open.name = Some(caps[1].trim().to_string());
            }
        }
    }

    if let Some(open) = current.take() {
        records.push(open.finalize());
    }

    records
}

/// Extract the current value from `ddcutil getvcp` stdout.
///
/// The tool prints a summary line like
/// `VCP code 0x10 (Brightness): current value =  62, max value = 100`;
/// only the current value matters here. Values above 100 are capped, since
/// the deck works in percent.
pub fn parse_current_value(text: &str) -> Option<u8> {
    let caps = CURRENT_VALUE_RE.captures(text)?;
    let value: u32 = caps[1].parse().ok()?;
    Some(value.min(100) as u8)
}
