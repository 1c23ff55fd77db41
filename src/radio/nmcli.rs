//! Wi-Fi radio control via `nmcli`.

use crate::tool::{run_capture, ToolError};
use crate::traits::Radio;

/// Wi-Fi radio backed by `nmcli radio wifi`.
pub struct NmcliWifi {
    program: String,
}

impl Default for NmcliWifi {
    fn default() -> Self {
        Self::new("nmcli")
    }
}

impl NmcliWifi {
    /// Create a radio invoking `program` (normally `"nmcli"`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Parse the state word `nmcli radio wifi` prints.
///
/// NetworkManager answers with a single line, `enabled` or `disabled`;
/// anything else is unexpected.
fn parse_radio_state(output: &str) -> Option<bool> {
    match output.trim() {
        "enabled" => Some(true),
        "disabled" => Some(false),
        _ => None,
    }
}

impl Radio for NmcliWifi {
    type Error = ToolError;

    fn is_powered(&self) -> Result<bool, ToolError> {
        let out = run_capture(&self.program, &["radio", "wifi"])?;
        parse_radio_state(&out).ok_or_else(|| ToolError::Parse {
            program: self.program.clone(),
            detail: format!("unexpected radio state: {}", out.trim()),
        })
    }

    fn set_powered(&self, on: bool) -> Result<(), ToolError> {
        let state = if on { "on" } else { "off" };
        run_capture(&self.program, &["radio", "wifi", state]).map(|_| ())
    }
}
