//! Bluetooth radio control via `bluetoothctl`.

use crate::tool::{run_capture, ToolError};
use crate::traits::Radio;

/// Bluetooth radio backed by `bluetoothctl`.
pub struct BluetoothctlRadio {
    program: String,
}

impl Default for BluetoothctlRadio {
    fn default() -> Self {
        Self::new("bluetoothctl")
    }
}

impl BluetoothctlRadio {
    /// Create a radio invoking `program` (normally `"bluetoothctl"`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Whether a `bluetoothctl show` dump reports the controller as powered.
///
/// The dump lists one `Key: value` pair per line under the controller
/// header; power state is the line `Powered: yes`. No controller at all
/// (empty output) reads as unpowered.
fn parse_powered(output: &str) -> bool {
    output.lines().any(|line| line.trim() == "Powered: yes")
}

impl Radio for BluetoothctlRadio {
    type Error = ToolError;

    fn is_powered(&self) -> Result<bool, ToolError> {
        let out = run_capture(&self.program, &["show"])?;
        Ok(parse_powered(&out))
    }

    fn set_powered(&self, on: bool) -> Result<(), ToolError> {
        let state = if on { "on" } else { "off" };
        run_capture(&self.program, &["power", state]).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_POWERED: &str = "\
Controller 00:1A:7D:DA:71:13 (public)
\tName: workstation
\tAlias: workstation
\tPowered: yes
\tDiscoverable: no
";

    const SHOW_OFF: &str = "\
Controller 00:1A:7D:DA:71:13 (public)
\tName: workstation
\tPowered: no
";

    #[test]
    fn powered_yes_detected() {
        assert!(parse_powered(SHOW_POWERED));
    }

    #[test]
    fn powered_no_detected() {
        assert!(!parse_powered(SHOW_OFF));
    }

    #[test]
    fn no_controller_reads_unpowered() {
        assert!(!parse_powered(""));
        assert!(!parse_powered("No default controller available\n"));
    }

    #[test]
    fn failing_tool_propagates() {
        let bt = BluetoothctlRadio::new("false");
        assert!(bt.is_powered().is_err());
        assert!(bt.set_powered(false).is_err());
    }
}
