//! The wire vocabulary shared by the daemon and the panel UI.
//!
//! [`Command`] is what the UI sends in (over stdin or the Unix socket, one
//! JSON value per line) and [`DeckEvent`] is what the daemon emits on stdout
//! in the same framing. The UI layer holds the widgets; this protocol
//! carries only numeric slider positions, toggle requests, and refresh
//! triggers one way, and state snapshots the other way.
//!
//! # Wire format
//!
//! ```json
//! "Refresh"
//! {"SetBrightness":{"display":1,"value":70}}
//! {"SetContrast":{"display":2,"value":45}}
//! {"SetWifi":true}
//! {"SetBluetooth":false}
//! "OpenNetworkSettings"
//! ```

use crate::display::DisplayRecord;
use serde::{Deserialize, Serialize};

/// Every request the deck can carry out.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by [`Deck::handle`](crate::deck::Deck::handle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Re-run display detection, rebuild the controller set, and re-poll
    /// both radios. The previous display set stays in place if detection
    /// fails.
    Refresh,

    /// Set the brightness of the display with the given detection index.
    ///
    /// `value` is a slider position; the controller clamps it to [0, 100].
    /// The UI sends this at interaction end-points (drag released, scroll
    /// step), not per intermediate drag value.
    SetBrightness { display: u32, value: i32 },

    /// Set the contrast of the display with the given detection index.
    SetContrast { display: u32, value: i32 },

    /// Power the Wi-Fi radio on or off.
    SetWifi(bool),

    /// Power the Bluetooth radio on or off.
    SetBluetooth(bool),

    /// Launch the configured network settings application, detached.
    OpenNetworkSettings,

    /// Launch the configured Bluetooth settings application, detached.
    OpenBluetoothSettings,
}

/// State changes the daemon reports back to the UI.
///
/// Events are emitted optimistically: a `Brightness` event follows a
/// [`Command::SetBrightness`] immediately, before the hardware write has
/// completed, so sliders track the user without stalling on `ddcutil`
/// latency. Events also follow confirmed hardware reads after a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckEvent {
    /// The full display set from the latest successful detection, including
    /// uncontrollable (bus-less) displays for informational listing.
    Displays(Vec<DisplayRecord>),

    /// Cached brightness of one display changed.
    Brightness { display: u32, value: u8 },

    /// Cached contrast of one display changed.
    Contrast { display: u32, value: u8 },

    /// Wi-Fi radio power state.
    Wifi { powered: bool },

    /// Bluetooth radio power state.
    Bluetooth { powered: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_wire_shapes() {
        assert_eq!(serde_json::to_string(&Command::Refresh).unwrap(), r#""Refresh""#);
        assert_eq!(
            serde_json::to_string(&Command::SetBrightness {
                display: 1,
                value: 70,
            })
            .unwrap(),
            r#"{"SetBrightness":{"display":1,"value":70}}"#
        );
        assert_eq!(
            serde_json::to_string(&Command::SetWifi(true)).unwrap(),
            r#"{"SetWifi":true}"#
        );
    }

    #[test]
    fn command_round_trip() {
        let commands = vec![
            Command::Refresh,
            Command::SetBrightness {
                display: 2,
                value: -10,
            },
            Command::SetContrast {
                display: 1,
                value: 150,
            },
            Command::SetWifi(false),
            Command::SetBluetooth(true),
            Command::OpenNetworkSettings,
            Command::OpenBluetoothSettings,
        ];
        for cmd in commands {
            let json = serde_json::to_string(&cmd).unwrap();
            let back: Command = serde_json::from_str(&json).unwrap();
            assert_eq!(back, cmd);
        }
    }

    #[test]
    fn out_of_range_slider_values_survive_the_wire() {
        // Clamping is the controller's job; the protocol carries the raw
        // slider position.
        let cmd: Command = serde_json::from_str(r#"{"SetBrightness":{"display":1,"value":150}}"#)
            .unwrap();
        assert_eq!(
            cmd,
            Command::SetBrightness {
                display: 1,
                value: 150,
            }
        );
    }

    #[test]
    fn event_round_trip() {
        let events = vec![
            DeckEvent::Displays(vec![crate::display::DisplayRecord {
                index: 1,
                name: "DELL U2720Q".into(),
                bus: Some(7),
            }]),
            DeckEvent::Brightness {
                display: 1,
                value: 70,
            },
            DeckEvent::Contrast {
                display: 2,
                value: 45,
            },
            DeckEvent::Wifi { powered: true },
            DeckEvent::Bluetooth { powered: false },
        ];
        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let back: DeckEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(back, event);
        }
    }

    #[test]
    fn events_are_single_line_json() {
        let event = DeckEvent::Displays(vec![crate::display::DisplayRecord {
            index: 1,
            name: "DELL U2720Q".into(),
            bus: Some(7),
        }]);
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains('\n'));
    }
}
