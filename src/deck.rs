//! The orchestrator that ties discovery, monitor controllers, and radios
//! together.
//!
//! [`Deck`] owns the current display set and reacts to [`Command`]s by
//! updating controllers and issuing calls through the backend traits. It is
//! generic over [`DdcBackend`] and the two [`Radio`]s, so tests drive it
//! entirely with recording mocks.

use crate::command::{Command, DeckEvent};
use crate::config::LauncherConfig;
use crate::discovery::{DiscoveryError, DisplayDiscovery};
use crate::display::{DisplayRecord, VcpFeature};
use crate::monitor::{MonitorController, MonitorEvent};
use crate::tool::{spawn_detached, ToolError};
use crate::traits::{DdcBackend, Radio};
use log::{info, warn};
use std::sync::{mpsc, Arc};

/// Possible errors from handling a command.
///
/// None of these are fatal: the main loop logs them and keeps serving.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// Display detection failed; the previous display set is still active.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A slider command named a display index that is not controllable.
    #[error("no controllable display with index {0}")]
    UnknownDisplay(u32),

    /// A radio toggle failed.
    #[error("radio error: {0}")]
    Radio(String),

    /// A settings launcher could not be spawned.
    #[error(transparent)]
    Launch(#[from] ToolError),
}

/// Orchestrates the quick-settings state behind the panel UI.
///
/// # Typical usage
///
/// ```ignore
/// let backend = Arc::new(Ddcutil::new("ddcutil"));
/// let mut deck = Deck::new(backend, NmcliWifi::default(),
///                          BluetoothctlRadio::default(),
///                          LauncherConfig::default());
/// deck.set_events(event_tx);
/// deck.handle(Command::Refresh)?;
/// ```
pub struct Deck<B, W, T> {
    backend: Arc<B>,
    discovery: DisplayDiscovery<B>,
    records: Vec<DisplayRecord>,
    controllers: Vec<MonitorController>,
    wifi: W,
    bluetooth: T,
    launchers: LauncherConfig,
    events: Option<mpsc::Sender<DeckEvent>>,
}

impl<B, W, T> Deck<B, W, T>
where
    B: DdcBackend + Send + Sync + 'static,
    W: Radio,
    T: Radio,
{
    /// Create a deck with an empty display set.
    ///
    /// Nothing touches the hardware until the first
    /// [`Command::Refresh`].
    pub fn new(backend: Arc<B>, wifi: W, bluetooth: T, launchers: LauncherConfig) -> Self {
        Self {
            discovery: DisplayDiscovery::new(Arc::clone(&backend)),
            backend,
            records: Vec::new(),
            controllers: Vec::new(),
            wifi,
            bluetooth,
            launchers,
            events: None,
        }
    }

    /// Attach the event channel the UI consumes.
    ///
    /// Must be wired before the first refresh: controllers created by a
    /// refresh subscribe to the channel at creation time.
    pub fn set_events(&mut self, tx: mpsc::Sender<DeckEvent>) {
        self.events = Some(tx);
    }

    /// The full display set from the last successful detection, including
    /// bus-less (uncontrollable) displays.
    pub fn records(&self) -> &[DisplayRecord] {
        &self.records
    }

    /// The controllers for the controllable subset of [`records`](Self::records).
    pub fn controllers(&self) -> &[MonitorController] {
        &self.controllers
    }

    /// Process a single [`Command`].
    pub fn handle(&mut self, cmd: Command) -> Result<(), DeckError> {
        match cmd {
            Command::Refresh => self.refresh()?,

            Command::SetBrightness { display, value } => {
                self.controller(display)?.set_brightness(value);
            }

            Command::SetContrast { display, value } => {
                self.controller(display)?.set_contrast(value);
            }

            Command::SetWifi(on) => {
                info!("wifi radio {}", if on { "on" } else { "off" });
                self.wifi
                    .set_powered(on)
                    .map_err(|e| DeckError::Radio(e.to_string()))?;
                // Optimistic, like the sliders: report the requested state
                // without waiting for a confirming poll.
                self.emit(DeckEvent::Wifi { powered: on });
            }

            Command::SetBluetooth(on) => {
                info!("bluetooth radio {}", if on { "on" } else { "off" });
                self.bluetooth
                    .set_powered(on)
                    .map_err(|e| DeckError::Radio(e.to_string()))?;
                self.emit(DeckEvent::Bluetooth { powered: on });
            }

            Command::OpenNetworkSettings => {
                info!("launching {}", self.launchers.network_settings);
                spawn_detached(&self.launchers.network_settings)?;
            }

            Command::OpenBluetoothSettings => {
                info!("launching {}", self.launchers.bluetooth_settings);
                spawn_detached(&self.launchers.bluetooth_settings)?;
            }
        }
        Ok(())
    }

    /// Re-run detection and rebuild the controller set.
    ///
    /// On success the new set fully replaces the old one; dropped
    /// controllers drain their queues first. On failure the old set stays
    /// in place and the error is returned for the caller to surface.
    fn refresh(&mut self) -> Result<(), DeckError> {
        let records = self.discovery.discover()?;

        // Old controllers go first: their workers finish pending writes
        // before new controllers can touch the same buses.
        self.controllers.clear();
        self.records = records;

        for record in &self.records {
            let Some(bus) = record.bus else {
                info!("{} has no I2C bus, listed but not controllable", record.name);
                continue;
            };
            let ctrl = MonitorController::new(
                record.index,
                record.name.as_str(),
                bus,
                Arc::clone(&self.backend),
            );
            if let Some(tx) = &self.events {
                let tx = tx.clone();
                ctrl.subscribe(move |event: MonitorEvent| {
                    let _ = tx.send(match event.feature {
                        VcpFeature::Brightness => DeckEvent::Brightness {
                            display: event.display,
                            value: event.value,
                        },
                        VcpFeature::Contrast => DeckEvent::Contrast {
                            display: event.display,
                            value: event.value,
                        },
                    });
                });
            }
            ctrl.initialize();
            self.controllers.push(ctrl);
        }

        self.emit(DeckEvent::Displays(self.records.clone()));
        self.poll_radios();
        Ok(())
    }

    /// Poll both radios and report their state.
    ///
    /// A failed poll is logged and skipped; radio state simply stays
    /// unknown to the UI until the next refresh.
    fn poll_radios(&self) {
        match self.wifi.is_powered() {
            Ok(powered) => self.emit(DeckEvent::Wifi { powered }),
            Err(e) => warn!("wifi state poll failed: {}", e),
        }
        match self.bluetooth.is_powered() {
            Ok(powered) => self.emit(DeckEvent::Bluetooth { powered }),
            Err(e) => warn!("bluetooth state poll failed: {}", e),
        }
    }

    fn controller(&self, display: u32) -> Result<&MonitorController, DeckError> {
        self.controllers
            .iter()
            .find(|c| c.index() == display)
            .ok_or(DeckError::UnknownDisplay(display))
    }

    fn emit(&self, event: DeckEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}
