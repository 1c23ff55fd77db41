//! Entry point for the **paneldeck** daemon.
//!
//! Spawns the configured [`CommandSource`](paneldeck::traits::CommandSource)s
//! on background threads, prints [`DeckEvent`](paneldeck::command::DeckEvent)s
//! as JSON lines on stdout, and processes incoming commands on the main
//! thread. The panel applet is expected to spawn this binary and hold its
//! stdin/stdout pipes; scripts can additionally drive the Unix socket.

use log::{error, info};
use paneldeck::command::{Command, DeckEvent};
use paneldeck::config::Config;
use paneldeck::ddcutil::Ddcutil;
use paneldeck::deck::Deck;
use paneldeck::ipc::{StdinSource, UnixSocketListener};
use paneldeck::radio::{BluetoothctlRadio, NmcliWifi};
use paneldeck::traits::CommandSource;
use std::io::Write;
use std::sync::{mpsc, Arc};

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/paneldeck.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/paneldeck`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("paneldeck")
}

/// Try to load the config from `$XDG_CONFIG_HOME/paneldeck/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    let config = load_config();

    let backend = Arc::new(Ddcutil::new(config.tools.ddcutil.clone()));
    let wifi = NmcliWifi::new(config.tools.nmcli.clone());
    let bluetooth = BluetoothctlRadio::new(config.tools.bluetoothctl.clone());
    let mut deck = Deck::new(backend, wifi, bluetooth, config.launchers.clone());

    let (event_tx, event_rx) = mpsc::channel::<DeckEvent>();
    deck.set_events(event_tx);
    spawn_event_printer(event_rx);

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx.clone());

    // Populate displays and radio state before the first UI interaction.
    let _ = cmd_tx.send(Command::Refresh);
    drop(cmd_tx);

    info!("paneldeck running");
    for cmd in cmd_rx {
        if let Err(e) = deck.handle(cmd) {
            error!("command error: {}", e);
        }
    }
    info!("all command sources closed, exiting");
}

//  Helpers

/// Emit every [`DeckEvent`] as one JSON line on stdout.
///
/// The printer stops when the UI side closes the pipe; the daemon keeps
/// running (socket clients may still issue commands).
fn spawn_event_printer(rx: mpsc::Receiver<DeckEvent>) {
    std::thread::spawn(move || {
        let stdout = std::io::stdout();
        for event in rx {
            match serde_json::to_string(&event) {
                Ok(line) => {
                    let mut out = stdout.lock();
                    if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
                        info!("stdout closed, event printer stopping");
                        return;
                    }
                }
                Err(e) => error!("event serialization failed: {}", e),
            }
        }
    });
}

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut source = StdinSource::new();
            if let Err(e) = source.run(tx) {
                error!("stdin source error: {}", e);
            }
        });
    }

    {
        let tx = tx.clone();
        let path = default_socket_path();
        std::thread::spawn(move || {
            let mut source = UnixSocketListener::new(&path);
            if let Err(e) = source.run(tx) {
                error!("socket listener error: {}", e);
            }
        });
    }

    drop(tx);
}
