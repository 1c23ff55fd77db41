//! Per-monitor state cache and serialized hardware access.
//!
//! One [`MonitorController`] exists per controllable display. It decouples
//! *visual responsiveness* from *hardware synchronization*: setters update
//! the cached state and notify observers synchronously, so the UI tracks the
//! user immediately, and the actual `setvcp` invocation is queued to a
//! dedicated worker thread that executes jobs strictly in submission order.
//!
//! The worker is the serialization mechanism. DDC/CI over I2C is not safe
//! for concurrent access, and a slider drag can emit values faster than the
//! tool round-trips, so at most one external invocation per monitor is in
//! flight at any time. Queues of different controllers are independent and
//! interleave freely.
//!
//! There is no cancellation: a queued write always runs, even when a later
//! value has superseded it (last write wins on the hardware).

use crate::display::VcpFeature;
use crate::traits::DdcBackend;
use log::{debug, warn};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

/// Cached brightness/contrast of one monitor, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorState {
    pub brightness: u8,
    pub contrast: u8,
}

impl Default for MonitorState {
    /// Mid-scale placeholder shown until the first successful read.
    fn default() -> Self {
        Self {
            brightness: 50,
            contrast: 50,
        }
    }
}

impl MonitorState {
    fn set(&mut self, feature: VcpFeature, value: u8) {
        match feature {
            VcpFeature::Brightness => self.brightness = value,
            VcpFeature::Contrast => self.contrast = value,
        }
    }
}

/// A cached-state change, delivered to observers.
///
/// Fires both for optimistic updates (a setter was called; the hardware
/// write is still queued) and for confirmed values read back from the
/// monitor during [`MonitorController::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorEvent {
    /// Detection index of the monitor.
    pub display: u32,
    pub feature: VcpFeature,
    pub value: u8,
}

type Observer = Box<dyn Fn(MonitorEvent) + Send + 'static>;

/// Jobs executed by the controller's worker thread, in submission order.
enum Job {
    /// Read brightness and contrast back from the hardware.
    Refresh,
    /// Write one feature value to the hardware.
    Write(VcpFeature, u8),
}

/// Owns the cached state and the write queue for a single monitor.
///
/// Created from a [`DisplayRecord`](crate::display::DisplayRecord) that has
/// a bus. The backend moves into the worker thread, so the controller itself
/// is not generic. Dropping the controller closes the queue and joins the
/// worker, so every job submitted before the drop still runs and no job
/// runs after.
pub struct MonitorController {
    index: u32,
    name: String,
    bus: u8,
    state: Arc<Mutex<MonitorState>>,
    observers: Arc<Mutex<Vec<Observer>>>,
    jobs: Option<mpsc::Sender<Job>>,
    worker: Option<thread::JoinHandle<()>>,
}

/// Invoke every registered observer with `event`.
fn notify(observers: &Mutex<Vec<Observer>>, event: MonitorEvent) {
    for observer in observers.lock().unwrap().iter() {
        observer(event);
    }
}

impl MonitorController {
    /// Create a controller for the monitor at `bus` and start its worker.
    ///
    /// The cache starts at the placeholder values; call
    /// [`initialize`](Self::initialize) to bring in the hardware's actual
    /// state.
    pub fn new<B: DdcBackend + Send + Sync + 'static>(
        index: u32,
        name: impl Into<String>,
        bus: u8,
        backend: Arc<B>,
    ) -> Self {
        let name = name.into();
        let state = Arc::new(Mutex::new(MonitorState::default()));
        let observers: Arc<Mutex<Vec<Observer>>> = Arc::new(Mutex::new(Vec::new()));
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();

        let worker = {
            let state = Arc::clone(&state);
            let observers = Arc::clone(&observers);
            let name = name.clone();
            thread::spawn(move || {
                for job in jobs_rx {
                    match job {
                        Job::Refresh => {
                            for feature in [VcpFeature::Brightness, VcpFeature::Contrast] {
                                match backend.get_vcp(bus, feature) {
                                    Ok(value) => {
                                        state.lock().unwrap().set(feature, value);
                                        notify(
                                            &observers,
                                            MonitorEvent {
                                                display: index,
                                                feature,
                                                value,
                                            },
                                        );
                                    }
                                    // Some monitors expose only one of the
                                    // two features; keep the cached value.
                                    Err(e) => warn!(
                                        "{} (bus {}): reading {} failed: {}",
                                        name, bus, feature, e
                                    ),
                                }
                            }
                        }
                        Job::Write(feature, value) => {
                            debug!("{} (bus {}): {} := {}", name, bus, feature, value);
                            if let Err(e) = backend.set_vcp(bus, feature, value) {
                                // Best-effort: the optimistic cache is not
                                // rolled back and later writes still run.
                                warn!(
                                    "{} (bus {}): writing {}={} failed: {}",
                                    name, bus, feature, value, e
                                );
                            }
                        }
                    }
                }
            })
        };

        Self {
            index,
            name,
            bus,
            state,
            observers,
            jobs: Some(jobs_tx),
            worker: Some(worker),
        }
    }

    /// Detection index of the monitor this controller drives.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Human-readable label from the detection pass.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// I2C bus this controller is bound to.
    pub fn bus(&self) -> u8 {
        self.bus
    }

    /// Snapshot of the cached state.
    pub fn state(&self) -> MonitorState {
        *self.state.lock().unwrap()
    }

    /// Register an observer for cached-state changes.
    ///
    /// Setter-driven notifications arrive synchronously on the calling
    /// thread; read-back notifications arrive on the worker thread.
    pub fn subscribe(&self, observer: impl Fn(MonitorEvent) + Send + 'static) {
        self.observers.lock().unwrap().push(Box::new(observer));
    }

    /// Queue a read-back of brightness and contrast.
    ///
    /// Never fails: a monitor that rejects a read keeps its cached
    /// (placeholder or previous) value, and the failure is only logged.
    pub fn initialize(&self) {
        self.submit(Job::Refresh);
    }

    /// Set brightness to `value`, clamped to [0, 100].
    ///
    /// The cache and observers see the new value before this returns; the
    /// hardware write happens later, in submission order.
    pub fn set_brightness(&self, value: i32) {
        self.set_feature(VcpFeature::Brightness, value);
    }

    /// Set contrast to `value`, clamped to [0, 100].
    pub fn set_contrast(&self, value: i32) {
        self.set_feature(VcpFeature::Contrast, value);
    }

    fn set_feature(&self, feature: VcpFeature, value: i32) {
        let value = value.clamp(0, 100) as u8;
        self.state.lock().unwrap().set(feature, value);
        notify(
            &self.observers,
            MonitorEvent {
                display: self.index,
                feature,
                value,
            },
        );
        self.submit(Job::Write(feature, value));
    }

    fn submit(&self, job: Job) {
        if let Some(jobs) = &self.jobs {
            // The receiver lives as long as the worker; a send can only fail
            // mid-drop, where losing the job is fine.
            let _ = jobs.send(job);
        }
    }
}

impl Drop for MonitorController {
    /// Close the queue and wait for the worker to drain it.
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Recording backend; `gate` (when present) blocks each write until the
    /// test sends a permit, so tests can observe the queue before it drains.
    struct MockDdc {
        values: Mutex<HashMap<(u8, VcpFeature), u8>>,
        writes: Mutex<Vec<(u8, VcpFeature, u8)>>,
        gate: Option<Mutex<mpsc::Receiver<()>>>,
        fail_writes: bool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("mock failure")]
    struct MockError;

    impl MockDdc {
        fn new() -> Self {
            Self {
                values: Mutex::new(HashMap::new()),
                writes: Mutex::new(Vec::new()),
                gate: None,
                fail_writes: false,
            }
        }

        fn with_values(values: &[(u8, VcpFeature, u8)]) -> Self {
            let mock = Self::new();
            for (bus, feature, value) in values {
                mock.values.lock().unwrap().insert((*bus, *feature), *value);
            }
            mock
        }

        fn gated() -> (Self, mpsc::Sender<()>) {
            let (tx, rx) = mpsc::channel();
            let mut mock = Self::new();
            mock.gate = Some(Mutex::new(rx));
            (mock, tx)
        }

        fn writes(&self) -> Vec<(u8, VcpFeature, u8)> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl DdcBackend for MockDdc {
        type Error = MockError;

        fn detect(&self) -> Result<String, MockError> {
            Ok(String::new())
        }

        fn get_vcp(&self, bus: u8, feature: VcpFeature) -> Result<u8, MockError> {
            self.values
                .lock()
                .unwrap()
                .get(&(bus, feature))
                .copied()
                .ok_or(MockError)
        }

        fn set_vcp(&self, bus: u8, feature: VcpFeature, value: u8) -> Result<(), MockError> {
            if let Some(gate) = &self.gate {
                let _ = gate.lock().unwrap().recv();
            }
            self.writes.lock().unwrap().push((bus, feature, value));
            if self.fail_writes {
                return Err(MockError);
            }
            Ok(())
        }
    }

    fn controller(backend: Arc<MockDdc>) -> MonitorController {
        MonitorController::new(1, "DELL U2720Q", 7, backend)
    }

    #[test]
    fn setters_clamp_to_percent_range() {
        let backend = Arc::new(MockDdc::new());
        let ctrl = controller(Arc::clone(&backend));

        ctrl.set_brightness(150);
        assert_eq!(ctrl.state().brightness, 100);

        ctrl.set_brightness(-10);
        assert_eq!(ctrl.state().brightness, 0);

        ctrl.set_contrast(101);
        assert_eq!(ctrl.state().contrast, 100);

        drop(ctrl);
        assert_eq!(
            backend.writes(),
            vec![
                (7, VcpFeature::Brightness, 100),
                (7, VcpFeature::Brightness, 0),
                (7, VcpFeature::Contrast, 100),
            ]
        );
    }

    #[test]
    fn cache_and_observers_update_before_any_external_write() {
        let (mock, gate) = MockDdc::gated();
        let backend = Arc::new(mock);
        let ctrl = controller(Arc::clone(&backend));

        let (events_tx, events_rx) = mpsc::channel();
        ctrl.subscribe(move |event| {
            let _ = events_tx.send(event);
        });

        ctrl.set_brightness(70);

        // Synchronous effects, observable immediately on this thread.
        assert_eq!(ctrl.state().brightness, 70);
        assert_eq!(
            events_rx.try_recv().unwrap(),
            MonitorEvent {
                display: 1,
                feature: VcpFeature::Brightness,
                value: 70,
            }
        );
        // The external write is still gated.
        assert!(backend.writes().is_empty());

        gate.send(()).unwrap();
        drop(ctrl);
        assert_eq!(backend.writes(), vec![(7, VcpFeature::Brightness, 70)]);
    }

    #[test]
    fn rapid_writes_execute_in_submission_order() {
        let (mock, gate) = MockDdc::gated();
        let backend = Arc::new(mock);
        let ctrl = controller(Arc::clone(&backend));

        // Both submitted while the first is still gated: the queue, not
        // timing, decides the order.
        ctrl.set_brightness(30);
        ctrl.set_brightness(70);
        assert!(backend.writes().is_empty());
        assert_eq!(ctrl.state().brightness, 70);

        gate.send(()).unwrap();
        gate.send(()).unwrap();
        drop(ctrl);

        assert_eq!(
            backend.writes(),
            vec![
                (7, VcpFeature::Brightness, 30),
                (7, VcpFeature::Brightness, 70),
            ]
        );
    }

    #[test]
    fn brightness_and_contrast_share_one_queue() {
        let backend = Arc::new(MockDdc::new());
        let ctrl = controller(Arc::clone(&backend));

        ctrl.set_brightness(10);
        ctrl.set_contrast(20);
        ctrl.set_brightness(30);
        drop(ctrl);

        assert_eq!(
            backend.writes(),
            vec![
                (7, VcpFeature::Brightness, 10),
                (7, VcpFeature::Contrast, 20),
                (7, VcpFeature::Brightness, 30),
            ]
        );
    }

    #[test]
    fn initialize_reads_both_features() {
        let backend = Arc::new(MockDdc::with_values(&[
            (7, VcpFeature::Brightness, 62),
            (7, VcpFeature::Contrast, 40),
        ]));
        let ctrl = controller(backend);

        let (events_tx, events_rx) = mpsc::channel();
        ctrl.subscribe(move |event| {
            let _ = events_tx.send(event);
        });

        ctrl.initialize();

        let first = events_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        let second = events_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(first.feature, VcpFeature::Brightness);
        assert_eq!(first.value, 62);
        assert_eq!(second.feature, VcpFeature::Contrast);
        assert_eq!(second.value, 40);
        assert_eq!(
            ctrl.state(),
            MonitorState {
                brightness: 62,
                contrast: 40,
            }
        );
    }

    #[test]
    fn failing_read_keeps_cached_value() {
        // Contrast is missing: the monitor only supports brightness.
        let backend = Arc::new(MockDdc::with_values(&[(7, VcpFeature::Brightness, 42)]));
        let ctrl = controller(backend);

        let (events_tx, events_rx) = mpsc::channel();
        ctrl.subscribe(move |event| {
            let _ = events_tx.send(event);
        });

        ctrl.initialize();

        let event = events_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(event.feature, VcpFeature::Brightness);
        assert_eq!(event.value, 42);

        // The contrast read has already failed by now (the worker processes
        // both reads in one job); give it a moment anyway.
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(ctrl.state().contrast, 50);
        assert!(events_rx.try_recv().is_err());
    }

    #[test]
    fn failed_write_does_not_block_later_writes() {
        let mut mock = MockDdc::new();
        mock.fail_writes = true;
        let backend = Arc::new(mock);
        let ctrl = controller(Arc::clone(&backend));

        ctrl.set_brightness(30);
        ctrl.set_brightness(70);
        assert_eq!(ctrl.state().brightness, 70);
        drop(ctrl);

        // Both writes were attempted despite each failing, and the
        // optimistic cache was never rolled back.
        assert_eq!(
            backend.writes(),
            vec![
                (7, VcpFeature::Brightness, 30),
                (7, VcpFeature::Brightness, 70),
            ]
        );
    }

    #[test]
    fn drop_drains_pending_writes() {
        let backend = Arc::new(MockDdc::new());
        let ctrl = controller(Arc::clone(&backend));

        for value in [10, 20, 30, 40, 50] {
            ctrl.set_brightness(value);
        }
        drop(ctrl);

        assert_eq!(backend.writes().len(), 5);
    }

    #[test]
    fn controllers_expose_their_identity() {
        let backend = Arc::new(MockDdc::new());
        let ctrl = controller(backend);
        assert_eq!(ctrl.index(), 1);
        assert_eq!(ctrl.name(), "DELL U2720Q");
        assert_eq!(ctrl.bus(), 7);
    }
}
