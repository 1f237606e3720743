//! Hand-tracking providers, simulated (keyboard/mouse) or LeapMotion hardware.
//!
//! A provider delivers one [`HandSample`] per captured frame over an `mpsc`
//! channel.  Consumers go through [`TrackingSession`], which owns the
//! provider while gesture mode is on, releases it on every exit path and
//! keeps only the newest sample.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

use crate::landmarks::{HandLandmarkFrame, HandSample};

/// Simulated camera frame period.
const SIM_FRAME: Duration = Duration::from_millis(16);

// ════════════════════════════════════════════════════════════════════════════
// Errors and status
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("hand tracker failed to initialize: {0}")]
    Init(String),

    #[error("hand tracker is already capturing")]
    AlreadyRunning,

    #[error("could not spawn capture thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackingStatus {
    /// Gesture mode is off.
    Off,
    /// Capture started, no frame delivered yet.
    Waiting,
    /// Frames are arriving.
    Tracking,
    /// The provider could not be started (or died); gesture mode is off
    /// until the user enables it again.
    NotInitialized(String),
}

impl TrackingStatus {
    pub fn label(&self) -> String {
        match self {
            TrackingStatus::Off               => "gestures off".to_string(),
            TrackingStatus::Waiting           => "hand tracker not initialized yet".to_string(),
            TrackingStatus::Tracking          => "hand tracking".to_string(),
            TrackingStatus::NotInitialized(r) => format!("hand tracker not initialized: {}", r),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// A hand-tracking provider.
///
/// `start_capture` begins delivering samples on `tx` (on the provider's own
/// thread); `stop_capture` must release every resource it acquired and be
/// safe to call when not capturing.
pub trait HandTracker: Send {
    fn name(&self) -> &'static str;
    fn start_capture(&mut self, tx: Sender<HandSample>) -> Result<(), TrackingError>;
    fn stop_capture(&mut self);
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingSession
// ════════════════════════════════════════════════════════════════════════════

pub struct TrackingSession {
    tracker: Box<dyn HandTracker>,
    rx:      Option<Receiver<HandSample>>,
    status:  TrackingStatus,
}

impl TrackingSession {
    pub fn new(tracker: Box<dyn HandTracker>) -> Self {
        TrackingSession { tracker, rx: None, status: TrackingStatus::Off }
    }

    pub fn status(&self)     -> &TrackingStatus { &self.status }
    pub fn is_enabled(&self) -> bool            { self.rx.is_some() }
    pub fn tracker_name(&self) -> &'static str  { self.tracker.name() }

    /// Acquire the provider.  On failure the provider is released again and
    /// the status stays `NotInitialized` until the next attempt.
    pub fn enable(&mut self) {
        if self.rx.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        match self.tracker.start_capture(tx) {
            Ok(()) => {
                tracing::info!(tracker = self.tracker.name(), "hand tracking enabled");
                self.rx = Some(rx);
                self.status = TrackingStatus::Waiting;
            }
            Err(e) => {
                tracing::error!(tracker = self.tracker.name(), error = %e, "hand tracking failed to start");
                self.tracker.stop_capture();
                self.status = TrackingStatus::NotInitialized(e.to_string());
            }
        }
    }

    pub fn disable(&mut self) {
        if self.rx.take().is_some() {
            self.tracker.stop_capture();
            tracing::info!(tracker = self.tracker.name(), "hand tracking disabled");
        }
        self.status = TrackingStatus::Off;
    }

    pub fn toggle(&mut self) {
        if self.is_enabled() { self.disable() } else { self.enable() }
    }

    /// Drain pending samples and return the newest, or `None` if nothing
    /// arrived since the last call.
    pub fn latest(&mut self) -> Option<HandSample> {
        let rx = self.rx.as_ref()?;
        let mut newest = None;
        let hung_up = loop {
            match rx.try_recv() {
                Ok(sample) => newest = Some(sample),
                Err(TryRecvError::Empty)        => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        };

        if hung_up {
            tracing::warn!(tracker = self.tracker.name(), "hand tracker stopped delivering frames");
            self.rx = None;
            self.tracker.stop_capture();
            self.status = TrackingStatus::NotInitialized("provider stopped".to_string());
        } else if newest.is_some() {
            self.status = TrackingStatus::Tracking;
        }
        newest
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.disable();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandTracker — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the window that drives the simulated hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Palm moved to this normalized horizontal position.
    MoveTo(f32),
    /// Hand enters / leaves the camera view.
    ToggleHand,
    /// Pinch held or released.
    Pinch(bool),
}

#[derive(Clone, Copy, Debug)]
struct SimHand {
    in_view:  bool,
    palm_x:   f32,
    pinching: bool,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand { in_view: true, palm_x: 0.5, pinching: false }
    }
}

impl SimHand {
    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::MoveTo(x)   => self.palm_x = x.clamp(0.0, 1.0),
            SimInput::ToggleHand  => self.in_view = !self.in_view,
            SimInput::Pinch(held) => self.pinching = held,
        }
    }

    fn sample(&self) -> HandSample {
        if !self.in_view {
            None
        } else if self.pinching {
            Some(HandLandmarkFrame::pinching(self.palm_x))
        } else {
            Some(HandLandmarkFrame::open_hand(self.palm_x))
        }
    }
}

/// Synthesizes landmark frames from [`SimInput`]s on its own thread.
///
/// The input receiver moves into the capture thread while capturing and is
/// handed back when the thread is joined, so capture can be restarted.
pub struct SimHandTracker {
    input:  Option<Receiver<SimInput>>,
    stop:   Arc<AtomicBool>,
    thread: Option<JoinHandle<Receiver<SimInput>>>,
}

impl SimHandTracker {
    pub fn new(input: Receiver<SimInput>) -> Self {
        SimHandTracker {
            input:  Some(input),
            stop:   Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }
}

impl HandTracker for SimHandTracker {
    fn name(&self) -> &'static str { "simulated" }

    fn start_capture(&mut self, tx: Sender<HandSample>) -> Result<(), TrackingError> {
        let input = self.input.take().ok_or(TrackingError::AlreadyRunning)?;
        self.stop.store(false, Ordering::Relaxed);
        let stop = Arc::clone(&self.stop);

        // Builder::spawn consumes the closure even on failure, so the input
        // receiver is lost if the thread cannot start.
        let handle = thread::Builder::new()
            .name("sim-hand".into())
            .spawn(move || run_sim_capture(input, tx, stop))?;
        self.thread = Some(handle);
        Ok(())
    }

    fn stop_capture(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            match handle.join() {
                Ok(input) => self.input = Some(input),
                Err(_)    => tracing::error!("simulated hand thread panicked"),
            }
        }
    }
}

fn run_sim_capture(
    input: Receiver<SimInput>,
    tx:    Sender<HandSample>,
    stop:  Arc<AtomicBool>,
) -> Receiver<SimInput> {
    let mut hand = SimHand::default();
    while !stop.load(Ordering::Relaxed) {
        match input.recv_timeout(SIM_FRAME) {
            Ok(event) => {
                hand.apply(event);
                while let Ok(event) = input.try_recv() {
                    hand.apply(event);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        if tx.send(hand.sample()).is_err() {
            break;
        }
    }
    input
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandTracker — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hand tracker backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// The first tracked hand is mapped into the 21-landmark layout:
/// each digit contributes its proximal base, proximal end, intermediate end
/// and distal end; the wrist is the arm's distal joint.  Millimetres are
/// normalized over a 400 mm cube above the device, with y flipped so it
/// grows downward like camera coordinates.
///
/// `start_capture` returns as soon as the capture thread is running.  If
/// LeapC then fails to come up, the thread logs the error and drops its
/// sender, which the session reports as not initialized.
#[cfg(feature = "leap")]
pub struct LeapHandTracker {
    stop:   Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

#[cfg(feature = "leap")]
impl LeapHandTracker {
    pub fn new() -> Self {
        LeapHandTracker { stop: Arc::new(AtomicBool::new(false)), thread: None }
    }
}

#[cfg(feature = "leap")]
impl Default for LeapHandTracker {
    fn default() -> Self { Self::new() }
}

#[cfg(feature = "leap")]
impl HandTracker for LeapHandTracker {
    fn name(&self) -> &'static str { "leapmotion" }

    fn start_capture(&mut self, tx: Sender<HandSample>) -> Result<(), TrackingError> {
        if self.thread.is_some() {
            return Err(TrackingError::AlreadyRunning);
        }
        self.stop.store(false, Ordering::Relaxed);
        let stop = Arc::clone(&self.stop);

        let handle = thread::Builder::new()
            .name("leap-hand".into())
            .spawn(move || run_leap_capture(tx, stop))?;
        self.thread = Some(handle);
        Ok(())
    }

    fn stop_capture(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::error!("leap capture thread panicked");
            }
        }
    }
}

#[cfg(feature = "leap")]
fn run_leap_capture(tx: Sender<HandSample>, stop: Arc<AtomicBool>) {
    use leaprs::*;

    let mut connection = match Connection::create(ConnectionConfig::default()) {
        Ok(c)  => c,
        Err(e) => {
            tracing::error!(error = ?e, "LeapC connection could not be created");
            return;
        }
    };
    if let Err(e) = connection.open() {
        tracing::error!(error = ?e, "LeapC connection could not be opened");
        return;
    }
    tracing::info!("LeapC connection open");

    macro_rules! norm {
        ($v:expr) => {{
            let v = $v;
            crate::landmarks::HandLandmark::new(
                (v.x + 200.0) / 400.0,
                1.0 - (v.y - 80.0) / 400.0,
                v.z / 400.0,
            )
        }};
    }

    while !stop.load(Ordering::Relaxed) {
        let msg = match connection.poll(100) {
            Ok(m)  => m,
            Err(_) => continue,
        };

        if let Event::Tracking(frame) = msg.event() {
            let sample = frame.hands().next().and_then(|hand| {
                let mut points = vec![norm!(hand.arm().next_joint())];
                for digit in hand.digits() {
                    points.push(norm!(digit.proximal().prev_joint()));
                    points.push(norm!(digit.proximal().next_joint()));
                    points.push(norm!(digit.intermediate().next_joint()));
                    points.push(norm!(digit.distal().next_joint()));
                }
                HandLandmarkFrame::from_points(&points)
            });
            if tx.send(sample).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Provider that never comes up.
    struct BrokenTracker {
        stops: Arc<Mutex<u32>>,
    }

    impl HandTracker for BrokenTracker {
        fn name(&self) -> &'static str { "broken" }
        fn start_capture(&mut self, _tx: Sender<HandSample>) -> Result<(), TrackingError> {
            Err(TrackingError::Init("no camera".into()))
        }
        fn stop_capture(&mut self) {
            *self.stops.lock().unwrap() += 1;
        }
    }

    /// Provider that hands the sender to the test.
    struct ManualTracker {
        slot: Arc<Mutex<Option<Sender<HandSample>>>>,
    }

    impl HandTracker for ManualTracker {
        fn name(&self) -> &'static str { "manual" }
        fn start_capture(&mut self, tx: Sender<HandSample>) -> Result<(), TrackingError> {
            *self.slot.lock().unwrap() = Some(tx);
            Ok(())
        }
        fn stop_capture(&mut self) {
            self.slot.lock().unwrap().take();
        }
    }

    fn manual() -> (TrackingSession, Arc<Mutex<Option<Sender<HandSample>>>>) {
        let slot = Arc::new(Mutex::new(None));
        let session = TrackingSession::new(Box::new(ManualTracker { slot: Arc::clone(&slot) }));
        (session, slot)
    }

    #[test]
    fn failed_start_reports_not_initialized() {
        let stops = Arc::new(Mutex::new(0));
        let mut s = TrackingSession::new(Box::new(BrokenTracker { stops: Arc::clone(&stops) }));
        s.enable();
        assert!(!s.is_enabled());
        assert!(matches!(s.status(), TrackingStatus::NotInitialized(r) if r.contains("no camera")));
        assert_eq!(*stops.lock().unwrap(), 1, "resources released after failed init");

        // Stays reported until the next attempt, which is retried.
        assert!(s.latest().is_none());
        assert!(matches!(s.status(), TrackingStatus::NotInitialized(_)));
        s.enable();
        assert_eq!(*stops.lock().unwrap(), 2);
    }

    #[test]
    fn latest_value_wins() {
        let (mut s, slot) = manual();
        s.enable();
        assert_eq!(s.status(), &TrackingStatus::Waiting);
        assert!(s.latest().is_none());

        {
            let guard = slot.lock().unwrap();
            let tx = guard.as_ref().unwrap();
            tx.send(Some(HandLandmarkFrame::open_hand(0.1))).unwrap();
            tx.send(Some(HandLandmarkFrame::open_hand(0.9))).unwrap();
        }
        let newest = s.latest().unwrap().unwrap();
        assert_eq!(newest, HandLandmarkFrame::open_hand(0.9));
        assert_eq!(s.status(), &TrackingStatus::Tracking);
        assert!(s.latest().is_none());
    }

    #[test]
    fn disable_releases_provider() {
        let (mut s, slot) = manual();
        s.enable();
        assert!(slot.lock().unwrap().is_some());
        s.disable();
        assert!(slot.lock().unwrap().is_none());
        assert_eq!(s.status(), &TrackingStatus::Off);
    }

    #[test]
    fn drop_releases_provider() {
        let (mut s, slot) = manual();
        s.enable();
        drop(s);
        assert!(slot.lock().unwrap().is_none());
    }

    #[test]
    fn provider_hangup_is_reported() {
        let (mut s, slot) = manual();
        s.enable();
        slot.lock().unwrap().take();
        assert!(s.latest().is_none());
        assert!(!s.is_enabled());
        assert!(matches!(s.status(), TrackingStatus::NotInitialized(_)));
    }

    /// Provider whose capture thread starts but gives up before the first
    /// frame.
    struct DyingTracker {
        thread: Option<JoinHandle<()>>,
    }

    impl HandTracker for DyingTracker {
        fn name(&self) -> &'static str { "dying" }
        fn start_capture(&mut self, tx: Sender<HandSample>) -> Result<(), TrackingError> {
            self.thread = Some(thread::spawn(move || {
                thread::sleep(Duration::from_millis(300));
                drop(tx);
            }));
            Ok(())
        }
        fn stop_capture(&mut self) {
            if let Some(handle) = self.thread.take() {
                let _ = handle.join();
            }
        }
    }

    #[test]
    fn late_init_failure_is_reported_without_blocking() {
        let mut s = TrackingSession::new(Box::new(DyingTracker { thread: None }));
        let started = Instant::now();
        s.enable();
        assert!(started.elapsed() < Duration::from_millis(250));
        assert!(s.is_enabled());
        assert_eq!(s.status(), &TrackingStatus::Waiting);

        let deadline = Instant::now() + Duration::from_secs(2);
        while s.is_enabled() && Instant::now() < deadline {
            assert!(s.latest().is_none());
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!s.is_enabled());
        assert!(matches!(s.status(), TrackingStatus::NotInitialized(_)));

        // Retried on the next enable.
        s.enable();
        assert_eq!(s.status(), &TrackingStatus::Waiting);
    }

    fn wait_for(s: &mut TrackingSession, want: impl Fn(&HandSample) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if let Some(sample) = s.latest() {
                if want(&sample) {
                    return true;
                }
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn sim_tracker_follows_input_and_restarts() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let mut s = TrackingSession::new(Box::new(SimHandTracker::new(sim_rx)));
        s.enable();
        assert!(wait_for(&mut s, |h| h.is_some()));

        sim_tx.send(SimInput::Pinch(true)).unwrap();
        assert!(wait_for(&mut s, |h| *h == Some(HandLandmarkFrame::pinching(0.5))));

        sim_tx.send(SimInput::ToggleHand).unwrap();
        assert!(wait_for(&mut s, |h| h.is_none()));

        s.disable();
        s.enable();
        assert!(s.is_enabled(), "input receiver was handed back on stop");
        // Capture restarts with a fresh hand in view.
        sim_tx.send(SimInput::MoveTo(0.2)).unwrap();
        assert!(wait_for(&mut s, |h| *h == Some(HandLandmarkFrame::open_hand(0.2))));
    }
}
