//! Background tracker thread (`gazebrowse-tracker`).
//!
//! The thread connects a plugin, then polls it until the stop flag is set.
//! The frame loop talks to it only through channels and atomics:
//!   1. status channel: `TryingToConnect`, then `Connected` or `Disconnected`;
//!   2. bounded sample channel, drained completely at the start of a frame;
//!   3. `tracking` flag, refreshed every poll;
//!   4. request channel for calibration.
//! On shutdown the thread returns the tracker through its `JoinHandle`, and
//! only then is it disconnected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, sync_channel, Receiver, Sender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::models::input::Sample;
use crate::models::settings::TrackerSettings;
use crate::tracker::plugins::connect_first_available;
use crate::tracker::{EyeTracker, TrackerError, TrackerStatus};

pub enum TrackerRequest {
    Calibrate,
}

pub struct EyeInput {
    status_rx: Receiver<TrackerStatus>,
    samples_rx: Receiver<Sample>,
    requests_tx: Sender<TrackerRequest>,
    tracking: Arc<AtomicBool>,
    stop_flag: Arc<AtomicBool>,
    worker: Option<JoinHandle<Option<Box<dyn EyeTracker>>>>,
    status: TrackerStatus,
}

impl EyeInput {
    /// Connects the first available plugin of `settings.plugins`.
    pub fn start(settings: &TrackerSettings) -> std::io::Result<Self> {
        let settings_for_thread = settings.clone();
        Self::start_with(settings, move || connect_first_available(&settings_for_thread))
    }

    /// Like [`EyeInput::start`] with a custom connection step.
    pub fn start_with<F>(settings: &TrackerSettings, connect: F) -> std::io::Result<Self>
    where
        F: FnOnce() -> Result<Box<dyn EyeTracker>, TrackerError> + Send + 'static,
    {
        let (status_tx, status_rx) = channel();
        let (samples_tx, samples_rx) = sync_channel(settings.queue_capacity.max(1));
        let (requests_tx, requests_rx) = channel();
        let tracking = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::new(AtomicBool::new(false));

        let thread_tracking = tracking.clone();
        let thread_stop = stop_flag.clone();
        let max_samples = settings.max_samples_per_poll.max(1);
        let poll_interval = Duration::from_millis(settings.poll_interval_ms);

        let worker = std::thread::Builder::new()
            .name("gazebrowse-tracker".to_string())
            .spawn(move || {
                let _ = status_tx.send(TrackerStatus::TryingToConnect);
                let mut tracker = match connect() {
                    Ok(tracker) => tracker,
                    Err(err) => {
                        log::warn!("eye_input: {err}, continuing with mouse input");
                        let _ = status_tx.send(TrackerStatus::Disconnected);
                        return None;
                    }
                };
                let _ = status_tx.send(TrackerStatus::Connected);

                let mut dropped: u64 = 0;
                'poll: while !thread_stop.load(Ordering::Relaxed) {
                    while let Ok(request) = requests_rx.try_recv() {
                        match request {
                            TrackerRequest::Calibrate => match tracker.calibrate() {
                                Ok(()) => log::info!("eye_input: calibration done"),
                                Err(err) => log::warn!("eye_input: {err}"),
                            },
                        }
                    }

                    thread_tracking.store(tracker.is_tracking(), Ordering::Relaxed);
                    for sample in tracker.fetch_samples(max_samples) {
                        match samples_tx.try_send(sample) {
                            Ok(()) => {}
                            Err(TrySendError::Full(_)) => dropped += 1,
                            Err(TrySendError::Disconnected(_)) => break 'poll,
                        }
                    }

                    std::thread::sleep(poll_interval);
                }

                thread_tracking.store(false, Ordering::Relaxed);
                if dropped > 0 {
                    log::warn!("eye_input: dropped {dropped} samples, frame loop too slow");
                }
                Some(tracker)
            })?;

        Ok(Self {
            status_rx,
            samples_rx,
            requests_tx,
            tracking,
            stop_flag,
            worker: Some(worker),
            status: TrackerStatus::TryingToConnect,
        })
    }

    /// Latest status reported by the tracker thread.
    pub fn status(&mut self) -> TrackerStatus {
        while let Ok(status) = self.status_rx.try_recv() {
            if status != self.status {
                log::info!("eye_input: tracker status {:?}", status);
            }
            self.status = status;
        }
        self.status
    }

    pub fn is_connected(&mut self) -> bool {
        self.status() == TrackerStatus::Connected
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.load(Ordering::Relaxed)
    }

    /// Every sample queued since the last call.
    pub fn drain_samples(&mut self) -> Vec<Sample> {
        self.samples_rx.try_iter().collect()
    }

    /// Returns `false` when the tracker thread is gone.
    pub fn calibrate(&self) -> bool {
        self.requests_tx.send(TrackerRequest::Calibrate).is_ok()
    }

    /// Stops the thread and disconnects the tracker it hands back.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.stop_flag.store(true, Ordering::Relaxed);
        match worker.join() {
            Ok(Some(mut tracker)) => {
                tracker.disconnect();
                log::info!("eye_input: {} tracker disconnected", tracker.name());
            }
            Ok(None) => {}
            Err(_) => log::error!("eye_input: tracker thread panicked"),
        }
        while self.status_rx.try_recv().is_ok() {}
        self.tracking.store(false, Ordering::Relaxed);
        self.status = TrackerStatus::Disconnected;
    }
}

impl Drop for EyeInput {
    fn drop(&mut self) {
        self.shutdown();
    }
}
