//! Orientation Integrator
//!
//! Dead-reckons gyroscope angular-velocity samples into a running 3-axis
//! orientation estimate, answers snapshot queries, and publishes a change
//! event for every integrated sample.

use crate::domain::models::{
    AppEvent, GyroSample, Orientation, SampleCadence, SensorKind, SubscriptionStatus,
};
use crate::infrastructure::sensor::{SampleHandler, SampleSource, SourceAvailability};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

#[derive(Debug, Error)]
pub enum IntegratorError {
    #[error("integrator has been disposed")]
    Disposed,
    #[error("sensor subscription failed: {0}")]
    Subscription(anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Active,
    Closed,
}

/// Accumulated integration state. Mutated only by the sample handler, always
/// under the one state mutex.
#[derive(Debug, Default)]
struct OrientationState {
    angle_x: f64,
    angle_y: f64,
    angle_z: f64,
    last_sample_time_ns: Option<i64>,
}

impl OrientationState {
    /// Integrate one sample into the running angles.
    ///
    /// The first sample only seeds the time base and returns `None`. Every
    /// later sample accumulates `rate * dt` per axis (converted to degrees)
    /// and returns the post-update orientation.
    ///
    /// Boundary policy: crossing +180 subtracts a half turn, crossing -180
    /// adds one. The check runs once per update and is not renormalizing, so
    /// a single enormous step can land outside (-180, 180]. Timestamps are
    /// not required to be monotonic; a duplicate integrates nothing and a
    /// backward step integrates a negative delta.
    fn integrate(&mut self, sample: &GyroSample) -> Option<Orientation> {
        let Some(last) = self.last_sample_time_ns else {
            self.last_sample_time_ns = Some(sample.timestamp_ns);
            return None;
        };

        let dt = (sample.timestamp_ns - last) as f64 / NANOS_PER_SEC;
        self.angle_x = wrap_half_turn(self.angle_x + (sample.rate_x * dt).to_degrees());
        self.angle_y = wrap_half_turn(self.angle_y + (sample.rate_y * dt).to_degrees());
        self.angle_z = wrap_half_turn(self.angle_z + (sample.rate_z * dt).to_degrees());
        self.last_sample_time_ns = Some(sample.timestamp_ns);

        Some(self.orientation())
    }

    fn orientation(&self) -> Orientation {
        Orientation {
            x: self.angle_x,
            y: self.angle_y,
            z: self.angle_z,
        }
    }
}

fn wrap_half_turn(mut angle: f64) -> f64 {
    if angle > 180.0 {
        angle -= 180.0;
    }
    if angle < -180.0 {
        angle += 180.0;
    }
    angle
}

/// The single orientation estimator for the process.
///
/// Constructed explicitly with an injected [`SampleSource`] and an event
/// sender; there is no global instance. `start`/`stop`/`snapshot` are
/// synchronous and safe to call from any thread concurrently with sample
/// delivery.
pub struct OrientationIntegrator {
    state: Arc<Mutex<OrientationState>>,
    phase: Mutex<Phase>,
    // Gate checked by the sample handler. Kept separate from `phase` so a
    // source that keeps delivering after unsubscribe() cannot mutate state.
    accepting: Arc<AtomicBool>,
    source: Box<dyn SampleSource>,
    events: mpsc::UnboundedSender<AppEvent>,
    cadence: SampleCadence,
}

impl OrientationIntegrator {
    pub fn new(
        source: Box<dyn SampleSource>,
        cadence: SampleCadence,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(OrientationState::default())),
            phase: Mutex::new(Phase::Idle),
            accepting: Arc::new(AtomicBool::new(false)),
            source,
            events,
            cadence,
        }
    }

    /// Subscribe to the sample stream and begin integrating.
    ///
    /// No-op when already active. If the device has no gyroscope the
    /// integrator stays idle and the call still succeeds; a later `start()`
    /// retries registration. Fails only after `dispose()`.
    pub fn start(&self) -> Result<(), IntegratorError> {
        let mut phase = self.phase.lock().unwrap();
        match *phase {
            Phase::Closed => Err(IntegratorError::Disposed),
            Phase::Active => {
                debug!("start() while already subscribed, ignoring");
                Ok(())
            }
            Phase::Idle => {
                // Open the gate before subscribing: a source may deliver the
                // first sample from inside subscribe().
                self.accepting.store(true, Ordering::SeqCst);
                match self.source.subscribe(self.sample_handler(), self.cadence) {
                    Ok(SourceAvailability::Available) => {
                        *phase = Phase::Active;
                        info!(cadence = ?self.cadence, "gyroscope subscription active");
                        let _ = self
                            .events
                            .send(AppEvent::Subscription(SubscriptionStatus::Active));
                        Ok(())
                    }
                    Ok(SourceAvailability::Absent) => {
                        self.accepting.store(false, Ordering::SeqCst);
                        info!("no gyroscope on this device, integrator stays idle");
                        Ok(())
                    }
                    Err(e) => {
                        self.accepting.store(false, Ordering::SeqCst);
                        Err(IntegratorError::Subscription(e))
                    }
                }
            }
        }
    }

    /// Unsubscribe from the sample stream, freezing the current estimate.
    /// Safe to call when not subscribed.
    pub fn stop(&self) {
        let mut phase = self.phase.lock().unwrap();
        if *phase != Phase::Active {
            return;
        }
        self.accepting.store(false, Ordering::SeqCst);
        self.source.unsubscribe();
        *phase = Phase::Idle;
        info!("gyroscope subscription stopped");
        let _ = self
            .events
            .send(AppEvent::Subscription(SubscriptionStatus::Idle));
    }

    /// Point-in-time read of the current estimate, in degrees. Works in any
    /// phase; before the first integrated sample it returns the zero triple.
    pub fn snapshot(&self) -> Orientation {
        self.state.lock().unwrap().orientation()
    }

    /// Tear down: force unsubscription and refuse further `start()` calls.
    /// Idempotent; `snapshot()` keeps returning the frozen state.
    pub fn dispose(&self) {
        let mut phase = self.phase.lock().unwrap();
        if *phase == Phase::Closed {
            return;
        }
        self.accepting.store(false, Ordering::SeqCst);
        if *phase == Phase::Active {
            self.source.unsubscribe();
        }
        *phase = Phase::Closed;
        info!("orientation integrator disposed");
        let _ = self
            .events
            .send(AppEvent::Subscription(SubscriptionStatus::Closed));
    }

    fn sample_handler(&self) -> SampleHandler {
        let state = Arc::clone(&self.state);
        let accepting = Arc::clone(&self.accepting);
        let events = self.events.clone();
        Arc::new(move |sample: GyroSample| {
            if sample.kind != SensorKind::Gyroscope {
                return;
            }
            if !accepting.load(Ordering::SeqCst) {
                return;
            }
            let updated = state.lock().unwrap().integrate(&sample);
            if let Some(orientation) = updated {
                // Fire-and-forget: nobody listening is fine.
                let _ = events.send(AppEvent::Change(orientation));
            }
        })
    }
}

impl Drop for OrientationIntegrator {
    fn drop(&mut self) {
        self.dispose();
    }
}
