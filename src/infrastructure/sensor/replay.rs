//! Replay source: scripted angular rates played back on a worker thread.

use crate::domain::models::{GyroSample, SampleCadence};
use crate::infrastructure::sensor::source::{SampleHandler, SampleSource, SourceAvailability};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::debug;

struct Worker {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Plays a fixed sequence of `[x, y, z]` angular rates (rad/s) at the
/// subscribed cadence, stamping each sample from a synthetic monotonic
/// clock that advances by exactly one period per sample.
pub struct ReplaySource {
    rates: Vec<[f64; 3]>,
    loop_playback: bool,
    worker: Mutex<Option<Worker>>,
}

impl ReplaySource {
    pub fn new(rates: Vec<[f64; 3]>, loop_playback: bool) -> Self {
        Self {
            rates,
            loop_playback,
            worker: Mutex::new(None),
        }
    }

    /// Demo feed: a gentle constant spin about the z axis (10 deg/s).
    pub fn slow_spin() -> Self {
        Self::new(vec![[0.0, 0.0, 10.0_f64.to_radians()]], true)
    }
}

impl SampleSource for ReplaySource {
    fn subscribe(
        &self,
        handler: SampleHandler,
        cadence: SampleCadence,
    ) -> Result<SourceAvailability> {
        let mut worker = self.worker.lock().unwrap();
        if worker.is_some() {
            // Already delivering; registration is deduplicated here.
            return Ok(SourceAvailability::Available);
        }

        // Fastest would busy-spin a replay; clamp it to 1 ms.
        let period = Duration::from_micros(cadence.period_micros().max(1_000));
        let step_ns = period.as_nanos() as i64;
        let rates = self.rates.clone();
        let loop_playback = self.loop_playback;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = std::thread::spawn(move || {
            debug!(samples = rates.len(), ?period, "replay delivery started");
            let mut clock_ns: i64 = 0;
            let mut index = 0usize;
            while !stop_flag.load(Ordering::SeqCst) {
                if index >= rates.len() {
                    if !loop_playback {
                        break;
                    }
                    index = 0;
                }
                let [x, y, z] = rates[index];
                index += 1;
                handler(GyroSample::gyro(x, y, z, clock_ns));
                clock_ns += step_ns;
                std::thread::sleep(period);
            }
            debug!("replay delivery finished");
        });

        *worker = Some(Worker { stop, thread });
        Ok(SourceAvailability::Available)
    }

    fn unsubscribe(&self) {
        if let Some(worker) = self.worker.lock().unwrap().take() {
            worker.stop.store(true, Ordering::SeqCst);
            let _ = worker.thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_replay_delivers_scripted_sequence_then_stops() {
        let source = ReplaySource::new(vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], false);
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&received);
        source
            .subscribe(
                Arc::new(move |sample| {
                    sink.lock().unwrap().push(sample);
                }),
                SampleCadence::Fastest,
            )
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while received.lock().unwrap().len() < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        source.unsubscribe();

        let samples = received.lock().unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].rate_x, 1.0);
        assert_eq!(samples[2].rate_z, 1.0);
        // Synthetic clock advances by one period per sample.
        assert!(samples[1].timestamp_ns > samples[0].timestamp_ns);
    }

    #[test]
    fn test_unsubscribe_halts_looping_playback() {
        let source = ReplaySource::slow_spin();
        let count = Arc::new(Mutex::new(0usize));

        let sink = Arc::clone(&count);
        source
            .subscribe(
                Arc::new(move |_| {
                    *sink.lock().unwrap() += 1;
                }),
                SampleCadence::Fastest,
            )
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while *count.lock().unwrap() == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        source.unsubscribe();

        let frozen = *count.lock().unwrap();
        assert!(frozen > 0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(*count.lock().unwrap(), frozen);
    }
}
