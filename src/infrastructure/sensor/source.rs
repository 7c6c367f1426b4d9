//! Sample source trait and the basic implementations.

use crate::domain::models::{GyroSample, SampleCadence};
use anyhow::Result;
use std::sync::{Arc, Mutex};

/// Callback a source invokes for every delivered sample.
///
/// Sources deliver from their own thread; handlers must be cheap and must
/// synchronize any state they touch.
pub type SampleHandler = Arc<dyn Fn(GyroSample) + Send + Sync>;

/// Whether a physical sensor backs the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceAvailability {
    Available,
    Absent,
}

/// A feed of angular-velocity samples, hardware or synthetic.
///
/// `subscribe` installs the handler and begins delivery at roughly the
/// requested cadence (a hint, not a real-time guarantee). `unsubscribe`
/// stops delivery and is safe to call when nothing is subscribed.
pub trait SampleSource: Send + Sync {
    fn subscribe(
        &self,
        handler: SampleHandler,
        cadence: SampleCadence,
    ) -> Result<SourceAvailability>;

    fn unsubscribe(&self);
}

/// Source for devices without a gyroscope. `subscribe` reports the
/// capability absent and never delivers a sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSource;

impl SampleSource for NullSource {
    fn subscribe(
        &self,
        _handler: SampleHandler,
        _cadence: SampleCadence,
    ) -> Result<SourceAvailability> {
        Ok(SourceAvailability::Absent)
    }

    fn unsubscribe(&self) {}
}

/// Synthetic source driven by explicit [`ManualSource::emit`] calls.
///
/// Clones share one handler slot, so a test keeps a clone for emitting and
/// hands the other to the integrator.
#[derive(Clone, Default)]
pub struct ManualSource {
    handler: Arc<Mutex<Option<SampleHandler>>>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one sample synchronously to the subscribed handler, if any.
    pub fn emit(&self, sample: GyroSample) {
        let handler = self.handler.lock().unwrap().clone();
        if let Some(handler) = handler {
            handler(sample);
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.handler.lock().unwrap().is_some()
    }
}

impl SampleSource for ManualSource {
    fn subscribe(
        &self,
        handler: SampleHandler,
        _cadence: SampleCadence,
    ) -> Result<SourceAvailability> {
        *self.handler.lock().unwrap() = Some(handler);
        Ok(SourceAvailability::Available)
    }

    fn unsubscribe(&self) {
        self.handler.lock().unwrap().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_null_source_reports_absent() {
        let source = NullSource;
        let availability = source
            .subscribe(Arc::new(|_| {}), SampleCadence::Game)
            .unwrap();
        assert_eq!(availability, SourceAvailability::Absent);
        source.unsubscribe();
    }

    #[test]
    fn test_manual_source_delivers_only_while_subscribed() {
        let source = ManualSource::new();
        let count = Arc::new(AtomicUsize::new(0));

        // Emitting with no subscriber is a no-op.
        source.emit(GyroSample::gyro(1.0, 2.0, 3.0, 0));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        let counter = Arc::clone(&count);
        source
            .subscribe(
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
                SampleCadence::Game,
            )
            .unwrap();
        assert!(source.is_subscribed());

        source.emit(GyroSample::gyro(1.0, 2.0, 3.0, 1));
        source.emit(GyroSample::gyro(1.0, 2.0, 3.0, 2));
        assert_eq!(count.load(Ordering::SeqCst), 2);

        source.unsubscribe();
        assert!(!source.is_subscribed());
        source.emit(GyroSample::gyro(1.0, 2.0, 3.0, 3));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
