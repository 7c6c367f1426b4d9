//! Sensor Source Module
//!
//! The hardware seam for angular-velocity delivery.
//!
//! A [`SampleSource`] owns the delivery context (hardware callback thread,
//! replay thread, test harness) and pushes [`crate::domain::models::GyroSample`]s
//! into a subscribed handler. The integrator never polls; it installs a
//! handler on `subscribe` and forgets about the source until `unsubscribe`.
//!
//! ## Implementations
//!
//! - [`NullSource`] - device without a gyroscope; reports the capability absent
//! - [`ManualSource`] - synchronous synthetic source for tests and harnesses
//! - [`ReplaySource`] - plays a scripted rate sequence on a background thread

pub mod replay;
pub mod source;

pub use replay::ReplaySource;
pub use source::{ManualSource, NullSource, SampleHandler, SampleSource, SourceAvailability};
