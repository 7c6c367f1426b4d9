//! Gyroscope bridge: integrates a device's angular-velocity stream into a
//! wrapped 3-axis orientation estimate and exposes it to script callers over
//! a request/response and event surface.
//!
//! The core lives in [`domain::integrator`]; hardware delivery and the
//! script-facing socket surface live under [`infrastructure`].

pub mod domain;
pub mod infrastructure;

pub use domain::integrator::{IntegratorError, OrientationIntegrator};
pub use domain::models::{AppEvent, GyroSample, Orientation, SampleCadence};
