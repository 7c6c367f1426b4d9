use serde::{Deserialize, Serialize};

/// Sensor type tag carried by every hardware sample.
///
/// Sources may multiplex several sensors over one delivery callback; only
/// gyroscope samples participate in orientation integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Gyroscope,
    Accelerometer,
    Magnetometer,
}

/// One timestamped angular-velocity reading from the hardware source.
///
/// Rates are radians/second about each device axis; the timestamp is a
/// monotonic clock in nanoseconds. Values are taken as-is, no range checks.
#[derive(Debug, Clone, Copy)]
pub struct GyroSample {
    pub kind: SensorKind,
    pub rate_x: f64,
    pub rate_y: f64,
    pub rate_z: f64,
    pub timestamp_ns: i64,
}

impl GyroSample {
    /// Convenience constructor for a gyroscope reading.
    pub fn gyro(rate_x: f64, rate_y: f64, rate_z: f64, timestamp_ns: i64) -> Self {
        Self {
            kind: SensorKind::Gyroscope,
            rate_x,
            rate_y,
            rate_z,
            timestamp_ns,
        }
    }
}

/// The current orientation estimate, degrees per axis.
///
/// This is the script-visible payload shape: the field names `x`, `y`, `z`
/// are part of the bridge protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Events published by the integrator on the application channel.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A sample was integrated; carries the post-update orientation.
    Change(Orientation),
    Subscription(SubscriptionStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Idle,
    Active,
    Closed,
}

/// Requested sampling cadence, mirroring the usual sensor-delay tiers.
///
/// The period is a hint to the source, not a guaranteed real-time rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleCadence {
    Fastest,
    Game,
    Ui,
    Normal,
}

impl SampleCadence {
    /// Nominal delivery period in microseconds.
    pub fn period_micros(&self) -> u64 {
        match self {
            Self::Fastest => 0,
            Self::Game => 20_000,
            Self::Ui => 66_667,
            Self::Normal => 200_000,
        }
    }
}

impl Default for SampleCadence {
    fn default() -> Self {
        Self::Game
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_serializes_with_xyz_field_names() {
        let o = Orientation {
            x: 1.5,
            y: -2.0,
            z: 0.0,
        };
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["x"], 1.5);
        assert_eq!(json["y"], -2.0);
        assert_eq!(json["z"], 0.0);
    }

    #[test]
    fn test_cadence_periods() {
        assert_eq!(SampleCadence::Game.period_micros(), 20_000);
        assert_eq!(SampleCadence::Fastest.period_micros(), 0);
        assert_eq!(SampleCadence::default(), SampleCadence::Game);
    }
}
