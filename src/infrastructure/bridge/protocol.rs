//! Bridge wire types and the method dispatch table.

use crate::domain::integrator::OrientationIntegrator;
use crate::domain::models::Orientation;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Event name used for orientation-change pushes.
pub const CHANGE_EVENT: &str = "change";

/// One script request. Wire shape: `{"method": "getGyroData"}` etc.; the
/// method names are fixed API surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum BridgeRequest {
    GetGyroData,
    Start,
    Stop,
}

/// Reply to one request: a result payload or an error string.
///
/// `result` is always present on the wire (`null` for `start`/`stop`) so
/// script callers can key on it unconditionally; `error` appears only on
/// failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeReply {
    pub result: Option<Orientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeReply {
    pub fn ok(result: Orientation) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Pushed to every connected peer when a sample is integrated:
/// `{"event":"change","x":...,"y":...,"z":...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub event: String,
    #[serde(flatten)]
    pub data: Orientation,
}

impl ChangeEvent {
    pub fn new(data: Orientation) -> Self {
        Self {
            event: CHANGE_EVENT.to_string(),
            data,
        }
    }
}

/// Map one request onto the integrator. Pure request -> reply, no I/O, so
/// the method table is testable without a socket.
pub fn dispatch(request: BridgeRequest, integrator: &OrientationIntegrator) -> BridgeReply {
    debug!(?request, "bridge request");
    match request {
        BridgeRequest::GetGyroData => BridgeReply::ok(integrator.snapshot()),
        BridgeRequest::Start => match integrator.start() {
            Ok(()) => BridgeReply::empty(),
            Err(e) => BridgeReply::err(e.to_string()),
        },
        BridgeRequest::Stop => {
            integrator.stop();
            BridgeReply::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AppEvent, GyroSample, SampleCadence};
    use crate::infrastructure::sensor::{ManualSource, NullSource, SampleSource};
    use std::f64::consts::FRAC_PI_2;
    use tokio::sync::mpsc;

    fn build(
        source: impl SampleSource + 'static,
    ) -> (OrientationIntegrator, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            OrientationIntegrator::new(Box::new(source), SampleCadence::Game, tx),
            rx,
        )
    }

    #[test]
    fn test_request_method_names_are_exact() {
        let json = serde_json::to_value(BridgeRequest::GetGyroData).unwrap();
        assert_eq!(json["method"], "getGyroData");
        assert_eq!(
            serde_json::to_value(BridgeRequest::Start).unwrap()["method"],
            "start"
        );
        assert_eq!(
            serde_json::to_value(BridgeRequest::Stop).unwrap()["method"],
            "stop"
        );

        let parsed: BridgeRequest = serde_json::from_str(r#"{"method":"getGyroData"}"#).unwrap();
        assert!(matches!(parsed, BridgeRequest::GetGyroData));
    }

    #[test]
    fn test_unknown_method_fails_to_parse() {
        assert!(serde_json::from_str::<BridgeRequest>(r#"{"method":"selfDestruct"}"#).is_err());
    }

    #[test]
    fn test_get_gyro_data_returns_snapshot() {
        let source = ManualSource::new();
        let (integrator, _rx) = build(source.clone());

        let reply = dispatch(BridgeRequest::Start, &integrator);
        assert!(reply.error.is_none());

        source.emit(GyroSample::gyro(FRAC_PI_2, 0.0, 0.0, 0));
        source.emit(GyroSample::gyro(FRAC_PI_2, 0.0, 0.0, 1_000_000_000));

        let reply = dispatch(BridgeRequest::GetGyroData, &integrator);
        let result = reply.result.unwrap();
        assert!((result.x - 90.0).abs() < 1e-9);

        let json = serde_json::to_value(&reply).unwrap();
        assert!(json["result"]["x"].is_f64());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_start_and_stop_reply_with_null_result() {
        let (integrator, _rx) = build(NullSource);

        let reply = dispatch(BridgeRequest::Start, &integrator);
        let json = serde_json::to_value(&reply).unwrap();
        assert!(json["result"].is_null());

        let reply = dispatch(BridgeRequest::Stop, &integrator);
        assert!(reply.result.is_none() && reply.error.is_none());
    }

    #[test]
    fn test_start_after_dispose_maps_to_error_reply() {
        let (integrator, _rx) = build(ManualSource::new());
        integrator.dispose();

        let reply = dispatch(BridgeRequest::Start, &integrator);
        assert!(reply.error.unwrap().contains("disposed"));
    }

    #[test]
    fn test_change_event_wire_shape() {
        let event = ChangeEvent::new(Orientation {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "change");
        assert_eq!(json["x"], 1.0);
        assert_eq!(json["y"], 2.0);
        assert_eq!(json["z"], 3.0);
    }
}
