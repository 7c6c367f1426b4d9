use anyhow::Result;
use gyro_bridge::domain::integrator::OrientationIntegrator;
use gyro_bridge::domain::settings::SettingsService;
use gyro_bridge::infrastructure::bridge::run_bridge_server;
use gyro_bridge::infrastructure::logging;
use gyro_bridge::infrastructure::sensor::{NullSource, ReplaySource, SampleSource};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

fn main() -> Result<()> {
    let settings_service = SettingsService::new()?;
    let settings = settings_service.get().clone();

    let _logging_guard = logging::init_logger(&settings.log_settings)?;
    info!("Starting gyro bridge daemon");

    let source: Box<dyn SampleSource> = match settings.sensor_source.as_str() {
        "replay" => Box::new(ReplaySource::slow_spin()),
        "none" => Box::new(NullSource),
        other => {
            warn!("unknown sensor source '{}', running without a gyroscope", other);
            Box::new(NullSource)
        }
    };

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let integrator = Arc::new(OrientationIntegrator::new(
        source,
        settings.sample_cadence,
        event_tx,
    ));

    run_bridge_server(&settings.bridge_socket_name, integrator, event_rx)
}
