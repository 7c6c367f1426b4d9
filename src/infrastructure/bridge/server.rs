//! Bridge server: local-socket listener, request loop, event broadcast.

use crate::domain::integrator::OrientationIntegrator;
use crate::domain::models::AppEvent;
use crate::infrastructure::bridge::protocol::{dispatch, BridgeReply, BridgeRequest, ChangeEvent};
use anyhow::Result;
use interprocess::local_socket::{
    traits::ListenerExt, GenericFilePath, ListenerOptions, Stream as LocalStream, ToFsName,
};
use interprocess::TryClone;
use std::io::{BufRead, BufReader, Write};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{error, info};

type Peers = Arc<Mutex<Vec<LocalStream>>>;

/// Run the bridge: accept script connections on `socket_name`, serve
/// requests, and push `change` events to every connected peer. Blocks for
/// the life of the listener.
pub fn run_bridge_server(
    socket_name: &str,
    integrator: Arc<OrientationIntegrator>,
    events: mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let name = socket_name.to_fs_name::<GenericFilePath>()?;
    let listener = ListenerOptions::new().name(name).create_sync()?;
    info!("bridge listening on {}", socket_name);

    let peers: Peers = Arc::new(Mutex::new(Vec::new()));
    spawn_event_pump(events, Arc::clone(&peers));

    for conn in listener.incoming().filter_map(|c| c.ok()) {
        info!("script peer connected");
        match conn.try_clone() {
            Ok(writer) => peers.lock().unwrap().push(writer),
            Err(e) => {
                error!("failed to register peer for events: {}", e);
                continue;
            }
        }

        let integrator = Arc::clone(&integrator);
        std::thread::spawn(move || {
            if let Err(e) = handle_connection(conn, &integrator) {
                error!("bridge connection error: {}", e);
            }
        });
    }

    Ok(())
}

/// Drain the integrator's event channel onto every live peer. Peers whose
/// write fails are dropped from the broadcast list.
fn spawn_event_pump(mut events: mpsc::UnboundedReceiver<AppEvent>, peers: Peers) {
    std::thread::spawn(move || {
        while let Some(event) = events.blocking_recv() {
            let AppEvent::Change(orientation) = event else {
                continue;
            };
            // Marshalling failures are logged and swallowed; event delivery
            // is best-effort by contract.
            let line = match serde_json::to_string(&ChangeEvent::new(orientation)) {
                Ok(json) => json + "\n",
                Err(e) => {
                    error!("failed to serialize change event: {}", e);
                    continue;
                }
            };
            peers.lock().unwrap().retain_mut(|peer| {
                peer.write_all(line.as_bytes())
                    .and_then(|_| peer.flush())
                    .is_ok()
            });
        }
    });
}

fn handle_connection(stream: LocalStream, integrator: &OrientationIntegrator) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    let mut buffer = String::new();

    loop {
        buffer.clear();
        match reader.read_line(&mut buffer) {
            Ok(0) => break, // EOF
            Ok(_) => {
                if buffer.trim().is_empty() {
                    continue;
                }
                let reply = match serde_json::from_str::<BridgeRequest>(&buffer) {
                    Ok(request) => dispatch(request, integrator),
                    Err(e) => BridgeReply::err(format!("unrecognized request: {}", e)),
                };
                // A reply that cannot be serialized is logged and dropped;
                // the connection stays up and the next request is served.
                match serde_json::to_string(&reply) {
                    Ok(json) => {
                        writer.write_all((json + "\n").as_bytes())?;
                        writer.flush()?;
                    }
                    Err(e) => error!("failed to serialize bridge reply: {}", e),
                }
            }
            Err(e) => {
                error!("bridge read error: {}", e);
                break;
            }
        }
    }

    Ok(())
}
