//! Blocking bridge client for scripts, tools, and tests.

use crate::domain::models::Orientation;
use crate::infrastructure::bridge::protocol::{
    BridgeReply, BridgeRequest, ChangeEvent, CHANGE_EVENT,
};
use anyhow::{Context, Result};
use interprocess::local_socket::{
    traits::Stream, GenericFilePath, Stream as LocalStream, ToFsName,
};
use interprocess::TryClone;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};

/// One connection to a running bridge server.
///
/// `change` events arrive interleaved with replies on the same stream; the
/// client stashes any event it reads while waiting for a reply, and
/// [`BridgeClient::next_event`] drains the stash before blocking.
pub struct BridgeClient {
    stream: LocalStream,
    reader: BufReader<LocalStream>,
    pending_events: VecDeque<ChangeEvent>,
}

impl BridgeClient {
    pub fn connect(socket_name: &str) -> Result<Self> {
        let name = socket_name.to_fs_name::<GenericFilePath>()?;
        let stream =
            LocalStream::connect(name).context("bridge server not reachable")?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            stream,
            reader,
            pending_events: VecDeque::new(),
        })
    }

    /// Fetch the current orientation snapshot.
    pub fn get_gyro_data(&mut self) -> Result<Orientation> {
        let reply = self.request(BridgeRequest::GetGyroData)?;
        reply
            .result
            .context("getGyroData reply carried no result")
    }

    /// Begin integration on the daemon.
    pub fn start(&mut self) -> Result<()> {
        self.request(BridgeRequest::Start).map(|_| ())
    }

    /// End integration; the daemon's estimate freezes.
    pub fn stop(&mut self) -> Result<()> {
        self.request(BridgeRequest::Stop).map(|_| ())
    }

    /// Block until the next `change` event.
    pub fn next_event(&mut self) -> Result<ChangeEvent> {
        if let Some(event) = self.pending_events.pop_front() {
            return Ok(event);
        }
        loop {
            let line = self.read_line()?;
            if let Ok(event) = serde_json::from_str::<ChangeEvent>(&line) {
                if event.event == CHANGE_EVENT {
                    return Ok(event);
                }
            }
            // Anything else outside a request cycle is stale; drop it.
        }
    }

    fn request(&mut self, request: BridgeRequest) -> Result<BridgeReply> {
        let json = serde_json::to_string(&request)? + "\n";
        self.stream.write_all(json.as_bytes())?;
        self.stream.flush()?;

        let reply = self.read_reply()?;
        if let Some(error) = reply.error {
            anyhow::bail!("bridge error: {}", error);
        }
        Ok(reply)
    }

    fn read_reply(&mut self) -> Result<BridgeReply> {
        loop {
            let line = self.read_line()?;
            // Events interleave with replies; try the event shape first
            // since a reply line never carries an "event" field.
            if let Ok(event) = serde_json::from_str::<ChangeEvent>(&line) {
                if event.event == CHANGE_EVENT {
                    self.pending_events.push_back(event);
                    continue;
                }
            }
            return Ok(serde_json::from_str(&line)?);
        }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut buffer = String::new();
        let read = self.reader.read_line(&mut buffer)?;
        if read == 0 {
            anyhow::bail!("bridge connection closed");
        }
        Ok(buffer)
    }
}
