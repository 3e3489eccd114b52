use super::{Backend, PushEvent, Request};
use crate::error::BridgeError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// One line written by the host: either a reply or a pushed event.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostMessage {
    Reply {
        id: u64,
        ok: bool,
        #[serde(default)]
        data: Value,
        #[serde(default)]
        error: Option<String>,
    },
    Event {
        event: String,
        #[serde(default)]
        payload: Value,
    },
}

enum Incoming {
    Line(String),
    Closed,
}

/// Host process speaking JSON lines on stdin/stdout.
pub struct ProcessBackend {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<Incoming>,
    pending_events: VecDeque<PushEvent>,
    next_id: u64,
    timeout: Duration,
    push_events: bool,
    closed: bool,
}

impl ProcessBackend {
    /// Spawn `command` through the shell and start the stdout reader.
    pub fn spawn(command: &str, timeout_ms: u64, push_events: bool) -> Result<Self, BridgeError> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child.stdin.take().ok_or(BridgeError::Disconnected)?;
        let stdout = child.stdout.take().ok_or(BridgeError::Disconnected)?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(Incoming::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Backend stdout read failed");
                        break;
                    }
                }
            }
            let _ = tx.send(Incoming::Closed);
        });

        Ok(Self {
            child,
            stdin,
            lines: rx,
            pending_events: VecDeque::new(),
            next_id: 1,
            timeout: Duration::from_millis(timeout_ms),
            push_events,
            closed: false,
        })
    }

    fn send(&mut self, request: &Request) -> Result<u64, BridgeError> {
        let id = self.next_id;
        self.next_id += 1;
        let line = serde_json::to_string(&Self::envelope(id, request)?)?;
        writeln!(self.stdin, "{line}").map_err(|_| BridgeError::Disconnected)?;
        self.stdin.flush().map_err(|_| BridgeError::Disconnected)?;
        Ok(id)
    }

    /// `{"id": n, "command": ..., "args": ...}`
    fn envelope(id: u64, request: &Request) -> Result<Value, BridgeError> {
        let mut value = serde_json::to_value(request)?;
        if let Value::Object(ref mut map) = value {
            map.insert("id".to_string(), Value::from(id));
        }
        Ok(value)
    }

    fn parse_line(line: &str) -> Option<HostMessage> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str(line) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!(error = %e, line, "Ignoring unreadable backend line");
                None
            }
        }
    }

    fn queue_event(&mut self, name: &str, payload: &Value) {
        match PushEvent::from_wire(name, payload) {
            Some(event) => self.pending_events.push_back(event),
            None => debug!(event = name, "Ignoring unknown backend event"),
        }
    }
}

impl Backend for ProcessBackend {
    fn invoke(&mut self, request: &Request) -> Result<Value, BridgeError> {
        if self.closed {
            return Err(BridgeError::Disconnected);
        }
        let id = self.send(request)?;
        let deadline = Instant::now() + self.timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let incoming = match self.lines.recv_timeout(remaining) {
                Ok(incoming) => incoming,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(BridgeError::Timeout {
                        command: request.name().to_string(),
                        timeout_ms: self.timeout.as_millis() as u64,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.closed = true;
                    return Err(BridgeError::Disconnected);
                }
            };

            let line = match incoming {
                Incoming::Line(line) => line,
                Incoming::Closed => {
                    self.closed = true;
                    return Err(BridgeError::Disconnected);
                }
            };

            match Self::parse_line(&line) {
                Some(HostMessage::Reply {
                    id: reply_id,
                    ok,
                    data,
                    error,
                }) => {
                    if reply_id != id {
                        // Reply to a request that already timed out.
                        debug!(reply_id, expected = id, "Dropping stale reply");
                        continue;
                    }
                    return if ok {
                        Ok(data)
                    } else {
                        Err(BridgeError::rejected(
                            request.name(),
                            error.unwrap_or_else(|| "unknown error".to_string()),
                        ))
                    };
                }
                Some(HostMessage::Event { event, payload }) => self.queue_event(&event, &payload),
                None => {}
            }
        }
    }

    fn try_next_event(&mut self) -> Option<PushEvent> {
        while !self.closed {
            match self.lines.try_recv() {
                Ok(Incoming::Line(line)) => match Self::parse_line(&line) {
                    Some(HostMessage::Event { event, payload }) => self.queue_event(&event, &payload),
                    Some(HostMessage::Reply { id, .. }) => {
                        debug!(reply_id = id, "Dropping stale reply");
                    }
                    None => {}
                },
                Ok(Incoming::Closed) | Err(TryRecvError::Disconnected) => {
                    warn!("Backend host closed its output");
                    self.closed = true;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        self.pending_events.pop_front()
    }

    fn pushes_events(&self) -> bool {
        self.push_events
    }
}

impl Drop for ProcessBackend {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Directory;

    #[test]
    fn test_envelope_carries_id_and_command() {
        let req = Request::DeleteHistoryItem { id: 7 };
        let value = ProcessBackend::envelope(3, &req).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["command"], "delete_history_item");
        assert_eq!(value["args"]["id"], 7);
    }

    #[test]
    fn test_parse_reply_and_event_lines() {
        match ProcessBackend::parse_line(r#"{"id":1,"ok":false,"error":"nope"}"#) {
            Some(HostMessage::Reply { id, ok, error, .. }) => {
                assert_eq!(id, 1);
                assert!(!ok);
                assert_eq!(error.as_deref(), Some("nope"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match ProcessBackend::parse_line(r#"{"event":"clipboard-updated"}"#) {
            Some(HostMessage::Event { event, .. }) => assert_eq!(event, "clipboard-updated"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(ProcessBackend::parse_line("not json").is_none());
        assert!(ProcessBackend::parse_line("   ").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_round_trip_through_host_process() {
        // The host prints an event, then answers the first request.
        let script = r#"printf '%s\n' '{"event":"clipboard-updated"}'; read line; printf '%s\n' '{"id":1,"ok":true,"data":[{"name":"Clipboard","count":2}]}'; sleep 1"#;
        let mut backend = ProcessBackend::spawn(script, 5000, true).unwrap();
        let value = backend.invoke(&Request::GetDirectories).unwrap();
        let dirs: Vec<Directory> = serde_json::from_value(value).unwrap();
        assert_eq!(dirs, vec![Directory::new("Clipboard", 2)]);
        assert_eq!(backend.try_next_event(), Some(PushEvent::ClipboardUpdated));
    }

    #[cfg(unix)]
    #[test]
    fn test_exited_host_reports_disconnect() {
        let mut backend = ProcessBackend::spawn("true", 5000, true).unwrap();
        let err = backend.invoke(&Request::GetDirectories).unwrap_err();
        assert!(matches!(err, BridgeError::Disconnected));
    }

    #[cfg(unix)]
    #[test]
    fn test_silent_host_times_out() {
        let mut backend = ProcessBackend::spawn("read line; exec sleep 5", 200, false).unwrap();
        let started = Instant::now();
        let err = backend.invoke(&Request::GetClipboardHistory).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Timeout { ref command, timeout_ms: 200 } if command == "get_clipboard_history"
        ));
        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(!backend.pushes_events());
    }
}
