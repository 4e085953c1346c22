//! # Engine Bridge
//!
//! The analysis engine runs outside this process and is reached through a
//! single `invoke(command, args)` call that either returns a JSON value or a
//! rejection message.
//!
//! - [`Invoke`] is the untyped transport seam.
//! - [`ProcessTransport`] spawns the engine and talks line-delimited JSON
//!   over its stdio.
//! - [`EngineClient`] layers typed operations on any transport.
//!
//! ## Wire format
//!
//! ```text
//! -> {"id":1,"command":"analyze_section","args":{"address":"0x401000"}}
//! <- {"id":1,"ok":[{"startAddress":4198400,"endAddress":4198432,"analyzed":true}]}
//! <- {"id":2,"err":"Fireball is None"}
//! ```

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::{DecompileResult, EntryResult, IrInspectResult, SectionInfo};
use crate::errors::{FirebatError, FirebatResult};

/// Untyped request/response boundary to the engine.
pub trait Invoke: Send + Sync {
    /// Run `command` with named `args`. Engine rejections come back as
    /// [`FirebatError::Engine`].
    fn invoke(&self, command: &str, args: Value) -> FirebatResult<Value>;
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    id: u64,
    command: &'a str,
    args: Value,
}

#[derive(Debug, Deserialize)]
struct Response {
    id: u64,
    #[serde(default)]
    ok: Option<Value>,
    #[serde(default)]
    err: Option<String>,
}

struct Pipes {
    next_id: u64,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Engine running as a child process, one JSON object per line.
///
/// Calls are serialized; a second caller waits for the first response.
/// Any failure below the engine's own rejections (I/O, malformed or
/// mismatched replies) leaves the pipe out of sync, so the transport is
/// marked broken and refuses further calls. Callers respawn it.
pub struct ProcessTransport {
    program: String,
    child: Mutex<Child>,
    pipes: Mutex<Pipes>,
    broken: AtomicBool,
}

impl ProcessTransport {
    /// Spawn `command[0]` with the remaining elements as arguments.
    pub fn spawn(command: &[String]) -> FirebatResult<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| FirebatError::transport("spawn", "engine command is empty"))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| FirebatError::transport(format!("spawn {}", program), e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FirebatError::transport("spawn", "engine stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FirebatError::transport("spawn", "engine stdout unavailable"))?;

        tracing::info!(program = %program, pid = child.id(), "engine process started");

        Ok(ProcessTransport {
            program: program.clone(),
            child: Mutex::new(child),
            pipes: Mutex::new(Pipes {
                next_id: 1,
                stdin,
                stdout: BufReader::new(stdout),
            }),
            broken: AtomicBool::new(false),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether an earlier call desynchronized the pipe
    pub fn is_broken(&self) -> bool {
        self.broken.load(Ordering::Acquire)
    }

    fn exchange(&self, command: &str, args: Value) -> FirebatResult<Value> {
        let mut pipes = self
            .pipes
            .lock()
            .map_err(|_| FirebatError::transport(command, "engine pipe lock poisoned"))?;

        let id = pipes.next_id;
        pipes.next_id += 1;

        let mut line = serde_json::to_string(&Request { id, command, args })?;
        line.push('\n');
        pipes
            .stdin
            .write_all(line.as_bytes())
            .and_then(|_| pipes.stdin.flush())
            .map_err(|e| FirebatError::transport(format!("send {}", command), e.to_string()))?;

        let mut reply = String::new();
        let read = pipes
            .stdout
            .read_line(&mut reply)
            .map_err(|e| FirebatError::transport(format!("receive {}", command), e.to_string()))?;
        if read == 0 {
            return Err(FirebatError::transport(
                format!("receive {}", command),
                "engine closed its output",
            ));
        }

        tracing::trace!(command, id, "engine replied");
        decode_response(command, id, &reply)
    }
}

impl Invoke for ProcessTransport {
    fn invoke(&self, command: &str, args: Value) -> FirebatResult<Value> {
        if self.is_broken() {
            return Err(FirebatError::transport(command, "engine pipe is out of sync"));
        }

        let result = self.exchange(command, args);
        if let Err(e) = &result {
            if e.is_recoverable() {
                self.broken.store(true, Ordering::Release);
                tracing::warn!(program = %self.program, command, error = %e, "engine transport broken");
            }
        }
        result
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        if let Ok(mut child) = self.child.lock() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn decode_response(command: &str, expected_id: u64, line: &str) -> FirebatResult<Value> {
    let response: Response = serde_json::from_str(line.trim())
        .map_err(|e| FirebatError::protocol(format!("malformed reply to {}: {}", command, e)))?;

    if response.id != expected_id {
        return Err(FirebatError::protocol(format!(
            "reply id {} does not match request id {}",
            response.id, expected_id
        )));
    }

    match (response.ok, response.err) {
        (_, Some(message)) => Err(FirebatError::engine(command, message)),
        (Some(value), None) => Ok(value),
        // `Ok(())` serializes as null, which serde reads back as a missing field
        (None, None) => Ok(Value::Null),
    }
}

/// Typed engine operations over any [`Invoke`] transport.
pub struct EngineClient<T: Invoke> {
    transport: T,
}

impl<T: Invoke> EngineClient<T> {
    pub fn new(transport: T) -> Self {
        EngineClient { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call<R: DeserializeOwned>(&self, command: &str, args: Value) -> FirebatResult<R> {
        let value = self.transport.invoke(command, args)?;
        serde_json::from_value(value).map_err(|e| {
            FirebatError::protocol(format!("unexpected {} result: {}", command, e))
        })
    }

    /// Load a binary into the engine
    pub fn open_file(&self, path: &Path) -> FirebatResult<()> {
        let _: Value = self.call("open_file", json!({ "path": path.display().to_string() }))?;
        Ok(())
    }

    pub fn decompile_from_address(&self, address: &str) -> FirebatResult<EntryResult> {
        self.call("decompile_from_address", json!({ "address": address }))
    }

    pub fn decompile_from_entry(&self) -> FirebatResult<EntryResult> {
        self.call("decompile_from_entry", json!({}))
    }

    pub fn ir_inspect(&self, address: &str) -> FirebatResult<Vec<IrInspectResult>> {
        self.call("ir_inspect", json!({ "address": address }))
    }

    /// Analyze the block at `address`; an empty address means the entry point
    pub fn analyze_section(&self, address: &str) -> FirebatResult<Vec<SectionInfo>> {
        self.call("analyze_section", json!({ "address": address }))
    }

    pub fn analyze_all_sections(&self) -> FirebatResult<Vec<SectionInfo>> {
        self.call("analyze_all_sections", json!({}))
    }

    pub fn decompile_sections(&self, start_addresses: &[u64]) -> FirebatResult<DecompileResult> {
        self.call("decompile_sections", json!({ "start_addresses": start_addresses }))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory transport for tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::Value;

    use super::Invoke;
    use crate::errors::{FirebatError, FirebatResult};

    #[derive(Default)]
    pub struct ScriptedTransport {
        replies: Mutex<HashMap<String, Result<Value, String>>>,
        pub calls: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedTransport {
        pub fn reply(self, command: &str, value: Value) -> Self {
            self.replies
                .lock()
                .unwrap()
                .insert(command.to_string(), Ok(value));
            self
        }

        pub fn reject(self, command: &str, message: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .insert(command.to_string(), Err(message.to_string()));
            self
        }

        pub fn commands(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
        }
    }

    impl Invoke for ScriptedTransport {
        fn invoke(&self, command: &str, args: Value) -> FirebatResult<Value> {
            self.calls.lock().unwrap().push((command.to_string(), args));
            match self.replies.lock().unwrap().get(command) {
                Some(Ok(value)) => Ok(value.clone()),
                Some(Err(message)) => Err(FirebatError::engine(command, message.clone())),
                None => Err(FirebatError::engine(command, "unknown command")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;

    #[test]
    fn test_decode_ok_err_and_unit() {
        assert_eq!(decode_response("x", 3, r#"{"id":3,"ok":[1,2]}"#).unwrap(), json!([1, 2]));
        assert_eq!(decode_response("x", 3, r#"{"id":3,"ok":null}"#).unwrap(), Value::Null);

        let err = decode_response("open_file", 4, r#"{"id":4,"err":"no such file"}"#).unwrap_err();
        assert_eq!(err, FirebatError::engine("open_file", "no such file"));
    }

    #[test]
    fn test_decode_rejects_bad_lines() {
        assert_eq!(
            decode_response("x", 1, "not json").unwrap_err().error_code(),
            "PROTOCOL_ERROR"
        );
        assert_eq!(
            decode_response("x", 1, r#"{"id":2,"ok":1}"#).unwrap_err().error_code(),
            "PROTOCOL_ERROR"
        );
    }

    #[test]
    fn test_client_sends_snake_case_args() {
        let client = EngineClient::new(ScriptedTransport::default().reply(
            "decompile_sections",
            json!({ "assembly": [], "ir": [], "decompiled": "" }),
        ));
        client.decompile_sections(&[16, 32]).unwrap();

        let calls = client.transport().calls.lock().unwrap();
        assert_eq!(calls[0].0, "decompile_sections");
        assert_eq!(calls[0].1, json!({ "start_addresses": [16, 32] }));
    }

    #[test]
    fn test_client_types_results() {
        let client = EngineClient::new(
            ScriptedTransport::default()
                .reply("analyze_all_sections", json!([
                    { "startAddress": 10, "endAddress": 20, "analyzed": true },
                    { "startAddress": 40, "endAddress": null, "analyzed": false }
                ]))
                .reply("decompile_from_entry", json!([4096, 4112]))
                .reply("ir_inspect", json!([
                    { "instruction": "ret", "statements": [{ "statement": "return" }] }
                ]))
                .reply("open_file", Value::Null),
        );

        let sections = client.analyze_all_sections().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].end_address, Some(20));
        assert_eq!(client.decompile_from_entry().unwrap(), EntryResult(vec![4096, 4112]));
        assert_eq!(client.ir_inspect("0x10").unwrap()[0].statements[0].statement, "return");
        client.open_file(Path::new("/tmp/a.out")).unwrap();
    }

    #[test]
    fn test_client_reports_shape_mismatch() {
        let client = EngineClient::new(
            ScriptedTransport::default().reply("analyze_section", json!({ "oops": true })),
        );
        let err = client.analyze_section("").unwrap_err();
        assert_eq!(err.error_code(), "PROTOCOL_ERROR");
    }

    #[test]
    fn test_spawn_rejects_empty_command() {
        let err = ProcessTransport::spawn(&[]).err().unwrap();
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_transport_round_trip() {
        // Echoes a canned reply carrying the request id
        let script = r#"while read -r line; do id=$(echo "$line" | sed 's/.*"id":\([0-9]*\).*/\1/'); echo "{\"id\":$id,\"ok\":[7]}"; done"#;
        let transport = ProcessTransport::spawn(&[
            "sh".to_string(),
            "-c".to_string(),
            script.to_string(),
        ])
        .unwrap();
        assert_eq!(transport.program(), "sh");

        let client = EngineClient::new(transport);
        assert_eq!(client.decompile_from_address("7").unwrap(), EntryResult(vec![7]));
        assert_eq!(client.decompile_from_entry().unwrap(), EntryResult(vec![7]));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_transport_closed_output() {
        let transport = ProcessTransport::spawn(&["true".to_string()]).unwrap();
        let err = transport.invoke("decompile_from_entry", json!({})).unwrap_err();
        assert!(matches!(err, FirebatError::Transport { .. }));
        assert!(transport.is_broken());
    }

    #[cfg(unix)]
    #[test]
    fn test_mismatched_reply_id_breaks_transport() {
        // Always answers with id 99, and would answer correctly afterwards
        let script = r#"while read -r line; do echo '{"id":99,"ok":[1]}'; done"#;
        let transport = ProcessTransport::spawn(&[
            "sh".to_string(),
            "-c".to_string(),
            script.to_string(),
        ])
        .unwrap();

        let first = transport.invoke("decompile_from_entry", json!({})).unwrap_err();
        assert_eq!(first.error_code(), "PROTOCOL_ERROR");
        assert!(transport.is_broken());

        let second = transport.invoke("decompile_from_entry", json!({})).unwrap_err();
        assert_eq!(second.error_code(), "TRANSPORT_ERROR");
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_rejection_keeps_transport_usable() {
        let script = r#"while read -r line; do id=$(echo "$line" | sed 's/.*"id":\([0-9]*\).*/\1/'); echo "{\"id\":$id,\"err\":\"Fireball is None\"}"; done"#;
        let transport = ProcessTransport::spawn(&[
            "sh".to_string(),
            "-c".to_string(),
            script.to_string(),
        ])
        .unwrap();

        for _ in 0..2 {
            let err = transport.invoke("decompile_from_entry", json!({})).unwrap_err();
            assert_eq!(err, FirebatError::engine("decompile_from_entry", "Fireball is None"));
        }
        assert!(!transport.is_broken());
    }
}
