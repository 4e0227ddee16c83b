//! JSONL transcript of oracle traffic.
//!
//! One JSON object per line with `type` and `timestamp` next to the event
//! payload. The file is opened in append mode so a resumed run extends the
//! transcript of the interrupted one.

use ecogroup_application::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open `path` for appending, creating parent directories.
    ///
    /// Returns `None` (after a warning) when the file cannot be opened; the
    /// caller then runs without a transcript.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let opened = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| OpenOptions::new().create(true).append(true).open(path));

        match opened {
            Ok(file) => Some(Self {
                writer: Mutex::new(BufWriter::new(file)),
                path: path.to_path_buf(),
            }),
            Err(e) => {
                warn!("Oracle log disabled, cannot open {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn record(event: ConversationEvent, timestamp: String) -> Value {
    let mut map = match event.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert("type".to_string(), Value::from(event.event_type));
    map.insert("timestamp".to_string(), Value::from(timestamp));
    Value::Object(map)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let Ok(line) = serde_json::to_string(&record(event, timestamp)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // Flushed per line: the run may be killed by the orchestrator.
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_events_become_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("03_oracle_log.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        logger.log(ConversationEvent::new(
            "oracle_request",
            json!({"rank": "Family", "taxa": ["Gadidae"]}),
        ));
        logger.log(ConversationEvent::new("oracle_response", json!("{}")));

        let written = lines(&path);
        assert_eq!(written.len(), 2);
        assert_eq!(written[0]["type"], "oracle_request");
        assert_eq!(written[0]["taxa"][0], "Gadidae");
        assert!(written[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(written[1]["data"], "{}");
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/03_oracle_log.jsonl");

        for attempt in 1..=2 {
            let logger = JsonlConversationLogger::open(&path).unwrap();
            logger.log(ConversationEvent::new("oracle_retry", json!({"attempt": attempt})));
        }

        let written = lines(&path);
        assert_eq!(written.len(), 2);
        assert_eq!(written[1]["attempt"], 2);
    }

    #[test]
    fn test_unopenable_path_disables_log() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("file"), "").unwrap();
        // a regular file cannot be a parent directory
        assert!(JsonlConversationLogger::open(dir.path().join("file/log.jsonl")).is_none());
    }
}
