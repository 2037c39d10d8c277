//! File worker protocol: chunked OPFS saves and existence checks
//!
//! Commands and events ride inside the [`crate::messages`] envelopes so
//! interleaved requests cannot steal each other's responses. The `File`
//! object for a save is not part of the serde payload; it is attached to
//! the posted message under a `file` key and travels by structured clone.

use serde::{Deserialize, Serialize};
use tsify::Tsify;

/// Commands accepted by the file worker
#[derive(Tsify, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(tag = "action")]
pub enum FileCommand {
    /// Persist a file to OPFS in fixed-size chunks
    #[serde(rename = "save")]
    Save {
        /// Destination entry name; informational, the worker writes to
        /// the attached file's own name
        #[serde(rename = "fileName")]
        file_name: String,
    },
    /// Check whether a named OPFS entry exists
    #[serde(rename = "existFile")]
    ExistFile {
        #[serde(rename = "fileName")]
        file_name: String,
    },
}

/// Events emitted by the file worker
#[derive(Tsify, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(tag = "status")]
pub enum FileEvent {
    /// Bytes written so far; emitted after every chunk, final report
    /// equals the total size
    #[serde(rename = "progress")]
    Progress { current: f64, total: f64 },
    /// Save finished, all writes durable
    #[serde(rename = "completed")]
    Completed,
    /// Existence check: entry present
    #[serde(rename = "existFileFound")]
    Found,
    /// Existence check: entry absent
    #[serde(rename = "existFileNotFound")]
    NotFound,
    /// Terminal failure; a failed save may leave a truncated entry
    #[serde(rename = "error")]
    Error { message: String },
}

impl FileEvent {
    /// Progress reports precede the terminal event; everything else ends
    /// the request
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FileEvent::Progress { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_wire_tags_match_the_protocol() {
        let save = FileCommand::Save {
            file_name: "a.csv".into(),
        };
        let json = serde_json::to_value(&save).unwrap();
        assert_eq!(json["action"], "save");
        assert_eq!(json["fileName"], "a.csv");

        let exist = FileCommand::ExistFile {
            file_name: "a.db".into(),
        };
        let json = serde_json::to_value(&exist).unwrap();
        assert_eq!(json["action"], "existFile");
    }

    #[test]
    fn event_wire_tags_match_the_protocol() {
        let cases = [
            (FileEvent::Completed, "completed"),
            (FileEvent::Found, "existFileFound"),
            (FileEvent::NotFound, "existFileNotFound"),
            (
                FileEvent::Error {
                    message: "quota".into(),
                },
                "error",
            ),
            (
                FileEvent::Progress {
                    current: 1.0,
                    total: 2.0,
                },
                "progress",
            ),
        ];
        for (event, tag) in cases {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["status"], tag);
        }
    }

    #[test]
    fn only_progress_is_non_terminal() {
        assert!(!FileEvent::Progress {
            current: 0.0,
            total: 1.0
        }
        .is_terminal());
        assert!(FileEvent::Completed.is_terminal());
        assert!(FileEvent::Found.is_terminal());
        assert!(FileEvent::NotFound.is_terminal());
        assert!(FileEvent::Error {
            message: String::new()
        }
        .is_terminal());
    }
}
