//! Control messages posted to the worker by a controlled page.

use std::fmt;
use std::str::FromStr;

/// A recognised message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMessage {
    /// Activate the waiting worker now ("update now" flows).
    SkipWaiting,
    /// Fetch every Resource Table entry not yet in the content partition.
    DownloadOffline,
}

impl WorkerMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerMessage::SkipWaiting => "skipWaiting",
            WorkerMessage::DownloadOffline => "downloadOffline",
        }
    }

    /// Parse a raw payload. Anything else, including different casing, is
    /// not a control message and yields `None`.
    pub fn parse(payload: &str) -> Option<Self> {
        payload.parse().ok()
    }
}

/// Payload that is not a known control message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMessage(pub String);

impl fmt::Display for UnknownMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown worker message '{}'", self.0)
    }
}

impl std::error::Error for UnknownMessage {}

impl FromStr for WorkerMessage {
    type Err = UnknownMessage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skipWaiting" => Ok(WorkerMessage::SkipWaiting),
            "downloadOffline" => Ok(WorkerMessage::DownloadOffline),
            other => Err(UnknownMessage(other.to_string())),
        }
    }
}

impl fmt::Display for WorkerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
