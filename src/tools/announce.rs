//! Progress reporting for the environment tools

use log::Level;

/// A sink for human-readable progress messages
pub trait Announcer {
    /// Makes `message` visible to the operator
    fn announce(&self, message: &str);
}

/// An `Announcer` that forwards every message to the logger at a fixed level
pub struct LogAnnouncer {
    /// The level to log all messages at
    pub level: Level,
}

impl Default for LogAnnouncer {
    fn default() -> Self {
        Self { level: Level::Info }
    }
}

impl Announcer for LogAnnouncer {
    fn announce(&self, message: &str) {
        log::log!(self.level, "{}", message);
    }
}
