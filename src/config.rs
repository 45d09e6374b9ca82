//! Settings for connecting to the application database.

use std::{path::PathBuf, time::Duration};

/// The default time to wait for another connection to release a lock on the database.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How to reach the application database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File path to the SQLite database, created if it does not exist.
    pub db_path: PathBuf,
    /// How long an operation waits on a locked database before failing with
    /// [Error::StoreBusy](crate::Error::StoreBusy).
    pub busy_timeout: Duration,
}

impl Config {
    /// Create a config for the database at `db_path` with the default busy timeout.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Set how long to wait on a locked database.
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}
