//! Startup configuration.

use std::path::PathBuf;

/// Explicit configuration handed to the server at startup.
///
/// There is deliberately no ambient environment switching here: whoever
/// starts the service decides where state lives and passes it in.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the user and throttle collections.
    pub storage_root: PathBuf,
}

impl Config {
    #[must_use]
    pub fn new(storage_root: PathBuf) -> Self {
        Self { storage_root }
    }
}
