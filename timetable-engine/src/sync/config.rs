//! Synchronization configuration.

/// Default dataset path for single-source sync.
pub const DEFAULT_DATASET_PATH: &str = "db.json";

/// How the dataset is laid out remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protocol {
    /// One document holding every line.
    Single { path: String },
    /// A manifest listing per-line documents to concatenate.
    Multi { manifest: String },
}

/// What a failing file does to a multi-source sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// The file contributes no lines; the rest of the batch still counts.
    #[default]
    Lenient,
    /// The whole batch is abandoned and the snapshot is served instead.
    Strict,
}

/// Configuration parameters for synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub protocol: Protocol,

    pub batch_mode: BatchMode,

    /// Maximum number of file fetches in flight at once, or `None` to issue
    /// every fetch immediately. Under a cap, the fetches beyond it start as
    /// earlier ones finish.
    pub max_concurrent: Option<usize>,
}

impl SyncConfig {
    /// Sync from a single dataset document.
    pub fn single(path: impl Into<String>) -> Self {
        Self {
            protocol: Protocol::Single { path: path.into() },
            batch_mode: BatchMode::default(),
            max_concurrent: None,
        }
    }

    /// Sync from a manifest of dataset documents.
    pub fn multi(manifest: impl Into<String>) -> Self {
        Self {
            protocol: Protocol::Multi {
                manifest: manifest.into(),
            },
            ..Self::single(DEFAULT_DATASET_PATH)
        }
    }

    pub fn with_batch_mode(mut self, mode: BatchMode) -> Self {
        self.batch_mode = mode;
        self
    }

    /// Cap in-flight file fetches at `n` (at least one).
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = Some(n.max(1));
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::single(DEFAULT_DATASET_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SyncConfig::default();
        assert_eq!(
            config.protocol,
            Protocol::Single {
                path: "db.json".into()
            }
        );
        assert_eq!(config.batch_mode, BatchMode::Lenient);
        assert_eq!(config.max_concurrent, None);
    }

    #[test]
    fn multi_builder() {
        let config = SyncConfig::multi("index.json")
            .with_batch_mode(BatchMode::Strict)
            .with_max_concurrent(2);

        assert_eq!(
            config.protocol,
            Protocol::Multi {
                manifest: "index.json".into()
            }
        );
        assert_eq!(config.batch_mode, BatchMode::Strict);
        assert_eq!(config.max_concurrent, Some(2));
        assert_eq!(SyncConfig::default().with_max_concurrent(0).max_concurrent, Some(1));
    }
}
