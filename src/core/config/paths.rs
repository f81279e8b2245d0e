use std::env;
use std::fs;
use std::path::PathBuf;

/// Filesystem layout of the service.
///
/// The data directory is never created here: a missing corpus directory is
/// a valid (empty) state that the loader reports as a warning.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub index_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let root = discover_root();
        Self::with_root(root)
    }

    pub fn with_root(root: PathBuf) -> Self {
        let data_dir = env::var("DOCQA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| root.join("data"));
        let index_dir = env::var("DOCQA_INDEX_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| root.join("index"));
        let log_dir = root.join("logs");

        for dir in [&index_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            root,
            data_dir,
            index_dir,
            log_dir,
        }
    }

    /// Path of the live index database.
    pub fn db_path(&self) -> PathBuf {
        self.index_dir.join("index.db")
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_root() -> PathBuf {
    if let Ok(root) = env::var("DOCQA_ROOT") {
        return PathBuf::from(root);
    }

    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
