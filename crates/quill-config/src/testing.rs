//! Test environment abstraction for isolated testing.
//!
//! Provides `TestEnvironment` to manage:
//! - An isolated working directory for writes
//! - A private log store path
//! - Project config files
//!
//! # Usage
//!
//! ```ignore
//! use quill_config::testing::TestEnvironment;
//!
//! #[test]
//! fn test_something() {
//!     let env = TestEnvironment::new().unwrap();
//!     // env.project_root and env.log_path are private to this test
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;

/// Atomic counter for unique test IDs
static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Isolated test environment with unique paths
pub struct TestEnvironment {
    /// Temporary directory (dropped on cleanup)
    _temp_dir: TempDir,
    /// Working directory for the code under test
    pub project_root: PathBuf,
    /// Log store path inside the project root
    pub log_path: PathBuf,
    /// Unique test ID
    pub test_id: u32,
}

impl TestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> anyhow::Result<Self> {
        let test_id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_dir = TempDir::new()?;

        let project_root = temp_dir.path().join("project");
        std::fs::create_dir_all(&project_root)?;
        let log_path = project_root.join(crate::DEFAULT_LOG_FILE);

        Ok(Self {
            _temp_dir: temp_dir,
            project_root,
            log_path,
            test_id,
        })
    }

    /// Absolute path of `relative_path` inside the project root
    pub fn path(&self, relative_path: &str) -> PathBuf {
        self.project_root.join(relative_path)
    }

    /// Create a test file with content
    pub fn create_file(&self, relative_path: &str, content: &[u8]) -> anyhow::Result<PathBuf> {
        let path = self.path(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a test directory
    pub fn create_dir(&self, relative_path: &str) -> anyhow::Result<PathBuf> {
        let path = self.path(relative_path);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Write `.quill/config.toml` under the project root
    pub fn write_project_config(&self, contents: &str) -> anyhow::Result<PathBuf> {
        let path = crate::Config::project_config_path(&self.project_root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Lines currently in the log store (empty if it does not exist yet)
    pub fn log_lines(&self) -> Vec<String> {
        read_lines(&self.log_path)
    }

    /// Create a directory the current user cannot write into.
    ///
    /// Returns `None` when permissions are not enforced (e.g. running as
    /// root), so callers can skip permission-based assertions.
    #[cfg(unix)]
    pub fn create_read_only_dir(&self, relative_path: &str) -> anyhow::Result<Option<PathBuf>> {
        use std::os::unix::fs::PermissionsExt;

        let dir = self.create_dir(relative_path)?;
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o555))?;

        let sentinel = dir.join(format!(".sentinel-{}", self.test_id));
        if std::fs::write(&sentinel, b"").is_ok() {
            let _ = std::fs::remove_file(&sentinel);
            return Ok(None);
        }
        Ok(Some(dir))
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        // TempDir cannot clean up below directories we made read-only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            for entry in walk_dirs(&self.project_root) {
                let _ = std::fs::set_permissions(&entry, std::fs::Permissions::from_mode(0o755));
            }
        }
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(unix)]
fn walk_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![root.to_path_buf()];
    let mut i = 0;
    while i < dirs.len() {
        if let Ok(entries) = std::fs::read_dir(&dirs[i]) {
            for entry in entries.flatten() {
                if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                    dirs.push(entry.path());
                }
            }
        }
        i += 1;
    }
    dirs
}
