//! Locating the master workbook

use std::path::{Path, PathBuf};

use tracing::debug;

/// File name of the master workbook
pub const DEFAULT_MASTER_FILE: &str = "2026통합발주서_영업_연습.xlsb";

/// Environment variable naming the master workbook
pub const MASTER_ENV: &str = "BALJU_MASTER";

/// Pick the master workbook path.
///
/// Order: `explicit`, then `BALJU_MASTER`, then [`DEFAULT_MASTER_FILE`] next
/// to the executable, then in the working directory. The last candidate is
/// returned even when it does not exist so the load error can name it.
pub fn discover_master(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = std::env::var_os(MASTER_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    discover_in(exe_dir.as_deref(), Path::new("."))
}

fn discover_in(exe_dir: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(candidate) = exe_dir.map(|dir| dir.join(DEFAULT_MASTER_FILE)) {
        if candidate.exists() {
            debug!(path = %candidate.display(), "master workbook found next to executable");
            return candidate;
        }
    }
    cwd.join(DEFAULT_MASTER_FILE)
}
