//! Search-path scanning for external subcommands.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An external executable exposed as `toolforge <name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredCommand {
    pub name: String,
    pub executable_path: PathBuf,
}

/// Scan `search_path` for executables named `<prefix><name>`.
///
/// Directories are visited last to first so that, on a name clash, the entry
/// from the directory listed first ends up in the map. Missing directories
/// and non-executable files are skipped.
pub fn discover(search_path: &OsStr, prefix: &str) -> BTreeMap<String, DiscoveredCommand> {
    let directories: Vec<PathBuf> = std::env::split_paths(search_path).collect();
    let mut commands = BTreeMap::new();

    for directory in directories.iter().rev() {
        for command in scan_directory(directory, prefix) {
            debug!(
                "Found subcommand {} at {}",
                command.name,
                command.executable_path.display()
            );
            commands.insert(command.name.clone(), command);
        }
    }

    commands
}

fn scan_directory(directory: &Path, prefix: &str) -> Vec<DiscoveredCommand> {
    let Ok(entries) = fs::read_dir(directory) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let file_name = entry.file_name();
            let name = file_name.to_str()?.strip_prefix(prefix)?;
            if name.is_empty() {
                return None;
            }

            let path = entry.path();
            if !path.is_file() || !is_executable(&path) {
                return None;
            }

            Some(DiscoveredCommand {
                name: name.to_string(),
                executable_path: fs::canonicalize(&path).unwrap_or(path),
            })
        })
        .collect()
}

/// Whether the current process may execute `path`.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(c_path.as_ptr(), libc::X_OK) == 0 }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
