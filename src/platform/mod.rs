// shelfview platform abstraction
// Resolves where settings live on Windows, macOS, and Linux.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Directory name under the platform config root.
pub const APP_DIR: &str = "shelfview";

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `~/.config/shelfview` (or `$XDG_CONFIG_HOME/shelfview`)
/// - **macOS**: `~/Library/Application Support/shelfview`
/// - **Windows**: `%APPDATA%/shelfview`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}
