// shelfview config path for Linux: $XDG_CONFIG_HOME/shelfview or ~/.config/shelfview

use std::env;
use std::path::PathBuf;

use super::APP_DIR;

pub fn get_config_dir() -> PathBuf {
    config_root(env::var("XDG_CONFIG_HOME").ok(), env::var("HOME").ok()).join(APP_DIR)
}

fn config_root(xdg: Option<String>, home: Option<String>) -> PathBuf {
    match xdg.filter(|x| !x.is_empty()) {
        Some(xdg) => PathBuf::from(xdg),
        None => PathBuf::from(home.unwrap_or_else(|| String::from("/tmp"))).join(".config"),
    }
}
