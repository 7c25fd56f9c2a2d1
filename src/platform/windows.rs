// shelfview config path for Windows: %APPDATA%/shelfview

use std::env;
use std::path::PathBuf;

use super::APP_DIR;

pub fn get_config_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join(APP_DIR)
}
