//! Filesystem locations used by Chorus
//!
//! Everything lives under `~/.chorus`; when no home directory can be
//! determined the current directory is used instead.

use std::path::PathBuf;

use crate::constants::dirs::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DATABASE_FILE_NAME, LOG_FILE_NAME,
};

/// Root configuration directory (`~/.chorus`)
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Default configuration file
pub fn config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Default conversation database
pub fn database_file() -> PathBuf {
    config_dir().join(DATABASE_FILE_NAME)
}

pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

pub fn log_file() -> PathBuf {
    logs_dir().join(LOG_FILE_NAME)
}
