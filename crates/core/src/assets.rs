//! Where dragon keeps its files on disk.
use once_cell::sync::Lazy;
use std::path::PathBuf;

const APP_DIR: &str = "dragon";

static FALLBACK_DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::data_local_dir()
        .map(|p| p.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("~/.local/share/dragon"))
});

static FALLBACK_CONFIG_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::config_dir()
        .map(|p| p.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("~/.config/dragon"))
});

/// `$<var>/dragon` when the XDG variable is set, `fallback` otherwise.
fn xdg_app_dir(var: &str, fallback: &Lazy<PathBuf>) -> PathBuf {
    match std::env::var_os(var) {
        Some(base) if !base.is_empty() => PathBuf::from(base).join(APP_DIR),
        _ => (*fallback).clone(),
    }
}

pub fn get_config_dir() -> PathBuf {
    xdg_app_dir("XDG_CONFIG_HOME", &FALLBACK_CONFIG_DIR)
}

/// Directory for logs and other runtime files. Created on first use.
pub fn get_data_dir() -> std::io::Result<PathBuf> {
    let dir = xdg_app_dir("XDG_DATA_HOME", &FALLBACK_DATA_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// The config written on first run.
pub fn get_default_config() -> &'static str {
    include_str!("../data/config.yml")
}
