mod config;
pub mod database;

pub use config::{CarouselConfig, Config, HoldConfig, LayoutConfig, TiltConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns the habitcard data directory, creating it if needed.
///
/// `HABITCARD_DATA_DIR` wins when set. Otherwise `~/.config/habitcard[-dev]/`
/// based on `HABITCARD_ENV` (set `HABITCARD_ENV=dev` for the development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("HABITCARD_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HABITCARD_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitcard-dev")
            } else {
                base_dir.join("habitcard")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
