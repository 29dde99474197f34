use std::path::Path;

use anyhow::Result;
use chat_digest::storage::path_utils;

/// `config show`: the effective configuration, secrets masked.
pub fn run_show(explicit: Option<&Path>) -> Result<()> {
    let cfg = super::load_config(explicit)?;
    print!("{}", cfg.to_display_toml()?);
    Ok(())
}

/// `config path`: where the config is read from.
pub fn run_path(explicit: Option<&Path>) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(path_utils::config_path);
    let state = if path.exists() { "" } else { " (missing, defaults in use)" };
    println!("{}{}", path.display(), state);
    Ok(())
}
