use std::path::PathBuf;

/// Cross-platform data directory.
/// Linux: ~/.config/chat-digest/
/// macOS: ~/Library/Application Support/chat-digest/
/// Windows: %APPDATA%/chat-digest/
pub fn data_dir() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    });
    base.join("chat-digest")
}

/// {data_dir}/messages.db
pub fn default_db_path() -> PathBuf {
    data_dir().join("messages.db")
}

/// {data_dir}/config.toml
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// {data_dir}/digest.log
pub fn log_path() -> PathBuf {
    data_dir().join("digest.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_live_under_data_dir() {
        let root = data_dir();
        assert!(root.ends_with("chat-digest"));
        assert_eq!(default_db_path().parent(), Some(root.as_path()));
        assert_eq!(config_path().file_name().unwrap(), "config.toml");
        assert!(log_path().starts_with(&root));
    }
}
