use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ambient configuration for the terminal core, loaded from
/// `~/.config/harborterm/config.json`. Covers only core concerns —
/// font/theme/window chrome belong to the renderer and are out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    pub scrollback_lines: usize,
    /// Overrides shell autodetection (`$SHELL`) when set.
    pub shell: Option<String>,
    pub term: String,
    pub colorterm: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            scrollback_lines: 10_000,
            shell: None,
            term: "xterm-256color".to_string(),
            colorterm: "truecolor".to_string(),
        }
    }
}

impl CoreConfig {
    /// Load config from the standard path, falling back to defaults on any
    /// read or parse failure (logged at `warn`, never fatal).
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(error = %e, "failed to parse config"),
                },
                Err(e) => tracing::warn!(error = %e, "failed to read config"),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> std::io::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .expect("CoreConfig serialization is infallible");
        std::fs::write(path, content)
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("harborterm")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = CoreConfig::default();
        assert_eq!(c.scrollback_lines, 10_000);
        assert!(c.shell.is_none());
        assert_eq!(c.term, "xterm-256color");
    }
}
