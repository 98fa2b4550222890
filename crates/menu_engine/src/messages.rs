//! Localized notices sent by the engine (denials, timeouts, loading).

use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::path::Path;

/// Message keys the engine looks up.
pub mod keys {
    pub const NO_PERMISSION: &str = "menu-no-permission";
    pub const TIMEOUT: &str = "menu-timeout";
    pub const OWNER_LEFT: &str = "menu-owner-left";
    pub const LOADING: &str = "menu-loading";
    pub const UNAVAILABLE: &str = "menu-unavailable";
}

/// Localization lookup: language and key to display text.
pub trait MessageSource: Send + Sync {
    fn message(&self, language: &str, key: &str) -> String;
}

/// Message tables keyed by language, falling back to the main language and then the key.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    main_language: String,
    tables: HashMap<String, HashMap<String, String>>,
}

impl MessageCatalog {
    pub fn new(main_language: impl Into<String>) -> Self {
        Self {
            main_language: main_language.into(),
            tables: HashMap::new(),
        }
    }

    /// English defaults for every engine key.
    pub fn with_defaults(main_language: impl Into<String>) -> Self {
        let main_language = main_language.into();
        let catalog = Self::new(main_language.clone());
        [
            (keys::NO_PERMISSION, "&cYou do not have permission to do that."),
            (keys::TIMEOUT, "&7This menu expired and was closed."),
            (keys::OWNER_LEFT, "&7The owner of this menu left, so it was closed."),
            (keys::LOADING, "&eThis menu is still loading, try again in a moment."),
            (keys::UNAVAILABLE, "&cThis menu is no longer available."),
        ]
        .into_iter()
        .fold(catalog, |catalog, (key, text)| catalog.with(&main_language, key, text))
    }

    pub fn with(mut self, language: &str, key: &str, text: &str) -> Self {
        self.insert(language, key, text);
        self
    }

    pub fn insert(&mut self, language: &str, key: &str, text: &str) {
        self.tables
            .entry(language.to_string())
            .or_default()
            .insert(key.to_string(), text.to_string());
    }

    /// Merges `[language] key = "text"` tables from a TOML document.
    pub fn merge_toml(&mut self, content: &str, origin: &Path) -> ConfigResult<()> {
        let tables: HashMap<String, HashMap<String, String>> =
            toml::from_str(content).map_err(|e| ConfigError::Parse(origin.to_path_buf(), e))?;
        for (language, entries) in tables {
            for (key, text) in entries {
                self.insert(&language, &key, &text);
            }
        }
        Ok(())
    }

    /// Loads a TOML message file on top of the defaults.
    pub fn load(path: &Path, main_language: &str) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        let mut catalog = Self::with_defaults(main_language);
        catalog.merge_toml(&content, path)?;
        Ok(catalog)
    }
}

impl MessageSource for MessageCatalog {
    fn message(&self, language: &str, key: &str) -> String {
        self.tables
            .get(language)
            .and_then(|table| table.get(key))
            .or_else(|| {
                self.tables
                    .get(&self.main_language)
                    .and_then(|table| table.get(key))
            })
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_fallback_chain() {
        let catalog = MessageCatalog::with_defaults("en").with("de", keys::TIMEOUT, "Abgelaufen");

        assert_eq!(catalog.message("de", keys::TIMEOUT), "Abgelaufen");
        assert_eq!(
            catalog.message("de", keys::LOADING),
            catalog.message("en", keys::LOADING)
        );
        assert_eq!(catalog.message("en", "unknown-key"), "unknown-key");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[de]\nmenu-no-permission = \"Keine Rechte\"").unwrap();

        let catalog = MessageCatalog::load(file.path(), "en").unwrap();
        assert_eq!(catalog.message("de", keys::NO_PERMISSION), "Keine Rechte");
        assert!(catalog.message("en", keys::NO_PERMISSION).contains("permission"));
    }

    #[test]
    fn test_invalid_file_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not = [valid").unwrap();

        assert!(matches!(
            MessageCatalog::load(file.path(), "en"),
            Err(ConfigError::Parse(_, _))
        ));
    }
}
