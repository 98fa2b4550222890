//! Engine settings and TOML layout files.
//!
//! Layout files are only read at build time. Each file describes one layout and is
//! turned into an immutable [`Layout`] through [`LayoutBuilder`]; a file that fails to
//! parse or validate is logged and skipped without affecting the others.

use crate::error::{ConfigError, ConfigResult, LayoutError, LayoutResult};
use crate::icon::{Icon, TextureRef, Visual};
use crate::layout::{Layout, LayoutBuilder};
use crate::types::Slot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

fn default_main_language() -> String {
    "en".to_string()
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_lookup_timeout() -> u64 {
    5000
}

fn default_amount() -> u8 {
    1
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Language every layout must have a title for.
    #[serde(default = "default_main_language")]
    pub main_language: String,
    /// Languages a container is rendered for. The main language is always included.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Seconds a per-owner menu may sit idle before it is torn down.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    /// Hard upper bound for one texture lookup, in milliseconds.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_ms: u64,
    /// Sound played on icon clicks when the layout sets none.
    #[serde(default)]
    pub default_click_sound: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            main_language: default_main_language(),
            languages: Vec::new(),
            idle_timeout_secs: default_idle_timeout(),
            lookup_timeout_ms: default_lookup_timeout(),
            default_click_sound: None,
        }
    }
}

impl EngineSettings {
    /// Loaded languages, main language first and without duplicates.
    pub fn loaded_languages(&self) -> Vec<String> {
        let mut languages = vec![self.main_language.clone()];
        for language in &self.languages {
            if !languages.contains(language) {
                languages.push(language.clone());
            }
        }
        languages
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.main_language.is_empty() {
            return Err("Main language cannot be empty".to_string());
        }
        if self.idle_timeout_secs == 0 {
            return Err("Idle timeout must be greater than zero".to_string());
        }
        if self.lookup_timeout_ms == 0 {
            return Err("Lookup timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// One icon as written in a layout file.
#[derive(Debug, Clone, Deserialize)]
pub struct IconConfig {
    pub id: String,
    #[serde(default)]
    pub slot: Option<Slot>,
    pub material: String,
    #[serde(default = "default_amount")]
    pub amount: u8,
    #[serde(default)]
    pub damage: u16,
    #[serde(default)]
    pub glow: bool,
    /// Literal texture url.
    #[serde(default)]
    pub texture: Option<String>,
    /// Identity whose texture is looked up; may contain placeholders.
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub keep_open: Option<bool>,
    #[serde(default)]
    pub names: HashMap<String, String>,
    #[serde(default)]
    pub lore: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub enchantments: BTreeMap<String, u16>,
}

impl IconConfig {
    /// Builds the icon; `fallback_slot` is used when the file gives none.
    fn into_icon(self, fallback_slot: Option<Slot>) -> LayoutResult<Icon> {
        let slot = self
            .slot
            .or(fallback_slot)
            .ok_or_else(|| LayoutError::MissingSlot { icon: self.id.clone() })?;
        let texture = match (self.texture, self.identity) {
            (Some(url), _) => Some(TextureRef::Url(url)),
            (None, Some(identity)) => Some(TextureRef::Identity(identity)),
            (None, None) => None,
        };

        let mut icon = Icon::new(
            self.id,
            slot,
            Visual {
                material: self.material,
                amount: self.amount,
                damage: self.damage,
                glow: self.glow,
                texture,
            },
        );
        icon.permission = self.permission;
        icon.commands = self.commands;
        icon.flags = self.flags;
        icon.keep_open = self.keep_open;
        icon.names = self.names;
        icon.lore = self.lore;
        icon.enchantments = self.enchantments;
        Ok(icon)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FillConfig {
    pub start: Slot,
    pub end: Slot,
    pub empty: Option<IconConfig>,
    #[serde(default)]
    pub templates: HashMap<String, IconConfig>,
}

/// One layout file.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutFile {
    pub id: String,
    pub rows: u8,
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub click_sound: Option<String>,
    #[serde(default)]
    pub keep_open: bool,
    #[serde(default)]
    pub titles: HashMap<String, String>,
    #[serde(default)]
    pub open_actions: Vec<String>,
    #[serde(default)]
    pub icons: Vec<IconConfig>,
    #[serde(default)]
    pub fill: Option<FillConfig>,
}

impl LayoutFile {
    pub fn into_layout(self, main_language: &str) -> LayoutResult<Layout> {
        let mut builder = LayoutBuilder::new(self.id, self.rows).keep_open(self.keep_open);
        for (language, title) in self.titles {
            builder = builder.title(language, title);
        }
        if let Some(permission) = self.permission {
            builder = builder.permission(permission);
        }
        if let Some(sound) = self.click_sound {
            builder = builder.click_sound(sound);
        }
        for action in self.open_actions {
            builder = builder.open_action(action);
        }
        for icon in self.icons {
            builder = builder.icon(icon.into_icon(None)?);
        }
        if let Some(fill) = self.fill {
            let empty = fill.empty.ok_or(LayoutError::MissingEmptyIcon)?;
            builder = builder.fill(fill.start, fill.end, empty.into_icon(None)?);
            for (name, template) in fill.templates {
                builder = builder.template(name, template.into_icon(Some(0))?);
            }
        }
        builder.build(main_language)
    }
}

/// Parses and validates one layout document.
pub fn parse_layout(content: &str, origin: &Path, main_language: &str) -> ConfigResult<Layout> {
    let file: LayoutFile =
        toml::from_str(content).map_err(|e| ConfigError::Parse(origin.to_path_buf(), e))?;
    file.into_layout(main_language)
        .map_err(|e| ConfigError::Layout(origin.to_path_buf(), e))
}

/// Read-only collection of built layouts, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct LayoutCatalog {
    layouts: HashMap<String, Arc<Layout>>,
}

impl LayoutCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, layout: Layout) {
        self.layouts.insert(layout.id().to_string(), Arc::new(layout));
    }

    pub fn get(&self, id: &str) -> Option<Arc<Layout>> {
        self.layouts.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.layouts.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Loads every `*.toml` file in `directory`. Invalid files are logged and skipped.
    pub fn load_dir(directory: &Path, main_language: &str) -> ConfigResult<Self> {
        let entries = std::fs::read_dir(directory)
            .map_err(|e| ConfigError::DirectoryRead(directory.to_path_buf(), e))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
            .collect();
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            match Self::load_file(&path, main_language) {
                Ok(layout) => {
                    info!("Loaded menu layout '{}' from {}", layout.id(), path.display());
                    catalog.insert(layout);
                }
                Err(e) => warn!("Skipping menu layout: {}", e),
            }
        }
        Ok(catalog)
    }

    fn load_file(path: &Path, main_language: &str) -> ConfigResult<Layout> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        parse_layout(&content, path, main_language)
    }
}
