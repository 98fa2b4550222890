//! Icons: the static, page-switching and generated entries placed in menu slots,
//! and the rendered [`ItemView`] they turn into for one language.

use crate::text::{colorize, fill_placeholders, Placeholders};
use crate::types::Slot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Reserved id of the previous-page switcher.
pub const PREVIOUS_PAGE: &str = "previous-page";
/// Reserved id of the next-page switcher.
pub const NEXT_PAGE: &str = "next-page";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageDirection {
    Previous,
    Next,
}

impl PageDirection {
    pub fn icon_id(&self) -> &'static str {
        match self {
            PageDirection::Previous => PREVIOUS_PAGE,
            PageDirection::Next => NEXT_PAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Static,
    PageSwitcher(PageDirection),
    Generated,
}

impl IconKind {
    /// Kind of a layout icon, derived from its id.
    pub fn from_id(id: &str) -> Self {
        match id {
            PREVIOUS_PAGE => IconKind::PageSwitcher(PageDirection::Previous),
            NEXT_PAGE => IconKind::PageSwitcher(PageDirection::Next),
            _ => IconKind::Static,
        }
    }
}

/// Where an icon's texture comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureRef {
    /// A literal texture url, applied as-is.
    Url(String),
    /// An identity whose texture has to be looked up.
    Identity(String),
}

/// Opaque visual descriptor of an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visual {
    pub material: String,
    pub amount: u8,
    pub damage: u16,
    pub glow: bool,
    pub texture: Option<TextureRef>,
}

impl Visual {
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            amount: 1,
            damage: 0,
            glow: false,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: TextureRef) -> Self {
        self.texture = Some(texture);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    pub id: String,
    pub kind: IconKind,
    pub visual: Visual,
    pub slot: Slot,
    pub permission: Option<String>,
    pub commands: Vec<String>,
    pub flags: Vec<String>,
    pub names: HashMap<String, String>,
    pub lore: HashMap<String, Vec<String>>,
    pub enchantments: BTreeMap<String, u16>,
    /// Overrides the layout's keep-open behaviour when set.
    pub keep_open: Option<bool>,
}

impl Icon {
    pub fn new(id: impl Into<String>, slot: Slot, visual: Visual) -> Self {
        let id = id.into();
        Self {
            kind: IconKind::from_id(&id),
            id,
            visual,
            slot,
            permission: None,
            commands: Vec::new(),
            flags: Vec::new(),
            names: HashMap::new(),
            lore: HashMap::new(),
            enchantments: BTreeMap::new(),
            keep_open: None,
        }
    }

    pub fn with_name(mut self, language: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(language.into(), name.into());
        self
    }

    pub fn with_lore(mut self, language: impl Into<String>, lines: Vec<String>) -> Self {
        self.lore.insert(language.into(), lines);
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn with_commands(mut self, commands: Vec<String>) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_keep_open(mut self, keep_open: bool) -> Self {
        self.keep_open = Some(keep_open);
        self
    }

    pub fn is_switcher(&self) -> bool {
        matches!(self.kind, IconKind::PageSwitcher(_))
    }

    /// Display name for `language`, falling back to the main language.
    pub fn name_for(&self, language: &str, main: &str) -> Option<&str> {
        self.names
            .get(language)
            .or_else(|| self.names.get(main))
            .map(String::as_str)
    }

    /// Description lines for `language`, falling back to the main language.
    pub fn lore_for(&self, language: &str, main: &str) -> &[String] {
        self.lore
            .get(language)
            .or_else(|| self.lore.get(main))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Identity whose texture still has to be resolved, if any.
    pub fn pending_identity(&self) -> Option<&str> {
        match &self.visual.texture {
            Some(TextureRef::Identity(identity)) => Some(identity),
            _ => None,
        }
    }

    /// Renders the icon for one language. Identity textures are left unresolved.
    pub fn view(&self, language: &str, main: &str, placeholders: &Placeholders) -> ItemView {
        let name = self
            .name_for(language, main)
            .map(|name| colorize(&fill_placeholders(name, placeholders)));
        let lore = self
            .lore_for(language, main)
            .iter()
            .map(|line| colorize(&fill_placeholders(line, placeholders)))
            .collect();
        let texture = match &self.visual.texture {
            Some(TextureRef::Url(url)) => Some(url.clone()),
            _ => None,
        };

        ItemView {
            material: self.visual.material.clone(),
            amount: self.visual.amount,
            damage: self.visual.damage,
            glow: self.visual.glow,
            texture,
            name,
            lore,
            flags: self.flags.clone(),
            enchantments: self.enchantments.clone(),
        }
    }
}

/// The concrete item a container shows in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub material: String,
    pub amount: u8,
    pub damage: u16,
    pub glow: bool,
    pub texture: Option<String>,
    pub name: Option<String>,
    pub lore: Vec<String>,
    pub flags: Vec<String>,
    pub enchantments: BTreeMap<String, u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_reserved_ids() {
        assert_eq!(
            IconKind::from_id(PREVIOUS_PAGE),
            IconKind::PageSwitcher(PageDirection::Previous)
        );
        assert_eq!(
            IconKind::from_id(NEXT_PAGE),
            IconKind::PageSwitcher(PageDirection::Next)
        );
        assert_eq!(IconKind::from_id("close"), IconKind::Static);
    }

    #[test]
    fn test_view_falls_back_to_main_language() {
        let icon = Icon::new("info", 4, Visual::new("BOOK"))
            .with_name("en", "&6Page {page}")
            .with_lore("en", vec!["&7line".to_string()]);
        let mut placeholders = Placeholders::new();
        placeholders.insert("page".to_string(), "2".to_string());

        let view = icon.view("de", "en", &placeholders);
        assert_eq!(view.name.as_deref(), Some("§6Page 2"));
        assert_eq!(view.lore, vec!["§7line".to_string()]);
        assert_eq!(view.material, "BOOK");
        assert!(view.texture.is_none());
    }

    #[test]
    fn test_view_applies_literal_texture_only() {
        let literal = Icon::new("a", 0, Visual::new("HEAD").with_texture(TextureRef::Url("http://t/1".into())));
        let identity = Icon::new("b", 1, Visual::new("HEAD").with_texture(TextureRef::Identity("Steve".into())));

        assert_eq!(literal.view("en", "en", &Placeholders::new()).texture.as_deref(), Some("http://t/1"));
        assert!(literal.pending_identity().is_none());
        assert!(identity.view("en", "en", &Placeholders::new()).texture.is_none());
        assert_eq!(identity.pending_identity(), Some("Steve"));
    }
}
