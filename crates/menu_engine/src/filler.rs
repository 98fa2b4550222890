//! Fillers: the live data items backing generated icons.

use crate::icon::{Icon, IconKind, TextureRef};
use crate::text::{fill_placeholders, Placeholders};
use crate::types::Slot;
use std::collections::HashMap;

/// One live data item (a ban, a warning, a player...) shown as one generated icon.
pub trait Filler: Send + Sync {
    /// Name of the layout template this filler is stamped from.
    fn template(&self) -> &str;

    /// Placeholder values for one language.
    fn placeholders(&self, language: &str) -> Placeholders;

    /// Final adjustments to the stamped icon.
    fn customize(&self, _icon: &mut Icon) {}
}

/// Template name used when a filler's own template is missing from the layout.
pub const DEFAULT_TEMPLATE: &str = "default";

/// A filler with fixed placeholders, keyed by language.
#[derive(Debug, Clone, Default)]
pub struct MapFiller {
    template: String,
    placeholders: HashMap<String, Placeholders>,
}

impl MapFiller {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            placeholders: HashMap::new(),
        }
    }

    pub fn with(mut self, language: &str, name: &str, value: impl Into<String>) -> Self {
        self.placeholders
            .entry(language.to_string())
            .or_default()
            .insert(name.to_string(), value.into());
        self
    }
}

impl Filler for MapFiller {
    fn template(&self) -> &str {
        &self.template
    }

    fn placeholders(&self, language: &str) -> Placeholders {
        self.placeholders.get(language).cloned().unwrap_or_default()
    }
}

/// Stamps a generated icon for `filler` at `slot` from `template`.
///
/// Names and lore are substituted per language; commands and the texture identity use
/// the main language placeholders.
pub fn stamp(
    template: &Icon,
    filler: &dyn Filler,
    slot: Slot,
    languages: &[String],
    main: &str,
) -> Icon {
    let main_placeholders = filler.placeholders(main);
    let mut icon = template.clone();
    icon.kind = IconKind::Generated;
    icon.slot = slot;

    let mut names = HashMap::new();
    let mut lore = HashMap::new();
    for language in languages {
        let placeholders = if language == main {
            main_placeholders.clone()
        } else {
            let mut merged = main_placeholders.clone();
            merged.extend(filler.placeholders(language));
            merged
        };
        if let Some(name) = template.name_for(language, main) {
            names.insert(language.clone(), fill_placeholders(name, &placeholders));
        }
        let lines = template.lore_for(language, main);
        if !lines.is_empty() {
            lore.insert(
                language.clone(),
                lines.iter().map(|line| fill_placeholders(line, &placeholders)).collect(),
            );
        }
    }
    icon.names = names;
    icon.lore = lore;
    icon.commands = template
        .commands
        .iter()
        .map(|command| fill_placeholders(command, &main_placeholders))
        .collect();
    if let Some(TextureRef::Identity(identity)) = &template.visual.texture {
        icon.visual.texture = Some(TextureRef::Identity(fill_placeholders(identity, &main_placeholders)));
    }

    filler.customize(&mut icon);
    icon
}
