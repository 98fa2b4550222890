//! Immutable menu layouts and the builder that validates them.

use crate::error::{LayoutError, LayoutResult};
use crate::icon::{Icon, PageDirection, NEXT_PAGE, PREVIOUS_PAGE};
use crate::types::{Slot, MAX_ROWS, ROW_WIDTH};
use std::collections::{BTreeMap, HashMap};

/// The slot range reserved for filler-driven content, with its templates.
#[derive(Debug, Clone)]
pub struct FillArea {
    pub start: Slot,
    /// Inclusive.
    pub end: Slot,
    pub empty_icon: Icon,
    pub templates: HashMap<String, Icon>,
}

impl FillArea {
    pub fn contains(&self, slot: Slot) -> bool {
        (self.start..=self.end).contains(&slot)
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// A validated menu template. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Layout {
    id: String,
    rows: u8,
    icons: BTreeMap<Slot, Icon>,
    titles: HashMap<String, String>,
    click_sound: Option<String>,
    open_actions: Vec<String>,
    permission: Option<String>,
    keep_open: bool,
    fill: Option<FillArea>,
}

impl Layout {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn size(&self) -> usize {
        self.rows as usize * ROW_WIDTH
    }

    pub fn icons(&self) -> impl Iterator<Item = &Icon> {
        self.icons.values()
    }

    pub fn icon_at(&self, slot: Slot) -> Option<&Icon> {
        self.icons.get(&slot)
    }

    pub fn switcher(&self, direction: PageDirection) -> Option<&Icon> {
        self.icons.values().find(|icon| icon.id == direction.icon_id())
    }

    /// Title for `language`, falling back to the main language title.
    pub fn title(&self, language: &str, main: &str) -> &str {
        self.titles
            .get(language)
            .or_else(|| self.titles.get(main))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn click_sound(&self) -> Option<&str> {
        self.click_sound.as_deref()
    }

    pub fn open_actions(&self) -> &[String] {
        &self.open_actions
    }

    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    pub fn keep_open(&self) -> bool {
        self.keep_open
    }

    pub fn fill(&self) -> Option<&FillArea> {
        self.fill.as_ref()
    }

    pub fn is_fillable(&self) -> bool {
        self.fill.is_some()
    }

    /// Number of static icons sitting inside the fill range.
    pub fn reserved_in_range(&self) -> usize {
        match &self.fill {
            Some(fill) => self.icons.keys().filter(|slot| fill.contains(**slot)).count(),
            None => 0,
        }
    }

    /// Generated icons that fit on one page. Zero for non-fillable layouts.
    pub fn per_page(&self) -> usize {
        match &self.fill {
            Some(fill) => fill.len().saturating_sub(self.reserved_in_range()),
            None => 0,
        }
    }

    /// Free fill-range slots in scan order, skipping static icons.
    pub fn free_slots(&self) -> Vec<Slot> {
        match &self.fill {
            Some(fill) => (fill.start..=fill.end)
                .filter(|slot| !self.icons.contains_key(slot))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Collects layout parts and validates them into an immutable [`Layout`].
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    id: String,
    rows: u8,
    icons: Vec<Icon>,
    titles: HashMap<String, String>,
    click_sound: Option<String>,
    open_actions: Vec<String>,
    permission: Option<String>,
    keep_open: bool,
    fill: Option<FillArea>,
}

impl LayoutBuilder {
    pub fn new(id: impl Into<String>, rows: u8) -> Self {
        Self {
            id: id.into(),
            rows,
            icons: Vec::new(),
            titles: HashMap::new(),
            click_sound: None,
            open_actions: Vec::new(),
            permission: None,
            keep_open: false,
            fill: None,
        }
    }

    pub fn title(mut self, language: impl Into<String>, title: impl Into<String>) -> Self {
        self.titles.insert(language.into(), title.into());
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icons.push(icon);
        self
    }

    pub fn click_sound(mut self, sound: impl Into<String>) -> Self {
        self.click_sound = Some(sound.into());
        self
    }

    pub fn open_action(mut self, action: impl Into<String>) -> Self {
        self.open_actions.push(action.into());
        self
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn keep_open(mut self, keep_open: bool) -> Self {
        self.keep_open = keep_open;
        self
    }

    pub fn fill(mut self, start: Slot, end: Slot, empty_icon: Icon) -> Self {
        self.fill = Some(FillArea {
            start,
            end,
            empty_icon,
            templates: HashMap::new(),
        });
        self
    }

    /// Adds a named template. Has no effect unless [`fill`](Self::fill) was called first.
    pub fn template(mut self, name: impl Into<String>, icon: Icon) -> Self {
        if let Some(fill) = self.fill.as_mut() {
            fill.templates.insert(name.into(), icon);
        }
        self
    }

    pub fn build(self, main_language: &str) -> LayoutResult<Layout> {
        if self.rows == 0 || self.rows > MAX_ROWS {
            return Err(LayoutError::InvalidRows(self.rows));
        }
        if !self.titles.contains_key(main_language) {
            return Err(LayoutError::MissingMainTitle(main_language.to_string()));
        }

        let size = self.rows as usize * ROW_WIDTH;
        let mut icons: BTreeMap<Slot, Icon> = BTreeMap::new();
        for icon in self.icons {
            if icon.slot >= size {
                return Err(LayoutError::SlotOutOfBounds {
                    icon: icon.id,
                    slot: icon.slot,
                    size,
                });
            }
            if let Some(existing) = icons.get(&icon.slot) {
                return Err(LayoutError::SlotTaken {
                    slot: icon.slot,
                    first: existing.id.clone(),
                    second: icon.id,
                });
            }
            icons.insert(icon.slot, icon);
        }

        if let Some(fill) = &self.fill {
            if fill.start > fill.end || fill.end >= size {
                return Err(LayoutError::InvalidFillRange {
                    start: fill.start,
                    end: fill.end,
                });
            }
            if fill.empty_icon.slot >= size {
                return Err(LayoutError::SlotOutOfBounds {
                    icon: fill.empty_icon.id.clone(),
                    slot: fill.empty_icon.slot,
                    size,
                });
            }
            if let Some(icon) = icons.values().find(|icon| icon.is_switcher() && fill.contains(icon.slot)) {
                return Err(LayoutError::SwitcherInFillRange {
                    icon: icon.id.clone(),
                    slot: icon.slot,
                });
            }
            for required in [PREVIOUS_PAGE, NEXT_PAGE] {
                if !icons.values().any(|icon| icon.id == required) {
                    return Err(LayoutError::MissingSwitcher(required));
                }
            }
            if fill.templates.is_empty() {
                return Err(LayoutError::NoTemplates);
            }
        }

        Ok(Layout {
            id: self.id,
            rows: self.rows,
            icons,
            titles: self.titles,
            click_sound: self.click_sound,
            open_actions: self.open_actions,
            permission: self.permission,
            keep_open: self.keep_open,
            fill: self.fill,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::Visual;

    fn switchers(builder: LayoutBuilder) -> LayoutBuilder {
        builder
            .icon(Icon::new(PREVIOUS_PAGE, 45, Visual::new("ARROW")))
            .icon(Icon::new(NEXT_PAGE, 53, Visual::new("ARROW")))
    }

    fn fillable() -> LayoutBuilder {
        switchers(LayoutBuilder::new("bans", 6).title("en", "Bans"))
            .fill(9, 44, Icon::new("empty", 22, Visual::new("BARRIER")))
            .template("ban", Icon::new("ban", 0, Visual::new("PAPER")))
    }

    #[test]
    fn test_build_fillable_layout() {
        let layout = fillable()
            .icon(Icon::new("deco-a", 9, Visual::new("GLASS")))
            .icon(Icon::new("deco-b", 17, Visual::new("GLASS")))
            .build("en")
            .unwrap();

        assert_eq!(layout.size(), 54);
        assert_eq!(layout.reserved_in_range(), 2);
        assert_eq!(layout.per_page(), 34);
        assert_eq!(layout.free_slots().len(), 34);
        assert_eq!(layout.free_slots()[0], 10);
        assert!(layout.switcher(PageDirection::Next).is_some());
    }

    #[test]
    fn test_switcher_inside_fill_range_is_rejected() {
        let result = LayoutBuilder::new("bad", 6)
            .title("en", "Bad")
            .icon(Icon::new(PREVIOUS_PAGE, 10, Visual::new("ARROW")))
            .icon(Icon::new(NEXT_PAGE, 53, Visual::new("ARROW")))
            .fill(9, 44, Icon::new("empty", 22, Visual::new("BARRIER")))
            .template("ban", Icon::new("ban", 0, Visual::new("PAPER")))
            .build("en");

        assert!(matches!(
            result,
            Err(LayoutError::SwitcherInFillRange { slot: 10, .. })
        ));
    }

    #[test]
    fn test_missing_switcher_is_rejected() {
        let result = LayoutBuilder::new("bad", 6)
            .title("en", "Bad")
            .icon(Icon::new(PREVIOUS_PAGE, 45, Visual::new("ARROW")))
            .fill(9, 44, Icon::new("empty", 22, Visual::new("BARRIER")))
            .template("ban", Icon::new("ban", 0, Visual::new("PAPER")))
            .build("en");

        assert!(matches!(result, Err(LayoutError::MissingSwitcher(NEXT_PAGE))));
    }

    #[test]
    fn test_single_page_layout_needs_no_fill_range() {
        let layout = LayoutBuilder::new("menu", 3)
            .title("en", "Menu")
            .icon(Icon::new("close", 26, Visual::new("BARRIER")))
            .build("en")
            .unwrap();

        assert!(!layout.is_fillable());
        assert_eq!(layout.per_page(), 0);
        assert!(layout.free_slots().is_empty());
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(
            LayoutBuilder::new("x", 7).title("en", "X").build("en"),
            Err(LayoutError::InvalidRows(7))
        ));
        assert!(matches!(
            LayoutBuilder::new("x", 1).title("de", "X").build("en"),
            Err(LayoutError::MissingMainTitle(_))
        ));
        assert!(matches!(
            LayoutBuilder::new("x", 1)
                .title("en", "X")
                .icon(Icon::new("far", 9, Visual::new("STONE")))
                .build("en"),
            Err(LayoutError::SlotOutOfBounds { slot: 9, size: 9, .. })
        ));
        assert!(matches!(
            LayoutBuilder::new("x", 1)
                .title("en", "X")
                .icon(Icon::new("a", 3, Visual::new("STONE")))
                .icon(Icon::new("b", 3, Visual::new("STONE")))
                .build("en"),
            Err(LayoutError::SlotTaken { slot: 3, .. })
        ));
    }

    #[test]
    fn test_title_fallback() {
        let layout = fillable().title("de", "Sperren").build("en").unwrap();
        assert_eq!(layout.title("de", "en"), "Sperren");
        assert_eq!(layout.title("fr", "en"), "Bans");
    }
}
