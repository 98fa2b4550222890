//! Builds the concrete slot contents of one page for every loaded language.

use crate::icon::{Icon, IconKind};
use crate::layout::Layout;
use crate::pagination::is_hidden;
use crate::ports::Container;
use crate::resolver::{LookupBatch, SlotTarget, TextureResolver};
use crate::text::{colorize, fill_placeholders, Placeholders};
use crate::types::Slot;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Formats a raw title: `(raw title, language, page index) -> title`.
pub type TitleHook = Arc<dyn Fn(&str, &str, usize) -> String + Send + Sync>;

/// Containers and generated icons of one page.
pub struct PageView {
    /// One container per loaded language.
    pub containers: HashMap<String, Box<dyn Container>>,
    pub generated: BTreeMap<Slot, Icon>,
}

impl PageView {
    pub fn new(containers: HashMap<String, Box<dyn Container>>) -> Self {
        Self {
            containers,
            generated: BTreeMap::new(),
        }
    }

    pub fn container_mut(&mut self, language: &str) -> Option<&mut Box<dyn Container>> {
        self.containers.get_mut(language)
    }
}

/// `{page}` (1-based) and `{pages}` for static text.
pub fn page_placeholders(page: usize, page_count: usize) -> Placeholders {
    let mut placeholders = Placeholders::new();
    placeholders.insert("page".to_string(), (page + 1).to_string());
    placeholders.insert("pages".to_string(), page_count.to_string());
    placeholders
}

/// Everything one render pass shares across its pages.
pub struct RenderPass<'a> {
    pub layout: &'a Layout,
    pub languages: &'a [String],
    pub main_language: &'a str,
    pub page_count: usize,
    pub fillers_empty: bool,
    pub title_hook: Option<&'a TitleHook>,
    pub resolver: &'a dyn TextureResolver,
}

impl RenderPass<'_> {
    pub fn title(&self, language: &str, page: usize) -> String {
        let raw = self.layout.title(language, self.main_language);
        let title = match self.title_hook {
            Some(hook) => hook(raw, language, page),
            None => raw.to_string(),
        };
        colorize(&fill_placeholders(&title, &page_placeholders(page, self.page_count)))
    }

    /// Rewrites every language container of `page`. Identity textures that are not
    /// cached yet are added to `batch`.
    pub fn render_page(&self, page: usize, view: &mut PageView, batch: &mut LookupBatch) {
        let placeholders = page_placeholders(page, self.page_count);
        let PageView {
            containers,
            generated,
        } = view;

        for language in self.languages {
            let Some(container) = containers.get_mut(language) else {
                continue;
            };
            container.clear_all();
            container.set_title(&self.title(language, page));

            for icon in self.layout.icons() {
                if let IconKind::PageSwitcher(direction) = icon.kind {
                    if is_hidden(direction, page, self.page_count) {
                        continue;
                    }
                }
                self.place(container.as_mut(), language, page, icon, &placeholders, batch);
            }
            for icon in generated.values() {
                self.place(container.as_mut(), language, page, icon, &placeholders, batch);
            }
            if self.fillers_empty {
                if let Some(fill) = self.layout.fill() {
                    self.place(container.as_mut(), language, page, &fill.empty_icon, &placeholders, batch);
                }
            }
        }
    }

    fn place(
        &self,
        container: &mut dyn Container,
        language: &str,
        page: usize,
        icon: &Icon,
        placeholders: &Placeholders,
        batch: &mut LookupBatch,
    ) {
        let mut item = icon.view(language, self.main_language, placeholders);
        if let Some(identity) = icon.pending_identity() {
            match self.resolver.cached(identity) {
                Some(texture) => item.texture = Some(texture),
                None => batch.add(
                    identity,
                    SlotTarget {
                        language: language.to_string(),
                        page,
                        slot: icon.slot,
                    },
                ),
            }
        }
        container.set_slot(icon.slot, Some(item));
    }
}

/// Writes a resolved texture into the slot `target` points at, if it still holds an item.
pub fn apply_texture(pages: &mut [PageView], target: &SlotTarget, texture: &str) -> bool {
    let Some(container) = pages
        .get_mut(target.page)
        .and_then(|page| page.container_mut(&target.language))
    else {
        return false;
    };
    match container.get_slot(target.slot) {
        Some(mut item) => {
            item.texture = Some(texture.to_string());
            container.set_slot(target.slot, Some(item));
            true
        }
        None => false,
    }
}
