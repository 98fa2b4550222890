//! Menu instances.
//!
//! A [`Menu`] is one live GUI built from a [`Layout`]: shared by everyone or bound to a
//! single owner, single-page or fillable. All of its mutable state sits behind one
//! mutex, so render passes on the same instance never overlap. Observers, commands and
//! registry calls always run after that lock is released.

use crate::events::{Cancellable, EmptySlotClickEvent, IconClickEvent, MenuDragEvent, MenuEventBus, MenuOpenEvent};
use crate::filler::{stamp, Filler, DEFAULT_TEMPLATE};
use crate::icon::{Icon, IconKind, PageDirection};
use crate::layout::Layout;
use crate::messages::{keys, MessageSource};
use crate::pagination::{is_hidden, PagePlan};
use crate::ports::{ContainerFactory, ContainerSnapshot, PlayerPort};
use crate::registry::MenuRegistry;
use crate::render::{apply_texture, PageView, RenderPass, TitleHook};
use crate::resolver::{self, LookupBatch, SlotTarget, TextureResolver};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::text::colorize;
use crate::types::{ClickType, CommandSender, MenuClick, MenuDrag, PlayerId};
use crate::{config::EngineSettings, error::MenuError, error::MenuResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, warn};

/// Collaborators every menu instance shares.
pub struct MenuServices {
    pub settings: EngineSettings,
    pub scheduler: Arc<dyn Scheduler>,
    pub containers: Arc<dyn ContainerFactory>,
    pub players: Arc<dyn PlayerPort>,
    pub messages: Arc<dyn MessageSource>,
    pub resolver: Arc<dyn TextureResolver>,
    pub events: Arc<MenuEventBus>,
    languages: Vec<String>,
}

impl MenuServices {
    pub fn new(
        settings: EngineSettings,
        scheduler: Arc<dyn Scheduler>,
        containers: Arc<dyn ContainerFactory>,
        players: Arc<dyn PlayerPort>,
        messages: Arc<dyn MessageSource>,
        resolver: Arc<dyn TextureResolver>,
    ) -> Self {
        let languages = settings.loaded_languages();
        Self {
            settings,
            scheduler,
            containers,
            players,
            messages,
            resolver,
            events: Arc::new(MenuEventBus::new()),
            languages,
        }
    }

    /// Loaded languages, main language first.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn main_language(&self) -> &str {
        &self.settings.main_language
    }

    /// The player's language if it is loaded, otherwise the main language.
    pub fn language_of(&self, player: PlayerId) -> String {
        self.players
            .language(player)
            .filter(|language| self.languages.contains(language))
            .unwrap_or_else(|| self.settings.main_language.clone())
    }

    /// Sends a localized, colorized notice.
    pub fn notify(&self, player: PlayerId, language: &str, key: &str) {
        let text = self.messages.message(language, key);
        self.players.send_message(player, &colorize(&text));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    SinglePage,
    Fillable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Shared,
    PerOwner(PlayerId),
}

/// Result of an open request that did not violate a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// An observer cancelled the open event.
    Cancelled,
    /// The viewer lacks the menu permission.
    Denied,
    /// Fillers have not been supplied yet.
    Loading,
    /// The instance was torn down.
    Unavailable,
}

/// What the event router did with a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not a viewer of this menu, or outside the menu container.
    Ignored,
    EmptySlot,
    Denied,
    Cancelled,
    /// A suppressed page switcher was clicked.
    Hidden,
    Handled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    IdleTimeout,
    OwnerLeft,
    Closed,
    Invalidated,
}

impl TeardownReason {
    fn notice(&self) -> Option<&'static str> {
        match self {
            TeardownReason::IdleTimeout => Some(keys::TIMEOUT),
            TeardownReason::OwnerLeft => Some(keys::OWNER_LEFT),
            TeardownReason::Closed | TeardownReason::Invalidated => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Viewer {
    page: usize,
    language: String,
}

struct MenuState {
    /// `None` until a fillable menu receives its first filler list.
    fillers: Option<Vec<Arc<dyn Filler>>>,
    pages: Vec<PageView>,
    viewers: HashMap<PlayerId, Viewer>,
    /// Bumped on every render pass and on teardown; texture results from older
    /// generations are discarded.
    generation: u64,
    idle_timer: Option<TaskHandle>,
    idle_epoch: u64,
    closed: bool,
}

pub struct Menu {
    id: String,
    layout: Arc<Layout>,
    ownership: Ownership,
    services: Arc<MenuServices>,
    title_hook: Option<TitleHook>,
    registry: Weak<MenuRegistry>,
    weak_self: Weak<Menu>,
    state: Mutex<MenuState>,
}

impl std::fmt::Debug for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu")
            .field("id", &self.id)
            .field("layout", &self.layout.id())
            .field("ownership", &self.ownership)
            .finish()
    }
}

impl Menu {
    /// Builds the instance and runs its first render pass.
    pub fn new(
        id: impl Into<String>,
        layout: Arc<Layout>,
        ownership: Ownership,
        services: Arc<MenuServices>,
        title_hook: Option<TitleHook>,
        registry: Weak<MenuRegistry>,
    ) -> Arc<Self> {
        let fillers = if layout.is_fillable() { None } else { Some(Vec::new()) };
        let menu = Arc::new_cyclic(|weak_self| Self {
            id: id.into(),
            layout,
            ownership,
            services,
            title_hook,
            registry,
            weak_self: weak_self.clone(),
            state: Mutex::new(MenuState {
                fillers,
                pages: Vec::new(),
                viewers: HashMap::new(),
                generation: 0,
                idle_timer: None,
                idle_epoch: 0,
                closed: false,
            }),
        });
        menu.render();
        info!("Created menu '{}' ({:?}, {:?})", menu.id, menu.kind(), menu.ownership);
        menu
    }

    fn lock(&self) -> MutexGuard<'_, MenuState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn owner(&self) -> Option<PlayerId> {
        match self.ownership {
            Ownership::PerOwner(owner) => Some(owner),
            Ownership::Shared => None,
        }
    }

    pub fn kind(&self) -> MenuKind {
        if self.layout.is_fillable() {
            MenuKind::Fillable
        } else {
            MenuKind::SinglePage
        }
    }

    pub fn page_count(&self) -> usize {
        self.lock().pages.len()
    }

    pub fn viewer_page(&self, player: PlayerId) -> Option<usize> {
        self.lock().viewers.get(&player).map(|viewer| viewer.page)
    }

    pub fn viewers(&self) -> Vec<PlayerId> {
        let mut viewers: Vec<PlayerId> = self.lock().viewers.keys().copied().collect();
        viewers.sort();
        viewers
    }

    /// Generated icons currently on `page`, in slot order.
    pub fn generated_on(&self, page: usize) -> Vec<Icon> {
        self.lock()
            .pages
            .get(page)
            .map(|view| view.generated.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self, language: &str, page: usize) -> Option<ContainerSnapshot> {
        let state = self.lock();
        let container = state.pages.get(page)?.containers.get(language)?;
        Some(ContainerSnapshot::capture(container.as_ref()))
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn is_loading(&self) -> bool {
        self.lock().fillers.is_none()
    }

    /// Replaces the filler list wholesale and re-renders.
    pub fn set_fillers(&self, fillers: Vec<Arc<dyn Filler>>) {
        let mut state = self.lock();
        if state.closed {
            debug!("Ignoring fillers for closed menu '{}'", self.id);
            return;
        }
        if !self.layout.is_fillable() {
            warn!("Menu '{}' has no fill range, ignoring {} fillers", self.id, fillers.len());
            return;
        }
        state.fillers = Some(fillers);
        self.render_locked(&mut state);
    }

    /// Runs a full render pass.
    pub fn render(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        self.render_locked(&mut state);
    }

    fn render_locked(&self, state: &mut MenuState) {
        state.generation += 1;
        let generation = state.generation;
        let languages = self.services.languages();
        let main = self.services.main_language();
        let fillers = state.fillers.clone().unwrap_or_default();
        let plan = PagePlan::new(&self.layout, fillers.len());

        if plan.per_page == 0 && !fillers.is_empty() {
            warn!("Menu '{}' has no room for {} fillers", self.id, fillers.len());
        }

        while state.pages.len() < plan.page_count {
            let containers = languages
                .iter()
                .map(|language| {
                    let title = self.layout.title(language, main);
                    (language.clone(), self.services.containers.create(self.layout.rows(), title))
                })
                .collect();
            state.pages.push(PageView::new(containers));
        }
        if state.pages.len() > plan.page_count {
            self.relocate_viewers(state, plan.page_count - 1);
            state.pages.truncate(plan.page_count);
        }

        let templates = self.layout.fill().map(|fill| &fill.templates);
        for (index, page) in state.pages.iter_mut().enumerate() {
            page.generated = BTreeMap::new();
            let Some(templates) = templates else {
                continue;
            };
            for (slot, filler_index) in plan.assignments(index) {
                let filler = &fillers[filler_index];
                let template = templates
                    .get(filler.template())
                    .or_else(|| templates.get(DEFAULT_TEMPLATE));
                match template {
                    Some(template) => {
                        let icon = stamp(template, filler.as_ref(), slot, languages, main);
                        page.generated.insert(slot, icon);
                    }
                    None => warn!("Menu '{}' has no template '{}'", self.id, filler.template()),
                }
            }
        }

        let pass = RenderPass {
            layout: &self.layout,
            languages,
            main_language: main,
            page_count: plan.page_count,
            fillers_empty: fillers.is_empty(),
            title_hook: self.title_hook.as_ref(),
            resolver: self.services.resolver.as_ref(),
        };
        let mut batch = LookupBatch::default();
        for (index, page) in state.pages.iter_mut().enumerate() {
            pass.render_page(index, page, &mut batch);
        }

        debug!(
            "Rendered menu '{}': {} pages, {} fillers, generation {}, {} texture lookups",
            self.id,
            plan.page_count,
            fillers.len(),
            generation,
            batch.len()
        );

        if !batch.is_empty() {
            let weak = self.weak_self.clone();
            resolver::dispatch(
                &self.services.scheduler,
                &self.services.resolver,
                batch,
                self.services.settings.lookup_timeout(),
                Arc::new(move |targets: &[SlotTarget], texture: &str| {
                    if let Some(menu) = weak.upgrade() {
                        menu.apply_resolved(generation, targets, texture);
                    }
                }),
            );
        }

        self.reset_idle_timer(state);
    }

    /// Moves viewers beyond `last` onto page `last` without firing open actions.
    fn relocate_viewers(&self, state: &mut MenuState, last: usize) {
        let MenuState { pages, viewers, .. } = state;
        for (player, viewer) in viewers.iter_mut().filter(|(_, viewer)| viewer.page > last) {
            if let Some(container) = pages
                .get_mut(viewer.page)
                .and_then(|page| page.container_mut(&viewer.language))
            {
                container.hide(*player);
            }
            if let Some(container) = pages
                .get_mut(last)
                .and_then(|page| page.container_mut(&viewer.language))
            {
                container.show(*player);
            }
            debug!("Relocated {} in '{}' from page {} to {}", player, self.id, viewer.page, last);
            viewer.page = last;
        }
    }

    fn apply_resolved(&self, generation: u64, targets: &[SlotTarget], texture: &str) {
        let mut state = self.lock();
        if state.closed || state.generation != generation {
            debug!(
                "Discarding texture for '{}' from generation {} (now {})",
                self.id, generation, state.generation
            );
            return;
        }
        for target in targets {
            apply_texture(&mut state.pages, target, texture);
        }
    }

    fn reset_idle_timer(&self, state: &mut MenuState) {
        if self.owner().is_none() || state.closed {
            return;
        }
        if let Some(handle) = state.idle_timer.take() {
            self.services.scheduler.cancel_sync(handle);
        }
        state.idle_epoch += 1;
        let epoch = state.idle_epoch;
        let weak = self.weak_self.clone();
        let handle = self.services.scheduler.run_sync(
            Box::new(move || {
                if let Some(menu) = weak.upgrade() {
                    menu.idle_elapsed(epoch);
                }
            }),
            self.services.settings.idle_timeout(),
        );
        state.idle_timer = Some(handle);
    }

    fn idle_elapsed(&self, epoch: u64) {
        {
            let state = self.lock();
            if state.closed || state.idle_epoch != epoch {
                return;
            }
        }
        self.teardown(TeardownReason::IdleTimeout);
    }

    /// Closes every view, invalidates pending lookups, cancels the idle timer and
    /// deregisters the instance. Later calls are no-ops.
    pub fn teardown(&self, reason: TeardownReason) {
        let viewers: Vec<(PlayerId, Viewer)> = {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.generation += 1;
            if let Some(handle) = state.idle_timer.take() {
                self.services.scheduler.cancel_sync(handle);
            }
            let viewers: Vec<(PlayerId, Viewer)> = state.viewers.drain().collect();
            for (player, viewer) in &viewers {
                if let Some(container) = state
                    .pages
                    .get_mut(viewer.page)
                    .and_then(|page| page.container_mut(&viewer.language))
                {
                    container.hide(*player);
                }
            }
            viewers
        };

        if let Some(key) = reason.notice() {
            for (player, viewer) in &viewers {
                // The owner who left cannot receive the notice.
                if reason == TeardownReason::OwnerLeft && self.owner() == Some(*player) {
                    continue;
                }
                self.services.notify(*player, &viewer.language, key);
            }
        }

        if let Some(registry) = self.registry.upgrade() {
            registry.deregister(self);
        }
        info!("Menu '{}' torn down ({:?})", self.id, reason);
    }

    /// Opens the first page for `player`, running the layout's open actions.
    pub fn open(&self, player: PlayerId) -> OpenOutcome {
        self.open_page(player, 0).unwrap_or(OpenOutcome::Unavailable)
    }

    /// Opens `page` for `player`, running the layout's open actions.
    ///
    /// A page outside `0..page_count` is a precondition violation and changes nothing.
    pub fn open_page(&self, player: PlayerId, page: usize) -> MenuResult<OpenOutcome> {
        let language = self.services.language_of(player);
        let loading = {
            let state = self.lock();
            if state.closed {
                drop(state);
                self.services.notify(player, &language, keys::UNAVAILABLE);
                return Ok(OpenOutcome::Unavailable);
            }
            if page >= state.pages.len() {
                return Err(MenuError::PageOutOfRange {
                    page,
                    page_count: state.pages.len(),
                });
            }
            state.fillers.is_none()
        };

        if let Some(permission) = self.layout.permission() {
            if !self.services.players.has_permission(player, permission) {
                self.services.notify(player, &language, keys::NO_PERMISSION);
                return Ok(OpenOutcome::Denied);
            }
        }
        if loading {
            self.services.notify(player, &language, keys::LOADING);
            return Ok(OpenOutcome::Loading);
        }

        let mut event = MenuOpenEvent {
            menu: self.id.clone(),
            viewer: player,
            page,
            cancelled: false,
        };
        self.services.events.emit(&mut event);
        if event.is_cancelled() {
            return Ok(OpenOutcome::Cancelled);
        }

        {
            let mut state = self.lock();
            if state.closed {
                drop(state);
                self.services.notify(player, &language, keys::UNAVAILABLE);
                return Ok(OpenOutcome::Unavailable);
            }
            if page >= state.pages.len() {
                return Err(MenuError::PageOutOfRange {
                    page,
                    page_count: state.pages.len(),
                });
            }
            Self::show_locked(&mut state, player, page, language);
            self.reset_idle_timer(&mut state);
        }

        for action in self.layout.open_actions() {
            self.dispatch_command(player, action);
        }
        debug!("Opened '{}' page {} for {}", self.id, page, player);
        Ok(OpenOutcome::Opened)
    }

    fn show_locked(state: &mut MenuState, player: PlayerId, page: usize, language: String) {
        if let Some(previous) = state.viewers.get(&player).cloned() {
            if let Some(container) = state
                .pages
                .get_mut(previous.page)
                .and_then(|view| view.container_mut(&previous.language))
            {
                container.hide(player);
            }
        }
        if let Some(container) = state
            .pages
            .get_mut(page)
            .and_then(|view| view.container_mut(&language))
        {
            container.show(player);
        }
        state.viewers.insert(player, Viewer { page, language });
    }

    /// Moves an existing viewer to `page` without open actions or events.
    fn turn_page(&self, player: PlayerId, page: usize) -> bool {
        let mut state = self.lock();
        if state.closed || page >= state.pages.len() {
            return false;
        }
        let Some(language) = state.viewers.get(&player).map(|viewer| viewer.language.clone()) else {
            return false;
        };
        Self::show_locked(&mut state, player, page, language);
        self.reset_idle_timer(&mut state);
        true
    }

    /// The viewer closed the menu. A per-owner menu left without viewers is torn down.
    pub fn handle_close(&self, player: PlayerId) {
        let teardown = {
            let mut state = self.lock();
            let Some(viewer) = state.viewers.remove(&player) else {
                return;
            };
            if let Some(container) = state
                .pages
                .get_mut(viewer.page)
                .and_then(|page| page.container_mut(&viewer.language))
            {
                container.hide(player);
            }
            !state.closed && self.owner().is_some() && state.viewers.is_empty()
        };
        if teardown {
            self.teardown(TeardownReason::Closed);
        }
    }

    /// The icon behind `slot` on `page`: static first, then the empty-state icon or the
    /// generated icon recorded for that slot.
    fn resolve_icon(&self, state: &MenuState, page: usize, slot: usize) -> Option<Icon> {
        if let Some(icon) = self.layout.icon_at(slot) {
            return Some(icon.clone());
        }
        let fill = self.layout.fill()?;
        let empty = state.fillers.as_ref().map(Vec::is_empty).unwrap_or(true);
        if empty {
            return (fill.empty_icon.slot == slot).then(|| fill.empty_icon.clone());
        }
        state.pages.get(page)?.generated.get(&slot).cloned()
    }

    /// Routes a click to the icon behind the slot.
    pub fn handle_click(&self, click: MenuClick) -> ClickOutcome {
        let (page, page_count, language, icon) = {
            let state = self.lock();
            if state.closed || click.slot >= self.layout.size() {
                return ClickOutcome::Ignored;
            }
            let Some(viewer) = state.viewers.get(&click.viewer) else {
                return ClickOutcome::Ignored;
            };
            let icon = self.resolve_icon(&state, viewer.page, click.slot);
            (viewer.page, state.pages.len(), viewer.language.clone(), icon)
        };

        if let Some(permission) = self.layout.permission() {
            if !self.services.players.has_permission(click.viewer, permission) {
                self.services.notify(click.viewer, &language, keys::NO_PERMISSION);
                return ClickOutcome::Denied;
            }
        }

        let Some(icon) = icon else {
            let mut event = EmptySlotClickEvent {
                menu: self.id.clone(),
                viewer: click.viewer,
                page,
                slot: click.slot,
                click: click.click,
                cancelled: false,
            };
            self.services.events.emit(&mut event);
            return ClickOutcome::EmptySlot;
        };

        let hidden = match icon.kind {
            IconKind::PageSwitcher(direction) => is_hidden(direction, page, page_count),
            _ => false,
        };
        let mut event = IconClickEvent {
            menu: self.id.clone(),
            viewer: click.viewer,
            page,
            slot: click.slot,
            click: click.click,
            icon: icon.clone(),
            hidden,
            cancelled: false,
        };
        self.services.events.emit(&mut event);

        if let Some(permission) = &icon.permission {
            if !self.services.players.has_permission(click.viewer, permission) {
                self.services.notify(click.viewer, &language, keys::NO_PERMISSION);
                return ClickOutcome::Denied;
            }
        }
        if hidden {
            return ClickOutcome::Hidden;
        }
        if event.is_cancelled() {
            return ClickOutcome::Cancelled;
        }

        match icon.kind {
            IconKind::PageSwitcher(PageDirection::Previous) => {
                self.turn_page(click.viewer, page.saturating_sub(1));
            }
            IconKind::PageSwitcher(PageDirection::Next) => {
                self.turn_page(click.viewer, page + 1);
            }
            _ => {
                if !icon.keep_open.unwrap_or(self.layout.keep_open()) {
                    self.handle_close(click.viewer);
                }
            }
        }

        for command in &icon.commands {
            if let Some(command) = command_for_click(command, click.click) {
                self.dispatch_command(click.viewer, command);
            }
        }
        let sound = self
            .layout
            .click_sound()
            .or(self.services.settings.default_click_sound.as_deref());
        if let Some(sound) = sound {
            self.services.players.play_sound(click.viewer, sound);
        }
        ClickOutcome::Handled
    }

    /// Wraps a drag in a cancellable event. Returns whether an observer cancelled it.
    pub fn handle_drag(&self, drag: MenuDrag) -> bool {
        let page = {
            let state = self.lock();
            if state.closed {
                return false;
            }
            match state.viewers.get(&drag.viewer) {
                Some(viewer) => viewer.page,
                None => return false,
            }
        };
        let mut event = MenuDragEvent {
            menu: self.id.clone(),
            viewer: drag.viewer,
            page,
            slots: drag.slots,
            cancelled: false,
        };
        self.services.events.emit(&mut event);
        event.is_cancelled()
    }

    fn dispatch_command(&self, viewer: PlayerId, command: &str) {
        let command = command.replace("{player}", &viewer.to_string());
        match command.strip_prefix("console:") {
            Some(console) => self
                .services
                .players
                .dispatch_command(CommandSender::Console, console.trim()),
            None => self
                .services
                .players
                .dispatch_command(CommandSender::Player(viewer), command.trim()),
        }
    }
}

/// Strips a click-type marker from `command`. Returns `None` when the marker names a
/// different click type; unmarked commands run for every click.
pub fn command_for_click(command: &str, click: ClickType) -> Option<&str> {
    for marked in ClickType::marked() {
        if let Some(rest) = marked.marker().and_then(|marker| command.strip_prefix(marker)) {
            return (marked == click).then(|| rest.trim_start());
        }
    }
    Some(command)
}
