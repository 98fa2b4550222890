//! Active menu instances, keyed by instance id.

use crate::config::LayoutCatalog;
use crate::error::{MenuError, MenuResult};
use crate::layout::Layout;
use crate::menu::{Menu, MenuServices, Ownership, TeardownReason};
use crate::render::TitleHook;
use crate::types::PlayerId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// Owns every live [`Menu`].
///
/// Entries are never held across calls into a menu: lookups clone the `Arc` out first,
/// since teardown deregisters through this registry.
pub struct MenuRegistry {
    services: Arc<MenuServices>,
    catalog: LayoutCatalog,
    menus: DashMap<String, Arc<Menu>>,
    title_hooks: DashMap<String, TitleHook>,
    weak_self: Weak<MenuRegistry>,
}

impl std::fmt::Debug for MenuRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuRegistry")
            .field("layouts", &self.catalog.len())
            .field("menus", &self.menus.len())
            .finish()
    }
}

/// Instance id of a per-owner menu.
pub fn owned_key(layout: &str, owner: PlayerId) -> String {
    format!("{layout}-{owner}")
}

impl MenuRegistry {
    pub fn new(services: Arc<MenuServices>, catalog: LayoutCatalog) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            services,
            catalog,
            menus: DashMap::new(),
            title_hooks: DashMap::new(),
            weak_self: weak_self.clone(),
        })
    }

    pub fn services(&self) -> &Arc<MenuServices> {
        &self.services
    }

    pub fn catalog(&self) -> &LayoutCatalog {
        &self.catalog
    }

    /// Installs a title formatter for menus created from `layout` after this call.
    pub fn set_title_hook(&self, layout: &str, hook: TitleHook) {
        self.title_hooks.insert(layout.to_string(), hook);
    }

    fn layout(&self, id: &str) -> MenuResult<Arc<Layout>> {
        self.catalog
            .get(id)
            .ok_or_else(|| MenuError::UnknownLayout(id.to_string()))
    }

    fn build(&self, id: String, layout: Arc<Layout>, ownership: Ownership) -> Arc<Menu> {
        let hook = self.title_hooks.get(layout.id()).map(|hook| hook.value().clone());
        Menu::new(id, layout, ownership, self.services.clone(), hook, self.weak_self.clone())
    }

    /// Creates the shared instance of `layout`. Fails if it already exists.
    pub fn create_shared(&self, layout: &str) -> MenuResult<Arc<Menu>> {
        let built = self.layout(layout)?;
        match self.menus.entry(layout.to_string()) {
            Entry::Occupied(_) => Err(MenuError::DuplicateInstance(layout.to_string())),
            Entry::Vacant(entry) => {
                let menu = self.build(layout.to_string(), built, Ownership::Shared);
                entry.insert(menu.clone());
                Ok(menu)
            }
        }
    }

    /// The shared instance of `layout`, created on first use.
    pub fn shared(&self, layout: &str) -> MenuResult<Arc<Menu>> {
        if let Some(menu) = self.get(layout) {
            return Ok(menu);
        }
        let built = self.layout(layout)?;
        let menu = self
            .menus
            .entry(layout.to_string())
            .or_insert_with(|| self.build(layout.to_string(), built, Ownership::Shared))
            .value()
            .clone();
        Ok(menu)
    }

    /// Creates the per-owner instance of `layout` for `owner`.
    ///
    /// Fails with [`MenuError::DuplicateInstance`] if that owner already has one.
    pub fn create_owned(&self, layout: &str, owner: PlayerId) -> MenuResult<Arc<Menu>> {
        let built = self.layout(layout)?;
        let key = owned_key(layout, owner);
        match self.menus.entry(key.clone()) {
            Entry::Occupied(_) => Err(MenuError::DuplicateInstance(key)),
            Entry::Vacant(entry) => {
                let menu = self.build(key, built, Ownership::PerOwner(owner));
                entry.insert(menu.clone());
                Ok(menu)
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Menu>> {
        self.menus.get(id).map(|menu| menu.value().clone())
    }

    pub fn owned(&self, layout: &str, owner: PlayerId) -> Option<Arc<Menu>> {
        self.get(&owned_key(layout, owner))
    }

    /// The menu `player` currently has open, if any.
    pub fn viewing(&self, player: PlayerId) -> Option<Arc<Menu>> {
        self.all()
            .into_iter()
            .find(|menu| menu.viewer_page(player).is_some())
    }

    fn all(&self) -> Vec<Arc<Menu>> {
        self.menus.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Removes `menu` if it is still the registered instance for its id.
    pub(crate) fn deregister(&self, menu: &Menu) {
        let removed = self
            .menus
            .remove_if(menu.id(), |_, registered| std::ptr::eq(Arc::as_ptr(registered), menu));
        if removed.is_some() {
            debug!("Deregistered menu '{}'", menu.id());
        }
    }

    /// Tears down the instance `id`.
    pub fn destroy(&self, id: &str, reason: TeardownReason) -> MenuResult<()> {
        let menu = self
            .get(id)
            .ok_or_else(|| MenuError::NotFound(id.to_string()))?;
        menu.teardown(reason);
        Ok(())
    }

    /// A player left the server: their per-owner menus are torn down and any other
    /// view they held is closed.
    pub fn handle_quit(&self, player: PlayerId) {
        for menu in self.all() {
            if menu.owner() == Some(player) {
                menu.teardown(TeardownReason::OwnerLeft);
            } else {
                menu.handle_close(player);
            }
        }
    }

    /// Tears down every instance, e.g. before layouts are reloaded.
    pub fn invalidate_all(&self) {
        let menus = self.all();
        let count = menus.len();
        for menu in menus {
            menu.teardown(TeardownReason::Invalidated);
        }
        info!("Invalidated {} menus", count);
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.menus.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }
}
