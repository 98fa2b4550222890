//! Observable menu events.
//!
//! Observers register typed handlers on a [`MenuEventBus`]. Every event is cancellable;
//! the engine checks the flag after all handlers ran and skips its default behaviour
//! when an observer cancelled it.

use crate::icon::Icon;
use crate::types::{ClickType, PlayerId, Slot};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Marker for types that can travel over the menu event bus.
pub trait MenuEvent: Any + Send + Sync {
    fn name() -> &'static str
    where
        Self: Sized;
}

pub trait Cancellable {
    fn is_cancelled(&self) -> bool;
    fn set_cancelled(&mut self, cancelled: bool);
}

macro_rules! menu_event {
    ($event:ident, $name:literal) => {
        impl MenuEvent for $event {
            fn name() -> &'static str {
                $name
            }
        }

        impl Cancellable for $event {
            fn is_cancelled(&self) -> bool {
                self.cancelled
            }

            fn set_cancelled(&mut self, cancelled: bool) {
                self.cancelled = cancelled;
            }
        }
    };
}

/// A viewer clicked a slot holding an icon.
#[derive(Debug, Clone)]
pub struct IconClickEvent {
    pub menu: String,
    pub viewer: PlayerId,
    pub page: usize,
    pub slot: Slot,
    pub click: ClickType,
    pub icon: Icon,
    /// The icon is a page switcher suppressed on this page.
    pub hidden: bool,
    pub cancelled: bool,
}

/// A viewer clicked a slot with nothing behind it.
#[derive(Debug, Clone)]
pub struct EmptySlotClickEvent {
    pub menu: String,
    pub viewer: PlayerId,
    pub page: usize,
    pub slot: Slot,
    pub click: ClickType,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct MenuDragEvent {
    pub menu: String,
    pub viewer: PlayerId,
    pub page: usize,
    pub slots: Vec<Slot>,
    pub cancelled: bool,
}

/// A viewer is about to open the menu.
#[derive(Debug, Clone)]
pub struct MenuOpenEvent {
    pub menu: String,
    pub viewer: PlayerId,
    pub page: usize,
    pub cancelled: bool,
}

menu_event!(IconClickEvent, "icon_click");
menu_event!(EmptySlotClickEvent, "empty_slot_click");
menu_event!(MenuDragEvent, "drag");
menu_event!(MenuOpenEvent, "open");

type ErasedHandler = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;

/// Typed handler registry for menu events.
#[derive(Default)]
pub struct MenuEventBus {
    handlers: RwLock<HashMap<TypeId, Vec<ErasedHandler>>>,
    emitted: AtomicU64,
}

impl std::fmt::Debug for MenuEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuEventBus")
            .field("handlers", &self.handler_count())
            .field("emitted", &self.emitted.load(Ordering::Relaxed))
            .finish()
    }
}

impl MenuEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for events of type `E`.
    pub fn on<E, F>(&self, handler: F)
    where
        E: MenuEvent,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        let erased: ErasedHandler = Arc::new(move |event: &mut dyn Any| {
            if let Some(event) = event.downcast_mut::<E>() {
                handler(event);
            }
        });
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(TypeId::of::<E>())
            .or_default()
            .push(erased);
        debug!("Registered menu handler for '{}'", E::name());
    }

    /// Runs every handler registered for `E`, in registration order.
    pub fn emit<E: MenuEvent>(&self, event: &mut E) {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default();
        self.emitted.fetch_add(1, Ordering::Relaxed);
        for handler in handlers {
            handler(&mut *event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    pub fn events_emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }
}
