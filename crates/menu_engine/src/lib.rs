//! # Menu Engine - Paginated Inventory Menus
//!
//! Declarative chest-style menus for game server plugins. A menu is described once as a
//! [`Layout`] (static icons, per-language titles, an optional fill range with templates)
//! and instantiated as live [`Menu`]s that render per page and per language.
//!
//! ## Menu Kinds
//!
//! * **Single-page** - static icons only, one page
//! * **Fillable** - a slot range receives icons stamped from [`Filler`]s, paginated across
//!   as many pages as needed, with previous/next page switchers
//!
//! Either kind can be **shared** by every viewer or **per-owner**. Per-owner menus carry
//! an idle timer and are torn down when it elapses or when the owner leaves.
//!
//! ## Rendering
//!
//! Every render pass rewrites all pages in all loaded languages. Icons whose texture
//! comes from an identity lookup are placed with their base visual first; the lookup runs
//! on the async side of the [`Scheduler`] and its result is applied on the sync side,
//! unless a newer render pass made it stale.
//!
//! ## Interaction
//!
//! Clicks and drags are routed through [`Menu::handle_click`] and [`Menu::handle_drag`].
//! Observers subscribe on the [`MenuEventBus`] and can cancel any event before the
//! built-in behavior runs.
//!
//! ## Host Integration
//!
//! The engine never talks to a game server directly. Containers, players, messages and
//! texture lookups are reached through the traits in [`ports`], [`messages`] and
//! [`resolver`]; in-memory implementations are provided for tests and tooling.

pub mod config;
pub mod error;
pub mod events;
pub mod filler;
pub mod icon;
pub mod layout;
pub mod menu;
pub mod messages;
pub mod pagination;
pub mod ports;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod scheduler;
pub mod text;
pub mod types;

pub use config::{parse_layout, EngineSettings, LayoutCatalog, LayoutFile};
pub use error::{ConfigError, LayoutError, MenuError, ResolveError};
pub use events::{
    Cancellable, EmptySlotClickEvent, IconClickEvent, MenuDragEvent, MenuEvent, MenuEventBus,
    MenuOpenEvent,
};
pub use filler::{Filler, MapFiller, DEFAULT_TEMPLATE};
pub use icon::{Icon, IconKind, ItemView, PageDirection, TextureRef, Visual, NEXT_PAGE, PREVIOUS_PAGE};
pub use layout::{FillArea, Layout, LayoutBuilder};
pub use menu::{ClickOutcome, Menu, MenuKind, MenuServices, OpenOutcome, Ownership, TeardownReason};
pub use messages::{MessageCatalog, MessageSource};
pub use ports::{Container, ContainerFactory, ContainerSnapshot, PlayerPort};
pub use registry::MenuRegistry;
pub use render::TitleHook;
pub use resolver::TextureResolver;
pub use scheduler::{Scheduler, TaskHandle, TickScheduler};
pub use types::{ClickType, CommandSender, MenuClick, MenuDrag, PlayerId, Slot};
