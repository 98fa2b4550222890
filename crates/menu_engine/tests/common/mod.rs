//! Shared fixtures for the menu engine integration tests.

#![allow(dead_code)]

use menu_engine::config::LayoutCatalog;
use menu_engine::icon::{Icon, TextureRef, Visual, NEXT_PAGE, PREVIOUS_PAGE};
use menu_engine::layout::{Layout, LayoutBuilder};
use menu_engine::messages::MessageCatalog;
use menu_engine::ports::{MemoryContainerFactory, RecordingPlayers};
use menu_engine::resolver::StaticResolver;
use menu_engine::{EngineSettings, Filler, MapFiller, MenuRegistry, MenuServices, TickScheduler};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

pub const BANS: &str = "bans";
pub const PROFILE: &str = "profile";
pub const ADMIN: &str = "admin";
pub const HEADS: &str = "heads";

pub const EMPTY_SLOT: usize = 22;
pub const INFO_SLOT: usize = 49;
pub const CLOSE_SLOT: usize = 48;
pub const PREVIOUS_SLOT: usize = 45;
pub const NEXT_SLOT: usize = 53;

pub struct Harness {
    pub scheduler: Arc<TickScheduler>,
    pub players: Arc<RecordingPlayers>,
    pub resolver: Arc<StaticResolver>,
    pub registry: Arc<MenuRegistry>,
}

impl Harness {
    pub fn services(&self) -> &Arc<MenuServices> {
        self.registry.services()
    }
}

pub fn settings() -> EngineSettings {
    EngineSettings {
        languages: vec!["de".to_string()],
        idle_timeout_secs: 60,
        lookup_timeout_ms: 1_000,
        ..EngineSettings::default()
    }
}

/// Must be called from inside a tokio runtime.
pub fn harness() -> Harness {
    harness_with(settings(), StaticResolver::new(Duration::ZERO))
}

pub fn harness_with(settings: EngineSettings, resolver: StaticResolver) -> Harness {
    let main = settings.main_language.clone();
    let scheduler = Arc::new(TickScheduler::new(Handle::current()));
    let players = Arc::new(RecordingPlayers::new());
    let resolver = Arc::new(resolver);
    let services = Arc::new(MenuServices::new(
        settings,
        scheduler.clone(),
        Arc::new(MemoryContainerFactory),
        players.clone(),
        Arc::new(MessageCatalog::with_defaults(main.clone())),
        resolver.clone(),
    ));

    let mut catalog = LayoutCatalog::new();
    for layout in [bans(&main), profile(&main), admin(&main), heads(&main)] {
        catalog.insert(layout);
    }

    Harness {
        scheduler,
        players,
        resolver,
        registry: MenuRegistry::new(services, catalog),
    }
}

fn switchers(builder: LayoutBuilder) -> LayoutBuilder {
    builder
        .icon(Icon::new(PREVIOUS_PAGE, PREVIOUS_SLOT, Visual::new("ARROW")).with_name("en", "&aPrevious"))
        .icon(Icon::new(NEXT_PAGE, NEXT_SLOT, Visual::new("ARROW")).with_name("en", "&aNext"))
}

/// Six rows, fill range 9..=44 with two border icons inside it: 34 fillers per page.
pub fn bans(main: &str) -> Layout {
    let builder = LayoutBuilder::new(BANS, 6)
        .title("en", "&cBans {page}/{pages}")
        .title("de", "Sperren {page}/{pages}")
        .click_sound("ui.click")
        .open_action("console:log opened bans {player}")
        .icon(Icon::new("border-left", 9, Visual::new("GLASS_PANE")))
        .icon(Icon::new("border-right", 17, Visual::new("GLASS_PANE")))
        .icon(
            Icon::new("info", INFO_SLOT, Visual::new("BOOK"))
                .with_name("en", "Info")
                .with_permission("bans.audit")
                .with_commands(vec!["console:audit {player}".to_string()])
                .with_keep_open(true),
        )
        .icon(
            Icon::new("close", CLOSE_SLOT, Visual::new("BARRIER"))
                .with_commands(vec!["[right]stats".to_string()]),
        )
        .fill(
            9,
            44,
            Icon::new("empty", EMPTY_SLOT, Visual::new("STRUCTURE_VOID")).with_name("en", "&7No bans"),
        )
        .template(
            "default",
            Icon::new("ban", 0, Visual::new("PLAYER_HEAD"))
                .with_name("en", "&e{target}")
                .with_name("de", "&e{target} (gesperrt)")
                .with_commands(vec!["[left]unban {target}".to_string()]),
        );
    switchers(builder).build(main).expect("bans layout is valid")
}

/// Single-page, three rows.
pub fn profile(main: &str) -> Layout {
    LayoutBuilder::new(PROFILE, 3)
        .title("en", "Profile")
        .keep_open(true)
        .icon(Icon::new("stats", 13, Visual::new("PAPER")).with_commands(vec!["stats".to_string()]))
        .build(main)
        .expect("profile layout is valid")
}

/// Single row behind a menu-wide permission.
pub fn admin(main: &str) -> Layout {
    LayoutBuilder::new(ADMIN, 1)
        .title("en", "Admin")
        .permission("menu.admin")
        .icon(Icon::new("reload", 4, Visual::new("COMPARATOR")).with_commands(vec!["reload".to_string()]))
        .build(main)
        .expect("admin layout is valid")
}

/// Fill range 0..=8 with identity-textured heads.
pub fn heads(main: &str) -> Layout {
    LayoutBuilder::new(HEADS, 2)
        .title("en", "Heads")
        .icon(Icon::new(PREVIOUS_PAGE, 9, Visual::new("ARROW")))
        .icon(Icon::new(NEXT_PAGE, 17, Visual::new("ARROW")))
        .fill(0, 8, Icon::new("empty", 4, Visual::new("BARRIER")))
        .template(
            "default",
            Icon::new("head", 0, Visual::new("PLAYER_HEAD").with_texture(TextureRef::Identity("{target}".into())))
                .with_name("en", "{target}"),
        )
        .build(main)
        .expect("heads layout is valid")
}

/// `count` fillers on the default template, targets `player0`, `player1`, ...
pub fn fillers(count: usize) -> Vec<Arc<dyn Filler>> {
    (0..count)
        .map(|i| {
            Arc::new(MapFiller::new("default").with("en", "target", format!("player{i}")))
                as Arc<dyn Filler>
        })
        .collect()
}

pub fn named_fillers(names: &[&str]) -> Vec<Arc<dyn Filler>> {
    names
        .iter()
        .map(|name| Arc::new(MapFiller::new("default").with("en", "target", *name)) as Arc<dyn Filler>)
        .collect()
}
