//! Integration tests for instance lifecycle: creation, idle timeout and teardown.

mod common;

use common::*;
use menu_engine::{MenuError, OpenOutcome, Ownership, PlayerId, TeardownReason};
use std::sync::Arc;
use std::time::{Duration, Instant};

const TIMEOUT_NOTICE: &str = "§7This menu expired and was closed.";
const OWNER_LEFT_NOTICE: &str = "§7The owner of this menu left, so it was closed.";

#[tokio::test]
async fn test_scenario_e_duplicate_owned_instance() {
    let h = harness();
    let owner = PlayerId::new();

    let menu = h.registry.create_owned(PROFILE, owner).unwrap();
    assert_eq!(menu.id(), format!("{PROFILE}-{owner}"));
    assert_eq!(menu.ownership(), Ownership::PerOwner(owner));

    assert_eq!(
        h.registry.create_owned(PROFILE, owner).unwrap_err(),
        MenuError::DuplicateInstance(format!("{PROFILE}-{owner}"))
    );

    h.registry.destroy(menu.id(), TeardownReason::Closed).unwrap();
    assert!(menu.is_closed());
    assert!(h.registry.create_owned(PROFILE, owner).is_ok());
}

#[tokio::test]
async fn test_owned_instances_are_per_owner() {
    let h = harness();
    let first = h.registry.create_owned(PROFILE, PlayerId::new()).unwrap();
    let second = h.registry.create_owned(PROFILE, PlayerId::new()).unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(h.registry.len(), 2);
}

#[tokio::test]
async fn test_shared_instance_is_reused() {
    let h = harness();
    let first = h.registry.shared(BANS).unwrap();
    let second = h.registry.shared(BANS).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        h.registry.create_shared(BANS).unwrap_err(),
        MenuError::DuplicateInstance(BANS.to_string())
    );
    assert_eq!(
        h.registry.shared("missing").unwrap_err(),
        MenuError::UnknownLayout("missing".to_string())
    );
}

#[tokio::test]
async fn test_idle_timeout_tears_down_owned_menu() {
    let h = harness();
    let owner = PlayerId::new();
    let menu = h.registry.create_owned(PROFILE, owner).unwrap();
    assert_eq!(menu.open(owner), OpenOutcome::Opened);

    assert_eq!(h.scheduler.run_due(Instant::now() + Duration::from_secs(30)), 0);
    assert!(!menu.is_closed());

    h.scheduler.run_due(Instant::now() + Duration::from_secs(61));

    assert!(menu.is_closed());
    assert!(menu.viewers().is_empty());
    assert!(h.registry.owned(PROFILE, owner).is_none());
    assert_eq!(h.players.messages_for(owner), vec![TIMEOUT_NOTICE.to_string()]);
    assert_eq!(h.scheduler.pending_sync(), 0);
}

#[tokio::test]
async fn test_shared_menus_have_no_idle_timer() {
    let h = harness();
    let menu = h.registry.shared(PROFILE).unwrap();
    menu.open(PlayerId::new());

    assert_eq!(h.scheduler.pending_sync(), 0);
    h.scheduler.run_due(Instant::now() + Duration::from_secs(3600));
    assert!(!menu.is_closed());
}

#[tokio::test]
async fn test_owner_quit_notifies_other_viewers() {
    let h = harness();
    let owner = PlayerId::new();
    let moderator = PlayerId::new();
    let menu = h.registry.create_owned(PROFILE, owner).unwrap();
    menu.open(owner);
    menu.open(moderator);

    h.registry.handle_quit(owner);

    assert!(menu.is_closed());
    assert!(h.players.messages_for(owner).is_empty());
    assert_eq!(h.players.messages_for(moderator), vec![OWNER_LEFT_NOTICE.to_string()]);
    assert!(h.registry.is_empty());
}

#[tokio::test]
async fn test_quit_closes_views_of_shared_menus() {
    let h = harness();
    let menu = h.registry.shared(PROFILE).unwrap();
    let viewer = PlayerId::new();
    menu.open(viewer);
    assert!(h.registry.viewing(viewer).is_some());

    h.registry.handle_quit(viewer);

    assert!(menu.viewers().is_empty());
    assert!(!menu.is_closed());
    assert!(h.registry.viewing(viewer).is_none());
}

#[tokio::test]
async fn test_last_viewer_closing_owned_menu_tears_it_down() {
    let h = harness();
    let owner = PlayerId::new();
    let menu = h.registry.create_owned(PROFILE, owner).unwrap();
    menu.open(owner);

    menu.handle_close(owner);

    assert!(menu.is_closed());
    assert!(h.registry.is_empty());
    assert!(h.players.messages_for(owner).is_empty());
}

#[tokio::test]
async fn test_open_after_teardown_is_unavailable() {
    let h = harness();
    let owner = PlayerId::new();
    let menu = h.registry.create_owned(PROFILE, owner).unwrap();
    menu.teardown(TeardownReason::Invalidated);
    let generation = menu.generation();

    assert_eq!(menu.open(owner), OpenOutcome::Unavailable);
    assert_eq!(
        h.players.messages_for(owner),
        vec!["§cThis menu is no longer available.".to_string()]
    );

    menu.render();
    menu.teardown(TeardownReason::IdleTimeout);
    assert_eq!(menu.generation(), generation);
}

#[tokio::test]
async fn test_invalidate_all_and_destroy() {
    let h = harness();
    h.registry.shared(BANS).unwrap();
    h.registry.create_owned(PROFILE, PlayerId::new()).unwrap();
    assert_eq!(h.registry.ids().len(), 2);

    h.registry.invalidate_all();
    assert!(h.registry.is_empty());
    assert_eq!(h.scheduler.pending_sync(), 0);

    assert_eq!(
        h.registry.destroy(BANS, TeardownReason::Closed),
        Err(MenuError::NotFound(BANS.to_string()))
    );
}

#[tokio::test]
async fn test_title_hook_formats_new_menus() {
    let h = harness();
    h.registry.set_title_hook(
        PROFILE,
        Arc::new(|raw: &str, language: &str, page: usize| format!("&l{raw} [{language}:{page}]")),
    );

    let menu = h.registry.shared(PROFILE).unwrap();
    assert_eq!(menu.snapshot("en", 0).unwrap().title, "§lProfile [en:0]");
    assert_eq!(menu.snapshot("de", 0).unwrap().title, "§lProfile [de:0]");
}
