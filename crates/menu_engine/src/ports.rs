//! Host-facing ports: the container and player abstractions the engine renders into,
//! plus in-memory implementations used by tests and the reference host.

use crate::icon::ItemView;
use crate::types::{CommandSender, PlayerId, Slot};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, PoisonError};

/// One per-language, per-page inventory owned by a menu instance.
pub trait Container: Send {
    fn size(&self) -> usize;
    fn set_slot(&mut self, slot: Slot, item: Option<ItemView>);
    fn get_slot(&self, slot: Slot) -> Option<ItemView>;
    fn clear_all(&mut self);
    fn set_title(&mut self, title: &str);
    fn title(&self) -> String;
    /// Opens this container for `viewer`.
    fn show(&mut self, viewer: PlayerId);
    /// Closes this container for `viewer` if they are looking at it.
    fn hide(&mut self, viewer: PlayerId);
    fn viewers(&self) -> Vec<PlayerId>;
}

/// Creates containers on the host platform.
pub trait ContainerFactory: Send + Sync {
    fn create(&self, rows: u8, title: &str) -> Box<dyn Container>;
}

/// Player-facing operations the engine needs from the host.
pub trait PlayerPort: Send + Sync {
    /// The player's client language, if known.
    fn language(&self, player: PlayerId) -> Option<String>;
    fn has_permission(&self, player: PlayerId, permission: &str) -> bool;
    fn send_message(&self, player: PlayerId, message: &str);
    fn play_sound(&self, player: PlayerId, sound: &str);
    fn dispatch_command(&self, sender: CommandSender, command: &str);
}

/// Read-only copy of a container's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSnapshot {
    pub title: String,
    pub slots: BTreeMap<Slot, ItemView>,
    pub viewers: Vec<PlayerId>,
}

impl ContainerSnapshot {
    pub fn capture(container: &dyn Container) -> Self {
        let slots = (0..container.size())
            .filter_map(|slot| container.get_slot(slot).map(|item| (slot, item)))
            .collect();
        let mut viewers = container.viewers();
        viewers.sort();
        Self {
            title: container.title(),
            slots,
            viewers,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    title: String,
    slots: Vec<Option<ItemView>>,
    viewers: BTreeSet<PlayerId>,
}

impl MemoryContainer {
    pub fn new(rows: u8, title: &str) -> Self {
        Self {
            title: title.to_string(),
            slots: vec![None; rows as usize * crate::types::ROW_WIDTH],
            viewers: BTreeSet::new(),
        }
    }
}

impl Container for MemoryContainer {
    fn size(&self) -> usize {
        self.slots.len()
    }

    fn set_slot(&mut self, slot: Slot, item: Option<ItemView>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = item;
        }
    }

    fn get_slot(&self, slot: Slot) -> Option<ItemView> {
        self.slots.get(slot).cloned().flatten()
    }

    fn clear_all(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn show(&mut self, viewer: PlayerId) {
        self.viewers.insert(viewer);
    }

    fn hide(&mut self, viewer: PlayerId) {
        self.viewers.remove(&viewer);
    }

    fn viewers(&self) -> Vec<PlayerId> {
        self.viewers.iter().copied().collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryContainerFactory;

impl ContainerFactory for MemoryContainerFactory {
    fn create(&self, rows: u8, title: &str) -> Box<dyn Container> {
        Box::new(MemoryContainer::new(rows, title))
    }
}

/// Something the engine asked a player port to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Message(PlayerId, String),
    Sound(PlayerId, String),
    Command(CommandSender, String),
}

/// Player port that records every action, with configurable languages and permissions.
#[derive(Debug, Default)]
pub struct RecordingPlayers {
    languages: DashMap<PlayerId, String>,
    permissions: DashMap<PlayerId, HashSet<String>>,
    actions: Mutex<Vec<PlayerAction>>,
}

impl RecordingPlayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_language(&self, player: PlayerId, language: &str) {
        self.languages.insert(player, language.to_string());
    }

    pub fn grant(&self, player: PlayerId, permission: &str) {
        self.permissions
            .entry(player)
            .or_default()
            .insert(permission.to_string());
    }

    pub fn actions(&self) -> Vec<PlayerAction> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn messages_for(&self, player: PlayerId) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                PlayerAction::Message(to, text) if to == player => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<(CommandSender, String)> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                PlayerAction::Command(sender, command) => Some((sender, command)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn record(&self, action: PlayerAction) {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner).push(action);
    }
}

impl PlayerPort for RecordingPlayers {
    fn language(&self, player: PlayerId) -> Option<String> {
        self.languages.get(&player).map(|language| language.clone())
    }

    fn has_permission(&self, player: PlayerId, permission: &str) -> bool {
        self.permissions
            .get(&player)
            .map(|granted| granted.contains(permission))
            .unwrap_or(false)
    }

    fn send_message(&self, player: PlayerId, message: &str) {
        self.record(PlayerAction::Message(player, message.to_string()));
    }

    fn play_sound(&self, player: PlayerId, sound: &str) {
        self.record(PlayerAction::Sound(player, sound.to_string()));
    }

    fn dispatch_command(&self, sender: CommandSender, command: &str) {
        self.record(PlayerAction::Command(sender, command.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_container_slots_and_viewers() {
        let mut container = MemoryContainer::new(1, "Menu");
        let item = crate::icon::Icon::new("a", 0, crate::icon::Visual::new("STONE"))
            .view("en", "en", &Default::default());
        let viewer = PlayerId::new();

        container.set_slot(3, Some(item.clone()));
        container.set_slot(99, Some(item.clone()));
        container.show(viewer);

        let snapshot = ContainerSnapshot::capture(&container);
        assert_eq!(snapshot.slots.len(), 1);
        assert_eq!(snapshot.slots.get(&3), Some(&item));
        assert_eq!(snapshot.viewers, vec![viewer]);

        container.clear_all();
        container.hide(viewer);
        assert!(container.get_slot(3).is_none());
        assert!(container.viewers().is_empty());
    }

    #[test]
    fn test_recording_players() {
        let players = RecordingPlayers::new();
        let player = PlayerId::new();
        players.grant(player, "menus.admin");
        players.send_message(player, "hi");

        assert!(players.has_permission(player, "menus.admin"));
        assert!(!players.has_permission(player, "menus.other"));
        assert_eq!(players.messages_for(player), vec!["hi".to_string()]);
        assert!(players.language(player).is_none());
    }
}
