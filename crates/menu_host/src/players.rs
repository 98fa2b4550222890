//! Player port for the standalone host, which has no connected game server.

use menu_engine::{CommandSender, PlayerId, PlayerPort};
use tracing::info;

/// Writes every player-facing action to the log. Every permission check passes.
#[derive(Debug, Default)]
pub struct LoggingPlayers;

impl PlayerPort for LoggingPlayers {
    fn language(&self, _player: PlayerId) -> Option<String> {
        None
    }

    fn has_permission(&self, _player: PlayerId, _permission: &str) -> bool {
        true
    }

    fn send_message(&self, player: PlayerId, message: &str) {
        info!(%player, "message: {}", message);
    }

    fn play_sound(&self, player: PlayerId, sound: &str) {
        info!(%player, "sound: {}", sound);
    }

    fn dispatch_command(&self, sender: CommandSender, command: &str) {
        match sender {
            CommandSender::Console => info!("console command: {}", command),
            CommandSender::Player(player) => info!(%player, "player command: {}", command),
        }
    }
}
