// Wire protocol shared by the relay server and the game client.
// Internal gameplay types stay in the engine; only wire shapes live here.

pub mod codec;
pub mod messages;

pub use codec::{decode_line, encode_line, DecodeError};
pub use messages::{GamePhase, Message, PlayerInfo};
