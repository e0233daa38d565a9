//! Channel, pool, and playlist sequencing

pub mod channel;
pub mod fade;
pub mod playlist;
pub mod pool;

pub use channel::{Channel, ChannelHandle};
pub use fade::{Fade, FadeState};
pub use playlist::{PlaylistController, PlaylistState};
pub use pool::{ChannelPool, MUSIC_CHANNEL};
