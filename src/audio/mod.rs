//! Audio resource and device abstractions
//!
//! The engine never touches a real decoder or output backend; it drives
//! everything through the [`device::PlaybackDevice`] trait and resolves
//! assets through the [`clip::ClipStore`] trait.

pub mod clip;
pub mod device;

pub use clip::{Clip, ClipStore, MemoryClipStore};
pub use device::{NullDevice, PlaybackDevice};
