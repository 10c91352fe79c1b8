//! Playback engine: what is playing, where we are in it and what comes next.
//!
//! [`Engine`] is the transport state machine. It drives a [`MediaPrimitive`]
//! and consumes the primitive's tagged notifications. [`Player`] runs an
//! `Engine` on its own thread and is what the UI talks to.

mod error;
mod navigation;
mod player;
mod primitive;
mod rodio_backend;
mod state;
mod types;

pub use error::{EngineError, InvalidOperation};
pub use player::{EngineCmd, Player};
pub use primitive::{MediaPrimitive, Notifier};
pub use rodio_backend::RodioPrimitive;
pub use state::Engine;
pub use types::*;
