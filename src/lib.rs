//! encore: a terminal music player for a directory of audio files.
//!
//! The [`engine`] module holds the playback engine and is usable on its own;
//! the rest wires it to a library scan and a `ratatui` front end.

pub mod app;
pub mod config;
pub mod engine;
pub mod library;
pub mod runtime;
pub mod ui;
