//! User settings: player defaults, library scanning, UI text and logging.
//!
//! Values come from an optional TOML file and `ENCORE__SECTION__KEY`
//! environment overrides; see [`Settings::load`].

mod load;
mod schema;

pub use load::default_log_path;
pub use schema::*;

#[cfg(test)]
mod tests;
