//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the library, the cursor
//! and the status line state.

mod model;

pub use model::*;
