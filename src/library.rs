//! Local directory repository: turns a music folder into engine tracks.

mod display;
mod model;
mod scan;

pub use display::artist_label;
pub use model::Library;
