//! Core types for Areawatch

mod area;
mod event;
mod fix;
mod output;
mod state;

pub use area::{Area, AreaFilter, AreaPage, AreaUpdate, Membership, NewArea};
pub use event::{AreaCheck, Direction, TransitionEvent};
pub use fix::{Coordinate, Fix};
pub use output::TrackOutput;
pub use state::SmoothingPhase;
