//! Model types for room sessions

mod state;
mod track_set;

pub use state::{Membership, SessionState};
pub use track_set::SharedTrackSet;
