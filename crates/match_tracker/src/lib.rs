//! FutNews — Match Tracker
//!
//! Diffs consecutive match snapshots and decides which alerts fire:
//! PREGAME (kickoff within 10 minutes), KICKOFF, GOAL, FULLTIME.
//!
//! The detector is a pure function; the store owns the last observed state
//! per match id and is mutated by a single poll task.

mod detector;
mod snapshot;
mod store;

pub use detector::{detect, Detection, MatchEvent, ScorerSide, PREGAME_WINDOW_SECS};
pub use snapshot::{MatchId, MatchSnapshot, MatchStatus};
pub use store::{MatchState, MatchStateStore, DEFAULT_GRACE_POLLS};
