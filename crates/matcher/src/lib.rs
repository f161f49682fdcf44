//! `xmatch-matcher`: pairs tracks reconstructed on either side of a detector
//! boundary.
//!
//! Events come in already loaded; matches go out through a caller-owned
//! [`MatchOutput`]. File handling is left to the CLI.

pub mod candidates;
pub mod config;
pub mod engine;
pub mod error;
pub mod fiducial;
pub mod model;
pub mod projection;
pub mod scorer;
pub mod selector;
pub mod summary;
pub mod truth;

pub use config::MatchConfig;
pub use engine::{load_events, Matcher};
pub use error::MatchError;
pub use model::{EventInput, EventRecord, MatchOutput, MatchResult, RecoSource, Track, TrackRef};
pub use summary::{EventOutcome, EventReport, RunResult, RunSummary};
pub use truth::{TruthLookup, TruthTable};
