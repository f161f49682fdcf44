use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Point or direction in the detector-local frame [cm].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Identifies a simulated particle in the truth record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrueParticleId {
    pub interaction: i64,
    pub part: i64,
}

/// Fraction of a track's signal attributed to one true particle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TruthOverlap {
    pub particle: TrueParticleId,
    pub overlap: f64,
}

/// A reconstructed track segment. Direction vectors are not guaranteed to be
/// normalized by the producing reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub start: Vec3,
    pub end: Vec3,
    pub start_dir: Vec3,
    pub end_dir: Vec3,
    /// Subsystem clock [ns].
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub visible_energy: f64,
    #[serde(default)]
    pub truth: Vec<TruthOverlap>,
}

/// Tracks produced by one reconstruction pass for one interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Interaction {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Track> {
        self.tracks.get(idx)
    }
}

/// Trigger time of the event; truth times are stored relative to the
/// start of the run and must be shifted by this offset.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default)]
    pub time_s: i64,
    #[serde(default)]
    pub time_ns: f64,
}

impl Trigger {
    /// Offset in the same units as track and truth times [ns].
    pub fn offset_ns(&self) -> f64 {
        1e9 * self.time_s as f64 + self.time_ns
    }
}

/// A simulated particle as seen by the truth lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruthParticle {
    pub id: TrueParticleId,
    /// Creation time [ns], before trigger offset is removed.
    pub time: f64,
    #[serde(default)]
    pub start: Vec3,
}

/// Everything the matcher reads for one event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventInput {
    pub event_id: u64,
    #[serde(default)]
    pub trigger: Trigger,
    #[serde(default)]
    pub downstream: Vec<Interaction>,
    #[serde(default)]
    pub pandora: Vec<Interaction>,
    #[serde(default)]
    pub spine: Vec<Interaction>,
}

impl EventInput {
    /// Upstream interactions produced by `source`.
    pub fn upstream(&self, source: RecoSource) -> &[Interaction] {
        match source {
            RecoSource::Pandora => &self.pandora,
            RecoSource::Spine => &self.spine,
        }
    }

    /// Resolve a reference back to the track it names.
    pub fn track(&self, r: &TrackRef) -> Option<&Track> {
        let interactions = match r.side {
            TrackSide::Downstream => &self.downstream,
            TrackSide::Upstream(source) => self.upstream(source),
        };
        interactions.get(r.interaction)?.get(r.track)
    }
}

/// One event as stored in an event file: the matcher input plus the truth
/// particles it may consult.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(flatten)]
    pub input: EventInput,
    #[serde(default)]
    pub truth: Vec<TruthParticle>,
}

// ---------------------------------------------------------------------------
// Track references
// ---------------------------------------------------------------------------

/// The two competing upstream reconstructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoSource {
    Pandora,
    Spine,
}

impl RecoSource {
    pub const ALL: [RecoSource; 2] = [RecoSource::Pandora, RecoSource::Spine];
}

impl std::fmt::Display for RecoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pandora => write!(f, "pandora"),
            Self::Spine => write!(f, "spine"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSide {
    Downstream,
    Upstream(RecoSource),
}

/// Identifies one track without copying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackRef {
    pub side: TrackSide,
    pub interaction: usize,
    pub track: usize,
}

impl TrackRef {
    pub fn downstream(interaction: usize, track: usize) -> Self {
        Self { side: TrackSide::Downstream, interaction, track }
    }

    pub fn upstream(source: RecoSource, interaction: usize, track: usize) -> Self {
        Self { side: TrackSide::Upstream(source), interaction, track }
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// Compatibility score of a candidate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Scored(f64),
    /// Timing was requested but the upstream truth particle could not be
    /// resolved; `base` holds the spatial + angular part only.
    Unscored { base: f64 },
}

impl Score {
    pub fn is_unscored(&self) -> bool {
        matches!(self, Self::Unscored { .. })
    }
}

#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub downstream: TrackRef,
    pub upstream: TrackRef,
    pub score: Score,
    pub transverse_displacement: f64,
    pub angular_displacement_cos: f64,
    pub uses_time: bool,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    UniqueWithTime,
    UniqueNoTime,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UniqueWithTime => write!(f, "unique_with_time"),
            Self::UniqueNoTime => write!(f, "unique_no_time"),
        }
    }
}

/// Upstream start/direction joined to the downstream end/direction.
/// Not independently fitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointTrack {
    pub start: Vec3,
    pub start_dir: Vec3,
    pub end: Vec3,
    pub end_dir: Vec3,
    pub time: f64,
    pub visible_energy: f64,
}

impl JointTrack {
    pub fn join(upstream: &Track, downstream: &Track) -> Self {
        Self {
            start: upstream.start,
            start_dir: upstream.start_dir,
            end: downstream.end,
            end_dir: downstream.end_dir,
            // Upstream time is not calibrated against the downstream clock.
            time: downstream.time,
            visible_energy: upstream.visible_energy + downstream.visible_energy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub source: RecoSource,
    pub downstream: TrackRef,
    pub upstream: TrackRef,
    pub score: f64,
    pub transverse_displacement: f64,
    pub angular_displacement_cos: f64,
    pub match_type: MatchType,
    pub joint: JointTrack,
}

/// Caller-owned collection the engine appends accepted matches to.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchOutput {
    pub results: Vec<MatchResult>,
    pub count: usize,
}

impl MatchOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: MatchResult) {
        self.results.push(result);
        self.count += 1;
    }
}
