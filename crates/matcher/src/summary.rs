use serde::Serialize;

use crate::model::{MatchResult, RecoSource};

/// A count kept separately for each upstream source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerSource {
    pub pandora: usize,
    pub spine: usize,
}

impl PerSource {
    pub fn get(&self, source: RecoSource) -> usize {
        match source {
            RecoSource::Pandora => self.pandora,
            RecoSource::Spine => self.spine,
        }
    }

    pub fn get_mut(&mut self, source: RecoSource) -> &mut usize {
        match source {
            RecoSource::Pandora => &mut self.pandora,
            RecoSource::Spine => &mut self.spine,
        }
    }

    pub fn total(&self) -> usize {
        self.pandora + self.spine
    }

    fn add(&mut self, other: &PerSource) {
        self.pandora += other.pandora;
        self.spine += other.spine;
    }
}

/// What happened to one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventReport {
    pub downstream_admitted: usize,
    pub upstream_admitted: PerSource,
    pub candidates: PerSource,
    /// Candidates whose timing term could not be computed.
    pub unscored: PerSource,
    pub matches: PerSource,
}

/// Result of one event in a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
    pub event_id: u64,
    pub report: EventReport,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub events: usize,
    pub candidates: usize,
    pub unscored: usize,
    pub matches: PerSource,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[EventOutcome]) -> Self {
        let mut summary = Self { events: outcomes.len(), ..Self::default() };
        for outcome in outcomes {
            summary.candidates += outcome.report.candidates.total();
            summary.unscored += outcome.report.unscored.total();
            summary.matches.add(&outcome.report.matches);
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

/// Everything a batch run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub events: Vec<EventOutcome>,
}
