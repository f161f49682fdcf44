#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::candidates::{admitted_downstream, admitted_upstream, generate};
use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::model::{
    EventInput, EventRecord, JointTrack, MatchOutput, MatchResult, MatchType, RecoSource,
};
use crate::selector::{select, Selected};
use crate::summary::{EventOutcome, EventReport, RunMeta, RunResult, RunSummary};
use crate::truth::{TruthLookup, TruthTable};

/// Matching engine bound to one validated configuration.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatchConfig,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match one event. Accepted matches are appended to `output`, Pandora
    /// pool first, then Spine.
    pub fn match_event(
        &self,
        event: &EventInput,
        truth: &dyn TruthLookup,
        output: &mut MatchOutput,
    ) -> EventReport {
        let mut report = EventReport::default();

        let downstream = admitted_downstream(event, &self.config);
        report.downstream_admitted = downstream.len();

        for source in RecoSource::ALL {
            let upstream = admitted_upstream(event, source, &self.config);
            *report.upstream_admitted.get_mut(source) = upstream.len();

            let pool = generate(&downstream, &upstream, event, &self.config, truth);
            *report.candidates.get_mut(source) = pool.len();
            *report.unscored.get_mut(source) = pool.iter().filter(|c| c.score.is_unscored()).count();

            let accepted = select(pool, self.config.score_cutoff, self.config.timing.on_unresolved);
            for selected in accepted {
                if let Some(result) = build_result(event, source, selected) {
                    output.push(result);
                    *report.matches.get_mut(source) += 1;
                }
            }
        }

        log::debug!(
            "event {}: {} downstream, {}/{} upstream, {}/{} candidates, {}/{} matches (pandora/spine)",
            event.event_id,
            report.downstream_admitted,
            report.upstream_admitted.pandora,
            report.upstream_admitted.spine,
            report.candidates.pandora,
            report.candidates.spine,
            report.matches.pandora,
            report.matches.spine,
        );

        report
    }

    /// Match one stored event against its own truth particles.
    pub fn match_record(&self, record: &EventRecord) -> EventOutcome {
        let truth: TruthTable = record.truth.iter().cloned().collect();
        let mut output = MatchOutput::new();
        let report = self.match_event(&record.input, &truth, &mut output);
        EventOutcome { event_id: record.input.event_id, report, matches: output.results }
    }

    /// Match every record. Outcomes are returned in input order.
    #[cfg(feature = "parallel")]
    pub fn match_all(&self, records: &[EventRecord]) -> Vec<EventOutcome> {
        records.par_iter().map(|r| self.match_record(r)).collect()
    }

    /// Match every record. Outcomes are returned in input order.
    #[cfg(not(feature = "parallel"))]
    pub fn match_all(&self, records: &[EventRecord]) -> Vec<EventOutcome> {
        records.iter().map(|r| self.match_record(r)).collect()
    }

    /// Batch run with summary and run metadata.
    pub fn run(&self, records: &[EventRecord]) -> RunResult {
        let events = self.match_all(records);
        let summary = RunSummary::from_outcomes(&events);
        log::info!(
            "{} events: {} candidates, {} pandora + {} spine matches",
            summary.events,
            summary.candidates,
            summary.matches.pandora,
            summary.matches.spine
        );

        RunResult {
            meta: RunMeta {
                config_name: self.config.name.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            summary,
            events,
        }
    }
}

fn build_result(event: &EventInput, source: RecoSource, selected: Selected) -> Option<MatchResult> {
    let candidate = selected.candidate;
    let (Some(down), Some(up)) = (event.track(&candidate.downstream), event.track(&candidate.upstream))
    else {
        log::warn!("event {}: dangling track reference in accepted match", event.event_id);
        return None;
    };

    let match_type = if candidate.uses_time {
        MatchType::UniqueWithTime
    } else {
        MatchType::UniqueNoTime
    };

    Some(MatchResult {
        source,
        downstream: candidate.downstream,
        upstream: candidate.upstream,
        score: selected.rank,
        transverse_displacement: candidate.transverse_displacement,
        angular_displacement_cos: candidate.angular_displacement_cos,
        match_type,
        joint: JointTrack::join(up, down),
    })
}

/// Parse an event file: a JSON array of event records.
pub fn load_events(json: &str) -> Result<Vec<EventRecord>, MatchError> {
    serde_json::from_str(json).map_err(|e| MatchError::EventParse(e.to_string()))
}
