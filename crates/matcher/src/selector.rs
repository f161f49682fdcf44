//! Greedy, score-ordered one-to-one assignment within a candidate pool.
//!
//! Not a global optimum: the lowest-scoring candidate always wins its two
//! tracks, even when giving them up would lower the pool's total score.

use std::collections::HashSet;

use crate::config::UnscoredPolicy;
use crate::model::{MatchCandidate, Score, TrackRef};

/// Value a candidate is ranked by, or `None` if it may not compete.
pub fn rank(score: Score, policy: UnscoredPolicy) -> Option<f64> {
    match (score, policy) {
        (Score::Scored(v), _) => Some(v),
        (Score::Unscored { .. }, UnscoredPolicy::Exclude) => None,
        (Score::Unscored { base }, UnscoredPolicy::BaseOnly) => Some(base),
    }
}

/// A committed candidate together with the value it was ranked by.
#[derive(Debug, Clone)]
pub struct Selected {
    pub candidate: MatchCandidate,
    pub rank: f64,
}

/// Accept candidates in ascending rank order, skipping any whose downstream
/// or upstream track is already claimed, until the cutoff is exceeded.
pub fn select(candidates: Vec<MatchCandidate>, cutoff: f64, policy: UnscoredPolicy) -> Vec<Selected> {
    let mut ranked: Vec<(f64, MatchCandidate)> = candidates
        .into_iter()
        .filter_map(|c| rank(c.score, policy).map(|r| (r, c)))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut claimed_downstream: HashSet<TrackRef> = HashSet::new();
    let mut claimed_upstream: HashSet<TrackRef> = HashSet::new();
    let mut accepted = Vec::new();

    for (rank, candidate) in ranked {
        if rank > cutoff {
            break;
        }
        if claimed_downstream.contains(&candidate.downstream)
            || claimed_upstream.contains(&candidate.upstream)
        {
            continue;
        }
        claimed_downstream.insert(candidate.downstream);
        claimed_upstream.insert(candidate.upstream);
        accepted.push(Selected { candidate, rank });
    }

    accepted
}
