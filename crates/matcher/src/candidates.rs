use crate::config::MatchConfig;
use crate::fiducial::{admit_downstream, admit_upstream};
use crate::model::{EventInput, Interaction, MatchCandidate, RecoSource, Track, TrackRef};
use crate::scorer::score;
use crate::truth::TruthLookup;

/// Tracks of one collection that passed the fiducial cuts, with their refs.
pub type Admitted<'a> = Vec<(TrackRef, &'a Track)>;

/// Admissible downstream tracks of the event, in interaction/track order.
pub fn admitted_downstream<'a>(event: &'a EventInput, config: &MatchConfig) -> Admitted<'a> {
    collect_admitted(&event.downstream, TrackRef::downstream, |t| {
        admit_downstream(t, &config.geometry)
    })
}

/// Admissible upstream tracks produced by `source`.
pub fn admitted_upstream<'a>(
    event: &'a EventInput,
    source: RecoSource,
    config: &MatchConfig,
) -> Admitted<'a> {
    collect_admitted(
        event.upstream(source),
        |ixn, idx| TrackRef::upstream(source, ixn, idx),
        |t| admit_upstream(t, &config.geometry),
    )
}

fn collect_admitted<'a>(
    interactions: &'a [Interaction],
    make_ref: impl Fn(usize, usize) -> TrackRef,
    admit: impl Fn(&Track) -> bool,
) -> Admitted<'a> {
    let mut out = Vec::new();
    for (ixn, interaction) in interactions.iter().enumerate() {
        for (idx, track) in interaction.tracks.iter().enumerate() {
            if admit(track) {
                out.push((make_ref(ixn, idx), track));
            } else {
                log::trace!("rejected {:?}", make_ref(ixn, idx));
            }
        }
    }
    out
}

/// Score every admissible (downstream, upstream) pair of one pool.
///
/// Pairs that are geometrically degenerate produce no candidate.
pub fn generate(
    downstream: &Admitted<'_>,
    upstream: &Admitted<'_>,
    event: &EventInput,
    config: &MatchConfig,
    truth: &dyn TruthLookup,
) -> Vec<MatchCandidate> {
    let mut pool = Vec::with_capacity(downstream.len() * upstream.len());

    for (down_ref, down) in downstream {
        for (up_ref, up) in upstream {
            let Some(scoring) = score(down, up, config, &event.trigger, truth) else {
                log::trace!("skipped degenerate pair {:?} / {:?}", down_ref, up_ref);
                continue;
            };
            pool.push(MatchCandidate {
                downstream: *down_ref,
                upstream: *up_ref,
                score: scoring.score,
                transverse_displacement: scoring.transverse_displacement(),
                angular_displacement_cos: scoring.angular_displacement_cos(),
                uses_time: scoring.uses_time,
            });
        }
    }

    pool
}
