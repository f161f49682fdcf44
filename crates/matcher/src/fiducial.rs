//! Admissibility cuts applied before a track may take part in any candidate.

use crate::config::GeometryConfig;
use crate::model::Track;
use crate::projection::{project, Direction};

/// A downstream track is admissible when it starts inside the downstream
/// volume, close to its entrance face, and points back into the upstream
/// exit face.
pub fn admit_downstream(track: &Track, geometry: &GeometryConfig) -> bool {
    let fid = &geometry.downstream;
    let start = track.start;

    if !fid.contains(start.x, start.y, start.z) {
        return false;
    }
    if start.z >= fid.z_min + geometry.downstream_z_cutoff {
        return false;
    }

    match project(track, Direction::Backward, geometry) {
        Some(p) => geometry.upstream.contains_xy(p.x, p.y),
        None => {
            log::trace!("downstream track at {:?} runs parallel to the boundary", start);
            false
        }
    }
}

/// An upstream track is admissible when it is fully contained in the
/// upstream volume, ends close to its exit face, and points into the
/// downstream entrance face.
pub fn admit_upstream(track: &Track, geometry: &GeometryConfig) -> bool {
    let fid = &geometry.upstream;
    let (start, end) = (track.start, track.end);

    if !fid.contains(start.x, start.y, start.z) || !fid.contains(end.x, end.y, end.z) {
        return false;
    }
    if end.z <= fid.z_max - geometry.upstream_z_cutoff {
        return false;
    }

    match project(track, Direction::Forward, geometry) {
        Some(p) => geometry.downstream.contains_xy(p.x, p.y),
        None => {
            log::trace!("upstream track ending at {:?} runs parallel to the boundary", end);
            false
        }
    }
}
