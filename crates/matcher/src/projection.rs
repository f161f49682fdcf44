//! Straight-line extrapolation of track endpoints onto the boundary planes.

use crate::config::GeometryConfig;
use crate::model::{Track, Vec3};

/// Which end of the track is extrapolated, and towards which plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From the track end, along the end direction, to the downstream
    /// entrance plane.
    Forward,
    /// From the track start, against the start direction, to the upstream
    /// exit plane.
    Backward,
}

/// Extrapolate `track` onto the boundary plane selected by `direction`.
///
/// The returned `z` is the plane coordinate. Returns `None` when the
/// relevant direction has no component along z (the track runs parallel to
/// the plane) or the result is not finite.
pub fn project(track: &Track, direction: Direction, geometry: &GeometryConfig) -> Option<Vec3> {
    let (origin, dir, plane_z, sign) = match direction {
        Direction::Forward => (track.end, track.end_dir, geometry.downstream_entrance_z(), 1.0),
        Direction::Backward => (track.start, track.start_dir, geometry.upstream_exit_z(), -1.0),
    };

    if dir.z == 0.0 {
        return None;
    }

    // Distance travelled along z, measured in the direction of extrapolation.
    let dz = match direction {
        Direction::Forward => plane_z - origin.z,
        Direction::Backward => origin.z - plane_z,
    };

    let x = origin.x + sign * dir.x * dz / dir.z;
    let y = origin.y + sign * dir.y * dz / dir.z;

    if x.is_finite() && y.is_finite() {
        Some(Vec3::new(x, y, plane_z))
    } else {
        None
    }
}
