//! Compatibility score of one (downstream, upstream) track pair.

use crate::config::{AngleTolerance, MatchConfig};
use crate::model::{Score, Track, Trigger};
use crate::projection::{project, Direction};
use crate::truth::{dominant_particle, TruthLookup};

/// Opening angles between two directions [degrees].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angles {
    /// Angle between the projections onto the x–z plane.
    pub xz: f64,
    /// Angle between the projections onto the y–z plane.
    pub yz: f64,
    pub overall: f64,
}

/// Angle between two vectors given their dot product and magnitudes.
/// `None` when either magnitude vanishes.
fn normalized_angle(dot: f64, norm_a: f64, norm_b: f64) -> Option<f64> {
    let denom = norm_a * norm_b;
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    let cos = (dot / denom).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Angles between the downstream start direction and the upstream end
/// direction. Each dot product is normalized in its own plane, so the
/// inputs need not be unit vectors.
pub fn angles_between(downstream: &Track, upstream: &Track) -> Option<Angles> {
    let a = downstream.start_dir;
    let b = upstream.end_dir;

    let xz = normalized_angle(
        a.x * b.x + a.z * b.z,
        a.x.hypot(a.z),
        b.x.hypot(b.z),
    )?;
    let yz = normalized_angle(
        a.y * b.y + a.z * b.z,
        a.y.hypot(a.z),
        b.y.hypot(b.z),
    )?;
    let overall = normalized_angle(a.dot(&b), a.norm(), b.norm())?;

    Some(Angles { xz, yz, overall })
}

/// Scored quantities of a candidate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scoring {
    pub score: Score,
    pub dx: f64,
    pub dy: f64,
    pub angles: Angles,
    /// True when the timing term contributed to `score`.
    pub uses_time: bool,
}

impl Scoring {
    pub fn transverse_displacement(&self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Always derived from the overall 3D angle, whatever the scoring mode.
    pub fn angular_displacement_cos(&self) -> f64 {
        self.angles.overall.to_radians().cos()
    }
}

/// Score a pair. Returns `None` when the pair is geometrically degenerate
/// (no forward projection, or an undefined angle).
pub fn score(
    downstream: &Track,
    upstream: &Track,
    config: &MatchConfig,
    trigger: &Trigger,
    truth: &dyn TruthLookup,
) -> Option<Scoring> {
    let landing = project(upstream, Direction::Forward, &config.geometry)?;
    let dx = downstream.start.x - landing.x;
    let dy = downstream.start.y - landing.y;

    let angles = angles_between(downstream, upstream)?;

    let transverse = (dx / config.transverse.sigma_x).powi(2) + (dy / config.transverse.sigma_y).powi(2);
    let angular = match config.angle {
        AngleTolerance::Single { sigma } => (angles.overall / sigma).powi(2),
        AngleTolerance::Split { sigma_x, sigma_y } => {
            (angles.xz / sigma_x).powi(2) + (angles.yz / sigma_y).powi(2)
        }
    };
    let base = transverse + angular;

    if !config.timing.enabled {
        return Some(Scoring { score: Score::Scored(base), dx, dy, angles, uses_time: false });
    }

    let particle = dominant_particle(upstream).and_then(|id| truth.particle(&id));
    let score = match particle {
        Some(p) => {
            let upstream_time = p.time - trigger.offset_ns();
            let delta_t = upstream_time - downstream.time;
            let timing = ((delta_t - config.timing.mean_t) / config.timing.sigma_t).powi(2);
            Score::Scored(base + timing)
        }
        None => Score::Unscored { base },
    };

    Some(Scoring { score, dx, dy, angles, uses_time: !score.is_unscored() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeometryConfig, TimingConfig, TransverseTolerance, UnscoredPolicy};
    use crate::model::{TrueParticleId, TruthOverlap, TruthParticle, Vec3};
    use crate::truth::{NoTruth, TruthTable};

    const AXIS: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    fn config(angle: AngleTolerance) -> MatchConfig {
        MatchConfig {
            name: "test".into(),
            score_cutoff: 10.0,
            transverse: TransverseTolerance { sigma_x: 10.0, sigma_y: 20.0 },
            angle,
            timing: TimingConfig::default(),
            geometry: GeometryConfig::default(),
        }
    }

    fn timed_config(mean_t: f64, sigma_t: f64) -> MatchConfig {
        let mut c = config(AngleTolerance::Single { sigma: 5.0 });
        c.timing = TimingConfig { enabled: true, mean_t, sigma_t, on_unresolved: UnscoredPolicy::Exclude };
        c
    }

    /// Upstream track ending at (x, y, 905) heading along `dir`.
    fn upstream(x: f64, y: f64, dir: Vec3) -> Track {
        Track {
            start: Vec3::new(x, y, 500.0),
            end: Vec3::new(x, y, 905.0),
            start_dir: AXIS,
            end_dir: dir,
            time: 0.0,
            visible_energy: 0.0,
            truth: vec![TruthOverlap { particle: TrueParticleId { interaction: 0, part: 1 }, overlap: 0.9 }],
        }
    }

    fn downstream(x: f64, y: f64, dir: Vec3, time: f64) -> Track {
        Track {
            start: Vec3::new(x, y, 1140.0),
            end: Vec3::new(x, y, 1400.0),
            start_dir: dir,
            end_dir: dir,
            time,
            visible_energy: 0.0,
            truth: vec![],
        }
    }

    fn value(s: &Scoring) -> f64 {
        match s.score {
            Score::Scored(v) => v,
            Score::Unscored { .. } => panic!("expected a scored candidate"),
        }
    }

    fn score_plain(down: &Track, up: &Track, c: &MatchConfig) -> Scoring {
        score(down, up, c, &Trigger::default(), &NoTruth).unwrap()
    }

    #[test]
    fn aligned_tracks_score_zero() {
        let c = config(AngleTolerance::Single { sigma: 5.0 });
        let s = score_plain(&downstream(3.0, -7.0, AXIS, 0.0), &upstream(3.0, -7.0, AXIS), &c);
        assert_eq!(value(&s), 0.0);
        assert_eq!(s.transverse_displacement(), 0.0);
        assert!((s.angular_displacement_cos() - 1.0).abs() < 1e-12);
        assert!(!s.uses_time);
    }

    #[test]
    fn transverse_terms_use_their_own_sigma() {
        let c = config(AngleTolerance::Single { sigma: 5.0 });
        let s = score_plain(&downstream(10.0, 40.0, AXIS, 0.0), &upstream(0.0, 0.0, AXIS), &c);
        // (10/10)^2 + (40/20)^2
        assert!((value(&s) - 5.0).abs() < 1e-12);
        assert!((s.transverse_displacement() - 1700f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn score_grows_with_dx_and_ignores_its_sign() {
        let c = config(AngleTolerance::Single { sigma: 5.0 });
        let up = upstream(0.0, 0.0, AXIS);
        let mut last = -1.0;
        for dx in [0.0, 1.0, 2.5, 7.0, 30.0] {
            let plus = value(&score_plain(&downstream(dx, 0.0, AXIS, 0.0), &up, &c));
            let minus = value(&score_plain(&downstream(-dx, 0.0, AXIS, 0.0), &up, &c));
            assert!(plus > last);
            assert_eq!(plus, minus);
            last = plus;
        }
    }

    #[test]
    fn unnormalized_parallel_directions_have_zero_angle() {
        let down = downstream(0.0, 0.0, Vec3::new(0.3, 0.4, 1.2), 0.0);
        let up = upstream(0.0, 0.0, Vec3::new(3.0, 4.0, 12.0));
        let a = angles_between(&down, &up).unwrap();
        assert!(a.overall.abs() < 1e-5);
        assert!(a.xz.abs() < 1e-5);
        assert!(a.yz.abs() < 1e-5);
    }

    #[test]
    fn planar_angles_split_the_opening() {
        // 45 degrees in x–z only.
        let down = downstream(0.0, 0.0, Vec3::new(1.0, 0.0, 1.0), 0.0);
        let up = upstream(0.0, 0.0, Vec3::new(0.0, 0.0, 2.0));
        let a = angles_between(&down, &up).unwrap();
        assert!((a.xz - 45.0).abs() < 1e-9);
        assert!(a.yz.abs() < 1e-9);
        assert!((a.overall - 45.0).abs() < 1e-9);
    }

    #[test]
    fn split_mode_scores_planar_angles() {
        let down = downstream(0.0, 0.0, Vec3::new(1.0, 0.0, 1.0), 0.0);
        let up = upstream(0.0, 0.0, AXIS);
        let split = config(AngleTolerance::Split { sigma_x: 15.0, sigma_y: 1.0 });
        let single = config(AngleTolerance::Single { sigma: 9.0 });
        assert!((value(&score_plain(&down, &up, &split)) - 9.0).abs() < 1e-9);
        assert!((value(&score_plain(&down, &up, &single)) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn reported_cosine_uses_overall_angle_in_split_mode() {
        let down = downstream(0.0, 0.0, Vec3::new(1.0, 1.0, 1.0), 0.0);
        let up = upstream(0.0, 0.0, AXIS);
        let s = score_plain(&down, &up, &config(AngleTolerance::Split { sigma_x: 5.0, sigma_y: 5.0 }));
        assert!((s.angular_displacement_cos() - 1.0 / 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn zero_direction_is_degenerate() {
        let c = config(AngleTolerance::Single { sigma: 5.0 });
        let down = downstream(0.0, 0.0, Vec3::default(), 0.0);
        assert!(score(&down, &upstream(0.0, 0.0, AXIS), &c, &Trigger::default(), &NoTruth).is_none());
    }

    #[test]
    fn timing_term_uses_trigger_offset() {
        let c = timed_config(2.0, 4.0);
        let truth: TruthTable = vec![TruthParticle {
            id: TrueParticleId { interaction: 0, part: 1 },
            time: 1e9 + 30.0,
            start: Vec3::default(),
        }]
        .into_iter()
        .collect();
        let trigger = Trigger { time_s: 1, time_ns: 0.0 };
        // upstream time 30, downstream time 20 → Δt 10, (10 - 2) / 4 = 2
        let s = score(&downstream(0.0, 0.0, AXIS, 20.0), &upstream(0.0, 0.0, AXIS), &c, &trigger, &truth).unwrap();
        assert!((value(&s) - 4.0).abs() < 1e-9);
        assert!(s.uses_time);
    }

    #[test]
    fn failed_truth_lookup_is_unscored() {
        let c = timed_config(0.0, 1.0);
        let s = score(&downstream(10.0, 0.0, AXIS, 0.0), &upstream(0.0, 0.0, AXIS), &c, &Trigger::default(), &NoTruth).unwrap();
        assert_eq!(s.score, Score::Unscored { base: 1.0 });
        assert!(!s.uses_time);
    }

    #[test]
    fn untruthed_track_is_unscored() {
        let c = timed_config(0.0, 1.0);
        let mut up = upstream(0.0, 0.0, AXIS);
        up.truth.clear();
        let s = score(&downstream(0.0, 0.0, AXIS, 0.0), &up, &c, &Trigger::default(), &TruthTable::new()).unwrap();
        assert!(s.score.is_unscored());
    }
}
