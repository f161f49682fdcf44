use serde::{Deserialize, Serialize};

use crate::error::MatchError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MatchConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Maximum acceptable score; candidates above it are never accepted.
    pub score_cutoff: f64,
    pub transverse: TransverseTolerance,
    pub angle: AngleTolerance,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
}

fn default_name() -> String {
    "xmatch".into()
}

// ---------------------------------------------------------------------------
// Scoring tolerances
// ---------------------------------------------------------------------------

/// Transverse tolerances at the downstream entrance plane [cm].
#[derive(Debug, Clone, Deserialize)]
pub struct TransverseTolerance {
    pub sigma_x: f64,
    pub sigma_y: f64,
}

/// Angular tolerance [degrees].
///
/// `single` scores the overall 3D opening angle; `split` scores the x–z and
/// y–z planar angles separately.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AngleTolerance {
    Single { sigma: f64 },
    Split { sigma_x: f64, sigma_y: f64 },
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// What happens to a candidate whose timing term cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscoredPolicy {
    /// Never competes for a match.
    #[default]
    Exclude,
    /// Competes with its spatial + angular score only.
    BaseOnly,
}

impl std::fmt::Display for UnscoredPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exclude => write!(f, "exclude"),
            Self::BaseOnly => write!(f, "base_only"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Expected upstream-to-downstream time difference [ns].
    #[serde(default)]
    pub mean_t: f64,
    #[serde(default = "default_sigma_t")]
    pub sigma_t: f64,
    #[serde(default)]
    pub on_unresolved: UnscoredPolicy,
}

fn default_sigma_t() -> f64 {
    1.0
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mean_t: 0.0,
            sigma_t: default_sigma_t(),
            on_unresolved: UnscoredPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Axis-aligned fiducial box [cm]. Bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FiducialBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl FiducialBox {
    /// Liquid-argon TPC active volume.
    pub const UPSTREAM: FiducialBox = FiducialBox {
        x_min: -347.848,
        x_max: 347.848,
        y_min: -216.671,
        y_max: 82.9282,
        z_min: 417.924,
        z_max: 913.588,
    };

    /// Muon spectrometer active volume.
    pub const DOWNSTREAM: FiducialBox = FiducialBox {
        x_min: -352.0,
        x_max: 352.0,
        y_min: -386.4,
        y_max: 115.9,
        z_min: 1136.2,
        z_max: 1831.4,
    };

    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        x > self.x_min && x < self.x_max && y > self.y_min && y < self.y_max
    }

    pub fn contains(&self, x: f64, y: f64, z: f64) -> bool {
        self.contains_xy(x, y) && z > self.z_min && z < self.z_max
    }

    fn validate(&self, label: &str) -> Result<(), MatchError> {
        let axes = [
            ("x", self.x_min, self.x_max),
            ("y", self.y_min, self.y_max),
            ("z", self.z_min, self.z_max),
        ];
        for (axis, lo, hi) in axes {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(MatchError::ConfigValidation(format!(
                    "geometry.{label}: {axis}_min ({lo}) must be finite and below {axis}_max ({hi})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeometryConfig {
    #[serde(default = "default_upstream_box")]
    pub upstream: FiducialBox,
    #[serde(default = "default_downstream_box")]
    pub downstream: FiducialBox,
    /// Upstream tracks must end within this distance of the exit face [cm].
    #[serde(default = "default_z_cutoff")]
    pub upstream_z_cutoff: f64,
    /// Downstream tracks must start within this distance of the entrance face [cm].
    #[serde(default = "default_z_cutoff")]
    pub downstream_z_cutoff: f64,
}

fn default_upstream_box() -> FiducialBox {
    FiducialBox::UPSTREAM
}

fn default_downstream_box() -> FiducialBox {
    FiducialBox::DOWNSTREAM
}

fn default_z_cutoff() -> f64 {
    20.0
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            upstream: FiducialBox::UPSTREAM,
            downstream: FiducialBox::DOWNSTREAM,
            upstream_z_cutoff: default_z_cutoff(),
            downstream_z_cutoff: default_z_cutoff(),
        }
    }
}

impl GeometryConfig {
    /// z of the plane through which upstream tracks leave their volume.
    pub fn upstream_exit_z(&self) -> f64 {
        self.upstream.z_max
    }

    /// z of the plane through which tracks enter the downstream volume.
    pub fn downstream_entrance_z(&self) -> f64 {
        self.downstream.z_min
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

fn require_positive(field: &str, value: f64) -> Result<(), MatchError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MatchError::ConfigValidation(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, MatchError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if !self.score_cutoff.is_finite() || self.score_cutoff < 0.0 {
            return Err(MatchError::ConfigValidation(format!(
                "score_cutoff must be a non-negative number, got {}",
                self.score_cutoff
            )));
        }

        require_positive("transverse.sigma_x", self.transverse.sigma_x)?;
        require_positive("transverse.sigma_y", self.transverse.sigma_y)?;

        match self.angle {
            AngleTolerance::Single { sigma } => require_positive("angle.sigma", sigma)?,
            AngleTolerance::Split { sigma_x, sigma_y } => {
                require_positive("angle.sigma_x", sigma_x)?;
                require_positive("angle.sigma_y", sigma_y)?;
            }
        }

        if self.timing.enabled {
            require_positive("timing.sigma_t", self.timing.sigma_t)?;
            if !self.timing.mean_t.is_finite() {
                return Err(MatchError::ConfigValidation(format!(
                    "timing.mean_t must be finite, got {}",
                    self.timing.mean_t
                )));
            }
        }

        self.geometry.upstream.validate("upstream")?;
        self.geometry.downstream.validate("downstream")?;
        require_positive("geometry.upstream_z_cutoff", self.geometry.upstream_z_cutoff)?;
        require_positive("geometry.downstream_z_cutoff", self.geometry.downstream_z_cutoff)?;

        if self.geometry.upstream_exit_z() > self.geometry.downstream_entrance_z() {
            return Err(MatchError::ConfigValidation(format!(
                "upstream exit face (z={}) lies beyond downstream entrance face (z={})",
                self.geometry.upstream_exit_z(),
                self.geometry.downstream_entrance_z()
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name = "lar-tms"
score_cutoff = 10.0

[transverse]
sigma_x = 10.0
sigma_y = 12.0

[angle]
mode = "single"
sigma = 5.0
"#;

    #[test]
    fn parse_minimal_uses_defaults() {
        let config = MatchConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.name, "lar-tms");
        assert_eq!(config.score_cutoff, 10.0);
        assert_eq!(config.transverse.sigma_y, 12.0);
        assert_eq!(config.angle, AngleTolerance::Single { sigma: 5.0 });
        assert!(!config.timing.enabled);
        assert_eq!(config.timing.on_unresolved, UnscoredPolicy::Exclude);
        assert_eq!(config.geometry.upstream, FiducialBox::UPSTREAM);
        assert_eq!(config.geometry.downstream, FiducialBox::DOWNSTREAM);
        assert_eq!(config.geometry.upstream_z_cutoff, 20.0);
        assert_eq!(config.geometry.downstream_z_cutoff, 20.0);
    }

    #[test]
    fn parse_split_angle_and_timing() {
        let input = r#"
score_cutoff = 25.0

[transverse]
sigma_x = 10.0
sigma_y = 10.0

[angle]
mode = "split"
sigma_x = 4.0
sigma_y = 6.0

[timing]
enabled = true
mean_t = 3.5
sigma_t = 2.0
on_unresolved = "base_only"
"#;
        let config = MatchConfig::from_toml(input).unwrap();
        assert_eq!(config.name, "xmatch");
        assert_eq!(config.angle, AngleTolerance::Split { sigma_x: 4.0, sigma_y: 6.0 });
        assert!(config.timing.enabled);
        assert_eq!(config.timing.mean_t, 3.5);
        assert_eq!(config.timing.on_unresolved, UnscoredPolicy::BaseOnly);
    }

    #[test]
    fn parse_custom_geometry() {
        let input = format!(
            r#"{MINIMAL}
[geometry]
upstream_z_cutoff = 15.0

[geometry.upstream]
x_min = -100.0
x_max = 100.0
y_min = -50.0
y_max = 50.0
z_min = 0.0
z_max = 200.0
"#
        );
        let config = MatchConfig::from_toml(&input).unwrap();
        assert_eq!(config.geometry.upstream.x_max, 100.0);
        assert_eq!(config.geometry.upstream_exit_z(), 200.0);
        assert_eq!(config.geometry.upstream_z_cutoff, 15.0);
        assert_eq!(config.geometry.downstream_z_cutoff, 20.0);
        assert_eq!(config.geometry.downstream, FiducialBox::DOWNSTREAM);
    }

    #[test]
    fn reject_unknown_angle_mode() {
        let input = MINIMAL.replace("mode = \"single\"", "mode = \"double\"");
        let err = MatchConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, MatchError::ConfigParse(_)));
    }

    #[test]
    fn reject_split_fields_in_single_mode() {
        let input = MINIMAL.replace("sigma = 5.0", "sigma_x = 5.0\nsigma_y = 5.0");
        assert!(MatchConfig::from_toml(&input).is_err());
    }

    #[test]
    fn reject_non_positive_sigma() {
        let input = MINIMAL.replace("sigma_x = 10.0", "sigma_x = 0.0");
        let err = MatchConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("transverse.sigma_x"));
    }

    #[test]
    fn reject_negative_cutoff() {
        let input = MINIMAL.replace("score_cutoff = 10.0", "score_cutoff = -1.0");
        let err = MatchConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("score_cutoff"));
    }

    #[test]
    fn timing_sigma_only_checked_when_enabled() {
        let disabled = format!("{MINIMAL}\n[timing]\nsigma_t = 0.0\n");
        assert!(MatchConfig::from_toml(&disabled).is_ok());

        let enabled = format!("{MINIMAL}\n[timing]\nenabled = true\nsigma_t = 0.0\n");
        let err = MatchConfig::from_toml(&enabled).unwrap_err();
        assert!(err.to_string().contains("timing.sigma_t"));
    }

    #[test]
    fn reject_inverted_box() {
        let input = format!(
            r#"{MINIMAL}
[geometry.downstream]
x_min = 10.0
x_max = -10.0
y_min = -50.0
y_max = 50.0
z_min = 1000.0
z_max = 1500.0
"#
        );
        let err = MatchConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("geometry.downstream"));
    }

    #[test]
    fn reject_overlapping_volumes() {
        let input = format!(
            r#"{MINIMAL}
[geometry.upstream]
x_min = -100.0
x_max = 100.0
y_min = -50.0
y_max = 50.0
z_min = 0.0
z_max = 1200.0
"#
        );
        let err = MatchConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("exit face"));
    }

    #[test]
    fn box_bounds_are_exclusive() {
        let b = FiducialBox::UPSTREAM;
        assert!(!b.contains_xy(b.x_min, 0.0));
        assert!(b.contains_xy(b.x_min + 1.0, 0.0));
        assert!(!b.contains(0.0, 0.0, b.z_max));
    }
}
