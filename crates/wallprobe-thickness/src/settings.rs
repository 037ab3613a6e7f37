//! Probe configuration.

use serde::{Deserialize, Serialize};
use wallprobe_bvh::{BuildParams, BuildStrategy};
use wallprobe_math::{Dir3, Vec3, DEGENERACY_SQ_TOL};

use crate::error::{Result, ThicknessError};

/// How thickness is measured at a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeMethod {
    /// Cast rays from the triangle centroid.
    #[default]
    Ray,
    /// Largest inscribed sphere. Not implemented; a pass always fails.
    Sphere,
}

/// Thickness probe parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThicknessSettings {
    /// Probing method.
    pub method: ProbeMethod,
    /// Global probing direction. When absent each triangle probes along its
    /// inward normal.
    pub direction: Option<[f64; 3]>,
    /// Hierarchy build strategy.
    pub strategy: BuildStrategy,
    /// Hierarchy leaf size bounds.
    pub build: BuildParams,
    /// Probe triangles on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ThicknessSettings {
    fn default() -> Self {
        Self {
            method: ProbeMethod::Ray,
            direction: None,
            strategy: BuildStrategy::Binned,
            build: BuildParams::default(),
            parallel: false,
        }
    }
}

impl ThicknessSettings {
    /// Parse settings from TOML and validate them.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Self = toml::from_str(s).map_err(|e| ThicknessError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        self.build
            .validate()
            .map_err(|e| ThicknessError::InvalidSettings(e.to_string()))?;
        if let Some(d) = self.direction {
            if d.iter().any(|c| !c.is_finite()) {
                return Err(ThicknessError::InvalidSettings(
                    "direction components must be finite".into(),
                ));
            }
            if Vec3::from(d).norm_squared() < DEGENERACY_SQ_TOL {
                return Err(ThicknessError::InvalidSettings(
                    "direction must not be zero".into(),
                ));
            }
        }
        Ok(())
    }

    /// Use a global probing direction.
    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = Some([direction.x, direction.y, direction.z]);
        self
    }

    /// Use the given probing method.
    pub fn with_method(mut self, method: ProbeMethod) -> Self {
        self.method = method;
        self
    }

    /// Enable or disable the parallel pass.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The normalized global direction, if one is set and non-zero.
    pub fn probe_direction(&self) -> Option<Dir3> {
        let d = Vec3::from(self.direction?);
        Dir3::try_new(d, 0.0)
    }
}
