//! Pass statistics and the combined report.

use serde::{Deserialize, Serialize};

use crate::field::ScalarField;

/// Counts collected during one probing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStats {
    /// Candidate triangles visited.
    pub triangles: usize,
    /// Triangles that produced a thickness sample.
    pub probed: usize,
    /// Triangles skipped as degenerate or out of range.
    pub degenerate: usize,
    /// Triangles skipped because the probing direction grazes them.
    pub tangential: usize,
    /// Triangles whose rays hit nothing.
    pub unresolved: usize,
}

impl ProbeStats {
    /// Percentage of visited triangles that produced a sample.
    #[allow(clippy::cast_precision_loss)]
    pub fn coverage_percent(&self) -> f64 {
        if self.triangles == 0 {
            0.0
        } else {
            100.0 * self.probed as f64 / self.triangles as f64
        }
    }
}

/// Everything a finished pass produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThicknessReport {
    /// Pass counts.
    pub stats: ProbeStats,
    /// Smallest sample, if any.
    pub min_thickness: Option<f64>,
    /// Largest sample, if any.
    pub max_thickness: Option<f64>,
    /// Per-id thickness.
    pub field: ScalarField,
}

impl std::fmt::Display for ThicknessReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Wall Thickness Probe:")?;
        writeln!(f, "  Triangles: {}", self.stats.triangles)?;
        writeln!(f, "  Probed: {}", self.stats.probed)?;
        writeln!(f, "  Coverage: {:.1}%", self.stats.coverage_percent())?;
        writeln!(f, "  Degenerate: {}", self.stats.degenerate)?;
        writeln!(f, "  Tangential: {}", self.stats.tangential)?;
        writeln!(f, "  Unresolved: {}", self.stats.unresolved)?;
        match (self.min_thickness, self.max_thickness) {
            (Some(min), Some(max)) => {
                writeln!(f, "  Min thickness: {min:.3}")?;
                writeln!(f, "  Max thickness: {max:.3}")?;
            }
            _ => writeln!(f, "  No thickness samples")?,
        }
        Ok(())
    }
}
