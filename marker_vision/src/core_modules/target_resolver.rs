// THEORY:
// The `TargetResolver` is the decision layer. Given the ranked candidates of one frame,
// it picks at most one target and converts its position and size into a relative
// pointer movement.
//
// 1.  **Selection**: the capture region's own outline often shows up as the largest
//     candidate. `SelectionPolicy` decides how to get past it: either drop candidates
//     whose bounds span the whole region and take the largest remaining one, or the
//     positional rule of skipping the leading entries.
// 2.  **Location**: the signed offset from the capture center is scaled by a tuned
//     multiplier and rounded into a movement vector. The multiplier grows linearly from
//     1/3 for a centered target towards 1 at `max_target_distance`. Its formula is kept
//     exactly as tuned, including the target-size terms that cancel out.
//
// The resolver keeps nothing between frames.

use crate::core_modules::candidate::Candidate;
use crate::core_modules::moments::CenterOffset;
use crate::pipeline::DetectionConfig;
use serde::{Deserialize, Serialize};

/// How the resolver skips past the capture region's own outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Require `min_candidates` entries and take the one at `min_candidates - 1`.
    SkipLeading,
    /// Ignore candidates whose bounds come within `tolerance` pixels of all four
    /// region edges; take the largest of the rest.
    ExcludeCaptureBoundary { tolerance: u32 },
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::ExcludeCaptureBoundary { tolerance: 4 }
    }
}

/// A relative pointer movement in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Movement {
    pub dx: i32,
    pub dy: i32,
}

/// The target chosen for one frame and the movement towards it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub candidate: Candidate,
    /// Signed offset of the target's centroid from the capture center.
    pub offset: CenterOffset,
    /// Euclidean distance from the capture center.
    pub distance: f64,
    pub multiplier: f64,
    pub movement: Movement,
}

pub mod target_resolver {
    use super::*;
    use tracing::debug;

    /// Picks the target among ranked `candidates`.
    pub fn select<'a>(candidates: &'a [Candidate], config: &DetectionConfig) -> Option<&'a Candidate> {
        match config.selection {
            SelectionPolicy::SkipLeading => {
                let required = config.min_candidates.max(1);
                if candidates.len() < required {
                    return None;
                }
                candidates.get(required - 1)
            }
            SelectionPolicy::ExcludeCaptureBoundary { tolerance } => candidates
                .iter()
                .find(|candidate| !candidate.spans_region(config.square_size, tolerance)),
        }
    }

    /// Computes the movement towards `candidate`.
    pub fn locate(candidate: &Candidate, square_size: u32, max_target_distance: f64) -> SelectionResult {
        let offset = CenterOffset::from_centroid(candidate.centroid, square_size);
        let distance = offset.distance();
        let multiplier = movement_multiplier(distance, candidate.area, max_target_distance);
        let movement = Movement {
            dx: (offset.dx * multiplier).round() as i32,
            dy: (offset.dy * multiplier).round() as i32,
        };
        debug!(
            cx = candidate.centroid.x,
            cy = candidate.centroid.y,
            distance,
            multiplier,
            dx = movement.dx,
            dy = movement.dy,
            "target located"
        );
        SelectionResult {
            candidate: candidate.clone(),
            offset,
            distance,
            multiplier,
            movement,
        }
    }

    /// Tuned linear scale applied to the aim offset.
    pub fn movement_multiplier(distance: f64, target_size: f64, max_target_distance: f64) -> f64 {
        let slope = ((1.0 / 3.0) - 1.0) / (max_target_distance / target_size);
        ((max_target_distance - distance) / target_size) * slope + 1.0
    }

    /// `select` followed by `locate`.
    pub fn resolve(candidates: &[Candidate], config: &DetectionConfig) -> Option<SelectionResult> {
        let target = select(candidates, config)?;
        Some(locate(target, config.square_size, config.max_target_distance()))
    }
}
