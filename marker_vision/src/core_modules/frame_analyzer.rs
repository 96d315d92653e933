// THEORY:
// The `FrameAnalyzer` is the engine of the detection layer. It turns one raw frame into
// an ordered list of plausible targets.
//
// Algorithm steps:
// 1.  **Color Gating**: HSV conversion and an inclusive range test against the marker
//     color. Non-marker pixels are blacked out, the rest reduced to luma (`mask`).
// 2.  **Adaptive Thresholding**: luma is binarized against a Gaussian local mean (`mask`).
// 3.  **Boundary Extraction**: region boundaries at every nesting depth, chain
//     compressed, then replaced by their convex hulls (`contour`).
// 4.  **Geometry & Ranking**: area moments give area, centroid and center offset once
//     per hull (`candidate`). Hulls with zero area are dropped. The rest are ranked by
//     area, largest first; ties keep extraction order.
// 5.  **Geometric Filtering**: each candidate runs through an ordered list of cheap
//     predicates; the first one that fails rejects it. Survivors keep their rank.
//
// The analyzer is stateless and deterministic. An observer may watch every hull and
// every verdict, but it only ever sees shared references and cannot change the result.

use crate::core_modules::candidate::Candidate;
use crate::core_modules::contour::{Contour, extract_region_boundaries};
use crate::core_modules::frame::Frame;
use crate::core_modules::mask::{adaptive_threshold, masked_intensity};
use crate::core_modules::observer::{DetectionObserver, NoObserver};
use crate::pipeline::DetectionConfig;

/// Why the geometric filter turned a candidate down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Centroid further than the target size from center along either axis.
    OutsideTargetWindow,
    /// Enclosed area below the configured minimum.
    TooSmall,
    /// Zero bounding width or height.
    Sliver,
    /// Bounding width over height above the configured maximum.
    TooWide,
}

/// Outcome of the geometric filter for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

pub mod frame_analyzer {
    use super::*;
    use tracing::{debug, trace};

    /// Detects marker-outlined candidates in `frame`.
    pub fn detect(frame: &Frame, config: &DetectionConfig) -> Vec<Candidate> {
        detect_observed(frame, config, &mut NoObserver)
    }

    /// Same as `detect`, reporting intermediate results to `observer`.
    pub fn detect_observed(
        frame: &Frame,
        config: &DetectionConfig,
        observer: &mut dyn DetectionObserver,
    ) -> Vec<Candidate> {
        if frame.is_empty() {
            return Vec::new();
        }

        // --- 1. Color Gating ---
        let intensity = masked_intensity(frame, &config.color_range);

        // --- 2. Adaptive Thresholding ---
        let binary = adaptive_threshold(&intensity, &config.threshold);

        // --- 3. Boundary Extraction ---
        let hulls: Vec<Contour> = extract_region_boundaries(&binary)
            .iter()
            .map(Contour::convex_hull)
            .collect();
        observer.on_hulls(&hulls);
        let hull_count = hulls.len();

        // --- 4. Geometry & Ranking ---
        let mut candidates: Vec<Candidate> = hulls
            .into_iter()
            .filter_map(|hull| Candidate::from_contour(hull, config.square_size))
            .collect();
        candidates.sort_by(|a, b| b.area.total_cmp(&a.area));
        let ranked_count = candidates.len();

        // --- 5. Geometric Filtering ---
        let accepted: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| {
                let verdict = evaluate(candidate, config);
                observer.on_verdict(candidate, &verdict);
                if let Verdict::Rejected(reason) = verdict {
                    trace!(
                        ?reason,
                        area = candidate.area,
                        cx = candidate.centroid.x,
                        cy = candidate.centroid.y,
                        "candidate rejected"
                    );
                }
                verdict.is_accepted()
            })
            .collect();

        debug!(
            hulls = hull_count,
            degenerate = hull_count - ranked_count,
            accepted = accepted.len(),
            "frame analyzed"
        );
        accepted
    }

    /// Runs the geometric filter. Predicates are checked in order and the first
    /// failure decides the verdict.
    pub fn evaluate(candidate: &Candidate, config: &DetectionConfig) -> Verdict {
        let (distance_x, distance_y) = candidate.offset.magnitude();
        let window = config.target_size as f64;
        if distance_x > window || distance_y > window {
            return Verdict::Rejected(Rejection::OutsideTargetWindow);
        }

        if candidate.area < config.min_area {
            return Verdict::Rejected(Rejection::TooSmall);
        }

        let width = candidate.width();
        let height = candidate.height();
        if width == 0 || height == 0 {
            return Verdict::Rejected(Rejection::Sliver);
        }

        // Only the upper bound is checked: tall, narrow silhouettes are expected.
        if (width as f64 / height as f64).abs() > config.max_aspect_ratio {
            return Verdict::Rejected(Rejection::TooWide);
        }

        Verdict::Accepted
    }
}
