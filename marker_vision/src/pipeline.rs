// THEORY:
// The `pipeline` module is the top-level API of the detection engine. It bundles the
// `FrameAnalyzer` and the `TargetResolver` behind one call that takes a frame and
// returns everything known about it: the ranked candidates and, at most, one selected
// target with its movement vector.
//
// All tuning lives in `DetectionConfig`, an explicit value handed to every call. Nothing
// in the engine reads process-wide state, so any number of differently configured
// pipelines can run side by side and each stage can be tested in isolation.

use crate::core_modules::candidate::Candidate;
use crate::core_modules::frame::Frame;
use crate::core_modules::frame_analyzer::frame_analyzer;
use crate::core_modules::mask::{AdaptiveThreshold, ColorRange};
use crate::core_modules::observer::{DetectionObserver, NoObserver};
use crate::core_modules::target_resolver::target_resolver;
use crate::error::{VisionError, VisionResult};
use serde::{Deserialize, Serialize};

pub use crate::core_modules::frame_analyzer::{Rejection, Verdict};
pub use crate::core_modules::target_resolver::{Movement, SelectionPolicy, SelectionResult};

/// Configuration for detection and target resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Side of the square capture region, in pixels.
    pub square_size: u32,
    /// Half-width of the square target window around the capture center. A candidate's
    /// centroid must lie within it on both axes.
    pub target_size: u32,
    /// The marker color.
    pub color_range: ColorRange,
    pub threshold: AdaptiveThreshold,
    /// Smallest hull area, in square pixels, that can be a target.
    pub min_area: f64,
    /// Largest accepted bounding width/height ratio.
    pub max_aspect_ratio: f64,
    /// Candidates required before `SelectionPolicy::SkipLeading` picks one.
    pub min_candidates: usize,
    pub selection: SelectionPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            square_size: 600,
            target_size: 100,
            color_range: ColorRange::default(),
            threshold: AdaptiveThreshold::default(),
            min_area: 1000.0,
            max_aspect_ratio: 2.5,
            min_candidates: 2,
            selection: SelectionPolicy::default(),
        }
    }
}

impl DetectionConfig {
    /// Distance from center to a corner of the target window.
    pub fn max_target_distance(&self) -> f64 {
        (2.0 * (self.target_size as f64).powi(2)).sqrt()
    }

    pub fn validate(&self) -> VisionResult<()> {
        if self.square_size == 0 {
            return Err(VisionError::config("square_size must be positive"));
        }
        if self.target_size == 0 {
            return Err(VisionError::config("target_size must be positive"));
        }
        if !(self.min_area > 0.0) {
            return Err(VisionError::config("min_area must be positive"));
        }
        if !(self.max_aspect_ratio > 0.0) {
            return Err(VisionError::config("max_aspect_ratio must be positive"));
        }
        if self.min_candidates == 0 {
            return Err(VisionError::config("min_candidates must be at least 1"));
        }
        self.color_range.validate()?;
        self.threshold.validate()
    }
}

/// Everything the pipeline learned about one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameReport {
    /// Filtered candidates, largest first.
    pub candidates: Vec<Candidate>,
    /// The chosen target, if any.
    pub selection: Option<SelectionResult>,
}

/// The main, top-level struct for the detection engine.
#[derive(Debug, Clone)]
pub struct AimPipeline {
    config: DetectionConfig,
}

impl AimPipeline {
    pub fn new(config: DetectionConfig) -> VisionResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn analyze(&self, frame: &Frame) -> VisionResult<FrameReport> {
        self.analyze_observed(frame, &mut NoObserver)
    }

    /// Runs detection and target resolution on one frame.
    ///
    /// Offsets are measured from the middle of the configured capture square, so a
    /// non-empty frame of any other size is refused as `InvalidFrame`.
    pub fn analyze_observed(
        &self,
        frame: &Frame,
        observer: &mut dyn DetectionObserver,
    ) -> VisionResult<FrameReport> {
        let size = self.config.square_size;
        if !frame.is_empty() && (frame.width() != size || frame.height() != size) {
            return Err(VisionError::invalid_frame(format!(
                "expected a {}x{} capture square, got {}x{}",
                size,
                size,
                frame.width(),
                frame.height()
            )));
        }

        // Stage 1: Detection
        let candidates = frame_analyzer::detect_observed(frame, &self.config, observer);

        // Stage 2: Target Resolution
        let selection = target_resolver::resolve(&candidates, &self.config);
        if let Some(selection) = &selection {
            observer.on_selection(selection);
        }

        Ok(FrameReport {
            candidates,
            selection,
        })
    }
}
