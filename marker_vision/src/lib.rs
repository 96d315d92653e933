// THEORY:
// This file is the main entry point for the `marker_vision` library crate. It exports
// the `AimPipeline` and its associated data structures (`DetectionConfig`,
// `FrameReport`, `SelectionResult`) as the high-level interface of the detection
// engine, plus the `AimLoop` that runs the engine against capture, activation, input
// and display collaborators.
//
// The stages behind the pipeline (`core_modules`) stay public so each one can be used
// and tested on its own, but callers are expected to go through `pipeline`.

pub mod aim_loop;
pub mod collaborators;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use aim_loop::{AimLoop, CycleOutcome, CycleStats, LoopConfig};
pub use collaborators::{
    ActivationProvider, CaptureRegion, DebugDisplay, DisplayControl, FrameSource, InputSink,
};
pub use core_modules::frame::{Frame, PixelLayout};
pub use core_modules::mask::{AdaptiveThreshold, ColorRange};
pub use core_modules::pixel::pixel::Hsv;
pub use error::{VisionError, VisionResult};
pub use pipeline::{AimPipeline, DetectionConfig, FrameReport};
