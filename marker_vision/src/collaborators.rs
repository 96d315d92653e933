//! Seams between the detection engine and the outside world.
//!
//! Screen capture, pointer injection, the activation key and the debug window are
//! platform concerns. The aim loop only talks to them through these traits.

use crate::core_modules::frame::Frame;
use crate::error::VisionResult;
use image::RgbaImage;

/// The square of the screen sampled each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub left: u32,
    pub top: u32,
    pub size: u32,
}

impl CaptureRegion {
    pub fn new(left: u32, top: u32, size: u32) -> Self {
        Self { left, top, size }
    }

    /// A `size` square centered on a `width`×`height` monitor. Clamps to the
    /// monitor's origin when the square is larger than the monitor.
    pub fn centered(width: u32, height: u32, size: u32) -> Self {
        Self {
            left: (width / 2).saturating_sub(size / 2),
            top: (height / 2).saturating_sub(size / 2),
            size,
        }
    }
}

/// Produces one frame per call. Blocks until a frame is available.
pub trait FrameSource {
    fn capture(&mut self, region: &CaptureRegion) -> VisionResult<Frame>;
}

/// Reports whether aiming is currently engaged (e.g. a held or toggled key).
pub trait ActivationProvider {
    fn is_engaged(&mut self) -> bool;
}

impl<F: FnMut() -> bool> ActivationProvider for F {
    fn is_engaged(&mut self) -> bool {
        self()
    }
}

/// Accepts relative pointer movements.
pub trait InputSink {
    fn move_relative(&mut self, dx: i32, dy: i32) -> VisionResult<()>;
}

/// What the display wants the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayControl {
    Continue,
    /// The termination key was pressed.
    Stop,
}

/// Shows annotated frames.
pub trait DebugDisplay {
    fn show(&mut self, overlay: &RgbaImage) -> VisionResult<DisplayControl>;
}
