//! Movement and display sinks for replay runs.

use marker_vision::{DebugDisplay, DisplayControl, InputSink, VisionResult};
use image::RgbaImage;
use std::path::PathBuf;
use tracing::{debug, info};

/// Records movements instead of injecting them.
#[derive(Debug, Default)]
pub struct RecordingInputSink {
    moves: Vec<(i32, i32)>,
}

impl RecordingInputSink {
    pub fn moves(&self) -> &[(i32, i32)] {
        &self.moves
    }

    /// Sum of all recorded movements.
    pub fn total(&self) -> (i64, i64) {
        self.moves
            .iter()
            .fold((0, 0), |(x, y), &(dx, dy)| (x + dx as i64, y + dy as i64))
    }
}

impl InputSink for RecordingInputSink {
    fn move_relative(&mut self, dx: i32, dy: i32) -> VisionResult<()> {
        info!(dx, dy, "pointer move");
        self.moves.push((dx, dy));
        Ok(())
    }
}

/// Writes every overlay as a numbered PNG.
pub struct PngOverlayDisplay {
    dir: PathBuf,
    index: u64,
}

impl PngOverlayDisplay {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, index: 0 }
    }
}

impl DebugDisplay for PngOverlayDisplay {
    fn show(&mut self, overlay: &RgbaImage) -> VisionResult<DisplayControl> {
        let path = self.dir.join(format!("overlay_{:06}.png", self.index));
        overlay.save(&path)?;
        debug!(path = %path.display(), "overlay written");
        self.index += 1;
        Ok(DisplayControl::Continue)
    }
}
