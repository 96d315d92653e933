//! Frame source that replays screenshots from a directory.
//!
//! Each image stands in for one full-screen grab; the capture region is cropped out
//! of it exactly as a live grabber would return it.

use image::imageops;
use marker_vision::{CaptureRegion, Frame, FrameSource, VisionError, VisionResult};
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

pub struct DirectoryFrameSource {
    paths: Vec<PathBuf>,
    next: usize,
    served: u64,
    repeat: bool,
}

impl DirectoryFrameSource {
    /// Lists the images in `dir`, ordered by file name.
    pub fn open(dir: &Path, repeat: bool) -> VisionResult<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            })
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(VisionError::capture(format!("no images found in {}", dir.display())));
        }
        Ok(Self {
            paths,
            next: 0,
            served: 0,
            repeat,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Dimensions of the first screenshot, used as the monitor size.
    pub fn screen_dimensions(&self) -> VisionResult<(u32, u32)> {
        Ok(image::image_dimensions(&self.paths[0])?)
    }
}

impl FrameSource for DirectoryFrameSource {
    fn capture(&mut self, region: &CaptureRegion) -> VisionResult<Frame> {
        if self.next >= self.paths.len() {
            if !self.repeat {
                return Err(VisionError::SourceExhausted {
                    frames: self.served,
                });
            }
            self.next = 0;
        }
        let path = &self.paths[self.next];
        self.next += 1;

        let screen = image::open(path)?.to_rgba8();
        let (width, height) = screen.dimensions();
        if region.left + region.size > width || region.top + region.size > height {
            return Err(VisionError::capture(format!(
                "{} is {}x{}, too small for a {} px region at ({}, {})",
                path.display(),
                width,
                height,
                region.size,
                region.left,
                region.top
            )));
        }

        let square = imageops::crop_imm(&screen, region.left, region.top, region.size, region.size)
            .to_image();
        self.served += 1;
        debug!(frame = self.served, path = %path.display(), "frame captured");
        Ok(Frame::from_rgba_image(square))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("marker_runner_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_screen(dir: &Path, name: &str, width: u32, height: u32) {
        let mut screen = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        screen.put_pixel(width / 2, height / 2, Rgba([255, 0, 0, 255]));
        screen.save(dir.join(name)).unwrap();
    }

    #[test]
    fn crops_the_region_and_stops_when_exhausted() {
        let dir = scratch_dir("crop");
        write_screen(&dir, "b.png", 80, 60);
        write_screen(&dir, "a.png", 80, 60);
        std::fs::write(dir.join("notes.txt"), "not a frame").unwrap();

        let mut source = DirectoryFrameSource::open(&dir, false).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.screen_dimensions().unwrap(), (80, 60));

        let region = CaptureRegion::centered(80, 60, 20);
        let frame = source.capture(&region).unwrap();
        assert_eq!((frame.width(), frame.height()), (20, 20));
        let center = frame.to_rgba_image();
        assert_eq!(*center.get_pixel(10, 10), Rgba([255, 0, 0, 255]));

        source.capture(&region).unwrap();
        assert!(matches!(
            source.capture(&region),
            Err(VisionError::SourceExhausted { frames: 2 })
        ));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn repeat_wraps_around() {
        let dir = scratch_dir("repeat");
        write_screen(&dir, "only.png", 40, 40);
        let mut source = DirectoryFrameSource::open(&dir, true).unwrap();
        let region = CaptureRegion::centered(40, 40, 10);
        for _ in 0..3 {
            assert!(source.capture(&region).is_ok());
        }
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn oversized_regions_are_capture_errors() {
        let dir = scratch_dir("oversized");
        write_screen(&dir, "small.png", 30, 30);
        let mut source = DirectoryFrameSource::open(&dir, false).unwrap();
        let result = source.capture(&CaptureRegion::new(0, 0, 600));
        assert!(matches!(result, Err(VisionError::Capture { .. })));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn empty_directories_are_refused() {
        let dir = scratch_dir("empty");
        assert!(DirectoryFrameSource::open(&dir, false).is_err());
        std::fs::remove_dir_all(dir).ok();
    }
}
