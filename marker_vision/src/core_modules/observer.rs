// THEORY:
// Debug visualization is an observer, not a branch. The analyzer and the resolver call
// the same hooks whether anyone is listening or not; `NoObserver` ignores them and
// `OverlayRenderer` draws them. Observers only receive shared references, so attaching
// one can never change what is detected or selected.
//
// Overlay colors:
// - every hull before filtering: yellow, 1px
// - accepted candidates: green, 1px
// - selected target: green outline plus a filled white dot at its centroid
// - the square target window around the capture center: blue

use crate::core_modules::candidate::Candidate;
use crate::core_modules::contour::Contour;
use crate::core_modules::frame::Frame;
use crate::core_modules::frame_analyzer::Verdict;
use crate::core_modules::target_resolver::SelectionResult;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

const HULL_COLOR: Rgba<u8> = Rgba([255, 255, 0, 255]);
const ACCEPTED_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const CENTROID_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const WINDOW_COLOR: Rgba<u8> = Rgba([0, 128, 255, 255]);
const CENTROID_RADIUS: i32 = 7;

/// Receives detection and selection events for one frame.
pub trait DetectionObserver {
    /// All convex hulls extracted from the frame, before any filtering.
    fn on_hulls(&mut self, _hulls: &[Contour]) {}

    /// The geometric filter's decision for one ranked candidate.
    fn on_verdict(&mut self, _candidate: &Candidate, _verdict: &Verdict) {}

    /// The target picked for this frame, if any.
    fn on_selection(&mut self, _selection: &SelectionResult) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoObserver;

impl DetectionObserver for NoObserver {}

/// Draws detection events onto a copy of the frame.
pub struct OverlayRenderer {
    canvas: RgbaImage,
}

impl OverlayRenderer {
    pub fn new(frame: &Frame, square_size: u32, target_size: u32) -> Self {
        let mut canvas = frame.to_rgba_image();
        let mid = (square_size / 2) as i32;
        let side = target_size * 2;
        if side > 0 {
            let window = Rect::at(mid - target_size as i32, mid - target_size as i32)
                .of_size(side, side);
            draw_hollow_rect_mut(&mut canvas, window, WINDOW_COLOR);
        }
        Self { canvas }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    fn outline(&mut self, points: &[Point<i32>], color: Rgba<u8>) {
        if points.len() < 2 {
            return;
        }
        let mut previous = points[points.len() - 1];
        for &current in points {
            draw_line_segment_mut(
                &mut self.canvas,
                (previous.x as f32, previous.y as f32),
                (current.x as f32, current.y as f32),
                color,
            );
            previous = current;
        }
    }
}

impl DetectionObserver for OverlayRenderer {
    fn on_hulls(&mut self, hulls: &[Contour]) {
        for hull in hulls {
            self.outline(&hull.points, HULL_COLOR);
        }
    }

    fn on_verdict(&mut self, candidate: &Candidate, verdict: &Verdict) {
        if verdict.is_accepted() {
            self.outline(&candidate.contour.points, ACCEPTED_COLOR);
        }
    }

    fn on_selection(&mut self, selection: &SelectionResult) {
        let candidate = &selection.candidate;
        self.outline(&candidate.contour.points, ACCEPTED_COLOR);
        draw_filled_circle_mut(
            &mut self.canvas,
            (candidate.centroid.x, candidate.centroid.y),
            CENTROID_RADIUS,
            CENTROID_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Frame {
        Frame::from_rgba_image(RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255])))
    }

    #[test]
    fn hulls_are_outlined_in_yellow() {
        let mut renderer = OverlayRenderer::new(&blank(), 100, 0);
        let hull = Contour::new(vec![Point::new(10, 10), Point::new(30, 10), Point::new(30, 30)]);
        renderer.on_hulls(&[hull]);
        let image = renderer.into_image();
        assert_eq!(*image.get_pixel(20, 10), HULL_COLOR);
        assert_eq!(*image.get_pixel(50, 50), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn target_window_is_drawn_around_center() {
        let renderer = OverlayRenderer::new(&blank(), 100, 20);
        assert_eq!(*renderer.image().get_pixel(30, 50), WINDOW_COLOR);
        assert_eq!(*renderer.image().get_pixel(50, 50), Rgba([0, 0, 0, 255]));
    }
}
