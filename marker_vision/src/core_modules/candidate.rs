// THEORY:
// A `Candidate` is a hull contour together with everything the filter and the resolver
// need to know about it. It is a "dumb" data container: built once per contour per
// frame, never updated, and with no identity across frames.
//
// Construction is the only place the degeneracy check happens. A contour whose area
// moment is zero has no centroid and never becomes a `Candidate`, so every candidate
// in existence has `area > 0`.

use crate::core_modules::contour::Contour;
use crate::core_modules::moments::{CenterOffset, Extrema, Moments};
use imageproc::point::Point;

/// A hull contour with its derived geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The convex hull outline.
    pub contour: Contour,
    /// Enclosed area in square pixels. Always positive.
    pub area: f64,
    /// Center of mass, truncated to whole pixels.
    pub centroid: Point<i32>,
    /// Extreme coordinates of the hull vertices.
    pub extrema: Extrema,
    /// Centroid relative to the middle of the capture square.
    pub offset: CenterOffset,
}

impl Candidate {
    /// Derives the geometry of `contour`, or `None` if it is moment-degenerate.
    pub fn from_contour(contour: Contour, square_size: u32) -> Option<Self> {
        let moments = Moments::of_polygon(&contour.points);
        let centroid = moments.centroid()?;
        let extrema = Extrema::of(&contour.points)?;
        Some(Self {
            area: moments.area(),
            offset: CenterOffset::from_centroid(centroid, square_size),
            centroid,
            extrema,
            contour,
        })
    }

    pub fn width(&self) -> i32 {
        self.extrema.width()
    }

    pub fn height(&self) -> i32 {
        self.extrema.height()
    }

    /// True when the bounding extrema lie within `tolerance` pixels of every edge
    /// of a `square_size` capture region.
    pub fn spans_region(&self, square_size: u32, tolerance: u32) -> bool {
        let far_edge = square_size as i32 - 1 - tolerance as i32;
        let tolerance = tolerance as i32;
        self.extrema.left <= tolerance
            && self.extrema.top <= tolerance
            && self.extrema.right >= far_edge
            && self.extrema.bottom >= far_edge
    }
}
