// THEORY:
// The `moments` module is the single place where contour geometry is derived. Every
// downstream consumer (the geometric filter, the target resolver, the debug overlay)
// reads these values instead of recomputing them, so the filter's notion of "distance
// from center" and the resolver's aim vector can never drift apart.
//
// - `Moments` are the polygon area moments (Green's theorem over the closed vertex
//   ring). M00 is the enclosed area; M10/M00 and M01/M00 give the centroid. Orientation
//   is normalized so M00 is never negative.
// - `Extrema` are the axis-aligned extreme coordinates of the vertex set.
// - `CenterOffset` is the centroid relative to the middle of the capture square. It is
//   signed (the aim vector); `magnitude` folds both directions into a per-axis distance.

use imageproc::point::Point;

/// Zeroth and first order area moments of a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    pub fn of_polygon(points: &[Point<i32>]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }

        let mut a00 = 0f64;
        let mut a10 = 0f64;
        let mut a01 = 0f64;
        let mut previous = points[points.len() - 1];
        for &current in points {
            let (xp, yp) = (previous.x as f64, previous.y as f64);
            let (xc, yc) = (current.x as f64, current.y as f64);
            let cross = xp * yc - xc * yp;
            a00 += cross;
            a10 += cross * (xp + xc);
            a01 += cross * (yp + yc);
            previous = current;
        }

        if a00 == 0.0 {
            return Self::default();
        }
        let sign = a00.signum();
        Self {
            m00: sign * a00 / 2.0,
            m10: sign * a10 / 6.0,
            m01: sign * a01 / 6.0,
        }
    }

    /// Enclosed area; zero for moment-degenerate polygons.
    pub fn area(&self) -> f64 {
        self.m00
    }

    pub fn is_degenerate(&self) -> bool {
        self.m00 == 0.0
    }

    /// Centroid truncated to whole pixels, or `None` when degenerate.
    pub fn centroid(&self) -> Option<Point<i32>> {
        if self.is_degenerate() {
            return None;
        }
        Some(Point::new(
            (self.m10 / self.m00) as i32,
            (self.m01 / self.m00) as i32,
        ))
    }
}

/// Axis-aligned extreme coordinates of a vertex set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extrema {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Extrema {
    pub fn of(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let mut extrema = Self {
            left: first.x,
            right: first.x,
            top: first.y,
            bottom: first.y,
        };
        for point in &points[1..] {
            extrema.left = extrema.left.min(point.x);
            extrema.right = extrema.right.max(point.x);
            extrema.top = extrema.top.min(point.y);
            extrema.bottom = extrema.bottom.max(point.y);
        }
        Some(extrema)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// A centroid's offset from the middle of the capture square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterOffset {
    /// Positive to the right of center.
    pub dx: f64,
    /// Positive below center.
    pub dy: f64,
}

impl CenterOffset {
    pub fn from_centroid(centroid: Point<i32>, square_size: u32) -> Self {
        let mid = square_size as f64 / 2.0;
        Self {
            dx: centroid.x as f64 - mid,
            dy: centroid.y as f64 - mid,
        }
    }

    /// Per-axis distance from center, direction discarded.
    pub fn magnitude(&self) -> (f64, f64) {
        (self.dx.abs(), self.dy.abs())
    }

    /// Euclidean distance from center.
    pub fn distance(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2)).sqrt()
    }
}
