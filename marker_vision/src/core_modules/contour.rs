// THEORY:
// The `contour` module turns a binary mask into simplified object outlines.
//
// 1.  **Extraction**: border following over the mask yields the boundary of every
//     connected foreground region, including regions nested inside holes of other
//     regions. Hole borders are the inside edge of a region rather than the boundary of
//     one, so they are skipped. Nesting information is not needed downstream. The mask
//     is framed with one pixel of background first so that regions running into the
//     image edge (the capture square's own outline, most often) still get a border.
// 2.  **Chain Compression**: runs of boundary pixels that continue in the same direction
//     collapse to their end points, leaving only the vertices that carry shape.
// 3.  **Convex Hull**: each outline is replaced by its convex hull. Marker outlines are
//     drawn around irregular silhouettes; the hull smooths over gaps and notches so area
//     and centroid describe the whole marked object.

use image::{GrayImage, imageops};
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::convex_hull;
use imageproc::point::Point;

/// An ordered, closed vertex ring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The convex hull of this contour, without collinear or repeated vertices.
    pub fn convex_hull(&self) -> Contour {
        // Border following revisits pixels of one-pixel-wide runs.
        let mut points = self.points.clone();
        points.sort_by_key(|p| (p.y, p.x));
        points.dedup();
        Contour::new(convex_hull(points))
    }
}

/// Boundaries of every connected foreground region in `binary`, chain-compressed.
pub fn extract_region_boundaries(binary: &GrayImage) -> Vec<Contour> {
    // Border following only starts an outer border from a background pixel, so
    // regions touching the image edge need a background frame around them.
    let (width, height) = binary.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    imageops::replace(&mut padded, binary, 1, 1);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|contour| matches!(contour.border_type, BorderType::Outer))
        .map(|contour| {
            let points = contour
                .points
                .into_iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            Contour::new(compress_chain(points))
        })
        .collect()
}

/// Drops vertices that continue the previous segment's direction.
pub fn compress_chain(points: Vec<Point<i32>>) -> Vec<Point<i32>> {
    let count = points.len();
    if count < 3 {
        return points;
    }
    let mut kept = Vec::with_capacity(count);
    for i in 0..count {
        let previous = points[(i + count - 1) % count];
        let current = points[i];
        let next = points[(i + 1) % count];
        let incoming = (current.x - previous.x, current.y - previous.y);
        let outgoing = (next.x - current.x, next.y - current.y);
        let cross = incoming.0 * outgoing.1 - incoming.1 * outgoing.0;
        let dot = incoming.0 * outgoing.0 + incoming.1 * outgoing.1;
        if cross == 0 && dot > 0 {
            continue;
        }
        kept.push(current);
    }
    if kept.is_empty() {
        // A straight closed run has no corners; its end points still describe it.
        return vec![points[0], points[count / 2]];
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn filled(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> GrayImage {
        let mut image = GrayImage::new(width, height);
        for &(left, top, w, h) in rects {
            for y in top..top + h {
                for x in left..left + w {
                    image.put_pixel(x, y, Luma([255]));
                }
            }
        }
        image
    }

    #[test]
    fn hull_of_a_square_with_interior_points_is_its_corners() {
        let mut points = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
            Point::new(5, 5),
            Point::new(5, 0),
            Point::new(10, 10),
        ];
        points.reverse();
        let hull = Contour::new(points).convex_hull();
        assert_eq!(hull.len(), 4);
        for corner in [(0, 0), (10, 0), (10, 10), (0, 10)] {
            assert!(hull.points.contains(&Point::new(corner.0, corner.1)));
        }
    }

    #[test]
    fn hull_of_collinear_points_collapses_to_end_points() {
        let line = Contour::new(vec![Point::new(2, 2), Point::new(1, 1), Point::new(0, 0), Point::new(1, 1)]);
        let hull = line.convex_hull();
        assert_eq!(hull.len(), 2);
        assert!(hull.points.contains(&Point::new(0, 0)));
        assert!(hull.points.contains(&Point::new(2, 2)));
    }

    #[test]
    fn chain_compression_keeps_only_corners() {
        let mut ring = Vec::new();
        for x in 0..4 {
            ring.push(Point::new(x, 0));
        }
        for y in 0..4 {
            ring.push(Point::new(4, y));
        }
        for x in (1..=4).rev() {
            ring.push(Point::new(x, 4));
        }
        for y in (1..=4).rev() {
            ring.push(Point::new(0, y));
        }
        let compressed = compress_chain(ring);
        assert_eq!(
            compressed,
            vec![Point::new(0, 0), Point::new(4, 0), Point::new(4, 4), Point::new(0, 4)]
        );
    }

    #[test]
    fn separate_blobs_each_get_one_boundary() {
        let binary = filled(60, 30, &[(2, 2, 10, 10), (30, 5, 20, 20)]);
        let mut boundaries = extract_region_boundaries(&binary);
        assert_eq!(boundaries.len(), 2);
        boundaries.sort_by_key(|c| c.points[0].x);
        let hull = boundaries[1].convex_hull();
        assert_eq!(hull.len(), 4);
        assert!(hull.points.contains(&Point::new(30, 5)));
        assert!(hull.points.contains(&Point::new(49, 24)));
    }

    #[test]
    fn ring_yields_outer_boundary_and_nested_island() {
        let mut binary = filled(40, 40, &[(0, 0, 40, 40)]);
        for y in 4..36 {
            for x in 4..36 {
                binary.put_pixel(x, y, Luma([0]));
            }
        }
        for y in 15..25 {
            for x in 15..25 {
                binary.put_pixel(x, y, Luma([255]));
            }
        }
        assert_eq!(extract_region_boundaries(&binary).len(), 2);
    }

    #[test]
    fn regions_touching_the_image_edge_keep_their_outline() {
        let mut binary = filled(30, 30, &[(0, 0, 30, 30)]);
        for y in 3..27 {
            for x in 3..27 {
                binary.put_pixel(x, y, Luma([0]));
            }
        }
        let boundaries = extract_region_boundaries(&binary);
        assert_eq!(boundaries.len(), 1);
        let hull = boundaries[0].convex_hull();
        assert_eq!(hull.len(), 4);
        for corner in [(0, 0), (29, 0), (29, 29), (0, 29)] {
            assert!(hull.points.contains(&Point::new(corner.0, corner.1)));
        }
    }

    #[test]
    fn single_pixels_keep_one_point() {
        let mut binary = GrayImage::new(5, 5);
        binary.put_pixel(2, 2, Luma([255]));
        let boundaries = extract_region_boundaries(&binary);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].convex_hull().points, vec![Point::new(2, 2)]);
    }

    #[test]
    fn empty_mask_has_no_boundaries() {
        assert!(extract_region_boundaries(&GrayImage::new(10, 10)).is_empty());
    }
}
