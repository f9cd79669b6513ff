use crate::geo::{normalize_lat, normalize_lon, BBox, GeoPoint};

/// Uniform grid over the globe mapping each cell to the features whose
/// bounding box overlaps it.
///
/// Conservative approximation: a feature is listed in every cell its bbox
/// touches, so a query never misses a feature but may return ones that do not
/// contain the point. Indices in each cell are ascending (insertion order).
pub struct FeatureGrid {
    cells: Vec<Vec<usize>>,
    cols: usize,
    rows: usize,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        let cols = (360.0 / cell_size).ceil() as usize;
        let rows = (180.0 / cell_size).ceil() as usize;
        Self {
            cells: vec![Vec::new(); cols * rows],
            cols,
            rows,
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (usize, usize) {
        let x = (normalize_lon(lon) / self.cell_size) as usize;
        let y = (normalize_lat(lat) / self.cell_size) as usize;
        (x.min(self.cols - 1), y.min(self.rows - 1))
    }

    /// Build from feature bounding boxes. Empty boxes are not indexed.
    pub fn build(bboxes: impl IntoIterator<Item = BBox>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.into_iter().enumerate() {
            if bbox.is_empty() {
                continue;
            }
            let (min_x, min_y) = grid.to_cell(bbox.min.x, bbox.min.y);
            let (max_x, max_y) = grid.to_cell(bbox.max.x, bbox.max.y);
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    grid.cells[y * grid.cols + x].push(idx);
                }
            }
        }
        grid
    }

    /// Candidate feature indices for a point, ascending
    pub fn query_point(&self, p: GeoPoint) -> &[usize] {
        let (x, y) = self.to_cell(p.x, p.y);
        &self.cells[y * self.cols + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(min: (f64, f64), max: (f64, f64)) -> BBox {
        BBox {
            min: GeoPoint::new(min.0, min.1),
            max: GeoPoint::new(max.0, max.1),
        }
    }

    #[test]
    fn point_query_returns_overlapping_features_in_order() {
        let boxes = [
            bbox((-10.0, -10.0), (10.0, 10.0)),
            bbox((100.0, 40.0), (120.0, 50.0)),
            bbox((0.0, 0.0), (5.0, 5.0)),
        ];
        let grid = FeatureGrid::build(boxes, 10.0);
        assert_eq!(grid.query_point(GeoPoint::new(2.0, 2.0)), &[0, 2]);
        assert_eq!(grid.query_point(GeoPoint::new(110.0, 45.0)), &[1]);
        assert!(grid.query_point(GeoPoint::new(-100.0, -60.0)).is_empty());
    }

    #[test]
    fn world_edges_map_to_valid_cells() {
        let boxes = [bbox((170.0, 80.0), (180.0, 90.0))];
        let grid = FeatureGrid::build(boxes, 10.0);
        assert_eq!(grid.query_point(GeoPoint::new(180.0, 90.0)), &[0]);
        assert!(grid.query_point(GeoPoint::new(-180.0, -90.0)).is_empty());
    }

    #[test]
    fn empty_boxes_are_skipped() {
        let boxes = [BBox::empty()];
        let grid = FeatureGrid::build(boxes, 10.0);
        assert!(grid.query_point(GeoPoint::new(0.0, 0.0)).is_empty());
    }
}
