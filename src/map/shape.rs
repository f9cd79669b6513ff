use crate::geo::{BBox, GeoPoint};

/// Closed ring of lon/lat vertices. The closing vertex may or may not repeat
/// the first one; containment treats both forms the same.
pub type Ring = Vec<GeoPoint>;

/// Polygon with an exterior ring and zero or more holes
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    pub fn bbox(&self) -> BBox {
        let mut bbox = BBox::empty();
        for &p in &self.exterior {
            bbox.include(p);
        }
        bbox
    }

    /// Inside the exterior ring and outside every hole
    pub fn contains(&self, p: GeoPoint) -> bool {
        ring_contains(&self.exterior, p) && !self.holes.iter().any(|hole| ring_contains(hole, p))
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }
}

/// Country outline: one or more polygons with a cached bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    polygons: Vec<Polygon>,
    bbox: BBox,
}

impl Shape {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut bbox = BBox::empty();
        for polygon in &polygons {
            bbox.merge(&polygon.bbox());
        }
        Self { polygons, bbox }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        self.bbox.contains(p) && self.polygons.iter().any(|poly| poly.contains(p))
    }
}

/// Ray-casting point-in-ring test.
///
/// A horizontal ray is cast toward +lon and edge crossings are counted with
/// the half-open rule `(yi > y) != (yj > y)`, so a point is tested the same
/// way on every call. Points exactly on a bottom or left edge count as inside,
/// points on a top or right edge as outside.
pub fn ring_contains(ring: &[GeoPoint], p: GeoPoint) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);
        if (yi > p.y) != (yj > p.y) {
            let intersect_x = (xj - xi) * (p.y - yi) / (yj - yi) + xi;
            if p.x < intersect_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
