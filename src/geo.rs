use glam::DVec2;
use std::fmt;

/// Geographic point, `x` = longitude and `y` = latitude in degrees
pub type GeoPoint = DVec2;

pub const LON_LIMIT: f64 = 180.0;
pub const LAT_LIMIT: f64 = 90.0;

/// Shift longitude from [-180, 180] to [0, 360) for grid indexing.
/// Clamped rather than wrapped so +180 stays on the east edge.
#[inline(always)]
pub fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).clamp(0.0, 359.999)
}

/// Normalize latitude from [-90, 90] to [0, 180) for grid indexing
#[inline(always)]
pub fn normalize_lat(lat: f64) -> f64 {
    (lat + 90.0).clamp(0.0, 179.999)
}

/// Geographic bounding box currently displayed: (lon_min, lon_max, lat_min, lat_max)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Extent {
    /// The whole globe, used as the default view
    pub const WORLD: Extent = Extent {
        lon_min: -LON_LIMIT,
        lon_max: LON_LIMIT,
        lat_min: -LAT_LIMIT,
        lat_max: LAT_LIMIT,
    };

    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    /// Box spanned by two arbitrary corners
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        Self::new(a.x.min(b.x), a.x.max(b.x), a.y.min(b.y), a.y.max(b.y))
    }

    /// Box of the given size around `center`
    pub fn centered(center: GeoPoint, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.x + width / 2.0,
            center.y - height / 2.0,
            center.y + height / 2.0,
        )
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.lon_min + self.lon_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }

    /// Clip each bound independently to the global limits
    pub fn clamp_to_world(self) -> Self {
        Self::new(
            self.lon_min.max(-LON_LIMIT),
            self.lon_max.min(LON_LIMIT),
            self.lat_min.max(-LAT_LIMIT),
            self.lat_max.min(LAT_LIMIT),
        )
    }

    /// Slide the box back inside the global limits, keeping its size.
    /// A box larger than the world on an axis is cut to the full range.
    pub fn shift_into_world(self) -> Self {
        let (lon_min, lon_max) = shift_axis(self.lon_min, self.lon_max, LON_LIMIT);
        let (lat_min, lat_max) = shift_axis(self.lat_min, self.lat_max, LAT_LIMIT);
        Self::new(lon_min, lon_max, lat_min, lat_max)
    }

    pub fn is_within_world(&self) -> bool {
        self.lon_min >= -LON_LIMIT
            && self.lon_max <= LON_LIMIT
            && self.lat_min >= -LAT_LIMIT
            && self.lat_max <= LAT_LIMIT
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    pub fn contains_extent(&self, other: &Extent) -> bool {
        other.lon_min >= self.lon_min
            && other.lon_max <= self.lon_max
            && other.lat_min >= self.lat_min
            && other.lat_max <= self.lat_max
    }

    pub fn intersects(&self, bbox: &BBox) -> bool {
        bbox.max.x >= self.lon_min
            && bbox.min.x <= self.lon_max
            && bbox.max.y >= self.lat_min
            && bbox.min.y <= self.lat_max
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.lon_min, self.lon_max, self.lat_min, self.lat_max]
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::WORLD
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}, {:.2}, {:.2}]",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

fn shift_axis(min: f64, max: f64, limit: f64) -> (f64, f64) {
    let span = max - min;
    if span >= 2.0 * limit {
        (-limit, limit)
    } else if min < -limit {
        (-limit, -limit + span)
    } else if max > limit {
        (limit - span, limit)
    } else {
        (min, max)
    }
}

/// Axis-aligned bounding box of a shape in lon/lat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl BBox {
    pub fn empty() -> Self {
        Self {
            min: GeoPoint::splat(f64::INFINITY),
            max: GeoPoint::splat(f64::NEG_INFINITY),
        }
    }

    pub fn include(&mut self, p: GeoPoint) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn merge(&mut self, other: &BBox) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}
