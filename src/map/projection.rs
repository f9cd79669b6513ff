use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::error::MapError;
use crate::geo::{Extent, GeoPoint};
use glam::DVec2;

/// Size at which the client presents the map image. May differ from the
/// logical canvas when the image is scaled on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Result<Self, MapError> {
        if !width.is_finite() || !height.is_finite() {
            return Err(MapError::InvalidInput(format!(
                "displayed size must be numeric, got {width}x{height}"
            )));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(MapError::InvalidInput(format!(
                "displayed size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

/// Fixed logical pixel size the map is rendered at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const DEFAULT: CanvasSize = CanvasSize {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
    };
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Client pixel to geographic conversion.
///
/// Two steps: the client pixel is first de-scaled into canvas space, then the
/// canvas fraction is mapped linearly onto the extent. Row 0 is the top edge,
/// so latitude decreases as `y` grows. The mapping is exact only for a
/// PlateCarree (equirectangular) render of the extent.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateTransform {
    canvas: CanvasSize,
}

impl CoordinateTransform {
    pub fn new(canvas: CanvasSize) -> Self {
        Self { canvas }
    }

    /// Client pixel -> canvas pixel
    #[inline]
    pub fn descale(&self, pixel: DVec2, display: DisplaySize) -> DVec2 {
        DVec2::new(
            pixel.x / display.width * self.canvas.width,
            pixel.y / display.height * self.canvas.height,
        )
    }

    /// Canvas pixel -> lon/lat under `extent`
    #[inline]
    pub fn canvas_to_geo(&self, canvas_px: DVec2, extent: &Extent) -> GeoPoint {
        let lon = extent.lon_min + (canvas_px.x / self.canvas.width) * extent.width();
        let lat = extent.lat_max - (canvas_px.y / self.canvas.height) * extent.height();
        GeoPoint::new(lon, lat)
    }

    pub fn client_to_geo(
        &self,
        pixel: DVec2,
        display: DisplaySize,
        extent: &Extent,
    ) -> Result<GeoPoint, MapError> {
        if !pixel.is_finite() {
            return Err(MapError::InvalidInput(format!(
                "pixel coordinates must be numeric, got ({}, {})",
                pixel.x, pixel.y
            )));
        }
        let point = self.canvas_to_geo(self.descale(pixel, display), extent);
        // A huge pixel on a tiny display overflows during descaling
        if !point.is_finite() {
            return Err(MapError::InvalidInput(format!(
                "pixel ({}, {}) is out of range for a {}x{} display",
                pixel.x, pixel.y, display.width, display.height
            )));
        }
        Ok(point)
    }

    /// Geographic box spanned by two client corners, before any clamping.
    /// The lower corner on screen gives the smaller latitude.
    pub fn client_rect_to_extent(
        &self,
        corner1: DVec2,
        corner2: DVec2,
        display: DisplaySize,
        extent: &Extent,
    ) -> Result<Extent, MapError> {
        let a = self.client_to_geo(corner1, display, extent)?;
        let b = self.client_to_geo(corner2, display, extent)?;
        Ok(Extent::from_corners(a, b))
    }
}

/// Equirectangular raster of an extent, used to draw the map into a pixel
/// grid of arbitrary size.
#[derive(Debug, Clone, Copy)]
pub struct PlateCarree {
    pub extent: Extent,
    /// Raster pixel width
    pub width: usize,
    /// Raster pixel height
    pub height: usize,
}

impl PlateCarree {
    pub fn new(extent: Extent, width: usize, height: usize) -> Self {
        Self {
            extent,
            width,
            height,
        }
    }

    #[inline]
    fn scale(&self) -> DVec2 {
        DVec2::new(
            self.width as f64 / self.extent.width(),
            self.height as f64 / self.extent.height(),
        )
    }

    /// Project a geographic coordinate to (fractional) raster pixels
    #[inline]
    pub fn project_f(&self, lon: f64, lat: f64) -> DVec2 {
        let s = self.scale();
        DVec2::new(
            (lon - self.extent.lon_min) * s.x,
            (self.extent.lat_max - lat) * s.y,
        )
    }

    /// Project a geographic coordinate to raster pixels
    #[inline]
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let p = self.project_f(lon, lat);
        (p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}
