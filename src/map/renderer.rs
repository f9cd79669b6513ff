use crate::braille::BrailleCanvas;
use crate::error::RenderError;
use crate::geo::Extent;
use crate::map::geometry::{draw_line, fill_rings};
use crate::map::index::{CountryEntry, CountryIndex};
use crate::map::pipeline::{Highlight, RenderHandle, RenderPipeline, Role};
use crate::map::projection::PlateCarree;
use glam::DVec2;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// One rendered map image, split into layers the UI colors separately
pub struct Frame {
    pub handle: RenderHandle,
    pub extent: Extent,
    pub highlight: Option<Highlight>,
    pub outlines: BrailleCanvas,
    pub selected: BrailleCanvas,
    pub allies: BrailleCanvas,
    pub enemies: BrailleCanvas,
}

/// Renders country outlines and highlight fills into braille layers.
///
/// The target size follows the terminal pane. Recent frames are kept so the
/// UI can look them up by handle.
pub struct BrailleRenderer {
    index: Arc<CountryIndex>,
    target: Mutex<(usize, usize)>,
    frames: Mutex<VecDeque<Arc<Frame>>>,
    capacity: usize,
    timeout: Duration,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // Frames are replaced wholesale, so a poisoned lock still holds usable data
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl BrailleRenderer {
    pub fn new(index: Arc<CountryIndex>, capacity: usize, timeout: Duration) -> Self {
        Self {
            index,
            target: Mutex::new((0, 0)),
            frames: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            timeout,
        }
    }

    /// Set the target size in terminal characters
    pub fn set_target(&self, cols: usize, rows: usize) {
        *lock(&self.target) = (cols, rows);
    }

    pub fn target(&self) -> (usize, usize) {
        *lock(&self.target)
    }

    pub fn frame(&self, handle: &RenderHandle) -> Option<Arc<Frame>> {
        lock(&self.frames).iter().find(|f| &f.handle == handle).cloned()
    }

    pub fn latest(&self) -> Option<Arc<Frame>> {
        lock(&self.frames).back().cloned()
    }

    /// Redraw the latest frame at the current target size. The handle stays
    /// the same, so references held by callers remain valid.
    pub fn refresh(&self) -> Result<Option<RenderHandle>, RenderError> {
        match self.latest() {
            Some(frame) => self.render(&frame.extent, frame.highlight.as_ref()).map(Some),
            None => Ok(None),
        }
    }

    fn store(&self, frame: Frame) {
        let mut frames = lock(&self.frames);
        frames.retain(|f| f.handle != frame.handle);
        while frames.len() >= self.capacity {
            frames.pop_front();
        }
        frames.push_back(Arc::new(frame));
    }

    fn rasterize(
        &self,
        extent: &Extent,
        highlight: Option<&Highlight>,
        cols: usize,
        rows: usize,
    ) -> Result<Frame, RenderError> {
        let deadline = Instant::now() + self.timeout;
        let raster = PlateCarree::new(*extent, cols * 2, rows * 4);

        let mut outlines = BrailleCanvas::new(cols, rows);
        let mut selected = Vec::new();
        let mut allies = Vec::new();
        let mut enemies = Vec::new();

        for country in self.index.all() {
            if Instant::now() >= deadline {
                return Err(RenderError::Timeout);
            }
            if !extent.intersects(&country.shape.bbox()) {
                continue;
            }
            draw_outline(&mut outlines, country, &raster);
            match highlight.and_then(|h| h.role(&country.code)) {
                Some(Role::Selected) => selected.push(country),
                Some(Role::Ally) => allies.push(country),
                Some(Role::Enemy) => enemies.push(country),
                None => {}
            }
        }

        let fill = |countries: &[&CountryEntry]| {
            let mut canvas = BrailleCanvas::new(cols, rows);
            for country in countries {
                fill_country(&mut canvas, country, &raster);
            }
            canvas
        };
        let (selected, (allies, enemies)) = rayon::join(
            || fill(selected.as_slice()),
            || rayon::join(|| fill(allies.as_slice()), || fill(enemies.as_slice())),
        );

        if Instant::now() >= deadline {
            return Err(RenderError::Timeout);
        }

        Ok(Frame {
            handle: RenderHandle::for_request(extent, highlight),
            extent: *extent,
            highlight: highlight.cloned(),
            outlines,
            selected,
            allies,
            enemies,
        })
    }
}

impl RenderPipeline for BrailleRenderer {
    fn render(
        &self,
        extent: &Extent,
        highlight: Option<&Highlight>,
    ) -> Result<RenderHandle, RenderError> {
        let (cols, rows) = self.target();
        if cols == 0 || rows == 0 {
            return Err(RenderError::EmptyTarget);
        }
        if !(extent.width() > 0.0 && extent.height() > 0.0) {
            return Err(RenderError::Backend(format!("degenerate extent {extent}")));
        }

        let started = Instant::now();
        let frame = self.rasterize(extent, highlight, cols, rows)?;
        let handle = frame.handle.clone();
        tracing::debug!(
            handle = %handle,
            %extent,
            cols,
            rows,
            elapsed_us = started.elapsed().as_micros() as u64,
            "rendered frame"
        );
        self.store(frame);
        Ok(handle)
    }
}

/// Longitude jump between consecutive vertices that marks an antimeridian wrap
const WRAP_DEGREES: f64 = 180.0;

/// Draw every ring of a country, skipping segments that wrap across the
/// antimeridian
fn draw_outline(canvas: &mut BrailleCanvas, country: &CountryEntry, raster: &PlateCarree) {
    for polygon in country.shape.polygons() {
        for ring in polygon.rings() {
            for pair in ring.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if (b.x - a.x).abs() > WRAP_DEGREES {
                    continue;
                }
                let from = raster.project(a.x, a.y);
                let to = raster.project(b.x, b.y);
                if raster.line_might_be_visible(from, to) {
                    draw_line(canvas, from.0, from.1, to.0, to.1);
                }
            }
        }
    }
}

fn fill_country(canvas: &mut BrailleCanvas, country: &CountryEntry, raster: &PlateCarree) {
    for polygon in country.shape.polygons() {
        let rings: Vec<Vec<DVec2>> = polygon
            .rings()
            .map(|ring| ring.iter().map(|p| raster.project_f(p.x, p.y)).collect())
            .collect();
        fill_rings(canvas, &rings);
    }
}
