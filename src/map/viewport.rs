use crate::config::{MIN_ZOOM_HEIGHT, MIN_ZOOM_WIDTH};
use crate::geo::Extent;

/// Which kind of extent the viewport currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    DefaultView,
    Zoomed,
}

/// Per-session view: the current extent plus whether it is the default one.
/// Replaced wholesale on zoom or reset, never edited in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    extent: Extent,
    mode: ViewMode,
}

impl ViewportState {
    pub fn new() -> Self {
        Self {
            extent: Extent::WORLD,
            mode: ViewMode::DefaultView,
        }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn reset(&mut self) {
        self.extent = Extent::WORLD;
        self.mode = ViewMode::DefaultView;
    }

    pub fn commit_zoom(&mut self, extent: Extent) {
        self.extent = extent;
        self.mode = ViewMode::Zoomed;
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new()
    }
}

/// Smallest extent a zoom may produce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_width: MIN_ZOOM_WIDTH,
            min_height: MIN_ZOOM_HEIGHT,
        }
    }
}

/// Result of fitting a selection to the world and the zoom limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomFit {
    pub extent: Extent,
    /// Selection was too small and got replaced by a minimum-size box
    pub resized: bool,
}

/// Turn a raw selection box into a committable extent.
///
/// The box is clipped to the world first. If it ends up narrower or shorter
/// than the limits, a box of exactly the minimum size is centered on the
/// clipped box's midpoint and slid back inside the world.
pub fn fit_zoom(selection: Extent, limits: ZoomLimits) -> ZoomFit {
    let clipped = selection.clamp_to_world();
    // `!(a >= b)` also catches inverted boxes from selections off the map
    let too_small =
        !(clipped.width() >= limits.min_width) || !(clipped.height() >= limits.min_height);
    if !too_small {
        return ZoomFit {
            extent: clipped,
            resized: false,
        };
    }

    let extent = Extent::centered(clipped.center(), limits.min_width, limits.min_height)
        .shift_into_world();
    ZoomFit {
        extent,
        resized: true,
    }
}
