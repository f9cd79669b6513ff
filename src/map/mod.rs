mod geometry;
mod hit;
mod index;
mod pipeline;
mod projection;
mod renderer;
mod shape;
mod spatial;
mod viewport;

pub use hit::{hit_test, hit_test_linear};
pub use index::{CountryEntry, CountryIndex};
pub use pipeline::{Highlight, RenderHandle, RenderPipeline, Role};
pub use projection::{CanvasSize, CoordinateTransform, DisplaySize, PlateCarree};
pub use renderer::{BrailleRenderer, Frame};
pub use shape::{ring_contains, Polygon, Ring, Shape};
pub use viewport::{fit_zoom, ViewMode, ViewportState, ZoomFit, ZoomLimits};
