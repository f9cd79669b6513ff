use std::fmt;

/// Failure reported by a render pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Rasterization ran past its time budget
    Timeout,
    /// Render target has no pixels (terminal pane collapsed to zero)
    EmptyTarget,
    Backend(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Timeout => write!(f, "render timed out"),
            RenderError::EmptyTarget => write!(f, "render target has zero size"),
            RenderError::Backend(msg) => write!(f, "render backend failed: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Errors surfaced by the selection/zoom operations.
///
/// `InvalidInput` is always raised before any viewport mutation. A
/// `RenderFailure` after a zoom or reset leaves the committed extent in place.
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    InvalidInput(String),
    GeometryLoadFailure(String),
    RenderFailure(RenderError),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            MapError::GeometryLoadFailure(msg) => write!(f, "country geometry unavailable: {msg}"),
            MapError::RenderFailure(err) => write!(f, "render failure: {err}"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::RenderFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RenderError> for MapError {
    fn from(err: RenderError) -> Self {
        MapError::RenderFailure(err)
    }
}

impl MapError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, MapError::InvalidInput(_))
    }
}
