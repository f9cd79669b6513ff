use std::path::PathBuf;
use std::time::Duration;

/// Logical size of the rendered map image. Client pixels are scaled into this
/// space before they are mapped to geographic coordinates.
pub const CANVAS_WIDTH: f64 = 1000.0;
pub const CANVAS_HEIGHT: f64 = 700.0;

// Smallest extent a zoom may produce, in degrees
pub const MIN_ZOOM_WIDTH: f64 = 10.0;
pub const MIN_ZOOM_HEIGHT: f64 = 10.0;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_COUNTRIES_FILE: &str = "ne_110m_admin_0_countries.json";
pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 250;
pub const DEFAULT_FRAME_CACHE: usize = 8;
pub const DEFAULT_LOG_FILE: &str = "world-map.log";

/// Spatial prefilter cell size in degrees
pub const HIT_GRID_CELL_DEGREES: f64 = 10.0;

/// Mouse travel (braille pixels) below which a press/release pair is a click
pub const DRAG_THRESHOLD_PX: i32 = 3;

pub fn data_dir() -> PathBuf {
    std::env::var("WORLD_MAP_DATA_DIR")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn countries_path() -> PathBuf {
    let file = std::env::var("WORLD_MAP_COUNTRIES")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_COUNTRIES_FILE.to_string());
    data_dir().join(file)
}

/// Optional replacement for the embedded relation table
pub fn relations_override() -> Option<PathBuf> {
    std::env::var("WORLD_MAP_RELATIONS")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn render_timeout() -> Duration {
    std::env::var("WORLD_MAP_RENDER_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(DEFAULT_RENDER_TIMEOUT_MS))
}

pub fn frame_cache_size() -> usize {
    std::env::var("WORLD_MAP_FRAME_CACHE")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_FRAME_CACHE)
}

pub fn log_file() -> PathBuf {
    std::env::var("WORLD_MAP_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}
