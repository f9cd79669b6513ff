pub mod batch;
pub mod braille;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod hash;
pub mod logging;
pub mod map;
pub mod service;
pub mod session;

pub use error::{MapError, RenderError};
