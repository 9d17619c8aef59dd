mod context;
mod export;
mod geometry;
mod viewport;

pub use export::frame_document;
pub use context::{GridLayers, Intensity, TerminalContext};
pub use geometry::{clip_line, draw_line};
pub use viewport::Viewport;
