/// View subsystem - Rendering and display management
///
/// `markup` turns application state into styled lines without touching the
/// terminal; `renderer` paints those lines with crossterm.

pub mod markup;
pub mod renderer;

// Re-export public interface
pub use renderer::{RenderParams, View};
