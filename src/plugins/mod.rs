//! Bundled renderers.
//!
//! Adding a renderer means implementing [`Renderer`] and listing it in
//! [`builtin`]; the registry rejects a second renderer for an extension.

mod npy;

pub use npy::NpyPlotter;

use crate::plot::Renderer;

/// Every renderer shipped with the application.
pub fn builtin() -> Vec<Box<dyn Renderer>> {
    vec![Box::new(NpyPlotter)]
}
