//! Drawing surface, renderer registry and extension-keyed dispatch.

pub mod canvas;
pub mod dispatch;
pub mod registry;

pub use canvas::Canvas;
pub use dispatch::{dispatch, DispatchOutcome};
pub use registry::{PluginRegistry, Renderer};
