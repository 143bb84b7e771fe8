use std::collections::HashMap;
use std::path::Path;

use crate::error::{RegistryError, RenderError};
use crate::plot::Canvas;
use crate::plugins;

/// A renderer for one file extension.
pub trait Renderer {
    /// Extension handled by this renderer, including the leading dot.
    fn extension(&self) -> &str;

    /// Short human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Draw the file at `path` into `canvas`.
    fn render(&self, path: &Path, canvas: &mut Canvas) -> Result<(), RenderError>;
}

/// Extension → renderer table, built once at startup.
#[derive(Default)]
pub struct PluginRegistry {
    renderers: HashMap<String, Box<dyn Renderer>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every bundled renderer.
    pub fn with_builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for renderer in plugins::builtin() {
            registry.register(renderer)?;
        }
        if registry.is_empty() {
            tracing::warn!("no renderers registered");
        }
        tracing::info!(
            count = registry.len(),
            extensions = ?registry.extensions(),
            "renderer registry built"
        );
        Ok(registry)
    }

    /// Add a renderer. A second renderer for the same extension is rejected.
    pub fn register(&mut self, renderer: Box<dyn Renderer>) -> Result<(), RegistryError> {
        let extension = renderer.extension().to_string();
        if !extension.starts_with('.') || extension.len() < 2 {
            return Err(RegistryError::MalformedExtension(extension));
        }
        if self.renderers.contains_key(&extension) {
            return Err(RegistryError::DuplicateExtension(extension));
        }
        tracing::debug!(%extension, renderer = renderer.name(), "registered renderer");
        self.renderers.insert(extension, renderer);
        Ok(())
    }

    pub fn get(&self, extension: &str) -> Option<&dyn Renderer> {
        self.renderers.get(extension).map(|r| r.as_ref())
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}
