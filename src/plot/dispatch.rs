//! Selection → renderer dispatch.
//!
//! Every outcome leaves the canvas in a defined state: blank for directories
//! and empty selections, the renderer's drawing on success, or the error
//! display. Renderer failures never propagate past [`dispatch`].

use std::path::Path;

use crate::error::RenderError;
use crate::plot::{Canvas, PluginRegistry};

/// Column width of the wrapped message in the error display.
pub const ERROR_WRAP_WIDTH: usize = 60;

/// What a dispatch call ended up drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No selection, or a directory: nothing to show.
    Blank,
    /// The renderer for `extension` drew the file.
    Rendered { extension: String },
    /// The error display was drawn.
    Failed {
        category: &'static str,
        message: String,
    },
}

/// Extension of `path` including the leading dot, as used for registry keys.
///
/// Follows `Path::extension`: case is preserved and a file name that starts
/// with its only dot has no extension.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

/// Render `selection` into `canvas` with the matching renderer.
pub fn dispatch(
    registry: &PluginRegistry,
    selection: Option<&Path>,
    canvas: &mut Canvas,
) -> DispatchOutcome {
    canvas.clear();

    let path = match selection {
        Some(path) if !path.is_dir() => path,
        _ => {
            plot_dir(canvas);
            return DispatchOutcome::Blank;
        }
    };

    let renderer = extension_of(path)
        .as_deref()
        .and_then(|ext| registry.get(ext).map(|r| (ext.to_string(), r)));

    let result = match renderer {
        Some((extension, renderer)) => match renderer.render(path, canvas) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), renderer = renderer.name(), "rendered");
                return DispatchOutcome::Rendered { extension };
            }
            Err(e) => e,
        },
        None => RenderError::Unsupported(path.to_path_buf()),
    };

    tracing::info!(path = %path.display(), category = result.category(), error = %result, "render failed");
    canvas.clear();
    plot_error(&result, canvas);
    DispatchOutcome::Failed {
        category: result.category(),
        message: result.to_string(),
    }
}

/// Blank "nothing to show" display.
pub fn plot_dir(canvas: &mut Canvas) {
    canvas.set_axis_off();
}

/// Error display: header, category name, and the message wrapped to
/// [`ERROR_WRAP_WIDTH`] columns.
pub fn plot_error(error: &RenderError, canvas: &mut Canvas) {
    let wrapped = wrap_text(&error.to_string(), ERROR_WRAP_WIDTH);
    let msg = format!(
        "An error occurred:\n{}\n{}",
        error.category(),
        wrapped.join("\n")
    );
    canvas.text(0.0, 0.0, msg);
    canvas.set_axis_off();
}

/// Greedy word wrap for the error display.
///
/// Words are split on whitespace and rejoined with single spaces, so runs of
/// spaces, tabs and newlines inside a message collapse. Only the words are
/// kept; the display has no use for the original spacing. Words longer than
/// `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        while !chars.is_empty() {
            let needed = if current_len == 0 {
                chars.len()
            } else {
                current_len + 1 + chars.len()
            };
            if needed <= width {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(chars.iter());
                current_len += chars.len();
                break;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            // Word alone is wider than a line.
            let rest = chars.split_off(width);
            lines.push(chars.iter().collect());
            chars = rest;
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}
