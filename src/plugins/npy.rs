use std::path::Path;

use crate::error::RenderError;
use crate::npy;
use crate::plot::{Canvas, Renderer};

/// Line plot of a 1-D or 2-D `.npy` array.
///
/// A 1-D array is one series against its indices. A 2-D array uses its
/// first row as the shared x values and plots each remaining row.
#[derive(Debug, Default)]
pub struct NpyPlotter;

impl Renderer for NpyPlotter {
    fn extension(&self) -> &str {
        ".npy"
    }

    fn name(&self) -> &str {
        "npy line plot"
    }

    fn render(&self, path: &Path, canvas: &mut Canvas) -> Result<(), RenderError> {
        let array = npy::read_npy(path)?;
        match array.ndim() {
            1 => canvas.plot(&array.data),
            2 => {
                let x = array.row(0).ok_or_else(|| {
                    RenderError::InvalidShape("cannot plot an array with no rows".into())
                })?;
                for i in 1..array.shape[0] {
                    if let Some(y) = array.row(i) {
                        canvas.plot_xy(x, y)?;
                    }
                }
            }
            _ => {
                return Err(RenderError::InvalidShape(
                    "can only plot 1- or 2-dimensional time series".into(),
                ))
            }
        }

        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        canvas.set_title(title);
        Ok(())
    }
}
