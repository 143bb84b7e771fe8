//! In-memory axes that renderers draw into.
//!
//! The canvas only records what was drawn; `components::plot::PlotWidget`
//! turns it into a ratatui chart.

use crate::error::RenderError;

/// One line series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub points: Vec<(f64, f64)>,
}

/// A text annotation anchored at data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// The drawing surface shared by every renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    title: Option<String>,
    series: Vec<Series>,
    texts: Vec<TextItem>,
    axis_visible: bool,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            title: None,
            series: Vec::new(),
            texts: Vec::new(),
            axis_visible: true,
        }
    }
}

impl Canvas {
    /// Remove everything drawn so far and restore the axis.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Plot `ys` against their indices.
    pub fn plot(&mut self, ys: &[f64]) {
        let points = ys
            .iter()
            .enumerate()
            .map(|(i, y)| (i as f64, *y))
            .collect();
        self.series.push(Series { points });
    }

    /// Plot `ys` against `xs`. Both must have the same length.
    pub fn plot_xy(&mut self, xs: &[f64], ys: &[f64]) -> Result<(), RenderError> {
        if xs.len() != ys.len() {
            return Err(RenderError::InvalidShape(format!(
                "x and y must have same length, but have {} and {}",
                xs.len(),
                ys.len()
            )));
        }
        let points = xs.iter().copied().zip(ys.iter().copied()).collect();
        self.series.push(Series { points });
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn text(&mut self, x: f64, y: f64, text: impl Into<String>) {
        self.texts.push(TextItem {
            x,
            y,
            text: text.into(),
        });
    }

    /// Hide ticks, labels and axis lines.
    pub fn set_axis_off(&mut self) {
        self.axis_visible = false;
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn texts(&self) -> &[TextItem] {
        &self.texts
    }

    pub fn axis_visible(&self) -> bool {
        self.axis_visible
    }

    /// True when nothing has been drawn.
    pub fn is_blank(&self) -> bool {
        self.title.is_none() && self.series.is_empty() && self.texts.is_empty()
    }

    /// Finite min/max over all x values, widened when degenerate.
    pub fn x_bounds(&self) -> Option<[f64; 2]> {
        bounds(self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0)))
    }

    /// Finite min/max over all y values, widened when degenerate.
    pub fn y_bounds(&self) -> Option<[f64; 2]> {
        bounds(self.series.iter().flat_map(|s| s.points.iter().map(|p| p.1)))
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    if min == max {
        Some([min - 0.5, max + 0.5])
    } else {
        Some([min, max])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_blank_with_axis() {
        let canvas = Canvas::default();
        assert!(canvas.is_blank());
        assert!(canvas.axis_visible());
        assert!(canvas.x_bounds().is_none());
    }

    #[test]
    fn plot_uses_indices_as_x() {
        let mut canvas = Canvas::default();
        canvas.plot(&[3.0, 1.0, 2.0]);
        assert_eq!(canvas.series()[0].points, vec![(0.0, 3.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(canvas.x_bounds(), Some([0.0, 2.0]));
        assert_eq!(canvas.y_bounds(), Some([1.0, 3.0]));
    }

    #[test]
    fn plot_xy_rejects_mismatched_lengths() {
        let mut canvas = Canvas::default();
        let err = canvas.plot_xy(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidShape(_)));
        assert!(canvas.series().is_empty());
    }

    #[test]
    fn bounds_skip_non_finite_and_widen_flat_data() {
        let mut canvas = Canvas::default();
        canvas.plot(&[f64::NAN, 4.0, f64::INFINITY, 4.0]);
        assert_eq!(canvas.y_bounds(), Some([3.5, 4.5]));
    }

    #[test]
    fn clear_removes_everything() {
        let mut canvas = Canvas::default();
        canvas.plot(&[1.0]);
        canvas.set_title("t");
        canvas.text(0.0, 0.0, "hello");
        canvas.set_axis_off();
        canvas.clear();
        assert_eq!(canvas, Canvas::default());
    }
}
