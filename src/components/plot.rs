use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};

use crate::plot::Canvas;
use crate::theme::ThemeColors;

/// Map the `[plot] marker` config value to a ratatui marker.
pub fn marker_from_config(name: &str) -> Marker {
    match name {
        "dot" => Marker::Dot,
        "block" => Marker::Block,
        "bar" => Marker::Bar,
        _ => Marker::Braille,
    }
}

/// Compact axis tick label.
fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-2..1e5).contains(&magnitude) {
        format!("{value:.1e}")
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn tick_labels(bounds: [f64; 2]) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    vec![
        format_tick(bounds[0]),
        format_tick(mid),
        format_tick(bounds[1]),
    ]
}

/// Paints a [`Canvas`] into the plot panel.
pub struct PlotWidget<'a> {
    canvas: &'a Canvas,
    theme: &'a ThemeColors,
    marker: Marker,
    block: Option<Block<'a>>,
}

impl<'a> PlotWidget<'a> {
    pub fn new(canvas: &'a Canvas, theme: &'a ThemeColors) -> Self {
        Self {
            canvas,
            theme,
            marker: Marker::Braille,
            block: None,
        }
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn render_chart(&self, area: Rect, buf: &mut Buffer) {
        let (Some(x_bounds), Some(y_bounds)) = (self.canvas.x_bounds(), self.canvas.y_bounds())
        else {
            return;
        };

        // Non-finite samples are not drawable.
        let points: Vec<Vec<(f64, f64)>> = self
            .canvas
            .series()
            .iter()
            .map(|s| {
                s.points
                    .iter()
                    .copied()
                    .filter(|(x, y)| x.is_finite() && y.is_finite())
                    .collect()
            })
            .collect();

        let datasets: Vec<Dataset> = points
            .iter()
            .enumerate()
            .map(|(i, data)| {
                Dataset::default()
                    .marker(self.marker)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.series_color(i)))
                    .data(data)
            })
            .collect();

        let axis_style = Style::default().fg(self.theme.plot_axis_fg);
        let mut x_axis = Axis::default().bounds(x_bounds).style(axis_style);
        let mut y_axis = Axis::default().bounds(y_bounds).style(axis_style);
        if self.canvas.axis_visible() {
            x_axis = x_axis.labels(tick_labels(x_bounds));
            y_axis = y_axis.labels(tick_labels(y_bounds));
        }

        Chart::new(datasets)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }

    fn render_texts(&self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = self
            .canvas
            .texts()
            .iter()
            .flat_map(|t| t.text.lines())
            .map(|l| Line::from(Span::raw(l.to_string())))
            .collect();
        if lines.is_empty() {
            return;
        }
        Paragraph::new(lines)
            .style(Style::default().fg(self.theme.plot_fg))
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

impl<'a> Widget for PlotWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let mut block = block.clone();
                if let Some(title) = self.canvas.title() {
                    block = block.title(Line::from(format!(" {title} ")).centered());
                }
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        if inner.width == 0 || inner.height == 0 || self.canvas.is_blank() {
            return;
        }

        self.render_chart(inner, buf);
        self.render_texts(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::plot::dispatch::plot_error;
    use crate::theme;
    use ratatui::widgets::Borders;

    fn row(buf: &Buffer, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    fn all_rows(buf: &Buffer, area: Rect) -> Vec<String> {
        (0..area.height).map(|y| row(buf, y, area.width)).collect()
    }

    #[test]
    fn series_and_title_are_drawn() {
        let mut canvas = Canvas::default();
        canvas.plot(&[0.0, 1.0, 4.0, 9.0, 16.0]);
        canvas.set_title("series.npy");
        let tc = theme::dark_theme();
        let widget = PlotWidget::new(&canvas, &tc).block(Block::default().borders(Borders::ALL));

        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let rows = all_rows(&buf, area);
        assert!(rows[0].contains("series.npy"));
        // Axis labels for the y range.
        assert!(rows.iter().any(|r| r.contains("16")));
        // Some braille cells were painted in the series color.
        let painted = (0..area.height).any(|y| {
            (0..area.width).any(|x| {
                let cell = buf.cell((x, y)).unwrap();
                cell.fg == tc.series_color(0) && cell.symbol() != " "
            })
        });
        assert!(painted);
    }

    #[test]
    fn error_text_is_shown_top_left() {
        let mut canvas = Canvas::default();
        plot_error(&RenderError::InvalidShape("bad dims".into()), &mut canvas);
        let tc = theme::dark_theme();
        let widget = PlotWidget::new(&canvas, &tc).block(Block::default().borders(Borders::ALL));

        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        assert!(row(&buf, 1, 40).contains("An error occurred:"));
        assert!(row(&buf, 2, 40).contains("InvalidShape"));
        assert!(row(&buf, 3, 40).contains("bad dims"));
    }

    #[test]
    fn blank_canvas_leaves_inner_area_empty() {
        let mut canvas = Canvas::default();
        canvas.set_axis_off();
        let tc = theme::dark_theme();
        let widget = PlotWidget::new(&canvas, &tc).block(Block::default().borders(Borders::ALL));

        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        for y in 1..4 {
            assert_eq!(row(&buf, y, 20).trim_matches('│').trim(), "");
        }
    }

    #[test]
    fn hidden_axis_has_no_labels() {
        let mut canvas = Canvas::default();
        canvas.plot(&[100.0, 200.0]);
        canvas.set_axis_off();
        let tc = theme::dark_theme();
        let widget = PlotWidget::new(&canvas, &tc);

        let area = Rect::new(0, 0, 30, 8);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        assert!(all_rows(&buf, area).iter().all(|r| !r.contains("200")));
    }

    #[test]
    fn marker_names() {
        assert_eq!(marker_from_config("dot"), Marker::Dot);
        assert_eq!(marker_from_config("anything"), Marker::Braille);
    }

    #[test]
    fn tick_formatting() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(49.0), "49");
        assert_eq!(format_tick(2.5), "2.50");
        assert_eq!(format_tick(1_000_000.0), "1.0e6");
    }

    #[test]
    fn zero_area_no_panic() {
        let mut canvas = Canvas::default();
        canvas.plot(&[1.0, 2.0]);
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        PlotWidget::new(&canvas, &tc).render(area, &mut buf);
    }
}
