use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const KEY_HINTS: &str = " ?:help  q:quit ";

/// Keep the last `budget` characters, marking the cut with `...`.
fn truncate_left(text: &str, budget: usize) -> String {
    let len = text.chars().count();
    if len <= budget {
        return text.to_string();
    }
    if budget <= 3 {
        return text.chars().take(budget).collect();
    }
    let tail: String = text.chars().skip(len - (budget - 3)).collect();
    format!("...{tail}")
}

fn truncate_right(text: &str, budget: usize) -> String {
    text.chars().take(budget).collect()
}

/// Status bar widget that displays the selected path, plot info, key hints, or status messages.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    plot_info: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
    plot_failed: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, plot_info: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            path_str,
            plot_info,
            theme,
            status_message: None,
            is_error: false,
            plot_failed: false,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    /// Render the plot info as a warning.
    pub fn plot_failed(mut self, failed: bool) -> Self {
        self.plot_failed = failed;
        self
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_fg)
            } else {
                Style::default().fg(self.theme.success_fg)
            };

            let display = format!("{:<width$}", truncate_right(msg, width), width = width);
            let line = Line::from(Span::styled(display, style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        // Normal bar: [path] [plot_info] [key_hints]
        let hints_len = KEY_HINTS.chars().count();
        let remaining = width.saturating_sub(hints_len);

        let info_len = self.plot_info.chars().count();
        let path_budget = remaining.saturating_sub(info_len).saturating_sub(1);
        let path_display = truncate_left(self.path_str, path_budget);
        let path_len = path_display.chars().count();

        let info_display = truncate_right(self.plot_info, remaining.saturating_sub(path_len));
        let gap = remaining
            .saturating_sub(path_len)
            .saturating_sub(info_display.chars().count());

        let path_style = Style::default().fg(self.theme.status_fg);
        let info_style = if self.plot_failed {
            Style::default()
                .fg(self.theme.warning_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.accent_fg)
        };
        let hints_style = Style::default()
            .fg(self.theme.dim_fg)
            .add_modifier(Modifier::DIM);

        let line = Line::from(vec![
            Span::styled(path_display, path_style),
            Span::raw(" ".repeat(gap)),
            Span::styled(info_display, info_style),
            Span::styled(KEY_HINTS, hints_style),
        ])
        .style(Style::default().bg(self.theme.status_bg));
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;
    use ratatui::style::Color;

    fn test_theme() -> ThemeColors {
        theme::dark_theme()
    }

    fn content(buf: &Buffer, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn test_basic_widget_creation() {
        let tc = test_theme();
        let widget = StatusBarWidget::new("/data/series.npy", "Sort: Name | .npy", &tc);
        assert_eq!(widget.path_str, "/data/series.npy");
        assert_eq!(widget.plot_info, "Sort: Name | .npy");
        assert!(widget.status_message.is_none());
        assert!(!widget.is_error);
    }

    #[test]
    fn test_status_message_success() {
        let tc = test_theme();
        let widget =
            StatusBarWidget::new("/path", "info", &tc).status_message("Hidden files shown", false);

        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        assert!(content(&buf, 80).contains("Hidden files shown"));
        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.fg, Color::Rgb(166, 227, 161));
    }

    #[test]
    fn test_status_message_error() {
        let tc = test_theme();
        let widget = StatusBarWidget::new("/path", "info", &tc)
            .status_message("Cannot list /root/secret: Permission denied", true);

        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        assert!(content(&buf, 80).contains("Permission denied"));
        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.bg, Color::Rgb(243, 139, 168));
        assert_eq!(cell.fg, Color::Rgb(205, 214, 244));
    }

    #[test]
    fn test_normal_bar_rendering() {
        let tc = test_theme();
        let widget = StatusBarWidget::new("/home/user/runs", "Sort: Size | dir", &tc);

        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let text = content(&buf, 100);
        assert!(text.contains("/home/user/runs"));
        assert!(text.contains("Sort: Size | dir"));
        assert!(text.trim_end().ends_with("q:quit"));
    }

    #[test]
    fn test_long_path_is_truncated_from_the_left() {
        let tc = test_theme();
        let path = format!("/{}/series.npy", "deep/".repeat(20));
        let widget = StatusBarWidget::new(&path, ".npy", &tc);

        let area = Rect::new(0, 0, 50, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let text = content(&buf, 50);
        assert!(text.starts_with("..."));
        assert!(text.contains("series.npy"));
        assert!(text.contains("?:help"));
    }

    #[test]
    fn test_failed_plot_info_uses_warning_color() {
        let tc = test_theme();
        let widget = StatusBarWidget::new("/a", "InvalidShape", &tc).plot_failed(true);

        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let text = content(&buf, 60);
        let col = text.find("InvalidShape").unwrap() as u16;
        assert_eq!(buf.cell((col, 0)).unwrap().fg, tc.warning_fg);
    }

    #[test]
    fn test_zero_area_does_not_panic() {
        let tc = test_theme();
        let widget = StatusBarWidget::new("/path", "info", &tc);
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
    }

    #[test]
    fn test_truncate_helpers() {
        assert_eq!(truncate_left("abcdefgh", 6), "...fgh");
        assert_eq!(truncate_left("abc", 6), "abc");
        assert_eq!(truncate_left("abcdef", 2), "ab");
        assert_eq!(truncate_right("héllo", 2), "hé");
    }
}
