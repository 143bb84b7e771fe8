use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::theme::ThemeColors;

/// A single keybinding entry for display.
struct KeyEntry {
    key: &'static str,
    description: &'static str,
}

/// A category of keybindings.
struct KeyCategory {
    name: &'static str,
    entries: &'static [KeyEntry],
}

const NAVIGATION_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "j / ↓",
        description: "Move down",
    },
    KeyEntry {
        key: "k / ↑",
        description: "Move up",
    },
    KeyEntry {
        key: "g / Home",
        description: "Jump to first item",
    },
    KeyEntry {
        key: "G / End",
        description: "Jump to last item",
    },
    KeyEntry {
        key: "Enter / l / →",
        description: "Expand directory",
    },
    KeyEntry {
        key: "Backspace / h / ←",
        description: "Collapse directory / go to parent",
    },
    KeyEntry {
        key: ".",
        description: "Toggle hidden files",
    },
    KeyEntry {
        key: "s",
        description: "Cycle sort (name → size → modified)",
    },
];

const MOUSE_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "Click",
        description: "Select and plot item",
    },
    KeyEntry {
        key: "Scroll wheel",
        description: "Move selection",
    },
];

const GENERAL_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "?",
        description: "Toggle this help overlay",
    },
    KeyEntry {
        key: "q",
        description: "Quit",
    },
    KeyEntry {
        key: "Ctrl+C",
        description: "Quit",
    },
];

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory {
        name: "Navigation (Tree Panel)",
        entries: NAVIGATION_KEYS,
    },
    KeyCategory {
        name: "Mouse",
        entries: MOUSE_KEYS,
    },
    KeyCategory {
        name: "General",
        entries: GENERAL_KEYS,
    },
];

/// Width of the key column.
const KEY_COLUMN: usize = 20;

/// Help overlay widget showing all keybindings.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
    scroll_offset: usize,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a ThemeColors, scroll_offset: usize) -> Self {
        Self {
            theme,
            scroll_offset,
        }
    }

    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(self.theme.accent_fg)
            .add_modifier(Modifier::BOLD);
        let key_style = Style::default()
            .fg(self.theme.warning_fg)
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(self.theme.tree_file_fg);

        let mut lines = vec![
            Line::from(Span::styled(" plot-browser keys ", heading)),
            Line::from(""),
        ];

        for category in CATEGORIES {
            lines.push(Line::from(vec![
                Span::styled(format!("── {} ", category.name), heading),
                Span::styled("─".repeat(30), Style::default().fg(self.theme.dim_fg)),
            ]));
            lines.extend(category.entries.iter().map(|entry| {
                Line::from(vec![
                    Span::styled(format!("  {:<KEY_COLUMN$}", entry.key), key_style),
                    Span::styled(entry.description, desc_style),
                ])
            }));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            " Press ? or Esc to close ",
            Style::default().fg(self.theme.dim_fg),
        )));
        lines
    }

    /// Total number of content lines: title block, one header and a
    /// trailing blank per category, and the footer.
    pub fn total_lines() -> usize {
        let entries: usize = CATEGORIES.iter().map(|c| c.entries.len() + 2).sum();
        2 + entries + 1
    }

    /// Centered overlay rectangle: 60% of the width, 70% of the height.
    fn overlay_area(area: Rect) -> Rect {
        let width = (area.width as f32 * 0.60).clamp(0.0, 72.0) as u16;
        let height = (area.height as f32 * 0.70).clamp(0.0, 30.0) as u16;
        Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        )
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let overlay = Self::overlay_area(area);
        if overlay.width < 3 || overlay.height < 3 {
            return;
        }
        Clear.render(overlay, buf);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused_fg))
            .style(Style::default().bg(self.theme.overlay_bg));
        let inner = block.inner(overlay);
        block.render(overlay, buf);

        let lines = self.build_content_lines();
        let visible = inner.height as usize;
        let scroll = self.scroll_offset.min(lines.len().saturating_sub(visible));

        for (i, line) in lines.iter().skip(scroll).take(visible).enumerate() {
            buf.set_line(
                inner.x + 1,
                inner.y + i as u16,
                line,
                inner.width.saturating_sub(2),
            );
        }

        if lines.len() > visible {
            let indicator = Span::styled(
                format!(" {}/{} ", scroll + 1, lines.len()),
                Style::default().fg(self.theme.dim_fg),
            );
            let width = indicator.width() as u16;
            let x = overlay.x + overlay.width.saturating_sub(width + 1);
            buf.set_span(x, overlay.y + overlay.height - 1, &indicator, width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_lines_is_nonzero() {
        assert!(HelpOverlay::total_lines() > 0);
    }

    #[test]
    fn all_categories_have_entries() {
        for cat in CATEGORIES {
            assert!(
                !cat.entries.is_empty(),
                "Category '{}' has no entries",
                cat.name
            );
        }
    }

    #[test]
    fn content_lines_match_total() {
        let theme = crate::theme::dark_theme();
        let overlay = HelpOverlay::new(&theme, 0);
        let lines = overlay.build_content_lines();
        assert_eq!(lines.len(), HelpOverlay::total_lines());
    }

    #[test]
    fn overlay_lists_sort_key() {
        let theme = crate::theme::dark_theme();
        let area = Rect::new(0, 0, 100, 40);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&theme, 0).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf.cell(pos).unwrap().symbol().to_string())
            .collect();
        assert!(text.contains("Toggle hidden files"));
        assert!(text.contains("Cycle sort"));
    }

    #[test]
    fn oversized_scroll_is_clamped() {
        let theme = crate::theme::dark_theme();
        let area = Rect::new(0, 0, 80, 12);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&theme, 10_000).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf.cell(pos).unwrap().symbol().to_string())
            .collect();
        assert!(text.contains("Press ? or Esc to close"));
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let theme = crate::theme::dark_theme();
        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&theme, 0).render(area, &mut buf);
    }
}
