use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::tree::{FlatItem, NodeType, TreeState};
use crate::plot::dispatch::extension_of;
use crate::plot::PluginRegistry;
use crate::theme::ThemeColors;

/// Tree widget that renders the file tree with box-drawing characters.
pub struct TreeWidget<'a> {
    tree_state: &'a TreeState,
    registry: &'a PluginRegistry,
    theme: &'a ThemeColors,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(
        tree_state: &'a TreeState,
        registry: &'a PluginRegistry,
        theme: &'a ThemeColors,
        use_icons: bool,
    ) -> Self {
        Self {
            tree_state,
            registry,
            theme,
            use_icons,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Build the prefix string for tree indentation using box-drawing characters.
    ///
    /// Continuation lines depend on whether each ancestor was a last sibling,
    /// found by walking back through the rows above.
    fn build_prefix(item: &FlatItem, items: &[FlatItem], item_index: usize) -> String {
        if item.depth == 0 {
            return String::new();
        }

        let mut prefix = String::new();
        for d in 1..item.depth {
            let ancestor_is_last = items[..item_index]
                .iter()
                .rev()
                .take_while(|row| row.depth >= d)
                .find(|row| row.depth == d)
                .is_some_and(|row| row.is_last_sibling);
            prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
        }
        prefix.push_str(if item.is_last_sibling { "└──" } else { "├──" });
        prefix
    }

    /// Whether a registered renderer handles this file name.
    fn is_plottable(&self, item: &FlatItem) -> bool {
        item.node_type == NodeType::File
            && extension_of(std::path::Path::new(&item.name))
                .is_some_and(|ext| self.registry.get(&ext).is_some())
    }

    /// Get the directory/file indicator.
    fn item_indicator(&self, item: &FlatItem, plottable: bool) -> &'static str {
        match (item.node_type, self.use_icons) {
            (NodeType::Directory, true) if item.is_expanded => "\u{f07c} ",
            (NodeType::Directory, true) => "\u{f07b} ",
            (NodeType::File, true) if plottable => "\u{f201} ",
            (NodeType::File, true) => "\u{f15b} ",
            (NodeType::Directory, false) if item.is_expanded => "[-] ",
            (NodeType::Directory, false) if item.is_expandable => "[+] ",
            (NodeType::Directory, false) => "[ ] ",
            (NodeType::File, false) if plottable => "[~] ",
            (NodeType::File, false) => "    ",
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        let items = &self.tree_state.flat_items;
        let selected = self.tree_state.selected_index;
        let visible_height = inner_area.height as usize;

        if items.is_empty() || visible_height == 0 {
            return;
        }

        let visible_items = items
            .iter()
            .enumerate()
            .skip(self.tree_state.scroll_offset)
            .take(visible_height);

        for (i, (idx, item)) in visible_items.enumerate() {
            let y = inner_area.y + i as u16;
            let plottable = self.is_plottable(item);

            let style = if idx == selected {
                Style::default()
                    .bg(self.theme.tree_selected_bg)
                    .fg(self.theme.tree_selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else if item.is_hidden {
                Style::default().fg(self.theme.tree_hidden_fg)
            } else if item.node_type == NodeType::Directory {
                Style::default()
                    .fg(self.theme.tree_dir_fg)
                    .add_modifier(Modifier::BOLD)
            } else if plottable {
                Style::default().fg(self.theme.accent_fg)
            } else {
                Style::default().fg(self.theme.tree_file_fg)
            };

            let line = Line::from(Span::styled(
                format!(
                    "{}{}{}",
                    Self::build_prefix(item, items, idx),
                    self.item_indicator(item, plottable),
                    item.name
                ),
                style,
            ));
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}
