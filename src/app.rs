use std::path::Path;
use std::time::Instant;

use ratatui::layout::Rect;

use crate::components::help::HelpOverlay;
use crate::config::AppConfig;
use crate::error::Result;
use crate::fs::tree::{NodeId, SortBy, TreeOptions, TreeState};
use crate::plot::{dispatch, Canvas, DispatchOutcome, PluginRegistry};
use crate::theme::{self, ThemeColors};

/// Application mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    Help,
}

/// A transient message in the status bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

/// Main application state. Owned and mutated only by the event loop.
pub struct App {
    pub tree_state: TreeState,
    pub registry: PluginRegistry,
    pub canvas: Canvas,
    pub last_outcome: DispatchOutcome,
    pub theme: ThemeColors,
    pub use_icons: bool,
    pub marker: String,
    pub tree_width_percent: u16,
    pub mode: AppMode,
    pub help_scroll: usize,
    pub status_message: Option<StatusMessage>,
    pub should_quit: bool,
    /// Tree panel area from the last draw, for mouse hit testing.
    pub tree_area: Rect,
    redraw_requested: bool,
}

impl App {
    /// Create a new App rooted at the given path with the bundled renderers.
    pub fn new(path: &Path, config: &AppConfig) -> Result<Self> {
        let registry = PluginRegistry::with_builtin()?;
        Self::with_registry(path, config, registry)
    }

    /// Create a new App with an explicit renderer registry.
    pub fn with_registry(path: &Path, config: &AppConfig, registry: PluginRegistry) -> Result<Self> {
        let tree_state = TreeState::new(
            path,
            TreeOptions {
                sort_by: SortBy::from_config(config.sort_by()),
                dirs_first: config.dirs_first(),
                show_hidden: config.show_hidden(),
            },
        )?;

        let mut app = Self {
            tree_state,
            registry,
            canvas: Canvas::default(),
            last_outcome: DispatchOutcome::Blank,
            theme: theme::resolve_theme(&config.theme),
            use_icons: config.use_icons(),
            marker: config.plot_marker().to_string(),
            tree_width_percent: config.tree_width_percent(),
            mode: AppMode::Normal,
            help_scroll: 0,
            status_message: None,
            should_quit: false,
            tree_area: Rect::default(),
            redraw_requested: true,
        };
        app.on_selection_changed();
        Ok(app)
    }

    /// Ask the event loop to redraw once it is idle.
    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Consume a pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Resolve the selection and render it into the canvas.
    fn on_selection_changed(&mut self) {
        let path = self.tree_state.selected_path();
        self.last_outcome = dispatch(&self.registry, path.as_deref(), &mut self.canvas);
        self.request_redraw();
    }

    /// Run a tree mutation and dispatch if it moved the selection.
    fn navigate(&mut self, f: impl FnOnce(&mut TreeState)) {
        let before: Option<NodeId> = self.tree_state.selected_id();
        f(&mut self.tree_state);
        if self.tree_state.selected_id() != before {
            self.on_selection_changed();
        } else {
            self.request_redraw();
        }
    }

    /// Set a status message with current timestamp.
    pub fn set_status_message(&mut self, text: String, is_error: bool) {
        self.status_message = Some(StatusMessage {
            text,
            is_error,
            created: Instant::now(),
        });
        self.request_redraw();
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some(msg) = &self.status_message {
            if msg.created.elapsed().as_secs() > 3 {
                self.status_message = None;
                self.request_redraw();
            }
        }
    }

    pub fn clear_status(&mut self) {
        if self.status_message.take().is_some() {
            self.request_redraw();
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.navigate(|tree| {
            let len = tree.flat_items.len();
            if len > 0 && tree.selected_index < len - 1 {
                tree.selected_index += 1;
            }
        });
    }

    /// Move selection up by one item.
    pub fn select_previous(&mut self) {
        self.navigate(|tree| tree.selected_index = tree.selected_index.saturating_sub(1));
    }

    /// Jump to the first item.
    pub fn select_first(&mut self) {
        self.navigate(|tree| tree.selected_index = 0);
    }

    /// Jump to the last item.
    pub fn select_last(&mut self) {
        self.navigate(|tree| tree.selected_index = tree.flat_items.len().saturating_sub(1));
    }

    /// Select the tree row under a terminal cell, if any.
    pub fn select_row_at(&mut self, column: u16, row: u16) {
        let area = self.tree_area;
        // One-cell border on every side.
        let inside = column > area.x
            && column < area.x + area.width.saturating_sub(1)
            && row > area.y
            && row < area.y + area.height.saturating_sub(1);
        if !inside {
            return;
        }
        let index = self.tree_state.scroll_offset + (row - area.y - 1) as usize;
        if index < self.tree_state.flat_items.len() {
            self.navigate(|tree| tree.selected_index = index);
        }
    }

    /// Expand the selected directory (or no-op on files).
    ///
    /// A listing failure is reported in the status bar; the directory stays
    /// unexpanded and can be retried.
    pub fn expand_selected(&mut self) {
        if let Err(e) = self.tree_state.expand_selected() {
            tracing::warn!(error = %e, "expand failed");
            self.set_status_message(e.to_string(), true);
        }
        self.request_redraw();
    }

    /// Collapse the selected directory, or jump to parent if on a file or collapsed directory.
    pub fn collapse_selected(&mut self) {
        self.navigate(TreeState::collapse_selected);
    }

    /// Toggle hidden file visibility.
    pub fn toggle_hidden(&mut self) {
        self.navigate(TreeState::toggle_hidden);
        let state = if self.tree_state.show_hidden {
            "shown"
        } else {
            "hidden"
        };
        self.set_status_message(format!("Hidden files {state}"), false);
    }

    /// Cycle the sort order.
    pub fn cycle_sort(&mut self) {
        self.navigate(TreeState::cycle_sort);
        let label = self.tree_state.tree.sort_by.label();
        self.set_status_message(format!("Sort: {label}"), false);
    }

    /// Open or close the help overlay.
    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            AppMode::Normal => AppMode::Help,
            AppMode::Help => AppMode::Normal,
        };
        self.help_scroll = 0;
        self.request_redraw();
    }

    pub fn scroll_help(&mut self, down: bool) {
        self.help_scroll = if down {
            (self.help_scroll + 1).min(HelpOverlay::total_lines().saturating_sub(1))
        } else {
            self.help_scroll.saturating_sub(1)
        };
        self.request_redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    use crate::npy::test_support::write_npy_f8;

    /// Layout after sorting (dirs first, hidden files not shown):
    /// root, alpha, beta, notes.txt, series.npy
    fn setup_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        File::create(dir.path().join("alpha").join("inner.txt")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();
        write_npy_f8(&dir.path().join("series.npy"), &[5], &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let app = App::new(dir.path(), &AppConfig::default()).unwrap();
        (dir, app)
    }

    #[test]
    fn starts_on_root_with_blank_plot() {
        let (_dir, mut app) = setup_app();
        assert_eq!(app.tree_state.selected_index, 0);
        assert_eq!(app.last_outcome, DispatchOutcome::Blank);
        assert!(app.canvas.is_blank());
        assert!(app.take_redraw_request());
        assert!(!app.take_redraw_request());
    }

    #[test]
    fn selecting_npy_file_renders_it() {
        let (_dir, mut app) = setup_app();
        app.select_last();
        assert_eq!(app.tree_state.flat_items[4].name, "series.npy");
        assert_eq!(
            app.last_outcome,
            DispatchOutcome::Rendered {
                extension: ".npy".into()
            }
        );
        assert_eq!(app.canvas.title(), Some("series.npy"));
        assert!(app.take_redraw_request());
    }

    #[test]
    fn selecting_text_file_shows_error() {
        let (_dir, mut app) = setup_app();
        app.tree_state.selected_index = 2;
        app.select_next();
        assert!(matches!(
            app.last_outcome,
            DispatchOutcome::Failed {
                category: "UnsupportedFile",
                ..
            }
        ));
        assert!(!app.should_quit);
    }

    #[test]
    fn moving_back_to_directory_clears_plot() {
        let (_dir, mut app) = setup_app();
        app.select_last();
        assert!(!app.canvas.is_blank());
        app.select_first();
        assert_eq!(app.last_outcome, DispatchOutcome::Blank);
        assert!(app.canvas.is_blank());
    }

    #[test]
    fn select_next_clamps_at_end() {
        let (_dir, mut app) = setup_app();
        app.select_last();
        let last = app.tree_state.selected_index;
        app.take_redraw_request();
        app.select_next();
        assert_eq!(app.tree_state.selected_index, last);
    }

    #[test]
    fn select_previous_clamps_at_start() {
        let (_dir, mut app) = setup_app();
        app.select_previous();
        assert_eq!(app.tree_state.selected_index, 0);
    }

    #[test]
    fn expand_directory_keeps_selection() {
        let (_dir, mut app) = setup_app();
        app.select_next();
        assert_eq!(app.tree_state.flat_items[1].name, "alpha");
        app.expand_selected();
        assert!(app.tree_state.flat_items[1].is_expanded);
        assert_eq!(app.tree_state.flat_items[2].name, "inner.txt");
        assert_eq!(app.tree_state.selected_index, 1);
    }

    #[test]
    fn expand_failure_sets_error_status() {
        let (dir, mut app) = setup_app();
        app.select_next();
        fs::remove_dir_all(dir.path().join("alpha")).unwrap();
        app.expand_selected();
        let msg = app.status_message.as_ref().expect("status message");
        assert!(msg.is_error);
        assert!(msg.text.contains("alpha"));
        assert!(!app.tree_state.flat_items[1].is_expanded);
    }

    #[test]
    fn collapse_on_file_jumps_to_parent_and_dispatches() {
        let (_dir, mut app) = setup_app();
        app.select_last();
        app.collapse_selected();
        assert_eq!(app.tree_state.selected_index, 0);
        assert_eq!(app.last_outcome, DispatchOutcome::Blank);
    }

    #[test]
    fn toggle_hidden_changes_count() {
        let (_dir, mut app) = setup_app();
        let without_hidden = app.tree_state.flat_items.len();
        app.toggle_hidden();
        assert!(app.tree_state.flat_items.len() > without_hidden);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn cycle_sort_reports_mode() {
        let (_dir, mut app) = setup_app();
        app.cycle_sort();
        assert_eq!(app.status_message.as_ref().unwrap().text, "Sort: Size");
    }

    #[test]
    fn mouse_click_selects_row() {
        let (_dir, mut app) = setup_app();
        app.tree_area = Rect::new(0, 0, 30, 10);
        app.select_row_at(5, 4);
        assert_eq!(app.tree_state.selected_index, 3);
        // Border and out-of-range rows are ignored.
        app.select_row_at(0, 2);
        assert_eq!(app.tree_state.selected_index, 3);
        app.select_row_at(5, 8);
        assert_eq!(app.tree_state.selected_index, 3);
    }

    #[test]
    fn help_toggle() {
        let (_dir, mut app) = setup_app();
        app.toggle_help();
        assert_eq!(app.mode, AppMode::Help);
        app.scroll_help(true);
        assert_eq!(app.help_scroll, 1);
        app.toggle_help();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.help_scroll, 0);
    }

    #[test]
    fn clear_expired_status_removes_old() {
        let (_dir, mut app) = setup_app();
        app.set_status_message("fresh".into(), false);
        app.clear_expired_status();
        assert!(app.status_message.is_some());

        app.status_message.as_mut().unwrap().created =
            Instant::now() - std::time::Duration::from_secs(5);
        app.clear_expired_status();
        assert!(app.status_message.is_none());
    }

    #[test]
    fn quit_sets_flag() {
        let (_dir, mut app) = setup_app();
        app.quit();
        assert!(app.should_quit);
    }
}
