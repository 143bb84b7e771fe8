use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode};
use crate::components::help::HelpOverlay;
use crate::components::plot::{marker_from_config, PlotWidget};
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;
use crate::fs::tree::NodeId;
use crate::plot::DispatchOutcome;

/// Short description of the current plot for the status bar.
fn plot_info(app: &App) -> String {
    let sort = app.tree_state.tree.sort_by.label();
    let outcome = match &app.last_outcome {
        DispatchOutcome::Blank => "-",
        DispatchOutcome::Rendered { extension } => extension.as_str(),
        DispatchOutcome::Failed { category, .. } => *category,
    };
    format!("Sort: {sort} | {outcome} ")
}

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(app.tree_width_percent),
            Constraint::Percentage(100 - app.tree_width_percent),
        ])
        .split(rows[0]);

    let tree_area = columns[0];
    let plot_area = columns[1];
    app.tree_area = tree_area;

    // Keep the selection visible inside the border.
    let visible_height = tree_area.height.saturating_sub(2) as usize;
    app.tree_state.update_scroll(visible_height);

    let border = Style::default().fg(app.theme.border_fg);
    let root_name = app
        .tree_state
        .tree
        .node(NodeId::ROOT)
        .map(|n| n.name())
        .unwrap_or_default();
    let tree_block = Block::default()
        .title(format!(" {root_name} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_focused_fg));
    let tree_widget =
        TreeWidget::new(&app.tree_state, &app.registry, &app.theme, app.use_icons).block(tree_block);
    frame.render_widget(tree_widget, tree_area);

    let plot_block = Block::default().borders(Borders::ALL).border_style(border);
    let plot_widget = PlotWidget::new(&app.canvas, &app.theme)
        .marker(marker_from_config(&app.marker))
        .block(plot_block);
    frame.render_widget(plot_widget, plot_area);

    let path_str = app
        .tree_state
        .selected_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let info = plot_info(app);
    let mut status = StatusBarWidget::new(&path_str, &info, &app.theme)
        .plot_failed(matches!(app.last_outcome, DispatchOutcome::Failed { .. }));
    if let Some(msg) = &app.status_message {
        status = status.status_message(&msg.text, msg.is_error);
    }
    frame.render_widget(status, rows[1]);

    if app.mode == AppMode::Help {
        frame.render_widget(HelpOverlay::new(&app.theme, app.help_scroll), area);
    }
}
