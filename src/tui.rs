use std::io::{self, Stdout};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};

use crate::error::Result;

/// Leave raw mode and the alternate screen. Errors are ignored so this is safe
/// to call from a panic hook.
fn leave_terminal() {
    let _ = terminal::disable_raw_mode();
    let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
}

/// Owns the terminal for the lifetime of the UI.
///
/// The terminal is handed back on [`Tui::restore`] or, failing that, on drop,
/// so an early `?` return from the event loop still leaves a usable shell.
pub struct Tui<B: Backend = CrosstermBackend<Stdout>> {
    terminal: Terminal<B>,
    mouse_enabled: bool,
    active: bool,
}

impl Tui {
    /// Enter the alternate screen and raw mode, optionally capturing the mouse.
    pub fn new(enable_mouse: bool) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            leave_terminal();
            return Err(e.into());
        }
        if enable_mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        tracing::debug!(mouse = enable_mouse, "terminal entered");
        Ok(Self {
            terminal,
            mouse_enabled: enable_mouse,
            active: true,
        })
    }
}

impl<B: Backend> Tui<B> {
    /// Wrap a backend that needs no raw mode or alternate screen.
    #[cfg(test)]
    fn headless(backend: B) -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            mouse_enabled: false,
            active: false,
        })
    }

    /// Draw one frame.
    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Give the terminal back. Calling it twice is a no-op.
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        if self.mouse_enabled {
            execute!(io::stdout(), DisableMouseCapture)?;
        }
        terminal::disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        tracing::debug!("terminal restored");
        Ok(())
    }
}

impl<B: Backend> Drop for Tui<B> {
    fn drop(&mut self) {
        if self.active {
            leave_terminal();
            let _ = self.terminal.show_cursor();
        }
    }
}

/// Chain a panic hook that puts the terminal back and logs the panic before
/// the default report is printed.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        leave_terminal();
        tracing::error!(%panic_info, "panic");
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::widgets::Paragraph;

    #[test]
    fn draw_renders_into_backend() {
        let mut tui = Tui::headless(TestBackend::new(12, 2)).unwrap();
        tui.draw(|frame| frame.render_widget(Paragraph::new("series.npy"), frame.area()))
            .unwrap();

        let buf = tui.terminal.backend().buffer();
        let row: String = (0..12)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        assert_eq!(row.trim_end(), "series.npy");
    }

    #[test]
    fn restore_only_runs_while_active() {
        let mut tui = Tui::headless(TestBackend::new(4, 1)).unwrap();
        assert!(!tui.active);
        tui.restore().unwrap();
        tui.restore().unwrap();
        assert!(!tui.active);
    }
}
