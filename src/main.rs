mod app;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod handler;
mod logging;
mod npy;
mod plot;
mod plugins;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, LogConfig, ThemeConfig};
use crate::event::{Event, EventHandler};
use crate::tui::{install_panic_hook, Tui};

/// Browse a directory tree and plot data files in the terminal.
#[derive(Parser, Debug)]
#[command(name = "pbrowse", version, about)]
struct Cli {
    /// Root directory to browse (defaults to the configured path or the current directory)
    path: Option<PathBuf>,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,

    /// Show hidden files at startup
    #[arg(long)]
    show_hidden: bool,

    /// Color scheme: dark, light or custom
    #[arg(long)]
    theme: Option<String>,

    /// Log filter, e.g. `debug` or `plot_browser=trace`
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Partial config holding only the values set on the command line.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: None,
                show_hidden: self.show_hidden.then_some(true),
                mouse: self.no_mouse.then_some(false),
            },
            log: LogConfig {
                level: self.log_level.clone(),
            },
            theme: ThemeConfig {
                scheme: self.theme.clone(),
                custom: None,
            },
            ..AppConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    let _log_guard = logging::init(config.log_level())?;

    let requested = cli
        .path
        .clone()
        .or_else(|| config.general.default_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let path = requested.canonicalize().map_err(|_| {
        error::AppError::InvalidPath(format!("{} does not exist", requested.display()))
    })?;

    tracing::info!(root = %path.display(), theme = config.theme_scheme(), "starting");

    let mut app = App::new(&path, &config)?;

    install_panic_hook();
    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(250));

    loop {
        if app.take_redraw_request() {
            tui.draw(|frame| ui::render(&mut app, frame))?;
        }

        let mut next = Some(events.next().await?);
        // Drain whatever queued up so a burst of input costs one redraw.
        while let Some(event) = next {
            match event {
                Event::Key(key) => handler::handle_key_event(&mut app, key),
                Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
                Event::Tick => app.clear_expired_status(),
                Event::Resize => app.request_redraw(),
            }
            if app.should_quit {
                break;
            }
            next = events.try_next();
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    tracing::info!("exiting");
    Ok(())
}
