//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--no-mouse`, `--theme`, etc.)
//! 2. `$PLOT_BROWSER_CONFIG` environment variable (path to config file)
//! 3. Project-local `.plot-browser.toml` in the current working directory
//! 4. Global `~/.config/plot-browser/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Starting directory (overridden by CLI positional arg).
    pub default_path: Option<String>,
    /// Show hidden files by default.
    pub show_hidden: Option<bool>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// Tree panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Sort order: "name", "size", "modified".
    pub sort_by: Option<String>,
    /// Directories always listed first.
    pub dirs_first: Option<bool>,
    /// Use nerd font icons (false = ASCII fallback).
    pub use_icons: Option<bool>,
    /// Width of the tree panel as a percentage of the terminal.
    pub width_percent: Option<u16>,
}

/// Plot panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PlotConfig {
    /// Line marker: "braille", "dot", "block".
    pub marker: Option<String>,
}

/// Log file settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. "info" or "plot_browser=debug".
    pub level: Option<String>,
}

/// Color settings for a single theme palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub tree_fg: Option<String>,
    pub tree_selected_bg: Option<String>,
    pub tree_selected_fg: Option<String>,
    pub tree_dir_fg: Option<String>,
    pub tree_file_fg: Option<String>,
    pub tree_hidden_fg: Option<String>,
    pub plot_fg: Option<String>,
    pub plot_axis_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub tree: TreeConfig,
    pub plot: PlotConfig,
    pub log: LogConfig,
    pub theme: ThemeConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default tree panel width in percent.
pub const DEFAULT_TREE_WIDTH_PERCENT: u16 = 35;
/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("PLOT_BROWSER_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".plot-browser.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("plot-browser").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed.
///
/// Parse failures are reported to stderr because config loads before the
/// terminal and the log file are set up.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: other
                    .general
                    .default_path
                    .clone()
                    .or(self.general.default_path),
                show_hidden: other.general.show_hidden.or(self.general.show_hidden),
                mouse: other.general.mouse.or(self.general.mouse),
            },
            tree: TreeConfig {
                sort_by: other.tree.sort_by.clone().or(self.tree.sort_by),
                dirs_first: other.tree.dirs_first.or(self.tree.dirs_first),
                use_icons: other.tree.use_icons.or(self.tree.use_icons),
                width_percent: other.tree.width_percent.or(self.tree.width_percent),
            },
            plot: PlotConfig {
                marker: other.plot.marker.clone().or(self.plot.marker),
            },
            log: LogConfig {
                level: other.log.level.clone().or(self.log.level),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: other.theme.custom.clone().or(self.theme.custom),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn show_hidden(&self) -> bool {
        self.general.show_hidden.unwrap_or(false)
    }

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    /// Sort mode: "name", "size", or "modified".
    pub fn sort_by(&self) -> &str {
        self.tree.sort_by.as_deref().unwrap_or("name")
    }

    pub fn dirs_first(&self) -> bool {
        self.tree.dirs_first.unwrap_or(true)
    }

    pub fn use_icons(&self) -> bool {
        self.tree.use_icons.unwrap_or(true)
    }

    /// Tree panel width, clamped to 10..=90 percent.
    pub fn tree_width_percent(&self) -> u16 {
        self.tree
            .width_percent
            .unwrap_or(DEFAULT_TREE_WIDTH_PERCENT)
            .clamp(10, 90)
    }

    /// Plot marker name: "braille", "dot", or "block".
    pub fn plot_marker(&self) -> &str {
        self.plot.marker.as_deref().unwrap_or("braille")
    }

    /// Log filter set by a config file or `--log-level`. `None` leaves the
    /// choice to `RUST_LOG`, then [`DEFAULT_LOG_LEVEL`].
    pub fn log_level(&self) -> Option<&str> {
        self.log.level.as_deref()
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert!(!cfg.show_hidden());
        assert!(cfg.mouse_enabled());
        assert_eq!(cfg.sort_by(), "name");
        assert!(cfg.dirs_first());
        assert!(cfg.use_icons());
        assert_eq!(cfg.tree_width_percent(), 35);
        assert_eq!(cfg.plot_marker(), "braille");
        assert_eq!(cfg.log_level(), None);
        assert_eq!(cfg.theme_scheme(), "dark");
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
default_path = "/data"
show_hidden = true
mouse = false

[tree]
sort_by = "size"
dirs_first = false
use_icons = false
width_percent = 50

[plot]
marker = "dot"

[log]
level = "debug"

[theme]
scheme = "light"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.general.default_path.as_deref(), Some("/data"));
        assert!(cfg.show_hidden());
        assert!(!cfg.mouse_enabled());
        assert_eq!(cfg.sort_by(), "size");
        assert!(!cfg.dirs_first());
        assert!(!cfg.use_icons());
        assert_eq!(cfg.tree_width_percent(), 50);
        assert_eq!(cfg.plot_marker(), "dot");
        assert_eq!(cfg.log_level(), Some("debug"));
        assert_eq!(cfg.theme_scheme(), "light");
    }

    #[test]
    fn test_toml_parsing_partial() {
        let toml = r#"
[general]
show_hidden = true
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert!(cfg.show_hidden());
        assert!(cfg.mouse_enabled());
        assert_eq!(cfg.sort_by(), "name");
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert!(!cfg.show_hidden());
        assert_eq!(cfg.plot_marker(), "braille");
    }

    #[test]
    fn test_width_percent_is_clamped() {
        let cfg: AppConfig = toml::from_str("[tree]\nwidth_percent = 99").unwrap();
        assert_eq!(cfg.tree_width_percent(), 90);
        let cfg: AppConfig = toml::from_str("[tree]\nwidth_percent = 1").unwrap();
        assert_eq!(cfg.tree_width_percent(), 10);
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            general: GeneralConfig {
                show_hidden: Some(false),
                mouse: Some(false),
                ..Default::default()
            },
            plot: PlotConfig {
                marker: Some("block".into()),
            },
            ..Default::default()
        };

        let over = AppConfig {
            general: GeneralConfig {
                show_hidden: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert!(merged.show_hidden()); // overridden
        assert!(!merged.mouse_enabled()); // from base
        assert_eq!(merged.plot_marker(), "block"); // from base
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            log: LogConfig {
                level: Some("warn".into()),
            },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert_eq!(merged.log_level(), Some("warn"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[general]
show_hidden = true

[tree]
sort_by = "modified"
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("load");
        assert!(cfg.show_hidden());
        assert_eq!(cfg.sort_by(), "modified");
        assert_eq!(cfg.plot_marker(), "braille");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_file(Path::new("/nonexistent/config.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[general]
show_hidden = true

[theme]
scheme = "light"
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            theme: ThemeConfig {
                scheme: Some("dark".into()),
                custom: None,
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        assert_eq!(cfg.theme_scheme(), "dark");
        assert!(cfg.show_hidden());
    }

    #[test]
    fn test_theme_custom_colors() {
        let toml = r##"
[theme]
scheme = "custom"

[theme.custom]
tree_fg = "#c0caf5"
plot_fg = "#9ece6a"
"##;
        let cfg: AppConfig = toml::from_str(toml).expect("parse");
        let custom = cfg.theme.custom.as_ref().expect("custom present");
        assert_eq!(custom.tree_fg.as_deref(), Some("#c0caf5"));
        assert_eq!(custom.plot_fg.as_deref(), Some("#9ece6a"));
        assert!(custom.border_fg.is_none());
    }
}
