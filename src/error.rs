use std::path::PathBuf;

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A directory could not be listed while expanding the tree.
    #[error("Cannot list {}: {source}", path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer registry could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Errors raised while registering renderers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("extension {0:?} is registered by more than one renderer")]
    DuplicateExtension(String),

    #[error("extension {0:?} must start with '.'")]
    MalformedExtension(String),
}

/// Failure of a single render call. Contained at the dispatch boundary and
/// painted onto the plot panel instead of propagating.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No renderer is registered for the file's extension.
    #[error("cannot plot {}", .0.display())]
    Unsupported(PathBuf),

    /// The data has a shape the renderer cannot draw.
    #[error("{0}")]
    InvalidShape(String),

    /// The file is not in the format the renderer expects.
    #[error("{0}")]
    Format(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Short category name shown on the second line of the error display.
    pub fn category(&self) -> &'static str {
        match self {
            RenderError::Unsupported(_) => "UnsupportedFile",
            RenderError::InvalidShape(_) => "InvalidShape",
            RenderError::Format(_) => "FormatError",
            RenderError::Io(_) => "IoError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("file not found"));
    }

    #[test]
    fn invalid_path_error_display() {
        let err = AppError::InvalidPath("/nonexistent".into());
        assert_eq!(err.to_string(), "Invalid path: /nonexistent");
    }

    #[test]
    fn listing_error_names_the_directory() {
        let err = AppError::Listing {
            path: PathBuf::from("/root/secret"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/root/secret"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn registry_error_is_transparent() {
        let err: AppError = RegistryError::DuplicateExtension(".npy".into()).into();
        assert_eq!(
            err.to_string(),
            "extension \".npy\" is registered by more than one renderer"
        );
    }

    #[test]
    fn unsupported_message_contains_path() {
        let err = RenderError::Unsupported(PathBuf::from("data/notes.txt"));
        assert_eq!(err.to_string(), "cannot plot data/notes.txt");
        assert_eq!(err.category(), "UnsupportedFile");
    }

    #[test]
    fn io_render_error_category() {
        let err: RenderError = std::io::Error::other("boom").into();
        assert_eq!(err.category(), "IoError");
        assert_eq!(err.to_string(), "boom");
    }
}
