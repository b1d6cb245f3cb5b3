use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for the icongen library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Invalid UTF-8 encountered in a source file.
    #[error("Invalid UTF-8 encoding in file '{path}'. Source icons must be UTF-8 SVG text.")]
    InvalidUtf8 {
        /// Path to file with encoding issues
        path: PathBuf,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Template rendering error.
    #[error("Failed to render template '{template}': {message}")]
    Template {
        /// Template name
        template: String,
        /// Error message
        message: String,
    },

    /// Source markup could not be read as an SVG element tree.
    #[error("Malformed SVG for '{component}': {message}")]
    Svg {
        /// Component the markup belongs to
        component: String,
        /// Error message
        message: String,
    },

    /// Compiled output did not have the shape the format rewrite expects.
    #[error("Cannot derive module output for '{component}': {message}")]
    Transform {
        /// Component being transformed
        component: String,
        /// Error message
        message: String,
    },

    /// An import statement that cannot be rewritten to `require` form.
    #[error("Unsupported import statement '{statement}': expected `import {{ ... }} from \"module\"`")]
    ImportRewrite {
        /// The offending statement
        statement: String,
    },

    /// JSON serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },

    /// Release version that does not look like `2.5.0`.
    #[error("Invalid version '{version}': version must be digits separated by dots, e.g. 2.5.0")]
    InvalidVersion {
        /// The rejected input
        version: String,
    },

    /// Download failure.
    #[error("Failed to download '{url}': {message}")]
    Network {
        /// Requested URL
        url: String,
        /// Error message
        message: String,
    },

    /// Archive could not be opened or read.
    #[error("Failed to read archive '{path}': {message}")]
    Archive {
        /// Archive path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// A spawned build task ended without producing a result.
    #[error("Build task failed: {message}")]
    Task {
        /// Error message
        message: String,
    },

    /// Multiple errors occurred during processing.
    #[error("Multiple errors occurred during processing ({count} errors):{}", list_errors(.errors))]
    Multiple {
        /// Number of errors
        count: usize,
        /// Collection of errors
        errors: Vec<Error>,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates an IO error, mapping invalid-data failures to [`Error::InvalidUtf8`].
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::InvalidData {
            Self::InvalidUtf8 { path: path.into() }
        } else {
            Self::io(path, source)
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a template error.
    #[must_use]
    pub fn template(template: impl Into<String>, source: tera::Error) -> Self {
        use std::error::Error as _;

        // tera keeps the useful part of the message in the source chain
        let mut message = source.to_string();
        let mut cause = source.source();
        while let Some(inner) = cause {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            cause = inner.source();
        }

        Self::Template {
            template: template.into(),
            message,
        }
    }

    /// Creates an SVG parse error.
    #[must_use]
    pub fn svg(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Svg {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Creates a transform error.
    #[must_use]
    pub fn transform(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Creates an import rewrite error.
    #[must_use]
    pub fn import_rewrite(statement: impl Into<String>) -> Self {
        Self::ImportRewrite {
            statement: statement.into(),
        }
    }

    /// Creates an invalid version error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(url: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            message: source.to_string(),
        }
    }

    /// Creates an archive error.
    #[must_use]
    pub fn archive(path: impl Into<PathBuf>, source: impl std::fmt::Display) -> Self {
        Self::Archive {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a task failure error.
    #[must_use]
    pub fn task(source: impl std::fmt::Display) -> Self {
        Self::Task {
            message: source.to_string(),
        }
    }

    /// Combines errors, unwrapping the single-error case.
    ///
    /// Nested `Multiple` errors are flattened so every failure is listed once.
    #[must_use]
    pub fn multiple(errors: Vec<Self>) -> Self {
        let mut errors: Vec<Self> = errors
            .into_iter()
            .flat_map(|e| match e {
                Self::Multiple { errors, .. } => errors,
                other => vec![other],
            })
            .collect();
        if errors.len() == 1 {
            return errors.remove(0);
        }
        let count = errors.len();
        Self::Multiple { count, errors }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

fn list_errors(errors: &[Error]) -> String {
    errors.iter().map(|e| format!("\n  - {e}")).collect()
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("test message");
        assert!(err.is_config());
        assert!(err.to_string().contains("test message"));
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/tmp/test.svg", io_err);
        assert!(err.is_io());
        assert!(err.to_string().contains("/tmp/test.svg"));
    }

    #[test]
    fn test_read_error_maps_invalid_data() {
        let io_err = std::io::Error::new(std::io::ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        let err = Error::read("icon.svg", io_err);
        assert!(matches!(err, Error::InvalidUtf8 { .. }));
    }

    #[test]
    fn test_multiple_errors() {
        let errors = vec![Error::config("error 1"), Error::config("error 2")];
        let combined = Error::multiple(errors);
        let message = combined.to_string();
        assert!(message.contains("2 errors"));
        assert!(message.contains("\n  - Invalid configuration: error 1"));
        assert!(message.contains("\n  - Invalid configuration: error 2"));
    }

    #[test]
    fn test_multiple_flattens_nested() {
        let inner = Error::multiple(vec![Error::config("a"), Error::config("b")]);
        let combined = Error::multiple(vec![inner, Error::config("c")]);
        assert!(matches!(combined, Error::Multiple { count: 3, .. }));
    }

    #[test]
    fn test_multiple_collapses_single_error() {
        let combined = Error::multiple(vec![Error::config("only")]);
        assert!(combined.is_config());
    }

    #[test]
    fn test_import_rewrite_message() {
        let err = Error::import_rewrite("import Vue from 'vue'");
        assert!(err.to_string().contains("import Vue from 'vue'"));
    }

    #[test]
    fn test_serialization_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().contains("Serialization error"));
    }
}
