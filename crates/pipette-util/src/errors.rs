use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all pipette operations.
///
/// The resolution engine relies on a few variants as signals rather than
/// failures: [`PipetteError::PackageDirectoryMissing`] triggers deferred extras,
/// [`PipetteError::PackageAlreadyInstalled`] and
/// [`PipetteError::PackageInLocalList`] mean no action was needed.
#[derive(Debug, Error, Diagnostic)]
pub enum PipetteError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed requirement specifier, version or marker expression.
    #[error("syntax error: {input}")]
    #[diagnostic(help("Check the requirement syntax, e.g. `name[extra]>=1.0,<2.0`"))]
    Syntax { input: String },

    /// A marker name outside the supported environment markers.
    #[error("unexpected marker: {marker}")]
    UnexpectedMarker { marker: String },

    /// A comparison or logical operator that cannot be applied.
    #[error("unexpected operator: {operator}")]
    UnexpectedOperator { operator: String },

    /// The index has no release matching the conditions and this interpreter.
    #[error("no suitable version")]
    #[diagnostic(help("The package may not publish wheels for this platform or Python version"))]
    NoSuitableVersion { name: String },

    /// No `.dist-info` directory exists for the package in the store.
    #[error("package metadata directory not found")]
    PackageDirectoryMissing { name: String },

    /// The best available version is already installed.
    #[error("package already installed")]
    PackageAlreadyInstalled { name: String },

    /// The installed version already satisfies every condition seen this session.
    #[error("package version compared and already installed")]
    PackageInLocalList { name: String },

    /// A requested extra is not declared by the package.
    #[error("extra not found: {name}")]
    MissingExtra { name: String },

    /// Network request or download failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// A METADATA, RECORD or wheel archive could not be understood.
    #[error("Metadata error: {message}")]
    Metadata { message: String },

    /// Invalid configuration or interpreter discovery failure.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.pipette/config.toml and the --python / --target flags"))]
    Config { message: String },

    /// A downloaded file did not match its published digest.
    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    Checksum {
        file: String,
        expected: String,
        actual: String,
    },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

impl PipetteError {
    /// Shorthand for [`PipetteError::Syntax`].
    pub fn syntax(input: impl Into<String>) -> Self {
        Self::Syntax {
            input: input.into(),
        }
    }

    /// True for outcomes that mean "nothing to do" rather than failure.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            Self::PackageAlreadyInstalled { .. } | Self::PackageInLocalList { .. }
        )
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type PipetteResult<T> = miette::Result<T>;
