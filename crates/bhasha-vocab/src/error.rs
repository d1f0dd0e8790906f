//! Errors raised while loading or freezing a catalog configuration.

/// Catalog loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// The document parsed but breaks a catalog rule.
    #[error("invalid catalog: {0}")]
    Invalid(String),
}
