//! Error types

use extinfo_plugin::{Attribute, ProviderError, ValueKind};
use miette::Diagnostic;
use thiserror::Error;

/// Application errors for configuration, tracing and snapshot loading.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The configuration could not be read or merged.
    #[error("Could not load configuration")]
    #[diagnostic(code(extinfo::config))]
    Config(#[source] Box<figment::Error>),
    /// The configuration was read but holds an invalid value.
    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(extinfo::config_value))]
    InvalidConfig(String),
    /// The tracing subscriber could not be installed.
    #[error("Could not initialize tracing")]
    #[diagnostic(code(extinfo::tracing))]
    Tracing(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// A snapshot file could not be read.
    #[error("Could not read snapshot file `{path}`")]
    #[diagnostic(code(extinfo::snapshot_read))]
    ReadSnapshot {
        /// Path of the snapshot file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A snapshot file is not valid.
    #[error("Could not parse snapshot")]
    #[diagnostic(code(extinfo::snapshot))]
    Snapshot(#[source] Box<figment::Error>),
    /// No report could be produced.
    #[error("No report produced")]
    #[diagnostic(code(extinfo::no_report))]
    NoReport(#[from] FormatError),
}

/// Reasons a report could not be produced.
#[derive(Error, Debug)]
pub enum FormatError {
    /// A mandatory attribute could not be retrieved.
    #[error("could not retrieve {attribute}")]
    Retrieve {
        /// The attribute that failed.
        attribute: Attribute,
        /// What the provider reported.
        #[source]
        source: ProviderError,
    },
    /// Our own client id could not be resolved.
    #[error("could not resolve own client id")]
    OwnClientId(#[source] ProviderError),
    /// The provider returned a value of the wrong kind.
    #[error("{attribute} returned a {found:?} value, expected {expected:?}")]
    UnexpectedKind {
        /// The attribute that was retrieved.
        attribute: Attribute,
        /// The kind the attribute declares.
        expected: ValueKind,
        /// The kind the provider returned.
        found: ValueKind,
    },
    /// The entity id does not fit a client id.
    #[error("client id {0} is out of range")]
    ClientIdOutOfRange(u64),
    /// A timestamp could not be formatted.
    #[error("could not format time")]
    Time(#[from] time::error::Format),
}
