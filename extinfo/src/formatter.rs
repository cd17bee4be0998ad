//! Info panel report rendering.
//!
//! Each entity kind has a fixed, ordered list of variables. Retrieval is fail-fast: the first
//! mandatory variable the provider cannot deliver aborts the report, and nothing after it is
//! requested. The only exception are the connection statistics of a client, which render a
//! placeholder instead.

use std::fmt;

use extinfo_plugin::{ChannelId, ClientId, ConnectionId, DataProvider, EntityKind};
use tracing::debug;

use crate::clock::{self, Clock, SystemClock};
use crate::config::InfoConfig;
use crate::utils::Truncatable;
use crate::{DisplayMode, FormatError};

mod channel;
mod client;
mod fetch;
mod server;

pub use channel::{ChannelInfo, ChannelSecrets};
pub use client::{ClientInfo, Soft};
pub use server::ServerInfo;

use fetch::Fetcher;

/// A rendered report, ready to be handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report(String);

impl Report {
    /// Wraps `text`, truncating it so that it fits in `max_len` bytes including a C string
    /// terminator.
    ///
    /// Truncation drops whole lines so no markup tag is left open. A text without a line break
    /// inside the limit is cut on a char boundary instead.
    fn new(text: String, max_len: usize) -> Self {
        let limit = max_len.saturating_sub(1);

        if text.len() <= limit {
            return Self(text);
        }

        debug!(len = text.len(), %limit, "truncating report");

        let cut = text.truncate_to_bytes(limit);

        if text.as_bytes().get(cut.len()) == Some(&b'\n') {
            return Self(cut.to_owned());
        }

        let cut = cut.rfind('\n').map_or(cut, |end| &cut[..end]);

        Self(cut.to_owned())
    }

    /// Returns the report text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the report text, consuming the report.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders info panel reports from provider data.
#[derive(Debug, Clone)]
pub struct InfoFormatter<C = SystemClock> {
    /// Whether channel reports include the security salt and password.
    developer_fields: bool,
    /// Report ceiling in bytes, including the C string terminator.
    max_len: usize,
    /// Source of the current time.
    clock: C,
}

impl InfoFormatter<SystemClock> {
    /// Creates a formatter that uses the system clock.
    #[must_use]
    pub fn new(config: &InfoConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> InfoFormatter<C> {
    /// Creates a formatter with a custom clock.
    #[must_use]
    pub fn with_clock(config: &InfoConfig, clock: C) -> Self {
        Self {
            developer_fields: config.developer_fields,
            max_len: config.max_report_len,
            clock,
        }
    }

    /// Whether channel reports include the developer-only fields.
    #[must_use]
    pub const fn developer_fields(&self) -> bool {
        self.developer_fields
    }

    /// Renders the report for one entity.
    ///
    /// Every text value retrieved from the provider is released before this returns, whether or
    /// not a report was produced.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when no report can be produced, most commonly because a mandatory
    /// variable could not be retrieved.
    pub fn format<P: DataProvider>(
        &self,
        provider: &P,
        kind: EntityKind,
        entity_id: u64,
        connection: ConnectionId,
        mode: DisplayMode,
    ) -> Result<Report, FormatError> {
        let now = self.clock.now();
        let fetcher = Fetcher::new(provider, connection);

        let body = match kind {
            EntityKind::Server => server::retrieve(&fetcher, &self.clock, now)?.to_string(),
            EntityKind::Channel => {
                let channel = ChannelId(entity_id);

                channel::retrieve(&fetcher, channel, self.developer_fields)?.to_string()
            }
            EntityKind::Client => {
                let client = u16::try_from(entity_id)
                    .map(ClientId)
                    .map_err(|_| FormatError::ClientIdOutOfRange(entity_id))?;

                client::retrieve(&fetcher, client, mode)?.to_string()
            }
        };

        let header = clock::header(now)?;

        Ok(Report::new(format!("{header}\n{body}"), self.max_len))
    }
}
