//! Renders info panel reports from a snapshot file, without a running host.

use std::path::PathBuf;

use argh::FromArgs;
use extinfo::{Config, DisplayMode, Error, InfoFormatter, Snapshot};
use extinfo_plugin::{ConnectionId, EntityKind};
use tracing::trace;

/// Renders the info panel report for an entity of a snapshot
#[derive(Debug, FromArgs)]
struct Opts {
    /// path to the snapshot file
    #[argh(option)]
    snapshot: PathBuf,
    /// the kind of entity to render: server, channel or client
    #[argh(option, from_str_fn(entity_kind_from_str), default = "EntityKind::Server")]
    kind: EntityKind,
    /// id of the channel or client
    #[argh(option, default = "0")]
    id: u64,
    /// include the client meta data
    #[argh(switch)]
    with_metadata: bool,
    /// path to the config file
    #[argh(option)]
    config: Option<PathBuf>,
}

fn entity_kind_from_str(value: &str) -> Result<EntityKind, String> {
    match value {
        "server" => Ok(EntityKind::Server),
        "channel" => Ok(EntityKind::Channel),
        "client" => Ok(EntityKind::Client),
        other => Err(format!("unknown entity kind `{other}`")),
    }
}

fn main() -> miette::Result<()> {
    let opts: Opts = argh::from_env();

    let config = Config::load(opts.config.as_deref())?;
    extinfo::tracing::try_init(&config.tracing)?;

    trace!(?opts, "rendering preview");

    let snapshot = Snapshot::load(&opts.snapshot)?;
    let mode = if opts.with_metadata {
        DisplayMode::WithMetadata
    } else {
        DisplayMode::Compact
    };

    let report = InfoFormatter::new(&config.info)
        .format(&snapshot, opts.kind, opts.id, ConnectionId(1), mode)
        .map_err(Error::from)?;

    println!("{report}");

    Ok(())
}
