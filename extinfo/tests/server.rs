mod common;

use common::{CONNECTION, HEADER, NOW, OWN_CLIENT, RecordingProvider, formatter, full_snapshot};
use extinfo::clock::Clock;
use extinfo::config::InfoConfig;
use extinfo::formatter::InfoFormatter;
use extinfo::{DisplayMode, FormatError, Snapshot};
use extinfo_plugin::{
    Attribute, ConnectionVariable, EntityKind, ProviderError, ServerVariable, ValueKind,
};
use rstest::*;
use time::macros::{datetime, offset};
use time::{Duration, Month, OffsetDateTime, UtcOffset};

/// Central European time, with summer time from April through September.
struct CentralEuropeanClock(OffsetDateTime);

impl Clock for CentralEuropeanClock {
    fn now(&self) -> OffsetDateTime {
        self.0.to_offset(self.offset_at(self.0))
    }

    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        match instant.month() {
            Month::April
            | Month::May
            | Month::June
            | Month::July
            | Month::August
            | Month::September => offset!(+2),
            _ => offset!(+1),
        }
    }
}

#[fixture]
fn snapshot() -> Snapshot {
    full_snapshot()
}

#[rstest]
fn it_should_render_every_server_field(snapshot: Snapshot) {
    let report = formatter(false)
        .format(&snapshot, EntityKind::Server, 0, CONNECTION, DisplayMode::Compact)
        .expect("no report");

    let expected = [
        HEADER,
        "Ping: [color=darkorange]23[/color] ms",
        "Icon ID: [color=darkgrey]7[/color]",
        "Given IP: [color=gray]voice.example.com[/color]",
        "Resolved IP: [color=green]192.0.2.1[/color]",
        "Machine ID: [color=blue]1[/color]",
        "Virtualserver ID: [color=blue]3[/color]",
        "UID: [color=blue]gU8bRB3o0kcPA0pfGcTvHamtJJM=[/color]",
        "Created: Mon Jan  6 13:02:58 2025 (3661)",
        "Monthly Traffic: Up: [color=blue]100[/color] B | Down: [color=red]200[/color] B",
        "Total Traffic: Up: [color=darkblue]1000[/color] B | Down: [color=firebrick]2000[/color] B",
        "Loss Total: [color=magenta]0.5[/color]% | Keepalive: [color=magenta]0.1[/color]% | Control: [color=magenta]0.2[/color]% | Speech: [color=magenta]0.3[/color]%",
    ]
    .join("\n");

    assert_eq!(report.as_str(), expected);
}

#[rstest]
fn it_should_retrieve_server_variables_in_order(snapshot: Snapshot) {
    let provider = RecordingProvider::new(snapshot);

    formatter(false)
        .format(&provider, EntityKind::Server, 0, CONNECTION, DisplayMode::Compact)
        .expect("no report");

    assert_eq!(
        provider.fetched(),
        vec![
            Attribute::Server(ServerVariable::Id),
            Attribute::Server(ServerVariable::MachineId),
            Attribute::Server(ServerVariable::UniqueIdentifier),
            Attribute::Server(ServerVariable::Ip),
            Attribute::Connection(OWN_CLIENT, ConnectionVariable::ServerIp),
            Attribute::Server(ServerVariable::Created),
            Attribute::Server(ServerVariable::MonthBytesUploaded),
            Attribute::Server(ServerVariable::MonthBytesDownloaded),
            Attribute::Server(ServerVariable::TotalBytesUploaded),
            Attribute::Server(ServerVariable::TotalBytesDownloaded),
            Attribute::Server(ServerVariable::TotalPacketlossTotal),
            Attribute::Server(ServerVariable::TotalPacketlossKeepalive),
            Attribute::Server(ServerVariable::TotalPacketlossControl),
            Attribute::Server(ServerVariable::TotalPacketlossSpeech),
            Attribute::Server(ServerVariable::TotalPing),
            Attribute::Server(ServerVariable::IconId),
        ]
    );
}

#[rstest]
fn it_should_stop_at_the_first_missing_variable(mut snapshot: Snapshot) {
    snapshot.remove(ServerVariable::MachineId.into());
    let provider = RecordingProvider::new(snapshot);

    let result = formatter(false).format(
        &provider,
        EntityKind::Server,
        0,
        CONNECTION,
        DisplayMode::Compact,
    );

    assert!(matches!(
        result,
        Err(FormatError::Retrieve {
            attribute: Attribute::Server(ServerVariable::MachineId),
            source: ProviderError::Missing,
        })
    ));
    assert_eq!(
        provider.fetched(),
        vec![
            Attribute::Server(ServerVariable::Id),
            Attribute::Server(ServerVariable::MachineId),
        ]
    );
}

#[rstest]
fn it_should_fail_without_own_client_id(mut snapshot: Snapshot) {
    snapshot.own_client_id = None;
    let provider = RecordingProvider::new(snapshot);

    let result = formatter(false).format(
        &provider,
        EntityKind::Server,
        0,
        CONNECTION,
        DisplayMode::Compact,
    );

    assert!(matches!(
        result,
        Err(FormatError::OwnClientId(ProviderError::Missing))
    ));
    assert_eq!(provider.fetched().len(), 4);
}

#[rstest]
fn it_should_fail_when_the_resolved_ip_is_missing(mut snapshot: Snapshot) {
    snapshot.remove((OWN_CLIENT, ConnectionVariable::ServerIp).into());

    let result = formatter(false).format(
        &snapshot,
        EntityKind::Server,
        0,
        CONNECTION,
        DisplayMode::Compact,
    );

    assert!(result.is_err());
}

#[rstest]
fn it_should_reject_a_value_of_the_wrong_kind(snapshot: Snapshot) {
    let snapshot = snapshot.with(ServerVariable::Id, "three");

    let result = formatter(false).format(
        &snapshot,
        EntityKind::Server,
        0,
        CONNECTION,
        DisplayMode::Compact,
    );

    assert!(matches!(
        result,
        Err(FormatError::UnexpectedKind {
            expected: ValueKind::Integer,
            found: ValueKind::Text,
            ..
        })
    ));
}

#[rstest]
#[case(Duration::seconds(3661), "(3661)")]
#[case(Duration::ZERO, "(0)")]
#[case(Duration::days(1), "(86400)")]
fn it_should_render_server_age_in_seconds(
    snapshot: Snapshot,
    #[case] age: Duration,
    #[case] expected: &str,
) {
    let snapshot = snapshot.with(ServerVariable::Created, (NOW - age).unix_timestamp());

    let report = formatter(false)
        .format(&snapshot, EntityKind::Server, 0, CONNECTION, DisplayMode::Compact)
        .expect("no report");

    let created = report
        .as_str()
        .lines()
        .find(|line| line.starts_with("Created: "))
        .expect("no created line");

    assert!(created.ends_with(expected), "{created}");
}

#[rstest]
fn it_should_ignore_the_display_mode_for_servers(snapshot: Snapshot) {
    let compact = formatter(false)
        .format(&snapshot, EntityKind::Server, 0, CONNECTION, DisplayMode::Compact)
        .expect("no report");
    let with_metadata = formatter(false)
        .format(
            &snapshot,
            EntityKind::Server,
            0,
            CONNECTION,
            DisplayMode::WithMetadata,
        )
        .expect("no report");

    assert_eq!(compact, with_metadata);
}

#[rstest]
fn it_should_render_creation_time_in_the_offset_of_that_date(snapshot: Snapshot) {
    let snapshot = snapshot.with(
        ServerVariable::Created,
        datetime!(2025-01-06 12:00:00 UTC).unix_timestamp(),
    );
    let formatter = InfoFormatter::with_clock(
        &InfoConfig::default(),
        CentralEuropeanClock(datetime!(2025-07-01 10:00:00 UTC)),
    );

    let report = formatter
        .format(&snapshot, EntityKind::Server, 0, CONNECTION, DisplayMode::Compact)
        .expect("no report");

    assert!(report.as_str().starts_with("Tuesday, 01.07.2025 12:00:00\n"));
    assert!(
        report
            .as_str()
            .lines()
            .any(|line| line == "Created: Mon Jan  6 13:00:00 2025 (15199200)"),
        "{report}"
    );
}
