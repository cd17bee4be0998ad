#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use extinfo::Snapshot;
use extinfo::clock::FixedClock;
use extinfo::config::InfoConfig;
use extinfo::formatter::InfoFormatter;
use extinfo_plugin::{
    Attribute, AttributeValue, ChannelId, ChannelVariable, ClientId, ClientVariable, ConnectionId,
    ConnectionVariable, DataProvider, ProviderError, ServerVariable,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

pub const CONNECTION: ConnectionId = ConnectionId(1);
pub const OWN_CLIENT: ClientId = ClientId(1);
pub const CLIENT: ClientId = ClientId(5);
pub const CHANNEL: ChannelId = ChannelId(12);

/// The instant every test report is rendered at.
pub const NOW: OffsetDateTime = datetime!(2025-01-06 14:03:59 UTC);

pub const HEADER: &str = "Monday, 06.01.2025 14:03:59";

/// Returns a formatter with a fixed clock.
pub fn formatter(developer_fields: bool) -> InfoFormatter<FixedClock> {
    let config = InfoConfig {
        developer_fields,
        ..InfoConfig::default()
    };

    InfoFormatter::with_clock(&config, FixedClock(NOW))
}

/// A snapshot with every variable of the server, channel 12 and client 5.
pub fn full_snapshot() -> Snapshot {
    let created = (NOW - Duration::seconds(3661)).unix_timestamp();

    Snapshot::new()
        .with_own_client_id(OWN_CLIENT.0)
        .with(ServerVariable::Id, 3_i64)
        .with(ServerVariable::MachineId, "1")
        .with(ServerVariable::UniqueIdentifier, "gU8bRB3o0kcPA0pfGcTvHamtJJM=")
        .with(ServerVariable::Ip, "voice.example.com")
        .with((OWN_CLIENT, ConnectionVariable::ServerIp), "192.0.2.1")
        .with(ServerVariable::Created, created)
        .with(ServerVariable::MonthBytesUploaded, 100_i64)
        .with(ServerVariable::MonthBytesDownloaded, 200_i64)
        .with(ServerVariable::TotalBytesUploaded, 1000_i64)
        .with(ServerVariable::TotalBytesDownloaded, 2000_i64)
        .with(ServerVariable::TotalPacketlossTotal, "0.5")
        .with(ServerVariable::TotalPacketlossKeepalive, "0.1")
        .with(ServerVariable::TotalPacketlossControl, "0.2")
        .with(ServerVariable::TotalPacketlossSpeech, "0.3")
        .with(ServerVariable::TotalPing, "23")
        .with(ServerVariable::IconId, 7_i64)
        .with((CHANNEL, ChannelVariable::NamePhonetic), "lobby")
        .with((CHANNEL, ChannelVariable::IconId), 0_i64)
        .with((CHANNEL, ChannelVariable::ForcedSilence), 0_i64)
        .with((CHANNEL, ChannelVariable::FlagPrivate), 1_i64)
        .with((CHANNEL, ChannelVariable::CodecLatencyFactor), 1_i64)
        .with((CHANNEL, ChannelVariable::SecuritySalt), "pepper")
        .with((CHANNEL, ChannelVariable::Password), "hunter2")
        .with((CLIENT, ClientVariable::Type), 0_i64)
        .with((CLIENT, ClientVariable::Country), "DK")
        .with((CLIENT, ClientVariable::NicknamePhonetic), "bob")
        .with((CLIENT, ClientVariable::UnreadMessages), 2_i64)
        .with((CLIENT, ClientVariable::IconId), 0_i64)
        .with((CLIENT, ClientVariable::TalkPower), 50_i64)
        .with((CLIENT, ClientVariable::ChannelGroupId), 8_i64)
        .with((CLIENT, ClientVariable::Servergroups), "6,9")
        .with((CLIENT, ClientVariable::NeededServerqueryViewPower), 75_i64)
        .with((CLIENT, ClientVariable::Badges), "overwolf=0")
        .with((CLIENT, ClientVariable::MonthBytesUploaded), 10_i64)
        .with((CLIENT, ClientVariable::MonthBytesDownloaded), 20_i64)
        .with((CLIENT, ClientVariable::TotalBytesUploaded), 30_i64)
        .with((CLIENT, ClientVariable::TotalBytesDownloaded), 40_i64)
        .with((CLIENT, ClientVariable::Version), "3.6.2 [Build: 1695203293]")
        .with((CLIENT, ClientVariable::FlagAvatar), "d41d8cd9")
        .with((CLIENT, ClientVariable::MetaData), "{\"away\":false}")
        .with((CLIENT, ConnectionVariable::ClientIp), "198.51.100.7")
        .with((CLIENT, ConnectionVariable::Ping), 23_i64)
        .with((CLIENT, ConnectionVariable::PingDeviation), 1.5_f64)
        .with((CLIENT, ConnectionVariable::IdleTime), 1200_i64)
}

/// Returns the lines of a report, without the header.
pub fn body_lines(report: &str) -> Vec<&str> {
    let mut lines = report.lines();

    assert_eq!(lines.next(), Some(HEADER));

    lines.collect()
}

/// A provider that remembers every attribute it was asked for.
pub struct RecordingProvider {
    pub snapshot: Snapshot,
    pub fetched: RefCell<Vec<Attribute>>,
    pub refresh_fails: bool,
}

impl RecordingProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            fetched: RefCell::new(Vec::new()),
            refresh_fails: false,
        }
    }

    pub fn fetched(&self) -> Vec<Attribute> {
        self.fetched.borrow().clone()
    }
}

impl DataProvider for RecordingProvider {
    type Text = String;

    fn own_client_id(&self, connection: ConnectionId) -> Result<ClientId, ProviderError> {
        self.snapshot.own_client_id(connection)
    }

    fn fetch(
        &self,
        connection: ConnectionId,
        attribute: Attribute,
    ) -> Result<AttributeValue<String>, ProviderError> {
        self.fetched.borrow_mut().push(attribute);
        self.snapshot.fetch(connection, attribute)
    }

    fn request_client_variables(
        &self,
        _connection: ConnectionId,
        _client: ClientId,
    ) -> Result<(), ProviderError> {
        if self.refresh_fails {
            Err(ProviderError::Code(0x0200))
        } else {
            Ok(())
        }
    }
}

/// Text that counts how often it was released.
pub struct CountedText {
    value: String,
    released: Rc<Cell<usize>>,
}

impl fmt::Display for CountedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Drop for CountedText {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

/// A provider that counts the texts it hands out and the texts released again.
pub struct CountingProvider {
    pub snapshot: Snapshot,
    pub handed_out: Cell<usize>,
    pub released: Rc<Cell<usize>>,
}

impl CountingProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            handed_out: Cell::new(0),
            released: Rc::new(Cell::new(0)),
        }
    }
}

impl DataProvider for CountingProvider {
    type Text = CountedText;

    fn own_client_id(&self, connection: ConnectionId) -> Result<ClientId, ProviderError> {
        self.snapshot.own_client_id(connection)
    }

    fn fetch(
        &self,
        connection: ConnectionId,
        attribute: Attribute,
    ) -> Result<AttributeValue<CountedText>, ProviderError> {
        let value = match self.snapshot.fetch(connection, attribute)? {
            AttributeValue::Text(value) => {
                self.handed_out.set(self.handed_out.get() + 1);

                AttributeValue::Text(CountedText {
                    value,
                    released: Rc::clone(&self.released),
                })
            }
            AttributeValue::Integer(value) => AttributeValue::Integer(value),
            AttributeValue::UnsignedInteger(value) => AttributeValue::UnsignedInteger(value),
            AttributeValue::Double(value) => AttributeValue::Double(value),
            AttributeValue::Timestamp(value) => AttributeValue::Timestamp(value),
        };

        Ok(value)
    }
}
