use std::fmt;

use extinfo_plugin::{ClientId, ClientVariable, ConnectionVariable, DataProvider};
use tracing::debug;

use super::Fetcher;
use crate::consts::UNKNOWN_PLACEHOLDER;
use crate::{DisplayMode, FormatError};

/// A best-effort value that renders a placeholder when the host could not provide it.
#[derive(Debug, Clone, PartialEq)]
pub enum Soft<T> {
    /// The value the host returned.
    Known(T),
    /// The host could not provide the value.
    Unknown,
}

impl<T> Soft<T> {
    /// Converts a retrieval result, logging why the value is missing.
    fn from_result(field: &'static str, result: Result<T, FormatError>) -> Self {
        match result {
            Ok(value) => Self::Known(value),
            Err(err) => {
                debug!(%field, %err, "connection statistic unavailable");

                Self::Unknown
            }
        }
    }

    /// Whether the host returned a value.
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl<T: fmt::Display> fmt::Display for Soft<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // forward the formatter so precision flags apply to the value
            Self::Known(value) => value.fmt(f),
            Self::Unknown => f.write_str(UNKNOWN_PLACEHOLDER),
        }
    }
}

/// Everything shown for a client.
#[derive(Debug)]
pub struct ClientInfo<S> {
    /// Raw client type.
    pub client_type: i64,
    /// Two letter country code.
    pub country: S,
    /// Phonetic nickname.
    pub nickname_phonetic: S,
    /// Unread private messages.
    pub unread_messages: i64,
    /// Icon id of the client.
    pub icon_id: u64,
    /// Talk power.
    pub talk_power: i64,
    /// Channel group id.
    pub channel_group_id: u64,
    /// Comma separated server group ids.
    pub server_groups: S,
    /// View power a server query needs to see this client.
    pub needed_serverquery_view_power: i64,
    /// Badge list.
    pub badges: S,
    /// Bytes uploaded this month.
    pub month_bytes_uploaded: u64,
    /// Bytes downloaded this month.
    pub month_bytes_downloaded: u64,
    /// Bytes uploaded in total.
    pub total_bytes_uploaded: u64,
    /// Bytes downloaded in total.
    pub total_bytes_downloaded: u64,
    /// Client version string.
    pub version: S,
    /// Avatar hash.
    pub flag_avatar: S,
    /// Address of the client.
    pub ip: Soft<S>,
    /// Round trip time in milliseconds.
    pub ping: Soft<u64>,
    /// Round trip time deviation in milliseconds.
    pub ping_deviation: Soft<f64>,
    /// Idle time in milliseconds.
    pub idle_time: Soft<u64>,
    /// Client meta data, only in [`DisplayMode::WithMetadata`].
    pub meta_data: Option<S>,
}

impl<S> ClientInfo<S> {
    /// Returns the human readable client type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self.client_type {
            0 => "Client",
            1 => "Query",
            _ => "Unknown",
        }
    }
}

/// Retrieves the client variables in their fixed order.
pub(super) fn retrieve<P: DataProvider>(
    fetcher: &Fetcher<'_, P>,
    client: ClientId,
    mode: DisplayMode,
) -> Result<ClientInfo<P::Text>, FormatError> {
    if let Err(err) = fetcher
        .provider()
        .request_client_variables(fetcher.connection(), client)
    {
        debug!(%client, %err, "could not request client variables");
    }

    let client_type = fetcher.int((client, ClientVariable::Type))?;
    let country = fetcher.text((client, ClientVariable::Country))?;
    let nickname_phonetic = fetcher.text((client, ClientVariable::NicknamePhonetic))?;
    let unread_messages = fetcher.int((client, ClientVariable::UnreadMessages))?;
    let icon_id = fetcher.uint((client, ClientVariable::IconId))?;
    let talk_power = fetcher.int((client, ClientVariable::TalkPower))?;
    let channel_group_id = fetcher.uint((client, ClientVariable::ChannelGroupId))?;
    let server_groups = fetcher.text((client, ClientVariable::Servergroups))?;
    let needed_serverquery_view_power =
        fetcher.int((client, ClientVariable::NeededServerqueryViewPower))?;
    let badges = fetcher.text((client, ClientVariable::Badges))?;
    let month_bytes_uploaded = fetcher.uint((client, ClientVariable::MonthBytesUploaded))?;
    let month_bytes_downloaded = fetcher.uint((client, ClientVariable::MonthBytesDownloaded))?;
    let total_bytes_uploaded = fetcher.uint((client, ClientVariable::TotalBytesUploaded))?;
    let total_bytes_downloaded = fetcher.uint((client, ClientVariable::TotalBytesDownloaded))?;
    let version = fetcher.text((client, ClientVariable::Version))?;
    let flag_avatar = fetcher.text((client, ClientVariable::FlagAvatar))?;

    let ip = Soft::from_result(
        "ip",
        fetcher.text((client, ConnectionVariable::ClientIp)),
    );
    let ping = Soft::from_result("ping", fetcher.uint((client, ConnectionVariable::Ping)));
    let ping_deviation = Soft::from_result(
        "ping_deviation",
        fetcher.double((client, ConnectionVariable::PingDeviation)),
    );
    let idle_time = Soft::from_result(
        "idle_time",
        fetcher.uint((client, ConnectionVariable::IdleTime)),
    );

    let meta_data = if mode.shows_metadata() {
        Some(fetcher.text((client, ClientVariable::MetaData))?)
    } else {
        None
    };

    Ok(ClientInfo {
        client_type,
        country,
        nickname_phonetic,
        unread_messages,
        icon_id,
        talk_power,
        channel_group_id,
        server_groups,
        needed_serverquery_view_power,
        badges,
        month_bytes_uploaded,
        month_bytes_downloaded,
        total_bytes_uploaded,
        total_bytes_downloaded,
        version,
        flag_avatar,
        ip,
        ping,
        ping_deviation,
        idle_time,
        meta_data,
    })
}

impl<S: fmt::Display> fmt::Display for ClientInfo<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Type: [COLOR=#1a2643]{}[/COLOR] from [color=darkgreen]{}[/color]",
            self.type_name(),
            self.country
        )?;
        writeln!(
            f,
            "Phonetic Name: [color=darkblue]{}[/color]",
            self.nickname_phonetic
        )?;
        writeln!(f, "Badges: {}", self.badges)?;
        writeln!(f, "Icon ID: [color=darkgrey]{}[/color]", self.icon_id)?;
        writeln!(
            f,
            "Unread Messages: [color=darkblue][b]{}[/b][/color]",
            self.unread_messages
        )?;
        writeln!(f, "Talk Power: [color=darkgreen]{}[/color]", self.talk_power)?;
        writeln!(
            f,
            "Needed ServerQuery View Power: [color=blue]{}[/color]",
            self.needed_serverquery_view_power
        )?;
        writeln!(
            f,
            "Server Group IDs: [color=firebrick]{}[/color]",
            self.server_groups
        )?;
        writeln!(
            f,
            "Channel Group ID: [color=darkorange]{}[/color]",
            self.channel_group_id
        )?;
        writeln!(
            f,
            "Monthly Traffic: Up: [color=blue]{}[/color] B | Down: [color=red]{}[/color] B",
            self.month_bytes_uploaded, self.month_bytes_downloaded
        )?;
        writeln!(
            f,
            "Total Traffic: Up: [color=darkblue]{}[/color] B | Down: [color=firebrick]{}[/color] B",
            self.total_bytes_uploaded, self.total_bytes_downloaded
        )?;
        writeln!(f, "Version: [color=darkgreen]{}[/color]", self.version)?;
        writeln!(f, "Avatar: [color=blue]{}[/color]", self.flag_avatar)?;
        writeln!(f, "IP: [color=lightgreen]{}[/color]", self.ip)?;
        writeln!(
            f,
            "Ping: [color=darkorange]{}[/color] ms | Deviation: [color=darkorange]{:.2}[/color] ms",
            self.ping, self.ping_deviation
        )?;
        write!(f, "Idle Time: [color=darkgrey]{}[/color] ms", self.idle_time)?;

        if let Some(meta_data) = &self.meta_data {
            write!(f, "\nMeta Data: [color=gray]{meta_data}[/color]")?;
        }

        Ok(())
    }
}
