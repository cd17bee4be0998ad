use std::fmt;

use extinfo_plugin::{ConnectionVariable, DataProvider, ServerVariable};
use time::OffsetDateTime;

use super::Fetcher;
use crate::FormatError;
use crate::clock::{self, Clock};

/// Everything shown for a virtual server.
#[derive(Debug)]
pub struct ServerInfo<S> {
    /// The virtual server id.
    pub id: i64,
    /// Id of the machine hosting the server.
    pub machine_id: S,
    /// The server's unique identifier.
    pub unique_identifier: S,
    /// The advertised address.
    pub ip: S,
    /// Server address as resolved by our own connection.
    pub resolved_ip: S,
    /// Creation time, `ctime` formatted.
    pub created: String,
    /// Seconds since creation.
    pub age: i64,
    /// Bytes uploaded this month.
    pub month_bytes_uploaded: u64,
    /// Bytes downloaded this month.
    pub month_bytes_downloaded: u64,
    /// Bytes uploaded in total.
    pub total_bytes_uploaded: u64,
    /// Bytes downloaded in total.
    pub total_bytes_downloaded: u64,
    /// Overall packet loss in percent.
    pub packetloss_total: S,
    /// Keepalive packet loss in percent.
    pub packetloss_keepalive: S,
    /// Control packet loss in percent.
    pub packetloss_control: S,
    /// Speech packet loss in percent.
    pub packetloss_speech: S,
    /// Average ping in milliseconds.
    pub ping: S,
    /// Icon id of the server.
    pub icon_id: u64,
}

/// Retrieves the server variables in their fixed order.
pub(super) fn retrieve<P: DataProvider, C: Clock>(
    fetcher: &Fetcher<'_, P>,
    clock: &C,
    now: OffsetDateTime,
) -> Result<ServerInfo<P::Text>, FormatError> {
    let id = fetcher.int(ServerVariable::Id)?;
    let machine_id = fetcher.text(ServerVariable::MachineId)?;
    let unique_identifier = fetcher.text(ServerVariable::UniqueIdentifier)?;
    let ip = fetcher.text(ServerVariable::Ip)?;
    // the resolved address is a statistic of our own connection
    let own_id = fetcher.own_client_id()?;
    let resolved_ip = fetcher.text((own_id, ConnectionVariable::ServerIp))?;
    let created_at = fetcher.timestamp(ServerVariable::Created)?;
    let created = clock::ctime(created_at, clock.offset_at(created_at))?;
    let age = clock::age_seconds(created_at, now);

    Ok(ServerInfo {
        id,
        machine_id,
        unique_identifier,
        ip,
        resolved_ip,
        created,
        age,
        month_bytes_uploaded: fetcher.uint(ServerVariable::MonthBytesUploaded)?,
        month_bytes_downloaded: fetcher.uint(ServerVariable::MonthBytesDownloaded)?,
        total_bytes_uploaded: fetcher.uint(ServerVariable::TotalBytesUploaded)?,
        total_bytes_downloaded: fetcher.uint(ServerVariable::TotalBytesDownloaded)?,
        packetloss_total: fetcher.text(ServerVariable::TotalPacketlossTotal)?,
        packetloss_keepalive: fetcher.text(ServerVariable::TotalPacketlossKeepalive)?,
        packetloss_control: fetcher.text(ServerVariable::TotalPacketlossControl)?,
        packetloss_speech: fetcher.text(ServerVariable::TotalPacketlossSpeech)?,
        ping: fetcher.text(ServerVariable::TotalPing)?,
        icon_id: fetcher.uint(ServerVariable::IconId)?,
    })
}

impl<S: fmt::Display> fmt::Display for ServerInfo<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ping: [color=darkorange]{}[/color] ms", self.ping)?;
        writeln!(f, "Icon ID: [color=darkgrey]{}[/color]", self.icon_id)?;
        writeln!(f, "Given IP: [color=gray]{}[/color]", self.ip)?;
        writeln!(f, "Resolved IP: [color=green]{}[/color]", self.resolved_ip)?;
        writeln!(f, "Machine ID: [color=blue]{}[/color]", self.machine_id)?;
        writeln!(f, "Virtualserver ID: [color=blue]{}[/color]", self.id)?;
        writeln!(f, "UID: [color=blue]{}[/color]", self.unique_identifier)?;
        writeln!(f, "Created: {} ({})", self.created, self.age)?;
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
        write!(
            f,
            "Loss Total: [color=magenta]{}[/color]% | Keepalive: [color=magenta]{}[/color]% | Control: [color=magenta]{}[/color]% | Speech: [color=magenta]{}[/color]%",
            self.packetloss_total,
            self.packetloss_keepalive,
            self.packetloss_control,
            self.packetloss_speech
        )
    }
}
