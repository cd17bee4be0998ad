//! The data provider interface exposed by the host.
//!
//! Every value shown in the info panel is read through a [`DataProvider`]. Variables are
//! identified by the same numeric ids the host client library uses, and each one declares the
//! [`ValueKind`] the host hands back for it.

use std::fmt;

use time::OffsetDateTime;

use crate::ProviderError;

/// Identifies one server connection inside the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

/// Identifies a channel on a server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

/// Identifies a client on a server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u16);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The representation the host uses for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Signed integer.
    Integer,
    /// Unsigned 64-bit integer.
    UnsignedInteger,
    /// Floating point number.
    Double,
    /// Host allocated string.
    Text,
    /// Unix timestamp in seconds.
    Timestamp,
}

/// A value retrieved from the provider.
///
/// `S` is the provider's owned text type. Dropping it hands the string back to the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue<S> {
    /// A signed integer.
    Integer(i64),
    /// An unsigned integer.
    UnsignedInteger(u64),
    /// A floating point number.
    Double(f64),
    /// A string owned by the provider.
    Text(S),
    /// A point in time.
    Timestamp(OffsetDateTime),
}

impl<S> AttributeValue<S> {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::UnsignedInteger(_) => ValueKind::UnsignedInteger,
            Self::Double(_) => ValueKind::Double,
            Self::Text(_) => ValueKind::Text,
            Self::Timestamp(_) => ValueKind::Timestamp,
        }
    }
}

/// Declares a set of host variables together with their id, name and value kind.
macro_rules! variables {
    (
        $(#[$meta:meta])*
        $enum:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $id:literal, $kind:ident, $name:literal;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $enum {
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $enum {
            /// Every known variable.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Returns the id the host uses for this variable.
            #[must_use]
            pub const fn id(self) -> usize {
                match self {
                    $(Self::$variant => $id,)*
                }
            }

            /// Returns the kind of value the host returns for this variable.
            #[must_use]
            pub const fn kind(self) -> ValueKind {
                match self {
                    $(Self::$variant => ValueKind::$kind,)*
                }
            }

            /// Returns the snake_case name of this variable.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Looks up a variable by its snake_case name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|variable| variable.name() == name)
            }
        }

        impl fmt::Display for $enum {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

variables! {
    /// Virtual server variables.
    ServerVariable {
        /// Unique identifier of the virtual server.
        UniqueIdentifier = 0, Text, "unique_identifier";
        /// Creation time of the virtual server.
        Created = 9, Timestamp, "created";
        /// Numeric id of the virtual server.
        Id = 38, Integer, "id";
        /// Bytes downloaded this month.
        MonthBytesDownloaded = 50, UnsignedInteger, "month_bytes_downloaded";
        /// Bytes uploaded this month.
        MonthBytesUploaded = 51, UnsignedInteger, "month_bytes_uploaded";
        /// Bytes downloaded in total.
        TotalBytesDownloaded = 52, UnsignedInteger, "total_bytes_downloaded";
        /// Bytes uploaded in total.
        TotalBytesUploaded = 53, UnsignedInteger, "total_bytes_uploaded";
        /// Id of the machine hosting the virtual server.
        MachineId = 56, Text, "machine_id";
        /// Icon id of the virtual server.
        IconId = 66, UnsignedInteger, "icon_id";
        /// Speech packet loss in percent.
        TotalPacketlossSpeech = 68, Text, "total_packetloss_speech";
        /// Keepalive packet loss in percent.
        TotalPacketlossKeepalive = 69, Text, "total_packetloss_keepalive";
        /// Control packet loss in percent.
        TotalPacketlossControl = 70, Text, "total_packetloss_control";
        /// Overall packet loss in percent.
        TotalPacketlossTotal = 71, Text, "total_packetloss_total";
        /// Average ping of all clients.
        TotalPing = 72, Text, "total_ping";
        /// Advertised address of the virtual server.
        Ip = 73, Text, "ip";
    }
}

variables! {
    /// Channel variables.
    ChannelVariable {
        /// Channel password.
        Password = 3, Text, "password";
        /// Codec latency factor.
        CodecLatencyFactor = 13, Integer, "codec_latency_factor";
        /// Salt used for channel security hashes.
        SecuritySalt = 15, Text, "security_salt";
        /// Whether the channel is forced silent.
        ForcedSilence = 29, UnsignedInteger, "forced_silence";
        /// Phonetic channel name.
        NamePhonetic = 30, Text, "name_phonetic";
        /// Icon id of the channel.
        IconId = 31, UnsignedInteger, "icon_id";
        /// Whether the channel is private.
        FlagPrivate = 32, UnsignedInteger, "flag_private";
    }
}

variables! {
    /// Client variables.
    ClientVariable {
        /// Client version string.
        Version = 2, Text, "version";
        /// Free-form meta data set by the client.
        MetaData = 15, Text, "meta_data";
        /// Channel group of the client.
        ChannelGroupId = 34, UnsignedInteger, "channel_group_id";
        /// Comma separated server group ids.
        Servergroups = 35, Text, "servergroups";
        /// Client type, `0` for regular clients and `1` for query clients.
        Type = 41, Integer, "type";
        /// Avatar hash, empty without an avatar.
        FlagAvatar = 42, Text, "flag_avatar";
        /// Talk power of the client.
        TalkPower = 43, Integer, "talk_power";
        /// Bytes uploaded this month.
        MonthBytesUploaded = 48, UnsignedInteger, "month_bytes_uploaded";
        /// Bytes downloaded this month.
        MonthBytesDownloaded = 49, UnsignedInteger, "month_bytes_downloaded";
        /// Bytes uploaded in total.
        TotalBytesUploaded = 50, UnsignedInteger, "total_bytes_uploaded";
        /// Bytes downloaded in total.
        TotalBytesDownloaded = 51, UnsignedInteger, "total_bytes_downloaded";
        /// Unread private messages.
        UnreadMessages = 53, Integer, "unread_messages";
        /// Phonetic nickname.
        NicknamePhonetic = 54, Text, "nickname_phonetic";
        /// View power a server query needs to see this client.
        NeededServerqueryViewPower = 55, Integer, "needed_serverquery_view_power";
        /// Icon id of the client.
        IconId = 57, UnsignedInteger, "icon_id";
        /// Two letter country code.
        Country = 59, Text, "country";
        /// Badge list.
        Badges = 61, Text, "badges";
    }
}

variables! {
    /// Connection statistics of a client.
    ConnectionVariable {
        /// Round trip time in milliseconds.
        Ping = 0, UnsignedInteger, "ping";
        /// Standard deviation of the round trip time.
        PingDeviation = 1, Double, "ping_deviation";
        /// Idle time in milliseconds.
        IdleTime = 3, UnsignedInteger, "idle_time";
        /// Address of the client.
        ClientIp = 4, Text, "client_ip";
        /// Resolved address of the server.
        ServerIp = 6, Text, "server_ip";
    }
}

/// A variable of a specific entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// A variable of the virtual server behind the connection.
    Server(ServerVariable),
    /// A variable of a channel.
    Channel(ChannelId, ChannelVariable),
    /// A variable of a client.
    Client(ClientId, ClientVariable),
    /// A connection statistic of a client.
    Connection(ClientId, ConnectionVariable),
}

impl Attribute {
    /// Returns the kind of value the host returns for this attribute.
    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::Server(variable) => variable.kind(),
            Self::Channel(_, variable) => variable.kind(),
            Self::Client(_, variable) => variable.kind(),
            Self::Connection(_, variable) => variable.kind(),
        }
    }
}

impl From<ServerVariable> for Attribute {
    fn from(variable: ServerVariable) -> Self {
        Self::Server(variable)
    }
}

impl From<(ChannelId, ChannelVariable)> for Attribute {
    fn from((channel, variable): (ChannelId, ChannelVariable)) -> Self {
        Self::Channel(channel, variable)
    }
}

impl From<(ClientId, ClientVariable)> for Attribute {
    fn from((client, variable): (ClientId, ClientVariable)) -> Self {
        Self::Client(client, variable)
    }
}

impl From<(ClientId, ConnectionVariable)> for Attribute {
    fn from((client, variable): (ClientId, ConnectionVariable)) -> Self {
        Self::Connection(client, variable)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(variable) => write!(f, "server.{variable}"),
            Self::Channel(id, variable) => write!(f, "channel[{id}].{variable}"),
            Self::Client(id, variable) => write!(f, "client[{id}].{variable}"),
            Self::Connection(id, variable) => write!(f, "connection[{id}].{variable}"),
        }
    }
}

/// Synchronous accessors for the variables the host knows about.
pub trait DataProvider {
    /// Text handed out by the provider.
    ///
    /// The value is owned by the caller until dropped, at which point it must be released back to
    /// the provider exactly once.
    type Text: fmt::Display;

    /// Returns the id of our own client on the given connection.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the host cannot resolve our client, e.g. while the
    /// connection is still being established.
    fn own_client_id(&self, connection: ConnectionId) -> Result<ClientId, ProviderError>;

    /// Retrieves a single attribute.
    ///
    /// Implementations must return a value of [`Attribute::kind`].
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the host does not have the value.
    fn fetch(
        &self,
        connection: ConnectionId,
        attribute: Attribute,
    ) -> Result<AttributeValue<Self::Text>, ProviderError>;

    /// Asks the host to refresh the variables of a client.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the host rejects the request.
    fn request_client_variables(
        &self,
        _connection: ConnectionId,
        _client: ClientId,
    ) -> Result<(), ProviderError> {
        Ok(())
    }
}

impl<P: DataProvider + ?Sized> DataProvider for &P {
    type Text = P::Text;

    fn own_client_id(&self, connection: ConnectionId) -> Result<ClientId, ProviderError> {
        (**self).own_client_id(connection)
    }

    fn fetch(
        &self,
        connection: ConnectionId,
        attribute: Attribute,
    ) -> Result<AttributeValue<Self::Text>, ProviderError> {
        (**self).fetch(connection, attribute)
    }

    fn request_client_variables(
        &self,
        connection: ConnectionId,
        client: ClientId,
    ) -> Result<(), ProviderError> {
        (**self).request_client_variables(connection, client)
    }
}
