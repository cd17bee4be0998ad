use std::fmt;

use extinfo_plugin::{ChannelId, ChannelVariable, DataProvider};

use super::Fetcher;
use crate::FormatError;

/// Everything shown for a channel.
#[derive(Debug)]
pub struct ChannelInfo<S> {
    /// Phonetic channel name.
    pub name_phonetic: S,
    /// Icon id of the channel.
    pub icon_id: u64,
    /// Forced silence flag.
    pub forced_silence: u64,
    /// Private channel flag.
    pub private: u64,
    /// Codec latency factor.
    pub latency_factor: i64,
    /// Security salt and password, only with developer fields enabled.
    pub secrets: Option<ChannelSecrets<S>>,
}

/// The developer-only channel fields. Either both are shown or neither.
#[derive(Debug)]
pub struct ChannelSecrets<S> {
    /// Salt used for channel security hashes.
    pub security_salt: S,
    /// Channel password.
    pub password: S,
}

/// Retrieves the channel variables in their fixed order.
pub(super) fn retrieve<P: DataProvider>(
    fetcher: &Fetcher<'_, P>,
    channel: ChannelId,
    developer_fields: bool,
) -> Result<ChannelInfo<P::Text>, FormatError> {
    let name_phonetic = fetcher.text((channel, ChannelVariable::NamePhonetic))?;
    let icon_id = fetcher.uint((channel, ChannelVariable::IconId))?;
    let forced_silence = fetcher.uint((channel, ChannelVariable::ForcedSilence))?;
    let private = fetcher.uint((channel, ChannelVariable::FlagPrivate))?;
    let latency_factor = fetcher.int((channel, ChannelVariable::CodecLatencyFactor))?;

    let secrets = if developer_fields {
        Some(ChannelSecrets {
            security_salt: fetcher.text((channel, ChannelVariable::SecuritySalt))?,
            password: fetcher.text((channel, ChannelVariable::Password))?,
        })
    } else {
        None
    };

    Ok(ChannelInfo {
        name_phonetic,
        icon_id,
        forced_silence,
        private,
        latency_factor,
        secrets,
    })
}

impl<S: fmt::Display> fmt::Display for ChannelInfo<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Phonetic Name: {}", self.name_phonetic)?;
        writeln!(f, "Icon ID: [color=darkgrey]{}[/color]", self.icon_id)?;
        writeln!(f, "Forced Silence: [color=blue]{}[/color]", self.forced_silence)?;
        writeln!(f, "Private Channel: [color=blue]{}[/color]", self.private)?;
        write!(
            f,
            "Latency Factor: [color=darkorange]{}[/color]",
            self.latency_factor
        )?;

        if let Some(secrets) = &self.secrets {
            write!(
                f,
                "\nSecurity Salt: [color=red]{}[/color]\nPassword: [color=red]{}[/color]",
                secrets.security_salt, secrets.password
            )?;
        }

        Ok(())
    }
}
