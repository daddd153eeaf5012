use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Decides what happens when a command is issued on a client that is not
/// currently connected.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReconnectPolicy {
    /// Open a fresh connection before sending the command.
    #[default]
    OnDemand,
    /// Fail the command with a not-connected error.
    Never,
}

impl ReconnectPolicy {
    /// Returns true when the policy permits connecting from inside the send path.
    #[must_use]
    pub const fn reconnects(self) -> bool {
        matches!(self, Self::OnDemand)
    }
}

/// Errors encountered while parsing a [`ReconnectPolicy`] from text.
pub type ReconnectPolicyParseError = strum::ParseError;
