//! Tactic vocabulary accepted by the `step` command.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A directive applied by the simulator during the next step.
///
/// Wire names match the variant names exactly (`IncAlt`, `GoTight`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Tactic {
    /// Climb one altitude level.
    IncAlt,
    /// Descend one altitude level.
    DecAlt,
    /// Climb two altitude levels.
    IncAlt2,
    /// Descend two altitude levels.
    DecAlt2,
    /// Switch to tight formation.
    GoTight,
    /// Switch to loose formation.
    GoLoose,
    /// Turn electronic countermeasures on.
    EcmOn,
    /// Turn electronic countermeasures off.
    EcmOff,
}

impl Tactic {
    /// Wire name of the tactic.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Errors encountered while parsing a [`Tactic`] from text.
pub type TacticParseError = strum::ParseError;
