//! Typed `action:possession` pairs.
//!
//! The grants model is keyed by these pairs rather than raw strings, so the
//! full Action × Possession space (4 × 2 = 8 variants) can be matched
//! exhaustively instead of string-parsed on every lookup. Canonical string
//! forms:
//! - bare: `"read"` (possession defaults to `any`)
//! - compound: `"read:own"`

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::error::AccessError;

use super::action::Action;
use super::possession::Possession;

/// A single permission slot: an action paired with a possession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Permission {
    pub action: Action,
    pub possession: Possession,
}

impl Permission {
    pub fn new(action: Action, possession: Possession) -> Self {
        Permission { action, possession }
    }

    /// All eight action/possession combinations, in enum declaration order.
    pub fn all() -> impl Iterator<Item = Permission> {
        Action::iter()
            .flat_map(|action| Possession::iter().map(move |possession| Permission { action, possession }))
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.action, self.possession)
    }
}

impl FromStr for Permission {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (action_part, possession_part) = match s.split_once(':') {
            Some((a, p)) => (a, Some(p)),
            None => (s, None),
        };

        let action = Action::from_str(action_part.trim())
            .map_err(|_| AccessError::InvalidAction(action_part.trim().to_string()))?;

        let possession = match possession_part {
            Some(p) => Possession::from_str(p.trim())
                .map_err(|_| AccessError::InvalidPossession(p.trim().to_string()))?,
            None => Possession::default(),
        };

        Ok(Permission { action, possession })
    }
}

impl From<Permission> for String {
    fn from(p: Permission) -> Self {
        p.to_string()
    }
}

impl TryFrom<String> for Permission {
    type Error = AccessError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
