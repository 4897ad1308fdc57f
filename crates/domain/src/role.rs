use std::fmt::{Display, Formatter};
use std::str::FromStr;

use fleetdesk_core::AppError;
use serde::{Deserialize, Serialize};

/// Dashboard roles. The sole axis of authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access including settings and QuickBooks invoicing.
    Admin,
    /// Dispatches jobs and reads driver and fleet rosters.
    Dispatcher,
    /// Read-mostly access to assigned jobs and inspections.
    Driver,
}

impl Role {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Dispatcher => "dispatcher",
            Self::Driver => "driver",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Admin, Role::Dispatcher, Role::Driver];

        ALL
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "dispatcher" => Ok(Self::Dispatcher),
            "driver" => Ok(Self::Driver),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}
