//! Account roles.
//!
//! The marketplace has three kinds of accounts sharing one table and one
//! capability set (authenticate, identify, display name). The role tag is
//! what separates them.

use serde::{Deserialize, Serialize};

/// Which side of the marketplace an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Lists produce, sees orders on own products.
    Farmer,
    /// Browses, carts, and buys.
    Customer,
    /// Oversees all orders.
    Admin,
}

impl Role {
    /// Stable string form used in the database and in forms.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Self::Farmer),
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Farmer, Role::Customer, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()), Ok(role));
        }
    }

    #[test]
    fn test_role_rejects_unknown() {
        assert!(Role::from_str("wholesaler").is_err());
    }
}
