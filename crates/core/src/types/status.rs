//! Role and status enums shared by the storefront and backoffice.

use serde::{Deserialize, Serialize};

/// Account role assigned by the backend.
///
/// Unknown roles are preserved verbatim so a newer backend does not break
/// profile deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    /// Regular shopper.
    #[default]
    User,
    /// Backoffice staff member (catalog and stock management).
    Staff,
    /// Full backoffice access including staff management.
    Admin,
    /// A role this client does not know about.
    Other(String),
}

impl UserRole {
    /// Whether this role may use the backoffice endpoints.
    #[must_use]
    pub const fn is_backoffice(&self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }

    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "USER",
            Self::Staff => "STAFF",
            Self::Admin => "ADMIN",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for UserRole {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().trim_start_matches("ROLE_") {
            "USER" => Self::User,
            "STAFF" => Self::Staff,
            "ADMIN" => Self::Admin,
            _ => Self::Other(value),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_owned()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("PENDING"),
            Self::Paid => f.write_str("PAID"),
            Self::Shipped => f.write_str("SHIPPED"),
            Self::Delivered => f.write_str("DELIVERED"),
            Self::Cancelled => f.write_str("CANCELLED"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// Direction of a backoffice stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockDirection {
    Increase,
    Decrease,
}

impl StockDirection {
    /// Path segment used by the stock endpoint.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(UserRole::from("ADMIN".to_string()), UserRole::Admin);
        assert_eq!(UserRole::from("role_staff".to_string()), UserRole::Staff);
        assert_eq!(
            UserRole::from("AUDITOR".to_string()),
            UserRole::Other("AUDITOR".to_string())
        );
        assert!(UserRole::Staff.is_backoffice());
        assert!(!UserRole::User.is_backoffice());
    }

    #[test]
    fn test_role_serde() {
        let role: UserRole = serde_json::from_str("\"STAFF\"").unwrap();
        assert_eq!(role, UserRole::Staff);
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn test_order_status_unknown_preserved() {
        let status: OrderStatus = serde_json::from_str("\"SHIPPED\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);
        let status: OrderStatus = serde_json::from_str("\"RETURNED\"").unwrap();
        assert_eq!(status, OrderStatus::Other("RETURNED".to_string()));
    }
}
