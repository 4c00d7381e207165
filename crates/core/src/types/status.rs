//! Cart lifecycle status and payment method labels.
//!
//! Both values travel as free text at the HTTP boundary and in the `cart`
//! table. They are parsed into closed enums here so the rest of the code never
//! compares strings.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cart fulfillment status.
///
/// ```text
/// pending ──► confirmed ──► in_delivery ──► completed
///    │            │              │
///    └────────────┴──────────────┴────────► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    /// Set at creation.
    #[default]
    Pending,
    /// Accepted by the store.
    Confirmed,
    /// Handed to a courier.
    InDelivery,
    /// Delivered. Terminal.
    Completed,
    /// Abandoned or rejected. Terminal.
    Cancelled,
}

impl CartStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::InDelivery,
        Self::Completed,
        Self::Cancelled,
    ];

    /// The label stored in the database and accepted on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InDelivery => "in_delivery",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the forward-only table allows moving from `self` to `next`.
    ///
    /// Reapplying the current status is always allowed.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Pending | Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Confirmed | Self::InDelivery | Self::Cancelled)
                | (Self::InDelivery, Self::InDelivery | Self::Completed | Self::Cancelled)
                | (Self::Completed, Self::Completed)
                | (Self::Cancelled, Self::Cancelled)
        )
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status label outside the closed set.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown cart status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for CartStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(s.trim().to_owned()))
    }
}

/// How status changes are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Only transitions from [`CartStatus::can_transition_to`] are accepted.
    #[default]
    Strict,
    /// Any known status may overwrite any other (operator override).
    Permissive,
}

impl StatusPolicy {
    /// Whether the policy lets a cart move from `from` to `to`.
    #[must_use]
    pub const fn allows(&self, from: CartStatus, to: CartStatus) -> bool {
        match self {
            Self::Strict => from.can_transition_to(to),
            Self::Permissive => true,
        }
    }
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(format!("invalid status policy: {other}")),
        }
    }
}

/// How a cart will be paid.
///
/// The method is only recorded; no payment is processed. Labels outside the
/// recommended set are kept verbatim in [`PaymentMethod::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cash,
    /// Card on delivery or online.
    Card,
    /// Bank transfer.
    Transfer,
    /// Mobile wallet (Yape, Plin, ...).
    DigitalWallet,
    /// Any other label sent by a client.
    Other(String),
}

impl PaymentMethod {
    /// Labels of the recommended methods.
    pub const RECOMMENDED: [&'static str; 4] = ["cash", "card", "transfer", "digital_wallet"];

    /// Parse a client label.
    ///
    /// Returns `None` for blank input. Recommended labels match
    /// case-insensitively; anything else becomes [`PaymentMethod::Other`].
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_ascii_lowercase().as_str() {
            "cash" => Self::Cash,
            "card" => Self::Card,
            "transfer" => Self::Transfer,
            "digital_wallet" => Self::DigitalWallet,
            _ => Self::Other(trimmed.to_owned()),
        })
    }

    /// The stored label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
            Self::DigitalWallet => "digital_wallet",
            Self::Other(label) => label,
        }
    }

    /// Whether the label is part of the recommended set.
    #[must_use]
    pub const fn is_recommended(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::parse(&label)
            .ok_or_else(|| serde::de::Error::custom("payment method cannot be empty"))
    }
}

// SQLx support: both enums are stored as TEXT.

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CartStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CartStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CartStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PaymentMethod {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PaymentMethod {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Self::parse(s).ok_or_else(|| "empty payment method in database".into())
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PaymentMethod {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}
