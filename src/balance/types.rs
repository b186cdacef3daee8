//! Address, amount and balance result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque address string as understood by the remote providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Balance in the smallest currency unit (satoshi).
///
/// Signed: some providers report a pending outgoing spend as a negative
/// unconfirmed balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_sat(sat: i64) -> Self {
        Self(sat)
    }

    pub const fn as_sat(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Addition clamped to the `i64` range in the direction of the overflow.
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Amount {
    fn from(sat: i64) -> Self {
        Self(sat)
    }
}

/// A single balance as normalized by a provider adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRecord {
    pub address: Address,
    pub confirmed: Amount,
    pub unconfirmed: Amount,
    /// Absent when the provider's wire format does not carry a total.
    pub total: Option<Amount>,
}

/// Balance published on the shared output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResult {
    /// Name of the provider that answered.
    pub source: String,
    pub address: Address,
    pub confirmed: Amount,
    pub unconfirmed: Amount,
    pub total: Amount,
}

impl BalanceResult {
    /// Build a result from an adapter record.
    ///
    /// The provider's own total is kept as-is; it is only derived from
    /// `confirmed + unconfirmed` when the record has none.
    pub fn from_record(source: &str, record: BalanceRecord) -> Self {
        let total = record
            .total
            .unwrap_or_else(|| record.confirmed.saturating_add(record.unconfirmed));

        Self {
            source: source.to_string(),
            address: record.address,
            confirmed: record.confirmed,
            unconfirmed: record.unconfirmed,
            total,
        }
    }
}
