//! Payment methods accepted at the till.
//!
//! Payments are recorded as labels only; no method talks to a gateway.

use serde::{Deserialize, Serialize};

/// How a transaction was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash; the only method that takes a tendered amount and gives change.
    #[default]
    Cash,
    Debit,
    Credit,
    Ewallet,
    Qris,
    Transfer,
}

impl PaymentMethod {
    /// Every method in the order the till presents them.
    pub const ALL: [Self; 6] = [
        Self::Cash,
        Self::Debit,
        Self::Credit,
        Self::Ewallet,
        Self::Qris,
        Self::Transfer,
    ];

    /// Stored and wire form of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Ewallet => "ewallet",
            Self::Qris => "qris",
            Self::Transfer => "transfer",
        }
    }

    /// Human-readable label for receipts and reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Debit => "Debit Card",
            Self::Credit => "Credit Card",
            Self::Ewallet => "E-Wallet",
            Self::Qris => "QRIS",
            Self::Transfer => "Bank Transfer",
        }
    }

    /// Whether the cashier must collect a tendered amount.
    #[must_use]
    pub const fn requires_tender(&self) -> bool {
        matches!(self, Self::Cash)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| format!("invalid payment method: {s}"))
    }
}
