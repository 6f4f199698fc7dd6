use std::fmt;

/// Money amount represented as **integer minor units** (cents).
///
/// Every monetary value in the ledger (balances, service charges, transaction
/// amounts) is stored as an `i64` number of minor units; this type is the
/// human-facing view used when building transaction details.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Share of this amount expressed in basis points, rounded down.
    ///
    /// `MoneyCents::new(10_000).basis_points(500)` is `500` (5%).
    #[must_use]
    pub fn basis_points(self, bps: i64) -> Option<MoneyCents> {
        self.0
            .checked_mul(bps)
            .map(|scaled| MoneyCents(scaled / 10_000))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}
