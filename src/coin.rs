use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An amount of Scroogecoin, counted in indivisible base units.
/// The representation is signed so that a negative output can be expressed and rejected by
/// validation rather than by the type system.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scroogecoin(i64);

impl Scroogecoin {
    pub const fn new(amount: i64) -> Self {
        Scroogecoin(amount)
    }

    pub const fn zero() -> Self {
        Self::new(0)
    }

    pub fn units(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns None on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Sums all amounts, or returns None if the total doesn't fit into the representation.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |total, amount| total.checked_add(amount))
    }
}

impl From<i64> for Scroogecoin {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<i32> for Scroogecoin {
    fn from(value: i32) -> Self {
        Self(value as i64)
    }
}

impl Display for Scroogecoin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} SCR", self.0)
    }
}
