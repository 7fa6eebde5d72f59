//! Scalar quantities of the FRBC model.
//!
//! S2 expresses fill level and fill rate in device-defined units (for a battery, typically
//! percent state-of-charge and percent per second). The newtypes keep those apart from
//! power, durations and money without pulling in a full dimensional-analysis machinery.

use std::ops::{Div, Mul};

use chrono::TimeDelta;

macro_rules! quantity {
    ($(#[$attr:meta])* $name:ident, $unit:literal) => {
        $(#[$attr])*
        #[must_use]
        #[repr(transparent)]
        #[derive(
            ::derive_more::Add,
            ::derive_more::AddAssign,
            ::derive_more::From,
            ::derive_more::FromStr,
            ::derive_more::Neg,
            ::derive_more::Sub,
            ::derive_more::SubAssign,
            ::derive_more::Sum,
            ::serde::Deserialize,
            ::serde::Serialize,
            ::std::clone::Clone,
            ::std::marker::Copy,
        )]
        pub struct $name(pub f64);

        impl $name {
            pub const ZERO: Self = Self(0.0);

            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            pub fn min(self, rhs: Self) -> Self {
                if rhs < self { rhs } else { self }
            }

            pub fn max(self, rhs: Self) -> Self {
                if rhs > self { rhs } else { self }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(formatter, "{} {}", self.0, $unit)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(formatter, "{}{}", self.0, $unit)
            }
        }

        impl ::std::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                ::ordered_float::OrderedFloat(self.0).eq(&::ordered_float::OrderedFloat(other.0))
            }
        }

        impl ::std::cmp::Eq for $name {}

        impl ::std::cmp::PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl ::std::cmp::Ord for $name {
            fn cmp(&self, other: &Self) -> ::std::cmp::Ordering {
                ::ordered_float::OrderedFloat(self.0).cmp(&::ordered_float::OrderedFloat(other.0))
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;

            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = Self;

            fn div(self, rhs: f64) -> Self {
                Self(self.0 / rhs)
            }
        }
    };
}

quantity!(
    /// Storage fill level (and fill level delta) in the device's own unit.
    FillLevel,
    "u"
);
quantity!(
    /// Fill level change per second.
    FillRate,
    "u/s"
);
quantity!(Watts, "W");
quantity!(Seconds, "s");
quantity!(
    /// Money in the currency of the system description.
    Cost,
    "¤"
);
quantity!(
    /// Money per second, the unit of S2 `running_costs`.
    CostRate,
    "¤/s"
);

impl Mul<Seconds> for FillRate {
    type Output = FillLevel;

    fn mul(self, rhs: Seconds) -> FillLevel {
        FillLevel(self.0 * rhs.0)
    }
}

impl Mul<Seconds> for CostRate {
    type Output = Cost;

    fn mul(self, rhs: Seconds) -> Cost {
        Cost(self.0 * rhs.0)
    }
}

impl Div<FillRate> for FillLevel {
    type Output = Seconds;

    /// How long the rate needs to cover the level difference.
    fn div(self, rhs: FillRate) -> Seconds {
        Seconds(self.0 / rhs.0)
    }
}

impl From<TimeDelta> for Seconds {
    #[expect(clippy::cast_precision_loss)]
    fn from(delta: TimeDelta) -> Self {
        Self(delta.num_milliseconds() as f64 / 1_000.0)
    }
}
