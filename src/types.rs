//! Core newtypes shared by the record decoder and the checkers.
//!
//! Zero-cost wrappers keep state indices and time ticks from being mixed up
//! with lane values and counters. All types use `#[repr(transparent)]`.

use std::fmt;
use std::ops::{Add, Deref};

use serde::{Deserialize, Serialize};

/// Generates a `u64` newtype with the conversions the checkers rely on.
macro_rules! dp_newtype {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty) => $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[derive(Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates a new instance
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Raw value
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }

            /// Distance from `earlier` to `self`, or `None` if `earlier` is later.
            #[inline]
            pub const fn since(self, earlier: Self) -> Option<$inner> {
                self.0.checked_sub(earlier.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl Deref for $name {
            type Target = $inner;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<$inner> for $name {
            #[inline]
            fn eq(&self, other: &$inner) -> bool {
                self.0 == *other
            }
        }

        impl Add<$inner> for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: $inner) -> Self::Output {
                Self(self.0.saturating_add(rhs))
            }
        }
    };
}

dp_newtype!(
    /// Zero-based position of a state within the capture, in processing order.
    StateIndex(u64) => "#"
);

dp_newtype!(
    /// 50-bit analyzer time-tick counter, one tick per link symbol clock.
    TimeTicks(u64) => "T"
);
