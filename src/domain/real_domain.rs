//! Half-open real interval used to bound a single feature.

use std::fmt::Display;

/// Float type shared by domains, thresholds and leaf values.
pub type FloatT = f64;

/// Position of a value relative to a [`RealDomain`].
///
/// ```text
///            lo                  hi
///            [--- real domain ---)
/// ---x1--------------x2-----------------x3------> (real axis)
/// ```
///
/// `x1` is [`WhereFlag::Left`], `x2` is [`WhereFlag::InDomain`] and `x3`
/// (including `x3 == hi`) is [`WhereFlag::Right`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WhereFlag {
    Left = -1,
    InDomain = 0,
    Right = 1,
}

/// Interval `[lo, hi)` over the reals. The default spans everything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealDomain {
    lo: FloatT,
    hi: FloatT,
}

impl RealDomain {
    /// Creates the domain `[lo, hi)`.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi` or either bound is NaN.
    pub fn new(lo: FloatT, hi: FloatT) -> Self {
        assert!(lo <= hi, "RealDomain lo must be <= hi (got [{lo}, {hi}))");
        Self { lo, hi }
    }

    /// The unbounded domain `[-inf, +inf)`.
    pub const fn everything() -> Self {
        Self {
            lo: FloatT::NEG_INFINITY,
            hi: FloatT::INFINITY,
        }
    }

    pub const fn lo(&self) -> FloatT {
        self.lo
    }

    pub const fn hi(&self) -> FloatT {
        self.hi
    }

    pub fn is_everything(&self) -> bool {
        self.lo == FloatT::NEG_INFINITY && self.hi == FloatT::INFINITY
    }

    /// True when no value lies in the domain (`lo == hi`).
    pub fn is_empty(&self) -> bool {
        self.lo >= self.hi
    }

    /// Classifies `value`: left of `lo`, inside `[lo, hi)`, or at/after `hi`.
    pub fn where_is(&self, value: FloatT) -> WhereFlag {
        if self.hi <= value {
            WhereFlag::Right
        } else if self.lo > value {
            WhereFlag::Left
        } else {
            WhereFlag::InDomain
        }
    }

    /// Like [`where_is`](Self::where_is), but `value == lo` is classified as
    /// [`WhereFlag::Left`], so `InDomain` means `lo < value < hi`.
    ///
    /// Read this as the position of a split threshold: `Left` means every
    /// value of the domain is `>= value`, `Right` means every value is
    /// `< value`, and `InDomain` means the threshold cuts the domain into
    /// two non-empty halves.
    pub fn where_is_strict(&self, value: FloatT) -> WhereFlag {
        if self.hi <= value {
            WhereFlag::Right
        } else if self.lo >= value {
            WhereFlag::Left
        } else {
            WhereFlag::InDomain
        }
    }

    /// Returns true if `value` ∈ `[lo, hi)`.
    pub fn contains(&self, value: FloatT) -> bool {
        self.lo <= value && value < self.hi
    }

    /// Returns true if `value` ∈ `(lo, hi)`.
    pub fn contains_strict(&self, value: FloatT) -> bool {
        self.lo < value && value < self.hi
    }

    /// Returns true if the two domains share at least one value. An empty
    /// domain overlaps nothing.
    pub fn overlaps(&self, other: &RealDomain) -> bool {
        !self.is_empty() && !other.is_empty() && self.lo < other.hi && other.lo < self.hi
    }

    /// Returns true if `other` ⊆ `self`. An empty `other` is covered by any
    /// domain.
    pub fn covers(&self, other: &RealDomain) -> bool {
        other.is_empty() || (self.lo <= other.lo && other.hi <= self.hi)
    }

    /// Returns true if `other` lies inside `self` without touching either bound.
    pub fn covers_strict(&self, other: &RealDomain) -> bool {
        self.lo < other.lo && other.hi < self.hi
    }

    pub fn intersection(&self, other: &RealDomain) -> Option<RealDomain> {
        if self.overlaps(other) {
            Some(RealDomain::new(self.lo.max(other.lo), self.hi.min(other.hi)))
        } else {
            None
        }
    }

    /// Splits into `([lo, value), [value, hi))`.
    ///
    /// A `value` equal to a bound yields one empty half.
    ///
    /// # Panics
    ///
    /// Panics if `value` lies outside `[lo, hi]`.
    pub fn split(&self, value: FloatT) -> (RealDomain, RealDomain) {
        assert!(
            self.lo <= value && value <= self.hi,
            "split value {value} outside of {self}"
        );
        (
            RealDomain::new(self.lo, value),
            RealDomain::new(value, self.hi),
        )
    }

    /// Non-panicking [`split`](Self::split).
    pub fn try_split(&self, value: FloatT) -> Option<(RealDomain, RealDomain)> {
        if self.lo <= value && value <= self.hi {
            Some(self.split(value))
        } else {
            None
        }
    }
}

impl Default for RealDomain {
    fn default() -> Self {
        Self::everything()
    }
}

impl Display for RealDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.lo, self.hi)
    }
}
