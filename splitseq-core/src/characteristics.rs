//! Traversal guarantees reported by a sequence

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

/// A set of flags describing what a sequence promises to its consumers.
///
/// The set is fixed for the lifetime of a sequence. When [`SIZED`] is
/// reported the size estimate is exact, and a batch-splittable sequence
/// always adds [`SUBSIZED`] on top of it.
///
/// [`SIZED`]: Characteristics::SIZED
/// [`SUBSIZED`]: Characteristics::SUBSIZED
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Characteristics(u32);

impl Characteristics {
    /// No two produced elements are equal
    pub const DISTINCT: Self = Self(0x0001);

    /// Encounter order is significant and preserved through splitting
    pub const ORDERED: Self = Self(0x0010);

    /// The size estimate is the exact remaining count
    pub const SIZED: Self = Self(0x0040);

    /// No produced element is an absence marker
    pub const NONNULL: Self = Self(0x0100);

    /// The source cannot change while it is being traversed
    pub const IMMUTABLE: Self = Self(0x0400);

    /// Split-off parts are sized and their sizes sum to the original total
    pub const SUBSIZED: Self = Self(0x4000);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::DISTINCT, "DISTINCT"),
        (Self::ORDERED, "ORDERED"),
        (Self::SIZED, "SIZED"),
        (Self::NONNULL, "NONNULL"),
        (Self::IMMUTABLE, "IMMUTABLE"),
        (Self::SUBSIZED, "SUBSIZED"),
    ];

    /// The empty flag set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bit representation
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether no flag is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag of `other` is also set in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Flags set in either operand
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Flags set in both operands
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Flags of `self` that are not in `other`
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Adds `SUBSIZED` whenever `SIZED` is present.
    #[must_use]
    pub const fn with_subsized(self) -> Self {
        if self.contains(Self::SIZED) {
            self.union(Self::SUBSIZED)
        } else {
            self
        }
    }
}

impl BitOr for Characteristics {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Characteristics {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for Characteristics {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl BitAndAssign for Characteristics {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.intersection(rhs);
    }
}

impl fmt::Debug for Characteristics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(empty)");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsized_follows_sized() {
        let sized = (Characteristics::ORDERED | Characteristics::SIZED).with_subsized();
        assert!(sized.contains(Characteristics::SUBSIZED));

        let unsized_ = Characteristics::ORDERED.with_subsized();
        assert!(!unsized_.contains(Characteristics::SUBSIZED));
    }

    #[test]
    fn test_set_operations() {
        let a = Characteristics::ORDERED | Characteristics::NONNULL;
        let b = Characteristics::NONNULL | Characteristics::IMMUTABLE;

        assert_eq!(a & b, Characteristics::NONNULL);
        assert_eq!(a.difference(b), Characteristics::ORDERED);
        assert!(Characteristics::empty().is_empty());
        assert!(a.contains(Characteristics::empty()));
    }

    #[test]
    fn test_debug_lists_flag_names() {
        let c = Characteristics::ORDERED | Characteristics::IMMUTABLE;
        assert_eq!(format!("{c:?}"), "ORDERED | IMMUTABLE");
        assert_eq!(format!("{:?}", Characteristics::empty()), "(empty)");
    }
}
