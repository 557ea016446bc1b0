use ethnum::U256;

mod arith;
mod base;
mod convert;
mod fmt;

#[cfg(feature = "borsh")]
mod borsh_impls;

#[cfg(feature = "rand")]
mod rand_impls;

#[cfg(feature = "serde")]
mod serde;

/// A 256-bit unsigned integer
///
/// This type is a wrapper around a [`U256`], so can represent any value in
/// the range `0..=(2^256 - 1)`. In a proof context it is converted to a
/// [`Base`], an integer modulo [`Element::MODULUS`], which restricts the set
/// of usable values to something approximating a `u254`. Values produced by
/// [`hash_merge`] are always canonical.
///
/// [`Base`]: crate::Base
/// [`hash_merge`]: crate::hash_merge
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Element(#[cfg_attr(feature = "serde", serde(with = "serde"))] pub(crate) U256);

impl Element {
    /// The zero element (the additive identity)
    pub const ZERO: Self = Self(U256::ZERO);

    /// The one element (the multiplicative identity)
    pub const ONE: Self = Self(U256::ONE);

    /// The largest possible element (note that this is not canonical)
    pub const MAX: Self = Self(U256::MAX);

    /// The value stored in an unoccupied tree slot
    ///
    /// This is identical to [`Element::ZERO`]; the alias exists so that
    /// "empty leaf" reads as intent rather than arithmetic
    pub const NULL_HASH: Self = Self::ZERO;

    /// The [`Element`] used as the initialization vector when hashing bytes
    pub(crate) const BYTE_HASH_IV: Self = Self(U256::new(2));

    /// Create a new [`Element`] from a u64
    ///
    /// This is largely provided to help type inference in simple cases
    #[inline]
    #[must_use]
    pub fn new(i: u64) -> Self {
        Self(U256::from(i))
    }

    /// Convert this [`Element`] to a U256
    #[inline]
    #[must_use]
    pub fn to_u256(self) -> U256 {
        self.0
    }

    /// Convert this [`Element`] to a hex string
    #[inline]
    #[must_use]
    pub fn to_hex(self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// If this element is zero, returns true
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

macro_rules! partial_eq_impl {
    ($int:ty) => {
        impl PartialEq<$int> for Element {
            fn eq(&self, other: &$int) -> bool {
                *self == Element::from(*other)
            }
        }
    };
}

partial_eq_impl!(bool);
partial_eq_impl!(u8);
partial_eq_impl!(u16);
partial_eq_impl!(u32);
partial_eq_impl!(u64);
partial_eq_impl!(u128);

#[cfg(any(test, feature = "proptest"))]
mod proptest_impls {
    use super::Element;
    use ::proptest::{arbitrary::StrategyFor, prelude::*, strategy::Map};
    use ethnum::U256;

    impl Arbitrary for Element {
        type Strategy = Map<StrategyFor<[u8; 32]>, fn([u8; 32]) -> Self>;
        type Parameters = ();

        fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
            any::<[u8; 32]>().prop_map(|array| Self(U256::from_be_bytes(array)))
        }
    }
}
