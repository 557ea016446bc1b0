use ethnum::{uint, U256};
use ff::PrimeField;

use crate::{hash_merge, Base, Element};

impl Element {
    /// The modulus of the underlying prime field
    pub const MODULUS: Element = Element(uint!(
        "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001"
    ));

    /// Return the result of hash-merging this value with `other`
    ///
    /// This element is considered to be on the left:
    /// ```rust
    /// # use zk_primitives::*;
    /// let a = Element::new(1);
    /// let b = Element::new(2);
    ///
    /// assert_eq!(a.hashed_with(b), hash_merge([a, b]));
    /// ```
    #[inline]
    #[must_use = "this function doesn't modify self"]
    pub fn hashed_with(self, other: Element) -> Self {
        hash_merge([self, other])
    }

    /// Convert this [`Element`] to its equivalent [`Base`] representation
    #[inline]
    #[must_use]
    pub fn to_base(self) -> Base {
        let u8s = self.0.to_le_bytes();
        Base::from_raw(u8s_to_u64(u8s))
    }

    /// Create an [`Element`] from a [`Base`]
    #[inline]
    #[must_use]
    pub fn from_base(base: Base) -> Element {
        let u8s = base.to_repr();
        Self(U256::from_le_bytes(u8s))
    }

    /// Reduce this element to its canonical form
    ///
    /// Elements in canonical form are guaranteed to be unchanged when
    /// converting to/from a [`Base`]
    #[inline]
    pub fn canonicalize(&mut self) {
        self.0 %= Self::MODULUS.0;
    }

    /// Whether this [`Element`] is in its canonical form
    #[inline]
    #[must_use]
    pub fn is_canonical(self) -> bool {
        self.0 < Self::MODULUS.0
    }

    /// Embed a signed value into the field
    ///
    /// Non-negative values map to themselves; negative values wrap modulo
    /// [`Element::MODULUS`], mirroring how the circuit encodes a signed
    /// public amount:
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// assert_eq!(Element::from_i128(5), Element::new(5));
    /// assert_eq!(Element::from_i128(-1), Element::MODULUS - Element::ONE);
    /// ```
    #[inline]
    #[must_use]
    pub fn from_i128(value: i128) -> Element {
        let magnitude = Element::from(value.unsigned_abs());
        match value >= 0 {
            true => magnitude,
            false => Self::MODULUS - magnitude,
        }
    }
}

fn u8s_to_u64(bytes: [u8; 32]) -> [u64; 4] {
    core::array::from_fn(|i| {
        let mut chunk = [0u8; 8];
        chunk.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
        u64::from_le_bytes(chunk)
    })
}
