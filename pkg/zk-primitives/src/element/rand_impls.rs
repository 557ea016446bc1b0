use ethnum::U256;
use rand::{CryptoRng, Rng};

use super::Element;

impl Element {
    /// Generate a uniformly random canonical [`Element`] from a
    /// cryptographically secure source
    ///
    /// Suitable for spending keys and blinding factors. The raw 256-bit
    /// sample is reduced modulo [`Element::MODULUS`]; the resulting bias is
    /// negligible (on the order of 2^-130)
    pub fn secure_random<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);

        let mut element = Self(U256::from_be_bytes(bytes));
        element.canonicalize();
        element
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

    use super::*;

    #[test]
    fn random_elements_are_canonical_and_distinct() {
        let mut rng = ChaChaRng::from_seed([7; 32]);

        let a = Element::secure_random(&mut rng);
        let b = Element::secure_random(&mut rng);

        assert!(a.is_canonical());
        assert!(b.is_canonical());
        assert_ne!(a, b);
    }
}
