use poseidon_circuit::poseidon::primitives::{ConstantLength, Hash, P128Pow5T3};

use crate::{Base, Element};

/// Hash `N` elements together with the circuit's poseidon permutation
///
/// This is the hash used for every node of the commitment tree
/// (`parent = hash_merge([left, right])`), for UTXO commitments, and for
/// nullifiers. It must match the proof circuits' constraint system exactly;
/// there is deliberately no other hash available for these values.
///
/// ```rust
/// # use zk_primitives::*;
/// let a = hash_merge([Element::new(1), Element::new(2)]);
/// let b = hash_merge([Element::new(1), Element::new(3)]);
///
/// assert_ne!(a, b);
/// ```
/// This operation is not symmetric:
/// ```rust
/// # use zk_primitives::*;
/// let a = Element::new(1);
/// let b = Element::new(2);
///
/// assert_ne!(hash_merge([a, b]), hash_merge([b, a]));
/// ```
#[inline]
#[must_use]
pub fn hash_merge<const N: usize>(elements: [Element; N]) -> Element {
    type H<const N: usize> = Hash<Base, P128Pow5T3<Base>, ConstantLength<N>, 3, 2>;

    let hash = H::<N>::init().hash(elements.map(Element::to_base));
    Element::from_base(hash)
}

/// Hash a slice of bytes into the field
///
/// Used for values that live outside the field (ext-data blobs, external
/// addresses) but need a field-sized digest bound into the public signals.
///
/// ```rust
/// # use zk_primitives::*;
/// let hash_1 = hash_bytes(&[1, 2, 3, 4]);
/// let hash_2 = hash_bytes(&[1, 2, 3, 5]);
///
/// assert_ne!(hash_1, hash_2);
/// ```
#[inline]
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> Element {
    // an element is slightly smaller than a "u254"; absorbing 16 bytes per
    // chunk keeps every chunk trivially canonical
    let initial = Element::BYTE_HASH_IV;

    let elements_from_bytes = bytes
        .chunks(core::mem::size_of::<u128>())
        .map(bytes_to_element);

    core::iter::once(initial)
        .chain(elements_from_bytes)
        .reduce(|left, right| hash_merge([left, right]))
        .unwrap() // there's always at least 1 element
}

/// Convert a slice of bytes with length in the range `1..=16` to an [`Element`]
///
/// If there are fewer than 16 bytes, the lower bytes are padded with zeroes
fn bytes_to_element(bytes: &[u8]) -> Element {
    let mut padded_bytes = [0; 16];
    padded_bytes[0..bytes.len()].copy_from_slice(bytes);
    u128::from_be_bytes(padded_bytes).into()
}

#[cfg(test)]
mod tests {
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

    use super::*;

    #[test]
    fn hash_merge_is_deterministic_and_injective_in_practice() {
        let mut rng = ChaChaRng::from_seed([0; 32]);

        let pairs: Vec<[Element; 2]> = (0..64)
            .map(|_| {
                [
                    Element::secure_random(&mut rng),
                    Element::secure_random(&mut rng),
                ]
            })
            .collect();

        let hashes: Vec<Element> = pairs.iter().map(|&pair| hash_merge(pair)).collect();

        // deterministic: recomputing gives the same digest
        for (pair, hash) in pairs.iter().zip(&hashes) {
            assert_eq!(hash_merge(*pair), *hash);
            assert!(hash.is_canonical());
        }

        // no collisions across distinct random inputs
        let unique: std::collections::HashSet<_> = hashes.iter().copied().collect();
        assert_eq!(unique.len(), hashes.len());
    }

    #[test]
    fn arity_is_domain_separated() {
        let a = Element::new(1);
        let b = Element::new(2);

        // [a, b] hashed as a pair must differ from [a, b, 0] hashed as a triple
        assert_ne!(hash_merge([a, b]), hash_merge([a, b, Element::ZERO]));
    }

    #[test]
    fn digest_chain_matches_the_recorded_vector() {
        // the root of a depth-64 sparse binary tree holding the single
        // value 3 at leaf index 3, with zero-valued empty leaves, built
        // here from the permutation alone; pins the poseidon parameters
        // to a previously recorded digest, so a silent change in the
        // constants or the field encoding fails loudly
        let mut empty = Element::ZERO;

        // leaf 3 pairs with the empty leaf 2
        let mut node = hash_merge([empty, Element::new(3)]);

        // its parent pairs with the empty two-leaf subtree on the left
        empty = hash_merge([empty, empty]);
        node = hash_merge([empty, node]);

        // everything above sits on the leftmost spine, so each level
        // pairs with the empty subtree of the same height on the right
        for _ in 0..61 {
            empty = hash_merge([empty, empty]);
            node = hash_merge([node, empty]);
        }

        assert_eq!(
            format!("0x{node:x}"),
            "0x26debce8a5ba1d092589121944bfc2cc55d858bcd7a697ec2fd1b832b4b20c40",
        );
    }

    #[test]
    fn hash_bytes_distinguishes_prefixes() {
        // the IV keeps the empty input from colliding with [0; 16]
        assert_ne!(hash_bytes(&[]), hash_bytes(&[0; 16]));
        assert_ne!(hash_bytes(&[1, 2, 3]), hash_bytes(&[1, 2, 3, 0]));
    }
}
