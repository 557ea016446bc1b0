//! Fixed-width big-endian borsh encoding
//!
//! 32 bytes on the wire, always; with `de_strict_order` this keeps the
//! encoding a bijection, which the keccak-over-borsh hashing relies on.

use std::io;

use borsh::{BorshDeserialize, BorshSerialize};
use ethnum::U256;

use super::Element;

impl BorshSerialize for Element {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_be_bytes())
    }
}

impl BorshDeserialize for Element {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let mut bytes = [0u8; 32];
        reader.read_exact(&mut bytes)?;
        Ok(Self(U256::from_be_bytes(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_fixed_width_big_endian() {
        let bytes = borsh::to_vec(&Element::new(0x0102)).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[30..], &[1, 2]);

        let back: Element = borsh::from_slice(&bytes).unwrap();
        assert_eq!(back, Element::new(0x0102));
    }
}
