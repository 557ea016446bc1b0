use std::fmt::{self, Debug, Display, LowerHex, UpperHex};

use ethnum::U256;

use crate::Element;

// elements print as bare lowercase hex: they are opaque digests far more
// often than small integers
impl Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        LowerHex::fmt(self, f)
    }
}

impl Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        LowerHex::fmt(self, f)
    }
}

impl LowerHex for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <U256 as LowerHex>::fmt(&self.0, f)
    }
}

impl UpperHex for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <U256 as UpperHex>::fmt(&self.0, f)
    }
}
