use std::ops::{Shl, Shr};

use ethnum::U256;

use crate::Element;

/// Implement a binary operation for [`Element`] and the unsigned ints
macro_rules! binop {
    ($trait:ident, $f:ident, $($t:tt)*) => {
        impl core::ops::$trait<Element> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: Element) -> Self::Output {
                Element(self.0 $($t)* rhs.0)
            }
        }

        impl core::ops::$trait<u64> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: u64) -> Self::Output {
                self $($t)* Element::from(rhs)
            }
        }

        impl core::ops::$trait<u128> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: u128) -> Self::Output {
                self $($t)* Element::from(rhs)
            }
        }
    };
}

binop!(Add, add, +);
binop!(Sub, sub, -);
binop!(Mul, mul, *);
binop!(Rem, rem, %);

impl Shl<u8> for Element {
    type Output = Element;

    fn shl(self, rhs: u8) -> Self::Output {
        U256::shl(self.0, rhs).into()
    }
}

impl Shr<u8> for Element {
    type Output = Element;

    fn shr(self, rhs: u8) -> Self::Output {
        U256::shr(self.0, rhs).into()
    }
}

impl core::iter::Sum<Element> for Element {
    fn sum<I: Iterator<Item = Element>>(iter: I) -> Self {
        iter.fold(Element::ZERO, |a, b| a + b)
    }
}
