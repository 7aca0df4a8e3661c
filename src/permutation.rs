//! The seams between the chaining engine and a concrete block cipher.

use zeroize::ZeroizeOnDrop;

use crate::codec::Endianness;
use crate::error::Result;

/// A keyed 128-bit block permutation, operating on four words.
///
/// The chaining engine only ever sees a cipher through this trait, so any
/// 128-bit cipher can run under the same modes and padding.
///
/// Implementors hold a key schedule and must wipe it when dropped; the
/// engine relies on dropping the permutation to clear the key on reset.
/// A permutation that does not implement [`ZeroizeOnDrop`] is refused:
///
/// ```compile_fail
/// use serpent::{BlockPermutation, Endianness};
///
/// struct Leaky([u32; 4]);
///
/// impl BlockPermutation for Leaky {
///     const NAME: &'static str = "Leaky";
///     const ENDIANNESS: Endianness = Endianness::Little;
///
///     fn encrypt(&self, block: &mut [u32; 4]) {
///         block.iter_mut().zip(&self.0).for_each(|(b, k)| *b ^= k);
///     }
///
///     fn decrypt(&self, block: &mut [u32; 4]) {
///         self.encrypt(block)
///     }
/// }
/// ```
pub trait BlockPermutation: ZeroizeOnDrop {
    /// Name used in configuration errors.
    const NAME: &'static str;
    /// Byte order used to load a block into its four words.
    const ENDIANNESS: Endianness;

    fn encrypt(&self, block: &mut [u32; 4]);
    fn decrypt(&self, block: &mut [u32; 4]);
}

/// A set of legal sizes in bits: `min_bits..=max_bits` in steps of `skip_bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySizes {
    pub min_bits: usize,
    pub max_bits: usize,
    pub skip_bits: usize,
}

impl KeySizes {
    pub const fn new(min_bits: usize, max_bits: usize, skip_bits: usize) -> KeySizes {
        KeySizes {
            min_bits,
            max_bits,
            skip_bits,
        }
    }

    pub fn contains(&self, bits: usize) -> bool {
        if bits < self.min_bits || bits > self.max_bits {
            return false;
        }
        if self.skip_bits == 0 {
            return bits == self.min_bits;
        }
        (bits - self.min_bits) % self.skip_bits == 0
    }

    /// Every legal size in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let KeySizes {
            min_bits,
            max_bits,
            skip_bits,
        } = *self;
        let step = skip_bits.max(1);
        (min_bits..=max_bits)
            .step_by(step)
            .take(if skip_bits == 0 { 1 } else { usize::MAX })
    }
}

/// Static facts about a cipher plus the constructor from raw key bytes.
pub trait CipherAlgorithm: BlockPermutation + Sized {
    const LEGAL_KEY_SIZES: KeySizes;
    const LEGAL_BLOCK_SIZES: KeySizes;

    /// Algorithm-specific weak key check. No key is weak unless a cipher
    /// says otherwise.
    fn is_weak_key(_key: &[u8]) -> bool {
        false
    }

    /// Runs the key schedule. Fails only for key lengths outside
    /// [`LEGAL_KEY_SIZES`](Self::LEGAL_KEY_SIZES).
    fn with_key(key: &[u8]) -> Result<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serpent_style_key_sizes() {
        let sizes = KeySizes::new(128, 256, 64);
        assert!(sizes.contains(128));
        assert!(sizes.contains(192));
        assert!(sizes.contains(256));
        assert!(!sizes.contains(64));
        assert!(!sizes.contains(160));
        assert!(!sizes.contains(320));
        assert_eq!(sizes.iter().collect::<Vec<_>>(), vec![128, 192, 256]);
    }

    #[test]
    fn fixed_size() {
        let sizes = KeySizes::new(128, 128, 0);
        assert!(sizes.contains(128));
        assert!(!sizes.contains(136));
        assert_eq!(sizes.iter().collect::<Vec<_>>(), vec![128]);
    }
}
