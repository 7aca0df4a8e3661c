use zeroize::Zeroizing;

use crate::transforms::*;
use crate::PHI;
use crate::ROUNDS;

pub(crate) type Key = [u8; 32];
pub(crate) type Subkey = [u32; 4];
pub(crate) type Subkeys = [Subkey; ROUNDS + 1];

/// Pads the key material out to 256 bits: a single one bit directly after
/// the key, zeros after that. Callers have already checked the length.
pub(crate) fn expand_key(source: &[u8]) -> Zeroizing<Key> {
    debug_assert!(source.len() <= 32);
    let mut key = Zeroizing::new([0u8; 32]);
    key[..source.len()].copy_from_slice(source);
    if source.len() < key.len() {
        key[source.len()] |= 1;
    }
    key
}

pub(crate) fn derive_subkeys(key: &Key) -> Subkeys {
    use byteorder::{ByteOrder, LE};
    let mut w = Zeroizing::new([0u32; 140]);
    LE::read_u32_into(key, &mut w[..8]);

    for i in 0..132 {
        let slot = i + 8;
        w[slot] = (w[slot - 8] ^ w[slot - 5] ^ w[slot - 3] ^ w[slot - 1] ^ PHI ^ i as u32)
            .rotate_left(11);
    }

    let w = &w[8..];
    let mut subkeys = [[0u32; 4]; ROUNDS + 1];
    for (i, subkey) in subkeys.iter_mut().enumerate() {
        let s_idx = (ROUNDS + 3 - i) % ROUNDS;
        let src = [w[4 * i], w[4 * i + 1], w[4 * i + 2], w[4 * i + 3]];
        for j in 0..32 {
            let input = gather_nibble(&src, j);
            let output = apply_s(s_idx, input);
            scatter_nibble(output, subkey, j);
        }
    }
    subkeys
}

fn gather_nibble(words: &[u32; 4], bit_idx: usize) -> u8 {
    let mut output = 0u8;
    for (i, word) in words.iter().enumerate() {
        let bit = ((word >> bit_idx) & 1) as u8;
        output |= bit << i;
    }
    output
}

fn scatter_nibble(nibble: u8, words: &mut [u32; 4], out_bit_idx: usize) {
    for (i, word) in words.iter_mut().enumerate() {
        let bit = u32::from((nibble >> i) & 1);
        *word |= bit << out_bit_idx;
    }
}
