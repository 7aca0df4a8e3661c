//! Conversion between byte buffers and 32-bit word arrays.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order used to pack bytes into the words a permutation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

type ReadWords = fn(&[u8], &mut [u32]);
type WriteWords = fn(&[u32], &mut [u8]);

/// A pair of word/byte conversions fixed to one byte order.
///
/// Both directions expect `bytes.len() == 4 * words.len()`.
#[derive(Clone, Copy)]
pub struct WordCodec {
    endianness: Endianness,
    read: ReadWords,
    write: WriteWords,
}

impl WordCodec {
    pub fn new(endianness: Endianness) -> WordCodec {
        match endianness {
            Endianness::Little => WordCodec {
                endianness,
                read: LittleEndian::read_u32_into,
                write: LittleEndian::write_u32_into,
            },
            Endianness::Big => WordCodec {
                endianness,
                read: BigEndian::read_u32_into,
                write: BigEndian::write_u32_into,
            },
        }
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// # Panics
    ///
    /// Panics if `bytes.len() != 4 * words.len()`.
    pub fn bytes_to_words(&self, bytes: &[u8], words: &mut [u32]) {
        (self.read)(bytes, words)
    }

    /// # Panics
    ///
    /// Panics if `bytes.len() != 4 * words.len()`.
    pub fn words_to_bytes(&self, words: &[u32], bytes: &mut [u8]) {
        (self.write)(words, bytes)
    }
}

impl std::fmt::Debug for WordCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordCodec")
            .field("endianness", &self.endianness)
            .finish()
    }
}

/// Unpacks a whole buffer into words. Trailing bytes short of a word are ignored.
pub fn bytes_to_words(bytes: &[u8], endianness: Endianness) -> Vec<u32> {
    let whole = bytes.len() / 4 * 4;
    let mut words = vec![0u32; whole / 4];
    WordCodec::new(endianness).bytes_to_words(&bytes[..whole], &mut words);
    words
}

/// Packs words back into `bytes`, which must hold exactly `4 * words.len()` bytes.
///
/// # Panics
///
/// Panics if `bytes` has any other length.
pub fn write_words_into_bytes(words: &[u32], bytes: &mut [u8], endianness: Endianness) {
    WordCodec::new(endianness).words_to_bytes(words, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BYTES: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0xa0, 0xb0, 0xc0, 0xd0];

    #[test]
    fn little_endian_words() {
        assert_eq!(
            bytes_to_words(&BYTES, Endianness::Little),
            vec![0x0403_0201, 0xd0c0_b0a0]
        );
    }

    #[test]
    fn big_endian_words() {
        assert_eq!(
            bytes_to_words(&BYTES, Endianness::Big),
            vec![0x0102_0304, 0xa0b0_c0d0]
        );
    }

    #[test]
    fn writes_back_same_bytes() {
        for &endianness in &[Endianness::Big, Endianness::Little] {
            let words = bytes_to_words(&BYTES, endianness);
            let mut out = [0u8; 8];
            write_words_into_bytes(&words, &mut out, endianness);
            assert_eq!(out, BYTES);
        }
    }

    #[test]
    #[should_panic]
    fn writing_into_a_short_buffer_panics() {
        let mut out = [0u8; 7];
        write_words_into_bytes(&[1, 2], &mut out, Endianness::Little);
    }

    #[test]
    #[should_panic]
    fn codec_checks_word_count() {
        let mut words = [0u32; 3];
        WordCodec::new(Endianness::Big).bytes_to_words(&BYTES, &mut words);
    }

    #[test]
    fn partial_word_is_dropped() {
        assert_eq!(bytes_to_words(&BYTES[..6], Endianness::Big), vec![0x0102_0304]);
    }
}
