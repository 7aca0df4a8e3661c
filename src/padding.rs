use crate::error::{Error, Result};
use crate::mode::{ChainingMode, PaddingScheme};
use crate::rng;

impl PaddingScheme {
    /// Number of bytes to append to a final run of `len` message bytes.
    pub(crate) fn pad_len(self, len: usize, block_size: usize, mode: ChainingMode) -> Result<usize> {
        let partial = len % block_size;
        match self {
            PaddingScheme::None if partial != 0 && !mode.is_stream_mode() => {
                Err(Error::Length { len, block_size })
            }
            PaddingScheme::None => Ok(0),
            PaddingScheme::Zeros if partial == 0 => Ok(0),
            PaddingScheme::Zeros
            | PaddingScheme::Pkcs7
            | PaddingScheme::AnsiX923
            | PaddingScheme::Iso10126 => Ok(block_size - partial),
        }
    }

    /// Writes the padding into `pad`, which is exactly as long as the padding.
    pub(crate) fn fill(self, pad: &mut [u8]) {
        let count = pad.len() as u8;
        match self {
            PaddingScheme::None | PaddingScheme::Zeros => pad.iter_mut().for_each(|b| *b = 0),
            PaddingScheme::Pkcs7 => pad.iter_mut().for_each(|b| *b = count),
            PaddingScheme::AnsiX923 => {
                pad.iter_mut().for_each(|b| *b = 0);
                if let Some(last) = pad.last_mut() {
                    *last = count;
                }
            }
            PaddingScheme::Iso10126 => {
                rng::fill_random(pad);
                if let Some(last) = pad.last_mut() {
                    *last = count;
                }
            }
        }
    }

    /// Validates the padding at the end of a fully decrypted message and
    /// returns the length of the message without it.
    ///
    /// `None` and `Zeros` never strip anything: zero fill cannot be told
    /// apart from zero plaintext.
    pub(crate) fn unpadded_len(self, data: &[u8], block_size: usize) -> Result<usize> {
        let check_bytes = match self {
            PaddingScheme::None | PaddingScheme::Zeros => return Ok(data.len()),
            PaddingScheme::Pkcs7 | PaddingScheme::AnsiX923 => true,
            PaddingScheme::Iso10126 => false,
        };
        let count = match data.last() {
            Some(&count) => usize::from(count),
            None => {
                return Err(Error::Padding {
                    reason: "message has no padding block",
                })
            }
        };
        if count == 0 || count > block_size || count > data.len() {
            return Err(Error::Padding {
                reason: "pad count out of range",
            });
        }
        if check_bytes {
            let expected = if self == PaddingScheme::Pkcs7 { count as u8 } else { 0 };
            let fill = &data[data.len() - count..data.len() - 1];
            if fill.iter().any(|&b| b != expected) {
                return Err(Error::Padding {
                    reason: "pad bytes do not match the pad count",
                });
            }
        }
        Ok(data.len() - count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: usize = 16;

    fn padded(scheme: PaddingScheme, msg: &[u8]) -> Vec<u8> {
        let n = scheme.pad_len(msg.len(), BLOCK, ChainingMode::Cbc).unwrap();
        let mut out = msg.to_vec();
        out.resize(msg.len() + n, 0xee);
        scheme.fill(&mut out[msg.len()..]);
        out
    }

    #[test]
    fn pkcs7_always_pads() {
        let out = padded(PaddingScheme::Pkcs7, &[1u8; 16]);
        assert_eq!(out.len(), 32);
        assert!(out[16..].iter().all(|&b| b == 16));

        let out = padded(PaddingScheme::Pkcs7, &[1u8; 13]);
        assert_eq!(&out[13..], &[3, 3, 3]);
        assert_eq!(PaddingScheme::Pkcs7.unpadded_len(&out, BLOCK), Ok(13));
    }

    #[test]
    fn zeros_only_pads_partial_blocks() {
        assert_eq!(PaddingScheme::Zeros.pad_len(32, BLOCK, ChainingMode::Cbc), Ok(0));
        let out = padded(PaddingScheme::Zeros, &[9u8; 5]);
        assert_eq!(out.len(), 16);
        assert!(out[5..].iter().all(|&b| b == 0));
        assert_eq!(PaddingScheme::Zeros.unpadded_len(&out, BLOCK), Ok(16));
    }

    #[test]
    fn ansi_x923_layout() {
        let out = padded(PaddingScheme::AnsiX923, &[0xffu8; 12]);
        assert_eq!(&out[12..], &[0, 0, 0, 4]);
        assert_eq!(PaddingScheme::AnsiX923.unpadded_len(&out, BLOCK), Ok(12));
    }

    #[test]
    fn iso10126_only_fixes_count() {
        let out = padded(PaddingScheme::Iso10126, &[0u8; 6]);
        assert_eq!(out.len(), 16);
        assert_eq!(out[15], 10);
        assert_eq!(PaddingScheme::Iso10126.unpadded_len(&out, BLOCK), Ok(6));
    }

    #[test]
    fn none_needs_alignment_outside_stream_modes() {
        assert_eq!(
            PaddingScheme::None.pad_len(17, BLOCK, ChainingMode::Ecb),
            Err(Error::Length {
                len: 17,
                block_size: BLOCK
            })
        );
        assert_eq!(PaddingScheme::None.pad_len(17, BLOCK, ChainingMode::Ofb), Ok(0));
        assert_eq!(PaddingScheme::None.pad_len(32, BLOCK, ChainingMode::Cbc), Ok(0));
    }

    #[test]
    fn rejects_bad_counts() {
        let mut block = [4u8; 16];
        block[15] = 0;
        assert!(PaddingScheme::Pkcs7.unpadded_len(&block, BLOCK).is_err());
        block[15] = 17;
        assert!(PaddingScheme::Pkcs7.unpadded_len(&block, BLOCK).is_err());
        block[15] = 17;
        assert!(PaddingScheme::Iso10126.unpadded_len(&block, BLOCK).is_err());
        assert!(PaddingScheme::AnsiX923.unpadded_len(&[], BLOCK).is_err());
    }

    #[test]
    fn rejects_bad_fill() {
        let mut out = padded(PaddingScheme::Pkcs7, &[1u8; 10]);
        out[11] ^= 1;
        assert_eq!(
            PaddingScheme::Pkcs7.unpadded_len(&out, BLOCK),
            Err(Error::Padding {
                reason: "pad bytes do not match the pad count"
            })
        );

        let mut out = padded(PaddingScheme::AnsiX923, &[1u8; 10]);
        out[10] = 1;
        assert!(PaddingScheme::AnsiX923.unpadded_len(&out, BLOCK).is_err());
    }
}
