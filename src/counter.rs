//! CTR register construction.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::engine::BLOCK_SIZE;
use crate::error::{Error, Result};
use crate::mode::NonceCombination;

/// Nonce plus running counter for one CTR message.
///
/// The counter is a big-endian number stored right-aligned in `counter`,
/// occupying its last `counter_size` bytes.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct CounterBlock {
    nonce: [u8; BLOCK_SIZE],
    counter: [u8; BLOCK_SIZE],
    counter_size: usize,
    initial: bool,
    #[zeroize(skip)]
    combination: NonceCombination,
}

impl CounterBlock {
    pub(crate) fn new(
        iv: &[u8],
        combination: NonceCombination,
        algorithm: &'static str,
    ) -> Result<CounterBlock> {
        let mut nonce = [0u8; BLOCK_SIZE];
        let mut counter = [0u8; BLOCK_SIZE];
        let counter_size = match combination {
            NonceCombination::Xor | NonceCombination::Add => {
                if iv.len() != BLOCK_SIZE {
                    return Err(Error::configuration(
                        algorithm,
                        format!(
                            "a {:?} counter needs a {}-byte IV, got {} bytes",
                            combination,
                            BLOCK_SIZE,
                            iv.len()
                        ),
                    ));
                }
                nonce.copy_from_slice(iv);
                if combination == NonceCombination::Add {
                    counter.copy_from_slice(iv);
                }
                BLOCK_SIZE
            }
            NonceCombination::Concatenate => {
                if iv.is_empty() || iv.len() >= BLOCK_SIZE {
                    return Err(Error::configuration(
                        algorithm,
                        format!(
                            "a concatenated nonce must be 1 to {} bytes, got {} bytes",
                            BLOCK_SIZE - 1,
                            iv.len()
                        ),
                    ));
                }
                nonce[..iv.len()].copy_from_slice(iv);
                BLOCK_SIZE - iv.len()
            }
        };
        Ok(CounterBlock {
            nonce,
            counter,
            counter_size,
            initial: true,
            combination,
        })
    }

    /// Advances the counter (except before the first block) and writes the
    /// register to encrypt for the next keystream block.
    pub(crate) fn next_register(&mut self, register: &mut [u8; BLOCK_SIZE]) -> Result<()> {
        if self.initial {
            self.initial = false;
        } else {
            self.increment()?;
        }
        let tail = BLOCK_SIZE - self.counter_size;
        match self.combination {
            NonceCombination::Concatenate => {
                register.copy_from_slice(&self.nonce);
                register[tail..].copy_from_slice(&self.counter[tail..]);
            }
            NonceCombination::Add => register.copy_from_slice(&self.counter),
            NonceCombination::Xor => {
                register.copy_from_slice(&self.nonce);
                for (r, c) in register[tail..].iter_mut().zip(&self.counter[tail..]) {
                    *r ^= c;
                }
            }
        }
        Ok(())
    }

    fn increment(&mut self) -> Result<()> {
        let window = &mut self.counter[BLOCK_SIZE - self.counter_size..];
        for byte in window.iter_mut().rev() {
            let (next, carry) = byte.overflowing_add(1);
            *byte = next;
            if !carry {
                return Ok(());
            }
        }
        tracing::warn!(counter_size = self.counter_size, "CTR counter exhausted");
        Err(Error::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registers(block: &mut CounterBlock, n: usize) -> Vec<[u8; BLOCK_SIZE]> {
        (0..n)
            .map(|_| {
                let mut register = [0u8; BLOCK_SIZE];
                block.next_register(&mut register).unwrap();
                register
            })
            .collect()
    }

    #[test]
    fn xor_counts_from_zero_over_the_nonce() {
        let iv = [0xf0u8; 16];
        let mut block = CounterBlock::new(&iv, NonceCombination::Xor, "test").unwrap();
        let regs = registers(&mut block, 3);
        assert_eq!(regs[0], iv);
        assert_eq!(regs[1][15], 0xf1);
        assert_eq!(regs[2][15], 0xf2);
        assert_eq!(&regs[2][..15], &iv[..15]);
    }

    #[test]
    fn concatenate_keeps_nonce_in_front() {
        let nonce = [0xaau8; 12];
        let mut block = CounterBlock::new(&nonce, NonceCombination::Concatenate, "test").unwrap();
        let regs = registers(&mut block, 2);
        assert_eq!(&regs[0][..12], &nonce);
        assert_eq!(&regs[0][12..], &[0, 0, 0, 0]);
        assert_eq!(&regs[1][12..], &[0, 0, 0, 1]);
    }

    #[test]
    fn add_carries_across_the_block() {
        let mut iv = [0u8; 16];
        iv[14] = 0x01;
        iv[15] = 0xff;
        let mut block = CounterBlock::new(&iv, NonceCombination::Add, "test").unwrap();
        let regs = registers(&mut block, 2);
        assert_eq!(regs[0], iv);
        assert_eq!(&regs[1][14..], &[0x02, 0x00]);
    }

    #[test]
    fn overflow_is_an_error() {
        let nonce = [7u8; 15];
        let mut block = CounterBlock::new(&nonce, NonceCombination::Concatenate, "test").unwrap();
        let regs = registers(&mut block, 256);
        assert_eq!(regs[255][15], 0xff);
        let mut register = [0u8; BLOCK_SIZE];
        assert_eq!(block.next_register(&mut register), Err(Error::Overflow));
    }

    #[test]
    fn add_overflows_at_all_ones() {
        let iv = [0xffu8; 16];
        let mut block = CounterBlock::new(&iv, NonceCombination::Add, "test").unwrap();
        let mut register = [0u8; BLOCK_SIZE];
        assert!(block.next_register(&mut register).is_ok());
        assert_eq!(block.next_register(&mut register), Err(Error::Overflow));
    }

    #[test]
    fn iv_length_checks() {
        assert!(CounterBlock::new(&[0u8; 8], NonceCombination::Xor, "test").is_err());
        assert!(CounterBlock::new(&[0u8; 16], NonceCombination::Concatenate, "test").is_err());
        assert!(CounterBlock::new(&[], NonceCombination::Concatenate, "test").is_err());
        assert!(CounterBlock::new(&[0u8; 8], NonceCombination::Concatenate, "test").is_ok());
    }
}
