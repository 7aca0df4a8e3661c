//! The mode-of-operation state machine.
//!
//! A [`BlockTransform`] drives a [`BlockPermutation`] over a message one
//! block (or, in CFB and OFB, one register shift) at a time. It owns the
//! feedback register, the CTR counter and the block held back for padding
//! checks; all of them, and the permutation's key schedule, are wiped on
//! [`reset`](BlockTransform::reset), after [`finalize`](BlockTransform::finalize)
//! and on drop.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::codec::WordCodec;
use crate::config::CipherConfiguration;
use crate::counter::CounterBlock;
use crate::error::{Error, Result};
use crate::mode::{ChainingMode, PaddingScheme, TransformDirection};
use crate::permutation::BlockPermutation;

/// Block size in bytes of every permutation the engine drives.
pub const BLOCK_SIZE: usize = 16;

type Block = [u8; BLOCK_SIZE];

#[derive(Debug, Clone, Copy)]
struct Params {
    direction: TransformDirection,
    mode: ChainingMode,
    padding: PaddingScheme,
    shift: usize,
    codec: WordCodec,
}

impl Params {
    /// Decryption must hold back the last block seen until it knows whether
    /// that block carries the padding.
    fn holds_back_last_block(&self) -> bool {
        self.direction == TransformDirection::Decrypt
            && !matches!(self.padding, PaddingScheme::None | PaddingScheme::Zeros)
    }

    fn check_mode(&self) -> Result<()> {
        if self.mode == ChainingMode::Cts {
            return Err(Error::NotImplemented(ChainingMode::Cts));
        }
        Ok(())
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct ChainState {
    feedback: Block,
    /// CFB/OFB: cipher output for the segment in progress.
    keystream: Block,
    /// CFB/OFB: bytes to shift into `feedback` once the segment is complete.
    segment: Block,
    /// CFB/OFB: bytes of the current segment already used.
    position: usize,
    counter: Option<CounterBlock>,
    depad: Option<Block>,
}

struct Keyed<P: BlockPermutation> {
    permutation: P,
    state: ChainState,
}

/// An encryptor or decryptor for one message.
///
/// Not safe for concurrent use: every chaining mode except ECB threads
/// state from one call to the next, so calls must arrive in message order.
pub struct BlockTransform<P: BlockPermutation> {
    params: Params,
    keyed: Option<Keyed<P>>,
}

impl<P: BlockPermutation> BlockTransform<P> {
    /// Binds a keyed permutation to the mode, padding and IV of `config`.
    ///
    /// Every mode but ECB needs an IV. CTR with
    /// [`NonceCombination::Concatenate`](crate::NonceCombination::Concatenate)
    /// takes a nonce shorter than a block; the rest of the block holds the
    /// counter. Every other IV is exactly one block.
    pub fn new(
        permutation: P,
        iv: Option<&[u8]>,
        config: &CipherConfiguration,
        direction: TransformDirection,
    ) -> Result<BlockTransform<P>> {
        if config.block_size_bytes() != BLOCK_SIZE {
            return Err(Error::configuration(
                P::NAME,
                format!("only {}-bit blocks are supported", BLOCK_SIZE * 8),
            ));
        }
        if config.register_shift_size == 0 || config.register_shift_size > BLOCK_SIZE {
            return Err(Error::configuration(
                P::NAME,
                format!(
                    "register shift size must be 1 to {} bytes, got {}",
                    BLOCK_SIZE, config.register_shift_size
                ),
            ));
        }

        let mut state = ChainState {
            feedback: [0u8; BLOCK_SIZE],
            keystream: [0u8; BLOCK_SIZE],
            segment: [0u8; BLOCK_SIZE],
            position: 0,
            counter: None,
            depad: None,
        };
        if config.mode.needs_iv() {
            let iv = iv.ok_or_else(|| {
                Error::configuration(P::NAME, format!("{:?} mode needs an IV", config.mode))
            })?;
            if config.mode == ChainingMode::Ctr {
                state.counter = Some(CounterBlock::new(iv, config.nonce_combination, P::NAME)?);
            } else if iv.len() == BLOCK_SIZE {
                state.feedback.copy_from_slice(iv);
            } else {
                return Err(Error::configuration(
                    P::NAME,
                    format!("the IV must be {} bytes, got {}", BLOCK_SIZE, iv.len()),
                ));
            }
        }

        tracing::debug!(
            algorithm = P::NAME,
            mode = ?config.mode,
            padding = ?config.padding,
            direction = ?direction,
            register_shift_size = config.register_shift_size,
            "created block transform"
        );

        Ok(BlockTransform {
            params: Params {
                direction,
                mode: config.mode,
                padding: config.padding,
                shift: config.register_shift_size,
                codec: WordCodec::new(P::ENDIANNESS),
            },
            keyed: Some(Keyed { permutation, state }),
        })
    }

    pub fn direction(&self) -> TransformDirection {
        self.params.direction
    }

    pub fn mode(&self) -> ChainingMode {
        self.params.mode
    }

    pub fn input_block_size(&self) -> usize {
        BLOCK_SIZE
    }

    pub fn output_block_size(&self) -> usize {
        BLOCK_SIZE
    }

    pub fn can_transform_multiple_blocks(&self) -> bool {
        true
    }

    /// True when blocks do not depend on one another (ECB), so the order of
    /// `process_block` calls does not matter.
    pub fn can_reuse_transform(&self) -> bool {
        self.params.mode == ChainingMode::Ecb
    }

    /// Whether the key material is gone after a reset or a finalize.
    pub fn is_reset(&self) -> bool {
        self.keyed.is_none()
    }

    /// Transforms whole blocks from `input` into the front of `output` and
    /// returns the number of bytes written.
    ///
    /// `input` must be a positive multiple of the block size. When
    /// decrypting with a padding that has to be validated, the last block
    /// is held back until the next call or [`finalize`](Self::finalize), so
    /// the first such call writes one block less than it reads.
    pub fn process_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let params = self.params;
        params.check_mode()?;
        if input.is_empty() || input.len() % BLOCK_SIZE != 0 {
            return Err(Error::Length {
                len: input.len(),
                block_size: BLOCK_SIZE,
            });
        }
        let keyed = self.keyed_mut()?;

        if !params.holds_back_last_block() {
            let len = input.len();
            check_room(len, output)?;
            keyed.transform(&params, input, &mut output[..len])?;
            return Ok(len);
        }

        let (body, last) = input.split_at(input.len() - BLOCK_SIZE);
        match keyed.state.depad {
            None => {
                check_room(body.len(), output)?;
                keyed.transform(&params, body, &mut output[..body.len()])?;
                let mut held = [0u8; BLOCK_SIZE];
                held.copy_from_slice(last);
                keyed.state.depad = Some(held);
                Ok(body.len())
            }
            Some(held) => {
                let held = Zeroizing::new(held);
                check_room(input.len(), output)?;
                keyed.transform(&params, &held[..], &mut output[..BLOCK_SIZE])?;
                keyed.transform(&params, body, &mut output[BLOCK_SIZE..input.len()])?;
                if let Some(slot) = keyed.state.depad.as_mut() {
                    slot.copy_from_slice(last);
                }
                Ok(input.len())
            }
        }
    }

    /// Transforms the tail of the message and returns it.
    ///
    /// Encryption appends the padding; decryption validates and strips it,
    /// releasing nothing unless the padding checks out. On every outcome
    /// the transform is reset afterwards.
    pub fn finalize(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let result = match self.params.direction {
            TransformDirection::Encrypt => self.finalize_encrypt(input),
            TransformDirection::Decrypt => self.finalize_decrypt(input),
        };
        self.reset();
        result
    }

    /// Wipes the key schedule and all chaining state. The mode, padding and
    /// direction stay, but the transform cannot process data any more.
    pub fn reset(&mut self) {
        if self.keyed.take().is_some() {
            tracing::debug!(mode = ?self.params.mode, "block transform reset");
        }
    }

    fn finalize_encrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let params = self.params;
        params.check_mode()?;
        let pad = params.padding.pad_len(input.len(), BLOCK_SIZE, params.mode)?;
        let keyed = self.keyed_mut()?;

        let mut data = Zeroizing::new(Vec::with_capacity(input.len() + pad));
        data.extend_from_slice(input);
        data.resize(input.len() + pad, 0);
        params.padding.fill(&mut data[input.len()..]);

        let mut output = vec![0u8; data.len()];
        keyed.transform(&params, &data, &mut output)?;
        Ok(output)
    }

    fn finalize_decrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let params = self.params;
        params.check_mode()?;
        if !params.mode.is_stream_mode() && input.len() % BLOCK_SIZE != 0 {
            return Err(Error::Length {
                len: input.len(),
                block_size: BLOCK_SIZE,
            });
        }
        let keyed = self.keyed_mut()?;

        let mut data = Zeroizing::new(Vec::with_capacity(BLOCK_SIZE + input.len()));
        if let Some(held) = keyed.state.depad.as_mut() {
            data.extend_from_slice(&held[..]);
            held.zeroize();
        }
        keyed.state.depad = None;
        data.extend_from_slice(input);

        let mut output = Zeroizing::new(vec![0u8; data.len()]);
        keyed.transform(&params, &data, &mut output)?;
        let len = params
            .padding
            .unpadded_len(&output, BLOCK_SIZE)
            .map_err(|err| {
                tracing::warn!(padding = ?params.padding, %err, "rejected padding");
                err
            })?;
        Ok(output[..len].to_vec())
    }

    fn keyed_mut(&mut self) -> Result<&mut Keyed<P>> {
        self.keyed.as_mut().ok_or_else(|| {
            Error::configuration(P::NAME, "the transform has been reset; its key is gone")
        })
    }
}

impl<P: BlockPermutation> std::fmt::Debug for BlockTransform<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockTransform")
            .field("algorithm", &P::NAME)
            .field("params", &self.params)
            .field("reset", &self.is_reset())
            .finish()
    }
}

fn check_room(needed: usize, output: &[u8]) -> Result<()> {
    if output.len() < needed {
        return Err(Error::Buffer {
            needed,
            available: output.len(),
        });
    }
    Ok(())
}

fn permute<P: BlockPermutation>(
    permutation: &P,
    codec: &WordCodec,
    direction: TransformDirection,
    block: &mut Block,
) {
    let mut words = Zeroizing::new([0u32; 4]);
    codec.bytes_to_words(&block[..], &mut words[..]);
    match direction {
        TransformDirection::Encrypt => permutation.encrypt(&mut words),
        TransformDirection::Decrypt => permutation.decrypt(&mut words),
    }
    codec.words_to_bytes(&words[..], &mut block[..]);
}

/// Shifts `register` left by `shift` bytes and appends `fill[..shift]`.
fn shift_register(register: &mut Block, shift: usize, fill: &[u8]) {
    register.copy_within(shift.., 0);
    register[BLOCK_SIZE - shift..].copy_from_slice(&fill[..shift]);
}

impl<P: BlockPermutation> Keyed<P> {
    /// Runs the chaining mode over `input`, writing the same number of bytes
    /// to `output`. Only stream modes accept a trailing partial block.
    fn transform(&mut self, params: &Params, input: &[u8], output: &mut [u8]) -> Result<()> {
        debug_assert_eq!(input.len(), output.len());
        params.check_mode()?;
        if !params.mode.is_stream_mode() && input.len() % BLOCK_SIZE != 0 {
            return Err(Error::Length {
                len: input.len(),
                block_size: BLOCK_SIZE,
            });
        }
        match params.mode {
            ChainingMode::Cfb | ChainingMode::Ofb => {
                self.feedback_stream(params, input, output);
                Ok(())
            }
            ChainingMode::Cts => Err(Error::NotImplemented(ChainingMode::Cts)),
            ChainingMode::Ecb | ChainingMode::Cbc | ChainingMode::Ctr => {
                self.block_chain(params, input, output)
            }
        }
    }

    /// ECB, CBC and CTR, one block per permutation call.
    fn block_chain(&mut self, params: &Params, input: &[u8], output: &mut [u8]) -> Result<()> {
        let Keyed { permutation, state } = self;
        let codec = &params.codec;
        for (src, dst) in input.chunks(BLOCK_SIZE).zip(output.chunks_mut(BLOCK_SIZE)) {
            let n = src.len();
            let mut block = Zeroizing::new([0u8; BLOCK_SIZE]);
            block[..n].copy_from_slice(src);

            match (params.mode, params.direction) {
                (ChainingMode::Cbc, TransformDirection::Encrypt) => {
                    xor_into(&mut block[..], &state.feedback);
                    permute(permutation, codec, TransformDirection::Encrypt, &mut block);
                    state.feedback = *block;
                }
                (ChainingMode::Cbc, TransformDirection::Decrypt) => {
                    let ciphertext = Zeroizing::new(*block);
                    permute(permutation, codec, TransformDirection::Decrypt, &mut block);
                    xor_into(&mut block[..], &state.feedback);
                    state.feedback = *ciphertext;
                }
                (ChainingMode::Ctr, _) => {
                    let counter = state.counter.as_mut().ok_or_else(|| {
                        Error::configuration(P::NAME, "CTR mode has no counter block")
                    })?;
                    let mut keystream = Zeroizing::new([0u8; BLOCK_SIZE]);
                    counter.next_register(&mut keystream)?;
                    permute(permutation, codec, TransformDirection::Encrypt, &mut keystream);
                    xor_into(&mut block[..], &keystream[..]);
                }
                (_, direction) => permute(permutation, codec, direction, &mut block),
            }

            dst.copy_from_slice(&block[..n]);
        }
        Ok(())
    }

    /// CFB and OFB, a byte at a time. The register is refreshed every
    /// `shift` bytes, counted across calls, so splitting a message between
    /// calls never changes its output.
    fn feedback_stream(&mut self, params: &Params, input: &[u8], output: &mut [u8]) {
        let Keyed { permutation, state } = self;
        for (src, dst) in input.iter().zip(output.iter_mut()) {
            if state.position == 0 {
                state.keystream = state.feedback;
                permute(
                    permutation,
                    &params.codec,
                    TransformDirection::Encrypt,
                    &mut state.keystream,
                );
            }
            let pos = state.position;
            *dst = src ^ state.keystream[pos];
            state.segment[pos] = match (params.mode, params.direction) {
                (ChainingMode::Cfb, TransformDirection::Encrypt) => *dst,
                (ChainingMode::Cfb, TransformDirection::Decrypt) => *src,
                _ => state.keystream[pos],
            };
            state.position += 1;
            if state.position == params.shift {
                shift_register(&mut state.feedback, params.shift, &state.segment);
                state.position = 0;
            }
        }
    }
}

fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}
