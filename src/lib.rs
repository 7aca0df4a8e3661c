//! # Serpent
//!
//! `serpent-modes` is an implementation of the
//! [Serpent cipher](https://www.cl.cam.ac.uk/~rja14/serpent.html) most
//! known for being one of the leading candidates for AES, together with the
//! machinery needed to encrypt whole messages with it: the ECB, CBC, CFB,
//! OFB and CTR chaining modes, five padding schemes and three ways of
//! combining a CTR nonce with its counter.
//!
//! The cipher runs in bitslice mode: the S-boxes are Boolean networks over
//! the four block words and the rounds are a loop, not an unrolled body.
//! It is validated against the published NESSIE vectors.
//!
//! ```
//! use serpent::{ChainingMode, PaddingScheme, SerpentManaged};
//!
//! let mut algorithm = SerpentManaged::new();
//! algorithm.set_mode(ChainingMode::Cbc);
//! algorithm.set_padding(PaddingScheme::Pkcs7);
//! let key = [7u8; 32];
//! let iv = [9u8; 16];
//!
//! let mut encryptor = algorithm.create_encryptor(Some(&key[..]), Some(&iv[..])).unwrap();
//! let ciphertext = encryptor.finalize(b"attack at dawn").unwrap();
//!
//! let mut decryptor = algorithm.create_decryptor(Some(&key[..]), Some(&iv[..])).unwrap();
//! assert_eq!(decryptor.finalize(&ciphertext).unwrap(), b"attack at dawn");
//! ```
//!
//! For easy interoperation with Rust crypto the cipher also implements
//! the `BlockCipher` trait from the `block-cipher-trait` crate.

mod algorithm;
mod codec;
mod config;
mod counter;
mod engine;
mod error;
mod keys;
mod mode;
mod padding;
mod permutation;
mod rng;
mod tables;
mod transforms;

pub use block_cipher_trait;
pub use block_cipher_trait::generic_array;
pub use generic_array::typenum;

pub use algorithm::SymmetricAlgorithm;
pub use codec::{bytes_to_words, write_words_into_bytes, Endianness, WordCodec};
pub use config::CipherConfiguration;
pub use engine::{BlockTransform, BLOCK_SIZE};
pub use error::{Error, Result};
pub use mode::{ChainingMode, NonceCombination, PaddingScheme, TransformDirection};
pub use permutation::{BlockPermutation, CipherAlgorithm, KeySizes};
pub use rng::{fill_random, random_bytes};

use block_cipher_trait::{BlockCipher, InvalidKeyLength};
use byteorder::{ByteOrder, LE};
use generic_array::GenericArray;
use typenum::{U1, U16, U32};
use zeroize::{Zeroize, ZeroizeOnDrop};

use transforms::{linear_transform, linear_transform_inv, xor_subkey, SBOXES, SBOXES_INV};

const PHI: u32 = 0x9e37_79b9;
const ROUNDS: usize = 32;

/// Serpent with chaining, padding and key management attached.
pub type SerpentManaged = SymmetricAlgorithm<Serpent>;

/// The Serpent cipher instance
///
/// Holds the 33 round subkeys; they are wiped when the instance is dropped.
/// Implements both a friendly `u128` encryption interface as well as the
/// common Rust crypto `block_cipher_trait::BlockCipher` trait.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Serpent {
    subkeys: keys::Subkeys,
}

impl Serpent {
    /// Constructs an instance from a little-endian binary key of 128,
    /// 192 or 256 bits.
    pub fn with_binary_key(key: &[u8]) -> Result<Serpent> {
        let bits = key.len() * 8;
        if !Self::LEGAL_KEY_SIZES.contains(bits) {
            return Err(Error::configuration(
                Self::NAME,
                format!("a key of {} bits is not a legal key size", bits),
            ));
        }
        Ok(Serpent::from_padded_key(&keys::expand_key(key)))
    }

    fn from_padded_key(key: &keys::Key) -> Serpent {
        Serpent {
            subkeys: keys::derive_subkeys(key),
        }
    }

    /// Easy encryption of a block stored in a 128-bit little-endian integer
    pub fn encrypt_block(&self, block: u128) -> u128 {
        let mut words = split(block);
        self.encrypt_words(&mut words);
        join(&words)
    }

    /// Easy decryption of a block stored in a 128-bit little-endian integer
    pub fn decrypt_block(&self, block: u128) -> u128 {
        let mut words = split(block);
        self.decrypt_words(&mut words);
        join(&words)
    }

    /// Runs the 32 rounds over a block in word form, word 0 least significant.
    pub fn encrypt_words(&self, x: &mut [u32; 4]) {
        for i in 0..ROUNDS {
            xor_subkey(x, &self.subkeys[i]);
            SBOXES[i % 8](x);
            if i <= ROUNDS - 2 {
                linear_transform(x);
            }
        }
        xor_subkey(x, &self.subkeys[ROUNDS]);
    }

    /// Exact inverse of [`encrypt_words`](Self::encrypt_words).
    pub fn decrypt_words(&self, x: &mut [u32; 4]) {
        xor_subkey(x, &self.subkeys[ROUNDS]);
        for i in (0..ROUNDS).rev() {
            if i <= ROUNDS - 2 {
                linear_transform_inv(x);
            }
            SBOXES_INV[i % 8](x);
            xor_subkey(x, &self.subkeys[i]);
        }
    }
}

impl std::fmt::Debug for Serpent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serpent").finish_non_exhaustive()
    }
}

impl BlockPermutation for Serpent {
    const NAME: &'static str = "Serpent";
    const ENDIANNESS: Endianness = Endianness::Little;

    fn encrypt(&self, block: &mut [u32; 4]) {
        self.encrypt_words(block)
    }

    fn decrypt(&self, block: &mut [u32; 4]) {
        self.decrypt_words(block)
    }
}

impl CipherAlgorithm for Serpent {
    const LEGAL_KEY_SIZES: KeySizes = KeySizes::new(128, 256, 64);
    const LEGAL_BLOCK_SIZES: KeySizes = KeySizes::new(128, 128, 0);

    fn with_key(key: &[u8]) -> Result<Self> {
        Serpent::with_binary_key(key)
    }
}

/// Implements BlockCipher with 256-bit keys as the favoured fixed key length.
/// 128- and 192-bit keys go through `new_varkey`.
impl BlockCipher for Serpent {
    type KeySize = U32;
    type BlockSize = U16;
    type ParBlocks = U1;

    fn new(key: &GenericArray<u8, U32>) -> Self {
        Serpent::from_padded_key(&keys::expand_key(key.as_slice()))
    }

    fn new_varkey(key: &[u8]) -> std::result::Result<Self, InvalidKeyLength> {
        Serpent::with_binary_key(key).map_err(|_| InvalidKeyLength)
    }

    fn encrypt_block(&self, block: &mut GenericArray<u8, Self::BlockSize>) {
        let mut words = [0u32; 4];
        LE::read_u32_into(block.as_slice(), &mut words);
        self.encrypt_words(&mut words);
        LE::write_u32_into(&words, block.as_mut_slice());
    }

    fn decrypt_block(&self, block: &mut GenericArray<u8, Self::BlockSize>) {
        let mut words = [0u32; 4];
        LE::read_u32_into(block.as_slice(), &mut words);
        self.decrypt_words(&mut words);
        LE::write_u32_into(&words, block.as_mut_slice());
    }
}

fn split(block: u128) -> [u32; 4] {
    [
        block as u32,
        (block >> 32) as u32,
        (block >> 64) as u32,
        (block >> 96) as u32,
    ]
}

fn join(words: &[u32; 4]) -> u128 {
    u128::from(words[0])
        | u128::from(words[1]) << 32
        | u128::from(words[2]) << 64
        | u128::from(words[3]) << 96
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_illegal_key_lengths() {
        for &len in &[0usize, 8, 15, 17, 20, 31, 33, 64] {
            let key = vec![0u8; len];
            assert!(
                matches!(
                    Serpent::with_binary_key(&key),
                    Err(Error::Configuration { .. })
                ),
                "{} bytes",
                len
            );
        }
    }

    #[test]
    fn words_and_u128_agree() {
        let cipher = Serpent::with_binary_key(&[0x42; 24]).unwrap();
        let block = 0x0011_2233_4455_6677_8899_aabb_ccdd_eeffu128;
        let mut words = split(block);
        cipher.encrypt_words(&mut words);
        assert_eq!(join(&words), cipher.encrypt_block(block));
        assert_eq!(cipher.decrypt_block(join(&words)), block);
    }

    #[test]
    fn block_cipher_trait_matches_u128_api() {
        let key = GenericArray::clone_from_slice(&[0x5a; 32]);
        let cipher = <Serpent as BlockCipher>::new(&key);
        let plain = [0x13u8; 16];
        let mut block = GenericArray::clone_from_slice(&plain);
        BlockCipher::encrypt_block(&cipher, &mut block);
        let expected = cipher.encrypt_block(u128::from_le_bytes(plain));
        let mut encrypted = [0u8; 16];
        encrypted.copy_from_slice(&block);
        assert_eq!(u128::from_le_bytes(encrypted), expected);
        BlockCipher::decrypt_block(&cipher, &mut block);
        assert_eq!(block.as_slice(), &plain);
    }

    #[test]
    fn new_varkey_checks_length() {
        assert!(<Serpent as BlockCipher>::new_varkey(&[1u8; 16]).is_ok());
        assert!(<Serpent as BlockCipher>::new_varkey(&[1u8; 24]).is_ok());
        assert!(<Serpent as BlockCipher>::new_varkey(&[1u8; 10]).is_err());
    }

    #[test]
    fn round_trip_every_key_size() {
        for &len in &[16usize, 24, 32] {
            let key: Vec<u8> = (0..len as u8).collect();
            let cipher = Serpent::with_binary_key(&key).unwrap();
            let block = 0xfeed_face_cafe_beef_0123_4567_89ab_cdefu128;
            assert_eq!(cipher.decrypt_block(cipher.encrypt_block(block)), block);
        }
    }
}
