//! Key and IV management in front of the transform engine.

use std::marker::PhantomData;

use zeroize::Zeroizing;

use crate::config::CipherConfiguration;
use crate::engine::BlockTransform;
use crate::error::{Error, Result};
use crate::mode::{ChainingMode, NonceCombination, PaddingScheme, TransformDirection};
use crate::permutation::{CipherAlgorithm, KeySizes};
use crate::rng;

/// A cipher `C` together with one configuration, a key and an IV.
///
/// The key and IV are created lazily: reading either one before it was set
/// draws it from the process random generator. Every transform made by
/// [`create_encryptor`](Self::create_encryptor) or
/// [`create_decryptor`](Self::create_decryptor) gets its own copy of the
/// expanded key, so this value can go on making transforms afterwards.
pub struct SymmetricAlgorithm<C: CipherAlgorithm> {
    config: CipherConfiguration,
    key: Option<Zeroizing<Vec<u8>>>,
    iv: Option<Vec<u8>>,
    cipher: PhantomData<fn() -> C>,
}

impl<C: CipherAlgorithm> SymmetricAlgorithm<C> {
    pub fn new() -> SymmetricAlgorithm<C> {
        SymmetricAlgorithm {
            config: CipherConfiguration::default(),
            key: None,
            iv: None,
            cipher: PhantomData,
        }
    }

    pub fn with_configuration(config: CipherConfiguration) -> Result<SymmetricAlgorithm<C>> {
        config.validate::<C>()?;
        Ok(SymmetricAlgorithm {
            config,
            ..SymmetricAlgorithm::new()
        })
    }

    pub fn configuration(&self) -> &CipherConfiguration {
        &self.config
    }

    pub fn legal_key_sizes(&self) -> KeySizes {
        C::LEGAL_KEY_SIZES
    }

    pub fn legal_block_sizes(&self) -> KeySizes {
        C::LEGAL_BLOCK_SIZES
    }

    pub fn valid_key_size(&self, bits: usize) -> bool {
        C::LEGAL_KEY_SIZES.contains(bits)
    }

    pub fn is_weak_key(&self, key: &[u8]) -> bool {
        C::is_weak_key(key)
    }

    /// Switches the chaining mode. A stored IV that the new mode cannot use
    /// is dropped.
    pub fn set_mode(&mut self, mode: ChainingMode) {
        self.config.mode = mode;
        self.drop_unfit_iv();
    }

    pub fn set_padding(&mut self, padding: PaddingScheme) {
        self.config.padding = padding;
    }

    pub fn set_nonce_combination(&mut self, combination: NonceCombination) {
        self.config.nonce_combination = combination;
        self.drop_unfit_iv();
    }

    pub fn set_register_shift_size(&mut self, bytes: usize) -> Result<()> {
        let config = self.config.with_register_shift_size(bytes);
        config.validate::<C>()?;
        self.config = config;
        Ok(())
    }

    pub fn set_block_size(&mut self, bits: usize) -> Result<()> {
        let config = self.config.with_block_size(bits);
        config.validate::<C>()?;
        self.config = config;
        Ok(())
    }

    /// Changes the key size. A stored key of another size is discarded and
    /// a new one is drawn when next needed.
    pub fn set_key_size(&mut self, bits: usize) -> Result<()> {
        let config = self.config.with_key_size(bits);
        config.validate::<C>()?;
        self.config = config;
        if self.key.as_ref().map_or(false, |key| key.len() * 8 != bits) {
            self.key = None;
        }
        Ok(())
    }

    /// A copy of the key, drawing one first if none is set.
    pub fn key(&mut self) -> Zeroizing<Vec<u8>> {
        if let Some(key) = &self.key {
            return key.clone();
        }
        self.store_new_key()
    }

    /// Stores `key` and adopts its size. Illegal sizes and weak keys are
    /// refused.
    pub fn set_key(&mut self, key: &[u8]) -> Result<()> {
        self.check_key(key)?;
        self.config.key_size = key.len() * 8;
        self.key = Some(Zeroizing::new(key.to_vec()));
        Ok(())
    }

    /// Draws and stores a new key of the configured size.
    pub fn generate_key(&mut self) {
        self.store_new_key();
    }

    /// Draws keys of the configured size until one is not weak.
    pub fn generate_non_weak_key(&self) -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; self.config.key_size / 8]);
        loop {
            rng::fill_random(&mut key);
            if !C::is_weak_key(&key) {
                return key;
            }
        }
    }

    /// A copy of the IV, drawing one first if none is set.
    pub fn iv(&mut self) -> Vec<u8> {
        if let Some(iv) = &self.iv {
            return iv.clone();
        }
        self.store_new_iv()
    }

    pub fn set_iv(&mut self, iv: &[u8]) -> Result<()> {
        if !self.iv_fits(iv.len()) {
            return Err(Error::configuration(
                C::NAME,
                format!(
                    "an IV of {} bytes does not fit {:?} mode",
                    iv.len(),
                    self.config.mode
                ),
            ));
        }
        self.iv = Some(iv.to_vec());
        Ok(())
    }

    /// Draws and stores a new IV. Under CTR with a concatenated nonce the
    /// IV is half a block, leaving the other half to the counter.
    pub fn generate_iv(&mut self) {
        self.store_new_iv();
    }

    /// Makes an encryptor. A missing key or IV falls back to the stored one,
    /// which is drawn at random if it was never set.
    pub fn create_encryptor(
        &mut self,
        key: Option<&[u8]>,
        iv: Option<&[u8]>,
    ) -> Result<BlockTransform<C>> {
        self.create_transform(key, iv, TransformDirection::Encrypt)
    }

    /// Makes a decryptor; key and IV fall back as in
    /// [`create_encryptor`](Self::create_encryptor).
    pub fn create_decryptor(
        &mut self,
        key: Option<&[u8]>,
        iv: Option<&[u8]>,
    ) -> Result<BlockTransform<C>> {
        self.create_transform(key, iv, TransformDirection::Decrypt)
    }

    fn create_transform(
        &mut self,
        key: Option<&[u8]>,
        iv: Option<&[u8]>,
        direction: TransformDirection,
    ) -> Result<BlockTransform<C>> {
        self.config.validate::<C>()?;

        let permutation = match key {
            Some(key) => {
                self.check_key(key)?;
                C::with_key(key)?
            }
            None => C::with_key(&self.key())?,
        };

        let stored;
        let iv = match (self.config.mode.needs_iv(), iv) {
            (false, _) => None,
            (true, Some(iv)) => Some(iv),
            (true, None) => {
                stored = self.iv();
                Some(&stored[..])
            }
        };

        BlockTransform::new(permutation, iv, &self.config, direction)
    }

    fn store_new_key(&mut self) -> Zeroizing<Vec<u8>> {
        let key = self.generate_non_weak_key();
        self.key = Some(key.clone());
        tracing::debug!(
            algorithm = C::NAME,
            key_size = self.config.key_size,
            "generated key"
        );
        key
    }

    fn store_new_iv(&mut self) -> Vec<u8> {
        let block = self.config.block_size_bytes();
        let len = if self.concatenates_nonce() {
            block / 2
        } else {
            block
        };
        let iv = rng::random_bytes(len);
        self.iv = Some(iv.clone());
        tracing::debug!(algorithm = C::NAME, len, "generated IV");
        iv
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        if !C::LEGAL_KEY_SIZES.contains(key.len() * 8) {
            return Err(Error::configuration(
                C::NAME,
                format!("a key of {} bits is not a legal key size", key.len() * 8),
            ));
        }
        if C::is_weak_key(key) {
            return Err(Error::configuration(C::NAME, "the specified key is a weak one"));
        }
        Ok(())
    }

    fn concatenates_nonce(&self) -> bool {
        self.config.mode == ChainingMode::Ctr
            && self.config.nonce_combination == NonceCombination::Concatenate
    }

    fn iv_fits(&self, len: usize) -> bool {
        let block = self.config.block_size_bytes();
        if self.concatenates_nonce() {
            len > 0 && len < block
        } else {
            len == block
        }
    }

    fn drop_unfit_iv(&mut self) {
        if let Some(len) = self.iv.as_ref().map(Vec::len) {
            if !self.iv_fits(len) {
                self.iv = None;
            }
        }
    }
}

impl<C: CipherAlgorithm> Default for SymmetricAlgorithm<C> {
    fn default() -> Self {
        SymmetricAlgorithm::new()
    }
}

impl<C: CipherAlgorithm> std::fmt::Debug for SymmetricAlgorithm<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricAlgorithm")
            .field("algorithm", &C::NAME)
            .field("config", &self.config)
            .field("has_key", &self.key.is_some())
            .field("has_iv", &self.iv.is_some())
            .finish()
    }
}
