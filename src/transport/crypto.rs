//! Frame-level AEAD stage.
//!
//! Models the host's encryption stage in the chain: each frame payload is
//! sealed with ChaCha20-Poly1305 under a per-direction counter nonce.
//! Counters advance per frame on each side; the transform itself never
//! sees ciphertext — frames reach it after this stage has already been
//! peeled.

use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};

use crate::error::{ProtocolError, Result};

/// Per-connection frame cipher with independent seal/open counters.
pub struct FrameCipher {
    cipher: ChaCha20Poly1305,
    seal_counter: u64,
    open_counter: u64,
}

impl FrameCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
            seal_counter: 0,
            open_counter: 0,
        }
    }

    fn nonce(counter: u64) -> Nonce {
        let mut bytes = [0u8; 12];
        bytes[4..].copy_from_slice(&counter.to_be_bytes());
        *Nonce::from_slice(&bytes)
    }

    pub fn seal(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Self::nonce(self.seal_counter);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| ProtocolError::EncryptionFailure)?;
        self.seal_counter += 1;
        Ok(sealed)
    }

    pub fn open(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Self::nonce(self.open_counter);
        let opened = self
            .cipher
            .decrypt(&nonce, ciphertext)
            .map_err(|_| ProtocolError::DecryptionFailure)?;
        self.open_counter += 1;
        Ok(opened)
    }
}
