//! AES-256-CBC encryption support for VARC archives.
//!
//! The format encrypts entry payloads with AES-256-CBC and PKCS#7 padding.
//! Keys are derived from a password with PBKDF2-HMAC-SHA-256 at 100 000
//! iterations over the 32-byte salt stored in the global header; the 16-byte
//! IV is likewise stored in the header and shared by every entry.
//!
//! Integrity is not provided by the cipher: the format stores a SHA-256 of
//! each entry's original plaintext instead (no authentication tag fits the
//! 64-byte header). A padding failure on decrypt therefore means a wrong
//! key, a wrong IV, or tampered ciphertext, and the caller is expected to
//! confirm with the stored digest.

mod password;

pub use password::Password;

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{Error, Result};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;
/// AES block and IV size in bytes.
pub const IV_SIZE: usize = 16;
/// PBKDF2 salt size in bytes.
pub const SALT_SIZE: usize = 32;
/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;
/// PBKDF2-HMAC-SHA-256 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Overwrites a buffer with zeros, then random bytes, then zeros again.
///
/// The final pass uses volatile writes so the compiler cannot elide it.
fn wipe(buf: &mut [u8]) {
    buf.zeroize();
    OsRng.fill_bytes(buf);
    buf.zeroize();
}

/// Derives a 256-bit key from a password and salt.
///
/// Uses PBKDF2-HMAC-SHA-256 with [`PBKDF2_ROUNDS`] iterations.
///
/// # Errors
///
/// Returns [`Error::EmptyPassword`] when the password is empty.
pub fn derive_key(password: &Password, salt: &[u8]) -> Result<[u8; KEY_SIZE]> {
    if password.is_empty() {
        return Err(Error::EmptyPassword);
    }
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    Ok(key)
}

/// Generates a fresh random salt from the OS CSPRNG.
pub fn random_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Generates a fresh random IV from the OS CSPRNG.
pub fn random_iv() -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// An AES-256-CBC cipher bound to one key and IV.
///
/// The key and IV are wiped from memory when the cipher is dropped or
/// explicitly [`clear`](Cipher::clear)ed.
pub struct Cipher {
    key: [u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
}

impl Cipher {
    /// Creates a cipher from an explicit key and IV.
    pub fn new(key: [u8; KEY_SIZE], iv: [u8; IV_SIZE]) -> Self {
        Self { key, iv }
    }

    /// Creates a cipher by deriving the key from a password and salt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPassword`] when the password is empty.
    pub fn from_password(password: &Password, salt: &[u8], iv: [u8; IV_SIZE]) -> Result<Self> {
        Ok(Self {
            key: derive_key(password, salt)?,
            iv,
        })
    }

    /// Encrypts a plaintext with PKCS#7 padding.
    ///
    /// The output length is always the next block multiple strictly greater
    /// than the input length: `((len / 16) + 1) * 16`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    /// Decrypts a ciphertext and strips PKCS#7 padding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadPadding`] when the input is empty, not a block
    /// multiple, or the padding check fails, indicating a wrong key, wrong
    /// IV, or tampered data.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(Error::BadPadding);
        }
        Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| Error::BadPadding)
    }

    /// Wipes the key and IV, leaving the cipher unusable.
    pub fn clear(&mut self) {
        wipe(&mut self.key);
        wipe(&mut self.iv);
    }
}

impl Drop for Cipher {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}

/// The key, IV, and salt of an unlocked-for-use archive.
///
/// Present on an [`Archive`](crate::Archive) exactly while encrypted
/// payloads can be produced or consumed. All three buffers are wiped when
/// the value is dropped.
pub struct KeyMaterial {
    key: [u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
    salt: [u8; SALT_SIZE],
}

impl KeyMaterial {
    /// Derives key material from a password against an existing salt and IV.
    pub fn from_password(
        password: &Password,
        salt: [u8; SALT_SIZE],
        iv: [u8; IV_SIZE],
    ) -> Result<Self> {
        Ok(Self {
            key: derive_key(password, &salt)?,
            iv,
            salt,
        })
    }

    /// Derives key material with a freshly generated salt and IV.
    pub fn generate(password: &Password) -> Result<Self> {
        Self::from_password(password, random_salt(), random_iv())
    }

    /// Returns a cipher for this key material.
    pub fn cipher(&self) -> Cipher {
        Cipher::new(self.key, self.iv)
    }

    /// Returns the salt.
    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    /// Returns the IV.
    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        wipe(&mut self.key);
        wipe(&mut self.iv);
        wipe(&mut self.salt);
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial").finish_non_exhaustive()
    }
}
