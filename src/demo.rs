//! Text encrypt/decrypt demo used by the boot self-test.
//!
//! Text is padded to a whole number of blocks (always adding at least one pad
//! byte, each pad byte holding the pad length), encrypted with AES-128-CBC
//! under a fixed IV, decrypted again and unpadded.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes128;
use core::fmt;

use crate::config::{BLOCK_SIZE, DEMO_IV, KEY_LEN};
use crate::error::Error;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Largest padded message the demo handles
pub const MAX_DEMO_LEN: usize = 64;

/// Padded length for an `input_len` byte message.
pub fn padded_len(input_len: usize) -> usize {
    (input_len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// Copy `input` into `out` and pad it. Returns the padded length.
pub fn pad(input: &[u8], out: &mut [u8]) -> Result<usize, Error> {
    let len = padded_len(input.len());
    if out.len() < len {
        return Err(Error::BufferTooSmall);
    }
    let pad = (len - input.len()) as u8;
    out[..input.len()].copy_from_slice(input);
    out[input.len()..len].fill(pad);
    Ok(len)
}

/// Strip padding using the last byte. Only the last byte is checked, against
/// `1..=BLOCK_SIZE`.
pub fn unpad(data: &[u8]) -> Result<&[u8], Error> {
    let pad = usize::from(*data.last().ok_or(Error::Padding)?);
    if pad == 0 || pad > BLOCK_SIZE || pad > data.len() {
        return Err(Error::Padding);
    }
    Ok(&data[..data.len() - pad])
}

/// Encrypt whole blocks in place.
pub fn encrypt_cbc(data: &mut [u8], key: &[u8; KEY_LEN]) -> Result<(), Error> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::Padding);
    }
    let mut enc = Aes128CbcEnc::new(GenericArray::from_slice(key), GenericArray::from_slice(&DEMO_IV));
    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        enc.encrypt_block_mut(GenericArray::from_mut_slice(block));
    }
    Ok(())
}

/// Decrypt whole blocks in place.
pub fn decrypt_cbc(data: &mut [u8], key: &[u8; KEY_LEN]) -> Result<(), Error> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::Padding);
    }
    let mut dec = Aes128CbcDec::new(GenericArray::from_slice(key), GenericArray::from_slice(&DEMO_IV));
    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        dec.decrypt_block_mut(GenericArray::from_mut_slice(block));
    }
    Ok(())
}

/// Result of running a message through the demo
pub struct RoundTrip {
    buf: [u8; MAX_DEMO_LEN],
    padded_len: usize,
    plain_len: usize,
    ciphertext: [u8; MAX_DEMO_LEN],
}

impl RoundTrip {
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext[..self.padded_len]
    }

    /// Recovered text with padding removed.
    pub fn plaintext(&self) -> &[u8] {
        &self.buf[..self.plain_len]
    }
}

/// Pad, encrypt, decrypt and unpad `text`.
pub fn round_trip(text: &[u8], key: &[u8; KEY_LEN]) -> Result<RoundTrip, Error> {
    let mut buf = [0u8; MAX_DEMO_LEN];
    let padded_len = pad(text, &mut buf)?;
    encrypt_cbc(&mut buf[..padded_len], key)?;

    let mut ciphertext = [0u8; MAX_DEMO_LEN];
    ciphertext[..padded_len].copy_from_slice(&buf[..padded_len]);

    decrypt_cbc(&mut buf[..padded_len], key)?;
    let plain_len = unpad(&buf[..padded_len])?.len();

    Ok(RoundTrip {
        buf,
        padded_len,
        plain_len,
        ciphertext,
    })
}

/// Space separated hex, two digits per byte.
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}
