//! Key assembly and the single block wrap.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;

use crate::config::KEY_LEN;
use crate::entropy::EntropySource;
use crate::error::Error;

/// Key bytes straight from the entropy source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKey(pub [u8; KEY_LEN]);

/// `RawKey` after the device key wrap; same length, no padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedKey(pub [u8; KEY_LEN]);

impl ProtectedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// One byte from `source` per key position, in order.
pub fn assemble_key<S: EntropySource>(source: &mut S) -> Result<RawKey, Error> {
    let mut key = [0u8; KEY_LEN];
    for byte in key.iter_mut() {
        *byte = source.next_byte()?;
    }
    Ok(RawKey(key))
}

/// Encrypt the whole key as one AES-128 block, no IV.
pub fn protect(raw: RawKey, device_key: &[u8; KEY_LEN]) -> ProtectedKey {
    let cipher = Aes128::new(GenericArray::from_slice(device_key));
    let RawKey(mut block) = raw;
    cipher.encrypt_block(GenericArray::from_mut_slice(&mut block));
    ProtectedKey(block)
}

/// Inverse of [`protect`] under the same device key.
pub fn unprotect(protected: &ProtectedKey, device_key: &[u8; KEY_LEN]) -> RawKey {
    let cipher = Aes128::new(GenericArray::from_slice(device_key));
    let mut block = protected.0;
    cipher.decrypt_block(GenericArray::from_mut_slice(&mut block));
    RawKey(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEVICE_KEY;
    use crate::entropy::fake::{FailAfter, Stream};
    use proptest::prelude::*;

    #[test]
    fn assembles_in_sampler_order() {
        let mut source = Stream::new((0u8..16).collect());
        let key = assemble_key(&mut source).unwrap();
        assert_eq!(key.0, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(source.calls, KEY_LEN);
    }

    #[test]
    fn degenerate_streams_still_fill_the_key() {
        for byte in [0x00, 0xFF] {
            let mut source = Stream::constant(byte);
            assert_eq!(assemble_key(&mut source).unwrap().0, [byte; KEY_LEN]);
            assert_eq!(source.calls, KEY_LEN);
        }
    }

    #[test]
    fn sampler_error_aborts_assembly() {
        assert_eq!(assemble_key(&mut FailAfter(5)), Err(Error::Motion));
    }

    #[test]
    fn fips197_vector() {
        // FIPS-197 appendix C.1
        let key: [u8; 16] = core::array::from_fn(|i| i as u8);
        let plain = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
        ];
        let expected = [
            0x69, 0xC4, 0xE0, 0xD8, 0x6A, 0x7B, 0x04, 0x30, 0xD8, 0xCD, 0xB7, 0x80, 0x70, 0xB4, 0xC5, 0x5A,
        ];
        assert_eq!(protect(RawKey(plain), &key).0, expected);
    }

    #[test]
    fn wrap_changes_the_bytes() {
        let raw = RawKey([0x42; KEY_LEN]);
        assert_ne!(protect(raw.clone(), &DEVICE_KEY).0, raw.0);
    }

    proptest! {
        #[test]
        fn unprotect_recovers_raw(bytes in any::<[u8; 16]>(), key in any::<[u8; 16]>()) {
            let protected = protect(RawKey(bytes), &key);
            prop_assert_eq!(unprotect(&protected, &key), RawKey(bytes));
        }
    }
}
