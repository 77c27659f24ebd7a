//! Scrypt password hashing.
//!
//! Stored format is `<hash hex>.<salt hex>`, verified with a constant-time
//! comparison.

use anyhow::anyhow;
use rand::RngCore;
use scrypt::Params;

const HASH_LEN: usize = 64;
const SALT_LEN: usize = 16;

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_LEN];
    scrypt::scrypt(password.as_bytes(), &salt, &params()?, &mut hash)
        .map_err(|e| anyhow!("scrypt failed: {e}"))?;

    Ok(format!("{}.{}", hex::encode(hash), hex::encode(salt)))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((hash_hex, salt_hex)) = stored.split_once('.') else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };

    let Ok(params) = params() else {
        return false;
    };
    let mut hash = [0u8; HASH_LEN];
    if scrypt::scrypt(password.as_bytes(), &salt, &params, &mut hash).is_err() {
        return false;
    }

    constant_time_eq::constant_time_eq(&hash, &expected)
}

fn params() -> anyhow::Result<Params> {
    // N = 2^14, r = 8, p = 1
    Params::new(14, 8, 1, HASH_LEN).map_err(|e| anyhow!("invalid scrypt params: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_roundtrip() {
        let stored = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn salts_are_unique() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_value_never_verifies() {
        assert!(!verify_password("anything", "not-a-hash"));
        assert!(!verify_password("anything", "zz.zz"));
        assert!(!verify_password("anything", ""));
    }
}
