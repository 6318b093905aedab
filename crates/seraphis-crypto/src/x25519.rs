//! X25519 keys for Jamtis address view keys and enote ephemeral keys.
//!
//! Secret keys are ordinary scalars; public keys are Montgomery u-coordinates.

use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;

pub type X25519Pubkey = MontgomeryPoint;

/// xK = xk * xG
pub fn x25519_pubkey(secret: &Scalar) -> X25519Pubkey {
    MontgomeryPoint::mul_base(secret)
}

/// xK' = xk * xK
pub fn x25519_scmul(secret: &Scalar, pubkey: &X25519Pubkey) -> X25519Pubkey {
    pubkey * secret
}

/// Random x25519 secret key (nonzero).
pub fn x25519_secret_key_gen() -> Scalar {
    crate::random_mask()
}

/// The scalar 1/8, used to build an ephemeral key that another output's
/// derivation will multiply back up by 8.
pub fn x25519_inv_eight() -> Scalar {
    crate::inv_eight()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x25519_dh_agrees() {
        let a = x25519_secret_key_gen();
        let b = x25519_secret_key_gen();
        let shared_ab = x25519_scmul(&a, &x25519_pubkey(&b));
        let shared_ba = x25519_scmul(&b, &x25519_pubkey(&a));
        assert_eq!(shared_ab, shared_ba);
    }

    #[test]
    fn test_inv_eight_roundtrip() {
        let k = x25519_secret_key_gen();
        let pk = x25519_pubkey(&k);
        let shrunk = x25519_scmul(&x25519_inv_eight(), &pk);
        assert_eq!(x25519_scmul(&Scalar::from(8u64), &shrunk), pk);
    }
}
