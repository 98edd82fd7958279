//! # Signature Scheme Seam
//!
//! The commitment core is agnostic to the asymmetric scheme behind its leaf
//! keys; all it needs is `sign(bytes, keypair) -> signature` and
//! `verify(key, bytes, signature) -> bool`. These free functions are that
//! seam. Today they delegate to Ed25519; a future scheme slots in behind the
//! same two calls without touching the transaction pipeline.

use thiserror::Error;

use super::keys::{VelaKeypair, VelaPublicKey, VelaSignature};

/// Errors during batched signature operations.
///
/// Intentionally terse — we don't tell callers *which* check failed inside
/// a batch, only that the batch is not trustworthy.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,
}

/// Signs a message with the given keypair.
///
/// Deterministic (RFC 8032): the same key and message always produce the
/// same 64-byte signature.
pub fn sign(keypair: &VelaKeypair, message: &[u8]) -> VelaSignature {
    keypair.sign(message)
}

/// Verifies a signature against a public key and message.
///
/// Returns `true` iff the signature is valid. Malformed signatures and
/// invalid key encodings fail closed.
pub fn verify(public_key: &VelaPublicKey, message: &[u8], signature: &VelaSignature) -> bool {
    public_key.verify(message, signature)
}

/// Verifies a batch of independent `(key, message, signature)` triples.
///
/// All must be valid for the batch to pass. Verification *within* one
/// transaction has a fixed sequential order (identity, then signatures, then
/// completeness); this helper is for the cross-transaction case, where many
/// independent transactions' signatures can be checked in one sweep.
///
/// Sequential for now; a randomized-linear-combination batch verifier can
/// replace the loop without changing this API.
pub fn batch_verify(
    items: &[(VelaPublicKey, Vec<u8>, VelaSignature)],
) -> Result<(), SignatureError> {
    for (public_key, message, signature) in items {
        if !verify(public_key, message, signature) {
            return Err(SignatureError::VerificationFailed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let kp = VelaKeypair::generate();
        let msg = b"identity bytes";
        let sig = sign(&kp, msg);
        assert!(verify(&kp.public_key(), msg, &sig));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = VelaKeypair::generate();
        let kp2 = VelaKeypair::generate();
        let sig = sign(&kp1, b"message");
        assert!(!verify(&kp2.public_key(), b"message", &sig));
    }

    #[test]
    fn batch_verify_all_valid() {
        let items: Vec<_> = (0..8)
            .map(|i: u32| {
                let kp = VelaKeypair::generate();
                let msg = i.to_le_bytes().to_vec();
                let sig = sign(&kp, &msg);
                (kp.public_key(), msg, sig)
            })
            .collect();
        assert!(batch_verify(&items).is_ok());
    }

    #[test]
    fn batch_verify_rejects_one_bad_entry() {
        let kp1 = VelaKeypair::generate();
        let kp2 = VelaKeypair::generate();
        let msg = b"payload".to_vec();
        let items = vec![
            (kp1.public_key(), msg.clone(), sign(&kp1, &msg)),
            // Signed by kp2 but attributed to kp1.
            (kp1.public_key(), msg.clone(), sign(&kp2, &msg)),
        ];
        assert!(batch_verify(&items).is_err());
    }

    #[test]
    fn batch_verify_empty_is_ok() {
        assert!(batch_verify(&[]).is_ok());
    }
}
