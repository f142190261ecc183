// Signature verification for the DAG signing protocol
//
// Verification is a boolean outcome. Malformed hex, DER or public keys all
// classify as "invalid" rather than surfacing an error.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::Signature;
use serde::Serialize;

use crate::hash::{compute_digest_from_hash, hash_data};
use crate::keys::verifying_key_from_hex;
use crate::types::{SignatureProof, Signed, VerificationResult};

/// Verifies a DER hex signature over a 32-byte digest.
///
/// The public key may be given with or without the `04` prefix. High-S
/// signatures from other implementations are accepted.
pub fn verify_digest(digest: &[u8; 32], signature: &str, public_key: &str) -> bool {
    let Ok(verifying_key) = verifying_key_from_hex(public_key) else {
        return false;
    };
    let Ok(der) = hex::decode(signature) else {
        return false;
    };
    let Ok(signature) = Signature::from_der(&der) else {
        return false;
    };

    let signature = signature.normalize_s().unwrap_or(signature);
    verifying_key.verify_prehash(digest, &signature).is_ok()
}

/// Verifies a signature against a SHA-256 hash given as hex text.
pub fn verify_hash(hash_hex: &str, signature: &str, public_key: &str) -> bool {
    verify_digest(&compute_digest_from_hash(hash_hex), signature, public_key)
}

/// Verifies one proof against a value.
pub fn verify_signature<T: Serialize + ?Sized>(
    value: &T,
    proof: &SignatureProof,
    is_data_update: bool,
) -> bool {
    match hash_data(value, is_data_update) {
        Ok(hash) => verify_hash(&hash.value, &proof.signature, &proof.id),
        Err(_) => false,
    }
}

/// Verifies every proof on a signed value.
///
/// The digest is computed once. `is_valid` holds when at least one proof
/// verifies and none fail. If the value cannot be encoded, every proof is
/// reported invalid.
pub fn verify<T: Serialize>(signed: &Signed<T>, is_data_update: bool) -> VerificationResult {
    let hash = match hash_data(&signed.value, is_data_update) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::debug!(error = %e, "value could not be encoded for verification");
            return VerificationResult::partition(&signed.proofs, |_| false);
        }
    };

    verify_proofs_against_hash(&hash.value, &signed.proofs)
}

/// Partitions proofs by whether they verify against `hash_hex`.
pub(crate) fn verify_proofs_against_hash(
    hash_hex: &str,
    proofs: &[SignatureProof],
) -> VerificationResult {
    let digest = compute_digest_from_hash(hash_hex);
    VerificationResult::partition(proofs, |proof| {
        let ok = verify_digest(&digest, &proof.signature, &proof.id);
        if !ok {
            tracing::debug!(signer = %proof.id, "proof failed verification");
        }
        ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate_key_pair;
    use crate::sign::{sign, sign_hash};
    use serde_json::json;

    fn flip_hex_char(s: &str, index: usize) -> String {
        let mut chars: Vec<char> = s.chars().collect();
        chars[index] = if chars[index] == '0' { '1' } else { '0' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_verify_valid_signature() {
        let key_pair = generate_key_pair();
        let value = json!({"action": "transfer", "amount": 100});
        let proof = sign(&value, &key_pair.private_key).unwrap();

        assert!(verify_signature(&value, &proof, false));
    }

    #[test]
    fn test_verify_fails_on_tampered_value() {
        let key_pair = generate_key_pair();
        let proof = sign(&json!({"amount": 100}), &key_pair.private_key).unwrap();

        assert!(!verify_signature(&json!({"amount": 101}), &proof, false));
    }

    #[test]
    fn test_verify_fails_on_tampered_signature() {
        let key_pair = generate_key_pair();
        let value = json!({"id": 1});
        let proof = sign(&value, &key_pair.private_key).unwrap();

        // flip a byte inside r and one inside s
        for index in [10, proof.signature.len() - 3] {
            let tampered = SignatureProof {
                id: proof.id.clone(),
                signature: flip_hex_char(&proof.signature, index),
            };
            assert!(!verify_signature(&value, &tampered, false));
        }
    }

    #[test]
    fn test_verify_fails_on_wrong_key() {
        let signer = generate_key_pair();
        let other = generate_key_pair();
        let hash = "ab".repeat(32);
        let signature = sign_hash(&hash, &signer.private_key).unwrap();

        assert!(verify_hash(&hash, &signature, &signer.public_key));
        assert!(!verify_hash(&hash, &signature, &other.public_key));
    }

    #[test]
    fn test_malformed_inputs_are_false_not_errors() {
        let key_pair = generate_key_pair();
        let hash = "cd".repeat(32);
        let signature = sign_hash(&hash, &key_pair.private_key).unwrap();

        assert!(!verify_hash(&hash, "zz", &key_pair.public_key));
        assert!(!verify_hash(&hash, "3000", &key_pair.public_key));
        assert!(!verify_hash(&hash, &signature, "04"));
        assert!(!verify_hash(&hash, &signature, &"ab".repeat(64)));
        assert!(!verify_hash(&hash, "", ""));
    }

    #[test]
    fn test_public_key_with_or_without_prefix() {
        let key_pair = generate_key_pair();
        let hash = "ef".repeat(32);
        let signature = sign_hash(&hash, &key_pair.private_key).unwrap();

        assert!(verify_hash(&hash, &signature, &key_pair.public_key));
        assert!(verify_hash(&hash, &signature, &key_pair.public_key[2..]));
    }

    #[test]
    fn test_verify_partitions_mixed_proofs() {
        let good = generate_key_pair();
        let value = json!({"id": "multi"});
        let valid = sign(&value, &good.private_key).unwrap();
        let forged = SignatureProof {
            id: generate_key_pair().public_key[2..].to_string(),
            signature: valid.signature.clone(),
        };
        let garbage = SignatureProof {
            id: "not-a-key".to_string(),
            signature: "not-a-signature".to_string(),
        };

        let signed = Signed::new(value, vec![valid.clone(), forged.clone(), garbage.clone()]);
        let result = verify(&signed, false);

        assert!(!result.is_valid);
        assert_eq!(result.valid_proofs, vec![valid]);
        assert_eq!(result.invalid_proofs, vec![forged, garbage]);
    }

    #[test]
    fn test_verify_with_no_proofs_is_invalid() {
        let signed = Signed::new(json!({"id": 1}), vec![]);
        let result = verify(&signed, false);
        assert!(!result.is_valid);
        assert!(result.valid_proofs.is_empty());
        assert!(result.invalid_proofs.is_empty());
    }
}
