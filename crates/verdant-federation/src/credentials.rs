//! Node identity material.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use verdant_types::NodeCredentials;

/// Generates a fresh node id and Ed25519 key pair.
///
/// `certificate` is the base64 public key and `private_key` the base64
/// secret seed. Nothing verifies these on the wire yet.
pub fn generate_node_credentials() -> NodeCredentials {
    let signing_key = SigningKey::generate(&mut OsRng);
    NodeCredentials {
        node_id: Uuid::new_v4().to_string(),
        certificate: STANDARD.encode(signing_key.verifying_key().as_bytes()),
        private_key: STANDARD.encode(signing_key.to_bytes()),
    }
}

/// Hex SHA-256 of a certificate string, as stored on a [`FederatedNode`].
///
/// [`FederatedNode`]: verdant_types::FederatedNode
pub fn certificate_fingerprint(certificate: &str) -> String {
    hex::encode(Sha256::digest(certificate.as_bytes()))
}
