use sha2::{Digest, Sha256};

/// Whitespace at the ends and letter case do not change a question's identity
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Lowercase hex SHA-256 of the normalized text
pub fn hash_text(text: &str) -> String {
    format!("{:x}", Sha256::digest(normalize(text).as_bytes()))
}
