use sha2::{Digest, Sha224};

/// Dedupe key of an entry: SHA-224 over `title-summary-link-published`,
/// lowercase hex.
pub fn content_hash(title: &str, summary: &str, link: &str, published_raw: &str) -> String {
    let mut hasher = Sha224::new();
    hasher.update(title.as_bytes());
    hasher.update(b"-");
    hasher.update(summary.as_bytes());
    hasher.update(b"-");
    hasher.update(link.as_bytes());
    hasher.update(b"-");
    hasher.update(published_raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // sha224("---")
        assert_eq!(
            content_hash("", "", "", ""),
            hex::encode(Sha224::digest(b"---"))
        );
        assert_eq!(content_hash("", "", "", "").len(), 56);
    }

    #[test]
    fn test_identical_fields_hash_identically() {
        let a = content_hash("Title", "Body", "https://x/1", "Mon, 1 Jan 2024 00:00:00 +0000");
        let b = content_hash("Title", "Body", "https://x/1", "Mon, 1 Jan 2024 00:00:00 +0000");
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_field_change_changes_hash() {
        let base = content_hash("Title", "Body", "https://x/1", "raw");
        assert_ne!(base, content_hash("Title!", "Body", "https://x/1", "raw"));
        assert_ne!(base, content_hash("Title", "Body!", "https://x/1", "raw"));
        assert_ne!(base, content_hash("Title", "Body", "https://x/2", "raw"));
        assert_ne!(base, content_hash("Title", "Body", "https://x/1", "raw2"));
    }
}
