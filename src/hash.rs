use sha2::{Digest, Sha256};

/// Content hash used for meeting identifiers: SHA-256 over the UTF-8 bytes,
/// rendered as lowercase hex. This is a fingerprint, not a MAC: two inputs
/// that are byte-identical always collapse to the same id, which is what
/// makes repeated scrapes of the same day idempotent against the booked set.
pub fn content_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Meeting identifier: a pure function of (title, start, end).
pub fn meeting_id(title: &str, start_time: &str, end_time: &str) -> String {
    content_hash(&format!("{}|{}|{}", title, start_time, end_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        assert_eq!(
            content_hash("test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn deterministic() {
        let a = content_hash("Weekly sync|2023-10-04T07:00:00Z|2023-10-04T08:00:00Z");
        let b = content_hash("Weekly sync|2023-10-04T07:00:00Z|2023-10-04T08:00:00Z");
        assert_eq!(a, b);
    }

    #[test]
    fn meeting_id_depends_on_all_parts() {
        let base = meeting_id("Daily", "2023-10-04T07:00:00Z", "2023-10-04T07:15:00Z");
        assert_ne!(
            base,
            meeting_id("Daily", "2023-10-04T07:00:00Z", "2023-10-04T07:30:00Z")
        );
        assert_ne!(
            base,
            meeting_id("Weekly", "2023-10-04T07:00:00Z", "2023-10-04T07:15:00Z")
        );
    }
}
