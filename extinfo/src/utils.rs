/// Helpers for truncating text.
pub trait Truncatable {
    /// Truncates to at most `max` bytes without splitting a character.
    fn truncate_to_bytes(&self, max: usize) -> &str;
}

impl Truncatable for String {
    fn truncate_to_bytes(&self, max: usize) -> &str {
        self.as_str().truncate_to_bytes(max)
    }
}

impl Truncatable for str {
    fn truncate_to_bytes(&self, max: usize) -> &str {
        if self.len() <= max {
            return self;
        }

        let mut end = max;

        while !self.is_char_boundary(end) {
            end -= 1;
        }

        &self[..end]
    }
}
