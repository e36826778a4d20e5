//! Input normalization applied to form values before they are persisted.

/// Normalizes raw form input.
pub trait Sanitizer {
    fn sanitize(&self, raw: &str) -> String;
}

/// Trims surrounding whitespace, and optionally collapses internal runs of
/// whitespace to a single space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimSanitizer {
    pub collapse_whitespace: bool,
}

impl Sanitizer for TrimSanitizer {
    fn sanitize(&self, raw: &str) -> String {
        if self.collapse_whitespace {
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            raw.trim().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let s = TrimSanitizer::default();
        assert_eq!(s.sanitize("Draft "), "Draft");
        assert_eq!(s.sanitize("\t in  progress \n"), "in  progress");
        assert_eq!(s.sanitize("   "), "");
    }

    #[test]
    fn collapses_internal_whitespace_when_enabled() {
        let s = TrimSanitizer {
            collapse_whitespace: true,
        };
        assert_eq!(s.sanitize("  in \t progress  "), "in progress");
    }
}
