use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    TagNotFound,
    DialogNotFound,
    InvalidSlug,
    UpdateInFlight,
    ServerRejected,
    ScenarioParseError,
    ScenarioInvalid,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::TagNotFound => "E2001",
            Self::DialogNotFound => "E2002",
            Self::InvalidSlug => "E2003",
            Self::UpdateInFlight => "E3001",
            Self::ServerRejected => "E3002",
            Self::ScenarioParseError => "E4001",
            Self::ScenarioInvalid => "E4002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::TagNotFound => "Tag not found",
            Self::DialogNotFound => "Dialog not found",
            Self::InvalidSlug => "Tag name is empty after sanitization",
            Self::UpdateInFlight => "Another request is already pending for this tag",
            Self::ServerRejected => "The store rejected the request",
            Self::ScenarioParseError => "Scenario file parse error",
            Self::ScenarioInvalid => "Scenario is inconsistent",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .tagedit/config.toml and retry."),
            Self::TagNotFound | Self::DialogNotFound => None,
            Self::InvalidSlug => Some("Enter a name with at least one visible character."),
            Self::UpdateInFlight => Some("Wait for the pending request to resolve."),
            Self::ServerRejected => Some("Adjust the name and submit again."),
            Self::ScenarioParseError => Some("Check the scenario file against the documented steps."),
            Self::ScenarioInvalid => Some(
                "Give every seeded tag a distinct _id and open a delete confirmation before confirming or cancelling it.",
            ),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigParseError,
            ErrorCode::TagNotFound,
            ErrorCode::DialogNotFound,
            ErrorCode::InvalidSlug,
            ErrorCode::UpdateInFlight,
            ErrorCode::ServerRejected,
            ErrorCode::ScenarioParseError,
            ErrorCode::ScenarioInvalid,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn scenario_invalid_hint_names_checked_conditions() {
        let hint = ErrorCode::ScenarioInvalid.hint().unwrap_or_default();
        assert!(hint.contains("distinct _id"), "{hint}");
        assert!(hint.contains("delete confirmation"), "{hint}");
        assert!(!hint.contains("tagId"), "{hint}");
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::ServerRejected.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }
}
