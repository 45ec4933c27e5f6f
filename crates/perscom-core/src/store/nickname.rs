//! Admin "clear by nickname" matching.

use crate::domain::CoreError;

const MIN_QUERY_CHARS: usize = 3;

/// Validated, lower-cased search text for clear-by-name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NicknameQuery {
    needle: String,
}

impl NicknameQuery {
    /// Trim and lower-case the raw input. Fewer than 3 characters is rejected.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let needle = raw.trim().to_lowercase();
        if needle.chars().count() < MIN_QUERY_CHARS {
            return Err(CoreError::ValidationFailed(
                "Please provide at least 3 characters to clear a request.".to_string(),
            ));
        }
        Ok(Self { needle })
    }

    /// Display names are usually "<rank> <first> <last>".
    ///
    /// Matches when the whole lower-cased name equals the query, or when the
    /// last whitespace-separated token contains it.
    pub fn matches(&self, display_name: &str) -> bool {
        let name = display_name.trim().to_lowercase();
        if name == self.needle {
            return true;
        }
        name.split_whitespace()
            .next_back()
            .is_some_and(|surname| surname.contains(&self.needle))
    }

    pub fn as_str(&self) -> &str {
        &self.needle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("ab")]
    #[case("  ab  ")]
    fn short_queries_are_rejected(#[case] raw: &str) {
        let err = NicknameQuery::parse(raw).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed(_)));
    }

    #[test]
    fn three_characters_are_enough() {
        assert_eq!(NicknameQuery::parse(" SMI ").unwrap().as_str(), "smi");
    }

    #[rstest]
    #[case("PFC John Smith", "smith", true)]
    #[case("PFC John Smith", "mit", true)]
    #[case("PFC John Smith", "SMITH", true)]
    #[case("PFC John Smith", "pfc john smith", true)]
    #[case("PFC John Smith", "john", false)]
    #[case("PFC John Smith", "pfc", false)]
    #[case("Madonna", "donn", true)]
    fn surname_heuristic(#[case] display: &str, #[case] query: &str, #[case] expected: bool) {
        let query = NicknameQuery::parse(query).unwrap();
        assert_eq!(query.matches(display), expected);
    }
}
