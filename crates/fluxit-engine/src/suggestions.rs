//! Fuzzy matching suggestions for template errors

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// All registered filters in the engine
pub const AVAILABLE_FILTERS: &[&str] = &[
    // Custom fluxit filters
    "toyaml",
    "b64encode",
    "quote",
    "squote",
    "nindent",
    "indent",
    "kebabcase",
    // Built-in MiniJinja filters
    "default",
    "upper",
    "lower",
    "title",
    "replace",
    "trim",
    "join",
    "first",
    "last",
    "length",
    "int",
    "string",
    "bool",
    "tojson",
    "urlencode",
];

/// Suggestion result
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggested correction
    pub text: String,
    /// Levenshtein distance (lower = better match)
    pub distance: usize,
}

/// Find closest matches from a list of candidates
pub fn find_closest_matches(input: &str, candidates: &[&str], max_results: usize) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = strsim::levenshtein(input, candidate);
            if distance <= MAX_SUGGESTION_DISTANCE && distance > 0 {
                Some(Suggestion {
                    text: candidate.to_string(),
                    distance,
                })
            } else {
                None
            }
        })
        .collect();

    suggestions.sort_by_key(|s| s.distance);
    suggestions.truncate(max_results);
    suggestions
}

/// Suggest a known parameter for an undefined one
pub fn suggest_parameter(name: &str, available: &[String]) -> Option<String> {
    let candidates: Vec<&str> = available.iter().map(String::as_str).collect();
    let matches = find_closest_matches(name, &candidates, 3);

    if matches.is_empty() {
        return None;
    }

    let names: Vec<String> = matches.iter().map(|s| format!("`{}`", s.text)).collect();
    Some(format!("Did you mean {}?", names.join(" or ")))
}

/// Suggest corrections for an unknown filter
pub fn suggest_unknown_filter(filter_name: &str) -> Option<String> {
    let matches = find_closest_matches(filter_name, AVAILABLE_FILTERS, 1);
    matches
        .first()
        .map(|s| format!("Did you mean `{}`?", s.text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_closest_matches() {
        let matches = find_closest_matches("app_nam", &["app_name", "namespace", "replicas"], 3);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "app_name");
        assert_eq!(matches[0].distance, 1);
    }

    #[test]
    fn test_exact_match_is_not_suggested() {
        assert!(find_closest_matches("replicas", &["replicas"], 3).is_empty());
    }

    #[test]
    fn test_suggest_parameter() {
        let available = vec!["include_configmap".to_string(), "include_secret".to_string()];
        let suggestion = suggest_parameter("include_secrets", &available).unwrap();
        assert!(suggestion.contains("`include_secret`"));

        assert!(suggest_parameter("totally_unrelated", &available).is_none());
    }

    #[test]
    fn test_suggest_unknown_filter() {
        assert_eq!(
            suggest_unknown_filter("toyml"),
            Some("Did you mean `toyaml`?".to_string())
        );
    }
}
