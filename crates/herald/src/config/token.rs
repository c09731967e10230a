/// Variables checked, in order, for the social network token.
pub(crate) const SOCIAL_TOKEN_VARS: &[&str] = &["TWITTER_ACCESS_TOKEN", "TWITTER_BEARER_TOKEN"];

/// Variables checked, in order, for the GitHub token.
pub(crate) const GITHUB_TOKEN_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// The first of `names` that is set to something other than whitespace.
pub(crate) fn resolve(names: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod test_resolve {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn first_name_wins() {
        let token = resolve(
            GITHUB_TOKEN_VARS,
            lookup(&[("GITHUB_TOKEN", "primary"), ("GH_TOKEN", "secondary")]),
        );
        assert_eq!(token.as_deref(), Some("primary"));
    }

    #[test]
    fn falls_back_to_second_name() {
        let token = resolve(GITHUB_TOKEN_VARS, lookup(&[("GH_TOKEN", "secondary")]));
        assert_eq!(token.as_deref(), Some("secondary"));
    }

    #[test]
    fn blank_values_are_skipped() {
        let token = resolve(
            SOCIAL_TOKEN_VARS,
            lookup(&[("TWITTER_ACCESS_TOKEN", "  "), ("TWITTER_BEARER_TOKEN", "bearer")]),
        );
        assert_eq!(token.as_deref(), Some("bearer"));
    }

    #[test]
    fn nothing_set() {
        assert_eq!(resolve(SOCIAL_TOKEN_VARS, lookup(&[])), None);
    }
}
