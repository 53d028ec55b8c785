//! core::naming
//!
//! Naming rules shared by commands and parameters.
//!
//! # Features
//!
//! - Derive kebab-case command and option names from member names
//! - Rank sibling names by similarity for "did you mean" output

use heck::ToKebabCase;

/// Convert a member or registration name into its kebab-case form.
///
/// # Example
///
/// ```
/// use trellis::core::naming::to_kebab_case;
///
/// assert_eq!(to_kebab_case("OptionRequired"), "option-required");
/// assert_eq!(to_kebab_case("option_required"), "option-required");
/// assert_eq!(to_kebab_case("exit-code"), "exit-code");
/// ```
pub fn to_kebab_case(name: &str) -> String {
    name.to_kebab_case()
}

/// Rank `candidates` by similarity to `input`.
///
/// Similarity is the normalized Levenshtein score in `[0, 1]`. Only names
/// scoring at least `threshold` are kept; the best `limit` are returned,
/// most similar first. Ties keep registration order.
pub fn similar_names<'a, I>(input: &str, candidates: I, threshold: f64, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|name| (strsim::normalized_levenshtein(input, name), name))
        .filter(|(score, _)| *score >= threshold)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut result: Vec<String> = Vec::new();
    for (_, name) in scored {
        if result.len() == limit {
            break;
        }
        if !result.iter().any(|seen| seen == name) {
            result.push(name.to_string());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_from_pascal_case() {
        assert_eq!(to_kebab_case("HelpShortOptionOverwrite"), "help-short-option-overwrite");
        assert_eq!(to_kebab_case("ExitCode"), "exit-code");
    }

    #[test]
    fn kebab_from_snake_case() {
        assert_eq!(to_kebab_case("option_has_default"), "option-has-default");
        assert_eq!(to_kebab_case("arg0"), "arg0");
    }

    #[test]
    fn suggests_close_sibling() {
        let names = ["hello", "konnichiwa", "exit-code", "long-running"];
        let similar = similar_names("axit-mode", names, 0.5, 3);
        assert_eq!(similar, vec!["exit-code".to_string()]);
    }

    #[test]
    fn no_suggestion_below_threshold() {
        let similar = similar_names("zzz", ["hello", "konnichiwa"], 0.5, 3);
        assert!(similar.is_empty());
    }

    #[test]
    fn limit_caps_suggestions() {
        let similar = similar_names("cmd", ["cmd1", "cmd2", "cmd3", "cmd4"], 0.5, 2);
        assert_eq!(similar, vec!["cmd1".to_string(), "cmd2".to_string()]);
    }
}
