// src/policy/rules.rs
// =============================================================================
// Disallow rules compiled from robots.txt.
//
// Two kinds of rule:
// - exact strings: a URL is rejected if it CONTAINS the string anywhere
//   (containment, not prefix; `/api` also rejects `/apiary`)
// - wildcard patterns: rules with `*` are compiled once into a regex and a
//   URL is rejected if the regex matches anywhere inside it
//
// The rule set is built once per crawl and only read afterwards.
// =============================================================================

use regex::Regex;
use std::collections::HashSet;

// What a robots.txt `*` expands to
const WILDCARD_CLASS: &str = "[a-zA-Z0-9_-]+";

/// A compiled wildcard disallow rule.
#[derive(Debug, Clone)]
pub struct DisallowPattern {
    regex: Regex,
}

impl DisallowPattern {
    // Compiles a robots.txt value containing `*` into a matcher.
    //
    // Values starting with `/` are anchored to the root url, everything else
    // can match anywhere in a link.
    //
    // Examples (root = https://www.test.com):
    //   "*?s=bpage-next" -> [a-zA-Z0-9_-]+\?s=bpage-next
    //   "/*.pdf$"        -> ^https://www\.test\.com/[a-zA-Z0-9_-]+\.pdf$
    pub fn compile(rule: &str, root_url: &str) -> Result<Self, regex::Error> {
        let path = translate_wildcards(rule.trim_end_matches('/'));

        let pattern = if rule.starts_with('/') {
            format!("^{}{}", regex::escape(root_url.trim_end_matches('/')), path)
        } else {
            path
        };

        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

// Escapes regex metacharacters, turns `*` into the wildcard class and keeps a
// trailing `$` as an end anchor.
fn translate_wildcards(rule: &str) -> String {
    let (body, anchored_end) = match rule.strip_suffix('$') {
        Some(body) => (body, true),
        None => (rule, false),
    };

    let mut pattern = String::with_capacity(body.len() * 2);
    for c in body.chars() {
        match c {
            '*' => pattern.push_str(WILDCARD_CLASS),
            '.' | '?' | '+' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '\\' => {
                pattern.push('\\');
                pattern.push(c);
            }
            _ => pattern.push(c),
        }
    }

    if anchored_end {
        pattern.push('$');
    }
    pattern
}

/// The full set of disallow rules for one site.
#[derive(Debug, Clone, Default)]
pub struct DisallowRules {
    exact: HashSet<String>,
    patterns: Vec<DisallowPattern>,
}

impl DisallowRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_exact(&mut self, value: impl Into<String>) {
        self.exact.insert(value.into());
    }

    // Patterns are kept unique by their compiled source.
    pub fn add_pattern(&mut self, pattern: DisallowPattern) {
        if !self.patterns.iter().any(|p| p.as_str() == pattern.as_str()) {
            self.patterns.push(pattern);
        }
    }

    /// Returns true when any rule rejects `url`.
    pub fn is_disallowed(&self, url: &str) -> bool {
        self.exact.iter().any(|value| url.contains(value.as_str()))
            || self.patterns.iter().any(|pattern| pattern.matches(url))
    }

    pub fn exact(&self) -> &HashSet<String> {
        &self.exact
    }

    pub fn patterns(&self) -> &[DisallowPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "https://www.test.com";

    #[test]
    fn test_unanchored_wildcard() {
        let pattern = DisallowPattern::compile("*?s=bpage-next", ROOT).unwrap();
        assert_eq!(pattern.as_str(), r"[a-zA-Z0-9_-]+\?s=bpage-next");
        assert!(pattern.matches("https://www.test.com/blog/page?s=bpage-next"));
        assert!(!pattern.matches("https://www.test.com/blog/page?s=other"));
    }

    #[test]
    fn test_anchored_wildcard() {
        let pattern = DisallowPattern::compile("/drafts/*/edit", ROOT).unwrap();
        assert!(pattern.matches("https://www.test.com/drafts/post-1/edit"));
        assert!(!pattern.matches("https://www.other.com/drafts/post-1/edit"));
        assert!(!pattern.matches("https://www.test.com/published/drafts/post-1/edit"));
    }

    #[test]
    fn test_wildcard_with_end_anchor() {
        let pattern = DisallowPattern::compile("/*.pdf$", ROOT).unwrap();
        assert!(pattern.matches("https://www.test.com/report.pdf"));
        assert!(!pattern.matches("https://www.test.com/report.pdf.html"));
        // The dot is literal
        assert!(!pattern.matches("https://www.test.com/reportxpdf"));
    }

    #[test]
    fn test_exact_rule_uses_containment() {
        let mut rules = DisallowRules::new();
        rules.add_exact("https://www.test.com/5");

        assert!(rules.is_disallowed("https://www.test.com/5"));
        assert!(rules.is_disallowed("https://www.test.com/55"));
        assert!(!rules.is_disallowed("https://www.test.com/4"));
    }

    #[test]
    fn test_mixed_rules() {
        let mut rules = DisallowRules::new();
        rules.add_exact("https://www.test.com/5");
        rules.add_pattern(DisallowPattern::compile("*?=doNotQuery", ROOT).unwrap());

        assert!(rules.is_disallowed("https://www.test.com/1?=doNotQuery"));
        assert!(rules.is_disallowed("https://www.test.com/5"));
        assert!(!rules.is_disallowed("https://www.test.com/2"));
    }

    #[test]
    fn test_duplicate_patterns_are_absorbed() {
        let mut rules = DisallowRules::new();
        rules.add_pattern(DisallowPattern::compile("*?print", ROOT).unwrap());
        rules.add_pattern(DisallowPattern::compile("*?print", ROOT).unwrap());
        assert_eq!(rules.patterns().len(), 1);
    }

    #[test]
    fn test_empty_rules_allow_everything() {
        let rules = DisallowRules::new();
        assert!(rules.is_empty());
        assert!(!rules.is_disallowed("https://www.test.com/anything"));
    }
}
