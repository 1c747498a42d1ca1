use std::fmt;

use log::warn;
use regex::Regex;

/// A compiled `Allow`/`Disallow`/`Clean-param` path pattern.
///
/// Patterns without wildcards stay plain prefixes; anything using `*` or `$`
/// becomes a regular expression anchored at the start of the input.
#[derive(Debug, Clone)]
pub enum Pattern {
    Prefix(String),
    Regex { source: String, regex: Regex },
}

impl Pattern {
    pub fn compile(pattern: &str) -> Pattern {
        let trimmed = pattern.trim_end_matches('*');

        if !trimmed.contains('*') && !trimmed.contains('$') {
            return Pattern::Prefix(trimmed.to_owned());
        }

        let expression = format!(
            "^{}",
            regex::escape(trimmed)
                .replace(r"\*", ".*")
                .replace(r"\$", "$")
        );

        match Regex::new(&expression) {
            Ok(regex) => Pattern::Regex {
                source: trimmed.to_owned(),
                regex,
            },
            Err(err) => {
                // Only reachable through the regex size limit.
                warn!("pattern {:?} kept as prefix: {}", pattern, err);
                Pattern::Prefix(trimmed.to_owned())
            }
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Pattern::Regex { regex, .. } => regex.is_match(path),
        }
    }

    /// The pattern as written, minus trailing `*`.
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Prefix(prefix) => prefix,
            Pattern::Regex { source, .. } => source,
        }
    }

    pub fn is_prefix(&self) -> bool {
        matches!(self, Pattern::Prefix(_))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_star_is_a_prefix() {
        let pattern = Pattern::compile("/page*");
        assert!(pattern.is_prefix());
        assert!(pattern.matches("/page"));
        assert!(pattern.matches("/pageX"));
        assert!(pattern.matches("/page/anything"));
        assert!(!pattern.matches("/pag"));
    }

    #[test]
    fn plain_pattern_matches_by_prefix() {
        let pattern = Pattern::compile("/page");
        assert!(pattern.matches("/page"));
        assert!(pattern.matches("/page.htm"));
        assert!(!pattern.matches("/other/page"));
    }

    #[test]
    fn dollar_anchors_the_end() {
        let pattern = Pattern::compile("/page$");
        assert!(!pattern.is_prefix());
        assert!(pattern.matches("/page"));
        assert!(!pattern.matches("/page/"));
        assert!(!pattern.matches("/pages"));
    }

    #[test]
    fn inner_star_matches_any_sequence() {
        let pattern = Pattern::compile("/*/comments/*.html$");
        assert!(pattern.matches("/blog/comments/1.html"));
        assert!(pattern.matches("/a/b/comments/c/d.html"));
        assert!(!pattern.matches("/blog/comments/1.html?x=1"));
        assert!(!pattern.matches("blog/comments/1.html"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let pattern = Pattern::compile("/search?q=(a+b)*.php$");
        assert!(pattern.matches("/search?q=(a+b)xyz.php"));
        assert!(!pattern.matches("/searchXq=(a+b)xyz.php"));
        assert!(!pattern.matches("/search?q=(aab)xyz.php"));
    }

    #[test]
    fn source_is_kept_for_display() {
        assert_eq!(Pattern::compile("/a*").to_string(), "/a");
        assert_eq!(Pattern::compile("/*.gif$").to_string(), "/*.gif$");
        assert_eq!(Pattern::compile("/a*b*").as_str(), "/a*b");
    }
}
