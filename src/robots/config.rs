use std::collections::HashMap;

use url::Url;

use super::group::Group;
use super::link_checker::same_host;

/// Key of the group that applies to every crawler not named elsewhere.
pub const WILDCARD: &str = "*";

static EMPTY_GROUP: Group = Group {
    allows: Vec::new(),
    disallows: Vec::new(),
    clean_params: Vec::new(),
    visit_time: None,
    crawl_delay: 0.0,
};

/// How directives are assigned after several consecutive `User-agent` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentGrouping {
    /// Directives apply to the most recently named agent only.
    LastDeclared,
    /// Consecutive `User-agent` lines form one block sharing every directive that follows.
    Shared,
}

/// Where the `*` key ends up in [`Config::agents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardPlacement {
    Last,
    ByLength,
}

impl Default for AgentGrouping {
    fn default() -> Self {
        AgentGrouping::LastDeclared
    }
}

impl Default for WildcardPlacement {
    fn default() -> Self {
        WildcardPlacement::Last
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub agent_grouping: AgentGrouping,
    pub wildcard: WildcardPlacement,
    /// Base for relative `Sitemap` and `Host` values, usually the robots.txt URL.
    pub base_url: Option<Url>,
    /// Treat a bare `Allow:`/`Disallow:` as no rule instead of one matching every path.
    pub skip_empty_rules: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent_grouping(mut self, agent_grouping: AgentGrouping) -> Self {
        self.agent_grouping = agent_grouping;
        self
    }

    pub fn wildcard(mut self, wildcard: WildcardPlacement) -> Self {
        self.wildcard = wildcard;
        self
    }

    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn skip_empty_rules(mut self, skip_empty_rules: bool) -> Self {
        self.skip_empty_rules = skip_empty_rules;
        self
    }
}

/// A parsed robots.txt. Read-only once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub(crate) agents: Vec<String>,
    pub(crate) groups: HashMap<String, Group>,
    pub(crate) sitemaps: HashMap<String, Url>,
    pub(crate) host: Option<Url>,
}

impl Config {
    /// Picks the group for `user_agent`.
    ///
    /// Agent keys are tried longest first and match as case-insensitive
    /// substrings of the user-agent. Falls back to `*`, then to an empty group
    /// that allows everything.
    pub fn match_group(&self, user_agent: &str) -> &Group {
        self.match_group_key(user_agent)
            .and_then(|key| self.groups.get(key))
            .unwrap_or(&EMPTY_GROUP)
    }

    /// Key of the group [`match_group`](Self::match_group) would return, if any.
    pub fn match_group_key(&self, user_agent: &str) -> Option<&str> {
        let user_agent = user_agent.to_lowercase();

        self.agents
            .iter()
            .find(|key| key.as_str() != WILDCARD && user_agent.contains(key.as_str()))
            .map(String::as_str)
            .or_else(|| self.groups.get_key_value(WILDCARD).map(|(key, _)| key.as_str()))
    }

    pub fn is_allowed(&self, user_agent: &str, request_uri: &str) -> bool {
        self.match_group(user_agent).is_allowed(request_uri)
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.groups.get(&key.to_lowercase())
    }

    /// Agent keys in match order.
    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(String::as_str)
    }

    pub fn sitemaps(&self) -> impl Iterator<Item = (&str, &Url)> {
        self.sitemaps.iter().map(|(raw, url)| (raw.as_str(), url))
    }

    pub fn sitemap(&self, raw: &str) -> Option<&Url> {
        self.sitemaps.get(raw)
    }

    pub fn host(&self) -> Option<&Url> {
        self.host.as_ref()
    }

    /// Whether `url` lives on the main mirror named by `Host`. True when no host is declared.
    pub fn is_main_host(&self, url: &Url) -> bool {
        match &self.host {
            Some(host) => same_host(host, url),
            None => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.sitemaps.is_empty() && self.host.is_none()
    }

    pub(crate) fn add_agent(&mut self, key: &str) {
        if !self.groups.contains_key(key) {
            self.groups.insert(key.to_owned(), Group::default());
            self.agents.push(key.to_owned());
        }
    }

    pub(crate) fn finalize(&mut self, wildcard: WildcardPlacement) {
        // Stable, so equal lengths keep file order.
        self.agents.sort_by(|a, b| b.len().cmp(&a.len()));

        if wildcard == WildcardPlacement::Last {
            if let Some(index) = self.agents.iter().position(|key| key == WILDCARD) {
                let key = self.agents.remove(index);
                self.agents.push(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(keys: &[&str], wildcard: WildcardPlacement) -> Config {
        let mut config = Config::default();
        for key in keys {
            config.add_agent(key);
        }
        config.finalize(wildcard);
        config
    }

    #[test]
    fn longer_keys_are_tried_first() {
        let config = config(&["bot", "*", "googlebot"], WildcardPlacement::Last);
        assert_eq!(config.agents().collect::<Vec<_>>(), vec!["googlebot", "bot", "*"]);
        assert_eq!(config.match_group_key("googlebot/2.0"), Some("googlebot"));
        assert_eq!(config.match_group_key("YandexBot"), Some("bot"));
    }

    #[test]
    fn matching_ignores_case_and_uses_substrings() {
        let config = config(&["googlebot"], WildcardPlacement::Last);
        assert_eq!(config.match_group_key("GoogleBot/1.0"), Some("googlebot"));
        assert_eq!(config.match_group_key("Mozilla/5.0 (compatible; Googlebot/2.1)"), Some("googlebot"));
        assert!(std::ptr::eq(
            config.match_group("GoogleBot/1.0"),
            config.match_group("googlebot/1.0")
        ));
    }

    #[test]
    fn wildcard_is_the_fallback() {
        let config = config(&["googlebot", "*"], WildcardPlacement::Last);
        assert_eq!(config.match_group_key("bingbot"), Some("*"));
        assert_eq!(config.match_group_key("*"), Some("*"));
    }

    #[test]
    fn wildcard_placement_only_changes_order() {
        let keys = &["*", "ab", "a"];
        let last = config(keys, WildcardPlacement::Last);
        let by_length = config(keys, WildcardPlacement::ByLength);

        assert_eq!(last.agents().collect::<Vec<_>>(), vec!["ab", "a", "*"]);
        assert_eq!(by_length.agents().collect::<Vec<_>>(), vec!["ab", "*", "a"]);

        for agent in &["x", "a", "abc", "*"] {
            assert_eq!(last.match_group_key(agent), by_length.match_group_key(agent));
        }
    }

    #[test]
    fn no_groups_means_allow_everything() {
        let config = Config::default();
        assert!(config.is_empty());
        assert_eq!(config.match_group_key("anybot"), None);
        assert!(config.is_allowed("anybot", "/"));
        assert!(config.is_allowed("anybot", ""));
    }

    #[test]
    fn main_host_check() {
        let mut config = Config::default();
        let page = Url::parse("https://www.example.com/page").unwrap();
        assert!(config.is_main_host(&page));

        config.host = Some(Url::parse("https://example.com").unwrap());
        assert!(config.is_main_host(&page));
        assert!(!config.is_main_host(&Url::parse("https://mirror.example.net/page").unwrap()));
    }
}
