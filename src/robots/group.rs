use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use chrono::NaiveTime;
use log::debug;
use url::{form_urlencoded, Url};

use super::link_checker::request_uri;
use super::pattern::Pattern;

/// The rules that apply to one user-agent token.
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub(crate) allows: Vec<Pattern>,
    pub(crate) disallows: Vec<Pattern>,
    pub(crate) clean_params: Vec<CleanParam>,
    pub(crate) visit_time: Option<VisitTime>,
    pub(crate) crawl_delay: f64,
}

/// A `Clean-param` rule: query parameters to drop from URLs matching `pattern`.
#[derive(Debug, Clone)]
pub struct CleanParam {
    pattern: Pattern,
    params: Vec<String>,
}

/// Daily window during which crawling is welcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitTime {
    pub from: NaiveTime,
    pub to: NaiveTime,
}

impl Group {
    /// First-match resolution: any matching `Allow` wins over any `Disallow`.
    /// A group without `Disallow` lines allows everything.
    pub fn is_allowed(&self, request_uri: &str) -> bool {
        if self.disallows.is_empty() {
            return true;
        }

        let denied = self.disallows.iter().any(|rule| rule.matches(request_uri));
        if !denied {
            return true;
        }

        self.allows.iter().any(|rule| rule.matches(request_uri))
    }

    pub fn is_allowed_url(&self, url: &Url) -> bool {
        self.is_allowed(&request_uri(url))
    }

    /// Strips the query parameters named by every matching `Clean-param` rule.
    ///
    /// All rules are tested against the request-URI as it was on entry. The
    /// surviving query is re-encoded with keys in ascending order.
    pub fn clean_param(&self, url: &mut Url) {
        let uri = request_uri(url).into_owned();
        let stripped: HashSet<&str> = self
            .clean_params
            .iter()
            .filter(|rule| rule.pattern.matches(&uri))
            .flat_map(|rule| rule.params.iter().map(String::as_str))
            .collect();

        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            if !stripped.contains(&*key) {
                values
                    .entry(key.into_owned())
                    .or_default()
                    .push(value.into_owned());
            }
        }

        if values.is_empty() {
            url.set_query(None);
            return;
        }

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, list) in &values {
            for value in list {
                serializer.append_pair(key, value);
            }
        }
        let query = serializer.finish();
        url.set_query(Some(&query));
    }

    pub fn cleaned(&self, url: &Url) -> Url {
        let mut url = url.clone();
        self.clean_param(&mut url);
        url
    }

    /// Seconds between requests, `0.0` when unspecified.
    pub fn crawl_delay(&self) -> f64 {
        self.crawl_delay
    }

    pub fn crawl_delay_duration(&self) -> Option<Duration> {
        if self.crawl_delay > 0.0 {
            Duration::try_from_secs_f64(self.crawl_delay).ok()
        } else {
            None
        }
    }

    pub fn visit_time(&self) -> Option<VisitTime> {
        self.visit_time
    }

    pub fn allows(&self) -> &[Pattern] {
        &self.allows
    }

    pub fn disallows(&self) -> &[Pattern] {
        &self.disallows
    }

    pub fn clean_params(&self) -> &[CleanParam] {
        &self.clean_params
    }
}

impl CleanParam {
    /// Parses `param1&param2 [pattern]`; the pattern defaults to `/`.
    pub fn parse(value: &str) -> CleanParam {
        let mut split = value.splitn(2, ' ');
        let params = split.next().unwrap_or_default();
        let pattern = match split.next().map(str::trim) {
            Some(pattern) if !pattern.is_empty() => pattern,
            _ => "/",
        };

        CleanParam {
            pattern: Pattern::compile(pattern),
            params: params.split('&').map(str::to_owned).collect(),
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl VisitTime {
    /// Parses `HHMM-HHMM`. A malformed half becomes midnight.
    pub fn parse(value: &str) -> VisitTime {
        let mut split = value.splitn(2, '-');
        VisitTime {
            from: parse_time_of_day(split.next().unwrap_or_default()),
            to: parse_time_of_day(split.next().unwrap_or_default()),
        }
    }

    /// Whether `time` falls in `[from, to)`, wrapping past midnight when `to < from`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.from <= self.to {
            self.from <= time && time < self.to
        } else {
            time >= self.from || time < self.to
        }
    }
}

fn parse_time_of_day(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value.trim(), "%H%M").unwrap_or_else(|err| {
        debug!("visit-time {:?} defaulted to 00:00: {}", value, err);
        NaiveTime::MIN
    })
}
