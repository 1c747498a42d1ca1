use std::io::{BufRead, BufReader, Read};
use std::str::FromStr;

use log::{debug, trace, warn};

use super::config::{AgentGrouping, Config, ParseOptions};
use super::error::{Result, RobotsError};
use super::group::{CleanParam, Group, VisitTime};
use super::link_checker::{resolve_host, resolve_url};
use super::pattern::Pattern;

/// Parses a robots.txt body with default options.
pub fn parse_stream<R: Read>(stream: R) -> Result<Config> {
    parse_stream_with(stream, &ParseOptions::default())
}

/// Parses a robots.txt body, consuming `stream` exactly once.
///
/// Fails with [`RobotsError::InvalidContent`] on the first non-empty line that is
/// not a `key: value` pair. Unreadable values are skipped or zeroed instead.
pub fn parse_stream_with<R: Read>(stream: R, options: &ParseOptions) -> Result<Config> {
    let mut reader = BufReader::new(stream);
    let mut context = ParseContext::new(options);
    let mut buf = Vec::new();
    let mut number = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        number += 1;
        context.line(number, &String::from_utf8_lossy(&buf))?;
    }

    Ok(context.finish())
}

pub fn parse_str(source: &str) -> Result<Config> {
    parse_stream(source.as_bytes())
}

impl FromStr for Config {
    type Err = RobotsError;

    fn from_str(source: &str) -> Result<Config> {
        parse_str(source)
    }
}

/// State of a single parse call: the config under construction and the
/// groups that directives currently apply to.
struct ParseContext<'a> {
    options: &'a ParseOptions,
    config: Config,
    current: Vec<String>,
    in_agent_block: bool,
}

impl<'a> ParseContext<'a> {
    fn new(options: &'a ParseOptions) -> Self {
        ParseContext {
            options,
            config: Config::default(),
            current: Vec::new(),
            in_agent_block: false,
        }
    }

    fn line(&mut self, number: usize, raw: &str) -> Result<()> {
        let line = trim(strip_comment(raw));
        if line.is_empty() {
            return Ok(());
        }

        let (key, value) = match line.find(':') {
            Some(index) => (&line[..index], &line[index + 1..]),
            None => {
                warn!("line {}: no `key: value` separator in {:?}", number, line);
                return Err(RobotsError::InvalidContent { line: number });
            }
        };
        let key = trim(key).to_lowercase();
        let value = trim(value);
        trace!("line {}: {} = {:?}", number, key, value);

        match key.as_str() {
            "sitemap" => self.sitemap(value),
            "host" => self.host(value),
            "user-agent" | "useragent" => self.user_agent(value),
            _ => self.group_param(&key, value),
        }

        Ok(())
    }

    fn finish(mut self) -> Config {
        self.config.finalize(self.options.wildcard);
        self.config
    }

    fn sitemap(&mut self, value: &str) {
        match resolve_url(self.options.base_url.as_ref(), value) {
            Ok(url) => {
                self.config.sitemaps.insert(value.to_owned(), url);
            }
            Err(err) => debug!("ignoring sitemap {:?}: {}", value, err),
        }
    }

    fn host(&mut self, value: &str) {
        match resolve_host(self.options.base_url.as_ref(), value) {
            Ok(url) => self.config.host = Some(url),
            Err(err) => debug!("ignoring host {:?}: {}", value, err),
        }
    }

    fn user_agent(&mut self, value: &str) {
        let key = value.to_lowercase();
        if !self.config.groups.contains_key(&key) {
            trace!("new group {:?}", key);
        }
        self.config.add_agent(&key);

        let extend = self.in_agent_block && self.options.agent_grouping == AgentGrouping::Shared;
        if !extend {
            self.current.clear();
        }
        if !self.current.contains(&key) {
            self.current.push(key);
        }
        self.in_agent_block = true;
    }

    fn group_param(&mut self, key: &str, value: &str) {
        match key {
            "crawl-delay" | "crawldelay" => {
                let delay = value.parse::<f64>().unwrap_or_else(|err| {
                    debug!("crawl-delay {:?} read as 0: {}", value, err);
                    0.0
                });
                self.apply(|group| group.crawl_delay = delay);
            }
            "request-rate" | "requestrate" => match request_rate_delay(value) {
                Some(delay) => self.apply(|group| {
                    if group.crawl_delay == 0.0 {
                        group.crawl_delay = delay;
                    }
                }),
                None => debug!("ignoring request-rate {:?}", value),
            },
            "visit-time" | "visittime" => {
                let window = VisitTime::parse(value);
                self.apply(|group| group.visit_time = Some(window));
            }
            "clean-param" | "cleanparam" => {
                let rule = CleanParam::parse(value);
                self.apply(|group| group.clean_params.push(rule.clone()));
            }
            "allow" | "disallow" if value.is_empty() && self.options.skip_empty_rules => {
                debug!("empty {} skipped", key);
                self.apply(|_| {});
            }
            "allow" => {
                let pattern = Pattern::compile(value);
                self.apply(|group| group.allows.push(pattern.clone()));
            }
            "disallow" => {
                let pattern = Pattern::compile(value);
                self.apply(|group| group.disallows.push(pattern.clone()));
            }
            _ => trace!("unknown directive {:?}", key),
        }
    }

    /// Runs `update` on every current group and closes an open agent block.
    fn apply<F: FnMut(&mut Group)>(&mut self, mut update: F) {
        self.in_agent_block = false;

        if self.current.is_empty() {
            debug!("group directive before any user-agent, ignored");
            return;
        }

        for key in &self.current {
            if let Some(group) = self.config.groups.get_mut(key) {
                update(group);
            }
        }
    }
}

/// `count/period` as seconds per request, using whole-second division.
fn request_rate_delay(value: &str) -> Option<f64> {
    let mut split = value.splitn(2, '/');
    let count = split.next()?.trim().parse::<u64>().ok()?;
    let period = split.next()?.trim().parse::<u64>().ok()?;
    if count == 0 {
        return None;
    }
    Some((period / count) as f64)
}

fn strip_comment(line: &str) -> &str {
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        match c {
            '#' if !escaped => return &line[..index],
            '\\' => escaped = !escaped,
            _ => escaped = false,
        }
    }
    line
}

fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}
