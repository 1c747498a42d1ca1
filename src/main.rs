use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::error;
use url::Url;

use robots_policy::{parse_stream_with, AgentGrouping, Config, ParseOptions, RobotsError};

/// Checks URLs against a robots.txt file.
#[derive(Debug, Parser)]
#[command(name = "robots_policy", version)]
struct Args {
    /// Path of the robots.txt file to read
    robots_file: PathBuf,

    /// User-agent of the crawler
    #[arg(short, long, default_value = "*")]
    agent: String,

    /// Apply directives to every user-agent of a consecutive block
    #[arg(long)]
    shared_agents: bool,

    /// Base for relative Sitemap and Host values
    #[arg(long)]
    base: Option<Url>,

    /// URLs to check
    urls: Vec<Url>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut options = ParseOptions::new();
    if args.shared_agents {
        options = options.agent_grouping(AgentGrouping::Shared);
    }
    if let Some(base) = args.base.clone() {
        options = options.base_url(base);
    }

    let config = match File::open(&args.robots_file)
        .map_err(RobotsError::from)
        .and_then(|file| parse_stream_with(file, &options))
    {
        Ok(config) => config,
        Err(err) => {
            error!("{}: {}", args.robots_file.display(), err);
            process::exit(1);
        }
    };

    print_summary(&config, &args.agent);

    let group = config.match_group(&args.agent);
    for url in &args.urls {
        let verdict = if group.is_allowed_url(url) { "allow" } else { "deny" };
        let mirror = if config.is_main_host(url) { "" } else { " (not main host)" };
        println!("{} {} -> {}{}", verdict, url, group.cleaned(url), mirror);
    }
}

fn print_summary(config: &Config, agent: &str) {
    println!("Agent: {}", agent);
    println!("Group: {}", config.match_group_key(agent).unwrap_or("(none)"));

    let group = config.match_group(agent);
    println!("Crawl-delay: {}", group.crawl_delay());
    if let Some(window) = group.visit_time() {
        println!("Visit-time: {}-{}", window.from.format("%H:%M"), window.to.format("%H:%M"));
    }
    if let Some(host) = config.host() {
        println!("Host: {}", host);
    }

    let mut sitemaps: Vec<_> = config.sitemaps().map(|(_, url)| url.as_str()).collect();
    sitemaps.sort_unstable();
    for sitemap in sitemaps {
        println!("Sitemap: {}", sitemap);
    }
}
