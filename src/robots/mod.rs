mod link_checker;

pub mod config;
pub mod error;
pub mod fetch;
pub mod group;
pub mod parse;
pub mod pattern;

pub use config::{AgentGrouping, Config, ParseOptions, WildcardPlacement, WILDCARD};
pub use error::{Result, RobotsError};
pub use fetch::{classify, classify_and_parse, parse_response, parse_response_with, ResponseClass};
pub use group::{CleanParam, Group, VisitTime};
pub use link_checker::request_uri;
pub use parse::{parse_str, parse_stream, parse_stream_with};
pub use pattern::Pattern;
