use std::fmt;
use std::io::Read;

use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use log::debug;

use super::config::{Config, ParseOptions};
use super::error::{Result, RobotsError};
use super::parse::parse_stream_with;

/// What a robots.txt response means for the crawler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseClass {
    /// Crawl without restrictions.
    Unrestricted,
    /// The body holds the rules.
    Parse,
    WrongContentType(String),
    Unavailable(StatusCode),
}

impl fmt::Display for ResponseClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ResponseClass::Unrestricted => f.write_str("OK (no restrictions)"),
            ResponseClass::Parse => f.write_str("OK (parse body)"),
            ResponseClass::WrongContentType(ref content_type) => {
                write!(f, "x (wrong content type {:?})", content_type)
            }
            ResponseClass::Unavailable(ref status) => write!(f, "x ({})", status),
        }
    }
}

/// Classifies a robots.txt response by its content type, then its status.
pub fn classify(status: StatusCode, content_type: Option<&str>) -> ResponseClass {
    let content_type = content_type.unwrap_or_default();
    if !content_type.contains("text/plain") {
        return ResponseClass::WrongContentType(content_type.to_owned());
    }

    if status.is_client_error() {
        ResponseClass::Unrestricted
    } else if status.is_success() {
        ResponseClass::Parse
    } else {
        ResponseClass::Unavailable(status)
    }
}

pub fn classify_and_parse<R: Read>(
    status: StatusCode,
    content_type: Option<&str>,
    body: R,
    options: &ParseOptions,
) -> Result<Config> {
    let class = classify(status, content_type);
    debug!("robots.txt response {}: {}", status, class);

    match class {
        ResponseClass::Unrestricted => Ok(Config::default()),
        ResponseClass::Parse => parse_stream_with(body, options),
        ResponseClass::WrongContentType(content_type) => {
            Err(RobotsError::WrongContentType(content_type))
        }
        ResponseClass::Unavailable(status) => Err(RobotsError::Unavailable(status)),
    }
}

/// Turns a fetched robots.txt into a [`Config`]. A missing response means no restrictions.
pub fn parse_response<B: Read>(response: Option<Response<B>>) -> Result<Config> {
    parse_response_with(response, &ParseOptions::default())
}

pub fn parse_response_with<B: Read>(
    response: Option<Response<B>>,
    options: &ParseOptions,
) -> Result<Config> {
    let response = match response {
        Some(response) => response,
        None => return Ok(Config::default()),
    };

    let (parts, body) = response.into_parts();
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    classify_and_parse(parts.status, content_type, body, options)
}
