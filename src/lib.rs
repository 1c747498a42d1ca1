//! Robots exclusion (robots.txt) policies for crawlers.
//!
//! ```
//! use robots_policy::parse_str;
//!
//! let config = parse_str("User-agent: *\nDisallow: /\nAllow: /public").unwrap();
//! let group = config.match_group("MyCrawler/1.0");
//! assert!(group.is_allowed("/public/index.html"));
//! assert!(!group.is_allowed("/private"));
//! ```

pub mod robots;

pub use robots::*;
