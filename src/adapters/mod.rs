//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external systems:
//! - `http`: remote classifier over HTTP/JSON (reqwest)
//! - `markdown`: report documents written as Markdown files
//! - `sanitize`: secret filtering for logs

pub mod http;
pub mod markdown;
pub mod sanitize;
