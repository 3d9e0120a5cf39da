//! Movie folder browser: scan a directory, enrich titles from OMDb, and serve
//! the listing and seekable streams over HTTP.

pub mod cli;
pub mod config;
pub mod http;
pub mod media;
