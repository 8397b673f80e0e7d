//! tinyhttpd - minimal HTTP/1.0 origin server
//!
//! Serves static files, lists directories and runs CGI programs.

pub mod cli;
pub mod config;
pub mod handler;
pub mod http;
pub mod server;
