//! Request handling
//!
//! - **`dispatcher`**: classifies a request and routes it
//! - **`path_guard`**: canonical-path containment check for CGI programs
//! - **`static_file`**: single-file responses for GET and HEAD
//! - **`directory`**: plain-text directory listings
//! - **`cgi`**: runs CGI programs and returns their standard output
//!
//! Every handler turns its own failures into an error [`Response`]; nothing
//! propagates past the component that detected it.
//!
//! [`Response`]: crate::http::response::Response

pub mod cgi;
pub mod directory;
pub mod dispatcher;
pub mod path_guard;
pub mod static_file;

pub use dispatcher::{Dispatcher, Rejection, Target, classify};
