//! Request dispatch
//!
//! Turns the raw bytes of one request into exactly one response. The
//! routing decision is made by [`classify`], a pure function, so the order
//! of the checks can be tested without a filesystem.

use std::io;
use std::sync::Arc;

use crate::config::Config;
use crate::handler::cgi::{CgiExecutor, CgiInvocation};
use crate::handler::directory;
use crate::handler::path_guard::PathGuard;
use crate::handler::static_file;
use crate::http::parser::{ParseError, parse_request_line};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

/// Where a request is routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single file directly under the root
    Static(String),
    /// Anything else containing a `/`
    Directory(String),
    /// A program under the CGI root; `program` is relative to that root
    Cgi {
        program: String,
        raw_args: Option<String>,
    },
}

/// Why a request was refused before routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ParentDirectory,
    AbsolutePath,
    EmptyPath,
    MethodNotSupported,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::ParentDirectory | Rejection::AbsolutePath => StatusCode::Forbidden,
            Rejection::EmptyPath => StatusCode::BadRequest,
            Rejection::MethodNotSupported => StatusCode::NotImplemented,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Rejection::ParentDirectory => "Access to parent directory denied",
            Rejection::AbsolutePath => "Access denied (absolute path)",
            Rejection::EmptyPath => "Filename must be given",
            Rejection::MethodNotSupported => "Only GET and HEAD methods supported",
        }
    }

    pub fn into_response(self) -> Response {
        Response::error(self.status(), self.message())
    }
}

/// Classifies a parsed request. First match wins:
///
/// 1. a path containing `..` is refused,
/// 2. a path that is still absolute (`//etc/`) is refused,
/// 3. an empty path is refused,
/// 4. a path starting with `cgi_prefix` is a CGI request, split at the
///    first `?`; its program part must not be absolute either,
/// 5. a path containing `/` is a directory request,
/// 6. anything else is a static file, for GET and HEAD only.
///
/// The CGI check must stay ahead of the separator check: every CGI path
/// contains a `/`.
pub fn classify(request: &Request, cgi_prefix: &str) -> Result<Target, Rejection> {
    let path = request.path.as_str();

    if path.contains("..") {
        return Err(Rejection::ParentDirectory);
    }

    if path.starts_with('/') {
        return Err(Rejection::AbsolutePath);
    }

    if path.is_empty() {
        return Err(Rejection::EmptyPath);
    }

    if path.starts_with(cgi_prefix) {
        let (program, raw_args) = request.split_query();
        let program = program.get(cgi_prefix.len()..).unwrap_or_default();
        if program.starts_with('/') {
            return Err(Rejection::AbsolutePath);
        }
        return Ok(Target::Cgi {
            program: program.to_string(),
            raw_args: raw_args.map(str::to_string),
        });
    }

    if path.contains('/') {
        return Ok(Target::Directory(path.to_string()));
    }

    if !request.method.is_get_or_head() {
        return Err(Rejection::MethodNotSupported);
    }

    Ok(Target::Static(path.to_string()))
}

/// Routes requests to the static file server, directory lister or CGI
/// executor. Shared by all connections; holds no per-request state.
#[derive(Debug)]
pub struct Dispatcher {
    config: Arc<Config>,
    guard: PathGuard,
    cgi: CgiExecutor,
    cgi_prefix: String,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>) -> io::Result<Self> {
        let guard = PathGuard::new(&config.root)?;
        let cgi = CgiExecutor::new(&config);
        let cgi_prefix = config.cgi_prefix();

        Ok(Self {
            config,
            guard,
            cgi,
            cgi_prefix,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handles the raw bytes of one request.
    pub async fn dispatch(&self, raw: &[u8], conn: u64) -> Response {
        match parse_request_line(raw) {
            Ok(request) => self.handle(&request, conn).await,
            Err(e) => {
                if let ParseError::WrongTokenCount(n) = e {
                    tracing::warn!(conn, tokens = n, "Malformed request line");
                } else {
                    tracing::warn!(conn, error = ?e, "Unreadable request line");
                }
                Response::error(StatusCode::BadRequest, "Malformed request line")
            }
        }
    }

    /// Handles a parsed request.
    pub async fn handle(&self, request: &Request, conn: u64) -> Response {
        let target = match classify(request, &self.cgi_prefix) {
            Ok(target) => target,
            Err(rejection) => {
                tracing::warn!(conn, path = %request.path, ?rejection, "Request rejected");
                return rejection.into_response();
            }
        };

        let method = request.method.as_str();
        tracing::debug!(conn, method, ?target, "Request classified");

        let response = match target {
            Target::Static(path) => match self.config.resolve(&path) {
                Some(file) => static_file::serve(&file).await,
                None => return Rejection::AbsolutePath.into_response(),
            },
            Target::Directory(path) => match self.config.resolve(&path) {
                Some(dir) => directory::list(&dir).await,
                None => return Rejection::AbsolutePath.into_response(),
            },
            Target::Cgi { program, raw_args } => {
                let invocation =
                    CgiInvocation::new(&self.config, &program, raw_args.as_deref())
                        .filter(|inv| self.guard.validate(&inv.program));
                let Some(invocation) = invocation else {
                    tracing::warn!(conn, %program, "CGI path outside server root");
                    return Response::error(StatusCode::Forbidden, "Invalid path");
                };
                self.cgi.execute(&invocation, request, conn).await
            }
        };

        if request.is_head() && response.status == StatusCode::Ok {
            response.head_only()
        } else {
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::Method;

    fn req(method: Method, path: &str) -> Request {
        Request::new(method, path, "HTTP/1.0")
    }

    #[test]
    fn cgi_prefix_beats_separator() {
        let target = classify(&req(Method::GET, "cgi-bin/tools/run?x&y"), "cgi-bin/").unwrap();
        assert_eq!(
            target,
            Target::Cgi {
                program: "tools/run".to_string(),
                raw_args: Some("x&y".to_string())
            }
        );
    }

    #[test]
    fn cgi_ignores_method() {
        let target = classify(&req(Method::POST, "cgi-bin/run"), "cgi-bin/").unwrap();
        assert_eq!(
            target,
            Target::Cgi {
                program: "run".to_string(),
                raw_args: None
            }
        );
    }

    #[test]
    fn bare_cgi_dir_is_static() {
        let target = classify(&req(Method::GET, "cgi-bin"), "cgi-bin/").unwrap();
        assert_eq!(target, Target::Static("cgi-bin".to_string()));
    }

    #[test]
    fn dot_dot_checked_before_empty() {
        assert_eq!(
            classify(&req(Method::GET, "a/../b"), "cgi-bin/"),
            Err(Rejection::ParentDirectory)
        );
        assert_eq!(
            classify(&req(Method::GET, "x..y"), "cgi-bin/"),
            Err(Rejection::ParentDirectory)
        );
    }

    #[test]
    fn leftover_leading_slash_refused() {
        assert_eq!(
            classify(&req(Method::GET, "/etc/"), "cgi-bin/"),
            Err(Rejection::AbsolutePath)
        );
        assert_eq!(
            classify(&req(Method::GET, "/etc/passwd"), "cgi-bin/"),
            Err(Rejection::AbsolutePath)
        );
        assert_eq!(
            classify(&req(Method::GET, "cgi-bin//bin/sh?-c"), "cgi-bin/"),
            Err(Rejection::AbsolutePath)
        );
    }

    #[test]
    fn static_needs_get_or_head() {
        assert_eq!(
            classify(&req(Method::DELETE, "index.html"), "cgi-bin/"),
            Err(Rejection::MethodNotSupported)
        );
        assert_eq!(
            classify(&req(Method::HEAD, "index.html"), "cgi-bin/"),
            Ok(Target::Static("index.html".to_string()))
        );
    }

    #[test]
    fn directory_ignores_method() {
        assert_eq!(
            classify(&req(Method::Other("BREW".to_string()), "docs/"), "cgi-bin/"),
            Ok(Target::Directory("docs/".to_string()))
        );
    }
}
