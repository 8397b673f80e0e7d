//! CGI program execution
//!
//! A program is run with the request's query tokens as positional
//! arguments. Its standard output goes to a private capture file which
//! becomes the response body once the program has exited.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tempfile::{Builder, TempPath};
use tokio::fs::File;
use tokio::process::{Child, Command};

use crate::config::Config;
use crate::http::mime;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

const SERVER_SOFTWARE: &str = concat!("tinyhttpd/", env!("CARGO_PKG_VERSION"));

/// Splits a raw query string into program arguments.
///
/// Tokens are separated by `&`, kept in order and passed verbatim (no
/// URL decoding). Empty tokens are skipped and at most `max` tokens are
/// returned.
///
/// # Example
///
/// ```
/// # use tinyhttpd::handler::cgi::split_args;
/// assert_eq!(split_args(Some("a&&b&c"), 2), vec!["a", "b"]);
/// assert!(split_args(None, 8).is_empty());
/// ```
pub fn split_args(raw: Option<&str>, max: usize) -> Vec<String> {
    raw.map(|raw| {
        raw.split('&')
            .filter(|token| !token.is_empty())
            .take(max)
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Everything needed to launch one CGI program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiInvocation {
    /// Absolute program path, also used as `argv[0]`
    pub program: PathBuf,
    /// Arguments after `argv[0]`
    pub args: Vec<String>,
    /// Program path as requested, e.g. `/cgi-bin/echo`
    pub script_name: String,
    /// Raw query text, empty when there was none
    pub query: String,
}

impl CgiInvocation {
    /// `None` when `program` is not a plain relative path.
    pub fn new(config: &Config, program: &str, raw_args: Option<&str>) -> Option<Self> {
        Some(Self {
            program: config.cgi_program_path(program)?,
            args: split_args(raw_args, config.max_cgi_args),
            script_name: format!("/{}{}", config.cgi_prefix(), program),
            query: raw_args.unwrap_or_default().to_string(),
        })
    }

    /// Full argument vector, program path first.
    pub fn argv(&self) -> Vec<&OsStr> {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsStr::new))
            .collect()
    }
}

/// Runs CGI programs on behalf of the dispatcher.
#[derive(Debug, Clone)]
pub struct CgiExecutor {
    root: PathBuf,
    tmp_dir: PathBuf,
    timeout: Option<Duration>,
}

impl CgiExecutor {
    pub fn new(config: &Config) -> Self {
        Self {
            root: config.root.clone(),
            tmp_dir: config.tmp_dir.clone(),
            timeout: config.cgi_timeout,
        }
    }

    /// Runs `invocation` and turns its output into a response.
    ///
    /// `conn` identifies the connection and makes the capture file name
    /// unique among requests handled concurrently by this process.
    pub async fn execute(
        &self,
        invocation: &CgiInvocation,
        request: &Request,
        conn: u64,
    ) -> Response {
        let program = invocation.program.display();

        if !is_executable(&invocation.program).await {
            tracing::debug!(conn, %program, "CGI program missing or not executable");
            return Response::error(StatusCode::NotFound, "Program not found");
        }

        let capture = match Builder::new()
            .prefix(&format!("cgi_output_{}_{}_", std::process::id(), conn))
            .tempfile_in(&self.tmp_dir)
        {
            Ok(f) => f,
            Err(e) => {
                let dir = self.tmp_dir.display();
                tracing::error!(conn, error = %e, %dir, "Cannot create CGI capture file");
                return capture_failed();
            }
        };

        let stdout = match capture.as_file().try_clone() {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(conn, error = %e, "Cannot duplicate CGI capture handle");
                return capture_failed();
            }
        };

        let child = self.spawn(invocation, request, Stdio::from(stdout));
        // Drop the parent's handle; the path stays until `capture_path` is dropped
        let capture_path = capture.into_temp_path();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(conn, %program, error = %e, "Failed to spawn CGI program");
                return Response::error(StatusCode::InternalServerError, "Failed to start program");
            }
        };

        let status = match self.wait(&mut child, conn).await {
            Ok(status) => status,
            Err(response) => return response,
        };

        if !status.success() {
            tracing::warn!(conn, %program, %status, "CGI program failed");
            return Response::error(StatusCode::InternalServerError, "CGI program failed");
        }

        read_output(capture_path, conn).await
    }

    fn spawn(
        &self,
        invocation: &CgiInvocation,
        request: &Request,
        stdout: Stdio,
    ) -> std::io::Result<Child> {
        tracing::debug!(
            argv = ?invocation.argv(),
            "Spawning CGI program"
        );

        Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(stdout)
            .env("GATEWAY_INTERFACE", "CGI/1.1")
            .env("QUERY_STRING", &invocation.query)
            .env("REQUEST_METHOD", request.method.as_str())
            .env("SCRIPT_NAME", &invocation.script_name)
            .env("SERVER_PROTOCOL", &request.protocol)
            .env("SERVER_SOFTWARE", SERVER_SOFTWARE)
            .kill_on_drop(true)
            .spawn()
    }

    /// Waits for exactly this child, bounded by the configured timeout.
    async fn wait(&self, child: &mut Child, conn: u64) -> Result<ExitStatus, Response> {
        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait()).await.ok(),
            None => Some(child.wait().await),
        };

        match waited {
            Some(Ok(status)) => Ok(status),
            Some(Err(e)) => {
                tracing::error!(conn, error = %e, "Waiting for CGI program failed");
                Err(Response::error(
                    StatusCode::InternalServerError,
                    "Failed to wait for program",
                ))
            }
            None => {
                tracing::warn!(conn, timeout = ?self.timeout, "CGI program timed out, killing it");
                if let Err(e) = child.kill().await {
                    tracing::error!(conn, error = %e, "Failed to kill CGI program");
                }
                Err(Response::error(StatusCode::InternalServerError, "CGI program timed out"))
            }
        }
    }
}

fn capture_failed() -> Response {
    Response::error(StatusCode::InternalServerError, "Failed to create output file")
}

async fn read_output(capture_path: TempPath, conn: u64) -> Response {
    let file = match File::open(&capture_path).await {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(conn, error = %e, "Cannot reopen CGI capture file");
            return Response::error(StatusCode::InternalServerError, "Failed to read output");
        }
    };

    let len = match file.metadata().await {
        Ok(meta) => meta.len(),
        Err(e) => {
            tracing::error!(conn, error = %e, "Cannot stat CGI capture file");
            return Response::error(StatusCode::InternalServerError, "Failed to read output");
        }
    };

    Response::file(mime::TEXT_PLAIN, file, len).with_cleanup(capture_path)
}

#[cfg(unix)]
async fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
async fn is_executable(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_keep_order() {
        assert_eq!(split_args(Some("c&b&a"), 10), vec!["c", "b", "a"]);
    }

    #[test]
    fn args_are_not_decoded() {
        assert_eq!(split_args(Some("x=1&a%20b"), 10), vec!["x=1", "a%20b"]);
    }

    #[test]
    fn args_capped() {
        let raw = vec!["x"; 300].join("&");
        assert_eq!(split_args(Some(raw.as_str()), 126).len(), 126);
    }

    #[test]
    fn invocation_joins_program_under_cgi_root() {
        let cfg = Config::new(8080, "/srv/www");
        let inv = CgiInvocation::new(&cfg, "tools/echo", Some("a&b")).unwrap();

        assert_eq!(inv.program, PathBuf::from("/srv/www/cgi-bin/tools/echo"));
        assert_eq!(inv.script_name, "/cgi-bin/tools/echo");
        assert_eq!(
            inv.argv(),
            vec![
                OsStr::new("/srv/www/cgi-bin/tools/echo"),
                OsStr::new("a"),
                OsStr::new("b")
            ]
        );
    }

    #[test]
    fn invocation_refuses_absolute_program() {
        let cfg = Config::new(8080, "/srv/www");
        assert_eq!(CgiInvocation::new(&cfg, "/bin/sh", Some("-c&id")), None);
    }
}
