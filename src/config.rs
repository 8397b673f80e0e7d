//! Server configuration
//!
//! The listening port comes from the command line; everything else has a
//! default that can be overridden through `HTTPD_*` environment variables.

use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CGI_DIR: &str = "cgi-bin";
pub const DEFAULT_CGI_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_CGI_ARGS: usize = 126;
pub const DEFAULT_CHUNK_SIZE: usize = 8192;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the listener binds to
    pub listen_addr: SocketAddr,

    /// Server root; every request path is resolved relative to it
    pub root: PathBuf,

    /// Name of the CGI program directory under `root`
    pub cgi_dir: String,

    /// Where CGI output capture files are created
    pub tmp_dir: PathBuf,

    /// Upper bound on how long a CGI program may run (`None` = unbounded)
    pub cgi_timeout: Option<Duration>,

    /// Maximum number of query arguments handed to a CGI program
    pub max_cgi_args: usize,

    /// Read size used when streaming file bodies
    pub chunk_size: usize,

    /// How long a client may take to send its request line
    pub read_timeout: Duration,
}

impl Config {
    /// Configuration with defaults for everything but port and root.
    pub fn new(port: u16, root: impl Into<PathBuf>) -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
            root: root.into(),
            cgi_dir: DEFAULT_CGI_DIR.to_string(),
            tmp_dir: std::env::temp_dir(),
            cgi_timeout: Some(DEFAULT_CGI_TIMEOUT),
            max_cgi_args: DEFAULT_MAX_CGI_ARGS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Load from the process environment.
    ///
    /// The root is canonicalized here so the path validator compares
    /// against a stable absolute prefix.
    pub fn load(port: u16) -> Result<Self> {
        Self::from_lookup(port, |key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(port: u16, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = match lookup("HTTPD_ROOT") {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().context("cannot determine working directory")?,
        };
        let root = root
            .canonicalize()
            .with_context(|| format!("invalid server root {}", root.display()))?;

        let mut cfg = Self::new(port, root);

        if let Some(host) = lookup("HTTPD_HOST") {
            let ip: IpAddr = host
                .parse()
                .with_context(|| format!("invalid HTTPD_HOST {:?}", host))?;
            cfg.listen_addr.set_ip(ip);
        }

        if let Some(dir) = lookup("HTTPD_CGI_DIR") {
            let dir = dir.trim_matches('/').to_string();
            if dir.is_empty() || dir.contains("..") {
                anyhow::bail!("invalid HTTPD_CGI_DIR {:?}", dir);
            }
            cfg.cgi_dir = dir;
        }

        if let Some(dir) = lookup("HTTPD_TMP_DIR") {
            cfg.tmp_dir = PathBuf::from(dir);
        }

        if let Some(secs) = lookup("HTTPD_CGI_TIMEOUT") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("invalid HTTPD_CGI_TIMEOUT {:?}", secs))?;
            cfg.cgi_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(max) = lookup("HTTPD_MAX_CGI_ARGS") {
            cfg.max_cgi_args = max
                .parse()
                .with_context(|| format!("invalid HTTPD_MAX_CGI_ARGS {:?}", max))?;
        }

        if let Some(secs) = lookup("HTTPD_READ_TIMEOUT") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("invalid HTTPD_READ_TIMEOUT {:?}", secs))?;
            cfg.read_timeout = Duration::from_secs(secs.max(1));
        }

        Ok(cfg)
    }

    pub fn with_cgi_dir(mut self, dir: impl Into<String>) -> Self {
        self.cgi_dir = dir.into();
        self
    }

    pub fn with_tmp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = dir.into();
        self
    }

    pub fn with_cgi_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.cgi_timeout = timeout;
        self
    }

    pub fn with_max_cgi_args(mut self, max: usize) -> Self {
        self.max_cgi_args = max;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Request-path prefix that selects CGI mode, e.g. `cgi-bin/`.
    pub fn cgi_prefix(&self) -> String {
        format!("{}/", self.cgi_dir)
    }

    /// Absolute directory holding CGI programs.
    pub fn cgi_root(&self) -> PathBuf {
        self.root.join(&self.cgi_dir)
    }

    /// Filesystem location of a CGI program given its path relative to the
    /// CGI root. Both validation and execution go through this.
    ///
    /// `None` unless `program` is a plain relative path.
    pub fn cgi_program_path(&self, program: &str) -> Option<PathBuf> {
        join_relative(&self.cgi_root(), program)
    }

    /// Filesystem location of a non-CGI request path, `None` unless `path`
    /// is a plain relative path.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        join_relative(&self.root, path)
    }
}

/// Joins `rel` onto `base` only if it cannot leave `base` lexically: no
/// root, prefix or parent components. `Path::join` would otherwise replace
/// `base` entirely when handed an absolute path.
fn join_relative(base: &Path, rel: &str) -> Option<PathBuf> {
    let rel = Path::new(rel);
    let plain = rel
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    plain.then(|| base.join(rel))
}
