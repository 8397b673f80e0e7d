#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tinyhttpd::config::Config;
use tinyhttpd::handler::Dispatcher;
use tinyhttpd::http::writer::ResponseWriter;

/// A scratch server root with a `cgi-bin` directory and a private temp dir
/// for CGI capture files.
pub struct Site {
    pub root: TempDir,
    pub tmp: TempDir,
}

impl Site {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("cgi-bin")).unwrap();
        Self {
            root,
            tmp: tempfile::tempdir().unwrap(),
        }
    }

    pub fn config(&self) -> Config {
        Config::new(8080, self.root.path().canonicalize().unwrap()).with_tmp_dir(self.tmp.path())
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::new(self.config())).unwrap()
    }

    pub fn write(&self, rel: &str, contents: &[u8]) {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    pub fn script(&self, rel: &str, body: &str) {
        write_script(&self.root.path().join(rel), body);
    }

    /// Names of files left in the capture directory.
    pub fn leftover_captures(&self) -> Vec<String> {
        fs::read_dir(self.tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

pub fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

pub const ECHO_ARGS: &str = "#!/bin/sh\nfor a in \"$0\" \"$@\"; do printf '%s\\n' \"$a\"; done\n";

/// Dispatches `raw` and returns everything the writer sent.
pub async fn exchange(dispatcher: &Dispatcher, raw: &str) -> Vec<u8> {
    let response = dispatcher.dispatch(raw.as_bytes(), 1).await;
    let mut out = Vec::new();
    let mut writer = ResponseWriter::new(response, 7);
    writer.write_to_stream(&mut out).await.unwrap();
    out
}

/// A response split into status line, headers and body.
pub struct Parsed {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Parsed {
    pub fn status(&self) -> u16 {
        self.status_line.split(' ').nth(1).unwrap().parse().unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub fn parse(raw: &[u8]) -> Parsed {
    let split = raw.windows(4).position(|w| w == b"\r\n\r\n").expect("no header terminator");
    let head = std::str::from_utf8(&raw[..split]).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap().to_string();
    let headers = lines
        .map(|l| {
            let (k, v) = l.split_once(": ").unwrap();
            (k.to_string(), v.to_string())
        })
        .collect();

    Parsed {
        status_line,
        headers,
        body: raw[split + 4..].to_vec(),
    }
}
