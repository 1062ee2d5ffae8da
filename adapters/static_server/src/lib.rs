#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static delivery layer for the web build of Sentinel.
//!
//! Serves a directory tree over HTTP with the cross-origin isolation headers
//! that threaded WebAssembly builds require. Requests never escape the
//! configured root.

use std::{
    fs, io,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use thiserror::Error;

const INDEX_FILE: &str = "index.html";
const OPENER_POLICY: &str = "same-origin";
const NOT_FOUND_BODY: &[u8] = b"404 Not Found";
const SERVER_ERROR_BODY: &[u8] = b"500 Internal Server Error";

/// Value sent in the `Cross-Origin-Embedder-Policy` header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum EmbedderPolicy {
    /// Loads cross-origin resources without credentials.
    #[default]
    Credentialless,
    /// Requires cross-origin resources to opt in explicitly.
    RequireCorp,
}

impl EmbedderPolicy {
    /// Header value for this policy.
    #[must_use]
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::Credentialless => "credentialless",
            Self::RequireCorp => "require-corp",
        }
    }
}

/// Failures raised while serving the web build.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The configured root is not a directory.
    #[error("web root {root} is not a directory")]
    MissingRoot {
        /// Configured root path.
        root: PathBuf,
    },
    /// The listener could not be bound.
    #[error("failed to bind {address}: {message}")]
    Bind {
        /// Requested listen address.
        address: SocketAddr,
        /// Reason reported by the HTTP server.
        message: String,
    },
    /// Waiting for the next request failed.
    #[error("failed to receive request")]
    Receive(#[source] io::Error),
    /// Writing a response failed.
    #[error("failed to send response")]
    Respond(#[source] io::Error),
    /// A response header could not be constructed.
    #[error("invalid response header {name}")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
    },
}

/// Settings for a [`StaticServer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServeConfig {
    /// Directory whose files are served.
    pub root: PathBuf,
    /// Address the listener binds to.
    pub address: SocketAddr,
    /// Embedder policy attached to every response.
    pub embedder_policy: EmbedderPolicy,
}

/// Fully resolved response for a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// Value of the `Content-Type` header.
    pub content_type: &'static str,
    /// Response body.
    pub body: Vec<u8>,
}

impl Reply {
    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain",
            body: NOT_FOUND_BODY.to_vec(),
        }
    }

    fn server_error() -> Self {
        Self {
            status: 500,
            content_type: "text/plain",
            body: SERVER_ERROR_BODY.to_vec(),
        }
    }
}

/// Maps a file extension onto the content type announced to browsers.
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("wasm") => "application/wasm",
        Some("js") => "application/javascript",
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// Resolves a request URL to a file below `root`.
///
/// Returns `None` when any path segment climbs out of the root.
#[must_use]
pub fn resolve_path(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let mut resolved = root.to_path_buf();
    let mut segments = 0_usize;

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            _ if segment.contains('\\') => return None,
            _ => {
                resolved.push(segment);
                segments += 1;
            }
        }
    }

    if segments == 0 {
        resolved.push(INDEX_FILE);
    }
    Some(resolved)
}

/// Builds the reply for `url` by reading the matching file under `root`.
#[must_use]
pub fn respond(root: &Path, url: &str) -> Reply {
    let Some(path) = resolve_path(root, url) else {
        tracing::warn!(url, "rejected path outside web root");
        return Reply::not_found();
    };
    if !path.is_file() {
        return Reply::not_found();
    }

    match fs::read(&path) {
        Ok(body) => Reply {
            status: 200,
            content_type: content_type_for(&path),
            body,
        },
        Err(error) if error.kind() == io::ErrorKind::NotFound => Reply::not_found(),
        Err(error) => {
            tracing::error!(path = %path.display(), %error, "failed to read file");
            Reply::server_error()
        }
    }
}

/// Blocking HTTP server delivering the web build.
pub struct StaticServer {
    server: tiny_http::Server,
    root: PathBuf,
    embedder_policy: EmbedderPolicy,
}

impl std::fmt::Debug for StaticServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticServer")
            .field("address", &self.local_addr())
            .field("root", &self.root)
            .field("embedder_policy", &self.embedder_policy)
            .finish()
    }
}

impl StaticServer {
    /// Binds the listener described by `config`.
    pub fn bind(config: ServeConfig) -> Result<Self, ServeError> {
        if !config.root.is_dir() {
            return Err(ServeError::MissingRoot { root: config.root });
        }

        let server =
            tiny_http::Server::http(config.address).map_err(|error| ServeError::Bind {
                address: config.address,
                message: error.to_string(),
            })?;
        let server = Self {
            server,
            root: config.root,
            embedder_policy: config.embedder_policy,
        };
        tracing::info!(
            address = ?server.local_addr(),
            root = %server.root.display(),
            embedder_policy = server.embedder_policy.header_value(),
            "serving web build"
        );
        Ok(server)
    }

    /// Address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serves requests until the listener fails.
    ///
    /// Failures to answer an individual request are logged and skipped.
    pub fn run(&self) -> Result<(), ServeError> {
        loop {
            match self.serve_one() {
                Ok(()) => {}
                Err(ServeError::Respond(error)) => {
                    tracing::warn!(%error, "client went away before the response completed");
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Blocks until one request arrives and answers it.
    pub fn serve_one(&self) -> Result<(), ServeError> {
        let request = self.server.recv().map_err(ServeError::Receive)?;
        let reply = respond(&self.root, request.url());
        tracing::debug!(
            method = %request.method(),
            url = request.url(),
            status = reply.status,
            "request served"
        );

        let response = tiny_http::Response::from_data(reply.body)
            .with_status_code(reply.status)
            .with_header(header("Content-Type", reply.content_type)?)
            .with_header(header("Cross-Origin-Opener-Policy", OPENER_POLICY)?)
            .with_header(header(
                "Cross-Origin-Embedder-Policy",
                self.embedder_policy.header_value(),
            )?);
        request.respond(response).map_err(ServeError::Respond)
    }
}

fn header(name: &'static str, value: &str) -> Result<tiny_http::Header, ServeError> {
    tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|()| ServeError::InvalidHeader { name })
}
