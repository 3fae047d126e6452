//! A partially dynamic read-only TFTP backend
//!
//! Static files such as kernels and initrds are served straight from the
//! filesystem, but PXE configuration files are generated on the fly: a
//! matching request is turned into an HTTP GET against the configured
//! generator URL and the response body is served as the file.
//!
//! Passing requests on to the generator must be done very selectively,
//! because failures halt the boot process. PXELINUX probes many similar
//! paths, so only the exact `maas/<arch>/<subarch>/pxelinux.cfg/<name>`
//! shape is forwarded; everything else goes to disk.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_tftp::packet;
use async_tftp::server::Handler;
use futures::io::AsyncRead;
use reqwest::Url;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{debug, warn};

use crate::error::TftpdError;

/// Subdirectory of the TFTP root whose pxelinux.cfg paths are generated.
const GENERATED_SUBDIR: &str = "maas";

/// Parameters captured from a generated config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigParams {
    pub arch: String,
    pub subarch: String,
    pub name: String,
}

/// Match `file_name` against the generated-config path shape.
///
/// Leading slashes are tolerated; TFTP clients are inconsistent about
/// sending them.
pub fn match_config_path(file_name: &str) -> Option<ConfigParams> {
    let trimmed = file_name.trim_start_matches('/');
    let segments: Vec<&str> = trimmed.split('/').collect();
    match segments.as_slice() {
        [GENERATED_SUBDIR, arch, subarch, "pxelinux.cfg", name]
            if !arch.is_empty() && !subarch.is_empty() && !name.is_empty() =>
        {
            Some(ConfigParams {
                arch: (*arch).to_string(),
                subarch: (*subarch).to_string(),
                name: (*name).to_string(),
            })
        }
        _ => None,
    }
}

/// TFTP request handler: generated PXE configs plus disk passthrough.
pub struct TftpBackend {
    root: PathBuf,
    generator_url: Url,
    http: reqwest::Client,
}

impl std::fmt::Debug for TftpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TftpBackend")
            .field("root", &self.root)
            .field("generator_url", &self.generator_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TftpBackend {
    /// Create a backend serving `root`, generating configs via
    /// `generator_url`.
    pub fn new(root: impl Into<PathBuf>, generator_url: &str) -> Result<Self, TftpdError> {
        let generator_url = Url::parse(generator_url)
            .map_err(|err| TftpdError::InvalidConfig(format!("bad generator URL: {err}")))?;
        // A hung generator must not hang every machine booting behind it.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            root: root.into(),
            generator_url,
            http,
        })
    }

    /// The URL to fetch one config from. Query layering, lowest to
    /// highest precedence: built-in defaults, the generator URL's own
    /// query, then the parameters captured from the request path.
    fn generator_url_for(&self, params: &ConfigParams) -> Url {
        let mut query: BTreeMap<String, String> = BTreeMap::from([
            ("menutitle".to_string(), String::new()),
            ("kernelimage".to_string(), String::new()),
            ("append".to_string(), String::new()),
        ]);
        for (key, value) in self.generator_url.query_pairs() {
            query.insert(key.into_owned(), value.into_owned());
        }
        query.insert("arch".to_string(), params.arch.clone());
        query.insert("subarch".to_string(), params.subarch.clone());
        query.insert("name".to_string(), params.name.clone());

        let mut url = self.generator_url.clone();
        url.query_pairs_mut().clear().extend_pairs(query.iter());
        url
    }

    async fn fetch_config(&self, params: &ConfigParams) -> Result<Vec<u8>, TftpdError> {
        let url = self.generator_url_for(params);
        debug!("fetching generated config: {}", url);
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TftpdError::Generator {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Resolve a request path under the TFTP root. Anything that is not
    /// a plain relative path is refused.
    fn local_path(&self, file_name: &str) -> Option<PathBuf> {
        let relative = Path::new(file_name.trim_start_matches('/'));
        for component in relative.components() {
            if !matches!(component, Component::Normal(_)) {
                return None;
            }
        }
        Some(self.root.join(relative))
    }
}

impl Handler for TftpBackend {
    type Reader = Box<dyn AsyncRead + Send + Unpin + 'static>;
    type Writer = futures::io::Sink;

    async fn read_req_open(
        &mut self,
        client: &SocketAddr,
        path: &Path,
    ) -> Result<(Self::Reader, Option<u64>), packet::Error> {
        let file_name = path.to_str().ok_or(packet::Error::FileNotFound)?;
        debug!(%client, file_name, "read request");

        if let Some(params) = match_config_path(file_name) {
            let config = self.fetch_config(&params).await.map_err(|err| {
                warn!(file_name, error = %err, "config generation failed");
                match err {
                    TftpdError::Generator { status: 404, .. } => packet::Error::FileNotFound,
                    other => packet::Error::Msg(other.to_string()),
                }
            })?;
            let size = config.len() as u64;
            let reader: Self::Reader = Box::new(futures::io::Cursor::new(config));
            return Ok((reader, Some(size)));
        }

        let local = self
            .local_path(file_name)
            .ok_or(packet::Error::PermissionDenied)?;
        let file = tokio::fs::File::open(&local)
            .await
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => packet::Error::FileNotFound,
                std::io::ErrorKind::PermissionDenied => packet::Error::PermissionDenied,
                _ => packet::Error::Msg(err.to_string()),
            })?;
        let size = file.metadata().await.ok().map(|m| m.len());
        let reader: Self::Reader = Box::new(file.compat());
        Ok((reader, size))
    }

    async fn write_req_open(
        &mut self,
        client: &SocketAddr,
        path: &Path,
        _size: Option<u64>,
    ) -> Result<Self::Writer, packet::Error> {
        warn!(%client, path = %path.display(), "rejecting write request");
        Err(packet::Error::IllegalOperation)
    }
}
