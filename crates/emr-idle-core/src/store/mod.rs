//! Read access to a cluster's log archive.
//!
//! EMR writes framework logs under the cluster's `LogUri`, usually an
//! `s3n://` or `s3://` location. This module only lists objects under a
//! prefix and hands back gunzipped contents; everything else about job
//! history lives in [`crate::history`].
//!
//! # Supported URIs
//!
//! ```text
//! s3://bucket/prefix       (also s3n:// and s3a://)
//! file:///var/log/emr
//! memory://                (tests, with an injected store)
//! ```

pub mod error;
pub mod object_store_backend;

pub use error::{StoreError, StoreResult};
pub use object_store_backend::LogArchive;

/// Parsed log URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSpec {
    /// Normalized scheme: `s3`, `file` or `memory`.
    pub scheme: String,
    /// Bucket name (absent for file://)
    pub bucket: Option<String>,
    /// Key prefix within the bucket, without leading or trailing slashes.
    pub prefix: String,
    /// Region from a `?region=` query parameter.
    pub region: Option<String>,
}

impl StoreSpec {
    /// Parse a URI like `s3n://bucket/logs/` or `file:///path`.
    pub fn parse(uri: &str) -> StoreResult<Self> {
        let url = url::Url::parse(uri).map_err(|e| StoreError::InvalidSpec {
            spec: uri.to_string(),
            reason: e.to_string(),
        })?;

        let scheme = match url.scheme() {
            "s3" | "s3n" | "s3a" => "s3",
            "file" => "file",
            "memory" => "memory",
            other => {
                return Err(StoreError::InvalidSpec {
                    spec: uri.to_string(),
                    reason: format!("unsupported scheme: {}", other),
                })
            }
        }
        .to_string();

        let host = url
            .host_str()
            .filter(|h| !h.is_empty() && *h != "localhost")
            .map(|s| s.to_string());
        let path = url.path().trim_matches('/');

        // file://dir/sub is a path, not a bucket
        let (bucket, prefix) = match (scheme.as_str(), host) {
            ("file", Some(host)) if path.is_empty() => (None, host),
            ("file", Some(host)) => (None, format!("{}/{}", host, path)),
            (_, host) => (host, path.to_string()),
        };

        let region = url
            .query_pairs()
            .find(|(k, _)| k == "region")
            .map(|(_, v)| v.to_string());

        Ok(Self {
            scheme,
            bucket,
            prefix,
            region,
        })
    }

    /// Key under this spec's prefix, joined with exactly one slash.
    pub fn key(&self, relative: &str) -> String {
        let relative = relative.trim_matches('/');
        if self.prefix.is_empty() {
            relative.to_string()
        } else if relative.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}/{}", self.prefix, relative)
        }
    }
}

/// Client options for building a [`LogArchive`].
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// AWS region; a `?region=` in the URI wins.
    pub region: Option<String>,
    /// Custom S3 endpoint (MinIO, LocalStack).
    pub endpoint: Option<String>,
}

/// One listed log object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}
