//! Log archive backed by the `object_store` crate.

use std::io::{BufReader, Cursor};
use std::sync::Arc;

use bytes::Bytes;
use flate2::read::MultiGzDecoder;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::{GetOptions, ObjectStore};

use super::{ObjectRef, StoreError, StoreOptions, StoreResult, StoreSpec};

/// Gunzipped reader over one fetched object.
pub type DecompressedReader = BufReader<MultiGzDecoder<Cursor<Bytes>>>;

/// A cluster's log archive.
///
/// Supports:
/// - S3 (EMR `s3://`, `s3n://` and `s3a://` log URIs)
/// - Local filesystem (copied log trees)
/// - In-memory, through [`LogArchive::with_store`] only
pub struct LogArchive {
    inner: Arc<dyn ObjectStore>,
    spec: StoreSpec,
}

impl LogArchive {
    /// Create an archive client from a parsed spec.
    pub fn from_spec(spec: &StoreSpec, options: &StoreOptions) -> StoreResult<Self> {
        let inner: Arc<dyn ObjectStore> = match spec.scheme.as_str() {
            "memory" => {
                return Err(StoreError::InvalidSpec {
                    spec: format!("memory://{}", spec.prefix),
                    reason: "in-memory archives must be injected with LogArchive::with_store"
                        .to_string(),
                })
            }
            "file" => Arc::new(object_store::local::LocalFileSystem::new()),
            "s3" => {
                let bucket = spec
                    .bucket
                    .as_ref()
                    .ok_or_else(|| StoreError::InvalidSpec {
                        spec: format!("s3:///{}", spec.prefix),
                        reason: "S3 URI must include bucket name".to_string(),
                    })?;

                let mut builder =
                    object_store::aws::AmazonS3Builder::from_env().with_bucket_name(bucket);

                if let Some(region) = spec.region.as_ref().or(options.region.as_ref()) {
                    builder = builder.with_region(region);
                }
                if let Some(endpoint) = &options.endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }

                Arc::new(builder.build().map_err(|e| StoreError::Io {
                    message: format!("failed to create S3 client: {}", e),
                })?)
            }
            scheme => {
                return Err(StoreError::InvalidSpec {
                    spec: spec.scheme.clone(),
                    reason: format!("unsupported scheme: {}", scheme),
                })
            }
        };

        Ok(Self {
            inner,
            spec: spec.clone(),
        })
    }

    /// Create an archive client from a log URI.
    pub fn from_uri(uri: &str, options: &StoreOptions) -> StoreResult<Self> {
        let spec = StoreSpec::parse(uri)?;
        Self::from_spec(&spec, options)
    }

    /// Wrap an existing store, e.g. a pre-populated in-memory one.
    pub fn with_store(inner: Arc<dyn ObjectStore>, spec: StoreSpec) -> Self {
        Self { inner, spec }
    }

    pub fn spec(&self) -> &StoreSpec {
        &self.spec
    }

    /// Bucket name reported on listed objects; empty for local stores.
    pub fn bucket(&self) -> &str {
        self.spec.bucket.as_deref().unwrap_or_default()
    }

    /// Every object below `prefix`, sorted by key.
    ///
    /// S3 already lists lexicographically; the sort makes the local and
    /// in-memory backends agree. A prefix with nothing under it yields an
    /// empty list.
    pub async fn list_leaf_objects(&self, prefix: &str) -> StoreResult<Vec<ObjectRef>> {
        let prefix_path = to_path(prefix);
        let list = self.inner.list(Some(&prefix_path));

        let entries: Vec<_> = match list.try_collect().await {
            Ok(entries) => entries,
            Err(object_store::Error::NotFound { .. }) => Vec::new(),
            Err(e) => {
                return Err(StoreError::Io {
                    message: format!("failed to list {}: {}", prefix, e),
                })
            }
        };

        let mut objects: Vec<ObjectRef> = entries
            .iter()
            .map(|entry| ObjectRef {
                bucket: self.bucket().to_string(),
                key: entry.location.as_ref().to_string(),
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!(prefix, count = objects.len(), "listed log objects");
        Ok(objects)
    }

    /// Raw object bytes.
    pub async fn get_object(&self, key: &str) -> StoreResult<Bytes> {
        let result = self
            .inner
            .get_opts(&to_path(key), GetOptions::default())
            .await
            .map_err(|e| StoreError::from_object_store(e, key))?;

        result.bytes().await.map_err(|e| StoreError::Io {
            message: format!("failed to read {}: {}", key, e),
        })
    }

    /// Fetch an object and wrap it in a gunzipping line reader.
    ///
    /// The reader owns the fetched bytes; dropping it releases everything
    /// held for the object.
    pub async fn open_decompressed(&self, key: &str) -> StoreResult<DecompressedReader> {
        let bytes = self.get_object(key).await?;
        Ok(BufReader::new(MultiGzDecoder::new(Cursor::new(bytes))))
    }
}

/// Keys from listings are already encoded; only fall back to encoding
/// parts for hand-built keys that are not valid paths.
fn to_path(key: &str) -> Path {
    let key = key.trim_matches('/');
    Path::parse(key).unwrap_or_else(|_| Path::from(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryLines;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use object_store::{PutOptions, PutPayload};
    use std::io::{Read, Write};

    fn gzip(text: &str) -> Bytes {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        Bytes::from(encoder.finish().unwrap())
    }

    async fn seeded(objects: &[(&str, Bytes)]) -> LogArchive {
        let inner = Arc::new(object_store::memory::InMemory::new());
        for (key, bytes) in objects {
            inner
                .put_opts(
                    &Path::from(*key),
                    PutPayload::from_bytes(bytes.clone()),
                    PutOptions::default(),
                )
                .await
                .unwrap();
        }
        LogArchive::with_store(inner, StoreSpec::parse("memory://logs").unwrap())
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_scoped() {
        let archive = seeded(&[
            ("h/2024/01/02/000000/b.jhist.gz", gzip("b")),
            ("h/2024/01/02/000000/a.jhist.gz", gzip("a")),
            ("h/2024/01/02/000000/a_conf.xml", Bytes::from("x")),
            ("h/2024/01/03/000000/c.jhist.gz", gzip("c")),
        ])
        .await;

        let objects = archive
            .list_leaf_objects("h/2024/01/02/000000")
            .await
            .unwrap();
        let keys: Vec<_> = objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "h/2024/01/02/000000/a.jhist.gz",
                "h/2024/01/02/000000/a_conf.xml",
                "h/2024/01/02/000000/b.jhist.gz",
            ]
        );
        assert!(objects.iter().all(|o| o.bucket == "logs"));
    }

    #[tokio::test]
    async fn test_list_missing_prefix_is_empty() {
        let archive = seeded(&[]).await;
        let objects = archive.list_leaf_objects("nothing/here").await.unwrap();
        assert!(objects.is_empty());
    }

    async fn lines(archive: &LogArchive, key: &str) -> Vec<std::io::Result<String>> {
        let reader = archive.open_decompressed(key).await.unwrap();
        HistoryLines::new(reader)
            .map(|item| item.map(|(_, line)| line))
            .collect()
    }

    #[tokio::test]
    async fn test_decompressed_lines() {
        let archive = seeded(&[("k.jhist.gz", gzip("Avro-Json\r\n{\"a\":1}\n\n{\"b\":2}"))]).await;
        let lines: Vec<String> = lines(&archive, "k.jhist.gz")
            .await
            .into_iter()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines, vec!["Avro-Json", "{\"a\":1}", "", "{\"b\":2}"]);
    }

    #[tokio::test]
    async fn test_plain_text_fails_on_first_read() {
        let archive = seeded(&[("k.jhist.gz", Bytes::from("not gzip"))]).await;
        let lines = lines(&archive, "k.jhist.gz").await;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_err());
    }

    #[test]
    fn test_memory_uri_needs_injected_store() {
        let err = LogArchive::from_uri("memory://logs", &StoreOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::InvalidSpec { .. }));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let archive = seeded(&[]).await;
        let err = archive.get_object("missing.jhist.gz").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_open_decompressed_streams() {
        let archive = seeded(&[("k.gz", gzip("hello\nworld\n"))]).await;
        let mut reader = archive.open_decompressed("k.gz").await.unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hello\nworld\n");
    }

    #[tokio::test]
    async fn test_local_filesystem_archive() {
        let dir = tempfile::Builder::new().prefix("emr-idle").tempdir().unwrap();
        let leaf = dir.path().join("j-1/history");
        std::fs::create_dir_all(&leaf).unwrap();
        std::fs::write(leaf.join("job.jhist.gz"), gzip("line")).unwrap();

        let uri = format!("file://{}", dir.path().display());
        let archive = LogArchive::from_uri(&uri, &StoreOptions::default()).unwrap();
        let prefix = archive.spec().key("j-1/history");
        let objects = archive.list_leaf_objects(&prefix).await.unwrap();
        assert_eq!(objects.len(), 1);
        assert!(objects[0].key.ends_with("job.jhist.gz"));
        assert_eq!(objects[0].bucket, "");

        let lines: Vec<String> = lines(&archive, &objects[0].key)
            .await
            .into_iter()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines, vec!["line"]);
    }
}
