//! Content-addressed image storage.
//!
//! Every uploaded image is named after the SHA-256 of its bytes
//! (`<64 lowercase hex>.jpg`) and written into one flat directory. The same
//! content always maps to the same name, and a name that already exists is
//! never written again: the first writer wins and later identical uploads
//! return the existing name.
//!
//! # Publishing
//!
//! Bytes are first written to a uniquely named temporary file inside the
//! managed directory and then published with a hard link. Linking fails
//! with `AlreadyExists` if another writer published the same name first,
//! which is treated as a dedup hit. Readers therefore only ever see
//! complete files, and an existing file is never overwritten.
//!
//! # Resolution
//!
//! [`ImageStore::resolve`] accepts only a single plain file name ending in
//! `.jpg` or `.jpeg`. Parent-directory segments, absolute paths, nested
//! paths, and drive prefixes are rejected as `Invalid` before the
//! filesystem is consulted, so a request can never name a file outside the
//! managed directory. A well-formed name with no file behind it is
//! `NotFound`, which callers usually answer with [`ImageStore::placeholder_path`].

use sha2::{Digest, Sha256};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::{CatalogError, CatalogResult};

/// File name of the fallback image served for missing files.
pub const PLACEHOLDER_NAME: &str = "default.jpg";

const CANONICAL_EXTENSION: &str = ".jpg";
const ACCEPTED_EXTENSIONS: [&str; 2] = [".jpg", ".jpeg"];

/// Neutral grey 8x8 baseline JPEG written as `default.jpg` when missing.
static PLACEHOLDER_BYTES: &[u8] = include_bytes!("../assets/default.jpg");

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

/// Canonical file name for `bytes`.
pub fn content_name(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{}{}", hex::encode(hasher.finalize()), CANONICAL_EXTENSION)
}

impl ImageStore {
    /// Open (and create if needed) the managed directory, making sure the
    /// placeholder image exists.
    pub async fn open(dir: impl Into<PathBuf>) -> CatalogResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        // Absolute so resolved paths stay valid regardless of the cwd.
        let dir = tokio::fs::canonicalize(&dir).await?;
        let store = Self { dir };

        let placeholder = store.placeholder_path();
        if !tokio::fs::try_exists(&placeholder).await? {
            store.publish(PLACEHOLDER_NAME, PLACEHOLDER_BYTES).await?;
            tracing::info!(path = %placeholder.display(), "wrote placeholder image");
        }

        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn placeholder_path(&self) -> PathBuf {
        self.dir.join(PLACEHOLDER_NAME)
    }

    /// Store `bytes` under their content name and return that name.
    pub async fn put(&self, bytes: &[u8]) -> CatalogResult<String> {
        if bytes.is_empty() {
            return Err(CatalogError::invalid("image must not be empty"));
        }

        let name = content_name(bytes);
        let path = self.dir.join(&name);

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(file = %name, "image already stored");
            return Ok(name);
        }

        if self.publish(&name, bytes).await? {
            tracing::info!(path = %path.display(), "saved image");
        } else {
            tracing::debug!(file = %name, "image stored concurrently by another writer");
        }

        Ok(name)
    }

    /// Validate `file_name` and return the path of an existing image.
    pub async fn resolve(&self, file_name: &str) -> CatalogResult<PathBuf> {
        let path = self.checked_path(file_name)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(CatalogError::not_found(format!("image {}", file_name))),
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                Err(CatalogError::not_found(format!("image {}", file_name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`resolve`](Self::resolve), but substitutes the placeholder for
    /// a missing file. Invalid names are still rejected.
    pub async fn resolve_or_placeholder(&self, file_name: &str) -> CatalogResult<PathBuf> {
        match self.resolve(file_name).await {
            Err(CatalogError::NotFound(_)) => {
                tracing::debug!(file = %file_name, "image not found, using placeholder");
                Ok(self.placeholder_path())
            }
            other => other,
        }
    }

    fn checked_path(&self, file_name: &str) -> CatalogResult<PathBuf> {
        if file_name.is_empty() {
            return Err(CatalogError::invalid("filename is required"));
        }
        if file_name.contains(['\\', '\0']) {
            return Err(CatalogError::invalid(format!(
                "invalid image path: {}",
                file_name.escape_default()
            )));
        }

        let mut components = Path::new(file_name).components();
        let plain = match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => part,
            _ => {
                return Err(CatalogError::invalid(format!(
                    "invalid image path: {}",
                    file_name
                )))
            }
        };

        // `components()` normalizes away trailing separators and `.`
        // segments; insist the name round-trips unchanged.
        if plain != std::ffi::OsStr::new(file_name) {
            return Err(CatalogError::invalid(format!(
                "invalid image path: {}",
                file_name
            )));
        }

        if !ACCEPTED_EXTENSIONS
            .iter()
            .any(|ext| file_name.ends_with(ext) && file_name.len() > ext.len())
        {
            return Err(CatalogError::invalid(format!(
                "image path does not end with .jpg or .jpeg: {}",
                file_name
            )));
        }

        Ok(self.dir.join(file_name))
    }

    /// Write `bytes` as `name` unless it already exists. Returns `false`
    /// when another writer got there first.
    async fn publish(&self, name: &str, bytes: &[u8]) -> CatalogResult<bool> {
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, bytes).await?;

        let linked = tokio::fs::hard_link(&tmp, self.dir.join(name)).await;
        let cleanup = tokio::fs::remove_file(&tmp).await;

        match linked {
            Ok(()) => {
                cleanup?;
                Ok(true)
            }
            Err(e) if e.kind() == IoErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    async fn open_store(tmp: &TempDir) -> ImageStore {
        ImageStore::open(tmp.path().join("images")).await.unwrap()
    }

    fn stored_files(store: &ImageStore) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_content_name_is_sha256_hex() {
        // SHA-256 of "abc"
        assert_eq!(
            content_name(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.jpg"
        );
        assert_eq!(content_name(b"abc").len(), 64 + 4);
    }

    #[tokio::test]
    async fn test_open_writes_placeholder() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let placeholder = std::fs::read(store.placeholder_path()).unwrap();
        assert_eq!(&placeholder[..2], &[0xFF, 0xD8]);
        assert_eq!(stored_files(&store), vec![PLACEHOLDER_NAME.to_string()]);
    }

    #[tokio::test]
    async fn test_open_keeps_existing_placeholder() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("images");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(PLACEHOLDER_NAME), b"custom").unwrap();

        let store = ImageStore::open(&dir).await.unwrap();
        assert_eq!(std::fs::read(store.placeholder_path()).unwrap(), b"custom");
    }

    #[tokio::test]
    async fn test_put_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let first = store.put(b"image bytes").await.unwrap();
        let second = store.put(b"image bytes").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(stored_files(&store).len(), 2); // image + placeholder
        assert_eq!(std::fs::read(store.dir().join(&first)).unwrap(), b"image bytes");
    }

    #[tokio::test]
    async fn test_put_never_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let name = content_name(b"original");
        std::fs::write(store.dir().join(&name), b"already here").unwrap();

        assert_eq!(store.put(b"original").await.unwrap(), name);
        assert_eq!(
            std::fs::read(store.dir().join(&name)).unwrap(),
            b"already here"
        );
    }

    #[tokio::test]
    async fn test_distinct_content_distinct_names() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let a = store.put(b"first image").await.unwrap();
        let b = store.put(b"second image").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_concurrent_puts_store_one_file() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.put(b"racing bytes").await.unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), content_name(b"racing bytes"));
        }

        // No temp files left behind.
        assert_eq!(stored_files(&store).len(), 2);
    }

    #[tokio::test]
    async fn test_put_empty_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        assert_eq!(store.put(b"").await.unwrap_err().kind(), ErrorKind::Invalid);
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        for bad in [
            "../../etc/passwd",
            "x/../../secret.jpg",
            "../default.jpg",
            "/etc/passwd.jpg",
            "sub/dir.jpg",
            "./default.jpg",
            "default.jpg/",
            "..\\secret.jpg",
            "..",
            "",
        ] {
            let err = store.resolve(bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Invalid, "expected Invalid for {:?}", bad);
        }
    }

    #[tokio::test]
    async fn test_resolve_rejects_other_extensions() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        for bad in ["notes.txt", "image.png", ".jpg", "photo.JPG"] {
            let err = store.resolve(bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Invalid, "expected Invalid for {:?}", bad);
        }
    }

    #[tokio::test]
    async fn test_resolve_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let err = store.resolve("unknown.jpg").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let fallback = store.resolve_or_placeholder("unknown.jpg").await.unwrap();
        assert_eq!(fallback, store.placeholder_path());

        let err = store
            .resolve_or_placeholder("../../etc/passwd")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[tokio::test]
    async fn test_resolve_existing_inside_dir() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let name = store.put(b"jpeg-ish").await.unwrap();
        let path = store.resolve(&name).await.unwrap();
        assert!(path.starts_with(store.dir()));
        assert!(store.resolve("default.jpg").await.is_ok());
    }
}
