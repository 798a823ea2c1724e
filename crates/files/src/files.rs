//! Storage directory service implementation
//!
//! This module provides the core implementation of Depot's storage through the
//! [`FilesService`] type: ingestion, catalog listing, deletion and retrieval against one flat
//! storage directory.
//!
//! # Naming
//!
//! Stored names are `<stamp>-<original name>`. Stamps are drawn from a [`StampGenerator`]
//! seeded at construction with the newest stamp already present in the directory, so names keep
//! increasing across restarts even if the clock has moved backwards. Prefixes later than the
//! current clock are not stamps this service could have issued and do not seed it. New entries
//! are created with exclusive-create semantics; if a name is nevertheless taken (another process
//! writing to the same directory) a fresh stamp is drawn.
//!
//! Ingestion streams: [`FilesService::create`] hands out a [`PendingFile`] that is written chunk
//! by chunk, so an upload is never held in memory as a whole.
//!
//! # Concurrency
//!
//! The service holds no locks. Concurrent ingestions never share a name. A deletion racing a
//! retrieval of the same entry can cut the retrieval short with an I/O error; this is accepted.
//!
//! # Implementation Notes
//!
//! - Every listing is a full directory scan with one stat per entry
//! - The catalog is returned in directory enumeration order, which is neither sorted nor stable
//! - Catalog ids are positions within one listing and carry no meaning across listings

use crate::constants::{FALLBACK_CONTENT_TYPE, MAX_NAME_ATTEMPTS};
use crate::{FilesError, FilesResult};
use chrono::{DateTime, Utc};
use depot_stamp::{Stamp, StampGenerator};
use depot_types::{OriginalName, StoredName, NAME_SEPARATOR};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// One entry of a catalog listing.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StoredFile {
    /// 1-based position within this listing; recomputed on every listing
    pub id: usize,

    /// On-disk filename and identity key
    pub stored_name: StoredName,

    /// Filename recovered from the stored name
    pub original_name: String,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Creation time reported by the filesystem (modification time where unsupported)
    pub created_at: DateTime<Utc>,
}

/// Descriptor returned by a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedFile {
    pub stored_name: StoredName,
    pub original_name: OriginalName,
    pub size_bytes: u64,
    pub stamp: Stamp,
}

/// An opened stored file, ready to be streamed back to a caller.
#[derive(Debug)]
pub struct StoredBlob {
    /// Open read handle positioned at the start of the file
    pub file: fs::File,

    /// Size of the file in bytes when it was opened
    pub size_bytes: u64,

    /// Content type inferred from the stored name's extension
    pub content_type: String,
}

/// Service for managing the storage directory
///
/// The service is cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct FilesService {
    /// Canonicalised storage directory
    root_directory: PathBuf,

    /// Source of stored-name prefixes
    stamps: StampGenerator,
}

impl FilesService {
    /// Opens an existing storage directory
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidStorageDirectory`] if:
    /// - the directory does not exist or is not a directory
    /// - path canonicalisation fails
    /// - the directory cannot be scanned for existing stamps
    pub fn new(root_directory: &Path) -> FilesResult<Self> {
        if !root_directory.exists() {
            return Err(FilesError::InvalidStorageDirectory(format!(
                "Directory does not exist: {}",
                root_directory.display()
            )));
        }

        if !root_directory.is_dir() {
            return Err(FilesError::InvalidStorageDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FilesError::InvalidStorageDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        let stamps = match latest_stamp(&root_directory, Stamp::now())? {
            Some(last) => StampGenerator::resume_after(last),
            None => StampGenerator::new(),
        };

        Ok(Self::with_stamps(root_directory, stamps))
    }

    fn with_stamps(root_directory: PathBuf, stamps: StampGenerator) -> Self {
        Self {
            root_directory,
            stamps,
        }
    }

    /// Opens the storage directory, creating it (and any parents) first if it is missing
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidStorageDirectory`] if the directory cannot be created or
    /// the path exists but is not a directory.
    pub fn open_or_create(root_directory: &Path) -> FilesResult<Self> {
        if !root_directory.exists() {
            fs::create_dir_all(root_directory).map_err(|e| {
                FilesError::InvalidStorageDirectory(format!(
                    "Cannot create {}: {}",
                    root_directory.display(),
                    e
                ))
            })?;
            tracing::info!("Created storage directory {}", root_directory.display());
        }
        Self::new(root_directory)
    }

    /// Creates a new, empty entry under a freshly generated stored name
    ///
    /// The returned [`PendingFile`] is written to incrementally and must be
    /// [finished](PendingFile::finish); dropping it unfinished removes the entry again.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::StorageWrite`] if the entry cannot be created, if no free name was
    /// found after a bounded number of fresh stamps, or if the stamp generator is exhausted.
    pub fn create(&self, original_name: &OriginalName) -> FilesResult<PendingFile> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let stamp = self.stamps.next().ok_or_else(|| {
                FilesError::StorageWrite(io::Error::new(
                    ErrorKind::Other,
                    format!("No stamps left for {}", original_name),
                ))
            })?;
            let stored_name = StoredName::compose(stamp.as_millis(), original_name);
            let path = self.entry_path(&stored_name);

            let file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(
                        "Stored name {} already taken, drawing a new stamp",
                        stored_name
                    );
                    continue;
                }
                Err(e) => {
                    return Err(FilesError::StorageWrite(with_context(
                        e,
                        format!("Failed to create {}", path.display()),
                    )))
                }
            };

            return Ok(PendingFile {
                file,
                path,
                stored_name,
                original_name: original_name.clone(),
                stamp,
                size_bytes: 0,
                finished: false,
            });
        }

        Err(FilesError::StorageWrite(io::Error::new(
            ErrorKind::AlreadyExists,
            format!(
                "No free name for {} after {} attempts",
                original_name, MAX_NAME_ATTEMPTS
            ),
        )))
    }

    /// Writes `bytes` verbatim under a freshly generated stored name
    ///
    /// Exactly one new entry appears on success. If the write fails part-way the partial entry
    /// is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::create`], or [`FilesError::StorageWrite`] if the write fails.
    pub fn add(&self, original_name: &OriginalName, bytes: &[u8]) -> FilesResult<IngestedFile> {
        let mut pending = self.create(original_name)?;
        pending.write_chunk(bytes)?;
        pending.finish()
    }

    /// Ingests a local file under its own filename
    ///
    /// The source is copied into storage without being read into memory first.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidName`] if the source has no usable filename,
    /// [`FilesError::StorageRead`] if it cannot be opened, [`FilesError::StorageWrite`] if the
    /// copy fails, or any error from [`Self::create`].
    pub fn add_from_path(&self, source_path: &Path) -> FilesResult<IngestedFile> {
        let file_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let original_name = OriginalName::new(file_name)?;

        let mut source = fs::File::open(source_path).map_err(|e| {
            FilesError::StorageRead(with_context(
                e,
                format!("Failed to open source file {}", source_path.display()),
            ))
        })?;

        let mut pending = self.create(&original_name)?;
        io::copy(&mut source, &mut pending).map_err(|e| {
            FilesError::StorageWrite(with_context(
                e,
                format!("Failed to copy {} into storage", source_path.display()),
            ))
        })?;
        pending.finish()
    }

    /// Lists every entry in the storage directory
    ///
    /// Entries removed between enumeration and stat are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::StorageRead`] if the directory cannot be enumerated or an entry
    /// cannot be stat'ed.
    pub fn list(&self) -> FilesResult<Vec<StoredFile>> {
        let entries = fs::read_dir(&self.root_directory).map_err(|e| {
            FilesError::StorageRead(with_context(
                e,
                format!("Failed to list {}", self.root_directory.display()),
            ))
        })?;

        let mut catalog = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                FilesError::StorageRead(with_context(
                    e,
                    format!("Failed to list {}", self.root_directory.display()),
                ))
            })?;

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("{:?} vanished during listing", entry.file_name());
                    continue;
                }
                Err(e) => {
                    return Err(FilesError::StorageRead(with_context(
                        e,
                        format!("Failed to stat {}", entry.path().display()),
                    )))
                }
            };

            let stored_name = match StoredName::parse(entry.file_name().to_string_lossy()) {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!("Skipping unusable entry {:?}: {}", entry.file_name(), e);
                    continue;
                }
            };

            let created_at = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map(DateTime::<Utc>::from)
                .map_err(|e| {
                    FilesError::StorageRead(with_context(
                        e,
                        format!("No timestamps for {}", entry.path().display()),
                    ))
                })?;

            catalog.push(StoredFile {
                id: catalog.len() + 1,
                original_name: stored_name.original_name().to_owned(),
                stored_name,
                size_bytes: metadata.len(),
                created_at,
            });
        }

        Ok(catalog)
    }

    /// Permanently removes an entry
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::FileNotFound`] if no entry has this name, or
    /// [`FilesError::StorageWrite`] if removal fails for any other reason.
    pub fn remove(&self, stored_name: &StoredName) -> FilesResult<()> {
        let path = self.entry_path(stored_name);
        fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FilesError::FileNotFound(stored_name.to_string()),
            _ => FilesError::StorageWrite(with_context(
                e,
                format!("Failed to remove {}", path.display()),
            )),
        })
    }

    /// Opens an entry for streaming
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::FileNotFound`] if no regular file has this name, or
    /// [`FilesError::StorageRead`] if it exists but cannot be opened.
    pub fn open(&self, stored_name: &StoredName) -> FilesResult<StoredBlob> {
        let path = self.entry_path(stored_name);
        let file = fs::File::open(&path).map_err(|e| read_error(stored_name, &path, e))?;
        let metadata = file
            .metadata()
            .map_err(|e| read_error(stored_name, &path, e))?;

        if !metadata.is_file() {
            return Err(FilesError::FileNotFound(stored_name.to_string()));
        }

        Ok(StoredBlob {
            file,
            size_bytes: metadata.len(),
            content_type: content_type_for(stored_name),
        })
    }

    #[cfg(test)]
    fn read(&self, stored_name: &StoredName) -> FilesResult<Vec<u8>> {
        let path = self.entry_path(stored_name);
        if path.is_dir() {
            return Err(FilesError::FileNotFound(stored_name.to_string()));
        }
        fs::read(&path).map_err(|e| read_error(stored_name, &path, e))
    }

    /// Returns the canonicalised storage directory
    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    fn entry_path(&self, stored_name: &StoredName) -> PathBuf {
        self.root_directory.join(stored_name.as_str())
    }
}

/// A newly created entry that is still being written
///
/// Bytes go straight to disk as they arrive. The entry only counts as ingested once
/// [`finish`](Self::finish) succeeds; dropping it before that removes the partial file.
#[derive(Debug)]
pub struct PendingFile {
    file: fs::File,
    path: PathBuf,
    stored_name: StoredName,
    original_name: OriginalName,
    stamp: Stamp,
    size_bytes: u64,
    finished: bool,
}

impl PendingFile {
    pub fn stored_name(&self) -> &StoredName {
        &self.stored_name
    }

    /// Appends `chunk` to the entry
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::StorageWrite`] if the write fails.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> FilesResult<()> {
        self.write_all(chunk).map_err(|e| {
            FilesError::StorageWrite(with_context(
                e,
                format!("Failed to write {}", self.path.display()),
            ))
        })
    }

    /// Completes the entry and returns its descriptor
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::StorageWrite`] if buffered bytes cannot be flushed.
    pub fn finish(mut self) -> FilesResult<IngestedFile> {
        self.file.flush().map_err(|e| {
            FilesError::StorageWrite(with_context(
                e,
                format!("Failed to write {}", self.path.display()),
            ))
        })?;
        self.finished = true;

        Ok(IngestedFile {
            stored_name: self.stored_name.clone(),
            original_name: self.original_name.clone(),
            size_bytes: self.size_bytes,
            stamp: self.stamp,
        })
    }
}

impl Write for PendingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.file.write(buf)?;
        self.size_bytes += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to remove partial file {}: {}", self.path.display(), e);
        } else {
            tracing::debug!("Removed unfinished entry {}", self.stored_name);
        }
    }
}

fn read_error(stored_name: &StoredName, path: &Path, e: io::Error) -> FilesError {
    match e.kind() {
        ErrorKind::NotFound => FilesError::FileNotFound(stored_name.to_string()),
        _ => FilesError::StorageRead(with_context(
            e,
            format!("Failed to read {}", path.display()),
        )),
    }
}

/// Infers a content type from the stored name's extension.
fn content_type_for(stored_name: &StoredName) -> String {
    mime_guess::from_path(stored_name.as_str())
        .first()
        .map(|mime| mime.essence_str().to_owned())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned())
}

/// Finds the newest stamp prefix among existing entries, ignoring prefixes later than `now`.
///
/// Out-of-band names can carry any numeric prefix; only ones that could have been issued by a
/// clock are taken as evidence of earlier stamps.
fn latest_stamp(root_directory: &Path, now: Stamp) -> FilesResult<Option<Stamp>> {
    let entries = fs::read_dir(root_directory).map_err(|e| {
        FilesError::InvalidStorageDirectory(format!(
            "Cannot read {}: {}",
            root_directory.display(),
            e
        ))
    })?;

    Ok(entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let (prefix, _) = name.to_str()?.split_once(NAME_SEPARATOR)?;
            prefix.parse::<Stamp>().ok()
        })
        .filter(|stamp| *stamp <= now)
        .max())
}

fn with_context(e: io::Error, context: String) -> io::Error {
    io::Error::new(e.kind(), format!("{}: {}", context, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;
    use tempfile::TempDir;

    /// Helper to create a service over a fresh storage directory
    fn create_service(temp: &TempDir) -> FilesService {
        let root = temp.path().join("uploads");
        FilesService::open_or_create(&root).expect("Failed to create storage directory")
    }

    fn original(name: &str) -> OriginalName {
        OriginalName::new(name).unwrap()
    }

    fn entry_count(service: &FilesService) -> usize {
        fs::read_dir(service.root_directory()).unwrap().count()
    }

    #[test]
    fn test_new_root_not_exists() {
        let temp = TempDir::new().unwrap();
        let service = FilesService::new(&temp.path().join("non-existent"));

        assert!(matches!(
            service,
            Err(FilesError::InvalidStorageDirectory(_))
        ));
    }

    #[test]
    fn test_new_root_not_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("file.txt");
        fs::write(&root, "not a directory").unwrap();

        assert!(matches!(
            FilesService::new(&root),
            Err(FilesError::InvalidStorageDirectory(_))
        ));
        assert!(matches!(
            FilesService::open_or_create(&root),
            Err(FilesError::InvalidStorageDirectory(_))
        ));
    }

    #[test]
    fn test_open_or_create_creates_nested_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("a").join("b").join("uploads");

        let service = FilesService::open_or_create(&root).unwrap();

        assert!(root.is_dir());
        assert!(service.root_directory().ends_with("uploads"));
        assert!(service.list().unwrap().is_empty());
    }

    #[test]
    fn test_add_file_success() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let ingested = service.add(&original("hello.txt"), b"Hello, World!").unwrap();

        assert_eq!(ingested.size_bytes, 13);
        assert_eq!(ingested.original_name.as_str(), "hello.txt");
        assert_eq!(
            ingested.stored_name.as_str(),
            format!("{}-hello.txt", ingested.stamp)
        );

        let stored_path = service.root_directory().join(ingested.stored_name.as_str());
        let stored = fs::read(stored_path).unwrap();
        assert_eq!(stored, b"Hello, World!");
        assert_eq!(entry_count(&service), 1);
    }

    #[test]
    fn test_add_empty_file() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let ingested = service.add(&original("empty.dat"), &[]).unwrap();
        assert_eq!(ingested.size_bytes, 0);
        assert_eq!(service.read(&ingested.stored_name).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_add_same_name_twice_keeps_both() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let first = service.add(&original("cat.png"), b"one").unwrap();
        let second = service.add(&original("cat.png"), b"two").unwrap();

        assert_ne!(first.stored_name, second.stored_name);
        assert_eq!(service.read(&first.stored_name).unwrap(), b"one");
        assert_eq!(service.read(&second.stored_name).unwrap(), b"two");
    }

    #[test]
    fn test_latest_stamp_ignores_prefixes_from_the_future() {
        let temp = TempDir::new().unwrap();
        for name in [
            "1000-a.txt",
            "1500-b.txt",
            "plain.txt",
            "9781234567890-book.pdf",
            "18446744073709551615-x.txt",
        ] {
            fs::write(temp.path().join(name), b"x").unwrap();
        }

        let latest = latest_stamp(temp.path(), Stamp::from_millis(2_000)).unwrap();
        assert_eq!(latest, Some(Stamp::from_millis(1_500)));

        let latest = latest_stamp(temp.path(), Stamp::from_millis(1_200)).unwrap();
        assert_eq!(latest, Some(Stamp::from_millis(1_000)));
    }

    #[test]
    fn test_add_uses_wall_clock_despite_large_numeric_prefixes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("uploads");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("9781234567890-book.pdf"), b"isbn").unwrap();
        fs::write(root.join("18446744073709551615-x.txt"), b"max").unwrap();

        let service = FilesService::new(&root).unwrap();
        let before = Stamp::now();
        let ingested = service.add(&original("cat.png"), b"meow").unwrap();
        let after = Stamp::now();

        assert!(ingested.stamp >= before);
        assert!(ingested.stamp <= after);
        assert_eq!(
            ingested.stored_name.as_str(),
            format!("{}-cat.png", ingested.stamp)
        );
        assert_eq!(entry_count(&service), 3);
    }

    #[test]
    fn test_add_fails_when_stamps_are_exhausted() {
        let temp = TempDir::new().unwrap();
        let root = create_service(&temp).root_directory().to_path_buf();
        let exhausted = StampGenerator::resume_after(Stamp::from_millis(u64::MAX));
        let service = FilesService::with_stamps(root, exhausted);

        let result = service.add(&original("cat.png"), b"meow");

        assert!(matches!(result, Err(FilesError::StorageWrite(_))));
        assert_eq!(entry_count(&service), 0);
    }

    #[test]
    fn test_add_skips_names_taken_out_of_band() {
        let temp = TempDir::new().unwrap();
        let root = create_service(&temp).root_directory().to_path_buf();
        let service = FilesService::with_stamps(
            root.clone(),
            StampGenerator::resume_after(Stamp::from_millis(99_999_999_999_990)),
        );
        fs::write(root.join("99999999999991-x.txt"), b"taken").unwrap();
        fs::write(root.join("99999999999992-x.txt"), b"taken").unwrap();

        let ingested = service.add(&original("x.txt"), b"mine").unwrap();

        assert_eq!(ingested.stored_name.as_str(), "99999999999993-x.txt");
        assert_eq!(
            fs::read(root.join("99999999999991-x.txt")).unwrap(),
            b"taken"
        );
    }

    #[test]
    fn test_create_writes_chunks_as_they_arrive() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let mut pending = service.create(&original("big.bin")).unwrap();
        let path = service.root_directory().join(pending.stored_name().as_str());
        let mut expected = Vec::new();
        for i in 0..8u8 {
            let chunk = vec![i; 4096];
            pending.write_chunk(&chunk).unwrap();
            expected.extend_from_slice(&chunk);
            assert_eq!(fs::metadata(&path).unwrap().len(), expected.len() as u64);
        }

        let ingested = pending.finish().unwrap();
        assert_eq!(ingested.size_bytes, 8 * 4096);
        assert_eq!(service.read(&ingested.stored_name).unwrap(), expected);
    }

    #[test]
    fn test_unfinished_entry_is_removed_on_drop() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let mut pending = service.create(&original("partial.bin")).unwrap();
        pending.write_chunk(b"half of it").unwrap();
        assert_eq!(entry_count(&service), 1);

        drop(pending);
        assert_eq!(entry_count(&service), 0);
    }

    #[test]
    fn test_add_fails_when_directory_removed() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);
        fs::remove_dir_all(service.root_directory()).unwrap();

        let result = service.add(&original("a.txt"), b"data");
        assert!(matches!(result, Err(FilesError::StorageWrite(_))));
    }

    #[test]
    fn test_add_from_path() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let source = temp.path().join("report.pdf");
        fs::write(&source, b"%PDF-1.4").unwrap();

        let ingested = service.add_from_path(&source).unwrap();
        assert_eq!(ingested.original_name.as_str(), "report.pdf");
        assert_eq!(service.read(&ingested.stored_name).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_add_from_path_nonexistent() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let result = service.add_from_path(Path::new("/non-existent/file.txt"));
        assert!(matches!(result, Err(FilesError::StorageRead(_))));
        assert_eq!(entry_count(&service), 0);
    }

    #[test]
    fn test_list_matches_uploads() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let payloads: Vec<(String, Vec<u8>)> = (0..5)
            .map(|i| (format!("file{}.bin", i), vec![i as u8; i * 100 + 1]))
            .collect();
        for (name, bytes) in &payloads {
            service.add(&original(name), bytes).unwrap();
        }

        let catalog = service.list().unwrap();
        assert_eq!(catalog.len(), payloads.len());

        for (name, bytes) in &payloads {
            let entry = catalog
                .iter()
                .find(|f| &f.original_name == name)
                .expect("uploaded file is listed");
            assert_eq!(entry.size_bytes, bytes.len() as u64);
            assert_eq!(entry.stored_name.original_name(), name);
        }

        let ids: Vec<usize> = catalog.iter().map(|f| f.id).collect();
        assert_eq!(ids, (1..=payloads.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_list_includes_out_of_band_names() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);
        fs::write(service.root_directory().join("plain.txt"), b"abc").unwrap();

        let catalog = service.list().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].stored_name.as_str(), "plain.txt");
        assert_eq!(catalog[0].original_name, "plain.txt");
        assert_eq!(catalog[0].size_bytes, 3);
    }

    #[test]
    fn test_list_fails_when_directory_removed() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);
        fs::remove_dir_all(service.root_directory()).unwrap();

        assert!(matches!(service.list(), Err(FilesError::StorageRead(_))));
    }

    #[test]
    fn test_remove_file() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let ingested = service.add(&original("gone.txt"), b"bye").unwrap();
        service.remove(&ingested.stored_name).unwrap();

        assert!(service.list().unwrap().is_empty());
        assert!(matches!(
            service.read(&ingested.stored_name),
            Err(FilesError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_remove_missing_leaves_directory_unchanged() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);
        service.add(&original("keep.txt"), b"keep").unwrap();

        let missing = StoredName::parse("1-missing.txt").unwrap();
        let result = service.remove(&missing);

        assert!(matches!(result, Err(FilesError::FileNotFound(_))));
        assert_eq!(entry_count(&service), 1);
    }

    #[test]
    fn test_open_streams_and_infers_content_type() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let ingested = service.add(&original("cat.png"), &[0x89, 0x50, 0x4E, 0x47]).unwrap();
        let blob = service.open(&ingested.stored_name).unwrap();

        assert_eq!(blob.size_bytes, 4);
        assert_eq!(blob.content_type, "image/png");
    }

    #[test]
    fn test_open_unknown_extension_is_octet_stream() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let ingested = service.add(&original("blob"), b"?").unwrap();
        let blob = service.open(&ingested.stored_name).unwrap();

        assert_eq!(blob.content_type, FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn test_open_missing_and_directories_are_not_found() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);
        fs::create_dir(service.root_directory().join("subdir")).unwrap();

        let missing = StoredName::parse("1-missing.txt").unwrap();
        assert!(matches!(
            service.open(&missing),
            Err(FilesError::FileNotFound(_))
        ));

        let subdir = StoredName::parse("subdir").unwrap();
        assert!(matches!(
            service.open(&subdir),
            Err(FilesError::FileNotFound(_))
        ));
        assert!(matches!(
            service.read(&subdir),
            Err(FilesError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_uploads_get_distinct_names() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let names: Vec<StoredName> = thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let service = &service;
                    scope.spawn(move || {
                        let name = if i % 2 == 0 { "same.txt" } else { "other.txt" };
                        service
                            .add(&original(name), format!("payload {}", i).as_bytes())
                            .unwrap()
                            .stored_name
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), 16);
        assert_eq!(service.list().unwrap().len(), 16);
    }

    #[test]
    fn test_stored_file_serialization() {
        let file = StoredFile {
            id: 1,
            stored_name: StoredName::parse("1743033045755-cat.png").unwrap(),
            original_name: "cat.png".into(),
            size_bytes: 500,
            created_at: "2025-03-27T00:00:00Z".parse::<DateTime<Utc>>().unwrap(),
        };

        let json = serde_json::to_string(&file).unwrap();
        assert!(json.contains("\"stored_name\":\"1743033045755-cat.png\""));
        assert!(json.contains("\"size_bytes\":500"));
    }
}
