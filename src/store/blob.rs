// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Opaque keyed record storage.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::StoreError;

/// Whole-record read/write by key. Records are always rewritten in full.
pub trait BlobStore {
    /// `Ok(None)` when nothing was ever written under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StoreError>;
}

/// Keys double as file stems, so they are restricted to a portable character set.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey {
            key: key.to_owned(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Temp file plus atomic rename, no fsync.
    #[default]
    BestEffort,

    /// Also syncs the file and, on unix, its directory.
    Durable,
}

/// One `<key>.json` file per record under `root`.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
    durability: WriteDurability,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StoreError> {
        let path = self.record_path(key)?;
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        write_atomic(&self.root, &path, contents.as_bytes(), self.durability)
    }
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic(
    dir: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StoreError::Io { path, source }
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = dir.join(format!(".convo-folders.tmp.{file_name}.{nanos}"));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(io_err(&tmp_path))?;
    file.write_all(contents).map_err(io_err(&tmp_path))?;
    if durability == WriteDurability::Durable {
        file.sync_all().map_err(io_err(&tmp_path))?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let handle = fs::File::open(dir).map_err(io_err(dir))?;
            handle.sync_all().map_err(io_err(dir))?;
        }
    }

    Ok(())
}

/// Process-local records, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    records: BTreeMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, key: &str, contents: impl Into<String>) -> Self {
        self.records.insert(key.to_owned(), contents.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.records.get(key).cloned())
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.records.insert(key.to_owned(), contents.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use rstest::rstest;

    use super::{validate_key, BlobStore, FileBlobStore, MemoryBlobStore, WriteDurability};
    use crate::error::StoreError;

    static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

    struct TempDir {
        path: std::path::PathBuf,
    }

    impl TempDir {
        fn new(prefix: &str) -> Self {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos();
            let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
            let mut path = env::temp_dir();
            path.push(format!(
                "convo-folders-{prefix}-{}-{nanos}-{counter}",
                std::process::id()
            ));
            Self { path }
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    #[rstest]
    #[case("folderData", true)]
    #[case("folderData.backup", true)]
    #[case("", false)]
    #[case(".hidden", false)]
    #[case("../escape", false)]
    #[case("a/b", false)]
    fn key_validation(#[case] key: &str, #[case] ok: bool) {
        assert_eq!(validate_key(key).is_ok(), ok);
    }

    #[rstest]
    #[case(WriteDurability::BestEffort)]
    #[case(WriteDurability::Durable)]
    fn file_store_round_trips_and_overwrites(#[case] durability: WriteDurability) {
        let tmp = TempDir::new("blob");
        let mut store = FileBlobStore::new(&tmp.path).with_durability(durability);

        assert_eq!(store.read("folderData").expect("read"), None);
        store.write("folderData", "{\"a\":1}").expect("write");
        store.write("folderData", "{\"a\":2}").expect("overwrite");
        assert_eq!(
            store.read("folderData").expect("read").as_deref(),
            Some("{\"a\":2}")
        );

        let leftovers = std::fs::read_dir(&tmp.path)
            .expect("dir")
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".convo-folders.tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn file_store_rejects_bad_keys() {
        let tmp = TempDir::new("blob-key");
        let mut store = FileBlobStore::new(&tmp.path);
        let err = store.write("../x", "{}").expect_err("bad key");
        assert!(matches!(err, StoreError::InvalidKey { .. }));
    }

    #[test]
    fn memory_store_keeps_records() {
        let mut store = MemoryBlobStore::new().with_record("seed", "1");
        store.write("folderData", "2").expect("write");
        assert_eq!(store.get("seed"), Some("1"));
        assert_eq!(store.read("folderData").expect("read").as_deref(), Some("2"));
    }
}
