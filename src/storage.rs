//! On-disk layout for derivatives.
//!
//! ```text
//! {root}/
//! ├── .htaccess                 # access guard, written once if absent
//! ├── original/{identity}.webp  # full-resolution conversion
//! ├── large/{identity}.webp     # width-bounded display version
//! └── thumb/{identity}.webp     # center-cropped square
//! ```
//!
//! Paths are derived only from the identity, the kind and the target format.
//! The three directories are shared by every request; requests never collide
//! because each writes under its own identity.

use crate::identity::Identity;
use crate::imaging::TargetFormat;
use serde::Serialize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Name of the access-control file placed at the storage root.
pub const ACCESS_GUARD_FILENAME: &str = ".htaccess";

const ACCESS_GUARD: &str = r#"# Written by image-ingest. Uploaded files must never run as code.
<FilesMatch "\.(php|phtml|phar|pl|py|cgi|sh)$">
    Require all denied
</FilesMatch>

<FilesMatch "\.(jpg|jpeg|png|webp)$">
    Require all granted
</FilesMatch>

Options -Indexes -ExecCGI
RemoveHandler .php .phtml .phar .pl .py .cgi
"#;

/// The three derivatives written for every accepted upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivativeKind {
    Original,
    Large,
    Thumb,
}

impl DerivativeKind {
    pub const ALL: [DerivativeKind; 3] = [
        DerivativeKind::Original,
        DerivativeKind::Large,
        DerivativeKind::Thumb,
    ];

    /// Directory name under the storage root.
    pub fn dir_name(self) -> &'static str {
        match self {
            DerivativeKind::Original => "original",
            DerivativeKind::Large => "large",
            DerivativeKind::Thumb => "thumb",
        }
    }
}

impl fmt::Display for DerivativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Maps identities to derivative paths under one storage root.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
    format: TargetFormat,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>, format: TargetFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, kind: DerivativeKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// `{root}/{kind}/{identity}.{ext}`
    pub fn path(&self, kind: DerivativeKind, identity: &Identity) -> PathBuf {
        self.dir(kind)
            .join(format!("{}.{}", identity.stem(), self.format.extension()))
    }

    /// Root-relative path with forward slashes, for building public URLs.
    pub fn relative_path(&self, kind: DerivativeKind, identity: &Identity) -> String {
        format!(
            "{}/{}.{}",
            kind.dir_name(),
            identity.stem(),
            self.format.extension()
        )
    }

    /// Create the three derivative directories (and the root). Idempotent.
    pub fn ensure_directories(&self) -> io::Result<()> {
        for kind in DerivativeKind::ALL {
            fs::create_dir_all(self.dir(kind))?;
        }
        Ok(())
    }

    /// Write the access guard at the root unless one already exists.
    ///
    /// Returns `Ok(true)` when this call created the file.
    pub fn ensure_access_guard(&self) -> io::Result<bool> {
        let path = self.root.join(ACCESS_GUARD_FILENAME);
        match write_new(&path, ACCESS_GUARD.as_bytes()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Scratch file used by [`StorageLayout::check_writable`].
const WRITE_CHECK_FILENAME: &str = ".image-ingest-check";

impl StorageLayout {
    /// Create the directories and confirm the root accepts new files.
    ///
    /// A scratch file left behind by an interrupted earlier check is removed
    /// first.
    pub fn check_writable(&self) -> io::Result<()> {
        self.ensure_directories()?;
        let scratch = self.root.join(WRITE_CHECK_FILENAME);
        match fs::remove_file(&scratch) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        write_new(&scratch, b"")?;
        fs::remove_file(scratch)
    }
}

/// Write `data` to a file that must not exist yet.
///
/// Derivatives are created exactly once; an existing file at the target path
/// is an error, never an overwrite.
pub fn write_new(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layout(tmp: &TempDir) -> StorageLayout {
        StorageLayout::new(tmp.path().join("uploads"), TargetFormat::WebP)
    }

    #[test]
    fn path_is_kind_dir_plus_identity_and_ext() {
        let layout = StorageLayout::new("/srv/uploads", TargetFormat::WebP);
        let id = Identity::generate();
        assert_eq!(
            layout.path(DerivativeKind::Thumb, &id),
            PathBuf::from(format!("/srv/uploads/thumb/{id}.webp"))
        );
        assert_eq!(
            layout.relative_path(DerivativeKind::Large, &id),
            format!("large/{id}.webp")
        );
    }

    #[test]
    fn kinds_map_to_distinct_paths() {
        let layout = StorageLayout::new("/srv/uploads", TargetFormat::WebP);
        let id = Identity::generate();
        let paths: std::collections::HashSet<_> = DerivativeKind::ALL
            .iter()
            .map(|k| layout.path(*k, &id))
            .collect();
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn ensure_directories_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp);
        layout.ensure_directories().unwrap();
        layout.ensure_directories().unwrap();
        for kind in DerivativeKind::ALL {
            assert!(layout.dir(kind).is_dir());
        }
    }

    #[test]
    fn ensure_directories_fails_when_root_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("uploads");
        fs::write(&root, "not a directory").unwrap();
        let layout = StorageLayout::new(root, TargetFormat::WebP);
        assert!(layout.ensure_directories().is_err());
    }

    #[test]
    fn access_guard_written_once() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp);
        layout.ensure_directories().unwrap();

        assert!(layout.ensure_access_guard().unwrap());
        let guard = layout.root().join(ACCESS_GUARD_FILENAME);
        let content = fs::read_to_string(&guard).unwrap();
        assert!(content.contains("Options -Indexes"));
        assert!(content.contains("Require all denied"));

        fs::write(&guard, "# customised by the operator\n").unwrap();
        assert!(!layout.ensure_access_guard().unwrap());
        assert_eq!(
            fs::read_to_string(&guard).unwrap(),
            "# customised by the operator\n"
        );
    }

    #[test]
    fn check_writable_cleans_up_after_itself() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp);
        layout.check_writable().unwrap();
        assert!(!layout.root().join(WRITE_CHECK_FILENAME).exists());
        assert!(layout.dir(DerivativeKind::Thumb).is_dir());
    }

    #[test]
    fn check_writable_survives_stale_scratch_file() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp);
        layout.ensure_directories().unwrap();
        fs::write(layout.root().join(WRITE_CHECK_FILENAME), "left over").unwrap();

        layout.check_writable().unwrap();
        assert!(!layout.root().join(WRITE_CHECK_FILENAME).exists());
    }

    #[test]
    fn write_new_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.webp");
        write_new(&path, b"first").unwrap();
        let err = write_new(&path, b"second").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&path).unwrap(), b"first");
    }
}
