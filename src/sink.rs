//! Output capability for fixture provisioning.
//!
//! Generators only ever see a `Write`; everything that touches the directory
//! tree (creating files, copying sample logs, hard links, symlinks) goes
//! through a [`FixtureSink`] rooted at the data directory.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Errors that can occur during sink operations.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// A filesystem call failed
    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file to copy or link from does not exist
    #[error("source does not exist: {0}")]
    MissingSource(PathBuf),

    /// A directory the operation needs does not exist
    #[error("directory does not exist: {0}")]
    MissingDirectory(PathBuf),
}

/// Destination for fixture files. Paths are relative to the sink's root.
pub trait FixtureSink {
    /// Writer returned by [`FixtureSink::create`].
    type Writer: Write;

    /// Whether `path` exists (symlinks are not followed).
    fn exists(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents.
    fn create_dir_all(&mut self, path: &Path) -> Result<(), SinkError>;

    /// Open `path` for writing, truncating it and creating parent directories.
    fn create(&mut self, path: &Path) -> Result<Self::Writer, SinkError>;

    /// Write `bytes` to `path` only if it does not exist yet.
    ///
    /// Returns whether the file was written.
    fn write_new(&mut self, path: &Path, bytes: &[u8]) -> Result<bool, SinkError>;

    /// Copy `source` over `dest`, returning the number of bytes copied.
    fn copy(&mut self, source: &Path, dest: &Path) -> Result<u64, SinkError>;

    /// Hard-link `dest` to `source`, replacing any existing `dest`.
    fn link(&mut self, source: &Path, dest: &Path) -> Result<(), SinkError>;

    /// Create a symlink at `link_path` pointing to `target`, replacing any
    /// existing entry. `target` is stored as given.
    fn symlink(&mut self, target: &Path, link_path: &Path) -> Result<(), SinkError>;

    /// Replace the contents of `path` with `bytes`.
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), SinkError> {
        let mut writer = self.create(path)?;
        writer
            .write_all(bytes)
            .and_then(|()| writer.flush())
            .map_err(io_error("write", path))
    }
}

fn io_error(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> SinkError {
    let path = path.to_path_buf();
    move |source| SinkError::Io { op, path, source }
}

/// A [`FixtureSink`] on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    /// Create a sink rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory every path is resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn ensure_parent(&self, full: &Path) -> Result<(), SinkError> {
        match full.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(io_error("create directory", parent))
            }
            _ => Ok(()),
        }
    }

    fn remove_existing(&self, full: &Path) -> Result<(), SinkError> {
        match fs::symlink_metadata(full) {
            Ok(_) => fs::remove_file(full).map_err(io_error("remove", full)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("inspect", full)(e)),
        }
    }
}

impl FixtureSink for FsSink {
    type Writer = BufWriter<File>;

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(self.resolve(path)).is_ok()
    }

    fn create_dir_all(&mut self, path: &Path) -> Result<(), SinkError> {
        let full = self.resolve(path);
        fs::create_dir_all(&full).map_err(io_error("create directory", &full))
    }

    fn create(&mut self, path: &Path) -> Result<Self::Writer, SinkError> {
        let full = self.resolve(path);
        self.ensure_parent(&full)?;
        debug!(path = %full.display(), "Creating file");
        let file = File::create(&full).map_err(io_error("create", &full))?;
        Ok(BufWriter::new(file))
    }

    fn write_new(&mut self, path: &Path, bytes: &[u8]) -> Result<bool, SinkError> {
        if self.exists(path) {
            return Ok(false);
        }
        self.write(path, bytes)?;
        Ok(true)
    }

    fn copy(&mut self, source: &Path, dest: &Path) -> Result<u64, SinkError> {
        let from = self.resolve(source);
        let to = self.resolve(dest);
        if !from.is_file() {
            return Err(SinkError::MissingSource(from));
        }
        self.remove_existing(&to)?;
        self.ensure_parent(&to)?;
        debug!(source = %from.display(), dest = %to.display(), "Copying file");
        fs::copy(&from, &to).map_err(io_error("copy to", &to))
    }

    fn link(&mut self, source: &Path, dest: &Path) -> Result<(), SinkError> {
        let from = self.resolve(source);
        let to = self.resolve(dest);
        if !from.exists() {
            return Err(SinkError::MissingSource(from));
        }
        self.remove_existing(&to)?;
        debug!(source = %from.display(), dest = %to.display(), "Linking file");
        fs::hard_link(&from, &to).map_err(io_error("link", &to))
    }

    fn symlink(&mut self, target: &Path, link_path: &Path) -> Result<(), SinkError> {
        let link = self.resolve(link_path);
        match link.parent() {
            Some(parent) if !parent.is_dir() => {
                return Err(SinkError::MissingDirectory(parent.to_path_buf()));
            }
            _ => {}
        }
        self.remove_existing(&link)?;
        debug!(target = %target.display(), link = %link.display(), "Creating symlink");
        make_symlink(target, &link).map_err(io_error("symlink", &link))
    }
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (FsSink, TempDir) {
        let dir = TempDir::new().unwrap();
        (FsSink::new(dir.path()), dir)
    }

    #[test]
    fn test_create_makes_parents_and_truncates() {
        let (mut sink, dir) = setup();
        let path = Path::new("a/b/c.log");

        sink.write(path, b"first line\nsecond line\n").unwrap();
        sink.write(path, b"short\n").unwrap();

        let contents = fs::read_to_string(dir.path().join(path)).unwrap();
        assert_eq!(contents, "short\n");
    }

    #[test]
    fn test_write_new_keeps_existing() {
        let (mut sink, dir) = setup();
        let path = Path::new("domlogs/x-bytes_log");

        assert!(sink.write_new(path, b"one\n").unwrap());
        assert!(!sink.write_new(path, b"two\n").unwrap());
        assert_eq!(fs::read_to_string(dir.path().join(path)).unwrap(), "one\n");
    }

    #[test]
    fn test_copy_replaces_destination() {
        let (mut sink, dir) = setup();
        sink.write(Path::new("logs/site"), b"new\n").unwrap();
        sink.write(Path::new("out/site"), b"old contents\n").unwrap();

        let bytes = sink.copy(Path::new("logs/site"), Path::new("out/site")).unwrap();
        assert_eq!(bytes, 4);
        assert_eq!(fs::read_to_string(dir.path().join("out/site")).unwrap(), "new\n");
    }

    #[test]
    fn test_copy_missing_source() {
        let (mut sink, _dir) = setup();
        let err = sink.copy(Path::new("logs/absent"), Path::new("out/absent")).unwrap_err();
        assert!(matches!(err, SinkError::MissingSource(_)));
        assert!(err.to_string().contains("source does not exist"));
    }

    #[cfg(unix)]
    #[test]
    fn test_link_shares_inode() {
        use std::os::unix::fs::MetadataExt;

        let (mut sink, dir) = setup();
        sink.write(Path::new("domlogs/site"), b"x\n").unwrap();
        sink.create_dir_all(Path::new("domlogs/account")).unwrap();
        sink.link(Path::new("domlogs/site"), Path::new("domlogs/account/site")).unwrap();
        // linking again replaces the existing link
        sink.link(Path::new("domlogs/site"), Path::new("domlogs/account/site")).unwrap();

        let original = fs::metadata(dir.path().join("domlogs/site")).unwrap();
        let linked = fs::metadata(dir.path().join("domlogs/account/site")).unwrap();
        assert_eq!(original.ino(), linked.ino());
        assert_eq!(original.nlink(), 2);
    }

    #[test]
    fn test_link_missing_source() {
        let (mut sink, _dir) = setup();
        let err = sink.link(Path::new("nope"), Path::new("also-nope")).unwrap_err();
        assert!(matches!(err, SinkError::MissingSource(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_replaces_existing() {
        let (mut sink, dir) = setup();
        sink.create_dir_all(Path::new("home/user")).unwrap();
        let link = Path::new("home/user/access-logs");

        sink.symlink(Path::new("../../elsewhere"), link).unwrap();
        sink.symlink(Path::new("../../domlogs/user"), link).unwrap();

        let target = fs::read_link(dir.path().join(link)).unwrap();
        assert_eq!(target, PathBuf::from("../../domlogs/user"));
        assert!(sink.exists(link));
    }

    #[test]
    fn test_symlink_requires_directory() {
        let (mut sink, _dir) = setup();
        let err = sink
            .symlink(Path::new("../target"), Path::new("missing/home/access-logs"))
            .unwrap_err();
        assert!(matches!(err, SinkError::MissingDirectory(_)));
    }

    #[test]
    fn test_io_error_display() {
        let err = SinkError::Io {
            op: "create",
            path: PathBuf::from("/tmp/x"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to create /tmp/x: denied");
    }
}
