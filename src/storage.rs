//! Storage backend for keystore files.

use anyhow::{Context, Result, bail};
use getrandom::fill;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extension every keystore file carries.
const JSON_EXTENSION: &str = "json";

/// A keystore file on disk.
///
/// Keystore files are written once and never replaced: [`Storage::create`]
/// fails if the target already exists.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Creates a new Storage instance with the given path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Like [`Storage::new`], appending `.json` unless the path already ends with it.
    pub fn with_json_extension(path: PathBuf) -> Self {
        let has_extension = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(JSON_EXTENSION));
        if has_extension {
            return Self::new(path);
        }

        let mut name = path.clone().into_os_string();
        name.push(".");
        name.push(JSON_EXTENSION);
        Self::new(PathBuf::from(name))
    }

    /// Returns `true` if the storage file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the entire storage file into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load(&self) -> Result<Vec<u8>> {
        let data = fs::read(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        info!(path = %self.path.display(), bytes = data.len(), "read keystore file");
        Ok(data)
    }

    /// Writes `data` to a new file at the storage path.
    ///
    /// The data goes to a randomly named temporary sibling first, is synced
    /// to disk, and is then linked into place with a primitive that refuses
    /// to replace an existing file. Readers never observe a partial file.
    ///
    /// On Unix the file is created read-only for its owner (0400).
    ///
    /// # Errors
    ///
    /// Returns an error if the file already exists or cannot be written.
    pub fn create(&self, data: &[u8]) -> Result<()> {
        if self.exists() {
            warn!(path = %self.path.display(), "refusing to overwrite existing file");
            bail!("file {} already exists", self.path.display());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.random_tmp_path()?;

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o400);
        }

        let tmp_file = options
            .open(&tmp_path)
            .context("failed to create temporary file")?;
        fill_tmp(&tmp_path, tmp_file, data)?;

        let linked = self.link_new(&tmp_path);
        let _ = fs::remove_file(&tmp_path);
        if let Err(e) = linked {
            if e.kind() == ErrorKind::AlreadyExists {
                bail!("file {} already exists", self.path.display());
            }
            return Err(e).context("failed to move keystore file into place");
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }

        info!(path = %self.path.display(), bytes = data.len(), "wrote keystore file");
        Ok(())
    }

    /// Returns the path to the storage file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Generates a unique temporary file path in the same directory.
    ///
    /// Format: `filename.tmp.<randomhex>`
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        fill(&mut buf)?;

        let file_name = self
            .path
            .file_name()
            .context("storage path has no file name")?
            .to_string_lossy();

        let tmp_name = format!("{}.tmp.{}", file_name, hex::encode(buf));

        Ok(self.path.with_file_name(tmp_name))
    }

    /// Makes `tmp_path`'s content visible at the target path, failing with
    /// `AlreadyExists` if the target exists.
    ///
    /// Uses `MoveFileExW` without `MOVEFILE_REPLACE_EXISTING`.
    #[cfg(target_os = "windows")]
    fn link_new(&self, tmp_path: &Path) -> std::io::Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{MOVEFILE_WRITE_THROUGH, MoveFileExW};

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY:
        // - Strings are valid UTF-16 and null-terminated
        // - Pointers remain valid during the call
        // - Windows does not retain the pointers after return
        let result = unsafe { MoveFileExW(tmp_w.as_ptr(), target_w.as_ptr(), MOVEFILE_WRITE_THROUGH) };

        if result == 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(())
    }

    /// Makes `tmp_path`'s content visible at the target path, failing with
    /// `AlreadyExists` if the target exists.
    ///
    /// On Unix, `link()` never replaces an existing name.
    #[cfg(not(target_os = "windows"))]
    fn link_new(&self, tmp_path: &Path) -> std::io::Result<()> {
        fs::hard_link(tmp_path, &self.path)
    }
}

/// Writes `data` to the freshly created temporary file and syncs it,
/// removing the file if either step fails.
fn fill_tmp<W: Write + SyncAll>(tmp_path: &Path, mut file: W, data: &[u8]) -> Result<()> {
    let written = file.write_all(data).and_then(|()| file.sync_all());
    drop(file);
    if let Err(e) = written {
        let _ = fs::remove_file(tmp_path);
        return Err(e).context("failed to write temporary file");
    }
    Ok(())
}

trait SyncAll {
    fn sync_all(&self) -> std::io::Result<()>;
}

impl SyncAll for File {
    fn sync_all(&self) -> std::io::Result<()> {
        File::sync_all(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_returns_written_data() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("secret.json"));

        storage.create(b"hello world").unwrap();

        assert_eq!(storage.load().unwrap(), b"hello world");
    }

    #[test]
    fn load_fails_if_file_does_not_exist() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("missing.json"));

        assert!(storage.load().is_err());
    }

    #[test]
    fn exists_tracks_creation() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("secret.json"));

        assert!(!storage.exists());
        storage.create(b"data").unwrap();
        assert!(storage.exists());
    }

    #[test]
    fn create_never_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.json");
        let storage = Storage::new(path.clone());

        storage.create(b"first").unwrap();
        let err = storage.create(b"second").unwrap_err();

        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read(path).unwrap(), b"first");
    }

    #[test]
    fn tmp_file_is_removed_after_success() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("secret.json"));
        storage.create(b"data").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(entries, vec!["secret.json"]);
    }

    #[test]
    fn tmp_names_are_unique_siblings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.json");
        let storage = Storage::new(path.clone());

        let a = storage.random_tmp_path().unwrap();
        let b = storage.random_tmp_path().unwrap();

        assert_ne!(a, b);
        assert_ne!(a, path);
        assert_eq!(a.parent(), path.parent());
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SyncAll for FullDisk {
        fn sync_all(&self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tmp_file_is_removed_when_write_fails() {
        let dir = tempdir().unwrap();
        let tmp_path = dir.path().join("secret.json.tmp.00");
        fs::write(&tmp_path, b"").unwrap();

        assert!(fill_tmp(&tmp_path, FullDisk, b"data").is_err());
        assert!(!tmp_path.exists());
    }

    #[test]
    fn fill_tmp_writes_and_keeps_file() {
        let dir = tempdir().unwrap();
        let tmp_path = dir.path().join("secret.json.tmp.01");
        let file = File::create(&tmp_path).unwrap();

        fill_tmp(&tmp_path, file, b"data").unwrap();
        assert_eq!(fs::read(&tmp_path).unwrap(), b"data");
    }

    #[test]
    fn parent_directory_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("secret.json");

        Storage::new(nested.clone()).create(b"data").unwrap();

        assert!(nested.exists());
    }

    #[test]
    #[cfg(unix)]
    fn file_is_owner_read_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.json");
        Storage::new(path.clone()).create(b"data").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o400);
    }

    #[test]
    fn json_extension_is_appended_once() {
        assert_eq!(
            Storage::with_json_extension(PathBuf::from("out/secret")).path(),
            &PathBuf::from("out/secret.json")
        );
        assert_eq!(
            Storage::with_json_extension(PathBuf::from("secret.json")).path(),
            &PathBuf::from("secret.json")
        );
        assert_eq!(
            Storage::with_json_extension(PathBuf::from("secret.txt")).path(),
            &PathBuf::from("secret.txt.json")
        );
    }
}
