use std::io;
use std::path::{Path, PathBuf};

/// The shared on-disk audio directory. Reset at batch start, written to
/// during resolution; same-name writes overwrite (last writer wins, the
/// runner serializes terms).
#[derive(Clone, Debug)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// Delete every audio file from a previous batch. Failures are logged
    /// and skipped; a missing directory is not an error.
    pub fn cleanup(&self) -> usize {
        let pattern = self.dir.join("*.mp3");
        let Some(pattern) = pattern.to_str() else {
            return 0;
        };
        let Ok(entries) = glob::glob(pattern) else {
            return 0;
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            match std::fs::remove_file(&entry) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %entry.display(), error = %e, "audio cleanup failed");
                }
            }
        }
        if removed > 0 {
            tracing::info!(removed, dir = %self.dir.display(), "cleaned up previous audio files");
        }
        removed
    }

    pub fn write(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        self.ensure()?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> AudioStore {
        let dir = std::env::temp_dir().join(format!("kartei-audio-{}", uuid::Uuid::now_v7()));
        AudioStore::new(dir)
    }

    #[test]
    fn write_creates_directory_and_file() {
        let store = temp_store();
        let path = store.write("tisch_pronunciation.mp3", b"mp3").unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"mp3");
    }

    #[test]
    fn write_overwrites_existing_file() {
        let store = temp_store();
        store.write("a.mp3", b"old").unwrap();
        let path = store.write("a.mp3", b"new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn cleanup_removes_only_audio_files() {
        let store = temp_store();
        store.write("a.mp3", b"x").unwrap();
        store.write("b.mp3", b"y").unwrap();
        std::fs::write(store.dir().join("keep.txt"), b"z").unwrap();

        assert_eq!(store.cleanup(), 2);
        assert!(!store.dir().join("a.mp3").exists());
        assert!(store.dir().join("keep.txt").exists());
    }

    #[test]
    fn cleanup_on_missing_directory_is_noop() {
        let store = temp_store();
        assert_eq!(store.cleanup(), 0);
    }
}
