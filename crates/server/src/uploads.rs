use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Name an upload is stored under: `<stem>_<timestamp><.ext>`. Directory
/// parts of the client-supplied name are discarded, including Windows-style
/// ones. Returns `None` when nothing usable remains.
pub fn upload_filename(original: &str, timestamp: u64) -> Option<String> {
    let base = original.rsplit(['/', '\\']).next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    let path = Path::new(base);
    let stem = path.file_stem()?.to_string_lossy();
    match path.extension() {
        Some(ext) => Some(format!("{}_{}.{}", stem, timestamp, ext.to_string_lossy())),
        None => Some(format!("{}_{}", stem, timestamp)),
    }
}

/// Upload being written next to its final location. The bytes go to a hidden
/// `.part` file that is renamed on `commit`; dropping the value before that
/// removes the partial file.
pub struct PartialUpload {
    partial: PathBuf,
    target: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl PartialUpload {
    pub async fn create(dir: &Path, filename: &str) -> io::Result<Self> {
        let target = dir.join(filename);
        let partial = dir.join(format!(".{}.part", filename));
        let file = File::create(&partial).await?;
        Ok(Self {
            partial,
            target,
            file: Some(file),
            committed: false,
        })
    }

    pub async fn write_chunk(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(bytes).await,
            None => Err(io::Error::new(io::ErrorKind::Other, "upload already closed")),
        }
    }

    pub async fn commit(mut self) -> io::Result<PathBuf> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }
        tokio::fs::rename(&self.partial, &self.target).await?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for PartialUpload {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        self.file.take();
        if let Err(err) = std::fs::remove_file(&self.partial) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove partial upload {}: {}", self.partial.display(), err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn filename_appends_timestamp_before_extension() {
        assert_eq!(
            upload_filename("track.mp3", 1_700_000_000).as_deref(),
            Some("track_1700000000.mp3")
        );
        assert_eq!(
            upload_filename("my.song.flac", 5).as_deref(),
            Some("my.song_5.flac")
        );
        assert_eq!(upload_filename("noext", 5).as_deref(), Some("noext_5"));
    }

    #[test]
    fn filename_drops_directory_components() {
        assert_eq!(
            upload_filename("../../etc/evil.mp3", 7).as_deref(),
            Some("evil_7.mp3")
        );
        assert_eq!(
            upload_filename("C:\\Users\\me\\song.ogg", 7).as_deref(),
            Some("song_7.ogg")
        );
    }

    #[test]
    fn filename_rejects_empty_names() {
        assert_eq!(upload_filename("", 1), None);
        assert_eq!(upload_filename("dir/", 1), None);
        assert_eq!(upload_filename("..", 1), None);
    }

    #[tokio::test]
    async fn commit_moves_bytes_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut upload = PartialUpload::create(dir.path(), "a_1.mp3").await.unwrap();
        upload.write_chunk(b"abc").await.unwrap();
        upload.write_chunk(b"def").await.unwrap();

        let path = upload.commit().await.unwrap();

        assert_eq!(path, dir.path().join("a_1.mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"abcdef");
        assert_eq!(entries(dir.path()), vec!["a_1.mp3"]);
    }

    #[tokio::test]
    async fn dropping_uncommitted_upload_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut upload = PartialUpload::create(dir.path(), "a_1.mp3").await.unwrap();
        upload.write_chunk(b"abc").await.unwrap();
        assert_eq!(entries(dir.path()), vec![".a_1.mp3.part"]);

        drop(upload);

        assert!(entries(dir.path()).is_empty());
    }
}
