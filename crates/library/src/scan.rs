use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use common::{relpath_from, track_id, track_src, Track};
use metadata::{LoftyExtractor, MetadataExtractor};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::classify::is_audio;
use crate::LibraryError;

#[derive(Clone, Debug, Default)]
pub struct ScanReport {
    pub tracks: Vec<Track>,
    pub skipped: Vec<SkippedFile>,
}

/// An audio file that was left out of the index, with the reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

#[derive(Clone)]
pub struct Scanner {
    extractor: Arc<dyn MetadataExtractor>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(Arc::new(LoftyExtractor))
    }
}

impl Scanner {
    pub fn new(extractor: Arc<dyn MetadataExtractor>) -> Self {
        Self { extractor }
    }

    /// Walks `root` and builds one record per readable audio file, sorted by
    /// lowercased title. Traversal errors abort the scan; per-file failures
    /// are collected in `ScanReport::skipped`.
    pub fn scan(&self, root: &Path) -> Result<ScanReport, LibraryError> {
        info!("Scanning {}", root.display());
        let mut report = ScanReport::default();

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Scan of {} aborted: {}", root.display(), err);
                    return Err(err.into());
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            if !is_audio(path) {
                debug!("Skipping non-audio file {}", path.display());
                continue;
            }

            let relpath = relpath_from(root, path).unwrap_or_else(|| file_name(path));
            match self.read_track(path, &relpath) {
                Ok(track) => report.tracks.push(track),
                Err(reason) => {
                    warn!("Skipping {}: {}", path.display(), reason);
                    report.skipped.push(SkippedFile {
                        path: relpath,
                        reason,
                    });
                }
            }
        }

        report.tracks.sort_by_cached_key(|track| track.title.to_lowercase());
        info!(
            "Scan finished: {} tracks, {} skipped",
            report.tracks.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn read_track(&self, path: &Path, relpath: &str) -> Result<Track, String> {
        let mut file = File::open(path).map_err(|err| format!("open failed: {}", err))?;
        let tags = self
            .extractor
            .extract(&mut file)
            .map_err(|err| format!("metadata read failed: {}", err))?;

        Ok(Track {
            id: track_id(relpath),
            title: tags.title.unwrap_or_else(|| file_stem(path)),
            artist: tags.artist.unwrap_or_default(),
            src: track_src(relpath),
            cover: tags
                .cover
                .map(|cover| cover.to_data_uri())
                .unwrap_or_default(),
            file_path: path.to_path_buf(),
        })
    }
}

/// Scans `root` with the lofty-backed extractor.
pub fn scan(root: &Path) -> Result<ScanReport, LibraryError> {
    Scanner::default().scan(root)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown Track".to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
