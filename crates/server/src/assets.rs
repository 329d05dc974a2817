use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

pub const SPA_ENTRY: &str = "index.html";

/// Files under the music root, served as-is with a content type taken from
/// the extension.
pub fn music_files(root: &Path) -> ServeDir {
    ServeDir::new(root)
}

/// Build output of the web client. Paths that match no asset get the entry
/// document so client-side routes survive a reload.
pub fn spa_files(dist: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dist).fallback(ServeFile::new(dist.join(SPA_ENTRY)))
}

pub fn spa_entry_exists(dist: &Path) -> bool {
    dist.join(SPA_ENTRY).is_file()
}
