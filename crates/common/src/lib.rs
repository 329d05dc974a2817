use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// URL prefix the music root is served under.
pub const TRACKS_PREFIX: &str = "/tracks";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub artist: String,
    pub src: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cover: String,
    #[serde(skip)]
    pub file_path: PathBuf,
}

/// Path of `path` below `root`, joined with `/` regardless of platform.
pub fn relpath_from(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(path_to_slash_string(rel))
}

pub fn track_id(relpath: &str) -> String {
    relpath.replace('/', "_")
}

pub fn track_src(relpath: &str) -> String {
    format!("{}/{}", TRACKS_PREFIX, relpath)
}

fn path_to_slash_string(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    parts.join("/")
}
