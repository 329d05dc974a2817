use std::path::Path;

use mime_guess::mime;

/// True when the lowercased extension maps to an `audio/*` MIME type.
/// Only the name is inspected; the file contents are never read.
pub fn is_audio(path: &Path) -> bool {
    let ext = match path.extension() {
        Some(ext) => ext.to_string_lossy().to_ascii_lowercase(),
        None => return false,
    };
    mime_guess::from_ext(&ext)
        .first()
        .map(|guess| guess.type_() == mime::AUDIO)
        .unwrap_or(false)
}
