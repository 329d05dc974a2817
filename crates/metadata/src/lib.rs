use std::fs::File;
use std::io::BufReader;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use lofty::error::LoftyError;
use lofty::picture::{Picture, PictureType};
use lofty::prelude::{ItemKey, TaggedFileExt};
use lofty::probe::Probe;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Default, Clone)]
pub struct TagInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<CoverArt>,
}

#[derive(Debug, Clone)]
pub struct CoverArt {
    pub data: Vec<u8>,
    pub mime: Option<String>,
}

impl CoverArt {
    pub fn to_data_uri(&self) -> String {
        let mime = self.mime.as_deref().unwrap_or(FALLBACK_MIME);
        format!("data:{};base64,{}", mime, BASE64.encode(&self.data))
    }
}

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Io(err) => write!(f, "io error: {}", err),
            MetadataError::Lofty(err) => write!(f, "tag error: {}", err),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

/// Reads presentation tags from an already opened audio file.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, file: &mut File) -> Result<TagInfo, MetadataError>;
}

/// Extractor backed by lofty. The container format is sniffed from content,
/// so a mislabelled extension still parses when the bytes are valid.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyExtractor;

impl MetadataExtractor for LoftyExtractor {
    fn extract(&self, file: &mut File) -> Result<TagInfo, MetadataError> {
        read_tags(file)
    }
}

pub fn read_tags(file: &mut File) -> Result<TagInfo, MetadataError> {
    let tagged_file = Probe::new(BufReader::new(file))
        .guess_file_type()?
        .read()?;

    let mut info = TagInfo::default();
    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        info.title = non_empty(tag.get_string(&ItemKey::TrackTitle));
        let album_artist = non_empty(tag.get_string(&ItemKey::AlbumArtist));
        info.artist = non_empty(tag.get_string(&ItemKey::TrackArtist)).or(album_artist);
        info.cover = pick_picture(tag.pictures()).map(|picture| {
            let data = picture.data().to_vec();
            let mime = picture
                .mime_type()
                .map(|mime| mime.as_str().trim().to_string())
                .filter(|mime| !mime.is_empty())
                .or_else(|| guess_mime(&data));
            CoverArt { data, mime }
        });
    }

    Ok(info)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
}

fn pick_picture(pictures: &[Picture]) -> Option<&Picture> {
    for picture in pictures {
        if picture.pic_type() == PictureType::CoverFront {
            return Some(picture);
        }
    }
    pictures.first()
}

fn guess_mime(bytes: &[u8]) -> Option<String> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg".to_string())
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        Some("image/png".to_string())
    } else if bytes.starts_with(b"GIF8") {
        Some("image/gif".to_string())
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp".to_string())
    } else {
        None
    }
}
