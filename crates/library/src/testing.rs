//! Plain-text stand-in for a tag parser. Each audio fixture holds lines such
//! as `title=Song` or `artist=Someone`; a file starting with `corrupt` fails.
//! `write_wav` produces real audio for scans that go through lofty.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lofty::config::WriteOptions;
use lofty::prelude::{Accessor, TagExt};
use lofty::tag::{Tag, TagType};
use metadata::{CoverArt, MetadataError, MetadataExtractor, TagInfo};

#[derive(Default)]
pub struct ScriptedExtractor {
    pub calls: AtomicUsize,
    pub delay: Duration,
}

impl ScriptedExtractor {
    pub fn slow(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetadataExtractor for ScriptedExtractor {
    fn extract(&self, file: &mut File) -> Result<TagInfo, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let mut text = String::new();
        file.read_to_string(&mut text)?;
        if text.starts_with("corrupt") {
            return Err(MetadataError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "corrupt tags",
            )));
        }
        let mut info = TagInfo::default();
        for line in text.lines() {
            if let Some(value) = line.strip_prefix("title=") {
                info.title = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("artist=") {
                info.artist = Some(value.to_string());
            } else if line == "cover=png" {
                info.cover = Some(CoverArt {
                    data: vec![0x89, 0x50, 0x4E, 0x47],
                    mime: Some("image/png".to_string()),
                });
            }
        }
        Ok(info)
    }
}

/// Writes a short silent 16-bit mono WAV, with an ID3v2 title when given.
pub fn write_wav(path: &Path, title: Option<&str>) {
    let samples = 800usize;
    let data_len = (samples * 2) as u32;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&8000u32.to_le_bytes());
    out.extend_from_slice(&16000u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(out.len() + samples * 2, 0);
    std::fs::write(path, out).unwrap();

    if let Some(title) = title {
        let mut tag = Tag::new(TagType::Id3v2);
        tag.set_title(title.to_string());
        tag.save_to_path(path, WriteOptions::default()).unwrap();
    }
}
