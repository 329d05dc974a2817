use std::env;
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut json = false;
    let mut music_root = None;
    for arg in env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else if music_root.is_none() {
            music_root = Some(arg);
        }
    }
    let music_root = music_root
        .or_else(|| env::var("MUSIC_ROOT").ok())
        .ok_or("MUSIC_ROOT not set and no path argument")?;

    let report = library::scan(&PathBuf::from(&music_root))?;
    info!("Scanned {}", music_root);

    if json {
        let value = serde_json::json!({
            "tracks": report.tracks,
            "skipped": report.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for track in &report.tracks {
        println!("{}\t{}\t{}", track.id, track.title, track.artist);
    }
    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.path, skipped.reason);
    }
    println!(
        "Indexed: {} tracks, {} skipped",
        report.tracks.len(),
        report.skipped.len()
    );

    Ok(())
}
