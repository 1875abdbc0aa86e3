//! Opening theme playback. Blocks until the track ends, so callers run it on
//! a blocking thread.

use std::io::Cursor;
use std::path::Path;

pub async fn load_track(path: &Path) -> Result<Vec<u8>, String> {
    tokio::fs::read(path)
        .await
        .map_err(|err| format!("{}: {err}", path.display()))
}

pub fn play_track(bytes: Vec<u8>) -> Result<(), String> {
    if bytes.is_empty() {
        return Err("empty audio track".to_string());
    }
    let (_stream, handle) = rodio::OutputStream::try_default().map_err(|err| err.to_string())?;
    let sink = rodio::Sink::try_new(&handle).map_err(|err| err.to_string())?;
    let source = rodio::Decoder::new(Cursor::new(bytes)).map_err(|err| err.to_string())?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_track_is_rejected_before_opening_a_device() {
        assert_eq!(play_track(Vec::new()), Err("empty audio track".to_string()));
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = load_track(Path::new("no/such/opening.mp3")).await.unwrap_err();
        assert!(err.starts_with("no/such/opening.mp3"));
    }
}
