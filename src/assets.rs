//! Best-effort sprite preloading
//!
//! Warms the frame images before the first spawn so the host never shows
//! a half-loaded sprite. Load failures are logged and ignored; startup
//! proceeds regardless.

use std::path::Path;

/// Try to decode each frame image, returning how many loaded.
pub fn preload_frames<P: AsRef<Path>>(paths: &[P]) -> usize {
    let mut loaded = 0;
    for path in paths {
        let path = path.as_ref();
        match image::open(path) {
            Ok(_) => {
                log::debug!("Preloaded sprite frame {}", path.display());
                loaded += 1;
            }
            Err(err) => {
                log::debug!("Sprite frame {} not preloaded: {err}", path.display());
            }
        }
    }
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_frames_are_not_fatal() {
        let loaded = preload_frames(&["no-such-frame-1.png", "no-such-frame-2.png"]);
        assert_eq!(loaded, 0);
    }

    #[test]
    fn test_empty_frame_list() {
        let none: [&str; 0] = [];
        assert_eq!(preload_frames(&none), 0);
    }
}
