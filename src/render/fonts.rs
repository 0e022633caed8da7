use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use plotters::style::{register_font, FontStyle};

use super::RenderError;

/// Family the bundled face is registered under.
pub const EMBEDDED_FAMILY: &str = "deorbit-sans";

/// DejaVu Sans (Bitstream Vera license, see `assets/fonts/`). Covers the
/// Greek "Δ" in the summary header.
static EMBEDDED_FACE: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Font sources registered so far and their plotters family names.
/// `None` is the bundled face.
static REGISTERED: Mutex<Vec<(Option<PathBuf>, &'static str)>> = Mutex::new(Vec::new());

/// Make a face available to plotters and return the family name to draw with.
///
/// Without `preferred` the bundled face is used, so rendering never depends on
/// fonts installed on the host. A configured font file gets a family of its
/// own: each path is read once, and a path that cannot be read or parsed is an
/// error on every call.
pub fn ensure_registered(preferred: Option<&Path>) -> Result<&'static str, RenderError> {
    let key = preferred.map(Path::to_path_buf);
    let mut registered = REGISTERED.lock().unwrap_or_else(|e| e.into_inner());
    if let Some((_, family)) = registered.iter().find(|(source, _)| *source == key) {
        return Ok(*family);
    }

    let family = match preferred {
        None => {
            register(EMBEDDED_FAMILY, EMBEDDED_FACE, Path::new("DejaVuSans.ttf (bundled)"))?;
            EMBEDDED_FAMILY
        }
        Some(path) => {
            let bytes = fs::read(path).map_err(|source| RenderError::FontRead {
                path: path.to_path_buf(),
                source,
            })?;
            // plotters keeps registered faces for the life of the process.
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            let family: &'static str =
                Box::leak(format!("deorbit-font-{}", registered.len()).into_boxed_str());
            register(family, bytes, path)?;
            log::debug!("Registered font {} as {family}", path.display());
            family
        }
    };

    registered.push((key, family));
    Ok(family)
}

fn register(family: &str, bytes: &'static [u8], path: &Path) -> Result<(), RenderError> {
    register_font(family, FontStyle::Normal, bytes).map_err(|_| RenderError::InvalidFont {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn bundled_face_is_the_default() {
        assert_eq!(ensure_registered(None).unwrap(), EMBEDDED_FAMILY);
        assert_eq!(ensure_registered(None).unwrap(), EMBEDDED_FAMILY);
    }

    #[test]
    fn configured_font_gets_its_own_family() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Custom.ttf");
        fs::write(&path, EMBEDDED_FACE).unwrap();

        ensure_registered(None).unwrap();
        let family = ensure_registered(Some(&path)).unwrap();
        assert_ne!(family, EMBEDDED_FAMILY);
        assert_eq!(ensure_registered(Some(&path)).unwrap(), family);
        assert_eq!(ensure_registered(None).unwrap(), EMBEDDED_FAMILY);
    }

    #[test]
    fn missing_font_file_fails_after_default_is_registered() {
        ensure_registered(None).unwrap();
        let err = ensure_registered(Some(Path::new("/no/such/font.ttf"))).unwrap_err();
        assert!(matches!(err, RenderError::FontRead { .. }));
        assert!(err.to_string().contains("/no/such/font.ttf"));
    }

    #[test]
    fn garbage_font_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.ttf");
        fs::write(&path, b"not a font").unwrap();

        for _ in 0..2 {
            assert!(matches!(
                ensure_registered(Some(&path)),
                Err(RenderError::InvalidFont { .. })
            ));
        }
    }
}
