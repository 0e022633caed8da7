use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};

use super::RenderError;

/// Pixel rectangle `(x, y, width, height)`.
pub type Bounds = (u32, u32, u32, u32);

/// Directory the image will be written into (`.` for bare file names).
pub(super) fn output_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Fail early when the output directory is absent or read-only.
pub fn check_output_dir(path: &Path) -> Result<(), RenderError> {
    let dir = output_dir(path);
    let meta = fs::metadata(&dir).map_err(|_| RenderError::OutputDirMissing { dir: dir.clone() })?;
    if !meta.is_dir() {
        return Err(RenderError::OutputDirMissing { dir });
    }
    if meta.permissions().readonly() {
        return Err(RenderError::PermissionDenied {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Smallest rectangle holding every pixel that differs from `background`.
pub fn content_bounds(image: &RgbImage, background: Rgb<u8>) -> Option<Bounds> {
    let (mut x0, mut y0) = (u32::MAX, u32::MAX);
    let (mut x1, mut y1) = (0u32, 0u32);
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel != background {
            found = true;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
    }

    found.then(|| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

/// Crop to the drawn content plus `pad` pixels, like `bbox_inches='tight'`.
/// A blank image is returned unchanged.
pub fn crop_tight(image: RgbImage, background: Rgb<u8>, pad: u32) -> RgbImage {
    let Some((x, y, w, h)) = content_bounds(&image, background) else {
        return image;
    };
    let (img_w, img_h) = image.dimensions();
    let left = x.saturating_sub(pad);
    let top = y.saturating_sub(pad);
    let right = (x + w).saturating_add(pad).min(img_w);
    let bottom = (y + h).saturating_add(pad).min(img_h);

    log::debug!(
        "Tight bbox: {img_w}x{img_h} -> {}x{} at ({left}, {top})",
        right - left,
        bottom - top
    );
    image::imageops::crop_imm(&image, left, top, right - left, bottom - top).to_image()
}

/// Write `image` as PNG, replacing any existing file.
///
/// The PNG is encoded in memory first, so an encoding failure leaves a
/// previous report in place.
pub fn write_png(image: &RgbImage, path: &Path) -> Result<(), RenderError> {
    let mut encoded = Cursor::new(Vec::new());
    image
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(|source| RenderError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, encoded.into_inner()).map_err(|e| RenderError::from_io(path, e))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn canvas_with_mark(w: u32, h: u32, marks: &[(u32, u32)]) -> RgbImage {
        let mut img = RgbImage::from_pixel(w, h, WHITE);
        for &(x, y) in marks {
            img.put_pixel(x, y, Rgb([0, 0, 0]));
        }
        img
    }

    #[test]
    fn bounds_cover_all_marks() {
        let img = canvas_with_mark(50, 40, &[(10, 5), (30, 20)]);
        assert_eq!(content_bounds(&img, WHITE), Some((10, 5, 21, 16)));
    }

    #[test]
    fn blank_image_has_no_bounds_and_is_not_cropped() {
        let img = canvas_with_mark(20, 10, &[]);
        assert_eq!(content_bounds(&img, WHITE), None);
        assert_eq!(crop_tight(img, WHITE, 2).dimensions(), (20, 10));
    }

    #[test]
    fn crop_keeps_padding_and_clamps_to_edges() {
        let img = canvas_with_mark(100, 80, &[(20, 30), (40, 50)]);
        assert_eq!(crop_tight(img, WHITE, 5).dimensions(), (31, 31));

        let edge = canvas_with_mark(100, 80, &[(0, 0), (99, 10)]);
        assert_eq!(crop_tight(edge, WHITE, 5).dimensions(), (100, 16));
    }

    #[test]
    fn missing_output_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("no_such_dir").join("report.png");
        match check_output_dir(&target) {
            Err(RenderError::OutputDirMissing { dir: missing }) => {
                assert!(missing.ends_with("no_such_dir"))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn bare_file_name_uses_current_directory() {
        assert!(check_output_dir(Path::new("report.png")).is_ok());
    }

    #[test]
    fn write_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        fs::write(&path, b"stale contents that are not a png").unwrap();

        write_png(&canvas_with_mark(8, 8, &[(1, 1)]), &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(image::open(&path).unwrap().to_rgb8().dimensions(), (8, 8));
    }

    #[test]
    fn failed_encode_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        fs::write(&path, b"previous report").unwrap();

        // PNG cannot hold a zero-sized image.
        let err = write_png(&RgbImage::new(0, 0), &path).unwrap_err();
        assert!(matches!(err, RenderError::Encode { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"previous report");
    }

    #[test]
    fn write_into_missing_directory_maps_to_output_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone").join("out.png");
        let err = write_png(&canvas_with_mark(4, 4, &[]), &path).unwrap_err();
        assert!(matches!(err, RenderError::OutputDirMissing { .. }));
    }
}
