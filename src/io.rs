use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageError, RgbaImage};
use rfd::FileDialog;
use thiserror::Error;

/// Leading bytes read when sniffing a file's signature.
const SIGNATURE_LEN: u64 = 32;

/// Extensions offered by the upload picker. Decoding never trusts them; the
/// content signature decides.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "bmp", "tga", "gif", "ico", "tiff", "tif",
];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("the file is not an image")]
    NotAnImage,
    #[error("image could not be decoded: {0}")]
    Decode(#[source] ImageError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: the surface is empty")]
    EmptySurface,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] ImageError),
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// UPLOAD DECODING
// ============================================================================

/// Decode uploaded bytes into straight RGBA.
///
/// Anything whose signature is not a supported image format is rejected with
/// [`LoadError::NotAnImage`] before a decoder is run.
pub fn decode_upload(bytes: &[u8]) -> Result<RgbaImage, LoadError> {
    let format = image::guess_format(bytes).map_err(|_| LoadError::NotAnImage)?;
    match image::load_from_memory_with_format(bytes, format) {
        Ok(img) => Ok(img.into_rgba8()),
        Err(ImageError::Unsupported(_)) => Err(LoadError::NotAnImage),
        Err(e) => Err(LoadError::Decode(e)),
    }
}

/// Check only the leading signature of `path`, without decoding. Cheap
/// enough for the UI thread; a file that passes may still fail to decode.
pub fn sniff_path(path: &Path) -> Result<(), LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut head = Vec::with_capacity(SIGNATURE_LEN as usize);
    File::open(path)
        .map_err(io_err)?
        .take(SIGNATURE_LEN)
        .read_to_end(&mut head)
        .map_err(io_err)?;
    image::guess_format(&head)
        .map(|_| ())
        .map_err(|_| LoadError::NotAnImage)
}

/// Read and decode an image file. Safe to call from a rayon worker.
pub fn load_path(path: &Path) -> Result<RgbaImage, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_upload(&bytes)
}

// ============================================================================
// PNG EXPORT
// ============================================================================

/// Which canvas an export came from; fixes the suggested file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Diagram,
    Overlay,
}

impl ExportKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportKind::Diagram => "golden-spiral.png",
            ExportKind::Overlay => "golden-grid-analysis.png",
        }
    }
}

/// Encode the full surface as PNG, straight alpha preserved.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::EmptySurface);
    }
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(buf)
}

/// Encode and write a PNG. Standalone so it can run on a background thread.
pub fn write_export(image: &RgbaImage, path: &Path) -> Result<(), ExportError> {
    let bytes = encode_png(image)?;
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(io_err)?;
    writer.flush().map_err(io_err)
}

// ============================================================================
// FILE HANDLER
// ============================================================================

/// Native dialogs for upload and export, remembering the last directory.
#[derive(Default)]
pub struct FileHandler {
    pub last_dir: Option<PathBuf>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn remember(&mut self, path: &Path) {
        self.last_dir = path.parent().map(Path::to_path_buf);
    }

    pub fn pick_image_path(&mut self) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .add_filter("All Files", &["*"]);
        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }
        let path = dialog.pick_file()?;
        self.remember(&path);
        Some(path)
    }

    /// Save dialog pre-filled with the deterministic name for `kind`.
    pub fn pick_export_path(&mut self, kind: ExportKind) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(kind.file_name());
        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }
        let path = dialog.save_file()?;
        self.remember(&path);
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(7, 5, |x, y| Rgba([x as u8 * 30, y as u8 * 40, 90, 128]))
    }

    #[test]
    fn png_export_decodes_back_identically() {
        let img = sample();
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(decode_upload(&bytes).unwrap(), img);
    }

    #[test]
    fn text_is_not_an_image() {
        let err = decode_upload(b"just some notes, definitely not pixels").unwrap_err();
        assert!(matches!(err, LoadError::NotAnImage));
    }

    #[test]
    fn truncated_png_is_a_decode_error() {
        let bytes = encode_png(&sample()).unwrap();
        let err = decode_upload(&bytes[..24]).unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)));
    }

    #[test]
    fn empty_surface_is_not_exported() {
        assert!(matches!(
            encode_png(&RgbaImage::new(0, 10)),
            Err(ExportError::EmptySurface)
        ));
    }

    #[test]
    fn export_names_are_fixed() {
        assert_eq!(ExportKind::Diagram.file_name(), "golden-spiral.png");
        assert_eq!(ExportKind::Overlay.file_name(), "golden-grid-analysis.png");
    }

    #[test]
    fn write_then_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("goldenfe-io-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(ExportKind::Overlay.file_name());
        write_export(&sample(), &path).unwrap();
        assert_eq!(load_path(&path).unwrap(), sample());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn sniff_checks_signature_only() {
        let dir = std::env::temp_dir().join(format!("goldenfe-sniff-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let png = dir.join("photo.png");
        let notes = dir.join("notes.png");
        std::fs::write(&png, encode_png(&sample()).unwrap()).unwrap();
        std::fs::write(&notes, b"just some notes, definitely not pixels").unwrap();

        assert!(sniff_path(&png).is_ok());
        assert!(matches!(sniff_path(&notes), Err(LoadError::NotAnImage)));
        assert!(matches!(
            sniff_path(&dir.join("missing.png")),
            Err(LoadError::Io { .. })
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_path(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
