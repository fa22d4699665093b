//! # Image Processing Module
//!
//! Questo modulo decodifica un file immagine e lo ricodifica nello stesso path,
//! usando il crate `image` come codec (e `zenwebp` per l'encode WebP).
//!
//! ## Formati Supportati
//!
//! | Estensione      | Output | Parametri                              |
//! |-----------------|--------|----------------------------------------|
//! | `.jpg` `.jpeg`  | JPEG   | `jpeg_quality`                         |
//! | `.png`          | PNG    | `png_compression`, filtro adattivo     |
//! | `.webp`         | WebP   | `webp_quality`, `webp_lossless`        |
//!
//! ## Pipeline per file
//!
//! 1. **Formato di output**: Dedotto dal suffisso del nome file
//! 2. **Lettura**: Il file viene letto interamente in memoria
//! 3. **Decode**: Formato rilevato dal contenuto, fallback sull'estensione;
//!    il profilo ICC, se presente, viene conservato
//! 4. **Encode**: In un buffer in memoria, con `EncodeOptions` espliciti e
//!    lo stesso profilo ICC
//! 5. **Scrittura**: Il buffer sovrascrive il file originale (saltata in dry-run)
//!
//! Il formato di input e quello di output possono differire: un PNG salvato
//! come `foto.jpg` viene ricodificato in JPEG, come farebbe qualunque codec
//! che deduce il formato dal nome.
//!
//! ## Conversioni di colore
//!
//! - JPEG non supporta alpha né profondità > 8 bit: l'immagine viene
//!   convertita in L8 o RGB8 prima dell'encode
//! - WebP riceve sempre RGB8 o RGBA8
//! - PNG accetta 8 e 16 bit; i buffer float vengono portati a 16 bit.
//!   I PNG a palette vengono espansi e riscritti in truecolor
//!
//! Gli altri metadati (EXIF, XMP, testo PNG) non vengono ricopiati.

use crate::config::EncodeOptions;
use crate::error::ResaveError;
use crate::file_manager::FileManager;
use crate::report::ResavedFile;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{FilterType as PngFilterType, PngEncoder};
use image::{ColorType, DynamicImage, ImageDecoder, ImageEncoder, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zenwebp::{EncodeRequest, EncoderConfig, PixelLayout};

/// A decoded image together with the ICC profile embedded in its file
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub icc_profile: Option<Vec<u8>>,
}

/// Decodes and re-encodes single image files.
///
/// Holds no per-file state: the decoded buffer lives only inside [`resave`](Self::resave).
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProcessor {
    options: EncodeOptions,
}

impl ImageProcessor {
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    /// Output format for a path, inferred from the file name suffix
    pub fn format_for_path(path: &Path) -> Result<ImageFormat, ResaveError> {
        let name = path
            .file_name()
            .map(|n| n.as_encoded_bytes())
            .unwrap_or_default();

        if name.ends_with(b".jpg") || name.ends_with(b".jpeg") {
            Ok(ImageFormat::Jpeg)
        } else if name.ends_with(b".png") {
            Ok(ImageFormat::Png)
        } else if name.ends_with(b".webp") {
            Ok(ImageFormat::WebP)
        } else {
            Err(ResaveError::UnsupportedFormat(path.display().to_string()))
        }
    }

    /// Short lowercase name used in reports
    pub fn format_name(format: ImageFormat) -> &'static str {
        match format {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::WebP => "webp",
            _ => "other",
        }
    }

    /// Read and decode the file at `path`, keeping its ICC profile
    pub fn decode(path: &Path) -> Result<DecodedImage, ResaveError> {
        let bytes = std::fs::read(path).map_err(|e| ResaveError::io(path, e))?;
        Self::decode_bytes(bytes, path)
    }

    fn decode_bytes(bytes: Vec<u8>, path: &Path) -> Result<DecodedImage, ResaveError> {
        let decode_error = |source: image::ImageError| ResaveError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ResaveError::io(path, e))?;

        if reader.format().is_none() {
            let fallback = Self::format_for_path(path)?;
            debug!(
                "Could not sniff format of {}, trying {:?} from its name",
                path.display(),
                fallback
            );
            reader.set_format(fallback);
        }

        let mut decoder = reader.into_decoder().map_err(decode_error)?;
        let icc_profile = decoder.icc_profile().unwrap_or_else(|e| {
            warn!("Ignoring unreadable ICC profile in {}: {}", path.display(), e);
            None
        });
        let image = DynamicImage::from_decoder(decoder).map_err(decode_error)?;

        Ok(DecodedImage { image, icc_profile })
    }

    /// Encode `image` as `format` into an in-memory buffer, embedding `icc_profile` if given
    pub fn encode(
        &self,
        image: &DynamicImage,
        icc_profile: Option<&[u8]>,
        format: ImageFormat,
        path: &Path,
    ) -> Result<Vec<u8>, ResaveError> {
        let mut buffer = Cursor::new(Vec::new());

        let result = match format {
            ImageFormat::Jpeg => {
                let mut encoder =
                    JpegEncoder::new_with_quality(&mut buffer, self.options.jpeg_quality);
                attach_icc_profile(&mut encoder, icc_profile, path);
                jpeg_compatible(image).write_with_encoder(encoder)
            }
            ImageFormat::Png => {
                let mut encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    self.options.png_compression.into(),
                    PngFilterType::Adaptive,
                );
                attach_icc_profile(&mut encoder, icc_profile, path);
                png_compatible(image).write_with_encoder(encoder)
            }
            ImageFormat::WebP => return self.encode_webp(image, icc_profile, path),
            other => {
                return Err(ResaveError::UnsupportedFormat(format!(
                    "{:?} ({})",
                    other,
                    path.display()
                )))
            }
        };

        result.map_err(|source| ResaveError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(buffer.into_inner())
    }

    fn encode_webp(
        &self,
        image: &DynamicImage,
        icc_profile: Option<&[u8]>,
        path: &Path,
    ) -> Result<Vec<u8>, ResaveError> {
        let config = if self.options.webp_lossless {
            EncoderConfig::new_lossless()
        } else {
            EncoderConfig::new_lossy()
        }
        .with_quality(f32::from(self.options.webp_quality));

        let (pixels, layout) = if image.color().has_alpha() {
            (image.to_rgba8().into_raw(), PixelLayout::Rgba8)
        } else {
            (image.to_rgb8().into_raw(), PixelLayout::Rgb8)
        };

        let mut request =
            EncodeRequest::new(&config, &pixels, layout, image.width(), image.height());
        if let Some(icc) = icc_profile {
            request = request.with_icc_profile(icc);
        }

        request.encode().map_err(|e| ResaveError::WebpEncode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Decode the file at `path` and save it back to the same path.
    ///
    /// With `dry_run` the encoded bytes are produced and measured but never written.
    pub fn resave(&self, path: &Path, dry_run: bool) -> Result<ResavedFile, ResaveError> {
        let format = Self::format_for_path(path)?;

        let (original_size, modified) = FileManager::get_file_info(path)?;
        let DecodedImage { image, icc_profile } = Self::decode(path)?;
        debug!(
            "Decoded {} ({}x{}, {:?}, icc: {}, mtime: {})",
            path.display(),
            image.width(),
            image.height(),
            image.color(),
            icc_profile.as_ref().map_or(0, Vec::len),
            modified
        );

        let encoded = self.encode(&image, icc_profile.as_deref(), format, path)?;
        drop(image);

        if !dry_run {
            FileManager::write_in_place(path, &encoded)?;
        }

        Ok(ResavedFile::new(
            path.to_path_buf(),
            Self::format_name(format),
            original_size,
            encoded.len() as u64,
            !dry_run,
        ))
    }

    /// Run [`resave`](Self::resave) on the blocking pool and wait for it
    pub async fn resave_blocking(
        &self,
        path: PathBuf,
        dry_run: bool,
    ) -> Result<ResavedFile, ResaveError> {
        let processor = *self;
        let task_path = path.clone();

        tokio::task::spawn_blocking(move || processor.resave(&task_path, dry_run))
            .await
            .map_err(|e| ResaveError::Task {
                path,
                message: e.to_string(),
            })?
    }
}

fn attach_icc_profile(encoder: &mut impl ImageEncoder, icc_profile: Option<&[u8]>, path: &Path) {
    if let Some(icc) = icc_profile {
        if let Err(e) = encoder.set_icc_profile(icc.to_vec()) {
            warn!("Dropping ICC profile of {}: {}", path.display(), e);
        }
    }
}

fn jpeg_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(image),
        ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8()))
        }
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

fn png_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::L8
        | ColorType::La8
        | ColorType::Rgb8
        | ColorType::Rgba8
        | ColorType::L16
        | ColorType::La16
        | ColorType::Rgb16
        | ColorType::Rgba16 => Cow::Borrowed(image),
        color if color.has_alpha() => Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16())),
        _ => Cow::Owned(DynamicImage::ImageRgb16(image.to_rgb16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PngCompression;
    use crate::test_support::{
        gradient_rgb, gradient_rgba, icc_profile_of, png_color_type, write_image,
        write_indexed_png, write_png_with_icc,
    };
    use tempfile::TempDir;

    #[test]
    fn test_format_for_path() {
        assert_eq!(ImageProcessor::format_for_path(Path::new("a.jpg")).unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageProcessor::format_for_path(Path::new("a.jpeg")).unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageProcessor::format_for_path(Path::new("x/a.png")).unwrap(), ImageFormat::Png);
        assert_eq!(ImageProcessor::format_for_path(Path::new("a.webp")).unwrap(), ImageFormat::WebP);
        assert_eq!(ImageProcessor::format_for_path(Path::new(".png")).unwrap(), ImageFormat::Png);
        assert!(matches!(
            ImageProcessor::format_for_path(Path::new("a.PNG")),
            Err(ResaveError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_encode_produces_requested_format() {
        let processor = ImageProcessor::default();
        let image = gradient_rgba(20, 10);

        for format in [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP] {
            let bytes = processor.encode(&image, None, format, Path::new("t")).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), format);

            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (20, 10));
        }
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let processor = ImageProcessor::default();
        let bytes = processor
            .encode(&gradient_rgba(8, 8), None, ImageFormat::Jpeg, Path::new("t.jpg"))
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_png_keeps_alpha_and_pixels() {
        let processor = ImageProcessor::new(EncodeOptions {
            png_compression: PngCompression::Best,
            ..Default::default()
        });
        let image = gradient_rgba(9, 7);
        let bytes = processor
            .encode(&image, None, ImageFormat::Png, Path::new("t.png"))
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.to_rgba8(), image.to_rgba8());
    }

    #[test]
    fn test_jpeg_quality_changes_output() {
        let image = gradient_rgb(64, 64);
        let low = ImageProcessor::new(EncodeOptions { jpeg_quality: 10, ..Default::default() })
            .encode(&image, None, ImageFormat::Jpeg, Path::new("t.jpg"))
            .unwrap();
        let high = ImageProcessor::new(EncodeOptions { jpeg_quality: 100, ..Default::default() })
            .encode(&image, None, ImageFormat::Jpeg, Path::new("t.jpg"))
            .unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_resave_rewrites_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.png");
        write_image(&path, ImageFormat::Png);
        let before = image::open(&path).unwrap().to_rgb8();

        let resaved = ImageProcessor::default().resave(&path, false).unwrap();

        assert!(resaved.written);
        assert_eq!(resaved.format, "png");
        assert_eq!(resaved.resaved_size, std::fs::metadata(&path).unwrap().len());
        assert_eq!(image::open(&path).unwrap().to_rgb8(), before);
    }

    #[test]
    fn test_resave_uses_name_not_content_for_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("actually_png.jpg");
        gradient_rgb(10, 10).save_with_format(&path, ImageFormat::Png).unwrap();

        ImageProcessor::default().resave(&path, false).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_resave_dry_run_leaves_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        write_image(&path, ImageFormat::Jpeg);
        let original = std::fs::read(&path).unwrap();

        let resaved = ImageProcessor::default().resave(&path, true).unwrap();

        assert!(!resaved.written);
        assert!(resaved.resaved_size > 0);
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_resave_corrupt_file_is_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let err = ImageProcessor::default().resave(&path, false).unwrap_err();

        assert!(matches!(err, ResaveError::Decode { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"definitely not a jpeg");
    }

    #[test]
    fn test_decode_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ImageProcessor::decode(&temp_dir.path().join("gone.png")).unwrap_err();
        assert!(matches!(err, ResaveError::Io { .. }));
    }

    #[test]
    fn test_resave_keeps_icc_profile() {
        let temp_dir = TempDir::new().unwrap();
        let icc: Vec<u8> = (0..300).map(|i| i as u8).collect();

        for name in ["photo.png", "photo.jpg", "photo.webp"] {
            let path = temp_dir.path().join(name);
            write_png_with_icc(&path, &icc);
            assert_eq!(icc_profile_of(&path).as_deref(), Some(icc.as_slice()));

            ImageProcessor::default().resave(&path, false).unwrap();

            assert_eq!(
                icc_profile_of(&path).as_deref(),
                Some(icc.as_slice()),
                "ICC profile lost in {}",
                name
            );
        }
    }

    #[test]
    fn test_resave_without_icc_adds_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.png");
        write_image(&path, ImageFormat::Png);

        ImageProcessor::default().resave(&path, false).unwrap();
        assert!(icc_profile_of(&path).is_none());
    }

    #[test]
    fn test_webp_is_lossy_by_default() {
        let image = gradient_rgb(64, 64);
        let lossy = ImageProcessor::default()
            .encode(&image, None, ImageFormat::WebP, Path::new("t.webp"))
            .unwrap();
        let lossless = ImageProcessor::new(EncodeOptions {
            webp_lossless: true,
            ..Default::default()
        })
        .encode(&image, None, ImageFormat::WebP, Path::new("t.webp"))
        .unwrap();

        // VP8 chunk for lossy, VP8L for lossless
        assert_eq!(&lossy[12..16], b"VP8 ");
        assert_eq!(&lossless[12..16], b"VP8L");

        let decoded = image::load_from_memory(&lossy).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
        let decoded = image::load_from_memory(&lossless).unwrap();
        assert_eq!(decoded.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_webp_quality_changes_output() {
        let image = gradient_rgb(64, 64);
        let low = ImageProcessor::new(EncodeOptions { webp_quality: 5, ..Default::default() })
            .encode(&image, None, ImageFormat::WebP, Path::new("t.webp"))
            .unwrap();
        let high = ImageProcessor::new(EncodeOptions { webp_quality: 100, ..Default::default() })
            .encode(&image, None, ImageFormat::WebP, Path::new("t.webp"))
            .unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_indexed_png_is_rewritten_as_truecolor() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("palette.png");
        write_indexed_png(&path, 64, 64);
        assert_eq!(png_color_type(&path), png::ColorType::Indexed);
        let before = image::open(&path).unwrap().to_rgb8();

        ImageProcessor::default().resave(&path, false).unwrap();

        assert_eq!(png_color_type(&path), png::ColorType::Rgb);
        assert_eq!(image::open(&path).unwrap().to_rgb8(), before);
    }

    #[tokio::test]
    async fn test_resave_blocking() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.webp");
        write_image(&path, ImageFormat::WebP);

        let resaved = ImageProcessor::default()
            .resave_blocking(path.clone(), false)
            .await
            .unwrap();
        assert_eq!(resaved.path, path);
        assert_eq!(resaved.format, "webp");
    }
}
