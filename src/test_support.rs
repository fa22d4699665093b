//! Fixture helpers shared by the unit tests.

use image::codecs::png::PngEncoder;
use image::{
    DynamicImage, ImageDecoder, ImageEncoder, ImageFormat, ImageReader, Rgb, RgbImage, Rgba,
    RgbaImage,
};
use std::io::BufWriter;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Small gradient so encoders have something non-trivial to compress
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 17 % 256) as u8, (y * 29 % 256) as u8, ((x + y) * 7 % 256) as u8])
    }))
}

pub fn gradient_rgba(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 13 % 256) as u8, (y * 31 % 256) as u8, 90, ((x * y) % 256) as u8])
    }))
}

/// Write a real image file at `path`, creating parent directories
pub fn write_image(path: &Path, format: ImageFormat) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    gradient_rgb(16, 12).save_with_format(path, format).unwrap();
}

/// Write PNG bytes carrying `icc` as an iCCP chunk, whatever the file name says
pub fn write_png_with_icc(path: &Path, icc: &[u8]) {
    let mut bytes = Vec::new();
    let mut encoder = PngEncoder::new(&mut bytes);
    encoder.set_icc_profile(icc.to_vec()).unwrap();
    gradient_rgb(16, 12).write_with_encoder(encoder).unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// ICC profile embedded in the file at `path`, as the decoder reports it
pub fn icc_profile_of(path: &Path) -> Option<Vec<u8>> {
    ImageReader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .into_decoder()
        .unwrap()
        .icc_profile()
        .unwrap()
}

/// Write a 16-colour palette PNG
pub fn write_indexed_png(path: &Path, width: u32, height: u32) {
    let palette: Vec<u8> = (0..16u8).flat_map(|i| [i * 16, 255 - i * 16, i * 8]).collect();
    let indices: Vec<u8> = (0..width * height)
        .map(|i| ((i % width) / 4 + (i / width) / 4) as u8 % 16)
        .collect();

    let file = std::fs::File::create(path).unwrap();
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&indices).unwrap();
    writer.finish().unwrap();
}

pub fn png_color_type(path: &Path) -> png::ColorType {
    let file = std::fs::File::open(path).unwrap();
    let reader = png::Decoder::new(file).read_info().unwrap();
    reader.info().color_type
}

/// Push a file's mtime into the past so a rewrite is always observable
pub fn age_file(path: &Path) {
    let past = SystemTime::now() - Duration::from_secs(3600);
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(past)
        .unwrap();
}

pub fn mtime(path: &Path) -> SystemTime {
    std::fs::metadata(path).unwrap().modified().unwrap()
}

/// Every path under `root` (files and directories), sorted
pub fn list_tree(root: &Path) -> Vec<std::path::PathBuf> {
    let mut paths: Vec<_> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap().into_path())
        .collect();
    paths.sort();
    paths
}
