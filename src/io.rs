//! Image sources and sinks around the pure pipeline.
//!
//! - [`ImageSource`]: decode a path into an 8-bit grayscale buffer.
//! - [`EdgeSink`]: accept labelled results for display or storage.
//! - [`ImageInfo`]: size and layout of an image, as decoded or after conversion.
use crate::error::{EdgeError, Result};
use image::{DynamicImage, GrayImage};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Size and layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub bytes_per_pixel: u8,
}

impl ImageInfo {
    pub fn of(image: &DynamicImage) -> Self {
        let color = image.color();
        Self {
            width: image.width(),
            height: image.height(),
            channels: color.channel_count(),
            bytes_per_pixel: color.bytes_per_pixel(),
        }
    }

    /// Layout of the 8-bit grayscale buffer the pipeline actually runs on.
    pub fn gray(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            channels: 1,
            bytes_per_pixel: 1,
        }
    }
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows: {}, cols: {}, channels: {}, bytes per pixel: {}",
            self.height, self.width, self.channels, self.bytes_per_pixel
        )
    }
}

/// Produces grayscale images for the pipeline.
pub trait ImageSource {
    /// # Errors
    ///
    /// [`EdgeError::Decode`] if the path is missing or not a decodable image,
    /// [`EdgeError::EmptyImage`] if it decodes to zero area.
    fn decode(&self, path: &Path) -> Result<GrayImage>;
}

/// Reads files through the `image` crate and converts them to luma.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageSource;

impl FileImageSource {
    /// Decodes `path`, returning the grayscale image and the layout it had
    /// before conversion. Use [`ImageInfo::gray`] for the converted layout.
    ///
    /// Colour input is reduced with the `image` crate's Rec. 709 luma weights
    /// (0.2126 R + 0.7152 G + 0.0722 B), not the 0.299/0.587/0.114 BT.601 mix.
    pub fn decode_with_info(&self, path: &Path) -> Result<(GrayImage, ImageInfo)> {
        let dynamic = image::open(path).map_err(|source| EdgeError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let info = ImageInfo::of(&dynamic);
        if info.width == 0 || info.height == 0 {
            return Err(EdgeError::EmptyImage);
        }
        debug!("decoded {}: {}", path.display(), info);
        Ok((dynamic.into_luma8(), info))
    }
}

impl ImageSource for FileImageSource {
    fn decode(&self, path: &Path) -> Result<GrayImage> {
        self.decode_with_info(path).map(|(image, _)| image)
    }
}

/// Receives labelled results.
pub trait EdgeSink {
    fn show(&mut self, label: &str, image: &GrayImage) -> Result<()>;
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EdgeSink for NullSink {
    fn show(&mut self, _label: &str, _image: &GrayImage) -> Result<()> {
        Ok(())
    }
}

/// Keeps every `(label, image)` pair in arrival order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub frames: Vec<(String, GrayImage)>,
}

impl RecordingSink {
    pub fn labels(&self) -> Vec<&str> {
        self.frames.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn last(&self) -> Option<&GrayImage> {
        self.frames.last().map(|(_, image)| image)
    }
}

impl EdgeSink for RecordingSink {
    fn show(&mut self, label: &str, image: &GrayImage) -> Result<()> {
        self.frames.push((label.to_string(), image.clone()));
        Ok(())
    }
}

/// Writes `<dir>/<label>.png`, slugifying the label.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Creates the output directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{}.png", slug(label)))
    }
}

impl EdgeSink for FileSink {
    fn show(&mut self, label: &str, image: &GrayImage) -> Result<()> {
        let path = self.path_for(label);
        image.save(&path).map_err(EdgeError::Encode)?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}

fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("image");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = FileImageSource
            .decode(Path::new("definitely/not/here.png"))
            .unwrap_err();
        assert!(matches!(err, EdgeError::Decode { .. }));
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            FileImageSource.decode(&path),
            Err(EdgeError::Decode { .. })
        ));
    }

    #[test]
    fn color_file_is_converted_to_gray() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("color.png");
        RgbImage::from_pixel(5, 3, Rgb([200, 200, 200]))
            .save(&path)
            .unwrap();

        let (gray, info) = FileImageSource.decode_with_info(&path).unwrap();
        assert_eq!(gray.dimensions(), (5, 3));
        assert_eq!(gray.get_pixel(0, 0)[0], 200);
        assert_eq!(
            info,
            ImageInfo {
                width: 5,
                height: 3,
                channels: 3,
                bytes_per_pixel: 3
            }
        );
        assert_eq!(
            ImageInfo::gray(&gray),
            ImageInfo {
                width: 5,
                height: 3,
                channels: 1,
                bytes_per_pixel: 1
            }
        );
        assert_eq!(
            ImageInfo::gray(&gray).to_string(),
            "rows: 3, cols: 5, channels: 1, bytes per pixel: 1"
        );
    }

    #[test]
    fn luma_conversion_uses_rec709_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        RgbImage::from_pixel(2, 2, Rgb([255, 0, 0])).save(&path).unwrap();

        let gray = FileImageSource.decode(&path).unwrap();
        // BT.601 would give 76.
        assert_eq!(gray.get_pixel(0, 0)[0], 54);
    }

    #[test]
    fn file_sink_round_trips_through_decode() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("out")).unwrap();
        let img = GrayImage::from_fn(4, 2, |x, y| Luma([(x * 60 + y) as u8]));
        sink.show("Sobel Edge Detector", &img).unwrap();

        let path = sink.path_for("Sobel Edge Detector");
        assert!(path.ends_with("sobel_edge_detector.png"));
        assert_eq!(FileImageSource.decode(&path).unwrap(), img);
    }

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingSink::default();
        sink.show("a", &GrayImage::new(1, 1)).unwrap();
        sink.show("b", &GrayImage::from_pixel(1, 1, Luma([9]))).unwrap();
        assert_eq!(sink.labels(), vec!["a", "b"]);
        assert_eq!(sink.last().unwrap().get_pixel(0, 0)[0], 9);
        NullSink.show("ignored", &GrayImage::new(1, 1)).unwrap();
    }

    #[test]
    fn slugs() {
        assert_eq!(slug("Marr-Hildreth (t=40)"), "marr_hildreth_t_40");
        assert_eq!(slug("--"), "image");
    }
}
