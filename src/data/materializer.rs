// ============================================================
// Layer 4 — Sample Materializer
// ============================================================
// Turns one log record into model-ready tensor data. For every
// record the rig captured three frames; the pipeline is:
//
//   resolve  image_dir/<frame>.jpg for the front/left/right refs
//   load     all three JPEGs — a missing or undecodable file is a
//            hard failure, there is no placeholder sample
//   crop     the forward view is cut from the *right* camera frame
//            using the rig's crop rectangle
//   convert  RGB → YCbCr (ITU-R BT.601, the JPEG color space)
//   resize   to the rig's network input size (bilinear)
//   scale    to [0,1] and normalize each channel by the rig's
//            measured mean/std, into planar C×H×W layout
//
// The sample fed to the network is the transformed full right
// frame. The forward-view crop and the left frame go through the
// identical transform; the `stats` command consumes them for the
// channel measurements.
//
// Reference: image crate documentation (imageops)
//            ITU-R BT.601 (YCbCr conversion matrix)

use std::path::PathBuf;

use image::{imageops, imageops::FilterType, RgbImage};

use crate::domain::calibration::RigConfig;
use crate::domain::error::DatasetError;
use crate::domain::record::LogRecord;

/// The three transformed camera views of one record, each a planar
/// 3×H×W f32 plane set in normalized units.
#[derive(Debug, Clone)]
pub struct FrameViews {
    /// Transform of the forward-view crop taken from the right frame
    pub front: Vec<f32>,

    /// Transform of the full left frame
    pub left: Vec<f32>,

    /// Transform of the full right frame — the training feed
    pub right: Vec<f32>,
}

/// Materializes tensor data for log records out of an image directory.
#[derive(Debug, Clone)]
pub struct SampleMaterializer {
    image_dir: PathBuf,
    rig: RigConfig,
}

impl SampleMaterializer {
    /// The image directory must exist up front; a missing directory is
    /// reported here rather than on the first sample access.
    pub fn new(image_dir: impl Into<PathBuf>, rig: RigConfig) -> Result<Self, DatasetError> {
        let image_dir = image_dir.into();
        if !image_dir.is_dir() {
            return Err(DatasetError::PathNotFound(image_dir));
        }
        Ok(Self { image_dir, rig })
    }

    pub fn rig(&self) -> &RigConfig {
        &self.rig
    }

    /// Materialize the (image, steering) training pair for `record`:
    /// the transformed right frame and the calibrated steering value.
    pub fn materialize(&self, record: &LogRecord) -> Result<(Vec<f32>, f32), DatasetError> {
        let views = self.views(record)?;
        let steering = self.rig.steering.normalize(record.steering_raw);
        Ok((views.right, steering))
    }

    /// Transform all three camera views of `record`.
    pub fn views(&self, record: &LogRecord) -> Result<FrameViews, DatasetError> {
        // The front frame is loaded only to validate it; the forward
        // view itself is cut from the right camera frame below.
        let _front_frame = self.load_frame(record.front_frame())?;
        let left = self.load_frame(record.left_frame())?;
        let right = self.load_frame(record.right_frame())?;

        let crop = self.rig.crop;
        let front_view =
            imageops::crop_imm(&right, crop.left, crop.top, crop.width(), crop.height())
                .to_image();

        Ok(FrameViews {
            front: self.transform(&front_view),
            left: self.transform(&left),
            right: self.transform(&right),
        })
    }

    fn load_frame(&self, frame: &str) -> Result<RgbImage, DatasetError> {
        let path = self.image_dir.join(format!("{frame}.jpg"));
        if !path.is_file() {
            return Err(DatasetError::PathNotFound(path));
        }
        let img = image::open(&path).map_err(|source| DatasetError::Decode { path, source })?;
        Ok(img.to_rgb8())
    }

    /// YCbCr → resize → [0,1] scale → per-channel normalize, planar layout.
    fn transform(&self, frame: &RgbImage) -> Vec<f32> {
        let ycbcr = to_ycbcr8(frame);
        let resized = imageops::resize(
            &ycbcr,
            self.rig.input_width,
            self.rig.input_height,
            FilterType::Triangle,
        );

        let (w, h) = (self.rig.input_width as usize, self.rig.input_height as usize);
        let mut planes = vec![0.0f32; 3 * h * w];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                let value = pixel.0[c] as f32 / 255.0;
                planes[c * h * w + y * w + x] =
                    (value - self.rig.channel_mean[c]) / self.rig.channel_std[c];
            }
        }
        planes
    }
}

/// Convert an RGB buffer to 8-bit YCbCr stored in the same
/// three-channel layout (ITU-R BT.601 full range, as JPEG encodes).
fn to_ycbcr8(rgb: &RgbImage) -> RgbImage {
    let mut out = RgbImage::new(rgb.width(), rgb.height());
    for (src, dst) in rgb.pixels().zip(out.pixels_mut()) {
        let [r, g, b] = src.0;
        let (r, g, b) = (r as f32, g as f32, b as f32);
        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        let cb = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
        let cr = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;
        dst.0 = [quantize(y), quantize(cb), quantize(cr)];
    }
    out
}

fn quantize(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::path::Path;
    use tempfile::tempdir;

    /// Write a solid-color JPEG big enough for the default crop rect.
    fn write_frame(dir: &Path, name: &str, color: [u8; 3]) {
        let img = RgbImage::from_pixel(640, 480, Rgb(color));
        img.save(dir.join(format!("{name}.jpg"))).unwrap();
    }

    fn record(front: &str, left: &str, right: &str, steering: i32) -> LogRecord {
        LogRecord::parse(&format!("t {front} {left} {right} {steering}"), 0).unwrap()
    }

    #[test]
    fn test_materialize_produces_input_sized_planes() {
        let dir = tempdir().unwrap();
        write_frame(dir.path(), "front_0", [120, 120, 120]);
        write_frame(dir.path(), "left_0", [60, 60, 60]);
        write_frame(dir.path(), "right_0", [180, 180, 180]);

        let rig = RigConfig::default();
        let materializer = SampleMaterializer::new(dir.path(), rig.clone()).unwrap();
        let (image, steering) = materializer
            .materialize(&record("front_0", "left_0", "right_0", 512))
            .unwrap();

        let expected = 3 * rig.input_height as usize * rig.input_width as usize;
        assert_eq!(image.len(), expected);
        assert!(image.iter().all(|v| v.is_finite()));
        assert_eq!(steering, 0.0);
    }

    #[test]
    fn test_views_cover_all_three_cameras() {
        let dir = tempdir().unwrap();
        write_frame(dir.path(), "front_0", [10, 10, 10]);
        write_frame(dir.path(), "left_0", [10, 10, 10]);
        write_frame(dir.path(), "right_0", [10, 10, 10]);

        let materializer =
            SampleMaterializer::new(dir.path(), RigConfig::default()).unwrap();
        let views = materializer
            .views(&record("front_0", "left_0", "right_0", 500))
            .unwrap();

        assert_eq!(views.front.len(), views.right.len());
        assert_eq!(views.left.len(), views.right.len());
    }

    #[test]
    fn test_missing_frame_fails_with_path_not_found() {
        let dir = tempdir().unwrap();
        write_frame(dir.path(), "left_0", [0, 0, 0]);
        write_frame(dir.path(), "right_0", [0, 0, 0]);

        let materializer =
            SampleMaterializer::new(dir.path(), RigConfig::default()).unwrap();
        let err = materializer
            .materialize(&record("front_0", "left_0", "right_0", 500))
            .unwrap_err();
        assert!(matches!(err, DatasetError::PathNotFound(_)));
    }

    #[test]
    fn test_undecodable_frame_fails_with_decode_error() {
        let dir = tempdir().unwrap();
        write_frame(dir.path(), "front_0", [0, 0, 0]);
        write_frame(dir.path(), "left_0", [0, 0, 0]);
        std::fs::write(dir.path().join("right_0.jpg"), b"not a jpeg at all").unwrap();

        let materializer =
            SampleMaterializer::new(dir.path(), RigConfig::default()).unwrap();
        let err = materializer
            .materialize(&record("front_0", "left_0", "right_0", 500))
            .unwrap_err();
        assert!(matches!(err, DatasetError::Decode { .. }));
    }

    #[test]
    fn test_missing_image_dir_fails_at_construction() {
        let dir = tempdir().unwrap();
        let err = SampleMaterializer::new(dir.path().join("nope"), RigConfig::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::PathNotFound(_)));
    }

    #[test]
    fn test_ycbcr_matches_bt601_reference_points() {
        let white = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        assert_eq!(to_ycbcr8(&white).get_pixel(0, 0).0, [255, 128, 128]);

        let black = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        assert_eq!(to_ycbcr8(&black).get_pixel(0, 0).0, [0, 128, 128]);

        let red = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        assert_eq!(to_ycbcr8(&red).get_pixel(0, 0).0, [76, 85, 255]);
    }
}
