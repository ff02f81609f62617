use image::{imageops::FilterType, DynamicImage, GrayImage, RgbImage};
use crate::common::config::AnalysisConfig;

/// Single-channel 8-bit intensity field, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuminanceField {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl LuminanceField {
    /// Build a field from raw row-major intensities.
    ///
    /// Returns `None` if `data.len() != width * height`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, data })
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    pub fn from_gray(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.as_raw().clone(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// A field without at least one interior pixel has no Laplacian response.
    pub fn is_degenerate(&self) -> bool {
        self.width < 3 || self.height < 3
    }
}

/// Broadcast luma `Y = 0.299R + 0.587G + 0.114B`, rounded half-up to `u8`.
///
/// Computed in fixed point (`(299R + 587G + 114B + 500) / 1000`) so results
/// are bit-reproducible across platforms. The weights sum to 1000, so the
/// result never exceeds 255.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((weighted + 500) / 1000) as u8
}

pub fn project(frame: &RgbImage) -> LuminanceField {
    let data = frame
        .pixels()
        .map(|p| luma(p[0], p[1], p[2]))
        .collect();

    LuminanceField {
        width: frame.width(),
        height: frame.height(),
        data,
    }
}

/// Project any color layout. Alpha is ignored, grayscale inputs pass through
/// unchanged since R = G = B yields Y equal to the input value.
pub fn project_image(frame: &DynamicImage) -> LuminanceField {
    match frame {
        DynamicImage::ImageLuma8(gray) => LuminanceField::from_gray(gray),
        other => project(&other.to_rgb8()),
    }
}

/// Downsample (when enabled and the size differs) and then project.
pub fn prepare_frame(frame: &DynamicImage, analysis: &AnalysisConfig) -> LuminanceField {
    let needs_resize = analysis.downsample
        && (frame.width() != analysis.width || frame.height() != analysis.height)
        && frame.width() > 0
        && frame.height() > 0;

    if needs_resize {
        tracing::debug!(
            "Resampling {}x{} frame to {}x{} for analysis",
            frame.width(), frame.height(), analysis.width, analysis.height
        );
        let resized = frame.resize_exact(analysis.width, analysis.height, FilterType::Triangle);
        project_image(&resized)
    } else {
        project_image(frame)
    }
}
