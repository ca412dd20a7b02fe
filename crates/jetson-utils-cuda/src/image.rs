//! Mapped images.

use std::fmt;
use std::str::FromStr;

use jetson_utils_core::{CallArgs, NativeError, NativeType, Value};

use crate::memory::CudaMemory;

/// Registered type name of images.
pub const IMAGE_TYPE: &str = "cudaImage";

/// Pixel formats understood by `cudaAllocMapped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Rgb8,
    Rgba8,
    Rgb32f,
    Rgba32f,
    Gray8,
    Gray32f,
}

impl ImageFormat {
    /// Every supported format.
    pub const ALL: [ImageFormat; 6] = [
        ImageFormat::Rgb8,
        ImageFormat::Rgba8,
        ImageFormat::Rgb32f,
        ImageFormat::Rgba32f,
        ImageFormat::Gray8,
        ImageFormat::Gray32f,
    ];

    /// Size of one pixel in bytes.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ImageFormat::Rgb8 => 3,
            ImageFormat::Rgba8 => 4,
            ImageFormat::Rgb32f => 12,
            ImageFormat::Rgba32f => 16,
            ImageFormat::Gray8 => 1,
            ImageFormat::Gray32f => 4,
        }
    }

    /// Name used by scripts.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Rgb8 => "rgb8",
            ImageFormat::Rgba8 => "rgba8",
            ImageFormat::Rgb32f => "rgb32f",
            ImageFormat::Rgba32f => "rgba32f",
            ImageFormat::Gray8 => "gray8",
            ImageFormat::Gray32f => "gray32f",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = NativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageFormat::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| NativeError::invalid(format!("unsupported image format '{s}'")))
    }
}

/// A mapped image: dimensions and format over a mapped allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CudaImage {
    memory: CudaMemory,
    width: usize,
    height: usize,
    format: ImageFormat,
}

impl NativeType for CudaImage {
    const TYPE_NAME: &'static str = IMAGE_TYPE;
}

impl CudaImage {
    /// Allocate a zeroed mapped image.
    pub fn alloc(width: usize, height: usize, format: ImageFormat) -> Result<Self, NativeError> {
        let size = width
            .checked_mul(height)
            .and_then(|px| px.checked_mul(format.bytes_per_pixel()))
            .ok_or_else(|| NativeError::invalid(format!("image {width}x{height} is too large")))?;
        Ok(Self {
            memory: CudaMemory::alloc(size, true)?,
            width,
            height,
            format,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Backing allocation.
    pub fn memory(&self) -> &CudaMemory {
        &self.memory
    }

    pub(crate) fn memory_mut(&mut self) -> &mut CudaMemory {
        &mut self.memory
    }
}

fn with_image<R>(args: &CallArgs, f: impl FnOnce(&CudaImage) -> R) -> Result<R, NativeError> {
    let obj = args
        .get(0)
        .ok_or_else(|| NativeError::invalid("missing self"))?
        .as_native()?;
    obj.with(|image: &mut CudaImage| f(&*image))
}

/// `cudaImage.width(self)`
pub fn image_width(args: &CallArgs) -> Result<Value, NativeError> {
    with_image(args, |i| Value::from_size(i.width()))?
}

/// `cudaImage.height(self)`
pub fn image_height(args: &CallArgs) -> Result<Value, NativeError> {
    with_image(args, |i| Value::from_size(i.height()))?
}

/// `cudaImage.format(self)`
pub fn image_format(args: &CallArgs) -> Result<Value, NativeError> {
    with_image(args, |i| Value::from(i.format().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetson_utils_core::NativeObject;

    #[test]
    fn format_parsing() {
        assert_eq!("rgba32f".parse::<ImageFormat>().unwrap(), ImageFormat::Rgba32f);
        assert_eq!("GRAY8".parse::<ImageFormat>().unwrap(), ImageFormat::Gray8);
        assert!("yuv".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn image_size_follows_format() {
        let image = CudaImage::alloc(4, 2, ImageFormat::Rgba8).unwrap();
        assert_eq!(image.memory().size(), 32);
        assert!(image.memory().is_mapped());
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(CudaImage::alloc(0, 10, ImageFormat::Rgb8).is_err());
    }

    #[test]
    fn overflowing_dimensions_rejected() {
        let err = CudaImage::alloc(usize::MAX, 2, ImageFormat::Rgb8).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn accessor_methods() {
        let image = CudaImage::alloc(640, 480, ImageFormat::Gray32f).unwrap();
        let args = CallArgs::positional([Value::from(NativeObject::new(image))]);
        assert_eq!(image_width(&args).unwrap().as_int().unwrap(), 640);
        assert_eq!(image_height(&args).unwrap().as_int().unwrap(), 480);
        assert_eq!(image_format(&args).unwrap().as_str().unwrap(), "gray32f");
    }

    #[test]
    fn accessor_on_plain_memory_names_registered_types() {
        let memory = CudaMemory::alloc(4, false).unwrap();
        let args = CallArgs::positional([Value::from(NativeObject::new(memory))]);
        let err = image_width(&args).unwrap_err();
        assert_eq!(err.to_string(), "expected cudaImage, found cudaMemory");
    }
}
