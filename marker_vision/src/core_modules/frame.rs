// THEORY:
// A `Frame` is one captured square of the screen: a packed byte buffer plus the channel
// layout the capture backend produced. Screen grabbers commonly hand back BGRA, image
// decoders RGBA, so the layout travels with the buffer and is resolved once per pixel
// read. Frames are validated on construction and immutable afterwards; each cycle owns
// exactly one and drops it when the cycle ends.

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::{VisionError, VisionResult};
use image::RgbaImage;

/// Channel order of a packed frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Bgra,
    Rgba,
    Bgr,
    Rgb,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Bgra | PixelLayout::Rgba => 4,
            PixelLayout::Bgr | PixelLayout::Rgb => 3,
        }
    }

    fn pixel(self, bytes: &[u8]) -> Pixel {
        match self {
            PixelLayout::Bgra | PixelLayout::Bgr => Pixel::new(bytes[2], bytes[1], bytes[0]),
            PixelLayout::Rgba | PixelLayout::Rgb => Pixel::new(bytes[0], bytes[1], bytes[2]),
        }
    }
}

/// A single captured frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps a packed buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> VisionResult<Self> {
        let expected = width as usize * height as usize * layout.channels();
        if data.len() != expected {
            return Err(VisionError::invalid_frame(format!(
                "{}x{} {:?} frame needs {} bytes, got {}",
                width,
                height,
                layout,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            layout: PixelLayout::Rgba,
            data: image.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        let layout = self.layout;
        self.data
            .chunks_exact(layout.channels())
            .map(move |bytes| layout.pixel(bytes))
    }

    /// Copies the frame into an opaque RGBA image, e.g. as an overlay canvas.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut raw = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for pixel in self.pixels() {
            raw.extend_from_slice(&[pixel.red, pixel.green, pixel.blue, 255]);
        }
        // Length is width * height * 4 by construction.
        RgbaImage::from_raw(self.width, self.height, raw).unwrap_or_default()
    }
}
