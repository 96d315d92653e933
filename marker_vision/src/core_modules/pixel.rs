// THEORY:
// The `Pixel` module is the most fundamental unit of the detection pipeline. It is a
// "dumb" data container for a single color sample plus the two single-pixel transforms
// the segmentation stage needs: a perceptual (HSV) view used to decide whether the
// pixel belongs to the marker color, and a luma view used for intensity thresholding.
//
// Key principles:
// 1) Single-pixel scope: nothing here reads neighbors. Neighborhood math (local means,
//    thresholds) lives in `mask`.
// 2) The HSV encoding follows the common 8-bit convention used by capture tooling:
//    hue is halved into 0..180 so it fits a byte, saturation and value span 0..=255.
//    Marker color ranges are authored in this convention.
// 3) Channel order is resolved by the `Frame`, never here. A `Pixel` is always RGB.

pub mod pixel {
    use serde::{Deserialize, Serialize};

    pub type Channel = u8;
    pub type Luma = u8;
    pub type HueHalfDegrees = u8;

    /// Hue is stored in half-degrees, so the full circle is 180 units.
    pub const HUE_RANGE: u16 = 180;

    /// A single RGB color sample.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    /// A color in the 8-bit hue/saturation/value encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Hsv {
        /// Hue in half-degrees, 0..180.
        pub hue: HueHalfDegrees,
        /// Saturation, 0..=255.
        pub saturation: Channel,
        /// Value (brightest channel), 0..=255.
        pub value: Channel,
    }

    impl Hsv {
        pub const fn new(hue: HueHalfDegrees, saturation: Channel, value: Channel) -> Self {
            Self {
                hue,
                saturation,
                value,
            }
        }
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        /// Converts to the 8-bit HSV encoding.
        ///
        /// - Value is the brightest channel.
        /// - Saturation is chroma scaled by value into 0..=255 (zero for black).
        /// - Hue is the angle on the color wheel halved into 0..180, zero for grays.
        pub fn hsv(&self) -> Hsv {
            let red = self.red as i32;
            let green = self.green as i32;
            let blue = self.blue as i32;

            let value = red.max(green).max(blue);
            let minimum = red.min(green).min(blue);
            let chroma = value - minimum;

            let saturation = if value == 0 {
                0
            } else {
                (chroma as f32 * 255.0 / value as f32).round() as i32
            };

            let hue_degrees = if chroma == 0 {
                0.0
            } else {
                let (base_difference, sector_offset) = if value == red {
                    (green - blue, 0.0)
                } else if value == green {
                    (blue - red, 120.0)
                } else {
                    (red - green, 240.0)
                };
                let degrees = base_difference as f32 * 60.0 / chroma as f32 + sector_offset;
                if degrees < 0.0 { degrees + 360.0 } else { degrees }
            };

            let mut hue = (hue_degrees / 2.0).round() as u16;
            if hue >= HUE_RANGE {
                hue -= HUE_RANGE;
            }

            Hsv {
                hue: hue as HueHalfDegrees,
                saturation: saturation.clamp(0, 255) as Channel,
                value: value as Channel,
            }
        }

        /// Rec. 601 luma, rounded to the nearest byte.
        pub fn luma(&self) -> Luma {
            let luma = 0.299_f64 * self.red as f64
                + 0.587_f64 * self.green as f64
                + 0.114_f64 * self.blue as f64;
            luma.round().clamp(0.0, 255.0) as Luma
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn magenta_lands_in_the_upper_hue_band() {
        let hsv = Pixel::new(200, 60, 200).hsv();
        assert_eq!(hsv, Hsv::new(150, 179, 200));
    }

    #[test]
    fn primaries_map_to_halved_hue_angles() {
        assert_eq!(Pixel::new(255, 0, 0).hsv().hue, 0);
        assert_eq!(Pixel::new(0, 255, 0).hsv().hue, 60);
        assert_eq!(Pixel::new(0, 0, 255).hsv().hue, 120);
    }

    #[test]
    fn grays_have_no_hue_or_saturation() {
        let hsv = Pixel::new(90, 90, 90).hsv();
        assert_eq!(hsv, Hsv::new(0, 0, 90));
        assert_eq!(Pixel::default().hsv(), Hsv::default());
    }

    #[test]
    fn luma_spans_the_full_byte_range() {
        assert_eq!(Pixel::new(0, 0, 0).luma(), 0);
        assert_eq!(Pixel::new(255, 255, 255).luma(), 255);
        assert_eq!(Pixel::new(200, 60, 200).luma(), 118);
    }
}
