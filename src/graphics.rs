//! Graphics support via embedded-graphics
//!
//! [`FrameBuffer`] implements the
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) trait, so
//! every embedded-graphics primitive, font and image can be drawn into it
//! before handing it to [`Display::display`](crate::display::Display::display).
//! Pixels outside the panel are clipped.
//!
//! ## Example
//!
//! ```rust
//! use embedded_graphics::{
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//! use epd_controller::{Color, FrameBuffer, Geometry};
//!
//! let geometry = match Geometry::new(128, 250) {
//!     Ok(geometry) => geometry,
//!     Err(_) => return,
//! };
//! let mut storage = [0xFFu8; 4000];
//! let mut frame = match FrameBuffer::try_new(geometry, &mut storage[..]) {
//!     Ok(frame) => frame,
//!     Err(_) => return,
//! };
//!
//! let _ = Rectangle::new(Point::new(10, 10), Size::new(100, 50))
//!     .into_styled(PrimitiveStyle::with_fill(Color::Black))
//!     .draw(&mut frame);
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
};

use crate::color::Color;
use crate::framebuffer::FrameBuffer;

impl<B> DrawTarget for FrameBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
                continue;
            };
            // Clipped
            let _ = self.set_color(x, y, color);
        }

        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        FrameBuffer::clear(self, color);
        Ok(())
    }
}

impl<B> OriginDimensions for FrameBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let geometry = self.geometry();
        Size::new(u32::from(geometry.width), u32::from(geometry.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Polarity;
    use crate::config::Geometry;
    use embedded_graphics::{
        pixelcolor::BinaryColor,
        prelude::*,
        primitives::{Line, PrimitiveStyle, Rectangle},
    };

    fn frame() -> FrameBuffer<[u8; 32]> {
        FrameBuffer::try_new(Geometry::new(16, 16).unwrap(), [0xFF; 32]).unwrap()
    }

    #[test]
    fn test_size_matches_geometry() {
        assert_eq!(frame().size(), Size::new(16, 16));
    }

    #[test]
    fn test_filled_rectangle() {
        let mut frame = frame();
        Rectangle::new(Point::new(0, 1), Size::new(8, 2))
            .into_styled(PrimitiveStyle::with_fill(Color::Black))
            .draw(&mut frame)
            .unwrap();

        let bytes = frame.as_bytes();
        assert_eq!(bytes[0], 0xFF);
        assert_eq!(bytes[2], 0x00);
        assert_eq!(bytes[3], 0xFF);
        assert_eq!(bytes[4], 0x00);
        assert_eq!(bytes[6], 0xFF);
    }

    #[test]
    fn test_out_of_range_pixels_are_clipped() {
        let mut frame = frame();
        Line::new(Point::new(-5, 0), Point::new(20, 0))
            .into_styled(PrimitiveStyle::with_stroke(Color::Black, 1))
            .draw(&mut frame)
            .unwrap();

        assert_eq!(&frame.as_bytes()[..2], &[0x00, 0x00]);
        assert!(frame.as_bytes()[2..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_clear_uses_polarity() {
        let mut frame = frame().with_polarity(Polarity::BlackIsOne);
        DrawTarget::clear(&mut frame, Color::Black).unwrap();
        assert!(frame.as_bytes().iter().all(|&b| b == 0xFF));
        DrawTarget::clear(&mut frame, Color::White).unwrap();
        assert!(frame.as_bytes().iter().all(|&b| b == 0x00));
    }

    #[test]
    fn test_binary_color_draws_black() {
        let mut frame = frame();
        Pixel(Point::new(1, 0), BinaryColor::On)
            .draw(&mut frame.color_converted::<BinaryColor>())
            .unwrap();
        assert_eq!(frame.as_bytes()[0], 0b1011_1111);
    }
}
