//! Colors and bit polarity for monochrome e-paper panels
//!
//! Frame buffers store one bit per pixel. Which bit value means "white" is a
//! property of the controller, captured by [`Polarity`].
//!
//! | Polarity      | White | Black |
//! |---------------|-------|-------|
//! | `WhiteIsOne`  | 1     | 0     |
//! | `BlackIsOne`  | 0     | 1     |
//!
//! ## Example
//!
//! ```
//! use epd_controller::{Color, Polarity};
//!
//! assert!(Color::White.bit(Polarity::WhiteIsOne));
//! assert!(!Color::White.bit(Polarity::BlackIsOne));
//! assert_eq!(Color::Black.fill_byte(Polarity::WhiteIsOne), 0x00);
//! ```

/// Colors of a black/white panel
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    /// Black pixels
    Black,
    /// White pixels
    White,
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::prelude::PixelColor for Color {
    type Raw = embedded_graphics_core::pixelcolor::raw::RawU1;
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::BinaryColor> for Color {
    fn from(color: embedded_graphics_core::pixelcolor::BinaryColor) -> Self {
        match color {
            embedded_graphics_core::pixelcolor::BinaryColor::On => Self::Black,
            embedded_graphics_core::pixelcolor::BinaryColor::Off => Self::White,
        }
    }
}

/// Bit value the controller interprets as white
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Polarity {
    /// 1 = white, 0 = black (SSD16xx BW RAM)
    #[default]
    WhiteIsOne,
    /// 1 = black, 0 = white
    BlackIsOne,
}

impl Polarity {
    /// Bit value used for a blank (white) panel
    pub fn blank_bit(self) -> bool {
        Color::White.bit(self)
    }
}

impl Color {
    /// Bit value for this color under `polarity`
    pub fn bit(self, polarity: Polarity) -> bool {
        match (self, polarity) {
            (Self::White, Polarity::WhiteIsOne) | (Self::Black, Polarity::BlackIsOne) => true,
            (Self::Black, Polarity::WhiteIsOne) | (Self::White, Polarity::BlackIsOne) => false,
        }
    }

    /// Byte with all eight pixels set to this color
    pub fn fill_byte(self, polarity: Polarity) -> u8 {
        if self.bit(polarity) { 0xFF } else { 0x00 }
    }

    /// Color stored by `bit` under `polarity`
    pub fn from_bit(bit: bool, polarity: Polarity) -> Self {
        if bit == Self::White.bit(polarity) {
            Self::White
        } else {
            Self::Black
        }
    }
}
