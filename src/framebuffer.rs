//! 1-bit frame buffer
//!
//! Pixels are packed 8 per byte, row-major, most significant bit first:
//! pixel `(x, y)` lives in byte `y * width / 8 + x / 8` under mask
//! `0x80 >> (x % 8)`. This is the layout the controllers read from their RAM.
//!
//! ## Example
//!
//! ```
//! use epd_controller::{Color, FrameBuffer, Geometry};
//!
//! let geometry = match Geometry::new(16, 2) {
//!     Ok(geometry) => geometry,
//!     Err(_) => return,
//! };
//! let mut storage = [0u8; 4];
//! let mut frame = match FrameBuffer::try_new(geometry, &mut storage[..]) {
//!     Ok(frame) => frame,
//!     Err(_) => return,
//! };
//!
//! frame.clear(Color::White);
//! let _ = frame.set_color(0, 0, Color::Black);
//! assert_eq!(frame.as_bytes(), &[0x7F, 0xFF, 0xFF, 0xFF]);
//! ```

use crate::color::{Color, Polarity};
use crate::config::Geometry;
use crate::error::FrameBufferError;

/// Caller-owned 1bpp image sized to a [`Geometry`]
///
/// Generic over the storage so it works with a static array, a borrowed
/// slice or (with the `alloc` feature) a heap vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer<B> {
    geometry: Geometry,
    polarity: Polarity,
    buffer: B,
}

impl<B> FrameBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Wrap `storage`, which must be exactly `geometry.buffer_size()` bytes
    ///
    /// The contents are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `FrameBufferError::BufferSize` if the length does not match.
    pub fn try_new(geometry: Geometry, storage: B) -> Result<Self, FrameBufferError> {
        let required = geometry.buffer_size();
        let provided = storage.as_ref().len();
        if provided != required {
            return Err(FrameBufferError::BufferSize { required, provided });
        }
        Ok(Self {
            geometry,
            polarity: Polarity::default(),
            buffer: storage,
        })
    }

    /// Use `polarity` for the color helpers
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Panel geometry
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Bit polarity used by [`set_color`](Self::set_color) and [`clear`](Self::clear)
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Fill every pixel with `bit`
    pub fn clear_to(&mut self, bit: bool) {
        let fill = if bit { 0xFF } else { 0x00 };
        self.buffer.as_mut().fill(fill);
    }

    /// Fill every pixel with `color`
    pub fn clear(&mut self, color: Color) {
        self.clear_to(color.bit(self.polarity));
    }

    /// Set a single pixel bit
    ///
    /// # Errors
    ///
    /// Returns `FrameBufferError::OutOfBounds` outside the geometry; the
    /// buffer is left unchanged.
    pub fn set_pixel(&mut self, x: u16, y: u16, bit: bool) -> Result<(), FrameBufferError> {
        let (index, mask) = self.locate(x, y)?;
        let byte = &mut self.buffer.as_mut()[index];
        if bit {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        Ok(())
    }

    /// Read a single pixel bit
    pub fn pixel(&self, x: u16, y: u16) -> Result<bool, FrameBufferError> {
        let (index, mask) = self.locate(x, y)?;
        Ok(self.buffer.as_ref()[index] & mask != 0)
    }

    /// Set a pixel to `color`
    pub fn set_color(&mut self, x: u16, y: u16, color: Color) -> Result<(), FrameBufferError> {
        self.set_pixel(x, y, color.bit(self.polarity))
    }

    /// Read the color of a pixel
    pub fn color(&self, x: u16, y: u16) -> Result<Color, FrameBufferError> {
        Ok(Color::from_bit(self.pixel(x, y)?, self.polarity))
    }

    /// Packed bytes, ready to be written to controller RAM
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    /// Mutable access to the packed bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }

    /// Return the backing storage
    pub fn into_inner(self) -> B {
        self.buffer
    }

    fn locate(&self, x: u16, y: u16) -> Result<(usize, u8), FrameBufferError> {
        if !self.geometry.contains(x, y) {
            return Err(FrameBufferError::OutOfBounds { x, y });
        }
        let index = y as usize * self.geometry.bytes_per_row() + x as usize / 8;
        Ok((index, 0x80 >> (x % 8)))
    }
}

#[cfg(feature = "alloc")]
impl FrameBuffer<alloc::vec::Vec<u8>> {
    /// Allocate a blank (white) buffer on the heap
    pub fn allocate(geometry: Geometry) -> Self {
        let polarity = Polarity::default();
        let fill = Color::White.fill_byte(polarity);
        Self {
            geometry,
            polarity,
            buffer: alloc::vec![fill; geometry.buffer_size()],
        }
    }
}
