//! Table-driven e-paper display driver
//!
//! A driver for monochrome e-paper controllers (SSD1680, SSD1677, UC8151 and
//! relatives) built around an explicit power-state machine. Each panel model
//! is a static [`ControllerTable`] of command sequences; the driver itself
//! never branches on the model.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Bounded busy waits with exact timeout accounting
//! - Full, partial and region refreshes
//! - Deep sleep, light sleep and advisory power off
//! - Heap-backed frame buffers (with `alloc` feature)
//!
//! ## Power states
//!
//! Every operation is checked against the current [`PowerState`] before any
//! bus traffic. Out-of-order calls return [`Error::InvalidState`] and leave
//! the bus untouched. A busy timeout or bus fault in the middle of an
//! operation drops the driver back to [`PowerState::Uninitialized`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use epd_controller::{Builder, Display, FrameBuffer, Geometry, Interface, RefreshMode, panels};
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let spi = MockSpi;
//! # let dc = MockPin;
//! # let rst = MockPin;
//! # let busy = MockPin;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(spi, dc, rst, busy);
//! let geometry = match Geometry::new(128, 250) {
//!     Ok(geometry) => geometry,
//!     Err(_) => return,
//! };
//! let config = match Builder::new()
//!     .geometry(geometry)
//!     .controller(&panels::SSD1680_2IN13)
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display = Display::new(interface, config);
//! let mut storage = [0u8; 4000];
//! let mut frame = match FrameBuffer::try_new(geometry, &mut storage[..]) {
//!     Ok(frame) => frame,
//!     Err(_) => return,
//! };
//!
//! let _ = display.init(&mut delay);
//! let _ = display.clear(&mut frame, &mut delay);
//! let _ = frame.set_pixel(10, 20, !display.blank_frame_bit());
//! let _ = display.display(&frame, RefreshMode::Full, &mut delay);
//! let _ = display.sleep(&mut delay);
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// Bounded busy-line polling
pub mod busy;
/// Colors and bit polarity
pub mod color;
/// Command values and controller opcodes
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// 1-bit frame buffer
pub mod framebuffer;
/// Hardware interface abstraction
pub mod interface;
/// Command tables for supported panels
pub mod panels;
/// Power-state machine
pub mod power;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use busy::BusyGate;
pub use color::{Color, Polarity};
pub use command::{Command, Step};
pub use config::{
    Addressing, BaseRam, Builder, BusyPolarity, Config, ControllerTable,
    DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REFRESH_TIMEOUT_MS, Geometry,
    InitStep, LightSleep, PartialRefresh, ResetTiming,
};
pub use display::{Display, RefreshMode, Region};
pub use error::{BuilderError, Error, FrameBufferError};
pub use framebuffer::FrameBuffer;
pub use interface::{DisplayInterface, Interface, InterfaceError};
pub use power::{Operation, PowerState};
