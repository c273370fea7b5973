//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`]),
//! frame buffer access ([`FrameBufferError`]) and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`FrameBufferError`] - Local frame buffer validation, never reaches the bus
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! ## Example
//!
//! ```
//! use epd_controller::{Builder, BuilderError, Geometry};
//!
//! // Missing geometry
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingGeometry)));
//!
//! // Width must be a multiple of 8
//! let result = Geometry::new(122, 250);
//! assert!(result.is_err());
//! ```

use crate::interface::DisplayInterface;
use crate::power::{Operation, PowerState, Rejected};

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
/// Every variant except [`Error::BusFault`] and [`Error::ControllerTimeout`]
/// is detected before any bus I/O happens.
pub enum Error<I: DisplayInterface> {
    /// The bus or a control pin failed
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`]
    /// implementation. The driver does not retry.
    BusFault(I::Error),
    /// The busy line did not go idle within the allotted time
    ///
    /// Fatal for the current operation. The driver falls back to
    /// [`PowerState::Uninitialized`]; call `init()` before anything else.
    ControllerTimeout {
        /// Milliseconds spent waiting
        waited_ms: u32,
    },
    /// The power-state machine rejected the operation
    InvalidState {
        /// State at the time of the call
        state: PowerState,
        /// Rejected operation
        operation: Operation,
    },
    /// Pixel coordinates outside the panel geometry
    OutOfBounds {
        /// X coordinate
        x: u16,
        /// Y coordinate
        y: u16,
    },
    /// A buffer has the wrong length
    BufferSize {
        /// Required size in bytes
        required: usize,
        /// Provided size in bytes
        provided: usize,
    },
    /// The frame buffer was built for a different geometry than the display
    GeometryMismatch,
    /// Region is empty, not byte-aligned or outside the panel
    InvalidRegion {
        /// X coordinate
        x: u16,
        /// Y coordinate
        y: u16,
        /// Width
        w: u16,
        /// Height
        h: u16,
    },
    /// The controller table has no command sequence for this operation
    Unsupported {
        /// Requested operation
        operation: Operation,
    },
}

impl<I: DisplayInterface> core::fmt::Debug for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusFault(e) => f.debug_tuple("BusFault").field(e).finish(),
            Self::ControllerTimeout { waited_ms } => f
                .debug_struct("ControllerTimeout")
                .field("waited_ms", waited_ms)
                .finish(),
            Self::InvalidState { state, operation } => f
                .debug_struct("InvalidState")
                .field("state", state)
                .field("operation", operation)
                .finish(),
            Self::OutOfBounds { x, y } => f
                .debug_struct("OutOfBounds")
                .field("x", x)
                .field("y", y)
                .finish(),
            Self::BufferSize { required, provided } => f
                .debug_struct("BufferSize")
                .field("required", required)
                .field("provided", provided)
                .finish(),
            Self::GeometryMismatch => f.write_str("GeometryMismatch"),
            Self::InvalidRegion { x, y, w, h } => f
                .debug_struct("InvalidRegion")
                .field("x", x)
                .field("y", y)
                .field("w", w)
                .field("h", h)
                .finish(),
            Self::Unsupported { operation } => f
                .debug_struct("Unsupported")
                .field("operation", operation)
                .finish(),
        }
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusFault(e) => write!(f, "Bus fault: {e:?}"),
            Self::ControllerTimeout { waited_ms } => {
                write!(f, "Controller still busy after {waited_ms}ms")
            }
            Self::InvalidState { state, operation } => {
                write!(f, "{operation:?} is not allowed in state {state:?}")
            }
            Self::OutOfBounds { x, y } => write!(f, "Pixel ({x}, {y}) is outside the panel"),
            Self::BufferSize { required, provided } => {
                write!(
                    f,
                    "Buffer size mismatch: required {required} bytes, provided {provided}"
                )
            }
            Self::GeometryMismatch => write!(f, "Frame buffer geometry does not match display"),
            Self::InvalidRegion { x, y, w, h } => {
                write!(f, "Invalid region: x={x}, y={y}, w={w}, h={h}")
            }
            Self::Unsupported { operation } => {
                write!(f, "{operation:?} is not supported by this controller")
            }
        }
    }
}

impl<I: DisplayInterface> core::error::Error for Error<I> {}

impl<I: DisplayInterface> From<FrameBufferError> for Error<I> {
    fn from(err: FrameBufferError) -> Self {
        match err {
            FrameBufferError::OutOfBounds { x, y } => Self::OutOfBounds { x, y },
            FrameBufferError::BufferSize { required, provided } => {
                Self::BufferSize { required, provided }
            }
        }
    }
}

impl<I: DisplayInterface> From<Rejected> for Error<I> {
    fn from(rejected: Rejected) -> Self {
        Self::InvalidState {
            state: rejected.state,
            operation: rejected.operation,
        }
    }
}

/// Errors raised by [`FrameBuffer`](crate::framebuffer::FrameBuffer) accessors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameBufferError {
    /// Pixel coordinates outside the geometry; the buffer is unchanged
    OutOfBounds {
        /// X coordinate
        x: u16,
        /// Y coordinate
        y: u16,
    },
    /// Storage length differs from `bytes_per_row * height`
    BufferSize {
        /// Required size in bytes
        required: usize,
        /// Provided size in bytes
        provided: usize,
    },
}

impl core::fmt::Display for FrameBufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds { x, y } => write!(f, "Pixel ({x}, {y}) is outside the panel"),
            Self::BufferSize { required, provided } => write!(
                f,
                "Frame buffer must be {required} bytes, provided {provided}"
            ),
        }
    }
}

impl core::error::Error for FrameBufferError {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Geometry was not specified
    ///
    /// [`Builder::geometry()`](crate::config::Builder::geometry) must be called before building.
    MissingGeometry,
    /// Controller table was not specified
    ///
    /// [`Builder::controller()`](crate::config::Builder::controller) must be called before building.
    MissingController,
    /// Width is zero or not a multiple of 8, or height is zero
    InvalidGeometry {
        /// Requested width
        width: u16,
        /// Requested height
        height: u16,
    },
    /// Geometry is larger than the controller can drive
    GeometryExceedsController {
        /// Requested width
        width: u16,
        /// Requested height
        height: u16,
        /// Controller maximum width
        max_width: u16,
        /// Controller maximum height
        max_height: u16,
    },
    /// Width does not fit the controller's X address or resolution register
    WidthExceedsAddressing {
        /// Requested width
        width: u16,
        /// Widest encodable geometry
        max_width: u16,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingGeometry => write!(f, "Geometry must be specified"),
            Self::MissingController => write!(f, "Controller table must be specified"),
            Self::InvalidGeometry { width, height } => write!(
                f,
                "Invalid geometry {width}x{height} (width must be a non-zero multiple of 8, height non-zero)"
            ),
            Self::GeometryExceedsController {
                width,
                height,
                max_width,
                max_height,
            } => write!(
                f,
                "Geometry {width}x{height} exceeds controller maximum {max_width}x{max_height}"
            ),
            Self::WidthExceedsAddressing { width, max_width } => write!(
                f,
                "Width {width} does not fit the address registers (max {max_width})"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
