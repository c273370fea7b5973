//! Display configuration types and builder
//!
//! A [`Config`] pairs a validated [`Geometry`] with a static
//! [`ControllerTable`] describing the command set of one panel model, plus
//! the busy-wait timing used by the driver.

use crate::color::Polarity;
use crate::command::Step;
pub use crate::error::BuilderError;

/// Default interval between busy-line samples in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// Default busy timeout for register writes and resets in milliseconds
pub const DEFAULT_COMMAND_TIMEOUT_MS: u32 = 5_000;

/// Default busy timeout for refreshes in milliseconds
pub const DEFAULT_REFRESH_TIMEOUT_MS: u32 = 30_000;

/// Panel geometry in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Width in pixels (source outputs), a multiple of 8
    pub width: u16,
    /// Height in pixels (gate outputs)
    pub height: u16,
}

impl Geometry {
    /// Create a new geometry with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidGeometry` if:
    /// - width == 0 or width % 8 != 0 (pixels are packed 8 per byte)
    /// - height == 0
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width % 8 != 0 || height == 0 {
            return Err(BuilderError::InvalidGeometry { width, height });
        }
        Ok(Self { width, height })
    }

    /// Bytes in one packed row
    pub fn bytes_per_row(&self) -> usize {
        self.width as usize / 8
    }

    /// Calculate required buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.bytes_per_row() * self.height as usize
    }

    /// Whether the pixel lies inside the panel
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }
}

/// Busy line level meaning "controller is processing"
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BusyPolarity {
    /// BUSY high while processing (SSD16xx)
    #[default]
    ActiveHigh,
    /// BUSY low while processing (UC81xx)
    ActiveLow,
}

/// Hardware reset pulse timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetTiming {
    /// Time RST is held low, in microseconds
    pub pulse_us: u32,
    /// Time after RST is released before BUSY is sampled, in microseconds
    pub settle_us: u32,
}

/// Unit and width of RAM X addresses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum XAddress {
    /// One byte per address, counted in bytes (pixel / 8)
    #[default]
    Bytes,
    /// Two bytes (LSB first) per address, counted in pixels
    Pixels,
}

/// Driver output control register (gate count and scan direction)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverOutput {
    /// Opcode of the register
    pub opcode: u8,
    /// Gate scanning byte appended after the gate count
    pub scan: u8,
}

/// RAM window registers of a window-addressed controller
///
/// The X/Y ranges are only rewritten when a write targets a different area
/// than the last one programmed; the counters are set before every write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RamWindow {
    /// X start/end opcode
    pub x_range: u8,
    /// Y start/end opcode
    pub y_range: u8,
    /// X counter opcode
    pub x_counter: u8,
    /// Y counter opcode
    pub y_counter: u8,
    /// Encoding of X addresses
    pub x_address: XAddress,
}

/// How the controller learns which RAM area to write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Addressing {
    /// Explicit X/Y windows and counters (SSD16xx)
    ///
    /// Supports partial region refreshes.
    RamWindow(RamWindow),
    /// A resolution register written once at init; frames are always whole (UC81xx)
    Resolution {
        /// Opcode of the resolution register
        opcode: u8,
    },
}

impl Addressing {
    /// Widest geometry the address registers can encode
    pub fn max_width(&self) -> u16 {
        match self {
            Self::RamWindow(RamWindow {
                x_address: XAddress::Bytes,
                ..
            }) => 256 * 8,
            Self::RamWindow(_) => u16::MAX,
            Self::Resolution { .. } => u16::from(u8::MAX),
        }
    }
}

/// One entry of the init sequence
///
/// Geometry-derived registers are placeholders so each table decides where
/// they go between its fixed commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStep {
    /// A fixed command
    Send(Step),
    /// Gate count from the geometry height
    GateCount(DriverOutput),
    /// Full-panel RAM X/Y ranges, or the resolution register
    Window,
}

/// Previous-frame RAM used by differential refreshes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseRam {
    /// Opcode that writes the previous frame
    pub opcode: u8,
    /// Write every full refresh to base RAM as well
    pub mirror_full: bool,
}

/// Partial refresh support of a controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartialRefresh {
    /// Mode-set steps, issued before the first partial refresh after init or
    /// after a full refresh
    pub enter: &'static [Step],
    /// Steps that undo `enter`, issued before the next full refresh
    pub exit: &'static [Step],
    /// Steps that trigger a partial refresh
    pub display_update_partial: &'static [Step],
    /// Re-write the frame to base RAM after each partial refresh
    pub sync_base: bool,
}

/// Light sleep behavior of a controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightSleep {
    /// No register-retaining sleep; light sleep is deep sleep
    AliasDeepSleep,
    /// Register-retaining sleep
    Retained {
        /// Steps that enter light sleep
        enter: &'static [Step],
        /// Steps that resume from light sleep without reinitialization
        wake: &'static [Step],
        /// Whether a refresh may be requested while sleeping (the driver wakes first)
        refresh_wakes: bool,
    },
}

impl LightSleep {
    /// Whether the controller has a distinct, register-retaining sleep state
    pub fn is_retained(&self) -> bool {
        matches!(self, Self::Retained { .. })
    }

    /// Whether a refresh request implicitly wakes the controller
    pub fn refresh_wakes(&self) -> bool {
        matches!(
            self,
            Self::Retained {
                refresh_wakes: true,
                ..
            }
        )
    }
}

/// Static command table of one controller/panel model
///
/// Fields are named after the logical operation they implement. The driver
/// only walks these tables; it never branches on the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerTable {
    /// Human readable model name
    pub name: &'static str,
    /// Maximum source outputs
    pub max_width: u16,
    /// Maximum gate outputs
    pub max_height: u16,
    /// Bit value the RAM treats as white
    pub polarity: Polarity,
    /// Busy line polarity
    pub busy_polarity: BusyPolarity,
    /// Hardware reset pulse
    pub reset: ResetTiming,
    /// Init sequence run after the hardware reset
    pub power_on: &'static [InitStep],
    /// RAM addressing scheme
    pub addressing: Addressing,
    /// Opcode that writes the new frame
    pub write_ram: u8,
    /// Previous-frame RAM, if the controller has one
    pub base_ram: Option<BaseRam>,
    /// Steps that trigger a full refresh
    pub display_update_full: &'static [Step],
    /// Partial refresh support
    pub partial: Option<PartialRefresh>,
    /// Light sleep behavior
    pub light_sleep: LightSleep,
    /// Steps that enter deep sleep
    pub deep_sleep: &'static [Step],
}

/// Display configuration
///
/// Use `Builder` to create a Config.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Panel geometry
    pub geometry: Geometry,
    /// Controller command table
    pub controller: &'static ControllerTable,
    /// Interval between busy-line samples
    pub poll_interval_ms: u32,
    /// Busy timeout after resets and register writes
    pub command_timeout_ms: u32,
    /// Busy timeout after refreshes
    pub refresh_timeout_ms: u32,
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use epd_controller::{Builder, Geometry, panels};
///
/// let geometry = match Geometry::new(128, 250) {
///     Ok(geometry) => geometry,
///     Err(_) => return,
/// };
/// let config = match Builder::new()
///     .geometry(geometry)
///     .controller(&panels::SSD1680_2IN13)
///     .refresh_timeout_ms(10_000)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.poll_interval_ms, 10);
/// ```
#[must_use]
pub struct Builder {
    geometry: Option<Geometry>,
    controller: Option<&'static ControllerTable>,
    poll_interval_ms: u32,
    command_timeout_ms: u32,
    refresh_timeout_ms: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            geometry: None,
            controller: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            refresh_timeout_ms: DEFAULT_REFRESH_TIMEOUT_MS,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel geometry (required)
    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set the controller command table (required)
    pub fn controller(mut self, table: &'static ControllerTable) -> Self {
        self.controller = Some(table);
        self
    }

    /// Set the busy-line poll interval (0 is treated as 1ms)
    pub fn poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the busy timeout for resets and register writes
    pub fn command_timeout_ms(mut self, ms: u32) -> Self {
        self.command_timeout_ms = ms;
        self
    }

    /// Set the busy timeout for refreshes
    pub fn refresh_timeout_ms(mut self, ms: u32) -> Self {
        self.refresh_timeout_ms = ms;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingGeometry` or `BuilderError::MissingController`
    /// if a required field was not set, `BuilderError::GeometryExceedsController`
    /// if the panel is larger than the controller supports, and
    /// `BuilderError::WidthExceedsAddressing` if the width does not fit the
    /// controller's address registers.
    pub fn build(self) -> Result<Config, BuilderError> {
        let geometry = self.geometry.ok_or(BuilderError::MissingGeometry)?;
        let controller = self.controller.ok_or(BuilderError::MissingController)?;
        if geometry.width > controller.max_width || geometry.height > controller.max_height {
            return Err(BuilderError::GeometryExceedsController {
                width: geometry.width,
                height: geometry.height,
                max_width: controller.max_width,
                max_height: controller.max_height,
            });
        }
        let max_width = controller.addressing.max_width();
        if geometry.width > max_width {
            return Err(BuilderError::WidthExceedsAddressing {
                width: geometry.width,
                max_width,
            });
        }
        Ok(Config {
            geometry,
            controller,
            poll_interval_ms: self.poll_interval_ms,
            command_timeout_ms: self.command_timeout_ms,
            refresh_timeout_ms: self.refresh_timeout_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels;

    #[test]
    fn test_geometry_rejects_unaligned_width() {
        assert_eq!(
            Geometry::new(122, 250),
            Err(BuilderError::InvalidGeometry {
                width: 122,
                height: 250
            })
        );
    }

    #[test]
    fn test_geometry_rejects_zero_sizes() {
        assert!(Geometry::new(0, 8).is_err());
        assert!(Geometry::new(8, 0).is_err());
    }

    #[test]
    fn test_geometry_buffer_size() {
        let geometry = Geometry::new(128, 250).unwrap();
        assert_eq!(geometry.bytes_per_row(), 16);
        assert_eq!(geometry.buffer_size(), 4000);
        assert!(geometry.contains(127, 249));
        assert!(!geometry.contains(128, 0));
        assert!(!geometry.contains(0, 250));
    }

    #[test]
    fn test_builder_requires_geometry() {
        let result = Builder::new().controller(&panels::SSD1680_2IN13).build();
        assert!(matches!(result, Err(BuilderError::MissingGeometry)));
    }

    #[test]
    fn test_builder_requires_controller() {
        let result = Builder::new()
            .geometry(Geometry::new(128, 250).unwrap())
            .build();
        assert!(matches!(result, Err(BuilderError::MissingController)));
    }

    #[test]
    fn test_builder_rejects_geometry_beyond_controller() {
        let result = Builder::new()
            .geometry(Geometry::new(800, 480).unwrap())
            .controller(&panels::SSD1680_2IN13)
            .build();
        assert!(matches!(
            result,
            Err(BuilderError::GeometryExceedsController { width: 800, .. })
        ));
    }

    #[test]
    fn test_builder_defaults() {
        let config = Builder::new()
            .geometry(Geometry::new(128, 250).unwrap())
            .controller(&panels::SSD1680_2IN13)
            .build()
            .unwrap();
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.command_timeout_ms, DEFAULT_COMMAND_TIMEOUT_MS);
        assert_eq!(config.refresh_timeout_ms, DEFAULT_REFRESH_TIMEOUT_MS);
    }

    static WIDE_RESOLUTION: ControllerTable = ControllerTable {
        name: "wide resolution",
        max_width: 400,
        max_height: 300,
        polarity: Polarity::WhiteIsOne,
        busy_polarity: BusyPolarity::ActiveLow,
        reset: ResetTiming {
            pulse_us: 10,
            settle_us: 10,
        },
        power_on: &[InitStep::Window],
        addressing: Addressing::Resolution { opcode: 0x61 },
        write_ram: 0x13,
        base_ram: None,
        display_update_full: &[],
        partial: None,
        light_sleep: LightSleep::AliasDeepSleep,
        deep_sleep: &[],
    };

    #[test]
    fn test_builder_rejects_width_beyond_resolution_register() {
        let result = Builder::new()
            .geometry(Geometry::new(264, 176).unwrap())
            .controller(&WIDE_RESOLUTION)
            .build();
        assert_eq!(
            result.err(),
            Some(BuilderError::WidthExceedsAddressing {
                width: 264,
                max_width: 255
            })
        );

        let config = Builder::new()
            .geometry(Geometry::new(248, 176).unwrap())
            .controller(&WIDE_RESOLUTION)
            .build()
            .unwrap();
        assert_eq!(config.geometry.width, 248);
    }

    #[test]
    fn test_addressing_width_limits() {
        let bytes = RamWindow {
            x_range: 0x44,
            y_range: 0x45,
            x_counter: 0x4E,
            y_counter: 0x4F,
            x_address: XAddress::Bytes,
        };
        assert_eq!(Addressing::RamWindow(bytes).max_width(), 2048);
        let pixels = RamWindow {
            x_address: XAddress::Pixels,
            ..bytes
        };
        assert_eq!(Addressing::RamWindow(pixels).max_width(), u16::MAX);
        assert_eq!(Addressing::Resolution { opcode: 0x61 }.max_width(), 255);
    }

    #[test]
    fn test_light_sleep_flags() {
        assert!(!LightSleep::AliasDeepSleep.is_retained());
        assert!(!LightSleep::AliasDeepSleep.refresh_wakes());
        let retained = LightSleep::Retained {
            enter: &[],
            wake: &[],
            refresh_wakes: false,
        };
        assert!(retained.is_retained());
        assert!(!retained.refresh_wakes());
    }
}
