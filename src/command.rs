//! Command values and controller opcodes
//!
//! A [`Command`] is an opcode plus zero or more parameter bytes. It is sent
//! over the bus with the DC pin low for the opcode and high for the
//! parameters. A [`Step`] wraps a command with the timing the controller
//! needs afterwards, and controller tables are built from slices of steps.
//!
//! ## Example
//!
//! ```
//! use epd_controller::command::{self, Command, Step};
//!
//! // Soft reset: wait 10ms, then gate on BUSY before the next command
//! const SOFT_RESET: Step = Step::new(Command::new(command::ssd::SOFT_RESET, &[]))
//!     .settle(10)
//!     .then_wait();
//!
//! assert_eq!(SOFT_RESET.command.opcode, 0x12);
//! assert!(SOFT_RESET.wait_ready);
//! ```

/// A single controller command
///
/// Commands are plain values: built, sent and dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command<'a> {
    /// Opcode byte (sent with DC low)
    pub opcode: u8,
    /// Parameter bytes (sent with DC high, may be empty)
    pub params: &'a [u8],
}

impl<'a> Command<'a> {
    /// Create a command from an opcode and its parameters
    pub const fn new(opcode: u8, params: &'a [u8]) -> Self {
        Self { opcode, params }
    }
}

/// One entry of a controller command sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Command to send
    pub command: Command<'static>,
    /// Delay after the command, in milliseconds
    pub settle_ms: u32,
    /// Whether to wait for BUSY to go idle before the next command
    pub wait_ready: bool,
}

impl Step {
    /// A step with no settle time and no busy wait
    pub const fn new(command: Command<'static>) -> Self {
        Self {
            command,
            settle_ms: 0,
            wait_ready: false,
        }
    }

    /// Shorthand for `Step::new(Command::new(opcode, params))`
    pub const fn cmd(opcode: u8, params: &'static [u8]) -> Self {
        Self::new(Command::new(opcode, params))
    }

    /// Delay for `ms` milliseconds after the command
    pub const fn settle(mut self, ms: u32) -> Self {
        self.settle_ms = ms;
        self
    }

    /// Gate on the busy line after the command (and after the settle delay)
    pub const fn then_wait(mut self) -> Self {
        self.wait_ready = true;
        self
    }
}

/// Opcodes for the Solomon SSD16xx family (SSD1675, SSD1680, SSD1677, ...)
///
/// These controllers address RAM through explicit X/Y windows and counters.
pub mod ssd {
    /// Driver output control (0x01)
    ///
    /// 3 bytes: [gates-1 (LSB), gates-1 (MSB), scanning mode]
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;

    /// Booster soft-start control (0x0C)
    ///
    /// 5 bytes on SSD1677, 4 on SSD1680.
    pub const BOOSTER_SOFT_START: u8 = 0x0C;

    /// Deep sleep mode (0x10)
    ///
    /// 1 byte: 0x01 = mode 1 (RAM retained), 0x03 = mode 2.
    /// Only a hardware reset wakes the controller.
    pub const DEEP_SLEEP: u8 = 0x10;

    /// Data entry mode (0x11)
    ///
    /// Bit 0: X increment, bit 1: Y increment, bit 2: counter moves in Y first.
    pub const DATA_ENTRY_MODE: u8 = 0x11;

    /// Software reset (0x12)
    ///
    /// Resets registers to their defaults. BUSY is high while it runs.
    pub const SOFT_RESET: u8 = 0x12;

    /// Temperature sensor selection (0x18)
    ///
    /// 0x80 = internal sensor.
    pub const TEMP_SENSOR_CONTROL: u8 = 0x18;

    /// Master activation (0x20)
    ///
    /// Runs the sequence selected by [`DISPLAY_UPDATE_CTRL2`]. BUSY is high until done.
    pub const MASTER_ACTIVATION: u8 = 0x20;

    /// Display update control 1 (0x21)
    ///
    /// RAM content options: 0x00 compares BW against RED RAM, 0x40 bypasses RED.
    pub const DISPLAY_UPDATE_CTRL1: u8 = 0x21;

    /// Display update control 2 (0x22)
    ///
    /// Bit flags selecting clock/analog enable, LUT load and display mode.
    pub const DISPLAY_UPDATE_CTRL2: u8 = 0x22;

    /// Write BW RAM (0x24)
    ///
    /// Bit = 1 is white, bit = 0 is black. MSB is the leftmost pixel.
    pub const WRITE_RAM_BW: u8 = 0x24;

    /// Write RED RAM (0x26)
    ///
    /// Holds the previous frame for differential (partial) refreshes.
    pub const WRITE_RAM_RED: u8 = 0x26;

    /// Write VCOM register (0x2C)
    pub const WRITE_VCOM: u8 = 0x2C;

    /// Border waveform control (0x3C)
    pub const BORDER_WAVEFORM: u8 = 0x3C;

    /// RAM X start/end address (0x44)
    pub const SET_RAM_X_RANGE: u8 = 0x44;

    /// RAM Y start/end address (0x45)
    pub const SET_RAM_Y_RANGE: u8 = 0x45;

    /// Auto-fill BW RAM with a pattern (0x46). BUSY is high while filling.
    pub const AUTO_WRITE_BW_RAM: u8 = 0x46;

    /// Auto-fill RED RAM with a pattern (0x47). BUSY is high while filling.
    pub const AUTO_WRITE_RED_RAM: u8 = 0x47;

    /// RAM X address counter (0x4E)
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;

    /// RAM Y address counter (0x4F)
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;

    /// Compare BW against RED RAM (partial updates)
    pub const CTRL1_NORMAL: u8 = 0x00;

    /// Treat RED RAM as zero (full black/white updates)
    pub const CTRL1_BYPASS_RED: u8 = 0x40;
}

/// Opcodes for the UltraChip UC81xx family (UC8151, IL0373, ...)
///
/// These controllers take the panel resolution in a register and stream
/// whole frames into "old" and "new" data buffers.
pub mod uc {
    /// Panel setting (0x00)
    pub const PANEL_SETTING: u8 = 0x00;

    /// Power off (0x02)
    ///
    /// Turns the charge pumps off. Registers survive, so power on (0x04)
    /// resumes operation without reinitialization.
    pub const POWER_OFF: u8 = 0x02;

    /// Power on (0x04). BUSY is low until the pumps are up.
    pub const POWER_ON: u8 = 0x04;

    /// Booster soft start (0x06)
    pub const BOOSTER_SOFT_START: u8 = 0x06;

    /// Deep sleep (0x07)
    ///
    /// Requires the check code 0xA5. Only a hardware reset wakes the controller.
    pub const DEEP_SLEEP: u8 = 0x07;

    /// Check code for [`DEEP_SLEEP`]
    pub const DEEP_SLEEP_CHECK: u8 = 0xA5;

    /// Data start transmission 1 (0x10): previous frame
    pub const DATA_START_TRANSMISSION_1: u8 = 0x10;

    /// Display refresh (0x12)
    pub const DISPLAY_REFRESH: u8 = 0x12;

    /// Data start transmission 2 (0x13): new frame
    pub const DATA_START_TRANSMISSION_2: u8 = 0x13;

    /// VCOM and data interval setting (0x50)
    pub const VCOM_AND_DATA_INTERVAL_SETTING: u8 = 0x50;

    /// Resolution setting (0x61)
    ///
    /// 3 bytes: [width, height (MSB), height (LSB)]
    pub const RESOLUTION_SETTING: u8 = 0x61;

    /// VCM DC setting (0x82)
    pub const VCM_DC_SETTING: u8 = 0x82;
}
