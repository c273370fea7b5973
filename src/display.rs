//! Core display operations

use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

use crate::busy::BusyGate;
use crate::command::{Command, Step};
use crate::config::{Addressing, Config, Geometry, InitStep, LightSleep, RamWindow, XAddress};
use crate::error::Error;
use crate::framebuffer::FrameBuffer;
use crate::interface::DisplayInterface;
use crate::power::{Admission, Operation, PowerState, PowerStateMachine};

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Byte-aligned panel region for partial updates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// X coordinate in pixels (multiple of 8)
    pub x: u16,
    /// Y coordinate in pixels
    pub y: u16,
    /// Width in pixels (multiple of 8)
    pub w: u16,
    /// Height in pixels
    pub h: u16,
}

impl Region {
    /// Create a new region
    #[allow(clippy::many_single_char_names)]
    pub fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Region covering the whole panel
    pub fn full(geometry: Geometry) -> Self {
        Self::new(0, 0, geometry.width, geometry.height)
    }

    /// Calculate the buffer size in bytes for this region
    pub fn buffer_size(&self) -> usize {
        (self.w as usize / 8) * self.h as usize
    }

    /// Whether the region is non-empty, byte-aligned and inside `geometry`
    pub fn fits(&self, geometry: Geometry) -> bool {
        self.w != 0
            && self.h != 0
            && self.x % 8 == 0
            && self.w % 8 == 0
            && u32::from(self.x) + u32::from(self.w) <= u32::from(geometry.width)
            && u32::from(self.y) + u32::from(self.h) <= u32::from(geometry.height)
    }
}

/// Refresh mode for display updates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshMode {
    /// Full refresh using the OTP waveform (slow, no ghosting)
    ///
    /// Also writes the previous-frame RAM when the table mirrors full frames.
    /// After partial refreshes the table's exit steps run first, so the border
    /// waveform is back to its init value.
    #[default]
    Full,
    /// Partial (differential) refresh
    ///
    /// Requires a full refresh since the last init. Ghosting accumulates, so
    /// callers should interleave full refreshes.
    Partial,
}

/// Core display driver
///
/// Walks the [`ControllerTable`](crate::config::ControllerTable) of its
/// [`Config`]. Every operation is checked by the power-state machine first; a
/// rejected operation performs no bus I/O.
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Busy line gate
    busy: BusyGate,
    /// Power state and session flags
    power: PowerStateMachine,
    /// RAM X/Y range last programmed since init
    ram_window: Option<Region>,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance in [`PowerState::Uninitialized`]
    pub fn new(interface: I, config: Config) -> Self {
        let table = config.controller;
        Self {
            interface,
            busy: BusyGate::new(table.busy_polarity, config.poll_interval_ms),
            power: PowerStateMachine::new(table.light_sleep),
            ram_window: None,
            config,
        }
    }

    /// Current power state
    pub fn state(&self) -> PowerState {
        self.power.state()
    }

    /// Display configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Panel geometry
    pub fn geometry(&self) -> Geometry {
        self.config.geometry
    }

    /// Bit value of a blank (white) pixel on this controller
    pub fn blank_frame_bit(&self) -> bool {
        self.config.controller.polarity.blank_bit()
    }

    /// Get a reference to the underlying interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Release the interface
    pub fn into_interface(self) -> I {
        self.interface
    }

    /// Hardware reset and register programming
    ///
    /// Valid from every state except [`PowerState::Off`]. Required after
    /// construction, deep sleep and any failed operation.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.power.admit(Operation::Init)?;
        debug!("Init {}", self.config.controller.name);
        let result = self.run_init(delay);
        self.finish(Operation::Init, result)
    }

    /// Blank `frame` and show it with a full refresh
    ///
    /// The frame is left untouched when the state machine rejects the call.
    pub fn clear<B, D>(&mut self, frame: &mut FrameBuffer<B>, delay: &mut D) -> DisplayResult<I>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
        D: DelayNs,
    {
        let admission = self.power.admit(Operation::FullRefresh)?;
        self.check_geometry(frame.geometry())?;
        frame.clear_to(self.blank_frame_bit());
        debug!("Clear");
        let result = self.run_full(admission, frame.as_bytes(), delay);
        self.finish(Operation::FullRefresh, result)
    }

    /// Write `frame` to the controller and refresh the panel
    pub fn display<B, D>(
        &mut self,
        frame: &FrameBuffer<B>,
        mode: RefreshMode,
        delay: &mut D,
    ) -> DisplayResult<I>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
        D: DelayNs,
    {
        match mode {
            RefreshMode::Full => {
                let admission = self.power.admit(Operation::FullRefresh)?;
                self.check_geometry(frame.geometry())?;
                debug!("Full refresh");
                let result = self.run_full(admission, frame.as_bytes(), delay);
                self.finish(Operation::FullRefresh, result)
            }
            RefreshMode::Partial => {
                let admission = self.admit_partial()?;
                self.check_geometry(frame.geometry())?;
                let full = Region::full(self.config.geometry);
                self.refresh_region(admission, full, frame.as_bytes(), delay)
            }
        }
    }

    /// Partially refresh one byte-aligned region
    ///
    /// `data` holds only the region, packed like a frame buffer of width `w`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unsupported` if the controller has no windowed partial
    /// refresh, `Error::InvalidState` if the state machine rejects it, then
    /// `Error::InvalidRegion` if the region is empty, unaligned or outside the
    /// panel and `Error::BufferSize` if `data` does not match it.
    pub fn display_partial_region<D: DelayNs>(
        &mut self,
        region: Region,
        data: &[u8],
        delay: &mut D,
    ) -> DisplayResult<I> {
        if !matches!(self.config.controller.addressing, Addressing::RamWindow(_)) {
            return Err(Error::Unsupported {
                operation: Operation::PartialRefresh,
            });
        }
        let admission = self.admit_partial()?;
        if !region.fits(self.config.geometry) {
            return Err(Error::InvalidRegion {
                x: region.x,
                y: region.y,
                w: region.w,
                h: region.h,
            });
        }
        if data.len() != region.buffer_size() {
            return Err(Error::BufferSize {
                required: region.buffer_size(),
                provided: data.len(),
            });
        }
        self.refresh_region(admission, region, data, delay)
    }

    /// Enter deep sleep
    ///
    /// Register state is lost; only [`init`](Self::init) or
    /// [`power_off`](Self::power_off) are accepted afterwards.
    pub fn sleep<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.power.admit(Operation::DeepSleep)?;
        debug!("Deep sleep");
        let steps = self.config.controller.deep_sleep;
        let result = self.run_steps(steps, self.config.command_timeout_ms, delay);
        self.finish(Operation::DeepSleep, result)
    }

    /// Enter register-retaining sleep
    ///
    /// Controllers without one enter deep sleep instead.
    pub fn light_sleep<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let LightSleep::Retained { enter, .. } = self.config.controller.light_sleep else {
            return self.sleep(delay);
        };
        self.power.admit(Operation::LightSleep)?;
        debug!("Light sleep");
        let result = self.run_steps(enter, self.config.command_timeout_ms, delay);
        self.finish(Operation::LightSleep, result)
    }

    /// Leave light sleep without reinitialization
    pub fn wake<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.power.admit(Operation::Wake)?;
        debug!("Wake");
        let result = self.run_wake(delay);
        self.finish(Operation::Wake, result)
    }

    /// Record that the rails are off and drive the control lines low
    ///
    /// Accepted in every state. The state is [`PowerState::Off`] even when
    /// driving a pin fails.
    pub fn power_off(&mut self) -> DisplayResult<I> {
        self.power.admit(Operation::PowerOff)?;
        self.power.complete(Operation::PowerOff);
        debug!("Power off");
        self.interface.release().map_err(Error::BusFault)
    }

    /// Record that the rails are back on; [`init`](Self::init) is required next
    pub fn power_on(&mut self) -> DisplayResult<I> {
        self.power.admit(Operation::PowerOn)?;
        self.power.complete(Operation::PowerOn);
        debug!("Power on");
        Ok(())
    }

    fn check_geometry(&self, geometry: Geometry) -> DisplayResult<I> {
        if geometry != self.config.geometry {
            return Err(Error::GeometryMismatch);
        }
        Ok(())
    }

    /// Record the outcome of an admitted operation
    ///
    /// Any error here happened after bus I/O started, so the controller
    /// state is unknown.
    fn finish(&mut self, operation: Operation, result: DisplayResult<I>) -> DisplayResult<I> {
        match result {
            Ok(()) => {
                self.power.complete(operation);
                Ok(())
            }
            Err(err) => {
                warn!("{:?} failed: {}", operation, err);
                self.power.fault();
                self.ram_window = None;
                Err(err)
            }
        }
    }

    fn admit_partial(&self) -> Result<Admission, Error<I>> {
        if self.config.controller.partial.is_none() {
            return Err(Error::Unsupported {
                operation: Operation::PartialRefresh,
            });
        }
        Ok(self.power.admit(Operation::PartialRefresh)?)
    }

    fn refresh_region<D: DelayNs>(
        &mut self,
        admission: Admission,
        region: Region,
        data: &[u8],
        delay: &mut D,
    ) -> DisplayResult<I> {
        debug!(
            "Partial refresh x={} y={} w={} h={}",
            region.x, region.y, region.w, region.h
        );
        let result = self.run_partial(admission, region, data, delay);
        self.finish(Operation::PartialRefresh, result)
    }

    fn run_init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let table = self.config.controller;
        let geometry = self.config.geometry;
        let timeout_ms = self.config.command_timeout_ms;
        self.ram_window = None;

        self.interface
            .reset(delay, table.reset)
            .map_err(Error::BusFault)?;
        self.wait_ready(delay, timeout_ms)?;

        for step in table.power_on {
            match *step {
                InitStep::Send(step) => self.run_steps(&[step], timeout_ms, delay)?,
                InitStep::GateCount(driver_output) => {
                    let [last_lo, last_hi] = (geometry.height - 1).to_le_bytes();
                    self.send(Command::new(
                        driver_output.opcode,
                        &[last_lo, last_hi, driver_output.scan],
                    ))?;
                }
                InitStep::Window => match table.addressing {
                    Addressing::RamWindow(window) => {
                        self.set_ram_range(&window, Region::full(geometry))?;
                    }
                    Addressing::Resolution { opcode } => {
                        let width = u8::try_from(geometry.width).map_err(|_| {
                            Error::Unsupported {
                                operation: Operation::Init,
                            }
                        })?;
                        let [height_lo, height_hi] = geometry.height.to_le_bytes();
                        self.send(Command::new(opcode, &[width, height_hi, height_lo]))?;
                    }
                },
            }
        }

        self.wait_ready(delay, timeout_ms)?;
        Ok(())
    }

    fn run_full<D: DelayNs>(
        &mut self,
        admission: Admission,
        data: &[u8],
        delay: &mut D,
    ) -> DisplayResult<I> {
        let table = self.config.controller;
        let full = Region::full(self.config.geometry);

        if admission == Admission::WakeFirst {
            self.run_wake(delay)?;
        }

        if self.power.partial_mode() {
            if let Some(partial) = table.partial {
                self.run_steps(partial.exit, self.config.command_timeout_ms, delay)?;
            }
            self.power.leave_partial_mode();
        }

        self.write_ram(table.write_ram, full, data)?;
        if let Some(base) = table.base_ram.filter(|base| base.mirror_full) {
            self.write_ram(base.opcode, full, data)?;
        }

        self.run_steps(
            table.display_update_full,
            self.config.refresh_timeout_ms,
            delay,
        )
    }

    fn run_partial<D: DelayNs>(
        &mut self,
        admission: Admission,
        region: Region,
        data: &[u8],
        delay: &mut D,
    ) -> DisplayResult<I> {
        let table = self.config.controller;
        let Some(partial) = table.partial else {
            return Err(Error::Unsupported {
                operation: Operation::PartialRefresh,
            });
        };

        if admission == Admission::WakeFirst {
            self.run_wake(delay)?;
        }

        if !self.power.partial_mode() {
            self.run_steps(partial.enter, self.config.command_timeout_ms, delay)?;
            self.power.enter_partial_mode();
        }

        self.write_ram(table.write_ram, region, data)?;
        self.run_steps(
            partial.display_update_partial,
            self.config.refresh_timeout_ms,
            delay,
        )?;

        if partial.sync_base {
            if let Some(base) = table.base_ram {
                self.write_ram(base.opcode, region, data)?;
            }
        }
        Ok(())
    }

    fn run_wake<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        if let LightSleep::Retained { wake, .. } = self.config.controller.light_sleep {
            self.run_steps(wake, self.config.command_timeout_ms, delay)?;
        }
        Ok(())
    }

    /// Point the RAM window at `region` (window-addressed controllers) and
    /// stream `data` to `opcode`
    fn write_ram(&mut self, opcode: u8, region: Region, data: &[u8]) -> DisplayResult<I> {
        if let Addressing::RamWindow(window) = self.config.controller.addressing {
            if self.ram_window != Some(region) {
                self.set_ram_range(&window, region)?;
            }
            self.set_ram_counter(&window, region)?;
        }
        self.send_command(opcode)?;
        self.send_data(data)
    }

    /// Set the RAM X/Y start and end addresses
    ///
    /// The region has already been validated: non-empty, byte-aligned and
    /// inside the geometry, whose width fits the X address encoding.
    fn set_ram_range(&mut self, window: &RamWindow, region: Region) -> DisplayResult<I> {
        let x_end = region.x + region.w - 1;
        let y_end = region.y + region.h - 1;

        match window.x_address {
            XAddress::Bytes => {
                let (x_start, x_end) = ((region.x / 8) as u8, (x_end / 8) as u8);
                self.send(Command::new(window.x_range, &[x_start, x_end]))?;
            }
            XAddress::Pixels => {
                let [start_lo, start_hi] = region.x.to_le_bytes();
                let [end_lo, end_hi] = x_end.to_le_bytes();
                self.send(Command::new(
                    window.x_range,
                    &[start_lo, start_hi, end_lo, end_hi],
                ))?;
            }
        }

        let [start_lo, start_hi] = region.y.to_le_bytes();
        let [end_lo, end_hi] = y_end.to_le_bytes();
        self.send(Command::new(
            window.y_range,
            &[start_lo, start_hi, end_lo, end_hi],
        ))?;

        self.ram_window = Some(region);
        Ok(())
    }

    /// Move the RAM address counters to the top-left corner of `region`
    fn set_ram_counter(&mut self, window: &RamWindow, region: Region) -> DisplayResult<I> {
        match window.x_address {
            XAddress::Bytes => {
                self.send(Command::new(window.x_counter, &[(region.x / 8) as u8]))?;
            }
            XAddress::Pixels => {
                self.send(Command::new(window.x_counter, &region.x.to_le_bytes()))?;
            }
        }
        self.send(Command::new(window.y_counter, &region.y.to_le_bytes()))
    }

    fn run_steps<D: DelayNs>(
        &mut self,
        steps: &[Step],
        timeout_ms: u32,
        delay: &mut D,
    ) -> DisplayResult<I> {
        for step in steps {
            self.send(step.command)?;
            if step.settle_ms > 0 {
                delay.delay_ms(step.settle_ms);
            }
            if step.wait_ready {
                self.wait_ready(delay, timeout_ms)?;
            }
        }
        Ok(())
    }

    fn wait_ready<D: DelayNs>(&mut self, delay: &mut D, timeout_ms: u32) -> DisplayResult<I> {
        self.busy
            .wait_ready(&mut self.interface, delay, timeout_ms)
            .map(|_| ())
    }

    /// Send a command and its parameters
    fn send(&mut self, command: Command<'_>) -> DisplayResult<I> {
        trace!("cmd {:#04x} {:02x?}", command.opcode, command.params);
        self.send_command(command.opcode)?;
        self.send_data(command.params)
    }

    /// Send a command to the display controller
    fn send_command(&mut self, cmd: u8) -> DisplayResult<I> {
        self.interface.send_command(cmd).map_err(Error::BusFault)
    }

    /// Send data to the display controller
    fn send_data(&mut self, data: &[u8]) -> DisplayResult<I> {
        self.interface.send_data(data).map_err(Error::BusFault)
    }
}
