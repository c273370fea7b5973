//! Wire-level tests against embedded-hal mocks
//!
//! Every SPI transaction, DC/RST edge and BUSY sample is checked for the
//! SSD1680 2.13" table on a 16x8 geometry.
//!
//! Run with: cargo test --test protocol

use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
use epd_controller::{
    Builder, Display, Error, FrameBuffer, Geometry, Interface, Operation, PowerState,
    RefreshMode, panels,
};

type TestDisplay = Display<Interface<SpiMock<u8>, PinMock, PinMock, PinMock>>;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the three SPI expectations that correspond to one `spi.write(&data)` call
/// via the `SpiDevice` trait.
fn spi_device_write(data: &[u8]) -> [SpiTransaction<u8>; 3] {
    [
        SpiTransaction::transaction_start(),
        SpiTransaction::write_vec(data.to_vec()),
        SpiTransaction::transaction_end(),
    ]
}

/// Expected SPI and DC traffic, built command by command
#[derive(Default)]
struct Traffic {
    spi: Vec<SpiTransaction<u8>>,
    dc: Vec<PinTransaction>,
}

impl Traffic {
    fn command(&mut self, opcode: u8, params: &[u8]) -> &mut Self {
        self.dc.push(PinTransaction::set(PinState::Low));
        self.spi.extend(spi_device_write(&[opcode]));
        if !params.is_empty() {
            self.dc.push(PinTransaction::set(PinState::High));
            self.spi.extend(spi_device_write(params));
        }
        self
    }

    /// RAM cursor back to the top-left corner
    fn home(&mut self) -> &mut Self {
        self.command(0x4E, &[0x00]).command(0x4F, &[0x00, 0x00])
    }

    /// Reference init sequence for a panel of `height` gates and `x_end` last RAM byte
    fn init_for(&mut self, x_end: u8, height: u16) -> &mut Self {
        let [last_lo, last_hi] = (height - 1).to_le_bytes();
        self.command(0x12, &[])
            .command(0x01, &[last_lo, last_hi, 0x00])
            .command(0x11, &[0x03])
            .command(0x44, &[0x00, x_end])
            .command(0x45, &[0x00, 0x00, last_lo, last_hi])
            .command(0x3C, &[0xC0])
    }

    /// Init of the 16x8 geometry
    fn init(&mut self) -> &mut Self {
        self.init_for(0x01, 8)
    }
}

struct Mocks {
    spi: SpiMock<u8>,
    dc: PinMock,
    rst: PinMock,
    busy: PinMock,
}

impl Mocks {
    fn new(traffic: &Traffic, rst: &[PinTransaction], busy: &[PinTransaction]) -> Self {
        Self {
            spi: SpiMock::new(&traffic.spi),
            dc: PinMock::new(&traffic.dc),
            rst: PinMock::new(rst),
            busy: PinMock::new(busy),
        }
    }

    fn display(&self, command_timeout_ms: u32) -> TestDisplay {
        self.display_with(geometry(), command_timeout_ms)
    }

    fn display_with(&self, geometry: Geometry, command_timeout_ms: u32) -> TestDisplay {
        let config = Builder::new()
            .geometry(geometry)
            .controller(&panels::SSD1680_2IN13)
            .command_timeout_ms(command_timeout_ms)
            .build()
            .unwrap();
        let interface = Interface::new(
            self.spi.clone(),
            self.dc.clone(),
            self.rst.clone(),
            self.busy.clone(),
        );
        Display::new(interface, config)
    }

    fn done(mut self) {
        self.spi.done();
        self.dc.done();
        self.rst.done();
        self.busy.done();
    }
}

fn geometry() -> Geometry {
    Geometry::new(16, 8).unwrap()
}

fn reset_pulse() -> [PinTransaction; 2] {
    [
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
    ]
}

fn idle(samples: usize) -> Vec<PinTransaction> {
    vec![PinTransaction::get(PinState::Low); samples]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Reset, gate count, data entry, RAM window and border, byte for byte.
///
/// BUSY is sampled after the reset, after the soft reset and once more at the
/// end of init.
#[test]
fn test_init_traffic() {
    let mut traffic = Traffic::default();
    traffic.init();
    let mocks = Mocks::new(&traffic, &reset_pulse(), &idle(3));

    let mut display = mocks.display(5_000);
    display.init(&mut NoopDelay).unwrap();
    assert_eq!(display.state(), PowerState::Active);

    drop(display);
    mocks.done();
}

/// Full refresh homes the RAM cursor, writes BW RAM and triggers update 0xF7.
#[test]
fn test_full_refresh_traffic() {
    let mut traffic = Traffic::default();
    traffic.init();
    traffic
        .home()
        .command(0x24, &[0x0F; 16])
        .command(0x22, &[0xF7])
        .command(0x20, &[]);
    let mocks = Mocks::new(&traffic, &reset_pulse(), &idle(4));

    let mut display = mocks.display(5_000);
    let frame = FrameBuffer::try_new(geometry(), [0x0Fu8; 16]).unwrap();
    display.init(&mut NoopDelay).unwrap();
    display
        .display(&frame, RefreshMode::Full, &mut NoopDelay)
        .unwrap();

    drop(display);
    mocks.done();
}

/// The 2.13" module configured as 128x250: init, a white frame and deep sleep.
#[test]
fn test_reference_panel_traffic() {
    let white = vec![0xFFu8; 4000];
    let mut traffic = Traffic::default();
    traffic.init_for(0x0F, 250);
    traffic
        .home()
        .command(0x24, &white)
        .command(0x22, &[0xF7])
        .command(0x20, &[])
        .command(0x10, &[0x01]);
    let mocks = Mocks::new(&traffic, &reset_pulse(), &idle(4));

    let geometry = Geometry::new(128, 250).unwrap();
    let mut display = mocks.display_with(geometry, 5_000);
    let mut frame = FrameBuffer::try_new(geometry, vec![0u8; 4000]).unwrap();
    display.init(&mut NoopDelay).unwrap();
    display.clear(&mut frame, &mut NoopDelay).unwrap();
    display.sleep(&mut NoopDelay).unwrap();
    assert_eq!(frame.as_bytes(), white.as_slice());

    drop(display);
    mocks.done();
}

/// Border goes to 0x80 for partial refreshes and back to 0xC0 for the next full one.
#[test]
fn test_partial_then_full_traffic() {
    let mut traffic = Traffic::default();
    traffic.init();
    traffic
        .home()
        .command(0x24, &[0x00; 16])
        .command(0x22, &[0xF7])
        .command(0x20, &[])
        .command(0x3C, &[0x80])
        .home()
        .command(0x24, &[0x00; 16])
        .command(0x22, &[0xFF])
        .command(0x20, &[])
        .home()
        .command(0x26, &[0x00; 16])
        .command(0x3C, &[0xC0])
        .home()
        .command(0x24, &[0x00; 16])
        .command(0x22, &[0xF7])
        .command(0x20, &[]);
    let mocks = Mocks::new(&traffic, &reset_pulse(), &idle(6));

    let mut display = mocks.display(5_000);
    let frame = FrameBuffer::try_new(geometry(), [0u8; 16]).unwrap();
    display.init(&mut NoopDelay).unwrap();
    display
        .display(&frame, RefreshMode::Full, &mut NoopDelay)
        .unwrap();
    display
        .display(&frame, RefreshMode::Partial, &mut NoopDelay)
        .unwrap();
    display
        .display(&frame, RefreshMode::Full, &mut NoopDelay)
        .unwrap();

    drop(display);
    mocks.done();
}

/// Deep sleep ends with 0x10 0x01 and no BUSY sample.
#[test]
fn test_sleep_traffic() {
    let mut traffic = Traffic::default();
    traffic.init();
    traffic.command(0x10, &[0x01]);
    let mocks = Mocks::new(&traffic, &reset_pulse(), &idle(3));

    let mut display = mocks.display(5_000);
    display.init(&mut NoopDelay).unwrap();
    display.sleep(&mut NoopDelay).unwrap();
    assert_eq!(display.state(), PowerState::DeepSleep);

    drop(display);
    mocks.done();
}

/// Rejected operations never reach the bus or the pins.
#[test]
fn test_rejected_operations_are_silent() {
    let mocks = Mocks::new(&Traffic::default(), &[], &[]);
    let mut display = mocks.display(5_000);
    let frame = FrameBuffer::try_new(geometry(), [0u8; 16]).unwrap();

    let result = display.display(&frame, RefreshMode::Full, &mut NoopDelay);
    assert!(matches!(
        result,
        Err(Error::InvalidState {
            state: PowerState::Uninitialized,
            operation: Operation::FullRefresh
        })
    ));
    let mut small = FrameBuffer::try_new(Geometry::new(8, 8).unwrap(), [0u8; 8]).unwrap();
    assert!(matches!(
        display.clear(&mut small, &mut NoopDelay),
        Err(Error::InvalidState {
            state: PowerState::Uninitialized,
            operation: Operation::FullRefresh
        })
    ));
    assert!(matches!(
        display.sleep(&mut NoopDelay),
        Err(Error::InvalidState { .. })
    ));
    assert!(matches!(
        display.wake(&mut NoopDelay),
        Err(Error::InvalidState { .. })
    ));

    drop(display);
    mocks.done();
}

/// A BUSY line stuck after reset times out after exactly the command timeout.
///
/// With a 30ms timeout and 10ms polls the line is sampled at 0, 10, 20 and 30ms.
#[test]
fn test_busy_timeout_during_init() {
    let busy = vec![PinTransaction::get(PinState::High); 4];
    let mocks = Mocks::new(&Traffic::default(), &reset_pulse(), &busy);

    let mut display = mocks.display(30);
    let result = display.init(&mut NoopDelay);
    assert!(matches!(
        result,
        Err(Error::ControllerTimeout { waited_ms: 30 })
    ));
    assert_eq!(display.state(), PowerState::Uninitialized);

    drop(display);
    mocks.done();
}

/// Power off drives DC and RST low and blocks init until power on.
#[test]
fn test_power_off_drives_lines_low() {
    let mut traffic = Traffic::default();
    traffic.dc.push(PinTransaction::set(PinState::Low));
    let rst = [PinTransaction::set(PinState::Low)];
    let mocks = Mocks::new(&traffic, &rst, &[]);

    let mut display = mocks.display(5_000);
    display.power_off().unwrap();
    assert_eq!(display.state(), PowerState::Off);
    assert!(matches!(
        display.init(&mut NoopDelay),
        Err(Error::InvalidState {
            state: PowerState::Off,
            operation: Operation::Init
        })
    ));

    display.power_on().unwrap();
    assert_eq!(display.state(), PowerState::Uninitialized);

    drop(display);
    mocks.done();
}
