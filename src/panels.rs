//! Command tables for supported panel models
//!
//! Each table reproduces the byte stream its panel expects. Geometry-derived
//! registers (gate count, RAM windows, resolution) are placeholders in the
//! init list, filled in by the driver from [`Geometry`](crate::config::Geometry).

use crate::color::Polarity;
use crate::command::{Step, ssd, uc};
use crate::config::{
    Addressing, BaseRam, BusyPolarity, ControllerTable, DriverOutput, InitStep, LightSleep,
    PartialRefresh, RamWindow, ResetTiming, XAddress,
};

const SSD_RAM_WINDOW_BYTES: RamWindow = RamWindow {
    x_range: ssd::SET_RAM_X_RANGE,
    y_range: ssd::SET_RAM_Y_RANGE,
    x_counter: ssd::SET_RAM_X_COUNTER,
    y_counter: ssd::SET_RAM_Y_COUNTER,
    x_address: XAddress::Bytes,
};

// SSD1680 2.13"

const SSD1680_POWER_ON: &[InitStep] = &[
    InitStep::Send(Step::cmd(ssd::SOFT_RESET, &[]).settle(10).then_wait()),
    InitStep::GateCount(DriverOutput {
        opcode: ssd::DRIVER_OUTPUT_CONTROL,
        scan: 0x00,
    }),
    InitStep::Send(Step::cmd(ssd::DATA_ENTRY_MODE, &[0x03])),
    InitStep::Window,
    InitStep::Send(Step::cmd(ssd::BORDER_WAVEFORM, &[0xC0])),
];

const SSD1680_UPDATE_FULL: &[Step] = &[
    Step::cmd(ssd::DISPLAY_UPDATE_CTRL2, &[0xF7]),
    Step::cmd(ssd::MASTER_ACTIVATION, &[]).then_wait(),
];

const SSD1680_PARTIAL_ENTER: &[Step] = &[Step::cmd(ssd::BORDER_WAVEFORM, &[0x80])];

const SSD1680_PARTIAL_EXIT: &[Step] = &[Step::cmd(ssd::BORDER_WAVEFORM, &[0xC0])];

const SSD1680_UPDATE_PARTIAL: &[Step] = &[
    Step::cmd(ssd::DISPLAY_UPDATE_CTRL2, &[0xFF]),
    Step::cmd(ssd::MASTER_ACTIVATION, &[]).then_wait(),
];

const SSD1680_DEEP_SLEEP: &[Step] = &[Step::cmd(ssd::DEEP_SLEEP, &[0x01])];

/// 2.13" SSD1680 module (WeAct / Waveshare V4)
///
/// The glass shows 122 columns but the controller RAM is byte-addressed, so
/// configure it as `Geometry::new(128, 250)`. The RAM window then ends at
/// X byte 0x0F, the same value the vendor sequence uses.
///
/// Full refreshes only write BW RAM and only move the RAM cursor. RED RAM
/// is written after each partial refresh.
pub static SSD1680_2IN13: ControllerTable = ControllerTable {
    name: "SSD1680 2.13in",
    max_width: 176,
    max_height: 296,
    polarity: Polarity::WhiteIsOne,
    busy_polarity: BusyPolarity::ActiveHigh,
    reset: ResetTiming {
        pulse_us: 200,
        settle_us: 200,
    },
    power_on: SSD1680_POWER_ON,
    addressing: Addressing::RamWindow(SSD_RAM_WINDOW_BYTES),
    write_ram: ssd::WRITE_RAM_BW,
    base_ram: Some(BaseRam {
        opcode: ssd::WRITE_RAM_RED,
        mirror_full: false,
    }),
    display_update_full: SSD1680_UPDATE_FULL,
    partial: Some(PartialRefresh {
        enter: SSD1680_PARTIAL_ENTER,
        exit: SSD1680_PARTIAL_EXIT,
        display_update_partial: SSD1680_UPDATE_PARTIAL,
        sync_base: true,
    }),
    light_sleep: LightSleep::AliasDeepSleep,
    deep_sleep: SSD1680_DEEP_SLEEP,
};

// SSD1677 800x480

const SSD1677_POWER_ON: &[InitStep] = &[
    InitStep::Send(Step::cmd(ssd::SOFT_RESET, &[]).then_wait()),
    InitStep::Send(Step::cmd(ssd::TEMP_SENSOR_CONTROL, &[0x80])),
    InitStep::Send(Step::cmd(
        ssd::BOOSTER_SOFT_START,
        &[0xAE, 0xC7, 0xC3, 0xC0, 0x40],
    )),
    InitStep::GateCount(DriverOutput {
        opcode: ssd::DRIVER_OUTPUT_CONTROL,
        scan: 0x02,
    }),
    InitStep::Send(Step::cmd(ssd::BORDER_WAVEFORM, &[0x01])),
    InitStep::Send(Step::cmd(ssd::WRITE_VCOM, &[0x3C])),
    InitStep::Send(Step::cmd(ssd::DATA_ENTRY_MODE, &[0x03])),
    // Auto-fill covers the window, so it must be set first
    InitStep::Window,
    InitStep::Send(Step::cmd(ssd::AUTO_WRITE_BW_RAM, &[0xFF]).then_wait()),
    InitStep::Send(Step::cmd(ssd::AUTO_WRITE_RED_RAM, &[0x00]).then_wait()),
];

const SSD1677_UPDATE_FULL: &[Step] = &[
    Step::cmd(ssd::DISPLAY_UPDATE_CTRL1, &[ssd::CTRL1_BYPASS_RED]),
    Step::cmd(ssd::DISPLAY_UPDATE_CTRL2, &[0xF7]),
    Step::cmd(ssd::MASTER_ACTIVATION, &[]).then_wait(),
];

const SSD1677_PARTIAL_ENTER: &[Step] = &[Step::cmd(ssd::BORDER_WAVEFORM, &[0x80])];

const SSD1677_PARTIAL_EXIT: &[Step] = &[Step::cmd(ssd::BORDER_WAVEFORM, &[0x01])];

const SSD1677_UPDATE_PARTIAL: &[Step] = &[
    Step::cmd(ssd::DISPLAY_UPDATE_CTRL1, &[ssd::CTRL1_NORMAL]),
    Step::cmd(ssd::DISPLAY_UPDATE_CTRL2, &[0xFC]),
    Step::cmd(ssd::MASTER_ACTIVATION, &[]).then_wait(),
];

const SSD1677_DEEP_SLEEP: &[Step] = &[
    // Power the analog block down before sleeping
    Step::cmd(ssd::DISPLAY_UPDATE_CTRL1, &[ssd::CTRL1_BYPASS_RED]),
    Step::cmd(ssd::DISPLAY_UPDATE_CTRL2, &[0x03]),
    Step::cmd(ssd::MASTER_ACTIVATION, &[]).then_wait(),
    Step::cmd(ssd::DEEP_SLEEP, &[0x01]),
];

/// SSD1677 800x480 panel
///
/// Pixel-addressed X window, OTP waveforms, RED RAM used as the previous
/// frame for differential refreshes.
pub static SSD1677_800X480: ControllerTable = ControllerTable {
    name: "SSD1677 800x480",
    max_width: 960,
    max_height: 680,
    polarity: Polarity::WhiteIsOne,
    busy_polarity: BusyPolarity::ActiveHigh,
    reset: ResetTiming {
        pulse_us: 10_000,
        settle_us: 10_000,
    },
    power_on: SSD1677_POWER_ON,
    addressing: Addressing::RamWindow(RamWindow {
        x_address: XAddress::Pixels,
        ..SSD_RAM_WINDOW_BYTES
    }),
    write_ram: ssd::WRITE_RAM_BW,
    base_ram: Some(BaseRam {
        opcode: ssd::WRITE_RAM_RED,
        mirror_full: true,
    }),
    display_update_full: SSD1677_UPDATE_FULL,
    partial: Some(PartialRefresh {
        enter: SSD1677_PARTIAL_ENTER,
        exit: SSD1677_PARTIAL_EXIT,
        display_update_partial: SSD1677_UPDATE_PARTIAL,
        sync_base: true,
    }),
    light_sleep: LightSleep::AliasDeepSleep,
    deep_sleep: SSD1677_DEEP_SLEEP,
};

// UC8151 2.9"

const UC8151_POWER_ON: &[InitStep] = &[
    InitStep::Send(Step::cmd(uc::BOOSTER_SOFT_START, &[0x17, 0x17, 0x17])),
    InitStep::Send(Step::cmd(uc::POWER_ON, &[]).settle(5).then_wait()),
    InitStep::Send(Step::cmd(uc::PANEL_SETTING, &[0x1F])),
    InitStep::Window,
    InitStep::Send(Step::cmd(uc::VCOM_AND_DATA_INTERVAL_SETTING, &[0x97])),
    InitStep::Send(Step::cmd(uc::VCM_DC_SETTING, &[0x0A])),
];

const UC8151_UPDATE_FULL: &[Step] = &[Step::cmd(uc::DISPLAY_REFRESH, &[]).settle(1).then_wait()];

const UC8151_LIGHT_SLEEP: &[Step] = &[Step::cmd(uc::POWER_OFF, &[]).then_wait()];

const UC8151_WAKE: &[Step] = &[Step::cmd(uc::POWER_ON, &[]).settle(5).then_wait()];

const UC8151_DEEP_SLEEP: &[Step] = &[
    // Floating border while the pumps wind down
    Step::cmd(uc::VCOM_AND_DATA_INTERVAL_SETTING, &[0xF7]),
    Step::cmd(uc::POWER_OFF, &[]).then_wait(),
    Step::cmd(uc::DEEP_SLEEP, &[uc::DEEP_SLEEP_CHECK]),
];

/// 2.9" UC8151 black/white panel (128x296)
///
/// Busy is active low. Power off keeps the registers, so light sleep is a
/// real state here and a refresh request powers the pumps back on.
pub static UC8151_2IN9: ControllerTable = ControllerTable {
    name: "UC8151 2.9in",
    max_width: 160,
    max_height: 296,
    polarity: Polarity::WhiteIsOne,
    busy_polarity: BusyPolarity::ActiveLow,
    reset: ResetTiming {
        pulse_us: 10_000,
        settle_us: 10_000,
    },
    power_on: UC8151_POWER_ON,
    addressing: Addressing::Resolution {
        opcode: uc::RESOLUTION_SETTING,
    },
    write_ram: uc::DATA_START_TRANSMISSION_2,
    base_ram: Some(BaseRam {
        opcode: uc::DATA_START_TRANSMISSION_1,
        mirror_full: true,
    }),
    display_update_full: UC8151_UPDATE_FULL,
    partial: None,
    light_sleep: LightSleep::Retained {
        enter: UC8151_LIGHT_SLEEP,
        wake: UC8151_WAKE,
        refresh_wakes: true,
    },
    deep_sleep: UC8151_DEEP_SLEEP,
};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_deep_sleep_never_ends_with_busy_wait() {
        for table in [&SSD1680_2IN13, &SSD1677_800X480, &UC8151_2IN9] {
            let last = table.deep_sleep.last().unwrap();
            assert!(!last.wait_ready, "{}", table.name);
        }
    }

    #[test]
    fn test_refresh_sequences_end_with_busy_wait() {
        for table in [&SSD1680_2IN13, &SSD1677_800X480, &UC8151_2IN9] {
            assert!(table.display_update_full.last().unwrap().wait_ready);
            if let Some(partial) = table.partial {
                assert!(partial.display_update_partial.last().unwrap().wait_ready);
            }
        }
    }

    #[test]
    fn test_ssd1680_matches_reference_opcodes() {
        let opcodes: Vec<Option<u8>> = SSD1680_2IN13
            .power_on
            .iter()
            .map(|step| match step {
                InitStep::Send(step) => Some(step.command.opcode),
                InitStep::GateCount(driver_output) => Some(driver_output.opcode),
                InitStep::Window => None,
            })
            .collect();
        assert_eq!(opcodes, [Some(0x12), Some(0x01), Some(0x11), None, Some(0x3C)]);
        assert_eq!(SSD1680_2IN13.write_ram, 0x24);
        assert!(!SSD1680_2IN13.base_ram.unwrap().mirror_full);
        assert_eq!(SSD1680_2IN13.display_update_full[0].command.params, &[0xF7]);
        assert_eq!(SSD1680_2IN13.deep_sleep[0].command.opcode, 0x10);
    }

    #[test]
    fn test_partial_exit_restores_border() {
        for table in [&SSD1680_2IN13, &SSD1677_800X480] {
            let partial = table.partial.unwrap();
            let restored = table.power_on.iter().find_map(|step| match step {
                InitStep::Send(step) if step.command.opcode == ssd::BORDER_WAVEFORM => {
                    Some(step.command)
                }
                _ => None,
            });
            assert_eq!(restored, Some(partial.exit[0].command), "{}", table.name);
        }
    }

    #[test]
    fn test_every_table_programs_its_window() {
        for table in [&SSD1680_2IN13, &SSD1677_800X480, &UC8151_2IN9] {
            let windows = table
                .power_on
                .iter()
                .filter(|step| **step == InitStep::Window)
                .count();
            assert_eq!(windows, 1, "{}", table.name);
        }
    }

    #[test]
    fn test_ssd1677_uses_pixel_addressing() {
        assert!(matches!(
            SSD1677_800X480.addressing,
            Addressing::RamWindow(RamWindow {
                x_address: XAddress::Pixels,
                x_range: 0x44,
                ..
            })
        ));
    }
}
