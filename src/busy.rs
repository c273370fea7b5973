//! Bounded busy-line polling
//!
//! The controller raises BUSY while it processes a reset, a power change or
//! a refresh. No command may be issued until it is idle again.

use embedded_hal::delay::DelayNs;
use log::{trace, warn};

use crate::config::BusyPolarity;
use crate::error::Error;
use crate::interface::DisplayInterface;

/// Polls the busy line until the controller is idle or a timeout expires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusyGate {
    polarity: BusyPolarity,
    poll_interval_ms: u32,
}

impl BusyGate {
    /// Create a gate; a poll interval of 0 is treated as 1ms
    pub fn new(polarity: BusyPolarity, poll_interval_ms: u32) -> Self {
        Self {
            polarity,
            poll_interval_ms: poll_interval_ms.max(1),
        }
    }

    /// Interval between samples in milliseconds
    pub fn poll_interval_ms(&self) -> u32 {
        self.poll_interval_ms
    }

    /// Sample the busy line once
    pub fn is_busy<I: DisplayInterface>(&self, interface: &mut I) -> Result<bool, Error<I>> {
        let high = interface.busy_line_high().map_err(Error::BusFault)?;
        Ok(match self.polarity {
            BusyPolarity::ActiveHigh => high,
            BusyPolarity::ActiveLow => !high,
        })
    }

    /// Wait until the controller is idle
    ///
    /// Returns the milliseconds spent waiting. The last sleep is shortened so
    /// that the total delay on timeout equals `timeout_ms` exactly.
    ///
    /// # Errors
    ///
    /// Returns `Error::ControllerTimeout` if the line is still busy after
    /// `timeout_ms`, or `Error::BusFault` if the pin cannot be read.
    pub fn wait_ready<I, D>(
        &self,
        interface: &mut I,
        delay: &mut D,
        timeout_ms: u32,
    ) -> Result<u32, Error<I>>
    where
        I: DisplayInterface,
        D: DelayNs,
    {
        let mut elapsed_ms = 0u32;
        loop {
            if !self.is_busy(interface)? {
                if elapsed_ms > 0 {
                    trace!("Busy for {}ms", elapsed_ms);
                }
                return Ok(elapsed_ms);
            }
            if elapsed_ms >= timeout_ms {
                warn!("Controller still busy after {}ms", elapsed_ms);
                return Err(Error::ControllerTimeout {
                    waited_ms: elapsed_ms,
                });
            }
            let step = self.poll_interval_ms.min(timeout_ms - elapsed_ms);
            delay.delay_ms(step);
            elapsed_ms += step;
        }
    }
}
