//! Power-state machine
//!
//! Every public [`Display`](crate::display::Display) operation is admitted
//! here before any bus traffic. A rejected operation never touches the bus.
//!
//! | op \ state     | Uninitialized | Active    | Sleeping  | DeepSleep | Off   |
//! |----------------|---------------|-----------|-----------|-----------|-------|
//! | Init           | Active        | Active    | Active    | Active    | ✗     |
//! | FullRefresh    | ✗             | Active    | wake¹     | ✗         | ✗     |
//! | PartialRefresh | ✗             | Active²   | wake¹ ²   | ✗         | ✗     |
//! | LightSleep     | ✗             | Sleeping³ | ✗         | ✗         | ✗     |
//! | Wake           | ✗             | ✗         | Active    | ✗         | ✗     |
//! | DeepSleep      | ✗             | DeepSleep | DeepSleep | ✗         | ✗     |
//! | PowerOff       | Off           | Off       | Off       | Off       | Off   |
//! | PowerOn        | ✗             | ✗         | ✗         | ✗         | Uninitialized |
//!
//! ¹ only when the controller's light sleep wakes on refresh
//! ² only after a full frame was written since the last init
//! ³ only for controllers with a register-retaining light sleep

use log::{debug, warn};

use crate::config::LightSleep;

/// Power state of the controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PowerState {
    /// Not initialized, or state lost after a fault
    #[default]
    Uninitialized,
    /// Initialized and ready for refreshes
    Active,
    /// Light sleep, registers retained
    Sleeping,
    /// Deep sleep; only a hardware reset (init) wakes the controller
    DeepSleep,
    /// Rails are off (advisory, set by `power_off`)
    Off,
}

/// Operations checked by the power-state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Reset and register programming
    Init,
    /// Full refresh, including `clear`
    FullRefresh,
    /// Partial (differential) refresh
    PartialRefresh,
    /// Enter register-retaining sleep
    LightSleep,
    /// Leave light sleep
    Wake,
    /// Enter deep sleep
    DeepSleep,
    /// Drive control lines low and record rails off
    PowerOff,
    /// Record rails back on
    PowerOn,
}

/// How an admitted operation must be carried out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Run the operation directly
    Proceed,
    /// Run the controller's wake steps first
    WakeFirst,
}

/// An operation the current state does not allow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rejected {
    /// State at the time of the request
    pub state: PowerState,
    /// Requested operation
    pub operation: Operation,
}

/// Power-state machine with per-session refresh flags
#[derive(Clone, Copy, Debug)]
pub struct PowerStateMachine {
    state: PowerState,
    light_sleep: LightSleep,
    partial_mode: bool,
    base_frame: bool,
}

impl PowerStateMachine {
    /// Create a machine in [`PowerState::Uninitialized`]
    pub fn new(light_sleep: LightSleep) -> Self {
        Self {
            state: PowerState::Uninitialized,
            light_sleep,
            partial_mode: false,
            base_frame: false,
        }
    }

    /// Current state
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Whether the partial mode-set steps are in effect
    pub fn partial_mode(&self) -> bool {
        self.partial_mode
    }

    /// Record that the partial mode-set steps were issued
    pub fn enter_partial_mode(&mut self) {
        self.partial_mode = true;
    }

    /// Record that the partial mode-set steps were undone
    pub fn leave_partial_mode(&mut self) {
        self.partial_mode = false;
    }

    /// Whether a full frame was written since the last init
    pub fn has_base_frame(&self) -> bool {
        self.base_frame
    }

    /// Check whether `operation` may run in the current state
    ///
    /// Pure: the state only changes through [`complete`](Self::complete) and
    /// [`fault`](Self::fault).
    pub fn admit(&self, operation: Operation) -> Result<Admission, Rejected> {
        use Operation as Op;
        use PowerState as S;

        let refresh = |requires_base: bool| {
            if requires_base && !self.base_frame {
                return None;
            }
            match self.state {
                S::Active => Some(Admission::Proceed),
                S::Sleeping if self.light_sleep.refresh_wakes() => Some(Admission::WakeFirst),
                _ => None,
            }
        };

        let admission = match (operation, self.state) {
            (Op::Init, S::Off) => None,
            (Op::Init, _) => Some(Admission::Proceed),
            (Op::FullRefresh, _) => refresh(false),
            (Op::PartialRefresh, _) => refresh(true),
            (Op::LightSleep, S::Active) if self.light_sleep.is_retained() => {
                Some(Admission::Proceed)
            }
            (Op::Wake, S::Sleeping) => Some(Admission::Proceed),
            (Op::DeepSleep, S::Active | S::Sleeping) => Some(Admission::Proceed),
            (Op::PowerOff, _) => Some(Admission::Proceed),
            (Op::PowerOn, S::Off) => Some(Admission::Proceed),
            _ => None,
        };

        admission.ok_or_else(|| {
            warn!("{:?} rejected in state {:?}", operation, self.state);
            Rejected {
                state: self.state,
                operation,
            }
        })
    }

    /// Record the resulting state of a completed operation
    pub fn complete(&mut self, operation: Operation) {
        let next = match operation {
            Operation::Init => {
                self.reset_session();
                PowerState::Active
            }
            Operation::FullRefresh => {
                self.base_frame = true;
                PowerState::Active
            }
            Operation::PartialRefresh | Operation::Wake => PowerState::Active,
            Operation::LightSleep => PowerState::Sleeping,
            Operation::DeepSleep => {
                self.reset_session();
                PowerState::DeepSleep
            }
            Operation::PowerOff => {
                self.reset_session();
                PowerState::Off
            }
            Operation::PowerOn => PowerState::Uninitialized,
        };
        self.transition(next);
    }

    /// Drop to [`PowerState::Uninitialized`] after a timeout or bus fault
    pub fn fault(&mut self) {
        warn!("Controller state lost in {:?}", self.state);
        self.reset_session();
        self.transition(PowerState::Uninitialized);
    }

    fn reset_session(&mut self) {
        self.partial_mode = false;
        self.base_frame = false;
    }

    fn transition(&mut self, next: PowerState) {
        if self.state != next {
            debug!("Power state {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }
}
