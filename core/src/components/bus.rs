use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusStatus {
    Idle,
    Busy,
    Failed,
}

impl fmt::Display for BusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "Idle",
            Self::Busy => "Busy",
            Self::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// The shared medium. Single channel: while `busy` no other station may
/// start, and once `failed` nothing starts until the bus is reset.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bus {
    pub busy: bool,
    pub failed: bool,
}

impl Bus {
    /// Returns `true` if the bus had already failed.
    pub fn fail(&mut self) -> bool {
        let already = self.failed;
        self.failed = true;
        already
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn status(&self) -> BusStatus {
        if self.failed {
            BusStatus::Failed
        } else if self.busy {
            BusStatus::Busy
        } else {
            BusStatus::Idle
        }
    }
}
