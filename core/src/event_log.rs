use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::device::DeviceId;
use crate::components::packet::TransmissionId;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    BusFailed,
    BusBusy,
    NoWorkingDevices,
}

/// Every state transition the engine reports.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Reset,
    DevicesInitialized { count: usize },
    BusActive,
    StartRejected(RejectReason),
    TransmissionStarted { device: DeviceId, transmission: TransmissionId },
    PacketCreated { device: DeviceId },
    ReachedBus { device: DeviceId },
    Broadcasting { device: DeviceId },
    TransmissionCompleted { device: DeviceId, sent: u64, recipients: usize },
    CollisionDetected { device: DeviceId },
    CollisionTotal { device: DeviceId, total: u64 },
    DeviceFailed { device: DeviceId, remaining: usize },
    AllDevicesFailed,
    TransmissionTerminated { device: DeviceId },
    BusFailed,
    TransmissionsTerminated,
    DevicesDisconnected { count: usize },
    BusAlreadyFailed,
}

impl EventKind {
    pub fn level(&self) -> LogLevel {
        match self {
            Self::BusActive | Self::TransmissionCompleted { .. } => LogLevel::Success,
            Self::DeviceFailed { .. } | Self::BusAlreadyFailed => LogLevel::Warning,
            Self::StartRejected(_)
            | Self::CollisionDetected { .. }
            | Self::AllDevicesFailed
            | Self::TransmissionTerminated { .. }
            | Self::BusFailed
            | Self::TransmissionsTerminated => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => write!(f, "Simulation reset"),
            Self::DevicesInitialized { count } => write!(f, "{count} devices initialized"),
            Self::BusActive => write!(f, "Bus backbone active"),
            Self::StartRejected(RejectReason::BusFailed) => write!(f, "Cannot start - bus has failed"),
            Self::StartRejected(RejectReason::BusBusy) => write!(f, "Cannot start - bus is busy"),
            Self::StartRejected(RejectReason::NoWorkingDevices) => write!(f, "No working devices available"),
            Self::TransmissionStarted { device, transmission } => {
                write!(f, "Device {device} starting transmission {transmission}")
            }
            Self::PacketCreated { device } => write!(f, "Device {device} created new packet"),
            Self::ReachedBus { device } => write!(f, "Packet from Device {device} reached the bus"),
            Self::Broadcasting { device } => write!(f, "Packet from Device {device} broadcasting on bus"),
            Self::TransmissionCompleted { device, sent, recipients } => write!(
                f,
                "Device {device} completed transmission (total sent: {sent}, received by {recipients} device(s))"
            ),
            Self::CollisionDetected { device } => {
                write!(f, "Collision detected! Device {device}'s transmission failed")
            }
            Self::CollisionTotal { device, total } => {
                write!(f, "Total collisions for Device {device}: {total}")
            }
            Self::DeviceFailed { device, remaining } => {
                write!(f, "Device {device} has failed, {remaining} working device(s) remaining")
            }
            Self::AllDevicesFailed => write!(f, "All devices have failed"),
            Self::TransmissionTerminated { device } => {
                write!(f, "Ongoing transmission from Device {device} terminated due to failure")
            }
            Self::BusFailed => write!(f, "Bus backbone has failed"),
            Self::TransmissionsTerminated => write!(f, "All ongoing transmissions terminated"),
            Self::DevicesDisconnected { count } => {
                write!(f, "{count} device(s) disconnected from network")
            }
            Self::BusAlreadyFailed => write!(f, "Bus already failed"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub tick: u64,
    pub kind: EventKind,
}

impl LogEntry {
    pub fn level(&self) -> LogLevel {
        self.kind.level()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>6}] {}", self.tick, self.kind)
    }
}

impl LogLevel {
    /// Level used when mirroring to the `log` facade.
    pub fn as_log_level(self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Info | LogLevel::Success => log::Level::Info,
        }
    }
}

/// Append-only sink. Retention is the sink's business: only the most
/// recent `capacity` entries are kept.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    recorded: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            recorded: 0,
        }
    }

    pub fn record(&mut self, entry: LogEntry) {
        log::log!(entry.level().as_log_level(), "{entry}");
        self.entries.push_back(entry);
        self.recorded += 1;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ever recorded, including evicted ones.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }
}
