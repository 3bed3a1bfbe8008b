use std::fmt;

use serde::{Deserialize, Serialize};

use crate::network::{device_anchor, Point};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceStatus {
    Idle,
    Sending,
    Failed,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub sent: u64,
    pub received: u64,
    pub collisions: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub anchor: Point,
    pub status: DeviceStatus,
    pub failed: bool,
    pub stats: DeviceStats,
}

impl Device {
    fn fresh(index: usize) -> Self {
        Self {
            id: DeviceId(index as u32 + 1),
            anchor: device_anchor(index),
            status: DeviceStatus::Idle,
            failed: false,
            stats: DeviceStats::default(),
        }
    }

    pub fn is_working(&self) -> bool {
        !self.failed
    }
}

/// The fixed station population. Devices are never removed individually;
/// `reset` swaps in a whole new batch.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new(count: usize) -> Self {
        let mut registry = Self::default();
        registry.reset(count);
        registry
    }

    pub fn reset(&mut self, count: usize) {
        self.devices = (0..count).map(Device::fresh).collect();
    }

    pub fn all(&self) -> &[Device] {
        &self.devices
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    pub fn working(&self) -> Vec<DeviceId> {
        self.devices
            .iter()
            .filter(|d| d.is_working())
            .map(|d| d.id)
            .collect()
    }

    pub fn working_count(&self) -> usize {
        self.devices.iter().filter(|d| d.is_working()).count()
    }

    /// Marks the device failed and returns the status it had before, so a
    /// caller can tell whether a transmission was cut short.
    pub fn mark_failed(&mut self, id: DeviceId) -> Option<DeviceStatus> {
        let device = self.get_mut(id)?;
        let prior = device.status;
        device.failed = true;
        device.status = DeviceStatus::Failed;
        Some(prior)
    }

    /// Status changes never resurrect a failed device.
    pub fn set_status(&mut self, id: DeviceId, status: DeviceStatus) {
        if let Some(device) = self.get_mut(id) {
            if !device.failed {
                device.status = status;
            }
        }
    }

    /// Credits one reception to every working device except `sender` and
    /// returns how many were credited.
    pub fn deliver_from(&mut self, sender: DeviceId) -> usize {
        let mut recipients = 0;
        for device in self.devices.iter_mut() {
            if device.is_working() && device.id != sender {
                device.stats.received += 1;
                recipients += 1;
            }
        }
        recipients
    }

    pub fn device_at(&self, point: Point, radius: f32) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.anchor.distance(point) < radius)
    }
}
