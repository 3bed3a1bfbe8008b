use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::device::{Device, DeviceId};
use crate::network::{lerp, Point, BUS_Y};

/// Stamp of one `start_transmission` call. Never reused within a
/// simulation's lifetime.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransmissionId(pub u64);

impl fmt::Display for TransmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Travelling down the drop cable towards the backbone.
    Descending,
    /// Dwelling on the backbone.
    Broadcasting,
    /// Fanning out from the backbone to every receiver.
    Ascending,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Packet {
    pub sender: DeviceId,
    pub transmission: TransmissionId,
    /// Sender anchor at creation time.
    pub origin: Point,
    pub phase: Phase,
    pub is_collision: bool,
    elapsed: u32,
    ticks_per_phase: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketEvent {
    ReachedBus {
        sender: DeviceId,
    },
    Broadcasting {
        sender: DeviceId,
    },
    Delivered {
        sender: DeviceId,
        transmission: TransmissionId,
    },
}

impl Packet {
    /// Position within the current phase, in `[0, 1]`, stepped in whole
    /// ticks of `1 / ticks_per_phase`.
    pub fn progress(&self) -> f32 {
        (self.elapsed as f32 / self.ticks_per_phase as f32).min(1.0)
    }

    pub fn position(&self) -> Point {
        match self.phase {
            Phase::Descending => Point::new(self.origin.x, lerp(self.origin.y, BUS_Y, self.progress())),
            Phase::Broadcasting | Phase::Ascending => Point::new(self.origin.x, BUS_Y),
        }
    }

    /// Where the copy headed for a receiver anchored at `anchor` is drawn.
    /// Only meaningful while ascending; earlier phases keep it on the bus.
    pub fn receiver_position(&self, anchor: Point) -> Point {
        let t = if self.phase == Phase::Ascending { self.progress() } else { 0.0 };
        Point::new(anchor.x, lerp(BUS_Y, anchor.y, t))
    }

    /// One tick of progress. At most one phase transition per call.
    fn step(&mut self) -> Option<PacketEvent> {
        self.elapsed += 1;
        if self.elapsed < self.ticks_per_phase {
            log::trace!("packet {} {:?} at {:.2}", self.transmission, self.phase, self.progress());
            return None;
        }
        match self.phase {
            Phase::Descending => {
                self.phase = Phase::Broadcasting;
                self.elapsed = 0;
                Some(PacketEvent::ReachedBus { sender: self.sender })
            }
            Phase::Broadcasting => {
                self.phase = Phase::Ascending;
                self.elapsed = 0;
                Some(PacketEvent::Broadcasting { sender: self.sender })
            }
            Phase::Ascending => Some(PacketEvent::Delivered {
                sender: self.sender,
                transmission: self.transmission,
            }),
        }
    }
}

/// Owns every in-flight packet and moves them through their phases.
#[derive(Debug, Clone)]
pub struct PacketEngine {
    packets: Vec<Packet>,
    ticks_per_phase: u32,
}

impl PacketEngine {
    pub fn new(ticks_per_phase: u32) -> Self {
        Self {
            packets: Vec::new(),
            ticks_per_phase: ticks_per_phase.max(1),
        }
    }

    /// The caller guarantees the medium is free; a second live packet is
    /// not rejected here.
    pub fn create(&mut self, sender: &Device, transmission: TransmissionId, is_collision: bool) {
        self.packets.push(Packet {
            sender: sender.id,
            transmission,
            origin: sender.anchor,
            phase: Phase::Descending,
            is_collision,
            elapsed: 0,
            ticks_per_phase: self.ticks_per_phase,
        });
    }

    pub fn active(&self) -> &[Packet] {
        &self.packets
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Drops every in-flight packet and returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.packets.len();
        self.packets.clear();
        dropped
    }

    /// Advances all packets by one tick. Delivered packets leave the active
    /// set; their completion is up to the caller.
    pub fn advance(&mut self) -> Vec<PacketEvent> {
        let mut events = Vec::new();
        self.packets.retain_mut(|packet| match packet.step() {
            Some(event @ PacketEvent::Delivered { .. }) => {
                events.push(event);
                false
            }
            Some(event) => {
                events.push(event);
                true
            }
            None => true,
        });
        events
    }
}
