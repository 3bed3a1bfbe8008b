use serde::{Deserialize, Serialize};

use crate::components::device::{DeviceId, DeviceStatus};
use crate::engine::{Fate, Outcome, Simulation};
use crate::event_log::EventKind;
use crate::network::{tap_point, Point};

pub const COLLISION_START_SIZE: f32 = 10.0;
pub const COLLISION_START_ALPHA: f32 = 255.0;
pub const COLLISION_GROWTH: f32 = 2.0;
pub const COLLISION_FADE: f32 = 5.0;

/// Expanding, fading ring drawn where a collision hit the bus. Cosmetic
/// only: it carries no transmission state.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CollisionVisual {
    pub position: Point,
    pub size: f32,
    pub alpha: f32,
}

impl CollisionVisual {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            size: COLLISION_START_SIZE,
            alpha: COLLISION_START_ALPHA,
        }
    }

    /// Grows and fades one tick. Returns `false` once fully faded.
    pub fn decay(&mut self) -> bool {
        self.size += COLLISION_GROWTH;
        self.alpha -= COLLISION_FADE;
        self.alpha > 0.0
    }
}

impl Simulation {
    /// Corrupts the medium on behalf of `sender`, or of a random working
    /// device when none is given. Every in-flight packet is lost, not just
    /// the sender's.
    pub fn simulate_collision(&mut self, sender: Option<DeviceId>) -> Outcome {
        let sender = match sender {
            Some(id) => id,
            None => {
                let working = self.registry.working();
                if working.is_empty() {
                    return Outcome::Rejected;
                }
                working[self.rng.pick_index(working.len())]
            }
        };
        let Some(device) = self.registry.get_mut(sender) else {
            log::debug!("collision for unknown device {sender} ignored");
            return Outcome::Rejected;
        };
        device.stats.collisions += 1;
        let total = device.stats.collisions;
        let at = tap_point(device.anchor);

        self.collisions.push(CollisionVisual::new(at));
        self.packets.clear();
        self.bus.set_busy(false);
        if let Some(active) = self.active {
            self.registry.set_status(active.sender, DeviceStatus::Idle);
        }
        self.registry.set_status(sender, DeviceStatus::Idle);
        self.finish_active(Fate::Aborted);

        self.emit(EventKind::CollisionDetected { device: sender });
        self.emit(EventKind::CollisionTotal { device: sender, total });
        Outcome::Applied
    }

    pub(crate) fn animate_collisions(&mut self) {
        self.collisions.retain_mut(CollisionVisual::decay);
    }
}
