use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::components::bus::{Bus, BusStatus};
use crate::components::collision::CollisionVisual;
use crate::components::device::{Device, DeviceId, DeviceRegistry, DeviceStatus};
use crate::components::packet::{Packet, PacketEngine, PacketEvent, Phase, TransmissionId};
use crate::config::SimConfig;
use crate::event_log::{EventKind, EventLog, LogEntry, RejectReason};
use crate::network::Point;
use crate::random::SeededRandom;
use crate::traits::RandomSource;
use crate::{DEVICE_COUNT, HOVER_RADIUS};

/// Result of a user action. Rejections are already explained in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Contention event against `sender`, valid only while `transmission`
    /// is still the one on the medium.
    Collision {
        sender: DeviceId,
        transmission: TransmissionId,
    },
}

/// Queue entry ordered by due tick, then by insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub due: u64,
    pub sequence: u64,
    pub action: Deferred,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTransmission {
    pub id: TransmissionId,
    pub sender: DeviceId,
    pub started_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fate {
    Completed,
    Aborted,
}

/// How long one transmission held the medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airtime {
    pub finished_at: u64,
    pub ticks: u64,
    pub fate: Fate,
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketView {
    pub sender: DeviceId,
    pub phase: Phase,
    pub progress: f32,
    pub position: Point,
    pub is_collision: bool,
    pub receivers: Vec<Point>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub bus: BusStatus,
    pub devices: Vec<Device>,
    pub packets: Vec<PacketView>,
    pub collisions: Vec<CollisionVisual>,
}

/// The whole network: stations, medium, packets in flight and the pending
/// deferred effects. Every mutation goes through its methods.
pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) tick: u64,
    pub(crate) registry: DeviceRegistry,
    pub(crate) bus: Bus,
    pub(crate) packets: PacketEngine,
    pub(crate) collisions: Vec<CollisionVisual>,
    pub(crate) active: Option<ActiveTransmission>,
    pub(crate) rng: Box<dyn RandomSource>,
    scheduled: BinaryHeap<Reverse<Scheduled>>,
    next_sequence: u64,
    next_transmission: u64,
    log: EventLog,
    airtimes: Vec<(u64, Airtime)>,
    completed_count: u64,
    aborted_count: u64,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let rng = SeededRandom::new(config.seed);
        Self::with_random(config, Box::new(rng))
    }

    pub fn with_random(config: SimConfig, rng: Box<dyn RandomSource>) -> Self {
        let mut sim = Self {
            tick: 0,
            registry: DeviceRegistry::default(),
            bus: Bus::default(),
            packets: PacketEngine::new(config.ticks_per_phase()),
            collisions: Vec::new(),
            active: None,
            rng,
            scheduled: BinaryHeap::new(),
            next_sequence: 0,
            next_transmission: 0,
            log: EventLog::new(config.log_capacity),
            airtimes: Vec::new(),
            completed_count: 0,
            aborted_count: 0,
            config,
        };
        sim.reset();
        sim
    }

    /// One simulation step: due deferred effects fire first, then packets
    /// advance, then collision rings decay.
    pub fn tick(&mut self) {
        self.tick += 1;
        self.fire_due();
        self.advance_packets();
        self.animate_collisions();
    }

    pub fn run_ticks(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    pub fn start_transmission(&mut self) -> Outcome {
        if self.bus.failed {
            return self.reject(RejectReason::BusFailed);
        }
        if self.bus.busy {
            return self.reject(RejectReason::BusBusy);
        }
        let working = self.registry.working();
        if working.is_empty() {
            return self.reject(RejectReason::NoWorkingDevices);
        }
        let sender = working[self.rng.pick_index(working.len())];

        self.next_transmission += 1;
        let id = TransmissionId(self.next_transmission);
        self.registry.set_status(sender, DeviceStatus::Sending);
        self.bus.set_busy(true);
        self.active = Some(ActiveTransmission {
            id,
            sender,
            started_at: self.tick,
        });
        if let Some(device) = self.registry.get(sender) {
            self.packets.create(device, id, false);
        }
        self.emit(EventKind::PacketCreated { device: sender });
        self.emit(EventKind::TransmissionStarted {
            device: sender,
            transmission: id,
        });

        if self.rng.chance(self.config.collision_probability) {
            let due = self.tick.saturating_add(self.config.collision_delay_ticks());
            self.schedule(
                due,
                Deferred::Collision {
                    sender,
                    transmission: id,
                },
            );
        }
        Outcome::Applied
    }

    pub fn complete_transmission(&mut self, sender: DeviceId) {
        if self.registry.get(sender).is_none() {
            log::debug!("completion for unknown device {sender} ignored");
            return;
        }
        if let Some(active) = self.active.filter(|a| a.sender != sender) {
            log::debug!("completion for device {sender} ignored while {} holds the medium", active.sender);
            return;
        }
        let recipients = self.registry.deliver_from(sender);
        let mut sent = 0;
        if let Some(device) = self.registry.get_mut(sender) {
            device.stats.sent += 1;
            sent = device.stats.sent;
        }
        self.registry.set_status(sender, DeviceStatus::Idle);
        self.bus.set_busy(false);
        if self.active.is_some_and(|a| a.sender == sender) {
            self.finish_active(Fate::Completed);
        }
        self.emit(EventKind::TransmissionCompleted {
            device: sender,
            sent,
            recipients,
        });
    }

    pub fn inject_device_failure(&mut self) -> Outcome {
        let working = self.registry.working();
        if working.is_empty() {
            self.emit(EventKind::AllDevicesFailed);
            return Outcome::Rejected;
        }
        let device = working[self.rng.pick_index(working.len())];
        // Read before the status is overwritten with `Failed`.
        let was_sending = self.registry.mark_failed(device) == Some(DeviceStatus::Sending);

        self.emit(EventKind::DeviceFailed {
            device,
            remaining: working.len() - 1,
        });
        if was_sending {
            self.packets.clear();
            self.bus.set_busy(false);
            self.finish_active(Fate::Aborted);
            self.emit(EventKind::TransmissionTerminated { device });
        }
        Outcome::Applied
    }

    pub fn inject_bus_failure(&mut self) -> Outcome {
        if self.bus.fail() {
            self.emit(EventKind::BusAlreadyFailed);
            return Outcome::Rejected;
        }
        self.packets.clear();
        self.bus.set_busy(false);
        if let Some(active) = self.active {
            self.registry.set_status(active.sender, DeviceStatus::Idle);
        }
        self.finish_active(Fate::Aborted);

        self.emit(EventKind::BusFailed);
        self.emit(EventKind::TransmissionsTerminated);
        self.emit(EventKind::DevicesDisconnected {
            count: self.registry.working_count(),
        });
        Outcome::Applied
    }

    /// Fresh stations, idle bus, nothing in flight. The clock and the
    /// transmission counter keep running so stale effects stay stale.
    pub fn reset(&mut self) {
        self.registry.reset(DEVICE_COUNT);
        self.packets.clear();
        self.collisions.clear();
        self.scheduled.clear();
        self.bus.reset();
        self.active = None;

        self.emit(EventKind::Reset);
        self.emit(EventKind::DevicesInitialized {
            count: DEVICE_COUNT,
        });
        self.emit(EventKind::BusActive);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn devices(&self) -> &[Device] {
        self.registry.all()
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.registry.get(id)
    }

    pub fn working_devices(&self) -> Vec<DeviceId> {
        self.registry.working()
    }

    pub fn device_at(&self, point: Point) -> Option<&Device> {
        self.registry.device_at(point, HOVER_RADIUS)
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_status(&self) -> BusStatus {
        self.bus.status()
    }

    pub fn packets(&self) -> &[Packet] {
        self.packets.active()
    }

    /// Fan-out positions of `packet` towards every working receiver.
    pub fn receiver_positions(&self, packet: &Packet) -> Vec<(DeviceId, Point)> {
        self.registry
            .all()
            .iter()
            .filter(|d| d.is_working() && d.id != packet.sender)
            .map(|d| (d.id, packet.receiver_position(d.anchor)))
            .collect()
    }

    pub fn collisions(&self) -> &[CollisionVisual] {
        &self.collisions
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn active_transmission(&self) -> Option<ActiveTransmission> {
        self.active
    }

    pub fn pending_effects(&self) -> usize {
        self.scheduled.len()
    }

    /// Finished transmissions, oldest first, each tagged with a running
    /// sequence number.
    pub fn airtimes(&self) -> &[(u64, Airtime)] {
        &self.airtimes
    }

    pub fn completed_count(&self) -> u64 {
        self.completed_count
    }

    pub fn aborted_count(&self) -> u64 {
        self.aborted_count
    }

    pub fn snapshot(&self) -> Snapshot {
        let packets = self
            .packets()
            .iter()
            .map(|p| PacketView {
                sender: p.sender,
                phase: p.phase,
                progress: p.progress(),
                position: p.position(),
                is_collision: p.is_collision,
                receivers: if p.phase == Phase::Ascending {
                    self.receiver_positions(p).into_iter().map(|(_, at)| at).collect()
                } else {
                    Vec::new()
                },
            })
            .collect();
        Snapshot {
            tick: self.tick,
            bus: self.bus.status(),
            devices: self.registry.all().to_vec(),
            packets,
            collisions: self.collisions.clone(),
        }
    }

    pub fn snapshot_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or(serde_json::Value::Null)
    }

    pub(crate) fn emit(&mut self, kind: EventKind) {
        self.log.record(LogEntry {
            tick: self.tick,
            kind,
        });
    }

    pub(crate) fn finish_active(&mut self, fate: Fate) {
        let Some(active) = self.active.take() else {
            return;
        };
        match fate {
            Fate::Completed => self.completed_count += 1,
            Fate::Aborted => self.aborted_count += 1,
        }
        let seq = self.completed_count + self.aborted_count;
        self.airtimes.push((
            seq,
            Airtime {
                finished_at: self.tick,
                ticks: self.tick.saturating_sub(active.started_at),
                fate,
            },
        ));
        if self.airtimes.len() > 10_000 {
            let cutoff = self
                .tick
                .saturating_sub(60 * u64::from(self.config.tick_rate_hz));
            self.airtimes.retain(|(_, a)| a.finished_at >= cutoff);
        }
    }

    fn reject(&mut self, reason: RejectReason) -> Outcome {
        self.emit(EventKind::StartRejected(reason));
        Outcome::Rejected
    }

    fn schedule(&mut self, due: u64, action: Deferred) {
        self.next_sequence += 1;
        self.scheduled.push(Reverse(Scheduled {
            due,
            sequence: self.next_sequence,
            action,
        }));
    }

    fn is_live(&self, sender: DeviceId, transmission: TransmissionId) -> bool {
        self.active.is_some_and(|a| a.id == transmission && a.sender == sender)
            && self.bus.busy
            && self
                .registry
                .get(sender)
                .is_some_and(|d| d.status == DeviceStatus::Sending)
    }

    fn fire_due(&mut self) {
        while self
            .scheduled
            .peek()
            .is_some_and(|Reverse(next)| next.due <= self.tick)
        {
            let Some(Reverse(event)) = self.scheduled.pop() else {
                break;
            };
            match event.action {
                Deferred::Collision {
                    sender,
                    transmission,
                } => {
                    if self.is_live(sender, transmission) {
                        self.simulate_collision(Some(sender));
                    } else {
                        log::debug!("stale collision for transmission {transmission} dropped");
                    }
                }
            }
        }
    }

    fn advance_packets(&mut self) {
        for event in self.packets.advance() {
            match event {
                PacketEvent::ReachedBus { sender } => {
                    self.emit(EventKind::ReachedBus { device: sender });
                }
                PacketEvent::Broadcasting { sender } => {
                    self.emit(EventKind::Broadcasting { device: sender });
                }
                PacketEvent::Delivered { sender, .. } => self.complete_transmission(sender),
            }
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
