use busnet_core::*;

pub struct TestHarness {
    pub sim: Simulation,
}

impl TestHarness {
    /// Seeded run with the default collision policy.
    pub fn new_with_seed(seed: u64) -> Self {
        Self::with_config(base_config().with_seed(seed))
    }

    /// Seeded run that never schedules collisions.
    pub fn quiet() -> Self {
        Self::with_config(base_config().with_seed(7).with_collision_probability(0.0))
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            sim: Simulation::new(config),
        }
    }

    pub fn scripted(rng: ScriptedRandom, collision_probability: f64) -> Self {
        Self::scripted_with(rng, base_config().with_collision_probability(collision_probability))
    }

    pub fn scripted_with(rng: ScriptedRandom, config: SimConfig) -> Self {
        Self {
            sim: Simulation::with_random(config, Box::new(rng)),
        }
    }

    pub fn run_for(&mut self, ticks: u64) {
        self.sim.run_ticks(ticks);
    }

    pub fn device(&self, id: u32) -> &Device {
        self.sim.device(DeviceId(id)).unwrap()
    }

    pub fn statuses(&self) -> Vec<DeviceStatus> {
        self.sim.devices().iter().map(|d| d.status).collect()
    }

    pub fn sender(&self) -> DeviceId {
        self.sim.active_transmission().unwrap().sender
    }

    pub fn count(&self, pred: impl Fn(&EventKind) -> bool) -> usize {
        self.sim.log().iter().filter(|e| pred(&e.kind)).count()
    }

    pub fn completions(&self) -> usize {
        self.count(|k| matches!(k, EventKind::TransmissionCompleted { .. }))
    }

    pub fn collisions_detected(&self) -> usize {
        self.count(|k| matches!(k, EventKind::CollisionDetected { .. }))
    }

    pub fn last_kind(&self) -> Option<&EventKind> {
        self.sim.log().last().map(|e| &e.kind)
    }

    pub fn ticks_of(&self, pred: impl Fn(&EventKind) -> bool) -> Vec<u64> {
        self.sim
            .log()
            .iter()
            .filter(|e| pred(&e.kind))
            .map(|e| e.tick)
            .collect()
    }
}

fn base_config() -> SimConfig {
    SimConfig {
        log_capacity: 10_000,
        ..SimConfig::default()
    }
}
