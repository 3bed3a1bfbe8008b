use crate::engine::{Fate, Simulation};
use crate::error::AnalyticsError;
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct MetricPoint {
    pub tick: u64,
    pub sent_per_s: f32,
    pub collisions_per_s: f32,
    pub working_devices: usize,
}

/// Samples throughput once per simulated second and keeps an airtime
/// histogram (ticks on the medium per finished transmission).
pub struct MetricsCollector {
    pub history: VecDeque<MetricPoint>,
    pub max_points: usize,
    airtime: Histogram<u64>,
    last_sample_tick: u64,
    last_sent: u64,
    last_collisions: u64,
    last_airtime_seq: u64,
    completed: u64,
    aborted: u64,
    current_sent_rate: f32,
    current_collision_rate: f32,
}

impl MetricsCollector {
    pub fn new(max_points: usize) -> Result<Self, AnalyticsError> {
        Ok(Self {
            history: VecDeque::with_capacity(max_points),
            max_points,
            airtime: Histogram::new(3)?,
            last_sample_tick: 0,
            last_sent: 0,
            last_collisions: 0,
            last_airtime_seq: 0,
            completed: 0,
            aborted: 0,
            current_sent_rate: 0.0,
            current_collision_rate: 0.0,
        })
    }

    pub fn update(&mut self, sim: &Simulation) {
        let seen = self.last_airtime_seq;
        for (seq, airtime) in sim.airtimes().iter().filter(|(seq, _)| *seq > seen) {
            self.airtime.saturating_record(airtime.ticks);
            match airtime.fate {
                Fate::Completed => self.completed += 1,
                Fate::Aborted => self.aborted += 1,
            }
            self.last_airtime_seq = *seq;
        }

        let hz = u64::from(sim.config().tick_rate_hz.max(1));
        let now = sim.current_tick();
        if now < self.last_sample_tick + hz {
            return;
        }

        // Counters drop back to zero on reset, hence the saturating deltas.
        let (sent, collisions) = sim
            .devices()
            .iter()
            .fold((0u64, 0u64), |(s, c), d| (s + d.stats.sent, c + d.stats.collisions));
        let sent_delta = sent.saturating_sub(self.last_sent);
        let collision_delta = collisions.saturating_sub(self.last_collisions);

        let delta_t_s = (now - self.last_sample_tick) as f32 / hz as f32;
        let alpha = 0.3;
        self.current_sent_rate =
            self.current_sent_rate * (1.0 - alpha) + (sent_delta as f32 / delta_t_s) * alpha;
        self.current_collision_rate = self.current_collision_rate * (1.0 - alpha)
            + (collision_delta as f32 / delta_t_s) * alpha;

        self.history.push_back(MetricPoint {
            tick: now,
            sent_per_s: self.current_sent_rate,
            collisions_per_s: self.current_collision_rate,
            working_devices: sim.working_devices().len(),
        });
        if self.history.len() > self.max_points {
            self.history.pop_front();
        }

        self.last_sample_tick = now;
        self.last_sent = sent;
        self.last_collisions = collisions;
    }

    /// Airtime in ticks at percentile `p` (0..=100).
    pub fn airtime_percentile(&self, p: f64) -> Option<u64> {
        if self.airtime.is_empty() {
            return None;
        }
        Some(self.airtime.value_at_quantile(p / 100.0))
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn aborted(&self) -> u64 {
        self.aborted
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.airtime.reset();
        self.completed = 0;
        self.aborted = 0;
        self.last_sent = 0;
        self.last_collisions = 0;
        self.current_sent_rate = 0.0;
        self.current_collision_rate = 0.0;
    }
}
