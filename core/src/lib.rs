pub mod analytics;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod event_log;
pub mod network;
pub mod random;
pub mod traits;

pub use analytics::{MetricPoint, MetricsCollector};
pub use components::bus::{Bus, BusStatus};
pub use components::collision::CollisionVisual;
pub use components::device::{Device, DeviceId, DeviceStats, DeviceStatus};
pub use components::packet::{Packet, Phase, TransmissionId};
pub use config::SimConfig;
pub use engine::{ActiveTransmission, Airtime, Fate, Outcome, Simulation, Snapshot};
pub use error::{AnalyticsError, ConfigError};
pub use event_log::{EventKind, EventLog, LogEntry, LogLevel, RejectReason};
pub use network::{Point, BUS_Y, CANVAS_HEIGHT, CANVAS_WIDTH};
pub use random::{ScriptedRandom, SeededRandom};
pub use traits::RandomSource;

/// Stations on the backbone. Fixed for the lifetime of the model.
pub const DEVICE_COUNT: usize = 6;
/// Pointer distance (canvas units) within which a device counts as hovered.
pub const HOVER_RADIUS: f32 = 30.0;
