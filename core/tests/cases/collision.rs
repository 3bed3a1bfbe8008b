use crate::common::TestHarness;
use busnet_core::*;

fn always_collides(picks: impl IntoIterator<Item = usize>) -> TestHarness {
    TestHarness::scripted(ScriptedRandom::new().with_picks(picks).with_units([0.0]), 1.0)
}

#[test]
fn test_deferred_collision_fires_after_one_second() {
    let mut h = always_collides([0]);
    h.sim.start_transmission();
    assert_eq!(h.sim.pending_effects(), 1);

    h.run_for(29);
    assert_eq!(h.collisions_detected(), 0);
    assert_eq!(h.sim.packets().len(), 1);

    h.run_for(1);
    assert_eq!(h.collisions_detected(), 1);
    assert!(h.sim.packets().is_empty(), "collision clears all packets");
    assert!(!h.sim.bus().busy);
    assert_eq!(h.device(1).stats.collisions, 1);
    assert_eq!(h.device(1).status, DeviceStatus::Idle);
    assert_eq!(h.sim.active_transmission(), None);
    assert_eq!(
        h.last_kind(),
        Some(&EventKind::CollisionTotal {
            device: DeviceId(1),
            total: 1
        })
    );
}

#[test]
fn test_collision_ring_fades_out() {
    let mut h = always_collides([0]);
    h.sim.start_transmission();
    h.run_for(30);

    let ring = h.sim.collisions()[0];
    assert_eq!(ring.position, Point::new(150.0, BUS_Y));
    assert!(ring.alpha < 255.0);

    h.run_for(49);
    assert_eq!(h.sim.collisions().len(), 1);
    h.run_for(1);
    assert!(h.sim.collisions().is_empty());
}

#[test]
fn test_collided_transmission_never_completes() {
    let mut h = always_collides([2]);
    h.sim.start_transmission();
    h.run_for(300);

    assert_eq!(h.completions(), 0);
    assert_eq!(h.device(3).stats.sent, 0);
    assert!(h.sim.devices().iter().all(|d| d.stats.received == 0));
    assert_eq!(h.sim.aborted_count(), 1);
}

#[test]
fn test_stale_collision_after_completion_is_ignored() {
    let config = SimConfig {
        collision_probability: 1.0,
        collision_delay_ms: 10_000,
        ..SimConfig::default()
    };
    let mut h = TestHarness::scripted_with(
        ScriptedRandom::new().with_picks([0]).with_units([0.0]),
        config,
    );
    h.sim.start_transmission();
    h.run_for(150);
    assert_eq!(h.completions(), 1);

    h.run_for(200);
    assert_eq!(h.sim.pending_effects(), 0, "deferred effect was consumed");
    assert_eq!(h.collisions_detected(), 0);
    assert_eq!(h.device(1).stats.collisions, 0);
}

#[test]
fn test_stale_collision_against_newer_transmission_is_ignored() {
    let config = SimConfig {
        collision_probability: 1.0,
        collision_delay_ms: 6_000,
        ..SimConfig::default()
    };
    // Both starts draw a collision; the first one comes due while the
    // second transmission holds the medium.
    let mut h = TestHarness::scripted_with(
        ScriptedRandom::new().with_picks([0, 0]).with_units([0.0, 0.0]),
        config,
    );
    h.sim.start_transmission();
    h.run_for(150);
    h.sim.start_transmission();
    assert_eq!(h.sender(), DeviceId(1), "same device, newer transmission");

    h.run_for(30);
    assert_eq!(h.sim.current_tick(), 180);
    assert_eq!(h.collisions_detected(), 0);
    assert_eq!(h.sim.packets().len(), 1);

    h.run_for(120);
    assert_eq!(h.completions(), 2);
}

#[test]
fn test_random_collision_hits_working_device() {
    let mut h = TestHarness::scripted(ScriptedRandom::new().with_picks([0, 2]), 0.0);
    h.sim.start_transmission();

    assert_eq!(h.sim.simulate_collision(None), Outcome::Applied);

    assert_eq!(h.device(3).stats.collisions, 1);
    assert_eq!(h.device(1).stats.collisions, 0);
    assert_eq!(h.device(1).status, DeviceStatus::Idle, "interrupted sender goes idle");
    assert!(h.sim.packets().is_empty());
    assert!(!h.sim.bus().busy);
    assert_eq!(h.sim.collisions()[0].position, Point::new(450.0, BUS_Y));
}

#[test]
fn test_random_collision_without_working_devices_is_noop() {
    let mut h = TestHarness::quiet();
    for _ in 0..DEVICE_COUNT {
        h.sim.inject_device_failure();
    }
    let logged = h.sim.log().len();

    assert_eq!(h.sim.simulate_collision(None), Outcome::Rejected);
    assert!(h.sim.collisions().is_empty());
    assert_eq!(h.sim.log().len(), logged);
    assert!(h.sim.devices().iter().all(|d| d.stats.collisions == 0));
}

#[test]
fn test_direct_collision_counts_exactly_once() {
    let mut h = TestHarness::quiet();
    h.sim.start_transmission();
    let sender = h.sender();

    h.sim.simulate_collision(Some(sender));
    h.sim.simulate_collision(Some(sender));

    assert_eq!(h.sim.device(sender).unwrap().stats.collisions, 2);
    assert_eq!(h.collisions_detected(), 2);
    assert_eq!(h.sim.collisions().len(), 2);
}

#[test]
fn test_pending_collision_dropped_after_bus_failure() {
    let mut h = always_collides([0]);
    h.sim.start_transmission();
    h.run_for(10);
    h.sim.inject_bus_failure();

    h.run_for(30);
    assert_eq!(h.collisions_detected(), 0);
    assert!(h.sim.devices().iter().all(|d| d.stats.collisions == 0));
    assert!(h.sim.collisions().is_empty());
    assert_eq!(h.sim.pending_effects(), 0);
}

#[test]
fn test_pending_collision_dropped_after_sender_fails() {
    // Second pick targets the sender for the failure.
    let mut h = always_collides([0, 0]);
    h.sim.start_transmission();
    h.run_for(10);
    h.sim.inject_device_failure();
    assert!(h.device(1).failed);

    h.run_for(30);
    assert_eq!(h.collisions_detected(), 0);
    assert!(h.sim.devices().iter().all(|d| d.stats.collisions == 0));
    assert_eq!(h.device(1).status, DeviceStatus::Failed);
    assert_eq!(h.sim.pending_effects(), 0);
}

#[test]
fn test_oversized_delay_never_fires() {
    let config = SimConfig {
        collision_probability: 1.0,
        collision_delay_ms: u64::MAX,
        ..SimConfig::default()
    };
    let mut h = TestHarness::scripted_with(
        ScriptedRandom::new().with_picks([0]).with_units([0.0]),
        config,
    );
    assert_eq!(h.sim.start_transmission(), Outcome::Applied);
    assert_eq!(h.sim.pending_effects(), 1);

    h.run_for(150);
    assert_eq!(h.collisions_detected(), 0);
    assert_eq!(h.completions(), 1);
}
