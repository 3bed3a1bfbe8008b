use crate::common::TestHarness;
use busnet_core::*;

fn drive(h: &mut TestHarness) {
    for round in 0..40 {
        h.sim.start_transmission();
        h.run_for(45);
        if round % 13 == 12 {
            h.sim.inject_device_failure();
        }
        h.run_for(120);
    }
}

fn senders(h: &TestHarness) -> Vec<DeviceId> {
    h.sim
        .log()
        .iter()
        .filter_map(|e| match e.kind {
            EventKind::TransmissionStarted { device, .. } => Some(device),
            _ => None,
        })
        .collect()
}

#[test]
fn test_determinism_across_runs() {
    let seed = 12345;

    let mut h1 = TestHarness::new_with_seed(seed);
    drive(&mut h1);

    let mut h2 = TestHarness::new_with_seed(seed);
    drive(&mut h2);

    let log1: Vec<&LogEntry> = h1.sim.log().iter().collect();
    let log2: Vec<&LogEntry> = h2.sim.log().iter().collect();
    assert_eq!(log1, log2, "Event log mismatch");
    assert_eq!(h1.sim.devices(), h2.sim.devices(), "Device state mismatch");
    assert_eq!(h1.sim.airtimes(), h2.sim.airtimes(), "Airtime mismatch");
}

#[test]
fn test_determinism_with_different_seeds() {
    let mut h1 = TestHarness::new_with_seed(100);
    drive(&mut h1);

    let mut h2 = TestHarness::new_with_seed(200);
    drive(&mut h2);

    assert_ne!(
        senders(&h1),
        senders(&h2),
        "Different seeds should pick different senders"
    );
}

#[test]
fn test_collisions_roughly_match_probability() {
    let mut h = TestHarness::new_with_seed(2024);
    let mut started = 0;
    for _ in 0..400 {
        if h.sim.start_transmission() == Outcome::Applied {
            started += 1;
        }
        h.run_for(150);
    }
    let rate = h.collisions_detected() as f64 / started as f64;

    assert_eq!(started, 400);
    assert_eq!(h.completions() + h.collisions_detected(), 400);
    assert!(
        (rate - 0.3).abs() < 0.08,
        "Collision rate {:.2} should be close to 0.3",
        rate
    );
}
