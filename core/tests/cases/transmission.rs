use crate::common::TestHarness;
use busnet_core::*;

#[test]
fn test_phase_transitions_land_on_fifty_tick_boundaries() {
    let mut h = TestHarness::quiet();
    h.sim.start_transmission();
    h.run_for(150);

    assert_eq!(h.ticks_of(|k| matches!(k, EventKind::ReachedBus { .. })), vec![50]);
    assert_eq!(h.ticks_of(|k| matches!(k, EventKind::Broadcasting { .. })), vec![100]);
    assert_eq!(
        h.ticks_of(|k| matches!(k, EventKind::TransmissionCompleted { .. })),
        vec![150]
    );
}

#[test]
fn test_nothing_completes_one_tick_early() {
    let mut h = TestHarness::quiet();
    h.sim.start_transmission();
    h.run_for(149);

    assert_eq!(h.completions(), 0);
    assert_eq!(h.sim.packets().len(), 1);
    assert_eq!(h.sim.packets()[0].phase, Phase::Ascending);
    assert_eq!(h.sim.bus_status(), BusStatus::Busy);
}

#[test]
fn test_progress_resets_once_per_transition() {
    let mut h = TestHarness::quiet();
    h.sim.start_transmission();

    let mut previous = (Phase::Descending, 0.0f32);
    let mut transitions = 0;
    for _ in 0..149 {
        h.sim.tick();
        let packet = &h.sim.packets()[0];
        if packet.phase == previous.0 {
            assert!(
                packet.progress() > previous.1,
                "progress must strictly increase within {:?}",
                packet.phase
            );
        } else {
            transitions += 1;
            assert_eq!(packet.progress(), 0.0, "progress resets on transition");
        }
        previous = (packet.phase, packet.progress());
    }
    assert_eq!(transitions, 2);
}

#[test]
fn test_start_marks_sender_and_bus() {
    let mut h = TestHarness::scripted(ScriptedRandom::new().with_picks([3]), 0.0);
    h.sim.start_transmission();

    assert_eq!(h.sender(), DeviceId(4));
    assert_eq!(h.device(4).status, DeviceStatus::Sending);
    assert!(h.sim.bus().busy);
    assert_eq!(h.sim.packets()[0].sender, DeviceId(4));
    assert!(!h.sim.packets()[0].is_collision);
    assert!(matches!(
        h.last_kind(),
        Some(EventKind::TransmissionStarted { device: DeviceId(4), .. })
    ));
    assert_eq!(h.count(|k| matches!(k, EventKind::PacketCreated { .. })), 1);
}

#[test]
fn test_start_refused_while_busy() {
    let mut h = TestHarness::quiet();
    h.sim.start_transmission();
    let first = h.sender();

    assert_eq!(h.sim.start_transmission(), Outcome::Rejected);
    assert_eq!(h.last_kind(), Some(&EventKind::StartRejected(RejectReason::BusBusy)));
    assert_eq!(h.sim.packets().len(), 1);
    assert_eq!(h.sender(), first);
}

#[test]
fn test_complete_transmission_credits_everyone_once() {
    let mut h = TestHarness::scripted(ScriptedRandom::new().with_picks([4]), 0.0);
    h.sim.inject_device_failure();
    assert!(h.device(5).failed);

    h.sim.complete_transmission(DeviceId(2));

    assert_eq!(h.device(2).stats.sent, 1);
    assert_eq!(h.device(2).stats.received, 0);
    for id in [1, 3, 4, 6] {
        assert_eq!(h.device(id).stats.received, 1, "device {} receives once", id);
    }
    assert_eq!(h.device(5).stats.received, 0, "failed device receives nothing");
    assert!(!h.sim.bus().busy);
    assert_eq!(
        h.last_kind(),
        Some(&EventKind::TransmissionCompleted {
            device: DeviceId(2),
            sent: 1,
            recipients: 4
        })
    );
}

#[test]
fn test_receivers_fan_out_while_ascending() {
    let mut h = TestHarness::scripted(ScriptedRandom::new().with_picks([0]), 0.0);
    h.sim.start_transmission();
    h.run_for(125);

    let packet = h.sim.packets()[0].clone();
    assert_eq!(packet.phase, Phase::Ascending);
    assert_eq!(packet.position(), Point::new(150.0, BUS_Y));

    let receivers = h.sim.receiver_positions(&packet);
    assert_eq!(receivers.len(), 5, "every working device but the sender");
    assert!(receivers.iter().all(|(id, _)| *id != DeviceId(1)));
    let (_, towards_two) = receivers.iter().find(|(id, _)| *id == DeviceId(2)).unwrap();
    assert_eq!(*towards_two, Point::new(300.0, 375.0));
}

#[test]
fn test_back_to_back_transmissions() {
    let mut h = TestHarness::quiet();
    for _ in 0..4 {
        assert_eq!(h.sim.start_transmission(), Outcome::Applied);
        h.run_for(150);
    }

    assert_eq!(h.completions(), 4);
    let sent: u64 = h.sim.devices().iter().map(|d| d.stats.sent).sum();
    let received: u64 = h.sim.devices().iter().map(|d| d.stats.received).sum();
    assert_eq!(sent, 4);
    assert_eq!(received, 20);
    assert!(h.statuses().iter().all(|s| *s == DeviceStatus::Idle));
}

#[test]
fn test_snapshot_reflects_state() {
    let mut h = TestHarness::quiet();
    h.sim.start_transmission();
    h.run_for(10);

    let snapshot = h.sim.snapshot();
    assert_eq!(snapshot.tick, 10);
    assert_eq!(snapshot.bus, BusStatus::Busy);
    assert_eq!(snapshot.devices.len(), DEVICE_COUNT);
    assert_eq!(snapshot.packets.len(), 1);
    assert!(snapshot.packets[0].receivers.is_empty());

    let json = h.sim.snapshot_json();
    assert_eq!(json["bus"], "Busy");
    assert_eq!(json["devices"].as_array().map(Vec::len), Some(6));
}

#[test]
fn test_completion_for_bystander_leaves_medium_held() {
    let mut h = TestHarness::scripted(ScriptedRandom::new().with_picks([0, 0]), 0.0);
    h.sim.start_transmission();
    assert_eq!(h.sender(), DeviceId(1));

    h.sim.complete_transmission(DeviceId(3));

    assert!(h.sim.bus().busy, "the real sender still holds the medium");
    assert_eq!(h.device(1).status, DeviceStatus::Sending);
    assert_eq!(h.device(3).stats.sent, 0);
    assert!(h.sim.devices().iter().all(|d| d.stats.received == 0));
    assert_eq!(h.completions(), 0);

    assert_eq!(h.sim.start_transmission(), Outcome::Rejected);
    assert_eq!(h.sim.packets().len(), 1);

    h.run_for(150);
    assert_eq!(h.completions(), 1);
    assert_eq!(h.device(1).stats.sent, 1);
}
