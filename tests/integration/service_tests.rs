//! Integration tests for the IrrigationService → ports pipeline.
//!
//! Scripted snapshots go in through `SensorPort`; the recorded actuator
//! calls and emitted events are checked on the way out.

use crate::mock_hw::{nominal, ActuatorCall, FixedClock, MockHardware, RecordingSink};

use irrigator::app::events::AppEvent;
use irrigator::app::service::IrrigationService;
use irrigator::app::telemetry::{TelemetryRecord, WallClock};
use irrigator::config::SystemConfig;
use irrigator::control::need::AlertLevel;
use irrigator::control::policy::Reason;
use irrigator::control::snapshot::SensorSnapshot;
use irrigator::error::SensorFault;

fn make_service(snap: SensorSnapshot) -> (IrrigationService, MockHardware, RecordingSink) {
    let mut svc = IrrigationService::new(&SystemConfig::default());
    let mut hw = MockHardware::new(snap);
    let mut sink = RecordingSink::new();
    svc.start(&mut hw, &mut sink);
    hw.calls.clear();
    sink.events.clear();
    (svc, hw, sink)
}

fn cycle(svc: &mut IrrigationService, hw: &mut MockHardware, sink: &mut RecordingSink) -> TelemetryRecord {
    svc.run_cycle(hw, &FixedClock::default(), sink)
}

#[test]
fn start_puts_actuators_in_safe_state() {
    let mut svc = IrrigationService::new(&SystemConfig::default());
    let mut hw = MockHardware::new(nominal());
    let mut sink = RecordingSink::new();
    svc.start(&mut hw, &mut sink);

    assert_eq!(hw.calls, vec![ActuatorCall::AllOff]);
    assert!(matches!(sink.events.as_slice(), [AppEvent::Started]));
}

#[test]
fn pump_is_written_every_cycle_even_when_unchanged() {
    let (mut svc, mut hw, mut sink) = make_service(nominal());
    for _ in 0..5 {
        cycle(&mut svc, &mut hw, &mut sink);
    }
    assert_eq!(hw.pump_writes(), vec![false; 5]);
    assert_eq!(svc.cycle_count(), 5);
}

#[test]
fn each_cycle_shows_exactly_one_alert_before_actuating_pump() {
    let (mut svc, mut hw, mut sink) = make_service(nominal());
    for _ in 0..3 {
        cycle(&mut svc, &mut hw, &mut sink);
    }
    assert_eq!(hw.alerts().len(), 3);
    for pair in hw.calls.chunks(2) {
        assert!(matches!(
            pair,
            [ActuatorCall::ShowAlert(_), ActuatorCall::SetPump(_)]
        ));
    }
}

#[test]
fn dry_soil_in_low_light_irrigates() {
    let (mut svc, mut hw, mut sink) = make_service(SensorSnapshot {
        soil_moisture_pct: Some(15),
        light_pct: Some(10),
        ..nominal()
    });
    let record = cycle(&mut svc, &mut hw, &mut sink);

    assert!(record.irrigate);
    assert_eq!(record.reason, Reason::DrySoilLightOk);
    assert_eq!(record.need_pct.map(|n| n.percent()), Some(85));
    assert_eq!(record.alert, AlertLevel::Critical);
    assert!(hw.pump_on());
}

#[test]
fn rain_wins_over_dry_soil() {
    let (mut svc, mut hw, mut sink) = make_service(SensorSnapshot {
        rain_detected: true,
        soil_moisture_pct: Some(5),
        light_pct: Some(0),
        ..nominal()
    });
    let record = cycle(&mut svc, &mut hw, &mut sink);

    assert!(!record.irrigate);
    assert_eq!(record.reason, Reason::RainDetected);
    assert!(!hw.pump_on());
}

#[test]
fn heat_with_moderately_dry_soil_triggers_thermal_assist() {
    let (mut svc, mut hw, mut sink) = make_service(SensorSnapshot {
        air_temperature_c: Some(38.0),
        soil_moisture_pct: Some(45),
        light_pct: Some(90),
        ..nominal()
    });
    let record = cycle(&mut svc, &mut hw, &mut sink);

    assert_eq!(record.reason, Reason::ThermalAssist);
    assert!(record.irrigate);
    assert_eq!(record.alert, AlertLevel::High);
}

#[test]
fn missing_soil_reading_fails_safe_and_reports_fault_transitions_once() {
    let lost = SensorSnapshot {
        soil_moisture_pct: None,
        ..nominal()
    };
    let (mut svc, mut hw, mut sink) = make_service(nominal());
    hw.script([nominal(), lost, lost, nominal()]);

    let records: Vec<_> = (0..4).map(|_| cycle(&mut svc, &mut hw, &mut sink)).collect();

    assert_eq!(records[1].reason, Reason::SensorFault);
    assert!(!records[1].irrigate);
    assert_eq!(records[1].need_pct, None);
    assert_eq!(records[1].alert, AlertLevel::Critical);
    assert_eq!(records[2].sensor_faults, SensorFault::SoilMoisture.mask());
    assert_eq!(records[3].sensor_faults, 0);

    let faults = sink.fault_events();
    assert_eq!(faults.len(), 2, "one set, one clear: {:?}", faults);
    assert!(matches!(faults[0], AppEvent::FaultDetected(m) if *m == SensorFault::SoilMoisture.mask()));
    assert!(matches!(faults[1], AppEvent::FaultCleared));
    assert_eq!(svc.sensor_faults(), 0);
}

#[test]
fn informational_faults_do_not_block_irrigation() {
    let (mut svc, mut hw, mut sink) = make_service(SensorSnapshot {
        air_humidity_pct: None,
        soil_temperature_c: None,
        soil_moisture_pct: Some(10),
        ..nominal()
    });
    let record = cycle(&mut svc, &mut hw, &mut sink);

    assert_eq!(record.reason, Reason::DrySoilLightOk);
    assert_ne!(record.sensor_faults, 0);
}

#[test]
fn decision_change_is_reported_only_on_change() {
    let dry = SensorSnapshot {
        soil_moisture_pct: Some(10),
        ..nominal()
    };
    let (mut svc, mut hw, mut sink) = make_service(nominal());
    hw.script([nominal(), nominal(), dry, dry]);
    for _ in 0..4 {
        cycle(&mut svc, &mut hw, &mut sink);
    }

    assert_eq!(sink.decision_changes(), 1);
    let change = sink.events.iter().find_map(|e| match e {
        AppEvent::DecisionChanged { from, to } => Some((from.reason, to.reason)),
        _ => None,
    });
    assert_eq!(change, Some((Reason::MoistureAdequate, Reason::DrySoilLightOk)));
    assert_eq!(svc.last_decision().map(|d| d.irrigate), Some(true));
}

#[test]
fn cycle_event_carries_the_returned_record_and_wall_clock() {
    let (mut svc, mut hw, mut sink) = make_service(nominal());
    let clock = FixedClock {
        uptime_ms: 4_000,
        time: Some(WallClock::from_epoch_secs(13 * 3600 + 5 * 60 + 7, 0)),
    };
    let record = svc.run_cycle(&mut hw, &clock, &mut sink);

    assert_eq!(record.cycle, 1);
    assert_eq!(record.time.map(|t| t.to_string()).as_deref(), Some("13:05:07"));
    match sink.events.last() {
        Some(AppEvent::Cycle(emitted)) => assert_eq!(*emitted, record),
        other => panic!("expected Cycle event last, got {:?}", other),
    }
}

#[test]
fn stop_turns_everything_off() {
    let (mut svc, mut hw, mut sink) = make_service(SensorSnapshot {
        soil_moisture_pct: Some(5),
        ..nominal()
    });
    cycle(&mut svc, &mut hw, &mut sink);
    assert!(hw.pump_on());

    svc.stop(&mut hw);
    assert_eq!(hw.calls.last(), Some(&ActuatorCall::AllOff));
    assert!(!hw.pump_on());
}
