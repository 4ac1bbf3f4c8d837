//! Integration tests for the MonitorService tick pipeline:
//! sensors → classify → baseline bookkeeping → alert FSM → display.

use airwatch::air_quality::AirQualityLevel;
use airwatch::app::events::AppEvent;
use airwatch::app::service::{BaselineTask, MonitorService};
use airwatch::app::shared::SharedState;
use airwatch::baseline::{Baseline, BaselineValues};
use airwatch::error::{Error, SensorError};
use airwatch::fsm::frame::{Field, Frame};
use airwatch::readings::GasSample;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::mock_hw::{DisplayCall, MockHardware, MockLogs, MockStore, RecordingSink, VirtualClock};

type Service = MonitorService<MockHardware, MockStore, MockLogs, RecordingSink>;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn stored_at(at: DateTime<Utc>) -> Baseline {
    Baseline::new(BaselineValues { eco2: 0x8a10, tvoc: 0x8b20 }, at)
}

fn make_service(hw: MockHardware, store: MockStore) -> (Service, RecordingSink) {
    make_service_with_logs(hw, store, MockLogs::default())
}

fn make_service_with_logs(hw: MockHardware, store: MockStore, logs: MockLogs) -> (Service, RecordingSink) {
    let sink = RecordingSink::new();
    let service = MonitorService::new(
        hw,
        store,
        logs,
        sink.clone(),
        Arc::new(SharedState::new()),
        TimeDelta::minutes(10),
    );
    (service, sink)
}

// ── Startup / restore ─────────────────────────────────────────

#[test]
fn six_day_old_baseline_is_restored() {
    let stored = stored_at(t0() - TimeDelta::days(6));
    let (mut svc, sink) = make_service(MockHardware::new(), MockStore::holding(stored));

    let restored = svc.start(t0()).unwrap();

    assert_eq!(restored, Some(stored));
    assert_eq!(svc.hw().applied_baselines, vec![stored.values()]);
    assert_eq!(svc.next_commit(), Some(t0() + TimeDelta::hours(1)));
    assert_eq!(svc.shared().baseline(), Some(stored));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Started { restored: Some(_), .. })),
        1
    );
}

#[test]
fn eight_day_old_baseline_is_discarded() {
    let stored = stored_at(t0() - TimeDelta::days(8));
    let (mut svc, _) = make_service(MockHardware::new(), MockStore::holding(stored));

    assert_eq!(svc.start(t0()).unwrap(), None);
    assert!(svc.hw().applied_baselines.is_empty());
    assert_eq!(svc.next_commit(), Some(t0() + TimeDelta::hours(12)));
}

#[test]
fn unreadable_store_means_cold_start() {
    let store = MockStore {
        fail_load: true,
        ..MockStore::default()
    };
    let (mut svc, sink) = make_service(MockHardware::new(), store);

    assert_eq!(svc.start(t0()).unwrap(), None);
    assert_eq!(svc.next_commit(), Some(t0() + TimeDelta::hours(12)));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PersistFailed(_))), 1);
}

#[test]
fn sensor_init_failure_is_fatal() {
    let mut hw = MockHardware::new();
    hw.fail_init = true;
    let (mut svc, _) = make_service(hw, MockStore::default());

    assert_eq!(svc.start(t0()), Err(Error::Sensor(SensorError::InitFailed)));
}

#[test]
fn startup_shows_splash() {
    let (mut svc, _) = make_service(MockHardware::new(), MockStore::default());
    svc.start(t0()).unwrap();
    assert_eq!(
        svc.hw().calls,
        vec![DisplayCall::Backlight(true), DisplayCall::Render(Frame::Splash)]
    );
    assert!(svc.alert_state().screen_on);
}

// ── Warm-up gate ──────────────────────────────────────────────

#[test]
fn warm_up_waits_for_sensor() {
    let mut hw = MockHardware::new();
    for _ in 0..4 {
        hw.gas_script.push_back(Ok(GasSample { eco2: 400, tvoc: 0 }));
    }
    let (mut svc, sink) = make_service(hw, MockStore::default());
    svc.start(t0()).unwrap();

    let clock = VirtualClock::at(t0());
    let ready = svc.warm_up(&clock, Duration::from_secs(30), |d| {
        clock.advance(TimeDelta::from_std(d).unwrap());
    });

    assert!(ready);
    assert_eq!(svc.hw().gas_reads, 5);
    assert!(sink.events().contains(&AppEvent::WarmupFinished {
        waited_secs: 4,
        ready: true
    }));
}

#[test]
fn warm_up_gives_up_at_timeout() {
    let hw = MockHardware::new().with_gas(400, 0);
    let (mut svc, _) = make_service(hw, MockStore::default());
    svc.start(t0()).unwrap();

    let clock = VirtualClock::at(t0());
    let ready = svc.warm_up(&clock, Duration::from_secs(5), |d| {
        clock.advance(TimeDelta::from_std(d).unwrap());
    });

    assert!(!ready);
    assert_eq!(svc.hw().gas_reads, 5);
}

#[test]
fn unrepresentable_warm_up_timeout_still_waits_for_sensor() {
    let mut hw = MockHardware::new();
    hw.gas_script.push_back(Ok(GasSample { eco2: 400, tvoc: 0 }));
    hw.gas_script.push_back(Ok(GasSample { eco2: 400, tvoc: 0 }));
    let (mut svc, _) = make_service(hw, MockStore::default());
    svc.start(t0()).unwrap();

    let clock = VirtualClock::at(t0());
    let ready = svc.warm_up(&clock, Duration::from_secs(u64::MAX), |d| {
        clock.advance(TimeDelta::from_std(d).unwrap());
    });

    assert!(ready, "the gate is not skipped");
    assert_eq!(svc.hw().gas_reads, 3);
}

// ── Baseline bookkeeping ──────────────────────────────────────

#[test]
fn commit_runs_before_candidate_in_the_same_tick() {
    let stored = stored_at(t0() - TimeDelta::days(1));
    let (mut svc, _) = make_service(MockHardware::new(), MockStore::holding(stored));
    svc.start(t0()).unwrap();

    let mut last = None;
    for m in (10..=60).step_by(10) {
        last = Some(svc.tick(t0() + TimeDelta::minutes(m)).unwrap());
    }
    let report = last.unwrap();

    assert_eq!(
        report.baseline_tasks,
        vec![BaselineTask::Commit, BaselineTask::Candidate]
    );
    let logs = &svc.logs().baseline;
    assert_eq!(logs.len(), 7, "six candidates and one valid commit");
    assert!(logs[5].starts_with("Valid: CO2: "));
    assert!(logs[6].starts_with("CO2: "));
    assert_eq!(svc.logs().results.len(), 6);
    assert_eq!(svc.next_commit(), Some(t0() + TimeDelta::hours(2)));
    assert_eq!(svc.next_candidate(), Some(t0() + TimeDelta::minutes(70)));
}

#[test]
fn failing_log_writes_do_not_stop_the_tick() {
    let logs = MockLogs {
        fail: true,
        ..MockLogs::default()
    };
    let (mut svc, sink) = make_service_with_logs(MockHardware::new(), MockStore::default(), logs);
    svc.start(t0()).unwrap();
    let calls_before = svc.hw().calls.len();

    // Commit and candidate both fall due: one Valid line, one candidate
    // line and one result line, all refused.
    let at = t0() + TimeDelta::hours(12);
    let report = svc.tick(at).expect("log failures are absorbed");

    assert_eq!(report.baseline_tasks, vec![BaselineTask::Commit, BaselineTask::Candidate]);
    assert_eq!(svc.logs().failed_appends, 3);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PersistFailed(_))), 3);
    assert_eq!(svc.store().saves, 1, "baseline still committed");
    assert_eq!(svc.store().stored.map(|b| b.captured_at), Some(at));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::BaselineCommitted(_))), 1);

    // Alert and display still ran: calm room, backlight switched off.
    assert!(!svc.alert_state().screen_on);
    assert_eq!(svc.hw().calls.len(), calls_before + 1);
    assert_eq!(svc.hw().backlight_offs(), 1);
}

#[test]
fn commit_persists_live_sensor_baseline() {
    let (mut svc, sink) = make_service(MockHardware::new(), MockStore::default());
    svc.start(t0()).unwrap();
    svc.hw_mut().live_baseline = BaselineValues { eco2: 0x9000, tvoc: 0x9100 };

    let at = t0() + TimeDelta::hours(12);
    svc.tick(at).unwrap();

    let expected = Baseline::new(BaselineValues { eco2: 0x9000, tvoc: 0x9100 }, at);
    assert_eq!(svc.store().stored, Some(expected));
    assert_eq!(svc.shared().baseline(), Some(expected));
    assert!(sink.events().contains(&AppEvent::BaselineCommitted(expected)));
    assert_eq!(
        svc.logs().baseline[0],
        "Valid: CO2: 36864 0x9000, VOC: 37120 0x9100 | 2024-03-01 20:00:00"
    );
}

#[test]
fn failed_commit_is_not_fatal_and_retries_next_hour() {
    let store = MockStore {
        fail_save: true,
        ..MockStore::default()
    };
    let (mut svc, sink) = make_service(MockHardware::new(), store);
    svc.start(t0()).unwrap();

    let first = t0() + TimeDelta::hours(12);
    assert!(svc.tick(first).is_ok());
    assert_eq!(svc.store().saves, 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PersistFailed(_))), 1);
    assert_eq!(svc.next_commit(), Some(first + TimeDelta::hours(1)));

    svc.tick(first + TimeDelta::minutes(30)).unwrap();
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PersistFailed(_))), 1);
}

// ── Tick pipeline ─────────────────────────────────────────────

#[test]
fn gas_read_failure_skips_the_tick() {
    let mut hw = MockHardware::new();
    hw.gas_script.push_back(Err(SensorError::ReadFailed));
    let (mut svc, sink) = make_service(hw, MockStore::default());
    svc.start(t0()).unwrap();
    let calls_before = svc.hw().calls.len();

    assert_eq!(
        svc.tick(t0() + TimeDelta::seconds(1)),
        Err(Error::Sensor(SensorError::ReadFailed))
    );
    assert_eq!(svc.hw().calls.len(), calls_before, "no display I/O on a failed tick");
    assert!(svc.shared().latest_reading().is_none());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Reading { .. })), 0);

    assert!(svc.tick(t0() + TimeDelta::seconds(2)).is_ok());
}

#[test]
fn idle_room_switches_backlight_off_exactly_once() {
    let (mut svc, sink) = make_service(MockHardware::new(), MockStore::default());
    svc.start(t0()).unwrap();

    for s in 1..=5 {
        svc.tick(t0() + TimeDelta::seconds(s)).unwrap();
    }

    assert_eq!(svc.hw().backlight_offs(), 1);
    assert!(!svc.alert_state().screen_on);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ScreenChanged { on: false, .. })),
        1
    );
}

#[test]
fn proximity_keeps_screen_on_for_hold_period() {
    let mut hw = MockHardware::new();
    hw.proximity_script.extend([0, 7]);
    let (mut svc, _) = make_service(hw, MockStore::default());
    svc.start(t0()).unwrap();

    let mut screen = Vec::new();
    for s in 1..=9 {
        svc.tick(t0() + TimeDelta::seconds(s)).unwrap();
        screen.push(svc.alert_state().screen_on);
    }

    // Off, woken by the visitor, held five more ticks, then off.
    assert_eq!(
        screen,
        vec![false, true, true, true, true, true, true, false, false]
    );
    assert_eq!(svc.hw().backlight_offs(), 2);
}

#[test]
fn bad_air_keeps_screen_on_and_renders_red() {
    let hw = MockHardware::new().with_gas(1250, 40);
    let (mut svc, _) = make_service(hw, MockStore::default());
    svc.start(t0()).unwrap();

    for s in 1..=10 {
        let report = svc.tick(t0() + TimeDelta::seconds(s)).unwrap();
        assert_eq!(report.level, AirQualityLevel::Bad);
    }
    assert_eq!(svc.hw().backlight_offs(), 0);
    assert_eq!(svc.shared().snapshot().level(), AirQualityLevel::Bad);
    match svc.hw().last_render() {
        Some(Frame::Reading { scheme, co2, .. }) => {
            assert_eq!(*scheme, airwatch::fsm::frame::ColorScheme::for_level(AirQualityLevel::Bad));
            assert_eq!(co2.value, "1250");
        }
        other => panic!("expected a reading frame, got {other:?}"),
    }
}

#[test]
fn warm_up_floor_renders_below_400() {
    let mut hw = MockHardware::new().with_gas(400, 0);
    hw.steady_proximity = 50;
    let (mut svc, _) = make_service(hw, MockStore::default());
    svc.start(t0()).unwrap();

    svc.tick(t0() + TimeDelta::seconds(1)).unwrap();

    match svc.hw().last_render() {
        Some(Frame::Reading { co2, voc, .. }) => {
            assert_eq!(
                *co2,
                Field {
                    label: "CO2",
                    value: "<400".into(),
                    unit: "ppm"
                }
            );
            assert_eq!(voc.value, "0");
        }
        other => panic!("expected a reading frame, got {other:?}"),
    }
}
