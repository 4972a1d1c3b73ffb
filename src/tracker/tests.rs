use super::*;
use crate::{
    config::Interpolation,
    engine::{EngineHooks, EventRecorder, RecordedEvent},
    types::{Polarity, PolarityMask, SessionId},
    zones::ZoneId,
    CONTACT_MAX, SENSOR_MAX,
};

const SENSORS: usize = 16;

fn tracker(interpolation: Interpolation, pacemaker: u8) -> Tracker {
    let config = TrackerConfig {
        interpolation,
        pacemaker,
        ..TrackerConfig::default()
    };
    let range = RangeTable::uniform(SENSORS, 100, 1.0 / 1000.0, 0.0).unwrap();
    Tracker::new(config, range, CalibrationCurve::identity())
}

fn frame(touches: &[(usize, i16)]) -> [i16; SENSORS] {
    let mut frame = [0i16; SENSORS];
    for &(sensor, value) in touches {
        frame[sensor] = value;
    }
    frame
}

fn centre(sensor: usize) -> f32 {
    (sensor as f32 + 0.5) / SENSORS as f32
}

type Recorder = EventRecorder<64>;

fn step(tracker: &mut Tracker, recorder: &mut Recorder, touches: &[(usize, i16)]) -> bool {
    let mut engines: [&mut dyn Engine; 1] = [recorder];
    tracker
        .process(0, 0, &frame(touches), &mut engines)
        .unwrap()
}

fn ons(events: &[RecordedEvent]) -> std::vec::Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            RecordedEvent::On { session, .. } => Some(session.0),
            _ => None,
        })
        .collect()
}

fn sets(events: &[RecordedEvent]) -> std::vec::Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            RecordedEvent::Set { session, .. } => Some(session.0),
            _ => None,
        })
        .collect()
}

fn offs(events: &[RecordedEvent]) -> std::vec::Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            RecordedEvent::Off { session, .. } => Some(session.0),
            _ => None,
        })
        .collect()
}

#[test]
fn single_touch_appears_with_a_fresh_session() {
    let mut tracker = tracker(Interpolation::Quadratic, 3);
    let mut recorder = Recorder::new();

    assert!(step(&mut tracker, &mut recorder, &[(5, 900)]));

    let contacts = tracker.contacts();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].state, ContactState::Appeared);
    assert_eq!(contacts[0].session, Some(SessionId(1)));
    let d = 1.0 / SENSORS as f32;
    assert!((contacts[0].position - centre(5)).abs() <= d);

    let events = recorder.events();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        RecordedEvent::FrameStart(FrameInfo {
            frame_id: 1,
            now: 0,
            offset: 0,
            old_count: 0,
            new_count: 1,
        })
    );
    match events[1] {
        RecordedEvent::On {
            session,
            zone,
            polarity,
            ..
        } => {
            assert_eq!(session, SessionId(1));
            assert_eq!(zone, ZoneId(0));
            assert_eq!(polarity, Polarity::South);
        }
        other => panic!("expected on event, got {other:?}"),
    }
    assert_eq!(events[2], RecordedEvent::FrameEnd { frame_id: 1 });
}

#[test]
fn touch_lifecycle_runs_on_set_off() {
    let mut tracker = tracker(Interpolation::Quadratic, 3);
    let mut recorder = Recorder::new();

    step(&mut tracker, &mut recorder, &[(5, 900)]);
    step(&mut tracker, &mut recorder, &[(5, 850), (6, 400)]);
    step(&mut tracker, &mut recorder, &[(6, 900)]);
    assert!(step(&mut tracker, &mut recorder, &[]));

    let events = recorder.events();
    assert_eq!(ons(events), std::vec![1]);
    assert_eq!(sets(events), std::vec![1, 1]);
    assert_eq!(offs(events), std::vec![1]);
    assert!(tracker.contacts().is_empty());
    assert_eq!(tracker.frame_id(), 4);
}

#[test]
fn idle_ticks_follow_the_heartbeat_and_allocate_nothing() {
    let mut tracker = tracker(Interpolation::Quadratic, 3);
    let mut recorder = Recorder::new();

    let emitted: std::vec::Vec<u32> = (1..=20)
        .filter(|_| step(&mut tracker, &mut recorder, &[]))
        .collect();

    assert_eq!(emitted, std::vec![1, 2, 4, 8, 16]);
    assert_eq!(tracker.frame_id(), 5);
    assert!(ons(recorder.events()).is_empty());
    assert!(recorder.events().iter().all(|e| match e {
        RecordedEvent::FrameStart(info) => info.old_count == 0 && info.new_count == 0,
        RecordedEvent::FrameEnd { .. } => true,
        _ => false,
    }));
}

#[test]
fn activity_restarts_the_heartbeat_backoff() {
    let mut tracker = tracker(Interpolation::Nearest, 3);
    let mut recorder = Recorder::new();

    for _ in 0..5 {
        step(&mut tracker, &mut recorder, &[]);
    }
    assert!(step(&mut tracker, &mut recorder, &[(3, 700)]));
    // The release tick still has a previous contact to retire.
    assert!(step(&mut tracker, &mut recorder, &[]));
    assert!(step(&mut tracker, &mut recorder, &[]));
    assert!(step(&mut tracker, &mut recorder, &[]));
    assert!(!step(&mut tracker, &mut recorder, &[]));
}

#[test]
fn contacts_stay_ordered_by_ribbon_coordinate() {
    let mut tracker = tracker(Interpolation::Cubic, 3);
    let mut recorder = Recorder::new();

    step(&mut tracker, &mut recorder, &[(1, 800), (7, -600), (12, 950)]);
    let xs: std::vec::Vec<f32> = tracker.contacts().iter().map(|c| c.x).collect();
    assert_eq!(xs.len(), 3);
    assert!(xs.windows(2).all(|w| w[0] <= w[1]));

    step(&mut tracker, &mut recorder, &[(2, 800), (12, 950)]);
    let contacts = tracker.contacts();
    assert!(contacts.windows(2).all(|w| w[0].x <= w[1].x));
    assert_eq!(offs(recorder.events()), std::vec![2]);
}

#[test]
fn session_ids_are_never_reused() {
    let mut tracker = tracker(Interpolation::Linear, 3);
    let mut recorder = Recorder::new();

    step(&mut tracker, &mut recorder, &[(4, 900)]);
    step(&mut tracker, &mut recorder, &[]);
    step(&mut tracker, &mut recorder, &[(4, 900)]);
    step(&mut tracker, &mut recorder, &[(4, 900), (11, 900)]);

    assert_eq!(ons(recorder.events()), std::vec![1, 2, 3]);
}

#[test]
fn weak_newcomer_is_not_given_a_session() {
    let mut tracker = tracker(Interpolation::Quadratic, 3);
    let mut recorder = Recorder::new();

    // Above half the threshold but not above the threshold itself.
    assert!(step(&mut tracker, &mut recorder, &[(9, 80)]));
    assert!(tracker.contacts().is_empty());
    assert!(ons(recorder.events()).is_empty());

    step(&mut tracker, &mut recorder, &[(9, 900)]);
    assert_eq!(ons(recorder.events()), std::vec![1]);
}

#[test]
fn crossing_zones_renews_identity_in_the_same_frame() {
    let mut tracker = tracker(Interpolation::Nearest, 3);
    tracker
        .zones_mut()
        .set(0, PolarityMask::BOTH, 0.0, 0.5)
        .unwrap();
    tracker
        .zones_mut()
        .set(1, PolarityMask::BOTH, 0.5, 1.0)
        .unwrap();
    let mut recorder = Recorder::new();

    step(&mut tracker, &mut recorder, &[(7, 900)]);
    recorder.clear();
    step(&mut tracker, &mut recorder, &[(8, 900)]);

    let events = recorder.events();
    assert_eq!(offs(events), std::vec![1]);
    assert_eq!(ons(events), std::vec![2]);
    assert!(sets(events).is_empty());
    let contact = tracker.contacts()[0];
    assert_eq!(contact.zone, Some(ZoneId(1)));
    assert!((contact.position - (centre(8) - 0.5) * 2.0).abs() < 1e-5);
}

#[test]
fn engines_without_contact_hooks_only_see_frames() {
    let mut tracker = tracker(Interpolation::Quadratic, 3);
    let mut framer = EventRecorder::<16>::with_hooks(EngineHooks::NONE);
    let mut full = EventRecorder::<16>::new();
    {
        let mut engines: [&mut dyn Engine; 2] = [&mut framer, &mut full];
        tracker
            .process(7, 3, &frame(&[(10, 900)]), &mut engines)
            .unwrap();
        tracker.process(8, 3, &frame(&[]), &mut engines).unwrap();
    }

    assert!(framer.events().iter().all(|e| matches!(
        e,
        RecordedEvent::FrameStart(_) | RecordedEvent::FrameEnd { .. }
    )));
    assert_eq!(framer.events().len(), 4);
    assert_eq!(ons(full.events()), std::vec![1]);
    assert_eq!(offs(full.events()), std::vec![1]);
    assert_eq!(
        full.events()[0],
        RecordedEvent::FrameStart(FrameInfo {
            frame_id: 1,
            now: 7,
            offset: 3,
            old_count: 0,
            new_count: 1,
        })
    );
}

#[test]
fn rejected_ticks_leave_the_session_untouched() {
    let mut tracker = tracker(Interpolation::Quadratic, 3);
    let mut recorder = Recorder::new();
    step(&mut tracker, &mut recorder, &[(5, 900)]);
    let before = tracker.contacts()[0];

    let mut engines: [&mut dyn Engine; 1] = [&mut recorder];
    assert_eq!(
        tracker.process(0, 0, &[0; 3], &mut engines),
        Err(TrackError::FrameLength {
            expected: SENSORS,
            actual: 3
        })
    );
    assert_eq!(tracker.contacts(), &[before]);
    assert_eq!(tracker.frame_id(), 1);
}

#[test]
fn too_many_peaks_are_rejected() {
    let range = RangeTable::uniform(SENSOR_MAX, 100, 1.0 / 1000.0, 0.0).unwrap();
    let mut tracker = Tracker::new(
        TrackerConfig::default(),
        range,
        CalibrationCurve::identity(),
    );
    let mut deviations = [0i16; SENSOR_MAX];
    for sensor in (0..SENSOR_MAX).step_by(2).take(CONTACT_MAX + 1) {
        deviations[sensor] = 900;
    }
    let mut recorder = Recorder::new();
    let mut engines: [&mut dyn Engine; 1] = [&mut recorder];

    assert_eq!(
        tracker.process(0, 0, &deviations, &mut engines),
        Err(TrackError::PeakCapacity { limit: CONTACT_MAX })
    );
    assert_eq!(tracker.frame_id(), 0);
}
