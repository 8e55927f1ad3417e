mod support;

use std::time::{Duration, Instant};

use gesture_server::features::{self, FEATURE_LEN};
use gesture_server::{load_model, Command, GestureConfig, GestureEngine, LandmarkFrame};
use serde_json::json;
use tempfile::tempdir;

use support::{fist, hand_only, open_palm, pinch_at, pose_with_nose, two_fingers, FRAME_MS};

/// Feeds `frames` one tick apart and returns `(index, command)` for every
/// emitted command.
fn run(engine: &mut GestureEngine, frames: &[LandmarkFrame], start: Instant) -> Vec<(usize, Command)> {
    frames
        .iter()
        .enumerate()
        .filter_map(|(i, frame)| {
            let now = start + Duration::from_millis(FRAME_MS * i as u64);
            engine.process_frame_at(frame, now).map(|c| (i, c))
        })
        .collect()
}

fn repeat(frame: LandmarkFrame, n: usize) -> Vec<LandmarkFrame> {
    vec![frame; n]
}

#[test]
fn fist_held_for_five_frames_plays_once() {
    let mut engine = GestureEngine::without_model(GestureConfig::default());
    let out = run(&mut engine, &repeat(hand_only(fist()), 5), Instant::now());
    assert_eq!(out, vec![(4, Command::PlayPause)]);
}

#[test]
fn two_fingers_skip_track() {
    let mut engine = GestureEngine::without_model(GestureConfig::default());
    let out = run(&mut engine, &repeat(hand_only(two_fingers()), 5), Instant::now());
    assert_eq!(out, vec![(4, Command::NextTrack)]);
}

#[test]
fn confirmation_takes_exactly_the_configured_frames() {
    let config = GestureConfig {
        stability_frames: 3,
        ..GestureConfig::default()
    };
    let mut engine = GestureEngine::without_model(config);
    let out = run(&mut engine, &repeat(hand_only(fist()), 3), Instant::now());
    assert_eq!(out, vec![(2, Command::PlayPause)]);
}

#[test]
fn commands_are_separated_by_the_cooldown() {
    let mut engine = GestureEngine::without_model(GestureConfig::default());
    let out = run(&mut engine, &repeat(hand_only(fist()), 40), Instant::now());

    // cooldown ends at frame 29, then five fresh frames confirm again
    let frames: Vec<_> = out.iter().map(|(i, _)| *i).collect();
    assert_eq!(frames, vec![4, 33]);
    for pair in frames.windows(2) {
        let gap = Duration::from_millis(FRAME_MS * (pair[1] - pair[0]) as u64);
        assert!(gap >= Duration::from_millis(800));
    }
}

#[test]
fn missing_hand_breaks_the_streak() {
    let mut frames = repeat(hand_only(fist()), 4);
    frames.push(LandmarkFrame::empty());
    frames.extend(repeat(hand_only(fist()), 4));

    let mut engine = GestureEngine::without_model(GestureConfig::default());
    let start = Instant::now();
    assert!(run(&mut engine, &frames, start).is_empty());
    assert_eq!(engine.state().stable_count, 4);

    let next = start + Duration::from_millis(FRAME_MS * frames.len() as u64);
    assert_eq!(
        engine.process_frame_at(&hand_only(fist()), next),
        Some(Command::PlayPause)
    );
}

#[test]
fn fist_near_the_face_is_ignored() {
    let near_face = LandmarkFrame::new(Some(fist()), Some(pose_with_nose(0.5, 0.7)));
    let mut engine = GestureEngine::without_model(GestureConfig::default());
    assert!(run(&mut engine, &repeat(near_face, 20), Instant::now()).is_empty());

    let away = LandmarkFrame::new(Some(fist()), Some(pose_with_nose(0.5, 0.3)));
    let mut engine = GestureEngine::without_model(GestureConfig::default());
    let out = run(&mut engine, &repeat(away, 5), Instant::now());
    assert_eq!(out, vec![(4, Command::PlayPause)]);
}

#[test]
fn small_pinch_moves_stay_in_the_dead_band() {
    let frames: Vec<_> = [0.5, 0.48, 0.49, 0.47]
        .into_iter()
        .map(|y| hand_only(pinch_at(y)))
        .collect();

    let mut engine = GestureEngine::without_model(GestureConfig::default());
    let out = run(&mut engine, &frames, Instant::now());
    // measured from the untouched 0.5 baseline, only 0.47 clears the band
    assert_eq!(out, vec![(3, Command::VolumeUp)]);
    assert_eq!(engine.state().last_index_finger_y, Some(0.47));
}

#[test]
fn pinch_moving_down_lowers_volume() {
    let frames = vec![hand_only(pinch_at(0.4)), hand_only(pinch_at(0.45))];
    let mut engine = GestureEngine::without_model(GestureConfig::default());
    assert_eq!(
        run(&mut engine, &frames, Instant::now()),
        vec![(1, Command::VolumeDown)]
    );
}

#[test]
fn reset_replays_identically() {
    let frames = vec![hand_only(pinch_at(0.5)), hand_only(pinch_at(0.47))];
    let mut engine = GestureEngine::without_model(GestureConfig::default());
    let start = Instant::now();

    let first = run(&mut engine, &frames, start);
    assert_eq!(first, vec![(1, Command::VolumeUp)]);

    // still inside the cooldown, but reset forgets it
    engine.reset();
    assert_eq!(engine.state().frame_counter, 0);
    assert_eq!(run(&mut engine, &frames, start + Duration::from_millis(100)), first);
}

#[test]
fn same_input_same_output() {
    let mut frames = repeat(hand_only(open_palm()), 3);
    frames.extend(repeat(hand_only(fist()), 6));
    frames.push(LandmarkFrame::empty());
    frames.extend(repeat(hand_only(two_fingers()), 30));
    frames.extend([0.5, 0.46, 0.42].map(|y| hand_only(pinch_at(y))));

    let start = Instant::now();
    let mut a = GestureEngine::without_model(GestureConfig::default());
    let mut b = GestureEngine::without_model(GestureConfig::default());
    let first = run(&mut a, &frames, start);
    assert!(!first.is_empty());
    assert_eq!(first, run(&mut b, &frames, start));
}

#[test]
fn feature_vectors_always_have_full_length() {
    let hand = fist();
    let body = pose_with_nose(0.5, 0.3);
    let partial = gesture_server::Landmarks::from_points(hand.points()[..7].to_vec());

    for (h, b) in [
        (Some(&hand), Some(&body)),
        (Some(&hand), None),
        (None, Some(&body)),
        (None, None),
        (Some(&partial), None),
    ] {
        assert_eq!(features::normalize(h, b).len(), FEATURE_LEN);
    }
}

#[test]
fn model_file_drives_commands_when_heuristics_are_silent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let model = json!({
        "window": 20,
        "features": FEATURE_LEN,
        "labels": ["prev_track_INTENCIONAL", "no_accion", "next_track"],
        "weights": vec![vec![0.0; FEATURE_LEN]; 3],
        "bias": [5.0, 0.0, 0.0],
    });
    std::fs::write(&path, model.to_string()).unwrap();

    let mut config = GestureConfig::default();
    config.model.model_path = Some(path);
    let model = load_model(&config.model);
    assert_eq!(model.name(), "linear");

    let mut engine = GestureEngine::new(config, model);
    let out = run(&mut engine, &repeat(hand_only(open_palm()), 25), Instant::now());
    // first full window at frame 20; frame 25 still falls in the cooldown
    assert_eq!(out, vec![(19, Command::Model("prev_track".into()))]);
}

#[test]
fn unreadable_model_falls_back_to_heuristics() {
    let mut config = GestureConfig::default();
    config.model.model_path = Some("/nonexistent/model.json".into());
    let model = load_model(&config.model);
    assert_eq!(model.name(), "none");

    let mut engine = GestureEngine::new(config, model);
    let out = run(&mut engine, &repeat(hand_only(fist()), 5), Instant::now());
    assert_eq!(out, vec![(4, Command::PlayPause)]);
}
