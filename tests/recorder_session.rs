use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use iart::canvas::BACKGROUND;
use iart::color_scheme::TRAIL_GRAY;
use iart::{
    Circle, ExportFormat, LifecycleState, Line, Recorder, RecorderConfig, RecorderError,
};

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("iart-session-{}", uuid::Uuid::new_v4()))
}

fn fast_config(export_dir: Option<PathBuf>) -> RecorderConfig {
    RecorderConfig {
        idle_poll_ms: 10,
        preview_interval_ms: 10,
        export_dir,
        ..Default::default()
    }
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_full_session_exports_png() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = scratch_dir();
    let mut recorder = Recorder::new(fast_config(Some(dir.clone())));

    let id = recorder.start(64, 48).unwrap();
    assert_eq!(recorder.session_id(), Some(id));
    assert_eq!(recorder.lifecycle(), LifecycleState::Recording);

    assert!(recorder.submit(Line::new(0, 0, 20, 0).into()));
    assert!(recorder.submit(Circle::new(32, 24, 20).into()));
    assert!(wait_until(Duration::from_secs(2), || recorder.queue().is_empty()));

    let path = recorder.stop_and_export().unwrap().unwrap();
    assert_eq!(recorder.lifecycle(), LifecycleState::Stopped);
    assert!(!recorder.is_active());
    assert!(path.starts_with(&dir));
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("png"));

    let image = image::open(&path).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (64, 48));
    let [r, g, b, _] = TRAIL_GRAY.to_array();
    assert_eq!(image.get_pixel(5, 0).0, [r, g, b, 255]);
    assert_eq!(image.get_pixel(63, 47).0, [255, 255, 255, 255]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_bmp_export() {
    let dir = scratch_dir();
    let config = RecorderConfig {
        export_format: ExportFormat::Bmp,
        ..fast_config(Some(dir.clone()))
    };
    let mut recorder = Recorder::new(config);
    recorder.start(16, 16).unwrap();

    let path = recorder.stop_and_export().unwrap().unwrap();
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("bmp"));
    assert!(path.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_second_start_rejected() {
    let mut recorder = Recorder::new(fast_config(None));
    recorder.start(10, 10).unwrap();

    let err = recorder.start(10, 10).unwrap_err();
    assert!(matches!(err, RecorderError::AlreadyActive(LifecycleState::Recording)));

    recorder.stop().unwrap();
    assert!(recorder.start(10, 10).is_ok());
    recorder.stop().unwrap();
}

#[test]
fn test_pause_gates_submissions() {
    let mut recorder = Recorder::new(fast_config(None));
    recorder.start(30, 30).unwrap();

    assert_eq!(recorder.toggle_pause(), LifecycleState::Paused);
    assert!(!recorder.submit(Line::new(0, 0, 5, 5).into()));
    assert!(recorder.queue().is_empty());

    assert_eq!(recorder.toggle_pause(), LifecycleState::Recording);
    assert!(recorder.submit(Line::new(0, 0, 5, 5).into()));

    let finished = recorder.stop().unwrap().unwrap();
    assert_eq!(finished.stats.drawn as usize + finished.discarded, 1);
}

#[test]
fn test_calibration_round_trip() {
    let mut recorder = Recorder::new(fast_config(None));
    recorder.start(30, 30).unwrap();

    assert!(recorder.begin_calibration());
    assert_eq!(recorder.lifecycle(), LifecycleState::Calibrating);
    assert!(!recorder.submit(Line::new(0, 0, 5, 5).into()));
    assert!(!recorder.begin_calibration());

    assert!(recorder.end_calibration());
    assert_eq!(recorder.lifecycle(), LifecycleState::Recording);

    recorder.stop().unwrap();
}

#[test]
fn test_stop_discards_paused_backlog() {
    let mut recorder = Recorder::new(fast_config(None));
    recorder.start(30, 30).unwrap();
    recorder.toggle_pause();

    // Bypass the submit gate to simulate a producer that raced the pause
    recorder.queue().push(Line::new(0, 0, 29, 29).into());
    recorder.queue().push(Line::new(29, 0, 0, 29).into());

    let finished = recorder.stop().unwrap().unwrap();
    assert_eq!(finished.discarded, 2);
    assert_eq!(finished.stats.drawn, 0);
    assert_eq!(finished.canvas.count(BACKGROUND), 30 * 30);
}
