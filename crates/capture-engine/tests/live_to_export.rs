//! Live pass through export on a synthetic source.

use camtrail_capture_engine::{FinishReason, LiveConfig, LiveSession, ScriptedCommands};
use camtrail_media_io::memory::{MemorySink, SyntheticSource};
use camtrail_media_io::sink::SinkSettings;
use camtrail_media_io::source::FrameSource;
use camtrail_processing_core::recorder::RecorderConfig;
use camtrail_project_model::pose::EditSteps;
use camtrail_render_engine::{plan_path, ExportPipeline, ExportSettings, OverlayStack, StopReason};

const CANVAS_W: u32 = 64;
const CANVAS_H: u32 = 36;
const MOVE_STEP: i32 = 50;

fn live_config() -> LiveConfig {
    LiveConfig {
        steps: EditSteps {
            move_step: MOVE_STEP,
            zoom_step: 0.1,
        },
        playback_speed: 1,
        canvas_width: CANVAS_W,
        canvas_height: CANVAS_H,
        recorder: RecorderConfig::default(),
    }
}

const SCRIPT: &str = "\
# start, pan right twice, quit
0 p
10 right
40 right
80 q
";

#[test]
fn test_scripted_session_records_and_exports() {
    let source = SyntheticSource::new(256, CANVAS_H, 30.0, 100);
    let mut session = LiveSession::open(source, live_config()).unwrap();
    let mut script = ScriptedCommands::parse(SCRIPT).unwrap();

    assert_eq!(session.drive(&mut script), FinishReason::Quit);
    let finished = session.finish();
    let take = finished.take;

    assert_eq!(take.pose_log.len(), 80);
    assert_eq!(take.key_path.frame_indices(), vec![0, 30, 60]);
    assert_eq!(take.last_pose.x, 2 * MOVE_STEP);

    let path = plan_path(&take);
    assert_eq!(path.len(), 80);

    let xs: Vec<f64> = path.iter().map(|p| p.x).collect();
    for pair in xs[..=60].windows(2) {
        assert!(pair[1] > pair[0], "x must rise through the keyframes: {pair:?}");
    }
    assert!(xs[60..].iter().all(|&x| x == (2 * MOVE_STEP) as f64));
    assert_eq!(xs[0], 0.0);
    assert_eq!(xs[30], MOVE_STEP as f64);

    let mut export_source = finished.source.reopen().unwrap();
    let settings = ExportSettings {
        output_width: CANVAS_W,
        output_height: CANVAS_H,
        fps: export_source.info().fps,
    };
    let mut sink = MemorySink::new(SinkSettings {
        width: CANVAS_W,
        height: CANVAS_H,
        fps: settings.fps,
    });
    let report = ExportPipeline::new(settings, OverlayStack::new())
        .run(&mut export_source, &path, &mut sink, None)
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Completed);
    assert_eq!(report.frames_written, 80);
    assert!(sink.is_finished());

    for (i, frame) in sink.frames().iter().enumerate() {
        let origin = frame.get_pixel(0, 0).0;
        // Blue carries the source frame index, red the crop's x origin.
        assert_eq!(origin[2], i as u8);
        assert_eq!(origin[0] as f64, xs[i].round());
    }
}

#[test]
fn test_source_exhaustion_still_produces_a_take() {
    let source = SyntheticSource::new(256, CANVAS_H, 30.0, 40);
    let mut session = LiveSession::open(source, live_config()).unwrap();
    let mut script = ScriptedCommands::parse("0 toggle\n5 right\n").unwrap();

    assert_eq!(session.drive(&mut script), FinishReason::SourceExhausted);
    let take = session.finish().take;
    assert_eq!(take.pose_log.len(), 40);
    assert_eq!(take.key_path.frame_indices(), vec![0, 30]);

    let path = plan_path(&take);
    assert_eq!(path.len(), 40);
    assert_eq!(path.get(39).map(|p| p.x), Some(MOVE_STEP as f64));
}
