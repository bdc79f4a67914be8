use super::*;
use crate::{
    ConvertError, Stage,
    batch::{
        job::InputDocument,
        progress::{InMemoryStatusSink, NullStatusSink},
        request::{BatchStatus, SubmitterId},
    },
    container::tgs::decode,
    foundation::core::GZIP_MAGIC,
    raster::frame::RasterFrame,
};

const SIZE: u32 = 16;

/// Solid-colour frames; markers in the document pick failure modes.
struct FakeRasterizer;

impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, svg: &[u8], width: u32, height: u32) -> ConvertResult<RasterFrame> {
        let text = String::from_utf8_lossy(svg);
        if text.contains("render-fail") {
            return Err(ConvertError::render("unsupported construct"));
        }
        if text.contains("out-of-memory") {
            return Err(ConvertError::resource_exhausted("pixmap allocation failed"));
        }
        if text.contains("short-buffer") {
            return Ok(RasterFrame {
                width,
                height,
                data: vec![0; 4],
                premultiplied: true,
            });
        }
        let px = (width * height) as usize;
        RasterFrame::new(width, height, [10u8, 20, 30, 255].repeat(px), true)
    }
}

fn config() -> ConversionConfig {
    ConversionConfig {
        required_width: SIZE,
        required_height: SIZE,
        frame_rate: 30,
        duration_frames: 10,
        ..ConversionConfig::default()
    }
}

fn coordinator() -> BatchCoordinator {
    BatchCoordinator::new(config(), Arc::new(FakeRasterizer)).unwrap()
}

fn svg(w: u32, h: u32, marker: &str) -> Vec<u8> {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}"><desc>{marker}</desc></svg>"#
    )
    .into_bytes()
}

fn doc(i: usize, bytes: Vec<u8>) -> InputDocument {
    InputDocument::new(format!("doc{i}.svg"), bytes)
}

fn pattern(report: &BatchReport) -> Vec<bool> {
    report.outcomes.iter().map(JobOutcome::is_success).collect()
}

#[test]
fn invalid_jobs_fail_in_place_and_order_is_kept() {
    let docs = (0..7).map(|i| {
        let bytes = if i == 2 || i == 5 {
            svg(SIZE - 1, SIZE, "")
        } else {
            svg(SIZE, SIZE, "")
        };
        doc(i, bytes)
    });
    let batch = BatchRequest::new(SubmitterId(1), docs);

    let mut sink = InMemoryStatusSink::new();
    let report = coordinator().run(batch, &mut sink).unwrap();

    assert_eq!(
        pattern(&report),
        [true, true, false, true, true, false, true]
    );
    for i in [2, 5] {
        let reason = report.outcomes[i].failure().unwrap();
        assert_eq!(reason.kind(), "wrong-dimensions");
        assert_eq!(reason.stage(), Stage::Validate);
    }
    for (_, bytes) in report.containers() {
        assert_eq!(bytes[..2], GZIP_MAGIC);
    }

    let completed: Vec<usize> = sink.snapshots().iter().map(|s| s.completed).collect();
    assert_eq!(completed, (1..=7).collect::<Vec<_>>());
    assert!(sink.snapshots().iter().all(|s| s.total == 7));
    assert_eq!(report.status(), BatchStatus::PartiallyCompleted);
}

#[test]
fn all_invalid_batch_completes_without_fault() {
    let docs = (0..3).map(|i| doc(i, b"not markup at all".to_vec()));
    let report = coordinator()
        .run(BatchRequest::new(SubmitterId(1), docs), &mut NullStatusSink)
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert!(
        report
            .failures()
            .all(|(_, r)| r.kind() == "malformed-markup")
    );
    assert_eq!(report.status(), BatchStatus::AllFailed);
}

#[test]
fn oversized_input_is_rejected_before_rendering() {
    let cfg = ConversionConfig {
        max_bytes: 64,
        ..config()
    };
    let coordinator = BatchCoordinator::new(cfg, Arc::new(FakeRasterizer)).unwrap();
    let mut bytes = svg(SIZE, SIZE, "out-of-memory");
    bytes.resize(65, b' ');

    let report = coordinator
        .run(
            BatchRequest::new(SubmitterId(1), [doc(0, bytes)]),
            &mut NullStatusSink,
        )
        .unwrap();
    assert_eq!(report.outcomes[0].failure().unwrap().kind(), "oversized");
}

#[test]
fn rerunning_a_batch_yields_identical_outcomes() {
    let docs = || {
        vec![
            doc(0, svg(SIZE, SIZE, "")),
            doc(1, svg(SIZE, 3, "")),
            doc(2, svg(SIZE, SIZE, "render-fail")),
        ]
    };
    let c = coordinator();
    let a = c
        .run(BatchRequest::new(SubmitterId(1), docs()), &mut NullStatusSink)
        .unwrap();
    let b = c
        .run(BatchRequest::new(SubmitterId(1), docs()), &mut NullStatusSink)
        .unwrap();
    assert_eq!(a.outcomes, b.outcomes);
    assert_eq!(pattern(&a), [true, false, false]);
}

#[test]
fn render_and_encode_failures_are_tagged_with_their_stage() {
    let docs = [
        doc(0, svg(SIZE, SIZE, "render-fail")),
        doc(1, svg(SIZE, SIZE, "short-buffer")),
        doc(2, svg(SIZE, SIZE, "")),
    ];
    let report = coordinator()
        .run(BatchRequest::new(SubmitterId(1), docs), &mut NullStatusSink)
        .unwrap();

    let render = report.outcomes[0].failure().unwrap();
    assert_eq!((render.stage(), render.kind()), (Stage::Render, "render-error"));
    assert_eq!(render.user_message(), "could not be rendered");

    let encode = report.outcomes[1].failure().unwrap();
    assert_eq!((encode.stage(), encode.kind()), (Stage::Encode, "encode-error"));
    assert!(report.outcomes[2].is_success());
}

#[test]
fn resource_exhaustion_aborts_the_batch() {
    let docs = [
        doc(0, svg(SIZE, SIZE, "")),
        doc(1, svg(SIZE, SIZE, "out-of-memory")),
        doc(2, svg(SIZE, SIZE, "")),
    ];
    let mut sink = InMemoryStatusSink::new();
    let err = coordinator()
        .run(BatchRequest::new(SubmitterId(1), docs), &mut sink)
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(sink.snapshots().len(), 1);
}

#[test]
fn cancellation_keeps_completed_prefix() {
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let mut sink = crate::FnStatusSink(move |s: ProgressSnapshot| {
        if s.completed == 2 {
            trigger.cancel();
        }
    });

    let docs = (0..5).map(|i| doc(i, svg(SIZE, SIZE, "")));
    let report = coordinator()
        .run_with_cancel(BatchRequest::new(SubmitterId(9), docs), &mut sink, &cancel)
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.total(), 5);
    assert_eq!(report.status(), BatchStatus::Cancelled);
}

#[test]
fn failing_sink_does_not_change_outcomes() {
    let (mut tx, rx) = std::sync::mpsc::channel();
    drop(rx);
    let docs = [doc(0, svg(SIZE, SIZE, ""))];
    let report = coordinator()
        .run(BatchRequest::new(SubmitterId(1), docs), &mut tx)
        .unwrap();
    assert_eq!(report.status(), BatchStatus::Completed);
}

#[test]
fn container_matches_configuration() {
    let docs = [doc(0, svg(SIZE, SIZE, ""))];
    let report = coordinator()
        .run(BatchRequest::new(SubmitterId(1), docs), &mut NullStatusSink)
        .unwrap();
    let anim = decode(report.outcomes[0].container().unwrap()).unwrap();
    assert_eq!((anim.width, anim.height), (SIZE, SIZE));
    assert_eq!(anim.frame_rate, 30);
    assert_eq!(anim.duration_frames(), 10);
}

#[test]
fn invalid_configuration_is_refused() {
    let cfg = ConversionConfig {
        compression_level: 12,
        ..config()
    };
    assert!(matches!(
        BatchCoordinator::new(cfg, Arc::new(FakeRasterizer)),
        Err(ConvertError::Config(_))
    ));
}

#[test]
fn oversized_required_canvas_is_refused_up_front() {
    let cfg = ConversionConfig {
        required_width: 20_000,
        required_height: 20_000,
        ..config()
    };
    assert!(matches!(
        BatchCoordinator::new(cfg, Arc::new(FakeRasterizer)),
        Err(ConvertError::Config(_))
    ));
}
