use super::*;
use crate::validate::document::RejectReason;
use crate::Canvas;

fn ok() -> JobOutcome {
    JobOutcome::Success {
        container: vec![0x1f, 0x8b, 1],
    }
}

fn wrong_size() -> JobOutcome {
    JobOutcome::Failure {
        reason: FailureReason::Rejected(RejectReason::WrongDimensions {
            expected: Canvas {
                width: 512,
                height: 512,
            },
            actual: (400, 400),
        }),
    }
}

fn report(outcomes: Vec<JobOutcome>, total: usize) -> BatchReport {
    BatchReport {
        submitter: SubmitterId(7),
        created_at: Utc::now(),
        filenames: (0..total).map(|i| format!("s{i}.svg")).collect(),
        outcomes,
        cancelled: false,
    }
}

#[test]
fn counts_and_status() {
    let r = report(vec![ok(), wrong_size(), ok()], 3);
    assert_eq!((r.total(), r.succeeded(), r.failed()), (3, 2, 1));
    assert_eq!(r.status(), BatchStatus::PartiallyCompleted);

    assert_eq!(report(vec![ok()], 1).status(), BatchStatus::Completed);
    assert_eq!(
        report(vec![wrong_size(), wrong_size()], 2).status(),
        BatchStatus::AllFailed
    );
    assert_eq!(report(vec![], 0).status(), BatchStatus::Empty);

    let mut cancelled = report(vec![ok()], 3);
    cancelled.cancelled = true;
    assert_eq!(cancelled.status(), BatchStatus::Cancelled);
}

#[test]
fn containers_and_failures_are_in_index_order() {
    let r = report(vec![ok(), wrong_size(), ok()], 3);
    let names: Vec<String> = r.containers().map(|(n, _)| n).collect();
    assert_eq!(names, ["s0.tgs", "s2.tgs"]);

    let failures: Vec<(&str, &str)> = r.failures().map(|(n, f)| (n, f.kind())).collect();
    assert_eq!(failures, [("s1.svg", "wrong-dimensions")]);
    assert_eq!(
        r.failure_messages(),
        ["❌ **s1.svg**: not exactly 512×512"]
    );
}

#[test]
fn user_messages_match_submitter_wording() {
    assert_eq!(
        BatchReport::acknowledgement_message(3),
        "🔄 Processing 3 files..."
    );
    assert_eq!(
        BatchReport::processing_message(2, 3),
        "🔄 Processing 2/3 files..."
    );
    assert_eq!(
        BatchReport::processing_message(1, 1),
        "🔄 Processing 1/1 file..."
    );
    assert_eq!(
        report(vec![ok(), ok()], 2).completion_message(),
        "✅ Done! Successfully converted 2/2 files."
    );
    assert_eq!(
        report(vec![ok(), wrong_size()], 2).completion_message(),
        "⚠️ Partially completed: 1/2 files converted."
    );
    assert_eq!(
        report(vec![wrong_size()], 1).completion_message(),
        "❌ No files were successfully converted."
    );
}
