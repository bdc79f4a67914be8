use super::*;
use crate::validate::document::RejectReason;

fn docs(n: usize) -> Vec<InputDocument> {
    (0..n)
        .map(|i| InputDocument::new(format!("{i}.svg"), vec![i as u8]))
        .collect()
}

#[test]
fn jobs_are_indexed_in_arrival_order() {
    let batch = BatchRequest::new(SubmitterId(42), docs(4));
    assert_eq!(batch.len(), 4);
    assert_eq!(batch.submitter(), SubmitterId(42));
    for (i, job) in batch.jobs().iter().enumerate() {
        assert_eq!(job.index(), i);
        assert_eq!(job.input().filename, format!("{i}.svg"));
        assert_eq!(job.state(), &JobState::Queued);
    }
}

#[test]
fn status_follows_job_states() {
    assert_eq!(
        BatchRequest::new(SubmitterId(1), vec![]).status(),
        BatchStatus::Empty
    );

    let mut batch = BatchRequest::new(SubmitterId(1), docs(2));
    assert_eq!(batch.status(), BatchStatus::Pending);

    let jobs = batch.jobs_mut();
    jobs[0].advance(JobState::Validating);
    assert_eq!(batch.status(), BatchStatus::Running);

    let jobs = batch.jobs_mut();
    jobs[0].advance(JobState::Rejected(RejectReason::Oversized { size: 9, max: 1 }));
    jobs[1].advance(JobState::Validating);
    jobs[1].advance(JobState::Rasterizing);
    jobs[1].advance(JobState::Building);
    jobs[1].advance(JobState::Encoding);
    jobs[1].advance(JobState::Done);
    assert_eq!(batch.status(), BatchStatus::PartiallyCompleted);
}

#[test]
fn terminal_status_distinguishes_all_failed() {
    assert_eq!(terminal_status(0, 0), BatchStatus::Empty);
    assert_eq!(terminal_status(0, 3), BatchStatus::AllFailed);
    assert_eq!(terminal_status(3, 3), BatchStatus::Completed);
    assert_eq!(terminal_status(1, 3), BatchStatus::PartiallyCompleted);
}
