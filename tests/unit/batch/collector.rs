use super::*;

fn doc(name: &str) -> InputDocument {
    InputDocument::new(name, b"<svg/>".to_vec())
}

fn names(batch: &BatchRequest) -> Vec<&str> {
    batch
        .jobs()
        .iter()
        .map(|j| j.input().filename.as_str())
        .collect()
}

#[test]
fn documents_group_until_quiet_window_elapses() {
    let t0 = Instant::now();
    let ms = Duration::from_millis;
    let mut c = BatchCollector::default();
    assert_eq!(c.quiet_window(), Duration::from_secs(3));

    c.push(SubmitterId(1), doc("a.svg"), t0);
    c.push(SubmitterId(1), doc("b.svg"), t0 + ms(2_000));
    assert!(c.take_ready(t0 + ms(3_500)).is_empty());
    assert_eq!(c.next_deadline(), Some(t0 + ms(5_000)));

    let ready = c.take_ready(t0 + ms(5_000));
    assert_eq!(ready.len(), 1);
    assert_eq!(names(&ready[0]), ["a.svg", "b.svg"]);
    assert_eq!(ready[0].jobs()[1].index(), 1);
    assert!(c.is_empty());
}

#[test]
fn submitters_are_independent_and_released_in_arrival_order() {
    let t0 = Instant::now();
    let s = Duration::from_secs;
    let mut c = BatchCollector::new(s(1));

    c.push(SubmitterId(2), doc("x.svg"), t0);
    c.push(SubmitterId(1), doc("y.svg"), t0);
    c.push(SubmitterId(3), doc("z.svg"), t0 + s(5));
    assert_eq!(c.pending_documents(), 3);

    let ready = c.take_ready(t0 + s(2));
    let order: Vec<SubmitterId> = ready.iter().map(BatchRequest::submitter).collect();
    assert_eq!(order, [SubmitterId(2), SubmitterId(1)]);
    assert_eq!(c.pending_documents(), 1);
}

#[test]
fn flush_releases_everything() {
    let t0 = Instant::now();
    let mut c = BatchCollector::default();
    c.push(SubmitterId(1), doc("a.svg"), t0);
    c.push(SubmitterId(4), doc("b.svg"), t0);

    let all = c.flush();
    assert_eq!(all.len(), 2);
    assert!(c.is_empty());
    assert_eq!(c.next_deadline(), None);
    assert!(c.flush().is_empty());
}
