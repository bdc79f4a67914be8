use super::*;

fn snap(completed: usize, total: usize) -> ProgressSnapshot {
    ProgressSnapshot { completed, total }
}

#[test]
fn in_memory_sink_keeps_order() {
    let mut sink = InMemoryStatusSink::new();
    sink.publish(snap(1, 2)).unwrap();
    sink.publish(snap(2, 2)).unwrap();
    assert_eq!(sink.snapshots(), &[snap(1, 2), snap(2, 2)]);
    assert!(sink.snapshots()[1].is_final());
    assert!(!sink.snapshots()[0].is_final());
}

#[test]
fn channel_sink_forwards_and_reports_hang_up() {
    let (mut tx, rx) = mpsc::channel();
    tx.publish(snap(1, 1)).unwrap();
    assert_eq!(rx.recv().unwrap(), snap(1, 1));

    drop(rx);
    assert!(tx.publish(snap(1, 1)).is_err());
}

#[test]
fn closure_sink_is_called() {
    let mut seen = Vec::new();
    {
        let mut sink = FnStatusSink(|s: ProgressSnapshot| seen.push(s.completed));
        sink.publish(snap(1, 3)).unwrap();
        sink.publish(snap(2, 3)).unwrap();
    }
    assert_eq!(seen, vec![1, 2]);
}

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(!other.is_cancelled());
    token.cancel();
    assert!(other.is_cancelled());
}
