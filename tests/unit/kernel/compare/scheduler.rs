use super::*;
use std::time::{Duration, Instant};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn test_post_fires_after_delay() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    scheduler.post(Task::Realign, ms(10), t0);

    assert!(scheduler.is_pending(TaskKind::Realign));
    assert_eq!(scheduler.pop_due(t0 + ms(9)), None);
    assert_eq!(scheduler.pop_due(t0 + ms(10)), Some(Task::Realign));
    assert!(!scheduler.is_pending(TaskKind::Realign));
    assert!(scheduler.is_idle());
}

#[test]
fn test_repost_restarts_timer() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    scheduler.post(Task::Realign, ms(10), t0);
    scheduler.post(Task::Realign, ms(10), t0 + ms(8));

    assert_eq!(scheduler.pop_due(t0 + ms(12)), None);
    assert_eq!(scheduler.pop_due(t0 + ms(18)), Some(Task::Realign));
    assert_eq!(scheduler.pop_due(t0 + ms(100)), None);
}

#[test]
fn test_recompute_burst_collapses_into_one_union() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    let edits = [(12, 1, 0), (7, 0, 2), (9, 3, 0), (15, 0, 1)];
    for (i, (line, added, deleted)) in edits.into_iter().enumerate() {
        scheduler.post(
            Task::Recompute(RecomputeRequest::edit(ViewId::Main, line, added, deleted)),
            ms(10),
            t0 + ms(i as u64 * 3),
        );
    }

    let Some(Task::Recompute(request)) = scheduler.pop_due(t0 + ms(30)) else {
        panic!("recompute did not fire");
    };
    assert_eq!(request.change_line, 7);
    assert_eq!(request.end_line, 15);
    assert_eq!((request.lines_added, request.lines_deleted), (4, 3));
    assert_eq!(request.pre_edit_end(), 14);
    assert_eq!(scheduler.pop_due(t0 + ms(60)), None);
}

#[test]
fn test_recompute_union_tracks_far_apart_edits() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    scheduler.post(
        Task::Recompute(RecomputeRequest::edit(ViewId::Sub, 1, 1, 0)),
        ms(10),
        t0,
    );
    scheduler.post(
        Task::Recompute(RecomputeRequest::edit(ViewId::Sub, 9, 1, 0)),
        ms(10),
        t0 + ms(2),
    );

    match scheduler.pending(TaskKind::Recompute) {
        Some(Task::Recompute(request)) => {
            assert_eq!((request.change_line, request.end_line), (1, 10));
            assert_eq!(request.delta(), 2);
            assert_eq!(request.pre_edit_end(), 8);
        }
        other => panic!("unexpected pending task: {:?}", other),
    }
}

#[test]
fn test_recompute_union_shrinks_with_later_delete() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    scheduler.post(
        Task::Recompute(RecomputeRequest::edit(ViewId::Main, 10, 0, 0)),
        ms(10),
        t0,
    );
    scheduler.post(
        Task::Recompute(RecomputeRequest::edit(ViewId::Main, 2, 0, 3)),
        ms(10),
        t0,
    );

    match scheduler.pending(TaskKind::Recompute) {
        Some(Task::Recompute(request)) => {
            assert_eq!((request.change_line, request.end_line), (2, 8));
            assert_eq!(request.pre_edit_end(), 11);
        }
        other => panic!("unexpected pending task: {:?}", other),
    }
}

#[test]
fn test_recompute_edits_in_both_views_fall_back_to_full() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    scheduler.post(
        Task::Recompute(RecomputeRequest::edit(ViewId::Main, 3, 1, 0)),
        ms(10),
        t0,
    );
    scheduler.post(
        Task::Recompute(RecomputeRequest::edit(ViewId::Sub, 5, 0, 0)),
        ms(10),
        t0,
    );

    match scheduler.pending(TaskKind::Recompute) {
        Some(Task::Recompute(request)) => assert!(request.full_compare),
        other => panic!("unexpected pending task: {:?}", other),
    }
}

#[test]
fn test_full_compare_wins_over_incremental() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    scheduler.post(
        Task::Recompute(RecomputeRequest::edit(ViewId::Sub, 4, 1, 0)),
        ms(10),
        t0,
    );
    scheduler.post(Task::Recompute(RecomputeRequest::full(ViewId::Sub)), ms(30), t0);
    scheduler.post(
        Task::Recompute(RecomputeRequest::edit(ViewId::Sub, 2, 5, 0)),
        ms(10),
        t0,
    );

    match scheduler.pending(TaskKind::Recompute) {
        Some(Task::Recompute(request)) => {
            assert!(request.full_compare);
            assert_eq!(request.lines_added, 0);
        }
        other => panic!("unexpected pending task: {:?}", other),
    }
}

#[test]
fn test_cancel_is_total_and_idempotent() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    scheduler.post(
        Task::Recompute(RecomputeRequest::edit(ViewId::Main, 3, 2, 0)),
        ms(10),
        t0,
    );
    scheduler.cancel(TaskKind::Recompute);
    scheduler.cancel(TaskKind::Recompute);
    assert!(!scheduler.is_pending(TaskKind::Recompute));

    scheduler.post(
        Task::Recompute(RecomputeRequest::edit(ViewId::Main, 8, 1, 0)),
        ms(10),
        t0,
    );
    assert_eq!(
        scheduler.pop_due(t0 + ms(10)),
        Some(Task::Recompute(RecomputeRequest::edit(ViewId::Main, 8, 1, 0)))
    );
}

#[test]
fn test_close_pair_accumulates_in_arrival_order() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    scheduler.post(Task::ClosePair(vec![BufferId(3)]), ms(30), t0);
    scheduler.post(Task::ClosePair(vec![BufferId(1)]), ms(30), t0 + ms(1));
    scheduler.post(Task::ClosePair(vec![BufferId(3)]), ms(30), t0 + ms(2));

    assert_eq!(
        scheduler.pop_due(t0 + ms(40)),
        Some(Task::ClosePair(vec![BufferId(3), BufferId(1)]))
    );
}

#[test]
fn test_settle_activation_keeps_newest() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    scheduler.post(Task::SettleActivation(BufferId(1)), ms(30), t0);
    scheduler.post(Task::SettleActivation(BufferId(2)), ms(30), t0);

    assert_eq!(
        scheduler.pop_due(t0 + ms(30)),
        Some(Task::SettleActivation(BufferId(2)))
    );
}

#[test]
fn test_pop_due_earliest_first() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();

    scheduler.post(Task::RestoreAfterMinimize, ms(100), t0);
    scheduler.post(Task::SettleActivation(BufferId(4)), ms(30), t0);
    scheduler.post(Task::Realign, ms(10), t0);

    assert_eq!(scheduler.next_deadline(), Some(t0 + ms(10)));

    let later = t0 + ms(200);
    assert_eq!(scheduler.pop_due(later), Some(Task::Realign));
    assert_eq!(
        scheduler.pop_due(later),
        Some(Task::SettleActivation(BufferId(4)))
    );
    assert_eq!(scheduler.pop_due(later), Some(Task::RestoreAfterMinimize));
    assert_eq!(scheduler.pop_due(later), None);
}
