#![forbid(unsafe_code)]

//! Integration test: scheduler lifecycle driven by a deterministic web host.
//!
//! Every scenario runs the real tick path: `WebHost` delivers animation
//! frames and timers, the scheduler drains batches and emits signals.
//!
//! Run:
//!   cargo test -p tickwork-runtime --test lifecycle_scenarios

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tickwork_runtime::{
    EventSnapshot, Job, JobError, JobId, Scheduler, SchedulerConfig, SchedulerState, Signal,
    TickKind, Visibility,
};
use tickwork_web::WebHost;

// ── Helpers ───────────────────────────────────────────────────────────────

fn host_and_scheduler(config: SchedulerConfig) -> (Rc<WebHost>, Scheduler) {
    let host = Rc::new(WebHost::new());
    let scheduler = Scheduler::with_config(host.clone(), config);
    (host, scheduler)
}

/// Record every emitted signal.
fn record(scheduler: &Scheduler) -> Rc<RefCell<Vec<Signal>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for signal in Signal::ALL {
        let log = Rc::clone(&log);
        scheduler.on(signal, move |snap: &EventSnapshot| {
            log.borrow_mut().push(snap.signal);
        });
    }
    log
}

fn count(log: &RefCell<Vec<Signal>>, signal: Signal) -> usize {
    log.borrow().iter().filter(|s| **s == signal).count()
}

/// Job that appends its first argument to `order`.
fn tagged(order: &Rc<RefCell<Vec<String>>>, tag: &str) -> Job {
    let order = Rc::clone(order);
    Job::new(move |ctx| {
        let tag = ctx.arg(0).and_then(|v| v.as_str()).unwrap_or("?");
        order.borrow_mut().push(tag.to_string());
        Ok(())
    })
    .with_arg(tag)
}

// ── Basic batching ────────────────────────────────────────────────────────

#[test]
fn five_unit_jobs_take_five_ticks() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    let log = record(&scheduler);
    let completed_at_complete = Rc::new(Cell::new(None));
    let seen = Rc::clone(&completed_at_complete);
    scheduler.on(Signal::Complete, move |snap: &EventSnapshot| {
        seen.set(Some(snap.jobs_complete));
    });

    for _ in 0..5 {
        scheduler.append_fn(|_| Ok(()));
    }
    scheduler.start();

    let mut frames = 0;
    while host.pending_frames() > 0 {
        host.animation_frame();
        frames += 1;
        assert!(frames <= 10, "scheduler did not settle");
    }

    assert_eq!(frames, 5);
    assert_eq!(count(&log, Signal::Tick), 5);
    assert_eq!(count(&log, Signal::Job), 5);
    assert_eq!(count(&log, Signal::Complete), 1);
    assert_eq!(completed_at_complete.get(), Some(5));
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert_eq!(scheduler.jobs_complete(), 0, "counters reset after complete");
}

#[test]
fn fractional_weights_share_a_tick() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    let order = Rc::new(RefCell::new(Vec::new()));
    let per_tick = Rc::new(RefCell::new(Vec::new()));
    for (tag, weight) in [("a", 0.5), ("b", 0.5), ("c", 0.25), ("d", 0.25)] {
        scheduler.append(tagged(&order, tag).with_weight(weight));
    }
    let o = Rc::clone(&order);
    let p = Rc::clone(&per_tick);
    scheduler.on(Signal::Tick, move |_| {
        p.borrow_mut().push(o.borrow().join(""));
        o.borrow_mut().clear();
    });

    scheduler.start();
    host.run_until_idle(10);

    assert_eq!(*per_tick.borrow(), vec!["ab".to_string(), "cd".to_string()]);
}

#[test]
fn batch_stops_before_overflowing_job() {
    let (host, scheduler) =
        host_and_scheduler(SchedulerConfig::default().with_jobs_per_tick(1.5));
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["a", "b", "c"] {
        scheduler.append(tagged(&order, tag));
    }
    let ticks = Rc::new(RefCell::new(Vec::new()));
    let (o, t) = (Rc::clone(&order), Rc::clone(&ticks));
    scheduler.on(Signal::Tick, move |_| {
        t.borrow_mut().push(o.borrow().len());
    });
    scheduler.start();
    host.run_until_idle(10);
    assert_eq!(*ticks.borrow(), vec![1, 2, 3]);
}

#[test]
fn priority_orders_execution() {
    let (host, scheduler) =
        host_and_scheduler(SchedulerConfig::default().with_jobs_per_tick(10.0));
    let order = Rc::new(RefCell::new(Vec::new()));
    scheduler.append(tagged(&order, "late").with_priority(5));
    scheduler.append(tagged(&order, "first").with_priority(-1));
    scheduler.append(tagged(&order, "mid-1"));
    scheduler.append(tagged(&order, "mid-2"));
    scheduler.start();
    host.animation_frame();
    assert_eq!(*order.borrow(), vec!["first", "mid-1", "mid-2", "late"]);
}

#[test]
fn counters_balance_after_every_tick() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    for weight in [1.0, 0.3, 0.3, 0.3, 0.9, 0.2] {
        scheduler.append(Job::new(|_| Ok(())).with_weight(weight));
    }
    let handle = scheduler.clone();
    let checked = Rc::new(Cell::new(0));
    let c = Rc::clone(&checked);
    scheduler.on(Signal::Tick, move |snap: &EventSnapshot| {
        assert_eq!(snap.jobs_complete + handle.len() as u64, snap.jobs_count);
        c.set(c.get() + 1);
    });
    scheduler.start();
    host.run_until_idle(20);
    assert!(checked.get() >= 3);
}

// ── Break ─────────────────────────────────────────────────────────────────

#[test]
fn break_on_third_job_discards_batch_remainder() {
    let (host, scheduler) =
        host_and_scheduler(SchedulerConfig::default().with_jobs_per_tick(5.0));
    let log = record(&scheduler);
    for _ in 0..5 {
        scheduler.append_fn(|_| Ok(()));
    }
    scheduler.on(Signal::Job, |snap: &EventSnapshot| snap.jobs_complete != 3);

    scheduler.start();
    host.run_until_idle(10);

    assert_eq!(count(&log, Signal::Break), 1);
    assert_eq!(count(&log, Signal::Tick), 0);
    assert_eq!(scheduler.jobs_complete(), 3);
    assert!(scheduler.is_empty());
    assert_eq!(scheduler.state(), SchedulerState::Broken);
}

#[test]
fn break_keeps_jobs_from_later_batches() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    for _ in 0..4 {
        scheduler.append_fn(|_| Ok(()));
    }
    scheduler.on(Signal::Tick, |snap: &EventSnapshot| snap.jobs_complete < 2);
    scheduler.start();
    host.run_until_idle(10);

    assert_eq!(scheduler.state(), SchedulerState::Broken);
    assert_eq!(scheduler.len(), 2);

    // Each restart runs one more batch before the listener breaks again.
    scheduler.start();
    host.run_until_idle(10);
    assert_eq!(scheduler.state(), SchedulerState::Broken);
    assert_eq!(scheduler.len(), 1);
}

// ── Errors ────────────────────────────────────────────────────────────────

#[test]
fn failed_job_is_first_after_restart() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    let log = record(&scheduler);
    let attempts: Rc<RefCell<Vec<JobId>>> = Rc::new(RefCell::new(Vec::new()));
    let fail_once = Rc::new(Cell::new(true));

    scheduler.append_fn(|_| Ok(()));
    let a = Rc::clone(&attempts);
    let f = Rc::clone(&fail_once);
    let flaky = scheduler.append(Job::new(move |ctx| {
        a.borrow_mut().push(ctx.id());
        if f.replace(false) {
            return Err(JobError::msg("transient"));
        }
        Ok(())
    }));
    let a = Rc::clone(&attempts);
    scheduler.append(Job::new(move |ctx| {
        a.borrow_mut().push(ctx.id());
        Ok(())
    }));

    scheduler.start();
    host.run_until_idle(10);

    assert_eq!(count(&log, Signal::Error), 1);
    assert_eq!(scheduler.state(), SchedulerState::ErrorHalted);
    assert!(!scheduler.busy());
    assert_eq!(scheduler.peek_next(), Some(flaky));
    assert_eq!(scheduler.last_error().map(|e| e.job()), Some(flaky));
    assert_eq!(host.pending_frames() + host.pending_timers(), 0);

    scheduler.start();
    host.run_until_idle(10);
    assert_eq!(attempts.borrow()[..2], [flaky, flaky]);
    assert_eq!(count(&log, Signal::Complete), 1);
}

#[test]
fn job_errors_convert_with_question_mark() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    scheduler.append(
        Job::new(|ctx| {
            let raw = ctx.arg(0).and_then(|v| v.as_str()).unwrap_or_default();
            let n: u32 = raw.parse()?;
            ctx.with_data_mut(|d| d.insert("n".into(), json!(n)));
            Ok(())
        })
        .with_arg("not a number"),
    );
    scheduler.start();
    host.animation_frame();
    let err = scheduler.last_error().expect("job should fail");
    assert!(err.to_string().contains("invalid digit"));
    assert!(scheduler.data().get("n").is_none());
}

// ── Stop / clear ──────────────────────────────────────────────────────────

#[test]
fn stop_before_in_flight_tick_emits_single_stop() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    let log = record(&scheduler);
    for _ in 0..3 {
        scheduler.append_fn(|_| Ok(()));
    }
    scheduler.start();
    host.animation_frame();
    scheduler.stop();
    host.run_until_idle(10);

    assert_eq!(count(&log, Signal::Stop), 1);
    assert_eq!(count(&log, Signal::Job), 1);
    assert_eq!(count(&log, Signal::Tick), 1);
    assert_eq!(scheduler.len(), 2);
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    // Restart picks up the remaining jobs.
    scheduler.start();
    host.run_until_idle(10);
    assert_eq!(count(&log, Signal::Complete), 1);
}

#[test]
fn clear_never_emits() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    for _ in 0..3 {
        scheduler.append_fn(|_| Ok(()));
    }
    scheduler.start();
    let log = record(&scheduler);
    host.animation_frame();
    scheduler.clear();
    host.run_until_idle(10);

    assert_eq!(*log.borrow(), vec![Signal::Job, Signal::Tick]);
    assert_eq!(scheduler.jobs_count(), 0);
    assert_eq!(scheduler.jobs_complete(), 0);
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn cleared_scheduler_can_restart() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    scheduler.append_fn(|_| Ok(()));
    scheduler.start();
    scheduler.clear();
    let ran = Rc::new(Cell::new(false));
    let r = Rc::clone(&ran);
    scheduler.append_fn(move |_| {
        r.set(true);
        Ok(())
    });
    scheduler.start();
    host.run_until_idle(5);
    assert!(ran.get());
}

// ── Re-entrancy ───────────────────────────────────────────────────────────

#[test]
fn jobs_can_append_follow_up_work() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    let order = Rc::new(RefCell::new(Vec::new()));
    let o = Rc::clone(&order);
    scheduler.append_fn(move |ctx| {
        o.borrow_mut().push("parent".to_string());
        let o = Rc::clone(&o);
        ctx.scheduler().append_fn(move |_| {
            o.borrow_mut().push("child".to_string());
            Ok(())
        });
        Ok(())
    });
    scheduler.start();
    host.run_until_idle(10);
    assert_eq!(*order.borrow(), vec!["parent", "child"]);
}

#[test]
fn shared_data_flows_between_jobs_and_listeners() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    scheduler.append_fn(|ctx| {
        ctx.with_data_mut(|d| d.insert("total".into(), json!(1)));
        Ok(())
    });
    scheduler.append_fn(|ctx| {
        ctx.with_data_mut(|d| {
            let total = d.get("total").and_then(|v| v.as_i64()).unwrap_or(0);
            d.insert("total".into(), json!(total + 1));
        });
        Ok(())
    });
    let final_total = Rc::new(Cell::new(0));
    let t = Rc::clone(&final_total);
    scheduler.on(Signal::Complete, move |snap: &EventSnapshot| {
        t.set(snap.data.get("total").and_then(|v| v.as_i64()).unwrap_or(0));
    });
    scheduler.start();
    host.run_until_idle(10);
    assert_eq!(final_total.get(), 2);
    assert_eq!(scheduler.data().get("total"), Some(&json!(2)), "data survives completion");
}

// ── Host activity ─────────────────────────────────────────────────────────

#[test]
fn background_budget_scales_by_multiplier() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    host.set_visibility(Visibility::Background);
    assert_eq!(scheduler.budget(), 50.0);

    for _ in 0..120 {
        scheduler.append_fn(|_| Ok(()));
    }
    let per_tick = Rc::new(RefCell::new(Vec::new()));
    let p = Rc::clone(&per_tick);
    let last = Rc::new(Cell::new(0));
    scheduler.on(Signal::Tick, move |snap: &EventSnapshot| {
        p.borrow_mut().push(snap.jobs_complete - last.replace(snap.jobs_complete));
    });

    scheduler.start();
    assert_eq!(host.pending_frames(), 0);
    assert_eq!(host.pending_timers(), 1);
    host.run_until_idle(10);
    assert_eq!(*per_tick.borrow(), vec![50, 50, 20]);
}

#[test]
fn work_on_inactive_disabled_keeps_foreground_pace() {
    let (host, scheduler) =
        host_and_scheduler(SchedulerConfig::default().with_work_on_inactive(false));
    host.set_visibility(Visibility::Background);
    assert_eq!(scheduler.budget(), 1.0);
    scheduler.set_work_on_inactive(true);
    assert_eq!(scheduler.budget(), 50.0);
}

#[test]
fn foreground_return_moves_tick_to_frame() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    host.set_visibility(Visibility::Background);
    for _ in 0..3 {
        scheduler.append_fn(|_| Ok(()));
    }
    let ticks = Rc::new(Cell::new(0));
    let t = Rc::clone(&ticks);
    scheduler.on(Signal::Tick, move |_| t.set(t.get() + 1));

    scheduler.start();
    assert_eq!(scheduler.tick_handle().map(|h| h.kind), Some(TickKind::Delayed));

    host.set_visibility(Visibility::Foreground);
    assert_eq!(host.pending_timers(), 0, "stale fallback timer cancelled");
    assert_eq!(host.pending_frames(), 1);
    assert_eq!(
        scheduler.tick_handle().map(|h| h.kind),
        Some(TickKind::FrameAligned)
    );

    host.advance(Duration::from_secs(1));
    assert_eq!(ticks.get(), 0, "no double tick from the old timer");
    host.animation_frame();
    assert_eq!(ticks.get(), 1);
}

#[test]
fn backgrounding_moves_frame_tick_to_fallback_timer() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    for _ in 0..3 {
        scheduler.append_fn(|_| Ok(()));
    }
    let completed = Rc::new(Cell::new(None));
    let c = Rc::clone(&completed);
    scheduler.on(Signal::Complete, move |snap: &EventSnapshot| {
        c.set(Some(snap.jobs_complete));
    });

    scheduler.start();
    assert_eq!(
        scheduler.tick_handle().map(|h| h.kind),
        Some(TickKind::FrameAligned)
    );

    host.set_visibility(Visibility::Background);
    assert_eq!(host.pending_frames(), 0, "hidden host drops the frame tick");
    assert_eq!(host.pending_timers(), 1);
    assert_eq!(scheduler.tick_handle().map(|h| h.kind), Some(TickKind::Delayed));

    assert!(host.run_until_idle(100) > 0);
    assert_eq!(completed.get(), Some(3));
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn hosts_without_frames_use_fallback_timer() {
    let (host, scheduler) = host_and_scheduler(SchedulerConfig::default());
    host.set_frame_aligned_available(false);
    scheduler.append_fn(|_| Ok(()));
    scheduler.start();
    assert_eq!(host.pending_frames(), 0);
    assert_eq!(host.next_timer_deadline(), Some(Duration::from_millis(20)));
    assert_eq!(host.advance(Duration::from_millis(20)), 1);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn configured_fallback_delay_is_used() {
    let (host, scheduler) = host_and_scheduler(
        SchedulerConfig::default()
            .with_prefer_frame_aligned(false)
            .with_fallback_delay(Duration::from_millis(5)),
    );
    scheduler.append_fn(|_| Ok(()));
    scheduler.append_fn(|_| Ok(()));
    scheduler.start();
    assert_eq!(host.next_timer_deadline(), Some(Duration::from_millis(5)));
    host.advance(Duration::from_millis(5));
    assert_eq!(host.next_timer_deadline(), Some(Duration::from_millis(10)));
}
