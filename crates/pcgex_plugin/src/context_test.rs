use std::sync::atomic::{AtomicUsize, Ordering};

use glam::DVec3;

use super::*;
use crate::data::InitMode;
use crate::threading::TaskOutcome;

fn collection(len: usize) -> Arc<PointData> {
  Arc::new(PointData::from_positions(
    (0..len).map(|i| DVec3::new(i as f64, 0.0, 0.0)),
  ))
}

fn context(tasks: TaskManager, sizes: &[usize], chunk_size: i32) -> ProcessingContext<(), ()> {
  let inputs: Vec<_> = sizes.iter().map(|&len| collection(len)).collect();
  let group = PointIOGroup::from_inputs(&inputs, InitMode::DuplicateInput, |_| true);
  ProcessingContext::new((), (), NodeInputs::new(), group, tasks, chunk_size, "Out")
}

#[test]
fn test_starts_in_setup() {
  let ctx = context(TaskManager::inline(), &[1], 0);
  assert!(ctx.is_setup());
  assert!(ctx.current_io().is_none());
}

#[test]
fn test_advance_points_io_walks_group() {
  let mut ctx = context(TaskManager::inline(), &[1, 2, 3], 0);
  let mut seen = Vec::new();
  while ctx.advance_points_io() {
    seen.push(ctx.current_io().map(PointIO::num));
  }
  assert_eq!(seen, vec![Some(1), Some(2), Some(3)]);
  assert!(ctx.current_io().is_none());
  assert_eq!(ctx.current_io_index(), None);
  assert!(!ctx.advance_points_io());
}

#[test]
fn test_sync_processing_one_chunk_per_call() {
  let mut ctx = context(TaskManager::inline(), &[5], 2);
  assert!(ctx.advance_points_io());

  let hits = Arc::new(AtomicUsize::new(0));
  let mut calls = 0;
  loop {
    calls += 1;
    let counter = Arc::clone(&hits);
    let exhausted = ctx.process_current_points(
      None,
      move |_, _| {
        counter.fetch_add(1, Ordering::Relaxed);
      },
      false,
    );
    if exhausted {
      break;
    }
  }
  assert_eq!(calls, 3);
  assert_eq!(hits.load(Ordering::Relaxed), 5);
}

#[test]
fn test_async_processing_dispatches_everything_at_once() {
  let mut ctx = context(TaskManager::with_threads(2).unwrap(), &[10], 3);
  assert!(ctx.advance_points_io());

  let hits = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&hits);
  let exhausted = ctx.process_current_points(
    None,
    move |_, _| {
      counter.fetch_add(1, Ordering::Relaxed);
    },
    false,
  );
  assert!(exhausted);
  assert_eq!(ctx.tasks().stats().submitted, 4);

  ctx.start_async_wait(AsyncState::Done);
  while ctx.poll_async_wait() {
    std::thread::yield_now();
  }
  assert!(ctx.is_done());
  assert_eq!(hits.load(Ordering::Relaxed), 10);
}

#[test]
fn test_force_sync_ignores_async_manager() {
  let mut ctx = context(TaskManager::with_threads(2).unwrap(), &[4], 0);
  assert!(ctx.advance_points_io());
  assert!(ctx.process_current_points(None, |_, _| {}, true));
  assert_eq!(ctx.tasks().stats().submitted, 0);
}

#[test]
fn test_bulk_processing_initializes_each_source() {
  let mut ctx = context(TaskManager::inline(), &[2, 3], 0);
  let mut initialized = Vec::new();
  let mut record = |source: &LoopSource| initialized.push(source.io_index);
  let exhausted = ctx.bulk_process_main_points(Some(&mut record), |_, _| {});
  assert!(exhausted);
  assert_eq!(initialized, vec![0, 1]);
}

/// A context never leaves WaitingOnAsyncWork while tasks are outstanding.
#[test]
fn test_wait_holds_while_outstanding() {
  let mut ctx = context(TaskManager::with_threads(1).unwrap(), &[1], 0);
  let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(0);
  ctx.tasks().start(move |_| {
    let _ = release_rx.recv();
    TaskOutcome::Success
  });

  ctx.start_async_wait(AsyncState::Custom("Next"));
  for _ in 0..50 {
    assert!(ctx.poll_async_wait());
    assert!(ctx.is_state(AsyncState::WaitingOnAsyncWork));
  }

  release_tx.send(()).unwrap();
  while ctx.poll_async_wait() {
    assert!(ctx.is_state(AsyncState::WaitingOnAsyncWork));
    std::thread::yield_now();
  }
  assert!(ctx.is_state(AsyncState::Custom("Next")));
  // Bookkeeping reset for the next phase.
  assert_eq!(ctx.tasks().stats().submitted, 0);
}

#[test]
fn test_poll_outside_wait_is_noop() {
  let mut ctx = context(TaskManager::inline(), &[1], 0);
  ctx.set_state(AsyncState::ProcessingPoints);
  assert!(!ctx.poll_async_wait());
  assert!(ctx.is_state(AsyncState::ProcessingPoints));
}

#[test]
fn test_output_main_points_skips_empty() {
  let mut ctx = context(TaskManager::inline(), &[2, 0, 1], 0);
  assert_eq!(ctx.output_main_points(), 2);
  let outputs = ctx.take_outputs();
  assert_eq!(outputs.len(), 2);
  assert!(outputs.iter().all(|tagged| tagged.pin == "Out"));
  assert!(ctx.take_outputs().is_empty());
}

#[test]
fn test_teardown_drains_outstanding_tasks() {
  let finished = Arc::new(AtomicUsize::new(0));
  {
    let ctx = context(TaskManager::with_threads(2).unwrap(), &[1], 0);
    for _ in 0..4 {
      let finished = Arc::clone(&finished);
      ctx.tasks().start(move |token| {
        while token.checkpoint().is_ok() {
          std::thread::yield_now();
        }
        finished.fetch_add(1, Ordering::Relaxed);
        TaskOutcome::Cancelled
      });
    }
  }
  // Dropping the context returned, so every task was drained.
  let after_drop = finished.load(Ordering::Relaxed);
  std::thread::sleep(std::time::Duration::from_millis(5));
  assert_eq!(finished.load(Ordering::Relaxed), after_drop);
}
