//! Chunked loop strategies over point collections.
//!
//! A [`PointLoop`] walks one or more collections in chunks of at most
//! `chunk_size` indices. Each call to [`PointLoop::advance`] handles the
//! next chunk (per unfinished collection, for bulk kinds), so a node can
//! spread large collections over several ticks. Async kinds hand each chunk
//! to the [`TaskManager`] as one task; indices inside a chunk always run in
//! order on a single thread.

use std::ops::Range;
use std::sync::Arc;

use crate::data::PointData;
use crate::threading::{TaskManager, TaskOutcome};

/// A collection being iterated, and its position in the node's main inputs.
#[derive(Clone, Debug)]
pub struct LoopSource {
  pub io_index: usize,
  pub data: Arc<PointData>,
}

impl LoopSource {
  pub fn new(io_index: usize, data: Arc<PointData>) -> Self {
    Self { io_index, data }
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }
}

/// Splits `0..num_iterations` into consecutive chunks.
///
/// A chunk size `<= 0` yields the whole range at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkCursor {
  num_iterations: usize,
  chunk_size: i32,
  current: usize,
}

impl ChunkCursor {
  pub fn new(num_iterations: usize, chunk_size: i32) -> Self {
    Self {
      num_iterations,
      chunk_size,
      current: 0,
    }
  }

  pub fn remaining(&self) -> usize {
    self.num_iterations - self.current
  }

  pub fn is_exhausted(&self) -> bool {
    self.current >= self.num_iterations
  }
}

impl Iterator for ChunkCursor {
  type Item = Range<usize>;

  fn next(&mut self) -> Option<Range<usize>> {
    if self.is_exhausted() {
      return None;
    }
    let size = if self.chunk_size <= 0 {
      self.remaining()
    } else {
      (self.chunk_size as usize).min(self.remaining())
    };
    let start = self.current;
    self.current += size;
    Some(start..self.current)
  }
}

/// Execution strategy of a [`PointLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopKind {
  /// One collection at a time, on the driving thread.
  Plain,
  /// Every collection advances one chunk per step, on the driving thread.
  Bulk,
  /// One collection at a time, each chunk a background task.
  Async,
  /// Every collection advances one chunk per step, each chunk a task.
  BulkAsync,
}

impl LoopKind {
  pub fn select(bulk: bool, run_async: bool) -> Self {
    match (bulk, run_async) {
      (false, false) => Self::Plain,
      (true, false) => Self::Bulk,
      (false, true) => Self::Async,
      (true, true) => Self::BulkAsync,
    }
  }

  pub fn is_bulk(self) -> bool {
    matches!(self, Self::Bulk | Self::BulkAsync)
  }

  pub fn is_async(self) -> bool {
    matches!(self, Self::Async | Self::BulkAsync)
  }
}

#[derive(Debug)]
struct SubLoop {
  source: LoopSource,
  cursor: ChunkCursor,
  initialized: bool,
}

/// Resumable chunked iteration over one or more collections.
#[derive(Debug)]
pub struct PointLoop {
  kind: LoopKind,
  loops: Vec<SubLoop>,
}

impl PointLoop {
  pub fn new(kind: LoopKind, sources: Vec<LoopSource>, chunk_size: i32) -> Self {
    let loops = sources
      .into_iter()
      .map(|source| SubLoop {
        cursor: ChunkCursor::new(source.len(), chunk_size),
        source,
        initialized: false,
      })
      .collect();
    Self { kind, loops }
  }

  pub fn kind(&self) -> LoopKind {
    self.kind
  }

  pub fn has_remaining(&self) -> bool {
    self.loops.iter().any(|sub| !sub.cursor.is_exhausted())
  }

  /// Process the next chunk and report whether items remain.
  ///
  /// `initialize` runs on the calling thread, once per collection, right
  /// before that collection's first chunk.
  pub fn advance<B>(
    &mut self,
    tasks: &TaskManager,
    mut initialize: Option<&mut (dyn FnMut(&LoopSource) + '_)>,
    body: B,
  ) -> bool
  where
    B: Fn(usize, &LoopSource) + Send + Sync + 'static,
  {
    let body = Arc::new(body);
    let run_async = self.kind.is_async();
    let bulk = self.kind.is_bulk();

    for sub in self.loops.iter_mut().filter(|sub| !sub.cursor.is_exhausted()) {
      let Some(range) = sub.cursor.next() else {
        continue;
      };
      if !sub.initialized {
        sub.initialized = true;
        if let Some(init) = initialize.as_deref_mut() {
          init(&sub.source);
        }
      }

      if run_async {
        let body = Arc::clone(&body);
        let source = sub.source.clone();
        tasks.start(move |token| {
          for index in range {
            if token.is_cancelled() {
              return TaskOutcome::Cancelled;
            }
            body(index, &source);
          }
          TaskOutcome::Success
        });
      } else {
        for index in range {
          body(index, &sub.source);
        }
      }

      if !bulk {
        break;
      }
    }

    self.has_remaining()
  }
}

#[cfg(test)]
#[path = "loops_test.rs"]
mod loops_test;
