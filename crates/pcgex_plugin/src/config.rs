//! ProcessorSettings - execution options shared by every node.

/// Execution options embedded in every node's settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessorSettings {
  /// Run loops and per-item work as background tasks.
  /// When false, everything runs inline on the driving thread.
  pub do_async_processing: bool,

  /// Items per chunk. `-1` uses the node's preferred size;
  /// any other value `<= 0` processes the whole range as one chunk.
  pub chunk_size: i32,

  /// Dedicated worker pool size. `0` shares rayon's global pool.
  pub worker_threads: usize,
}

impl ProcessorSettings {
  /// Chunk size for a node whose preferred size is `preferred`.
  #[inline]
  pub fn resolve_chunk_size(&self, preferred: i32) -> i32 {
    if self.chunk_size == -1 {
      preferred
    } else {
      self.chunk_size
    }
  }

  /// Settings that run everything on the driving thread.
  pub fn synchronous() -> Self {
    Self {
      do_async_processing: false,
      ..Self::default()
    }
  }
}

impl Default for ProcessorSettings {
  fn default() -> Self {
    Self {
      do_async_processing: true,
      chunk_size: -1,
      worker_threads: 0,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_uses_preferred_chunk_size() {
    let settings = ProcessorSettings::default();
    assert!(settings.do_async_processing);
    assert_eq!(settings.resolve_chunk_size(32), 32);
  }

  #[test]
  fn test_explicit_chunk_size_wins() {
    let settings = ProcessorSettings {
      chunk_size: 8,
      ..Default::default()
    };
    assert_eq!(settings.resolve_chunk_size(32), 8);

    let whole = ProcessorSettings {
      chunk_size: 0,
      ..Default::default()
    };
    assert_eq!(whole.resolve_chunk_size(32), 0);
  }
}
