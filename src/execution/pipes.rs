use std::os::fd::{AsRawFd, OwnedFd};

use log::debug;
use nix::fcntl::OFlag;
use nix::unistd::pipe2;

use crate::error::{ShellError, ShellResult};

struct PipePair {
    read: Option<OwnedFd>,
    write: Option<OwnedFd>,
}

/// The pipes connecting adjacent pipeline stages.
///
/// Pair `i` joins stage `i`'s stdout to stage `i + 1`'s stdin. Ends are handed
/// out at most once; whatever was not taken is closed when the set drops, so
/// every early return closes the parent's copies.
pub struct PipeSet {
    pairs: Vec<PipePair>,
}

impl PipeSet {
    /// Create `count` close-on-exec pipes. On failure every pipe created so
    /// far is closed before the error is returned.
    pub fn allocate(count: usize) -> ShellResult<Self> {
        let mut pairs = Vec::with_capacity(count);
        for idx in 0..count {
            // Children must only see the ends placed on their stdio slots.
            let (read, write) = pipe2(OFlag::O_CLOEXEC).map_err(|err| {
                ShellError::setup("pipe", err)
                    .with_context(format!("while creating pipe {} of {count}", idx + 1))
            })?;
            debug!(
                "pipeline event=pipe idx={} read_fd={} write_fd={}",
                idx,
                read.as_raw_fd(),
                write.as_raw_fd()
            );
            pairs.push(PipePair {
                read: Some(read),
                write: Some(write),
            });
        }
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn take_read(&mut self, idx: usize) -> Option<OwnedFd> {
        self.pairs.get_mut(idx).and_then(|pair| pair.read.take())
    }

    pub fn take_write(&mut self, idx: usize) -> Option<OwnedFd> {
        self.pairs.get_mut(idx).and_then(|pair| pair.write.take())
    }

    /// Descriptors still owned by the set.
    pub fn open_count(&self) -> usize {
        self.pairs
            .iter()
            .map(|pair| usize::from(pair.read.is_some()) + usize::from(pair.write.is_some()))
            .sum()
    }
}
