//! Drain-until-short-read buffer flush.
//!
//! A device that has been streaming since power-on leaves stale bytes in its
//! output buffer. Reading fixed-size chunks until one comes back short is a
//! heuristic for finding the live edge of the stream: while backlog remains,
//! every read fills the whole chunk; once the reader has caught up, reads
//! return whatever the device produced since the last call, which at sane
//! sample rates is less than a chunk.

use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    #[error("IO error while draining stale data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backlog not drained after {attempts} full reads ({bytes} bytes discarded)")]
    BacklogNotDrained { attempts: usize, bytes: usize },
}

/// Tuning knobs for [`drain`].
#[derive(Debug, Clone)]
pub struct FlushConfig {
    /// Read chunk size; a read shorter than this ends the drain.
    pub chunk_size: usize,
    /// Upper bound on consecutive full reads. `None` drains without bound,
    /// which hangs forever on a device that outpaces the reader.
    pub max_reads: Option<usize>,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            max_reads: Some(4096),
        }
    }
}

/// Discard stale bytes until a short read signals live data.
///
/// Returns the number of bytes thrown away. Any I/O error here is fatal to
/// the whole acquisition: without a clean drain there is no reliable starting
/// point in the stream.
pub fn drain<R: Read>(reader: &mut R, config: &FlushConfig) -> Result<usize, FlushError> {
    let mut buf = vec![0u8; config.chunk_size];
    let mut discarded = 0;
    let mut attempts = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(n) => n,
            // Nothing arrived within the port timeout: the backlog is gone
            // and the device is just quiet. Same as a short read.
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => 0,
            Err(e) => return Err(e.into()),
        };
        discarded += n;
        if n < config.chunk_size {
            log::debug!(
                "Buffer drained: {} stale bytes in {} reads",
                discarded,
                attempts + 1
            );
            return Ok(discarded);
        }
        attempts += 1;
        if let Some(max) = config.max_reads {
            if attempts >= max {
                return Err(FlushError::BacklogNotDrained {
                    attempts,
                    bytes: discarded,
                });
            }
        }
    }
}
