//! The acquisition loop: warm-up skip, sample bound, timestamping.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

/// Sample counting parameters.
///
/// `total` counts every record pulled from the device, warm-up included, so
/// the number of emitted records is `total - skip` at most.
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Leading records to discard (device startup transients).
    pub skip: u64,
    /// Overall record bound, warm-up included.
    pub total: u64,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            skip: 500,
            total: 30_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireSummary {
    /// Records pulled from the stream, discarded warm-up included.
    pub seen: u64,
    /// Records written to the sink.
    pub emitted: u64,
}

/// Wall-clock seconds since the Unix epoch.
fn unix_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

/// Drive the record stream to completion, writing timestamped samples.
///
/// Records with index below `skip` are consumed and discarded; records with
/// index in `skip..total` are stamped with the current wall-clock time the
/// moment they arrive and written as `"<seconds>.<micros> <record>\n"`. The
/// loop ends at `total` records or at end-of-stream, whichever comes first.
/// The sink is flushed after every record so a piped consumer sees samples
/// in near real time.
pub fn acquire<I, W>(
    records: I,
    config: &AcquireConfig,
    out: &mut W,
) -> std::io::Result<AcquireSummary>
where
    I: IntoIterator<Item = String>,
    W: Write,
{
    let mut summary = AcquireSummary {
        seen: 0,
        emitted: 0,
    };

    for record in records
        .into_iter()
        .take(usize::try_from(config.total).unwrap_or(usize::MAX))
    {
        let index = summary.seen;
        summary.seen += 1;
        if index < config.skip {
            continue;
        }
        writeln!(out, "{:.6} {}", unix_time(), record)?;
        out.flush()?;
        summary.emitted += 1;
    }

    log::debug!(
        "Acquisition finished: {} records seen, {} emitted",
        summary.seen,
        summary.emitted
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn run(names: &[&str], skip: u64, total: u64) -> (Vec<String>, AcquireSummary) {
        let mut out = Vec::new();
        let config = AcquireConfig { skip, total };
        let summary = acquire(records(names), &config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        (text.lines().map(str::to_string).collect(), summary)
    }

    /// `<digits>.<6 digits> <payload>`
    fn split_line(line: &str) -> (&str, &str) {
        let (stamp, payload) = line.split_once(' ').expect("missing separator");
        let (secs, micros) = stamp.split_once('.').expect("missing decimal point");
        assert!(!secs.is_empty() && secs.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(micros.len(), 6);
        assert!(micros.bytes().all(|b| b.is_ascii_digit()));
        (stamp, payload)
    }

    #[test]
    fn test_skip_and_total_window() {
        let (lines, summary) = run(&["a", "b", "c", "d", "e", "f"], 2, 5);
        let payloads: Vec<&str> = lines.iter().map(|l| split_line(l).1).collect();
        assert_eq!(payloads, vec!["c", "d", "e"]);
        assert_eq!(
            summary,
            AcquireSummary {
                seen: 5,
                emitted: 3
            }
        );
    }

    #[test]
    fn test_zero_total_emits_nothing() {
        let (lines, summary) = run(&["a", "b", "c"], 0, 0);
        assert!(lines.is_empty());
        assert_eq!(
            summary,
            AcquireSummary {
                seen: 0,
                emitted: 0
            }
        );
    }

    #[test]
    fn test_short_stream_ends_loop() {
        let (lines, summary) = run(&["a", "b", "c"], 0, 10);
        assert_eq!(lines.len(), 3);
        assert_eq!(
            summary,
            AcquireSummary {
                seen: 3,
                emitted: 3
            }
        );
    }

    #[test]
    fn test_skip_larger_than_stream_emits_nothing() {
        let (lines, summary) = run(&["a", "b"], 5, 10);
        assert!(lines.is_empty());
        assert_eq!(
            summary,
            AcquireSummary {
                seen: 2,
                emitted: 0
            }
        );
    }

    #[test]
    fn test_emitted_count_property() {
        // emitted = min(total, available) - skip when positive, else 0
        let names = ["r0", "r1", "r2", "r3", "r4", "r5", "r6"];
        for (skip, total) in [(0, 7), (0, 3), (3, 3), (2, 20), (7, 7), (0, 0)] {
            let (lines, _) = run(&names, skip, total);
            let expected = total.min(names.len() as u64).saturating_sub(skip);
            assert_eq!(lines.len() as u64, expected, "skip={skip} total={total}");
        }
    }

    #[test]
    fn test_arrival_order_preserved() {
        let (lines, _) = run(&["3.14", "2.71", "1.41"], 0, 3);
        let payloads: Vec<&str> = lines.iter().map(|l| split_line(l).1).collect();
        assert_eq!(payloads, vec!["3.14", "2.71", "1.41"]);
    }

    #[test]
    fn test_timestamps_are_nondecreasing() {
        let (lines, _) = run(&["a", "b", "c", "d"], 0, 4);
        let stamps: Vec<f64> = lines
            .iter()
            .map(|l| split_line(l).0.parse().unwrap())
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        // Sanity: stamps are current wall-clock time, not zero.
        assert!(stamps[0] > 1_000_000_000.0);
    }

    #[test]
    fn test_full_pipeline_with_stale_backlog() {
        use crate::flush::{drain, FlushConfig};
        use crate::stream::RecordStream;
        use std::io::Read;

        // Device with a pre-existing backlog: two full 256-byte chunks of
        // garbage, a short chunk, then live line-delimited samples.
        struct FakeDevice {
            chunks: Vec<Vec<u8>>,
        }

        impl Read for FakeDevice {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.chunks.is_empty() {
                    return Ok(0);
                }
                let chunk = &mut self.chunks[0];
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                chunk.drain(..n);
                if chunk.is_empty() {
                    self.chunks.remove(0);
                }
                Ok(n)
            }
        }

        let mut device = FakeDevice {
            chunks: vec![
                vec![b'x'; 256],
                vec![b'x'; 256],
                b"tail-of-stale-line\n".to_vec(),
                b"100\n101\n102\n103\n".to_vec(),
            ],
        };

        let discarded = drain(&mut device, &FlushConfig::default()).unwrap();
        assert_eq!(discarded, 256 + 256 + 19);

        let mut stream = RecordStream::new(device);
        let mut out = Vec::new();
        let config = AcquireConfig { skip: 1, total: 3 };
        let summary = acquire(&mut stream, &config, &mut out).unwrap();

        assert_eq!(
            summary,
            AcquireSummary {
                seen: 3,
                emitted: 2
            }
        );
        assert!(stream.take_error().is_none());

        let text = String::from_utf8(out).unwrap();
        let payloads: Vec<&str> = text
            .lines()
            .map(|l| l.split_once(' ').unwrap().1)
            .collect();
        assert_eq!(payloads, vec!["101", "102"]);
    }

    #[test]
    fn test_payload_is_opaque() {
        let (lines, _) = run(&["  weird \tpayload 1 2 3", ""], 0, 2);
        assert_eq!(split_line(&lines[0]).1, "  weird \tpayload 1 2 3");
        assert_eq!(lines[1].split_once(' ').unwrap().1, "");
    }
}
