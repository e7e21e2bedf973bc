//! # voltgrab
//!
//! A small library (and CLI) for acquiring timestamped, line-delimited
//! samples from a serial-connected measurement device.
//!
//! The pipeline is deliberately simple and strictly sequential:
//!
//! 1. **Channel** ([`SampleChannel`]): opens the device and exposes raw,
//!    blocking byte reads.
//! 2. **Flush** ([`drain`]): discards whatever stale backlog the device
//!    accumulated before the reader attached, by reading fixed-size chunks
//!    until one comes back short.
//! 3. **Stream** ([`RecordStream`]): re-frames the byte stream into
//!    line-delimited text records.
//! 4. **Acquire** ([`acquire`]): skips a warm-up window, bounds the total
//!    sample count and writes each retained record to a sink, prefixed with
//!    the wall-clock arrival time in seconds since the Unix epoch.
//!
//! Record payloads are opaque: whatever the device prints on one line is
//! emitted verbatim after the timestamp.
//!
//! ## Example
//!
//! ```rust,no_run
//! use voltgrab::{acquire, drain, AcquireConfig, FlushConfig, RecordStream, SampleChannel};
//!
//! let mut channel = SampleChannel::open("/dev/ttyUSB0", voltgrab::DEFAULT_BAUD_RATE)?;
//! drain(&mut channel, &FlushConfig::default())?;
//!
//! let mut stream = RecordStream::new(channel);
//! let mut stdout = std::io::stdout().lock();
//! let summary = acquire(&mut stream, &AcquireConfig::default(), &mut stdout)?;
//!
//! if let Some(e) = stream.take_error() {
//!     eprintln!("acquisition ended early: {e}");
//! }
//! println!("{} samples", summary.emitted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Everything after the channel is generic over [`std::io::Read`], so the
//! whole pipeline runs unmodified against in-memory readers in tests.

pub mod acquire;
pub mod channel;
pub mod flush;
pub mod stream;

pub use acquire::{acquire, AcquireConfig, AcquireSummary};
pub use channel::{available_devices, ChannelError, SampleChannel, DEFAULT_BAUD_RATE};
pub use flush::{drain, FlushConfig, FlushError};
pub use stream::RecordStream;
