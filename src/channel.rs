use serialport::SerialPort;
use std::io::Read;
use std::time::Duration;

/// Communication rate the measurement box streams at.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

// `serialport` has no "block forever" mode, so the port gets a generous
// per-read timeout instead. An expired timeout surfaces as a `TimedOut` I/O
// error; each downstream stage decides what that means (the flusher takes it
// as "drained", the record stream retries).
const READ_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Cannot open device {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),
}

/// Exclusive, read-only connection to the measurement device.
///
/// Owns the port for the lifetime of the process; the only capability it
/// exposes is [`std::io::Read`], which is all the downstream pipeline needs.
pub struct SampleChannel {
    serial: Box<dyn SerialPort>,
}

impl SampleChannel {
    /// Open `device` at `baud_rate`, 8N1, no flow control.
    pub fn open(device: &str, baud_rate: u32) -> Result<Self, ChannelError> {
        log::debug!("Opening {} at {} baud", device, baud_rate);
        let serial = serialport::new(device, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| ChannelError::Open {
                device: device.to_string(),
                source,
            })?;

        Ok(Self { serial })
    }
}

impl Read for SampleChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.serial.read(buf)
    }
}

/// List candidate serial devices, USB/ACM ports first.
pub fn available_devices() -> Result<Vec<String>, ChannelError> {
    let mut names: Vec<String> = serialport::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect();
    names.sort_by_key(|name| {
        let basename = name.rsplit('/').next().unwrap_or(name).to_string();
        let usb = basename.starts_with("ttyACM")
            || basename.starts_with("ttyUSB")
            || basename.starts_with("cu.");
        (!usb, basename)
    });
    Ok(names)
}
