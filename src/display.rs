use std::io::{self, Write};

use crate::{config::Output, driver, format::Frame};

pub use crate::driver::DriverError;

/// Something that can show one line of text at a time.
///
/// Implementations acquire their device when constructed and release it in
/// `close` (or when dropped).
pub trait Display {
    /// Number of character modules, when the device reports it.
    fn num_modules(&self) -> Option<usize>;
    fn show(&mut self, text: &str) -> Result<(), DriverError>;
    fn close(&mut self) -> Result<(), DriverError>;
}

/// Mirrors what the flaps would show to a terminal, for running without
/// hardware.
pub struct ConsoleDisplay<W> {
    out: W,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Display for ConsoleDisplay<W> {
    fn num_modules(&self) -> Option<usize> {
        None
    }

    fn show(&mut self, text: &str) -> Result<(), DriverError> {
        writeln!(self.out, "|{}|", text)?;
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Opens the display the configuration asks for.
pub fn connect(output: &Output, charset: &[char]) -> Result<Box<dyn Display>, DriverError> {
    match output {
        Output::Console => {
            warn!("Demo mode: no serial port will be opened, mirroring to the console");
            Ok(Box::new(ConsoleDisplay::stdout()))
        }
        Output::Serial { port } => {
            let ports = driver::list_ports()?;
            if port.is_none() && ports.len() > 1 {
                driver::print_ports(&ports);
            }
            let name = driver::select_port(&ports, port.as_deref()).ok_or(DriverError::NoPort)?;
            Ok(Box::new(driver::SerialSplitflap::open(&name, charset)?))
        }
    }
}

/// Sends frames to a display, holding each for its dwell time.
pub struct Printer {
    display: Box<dyn Display>,
    last_line: Option<String>,
    closed: bool,
}

impl Printer {
    pub fn new(display: Box<dyn Display>) -> Self {
        Self {
            display,
            last_line: None,
            closed: false,
        }
    }

    pub fn num_modules(&self) -> Option<usize> {
        self.display.num_modules()
    }

    pub fn last_line(&self) -> Option<&str> {
        self.last_line.as_deref()
    }

    pub async fn print(&mut self, frames: &[Frame]) -> Result<(), DriverError> {
        for frame in frames {
            info!("Setting flaps to: '{}'", frame.text);

            // Skip the controller round trip if the flaps already show it
            if self.last_line.as_deref() != Some(frame.text.as_str()) {
                self.display.show(&frame.text)?;
                self.last_line = Some(frame.text.clone());
            }

            if !frame.dwell.is_zero() {
                tokio::time::sleep(frame.dwell).await;
            }
        }
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.display.close()
    }
}

impl Drop for Printer {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Could not close display: {}", e);
        }
    }
}
