use std::{
    io::{self, BufRead, BufReader, Write},
    time::Duration,
};

use serde::Deserialize;
use serialport::{SerialPort, SerialPortInfo, SerialPortType};

use crate::display::Display;

pub const BAUD_RATE: u32 = 38400;
const READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Consecutive read timeouts tolerated while waiting for a status report.
const MAX_SILENT_READS: usize = 30;
/// Lines read without a status report before giving up on the controller.
const MAX_LINES_PER_WAIT: usize = 500;

#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("Could not open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("No serial port available - connect the display or use --demo")]
    NoPort,
    #[error("Display controller closed the connection")]
    Disconnected,
    #[error("Display controller stopped responding")]
    NoResponse,
    #[error("Character {0:?} is not on the flaps")]
    UnsupportedCharacter(char),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Init {
        num_modules: usize,
    },
    MoveEcho,
    Status {
        modules: Vec<ModuleStatus>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleStatus {
    pub state: String,
    pub flap: String,
    #[serde(default)]
    pub count_missed_home: u32,
    #[serde(default)]
    pub count_unexpected_home: u32,
}

/// Parses one line from the controller. Lines that are not JSON objects
/// (boot chatter, debug output) yield `None`.
pub fn parse_message(line: &str) -> Option<Message> {
    let line = line.trim_start_matches('\0').trim();
    if !line.starts_with('{') {
        return None;
    }

    match serde_json::from_str(line) {
        Ok(message) => Some(message),
        Err(e) => {
            debug!("Ignoring unparsable controller message {:?}: {}", line, e);
            None
        }
    }
}

pub fn encode_command(text: &str) -> Vec<u8> {
    format!("={}\n", text).into_bytes()
}

/// Split-flap controller on the other end of a line-based link.
pub struct Splitflap<R, W> {
    reader: R,
    writer: W,
    charset: Vec<char>,
    num_modules: usize,
    modules: Vec<ModuleStatus>,
}

pub type SerialSplitflap = Splitflap<BufReader<Box<dyn SerialPort>>, Box<dyn SerialPort>>;

impl SerialSplitflap {
    /// Opens the serial port and waits for the controller to report in.
    pub fn open(port_name: &str, charset: &[char]) -> Result<Self, DriverError> {
        info!("Connecting to split-flap display controller on {}", port_name);

        let port = serialport::new(port_name, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| DriverError::Open {
                port: port_name.to_string(),
                source: e,
            })?;
        let reader = BufReader::new(port.try_clone().map_err(|e| DriverError::Open {
            port: port_name.to_string(),
            source: e,
        })?);

        Splitflap::connect(reader, port, charset)
    }
}

impl<R: BufRead, W: Write> Splitflap<R, W> {
    pub fn connect(reader: R, writer: W, charset: &[char]) -> Result<Self, DriverError> {
        let mut flaps = Self {
            reader,
            writer,
            charset: charset.to_vec(),
            num_modules: 0,
            modules: Vec::new(),
        };
        flaps.wait_for_status()?;

        info!("Split-flap display ready with {} modules", flaps.num_modules);
        Ok(flaps)
    }

    pub fn modules(&self) -> &[ModuleStatus] {
        &self.modules
    }

    /// Flaps currently shown, as last reported by the controller.
    pub fn text(&self) -> String {
        self.modules.iter().map(|m| m.flap.as_str()).collect()
    }

    fn wait_for_status(&mut self) -> Result<(), DriverError> {
        let mut silent = 0;
        let mut lines = 0;
        let mut line = String::new();

        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return Err(DriverError::Disconnected),
                Ok(_) => {
                    silent = 0;
                    lines += 1;
                    if lines > MAX_LINES_PER_WAIT {
                        warn!(
                            "No status report in {} lines from the controller",
                            MAX_LINES_PER_WAIT
                        );
                        return Err(DriverError::NoResponse);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    silent += 1;
                    if silent >= MAX_SILENT_READS {
                        return Err(DriverError::NoResponse);
                    }
                    continue;
                }
                Err(e) => return Err(DriverError::Io(e)),
            }

            match parse_message(&line) {
                Some(Message::Init { num_modules }) => {
                    if self.num_modules != 0 {
                        warn!("Split-flap controller re-initialized");
                    }
                    self.num_modules = num_modules;
                }
                Some(Message::Status { modules }) => {
                    for (i, module) in modules.iter().enumerate() {
                        if module.state != "normal" {
                            warn!("Module {} reports state '{}'", i, module.state);
                        }
                    }
                    if self.num_modules == 0 {
                        self.num_modules = modules.len();
                    }
                    self.modules = modules;
                    return Ok(());
                }
                Some(Message::MoveEcho) | Some(Message::Other) | None => {}
            }
        }
    }
}

impl<R: BufRead, W: Write> Display for Splitflap<R, W> {
    fn num_modules(&self) -> Option<usize> {
        (self.num_modules > 0).then_some(self.num_modules)
    }

    fn show(&mut self, text: &str) -> Result<(), DriverError> {
        if let Some(c) = text.chars().find(|c| !self.charset.contains(c)) {
            return Err(DriverError::UnsupportedCharacter(c));
        }

        self.writer.write_all(&encode_command(text))?;
        self.writer.flush()?;
        self.wait_for_status()
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.writer.flush().map_err(DriverError::Io)
    }
}

/// Serial ports that look like real devices, sorted by name.
pub fn list_ports() -> Result<Vec<SerialPortInfo>, DriverError> {
    let mut ports: Vec<_> = serialport::available_ports()?
        .into_iter()
        .filter(|p| !matches!(p.port_type, SerialPortType::Unknown))
        .collect();
    ports.sort_by(|a, b| a.port_name.cmp(&b.port_name));
    Ok(ports)
}

pub fn describe_port(port: &SerialPortInfo) -> String {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => usb
            .product
            .clone()
            .or_else(|| usb.manufacturer.clone())
            .unwrap_or_else(|| format!("USB {:04x}:{:04x}", usb.vid, usb.pid)),
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "n/a".to_string(),
    }
}

pub fn print_ports(ports: &[SerialPortInfo]) {
    println!("Available serial ports:");
    for (i, port) in ports.iter().enumerate() {
        println!("[{:2}] {} - {}", i + 1, port.port_name, describe_port(port));
    }
    println!();
}

/// Picks a port by device name, by 1-based index into `ports`, or the first
/// available one.
pub fn select_port(ports: &[SerialPortInfo], key: Option<&str>) -> Option<String> {
    if let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) {
        if let Some(port) = ports
            .iter()
            .find(|p| p.port_name == key || p.port_name.rsplit('/').next() == Some(key))
        {
            info!("Using specified serial port '{}'", port.port_name);
            return Some(port.port_name.clone());
        }

        match key.parse::<usize>() {
            Ok(idx) if idx > 0 && idx <= ports.len() => {
                let name = ports[idx - 1].port_name.clone();
                info!("Using indexed serial port '{}' ({}/{})", name, idx, ports.len());
                return Some(name);
            }
            _ if key.contains('/') || key.to_ascii_uppercase().starts_with("COM") => {
                info!("Using unlisted serial port '{}'", key);
                return Some(key.to_string());
            }
            _ => warn!("Specified serial port '{}' not found", key),
        }
    }

    let first = ports.first().map(|p| p.port_name.clone());
    match &first {
        Some(name) => info!("Using default serial port '{}'", name),
        None => warn!("No serial ports found on the system"),
    }
    first
}
