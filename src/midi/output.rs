//! MIDI output port: the transport that carries raw messages out.

use midir::{MidiOutput, MidiOutputConnection};
use tracing::info;

use crate::error::{InstrumentError, Result};

/// Client name announced to the MIDI subsystem.
const CLIENT_NAME: &str = "gestural";

/// Anything that can deliver a raw MIDI message.
pub trait MidiTransport: Send {
    /// Send one raw message.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Human-readable name of the connected port.
    fn port_name(&self) -> &str;
}

/// Output connection backed by the system MIDI API.
pub struct MidirTransport {
    connection: MidiOutputConnection,
    port_name: String,
}

impl MidirTransport {
    /// Connect to an output port.
    ///
    /// Picks the first port whose name contains `preferred`, or the first
    /// enumerated port when no preference is given. Returns
    /// [`InstrumentError::NoMidiPorts`] when the system has no outputs.
    pub fn connect(preferred: Option<&str>) -> Result<Self> {
        let midi_out =
            MidiOutput::new(CLIENT_NAME).map_err(|e| InstrumentError::Midi(e.to_string()))?;

        let ports = midi_out.ports();
        if ports.is_empty() {
            return Err(InstrumentError::NoMidiPorts);
        }

        let (port, port_name) = match preferred {
            Some(filter) => ports
                .iter()
                .find_map(|p| {
                    let name = midi_out.port_name(p).unwrap_or_default();
                    name.contains(filter).then(|| (p.clone(), name))
                })
                .ok_or_else(|| {
                    InstrumentError::Midi(format!("MIDI output matching '{filter}' not found"))
                })?,
            None => {
                let p = ports[0].clone();
                let name = midi_out
                    .port_name(&p)
                    .unwrap_or_else(|_| "unknown".to_string());
                (p, name)
            }
        };

        let connection = midi_out
            .connect(&port, "gestural-output")
            .map_err(|e| InstrumentError::Midi(e.to_string()))?;

        info!(port = %port_name, "MIDI output connected");

        Ok(Self {
            connection,
            port_name,
        })
    }

    /// List all available MIDI output port names.
    pub fn list_ports() -> Vec<String> {
        let Ok(midi_out) = MidiOutput::new("gestural-list") else {
            return Vec::new();
        };
        midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect()
    }
}

impl MidiTransport for MidirTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.connection
            .send(bytes)
            .map_err(|e| InstrumentError::Send(e.to_string()))
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }
}
