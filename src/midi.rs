use crossbeam::channel::Sender;
use midir::{Ignore, MidiInput, MidiInputConnection};
use std::fmt;
use thiserror::Error;

const CC_MSG: u8 = 0xB0;
const DATA_MAX: u8 = 0x7F;

#[derive(Error, Debug)]
pub enum MidiError {
    #[error("Midi Access Denied: {0}")]
    AccessDenied(String),
    #[error("Unknown MIDI input: {0}")]
    UnknownDevice(DeviceId),
    #[error("Failed to open MIDI input: {0}")]
    Connect(String),
    #[error("MIDI port error: {0}")]
    PortInfo(#[from] midir::PortInfoError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MessageError {
    #[error("empty MIDI message")]
    Empty,
    #[error("truncated message for status 0x{status:02x}: {len} byte(s)")]
    Truncated { status: u8, len: usize },
    #[error("data byte {0} is out of range")]
    DataOutOfRange(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(pub String);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub id: DeviceId,
    pub display_name: String,
}

/// Bytes received from one input, tagged with the device they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiEvent {
    pub source: DeviceId,
    pub bytes: Vec<u8>,
}

/// The three bytes echoed on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawMessage {
    pub status: u8,
    pub data0: u8,
    pub data1: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    ControlChange { controller: u8, value: u8 },
    Other { status: u8 },
}

impl MidiMessage {
    /// Only status byte 0xB0 is interpreted. Every other status is passed
    /// through as `Other` and ignored by the session.
    pub fn parse(bytes: &[u8]) -> Result<Self, MessageError> {
        let (&status, data) = bytes.split_first().ok_or(MessageError::Empty)?;

        if status != CC_MSG {
            return Ok(MidiMessage::Other { status });
        }

        match *data {
            [controller, value, ..] => {
                if let Some(&byte) = [controller, value].iter().find(|&&b| b > DATA_MAX) {
                    return Err(MessageError::DataOutOfRange(byte));
                }
                Ok(MidiMessage::ControlChange { controller, value })
            }
            _ => Err(MessageError::Truncated {
                status,
                len: bytes.len(),
            }),
        }
    }
}

impl RawMessage {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            status: bytes.first().copied().unwrap_or(0),
            data0: bytes.get(1).copied().unwrap_or(0),
            data1: bytes.get(2).copied().unwrap_or(0),
        }
    }
}

/// Granted access to the system MIDI client. Holds the input list captured
/// at grant time and at most one open input connection.
pub struct MidiAccess {
    client_name: String,
    inputs: Vec<InputDevice>,
    connection: Option<(DeviceId, MidiInputConnection<()>)>,
}

impl MidiAccess {
    pub fn request(client_name: &str) -> Result<Self, MidiError> {
        let mut midi_in =
            MidiInput::new(client_name).map_err(|e| MidiError::AccessDenied(e.to_string()))?;
        midi_in.ignore(Ignore::None);

        let mut inputs = Vec::new();
        for port in midi_in.ports() {
            let display_name = midi_in.port_name(&port)?;
            inputs.push(InputDevice {
                id: DeviceId(port.id()),
                display_name,
            });
        }
        log::info!("MIDI access granted, {} input(s) available", inputs.len());

        Ok(Self {
            client_name: client_name.to_string(),
            inputs,
            connection: None,
        })
    }

    /// Access over a fixed input list, without touching the system client.
    #[cfg(test)]
    pub(crate) fn from_snapshot(client_name: &str, inputs: Vec<InputDevice>) -> Self {
        Self {
            client_name: client_name.to_string(),
            inputs,
            connection: None,
        }
    }

    pub fn inputs(&self) -> &[InputDevice] {
        &self.inputs
    }

    pub fn find_by_name(&self, needle: &str) -> Option<&InputDevice> {
        let needle = needle.to_lowercase();
        self.inputs
            .iter()
            .find(|input| input.display_name.to_lowercase().contains(&needle))
    }

    pub fn subscribed(&self) -> Option<&DeviceId> {
        self.connection.as_ref().map(|(id, _)| id)
    }

    /// Routes messages from `id` into `sink`. `wake` runs after every
    /// delivered message. The previous subscription is closed only once the
    /// new one is open; on error it stays active.
    pub fn subscribe<W>(
        &mut self,
        id: &DeviceId,
        sink: Sender<MidiEvent>,
        wake: W,
    ) -> Result<(), MidiError>
    where
        W: Fn() + Send + 'static,
    {
        if !self.inputs.iter().any(|input| &input.id == id) {
            return Err(MidiError::UnknownDevice(id.clone()));
        }

        let mut connector = MidiInput::new(&self.client_name)
            .map_err(|e| MidiError::Connect(e.to_string()))?;
        connector.ignore(Ignore::None);
        let port = connector
            .find_port_by_id(id.0.clone())
            .ok_or_else(|| MidiError::UnknownDevice(id.clone()))?;

        let source = id.clone();
        let conn = connector
            .connect(
                &port,
                &self.client_name,
                move |_, message, _| {
                    let event = MidiEvent {
                        source: source.clone(),
                        bytes: message.to_vec(),
                    };
                    if sink.send(event).is_ok() {
                        wake();
                    }
                },
                (),
            )
            .map_err(|e| MidiError::Connect(e.to_string()))?;

        log::info!("Opened MIDI input {}", id);
        if let Some((old, old_conn)) = self.connection.replace((id.clone(), conn)) {
            old_conn.close();
            log::info!("Closed MIDI input {}", old);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_control_change() {
        assert_eq!(
            MidiMessage::parse(&[0xB0, 7, 100]),
            Ok(MidiMessage::ControlChange {
                controller: 7,
                value: 100
            })
        );
    }

    #[test]
    fn other_channels_and_statuses_are_passed_through() {
        assert_eq!(
            MidiMessage::parse(&[0xB1, 7, 100]),
            Ok(MidiMessage::Other { status: 0xB1 })
        );
        assert_eq!(
            MidiMessage::parse(&[0x90, 60, 127]),
            Ok(MidiMessage::Other { status: 0x90 })
        );
        assert_eq!(MidiMessage::parse(&[0xF8]), Ok(MidiMessage::Other { status: 0xF8 }));
    }

    #[test]
    fn rejects_malformed_messages() {
        assert_eq!(MidiMessage::parse(&[]), Err(MessageError::Empty));
        assert_eq!(
            MidiMessage::parse(&[0xB0, 7]),
            Err(MessageError::Truncated { status: 0xB0, len: 2 })
        );
        assert_eq!(
            MidiMessage::parse(&[0xB0, 7, 0x80]),
            Err(MessageError::DataOutOfRange(0x80))
        );
    }

    #[test]
    fn raw_message_pads_missing_bytes() {
        assert_eq!(
            RawMessage::from_bytes(&[0xF8]),
            RawMessage {
                status: 0xF8,
                data0: 0,
                data1: 0
            }
        );
    }

    #[test]
    fn subscribing_to_unknown_input_fails_without_side_effects() {
        let mut access = MidiAccess::from_snapshot(
            "knobsketch-test",
            vec![InputDevice {
                id: DeviceId("knobs".to_string()),
                display_name: "Knob Box".to_string(),
            }],
        );
        let (tx, _rx) = crossbeam::channel::unbounded();

        let err = access
            .subscribe(&DeviceId("unplugged".to_string()), tx, || {})
            .unwrap_err();
        assert!(matches!(err, MidiError::UnknownDevice(ref id) if id.0 == "unplugged"));
        assert_eq!(access.subscribed(), None);
    }

    #[test]
    fn finds_inputs_by_partial_name() {
        let access = MidiAccess::from_snapshot(
            "knobsketch-test",
            vec![
                InputDevice {
                    id: DeviceId("a".to_string()),
                    display_name: "Midi Through Port-0".to_string(),
                },
                InputDevice {
                    id: DeviceId("b".to_string()),
                    display_name: "nanoKONTROL2".to_string(),
                },
            ],
        );
        assert_eq!(access.find_by_name("kontrol").map(|i| &i.id.0[..]), Some("b"));
        assert!(access.find_by_name("launchpad").is_none());
    }
}
