//! Session state and the control-assignment flow.
//!
//! The session starts in [`Phase::Configuring`]. The user picks an input,
//! arms an axis and wiggles a knob; the next control change on that input
//! becomes the axis assignment. Once both axes are assigned the session
//! moves to [`Phase::Running`] exactly once, and from then on control
//! changes on the assigned controllers drive the live [`Sample`].

use crate::midi::{DeviceId, MidiMessage, RawMessage};
use crate::notify::Notification;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("X"),
            Axis::Y => f.write_str("Y"),
        }
    }
}

/// Latest value of the two assigned controllers, 0..=127 each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sample {
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configuring,
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectInput(DeviceId),
    /// No input is subscribed any more.
    DeselectInput,
    Assign(Axis),
    Midi { source: DeviceId, bytes: Vec<u8> },
}

/// What the caller has to do after an [`Event`] was applied.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Effects {
    pub notifications: Vec<Notification>,
    /// Set on the single transition from `Configuring` to `Running`.
    pub start_renderer: bool,
    pub sample_changed: bool,
}

impl Effects {
    fn notify(notification: Notification) -> Self {
        Self {
            notifications: vec![notification],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    selected_input: Option<DeviceId>,
    assigning: Option<Axis>,
    x_control: Option<u8>,
    y_control: Option<u8>,
    sample: Sample,
    last_message: Option<RawMessage>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Configuring,
            selected_input: None,
            assigning: None,
            x_control: None,
            y_control: None,
            sample: Sample::default(),
            last_message: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn sample(&self) -> Sample {
        self.sample
    }

    pub fn selected_input(&self) -> Option<&DeviceId> {
        self.selected_input.as_ref()
    }

    pub fn assigning(&self) -> Option<Axis> {
        self.assigning
    }

    pub fn assignment(&self, axis: Axis) -> Option<u8> {
        match axis {
            Axis::X => self.x_control,
            Axis::Y => self.y_control,
        }
    }

    pub fn can_assign(&self) -> bool {
        self.selected_input.is_some()
    }

    pub fn apply(&mut self, event: Event) -> Effects {
        match event {
            Event::SelectInput(id) => {
                self.selected_input = Some(id);
                self.last_message = None;
                Effects::default()
            }
            Event::DeselectInput => {
                self.selected_input = None;
                self.assigning = None;
                self.last_message = None;
                Effects::default()
            }
            Event::Assign(axis) => self.arm(axis),
            Event::Midi { source, bytes } => self.handle_midi(&source, &bytes),
        }
    }

    fn arm(&mut self, axis: Axis) -> Effects {
        if !self.can_assign() {
            return Effects::notify(Notification::error("Select a MIDI input first"));
        }
        self.assigning = Some(axis);
        Effects::notify(Notification::info(format!("Selecting {}", axis)))
    }

    fn handle_midi(&mut self, source: &DeviceId, bytes: &[u8]) -> Effects {
        // Late delivery from an input that has since been replaced.
        if self.selected_input.as_ref() != Some(source) {
            log::debug!("Dropping message from inactive input {}", source);
            return Effects::default();
        }

        let message = match MidiMessage::parse(bytes) {
            Ok(message) => message,
            Err(e) => {
                return Effects::notify(Notification::error(format!(
                    "Malformed MIDI message: {}",
                    e
                )))
            }
        };
        self.last_message = Some(RawMessage::from_bytes(bytes));

        match message {
            MidiMessage::ControlChange { controller, value } => {
                self.control_change(controller, value)
            }
            MidiMessage::Other { .. } => Effects::default(),
        }
    }

    fn control_change(&mut self, controller: u8, value: u8) -> Effects {
        if let Some(axis) = self.assigning.take() {
            match axis {
                Axis::X => self.x_control = Some(controller),
                Axis::Y => self.y_control = Some(controller),
            }
            let mut effects = Effects::notify(Notification::info(format!(
                "{} Control Selected: {}",
                axis, controller
            )));
            effects.start_renderer = self.start_if_configured();
            return effects;
        }

        if self.x_control.is_none() && self.y_control.is_none() {
            return Effects::notify(Notification::error("No controls selected"));
        }

        let before = self.sample;
        if self.x_control == Some(controller) {
            self.sample.x = value;
        }
        if self.y_control == Some(controller) {
            self.sample.y = value;
        }
        Effects {
            sample_changed: self.sample != before,
            ..Default::default()
        }
    }

    fn start_if_configured(&mut self) -> bool {
        let configured = self.x_control.is_some() && self.y_control.is_some();
        if configured && self.phase == Phase::Configuring {
            self.phase = Phase::Running;
            return true;
        }
        false
    }

    pub fn status_line(&self) -> String {
        match self.last_message {
            Some(raw) => format!(
                "Status: 0x{:x} Data 0: {} Data 1: {}",
                raw.status, raw.data0, raw.data1
            ),
            None => "Status: 00 Data 0: 00 Data 1: 00".to_string(),
        }
    }

    pub fn state_line(&self) -> String {
        format!("State {{x: {}, y: {}}}", self.sample.x, self.sample.y)
    }
}
