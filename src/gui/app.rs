use crate::config::AppConfig;
use crate::midi::{DeviceId, MidiAccess, MidiEvent};
use crate::notify::{Notification, NotificationLog};
use crate::render::{CanvasSpec, Frame, Renderer};
use crate::session::{Event, Session};
use crossbeam::channel::{self, Receiver, Sender};
use eframe::egui;

pub enum MidiStatus {
    NotRequested,
    /// Terminal for the lifetime of the app; there is no retry.
    Denied(String),
    Granted(MidiAccess),
}

pub struct SketchApp {
    pub config: AppConfig,
    pub session: Session,
    pub midi: MidiStatus,
    pub notifications: NotificationLog,
    pub renderer: Option<Renderer>,
    pub texture: Option<egui::TextureHandle>,
    /// Forced open/closed state for the settings header, applied once.
    pub settings_open: Option<bool>,
    preferred_input: Option<String>,
    tx: Sender<MidiEvent>,
    rx: Receiver<MidiEvent>,
}

impl SketchApp {
    pub fn new(config: AppConfig, preferred_input: Option<String>) -> Self {
        let (tx, rx) = channel::unbounded();
        Self {
            notifications: NotificationLog::new(config.notification_capacity),
            config,
            session: Session::new(),
            midi: MidiStatus::NotRequested,
            renderer: None,
            texture: None,
            settings_open: None,
            preferred_input,
            tx,
            rx,
        }
    }

    pub fn wants_midi_at_startup(&self) -> bool {
        self.preferred_input.is_some()
    }

    pub fn request_access(&mut self, ctx: &egui::Context) {
        if !matches!(self.midi, MidiStatus::NotRequested) {
            return;
        }

        match MidiAccess::request(&self.config.client_name) {
            Ok(access) => {
                let preferred = self
                    .preferred_input
                    .as_deref()
                    .and_then(|name| access.find_by_name(name))
                    .map(|input| input.id.clone());
                self.midi = MidiStatus::Granted(access);

                match (preferred, self.preferred_input.take()) {
                    (Some(id), _) => self.select_input(id, ctx),
                    (None, Some(name)) => self
                        .notifications
                        .push(Notification::error(format!("No MIDI input matching '{}'", name))),
                    (None, None) => {}
                }
            }
            Err(e) => {
                self.notifications.push(Notification::error(e.to_string()));
                self.midi = MidiStatus::Denied(e.to_string());
            }
        }
    }

    pub fn select_input(&mut self, id: DeviceId, ctx: &egui::Context) {
        let MidiStatus::Granted(access) = &mut self.midi else {
            return;
        };
        if access.subscribed() == Some(&id) {
            return;
        }

        let repaint_ctx = ctx.clone();
        let result = access.subscribe(&id, self.tx.clone(), move || repaint_ctx.request_repaint());
        let active = access.subscribed().cloned();
        if let Err(e) = result {
            self.notifications.push(Notification::error(e.to_string()));
        }

        // The session's selection always names the open connection.
        match active {
            Some(active) if self.session.selected_input() != Some(&active) => {
                self.apply(Event::SelectInput(active))
            }
            None if self.session.selected_input().is_some() => self.apply(Event::DeselectInput),
            _ => {}
        }
    }

    pub fn apply(&mut self, event: Event) {
        let effects = self.session.apply(event);
        self.notifications.extend(effects.notifications);
        if effects.sample_changed {
            log::trace!("{}", self.session.state_line());
        }

        if effects.start_renderer {
            log::info!("Both axes assigned, starting sketch");
            let spec = CanvasSpec::from(&self.config.canvas);
            self.renderer = Some(Renderer::new(spec, self.session.sample()));
            self.settings_open = Some(false);
        }
    }

    pub fn process_incoming_messages(&mut self) {
        while let Ok(MidiEvent { source, bytes }) = self.rx.try_recv() {
            self.apply(Event::Midi { source, bytes });
        }
    }

    fn advance_renderer(&mut self, ctx: &egui::Context) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let key_pressed = ctx.input(|i| {
            i.events
                .iter()
                .any(|e| matches!(e, egui::Event::Key { pressed: true, repeat: false, .. }))
        });
        if key_pressed {
            renderer.request_clear();
        }

        match renderer.frame(self.session.sample()) {
            Frame::Cleared => log::debug!("Canvas cleared"),
            Frame::Drew(segment) => log::trace!("Segment {:?} -> {:?}", segment.from, segment.to),
            Frame::Idle => {}
        }
    }
}

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_incoming_messages();
        self.advance_renderer(ctx);

        egui::TopBottomPanel::top("midi_settings").show(ctx, |ui| {
            super::settings_ui::render_settings(self, ui, ctx);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            super::canvas::render_canvas(self, ui);
        });

        if self.renderer.is_some() {
            ctx.request_repaint();
        }
    }
}
