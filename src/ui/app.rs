use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Local};
use eframe::egui::{
    self, Align, Align2, Color32, Layout, RichText, ScrollArea, TextEdit, TopBottomPanel, Ui,
};

use crate::alarm::manager::AlarmManager;
use crate::alarm::model::parse_wall_clock;
use crate::sound::SelectedSound;
use crate::timer::manager::TimerManager;
use crate::timer::model::{TimerFieldError, TimerFields, format_remaining};

const MAX_POLL_CATCHUP: usize = 8;
const STATUS_TTL: Duration = Duration::from_secs(3);

const ACCENT: Color32 = Color32::from_rgb(122, 216, 184);
const CLOCK: Color32 = Color32::from_rgb(255, 209, 128);
const MUTED: Color32 = Color32::from_rgb(158, 173, 189);
const OK: Color32 = Color32::from_rgb(118, 220, 142);
const WARN: Color32 = Color32::from_rgb(255, 186, 106);
const ALERT: Color32 = Color32::from_rgb(255, 112, 112);

pub fn run_gui(sound: SelectedSound, tick: Duration) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Chime")
            .with_inner_size([960.0, 620.0])
            .with_min_inner_size([760.0, 500.0]),
        ..Default::default()
    };

    let app = ChimeApp::new(sound, tick);

    eframe::run_native(
        "Chime",
        native_options,
        Box::new(move |cc| {
            configure_theme(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to launch Chime GUI: {err}"))?;

    Ok(())
}

fn configure_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(Color32::from_rgb(228, 232, 240));
    visuals.panel_fill = Color32::from_rgb(18, 16, 24);
    visuals.window_fill = Color32::from_rgb(24, 22, 32);
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(22, 20, 30);
    visuals.widgets.inactive.bg_fill = Color32::from_rgb(32, 29, 42);
    visuals.widgets.hovered.bg_fill = Color32::from_rgb(48, 43, 63);
    visuals.widgets.active.bg_fill = Color32::from_rgb(66, 58, 88);
    visuals.selection.bg_fill = Color32::from_rgb(96, 84, 150);
    ctx.set_visuals(visuals);
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum View {
    Alarms,
    Timers,
}

struct RingEntry {
    label: String,
    fired_at: DateTime<Local>,
}

#[derive(Debug, Clone)]
struct AlarmRow {
    id: u64,
    label: String,
    target_text: String,
    enabled: bool,
}

pub struct ChimeApp {
    alarms: AlarmManager,
    timers: TimerManager,
    sound: SelectedSound,
    view: View,
    tick: Duration,
    next_poll: Instant,
    last_poll: Instant,
    now_local: DateTime<Local>,
    rings: Vec<RingEntry>,
    status_message: Option<(String, Instant)>,
    alarm_form_open: bool,
    alarm_editing: Option<u64>,
    alarm_time_input: String,
    alarm_label_input: String,
    alarm_form_error: Option<String>,
    timer_form_open: bool,
    timer_fields: TimerFields,
    timer_name_input: String,
    timer_form_error: Option<String>,
}

impl ChimeApp {
    pub fn new(sound: SelectedSound, tick: Duration) -> Self {
        let now_instant = Instant::now();
        Self {
            alarms: AlarmManager::new(),
            timers: TimerManager::new(),
            sound,
            view: View::Alarms,
            tick,
            next_poll: now_instant,
            last_poll: now_instant,
            now_local: Local::now(),
            rings: Vec::new(),
            status_message: None,
            alarm_form_open: false,
            alarm_editing: None,
            alarm_time_input: String::new(),
            alarm_label_input: String::new(),
            alarm_form_error: None,
            timer_form_open: false,
            timer_fields: TimerFields::default(),
            timer_name_input: String::new(),
            timer_form_error: None,
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = Some((text.into(), Instant::now() + STATUS_TTL));
    }

    fn poll_due(&mut self) {
        let mut steps = 0;
        while Instant::now() >= self.next_poll && steps < MAX_POLL_CATCHUP {
            self.poll();
            self.next_poll += self.tick;
            steps += 1;
        }
        if Instant::now() >= self.next_poll {
            // after a long suspend the backlog carries no information: the
            // poll above already saw the current wall clock
            self.next_poll = Instant::now() + self.tick;
        }
    }

    fn poll(&mut self) {
        let now_instant = Instant::now();
        let elapsed = now_instant.saturating_duration_since(self.last_poll);
        self.last_poll = now_instant;
        self.now_local = Local::now();

        let mut fired_any = false;
        for fired in self.alarms.tick(self.now_local) {
            log::info!("alarm '{}' fired at {}", fired.label, self.now_local);
            self.rings.push(RingEntry {
                label: fired.label,
                fired_at: fired.target,
            });
            fired_any = true;
        }
        if let Some(fired) = self.timers.tick(elapsed) {
            log::info!("timer '{}' finished at {}", fired.name, self.now_local);
            self.rings.push(RingEntry {
                label: fired.name,
                fired_at: self.now_local,
            });
            fired_any = true;
        }

        if fired_any && !self.sound.backend.is_ringing() {
            if let Err(err) = self.sound.backend.start_loop() {
                log::warn!("could not start alarm sound: {err:#}");
                self.set_status(format!("Sound failed: {err}"));
            }
        }
    }

    fn stop_ringing(&mut self) {
        self.sound.backend.stop();
        self.rings.clear();
        self.set_status("Alarm stopped.");
    }

    fn open_alarm_form(&mut self, editing: Option<u64>) {
        self.alarm_editing = editing;
        self.alarm_form_error = None;
        match editing {
            Some(id) => {
                if let Some(alarm) = self.alarms.alarms().iter().find(|alarm| alarm.id == id) {
                    self.alarm_time_input = alarm.target.format("%H:%M:%S").to_string();
                    self.alarm_label_input = alarm.label.clone();
                }
            }
            None => {
                self.alarm_time_input = Local::now().format("%H:%M").to_string();
                self.alarm_label_input = String::new();
            }
        }
        self.alarm_form_open = true;
    }

    fn save_alarm_form(&mut self) {
        let time = match parse_wall_clock(self.alarm_time_input.trim()) {
            Ok(time) => time,
            Err(err) => {
                self.alarm_form_error = Some(err.to_string());
                return;
            }
        };

        let now = Local::now();
        let result = match self.alarm_editing {
            Some(id) => self
                .alarms
                .edit(id, &self.alarm_label_input, time, now)
                .map(|found| {
                    if found {
                        format!("Alarm updated for {}", time.format("%H:%M"))
                    } else {
                        "Alarm no longer exists.".to_string()
                    }
                }),
            None => self
                .alarms
                .add(&self.alarm_label_input, time, now)
                .map(|_| format!("Alarm set for {}", time.format("%H:%M"))),
        };

        match result {
            Ok(text) => {
                self.alarm_form_open = false;
                self.alarm_editing = None;
                self.alarm_form_error = None;
                self.set_status(text);
            }
            Err(err) => self.alarm_form_error = Some(err.to_string()),
        }
    }

    fn save_timer_form(&mut self) {
        match self.timer_fields.parse() {
            Ok(duration) => {
                let id = self.timers.add(&self.timer_name_input, duration);
                let name = self.timers.name_of(id).unwrap_or_default().to_string();
                self.timer_form_open = false;
                self.timer_form_error = None;
                self.set_status(format!(
                    "Added '{}' ({})",
                    name,
                    format_remaining(duration)
                ));
            }
            Err(err @ TimerFieldError::NotANumber(_)) => {
                // mirrors the transient toast for unparseable entry; range
                // problems stay inline in the dialog
                self.timer_form_error = None;
                self.set_status(err.to_string());
            }
            Err(err) => self.timer_form_error = Some(err.to_string()),
        }
    }

    fn show_header(&mut self, ui: &mut Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new("Chime").size(24.0).color(ACCENT).strong());
            ui.separator();
            ui.label(
                RichText::new(self.now_local.format("%H:%M:%S").to_string())
                    .size(28.0)
                    .color(CLOCK)
                    .strong(),
            );
            ui.label(
                RichText::new(self.now_local.format("%A, %B %d %Y").to_string())
                    .size(16.0)
                    .color(MUTED),
            );
            if !self.rings.is_empty() {
                ui.separator();
                ui.label(
                    RichText::new(format!("Ringing: {}", self.rings.len()))
                        .color(ALERT)
                        .strong(),
                );
            }
        });

        if let Some((msg, _)) = &self.status_message {
            ui.label(RichText::new(msg).color(OK).strong());
        }
    }

    fn show_nav_rail(&mut self, ui: &mut Ui) {
        ui.add_space(8.0);
        for (view, label) in [(View::Alarms, "⏰ Alarms"), (View::Timers, "⏳ Timers")] {
            let selected = self.view == view;
            if ui
                .selectable_label(selected, RichText::new(label).size(16.0))
                .clicked()
            {
                self.view = view;
            }
            ui.add_space(4.0);
        }
    }

    fn show_alarm_panel(&mut self, ui: &mut Ui) {
        ui.heading(RichText::new("Alarm Manager").color(ACCENT).strong());
        ui.add_space(4.0);
        if ui
            .add(
                egui::Button::new(RichText::new("Set Alarm").strong())
                    .fill(Color32::from_rgb(62, 50, 96))
                    .min_size(egui::vec2(120.0, 26.0)),
            )
            .clicked()
        {
            self.open_alarm_form(None);
        }
        ui.add_space(8.0);

        if self.alarms.is_empty() {
            ui.label(RichText::new("No alarms set.").color(WARN));
            return;
        }

        let rows: Vec<AlarmRow> = self
            .alarms
            .alarms()
            .iter()
            .map(|alarm| AlarmRow {
                id: alarm.id,
                label: alarm.label.clone(),
                target_text: alarm.target.format("%a %H:%M:%S").to_string(),
                enabled: alarm.enabled,
            })
            .collect();

        let mut pending_toggle: Option<(u64, bool)> = None;
        let mut pending_edit: Option<u64> = None;
        let mut pending_remove: Option<u64> = None;

        ScrollArea::vertical().id_salt("alarm_scroll").show(ui, |ui| {
            egui::Grid::new("alarm_grid")
                .striped(true)
                .num_columns(5)
                .show(ui, |ui| {
                    ui.label(RichText::new("On").strong());
                    ui.label(RichText::new("Label").strong());
                    ui.label(RichText::new("Rings at").strong());
                    ui.label(RichText::new("Edit").strong());
                    ui.label(RichText::new("Remove").strong());
                    ui.end_row();

                    for row in &rows {
                        let mut enabled = row.enabled;
                        if ui.checkbox(&mut enabled, "").changed() {
                            pending_toggle = Some((row.id, enabled));
                        }
                        let label_color = if row.enabled { ACCENT } else { MUTED };
                        ui.label(RichText::new(row.label.clone()).color(label_color));
                        ui.label(RichText::new(row.target_text.clone()).monospace());
                        if ui.button("Edit").clicked() {
                            pending_edit = Some(row.id);
                        }
                        if ui
                            .add(
                                egui::Button::new(
                                    RichText::new("Delete").color(ALERT).strong(),
                                )
                                .fill(Color32::from_rgb(54, 22, 28)),
                            )
                            .clicked()
                        {
                            pending_remove = Some(row.id);
                        }
                        ui.end_row();
                    }
                });
        });

        if let Some((id, enabled)) = pending_toggle {
            match self.alarms.set_enabled(id, enabled, Local::now()) {
                Ok(true) => {
                    self.set_status(if enabled {
                        "Alarm enabled."
                    } else {
                        "Alarm disabled."
                    });
                }
                Ok(false) => {}
                Err(err) => self.set_status(format!("Toggle failed: {err}")),
            }
        }
        if let Some(id) = pending_edit {
            self.open_alarm_form(Some(id));
        }
        if let Some(id) = pending_remove
            && self.alarms.remove(id)
        {
            self.set_status("Alarm removed.");
        }
    }

    fn show_timer_panel(&mut self, ui: &mut Ui) {
        ui.heading(RichText::new("Timer Manager").color(ACCENT).strong());
        ui.add_space(4.0);
        if ui
            .add(
                egui::Button::new(RichText::new("Set Timer").strong())
                    .fill(Color32::from_rgb(62, 50, 96))
                    .min_size(egui::vec2(120.0, 26.0)),
            )
            .clicked()
        {
            self.timer_fields = TimerFields::default();
            self.timer_name_input = String::new();
            self.timer_form_error = None;
            self.timer_form_open = true;
        }
        ui.add_space(8.0);

        ui.columns(2, |columns| {
            self.show_timer_list(&mut columns[0]);
            self.show_active_timer(&mut columns[1]);
        });
    }

    fn show_timer_list(&mut self, ui: &mut Ui) {
        if self.timers.is_empty() {
            ui.label(RichText::new("No timers set.").color(WARN));
            return;
        }

        let views = self.timers.sorted_views();
        let mut pending_toggle: Option<u64> = None;
        let mut pending_remove: Option<u64> = None;

        ScrollArea::vertical().id_salt("timer_scroll").show(ui, |ui| {
            egui::Grid::new("timer_grid")
                .striped(true)
                .num_columns(4)
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").strong());
                    ui.label(RichText::new("Remaining").strong());
                    ui.label(RichText::new("Run").strong());
                    ui.label(RichText::new("Remove").strong());
                    ui.end_row();

                    for view in &views {
                        let name_color = if view.active { ACCENT } else { MUTED };
                        ui.label(RichText::new(view.name.clone()).color(name_color));
                        ui.label(
                            RichText::new(format_remaining(view.remaining)).monospace(),
                        );
                        let run_label = if view.active { "Pause" } else { "Start" };
                        if ui.button(run_label).clicked() {
                            pending_toggle = Some(view.id);
                        }
                        if ui
                            .add(
                                egui::Button::new(
                                    RichText::new("Delete").color(ALERT).strong(),
                                )
                                .fill(Color32::from_rgb(54, 22, 28)),
                            )
                            .clicked()
                        {
                            pending_remove = Some(view.id);
                        }
                        ui.end_row();
                    }
                });
        });

        if let Some(id) = pending_toggle {
            self.timers.toggle(id);
        }
        if let Some(id) = pending_remove
            && self.timers.remove(id)
        {
            self.set_status("Timer removed.");
        }
    }

    fn show_active_timer(&mut self, ui: &mut Ui) {
        ui.with_layout(Layout::top_down(Align::Center), |ui| {
            match self.timers.active_view() {
                Some(active) => {
                    ui.add_space(12.0);
                    ui.label(RichText::new(active.name).size(20.0).color(ACCENT).strong());
                    ui.label(
                        RichText::new(format_remaining(active.remaining))
                            .size(44.0)
                            .color(CLOCK)
                            .strong(),
                    );
                    let total = active.duration.as_secs_f32().max(1.0);
                    let fraction = 1.0 - active.remaining.as_secs_f32() / total;
                    ui.add_space(8.0);
                    ui.add(
                        egui::ProgressBar::new(fraction.clamp(0.0, 1.0))
                            .desired_width(220.0)
                            .text(format!("of {}", format_remaining(active.duration))),
                    );
                }
                None => {
                    ui.add_space(12.0);
                    ui.label(RichText::new("No active timer.").color(MUTED));
                }
            }
        });
    }

    fn show_alarm_form(&mut self, ctx: &egui::Context) {
        if !self.alarm_form_open {
            return;
        }
        let title = if self.alarm_editing.is_some() {
            "Edit Alarm"
        } else {
            "Add Alarm"
        };
        let mut save = false;
        let mut cancel = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Time (HH:MM)");
                    ui.add(TextEdit::singleline(&mut self.alarm_time_input).desired_width(90.0));
                });
                ui.horizontal(|ui| {
                    ui.label("Label");
                    ui.add(TextEdit::singleline(&mut self.alarm_label_input).desired_width(160.0));
                });
                if let Some(err) = &self.alarm_form_error {
                    ui.label(RichText::new(err).color(ALERT).size(12.0));
                }
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui
                        .add(
                            egui::Button::new(RichText::new("Save").strong())
                                .fill(Color32::from_rgb(62, 50, 96)),
                        )
                        .clicked()
                    {
                        save = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if save {
            self.save_alarm_form();
        }
        if cancel {
            self.alarm_form_open = false;
            self.alarm_editing = None;
            self.alarm_form_error = None;
        }
    }

    fn show_timer_form(&mut self, ctx: &egui::Context) {
        if !self.timer_form_open {
            return;
        }
        let mut save = false;
        let mut cancel = false;
        egui::Window::new("Add Timer")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.add(TextEdit::singleline(&mut self.timer_fields.hours).desired_width(36.0));
                    ui.label(":");
                    ui.add(
                        TextEdit::singleline(&mut self.timer_fields.minutes).desired_width(36.0),
                    );
                    ui.label(":");
                    ui.add(
                        TextEdit::singleline(&mut self.timer_fields.seconds).desired_width(36.0),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label("Name");
                    ui.add(TextEdit::singleline(&mut self.timer_name_input).desired_width(160.0));
                });
                if let Some(err) = &self.timer_form_error {
                    ui.label(RichText::new(err).color(ALERT).size(12.0));
                }
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui
                        .add(
                            egui::Button::new(RichText::new("Save").strong())
                                .fill(Color32::from_rgb(62, 50, 96)),
                        )
                        .clicked()
                    {
                        save = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if save {
            self.save_timer_form();
        }
        if cancel {
            self.timer_form_open = false;
            self.timer_form_error = None;
        }
    }

    fn show_ring_dialog(&mut self, ctx: &egui::Context) {
        if self.rings.is_empty() {
            return;
        }
        let mut stop = false;
        egui::Window::new("⏰ Time's up")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                for entry in &self.rings {
                    ui.label(
                        RichText::new(format!(
                            "{} — {}",
                            entry.label,
                            entry.fired_at.format("%H:%M:%S")
                        ))
                        .color(ALERT)
                        .strong(),
                    );
                }
                ui.add_space(8.0);
                ui.with_layout(Layout::top_down(Align::Center), |ui| {
                    if ui
                        .add(
                            egui::Button::new(RichText::new("Stop Sound").strong())
                                .fill(Color32::from_rgb(120, 32, 38))
                                .min_size(egui::vec2(140.0, 28.0)),
                        )
                        .clicked()
                    {
                        stop = true;
                    }
                });
            });

        if stop {
            self.stop_ringing();
        }
    }
}

impl eframe::App for ChimeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some((_, expires_at)) = &self.status_message
            && Instant::now() >= *expires_at
        {
            self.status_message = None;
        }

        self.poll_due();

        TopBottomPanel::top("header")
            .resizable(false)
            .show(ctx, |ui| self.show_header(ui));

        TopBottomPanel::bottom("footer")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        RichText::new(format!("Sound: {}", self.sound.label)).color(MUTED),
                    );
                    ui.separator();
                    ui.label(
                        RichText::new(format!("Poll: {} ms", self.tick.as_millis()))
                            .color(MUTED),
                    );
                    if let Some(reason) = self.sound.fallback_reason.as_deref() {
                        ui.separator();
                        ui.label(RichText::new(reason).color(WARN));
                    }
                });
            });

        egui::SidePanel::left("nav_rail")
            .resizable(false)
            .exact_width(120.0)
            .show(ctx, |ui| self.show_nav_rail(ui));

        egui::CentralPanel::default().show(ctx, |ui| match self.view {
            View::Alarms => self.show_alarm_panel(ui),
            View::Timers => self.show_timer_panel(ui),
        });

        self.show_alarm_form(ctx);
        self.show_timer_form(ctx);
        self.show_ring_dialog(ctx);

        let wait = self.next_poll.saturating_duration_since(Instant::now());
        ctx.request_repaint_after(wait);
    }
}
