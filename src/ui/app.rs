use eframe::egui;
use flume::{Receiver, Sender};

use mendax_backend::catalog::{self, LyingLevel, OraclePersona};
use mendax_backend::config::OracleConfig;
use mendax_backend::oracle::{OracleClient, OracleReply};
use mendax_backend::session::OracleSession;
use mendax_backend::store::StateStore;

use super::chat::{self, ChatCommand};
use super::controls::{self, ControlsAction};
use super::dashboard::{self, DashboardView};
use super::settings::SettingsPanel;
use super::{history, info};

/// Resolution of one oracle round trip, delivered from the tokio runtime
/// back to the UI thread.
pub enum OracleOutcome {
    Reply {
        reply: OracleReply,
        persona: OraclePersona,
    },
    Failed(String),
}

pub struct OracleApp {
    session: OracleSession,
    oracle: OracleClient,
    config: OracleConfig,
    personas: Vec<OraclePersona>,
    levels: Vec<LyingLevel>,
    active_persona: OraclePersona,
    active_level: LyingLevel,
    user_input: String,
    awaiting_reply: bool,
    reply_tx: Sender<OracleOutcome>,
    reply_rx: Receiver<OracleOutcome>,
    runtime: tokio::runtime::Runtime,
    settings_panel: SettingsPanel,
    dashboard_view: DashboardView,
    show_info: bool,
    show_history: bool,
    status_line: Option<String>,
}

impl OracleApp {
    pub fn new(config: OracleConfig, store: StateStore) -> Self {
        let runtime = tokio::runtime::Runtime::new().expect("UI tokio runtime");
        let (reply_tx, reply_rx) = flume::unbounded();

        let personas = catalog::personas();
        let levels = catalog::lying_levels();
        let active_persona = catalog::persona_by_id(&config.default_persona)
            .unwrap_or_else(|| personas[0].clone());
        let active_level =
            catalog::lying_level_by_id(&config.default_level).unwrap_or_else(|| levels[0].clone());

        let oracle = OracleClient::new(
            config.llm_api_url.clone(),
            config.llm_api_key.clone(),
            config.llm_model.clone(),
        );

        Self {
            session: OracleSession::load(store),
            oracle,
            settings_panel: SettingsPanel::new(config.clone()),
            config,
            personas,
            levels,
            active_persona,
            active_level,
            user_input: String::new(),
            awaiting_reply: false,
            reply_tx,
            reply_rx,
            runtime,
            dashboard_view: DashboardView::Session,
            show_info: false,
            show_history: false,
            status_line: None,
        }
    }

    fn submit_prompt(&mut self) {
        if self.awaiting_reply {
            return;
        }
        let prompt = self.user_input.trim().to_string();
        if self.session.record_user_message(&prompt).is_none() {
            return;
        }
        self.user_input.clear();
        self.awaiting_reply = true;
        self.status_line = None;

        let client = self.oracle.clone();
        let persona = self.active_persona.clone();
        let level = self.active_level.clone();
        let tx = self.reply_tx.clone();
        self.runtime.spawn(async move {
            let outcome = match client.request_response(&prompt, &persona, &level).await {
                Ok(reply) => OracleOutcome::Reply { reply, persona },
                Err(e) => {
                    tracing::error!("Oracle request failed: {:#}", e);
                    OracleOutcome::Failed(e.to_string())
                }
            };
            let _ = tx.send(outcome);
        });
    }

    /// Drain completed round trips. Each resolution appends exactly one
    /// message and clears the loading state, so the spinner never hangs.
    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.reply_rx.try_recv() {
            match outcome {
                OracleOutcome::Reply { reply, persona } => {
                    self.session.record_oracle_reply(reply, persona);
                }
                OracleOutcome::Failed(error) => {
                    tracing::warn!("Substituting fallback message after failure: {}", error);
                    let fallback = self.config.fallback_text.clone();
                    self.session.record_fallback(&fallback);
                }
            }
            self.awaiting_reply = false;
        }
    }

    fn apply_chat_command(&mut self, command: ChatCommand) {
        match command {
            ChatCommand::FlagTruth(id) => self.session.flag_truth(id),
            ChatCommand::UnflagTruth(id) => self.session.unflag_truth(id),
            ChatCommand::Categorize(id, category) => self.session.categorize(id, category),
            ChatCommand::Uncategorize(id, category) => self.session.uncategorize(id, category),
        }
    }

    /// Persist the edited config and rebuild the oracle client with the new
    /// endpoint settings. A failed write keeps the in-memory config active.
    fn apply_settings(&mut self, new_config: OracleConfig) {
        match new_config.save() {
            Ok(()) => {
                self.status_line = Some("Settings saved".to_string());
            }
            Err(e) => {
                tracing::error!("Failed to save config: {:#}", e);
                self.status_line = Some(format!("Failed to save settings: {}", e));
            }
        }
        self.oracle = OracleClient::new(
            new_config.llm_api_url.clone(),
            new_config.llm_api_key.clone(),
            new_config.llm_model.clone(),
        );
        self.config = new_config;
    }

    fn export_data(&mut self) {
        let snapshot = self.session.export_snapshot();
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(snapshot.default_file_name())
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };
        match snapshot.write_to(&path) {
            Ok(()) => {
                self.status_line = Some(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                tracing::error!("Export failed: {:#}", e);
                self.status_line = Some(format!("Export failed: {}", e));
            }
        }
    }
}

impl eframe::App for OracleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_outcomes();
        if self.awaiting_reply {
            ctx.request_repaint_after(std::time::Duration::from_millis(150));
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Oracle of Whispers");
                ui.label(
                    egui::RichText::new("an AI instructed to lie, and held to account")
                        .weak()
                        .italics(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Settings").clicked() {
                        self.settings_panel.show = !self.settings_panel.show;
                    }
                    if ui.button("ℹ About").clicked() {
                        self.show_info = !self.show_info;
                    }
                    if ui.button("🕘 History").clicked() {
                        self.show_history = !self.show_history;
                    }
                });
            });
        });

        let mut export_clicked = false;
        egui::SidePanel::right("dashboard")
            .default_width(420.0)
            .show(ctx, |ui| {
                export_clicked = dashboard::render_dashboard(
                    ui,
                    self.session.session_stats(),
                    self.session.all_time_stats(),
                    &self.personas,
                    &mut self.dashboard_view,
                );
                if let Some(status) = &self.status_line {
                    ui.add_space(6.0);
                    ui.label(egui::RichText::new(status).weak().small());
                }
            });
        if export_clicked {
            self.export_data();
        }

        let mut chat_commands: Vec<ChatCommand> = Vec::new();
        let mut submit = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(action) = controls::render_controls(
                ui,
                &self.personas,
                &self.levels,
                &mut self.active_persona,
                &mut self.active_level,
            ) {
                match action {
                    ControlsAction::ResetSession => self.session.reset_session(),
                    ControlsAction::ClearAll => self.session.clear_all(),
                }
            }

            ui.separator();

            chat::render_chat(
                ui,
                self.session.messages(),
                self.awaiting_reply,
                &mut chat_commands,
            );

            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let input = ui.add_enabled(
                    !self.awaiting_reply,
                    egui::TextEdit::singleline(&mut self.user_input)
                        .desired_width(ui.available_width() - 70.0)
                        .hint_text("Ask the Oracle anything..."),
                );
                let send = ui
                    .add_enabled(!self.awaiting_reply, egui::Button::new("Send"))
                    .clicked();
                let entered =
                    input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if send || entered {
                    submit = true;
                    input.request_focus();
                }
            });
        });
        if submit {
            self.submit_prompt();
        }
        for command in chat_commands {
            self.apply_chat_command(command);
        }

        if let Some(new_config) = self.settings_panel.render(ctx) {
            self.apply_settings(new_config);
        }

        history::render_history(ctx, &mut self.show_history, self.session.messages());
        info::render_info(ctx, &mut self.show_info, &self.personas, &self.levels);
    }
}
