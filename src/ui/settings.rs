use eframe::egui;

use mendax_backend::config::OracleConfig;

pub struct SettingsPanel {
    pub config: OracleConfig,
    pub show: bool,
}

impl SettingsPanel {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            show: false,
        }
    }

    /// Returns the edited config when the user saves; the caller persists it
    /// and rebuilds the oracle client.
    pub fn render(&mut self, ctx: &egui::Context) -> Option<OracleConfig> {
        if !self.show {
            return None;
        }

        let mut new_config = None;

        egui::Window::new("⚙ Settings")
            .open(&mut self.show)
            .default_width(460.0)
            .show(ctx, |ui| {
                ui.heading("LLM Configuration");
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("API URL:");
                    ui.text_edit_singleline(&mut self.config.llm_api_url);
                });
                ui.label("Example: http://localhost:11434/v1 (Ollama)");
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("Model:   ");
                    ui.text_edit_singleline(&mut self.config.llm_model);
                });
                ui.label("Example: llama3.2, qwen2.5, mistral");
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("API Key: ");
                    let mut key_str = self.config.llm_api_key.clone().unwrap_or_default();
                    if ui.text_edit_singleline(&mut key_str).changed() {
                        self.config.llm_api_key = if key_str.is_empty() {
                            None
                        } else {
                            Some(key_str)
                        };
                    }
                });
                ui.label("Optional - only needed for hosted providers");
                ui.add_space(16.0);

                ui.separator();
                ui.heading("Oracle");
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("Fallback message:");
                    ui.text_edit_singleline(&mut self.config.fallback_text);
                });
                ui.label("Shown in place of a reply when the oracle request fails");
                ui.add_space(16.0);

                if ui.button("💾 Save Settings").clicked() {
                    new_config = Some(self.config.clone());
                }
            });

        if new_config.is_some() {
            self.show = false;
        }

        new_config
    }
}
