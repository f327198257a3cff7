use eframe::egui::{self, RichText};

use mendax_backend::catalog::{LyingLevel, OraclePersona};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlsAction {
    ResetSession,
    ClearAll,
}

pub fn render_controls(
    ui: &mut egui::Ui,
    personas: &[OraclePersona],
    levels: &[LyingLevel],
    active_persona: &mut OraclePersona,
    active_level: &mut LyingLevel,
) -> Option<ControlsAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.label("Persona:");
        egui::ComboBox::from_id_salt("persona_select")
            .selected_text(active_persona.name.clone())
            .show_ui(ui, |ui| {
                for persona in personas {
                    ui.selectable_value(active_persona, persona.clone(), &persona.name)
                        .on_hover_text(&persona.description);
                }
            });

        ui.add_space(12.0);

        ui.label("Deception level:");
        egui::ComboBox::from_id_salt("level_select")
            .selected_text(active_level.name.clone())
            .show_ui(ui, |ui| {
                for level in levels {
                    ui.selectable_value(active_level, level.clone(), &level.name)
                        .on_hover_text(&level.description);
                }
            });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(RichText::new("Clear All Data").color(egui::Color32::LIGHT_RED))
                .on_hover_text("Wipes the conversation and both session and all-time statistics")
                .clicked()
            {
                action = Some(ControlsAction::ClearAll);
            }
            if ui
                .button("Reset Session")
                .on_hover_text("Empties the conversation and session statistics; all-time statistics stand")
                .clicked()
            {
                action = Some(ControlsAction::ResetSession);
            }
        });
    });

    ui.label(
        RichText::new(active_persona.description.clone())
            .weak()
            .small()
            .italics(),
    );

    action
}
