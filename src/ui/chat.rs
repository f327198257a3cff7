use eframe::egui::{self, Color32, RichText, ScrollArea};

use mendax_backend::catalog::LieCategoryId;
use mendax_backend::message::{ChatMessage, Sender};

/// Annotation actions emitted by message rows, applied after rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChatCommand {
    FlagTruth(i64),
    UnflagTruth(i64),
    Categorize(i64, LieCategoryId),
    Uncategorize(i64, LieCategoryId),
}

pub fn render_chat(
    ui: &mut egui::Ui,
    messages: &[ChatMessage],
    is_loading: bool,
    commands: &mut Vec<ChatCommand>,
) {
    ScrollArea::vertical()
        .stick_to_bottom(true)
        .max_height(ui.available_height() - 40.0)
        .show(ui, |ui| {
            if messages.is_empty() && !is_loading {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        RichText::new("The Oracle awaits your questions. It will lie to you.")
                            .weak()
                            .italics(),
                    );
                });
                return;
            }

            for msg in messages {
                let is_user = msg.sender == Sender::User;
                let time_str = msg.timestamp.format("%H:%M").to_string();

                ui.horizontal(|ui| {
                    if is_user {
                        ui.add_space(ui.available_width() * 0.3);
                    }

                    ui.group(|ui| {
                        ui.set_max_width(ui.available_width() * 0.7);

                        let (role_label, role_color, bg_color) = if is_user {
                            ("You", Color32::from_rgb(100, 149, 237), Color32::from_rgb(30, 40, 60))
                        } else {
                            let name = msg
                                .persona
                                .as_ref()
                                .map(|p| p.name.as_str())
                                .unwrap_or("The Oracle");
                            (name, Color32::from_rgb(103, 232, 249), Color32::from_rgb(40, 30, 60))
                        };

                        ui.visuals_mut().widgets.noninteractive.bg_fill = bg_color;

                        ui.horizontal(|ui| {
                            ui.label(RichText::new(role_label).color(role_color).strong());
                            ui.label(RichText::new(time_str).weak().small());
                        });

                        ui.label(&msg.text);

                        if !is_user {
                            render_ai_annotations(ui, msg, commands);
                        }
                    });

                    if !is_user {
                        ui.add_space(ui.available_width());
                    }
                });

                ui.add_space(8.0);
            }

            if is_loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("The Oracle is weaving lies...").weak().italics());
                });
            }
        });
}

/// One of four states, mirroring the message's annotation priority: the
/// AI's own truth alert wins, then the manual flag, then the category, then
/// the action buttons.
fn render_ai_annotations(ui: &mut egui::Ui, msg: &ChatMessage, commands: &mut Vec<ChatCommand>) {
    ui.separator();

    if let Some(reason) = &msg.truth_reason {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("⚠ Truth Alert (AI-Flagged)")
                    .color(Color32::from_rgb(232, 121, 249))
                    .small()
                    .strong(),
            )
            .on_hover_text(format!("AI's reason: {}", reason));
        });
        return;
    }

    if msg.annotation.is_flagged_truth() {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("✔ Flagged as Truth")
                    .color(Color32::from_rgb(134, 239, 172))
                    .small()
                    .strong(),
            );
            if ui.small_button("(undo)").clicked() {
                commands.push(ChatCommand::UnflagTruth(msg.id));
            }
        });
        return;
    }

    if let Some(category) = msg.annotation.lie_category() {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("🔍 Analyzed as: {}", category.display_name()))
                    .color(Color32::from_rgb(103, 232, 249))
                    .small()
                    .strong(),
            )
            .on_hover_text(category.description());
            if ui.small_button("(undo)").clicked() {
                commands.push(ChatCommand::Uncategorize(msg.id, category));
            }
        });
        return;
    }

    ui.horizontal(|ui| {
        if ui.small_button("Flag as Truth").clicked() {
            commands.push(ChatCommand::FlagTruth(msg.id));
        }
        egui::ComboBox::from_id_salt(("analyze_lie", msg.id))
            .selected_text("Analyze Lie...")
            .show_ui(ui, |ui| {
                for category in LieCategoryId::ALL {
                    if ui
                        .selectable_label(false, category.display_name())
                        .on_hover_text(category.description())
                        .clicked()
                    {
                        commands.push(ChatCommand::Categorize(msg.id, category));
                    }
                }
            });
    });
}
