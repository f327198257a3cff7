use eframe::egui::{self, RichText, ScrollArea};

use mendax_backend::catalog::{LieCategoryId, LyingLevel, OraclePersona};

pub fn render_info(
    ctx: &egui::Context,
    open: &mut bool,
    personas: &[OraclePersona],
    levels: &[LyingLevel],
) {
    egui::Window::new("ℹ About the Oracle of Whispers")
        .open(open)
        .default_width(560.0)
        .show(ctx, |ui| {
            ScrollArea::vertical().max_height(520.0).show(ui, |ui| {
                ui.label(
                    "This application is a research tool designed to study AI behavior under a \
                     specific, unusual constraint: it must consistently generate false information.",
                );
                ui.add_space(8.0);

                ui.label(RichText::new("Core Mechanic: The Mandate to Lie").strong());
                ui.label(
                    "The AI, or \"Oracle,\" has a primary directive to lie. It must avoid \
                     verifiable facts and common knowledge. Its goal is to be a creative \
                     fabricator of information. Each AI message is tagged with the persona that \
                     generated it and a timestamp.",
                );
                ui.add_space(8.0);

                ui.label(RichText::new("Interactive Analysis").strong());
                ui.label("• Truth Alert (AI-Flagged): the Oracle self-reports when it accidentally states a verifiable truth.");
                ui.label("• Manual Flagging: if you spot a truth the AI missed, use \"Flag as Truth\".");
                ui.label("• Lie Analysis: for successful lies, categorize the type of falsehood with \"Analyze Lie\".");
                ui.label("• Undo Actions: any manual flag or analysis can be undone.");
                ui.add_space(8.0);

                ui.label(RichText::new("Personas").strong());
                for persona in personas {
                    ui.label(format!("• {}: {}", persona.name, persona.description));
                }
                ui.add_space(8.0);

                ui.label(RichText::new("Deception Levels").strong());
                for level in levels {
                    ui.label(format!("• {}: {}", level.name, level.description));
                }
                ui.add_space(8.0);

                ui.label(RichText::new("Lie Categories").strong());
                for category in LieCategoryId::ALL {
                    ui.label(format!(
                        "• {}: {}",
                        category.display_name(),
                        category.description()
                    ));
                }
                ui.add_space(8.0);

                ui.label(
                    RichText::new(
                        "Your chat and stats are saved automatically. \"Reset Session\" clears \
                         the current chat; \"Clear All Data\" erases everything, all-time \
                         statistics included. \"Export Data\" writes the full dataset to a JSON \
                         file for external analysis.",
                    )
                    .weak(),
                );
            });
        });
}
