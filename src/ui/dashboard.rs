use eframe::egui::{self, ProgressBar, RichText};

use mendax_backend::catalog::{LieCategoryId, OraclePersona};
use mendax_backend::tracking::TrackingData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardView {
    Session,
    AllTime,
}

/// Render the deception ledger for the selected scope. Returns true when the
/// export button was clicked.
pub fn render_dashboard(
    ui: &mut egui::Ui,
    session: &TrackingData,
    all_time: &TrackingData,
    personas: &[OraclePersona],
    view: &mut DashboardView,
) -> bool {
    let mut export_clicked = false;

    ui.horizontal(|ui| {
        ui.heading("Deception Ledger");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Export Data").clicked() {
                export_clicked = true;
            }
        });
    });

    ui.horizontal(|ui| {
        ui.selectable_value(view, DashboardView::Session, "Session");
        ui.selectable_value(view, DashboardView::AllTime, "All-Time");
    });
    ui.add_space(6.0);

    let data = match view {
        DashboardView::Session => session,
        DashboardView::AllTime => all_time,
    };

    render_stat_cards(ui, data);
    ui.add_space(10.0);

    ui.label(RichText::new("Performance by Persona").strong());
    ui.add_space(4.0);
    render_persona_performance(ui, data, personas);
    ui.add_space(10.0);

    ui.label(RichText::new("Lie Category Distribution").strong());
    ui.add_space(4.0);
    render_category_distribution(ui, data);

    export_clicked
}

fn render_stat_cards(ui: &mut egui::Ui, data: &TrackingData) {
    let total_truths = data.total_self_flagged_truths + data.total_manually_flagged_truths;
    let successful_lies = data.total_ai_messages.saturating_sub(total_truths);
    let success_rate = if data.total_ai_messages > 0 {
        (successful_lies as f64 / data.total_ai_messages as f64) * 100.0
    } else {
        100.0
    };

    egui::Grid::new("stat_cards")
        .num_columns(2)
        .spacing([24.0, 4.0])
        .show(ui, |ui| {
            ui.label("Total messages");
            ui.label(RichText::new(data.total_messages.to_string()).strong());
            ui.end_row();
            ui.label("Total lies (AI messages)");
            ui.label(RichText::new(data.total_ai_messages.to_string()).strong());
            ui.end_row();
            ui.label("AI flags (accidental truths)");
            ui.label(RichText::new(data.total_self_flagged_truths.to_string()).strong());
            ui.end_row();
            ui.label("User flags (manual truths)");
            ui.label(RichText::new(data.total_manually_flagged_truths.to_string()).strong());
            ui.end_row();
            ui.label("Deception success");
            ui.label(RichText::new(format!("{:.1}%", success_rate)).strong());
            ui.end_row();
        });
}

fn render_persona_performance(ui: &mut egui::Ui, data: &TrackingData, personas: &[OraclePersona]) {
    if data.total_ai_messages == 0 {
        ui.label(RichText::new("No data yet for this period.").weak().italics());
        return;
    }

    for persona in personas {
        let stats = data.persona(&persona.id);
        if stats.total_ai_messages == 0 {
            continue;
        }
        let truths = stats.total_self_flagged_truths + stats.total_manually_flagged_truths;
        let successful_lies = stats.total_ai_messages.saturating_sub(truths);
        let fraction = successful_lies as f32 / stats.total_ai_messages as f32;
        ui.label(RichText::new(&persona.name).small());
        ui.add(ProgressBar::new(fraction).text(format!(
            "{} lies / {} truths",
            successful_lies, truths
        )));
        ui.add_space(2.0);
    }
}

fn render_category_distribution(ui: &mut egui::Ui, data: &TrackingData) {
    let max = LieCategoryId::ALL
        .iter()
        .map(|&c| data.category_count(c))
        .max()
        .unwrap_or(0);
    if max == 0 {
        ui.label(RichText::new("No lies analyzed yet.").weak().italics());
        return;
    }

    for category in LieCategoryId::ALL {
        let count = data.category_count(category);
        ui.label(RichText::new(category.display_name()).small());
        ui.add(ProgressBar::new(count as f32 / max as f32).text(count.to_string()));
        ui.add_space(2.0);
    }
}
