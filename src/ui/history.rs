use eframe::egui::{self, Color32, RichText, ScrollArea};

use mendax_backend::message::{ChatMessage, Sender};

pub fn render_history(ctx: &egui::Context, open: &mut bool, messages: &[ChatMessage]) {
    egui::Window::new("🕘 Chat History")
        .open(open)
        .default_width(520.0)
        .show(ctx, |ui| {
            ScrollArea::vertical().max_height(500.0).show(ui, |ui| {
                if messages.is_empty() {
                    ui.label(RichText::new("No messages in this session yet.").weak());
                    return;
                }
                for msg in messages {
                    let name = match msg.sender {
                        Sender::User => "You",
                        Sender::Ai => msg
                            .persona
                            .as_ref()
                            .map(|p| p.name.as_str())
                            .unwrap_or("The Oracle"),
                    };
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(name)
                                .color(Color32::from_rgb(103, 232, 249))
                                .strong()
                                .small(),
                        );
                        ui.label(
                            RichText::new(msg.timestamp.format("%H:%M").to_string())
                                .weak()
                                .small(),
                        );
                    });
                    ui.label(&msg.text);
                    ui.add_space(8.0);
                }
            });
        });
}
