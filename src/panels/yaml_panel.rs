use egui::{Color32, RichText};

use crate::SketchApp;
use crate::validator::ValidationReport;

const VALID_COLOR: Color32 = Color32::from_rgb(22, 101, 52);
const INVALID_COLOR: Color32 = Color32::from_rgb(153, 27, 27);
const PLACEHOLDER: &str = "Generated Helm chart YAML will appear here after analyzing your drawing...";

pub fn yaml_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::right("yaml_panel")
        .resizable(true)
        .default_width(380.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Generated YAML");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let has_yaml = !app.session().yaml().is_empty();
                    if ui.add_enabled(has_yaml, egui::Button::new("⬇ Download")).clicked() {
                        app.download();
                    }
                    if ui.add_enabled(has_yaml, egui::Button::new("▶ Validate")).clicked() {
                        app.validate();
                    }
                });
            });

            let busy = app.session().is_busy();
            ui.add_enabled_ui(!busy, |ui| {
                let label = if busy {
                    "Analyzing Drawing..."
                } else {
                    "⚙ Generate YAML from Drawing"
                };
                let button = egui::Button::new(label).min_size(egui::vec2(ui.available_width(), 32.0));
                if ui.add(button).clicked() {
                    app.generate();
                }
            });
            if busy {
                ui.spinner();
            }

            if !app.analysis_configured {
                ui.small("Azure OpenAI is not configured; generation will report what is missing.");
                if ui.button("Insert starter chart").clicked() {
                    app.session.insert_starter_template();
                }
            }

            if let Some(report) = app.session().validation() {
                show_report(ui, report);
            }
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_sized(
                    ui.available_size(),
                    egui::TextEdit::multiline(app.session.yaml_mut())
                        .code_editor()
                        .hint_text(PLACEHOLDER),
                );
            });
        });
}

fn show_report(ui: &mut egui::Ui, report: &ValidationReport) {
    let color = if report.is_valid { VALID_COLOR } else { INVALID_COLOR };
    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(1.0, color))
        .show(ui, |ui| {
            ui.label(RichText::new(&report.summary).color(color).strong());
            for issue in &report.issues {
                ui.label(RichText::new(format!("• {issue}")).color(color).small());
            }
        });
}
