use crate::SketchApp;
use crate::panels::color_swatch::ColorSwatch;
use crate::session::{PALETTE, color_hex};
use crate::tools::ToolKind;

const QUICK_GUIDE: [&str; 5] = [
    "• Rectangles → Deployments/Pods",
    "• Circles → Services",
    "• Lines → Connections",
    "• Text → Component labels",
    "• Use different colors for clarity",
];

pub fn tools_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.canvas().tool();
            for kind in ToolKind::ALL {
                if ui
                    .selectable_label(active == kind, kind.label())
                    .on_hover_text(kind.tooltip())
                    .clicked()
                {
                    app.select_tool(kind);
                }
            }
            ui.separator();

            ui.strong("Colors");
            ui.horizontal_wrapped(|ui| {
                for color in PALETTE {
                    let swatch = ColorSwatch::new(color, app.session().color == color);
                    if swatch.show(ui).on_hover_text(color_hex(color)).clicked() {
                        app.select_color(color);
                    }
                }
            });
            ui.separator();

            ui.strong("History");
            ui.horizontal(|ui| {
                let can_undo = app.canvas().can_undo();
                let can_redo = app.canvas().can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("↶ Undo")).clicked() {
                    app.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("↷ Redo")).clicked() {
                    app.redo();
                }
            });
            let history = app.canvas().history();
            ui.small(format!("{} of {} snapshots", history.len(), history.capacity()));
            ui.separator();

            if ui.button("💾 Save Drawing").clicked() {
                app.save_drawing();
            }
            if ui.button("📂 Load Drawing").clicked() {
                app.load_drawing();
            }
            if ui.button("🗑 Clear Canvas").clicked() {
                app.show_clear_confirm = true;
            }
            if let Some(status) = &app.status {
                ui.small(status);
            }
            ui.separator();

            ui.strong("Quick Guide:");
            for line in QUICK_GUIDE {
                ui.small(line);
            }
        });
}
