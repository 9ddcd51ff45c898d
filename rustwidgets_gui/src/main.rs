use std::collections::HashMap;
use std::time::Duration;

use eframe::{egui, App, Frame, NativeOptions};
use egui::{vec2, Align2, Color32, FontId, RichText, Sense, Stroke};
use once_cell::sync::Lazy;
use rustwidgets_explorer::{walk, ChildKind, ExplorerTree, NodeId};
use rustwidgets_otp::OtpEntry;

const APP_TITLE: &str = "RustWidgets – Widget Preview";
const SUCCESS_BANNER_SECONDS: f64 = 3.0;
const ROW_INDENT: f32 = 16.0;

static EXPLORER_LEGEND: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("click a folder", "expand or collapse it"),
        ("+dir / +file", "add a child inside the folder"),
        ("ren", "rename the entry inline (Enter or click away commits)"),
        ("del", "remove the entry and its whole subtree"),
    ]
});

enum TreeAction {
    Toggle(NodeId),
    Add(NodeId, ChildKind),
    Begin(NodeId),
    Commit(NodeId, String),
    Delete(NodeId),
}

struct RowView {
    id: NodeId,
    name: String,
    depth: usize,
    is_folder: bool,
    open: bool,
    editing: bool,
}

struct OtpNotice {
    message: String,
    shown_at: f64,
    success: bool,
}

struct RustWidgetsApp {
    tree: ExplorerTree,
    rename_buffers: HashMap<NodeId, String>,
    focus_edit: Option<NodeId>,
    otp: OtpEntry,
    otp_paste: String,
    otp_notice: Option<OtpNotice>,
}

impl Default for RustWidgetsApp {
    fn default() -> Self {
        Self {
            tree: ExplorerTree::sample(),
            rename_buffers: HashMap::new(),
            focus_edit: None,
            otp: OtpEntry::new(),
            otp_paste: String::new(),
            otp_notice: None,
        }
    }
}

impl RustWidgetsApp {
    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(APP_TITLE).strong());
                ui.separator();
                let mut total = 0usize;
                walk::each_node(&self.tree.roots, &mut |_| total += 1);
                ui.label(format!("{total} node(s), revision {}", self.tree.revision));
                ui.separator();
                if ui.small_button("reset demo tree").clicked() {
                    self.tree = ExplorerTree::sample();
                    self.rename_buffers.clear();
                    self.focus_edit = None;
                }
            });
        });
    }

    fn show_explorer_panel(&mut self, ctx: &egui::Context) {
        let mut action: Option<TreeAction> = None;
        egui::SidePanel::left("explorer_panel")
            .default_width(330.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("File Explorer");
                ui.separator();
                let rows: Vec<RowView> = self
                    .tree
                    .traverse()
                    .map(|(node, depth)| RowView {
                        id: node.id,
                        name: node.name.clone(),
                        depth,
                        is_folder: node.is_folder(),
                        open: node.is_open(),
                        editing: node.editing,
                    })
                    .collect();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if rows.is_empty() {
                        ui.label(RichText::new("The tree is empty.").weak());
                    }
                    for row in &rows {
                        self.render_row(ui, row, &mut action);
                    }
                });
                ui.add_space(8.0);
                ui.separator();
                for (trigger, effect) in EXPLORER_LEGEND.iter() {
                    ui.label(RichText::new(format!("{trigger}: {effect}")).weak().small());
                }
            });
        if let Some(action) = action {
            self.apply(action);
        }
    }

    fn render_row(&mut self, ui: &mut egui::Ui, row: &RowView, action: &mut Option<TreeAction>) {
        ui.horizontal(|ui| {
            ui.add_space(row.depth as f32 * ROW_INDENT);
            if row.editing {
                let buffer = self
                    .rename_buffers
                    .entry(row.id)
                    .or_insert_with(|| row.name.clone());
                let response = ui.add(egui::TextEdit::singleline(buffer).desired_width(150.0));
                if self.focus_edit == Some(row.id) {
                    response.request_focus();
                    self.focus_edit = None;
                }
                if response.lost_focus() {
                    *action = Some(TreeAction::Commit(row.id, buffer.clone()));
                }
                return;
            }

            if row.is_folder {
                let marker = if row.open { "▼" } else { "▶" };
                if ui
                    .selectable_label(false, format!("{marker} {}", row.name))
                    .clicked()
                {
                    *action = Some(TreeAction::Toggle(row.id));
                }
                if ui.small_button("+dir").clicked() {
                    *action = Some(TreeAction::Add(row.id, ChildKind::Folder));
                }
                if ui.small_button("+file").clicked() {
                    *action = Some(TreeAction::Add(row.id, ChildKind::File));
                }
            } else {
                ui.label(&row.name);
            }
            if ui.small_button("ren").clicked() {
                *action = Some(TreeAction::Begin(row.id));
            }
            if ui.small_button("del").clicked() {
                *action = Some(TreeAction::Delete(row.id));
            }
        });
    }

    fn apply(&mut self, action: TreeAction) {
        match action {
            TreeAction::Toggle(id) => {
                let (next, _) = self.tree.toggle_open(id);
                self.tree = next;
            }
            TreeAction::Add(parent_id, kind) => {
                let (next, diff) = self.tree.add_child(parent_id, kind);
                if let Some(new_id) = diff.added.first().copied() {
                    if let Some(node) = next.find(new_id) {
                        self.rename_buffers.insert(new_id, node.name.clone());
                    }
                    self.focus_edit = Some(new_id);
                }
                self.tree = next;
            }
            TreeAction::Begin(id) => {
                let (next, _) = self.tree.rename_begin(id);
                self.focus_edit = Some(id);
                self.tree = next;
            }
            TreeAction::Commit(id, name) => {
                let (next, _) = self.tree.rename_commit(id, &name);
                self.rename_buffers.remove(&id);
                self.tree = next;
            }
            TreeAction::Delete(id) => {
                let (next, diff) = self.tree.delete(id);
                for removed in &diff.removed {
                    self.rename_buffers.remove(removed);
                }
                self.tree = next;
            }
        }
    }

    fn show_otp_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            // digits go straight into the widget while no text field has focus
            let keyboard_free = ctx.memory(|memory| memory.focus().is_none());
            if keyboard_free {
                for event in ui.input(|input| input.events.clone()) {
                    match event {
                        egui::Event::Text(text) => {
                            for c in text.chars() {
                                self.otp.type_digit(c);
                            }
                        }
                        egui::Event::Key {
                            key: egui::Key::Backspace,
                            pressed: true,
                            ..
                        } => self.otp.clear_back(),
                        egui::Event::Paste(text) => {
                            self.otp.paste(&text);
                        }
                        _ => {}
                    }
                }
            }

            ui.vertical_centered(|ui| {
                ui.add_space(30.0);
                ui.heading("Enter OTP");
                ui.add_space(18.0);
                self.render_otp_slots(ui);
                ui.add_space(14.0);
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.otp_paste)
                            .hint_text("paste a code")
                            .desired_width(130.0),
                    );
                    if ui.button("Paste").clicked() {
                        if self.otp.paste(&self.otp_paste) {
                            self.otp_paste.clear();
                        } else if !self.otp_paste.trim().is_empty() {
                            let now = ui.input(|input| input.time);
                            self.otp_notice = Some(OtpNotice {
                                message: "only digits can be pasted".to_string(),
                                shown_at: now,
                                success: false,
                            });
                        }
                    }
                });
                ui.add_space(10.0);
                if ui.button(RichText::new("Submit").strong()).clicked() {
                    let now = ui.input(|input| input.time);
                    self.on_submit(now);
                }
                ui.add_space(12.0);
                self.render_otp_notice(ctx, ui);
            });
        });
    }

    fn render_otp_slots(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let row_width =
                self.otp.len() as f32 * (44.0 + ui.spacing().item_spacing.x) - ui.spacing().item_spacing.x;
            ui.add_space((ui.available_width() - row_width).max(0.0) / 2.0);
            for index in 0..self.otp.len() {
                let digit = self.otp.slots()[index];
                let focused = index == self.otp.active();
                let response = ui.allocate_response(vec2(44.0, 52.0), Sense::click());
                let fill = if digit.is_some() {
                    Color32::from_rgb(239, 246, 255)
                } else {
                    Color32::WHITE
                };
                let stroke_color = if focused {
                    Color32::from_rgb(59, 130, 246)
                } else if digit.is_some() {
                    Color32::from_rgb(37, 99, 235)
                } else {
                    Color32::from_rgb(209, 213, 219)
                };
                ui.painter()
                    .rect(response.rect, 6.0, fill, Stroke::new(2.0, stroke_color));
                if let Some(digit) = digit {
                    ui.painter().text(
                        response.rect.center(),
                        Align2::CENTER_CENTER,
                        digit,
                        FontId::proportional(24.0),
                        Color32::from_rgb(29, 78, 216),
                    );
                }
                if response.clicked() {
                    self.otp.focus(index);
                }
            }
        });
    }

    fn on_submit(&mut self, now: f64) {
        match self.otp.submit() {
            Ok(code) => {
                self.otp_notice = Some(OtpNotice {
                    message: format!("OTP verified successfully: {code}"),
                    shown_at: now,
                    success: true,
                });
            }
            Err(err) => {
                self.otp_notice = Some(OtpNotice {
                    message: err.to_string(),
                    shown_at: now,
                    success: false,
                });
            }
        }
    }

    fn render_otp_notice(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let now = ui.input(|input| input.time);
        let expired = self
            .otp_notice
            .as_ref()
            .is_some_and(|notice| notice.success && now - notice.shown_at > SUCCESS_BANNER_SECONDS);
        if expired {
            self.otp_notice = None;
        }
        if let Some(notice) = &self.otp_notice {
            let color = if notice.success {
                Color32::from_rgb(21, 128, 61)
            } else {
                Color32::from_rgb(185, 28, 28)
            };
            ui.colored_label(color, &notice.message);
            if notice.success {
                // keep repainting so the banner disappears on time
                ctx.request_repaint_after(Duration::from_millis(200));
            }
        }
    }
}

impl App for RustWidgetsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.show_top_bar(ctx);
        self.show_explorer_panel(ctx);
        self.show_otp_panel(ctx);
    }
}

fn main() -> eframe::Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([920.0, 640.0])
            .with_title(APP_TITLE),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|_cc| Box::<RustWidgetsApp>::default()),
    )
}
