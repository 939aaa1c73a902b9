use egui::{Color32, FontId, Rounding, Stroke, Visuals};
use mission_roadmap::model::{BarTreatment, ModuleIcon, ModuleProgress};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(9, 9, 11);
pub const BG_PANEL: Color32 = Color32::from_rgb(24, 24, 27);
pub const BG_HEADER: Color32 = Color32::from_rgb(18, 18, 21);
pub const BG_FIELD: Color32 = Color32::from_rgb(39, 39, 42);
pub const BG_ROW_ALT: Color32 = Color32::from_rgb(20, 20, 23);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(40, 70, 130, 90);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(39, 39, 42);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(59, 130, 246);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(244, 244, 245);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(161, 161, 170);
pub const TEXT_DIM: Color32 = Color32::from_rgb(113, 113, 122);
pub const TEXT_ON_BAR: Color32 = Color32::WHITE;

pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
pub const DANGER: Color32 = Color32::from_rgb(239, 68, 68);
pub const SUCCESS: Color32 = Color32::from_rgb(34, 197, 94);
pub const WARNING: Color32 = Color32::from_rgb(250, 204, 21);
pub const TODAY_LINE: Color32 = Color32::from_rgb(239, 68, 68);
pub const GRID_LINE: Color32 = Color32::from_rgb(30, 30, 34);

// Bar treatments
pub const BAR_COMPLETED: Color32 = Color32::from_rgb(63, 63, 70);
pub const BAR_COMPLETED_TEXT: Color32 = Color32::from_rgb(161, 161, 170);
pub const BAR_OVERDUE_FROM: Color32 = Color32::from_rgb(127, 29, 29);
pub const BAR_OVERDUE_TO: Color32 = Color32::from_rgb(153, 27, 27);
pub const BAR_DEFAULT_FROM: Color32 = Color32::from_rgb(59, 130, 246);
pub const BAR_DEFAULT_TO: Color32 = Color32::from_rgb(139, 92, 246);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const ROW_HEIGHT: f32 = 48.0;
pub const BAR_HEIGHT: f32 = 32.0;
pub const BAR_MIN_WIDTH: f32 = 60.0;
pub const MONTH_ROW_HEIGHT: f32 = 40.0;
pub const DAY_ROW_HEIGHT: f32 = 32.0;
pub const HEADER_HEIGHT: f32 = MONTH_ROW_HEIGHT + DAY_ROW_HEIGHT;
pub const TITLE_COLUMN_WIDTH: f32 = 250.0;
pub const BAR_ROUNDING: f32 = 8.0;
pub const DRAWER_WIDTH: f32 = 420.0;
pub const SIDEBAR_WIDTH: f32 = 300.0;
pub const STATUS_BAR_HEIGHT: f32 = 22.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(13.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.0)
}

pub fn font_bar() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

// ── Preset colors for modules and tasks ──────────────────────────────────────

pub const PRESET_COLORS: &[Color32] = &[
    Color32::from_rgb(59, 130, 246),  // blue
    Color32::from_rgb(139, 92, 246),  // purple
    Color32::from_rgb(16, 185, 129),  // green
    Color32::from_rgb(245, 158, 11),  // yellow
    Color32::from_rgb(239, 68, 68),   // red
    Color32::from_rgb(6, 182, 212),   // cyan
];

// ── Domain → visuals ─────────────────────────────────────────────────────────

/// Fill gradient endpoints and text color for a bar.
pub fn bar_colors(treatment: BarTreatment) -> (Color32, Color32, Color32) {
    match treatment {
        BarTreatment::Completed => (BAR_COMPLETED, BAR_COMPLETED, BAR_COMPLETED_TEXT),
        BarTreatment::Overdue => (BAR_OVERDUE_FROM, BAR_OVERDUE_TO, TEXT_ON_BAR),
        BarTreatment::Custom(c) => (c, c, TEXT_ON_BAR),
        BarTreatment::Default => (BAR_DEFAULT_FROM, BAR_DEFAULT_TO, TEXT_ON_BAR),
    }
}

pub fn module_icon_glyph(icon: ModuleIcon) -> &'static str {
    use egui_phosphor::regular as ph;
    match icon {
        ModuleIcon::Droplet => ph::DROP,
        ModuleIcon::Zap => ph::LIGHTNING,
        ModuleIcon::Wifi => ph::WIFI_HIGH,
        ModuleIcon::Box => ph::CUBE,
        ModuleIcon::MapPin => ph::MAP_PIN,
        ModuleIcon::Anchor => ph::ANCHOR,
        ModuleIcon::Wrench => ph::WRENCH,
        ModuleIcon::User => ph::USER,
        ModuleIcon::Package => ph::PACKAGE,
    }
}

pub fn progress_badge(progress: ModuleProgress) -> (&'static str, Color32) {
    use egui_phosphor::regular as ph;
    match progress {
        ModuleProgress::Completed => (ph::CHECK_CIRCLE, SUCCESS),
        ModuleProgress::InProgress => (ph::CLOCK, ACCENT),
        ModuleProgress::NoTasks => (ph::WARNING_CIRCLE, WARNING),
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_FIELD;
    visuals.faint_bg_color = BG_ROW_ALT;

    visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(39, 39, 42);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(52, 52, 58);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);

    visuals.widgets.active.bg_fill = Color32::from_rgb(63, 63, 70);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.striped = false;

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}
