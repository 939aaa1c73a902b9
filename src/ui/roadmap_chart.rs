use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use mission_roadmap::model::timeline::UnplacedTask;
use mission_roadmap::model::{BarTreatment, PositionedTask};
use mission_roadmap::TimelineLayout;
use uuid::Uuid;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const TITLE_WIDTH: f32 = theme::TITLE_COLUMN_WIDTH;
const BAR_TOP: f32 = (ROW_HEIGHT - theme::BAR_HEIGHT) / 2.0;
const AVATAR_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// What the user asked for while interacting with the roadmap.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    pub open_task: Option<Uuid>,
    pub zoom: Option<ZoomDirection>,
}

/// Render the roadmap grid for a precomputed layout.
pub fn show_roadmap_chart(
    layout: &TimelineLayout,
    today: NaiveDate,
    selected_task: Option<Uuid>,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();

    if layout.is_empty() {
        show_empty_state(layout, ui);
        return interaction;
    }

    // Handle zoom with scroll wheel
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
        if scroll_delta.y > 0.0 {
            interaction.zoom = Some(ZoomDirection::In);
        } else if scroll_delta.y < 0.0 {
            interaction.zoom = Some(ZoomDirection::Out);
        }
    }

    let available = ui.available_size();
    let chart_width = (TITLE_WIDTH + layout.total_width()).max(available.x);
    let chart_height = (HEADER_HEIGHT + layout.row_count as f32 * ROW_HEIGHT + 40.0).max(available.y);

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) =
                ui.allocate_painter(Vec2::new(chart_width, chart_height), Sense::hover());
            let origin = response.rect.min;
            let grid_x = origin.x + TITLE_WIDTH;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            draw_rows(&painter, origin, layout, chart_width);
            draw_day_grid(&painter, grid_x, origin.y, layout, chart_height);
            draw_header(&painter, origin, grid_x, layout, chart_width);

            for unplaced in &layout.unplaced {
                draw_unplaced(&painter, origin, grid_x, unplaced);
            }

            for task in &layout.tasks {
                let row_y = origin.y + HEADER_HEIGHT + task.row_index as f32 * ROW_HEIGHT;
                draw_row_title(&painter, origin.x, row_y, &task.task.title, task.is_completed());

                let is_selected = selected_task == Some(task.id());
                let bar_rect = draw_task_bar(&painter, grid_x, row_y, task, is_selected);

                let bar_response = ui.interact(
                    bar_rect,
                    ui.make_persistent_id(("roadmap-bar", task.id())),
                    Sense::click(),
                );
                if bar_response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        egui::Id::new(("roadmap-tip", task.id())),
                        |ui| bar_tooltip(ui, task),
                    );
                }
                if bar_response.clicked() {
                    interaction.open_task = Some(task.id());
                }
            }

            if let Some(offset) = layout.today_offset(today) {
                draw_today_marker(&painter, grid_x + offset, origin.y, chart_height);
            }
        });

    interaction
}

fn show_empty_state(layout: &TimelineLayout, ui: &mut Ui) {
    ui.centered_and_justified(|ui| {
        let message = if layout.unplaced.is_empty() {
            "No tasks scheduled".to_string()
        } else {
            format!("{} tasks have dates that could not be read", layout.unplaced.len())
        };
        ui.label(egui::RichText::new(message).color(theme::TEXT_DIM));
    });
}

fn draw_rows(painter: &egui::Painter, origin: Pos2, layout: &TimelineLayout, width: f32) {
    for i in 0..layout.row_count {
        let y = origin.y + HEADER_HEIGHT + i as f32 * ROW_HEIGHT;
        let row_bg = if i % 2 == 0 { theme::BG_DARK } else { theme::BG_ROW_ALT };
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(origin.x, y), Vec2::new(width, ROW_HEIGHT)),
            0.0,
            row_bg,
        );
        painter.line_segment(
            [Pos2::new(origin.x, y + ROW_HEIGHT), Pos2::new(origin.x + width, y + ROW_HEIGHT)],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }

    // Title column divider
    painter.line_segment(
        [
            Pos2::new(origin.x + TITLE_WIDTH, origin.y),
            Pos2::new(origin.x + TITLE_WIDTH, origin.y + HEADER_HEIGHT + layout.row_count as f32 * ROW_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

fn draw_day_grid(painter: &egui::Painter, grid_x: f32, top: f32, layout: &TimelineLayout, height: f32) {
    for (idx, cell) in layout.days.iter().enumerate() {
        let x = grid_x + idx as f32 * layout.day_width;
        let stroke = if cell.is_month_start {
            Stroke::new(1.0, theme::BORDER_SUBTLE)
        } else {
            Stroke::new(0.5, theme::GRID_LINE)
        };
        painter.line_segment(
            [Pos2::new(x, top + theme::MONTH_ROW_HEIGHT), Pos2::new(x, top + height)],
            stroke,
        );
    }
}

fn draw_header(painter: &egui::Painter, origin: Pos2, grid_x: f32, layout: &TimelineLayout, width: f32) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + theme::MONTH_ROW_HEIGHT),
            Pos2::new(origin.x + width, origin.y + theme::MONTH_ROW_HEIGHT),
        ],
        Stroke::new(0.5, theme::BORDER_SUBTLE),
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    painter.text(
        Pos2::new(origin.x + 12.0, origin.y + HEADER_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        "TASK",
        theme::font_sub(),
        theme::TEXT_DIM,
    );

    // Month row
    for band in &layout.months {
        let x = grid_x + band.left_offset;
        painter.line_segment(
            [Pos2::new(x, origin.y), Pos2::new(x, origin.y + theme::MONTH_ROW_HEIGHT)],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        let clip = Rect::from_min_size(
            Pos2::new(x, origin.y),
            Vec2::new(band.width, theme::MONTH_ROW_HEIGHT),
        );
        painter.with_clip_rect(clip).text(
            Pos2::new(x + 8.0, origin.y + theme::MONTH_ROW_HEIGHT / 2.0),
            egui::Align2::LEFT_CENTER,
            &band.label,
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
    }

    // Day row; labels only where they fit
    if layout.day_width >= 28.0 {
        for (idx, cell) in layout.days.iter().enumerate() {
            let x = grid_x + idx as f32 * layout.day_width;
            painter.text(
                Pos2::new(x + layout.day_width / 2.0, origin.y + theme::MONTH_ROW_HEIGHT + theme::DAY_ROW_HEIGHT / 2.0),
                egui::Align2::CENTER_CENTER,
                &cell.day_label,
                theme::font_small(),
                theme::TEXT_SECONDARY,
            );
        }
    }
}

fn draw_row_title(painter: &egui::Painter, x: f32, row_y: f32, title: &str, completed: bool) {
    let color = if completed { theme::TEXT_DIM } else { theme::TEXT_PRIMARY };
    let clip = Rect::from_min_size(Pos2::new(x, row_y), Vec2::new(TITLE_WIDTH - 8.0, ROW_HEIGHT));
    painter.with_clip_rect(clip).text(
        Pos2::new(x + 12.0, row_y + ROW_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        title,
        theme::font_bar(),
        color,
    );
}

fn draw_unplaced(painter: &egui::Painter, origin: Pos2, grid_x: f32, task: &UnplacedTask) {
    let row_y = origin.y + HEADER_HEIGHT + task.row_index as f32 * ROW_HEIGHT;
    draw_row_title(painter, origin.x, row_y, &task.title, false);
    painter.text(
        Pos2::new(grid_x + 12.0, row_y + ROW_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        format!("⚠ {}", task.error),
        theme::font_small(),
        theme::WARNING,
    );
}

/// Horizontal two-color fill with rounded ends.
fn fill_gradient(painter: &egui::Painter, rect: Rect, from: Color32, to: Color32) {
    let r = theme::BAR_ROUNDING.min(rect.width() / 2.0);
    if from == to {
        painter.rect_filled(rect, Rounding::same(r), from);
        return;
    }

    let left_cap = Rect::from_min_max(rect.min, Pos2::new(rect.left() + r, rect.bottom()));
    let right_cap = Rect::from_min_max(Pos2::new(rect.right() - r, rect.top()), rect.max);
    painter.with_clip_rect(left_cap).rect_filled(rect, Rounding::same(r), from);
    painter.with_clip_rect(right_cap).rect_filled(rect, Rounding::same(r), to);

    let mut mesh = egui::Mesh::default();
    mesh.colored_vertex(Pos2::new(left_cap.right(), rect.top()), from);
    mesh.colored_vertex(Pos2::new(right_cap.left(), rect.top()), to);
    mesh.colored_vertex(Pos2::new(right_cap.left(), rect.bottom()), to);
    mesh.colored_vertex(Pos2::new(left_cap.right(), rect.bottom()), from);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    painter.add(egui::Shape::mesh(mesh));
}

fn draw_task_bar(
    painter: &egui::Painter,
    grid_x: f32,
    row_y: f32,
    task: &PositionedTask,
    is_selected: bool,
) -> Rect {
    let width = task.bar_width.max(theme::BAR_MIN_WIDTH);
    let bar_rect = Rect::from_min_size(
        Pos2::new(grid_x + task.left_offset, row_y + BAR_TOP),
        Vec2::new(width, theme::BAR_HEIGHT),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let (from, to, text_color) = theme::bar_colors(task.treatment);

    // Soft shadow
    painter.rect_filled(bar_rect.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    fill_gradient(painter, bar_rect, from, to);

    if task.treatment == BarTreatment::Overdue {
        painter.rect_stroke(bar_rect, rounding, Stroke::new(1.0, theme::DANGER));
    }
    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    // Initials avatar on the right end
    let avatar_center = Pos2::new(bar_rect.right() - 6.0 - AVATAR_RADIUS, bar_rect.center().y);
    painter.circle_filled(avatar_center, AVATAR_RADIUS, Color32::from_white_alpha(50));
    painter.text(
        avatar_center,
        egui::Align2::CENTER_CENTER,
        task.task.initials(),
        theme::font_small(),
        text_color,
    );

    // Title clipped to the space left of the avatar
    let text_clip = Rect::from_min_max(
        bar_rect.min,
        Pos2::new(avatar_center.x - AVATAR_RADIUS - 4.0, bar_rect.bottom()),
    );
    painter.with_clip_rect(text_clip).text(
        Pos2::new(bar_rect.left() + 12.0, bar_rect.center().y),
        egui::Align2::LEFT_CENTER,
        &task.task.title,
        theme::font_bar(),
        text_color,
    );

    bar_rect
}

fn bar_tooltip(ui: &mut Ui, task: &PositionedTask) {
    ui.strong(&task.task.title);
    if let Some(description) = &task.task.description {
        ui.label(egui::RichText::new(description).color(theme::TEXT_SECONDARY));
    }
    ui.add_space(4.0);
    ui.label(
        egui::RichText::new(format!("Start: {}", task.start.format("%b %-d, %Y")))
            .monospace()
            .color(theme::TEXT_DIM),
    );
    ui.label(
        egui::RichText::new(format!("End: {}", task.end.format("%b %-d, %Y")))
            .monospace()
            .color(theme::TEXT_DIM),
    );
    let status = if task.is_completed() {
        "Completed".to_string()
    } else {
        task.deadline().label()
    };
    let color = if task.is_overdue { theme::DANGER } else { theme::TEXT_SECONDARY };
    ui.label(egui::RichText::new(status).monospace().color(color));
}

fn draw_today_marker(painter: &egui::Painter, x: f32, top: f32, height: f32) {
    painter.line_segment(
        [Pos2::new(x, top + HEADER_HEIGHT), Pos2::new(x, top + height)],
        Stroke::new(2.0, theme::TODAY_LINE),
    );

    let badge_w = 38.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, top + HEADER_HEIGHT - 15.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "LIVE",
        theme::font_small(),
        Color32::WHITE,
    );
}
