use chrono::Local;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use lebirun_core::desktop::{DesktopScene, MenuItem, Region};

pub struct Theme {
    wallpaper: Color,
    taskbar_bg: Color,
    taskbar_fg: Color,
    button_bg: Color,
    button_fg: Color,
    menu_bg: Color,
    menu_fg: Color,
    danger: Color,
    cursor: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            wallpaper: Color::Rgb(0, 128, 128),
            taskbar_bg: Color::Gray,
            taskbar_fg: Color::Black,
            button_bg: Color::DarkGray,
            button_fg: Color::White,
            menu_bg: Color::White,
            menu_fg: Color::Black,
            danger: Color::Red,
            cursor: Color::Rgb(0, 25, 255),
        }
    }
}

/// Draw one desktop frame scaled from virtual pixels onto `frame`'s cells.
pub fn draw(frame: &mut Frame, scene: &DesktopScene, theme: &Theme) {
    let area = frame.size();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.wallpaper)),
        area,
    );

    let taskbar = to_cells(scene.taskbar, scene, area);
    frame.render_widget(
        Paragraph::new(Local::now().format("%H:%M ").to_string())
            .alignment(Alignment::Right)
            .style(Style::default().bg(theme.taskbar_bg).fg(theme.taskbar_fg)),
        taskbar,
    );

    let start = to_cells(scene.start_button, scene, area);
    frame.render_widget(
        Paragraph::new("Start")
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .bg(theme.button_bg)
                    .fg(theme.button_fg)
                    .add_modifier(Modifier::BOLD),
            ),
        start,
    );

    if let Some((panel, items)) = &scene.menu {
        let panel = to_cells(*panel, scene, area);
        frame.render_widget(Clear, panel);
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .title(" Lebirun ")
                .style(Style::default().bg(theme.menu_bg).fg(theme.menu_fg)),
            panel,
        );
        for (item, region) in items {
            let fg = match item {
                MenuItem::Terminal => theme.menu_fg,
                MenuItem::Reboot | MenuItem::Shutdown => theme.danger,
            };
            let line = Line::from(vec![Span::styled(
                format!(" {}", item.label()),
                Style::default().fg(fg),
            )]);
            frame.render_widget(
                Paragraph::new(line).style(Style::default().bg(theme.menu_bg)),
                to_cells(*region, scene, area),
            );
        }
    }

    let (cx, cy) = cell_of(scene.cursor.0, scene.cursor.1, scene, area);
    frame.render_widget(
        Paragraph::new("▲").style(Style::default().fg(theme.cursor)),
        Rect::new(cx, cy, 1, 1),
    );
}

/// Map a virtual pixel position onto the cell grid of `area`.
pub fn cell_of(x: i32, y: i32, scene: &DesktopScene, area: Rect) -> (u16, u16) {
    let col = scale(x, scene.width, area.width);
    let row = scale(y, scene.height, area.height);
    (area.x + col, area.y + row)
}

/// Map a terminal cell back to the virtual pixel at its centre.
pub fn pixel_of(col: u16, row: u16, width: i32, height: i32, area: Rect) -> (i32, i32) {
    let col = col.saturating_sub(area.x).min(area.width.saturating_sub(1));
    let row = row.saturating_sub(area.y).min(area.height.saturating_sub(1));
    let x = (2 * i32::from(col) + 1) * width / (2 * i32::from(area.width.max(1)));
    let y = (2 * i32::from(row) + 1) * height / (2 * i32::from(area.height.max(1)));
    (x, y)
}

fn to_cells(region: Region, scene: &DesktopScene, area: Rect) -> Rect {
    let (x, y) = cell_of(region.x, region.y, scene, area);
    let right = area.x + scale_end(region.x + region.width, scene.width, area.width);
    let bottom = area.y + scale_end(region.y + region.height, scene.height, area.height);
    let width = right.saturating_sub(x).max(1);
    let height = bottom.saturating_sub(y).max(1);
    clip(Rect::new(x, y, width, height), area)
}

fn scale(value: i32, extent: i32, cells: u16) -> u16 {
    if extent <= 0 || cells == 0 {
        return 0;
    }
    let value = value.clamp(0, extent - 1);
    let scaled = i64::from(value) * i64::from(cells) / i64::from(extent);
    u16::try_from(scaled).unwrap_or(cells - 1).min(cells - 1)
}

// Exclusive end edge, rounded up so thin regions keep a cell.
fn scale_end(value: i32, extent: i32, cells: u16) -> u16 {
    if extent <= 0 {
        return 0;
    }
    let value = i64::from(value.clamp(0, extent));
    let scaled = (value * i64::from(cells) + i64::from(extent) - 1) / i64::from(extent);
    u16::try_from(scaled).unwrap_or(cells).min(cells)
}

fn clip(rect: Rect, area: Rect) -> Rect {
    let width = rect.width.min((area.x + area.width).saturating_sub(rect.x));
    let height = rect.height.min((area.y + area.height).saturating_sub(rect.y));
    Rect::new(rect.x, rect.y, width, height)
}
