use crate::app::App;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use std::sync::Arc;
use world_map::map::{Frame as MapFrame, ViewMode};

/// Width of the info panel in terminal cells
const INFO_WIDTH: u16 = 34;

const ORANGE: Color = Color::Rgb(255, 165, 0);

struct Areas {
    map: Rect,
    info: Rect,
    status: Rect,
}

fn split(area: Rect) -> Areas {
    // Split into body and status bar
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map + info
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(INFO_WIDTH)])
        .split(rows[0]);
    Areas {
        map: cols[0],
        info: cols[1],
        status: rows[1],
    }
}

fn map_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " World Relations ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Inner map pane (inside the border) for a terminal of the given size
pub fn map_inner(area: Rect) -> Rect {
    map_block().inner(split(area).map)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let areas = split(frame.area());

    let block = map_block();
    let inner = block.inner(areas.map);
    frame.render_widget(block, areas.map);
    frame.render_widget(
        MapWidget {
            frame: app.frame(),
            selection: app.drag().map(|d| (d.start, d.current)),
        },
        inner,
    );

    render_info(frame, app, areas.info);
    render_status_bar(frame, app, areas.status);
}

/// Braille map with its highlight layers merged into one glyph per cell
struct MapWidget {
    frame: Option<Arc<MapFrame>>,
    /// Drag corners in absolute terminal cells
    selection: Option<((u16, u16), (u16, u16))>,
}

impl MapWidget {
    fn render_layers(frame: &MapFrame, area: Rect, buf: &mut Buffer) {
        // Later entries win the cell color
        let layers = [
            (&frame.outlines, Color::Cyan),
            (&frame.enemies, Color::Red),
            (&frame.allies, Color::Green),
            (&frame.selected, ORANGE),
        ];
        let (width, height) = frame.outlines.size();

        for row in 0..height.min(area.height as usize) {
            let rows: Vec<Vec<char>> = layers
                .iter()
                .map(|(canvas, _)| canvas.row_to_string(row).chars().collect())
                .collect();
            let y = area.y + row as u16;

            for col in 0..width.min(area.width as usize) {
                let mut bits = 0u32;
                let mut color = None;
                for (chars, (_, layer_color)) in rows.iter().zip(layers.iter()) {
                    let dots = chars.get(col).map_or(0, |&ch| (ch as u32).saturating_sub(0x2800));
                    if dots != 0 {
                        bits |= dots;
                        color = Some(*layer_color);
                    }
                }
                // Skip empty braille characters (U+2800)
                let (Some(color), Some(ch)) = (color, char::from_u32(0x2800 + bits)) else {
                    continue;
                };
                let x = area.x + col as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }

    fn render_selection(&self, area: Rect, buf: &mut Buffer) {
        let Some(((x0, y0), (x1, y1))) = self.selection else {
            return;
        };
        let clamp_x = |x: u16| x.clamp(area.x, area.x + area.width.saturating_sub(1));
        let clamp_y = |y: u16| y.clamp(area.y, area.y + area.height.saturating_sub(1));
        let (left, right) = (clamp_x(x0.min(x1)), clamp_x(x0.max(x1)));
        let (top, bottom) = (clamp_y(y0.min(y1)), clamp_y(y0.max(y1)));
        let style = Style::default().fg(Color::Yellow);

        for x in left..=right {
            buf[(x, top)].set_char('─').set_style(style);
            buf[(x, bottom)].set_char('─').set_style(style);
        }
        for y in top..=bottom {
            buf[(left, y)].set_char('│').set_style(style);
            buf[(right, y)].set_char('│').set_style(style);
        }
        if right > left && bottom > top {
            buf[(left, top)].set_char('┌');
            buf[(right, top)].set_char('┐');
            buf[(left, bottom)].set_char('└');
            buf[(right, bottom)].set_char('┘');
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        if let Some(frame) = &self.frame {
            Self::render_layers(frame, area, buf);
        }
        self.render_selection(area, buf);
    }
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))
}

fn name_list(names: &[String], color: Color) -> Vec<Line<'static>> {
    if names.is_empty() {
        return vec![Line::from(Span::styled(
            "  None listed",
            Style::default().fg(Color::DarkGray),
        ))];
    }
    names
        .iter()
        .map(|name| Line::from(Span::styled(format!("  {name}"), Style::default().fg(color))))
        .collect()
}

fn render_info(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" Selection ", Style::default().fg(Color::Cyan)));

    let (country, allies, enemies) = match app.response() {
        Some(r) => (r.country.as_str(), r.allies.as_slice(), r.enemies.as_slice()),
        None => ("None", &[][..], &[][..]),
    };

    let mut lines = vec![
        heading("Country"),
        Line::from(Span::styled(format!("  {country}"), Style::default().fg(ORANGE))),
        Line::default(),
        heading("Allies"),
    ];
    lines.extend(name_list(allies, Color::Green));
    lines.push(Line::default());
    lines.push(heading("Enemies"));
    lines.extend(name_list(enemies, Color::Red));
    lines.push(Line::default());

    let state = app.state();
    let e = state.extent();
    let mode = match state.mode() {
        ViewMode::DefaultView => "default",
        ViewMode::Zoomed => "zoomed",
    };
    lines.push(heading("View"));
    lines.push(Line::from(vec![
        Span::styled("  mode ", Style::default().fg(Color::DarkGray)),
        Span::styled(mode, Style::default().fg(Color::Yellow)),
    ]));
    lines.push(Line::from(Span::styled(
        format!("  lon {:.2} .. {:.2}", e.lon_min, e.lon_max),
        Style::default().fg(Color::Cyan),
    )));
    lines.push(Line::from(Span::styled(
        format!("  lat {:.2} .. {:.2}", e.lat_min, e.lat_max),
        Style::default().fg(Color::Cyan),
    )));

    if let Some(err) = app.error() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let cursor = match app.cursor_geo() {
        Some(p) => format!(
            "{:.1}°{}, {:.1}°{}",
            p.y.abs(),
            if p.y >= 0.0 { "N" } else { "S" },
            p.x.abs(),
            if p.x >= 0.0 { "E" } else { "W" }
        ),
        None => "--".to_string(),
    };

    let status = Line::from(vec![
        Span::styled(" Countries: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.country_count().to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::styled(
            " | click:identify drag:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
