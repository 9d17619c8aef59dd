use crate::app::App;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use std::str::FromStr;
use tui_multigrid::braille::BrailleCanvas;
use tui_multigrid::view::{GridLayers, Intensity};

/// Render the UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Split into grid area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Grid
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_grid(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_grid(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Grid ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layers = app.render_grid(inner.width as usize, inner.height as usize);

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        // Convert Braille dots to character position
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        if cx < inner.width && cy < inner.height {
            Some((cx, cy))
        } else {
            None
        }
    });

    frame.render_widget(GridWidget { layers, cursor_pos }, inner);
}

/// Braille grid layers with a cursor marker on top
struct GridWidget {
    layers: Option<GridLayers>,
    cursor_pos: Option<(u16, u16)>,
}

impl GridWidget {
    /// Render a Braille layer, merging dots with anything drawn beneath
    fn render_layer(canvas: &BrailleCanvas, style: Style, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let Some(ch) = canvas.glyph(col as usize, row as usize) else {
                    continue;
                };
                let cell = &mut buf[(area.x + col, area.y + row)];
                let merged = merge_braille(cell.symbol(), ch);
                cell.set_char(merged).set_style(style);
            }
        }
    }
}

/// Union of two Braille glyphs; non-Braille symbols are replaced
fn merge_braille(existing: &str, ch: char) -> char {
    let braille = |c: char| (c as u32).checked_sub(0x2800).filter(|b| *b <= 0xFF);
    let mut chars = existing.chars();
    match (chars.next().and_then(braille), braille(ch)) {
        (Some(a), Some(b)) => char::from_u32(0x2800 + (a | b)).unwrap_or(ch),
        _ => ch,
    }
}

fn intensity_style(intensity: Intensity, stroke: Color) -> Style {
    match intensity {
        Intensity::Faint => Style::default().fg(Color::DarkGray),
        Intensity::Medium => Style::default().fg(stroke),
        Intensity::Strong => Style::default().fg(stroke).add_modifier(Modifier::BOLD),
    }
}

impl Widget for GridWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(layers) = &self.layers {
            let stroke = Color::from_str(&layers.stroke_style).unwrap_or(Color::Blue);

            // Back to front so coarse levels stay on top
            for intensity in [Intensity::Faint, Intensity::Medium, Intensity::Strong] {
                Self::render_layer(layers.layer(intensity), intensity_style(intensity, stroke), area, buf);
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" Scale: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.scale_label(), Style::default().fg(Color::Yellow)),
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_label(), Style::default().fg(Color::Magenta)),
        Span::styled(" Spacing: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.spacing_label(), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(" {} ", app.levels_label()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            if app.show_grid { "[G]rid " } else { "[g]rid " },
            Style::default().fg(if app.show_grid { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ];

    if let Some(message) = &app.message {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
    }

    spans.push(Span::styled(
        " | hjkl:pan +/-:zoom e:export r:reset q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
