//! Rendering.
//!
//! `draw` is a pure projection of [`App`] state: it rebuilds the widget
//! tree from scratch on every frame and never mutates the state machine.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::client::{ContactMeta, ResultSet};
use crate::tui::app::{App, RequestState};
use crate::tui::colors;

const PROMPT: &str = " \u{1F50D} ";

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Search bar
            Constraint::Min(5),    // Results / error
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title(frame, chunks[0]);
    draw_search_bar(frame, app, chunks[1]);
    draw_body(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    // Cursor in the search bar: border (1) + prompt width + typed width
    let typed_width = app.input.query[..app.input.cursor].width() as u16;
    let cursor_x = chunks[1].x + 1 + PROMPT.width() as u16 + typed_width;
    let cursor_y = chunks[1].y + 1;
    frame.set_cursor_position(Position::new(cursor_x, cursor_y));
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "ChromaDB Search",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Search through your contact database",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (title, border_style) = if app.request.is_loading() {
        (" Searching... ", Style::default().fg(Color::Yellow))
    } else {
        (" Search ", Style::default().fg(Color::Cyan))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let text = format!("{}{}", PROMPT, app.input.query);
    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn draw_body(frame: &mut Frame, app: &App, area: Rect) {
    match &app.request {
        RequestState::Idle | RequestState::Loading => {}
        RequestState::Failed(message) => draw_error(frame, message, area),
        RequestState::Success(results) => {
            // an empty first batch renders nothing, not a zero-count panel
            if !results.is_empty() {
                draw_results(frame, results, area);
            }
        }
    }
}

fn draw_error(frame: &mut Frame, message: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ");

    let paragraph = Paragraph::new(message.to_string())
        .block(block)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn draw_results(frame: &mut Frame, results: &ResultSet, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Results ");

    let paragraph = Paragraph::new(result_lines(results))
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = format!(" {}", app.status_message);
    let right_text = " Enter:Search  Esc:Clear  Ctrl+C:Quit ";

    // Left-aligned status + padding + right-aligned key hints
    let available_width = area.width as usize;
    let left_len = left_text.width();
    let right_len = right_text.width();

    let status_str = if left_len + right_len < available_width {
        let padding = available_width - left_len - right_len;
        format!("{}{:padding$}{}", left_text, "", right_text, padding = padding)
    } else {
        format!("{:width$}", left_text, width = available_width)
    };

    let status = Paragraph::new(status_str)
        .style(Style::default().fg(Color::White).bg(Color::Rgb(0, 95, 135)));

    frame.render_widget(status, area);
}

/// Header above the result cards
pub fn header_line(count: usize) -> String {
    format!("Found {} results", count)
}

/// Relevance shown on each card: `1 - distance`, two decimals, no clamping
pub fn format_relevance(distance: f64) -> String {
    format!("{:.2}", 1.0 - distance)
}

pub fn contact_name(meta: &ContactMeta) -> String {
    format!("{} {}", meta.first_name, meta.last_name)
}

pub fn contact_info(meta: &ContactMeta) -> String {
    format!("{} | {}", meta.email, meta.phone)
}

/// One card per ranked result, in rank order, under the count header
fn result_lines(results: &ResultSet) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(results.len() * 5 + 1);

    lines.push(Line::from(Span::styled(
        header_line(results.len()),
        Style::default().add_modifier(Modifier::BOLD),
    )));

    for (rank, doc) in results.documents().iter().enumerate() {
        lines.push(Line::default());

        let meta = results.metadata(rank).cloned().unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(
                contact_name(&meta),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(meta.company.clone(), Style::default().fg(Color::Cyan)),
        ]));
        lines.push(Line::from(Span::styled(
            contact_info(&meta),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::raw(doc.clone())));

        if let Some(distance) = results.distance(rank) {
            lines.push(Line::from(Span::styled(
                format!("Relevance: {}", format_relevance(distance)),
                Style::default().fg(colors::color_for_relevance(1.0 - distance)),
            )));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn jane_doe() -> ResultSet {
        ResultSet {
            documents: vec![vec![
                "Met at the expo, interested in bulk pricing".to_string(),
            ]],
            metadatas: vec![vec![ContactMeta {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                company: "Acme Co".to_string(),
                email: "jane@acme.co".to_string(),
                phone: "555-0100".to_string(),
            }]],
            distances: vec![vec![0.15]],
        }
    }

    #[test]
    fn relevance_is_one_minus_distance_to_two_decimals() {
        assert_eq!(format_relevance(0.23), "0.77");
        assert_eq!(format_relevance(1.0), "0.00");
        assert_eq!(format_relevance(0.15), "0.85");
        // no clamping: a negative distance renders above 1.00
        assert_eq!(format_relevance(-0.01), "1.01");
    }

    #[test]
    fn header_keeps_plural_form_for_single_result() {
        assert_eq!(header_line(1), "Found 1 results");
        assert_eq!(header_line(5), "Found 5 results");
    }

    #[test]
    fn card_lines_for_a_single_match() {
        let results = jane_doe();
        let lines = result_lines(&results);
        let texts: Vec<String> = lines.iter().map(line_text).collect();

        assert_eq!(texts[0], "Found 1 results");
        assert!(texts.contains(&"Jane Doe  Acme Co".to_string()));
        assert!(texts.contains(&"jane@acme.co | 555-0100".to_string()));
        assert!(texts.contains(&"Met at the expo, interested in bulk pricing".to_string()));
        assert!(texts.contains(&"Relevance: 0.85".to_string()));
    }

    #[test]
    fn cards_follow_rank_order() {
        let results = ResultSet {
            documents: vec![vec!["first note".to_string(), "second note".to_string()]],
            metadatas: vec![vec![
                ContactMeta {
                    first_name: "Ada".to_string(),
                    ..ContactMeta::default()
                },
                ContactMeta {
                    first_name: "Bob".to_string(),
                    ..ContactMeta::default()
                },
            ]],
            distances: vec![vec![0.1, 0.4]],
        };

        let texts: Vec<String> = result_lines(&results).iter().map(line_text).collect();
        let ada = texts.iter().position(|t| t.starts_with("Ada")).unwrap();
        let bob = texts.iter().position(|t| t.starts_with("Bob")).unwrap();
        assert!(ada < bob);
        assert_eq!(texts[0], "Found 2 results");
    }

    #[test]
    fn missing_distance_omits_the_relevance_line() {
        let results = ResultSet {
            documents: vec![vec!["note".to_string()]],
            metadatas: vec![vec![ContactMeta::default()]],
            distances: vec![vec![]],
        };
        let texts: Vec<String> = result_lines(&results).iter().map(line_text).collect();
        assert!(!texts.iter().any(|t| t.starts_with("Relevance:")));
    }
}
