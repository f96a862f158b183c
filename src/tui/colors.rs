use ratatui::style::Color;

/// Color-code a relevance score (`1 - distance`)
pub fn color_for_relevance(relevance: f64) -> Color {
    if relevance >= 0.75 {
        Color::Green
    } else if relevance >= 0.5 {
        Color::Yellow
    } else {
        Color::DarkGray
    }
}
