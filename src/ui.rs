use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
};

use crate::drill::ActiveLayer;
use crate::sentiment::{SentimentResolver, Tier};
use crate::state::{AppState, DetailPopup};

/// Ticks over which the popup sentiment bars grow to full width.
const BAR_GROW_TICKS: u64 = 6;

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // breadcrumbs
            Constraint::Min(3),    // map + side panel
            Constraint::Length(1), // tooltip / hints
        ])
        .split(f.area());

    draw_breadcrumbs(f, state, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(rows[1]);

    draw_map(f, state, columns[0]);
    draw_side_panel(f, state, columns[1]);
    draw_status(f, state, rows[2]);

    if state.popup.is_some() {
        draw_popup(f, state);
    }
}

fn draw_breadcrumbs(f: &mut Frame, state: &mut AppState, area: Rect) {
    state.crumb_row = area.y;
    state.crumb_hits.clear();

    let crumbs = state.controller.breadcrumbs();
    let current = state.controller.state().level;
    let mut spans = vec![Span::raw(" ")];
    let mut col = area.x + 1;
    for (i, (level, label)) in crumbs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
            col += 3;
        }
        let text = format!("{} [{}]", label, i + 1);
        let width = text.chars().count() as u16;
        let style = if *level == current {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        state.crumb_hits.push((col..col + width, *level));
        spans.push(Span::styled(text, style));
        col += width;
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_map(f: &mut Frame, state: &mut AppState, area: Rect) {
    // Record the inner canvas area for mouse mapping.
    state.map_area = Block::default().borders(Borders::ALL).inner(area);

    let registry = state.registry;
    let resolve = move |id: &str| SentimentResolver::new(registry).resolve(id).cloned();
    let title = format!(" {} ", state.controller.state().level.label());
    let viewport = state.controller.viewport().clone();

    match state.controller.active_layer() {
        ActiveLayer::Boundaries(layer) => layer.render(f, area, &title, &viewport, &resolve),
        ActiveLayer::Booths(layer) => layer.render(f, area, &title, &viewport),
    }
}

fn draw_side_panel(f: &mut Frame, state: &AppState, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(10)])
        .split(area);

    let info = Paragraph::new(region_info(state))
        .block(Block::default().borders(Borders::ALL).title(" Region "))
        .wrap(Wrap { trim: true });
    f.render_widget(info, parts[0]);

    let legend = Paragraph::new(legend_lines())
        .block(Block::default().borders(Borders::ALL).title(" Sentiment "));
    f.render_widget(legend, parts[1]);
}

/// Stats for the hovered feature, falling back to the current selection.
fn region_info(state: &AppState) -> Vec<Line<'static>> {
    let registry = state.registry;
    let drill = state.controller.state();

    let hovered_id = state.hovered.as_ref().map(|(id, _)| id.as_str());
    let code = hovered_id
        .or(drill.selected_constituency_code.as_deref())
        .or(drill.selected_district_code.as_deref())
        .or(drill.selected_state_code.as_deref());
    let Some(code) = code else {
        return vec![Line::from("Hover over a region")];
    };

    let mut lines = Vec::new();
    if let Some(d) = registry.district(code).or_else(|| registry.district_by_name(code)) {
        lines.push(Line::from(Span::styled(
            d.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("Voters: {}", d.total_voters)));
        lines.push(Line::from(format!("Area: {:.0} km²", d.area_sq_km)));
        lines.push(Line::from(format!(
            "Constituencies: {}",
            d.constituency_codes.len()
        )));
        lines.extend(sentiment_lines(d.sentiment.as_ref()));
    } else if let Some(c) = registry
        .constituency(code)
        .or_else(|| registry.constituency_by_name(code))
    {
        lines.push(Line::from(Span::styled(
            c.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("Voters: {}", c.total_voters)));
        lines.push(Line::from(format!("Polling booths: {}", c.polling_booths)));
        lines.extend(sentiment_lines(c.sentiment.as_ref()));
    } else if let Some(s) = registry.state(code).or_else(|| registry.state_by_name(code)) {
        lines.push(Line::from(Span::styled(
            s.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("Voters: {}", s.total_voters)));
        lines.push(Line::from(format!("Districts: {}", s.district_codes.len())));
        lines.extend(sentiment_lines(s.sentiment.as_ref()));
    } else {
        lines.push(Line::from(format!("{code} — not in registry")));
    }
    lines
}

fn sentiment_lines(score: Option<&crate::sentiment::SentimentScore>) -> Vec<Line<'static>> {
    let Some(s) = score else {
        return vec![Line::from(Span::styled(
            "No sentiment data",
            Style::default().fg(Color::DarkGray),
        ))];
    };
    let tier = Tier::from_score(Some(s));
    vec![
        Line::from(vec![
            Span::raw("Mood: "),
            Span::styled(tier.label(), Style::default().fg(tier.color())),
        ]),
        Line::from(format!(
            "+{:.0}%  ={:.0}%  -{:.0}%",
            s.positive, s.neutral, s.negative
        )),
        Line::from(format!("Confidence: {:.0}%", s.confidence * 100.0)),
    ]
}

fn legend_lines() -> Vec<Line<'static>> {
    [
        Tier::StrongPositive,
        Tier::MidPositive,
        Tier::WeakPositive,
        Tier::Neutral,
        Tier::WeakNegative,
        Tier::MidNegative,
        Tier::StrongNegative,
        Tier::NoData,
    ]
    .into_iter()
    .map(|t| {
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(t.color())),
            Span::raw(t.label()),
        ])
    })
    .collect()
}

fn draw_status(f: &mut Frame, state: &AppState, area: Rect) {
    let text = state.tooltip.clone().unwrap_or_else(|| {
        "click: drill down · Esc/Backspace: back · 1-3: jump level · q: quit".to_string()
    });
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Gray)),
        area,
    );
}

fn draw_popup(f: &mut Frame, state: &AppState) {
    let Some(popup) = &state.popup else { return };
    let area = centered_rect(54, 46, f.area());
    f.render_widget(Clear, area);

    match popup {
        DetailPopup::Booth { title, body } => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {title} "));
            let text = format!("{body}\n\n[Esc] Close");
            f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
        }
        DetailPopup::Region {
            title,
            score,
            total_voters,
            polling_booths,
            area_sq_km,
            action,
            opened_tick,
        } => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {title} "));
            let inner = block.inner(area);
            f.render_widget(block, area);

            let mut constraints = vec![Constraint::Length(2)];
            constraints.extend([Constraint::Length(1); 3]); // bars
            constraints.push(Constraint::Min(1));
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(inner);

            let mut header = format!("Voters: {total_voters}");
            if let Some(b) = polling_booths {
                header.push_str(&format!(" · Booths: {b}"));
            }
            if let Some(a) = area_sq_km {
                header.push_str(&format!(" · Area: {a:.0} km²"));
            }
            if let Some(s) = score {
                header.push_str(&format!(" · Confidence: {:.0}%", s.confidence * 100.0));
            }
            f.render_widget(Paragraph::new(header).wrap(Wrap { trim: true }), parts[0]);

            // Bars grow in over the first few ticks after opening.
            let grow = ((state.ticks.saturating_sub(*opened_tick)) as f64
                / BAR_GROW_TICKS as f64)
                .min(1.0);
            let bars: [(&str, f64, Color); 3] = match score {
                Some(s) => [
                    ("positive", s.positive, Color::Green),
                    ("neutral", s.neutral, Color::Yellow),
                    ("negative", s.negative, Color::Red),
                ],
                None => [
                    ("positive", 0.0, Color::DarkGray),
                    ("neutral", 0.0, Color::DarkGray),
                    ("negative", 0.0, Color::DarkGray),
                ],
            };
            for (i, (label, value, color)) in bars.into_iter().enumerate() {
                let ratio = ((value / 100.0) * grow).clamp(0.0, 1.0);
                let gauge = Gauge::default()
                    .gauge_style(Style::default().fg(color))
                    .ratio(ratio)
                    .label(format!("{label} {value:.0}%"));
                f.render_widget(gauge, parts[1 + i]);
            }

            let hint = match (score, action) {
                (None, Some(_)) => "No sentiment data · [Enter] Drill down · [Esc] Close",
                (None, None) => "No sentiment data · [Esc] Close",
                (_, Some(_)) => "[Enter] Drill down · [Esc] Close",
                (_, None) => "[Esc] Close",
            };
            f.render_widget(
                Paragraph::new(hint).style(Style::default().fg(Color::Gray)),
                parts[4],
            );
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
