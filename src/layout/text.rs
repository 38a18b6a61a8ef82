use crate::config::ChartConfig;
use crate::ir::EmployeeRecord;

use super::CardText;

const ELLIPSIS: char = '\u{2026}';

/// Advance width of `ch` as a fraction of the font size.
///
/// Calibrated against Segoe UI; close enough for the usual sans-serif stacks.
pub(super) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.274,
        'i' | 'j' | 'l' | '|' | '!' | '\'' | '.' | ',' | ':' | ';' => 0.242,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.35,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.93,
        'A'..='Z' => 0.64,
        'a'..='z' => 0.52,
        '0'..='9' => 0.55,
        '\u{2026}' => 0.78,
        c if c.is_ascii() => 0.5,
        // CJK and other wide scripts
        _ => 1.0,
    }
}

pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Shorten `text` with an ellipsis so it fits `max_width`.
pub fn truncate_to_width(text: &str, max_width: f32, font_size: f32) -> String {
    if text_width(text, font_size) <= max_width {
        return text.to_string();
    }
    let budget = max_width - char_width_factor(ELLIPSIS) * font_size;
    let mut used = 0.0;
    let mut out = String::new();
    for ch in text.chars() {
        let advance = char_width_factor(ch) * font_size;
        if used + advance > budget {
            break;
        }
        used += advance;
        out.push(ch);
    }
    let mut out = out.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

pub(super) fn inner_text_width(config: &ChartConfig) -> f32 {
    let card = &config.card;
    let mut width = config.layout.node_width - card.padding * 2.0;
    if card.show_avatar {
        width -= card.avatar_size + card.padding;
    }
    width.max(0.0)
}

/// Baseline offset from the card top that the first value line steps down from.
pub(crate) fn values_origin(header_lines: usize, config: &ChartConfig) -> f32 {
    let text = &config.text;
    let card = &config.card;
    let header = card.padding
        + text.name_size
        + header_lines as f32 * text.title_size * text.line_height;
    if card.show_avatar {
        header.max(card.padding + card.avatar_size)
    } else {
        header
    }
}

pub(super) fn fit_card_text(record: &EmployeeRecord, config: &ChartConfig) -> CardText {
    let text = &config.text;
    let width = inner_text_width(config);
    let name = truncate_to_width(&record.display_name, width, text.name_size);
    let title = record
        .title
        .as_deref()
        .map(|t| truncate_to_width(t, width, text.title_size));
    let division = record
        .division
        .as_deref()
        .map(|d| truncate_to_width(d, width, text.title_size));

    let header_lines = title.is_some() as usize + division.is_some() as usize;
    let top = values_origin(header_lines, config);
    let line = text.detail_size * text.line_height;
    let bottom = config.layout.node_height - config.card.padding;
    let room = ((bottom - top) / line).floor().max(0.0) as usize;

    // Metrics sit under the header and use the full card width.
    let value_width = (config.layout.node_width - config.card.padding * 2.0).max(0.0);
    let values = record
        .metrics
        .iter()
        .chain(record.details.iter())
        .take(room)
        .map(|entry| {
            truncate_to_width(
                &format!("{}: {}", entry.label, entry.value),
                value_width,
                text.detail_size,
            )
        })
        .collect();

    CardText {
        name,
        title,
        division,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::LabelledValue;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Ada", 200.0, 14.0), "Ada");
    }

    #[test]
    fn long_text_gets_ellipsis_within_budget() {
        let long = "Chief Executive Officer of Everything Important";
        let out = truncate_to_width(long, 120.0, 12.0);
        assert!(out.ends_with(ELLIPSIS));
        assert!(text_width(&out, 12.0) <= 120.0 + 0.01);
    }

    #[test]
    fn values_are_limited_by_card_height() {
        let mut config = ChartConfig::default();
        config.layout.node_height = 80.0;
        let mut record = EmployeeRecord::new("1", None);
        record.title = Some("Engineer".into());
        record.metrics = (0..10)
            .map(|i| LabelledValue::new(&format!("m{i}"), "1"))
            .collect();
        let fitted = fit_card_text(&record, &config);
        assert!(fitted.values.len() < 10);
        assert_eq!(fitted.name, "1");
    }

    #[test]
    fn values_stay_inside_card_below_avatar() {
        let config = ChartConfig::default();
        let mut record = EmployeeRecord::new("1", None);
        record.metrics = (0..6)
            .map(|i| LabelledValue::new(&format!("m{i}"), "1"))
            .collect();
        let fitted = fit_card_text(&record, &config);
        assert_eq!(fitted.values.len(), 3);

        let line = config.text.detail_size * config.text.line_height;
        let last = values_origin(0, &config) + fitted.values.len() as f32 * line;
        assert!(last <= config.layout.node_height - config.card.padding);
    }

    #[test]
    fn header_sets_value_origin_without_avatar() {
        let mut config = ChartConfig::default();
        config.card.show_avatar = false;
        let expected = config.card.padding
            + config.text.name_size
            + 2.0 * config.text.title_size * config.text.line_height;
        assert!((values_origin(2, &config) - expected).abs() < 1e-4);
    }
}
