use crate::model::{Line, PositionedToken};

/// Groups tokens into lines by vertical midpoint.
///
/// A token joins the first line whose seed midpoint lies within
/// `y_tolerance` of its own. Lines come back top-to-bottom and tokens inside a
/// line left-to-right; full ties keep input order.
#[must_use]
pub fn tokens_to_lines(tokens: &[PositionedToken], y_tolerance: f64) -> Vec<Line> {
    let mut sorted = tokens
        .iter()
        .filter(|token| !token.text.trim().is_empty())
        .collect::<Vec<_>>();
    sorted.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut groups: Vec<(f64, Vec<&PositionedToken>)> = Vec::new();
    for token in sorted {
        let mid = token.bbox.mid_y();
        match groups
            .iter_mut()
            .find(|(seed_mid, _)| (mid - *seed_mid).abs() <= y_tolerance)
        {
            Some((_, members)) => members.push(token),
            None => groups.push((mid, vec![token])),
        }
    }

    let mut lines = groups
        .into_iter()
        .map(|(_, mut members)| {
            members.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            let bbox = members
                .iter()
                .skip(1)
                .fold(members[0].bbox, |acc, token| acc.union(&token.bbox));
            let text = members
                .iter()
                .map(|token| token.text.trim())
                .collect::<Vec<_>>()
                .join(" ");
            Line { text, bbox }
        })
        .collect::<Vec<_>>();
    lines.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));
    lines
}

#[must_use]
pub fn render_text(tokens: &[PositionedToken], y_tolerance: f64) -> String {
    tokens_to_lines(tokens, y_tolerance)
        .into_iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Non-empty trimmed lines of a plain-text rendering.
pub(crate) fn text_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{render_text, text_lines, tokens_to_lines};
    use crate::model::{BBox, PositionedToken};

    fn token(text: &str, x0: f64, top: f64) -> PositionedToken {
        PositionedToken::new(text, BBox::new(x0, top, x0 + 30.0, top + 10.0))
    }

    #[test]
    fn groups_tokens_within_tolerance_left_to_right() {
        let tokens = vec![
            token("Jacket", 120.0, 101.0),
            token("Alpine", 20.0, 100.0),
            token("Down", 70.0, 102.0),
            token("Style#", 20.0, 130.0),
        ];
        let lines = tokens_to_lines(&tokens, 5.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Alpine Down Jacket");
        assert_eq!(lines[1].text, "Style#");
        assert_eq!(lines[0].bbox.x0, 20.0);
        assert_eq!(lines[0].bbox.x1, 150.0);
    }

    #[test]
    fn equal_positions_keep_input_order() {
        let tokens = vec![token("first", 10.0, 50.0), token("second", 10.0, 50.0)];
        assert_eq!(render_text(&tokens, 5.0), "first second");
    }

    #[test]
    fn tokens_outside_tolerance_start_new_lines() {
        let tokens = vec![token("a", 10.0, 50.0), token("b", 10.0, 56.0)];
        assert_eq!(tokens_to_lines(&tokens, 5.0).len(), 2);
    }

    #[test]
    fn skips_blank_tokens_and_lines() {
        let tokens = vec![token("  ", 10.0, 50.0)];
        assert!(tokens_to_lines(&tokens, 5.0).is_empty());
        assert_eq!(text_lines(" a \n\n b"), vec!["a", "b"]);
    }
}
