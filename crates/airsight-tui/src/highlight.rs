//! Sentiment highlighting of free text.
//!
//! Listed words are matched case-insensitively on word boundaries and turned
//! into annotated segments; everything else passes through untouched.

use crate::theme::{ComponentType, ThemeManager};
use airsight_core::models::WordDict;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Polarity {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Plain(String),
    Annotated {
        text: String,
        polarity: Polarity,
        score: f64,
    },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(text) | Segment::Annotated { text, .. } => text,
        }
    }

    pub fn is_annotation(&self) -> bool {
        matches!(self, Segment::Annotated { .. })
    }
}

/// One input line split into segments.
pub type HighlightedLine = Vec<Segment>;

/// Score label shown next to an annotation.
pub fn format_score(score: f64) -> String {
    format!("{:.3}", score)
}

/// Compiled matcher for one pair of word lists.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
    positive: HashMap<String, f64>,
    negative: HashMap<String, f64>,
}

impl Highlighter {
    pub fn new(positive: &WordDict, negative: &WordDict) -> Self {
        let lower = |dict: &WordDict| -> HashMap<String, f64> {
            let mut map = HashMap::new();
            for (word, score) in dict {
                let key = word.trim().to_lowercase();
                if !key.is_empty() {
                    map.entry(key).or_insert(score.score);
                }
            }
            map
        };
        let positive_map = lower(positive);
        let negative_map = lower(negative);

        // Positive words first, then negative; longest first within the
        // alternation so "greatest" is not cut short by "great".
        let mut words: Vec<&str> = positive
            .keys()
            .chain(negative.keys())
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        words.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

        let pattern = if words.is_empty() {
            None
        } else {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            match RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
                .case_insensitive(true)
                .build()
            {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::warn!(error = %err, "Could not compile highlight pattern");
                    None
                }
            }
        };

        Self {
            pattern,
            positive: positive_map,
            negative: negative_map,
        }
    }

    fn classify(&self, fragment: &str) -> Option<(Polarity, f64)> {
        let key = fragment.to_lowercase();
        if let Some(score) = self.positive.get(&key) {
            return Some((Polarity::Positive, *score));
        }
        self.negative
            .get(&key)
            .map(|score| (Polarity::Negative, *score))
    }

    fn highlight_line(&self, line: &str) -> HighlightedLine {
        let Some(pattern) = &self.pattern else {
            return vec![Segment::Plain(line.to_string())];
        };

        let mut segments = Vec::new();
        let mut cursor = 0;
        for found in pattern.find_iter(line) {
            if found.start() > cursor {
                segments.push(Segment::Plain(line[cursor..found.start()].to_string()));
            }
            let text = found.as_str().to_string();
            match self.classify(&text) {
                Some((polarity, score)) => segments.push(Segment::Annotated {
                    text,
                    polarity,
                    score,
                }),
                None => segments.push(Segment::Plain(text)),
            }
            cursor = found.end();
        }
        if cursor < line.len() || segments.is_empty() {
            segments.push(Segment::Plain(line[cursor..].to_string()));
        }
        segments
    }

    /// Split `text` into lines and annotate each. Empty text yields nothing.
    pub fn highlight(&self, text: &str) -> Vec<HighlightedLine> {
        if text.is_empty() {
            return Vec::new();
        }
        text.split('\n')
            .map(|line| self.highlight_line(line.strip_suffix('\r').unwrap_or(line)))
            .collect()
    }
}

/// Convenience wrapper for one-off highlighting.
pub fn highlight(text: &str, positive: &WordDict, negative: &WordDict) -> Vec<HighlightedLine> {
    Highlighter::new(positive, negative).highlight(text)
}

/// Number of annotations across all lines.
pub fn annotation_count(lines: &[HighlightedLine]) -> usize {
    lines
        .iter()
        .map(|line| line.iter().filter(|s| s.is_annotation()).count())
        .sum()
}

/// Annotation at reading-order index `index`.
pub fn annotation_at(lines: &[HighlightedLine], index: usize) -> Option<&Segment> {
    lines
        .iter()
        .flat_map(|line| line.iter())
        .filter(|s| s.is_annotation())
        .nth(index)
}

/// Render highlighted lines, reversing the annotation at `focused`.
pub fn to_lines(
    lines: &[HighlightedLine],
    theme: &ThemeManager,
    focused: Option<usize>,
) -> Vec<Line<'static>> {
    let mut annotation_index = 0;
    lines
        .iter()
        .map(|segments| {
            let spans: Vec<Span<'static>> = segments
                .iter()
                .map(|segment| match segment {
                    Segment::Plain(text) => {
                        Span::styled(text.clone(), theme.get_style(ComponentType::Text))
                    }
                    Segment::Annotated { text, polarity, .. } => {
                        let component = match polarity {
                            Polarity::Positive => ComponentType::Positive,
                            Polarity::Negative => ComponentType::Negative,
                        };
                        let mut style = theme.get_style(component);
                        if focused == Some(annotation_index) {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        annotation_index += 1;
                        Span::styled(text.clone(), style)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}
