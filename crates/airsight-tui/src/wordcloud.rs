//! Terminal word clouds.
//!
//! A terminal cell has one font size, so weight is shown through emphasis
//! tiers and placement: heavier words are styled louder and packed into the
//! middle rows.

use rand::seq::SliceRandom;
use rand::Rng;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Large,
    Medium,
    Small,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloudWord {
    pub text: String,
    pub weight: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedWord {
    pub index: usize,
    /// Offset from the left edge of the laid-out area
    pub x: u16,
    /// Offset from the top edge of the laid-out area
    pub y: u16,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordCloud {
    words: Vec<CloudWord>,
    placed: Vec<PlacedWord>,
}

/// Weight used for a word score: its magnitude, or 1 when that is zero.
pub fn weight_for(score: f64) -> f64 {
    let magnitude = score.abs();
    if magnitude.is_finite() && magnitude > 0.0 {
        magnitude
    } else {
        1.0
    }
}

impl WordCloud {
    /// Build a cloud, coloring every word independently with a uniform pick
    /// from `palette`.
    pub fn new<R, I>(entries: I, palette: &[Color], rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut words: Vec<CloudWord> = entries
            .into_iter()
            .filter(|(text, _)| !text.trim().is_empty())
            .map(|(text, score)| CloudWord {
                text,
                weight: weight_for(score),
                color: palette.choose(rng).copied().unwrap_or(Color::Gray),
            })
            .collect();
        words.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        Self {
            words,
            placed: Vec::new(),
        }
    }

    pub fn words(&self) -> &[CloudWord] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn placed(&self) -> &[PlacedWord] {
        &self.placed
    }

    fn emphasis(&self, weight: f64) -> Emphasis {
        let max = self.words.first().map(|w| w.weight).unwrap_or(1.0);
        let ratio = if max > 0.0 { weight / max } else { 0.0 };
        if ratio > 0.66 {
            Emphasis::Large
        } else if ratio > 0.33 {
            Emphasis::Medium
        } else {
            Emphasis::Small
        }
    }

    fn display_text(word: &CloudWord, emphasis: Emphasis) -> String {
        match emphasis {
            Emphasis::Large => word.text.to_uppercase(),
            _ => word.text.clone(),
        }
    }

    /// Pack words into rows for `area`, heaviest rows nearest the middle.
    /// Words that do not fit are left out.
    pub fn layout(&mut self, area: Rect) {
        self.placed.clear();
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = area.width as usize;

        let mut rows: Vec<Vec<(usize, usize)>> = Vec::new();
        let mut current: Vec<(usize, usize)> = Vec::new();
        let mut used = 0usize;
        for (index, word) in self.words.iter().enumerate() {
            // Cells, not chars: CJK glyphs take two columns
            let len = Self::display_text(word, self.emphasis(word.weight)).width();
            if len > width {
                continue;
            }
            let needed = if current.is_empty() { len } else { used + 1 + len };
            if needed > width {
                rows.push(std::mem::take(&mut current));
                used = 0;
            }
            used = if current.is_empty() { len } else { used + 1 + len };
            current.push((index, len));
        }
        if !current.is_empty() {
            rows.push(current);
        }
        rows.truncate(area.height as usize);

        // Row 0 holds the heaviest words; alternate below and above it.
        let middle = (area.height as usize).saturating_sub(1) / 2;
        for (rank, row) in rows.iter().enumerate() {
            let offset = (rank + 1) / 2;
            let y = if rank % 2 == 1 {
                middle + offset
            } else {
                middle.saturating_sub(offset)
            };
            if y >= area.height as usize {
                continue;
            }
            let row_width: usize = row.iter().map(|(_, len)| *len).sum::<usize>() + row.len() - 1;
            let mut x = (width.saturating_sub(row_width)) / 2;
            for (index, len) in row {
                let emphasis = self.emphasis(self.words[*index].weight);
                self.placed.push(PlacedWord {
                    index: *index,
                    x: x as u16,
                    y: y as u16,
                    emphasis,
                });
                x += len + 1;
            }
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        for placed in &self.placed {
            if placed.x >= area.width || placed.y >= area.height {
                continue;
            }
            let word = &self.words[placed.index];
            let style = match placed.emphasis {
                Emphasis::Large => Style::default()
                    .fg(word.color)
                    .add_modifier(Modifier::BOLD),
                Emphasis::Medium => Style::default().fg(word.color),
                Emphasis::Small => Style::default().fg(word.color).add_modifier(Modifier::DIM),
            };
            buf.set_stringn(
                area.x + placed.x,
                area.y + placed.y,
                Self::display_text(word, placed.emphasis),
                (area.width - placed.x) as usize,
                style,
            );
        }
    }
}
