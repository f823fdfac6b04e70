use super::{render_shell, Applied, DataPanel, FetchContext, Panel, PanelStatus};
use crate::chart::{ChartHost, ChartSpec, ObserverRegistry, TerminalChart};
use crate::fetch::{PanelKind, SlotChange};
use crate::theme::{palette, ComponentType, ThemeManager, NEGATIVE_PALETTE_HEX, POSITIVE_PALETTE_HEX};
use crate::wordcloud::WordCloud;
use airsight_core::models::{WordDict, WordcloudData};
use rand::rngs::StdRng;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use serde_json::Value;

/// Cloud of one polarity's words, colored from `hexes`.
pub fn cloud_for(dict: &WordDict, hexes: &[&str], rng: &mut StdRng) -> WordCloud {
    WordCloud::new(
        dict.iter().map(|(word, score)| (word.clone(), score.score)),
        &palette(hexes),
        rng,
    )
}

fn split_with_caption(area: Rect) -> (Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    (rows[0], rows[1])
}

/// Positive and negative clouds of an airline's reviews with a score summary.
pub struct ReviewWordcloudPanel {
    panel: Panel<WordcloudData>,
    positive: ChartHost,
    negative: ChartHost,
    rng: StdRng,
}

impl ReviewWordcloudPanel {
    pub fn new(registry: ObserverRegistry, rng: StdRng) -> Self {
        Self {
            panel: Panel::new(PanelKind::ReviewWordcloud),
            positive: ChartHost::new(registry.clone()),
            negative: ChartHost::new(registry),
            rng,
        }
    }

    pub fn data(&self) -> Option<&WordcloudData> {
        self.panel.data()
    }

    fn release_charts(&mut self) {
        self.positive.unmount();
        self.negative.unmount();
    }

    fn summary_lines(data: &WordcloudData, theme: &ThemeManager) -> Vec<Line<'static>> {
        let muted = theme.get_style(ComponentType::Muted);
        let row = |label: &'static str, score: f64, count: u64, style| {
            vec![
                Line::from(Span::styled(label, muted)),
                Line::from(Span::styled(format!("{score:.3}"), style)),
                Line::from(Span::styled(format!("{count} words"), muted)),
            ]
        };
        let mut lines = row(
            "Positive",
            data.pos_score,
            data.pos_count,
            theme.get_style(ComponentType::Positive),
        );
        lines.extend(row(
            "Negative",
            data.neg_score,
            data.neg_count,
            theme.get_style(ComponentType::Negative),
        ));
        lines.extend(row(
            "Overall",
            data.overall_score,
            data.overall_count,
            theme.get_style(ComponentType::TileValue),
        ));
        lines.push(Line::from(Span::styled(
            format!("{} reviews", data.review_count),
            muted,
        )));
        lines
    }
}

impl DataPanel for ReviewWordcloudPanel {
    fn kind(&self) -> PanelKind {
        PanelKind::ReviewWordcloud
    }

    fn status(&self) -> PanelStatus {
        self.panel.status()
    }

    fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange {
        let change = self.panel.sync(airline, ctx);
        if change != SlotChange::Unchanged {
            self.release_charts();
        }
        change
    }

    fn apply(&mut self, generation: u64, result: Result<Value, String>) -> Applied {
        let applied = self.panel.apply(generation, result);
        if applied == Applied::Stale {
            return applied;
        }
        self.release_charts();
        if applied != Applied::Ready {
            return applied;
        }
        let Some(data) = self.panel.data() else {
            return Applied::Empty;
        };
        if data.pos_dict.is_empty() && data.neg_dict.is_empty() {
            self.panel.mark_empty();
            return Applied::Empty;
        }
        let positive = cloud_for(&data.pos_dict, &POSITIVE_PALETTE_HEX, &mut self.rng);
        let negative = cloud_for(&data.neg_dict, &NEGATIVE_PALETTE_HEX, &mut self.rng);
        self.positive
            .mount(Box::new(TerminalChart::new(ChartSpec::WordCloud(positive))));
        self.negative
            .mount(Box::new(TerminalChart::new(ChartSpec::WordCloud(negative))));
        Applied::Ready
    }

    fn unmount(&mut self) {
        self.release_charts();
        self.panel.unmount();
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        let Some(inner) = render_shell(area, buf, theme, self.kind(), self.status()) else {
            return;
        };
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(2, 5),
                Constraint::Ratio(2, 5),
                Constraint::Ratio(1, 5),
            ])
            .split(inner);

        let (caption, body) = split_with_caption(columns[0]);
        Paragraph::new(Span::styled("Positive", theme.get_style(ComponentType::Positive)))
            .render(caption, buf);
        self.positive.render(body, buf, theme);

        let (caption, body) = split_with_caption(columns[1]);
        Paragraph::new(Span::styled("Negative", theme.get_style(ComponentType::Negative)))
            .render(caption, buf);
        self.negative.render(body, buf, theme);

        if let Some(data) = self.panel.data() {
            Paragraph::new(Self::summary_lines(data, theme)).render(columns[2], buf);
        }
    }
}
