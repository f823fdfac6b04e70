//! Sentiment tool: free-text input and the result card.
//!
//! The result lives in the shared [`SelectionStore`]; this panel only
//! mirrors it. A submission remembers the store's sentiment revision when it
//! was sent and is discarded if the revision moved (reset or another
//! submission) before the answer came back.

use super::wordcloud::cloud_for;
use super::{frame, render_placeholder, Applied, FetchContext};
use crate::chart::{ChartHost, ChartSpec, ObserverRegistry, TerminalChart};
use crate::components::TextArea;
use crate::events::AppEvent;
use crate::highlight::{
    annotation_at, annotation_count, format_score, to_lines, HighlightedLine, Highlighter,
    Polarity, Segment,
};
use crate::theme::{ComponentType, ThemeManager, NEGATIVE_PALETTE_HEX, POSITIVE_PALETTE_HEX};
use airsight_client::{decode, Endpoint};
use airsight_core::models::SentimentResult;
use airsight_core::SelectionStore;
use rand::rngs::StdRng;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Page of the result card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultView {
    Text,
    Clouds,
}

pub struct SentimentPanel {
    store: SelectionStore,
    input: TextArea,
    loading: bool,
    pending: Option<JoinHandle<()>>,
    /// Store revision the mirrored result belongs to
    seen_revision: Option<u64>,
    result: Option<SentimentResult>,
    highlighted: Vec<HighlightedLine>,
    focus: Option<usize>,
    view: ResultView,
    positive: ChartHost,
    negative: ChartHost,
    rng: StdRng,
}

impl SentimentPanel {
    pub fn new(store: SelectionStore, registry: ObserverRegistry, rng: StdRng) -> Self {
        let mut panel = Self {
            store,
            input: TextArea::new(),
            loading: false,
            pending: None,
            seen_revision: None,
            result: None,
            highlighted: Vec::new(),
            focus: None,
            view: ResultView::Text,
            positive: ChartHost::new(registry.clone()),
            negative: ChartHost::new(registry),
            rng,
        };
        panel.refresh_from_store();
        panel
    }

    pub fn input(&self) -> &TextArea {
        &self.input
    }

    /// Editing is refused while a submission is in flight.
    pub fn input_mut(&mut self) -> Option<&mut TextArea> {
        if self.loading {
            None
        } else {
            Some(&mut self.input)
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&SentimentResult> {
        self.result.as_ref()
    }

    pub fn view(&self) -> ResultView {
        self.view
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Send the trimmed input for analysis. False when there is nothing to
    /// send or a submission is already running.
    pub fn submit(&mut self, ctx: &FetchContext) -> bool {
        let text = self.input.content().trim().to_string();
        if text.is_empty() || self.loading {
            return false;
        }
        let revision = self.store.sentiment_revision();
        let gateway = Arc::clone(&ctx.gateway);
        let sender = ctx.sender.clone();
        info!(chars = text.chars().count(), revision, "Submitting text for sentiment analysis");
        self.loading = true;
        self.pending = Some(tokio::spawn(async move {
            let result = gateway
                .submit_sentiment(&text)
                .await
                .map_err(|e| e.toast_message());
            let _ = sender.send(AppEvent::Submitted { revision, result });
        }));
        true
    }

    /// Handle the answer of a submission sent at store revision `revision`.
    pub fn on_submitted(&mut self, revision: u64, result: Result<Value, String>) -> Applied {
        if revision != self.store.sentiment_revision() {
            debug!(
                revision,
                current = self.store.sentiment_revision(),
                "Dropping superseded sentiment result"
            );
            return Applied::Stale;
        }
        self.pending = None;
        self.loading = false;
        let value = match result {
            Ok(value) => value,
            Err(message) => {
                warn!(error = %message, "Sentiment submission failed");
                return Applied::Failed(message);
            }
        };
        match decode::<SentimentResult>(&Endpoint::SentimentSubmit, value) {
            Ok(result) => {
                self.store.set_sentiment(result);
                self.refresh_from_store();
                Applied::Ready
            }
            Err(err) => {
                warn!(error = %err, "Could not decode sentiment result");
                Applied::Failed(err.to_string())
            }
        }
    }

    /// Clear the input and the stored result, dropping any submission in
    /// flight.
    pub fn reset(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.loading = false;
        self.input.clear();
        self.store.reset_sentiment();
        self.refresh_from_store();
        info!("Sentiment tool reset");
    }

    /// Mirror the store's result when it changed since the last look.
    pub fn refresh_from_store(&mut self) {
        let revision = self.store.sentiment_revision();
        if self.seen_revision == Some(revision) {
            return;
        }
        self.seen_revision = Some(revision);
        self.result = self.store.sentiment();
        self.focus = None;
        self.positive.unmount();
        self.negative.unmount();

        match &self.result {
            Some(result) => {
                self.highlighted =
                    Highlighter::new(&result.pos_dict, &result.neg_dict).highlight(&result.text);
                let positive = cloud_for(&result.pos_dict, &POSITIVE_PALETTE_HEX, &mut self.rng);
                let negative = cloud_for(&result.neg_dict, &NEGATIVE_PALETTE_HEX, &mut self.rng);
                self.positive
                    .mount(Box::new(TerminalChart::new(ChartSpec::WordCloud(positive))));
                self.negative
                    .mount(Box::new(TerminalChart::new(ChartSpec::WordCloud(negative))));
            }
            None => self.highlighted.clear(),
        }
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            ResultView::Text => ResultView::Clouds,
            ResultView::Clouds => ResultView::Text,
        };
    }

    /// Move the annotation focus forward, wrapping around.
    pub fn focus_next(&mut self) {
        let count = annotation_count(&self.highlighted);
        if count == 0 {
            self.focus = None;
            return;
        }
        self.focus = Some(match self.focus {
            Some(index) => (index + 1) % count,
            None => 0,
        });
    }

    pub fn focus_previous(&mut self) {
        let count = annotation_count(&self.highlighted);
        if count == 0 {
            self.focus = None;
            return;
        }
        self.focus = Some(match self.focus {
            Some(0) | None => count - 1,
            Some(index) => index - 1,
        });
    }

    /// Footer text describing the focused annotation.
    pub fn focus_detail(&self) -> Option<String> {
        let index = self.focus?;
        match annotation_at(&self.highlighted, index)? {
            Segment::Annotated {
                text,
                polarity,
                score,
            } => {
                let label = match polarity {
                    Polarity::Positive => "positive",
                    Polarity::Negative => "negative",
                };
                Some(format!("\"{text}\" {label} {}", format_score(*score)))
            }
            Segment::Plain(_) => None,
        }
    }

    pub fn render_input(&self, area: Rect, buf: &mut Buffer, theme: &ThemeManager, focused: bool) {
        self.input.render(area, buf, theme, focused, self.loading);
    }

    pub fn render_result(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        let inner = frame(area, buf, theme, "Sentiment Result");
        let Some(result) = self.result.as_ref() else {
            let text = if self.loading {
                "Analyzing..."
            } else {
                "Submit a review to see its sentiment"
            };
            render_placeholder(inner, buf, theme, text);
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let label_style = if result.score < 0.0 {
            theme.get_style(ComponentType::Negative)
        } else {
            theme.get_style(ComponentType::Positive)
        };
        Paragraph::new(Line::from(vec![
            Span::styled("Sentiment: ", theme.get_style(ComponentType::Muted)),
            Span::styled(result.sent_lab.to_string(), label_style),
            Span::styled(
                format!("  score {}", format_score(result.score)),
                theme.get_style(ComponentType::Text),
            ),
        ]))
        .render(rows[0], buf);

        match self.view {
            ResultView::Text => {
                Paragraph::new(to_lines(&self.highlighted, theme, self.focus))
                    .wrap(Wrap { trim: false })
                    .render(rows[1], buf);
            }
            ResultView::Clouds => {
                let halves = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
                    .split(rows[1]);
                self.positive.render(halves[0], buf, theme);
                self.negative.render(halves[1], buf, theme);
            }
        }

        let footer = self.focus_detail().unwrap_or_else(|| match self.view {
            ResultView::Text => "Tab: word clouds  ← →: move between words".to_string(),
            ResultView::Clouds => "Tab: highlighted text".to_string(),
        });
        Paragraph::new(Span::styled(footer, theme.get_style(ComponentType::Muted)))
            .render(rows[2], buf);
    }
}

impl Drop for SentimentPanel {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use airsight_client::MockGateway;
    use rand::SeedableRng;
    use serde_json::json;
    use std::time::Duration;

    fn panel(store: &SelectionStore, registry: &ObserverRegistry) -> SentimentPanel {
        SentimentPanel::new(store.clone(), registry.clone(), StdRng::seed_from_u64(3))
    }

    fn type_text(panel: &mut SentimentPanel, text: &str) {
        let input = panel.input_mut().unwrap();
        for c in text.chars() {
            input.insert_char(c);
        }
    }

    async fn next_submitted(
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<AppEvent>,
    ) -> (u64, Result<Value, String>) {
        loop {
            match rx.recv().await {
                Some(AppEvent::Submitted { revision, result }) => return (revision, result),
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }
    }

    fn analysis() -> Value {
        json!({
            "text": "Great seat, bad food",
            "score": 0.41,
            "sent_lab": "positive",
            "pos_dict": {"great": {"score": 0.812}},
            "neg_dict": {"bad": {"score": -0.5}}
        })
    }

    #[tokio::test]
    async fn test_submit_stores_result_and_highlights() {
        let store = SelectionStore::new();
        let registry = ObserverRegistry::new();
        let mock = MockGateway::new().with_data(Endpoint::SentimentSubmit, analysis());
        let (ctx, mut rx) = context(&mock);
        let mut panel = panel(&store, &registry);

        type_text(&mut panel, "  Great seat, bad food  ");
        assert!(panel.submit(&ctx));
        assert!(panel.is_loading());
        assert!(panel.input_mut().is_none());

        let (revision, result) = next_submitted(&mut rx).await;
        assert_eq!(panel.on_submitted(revision, result), Applied::Ready);
        assert_eq!(mock.submissions(), vec!["Great seat, bad food".to_string()]);
        assert_eq!(store.sentiment().map(|r| r.score), Some(0.41));
        assert_eq!(registry.live(), 2);

        panel.focus_next();
        assert_eq!(panel.focus_detail().as_deref(), Some("\"Great\" positive 0.812"));
        panel.focus_next();
        assert_eq!(panel.focus_detail().as_deref(), Some("\"bad\" negative -0.500"));
        panel.focus_next();
        assert_eq!(panel.focus(), Some(0));

        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        panel.render_result(area, &mut buf, &ThemeManager::new());
        let text = buffer_text(&buf);
        assert!(text.contains("Great seat, bad food"));
        assert!(text.contains("positive"));
    }

    #[tokio::test]
    async fn test_blank_input_is_not_submitted() {
        let store = SelectionStore::new();
        let mock = MockGateway::new();
        let (ctx, _rx) = context(&mock);
        let mut panel = panel(&store, &ObserverRegistry::new());

        type_text(&mut panel, "   ");
        assert!(!panel.submit(&ctx));
        tokio::task::yield_now().await;
        assert!(mock.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_before_response_leaves_result_cleared() {
        let store = SelectionStore::new();
        let mock = MockGateway::new().with_data(Endpoint::SentimentSubmit, analysis());
        mock.set_delay(Endpoint::SentimentSubmit, Duration::from_secs(2));
        let (ctx, mut rx) = context(&mock);
        let mut panel = panel(&store, &ObserverRegistry::new());

        type_text(&mut panel, "ok");
        let revision = store.sentiment_revision();
        assert!(panel.submit(&ctx));
        panel.reset();

        assert!(!panel.is_loading());
        assert!(panel.input().is_blank());
        assert!(store.sentiment().is_none());

        // Even an answer that slipped through the abort is refused
        assert_eq!(panel.on_submitted(revision, Ok(analysis())), Applied::Stale);
        assert!(store.sentiment().is_none());

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_submission_unlocks_input() {
        let store = SelectionStore::new();
        let mock = MockGateway::new();
        mock.set_status(Endpoint::SentimentSubmit, 503, "model offline");
        let (ctx, mut rx) = context(&mock);
        let mut panel = panel(&store, &ObserverRegistry::new());

        type_text(&mut panel, "fine");
        panel.submit(&ctx);
        let (revision, result) = next_submitted(&mut rx).await;
        match panel.on_submitted(revision, result) {
            Applied::Failed(message) => assert!(message.contains("model offline")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!panel.is_loading());
        assert!(panel.input_mut().is_some());
        assert!(store.sentiment().is_none());
    }

    #[test]
    fn test_result_written_elsewhere_is_mirrored() {
        let store = SelectionStore::new();
        let mut panel = panel(&store, &ObserverRegistry::new());
        assert!(panel.result().is_none());

        store.set_sentiment(serde_json::from_value(analysis()).unwrap());
        panel.refresh_from_store();
        assert_eq!(panel.result().map(|r| r.sent_lab.as_str()), Some("positive"));

        panel.toggle_view();
        assert_eq!(panel.view(), ResultView::Clouds);
    }
}
