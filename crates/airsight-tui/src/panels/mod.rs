//! Dashboard panels.
//!
//! Every panel owns one [`FetchSlot`] and decodes its own payload type. The
//! app drives them through [`DataPanel`]: `sync` on selection changes,
//! `apply` when a response arrives, `unmount` when the page is left.

mod header;
mod key_data;
mod map;
mod ratings;
mod reviews;
mod sentiment;
mod top_rated;
mod wordcloud;

pub use header::AirlineHeader;
pub use key_data::KeyDataPanel;
pub use map::CityMapPanel;
pub use ratings::{FeatureImportancePanel, RatingDistributionPanel, SubItemScoringPanel};
pub use reviews::ReviewsPanel;
pub use sentiment::{ResultView, SentimentPanel};
pub use top_rated::TopRatedPanel;
pub use wordcloud::ReviewWordcloudPanel;

use crate::chart::{ChartHost, ChartSpec, ObserverRegistry, TerminalChart};
use crate::events::AppEvent;
use crate::fetch::{is_empty_payload, FetchSlot, PanelKind, SlotChange};
use crate::theme::{ComponentType, ThemeManager};
use airsight_client::{decode, Gateway};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// What a panel currently shows in place of (or as) its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    NeedsSelection,
    Loading,
    Empty,
    Ready,
}

/// How an arriving response was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Superseded by a newer request and dropped
    Stale,
    Empty,
    /// Transport, status or decode failure; the message is for a toast
    Failed(String),
    Ready,
}

/// Handles panels need to start requests.
#[derive(Clone)]
pub struct FetchContext {
    pub gateway: Arc<dyn Gateway>,
    pub sender: mpsc::UnboundedSender<AppEvent>,
}

/// Uniform driver interface over the data panels.
pub trait DataPanel {
    fn kind(&self) -> PanelKind;

    fn status(&self) -> PanelStatus;

    /// Follow the selection; starts a request when the derived endpoint
    /// changed.
    fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange;

    fn apply(&mut self, generation: u64, result: Result<Value, String>) -> Applied;

    /// Drop the request and any chart; the next sync fetches again.
    fn unmount(&mut self);

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager);
}

/// Request state plus decoded payload of one panel.
#[derive(Debug)]
pub struct Panel<T> {
    slot: FetchSlot,
    status: PanelStatus,
    data: Option<T>,
}

impl<T: DeserializeOwned> Panel<T> {
    pub fn new(kind: PanelKind) -> Self {
        Self {
            slot: FetchSlot::new(kind),
            status: Self::idle_status(kind),
            data: None,
        }
    }

    fn idle_status(kind: PanelKind) -> PanelStatus {
        if kind.needs_selection() {
            PanelStatus::NeedsSelection
        } else {
            PanelStatus::Loading
        }
    }

    pub fn kind(&self) -> PanelKind {
        self.slot.kind()
    }

    pub fn status(&self) -> PanelStatus {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == PanelStatus::Loading
    }

    pub fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange {
        let kind = self.kind();
        let change = self
            .slot
            .sync(kind.endpoint(airline), &ctx.gateway, &ctx.sender);
        match change {
            SlotChange::Unchanged => {}
            SlotChange::Cleared => {
                self.status = PanelStatus::NeedsSelection;
                self.data = None;
            }
            SlotChange::Started(_) => {
                self.status = PanelStatus::Loading;
                self.data = None;
            }
        }
        change
    }

    pub fn apply(&mut self, generation: u64, result: Result<Value, String>) -> Applied {
        if !self.slot.accept(generation) {
            return Applied::Stale;
        }
        let Some(endpoint) = self.slot.endpoint().cloned() else {
            return Applied::Stale;
        };
        self.data = None;
        self.status = PanelStatus::Empty;

        let value = match result {
            Ok(value) => value,
            Err(message) => {
                warn!(panel = ?self.kind(), path = %endpoint, error = %message, "Panel request failed");
                return Applied::Failed(message);
            }
        };
        if is_empty_payload(&value) {
            debug!(panel = ?self.kind(), path = %endpoint, "Empty payload");
            return Applied::Empty;
        }
        match decode::<T>(&endpoint, value) {
            Ok(data) => {
                self.data = Some(data);
                self.status = PanelStatus::Ready;
                Applied::Ready
            }
            Err(err) => {
                warn!(panel = ?self.kind(), path = %endpoint, error = %err, "Could not decode payload");
                Applied::Failed(err.to_string())
            }
        }
    }

    /// Mark a decoded payload as having nothing to draw.
    pub fn mark_empty(&mut self) {
        self.data = None;
        self.status = PanelStatus::Empty;
    }

    pub fn unmount(&mut self) {
        self.slot.reset();
        self.status = Self::idle_status(self.kind());
        self.data = None;
    }
}

/// A panel whose payload is drawn by a mounted chart.
///
/// Every accepted payload mounts a new chart; anything else (empty payload,
/// failure, unmount) tears the mounted one down.
pub struct ChartedPanel<T> {
    panel: Panel<T>,
    chart: ChartHost,
}

impl<T: DeserializeOwned> ChartedPanel<T> {
    pub fn new(kind: PanelKind, registry: ObserverRegistry) -> Self {
        Self {
            panel: Panel::new(kind),
            chart: ChartHost::new(registry),
        }
    }

    pub fn panel(&self) -> &Panel<T> {
        &self.panel
    }

    pub fn is_mounted(&self) -> bool {
        self.chart.is_mounted()
    }

    pub fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange {
        let change = self.panel.sync(airline, ctx);
        if change != SlotChange::Unchanged {
            self.chart.unmount();
        }
        change
    }

    /// Accept a response and mount the chart `build` makes of it. `build`
    /// returning `None` means the payload has nothing to draw.
    pub fn apply(
        &mut self,
        generation: u64,
        result: Result<Value, String>,
        build: impl FnOnce(&T) -> Option<ChartSpec>,
    ) -> Applied {
        let applied = self.panel.apply(generation, result);
        if applied == Applied::Stale {
            return applied;
        }
        self.chart.unmount();
        if applied != Applied::Ready {
            return applied;
        }
        match self.panel.data().and_then(build) {
            Some(spec) => {
                self.chart.mount(Box::new(TerminalChart::new(spec)));
                Applied::Ready
            }
            None => {
                self.panel.mark_empty();
                Applied::Empty
            }
        }
    }

    /// Mount a chart rebuilt from the current payload, e.g. after an
    /// auxiliary resource arrived.
    pub fn remount(&mut self, build: impl FnOnce(&T) -> Option<ChartSpec>) {
        if let Some(spec) = self.panel.data().and_then(build) {
            self.chart.mount(Box::new(TerminalChart::new(spec)));
        }
    }

    pub fn unmount(&mut self) {
        self.chart.unmount();
        self.panel.unmount();
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        let Some(inner) = render_shell(area, buf, theme, self.panel.kind(), self.panel.status())
        else {
            return;
        };
        self.chart.render(inner, buf, theme);
    }
}

/// Placeholder line for a non-ready status.
pub fn placeholder_text(kind: PanelKind, status: PanelStatus) -> Option<String> {
    match status {
        PanelStatus::NeedsSelection => Some("Please search an airline first".to_string()),
        PanelStatus::Loading => Some("Loading...".to_string()),
        PanelStatus::Empty => Some(format!("No {} data available", kind.data_label())),
        PanelStatus::Ready => None,
    }
}

/// Bordered panel frame; returns the inner area.
pub fn frame(area: Rect, buf: &mut Buffer, theme: &ThemeManager, title: &str) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.get_style(ComponentType::Border))
        .title(Span::styled(
            format!(" {title} "),
            theme.get_style(ComponentType::Title),
        ));
    let inner = block.inner(area);
    block.render(area, buf);
    inner
}

/// Centered placeholder message.
pub fn render_placeholder(area: Rect, buf: &mut Buffer, theme: &ThemeManager, text: &str) {
    if area.height == 0 {
        return;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);
    Paragraph::new(Span::styled(
        text.to_string(),
        theme.get_style(ComponentType::Placeholder),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(rows[1], buf);
}

/// Frame plus placeholder. Returns the inner area when the panel is ready.
pub fn render_shell(
    area: Rect,
    buf: &mut Buffer,
    theme: &ThemeManager,
    kind: PanelKind,
    status: PanelStatus,
) -> Option<Rect> {
    let inner = frame(area, buf, theme, kind.title());
    match placeholder_text(kind, status) {
        Some(text) => {
            render_placeholder(inner, buf, theme, &text);
            None
        }
        None => Some(inner),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use airsight_client::MockGateway;

    pub fn context(mock: &MockGateway) -> (FetchContext, mpsc::UnboundedReceiver<AppEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            FetchContext {
                gateway: Arc::new(mock.clone()),
                sender,
            },
            receiver,
        )
    }

    /// Wait for the next fetch result and unpack it.
    pub async fn next_fetch(
        receiver: &mut mpsc::UnboundedReceiver<AppEvent>,
    ) -> (PanelKind, u64, Result<Value, String>) {
        loop {
            match receiver.recv().await {
                Some(AppEvent::Fetched {
                    panel,
                    generation,
                    result,
                }) => return (panel, generation, result),
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }
    }

    pub fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf.get(x, y).symbol.clone())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
