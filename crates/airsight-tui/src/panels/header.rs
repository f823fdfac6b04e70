use super::{Applied, DataPanel, FetchContext, Panel, PanelStatus};
use crate::fetch::{PanelKind, SlotChange};
use crate::theme::{ComponentType, ThemeManager};
use airsight_core::models::AirlineInfo;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Widget};
use serde_json::Value;

/// Name and logo link of the selected airline, next to the search box.
#[derive(Debug)]
pub struct AirlineHeader {
    panel: Panel<AirlineInfo>,
}

impl Default for AirlineHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl AirlineHeader {
    pub fn new() -> Self {
        Self {
            panel: Panel::new(PanelKind::AirlineInfo),
        }
    }

    /// The search box is locked while this is true.
    pub fn is_loading(&self) -> bool {
        self.panel.is_loading()
    }

    pub fn info(&self) -> Option<&AirlineInfo> {
        self.panel.data()
    }
}

impl DataPanel for AirlineHeader {
    fn kind(&self) -> PanelKind {
        self.panel.kind()
    }

    fn status(&self) -> PanelStatus {
        self.panel.status()
    }

    fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange {
        self.panel.sync(airline, ctx)
    }

    fn apply(&mut self, generation: u64, result: Result<Value, String>) -> Applied {
        self.panel.apply(generation, result)
    }

    fn unmount(&mut self) {
        self.panel.unmount();
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.get_style(ComponentType::Border));
        let inner = block.inner(area);
        block.render(area, buf);

        let line = match (self.panel.status(), self.panel.data()) {
            (PanelStatus::Ready, Some(info)) => {
                let mut spans = vec![Span::styled(
                    format!("✈ {}", info.name),
                    theme.get_style(ComponentType::Title),
                )];
                if !info.image.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", info.image),
                        theme.get_style(ComponentType::Muted),
                    ));
                }
                Line::from(spans)
            }
            (PanelStatus::Loading, _) => Line::from(Span::styled(
                "Loading...",
                theme.get_style(ComponentType::Placeholder),
            )),
            (PanelStatus::NeedsSelection, _) => Line::from(Span::styled(
                "No airline selected",
                theme.get_style(ComponentType::Placeholder),
            )),
            _ => Line::from(Span::styled(
                "Airline not found",
                theme.get_style(ComponentType::Warning),
            )),
        };
        Paragraph::new(line).render(inner, buf);
    }
}
