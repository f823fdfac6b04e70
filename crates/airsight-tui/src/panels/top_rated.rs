use super::{render_shell, Applied, DataPanel, FetchContext, Panel, PanelStatus};
use crate::fetch::{PanelKind, SlotChange};
use crate::table::TopRatedTable;
use crate::theme::ThemeManager;
use airsight_core::models::TopRatedAirline;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use serde_json::Value;

/// Global leaderboard; the only panel that does not follow the selection.
pub struct TopRatedPanel {
    panel: Panel<Vec<TopRatedAirline>>,
    table: TopRatedTable,
}

impl TopRatedPanel {
    pub fn new(page_size: usize) -> Self {
        Self {
            panel: Panel::new(PanelKind::TopRated),
            table: TopRatedTable::new(page_size),
        }
    }

    pub fn table(&self) -> &TopRatedTable {
        &self.table
    }

    pub fn next_page(&mut self) -> bool {
        self.table.pager_mut().next()
    }

    pub fn previous_page(&mut self) -> bool {
        self.table.pager_mut().previous()
    }
}

impl DataPanel for TopRatedPanel {
    fn kind(&self) -> PanelKind {
        PanelKind::TopRated
    }

    fn status(&self) -> PanelStatus {
        self.panel.status()
    }

    fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange {
        self.panel.sync(airline, ctx)
    }

    fn apply(&mut self, generation: u64, result: Result<Value, String>) -> Applied {
        let applied = self.panel.apply(generation, result);
        if applied != Applied::Stale {
            let rows = self.panel.data().cloned().unwrap_or_default();
            self.table.set_rows(rows);
        }
        applied
    }

    fn unmount(&mut self) {
        self.panel.unmount();
        self.table.set_rows(Vec::new());
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        if let Some(inner) = render_shell(area, buf, theme, self.kind(), self.status()) {
            self.table.render(inner, buf, theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use airsight_client::{Endpoint, MockGateway};
    use serde_json::json;

    fn leaderboard(count: usize) -> Value {
        Value::Array(
            (1..=count)
                .map(|i| {
                    json!({
                        "rank": format!("{i:02}"),
                        "name": format!("Airline {i}"),
                        "rating": 9.5 - i as f64 * 0.3,
                        "reviewCount": 1000 - i,
                        "color": "#0095ff"
                    })
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_top_rated_loads_without_selection_and_pages() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, leaderboard(7));
        let (ctx, mut rx) = context(&mock);
        let mut panel = TopRatedPanel::new(5);

        assert!(matches!(panel.sync(None, &ctx), SlotChange::Started(_)));
        let (kind, generation, result) = next_fetch(&mut rx).await;
        assert_eq!(kind, PanelKind::TopRated);
        assert_eq!(panel.apply(generation, result), Applied::Ready);
        assert_eq!(panel.table().page_rows().len(), 5);

        assert!(panel.next_page());
        assert_eq!(panel.table().page_rows().len(), 2);
        assert!(!panel.next_page());

        let area = Rect::new(0, 0, 70, 10);
        let mut buf = Buffer::empty(area);
        panel.render(area, &mut buf, &ThemeManager::new());
        let text = buffer_text(&buf);
        assert!(text.contains("Airline 6"));
        assert!(text.contains("Page 2 of 2"));
    }

    #[tokio::test]
    async fn test_selection_does_not_refetch_leaderboard() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, leaderboard(2));
        let (ctx, mut rx) = context(&mock);
        let mut panel = TopRatedPanel::new(5);

        panel.sync(None, &ctx);
        next_fetch(&mut rx).await;
        assert_eq!(panel.sync(Some("KLM"), &ctx), SlotChange::Unchanged);
        assert_eq!(mock.call_count(), 1);
    }
}
