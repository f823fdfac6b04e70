use super::{render_shell, Applied, DataPanel, FetchContext, Panel, PanelStatus};
use crate::fetch::{PanelKind, SlotChange};
use crate::layout::utils::{equal_columns, equal_rows};
use crate::theme::{ComponentType, ThemeManager};
use airsight_core::models::KeyData;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};
use serde_json::Value;

/// One metric tile: label, headline value and a caption underneath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub label: &'static str,
    pub value: String,
    pub caption: String,
}

impl Tile {
    fn new(label: &'static str, value: impl ToString, caption: impl Into<String>) -> Self {
        let value = value.to_string();
        Self {
            label,
            value: if value.is_empty() { "-".to_string() } else { value },
            caption: caption.into(),
        }
    }
}

/// The eight tiles in display order.
pub fn tiles(data: &KeyData) -> Vec<Tile> {
    vec![
        Tile::new(
            "Top Rated Item",
            &data.top_rated_item.score,
            data.top_rated_item.category.to_string(),
        ),
        Tile::new(
            "Total Rated Users",
            &data.total_rated_users.count,
            format!("median {}", data.total_rated_users.medium_number),
        ),
        Tile::new(
            "Overall Score",
            &data.overall_score.score,
            data.overall_score.rank.to_string(),
        ),
        Tile::new(
            "Lowest Rated Item",
            &data.lowest_rated_item.score,
            data.lowest_rated_item.category.to_string(),
        ),
        Tile::new("Preferred Seat Type", &data.preferred_seat_type, ""),
        Tile::new("Preferred Route", &data.preferred_route, ""),
        Tile::new("Review Time", &data.review_time, ""),
        Tile::new("Flown Time", &data.flown_time, ""),
    ]
}

#[derive(Debug)]
pub struct KeyDataPanel {
    panel: Panel<KeyData>,
}

impl Default for KeyDataPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDataPanel {
    pub fn new() -> Self {
        Self {
            panel: Panel::new(PanelKind::KeyData),
        }
    }

    fn render_tile(tile: &Tile, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        let lines = vec![
            Line::from(Span::styled(tile.label, theme.get_style(ComponentType::Muted))),
            Line::from(Span::styled(
                tile.value.clone(),
                theme.get_style(ComponentType::TileValue),
            )),
            Line::from(Span::styled(
                tile.caption.clone(),
                theme.get_style(ComponentType::Text),
            )),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

impl DataPanel for KeyDataPanel {
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
        let Some(inner) = render_shell(area, buf, theme, self.kind(), self.status()) else {
            return;
        };
        let Some(data) = self.panel.data() else {
            return;
        };
        let tiles = tiles(data);
        let cells = equal_rows(inner, 2)
            .into_iter()
            .flat_map(|row| equal_columns(row, 4));
        for (tile, cell) in tiles.iter().zip(cells) {
            Self::render_tile(tile, cell, buf, theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use airsight_client::{Endpoint, MockGateway};
    use serde_json::json;

    #[test]
    fn test_tiles_fill_missing_values() {
        let data: KeyData = serde_json::from_value(json!({
            "total_rated_users": {"count": 1834, "medium_number": 7},
            "overall_score": {"score": "7.9 / 10", "rank": "3 out of 80 airlines"}
        }))
        .unwrap();
        let tiles = tiles(&data);

        assert_eq!(tiles.len(), 8);
        assert_eq!(tiles[0].value, "-");
        assert_eq!(tiles[1].value, "1834");
        assert_eq!(tiles[1].caption, "median 7");
        assert_eq!(tiles[2].caption, "3 out of 80 airlines");
        assert_eq!(tiles[6].label, "Review Time");
    }

    #[tokio::test]
    async fn test_key_data_renders_tiles() {
        let mock = MockGateway::new().with_data(
            Endpoint::KeyData("KLM".to_string()),
            json!({
                "top_rated_item": {"score": "4.2 / 5", "category": "Seat Comfort"},
                "preferred_route": "AMS to JFK"
            }),
        );
        let (ctx, mut rx) = context(&mock);
        let mut panel = KeyDataPanel::new();
        panel.sync(Some("KLM"), &ctx);
        let (_, generation, result) = next_fetch(&mut rx).await;
        assert_eq!(panel.apply(generation, result), Applied::Ready);

        let area = Rect::new(0, 0, 120, 10);
        let mut buf = Buffer::empty(area);
        panel.render(area, &mut buf, &ThemeManager::new());
        let text = buffer_text(&buf);
        assert!(text.contains("4.2 / 5"));
        assert!(text.contains("Seat Comfort"));
        assert!(text.contains("AMS to JFK"));
    }
}
