//! Rating distribution, sub-item scoring and feature importance charts.

use super::{Applied, ChartedPanel, DataPanel, FetchContext, PanelStatus};
use crate::chart::{BarSpec, ChartSpec, HorizontalBarSpec, LineSpec, ObserverRegistry, Series};
use crate::fetch::{PanelKind, SlotChange};
use crate::theme::{hex_or, ThemeManager, AVERAGE_SERIES_HEX, RATING_SERIES_HEX, TARGET_SERIES_HEX};
use airsight_core::models::{
    feature_label, FeatureImportance, RatingDistribution, SubItemScoring, RATING_CATEGORIES,
    SUB_ITEM_CATEGORIES,
};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use serde_json::Value;
use std::collections::BTreeMap;

/// Ratings run from 0 to 5.
const RATING_VALUES: usize = 6;
const SUB_ITEM_MAX: f64 = 5.0;

/// Keys in `preferred` order first, then any others the payload carries.
fn ordered_keys<'a, V>(preferred: &[&'a str], maps: &[&'a BTreeMap<String, V>]) -> Vec<String> {
    let mut keys: Vec<String> = preferred
        .iter()
        .filter(|key| maps.iter().any(|map| map.contains_key(**key)))
        .map(|key| key.to_string())
        .collect();
    for map in maps {
        for key in map.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

/// One smooth line per category over ratings 0..=5.
pub fn rating_distribution_spec(data: &RatingDistribution) -> Option<ChartSpec> {
    let series: Vec<Series> = ordered_keys(&RATING_CATEGORIES, &[data])
        .into_iter()
        .enumerate()
        .filter_map(|(i, category)| {
            let values = data.get(&category)?;
            let mut values: Vec<f64> = values.iter().take(RATING_VALUES).copied().collect();
            values.resize(RATING_VALUES, 0.0);
            Some(Series {
                color: hex_or(RATING_SERIES_HEX[i % RATING_SERIES_HEX.len()], Color::Gray),
                name: category,
                values,
            })
        })
        .collect();
    if series.is_empty() {
        return None;
    }
    Some(ChartSpec::Line(LineSpec {
        x_labels: (0..RATING_VALUES).map(|r| r.to_string()).collect(),
        y_bounds: [0.0, 1.0],
        series,
        smooth: true,
    }))
}

/// Grouped bars, target airline against the average of all airlines.
pub fn sub_item_spec(data: &SubItemScoring, airline: &str) -> Option<ChartSpec> {
    let categories = ordered_keys(
        &SUB_ITEM_CATEGORIES,
        &[&data.target_airline, &data.average_score],
    );
    if categories.is_empty() {
        return None;
    }
    let column = |map: &BTreeMap<String, f64>| -> Vec<f64> {
        categories
            .iter()
            .map(|c| map.get(c).copied().unwrap_or_default())
            .collect()
    };
    let target_name = if airline.is_empty() {
        "Target airline".to_string()
    } else {
        airline.to_string()
    };
    Some(ChartSpec::Bars(BarSpec {
        series: vec![
            Series {
                name: target_name,
                color: hex_or(TARGET_SERIES_HEX, Color::Blue),
                values: column(&data.target_airline),
            },
            Series {
                name: "Average".to_string(),
                color: hex_or(AVERAGE_SERIES_HEX, Color::Green),
                values: column(&data.average_score),
            },
        ],
        categories,
        max: SUB_ITEM_MAX,
    }))
}

/// Horizontal bars, largest magnitude first.
pub fn feature_importance_spec(data: &FeatureImportance) -> Option<ChartSpec> {
    if data.is_empty() {
        return None;
    }
    Some(ChartSpec::HorizontalBars(HorizontalBarSpec::new(
        data.iter().map(|(key, value)| (feature_label(key), *value)),
    )))
}

pub struct RatingDistributionPanel {
    inner: ChartedPanel<RatingDistribution>,
}

impl RatingDistributionPanel {
    pub fn new(registry: ObserverRegistry) -> Self {
        Self {
            inner: ChartedPanel::new(PanelKind::RatingDistribution, registry),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }
}

impl DataPanel for RatingDistributionPanel {
    fn kind(&self) -> PanelKind {
        PanelKind::RatingDistribution
    }

    fn status(&self) -> PanelStatus {
        self.inner.panel().status()
    }

    fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange {
        self.inner.sync(airline, ctx)
    }

    fn apply(&mut self, generation: u64, result: Result<Value, String>) -> Applied {
        self.inner.apply(generation, result, rating_distribution_spec)
    }

    fn unmount(&mut self) {
        self.inner.unmount();
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        self.inner.render(area, buf, theme);
    }
}

pub struct SubItemScoringPanel {
    inner: ChartedPanel<SubItemScoring>,
    airline: String,
}

impl SubItemScoringPanel {
    pub fn new(registry: ObserverRegistry) -> Self {
        Self {
            inner: ChartedPanel::new(PanelKind::SubItemScoring, registry),
            airline: String::new(),
        }
    }
}

impl DataPanel for SubItemScoringPanel {
    fn kind(&self) -> PanelKind {
        PanelKind::SubItemScoring
    }

    fn status(&self) -> PanelStatus {
        self.inner.panel().status()
    }

    fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange {
        let change = self.inner.sync(airline, ctx);
        if change != SlotChange::Unchanged {
            self.airline = airline.unwrap_or_default().to_string();
        }
        change
    }

    fn apply(&mut self, generation: u64, result: Result<Value, String>) -> Applied {
        let airline = self.airline.as_str();
        self.inner
            .apply(generation, result, |data| sub_item_spec(data, airline))
    }

    fn unmount(&mut self) {
        self.inner.unmount();
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        self.inner.render(area, buf, theme);
    }
}

pub struct FeatureImportancePanel {
    inner: ChartedPanel<FeatureImportance>,
}

impl FeatureImportancePanel {
    pub fn new(registry: ObserverRegistry) -> Self {
        Self {
            inner: ChartedPanel::new(PanelKind::FeatureImportance, registry),
        }
    }
}

impl DataPanel for FeatureImportancePanel {
    fn kind(&self) -> PanelKind {
        PanelKind::FeatureImportance
    }

    fn status(&self) -> PanelStatus {
        self.inner.panel().status()
    }

    fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange {
        self.inner.sync(airline, ctx)
    }

    fn apply(&mut self, generation: u64, result: Result<Value, String>) -> Applied {
        self.inner.apply(generation, result, feature_importance_spec)
    }

    fn unmount(&mut self) {
        self.inner.unmount();
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        self.inner.render(area, buf, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use airsight_client::{Endpoint, MockGateway};
    use serde_json::json;

    #[test]
    fn test_rating_series_follow_category_order() {
        let data: RatingDistribution = serde_json::from_value(json!({
            "Wifi Connectivity": [0.1, 0.2, 0.3, 0.2, 0.1, 0.1],
            "Seat Comfort": [0.0, 0.1, 0.1, 0.2, 0.3, 0.3],
            "Legroom": [0.5]
        }))
        .unwrap();

        let Some(ChartSpec::Line(spec)) = rating_distribution_spec(&data) else {
            panic!("expected a line chart");
        };
        let names: Vec<&str> = spec.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Seat Comfort", "Wifi Connectivity", "Legroom"]);
        assert_eq!(spec.y_bounds, [0.0, 1.0]);
        assert_eq!(spec.x_labels.len(), 6);
        assert_eq!(spec.series[2].values, vec![0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(spec.smooth);
    }

    #[test]
    fn test_sub_item_groups_target_and_average() {
        let data: SubItemScoring = serde_json::from_value(json!({
            "target_airline": {"Seat Comfort": 4.1, "Ground Service": 3.2},
            "average_score": {"Seat Comfort": 3.5, "Wifi Connectivity": 2.0}
        }))
        .unwrap();

        let Some(ChartSpec::Bars(spec)) = sub_item_spec(&data, "KLM") else {
            panic!("expected bars");
        };
        assert_eq!(
            spec.categories,
            vec!["Seat Comfort", "Ground Service", "Wifi Connectivity"]
        );
        assert_eq!(spec.series[0].name, "KLM");
        assert_eq!(spec.series[0].values, vec![4.1, 3.2, 0.0]);
        assert_eq!(spec.series[1].values, vec![3.5, 0.0, 2.0]);
        assert_eq!(spec.max, 5.0);
    }

    #[test]
    fn test_empty_sub_items_have_no_chart() {
        assert!(sub_item_spec(&SubItemScoring::default(), "KLM").is_none());
    }

    #[test]
    fn test_feature_importance_sorted_by_magnitude() {
        let data: FeatureImportance = serde_json::from_value(json!({
            "seatComfort": 0.2,
            "valueForMoney": -0.9,
            "wifiConnectivity": 0.05
        }))
        .unwrap();
        let Some(ChartSpec::HorizontalBars(spec)) = feature_importance_spec(&data) else {
            panic!("expected horizontal bars");
        };
        assert_eq!(spec.items[0], ("Value for Money".to_string(), -0.9));
        assert_eq!(spec.items[2].0, "Wifi Connectivity");
    }

    #[tokio::test]
    async fn test_chart_remounted_per_response_and_released() {
        let registry = ObserverRegistry::new();
        let mock = MockGateway::new()
            .with_data(
                Endpoint::RatingDistribution("KLM".to_string()),
                json!({"Seat Comfort": [0.0, 0.1, 0.1, 0.2, 0.3, 0.3]}),
            )
            .with_data(Endpoint::RatingDistribution("Ghost".to_string()), json!({}));
        let (ctx, mut rx) = context(&mock);
        let mut panel = RatingDistributionPanel::new(registry.clone());

        panel.sync(Some("KLM"), &ctx);
        let (_, generation, result) = next_fetch(&mut rx).await;
        assert_eq!(panel.apply(generation, result), Applied::Ready);
        assert!(panel.is_mounted());
        assert_eq!(registry.live(), 1);

        let area = Rect::new(0, 0, 60, 14);
        let mut buf = Buffer::empty(area);
        panel.render(area, &mut buf, &ThemeManager::new());
        assert!(buffer_text(&buf).contains("Seat Comfort"));

        panel.sync(Some("Ghost"), &ctx);
        assert_eq!(registry.live(), 0);
        let (_, generation, result) = next_fetch(&mut rx).await;
        assert_eq!(panel.apply(generation, result), Applied::Empty);
        assert!(!panel.is_mounted());

        let mut buf = Buffer::empty(area);
        panel.render(area, &mut buf, &ThemeManager::new());
        assert!(buffer_text(&buf).contains("No rating distribution data available"));
    }

    #[tokio::test]
    async fn test_unmount_releases_observer() {
        let registry = ObserverRegistry::new();
        let mock = MockGateway::new().with_data(
            Endpoint::FeatureImportance("KLM".to_string()),
            json!({"seatComfort": 0.4}),
        );
        let (ctx, mut rx) = context(&mock);
        let mut panel = FeatureImportancePanel::new(registry.clone());

        panel.sync(Some("KLM"), &ctx);
        let (_, generation, result) = next_fetch(&mut rx).await;
        panel.apply(generation, result);
        assert_eq!(registry.live(), 1);

        panel.unmount();
        assert_eq!(registry.live(), 0);
        assert_eq!(panel.status(), PanelStatus::NeedsSelection);
    }
}
