use super::{Applied, ChartedPanel, DataPanel, FetchContext, PanelStatus};
use crate::chart::{ChartSpec, GeoSpec, ObserverRegistry};
use crate::fetch::{PanelKind, SlotChange};
use crate::geo::WorldGeometry;
use crate::theme::{hex_or, ThemeManager};
use airsight_core::models::CityPoint;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use serde_json::Value;
use std::sync::Arc;

const MARKER_HEX: &str = "#fbbf24";

fn geo_spec(points: &[CityPoint], geometry: Option<&Arc<WorldGeometry>>) -> Option<ChartSpec> {
    if points.is_empty() {
        return None;
    }
    Some(ChartSpec::Geo(GeoSpec {
        points: points.to_vec(),
        geometry: geometry.cloned(),
        marker: hex_or(MARKER_HEX, Color::Yellow),
    }))
}

/// Flight distribution scatter over the world outline.
pub struct CityMapPanel {
    inner: ChartedPanel<Vec<CityPoint>>,
    geometry: Option<Arc<WorldGeometry>>,
}

impl CityMapPanel {
    pub fn new(registry: ObserverRegistry) -> Self {
        Self {
            inner: ChartedPanel::new(PanelKind::CityDistribution, registry),
            geometry: None,
        }
    }

    /// Install loaded map geometry; a mounted map is rebuilt to use it.
    pub fn set_geometry(&mut self, geometry: Arc<WorldGeometry>) {
        self.geometry = Some(geometry);
        if self.inner.is_mounted() {
            let geometry = self.geometry.as_ref();
            self.inner.remount(|points| geo_spec(points, geometry));
        }
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }
}

impl DataPanel for CityMapPanel {
    fn kind(&self) -> PanelKind {
        PanelKind::CityDistribution
    }

    fn status(&self) -> PanelStatus {
        self.inner.panel().status()
    }

    fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange {
        self.inner.sync(airline, ctx)
    }

    fn apply(&mut self, generation: u64, result: Result<Value, String>) -> Applied {
        let geometry = self.geometry.as_ref();
        self.inner
            .apply(generation, result, |points| geo_spec(points, geometry))
    }

    fn unmount(&mut self) {
        self.inner.unmount();
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        self.inner.render(area, buf, theme);
    }
}
