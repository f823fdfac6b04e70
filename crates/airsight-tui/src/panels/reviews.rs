use super::{render_shell, Applied, DataPanel, FetchContext, Panel, PanelStatus};
use crate::fetch::{PanelKind, SlotChange};
use crate::table::ReviewTable;
use crate::theme::ThemeManager;
use airsight_core::models::ReviewRow;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use serde_json::Value;

/// Review browser of the Review Data page.
pub struct ReviewsPanel {
    panel: Panel<Vec<ReviewRow>>,
    table: ReviewTable,
}

impl ReviewsPanel {
    pub fn new(page_size: usize) -> Self {
        Self {
            panel: Panel::new(PanelKind::Reviews),
            table: ReviewTable::new(page_size),
        }
    }

    pub fn table(&self) -> &ReviewTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ReviewTable {
        &mut self.table
    }
}

impl DataPanel for ReviewsPanel {
    fn kind(&self) -> PanelKind {
        PanelKind::Reviews
    }

    fn status(&self) -> PanelStatus {
        self.panel.status()
    }

    fn sync(&mut self, airline: Option<&str>, ctx: &FetchContext) -> SlotChange {
        let change = self.panel.sync(airline, ctx);
        if change != SlotChange::Unchanged {
            self.table.clear();
        }
        change
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
        self.table.clear();
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        if let Some(inner) = render_shell(area, buf, theme, self.kind(), self.status()) {
            self.table.render(inner, buf, theme);
        }
    }
}
