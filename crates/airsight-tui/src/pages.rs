use crate::fetch::PanelKind;
use crate::theme::{ComponentType, ThemeManager};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Widget};

/// Pages reachable from the side menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Dashboard,
    ReviewData,
    AnalyticsTool,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Dashboard, Page::ReviewData, Page::AnalyticsTool];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::ReviewData => "Review Data",
            Page::AnalyticsTool => "Analytics Tool",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Page::Dashboard => 0,
            Page::ReviewData => 1,
            Page::AnalyticsTool => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Page> {
        Self::ALL.get(index).copied()
    }

    pub fn next(&self) -> Page {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Page {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Data panels mounted while the page is shown. The airline header is
    /// part of the shell and always mounted.
    pub fn panels(&self) -> &'static [PanelKind] {
        match self {
            Page::Dashboard => &[
                PanelKind::KeyData,
                PanelKind::RatingDistribution,
                PanelKind::SubItemScoring,
                PanelKind::ReviewWordcloud,
                PanelKind::TopRated,
                PanelKind::CityDistribution,
                PanelKind::FeatureImportance,
            ],
            Page::ReviewData => &[PanelKind::Reviews],
            Page::AnalyticsTool => &[],
        }
    }
}

/// Side menu with the active page highlighted.
pub fn render_menu(area: Rect, buf: &mut Buffer, theme: &ThemeManager, current: Page) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.get_style(ComponentType::Border))
        .title(Span::styled(" AirSight ", theme.get_style(ComponentType::Title)));
    let lines: Vec<Line> = Page::ALL
        .iter()
        .map(|page| {
            let (marker, style) = if *page == current {
                ("▶ ", theme.get_style(ComponentType::MenuSelected))
            } else {
                ("  ", theme.get_style(ComponentType::MenuItem))
            };
            Line::from(vec![
                Span::styled(marker, style),
                Span::styled(format!("{} {}", page.index() + 1, page.title()), style),
            ])
        })
        .collect();
    Paragraph::new(lines).block(block).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_cycling() {
        assert_eq!(Page::Dashboard.next(), Page::ReviewData);
        assert_eq!(Page::AnalyticsTool.next(), Page::Dashboard);
        assert_eq!(Page::Dashboard.previous(), Page::AnalyticsTool);
        assert_eq!(Page::from_index(2), Some(Page::AnalyticsTool));
        assert_eq!(Page::from_index(3), None);
    }

    #[test]
    fn test_panels_belong_to_one_page() {
        let mut seen = std::collections::HashSet::new();
        for page in Page::ALL {
            for kind in page.panels() {
                assert!(seen.insert(*kind), "{kind:?} listed twice");
            }
        }
        assert!(!seen.contains(&PanelKind::AirlineInfo));
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_menu_marks_current_page() {
        let area = Rect::new(0, 0, 22, 6);
        let mut buf = Buffer::empty(area);
        render_menu(area, &mut buf, &ThemeManager::new(), Page::ReviewData);

        let row: String = (0..area.width)
            .map(|x| buf.get(x, 2).symbol.clone())
            .collect();
        assert!(row.contains("▶ 2 Review Data"));
    }
}
