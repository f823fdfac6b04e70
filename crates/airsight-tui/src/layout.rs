use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Layout configuration for different screen sizes
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Minimum terminal width required
    pub min_width: u16,
    /// Minimum terminal height required
    pub min_height: u16,
    /// Top bar height in lines
    pub top_bar_height: u16,
    /// Side menu width in columns
    pub menu_width: u16,
    /// Status bar height
    pub status_bar_height: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_width: 80,
            min_height: 24,
            top_bar_height: 3,
            menu_width: 20,
            status_bar_height: 1,
        }
    }
}

/// Computed areas of the application shell
#[derive(Debug, Clone, PartialEq)]
pub struct AppLayout {
    /// Full terminal area
    pub full_area: Rect,
    /// Airline search box
    pub search_area: Rect,
    /// Airline header next to the search box
    pub header_area: Rect,
    /// Page menu; collapsed on compact screens
    pub menu_area: Option<Rect>,
    /// Page content
    pub content_area: Rect,
    /// Status bar area
    pub status_area: Rect,
    /// Whether the layout is in compact mode (small screen)
    pub is_compact: bool,
}

/// Panel areas of the dashboard page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardAreas {
    pub key_data: Rect,
    pub rating_distribution: Rect,
    pub sub_item_scoring: Rect,
    pub wordcloud: Rect,
    pub top_rated: Rect,
    pub map: Rect,
    pub feature_importance: Rect,
}

/// Layout manager for the shell and page grids
#[derive(Debug, Clone)]
pub struct LayoutManager {
    config: LayoutConfig,
    current_layout: Option<AppLayout>,
}

impl Default for LayoutManager {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

fn ratio_split(area: Rect, direction: Direction, left: u32, right: u32) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(direction)
        .constraints([
            Constraint::Ratio(left, left + right),
            Constraint::Ratio(right, left + right),
        ])
        .split(area);
    (chunks[0], chunks[1])
}

impl LayoutManager {
    /// Create a new layout manager with the given configuration
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            current_layout: None,
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Get the current layout, recalculating if the area changed
    pub fn layout(&mut self, area: Rect) -> AppLayout {
        match &self.current_layout {
            Some(layout) if layout.full_area == area => layout.clone(),
            _ => {
                let layout = self.calculate_layout(area);
                self.current_layout = Some(layout.clone());
                layout
            }
        }
    }

    /// Calculate the shell layout: [top bar][menu | content][status]
    fn calculate_layout(&self, area: Rect) -> AppLayout {
        let is_compact = area.width < self.config.min_width || area.height < self.config.min_height;

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(self.config.top_bar_height),
                Constraint::Min(0),
                Constraint::Length(self.config.status_bar_height),
            ])
            .split(area);

        let (search_area, header_area) = ratio_split(vertical[0], Direction::Horizontal, 2, 3);

        let (menu_area, content_area) = if is_compact {
            (None, vertical[1])
        } else {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(self.config.menu_width),
                    Constraint::Min(0),
                ])
                .split(vertical[1]);
            (Some(body[0]), body[1])
        };

        AppLayout {
            full_area: area,
            search_area,
            header_area,
            menu_area,
            content_area,
            status_area: vertical[2],
            is_compact,
        }
    }

    /// Dashboard grid:
    /// [key data 5 | ratings 4] / [sub-items 4 | wordcloud 5] /
    /// [top rated 4 | [map 6 | features 5]]
    pub fn dashboard(content: Rect) -> DashboardAreas {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(content);

        let (key_data, rating_distribution) = ratio_split(rows[0], Direction::Horizontal, 5, 4);
        let (sub_item_scoring, wordcloud) = ratio_split(rows[1], Direction::Horizontal, 4, 5);
        let (top_rated, rest) = ratio_split(rows[2], Direction::Horizontal, 4, 5);
        let (map, feature_importance) = ratio_split(rest, Direction::Horizontal, 6, 5);

        DashboardAreas {
            key_data,
            rating_distribution,
            sub_item_scoring,
            wordcloud,
            top_rated,
            map,
            feature_importance,
        }
    }

    /// Analytics page: input on the left, result on the right
    pub fn analytics(content: Rect) -> (Rect, Rect) {
        ratio_split(content, Direction::Horizontal, 1, 1)
    }

    /// Create a centered rectangle within the given area
    pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        let target_width = (area.width as u32 * percent_x as u32 / 100).max(1) as u16;
        let target_height = (area.height as u32 * percent_y as u32 / 100).max(1) as u16;

        let width = target_width.min(area.width);
        let height = target_height.min(area.height);

        let offset_x = (area.width.saturating_sub(width)) / 2;
        let offset_y = (area.height.saturating_sub(height)) / 2;

        Rect::new(area.x + offset_x, area.y + offset_y, width, height)
    }

    /// Check if the terminal size meets minimum requirements
    pub fn check_terminal_size(&self, area: Rect) -> Result<(), String> {
        if area.width < self.config.min_width {
            return Err(format!(
                "Terminal width ({}) is too small. Minimum required: {}",
                area.width, self.config.min_width
            ));
        }

        if area.height < self.config.min_height {
            return Err(format!(
                "Terminal height ({}) is too small. Minimum required: {}",
                area.height, self.config.min_height
            ));
        }

        Ok(())
    }
}

/// Helper functions for common layout operations
pub mod utils {
    use super::*;

    /// Create a popup area in the center of the given area
    pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        LayoutManager::centered_rect(percent_x, percent_y, area)
    }

    /// Create a help area that takes up most of the screen
    pub fn help_area(area: Rect) -> Rect {
        popup_area(area, 80, 80)
    }

    /// Split an area into near-equal columns, distributing remainder pixels from left to right
    pub fn equal_columns(area: Rect, count: usize) -> Vec<Rect> {
        if count == 0 {
            return vec![area];
        }

        let count_u16 = count as u16;
        let base_width = area.width / count_u16;
        let mut remainder = area.width % count_u16;

        let mut columns = Vec::with_capacity(count);
        let mut current_x = area.x;

        for _ in 0..count_u16 {
            let mut width = base_width;
            if remainder > 0 {
                width = width.saturating_add(1);
                remainder -= 1;
            }

            columns.push(Rect::new(current_x, area.y, width, area.height));
            current_x = current_x.saturating_add(width);
        }

        columns
    }

    /// Split an area into near-equal rows
    pub fn equal_rows(area: Rect, count: usize) -> Vec<Rect> {
        if count == 0 {
            return vec![area];
        }

        let constraints: Vec<Constraint> = (0..count)
            .map(|_| Constraint::Ratio(1, count as u32))
            .collect();

        Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area)
            .to_vec()
    }
}
