//! Paged tables: the top-rated leaderboard and the review browser.

use crate::theme::{hex_or, ComponentType, ThemeManager};
use airsight_core::models::{ReviewRow, TopRatedAirline};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, Widget};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::Range;

/// Client-side pagination over a row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    page_size: usize,
    total: usize,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    /// Update the row count, keeping the page in range.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.page = self.page.min(self.page_count() - 1);
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Zero-based current page
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.has_previous() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Row indices on the current page.
    pub fn range(&self) -> Range<usize> {
        let start = (self.page * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page + 1, self.page_count())
    }
}

/// Draw the Previous / page / Next control on one line.
pub fn render_pager(area: Rect, buf: &mut Buffer, theme: &ThemeManager, pager: &Paginator) {
    let enabled = theme.get_style(ComponentType::Highlight);
    let disabled = theme.get_style(ComponentType::Disabled);
    let line = Line::from(vec![
        Span::styled(
            "◀ Previous",
            if pager.has_previous() { enabled } else { disabled },
        ),
        Span::styled(
            format!("  {}  ", pager.label()),
            theme.get_style(ComponentType::Muted),
        ),
        Span::styled(
            "Next ▶",
            if pager.has_next() { enabled } else { disabled },
        ),
    ]);
    Paragraph::new(line)
        .alignment(ratatui::layout::Alignment::Right)
        .render(area, buf);
}

fn split_pager(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Leaderboard of the best rated airlines.
#[derive(Debug, Clone)]
pub struct TopRatedTable {
    rows: Vec<TopRatedAirline>,
    pager: Paginator,
}

const RATING_BAR_WIDTH: usize = 10;

/// Filled cells of a rating bar on a 0..10 scale.
pub fn rating_cells(rating: f64) -> usize {
    let ratio = (rating / 10.0).clamp(0.0, 1.0);
    (ratio * RATING_BAR_WIDTH as f64).round() as usize
}

impl TopRatedTable {
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            pager: Paginator::new(page_size),
        }
    }

    pub fn set_rows(&mut self, rows: Vec<TopRatedAirline>) {
        self.rows = rows;
        self.pager.reset();
        self.pager.set_total(self.rows.len());
    }

    pub fn rows(&self) -> &[TopRatedAirline] {
        &self.rows
    }

    pub fn page_rows(&self) -> &[TopRatedAirline] {
        &self.rows[self.pager.range()]
    }

    pub fn pager(&self) -> &Paginator {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Paginator {
        &mut self.pager
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        let (body, pager_area) = split_pager(area);
        let header = Row::new(["Rank", "Airline", "Rating", "Reviews"])
            .style(theme.get_style(ComponentType::TableHeader));
        let fallback = theme.get_color(ComponentType::Highlight);
        let rows = self.page_rows().iter().map(|airline| {
            let filled = rating_cells(airline.rating);
            let bar = Line::from(vec![
                Span::styled(
                    "█".repeat(filled),
                    Style::default().fg(hex_or(&airline.color, fallback)),
                ),
                Span::styled(
                    "░".repeat(RATING_BAR_WIDTH - filled),
                    theme.get_style(ComponentType::Muted),
                ),
                Span::raw(format!(" {:.1}", airline.rating)),
            ]);
            Row::new(vec![
                Cell::from(airline.rank.to_string()),
                Cell::from(airline.name.clone()),
                Cell::from(bar),
                Cell::from(airline.review_count.to_string()),
            ])
            .style(theme.get_style(ComponentType::Text))
        });
        let widths = [
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(RATING_BAR_WIDTH as u16 + 5),
            Constraint::Length(8),
        ];
        Table::new(rows)
            .header(header)
            .widths(&widths)
            .column_spacing(1)
            .render(body, buf);
        render_pager(pager_area, buf, theme, &self.pager);
    }
}

/// Columns of the review browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReviewColumn {
    /// One-based position of the row in the loaded data
    Index,
    ReviewId,
    Title,
    Score,
    Content,
    VerifiedType,
    UserName,
    Country,
    ReviewDate,
    Aircraft,
    TypeOfTraveller,
    SeatType,
    FlownDate,
    Recommended,
}

impl ReviewColumn {
    pub const ALL: [ReviewColumn; 14] = [
        ReviewColumn::Index,
        ReviewColumn::ReviewId,
        ReviewColumn::Title,
        ReviewColumn::Score,
        ReviewColumn::Content,
        ReviewColumn::VerifiedType,
        ReviewColumn::UserName,
        ReviewColumn::Country,
        ReviewColumn::ReviewDate,
        ReviewColumn::Aircraft,
        ReviewColumn::TypeOfTraveller,
        ReviewColumn::SeatType,
        ReviewColumn::FlownDate,
        ReviewColumn::Recommended,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            ReviewColumn::Index => "#",
            ReviewColumn::ReviewId => "Review ID",
            ReviewColumn::Title => "Title",
            ReviewColumn::Score => "Score",
            ReviewColumn::Content => "Content",
            ReviewColumn::VerifiedType => "Verified",
            ReviewColumn::UserName => "User",
            ReviewColumn::Country => "Country",
            ReviewColumn::ReviewDate => "Review Date",
            ReviewColumn::Aircraft => "Aircraft",
            ReviewColumn::TypeOfTraveller => "Traveller",
            ReviewColumn::SeatType => "Seat Type",
            ReviewColumn::FlownDate => "Flown",
            ReviewColumn::Recommended => "Recommended",
        }
    }

    /// Cell text of `row`. The row number is positional and left empty
    /// here; see [`ReviewTable::page_cells`].
    pub fn value(&self, row: &ReviewRow) -> String {
        match self {
            ReviewColumn::Index => String::new(),
            ReviewColumn::ReviewId => row.review_id.to_string(),
            ReviewColumn::Title => row.title.clone(),
            ReviewColumn::Score => format!("{}", row.score),
            ReviewColumn::Content => row.content.replace('\n', " "),
            ReviewColumn::VerifiedType => row.verified_type.clone(),
            ReviewColumn::UserName => row.user_name.clone(),
            ReviewColumn::Country => row.country.clone(),
            ReviewColumn::ReviewDate => row.review_date.clone(),
            ReviewColumn::Aircraft => row.aircraft.clone(),
            ReviewColumn::TypeOfTraveller => row.type_of_traveller.clone(),
            ReviewColumn::SeatType => row.seat_type.clone(),
            ReviewColumn::FlownDate => row.flown_date.clone(),
            ReviewColumn::Recommended => row.recommended.to_string(),
        }
    }

    /// Columns offering a pick-one value filter.
    pub fn is_filterable(&self) -> bool {
        matches!(
            self,
            ReviewColumn::VerifiedType
                | ReviewColumn::Country
                | ReviewColumn::Aircraft
                | ReviewColumn::TypeOfTraveller
                | ReviewColumn::SeatType
                | ReviewColumn::Recommended
        )
    }

    pub fn is_sortable(&self) -> bool {
        matches!(self, ReviewColumn::Score | ReviewColumn::ReviewDate)
    }

    pub fn is_hideable(&self) -> bool {
        *self != ReviewColumn::Index
    }

    fn width(&self) -> Constraint {
        match self {
            ReviewColumn::Title | ReviewColumn::Content => Constraint::Min(16),
            ReviewColumn::Index => Constraint::Length(4),
            ReviewColumn::ReviewId => Constraint::Length(10),
            ReviewColumn::Score => Constraint::Length(6),
            ReviewColumn::ReviewDate | ReviewColumn::FlownDate => Constraint::Length(12),
            ReviewColumn::Recommended => Constraint::Length(12),
            _ => Constraint::Length(14),
        }
    }

    fn compare(&self, a: &ReviewRow, b: &ReviewRow) -> Ordering {
        match self {
            ReviewColumn::Score => a.score.total_cmp(&b.score),
            ReviewColumn::ReviewDate => a.review_date_parsed().cmp(&b.review_date_parsed()),
            other => other.value(a).cmp(&other.value(b)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Review rows with a global filter, per-column filters, sorting,
/// column visibility and paging.
#[derive(Debug, Clone)]
pub struct ReviewTable {
    rows: Vec<ReviewRow>,
    global_filter: String,
    column_filters: BTreeMap<ReviewColumn, String>,
    sort: Option<(ReviewColumn, SortOrder)>,
    hidden: HashSet<ReviewColumn>,
    selected: usize,
    view: Vec<usize>,
    pager: Paginator,
}

impl ReviewTable {
    pub fn new(page_size: usize) -> Self {
        let hidden = [
            ReviewColumn::Content,
            ReviewColumn::VerifiedType,
            ReviewColumn::Aircraft,
            ReviewColumn::FlownDate,
        ]
        .into_iter()
        .collect();
        Self {
            rows: Vec::new(),
            global_filter: String::new(),
            column_filters: BTreeMap::new(),
            sort: None,
            hidden,
            selected: 0,
            view: Vec::new(),
            pager: Paginator::new(page_size),
        }
    }

    /// Replace the rows, keeping filters that still match a present value.
    pub fn set_rows(&mut self, rows: Vec<ReviewRow>) {
        self.rows = rows;
        let mut stale = Vec::new();
        for (column, value) in &self.column_filters {
            if !self.distinct_values(*column).contains(value) {
                stale.push(*column);
            }
        }
        for column in stale {
            self.column_filters.remove(&column);
        }
        self.pager.reset();
        self.refresh();
    }

    pub fn clear(&mut self) {
        self.set_rows(Vec::new());
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.view.len()
    }

    pub fn global_filter(&self) -> &str {
        &self.global_filter
    }

    pub fn set_global_filter(&mut self, filter: &str) {
        self.global_filter = filter.to_string();
        self.pager.reset();
        self.refresh();
    }

    pub fn column_filter(&self, column: ReviewColumn) -> Option<&str> {
        self.column_filters.get(&column).map(String::as_str)
    }

    pub fn set_column_filter(&mut self, column: ReviewColumn, value: Option<String>) {
        match value {
            Some(value) if column.is_filterable() => {
                self.column_filters.insert(column, value);
            }
            _ => {
                self.column_filters.remove(&column);
            }
        }
        self.pager.reset();
        self.refresh();
    }

    /// Sorted distinct values of `column` across all rows.
    pub fn distinct_values(&self, column: ReviewColumn) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| column.value(row))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Step the filter of `column` through its distinct values, then off.
    pub fn cycle_filter(&mut self, column: ReviewColumn) {
        if !column.is_filterable() {
            return;
        }
        let values = self.distinct_values(column);
        let next = match self.column_filter(column) {
            None => values.first().cloned(),
            Some(current) => values
                .iter()
                .position(|v| v == current)
                .and_then(|i| values.get(i + 1))
                .cloned(),
        };
        self.set_column_filter(column, next);
    }

    pub fn sort(&self) -> Option<(ReviewColumn, SortOrder)> {
        self.sort
    }

    /// Sort by `column`, flipping the order when it is already the key.
    pub fn toggle_sort(&mut self, column: ReviewColumn) {
        if !column.is_sortable() {
            return;
        }
        self.sort = match self.sort {
            Some((current, SortOrder::Ascending)) if current == column => {
                Some((column, SortOrder::Descending))
            }
            _ => Some((column, SortOrder::Ascending)),
        };
        self.refresh();
    }

    pub fn is_visible(&self, column: ReviewColumn) -> bool {
        !self.hidden.contains(&column)
    }

    /// Show or hide `column`. The row number and at least one other
    /// column stay visible.
    pub fn toggle_visibility(&mut self, column: ReviewColumn) {
        if !column.is_hideable() {
            return;
        }
        if self.hidden.remove(&column) {
            return;
        }
        let others = self
            .visible_columns()
            .into_iter()
            .filter(|c| c.is_hideable())
            .count();
        if others > 1 {
            self.hidden.insert(column);
        }
    }

    pub fn visible_columns(&self) -> Vec<ReviewColumn> {
        ReviewColumn::ALL
            .into_iter()
            .filter(|c| self.is_visible(*c))
            .collect()
    }

    /// Column under the cursor. Hidden columns can be selected so they
    /// can be shown again.
    pub fn selected_column(&self) -> ReviewColumn {
        ReviewColumn::ALL[self.selected % ReviewColumn::ALL.len()]
    }

    pub fn select_next_column(&mut self) {
        self.selected = (self.selected + 1) % ReviewColumn::ALL.len();
    }

    pub fn select_previous_column(&mut self) {
        self.selected = (self.selected + ReviewColumn::ALL.len() - 1) % ReviewColumn::ALL.len();
    }

    pub fn pager(&self) -> &Paginator {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Paginator {
        &mut self.pager
    }

    /// Rows on the current page after filtering and sorting.
    pub fn page_rows(&self) -> Vec<&ReviewRow> {
        self.view[self.pager.range()]
            .iter()
            .map(|&i| &self.rows[i])
            .collect()
    }

    /// Cells of the current page for `columns`, row numbers included.
    pub fn page_cells(&self, columns: &[ReviewColumn]) -> Vec<Vec<String>> {
        self.view[self.pager.range()]
            .iter()
            .map(|&i| {
                let row = &self.rows[i];
                columns
                    .iter()
                    .map(|column| match column {
                        ReviewColumn::Index => (i + 1).to_string(),
                        other => other.value(row),
                    })
                    .collect()
            })
            .collect()
    }

    fn matches(&self, row: &ReviewRow, needle: &str) -> bool {
        if !needle.is_empty() && !row.searchable_text().to_lowercase().contains(needle) {
            return false;
        }
        self.column_filters
            .iter()
            .all(|(column, value)| column.value(row) == *value)
    }

    fn refresh(&mut self) {
        let needle = self.global_filter.trim().to_lowercase();
        let mut view: Vec<usize> = (0..self.rows.len())
            .filter(|&i| self.matches(&self.rows[i], &needle))
            .collect();
        if let Some((column, order)) = self.sort {
            view.sort_by(|&a, &b| {
                let ordering = column.compare(&self.rows[a], &self.rows[b]);
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }
        self.view = view;
        self.pager.set_total(self.view.len());
    }

    fn header_cell(&self, column: ReviewColumn, theme: &ThemeManager) -> Cell<'static> {
        let mut label = column.header().to_string();
        if let Some((sorted, order)) = self.sort {
            if sorted == column {
                label.push_str(match order {
                    SortOrder::Ascending => " ▲",
                    SortOrder::Descending => " ▼",
                });
            }
        }
        if self.column_filters.contains_key(&column) {
            label.push_str(" *");
        }
        let mut style = theme.get_style(ComponentType::TableHeader);
        if column == self.selected_column() {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Cell::from(label).style(style)
    }

    fn status_line(&self, theme: &ThemeManager) -> Line<'static> {
        let column = self.selected_column();
        let mut spans = vec![
            Span::styled("Filter: ", theme.get_style(ComponentType::Muted)),
            Span::styled(
                if self.global_filter.is_empty() {
                    "(none)".to_string()
                } else {
                    self.global_filter.clone()
                },
                theme.get_style(ComponentType::Text),
            ),
            Span::styled(
                format!("  Column: {}", column.header()),
                theme.get_style(ComponentType::Muted),
            ),
        ];
        if !self.is_visible(column) {
            spans.push(Span::styled(" (hidden)", theme.get_style(ComponentType::Disabled)));
        }
        if let Some(value) = self.column_filter(column) {
            spans.push(Span::styled(
                format!(" = {value}"),
                theme.get_style(ComponentType::Info),
            ));
        }
        spans.push(Span::styled(
            format!("  {} of {} reviews", self.view.len(), self.rows.len()),
            theme.get_style(ComponentType::Muted),
        ));
        Line::from(spans)
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);
        Paragraph::new(self.status_line(theme)).render(chunks[0], buf);

        let columns = self.visible_columns();
        let header = Row::new(
            columns
                .iter()
                .map(|c| self.header_cell(*c, theme))
                .collect::<Vec<_>>(),
        );
        let rows = self.page_cells(&columns).into_iter().map(|cells| {
            Row::new(cells.into_iter().map(Cell::from).collect::<Vec<_>>())
                .style(theme.get_style(ComponentType::Text))
        });
        let widths: Vec<Constraint> = columns.iter().map(|c| c.width()).collect();
        Table::new(rows)
            .header(header)
            .widths(&widths)
            .column_spacing(1)
            .render(chunks[1], buf);
        render_pager(chunks[2], buf, theme, &self.pager);
    }
}
