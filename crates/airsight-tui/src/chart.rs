//! Chart surfaces and their mount lifecycle.
//!
//! A panel owns a [`ChartHost`]. Every data arrival mounts a freshly built
//! chart; the host tears down the previous one (observer first, then the
//! chart) so exactly one surface and one resize observer are live per panel.

use crate::geo::{self, WorldGeometry};
use crate::theme::{ComponentType, ThemeManager};
use crate::wordcloud::WordCloud;
use airsight_core::models::CityPoint;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Chart, Dataset, GraphType, Paragraph, Widget,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Something drawn into a mounted chart area.
#[cfg_attr(test, mockall::automock)]
pub trait ChartSurface {
    /// Re-layout for a new area
    fn resize(&mut self, area: Rect);

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &ThemeManager);

    /// Release everything the surface holds. Called exactly once.
    fn dispose(&mut self);
}

/// Counts live resize observers.
#[derive(Debug, Clone, Default)]
pub struct ObserverRegistry {
    live: Arc<AtomicUsize>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a new observer.
    pub fn observe(&self) -> ResizeObserver {
        self.live.fetch_add(1, Ordering::SeqCst);
        ResizeObserver {
            live: Arc::clone(&self.live),
            last: None,
            connected: true,
        }
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Watches a mount area and reports when it changes.
#[derive(Debug)]
pub struct ResizeObserver {
    live: Arc<AtomicUsize>,
    last: Option<Rect>,
    connected: bool,
}

impl ResizeObserver {
    /// Record `area`; true when it differs from the last one seen.
    pub fn observe(&mut self, area: Rect) -> bool {
        if !self.connected || self.last == Some(area) {
            return false;
        }
        self.last = Some(area);
        true
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for ResizeObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}

struct Mounted {
    surface: Box<dyn ChartSurface>,
    observer: ResizeObserver,
}

/// Mount point for one panel's chart.
pub struct ChartHost {
    registry: ObserverRegistry,
    mounted: Option<Mounted>,
}

impl ChartHost {
    pub fn new(registry: ObserverRegistry) -> Self {
        Self {
            registry,
            mounted: None,
        }
    }

    /// Replace the mounted chart. The previous one is torn down first.
    pub fn mount(&mut self, surface: Box<dyn ChartSurface>) {
        self.unmount();
        self.mounted = Some(Mounted {
            surface,
            observer: self.registry.observe(),
        });
    }

    /// Disconnect the observer and dispose the chart, if any.
    pub fn unmount(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            mounted.observer.disconnect();
            mounted.surface.dispose();
            trace!("Chart unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        if let Some(mounted) = self.mounted.as_mut() {
            if mounted.observer.observe(area) {
                mounted.surface.resize(area);
            }
            mounted.surface.render(area, buf, theme);
        }
    }
}

impl Drop for ChartHost {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// One named data series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Color,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub x_labels: Vec<String>,
    pub y_bounds: [f64; 2],
    pub series: Vec<Series>,
    pub smooth: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalBarSpec {
    /// Sorted by absolute value, largest first
    pub items: Vec<(String, f64)>,
}

impl HorizontalBarSpec {
    pub fn new(items: impl IntoIterator<Item = (String, f64)>) -> Self {
        let mut items: Vec<(String, f64)> = items.into_iter().collect();
        items.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        Self { items }
    }
}

#[derive(Debug, Clone)]
pub struct GeoSpec {
    pub points: Vec<CityPoint>,
    pub geometry: Option<Arc<WorldGeometry>>,
    pub marker: Color,
}

#[derive(Debug, Clone)]
pub enum ChartSpec {
    Line(LineSpec),
    Bars(BarSpec),
    HorizontalBars(HorizontalBarSpec),
    Geo(GeoSpec),
    WordCloud(WordCloud),
}

const SMOOTH_STEPS: usize = 8;

/// Catmull-Rom interpolation through `values` placed at x = 0, 1, 2, ...
pub fn smooth_points(values: &[f64], bounds: [f64; 2]) -> Vec<(f64, f64)> {
    if values.len() < 3 {
        return values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect();
    }
    let at = |i: isize| -> f64 {
        let clamped = i.clamp(0, values.len() as isize - 1) as usize;
        values[clamped]
    };
    let mut points = Vec::with_capacity((values.len() - 1) * SMOOTH_STEPS + 1);
    for i in 0..values.len() - 1 {
        let (p0, p1, p2, p3) = (
            at(i as isize - 1),
            at(i as isize),
            at(i as isize + 1),
            at(i as isize + 2),
        );
        for step in 0..SMOOTH_STEPS {
            let t = step as f64 / SMOOTH_STEPS as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let y = 0.5
                * (2.0 * p1
                    + (-p0 + p2) * t
                    + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                    + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3);
            points.push((i as f64 + t, y.clamp(bounds[0], bounds[1])));
        }
    }
    if let Some(last) = values.last() {
        points.push(((values.len() - 1) as f64, *last));
    }
    points
}

/// Terminal rendition of a [`ChartSpec`].
pub struct TerminalChart {
    spec: ChartSpec,
    line_points: Vec<Vec<(f64, f64)>>,
    bar_width: u16,
    label_width: u16,
    disposed: bool,
}

impl TerminalChart {
    pub fn new(spec: ChartSpec) -> Self {
        let line_points = match &spec {
            ChartSpec::Line(line) => line
                .series
                .iter()
                .map(|s| {
                    if line.smooth {
                        smooth_points(&s.values, line.y_bounds)
                    } else {
                        s.values
                            .iter()
                            .enumerate()
                            .map(|(i, v)| (i as f64, *v))
                            .collect()
                    }
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            spec,
            line_points,
            bar_width: 1,
            label_width: 0,
            disposed: false,
        }
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn legend(series: &[Series], theme: &ThemeManager) -> Line<'static> {
        let mut spans = Vec::new();
        for s in series {
            spans.push(Span::styled("■ ", Style::default().fg(s.color)));
            spans.push(Span::styled(
                format!("{}  ", s.name),
                theme.get_style(ComponentType::Text),
            ));
        }
        Line::from(spans)
    }

    fn split_legend(area: Rect, legend_on_top: bool) -> (Rect, Rect) {
        let constraints = if legend_on_top {
            [Constraint::Length(1), Constraint::Min(0)]
        } else {
            [Constraint::Min(0), Constraint::Length(1)]
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        if legend_on_top {
            (chunks[1], chunks[0])
        } else {
            (chunks[0], chunks[1])
        }
    }

    fn render_line(&self, spec: &LineSpec, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        let (plot, legend) = Self::split_legend(area, false);
        let datasets: Vec<Dataset> = spec
            .series
            .iter()
            .zip(&self.line_points)
            .map(|(series, points)| {
                Dataset::default()
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(series.color))
                    .data(points)
            })
            .collect();

        let label_style = theme.get_style(ComponentType::Muted);
        let x_max = spec.x_labels.len().saturating_sub(1).max(1) as f64;
        let y_mid = (spec.y_bounds[0] + spec.y_bounds[1]) / 2.0;
        Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .style(label_style)
                    .bounds([0.0, x_max])
                    .labels(spec.x_labels.iter().cloned().map(Span::raw).collect()),
            )
            .y_axis(
                Axis::default()
                    .style(label_style)
                    .bounds(spec.y_bounds)
                    .labels(vec![
                        Span::raw(format!("{}", spec.y_bounds[0])),
                        Span::raw(format!("{}", y_mid)),
                        Span::raw(format!("{}", spec.y_bounds[1])),
                    ]),
            )
            .render(plot, buf);
        Paragraph::new(Self::legend(&spec.series, theme)).render(legend, buf);
    }

    fn render_bars(&self, spec: &BarSpec, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        let (plot, legend) = Self::split_legend(area, true);
        Paragraph::new(Self::legend(&spec.series, theme)).render(legend, buf);

        // Bar values are integral; keep two decimals of resolution.
        let scale = |v: f64| (v.max(0.0) * 100.0).round() as u64;
        let group_width = (self.bar_width as usize * spec.series.len()).max(1);
        let mut chart = BarChart::default()
            .bar_width(self.bar_width)
            .bar_gap(0)
            .group_gap(1)
            .max(scale(spec.max))
            .label_style(theme.get_style(ComponentType::Muted));

        for (index, category) in spec.categories.iter().enumerate() {
            let bars: Vec<Bar> = spec
                .series
                .iter()
                .map(|series| {
                    let value = series.values.get(index).copied().unwrap_or(0.0);
                    Bar::default()
                        .value(scale(value))
                        .text_value(format!("{value:.1}"))
                        .style(Style::default().fg(series.color))
                        .value_style(Style::default().fg(Color::Black).bg(series.color))
                })
                .collect();
            let label: String = category.chars().take(group_width).collect();
            chart = chart.data(BarGroup::default().label(Line::from(label)).bars(&bars));
        }
        chart.render(plot, buf);
    }

    fn render_horizontal(
        &self,
        spec: &HorizontalBarSpec,
        area: Rect,
        buf: &mut Buffer,
        theme: &ThemeManager,
    ) {
        let max_abs = spec
            .items
            .iter()
            .map(|(_, v)| v.abs())
            .fold(0.0_f64, f64::max);
        let value_width = 8u16;
        let label_width = self.label_width.min(area.width);
        let bar_space = area
            .width
            .saturating_sub(label_width + value_width + 2) as f64;

        for (row, (label, value)) in spec.items.iter().take(area.height as usize).enumerate() {
            let y = area.y + row as u16;
            buf.set_stringn(
                area.x,
                y,
                format!("{:>width$}", label, width = label_width as usize),
                label_width as usize,
                theme.get_style(ComponentType::Text),
            );
            let length = if max_abs > 0.0 {
                ((value.abs() / max_abs) * bar_space).round() as usize
            } else {
                0
            };
            let color = if *value >= 0.0 {
                theme.get_color(ComponentType::Positive)
            } else {
                theme.get_color(ComponentType::Negative)
            };
            let bar_x = area.x + label_width + 1;
            buf.set_string(bar_x, y, "█".repeat(length), Style::default().fg(color));
            buf.set_stringn(
                bar_x + length as u16 + 1,
                y,
                format!("{value:+.3}"),
                value_width as usize,
                theme.get_style(ComponentType::Muted),
            );
        }
    }
}

impl ChartSurface for TerminalChart {
    fn resize(&mut self, area: Rect) {
        match &mut self.spec {
            ChartSpec::Bars(spec) => {
                let groups = spec.categories.len().max(1) as u16;
                let per_group = area.width / groups;
                let series = spec.series.len().max(1) as u16;
                self.bar_width = (per_group.saturating_sub(1) / series).max(1);
            }
            ChartSpec::HorizontalBars(spec) => {
                let longest = spec
                    .items
                    .iter()
                    .map(|(label, _)| label.chars().count())
                    .max()
                    .unwrap_or(0) as u16;
                self.label_width = longest.min(area.width / 3);
            }
            ChartSpec::WordCloud(cloud) => cloud.layout(area),
            ChartSpec::Line(_) | ChartSpec::Geo(_) => {}
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        if self.disposed || area.width == 0 || area.height == 0 {
            return;
        }
        match &self.spec {
            ChartSpec::Line(spec) => self.render_line(spec, area, buf, theme),
            ChartSpec::Bars(spec) => self.render_bars(spec, area, buf, theme),
            ChartSpec::HorizontalBars(spec) => self.render_horizontal(spec, area, buf, theme),
            ChartSpec::Geo(spec) => geo::render_map(
                area,
                buf,
                theme,
                spec.geometry.as_deref(),
                &spec.points,
                spec.marker,
            ),
            ChartSpec::WordCloud(cloud) => cloud.render(area, buf),
        }
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.line_points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn area() -> Rect {
        Rect::new(0, 0, 40, 10)
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.get(buf.area.x + x, y).symbol.clone())
            .collect()
    }

    fn all_text(buf: &Buffer) -> String {
        (0..buf.area.height)
            .map(|y| row_text(buf, buf.area.y + y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_mount_then_unmount_disposes_once() {
        let registry = ObserverRegistry::new();
        let mut host = ChartHost::new(registry.clone());
        let mut surface = MockChartSurface::new();
        surface.expect_dispose().times(1).return_const(());

        host.mount(Box::new(surface));
        assert_eq!(registry.live(), 1);
        host.unmount();
        assert_eq!(registry.live(), 0);
        assert!(!host.is_mounted());

        // Unmounting again is a no-op
        host.unmount();
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn test_remount_tears_down_previous_chart() {
        let registry = ObserverRegistry::new();
        let mut host = ChartHost::new(registry.clone());

        let mut first = MockChartSurface::new();
        first.expect_dispose().times(1).return_const(());
        let mut second = MockChartSurface::new();
        second.expect_dispose().times(1).return_const(());

        host.mount(Box::new(first));
        host.mount(Box::new(second));
        assert_eq!(registry.live(), 1);

        drop(host);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn test_resize_only_when_area_changes() {
        let mut host = ChartHost::new(ObserverRegistry::new());
        let mut surface = MockChartSurface::new();
        surface.expect_resize().times(2).return_const(());
        surface.expect_render().times(3).return_const(());
        surface.expect_dispose().times(1).return_const(());

        let theme = ThemeManager::new();
        let mut buf = Buffer::empty(Rect::new(0, 0, 60, 20));
        host.mount(Box::new(surface));
        host.render(Rect::new(0, 0, 40, 10), &mut buf, &theme);
        host.render(Rect::new(0, 0, 40, 10), &mut buf, &theme);
        host.render(Rect::new(0, 0, 60, 20), &mut buf, &theme);
    }

    #[test]
    fn test_disconnected_observer_ignores_areas() {
        let registry = ObserverRegistry::new();
        let mut observer = registry.observe();
        assert!(observer.observe(area()));
        observer.disconnect();
        observer.disconnect();
        assert!(!observer.is_connected());
        assert!(!observer.observe(Rect::new(0, 0, 1, 1)));
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn test_smooth_points_pass_through_values() {
        let values = [0.1, 0.5, 0.2, 0.9];
        let points = smooth_points(&values, [0.0, 1.0]);
        assert_eq!(points.first(), Some(&(0.0, 0.1)));
        assert_eq!(points.last(), Some(&(3.0, 0.9)));
        assert!(points.contains(&(1.0, 0.5)));
        assert!(points.iter().all(|(_, y)| (0.0..=1.0).contains(y)));
    }

    #[test]
    fn test_horizontal_bars_sorted_by_magnitude() {
        let spec = HorizontalBarSpec::new(vec![
            ("Wifi".to_string(), 0.1),
            ("Food".to_string(), -0.7),
            ("Seat".to_string(), 0.4),
        ]);
        let order: Vec<&str> = spec.items.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(order, vec!["Food", "Seat", "Wifi"]);

        let mut chart = TerminalChart::new(ChartSpec::HorizontalBars(spec));
        chart.resize(area());
        let mut buf = Buffer::empty(area());
        chart.render(area(), &mut buf, &ThemeManager::new());
        assert!(row_text(&buf, 0).contains("Food"));
        assert!(row_text(&buf, 0).contains("-0.700"));
        assert!(row_text(&buf, 2).contains("Wifi"));
    }

    #[test]
    fn test_line_chart_draws_legend() {
        let spec = LineSpec {
            x_labels: (0..=5).map(|i| i.to_string()).collect(),
            y_bounds: [0.0, 1.0],
            series: vec![Series {
                name: "Wifi".to_string(),
                color: Color::Cyan,
                values: vec![0.1, 0.2, 0.4, 0.2, 0.05, 0.05],
            }],
            smooth: true,
        };
        let mut chart = TerminalChart::new(ChartSpec::Line(spec));
        chart.resize(area());
        let mut buf = Buffer::empty(area());
        chart.render(area(), &mut buf, &ThemeManager::new());
        assert!(row_text(&buf, 9).contains("Wifi"));
    }

    #[test]
    fn test_bar_width_follows_area() {
        let spec = BarSpec {
            categories: vec!["Seat".to_string(), "Food".to_string()],
            series: vec![
                Series {
                    name: "KLM".to_string(),
                    color: Color::Blue,
                    values: vec![4.0, 3.0],
                },
                Series {
                    name: "Average".to_string(),
                    color: Color::Green,
                    values: vec![3.5, 3.2],
                },
            ],
            max: 5.0,
        };
        let mut chart = TerminalChart::new(ChartSpec::Bars(spec));
        chart.resize(Rect::new(0, 0, 40, 10));
        let wide = chart.bar_width;
        chart.resize(Rect::new(0, 0, 12, 10));
        assert!(wide > chart.bar_width);

        let mut buf = Buffer::empty(area());
        chart.resize(area());
        chart.render(area(), &mut buf, &ThemeManager::new());
        assert!(row_text(&buf, 0).contains("Average"));
    }

    #[test]
    fn test_word_cloud_relayout_on_resize() {
        let cloud = WordCloud::new(
            vec![("friendly".to_string(), 0.8), ("clean".to_string(), 0.4)],
            &[Color::Green],
            &mut StdRng::seed_from_u64(5),
        );
        let mut chart = TerminalChart::new(ChartSpec::WordCloud(cloud));
        chart.resize(area());
        let mut buf = Buffer::empty(area());
        chart.render(area(), &mut buf, &ThemeManager::new());
        assert!(all_text(&buf).contains("FRIENDLY"));
    }

    #[test]
    fn test_disposed_chart_draws_nothing() {
        let spec = HorizontalBarSpec::new(vec![("Seat".to_string(), 0.4)]);
        let mut chart = TerminalChart::new(ChartSpec::HorizontalBars(spec));
        chart.resize(area());
        chart.dispose();
        assert!(chart.is_disposed());
        let mut buf = Buffer::empty(area());
        chart.render(area(), &mut buf, &ThemeManager::new());
        assert!(all_text(&buf).trim().is_empty());
    }
}
