//! Application state and the event loop.

use crate::chart::ObserverRegistry;
use crate::components::{InputField, PopupDialog, StatusBar, StatusItem, ToastQueue};
use crate::error::{Result, TuiError};
use crate::events::{
    spawn_event_listener, spawn_selection_watcher, AppEvent, EventHandler, InputMode, KeyAction,
};
use crate::fetch::PanelKind;
use crate::geo::load_geometry;
use crate::layout::{utils, LayoutManager};
use crate::pages::{render_menu, Page};
use crate::panels::{
    AirlineHeader, Applied, CityMapPanel, DataPanel, FeatureImportancePanel, FetchContext,
    KeyDataPanel, RatingDistributionPanel, ReviewWordcloudPanel, ReviewsPanel, SentimentPanel,
    SubItemScoringPanel, TopRatedPanel,
};
use crate::terminal::{install_panic_hook, restore_terminal, setup_terminal};
use crate::theme::{ComponentType, ThemeManager};
use airsight_client::Gateway;
use airsight_core::config::Config;
use airsight_core::SelectionStore;
use crossterm::event::Event;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Paragraph, Widget, Wrap};
use ratatui::{Frame, Terminal};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct App {
    config: Config,
    store: SelectionStore,
    ctx: FetchContext,
    events: EventHandler,
    theme: ThemeManager,
    layout: LayoutManager,
    registry: ObserverRegistry,
    page: Page,
    search: InputField,
    filter: InputField,
    header: AirlineHeader,
    key_data: KeyDataPanel,
    rating_distribution: RatingDistributionPanel,
    sub_item_scoring: SubItemScoringPanel,
    wordcloud: ReviewWordcloudPanel,
    top_rated: TopRatedPanel,
    map: CityMapPanel,
    feature_importance: FeatureImportancePanel,
    reviews: ReviewsPanel,
    sentiment: SentimentPanel,
    toasts: ToastQueue,
    show_help: bool,
    should_quit: bool,
    background: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(config: Config, gateway: Arc<dyn Gateway>, store: SelectionStore) -> Self {
        let events = EventHandler::new(Duration::from_millis(config.ui.tick_rate_ms));
        let ctx = FetchContext {
            gateway,
            sender: events.sender(),
        };
        let mut theme = ThemeManager::new();
        if let Err(err) = theme.set_theme(&config.ui.theme) {
            warn!(error = %err, "Falling back to the default theme");
        }
        let registry = ObserverRegistry::new();

        Self {
            search: InputField::new().with_placeholder("Press / to search an airline"),
            filter: InputField::new().with_placeholder("Press f to filter reviews"),
            header: AirlineHeader::new(),
            key_data: KeyDataPanel::new(),
            rating_distribution: RatingDistributionPanel::new(registry.clone()),
            sub_item_scoring: SubItemScoringPanel::new(registry.clone()),
            wordcloud: ReviewWordcloudPanel::new(registry.clone(), StdRng::from_entropy()),
            top_rated: TopRatedPanel::new(config.ui.top_rated_page_size),
            map: CityMapPanel::new(registry.clone()),
            feature_importance: FeatureImportancePanel::new(registry.clone()),
            reviews: ReviewsPanel::new(config.ui.reviews_page_size),
            sentiment: SentimentPanel::new(
                store.clone(),
                registry.clone(),
                StdRng::from_entropy(),
            ),
            toasts: ToastQueue::new(Duration::from_millis(config.ui.toast_duration_ms)),
            layout: LayoutManager::default(),
            page: Page::Dashboard,
            show_help: false,
            should_quit: false,
            background: Vec::new(),
            config,
            store,
            ctx,
            events,
            theme,
            registry,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn input_mode(&self) -> InputMode {
        self.events.input_mode()
    }

    fn panel_mut(&mut self, kind: PanelKind) -> &mut dyn DataPanel {
        match kind {
            PanelKind::AirlineInfo => &mut self.header,
            PanelKind::KeyData => &mut self.key_data,
            PanelKind::RatingDistribution => &mut self.rating_distribution,
            PanelKind::SubItemScoring => &mut self.sub_item_scoring,
            PanelKind::ReviewWordcloud => &mut self.wordcloud,
            PanelKind::TopRated => &mut self.top_rated,
            PanelKind::CityDistribution => &mut self.map,
            PanelKind::FeatureImportance => &mut self.feature_importance,
            PanelKind::Reviews => &mut self.reviews,
        }
    }

    fn mounted_panels(&self) -> Vec<PanelKind> {
        let mut kinds = vec![PanelKind::AirlineInfo];
        kinds.extend_from_slice(self.page.panels());
        kinds
    }

    /// Point every mounted panel at the current selection.
    fn sync_panels(&mut self) {
        let airline = self.store.target_airline();
        let ctx = self.ctx.clone();
        for kind in self.mounted_panels() {
            self.panel_mut(kind).sync(airline.as_deref(), &ctx);
        }
    }

    /// Subscribe to the store, start the geometry load and the first fetches.
    pub fn start(&mut self) {
        self.background.push(spawn_selection_watcher(
            self.store.subscribe(),
            self.events.sender(),
        ));

        if let Some(path) = self.config.map.geometry_path.clone() {
            let sender = self.events.sender();
            self.background.push(tokio::spawn(async move {
                let result = load_geometry(&path)
                    .await
                    .map(Arc::new)
                    .map_err(|e| e.to_string());
                let _ = sender.send(AppEvent::GeometryLoaded(result));
            }));
        }

        self.sync_panels();
    }

    fn switch_page(&mut self, page: Page) {
        if page == self.page {
            return;
        }
        for kind in self.page.panels() {
            self.panel_mut(*kind).unmount();
        }
        debug!(from = ?self.page, to = ?page, "Switching page");
        self.page = page;
        self.events.set_input_mode(InputMode::Normal);
        self.sync_panels();
    }

    fn report(&mut self, applied: Applied) {
        if let Applied::Failed(message) = applied {
            self.toasts.error(message);
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(Event::Key(key)) => {
                let action = self.events.handle_key_event(key);
                self.handle_key_action(action);
            }
            AppEvent::Input(Event::Paste(text)) => self.paste(&text),
            AppEvent::Input(_) | AppEvent::Resize(..) => {}
            AppEvent::Tick => self.toasts.expire(Instant::now()),
            AppEvent::Quit => self.should_quit = true,
            AppEvent::Error(message) => {
                warn!(error = %message, "Event source error");
                self.toasts.error(message);
            }
            AppEvent::SelectionChanged => {
                self.sync_panels();
                self.sentiment.refresh_from_store();
            }
            AppEvent::Fetched {
                panel,
                generation,
                result,
            } => {
                let applied = self.panel_mut(panel).apply(generation, result);
                self.report(applied);
            }
            AppEvent::Submitted { revision, result } => {
                let applied = self.sentiment.on_submitted(revision, result);
                self.report(applied);
            }
            AppEvent::GeometryLoaded(Ok(geometry)) => {
                info!(rings = geometry.rings().len(), "Map geometry loaded");
                self.map.set_geometry(geometry);
            }
            AppEvent::GeometryLoaded(Err(message)) => {
                warn!(error = %message, "Map geometry unavailable, using the built-in outline");
            }
        }
    }

    fn paste(&mut self, text: &str) {
        match self.events.input_mode() {
            InputMode::Compose => {
                if let Some(input) = self.sentiment.input_mut() {
                    for c in text.chars() {
                        match c {
                            '\n' => input.new_line(),
                            '\r' => {}
                            c => input.insert_char(c),
                        }
                    }
                }
            }
            InputMode::Search | InputMode::Filter => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.edit_line(KeyAction::InsertChar(c));
                }
            }
            InputMode::Normal => {}
        }
    }

    /// Apply an editing action to the single-line input of the current mode.
    fn edit_line(&mut self, action: KeyAction) {
        let filtering = self.events.input_mode() == InputMode::Filter;
        let input = if filtering {
            &mut self.filter
        } else {
            &mut self.search
        };
        match action {
            KeyAction::InsertChar(c) => input.insert_char(c),
            KeyAction::Backspace => input.backspace(),
            KeyAction::Delete => input.delete(),
            KeyAction::Clear => input.clear(),
            KeyAction::MoveLeft => input.move_cursor_left(),
            KeyAction::MoveRight => input.move_cursor_right(),
            KeyAction::MoveHome => input.move_cursor_to_start(),
            KeyAction::MoveEnd => input.move_cursor_to_end(),
            _ => return,
        }
        if filtering {
            let filter = self.filter.content().to_string();
            self.reviews.table_mut().set_global_filter(&filter);
        }
    }

    fn edit_compose(&mut self, action: KeyAction) {
        let Some(input) = self.sentiment.input_mut() else {
            return;
        };
        match action {
            KeyAction::InsertChar(c) => input.insert_char(c),
            KeyAction::NewLine => input.new_line(),
            KeyAction::Backspace => input.backspace(),
            KeyAction::Delete => input.delete(),
            KeyAction::Clear => input.clear(),
            KeyAction::MoveLeft => input.move_cursor_left(),
            KeyAction::MoveRight => input.move_cursor_right(),
            KeyAction::MoveHome => input.move_cursor_to_start(),
            KeyAction::MoveEnd => input.move_cursor_to_end(),
            _ => {}
        }
    }

    fn submit(&mut self) {
        match self.events.input_mode() {
            InputMode::Search => {
                if self.header.is_loading() {
                    return;
                }
                let name = self.search.content().trim().to_string();
                if name.is_empty() {
                    return;
                }
                info!(airline = %name, "Searching airline");
                self.store.set_target_airline(name);
                self.search.clear();
                self.events.set_input_mode(InputMode::Normal);
            }
            InputMode::Filter => self.events.set_input_mode(InputMode::Normal),
            InputMode::Compose => {
                let ctx = self.ctx.clone();
                if self.sentiment.submit(&ctx) {
                    self.events.set_input_mode(InputMode::Normal);
                }
            }
            InputMode::Normal => {}
        }
    }

    pub fn handle_key_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::None => {}
            KeyAction::Quit => self.should_quit = true,
            KeyAction::ShowHelp => self.show_help = !self.show_help,
            KeyAction::EnterNormal => {
                self.show_help = false;
                self.events.set_input_mode(InputMode::Normal);
            }
            KeyAction::EnterSearch => {
                if !self.header.is_loading() {
                    self.events.set_input_mode(InputMode::Search);
                }
            }
            KeyAction::EnterCompose => {
                self.switch_page(Page::AnalyticsTool);
                if !self.sentiment.is_loading() {
                    self.events.set_input_mode(InputMode::Compose);
                }
            }
            KeyAction::EnterFilter => {
                self.switch_page(Page::ReviewData);
                self.events.set_input_mode(InputMode::Filter);
            }
            KeyAction::GoToPage(index) => {
                if let Some(page) = Page::from_index(index) {
                    self.switch_page(page);
                }
            }
            KeyAction::NextPage => self.switch_page(self.page.next()),
            KeyAction::PreviousPage => self.switch_page(self.page.previous()),
            KeyAction::Submit => self.submit(),
            KeyAction::ToggleTheme => self.theme.next_theme(),
            KeyAction::ResetAirline => {
                if !self.header.is_loading() {
                    self.search.clear();
                    self.store.clear_target_airline();
                }
            }
            KeyAction::ResetSentiment => self.sentiment.reset(),
            KeyAction::NextTablePage => match self.page {
                Page::Dashboard => {
                    self.top_rated.next_page();
                }
                Page::ReviewData => {
                    self.reviews.table_mut().pager_mut().next();
                }
                Page::AnalyticsTool => self.sentiment.focus_next(),
            },
            KeyAction::PreviousTablePage => match self.page {
                Page::Dashboard => {
                    self.top_rated.previous_page();
                }
                Page::ReviewData => {
                    self.reviews.table_mut().pager_mut().previous();
                }
                Page::AnalyticsTool => self.sentiment.focus_previous(),
            },
            KeyAction::FocusNext => match self.page {
                Page::ReviewData => self.reviews.table_mut().select_next_column(),
                Page::AnalyticsTool => self.sentiment.toggle_view(),
                Page::Dashboard => {}
            },
            KeyAction::FocusPrevious => match self.page {
                Page::ReviewData => self.reviews.table_mut().select_previous_column(),
                Page::AnalyticsTool => self.sentiment.toggle_view(),
                Page::Dashboard => {}
            },
            KeyAction::CycleFilterValue | KeyAction::ToggleColumn | KeyAction::ToggleSort
                if self.page == Page::ReviewData =>
            {
                let table = self.reviews.table_mut();
                let column = table.selected_column();
                match action {
                    KeyAction::CycleFilterValue => table.cycle_filter(column),
                    KeyAction::ToggleColumn => table.toggle_visibility(column),
                    _ => table.toggle_sort(column),
                }
            }
            KeyAction::CycleFilterValue | KeyAction::ToggleColumn | KeyAction::ToggleSort => {}
            editing => match self.events.input_mode() {
                InputMode::Search | InputMode::Filter => self.edit_line(editing),
                InputMode::Compose => self.edit_compose(editing),
                InputMode::Normal => {}
            },
        }
    }

    /// Run until quit, drawing after every batch of events.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        if let Some(listener) = spawn_event_listener(self.events.sender()) {
            self.background.push(listener);
        }
        self.start();
        info!(page = ?self.page, "Dashboard started");

        while !self.should_quit {
            terminal
                .draw(|frame| self.draw(frame))
                .map_err(|e| TuiError::RenderingFailed {
                    reason: e.to_string(),
                })?;

            let Some(event) = self.events.next_event().await else {
                break;
            };
            self.handle_event(event);
            while let Some(event) = self.events.try_next_event() {
                self.handle_event(event);
            }
        }

        info!("Dashboard stopped");
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        self.render(area, frame.buffer_mut());
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) {
        if let Err(message) = self.layout.check_terminal_size(area) {
            Paragraph::new(message)
                .style(self.theme.get_style(ComponentType::Warning))
                .wrap(Wrap { trim: true })
                .render(area, buf);
            return;
        }

        let shell = self.layout.layout(area);
        let mode = self.events.input_mode();
        let header_loading = self.header.is_loading();

        self.search.render(
            shell.search_area,
            buf,
            &self.theme,
            "Search airline",
            mode == InputMode::Search,
            header_loading,
        );
        self.header.render(shell.header_area, buf, &self.theme);
        if let Some(menu) = shell.menu_area {
            render_menu(menu, buf, &self.theme, self.page);
        }

        let content = shell.content_area;
        match self.page {
            Page::Dashboard => {
                let grid = LayoutManager::dashboard(content);
                self.key_data.render(grid.key_data, buf, &self.theme);
                self.rating_distribution
                    .render(grid.rating_distribution, buf, &self.theme);
                self.sub_item_scoring
                    .render(grid.sub_item_scoring, buf, &self.theme);
                self.wordcloud.render(grid.wordcloud, buf, &self.theme);
                self.top_rated.render(grid.top_rated, buf, &self.theme);
                self.map.render(grid.map, buf, &self.theme);
                self.feature_importance
                    .render(grid.feature_importance, buf, &self.theme);
            }
            Page::ReviewData => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Min(0)])
                    .split(content);
                self.filter.render(
                    rows[0],
                    buf,
                    &self.theme,
                    "Filter reviews",
                    mode == InputMode::Filter,
                    false,
                );
                self.reviews.render(rows[1], buf, &self.theme);
            }
            Page::AnalyticsTool => {
                let (input, result) = LayoutManager::analytics(content);
                self.sentiment
                    .render_input(input, buf, &self.theme, mode == InputMode::Compose);
                self.sentiment.render_result(result, buf, &self.theme);
            }
        }

        self.status_bar(mode)
            .render(shell.status_area, buf, &self.theme);
        self.toasts.render(area, buf, &self.theme);
        if self.show_help {
            PopupDialog::help().render(utils::help_area(area), buf, &self.theme);
        }
    }

    fn status_bar(&self, mode: InputMode) -> StatusBar {
        let mut bar = StatusBar::new();
        let mode_label = match mode {
            InputMode::Normal => "NORMAL",
            InputMode::Search => "SEARCH",
            InputMode::Compose => "COMPOSE",
            InputMode::Filter => "FILTER",
        };
        bar.add_left(StatusItem::new("Mode", mode_label, ComponentType::Info));
        bar.add_left(StatusItem::new(
            "Airline",
            self.store
                .target_airline()
                .unwrap_or_else(|| "none".to_string()),
            ComponentType::Text,
        ));
        bar.add_left(StatusItem::new("Page", self.page.title(), ComponentType::Text));
        bar.add_right(StatusItem::new("F1", "help", ComponentType::Muted));
        bar.add_right(StatusItem::new("q", "quit", ComponentType::Muted));
        bar
    }
}

impl Drop for App {
    fn drop(&mut self) {
        for handle in self.background.drain(..) {
            handle.abort();
        }
    }
}

/// Set up the terminal, run the dashboard and restore the terminal, also
/// when the loop fails.
pub async fn run_dashboard(
    config: Config,
    gateway: Arc<dyn Gateway>,
    store: SelectionStore,
) -> Result<()> {
    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let mut app = App::new(config, gateway, store);
    let outcome = app.run(&mut terminal).await;
    drop(app);
    let restored = restore_terminal();
    outcome.and(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use airsight_client::{Endpoint, MockGateway};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use serde_json::json;

    fn app_with(mock: &MockGateway) -> App {
        App::new(
            Config::default(),
            Arc::new(mock.clone()),
            SelectionStore::new(),
        )
    }

    /// Let spawned requests finish and feed their events back in.
    async fn settle(app: &mut App) {
        for _ in 0..50 {
            tokio::task::yield_now().await;
            while let Some(event) = app.events.try_next_event() {
                app.handle_event(event);
            }
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_event(AppEvent::Input(Event::Key(KeyEvent::new(
            code,
            KeyModifiers::NONE,
        ))));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn screen(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer.get(x, y).symbol.clone())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn mock_airline(mock: &MockGateway, name: &str) {
        let name = name.to_string();
        mock.set_data(
            Endpoint::AirlineInfo(name.clone()),
            json!({"name": name, "image": "logo.png"}),
        );
        mock.set_data(
            Endpoint::KeyData(name.clone()),
            json!({"preferred_route": "AMS to JFK"}),
        );
        mock.set_data(
            Endpoint::RatingDistribution(name.clone()),
            json!({"Seat Comfort": [0.0, 0.1, 0.1, 0.2, 0.3, 0.3]}),
        );
        mock.set_data(
            Endpoint::SubItemScoring(name.clone()),
            json!({"target_airline": {"Seat Comfort": 4.0}, "average_score": {"Seat Comfort": 3.0}}),
        );
        mock.set_data(
            Endpoint::WordcloudData(name.clone()),
            json!({"pos_dict": {"friendly": {"score": 0.9}}, "neg_dict": {}}),
        );
        mock.set_data(
            Endpoint::CityDistribution(name.clone()),
            json!([[4.9, 52.3, 30]]),
        );
        mock.set_data(
            Endpoint::FeatureImportance(name.clone()),
            json!({"seatComfort": 0.4}),
        );
        mock.set_data(Endpoint::Reviews(name), json!([]));
    }

    #[tokio::test]
    async fn test_no_selection_shows_placeholders_without_requests() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, json!([]));
        let mut app = app_with(&mock);
        app.start();
        settle(&mut app).await;

        assert_eq!(mock.calls(), vec!["/airlines/top-rated".to_string()]);
        let text = screen(&mut app, 200, 60);
        assert!(text.contains("Please search an airline first"));
        assert!(text.contains("No top rated data available"));
        assert!(text.contains("No airline selected"));
    }

    #[tokio::test]
    async fn test_search_fetches_every_dashboard_panel() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, json!([]));
        mock_airline(&mock, "KLM");
        let mut app = app_with(&mock);
        app.start();
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode(), InputMode::Search);
        type_text(&mut app, "  KLM ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode(), InputMode::Normal);
        assert_eq!(app.search.content(), "");
        settle(&mut app).await;

        assert_eq!(app.store.target_airline().as_deref(), Some("KLM"));
        // Top rated plus the header and seven dashboard panels
        assert_eq!(mock.call_count(), 8);
        assert_eq!(app.registry.live(), 6);

        let text = screen(&mut app, 200, 60);
        assert!(text.contains("AMS to JFK"));
        assert!(text.contains("logo.png"));
    }

    #[tokio::test]
    async fn test_failed_panel_request_raises_toast() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, json!([]));
        mock_airline(&mock, "KLM");
        mock.set_status(Endpoint::KeyData("KLM".to_string()), 500, "database down");
        let mut app = app_with(&mock);
        app.start();
        app.store.set_target_airline("KLM");
        settle(&mut app).await;

        assert_eq!(app.toasts.len(), 1);
        let text = screen(&mut app, 200, 60);
        assert!(text.contains("database down"));
        assert!(text.contains("No key data available"));
    }

    #[tokio::test]
    async fn test_leaving_dashboard_releases_charts_and_refetches_on_return() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, json!([]));
        mock_airline(&mock, "KLM");
        let mut app = app_with(&mock);
        app.start();
        app.store.set_target_airline("KLM");
        settle(&mut app).await;
        assert_eq!(app.registry.live(), 6);
        let before = mock.call_count();

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.page(), Page::ReviewData);
        assert_eq!(app.registry.live(), 0);
        settle(&mut app).await;
        assert_eq!(mock.call_count(), before + 1);

        press(&mut app, KeyCode::Char('1'));
        settle(&mut app).await;
        assert_eq!(mock.call_count(), before + 1 + 7);
        assert_eq!(app.registry.live(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentiment_reset_before_response_clears_result() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, json!([]));
        mock.set_data(
            Endpoint::SentimentSubmit,
            json!({"text": "ok", "score": 0.2, "sent_lab": "positive"}),
        );
        mock.set_delay(Endpoint::SentimentSubmit, Duration::from_secs(1));
        let mut app = app_with(&mock);
        app.start();

        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.page(), Page::AnalyticsTool);
        assert_eq!(app.input_mode(), InputMode::Compose);
        type_text(&mut app, "ok");
        press(&mut app, KeyCode::Enter);
        assert!(app.sentiment.is_loading());

        press(&mut app, KeyCode::Char('c'));
        assert!(!app.sentiment.is_loading());
        tokio::time::sleep(Duration::from_secs(2)).await;
        settle(&mut app).await;

        assert!(app.store.sentiment().is_none());
        assert!(app.sentiment.result().is_none());
        assert!(app.sentiment.input().is_blank());
    }

    #[tokio::test]
    async fn test_sentiment_result_card_renders_highlights() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, json!([]));
        mock.set_data(
            Endpoint::SentimentSubmit,
            json!({
                "text": "Great seat, bad food",
                "score": 0.41,
                "sent_lab": "positive",
                "pos_dict": {"great": {"score": 0.812}},
                "neg_dict": {"bad": {"score": -0.5}}
            }),
        );
        let mut app = app_with(&mock);
        app.start();

        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "Great seat, bad food");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        assert_eq!(app.store.sentiment().map(|r| r.score), Some(0.41));
        press(&mut app, KeyCode::Right);
        let text = screen(&mut app, 160, 40);
        assert!(text.contains("Great seat, bad food"));
        assert!(text.contains("\"Great\" positive 0.812"));
    }

    #[tokio::test]
    async fn test_review_filter_mode_filters_live() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, json!([]));
        mock_airline(&mock, "KLM");
        mock.set_data(
            Endpoint::Reviews("KLM".to_string()),
            json!([
                {"title": "Late again", "country": "Peru", "score": 2},
                {"title": "Lovely crew", "country": "Chile", "score": 9}
            ]),
        );
        let mut app = app_with(&mock);
        app.start();
        app.store.set_target_airline("KLM");
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.page(), Page::ReviewData);
        settle(&mut app).await;
        type_text(&mut app, "chile");
        assert_eq!(app.reviews.table().filtered_len(), 1);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode(), InputMode::Normal);

        let text = screen(&mut app, 160, 30);
        assert!(text.contains("Lovely crew"));
        assert!(!text.contains("Late again"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_refused_while_header_loads() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, json!([]));
        mock_airline(&mock, "KLM");
        mock.set_delay(Endpoint::AirlineInfo("KLM".to_string()), Duration::from_secs(1));
        let mut app = app_with(&mock);
        app.start();
        app.store.set_target_airline("KLM");
        settle(&mut app).await;
        assert!(app.header.is_loading());

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.store.target_airline().as_deref(), Some("KLM"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle(&mut app).await;
        assert!(!app.header.is_loading());
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.store.target_airline(), None);
    }

    #[tokio::test]
    async fn test_small_terminal_shows_size_warning() {
        let mock = MockGateway::new();
        let mut app = app_with(&mock);

        let text = screen(&mut app, 60, 20);
        assert!(text.contains("too small"));
        assert!(!text.contains("AirSight"));
    }

    #[tokio::test]
    async fn test_help_and_quit_keys() {
        let mock = MockGateway::new().with_data(Endpoint::TopRated, json!([]));
        let mut app = app_with(&mock);

        press(&mut app, KeyCode::F(1));
        let text = screen(&mut app, 120, 40);
        assert!(text.contains("Toggle this help"));
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }
}
