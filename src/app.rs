use crate::catalog::{Catalog, DropdownField, PAGE_SIZE};
use crate::dish::Dish;
use crate::http::HttpClient;
use crate::router::Route;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Which view is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Detail,
    NotFound,
}

/// Input mode for the search bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Dish list load state.
#[derive(Debug)]
pub enum ListState {
    Loading,
    Failed(String),
    Ready(Catalog),
}

/// Dish detail load state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    Loaded(Box<Dish>),
    NotFound,
    Failed(String),
}

/// Results delivered by background fetch tasks.
#[derive(Debug)]
pub enum AppEvent {
    DishesLoaded {
        seq: u64,
        result: Result<Vec<Dish>, String>,
    },
    DishLoaded {
        seq: u64,
        id: i64,
        result: Result<Option<Dish>, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Dropdown(DropdownField),
    Ingredients,
}

impl PickerKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Dropdown(DropdownField::Diet) => "Filter by Diet",
            Self::Dropdown(DropdownField::Flavor) => "Filter by Flavor",
            Self::Dropdown(DropdownField::State) => "Filter by State",
            Self::Ingredients => "Select Ingredients",
        }
    }
}

/// Option list overlay standing in for the web app's select boxes.
#[derive(Debug, Clone)]
pub struct Picker {
    pub kind: PickerKind,
    pub options: Vec<String>,
    pub query: String,
    /// Index into `matches()`.
    pub selected: usize,
    /// Ticked entries (ingredients only).
    pub checked: Vec<String>,
}

impl Picker {
    pub fn new(kind: PickerKind, options: Vec<String>, checked: Vec<String>) -> Self {
        Self {
            kind,
            options,
            query: String::new(),
            selected: 0,
            checked,
        }
    }

    /// Options containing the typed query.
    pub fn matches(&self) -> Vec<&str> {
        let query = self.query.to_lowercase();
        self.options
            .iter()
            .filter(|o| o.to_lowercase().contains(&query))
            .map(String::as_str)
            .collect()
    }

    pub fn current(&self) -> Option<&str> {
        self.matches().get(self.selected).copied()
    }

    pub fn next(&mut self) {
        if self.selected + 1 < self.matches().len() {
            self.selected += 1;
        }
    }

    pub fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.selected = 0;
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
        self.selected = 0;
    }

    pub fn toggle_current(&mut self) {
        let Some(current) = self.current().map(str::to_string) else {
            return;
        };
        if let Some(pos) = self.checked.iter().position(|c| *c == current) {
            self.checked.remove(pos);
        } else {
            self.checked.push(current);
        }
    }

    pub fn is_checked(&self, option: &str) -> bool {
        self.checked.iter().any(|c| c == option)
    }
}

struct InFlight {
    seq: u64,
    handle: JoinHandle<()>,
}

impl InFlight {
    fn abort(self) {
        self.handle.abort();
    }
}

/// Main application state.
pub struct App {
    client: HttpClient,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    next_seq: u64,
    list_fetch: Option<InFlight>,
    detail_fetch: Option<InFlight>,

    pub should_quit: bool,
    pub route: Route,
    pub view: View,
    pub show_help: bool,

    // List view state
    pub list: ListState,
    pub list_selected: usize,
    pub search_input: String,
    pub input_mode: InputMode,
    pub picker: Option<Picker>,

    // Detail view state
    pub detail: DetailState,
    pub detail_scroll: u16,

    // Status message
    pub status_msg: String,
}

impl App {
    pub fn new(client: HttpClient) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            client,
            events_tx,
            events_rx,
            next_seq: 0,
            list_fetch: None,
            detail_fetch: None,

            should_quit: false,
            route: Route::Dishes,
            view: View::List,
            show_help: false,

            list: ListState::Loading,
            list_selected: 0,
            search_input: String::new(),
            input_mode: InputMode::Normal,
            picker: None,

            detail: DetailState::Loading,
            detail_scroll: 0,

            status_msg: String::new(),
        }
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        match &self.list {
            ListState::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }

    pub fn catalog_mut(&mut self) -> Option<&mut Catalog> {
        match &mut self.list {
            ListState::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }

    // ── Routing ──

    /// Switch to the view for `route`, starting whatever fetch it needs.
    pub fn navigate(&mut self, route: Route) {
        debug!("navigate: {} -> {}", self.route, route);
        if let Some(fetch) = self.detail_fetch.take() {
            debug!("cancelling detail fetch #{}", fetch.seq);
            fetch.abort();
        }
        self.route = route.clone();

        match route {
            Route::Dishes => {
                self.view = View::List;
                if matches!(self.list, ListState::Failed(_))
                    || (matches!(self.list, ListState::Loading) && self.list_fetch.is_none())
                {
                    self.load_dishes();
                }
            }
            Route::Dish(id) => {
                self.view = View::Detail;
                self.load_dish(id);
            }
            Route::NotFound(path) => {
                self.view = View::NotFound;
                self.status_msg = format!("No page at {path}");
            }
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Fetch the whole collection, replacing any earlier load in flight.
    pub fn load_dishes(&mut self) {
        if let Some(fetch) = self.list_fetch.take() {
            fetch.abort();
        }
        let seq = self.next_seq();
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            let result = client
                .get_as::<Vec<Dish>, _>("/", &())
                .await
                .map_err(|e| e.user_message());
            let _ = tx.send(AppEvent::DishesLoaded { seq, result });
        });

        self.list = ListState::Loading;
        self.list_selected = 0;
        self.status_msg = "Loading dishes...".to_string();
        self.list_fetch = Some(InFlight { seq, handle });
    }

    /// Fetch a single dish for the detail view.
    pub fn load_dish(&mut self, id: i64) {
        if let Some(fetch) = self.detail_fetch.take() {
            fetch.abort();
        }
        let seq = self.next_seq();
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            let result = client
                .get(&format!("/{id}"), &())
                .await
                .map(dish_from_body)
                .map_err(|e| e.user_message());
            let _ = tx.send(AppEvent::DishLoaded { seq, id, result });
        });

        self.detail = DetailState::Loading;
        self.detail_scroll = 0;
        self.detail_fetch = Some(InFlight { seq, handle });
    }

    /// Apply every fetch result that has arrived since the last call.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::DishesLoaded { seq, result } => {
                if self.list_fetch.as_ref().map(|f| f.seq) != Some(seq) {
                    debug!("dropping stale dish list result #{seq}");
                    return;
                }
                self.list_fetch = None;
                match result {
                    Ok(dishes) => {
                        info!("loaded {} dishes", dishes.len());
                        self.status_msg = format!("{} dishes loaded", dishes.len());
                        self.list = ListState::Ready(Catalog::new(dishes));
                        self.search_input.clear();
                        self.input_mode = InputMode::Normal;
                    }
                    Err(message) => {
                        warn!("dish list failed: {message}");
                        self.status_msg.clear();
                        self.list = ListState::Failed(message);
                    }
                }
                self.list_selected = 0;
            }
            AppEvent::DishLoaded { seq, id, result } => {
                if self.detail_fetch.as_ref().map(|f| f.seq) != Some(seq) {
                    debug!("dropping stale result #{seq} for dish {id}");
                    return;
                }
                self.detail_fetch = None;
                self.detail = match result {
                    Ok(Some(dish)) => DetailState::Loaded(Box::new(dish)),
                    Ok(None) => {
                        info!("dish {id} not found");
                        DetailState::NotFound
                    }
                    Err(message) => {
                        warn!("dish {id} failed: {message}");
                        DetailState::Failed(message)
                    }
                };
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_list_seq(&self) -> Option<u64> {
        self.list_fetch.as_ref().map(|f| f.seq)
    }

    #[cfg(test)]
    pub(crate) fn pending_detail_seq(&self) -> Option<u64> {
        self.detail_fetch.as_ref().map(|f| f.seq)
    }

    // ── List view ──

    pub fn page_len(&self) -> usize {
        self.catalog().map(|c| c.page_items().len()).unwrap_or(0)
    }

    pub fn selected_dish(&self) -> Option<&Dish> {
        self.catalog()?.page_items().get(self.list_selected).copied()
    }

    /// Move selection down, rolling over to the next page.
    pub fn list_next(&mut self) {
        if self.list_selected + 1 < self.page_len() {
            self.list_selected += 1;
        } else if self.catalog_mut().is_some_and(|c| c.next_page()) {
            self.list_selected = 0;
        }
    }

    /// Move selection up, rolling back to the previous page.
    pub fn list_prev(&mut self) {
        if self.list_selected > 0 {
            self.list_selected -= 1;
        } else if self.catalog_mut().is_some_and(|c| c.prev_page()) {
            self.list_selected = self.page_len().saturating_sub(1);
        }
    }

    pub fn page_down(&mut self) {
        if self.catalog_mut().is_some_and(|c| c.next_page()) {
            self.list_selected = 0;
        }
    }

    pub fn page_up(&mut self) {
        if self.catalog_mut().is_some_and(|c| c.prev_page()) {
            self.list_selected = 0;
        }
    }

    pub fn first_page(&mut self) {
        if let Some(catalog) = self.catalog_mut() {
            catalog.first_page();
        }
        self.list_selected = 0;
    }

    pub fn last_page(&mut self) {
        if let Some(catalog) = self.catalog_mut() {
            catalog.last_page();
        }
        self.list_selected = self.page_len().saturating_sub(1);
    }

    pub fn open_selected(&mut self) {
        if let Some(id) = self.selected_dish().map(|d| d.id) {
            self.navigate(Route::Dish(id));
        }
    }

    /// Run `f` against the catalog, then reset selection and report the result.
    pub fn update_catalog<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Catalog),
    {
        let Some(catalog) = self.catalog_mut() else {
            return;
        };
        f(catalog);
        let summary = format!(
            "{} dishes for {}",
            catalog.visible_len(),
            catalog.filter().describe()
        );
        let search = catalog.filter().search_term().map(str::to_string);

        if self.input_mode == InputMode::Normal {
            self.search_input = search.unwrap_or_default();
        }
        self.list_selected = 0;
        self.status_msg = summary;
    }

    pub fn start_search(&mut self) {
        if self.catalog().is_some() {
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn push_search(&mut self, c: char) {
        self.search_input.push(c);
        let term = self.search_input.clone();
        self.update_catalog(|c| c.search(&term));
    }

    pub fn pop_search(&mut self) {
        self.search_input.pop();
        let term = self.search_input.clone();
        self.update_catalog(|c| c.search(&term));
    }

    pub fn clear_filters(&mut self) {
        self.update_catalog(Catalog::clear_filter);
        self.search_input.clear();
    }

    pub fn open_picker(&mut self, kind: PickerKind) {
        let Some(catalog) = self.catalog() else {
            return;
        };
        let picker = match kind {
            PickerKind::Dropdown(field) => Picker::new(kind, catalog.options(field), Vec::new()),
            PickerKind::Ingredients => Picker::new(
                kind,
                catalog.ingredient_options().to_vec(),
                catalog.filter().selected_ingredients().to_vec(),
            ),
        };
        self.picker = Some(picker);
    }

    /// Apply the picker's choice and close it.
    pub fn confirm_picker(&mut self) {
        let Some(picker) = self.picker.take() else {
            return;
        };
        match picker.kind {
            PickerKind::Dropdown(field) => {
                if let Some(value) = picker.current().map(str::to_string) {
                    self.update_catalog(|c| c.apply_dropdown(field, &value));
                }
            }
            PickerKind::Ingredients => {
                let checked = picker.checked;
                self.update_catalog(|c| c.select_ingredients(&checked));
            }
        }
    }

    // ── Detail view ──

    pub fn scroll_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
    }

    pub fn scroll_page_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(PAGE_SIZE as u16);
    }

    pub fn scroll_page_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(PAGE_SIZE as u16);
    }
}

/// Interpret a detail response body; `None` when it holds no usable dish.
pub fn dish_from_body(body: Value) -> Option<Dish> {
    if body.is_null() {
        return None;
    }
    match serde_json::from_value(body) {
        Ok(dish) => Some(dish),
        Err(e) => {
            debug!("detail body is not a dish: {e}");
            None
        }
    }
}
