mod app;
mod catalog;
mod config;
mod dish;
mod http;
mod logging;
mod router;
mod ui;

use app::{App, InputMode, PickerKind, View, dish_from_body};
use catalog::{Catalog, DropdownField, SortKey};
use clap::{Parser, Subcommand, ValueEnum};
use config::{BASE_URL_ENV, Config, DEFAULT_BASE_URL};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dish::{Dish, minutes_or_na};
use http::HttpClient;
use indicatif::{ProgressBar, ProgressStyle};
use router::Route;
use std::time::Duration;
use tracing::{error, info};

/// TUI explorer for a REST catalog of food dishes
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the dish API
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Path to open on startup ("/" or "/dish/<id>")
    #[arg(long, default_value = "/")]
    route: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the TUI explorer (default)
    Run {
        /// Path to open on startup ("/" or "/dish/<id>")
        #[arg(long, default_value = "/")]
        route: String,
    },
    /// Print a single dish
    Show {
        /// Dish identifier
        id: i64,
    },
    /// Print one page of the dish list
    List {
        /// Free-text search over name, course and ingredients
        #[arg(long, group = "filter")]
        search: Option<String>,
        /// Exact diet
        #[arg(long, group = "filter")]
        diet: Option<String>,
        /// Exact flavor profile
        #[arg(long, group = "filter")]
        flavor: Option<String>,
        /// Exact state code
        #[arg(long, group = "filter")]
        state: Option<i64>,
        /// Required ingredient (repeatable, all must match)
        #[arg(long = "ingredient", group = "filter")]
        ingredients: Vec<String>,
        /// Sort column
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Page to print (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Prep,
    Cook,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortKey::Name,
            SortArg::Prep => SortKey::PrepTime,
            SortArg::Cook => SortKey::CookTime,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Warning: Failed to initialize logging: {e}");
    }

    let config = Config::new(&cli.base_url)?;
    let client = HttpClient::new(config.base_url)?;

    // Normalize command
    let command = cli.command.unwrap_or(Commands::Run { route: cli.route });

    match command {
        Commands::Run { route } => {
            info!("Starting TUI against {}", client.base_url());
            let mut app = App::new(client);
            app.navigate(Route::parse(&route));

            // Init terminal
            let mut terminal = ratatui::init();

            // Main loop
            let result = run_app(&mut terminal, &mut app).await;

            // Restore terminal
            ratatui::restore();

            if let Err(e) = result {
                error!("TUI loop failed: {e}");
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Show { id } => {
            let spinner = spinner(format!("Fetching dish {id}..."))?;
            let result = client.get(&format!("/{id}"), &()).await;
            spinner.finish_and_clear();

            match result.map(dish_from_body) {
                Ok(Some(dish)) => {
                    println!("{}", dish.name);
                    println!("{}", ui::detail::plain_text(&ui::detail::detail_lines(&dish)));
                }
                Ok(None) => {
                    eprintln!("Dish not found");
                    std::process::exit(1);
                }
                Err(e) => {
                    error!(status = ?e.status(), "show {id} failed: {e}");
                    eprintln!("Error: {}", e.user_message());
                    std::process::exit(1);
                }
            }
        }
        Commands::List {
            search,
            diet,
            flavor,
            state,
            ingredients,
            sort,
            desc,
            page,
        } => {
            let spinner = spinner("Fetching dishes...".to_string())?;
            let result = client.get_as::<Vec<Dish>, _>("/", &()).await;
            spinner.finish_and_clear();

            let dishes = match result {
                Ok(dishes) => dishes,
                Err(e) => {
                    error!(status = ?e.status(), "list failed: {e}");
                    eprintln!("Error: {}", e.user_message());
                    std::process::exit(1);
                }
            };

            let mut catalog = Catalog::new(dishes);
            if let Some(term) = search {
                catalog.search(&term);
            } else if let Some(diet) = diet {
                catalog.filter_diet(&diet);
            } else if let Some(flavor) = flavor {
                catalog.filter_flavor(&flavor);
            } else if let Some(state) = state {
                catalog.filter_state(state);
            } else if !ingredients.is_empty() {
                catalog.select_ingredients(&ingredients);
            }
            if let Some(sort) = sort {
                catalog.sort_by(sort.into());
                if desc {
                    catalog.sort_by(sort.into());
                }
            }
            catalog.go_to_page(page);

            print!("{}", format_page(&catalog));
        }
    }

    Ok(())
}

fn spinner(message: String) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Plain-text table of the catalog's current page.
fn format_page(catalog: &Catalog) -> String {
    let mut out = format!(
        "{:<6} {:<32} {:<16} {:<14} {:<14} {:<15} {:<15}\n",
        "ID", "Dish Name", "Diet", "Flavor", "Course", "Prep Time", "Cook Time"
    );
    for d in catalog.page_items() {
        out.push_str(&format!(
            "{:<6} {:<32} {:<16} {:<14} {:<14} {:<15} {:<15}\n",
            d.id,
            ui::list::truncate_str(&d.name, 32),
            d.diet_label(),
            d.flavor_label(),
            d.course_label(),
            minutes_or_na(d.prep_time, "mins"),
            minutes_or_na(d.cook_time, "mins"),
        ));
    }
    out.push_str(&format!(
        "Page {} / {} ({} dishes, {})\n",
        catalog.page(),
        catalog.total_pages(),
        catalog.visible_len(),
        catalog.filter().describe()
    ));
    out
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.drain_events();
        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Short poll so fetch results show up promptly
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key(app, key);
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Help toggle (global)
    if key.code == KeyCode::Char('?')
        && app.input_mode == InputMode::Normal
        && app.picker.is_none()
    {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.picker.is_some() {
        handle_picker_key(app, key);
        return;
    }

    if app.input_mode == InputMode::Editing {
        handle_search_input(app, key);
        return;
    }

    match app.view {
        View::List => handle_list_key(app, key),
        View::Detail => handle_detail_key(app, key),
        View::NotFound => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter) {
                app.navigate(Route::Dishes);
            }
        }
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.pop_search();
        }
        KeyCode::Char(c) => {
            app.push_search(c);
        }
        _ => {}
    }
}

fn handle_picker_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.picker = None;
            return;
        }
        KeyCode::Enter => {
            app.confirm_picker();
            return;
        }
        _ => {}
    }

    let Some(picker) = app.picker.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Down => picker.next(),
        KeyCode::Up => picker.prev(),
        KeyCode::Char(' ') if picker.kind == PickerKind::Ingredients => {
            picker.toggle_current();
        }
        KeyCode::Backspace => picker.pop_query(),
        KeyCode::Char(c) => picker.push_query(c),
        _ => {}
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('r') => {
            app.load_dishes();
        }
        KeyCode::Esc => {
            app.clear_filters();
        }
        _ if app.catalog().is_none() => {}
        KeyCode::Char('/') => {
            app.start_search();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.list_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.list_prev();
        }
        KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => {
            app.page_down();
        }
        KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => {
            app.page_up();
        }
        KeyCode::Char('g') => {
            app.first_page();
        }
        KeyCode::Char('G') => {
            app.last_page();
        }
        KeyCode::Enter => {
            app.open_selected();
        }
        KeyCode::Char('d') => app.open_picker(PickerKind::Dropdown(DropdownField::Diet)),
        KeyCode::Char('f') => app.open_picker(PickerKind::Dropdown(DropdownField::Flavor)),
        KeyCode::Char('t') => app.open_picker(PickerKind::Dropdown(DropdownField::State)),
        KeyCode::Char('i') => app.open_picker(PickerKind::Ingredients),
        KeyCode::Char(c @ '1'..='3') => {
            let key = SortKey::ALL[(c as u8 - b'1') as usize];
            app.update_catalog(|catalog| catalog.sort_by(key));
        }
        KeyCode::Char('s') => {
            app.update_catalog(Catalog::clear_sort);
        }
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => {
            app.navigate(Route::Dishes);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll_down();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll_up();
        }
        KeyCode::PageDown => {
            app.scroll_page_down();
        }
        KeyCode::PageUp => {
            app.scroll_page_up();
        }
        KeyCode::Char('r') => {
            if let Route::Dish(id) = app.route {
                app.load_dish(id);
            }
        }
        _ => {}
    }
}
