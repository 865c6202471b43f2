use crate::dish::{Dish, SENTINEL_CODE, SENTINEL_TEXT, normalize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

pub const PAGE_SIZE: usize = 10;

/// Sortable columns of the dish table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    PrepTime,
    CookTime,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [Self::Name, Self::PrepTime, Self::CookTime];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Dish Name",
            Self::PrepTime => "Prep Time",
            Self::CookTime => "Cook Time",
        }
    }

    fn compare(self, a: &Dish, b: &Dish) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::PrepTime => a.prep_time.cmp(&b.prep_time),
            Self::CookTime => a.cook_time.cmp(&b.cook_time),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// Single-value equality filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownField {
    Diet,
    Flavor,
    State,
}

impl DropdownField {
    pub const ALL: [DropdownField; 3] = [Self::Diet, Self::Flavor, Self::State];

    pub fn label(self) -> &'static str {
        match self {
            Self::Diet => "Diet",
            Self::Flavor => "Flavor",
            Self::State => "State",
        }
    }
}

/// The one filter currently narrowing the list. Choosing another replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    Search(String),
    Diet(String),
    Flavor(String),
    State(i64),
    /// Normalized ingredient names; every one must be present.
    Ingredients(Vec<String>),
}

impl FilterMode {
    pub fn matches(&self, dish: &Dish) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Search(term) => matches_search(dish, term),
            FilterMode::Diet(diet) => dish.diet == *diet,
            FilterMode::Flavor(flavor) => dish.flavor_profile == *flavor,
            FilterMode::State(code) => dish.state.as_num() == Some(*code),
            FilterMode::Ingredients(selected) => matches_ingredients(dish, selected),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FilterMode::All => "all dishes".to_string(),
            FilterMode::Search(term) => format!("search \"{term}\""),
            FilterMode::Diet(diet) => format!("diet = {diet}"),
            FilterMode::Flavor(flavor) => format!("flavor = {flavor}"),
            FilterMode::State(code) => format!("state = {code}"),
            FilterMode::Ingredients(selected) => format!("ingredients: {}", selected.join(" + ")),
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        match self {
            FilterMode::Search(term) => Some(term),
            _ => None,
        }
    }

    pub fn selected_ingredients(&self) -> &[String] {
        match self {
            FilterMode::Ingredients(selected) => selected,
            _ => &[],
        }
    }

    /// Display value of the dropdown filter on `field`, if that one is active.
    pub fn dropdown_value(&self, field: DropdownField) -> Option<String> {
        match (self, field) {
            (FilterMode::Diet(v), DropdownField::Diet) => Some(v.clone()),
            (FilterMode::Flavor(v), DropdownField::Flavor) => Some(v.clone()),
            (FilterMode::State(c), DropdownField::State) => Some(c.to_string()),
            _ => None,
        }
    }
}

/// Case-insensitive substring match on name, course or any ingredient.
pub fn matches_search(dish: &Dish, term: &str) -> bool {
    let term = term.to_lowercase();
    dish.name.to_lowercase().contains(&term)
        || dish.course.to_lowercase().contains(&term)
        || dish
            .ingredients
            .iter()
            .any(|i| i.to_lowercase().contains(&term))
}

/// True when every selected ingredient appears in the dish.
pub fn matches_ingredients(dish: &Dish, selected: &[String]) -> bool {
    let have: Vec<String> = dish.normalized_ingredients().collect();
    selected.iter().all(|s| have.contains(&normalize(s)))
}

/// In-memory dish collection plus the derived, filtered and sorted view of it.
#[derive(Debug, Clone)]
pub struct Catalog {
    dishes: Vec<Dish>,
    ingredient_options: Vec<String>,
    diet_options: Vec<String>,
    flavor_options: Vec<String>,
    state_options: Vec<i64>,

    filter: FilterMode,
    sort: Option<SortSpec>,
    /// 1-based.
    page: usize,
    /// Indices into `dishes`, filtered and sorted.
    visible: Vec<usize>,
}

impl Catalog {
    pub fn new(dishes: Vec<Dish>) -> Self {
        let ingredient_options = dishes
            .iter()
            .flat_map(|d| d.normalized_ingredients())
            .filter(|i| !i.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let diet_options = distinct_text(&dishes, |d| &d.diet);
        let flavor_options = distinct_text(&dishes, |d| &d.flavor_profile);
        let state_options = dishes
            .iter()
            .filter_map(|d| d.state.as_num())
            .filter(|&s| s != SENTINEL_CODE)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut catalog = Self {
            dishes,
            ingredient_options,
            diet_options,
            flavor_options,
            state_options,
            filter: FilterMode::All,
            sort: None,
            page: 1,
            visible: Vec::new(),
        };
        catalog.refresh();
        catalog
    }

    pub fn dishes(&self) -> &[Dish] {
        &self.dishes
    }

    pub fn filter(&self) -> &FilterMode {
        &self.filter
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn ingredient_options(&self) -> &[String] {
        &self.ingredient_options
    }

    /// Choices for a dropdown filter, as display strings.
    pub fn options(&self, field: DropdownField) -> Vec<String> {
        match field {
            DropdownField::Diet => self.diet_options.clone(),
            DropdownField::Flavor => self.flavor_options.clone(),
            DropdownField::State => self.state_options.iter().map(|c| c.to_string()).collect(),
        }
    }

    // ── Filter transitions ──

    /// Free-text search. An empty term drops an active search and is otherwise ignored.
    pub fn search(&mut self, term: &str) {
        if term.is_empty() {
            if matches!(self.filter, FilterMode::Search(_)) {
                self.set_filter(FilterMode::All);
            }
            return;
        }
        self.set_filter(FilterMode::Search(term.to_string()));
    }

    pub fn filter_diet(&mut self, diet: &str) {
        self.set_filter(FilterMode::Diet(diet.to_string()));
    }

    pub fn filter_flavor(&mut self, flavor: &str) {
        self.set_filter(FilterMode::Flavor(flavor.to_string()));
    }

    pub fn filter_state(&mut self, code: i64) {
        self.set_filter(FilterMode::State(code));
    }

    /// Apply a dropdown choice given as its display string.
    pub fn apply_dropdown(&mut self, field: DropdownField, value: &str) {
        match field {
            DropdownField::Diet => self.filter_diet(value),
            DropdownField::Flavor => self.filter_flavor(value),
            DropdownField::State => match value.trim().parse::<i64>() {
                Ok(code) => self.filter_state(code),
                Err(_) => debug!("ignoring non-numeric state option {value:?}"),
            },
        }
    }

    /// Replace the ingredient selection. An empty selection shows everything.
    pub fn select_ingredients<I, S>(&mut self, ingredients: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: Vec<String> = Vec::new();
        for ingredient in ingredients {
            let name = normalize(ingredient.as_ref());
            if !name.is_empty() && !selected.contains(&name) {
                selected.push(name);
            }
        }
        if selected.is_empty() {
            self.set_filter(FilterMode::All);
        } else {
            self.set_filter(FilterMode::Ingredients(selected));
        }
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(FilterMode::All);
    }

    fn set_filter(&mut self, filter: FilterMode) {
        debug!("filter: {:?} -> {:?}", self.filter, filter);
        self.filter = filter;
        self.refresh();
    }

    // ── Sorting ──

    /// Column header activation: the active key flips ascending to descending,
    /// anything else sorts ascending.
    pub fn sort_by(&mut self, key: SortKey) {
        let direction = match self.sort {
            Some(SortSpec {
                key: current,
                direction: SortDirection::Ascending,
            }) if current == key => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortSpec { key, direction });
        debug!("sort: {:?}", self.sort);
        self.refresh();
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.refresh();
    }

    /// Recompute the visible set and go back to the first page.
    fn refresh(&mut self) {
        self.visible = self
            .dishes
            .iter()
            .enumerate()
            .filter(|(_, d)| self.filter.matches(d))
            .map(|(i, _)| i)
            .collect();

        if let Some(spec) = self.sort {
            let dishes = &self.dishes;
            self.visible.sort_by(|&a, &b| {
                let ordering = spec.key.compare(&dishes[a], &dishes[b]);
                match spec.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        self.page = 1;
    }

    // ── Pagination ──

    /// Number of dishes passing the current filter.
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Dish> + '_ {
        self.visible.iter().map(|&i| &self.dishes[i])
    }

    pub fn total_pages(&self) -> usize {
        self.visible.len().div_ceil(PAGE_SIZE)
    }

    /// Current page, 1-based; 0 when there is nothing to show.
    pub fn page(&self) -> usize {
        self.page.min(self.total_pages())
    }

    pub fn page_items(&self) -> Vec<&Dish> {
        if self.total_pages() == 0 {
            return Vec::new();
        }
        self.visible()
            .skip((self.page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect()
    }

    /// Jump to `page`, clamped to the available range.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
    }

    pub fn next_page(&mut self) -> bool {
        let before = self.page;
        self.go_to_page(self.page + 1);
        self.page != before
    }

    pub fn prev_page(&mut self) -> bool {
        let before = self.page;
        self.go_to_page(self.page.saturating_sub(1));
        self.page != before
    }

    pub fn first_page(&mut self) {
        self.go_to_page(1);
    }

    pub fn last_page(&mut self) {
        self.go_to_page(self.total_pages());
    }
}

fn distinct_text<F>(dishes: &[Dish], field: F) -> Vec<String>
where
    F: Fn(&Dish) -> &String,
{
    dishes
        .iter()
        .map(|d| field(d).as_str())
        .filter(|v| !v.is_empty() && v.trim() != SENTINEL_TEXT)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dish::{Code, sample};
    use proptest::prelude::*;

    fn menu() -> Vec<Dish> {
        let mut dishes = vec![
            sample(1, "Aloo gobi", &["Potato", "cauliflower", " Ginger"]),
            sample(2, "Dal makhani", &["black lentils", "butter", "ginger"]),
            sample(3, "Gajar halwa", &["carrots", "milk", "sugar", "ghee"]),
            sample(4, "Chicken tikka", &["chicken", "yogurt", "GINGER", "garlic"]),
            sample(5, "Palak paneer", &["spinach", "paneer", "garlic"]),
        ];
        dishes[1].prep_time = 30;
        dishes[2].prep_time = -1;
        dishes[2].diet = "vegetarian".to_string();
        dishes[2].flavor_profile = "sweet".to_string();
        dishes[2].course = "dessert".to_string();
        dishes[3].diet = "non vegetarian".to_string();
        dishes[3].prep_time = 5;
        dishes[3].state = 9.into();
        dishes[4].flavor_profile = "-1".to_string();
        dishes[4].prep_time = 15;
        dishes
    }

    fn many(n: usize) -> Vec<Dish> {
        (0..n as i64)
            .map(|i| sample(i, &format!("Dish {i:03}"), &["salt"]))
            .collect()
    }

    fn ids<'a>(dishes: impl IntoIterator<Item = &'a Dish>) -> Vec<i64> {
        dishes.into_iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_ingredient_options_are_normalized_and_sorted() {
        let catalog = Catalog::new(menu());
        let options = catalog.ingredient_options();
        assert_eq!(options.iter().filter(|o| *o == "ginger").count(), 1);
        assert!(options.contains(&"potato".to_string()));
        assert!(options.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_dropdown_options_skip_sentinel() {
        let catalog = Catalog::new(menu());
        assert_eq!(
            catalog.options(DropdownField::Flavor),
            vec!["spicy".to_string(), "sweet".to_string()]
        );
        assert_eq!(
            catalog.options(DropdownField::State),
            vec!["1".to_string(), "9".to_string()]
        );
    }

    #[test]
    fn test_named_states_stay_out_of_code_filter() {
        let mut dishes = menu();
        dishes[0].state = Code::Text("Punjab".to_string());
        dishes[1].state = Code::sentinel();
        let mut catalog = Catalog::new(dishes);
        assert_eq!(
            catalog.options(DropdownField::State),
            vec!["1".to_string(), "9".to_string()]
        );

        catalog.filter_state(1);
        assert_eq!(ids(catalog.visible()), vec![3, 5]);
    }

    #[test]
    fn test_ingredient_filter_is_conjunctive() {
        let mut catalog = Catalog::new(menu());
        catalog.select_ingredients(["Ginger"]);
        assert_eq!(ids(catalog.visible()), vec![1, 2, 4]);

        catalog.select_ingredients(["ginger", " garlic "]);
        assert_eq!(ids(catalog.visible()), vec![4]);

        catalog.select_ingredients(["ginger", "milk"]);
        assert_eq!(catalog.visible_len(), 0);
    }

    #[test]
    fn test_search_matches_name_course_and_ingredients() {
        let mut catalog = Catalog::new(menu());
        catalog.search("DAL");
        assert_eq!(ids(catalog.visible()), vec![2]);

        catalog.search("dessert");
        assert_eq!(ids(catalog.visible()), vec![3]);

        catalog.search("pan");
        // "paneer" ingredient and "Palak paneer" name
        assert_eq!(ids(catalog.visible()), vec![5]);

        catalog.search("");
        assert_eq!(catalog.filter(), &FilterMode::All);
        assert_eq!(catalog.visible_len(), 5);
    }

    #[test]
    fn test_empty_search_keeps_other_filter() {
        let mut catalog = Catalog::new(menu());
        catalog.filter_diet("non vegetarian");
        catalog.search("");
        assert_eq!(catalog.filter(), &FilterMode::Diet("non vegetarian".to_string()));
    }

    #[test]
    fn test_dropdown_filters_are_exact() {
        let mut catalog = Catalog::new(menu());
        catalog.filter_diet("vegetarian");
        assert_eq!(ids(catalog.visible()), vec![1, 2, 3, 5]);

        catalog.filter_flavor("sweet");
        assert_eq!(ids(catalog.visible()), vec![3]);

        catalog.apply_dropdown(DropdownField::State, "9");
        assert_eq!(ids(catalog.visible()), vec![4]);
        assert_eq!(
            catalog.filter().dropdown_value(DropdownField::State),
            Some("9".to_string())
        );
        assert_eq!(catalog.filter().dropdown_value(DropdownField::Diet), None);
    }

    #[test]
    fn test_switching_to_search_clears_ingredients_and_page() {
        let mut dishes = many(25);
        for d in dishes.iter_mut().take(15) {
            d.ingredients.push("rice".to_string());
        }
        let mut catalog = Catalog::new(dishes);
        catalog.select_ingredients(["rice"]);
        catalog.next_page();
        assert_eq!(catalog.page(), 2);

        catalog.search("dish");
        assert!(catalog.filter().selected_ingredients().is_empty());
        assert_eq!(catalog.filter().search_term(), Some("dish"));
        assert_eq!(catalog.page(), 1);
        assert_eq!(catalog.visible_len(), 25);
    }

    #[test]
    fn test_dropdown_clears_search() {
        let mut catalog = Catalog::new(menu());
        catalog.search("ginger");
        catalog.filter_flavor("spicy");
        assert_eq!(catalog.filter().search_term(), None);
        assert_eq!(ids(catalog.visible()), vec![1, 2, 4]);
    }

    #[test]
    fn test_sort_toggles_direction() {
        let mut catalog = Catalog::new(menu());
        catalog.sort_by(SortKey::PrepTime);
        assert_eq!(ids(catalog.visible()), vec![3, 4, 1, 5, 2]);

        catalog.sort_by(SortKey::PrepTime);
        assert_eq!(
            catalog.sort(),
            Some(SortSpec {
                key: SortKey::PrepTime,
                direction: SortDirection::Descending
            })
        );
        assert_eq!(ids(catalog.visible()), vec![2, 5, 1, 4, 3]);

        catalog.sort_by(SortKey::Name);
        assert_eq!(catalog.sort().map(|s| s.direction), Some(SortDirection::Ascending));
        assert_eq!(ids(catalog.visible()), vec![1, 4, 2, 3, 5]);
    }

    #[test]
    fn test_third_click_returns_to_ascending() {
        let mut catalog = Catalog::new(menu());
        catalog.sort_by(SortKey::CookTime);
        catalog.sort_by(SortKey::CookTime);
        catalog.sort_by(SortKey::CookTime);
        assert_eq!(catalog.sort().map(|s| s.direction), Some(SortDirection::Ascending));
    }

    #[test]
    fn test_sort_survives_filter_change() {
        let mut catalog = Catalog::new(menu());
        catalog.sort_by(SortKey::Name);
        catalog.sort_by(SortKey::Name);
        catalog.select_ingredients(["ginger"]);
        assert_eq!(ids(catalog.visible()), vec![2, 4, 1]);
    }

    #[test]
    fn test_sort_resets_page() {
        let mut catalog = Catalog::new(many(30));
        catalog.last_page();
        assert_eq!(catalog.page(), 3);
        catalog.sort_by(SortKey::Name);
        assert_eq!(catalog.page(), 1);
    }

    #[test]
    fn test_pagination_counts_and_clamping() {
        let mut catalog = Catalog::new(many(23));
        assert_eq!(catalog.total_pages(), 3);
        assert_eq!(catalog.page_items().len(), 10);

        assert!(!catalog.prev_page());
        assert_eq!(catalog.page(), 1);

        assert!(catalog.next_page());
        assert!(catalog.next_page());
        assert!(!catalog.next_page());
        assert_eq!(catalog.page(), 3);
        assert_eq!(ids(catalog.page_items()), vec![20, 21, 22]);

        catalog.go_to_page(99);
        assert_eq!(catalog.page(), 3);
        catalog.go_to_page(0);
        assert_eq!(catalog.page(), 1);
    }

    #[test]
    fn test_empty_result_has_no_pages() {
        let mut catalog = Catalog::new(menu());
        catalog.search("pizza");
        assert_eq!(catalog.total_pages(), 0);
        assert_eq!(catalog.page(), 0);
        assert!(catalog.page_items().is_empty());
        assert!(!catalog.next_page());

        let empty = Catalog::new(Vec::new());
        assert_eq!(empty.total_pages(), 0);
        assert!(empty.page_items().is_empty());
    }

    const POOL: [&str; 6] = ["rice", "Salt", " ginger", "GARLIC ", "onion", "milk"];

    fn arb_dish() -> impl Strategy<Value = Dish> {
        (
            0i64..1000,
            proptest::sample::subsequence(POOL.to_vec(), 0..=POOL.len()),
            prop::sample::select(vec!["Kheer", "Upma", "Rasam", "Bhindi masala"]),
            prop::sample::select(vec!["dessert", "snack", "main course", "-1"]),
        )
            .prop_map(|(id, ingredients, name, course)| {
                let mut dish = sample(id, name, &ingredients);
                dish.course = course.to_string();
                dish
            })
    }

    proptest! {
        #[test]
        fn prop_ingredient_filter_is_superset_match(
            dishes in prop::collection::vec(arb_dish(), 0..40),
            picked in proptest::sample::subsequence(POOL.to_vec(), 1..=3),
        ) {
            let mut catalog = Catalog::new(dishes.clone());
            catalog.select_ingredients(picked.iter());

            let wanted: Vec<String> = picked.iter().map(|p| normalize(p)).collect();
            let expected: Vec<i64> = dishes
                .iter()
                .filter(|d| {
                    let have: Vec<String> = d.ingredients.iter().map(|i| normalize(i)).collect();
                    wanted.iter().all(|w| have.contains(w))
                })
                .map(|d| d.id)
                .collect();
            prop_assert_eq!(ids(catalog.visible()), expected);
        }

        #[test]
        fn prop_search_is_substring_match(
            dishes in prop::collection::vec(arb_dish(), 0..40),
            term in prop::sample::select(vec!["ri", "SALT", "ma", "e", "dessert", "zzz"]),
        ) {
            let mut catalog = Catalog::new(dishes.clone());
            catalog.search(term);

            let t = term.to_lowercase();
            let expected: Vec<i64> = dishes
                .iter()
                .filter(|d| {
                    d.name.to_lowercase().contains(&t)
                        || d.course.to_lowercase().contains(&t)
                        || d.ingredients.iter().any(|i| i.to_lowercase().contains(&t))
                })
                .map(|d| d.id)
                .collect();
            prop_assert_eq!(ids(catalog.visible()), expected);
        }

        #[test]
        fn prop_page_count_is_ceiling(n in 0usize..75) {
            let catalog = Catalog::new(many(n));
            prop_assert_eq!(catalog.total_pages(), n.div_ceil(PAGE_SIZE));
            let shown: usize = {
                let mut c = catalog.clone();
                let mut total = c.page_items().len();
                while c.next_page() {
                    total += c.page_items().len();
                }
                total
            };
            prop_assert_eq!(shown, n);
        }
    }
}
