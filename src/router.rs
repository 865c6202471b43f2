use std::fmt;

/// Screens reachable by path, mirroring the web app's URL layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Dishes,
    /// `/dish/{id}`
    Dish(i64),
    /// Anything else; carries the path as given.
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let segments: Vec<&str> = trimmed
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Route::Dishes,
            ["dish", id] => match id.parse::<i64>() {
                Ok(id) => Route::Dish(id),
                Err(_) => Route::NotFound(trimmed.to_string()),
            },
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Dishes => "/".to_string(),
            Route::Dish(id) => format!("/dish/{id}"),
            Route::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
