use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder the API uses for attributes that were never recorded.
pub const SENTINEL_TEXT: &str = "-1";
pub const SENTINEL_CODE: i64 = -1;

pub const NOT_AVAILABLE: &str = "Not Available";

/// A single dish as served by the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub ingredients: Vec<String>,
    #[serde(default = "sentinel_text", deserialize_with = "text_or_sentinel")]
    pub diet: String,
    #[serde(default = "sentinel_code", deserialize_with = "number_or_sentinel")]
    pub prep_time: i64,
    #[serde(default = "sentinel_code", deserialize_with = "number_or_sentinel")]
    pub cook_time: i64,
    #[serde(default = "sentinel_text", deserialize_with = "text_or_sentinel")]
    pub flavor_profile: String,
    #[serde(default = "sentinel_text", deserialize_with = "text_or_sentinel")]
    pub course: String,
    #[serde(default = "Code::sentinel", deserialize_with = "code")]
    pub state: Code,
    #[serde(default = "Code::sentinel", deserialize_with = "code")]
    pub region: Code,
}

/// State or region reference. The API sends either a numeric code or a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Code {
    Num(i64),
    Text(String),
}

impl Code {
    pub fn sentinel() -> Self {
        Code::Num(SENTINEL_CODE)
    }

    pub fn is_sentinel(&self) -> bool {
        match self {
            Code::Num(n) => *n == SENTINEL_CODE,
            Code::Text(s) => s.trim() == SENTINEL_TEXT,
        }
    }

    /// Numeric code, if this is one.
    pub fn as_num(&self) -> Option<i64> {
        match self {
            Code::Num(n) => Some(*n),
            Code::Text(_) => None,
        }
    }

    /// Display form with the sentinel replaced.
    pub fn label(&self) -> String {
        if self.is_sentinel() {
            NOT_AVAILABLE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Code::Num(n) => write!(f, "{n}"),
            Code::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Code {
    fn from(n: i64) -> Self {
        Code::Num(n)
    }
}

fn sentinel_text() -> String {
    SENTINEL_TEXT.to_string()
}

fn sentinel_code() -> i64 {
    SENTINEL_CODE
}

// ── Wire helpers ──
// A JSON null is treated like a missing field.

fn text_or_sentinel<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(sentinel_text))
}

fn number_or_sentinel<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(SENTINEL_CODE))
}

fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Int(i64),
    Float(f64),
    Text(String),
    Null(()),
}

/// Numeric strings become numbers; other text is kept as given.
fn code<'de, D>(deserializer: D) -> Result<Code, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawCode::deserialize(deserializer)?;
    Ok(match raw {
        RawCode::Int(i) => Code::Num(i),
        RawCode::Float(f) if f.fract() == 0.0 => Code::Num(f as i64),
        RawCode::Float(f) => Code::Text(f.to_string()),
        RawCode::Text(s) => match s.trim().parse() {
            Ok(n) => Code::Num(n),
            Err(_) if s.trim().is_empty() => Code::sentinel(),
            Err(_) => Code::Text(s.trim().to_string()),
        },
        RawCode::Null(()) => Code::sentinel(),
    })
}

// ── Display helpers ──

/// Text attribute with the sentinel replaced.
pub fn text_or_na(value: &str) -> &str {
    if value.trim() == SENTINEL_TEXT {
        NOT_AVAILABLE
    } else {
        value
    }
}

/// Duration in minutes followed by `unit`, e.g. "25 mins".
pub fn minutes_or_na(value: i64, unit: &str) -> String {
    if value == SENTINEL_CODE {
        NOT_AVAILABLE.to_string()
    } else {
        format!("{value} {unit}")
    }
}

impl Dish {
    pub fn diet_label(&self) -> &str {
        text_or_na(&self.diet)
    }

    pub fn flavor_label(&self) -> &str {
        text_or_na(&self.flavor_profile)
    }

    pub fn course_label(&self) -> &str {
        text_or_na(&self.course)
    }

    pub fn state_label(&self) -> String {
        self.state.label()
    }

    pub fn region_label(&self) -> String {
        self.region.label()
    }

    /// Ingredient names trimmed and lowercased for matching.
    pub fn normalized_ingredients(&self) -> impl Iterator<Item = String> + '_ {
        self.ingredients.iter().map(|i| normalize(i))
    }
}

/// Canonical form used for ingredient comparison.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
pub(crate) fn sample(id: i64, name: &str, ingredients: &[&str]) -> Dish {
    Dish {
        id,
        name: name.to_string(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        diet: "vegetarian".to_string(),
        prep_time: 10,
        cook_time: 20,
        flavor_profile: "spicy".to_string(),
        course: "main course".to_string(),
        state: Code::Num(1),
        region: Code::Num(2),
    }
}
