//! # Menu Records
//!
//! Documents stored in the menu store and the payloads that create or change them.
//!
//! ## Meal slot
//!
//! A meal slot is identified by (hall, day, meal type, month, year). Nothing enforces that
//! identity in storage, so the same slot may be held by several records.
//!
//! ## JSON
//!
//! Field names are camelCase and the identifier is `_id`, which keeps the wire format the
//! frontend already reads.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItems {
    pub regular: Vec<String>,
    pub extras: Vec<String>,
    pub special: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub hall_name: String,
    pub day: String,
    pub meal_type: String,
    pub month: String,
    pub year: i32,
    #[serde(default)]
    pub menu_items: MenuItems,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/menus/add`.
///
/// Every field is optional at the wire level so missing fields surface as validation errors
/// naming the field, rather than as deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMealRecord {
    pub hall_name: Option<String>,
    pub day: Option<String>,
    pub meal_type: Option<String>,
    pub month: Option<String>,
    pub year: Option<i32>,
    pub menu_items: Option<MenuItems>,
}

/// Body of `PUT /api/menus/update/{id}`. Absent fields are left untouched; `menuItems`
/// replaces the whole item record when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecordUpdate {
    pub hall_name: Option<String>,
    pub day: Option<String>,
    pub meal_type: Option<String>,
    pub month: Option<String>,
    pub year: Option<i32>,
    pub menu_items: Option<MenuItems>,
}

/// Month and year scoping a menu cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuPeriod {
    pub month: String,
    pub year: i32,
}

impl MenuPeriod {
    pub fn new(month: impl Into<String>, year: i32) -> Self {
        Self {
            month: month.into(),
            year,
        }
    }
}

impl fmt::Display for MenuPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

/// Meal slots in the order they are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MealType {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 4] = [Self::Breakfast, Self::Lunch, Self::Snacks, Self::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Snacks => "snacks",
            Self::Dinner => "dinner",
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();

        Self::ALL
            .into_iter()
            .find(|meal_type| meal_type.as_str() == normalized)
            .ok_or_else(|| format!("Unknown meal type: {s}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub total_meals: usize,
    pub halls: Vec<String>,
    pub days: Vec<String>,
    pub meal_types: Vec<String>,
    pub months: Vec<String>,
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseOverview {
    pub database: DatabaseStats,
    pub sample_data: IndexMap<String, Vec<MealRecord>>,
    pub timestamp: DateTime<Utc>,
}
