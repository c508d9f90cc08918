//! # Reference Menu Catalog
//!
//! Weekly reference menu used to seed the menu store for demos and tests.
//!
//! ## Layout
//!
//! - `halls`: every dining hall served by the mess, in a fixed order
//! - `week`: one entry per (day, meal type) slot, 7 days × breakfast, lunch, dinner
//!
//! ## Rotation
//!
//! Every hall serves the same weekly template, shifted by the hall's position in `halls`.
//! The first hall serves the template as written, the second hall serves Tuesday's menu on
//! Monday, and so on. This keeps neighbouring halls from serving the same food on the same day
//! while keeping the dataset small enough to review by hand.
use serde::Deserialize;

const CATALOG_JSON: &str = include_str!("../menus.json");

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogItems {
    pub regular: Vec<String>,
    pub extras: Vec<String>,
    pub special: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSlot {
    pub day: String,
    pub meal_type: String,
    pub menu_items: CatalogItems,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub halls: Vec<String>,
    pub week: Vec<CatalogSlot>,
}

/// One seeded meal: a template slot assigned to a hall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMeal {
    pub hall_name: String,
    pub day: String,
    pub meal_type: String,
    pub menu_items: CatalogItems,
}

pub fn get_catalog() -> Result<Catalog, serde_json::Error> {
    serde_json::from_str(CATALOG_JSON)
}

impl Catalog {
    /// Days in the order they first appear in the template.
    pub fn days(&self) -> Vec<&str> {
        let mut days: Vec<&str> = Vec::new();
        for slot in &self.week {
            if !days.contains(&slot.day.as_str()) {
                days.push(&slot.day);
            }
        }

        days
    }

    fn slot(&self, day: &str, meal_type: &str) -> Option<&CatalogSlot> {
        self.week
            .iter()
            .find(|slot| slot.day == day && slot.meal_type == meal_type)
    }

    pub fn meals_for_hall(&self, hall_index: usize) -> Vec<CatalogMeal> {
        let Some(hall_name) = self.halls.get(hall_index) else {
            return Vec::new();
        };

        let days = self.days();
        let mut meals = Vec::with_capacity(self.week.len());

        for slot in &self.week {
            let Some(day_index) = days.iter().position(|day| *day == slot.day) else {
                continue;
            };

            // rotate by hall position so halls do not mirror each other
            let served_day = days[(day_index + hall_index) % days.len()];

            if let Some(served) = self.slot(served_day, &slot.meal_type) {
                meals.push(CatalogMeal {
                    hall_name: hall_name.clone(),
                    day: slot.day.clone(),
                    meal_type: slot.meal_type.clone(),
                    menu_items: served.menu_items.clone(),
                });
            }
        }

        meals
    }

    pub fn reference_meals(&self) -> Vec<CatalogMeal> {
        (0..self.halls.len())
            .flat_map(|hall_index| self.meals_for_hall(hall_index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        get_catalog().unwrap()
    }

    #[test]
    fn test_catalog_parses() {
        let catalog = catalog();

        assert_eq!(catalog.halls.len(), 6);
        assert_eq!(catalog.week.len(), 21);
        assert_eq!(
            catalog.days(),
            vec![
                "monday",
                "tuesday",
                "wednesday",
                "thursday",
                "friday",
                "saturday",
                "sunday"
            ]
        );
    }

    #[test]
    fn test_first_hall_is_unrotated() {
        let meals = catalog().meals_for_hall(0);
        let breakfast = meals
            .iter()
            .find(|meal| meal.day == "monday" && meal.meal_type == "breakfast")
            .unwrap();

        assert_eq!(breakfast.hall_name, "Hall-1");
        assert_eq!(
            breakfast.menu_items,
            CatalogItems {
                regular: vec!["Idli".to_string(), "Sambar".to_string()],
                extras: vec![],
                special: vec![],
            }
        );
    }

    #[test]
    fn test_second_hall_serves_next_day() {
        let meals = catalog().meals_for_hall(1);
        let breakfast = meals
            .iter()
            .find(|meal| meal.day == "monday" && meal.meal_type == "breakfast")
            .unwrap();

        assert_eq!(breakfast.hall_name, "Hall-3");
        assert_eq!(breakfast.menu_items.regular, vec!["Upma", "Chutney"]);
    }

    #[test]
    fn test_sunday_wraps_around() {
        let meals = catalog().meals_for_hall(1);
        let dinner = meals
            .iter()
            .find(|meal| meal.day == "sunday" && meal.meal_type == "dinner")
            .unwrap();

        assert_eq!(dinner.menu_items.regular, vec!["Roti", "Rajma", "Jeera Rice"]);
    }

    #[test]
    fn test_reference_meals_cover_every_slot() {
        let catalog = catalog();
        let meals = catalog.reference_meals();

        assert_eq!(meals.len(), catalog.halls.len() * catalog.week.len());
        assert!(catalog.meals_for_hall(catalog.halls.len()).is_empty());
    }
}
