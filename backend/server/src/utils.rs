use std::cmp::Ordering;

use chrono::Weekday;

use crate::models::{MealRecord, MealType};

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Full lowercase weekday name, accepting any case and three-letter abbreviations.
pub fn canonical_day(input: &str) -> Option<&'static str> {
    input.trim().parse::<Weekday>().ok().map(weekday_name)
}

pub fn canonical_meal_type(input: &str) -> Option<&'static str> {
    input
        .trim()
        .parse::<MealType>()
        .ok()
        .map(|meal_type| meal_type.as_str())
}

/// Lookup form of a day selector. Unknown names are only lowercased so they can still match
/// whatever was stored.
pub fn normalize_day(input: &str) -> String {
    canonical_day(input)
        .map(str::to_string)
        .unwrap_or_else(|| input.trim().to_lowercase())
}

pub fn normalize_meal_type(input: &str) -> String {
    canonical_meal_type(input)
        .map(str::to_string)
        .unwrap_or_else(|| input.trim().to_lowercase())
}

// unknown names rank after every known one
fn day_rank(day: &str) -> u32 {
    day.parse::<Weekday>()
        .map(|weekday| weekday.num_days_from_monday())
        .unwrap_or(u32::MAX)
}

fn meal_rank(meal_type: &str) -> usize {
    meal_type
        .parse::<MealType>()
        .ok()
        .and_then(|meal_type| MealType::ALL.iter().position(|m| *m == meal_type))
        .unwrap_or(usize::MAX)
}

/// Chronological order within a week: Monday first, breakfast before lunch before dinner.
pub fn compare_slots(a: &MealRecord, b: &MealRecord) -> Ordering {
    day_rank(&a.day)
        .cmp(&day_rank(&b.day))
        .then_with(|| a.day.cmp(&b.day))
        .then_with(|| meal_rank(&a.meal_type).cmp(&meal_rank(&b.meal_type)))
        .then_with(|| a.meal_type.cmp(&b.meal_type))
}

pub fn sort_by_slot(meals: &mut [MealRecord]) {
    meals.sort_by(compare_slots);
}

pub fn sort_by_hall_and_slot(meals: &mut [MealRecord]) {
    meals.sort_by(|a, b| {
        a.hall_name
            .cmp(&b.hall_name)
            .then_with(|| compare_slots(a, b))
    });
}
