//! # Menu Query Service
//!
//! Turns hall/day/meal-type/month/year selectors into store queries and shapes the results.
//!
//! ## Ordering
//!
//! Meals are ordered chronologically: Monday through Sunday, then breakfast, lunch, snacks,
//! dinner. Names outside those sets sort after them alphabetically. Ties keep store order.
//!
//! ## Duplicates
//!
//! The store does not enforce one record per meal slot. Slot lookups return the first match in
//! insertion order. Seeding upserts by meal slot, so running it repeatedly never adds records.
use std::{collections::HashMap, sync::Arc};

use catalog::{CatalogMeal, get_catalog};
use chrono::Utc;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    models::{
        DatabaseOverview, DatabaseStats, MealRecord, MealRecordUpdate, MenuItems, MenuPeriod,
        NewMealRecord, SeedReport,
    },
    store::{MealFilter, MealStore, StoreError},
    utils::{
        canonical_day, canonical_meal_type, normalize_day, normalize_meal_type,
        sort_by_hall_and_slot, sort_by_slot,
    },
};

const SAMPLES_PER_HALL: usize = 3;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Menu not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("Reference catalog unreadable: {0}")]
    Catalog(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct MenuService {
    store: Arc<dyn MealStore>,
    default_period: MenuPeriod,
}

impl MenuService {
    pub fn new(store: Arc<dyn MealStore>, default_period: MenuPeriod) -> Self {
        Self {
            store,
            default_period,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_connected()
    }

    /// Resolves optional selectors against the configured defaults. Blank months count as absent.
    pub fn period(&self, month: Option<String>, year: Option<i32>) -> MenuPeriod {
        MenuPeriod {
            month: month
                .map(|month| month.trim().to_string())
                .filter(|month| !month.is_empty())
                .unwrap_or_else(|| self.default_period.month.clone()),
            year: year.unwrap_or(self.default_period.year),
        }
    }

    pub async fn hall_menu(
        &self,
        hall_name: &str,
        period: &MenuPeriod,
    ) -> Result<Vec<MealRecord>, MenuError> {
        let filter = MealFilter::period(period).hall(hall_name);

        let mut meals = self.store.find(&filter).await?;
        sort_by_slot(&mut meals);

        info!("Found {} meals for {hall_name} in {period}", meals.len());
        Ok(meals)
    }

    pub async fn meal_slot(
        &self,
        hall_name: &str,
        day: &str,
        meal_type: &str,
        period: &MenuPeriod,
    ) -> Result<MealRecord, MenuError> {
        let filter = MealFilter::period(period)
            .hall(hall_name)
            .slot(&normalize_day(day), &normalize_meal_type(meal_type));

        self.store.find_one(&filter).await?.ok_or_else(|| {
            info!("No menu found for {hall_name}/{day}/{meal_type} in {period}");
            MenuError::NotFound
        })
    }

    pub async fn all_halls(
        &self,
        period: &MenuPeriod,
    ) -> Result<IndexMap<String, Vec<MealRecord>>, MenuError> {
        let mut meals = self.store.find(&MealFilter::period(period)).await?;
        sort_by_hall_and_slot(&mut meals);

        let total = meals.len();
        let grouped = group_by_hall(meals);

        info!(
            "Found {total} meals across {} halls in {period}",
            grouped.len()
        );
        Ok(grouped)
    }

    pub async fn seed(&self, period: &MenuPeriod) -> Result<SeedReport, MenuError> {
        self.seed_with_progress(period, |_| {}).await
    }

    /// Upserts the reference catalog for `period`, keyed by meal slot. `progress` sees every
    /// catalog meal once, after it has been written.
    pub async fn seed_with_progress<F>(
        &self,
        period: &MenuPeriod,
        mut progress: F,
    ) -> Result<SeedReport, MenuError>
    where
        F: FnMut(&CatalogMeal) + Send,
    {
        let catalog = get_catalog()?;

        // first record per slot, matching what slot lookups return
        let mut existing: HashMap<(String, String, String), MealRecord> = HashMap::new();
        for meal in self.store.find(&MealFilter::period(period)).await? {
            let key = (
                meal.hall_name.clone(),
                meal.day.clone(),
                meal.meal_type.clone(),
            );
            existing.entry(key).or_insert(meal);
        }

        let mut report = SeedReport::default();

        for seed in catalog.reference_meals() {
            let menu_items = MenuItems {
                regular: seed.menu_items.regular.clone(),
                extras: seed.menu_items.extras.clone(),
                special: seed.menu_items.special.clone(),
            };
            let key = (
                seed.hall_name.clone(),
                normalize_day(&seed.day),
                normalize_meal_type(&seed.meal_type),
            );

            match existing.remove(&key) {
                Some(mut meal) => {
                    meal.menu_items = menu_items;
                    meal.updated_at = Utc::now();

                    self.store.replace(&meal).await?;
                    report.updated += 1;
                }
                None => {
                    let (hall_name, day, meal_type) = key;
                    let now = Utc::now();

                    self.store
                        .insert(&MealRecord {
                            id: Uuid::new_v4().to_string(),
                            hall_name,
                            day,
                            meal_type,
                            month: period.month.clone(),
                            year: period.year,
                            menu_items,
                            created_at: now,
                            updated_at: now,
                        })
                        .await?;
                    report.inserted += 1;
                }
            }

            progress(&seed);
        }

        info!(
            "Seeded {period}: {} inserted, {} updated",
            report.inserted, report.updated
        );
        Ok(report)
    }

    pub async fn create(&self, payload: NewMealRecord) -> Result<MealRecord, MenuError> {
        let now = Utc::now();

        let meal = MealRecord {
            id: Uuid::new_v4().to_string(),
            hall_name: required(payload.hall_name, "hallName")?,
            day: day(&required(payload.day, "day")?)?,
            meal_type: meal_type(&required(payload.meal_type, "mealType")?)?,
            month: match payload.month {
                Some(month) => month_value(month)?,
                None => self.default_period.month.clone(),
            },
            year: match payload.year {
                Some(value) => year(value)?,
                None => self.default_period.year,
            },
            menu_items: payload.menu_items.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.store.insert(&meal).await?;

        info!("Added menu item with ID: {}", meal.id);
        Ok(meal)
    }

    pub async fn update(
        &self,
        id: &str,
        payload: MealRecordUpdate,
    ) -> Result<MealRecord, MenuError> {
        let mut meal = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(MenuError::NotFound)?;

        if let Some(hall_name) = payload.hall_name {
            meal.hall_name = required(Some(hall_name), "hallName")?;
        }
        if let Some(value) = payload.day {
            meal.day = day(&value)?;
        }
        if let Some(value) = payload.meal_type {
            meal.meal_type = meal_type(&value)?;
        }
        if let Some(month) = payload.month {
            meal.month = month_value(month)?;
        }
        if let Some(value) = payload.year {
            meal.year = year(value)?;
        }
        if let Some(menu_items) = payload.menu_items {
            meal.menu_items = menu_items;
        }
        meal.updated_at = Utc::now();

        // the record can vanish between read and write; nothing is recreated
        if !self.store.replace(&meal).await? {
            return Err(MenuError::NotFound);
        }

        info!("Updated menu item with ID: {id}");
        Ok(meal)
    }

    pub async fn overview(&self) -> Result<DatabaseOverview, MenuError> {
        let meals = self.store.find(&MealFilter::default()).await?;

        let mut stats = DatabaseStats {
            total_meals: meals.len(),
            ..DatabaseStats::default()
        };
        let mut sample_data: IndexMap<String, Vec<MealRecord>> = IndexMap::new();

        for meal in meals {
            push_distinct(&mut stats.halls, &meal.hall_name);
            push_distinct(&mut stats.days, &meal.day);
            push_distinct(&mut stats.meal_types, &meal.meal_type);
            push_distinct(&mut stats.months, &meal.month);
            if !stats.years.contains(&meal.year) {
                stats.years.push(meal.year);
            }

            let samples = sample_data.entry(meal.hall_name.clone()).or_default();
            if samples.len() < SAMPLES_PER_HALL {
                samples.push(meal);
            }
        }

        debug!(
            "Database contains {} meals across {} halls",
            stats.total_meals,
            stats.halls.len()
        );

        Ok(DatabaseOverview {
            database: stats,
            sample_data,
            timestamp: Utc::now(),
        })
    }
}

fn group_by_hall(meals: Vec<MealRecord>) -> IndexMap<String, Vec<MealRecord>> {
    let mut grouped: IndexMap<String, Vec<MealRecord>> = IndexMap::new();

    for meal in meals {
        grouped.entry(meal.hall_name.clone()).or_default().push(meal);
    }

    grouped
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|existing| existing == value) {
        values.push(value.to_string());
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, MenuError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| MenuError::Validation(format!("{field} is required")))
}

fn day(value: &str) -> Result<String, MenuError> {
    canonical_day(value)
        .map(str::to_string)
        .ok_or_else(|| MenuError::Validation(format!("Invalid day: {value}")))
}

fn meal_type(value: &str) -> Result<String, MenuError> {
    canonical_meal_type(value)
        .map(str::to_string)
        .ok_or_else(|| MenuError::Validation(format!("Invalid mealType: {value}")))
}

fn month_value(value: String) -> Result<String, MenuError> {
    required(Some(value), "month")
}

fn year(value: i32) -> Result<i32, MenuError> {
    if value <= 0 {
        return Err(MenuError::Validation(format!("Invalid year: {value}")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> (MenuService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = MenuService::new(store.clone(), MenuPeriod::new("July", 2025));

        (service, store)
    }

    fn july() -> MenuPeriod {
        MenuPeriod::new("July", 2025)
    }

    fn new_meal(hall_name: &str, day: &str, meal_type: &str, regular: &[&str]) -> NewMealRecord {
        NewMealRecord {
            hall_name: Some(hall_name.to_string()),
            day: Some(day.to_string()),
            meal_type: Some(meal_type.to_string()),
            menu_items: Some(MenuItems {
                regular: regular.iter().map(|item| item.to_string()).collect(),
                ..MenuItems::default()
            }),
            ..NewMealRecord::default()
        }
    }

    #[test]
    fn test_period_defaults() {
        let (service, _) = service();

        assert_eq!(service.period(None, None), july());
        assert_eq!(
            service.period(Some("  ".to_string()), Some(2026)),
            MenuPeriod::new("July", 2026)
        );
        assert_eq!(
            service.period(Some("August".to_string()), None),
            MenuPeriod::new("August", 2025)
        );
    }

    #[tokio::test]
    async fn test_empty_period_is_not_an_error() {
        let (service, _) = service();

        assert!(service.hall_menu("Hall-9", &july()).await.unwrap().is_empty());
        assert!(service.all_halls(&july()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slot_lookup_is_case_insensitive() {
        let (service, _) = service();
        service
            .create(new_meal("Hall-1", "monday", "breakfast", &["Idli", "Sambar"]))
            .await
            .unwrap();

        let meal = service
            .meal_slot("Hall-1", "Monday", "BREAKFAST", &july())
            .await
            .unwrap();

        assert_eq!(meal.day, "monday");
        assert_eq!(meal.meal_type, "breakfast");
        assert_eq!(meal.menu_items.regular, vec!["Idli", "Sambar"]);
    }

    #[tokio::test]
    async fn test_slot_lookup_respects_period() {
        let (service, _) = service();
        service
            .create(new_meal("Hall-1", "monday", "lunch", &["Rice"]))
            .await
            .unwrap();

        let result = service
            .meal_slot("Hall-1", "monday", "lunch", &MenuPeriod::new("August", 2025))
            .await;

        assert!(matches!(result, Err(MenuError::NotFound)));
    }

    #[tokio::test]
    async fn test_duplicate_slot_returns_first_inserted() {
        let (service, _) = service();
        let first = service
            .create(new_meal("Hall-1", "monday", "lunch", &["Rice"]))
            .await
            .unwrap();
        service
            .create(new_meal("Hall-1", "Monday", "Lunch", &["Roti"]))
            .await
            .unwrap();

        let meal = service
            .meal_slot("Hall-1", "monday", "lunch", &july())
            .await
            .unwrap();
        assert_eq!(meal.id, first.id);

        let meals = service.hall_menu("Hall-1", &july()).await.unwrap();
        assert_eq!(meals.len(), 2);
    }

    #[tokio::test]
    async fn test_hall_menu_is_chronological() {
        let (service, _) = service();
        for (day, meal_type) in [
            ("tuesday", "breakfast"),
            ("monday", "dinner"),
            ("monday", "breakfast"),
            ("monday", "lunch"),
        ] {
            service
                .create(new_meal("Hall-1", day, meal_type, &[]))
                .await
                .unwrap();
        }

        let meals = service.hall_menu("Hall-1", &july()).await.unwrap();
        let slots: Vec<(&str, &str)> = meals
            .iter()
            .map(|meal| (meal.day.as_str(), meal.meal_type.as_str()))
            .collect();

        assert_eq!(
            slots,
            vec![
                ("monday", "breakfast"),
                ("monday", "lunch"),
                ("monday", "dinner"),
                ("tuesday", "breakfast"),
            ]
        );
    }

    #[tokio::test]
    async fn test_all_halls_groups_alphabetically() {
        let (service, _) = service();
        service
            .create(new_meal("Hall-3", "monday", "lunch", &["Rice"]))
            .await
            .unwrap();
        service
            .create(new_meal("Hall-1", "monday", "dinner", &["Roti"]))
            .await
            .unwrap();
        service
            .create(new_meal("Hall-1", "monday", "breakfast", &["Idli"]))
            .await
            .unwrap();
        let mut august = new_meal("Hall-4", "monday", "lunch", &["Pulao"]);
        august.month = Some("August".to_string());
        service.create(august).await.unwrap();

        let grouped = service.all_halls(&july()).await.unwrap();

        let halls: Vec<&String> = grouped.keys().collect();
        assert_eq!(halls, vec!["Hall-1", "Hall-3"]);
        assert!(grouped.values().all(|meals| !meals.is_empty()));
        assert_eq!(grouped["Hall-1"][0].meal_type, "breakfast");
        assert_eq!(grouped["Hall-1"][1].meal_type, "dinner");
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let (service, store) = service();

        let missing = service.create(NewMealRecord::default()).await;
        assert!(matches!(missing, Err(MenuError::Validation(message)) if message == "hallName is required"));

        let bad_day = service
            .create(new_meal("Hall-1", "someday", "lunch", &[]))
            .await;
        assert!(matches!(bad_day, Err(MenuError::Validation(_))));

        let bad_meal = service
            .create(new_meal("Hall-1", "monday", "brunch", &[]))
            .await;
        assert!(matches!(bad_meal, Err(MenuError::Validation(_))));

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_create_normalizes_and_defaults() {
        let (service, _) = service();

        let meal = service
            .create(new_meal(" Hall-1 ", "FRI", "Dinner", &["Biryani"]))
            .await
            .unwrap();

        assert_eq!(meal.hall_name, "Hall-1");
        assert_eq!(meal.day, "friday");
        assert_eq!(meal.meal_type, "dinner");
        assert_eq!(meal.month, "July");
        assert_eq!(meal.year, 2025);
        assert!(!meal.id.is_empty());
    }

    #[tokio::test]
    async fn test_update_applies_present_fields() {
        let (service, _) = service();
        let meal = service
            .create(new_meal("Hall-1", "monday", "lunch", &["Rice"]))
            .await
            .unwrap();

        let updated = service
            .update(
                &meal.id,
                MealRecordUpdate {
                    meal_type: Some("DINNER".to_string()),
                    menu_items: Some(MenuItems {
                        regular: vec!["Roti".to_string()],
                        extras: vec!["Curd".to_string()],
                        special: vec![],
                    }),
                    ..MealRecordUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, meal.id);
        assert_eq!(updated.hall_name, "Hall-1");
        assert_eq!(updated.meal_type, "dinner");
        assert_eq!(updated.menu_items.extras, vec!["Curd"]);
        assert!(updated.updated_at >= meal.updated_at);

        let fetched = service
            .meal_slot("Hall-1", "monday", "dinner", &july())
            .await
            .unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let (service, store) = service();

        let result = service
            .update("missing", MealRecordUpdate::default())
            .await;

        assert!(matches!(result, Err(MenuError::NotFound)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_blank_hall() {
        let (service, _) = service();
        let meal = service
            .create(new_meal("Hall-1", "monday", "lunch", &[]))
            .await
            .unwrap();

        let result = service
            .update(
                &meal.id,
                MealRecordUpdate {
                    hall_name: Some(" ".to_string()),
                    ..MealRecordUpdate::default()
                },
            )
            .await;

        assert!(matches!(result, Err(MenuError::Validation(_))));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let (service, store) = service();
        let catalog = get_catalog().unwrap();
        let expected = catalog.halls.len() * catalog.week.len();

        let first = service.seed(&july()).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                inserted: expected,
                updated: 0,
            }
        );

        let second = service.seed(&july()).await.unwrap();
        assert_eq!(
            second,
            SeedReport {
                inserted: 0,
                updated: expected,
            }
        );
        assert_eq!(store.len(), expected);

        let breakfast = service
            .meal_slot("Hall-1", "monday", "breakfast", &july())
            .await
            .unwrap();
        assert_eq!(breakfast.menu_items.regular, vec!["Idli", "Sambar"]);
    }

    #[tokio::test]
    async fn test_seed_overwrites_existing_slot() {
        let (service, store) = service();
        let stale = service
            .create(new_meal("Hall-1", "monday", "breakfast", &["Bread"]))
            .await
            .unwrap();

        let mut seen = 0;
        let report = service
            .seed_with_progress(&july(), |_| seen += 1)
            .await
            .unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(seen, report.inserted + report.updated);
        assert_eq!(store.len(), seen);

        let breakfast = service
            .meal_slot("Hall-1", "monday", "breakfast", &july())
            .await
            .unwrap();
        assert_eq!(breakfast.id, stale.id);
        assert_eq!(breakfast.menu_items.regular, vec!["Idli", "Sambar"]);
    }

    #[tokio::test]
    async fn test_seed_is_scoped_to_period() {
        let (service, store) = service();

        let july_report = service.seed(&july()).await.unwrap();
        let august_report = service
            .seed(&MenuPeriod::new("August", 2025))
            .await
            .unwrap();

        assert_eq!(august_report.inserted, july_report.inserted);
        assert_eq!(store.len(), july_report.inserted * 2);
    }

    #[tokio::test]
    async fn test_overview() {
        let (service, _) = service();
        service.seed(&july()).await.unwrap();

        let overview = service.overview().await.unwrap();

        assert_eq!(overview.database.total_meals, 126);
        assert_eq!(overview.database.halls.len(), 6);
        assert_eq!(overview.database.days.len(), 7);
        assert_eq!(
            overview.database.meal_types,
            vec!["breakfast", "lunch", "dinner"]
        );
        assert_eq!(overview.database.months, vec!["July"]);
        assert_eq!(overview.database.years, vec![2025]);
        assert!(overview
            .sample_data
            .values()
            .all(|samples| samples.len() == SAMPLES_PER_HALL));
    }
}
