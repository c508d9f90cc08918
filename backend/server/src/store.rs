//! # Meal Record Store
//!
//! Document collection of [`MealRecord`]s keyed by identifier.
//!
//! ## Contract
//!
//! - `find` returns matches in natural store order, which is insertion order
//! - No uniqueness on the meal slot, so any filter may match zero, one or many records
//! - `replace` never creates: it reports `false` when the identifier is unknown
//!
//! Backends:
//! - [`MemoryStore`]: ordered vector, for local runs without Redis and for tests
//! - [`RedisStore`](crate::database::RedisStore): JSON documents in a Redis hash
use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::models::{MealRecord, MenuPeriod};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Malformed meal document: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Equality filter over meal records. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealFilter {
    pub hall_name: Option<String>,
    pub day: Option<String>,
    pub meal_type: Option<String>,
    pub month: Option<String>,
    pub year: Option<i32>,
}

impl MealFilter {
    pub fn period(period: &MenuPeriod) -> Self {
        Self {
            month: Some(period.month.clone()),
            year: Some(period.year),
            ..Self::default()
        }
    }

    pub fn hall(mut self, hall_name: &str) -> Self {
        self.hall_name = Some(hall_name.to_string());
        self
    }

    pub fn slot(mut self, day: &str, meal_type: &str) -> Self {
        self.day = Some(day.to_string());
        self.meal_type = Some(meal_type.to_string());
        self
    }

    pub fn matches(&self, meal: &MealRecord) -> bool {
        fn field<T: PartialEq + ?Sized>(wanted: Option<&T>, actual: &T) -> bool {
            wanted.is_none_or(|wanted| wanted == actual)
        }

        field(self.hall_name.as_deref(), meal.hall_name.as_str())
            && field(self.day.as_deref(), meal.day.as_str())
            && field(self.meal_type.as_deref(), meal.meal_type.as_str())
            && field(self.month.as_deref(), meal.month.as_str())
            && field(self.year.as_ref(), &meal.year)
    }
}

#[async_trait]
pub trait MealStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    fn is_connected(&self) -> bool;

    async fn find(&self, filter: &MealFilter) -> Result<Vec<MealRecord>, StoreError>;

    async fn find_one(&self, filter: &MealFilter) -> Result<Option<MealRecord>, StoreError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MealRecord>, StoreError>;

    async fn insert(&self, meal: &MealRecord) -> Result<(), StoreError>;

    async fn replace(&self, meal: &MealRecord) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    meals: RwLock<Vec<MealRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.meals.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.read().is_empty()
    }
}

#[async_trait]
impl MealStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn find(&self, filter: &MealFilter) -> Result<Vec<MealRecord>, StoreError> {
        let meals: Vec<MealRecord> = self
            .meals
            .read()
            .iter()
            .filter(|meal| filter.matches(meal))
            .cloned()
            .collect();

        debug!(matched = meals.len(), "Scanned memory store");
        Ok(meals)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MealRecord>, StoreError> {
        Ok(self.meals.read().iter().find(|meal| meal.id == id).cloned())
    }

    async fn insert(&self, meal: &MealRecord) -> Result<(), StoreError> {
        self.meals.write().push(meal.clone());
        Ok(())
    }

    async fn replace(&self, meal: &MealRecord) -> Result<bool, StoreError> {
        let mut meals = self.meals.write();

        match meals.iter_mut().find(|stored| stored.id == meal.id) {
            Some(stored) => {
                *stored = meal.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
