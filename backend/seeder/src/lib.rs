//! # Menu Seeding
//!
//! Loads the reference catalog into whichever store the server is configured for.
//!
//! ## Flow
//! 1. Load the server config from the environment, same keys as the server.
//!
//! 2. Resolve the month/year to seed, falling back to the configured defaults.
//!
//! 3. Upsert every catalog meal by meal slot. Existing slots get their items replaced, new slots
//!    are inserted. Running it twice is safe.
//!
//! 4. Print the totals.
//!
//! ## Notes
//! - With `MESS_STORAGE=memory` the records vanish when the process exits, which is only useful
//!   to check that the catalog loads.
use anyhow::Result;
use catalog::{Catalog, get_catalog};
use indicatif::{ProgressBar, ProgressStyle};
use mess_server::{config::Config, state::AppState};
use tracing::info;

pub fn hall_summary(catalog: &Catalog) -> Vec<(String, usize)> {
    catalog
        .halls
        .iter()
        .enumerate()
        .map(|(index, hall)| (hall.clone(), catalog.meals_for_hall(index).len()))
        .collect()
}

pub fn preview() -> Result<()> {
    let catalog = get_catalog()?;

    println!("Halls: {}", catalog.halls.len());
    println!("Slots per week: {}\n", catalog.week.len());

    for (hall, meals) in hall_summary(&catalog) {
        println!("{hall}: {meals} meals");
    }

    Ok(())
}

pub async fn seed(month: Option<String>, year: Option<i32>) -> Result<()> {
    let config = Config::load()?;
    let catalog = get_catalog()?;
    let state = AppState::new(config)?;

    let period = state.menus.period(month, year);
    info!("Seeding {period} into {} store", state.menus.backend());

    let pb = ProgressBar::new(catalog.reference_meals().len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let report = state
        .menus
        .seed_with_progress(&period, |meal| {
            pb.set_message(format!("{} {} {}", meal.hall_name, meal.day, meal.meal_type));
            pb.inc(1);
        })
        .await?;

    pb.finish_with_message("Done");

    println!("\nInserted: {}", report.inserted);
    println!("Updated: {}", report.updated);

    Ok(())
}
