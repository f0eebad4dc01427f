use calorie_quest::core::Tracker;
use calorie_quest::core::ledger::Meal;
use calorie_quest::core::random::RngChoice;
use calorie_quest::core::report::{format_progress_bar, motivation};
use calorie_quest::errors::Result;
use calorie_quest::telemetry;
use chrono::Local;
use std::env;
use tracing::{error, info};

const USAGE: &str = "usage: calorie-quest [--log] <food query> <grams> [meal]";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    telemetry::init_tracing();

    // 2. Open config, database and remote client
    let mut tracker = Tracker::open_default()
        .await
        .inspect_err(|e| error!("Failed to open tracker: {}", e))?;
    let today = Local::now().date_naive();

    // 3. Optionally resolve and log a food
    let mut args: Vec<String> = env::args().skip(1).collect();
    let log = args.first().is_some_and(|a| a == "--log");
    if log {
        args.remove(0);
    }
    match args.as_slice() {
        [] => {}
        [query, grams, rest @ ..] => {
            let grams: f64 = grams.parse().unwrap_or(0.0);
            let meal = rest.first().map_or(Meal::Breakfast, |m| Meal::from(m.clone()));
            match tracker.search(query, grams).await {
                Some(preview) => {
                    println!(
                        "{} ({:.0} g): {:.0} kcal, P {:.1} g, C {:.1} g, F {:.1} g [{}]",
                        preview.name,
                        preview.grams,
                        preview.estimate.calories,
                        preview.estimate.protein,
                        preview.estimate.carbs,
                        preview.estimate.fat,
                        preview.note
                    );
                    if log {
                        tracker.add_entry(today, preview.to_entry(meal)).await?;
                        info!("Logged {} for {}", preview.name, today);
                    }
                }
                None => println!("No match found. Try Open Food Facts or use Manual entry."),
            }
        }
        _ => println!("{USAGE}"),
    }

    // 4. Today's progress
    let progress = tracker.progress(today);
    for line in &progress {
        println!(
            "{:<9} {} {}",
            line.label,
            format_progress_bar(line.ratio, Some(20)),
            line.summary()
        );
    }
    let calories = progress.first().map_or(0.0, |p| p.ratio);
    println!("{}", motivation(calories, &mut RngChoice::thread()));

    Ok(())
}
