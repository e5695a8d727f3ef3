// Entry point and interactive menu.
//
// The dataset is loaded once before the menu starts; a load failure ends
// the program. Every menu action recomputes the views it prints from the
// immutable dataset and the current session selection.
mod classify;
mod config;
mod error;
mod loader;
mod output;
mod pipeline;
mod session;
mod types;
mod util;

use std::io::{self, Write};

use anyhow::Context;
use config::Config;
use loader::Dataset;
use session::SessionState;

/// Print `prompt` and read one trimmed line. `None` once stdin is closed.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_choice() -> Option<String> {
    read_line("Enter choice: ")
}

/// Ask the user whether to go back to the menu after a view has been
/// printed.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N` or
/// stdin was closed.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to Menu (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Show a numbered dropdown and return the index picked, or `None` if the
/// user left it empty.
fn pick_from(title: &str, options: &[String], current: usize) -> Option<usize> {
    println!("{}", title);
    for (idx, option) in options.iter().enumerate() {
        let marker = if idx == current { "*" } else { " " };
        println!("{}[{}] {}", marker, idx + 1, option);
    }
    loop {
        let input = read_line("Enter number (blank keeps current): ")?;
        if input.is_empty() {
            return None;
        }
        match input.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Some(n - 1),
            _ => println!(
                "Invalid input. Please enter a number between 1 and {}.",
                options.len()
            ),
        }
    }
}

fn show_info(session: &mut SessionState) {
    println!("\n== {} ==\n", output::INFO_TITLE);
    println!("{}\n", output::INFO_TEXT);
    let _ = read_line("Press Enter to close (OK) ");
    session.dismiss_info();
    println!("");
}

fn handle_select_year(dataset: &Dataset, session: &mut SessionState) {
    let years = dataset.years();
    let labels: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    let current = years
        .iter()
        .position(|y| *y == session.selection.year)
        .unwrap_or(0);
    if let Some(idx) = pick_from("Select Year", &labels, current) {
        session.select_year(years, years[idx]);
    }
    println!("Year: {}\n", session.selection.year);
}

fn handle_select_region(dataset: &Dataset, session: &mut SessionState) {
    let regions = dataset.region_names();
    let current = regions
        .iter()
        .position(|r| *r == session.selection.region)
        .unwrap_or(0);
    if let Some(idx) = pick_from("Select a State to analyze its rainfall", regions, current) {
        session.select_region(regions, &regions[idx]);
    }
    println!("State: {}\n", session.selection.region);
}

fn handle_dashboard(dataset: &Dataset, config: &Config, session: &SessionState) {
    let selection = &session.selection;
    let view = pipeline::year_view(dataset.records(), selection.year, config.rank_size);
    if view.is_empty() {
        log::warn!("no rows for year {}", selection.year);
    }
    let series = pipeline::series_for_region(dataset.records(), &selection.region);

    println!("{}\n", output::render_map(&view, dataset, config.map_classes));
    println!("{}\n", output::render_extremes(&view, config.rank_size));
    println!("{}\n", output::render_gauge(&view));
    println!("{}\n", output::render_series(&selection.region, &series));
}

fn handle_export(dataset: &Dataset, config: &Config, session: &SessionState) {
    let year = session.selection.year;
    let view = pipeline::year_view(dataset.records(), year, config.rank_size);

    let long_form = &config.long_form_export;
    match output::write_csv(long_form, dataset.records()) {
        Ok(()) => println!(
            "Long-form table ({} rows) exported to {}",
            util::format_int(dataset.records().len()),
            long_form.display()
        ),
        Err(e) => eprintln!("Write error: {}", e),
    }

    let summary_path = config.summary_export(year);
    match output::write_json(&summary_path, &output::year_summary(&view)) {
        Ok(()) => println!("Summary for {} exported to {}\n", year, summary_path.display()),
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::default();
    let (dataset, report) = loader::load(&config)
        .with_context(|| format!("failed to load {}", config.data_path.display()))?;

    let mut session = SessionState::new(dataset.years(), dataset.region_names())
        .context("dataset has no years or states")?;

    println!(
        "Nigeria's Rainfall Dashboard ({} - {})",
        config.first_year, config.last_year
    );
    println!(
        "{} features read: {} states x {} years ({} records).\n",
        util::format_int(report.features),
        util::format_int(report.regions),
        util::format_int(report.years),
        util::format_int(report.records)
    );

    if session.show_info {
        show_info(&mut session);
    }

    loop {
        println!("Select an option:");
        println!("[1] Select year (current: {})", session.selection.year);
        println!("[2] Select state (current: {})", session.selection.region);
        println!("[3] Show dashboard");
        println!("[4] Export tables");
        println!("[5] View info");
        println!("[0] Exit\n");
        let Some(choice) = read_choice() else {
            break;
        };
        match choice.as_str() {
            "1" => handle_select_year(&dataset, &mut session),
            "2" => handle_select_region(&dataset, &mut session),
            "3" => {
                println!("");
                handle_dashboard(&dataset, &config, &session);
                if !prompt_back_to_menu() {
                    break;
                }
            }
            "4" => handle_export(&dataset, &config, &session),
            "5" => show_info(&mut session),
            "0" => break,
            _ => println!("Invalid choice. Please enter a number from 0 to 5.\n"),
        }
    }
    println!("Exiting the program.");
    Ok(())
}
