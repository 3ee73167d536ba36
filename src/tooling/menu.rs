//! Interactive menu
//!
//! Numbered menu over the record service. Prompts repeat until the input is
//! valid; failures of a single action are reported and the menu continues.

use crate::error::ApiError;
use crate::service::{NewRecord, RecordService};
use crate::tooling::format::{
    format_dropped_text, format_record_detail, format_records_text, format_statistics_text,
    format_warnings_text,
};
use crate::types::FieldUpdate;
use crate::views::SortField;
use dialoguer::{Confirm, Input, Select};
use owo_colors::OwoColorize;

const ACTIONS: [&str; 8] = [
    "1. Add a product (creates folders as needed)",
    "2. Show all products",
    "3. Filter products",
    "4. Modify a product",
    "5. Delete a product",
    "6. Sort products",
    "7. Statistics",
    "0. Exit",
];

/// Run the menu until the user picks "Exit".
pub fn run(service: &RecordService) -> Result<(), ApiError> {
    loop {
        let choice = Select::new()
            .with_prompt("Main menu")
            .items(&ACTIONS)
            .default(0)
            .interact()
            .map_err(input_error)?;

        let outcome = match choice {
            0 => add(service),
            1 => show_all(service),
            2 => filter(service),
            3 => modify(service),
            4 => delete(service),
            5 => sort(service),
            6 => statistics(service),
            _ => return Ok(()),
        };

        if let Err(e) = outcome {
            tracing::warn!(kind = e.kind(), "Menu action failed: {}", e);
            println!("{} {}", "error:".red(), e);
        }
    }
}

fn input_error(e: dialoguer::Error) -> ApiError {
    ApiError::InputError(e.to_string())
}

fn ask_text(prompt: &str) -> Result<String, ApiError> {
    Input::<String>::new()
        .with_prompt(prompt)
        .validate_with(|v: &String| {
            if v.trim().is_empty() {
                Err("Cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map(|v| v.trim().to_string())
        .map_err(input_error)
}

fn ask_optional_text(prompt: &str) -> Result<String, ApiError> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map(|v| v.trim().to_string())
        .map_err(input_error)
}

fn ask_price(prompt: &str) -> Result<f64, ApiError> {
    Input::<f64>::new()
        .with_prompt(prompt)
        .validate_with(|v: &f64| {
            if v.is_finite() && *v > 0.0 {
                Ok(())
            } else {
                Err("Must be a number greater than zero")
            }
        })
        .interact_text()
        .map_err(input_error)
}

fn ask_stock(prompt: &str) -> Result<u64, ApiError> {
    Input::<u64>::new()
        .with_prompt(prompt)
        .validate_with(|v: &u64| {
            if *v > 0 {
                Ok(())
            } else {
                Err("Must be a whole number greater than zero")
            }
        })
        .interact_text()
        .map_err(input_error)
}

fn add(service: &RecordService) -> Result<(), ApiError> {
    let input = NewRecord {
        level1: ask_text("Category (level 1)")?,
        level2: ask_text("Brand (level 2)")?,
        level3: ask_text("Model (level 3)")?,
        name: ask_text("Product name")?,
        price: ask_price("Price (e.g. 199.99)")?,
        stock: ask_stock("Stock")?,
        description: ask_optional_text("Description (optional)")?,
    };
    let created = service.create(input)?;
    println!(
        "Product added with id={} in {}",
        created.record.id, created.location
    );
    Ok(())
}

fn show_all(service: &RecordService) -> Result<(), ApiError> {
    let report = service.list_all_with_report()?;
    print!("{}", format_records_text("Products", &report.records));
    print!("{}", format_warnings_text(&report.warnings));
    Ok(())
}

fn filter(service: &RecordService) -> Result<(), ApiError> {
    println!("Fields: name, description, id, level1, level2, level3, price, stock");
    let field = ask_text("Filter by field")?;
    let criterion = ask_text("Value (price/stock accept >100, <50, =200)")?;
    let records = service.filter(&field, &criterion)?;
    print!("{}", format_records_text("Results", &records));
    Ok(())
}

fn modify(service: &RecordService) -> Result<(), ApiError> {
    let id = ask_text("Id of the product to modify")?;
    let Some(found) = service.find_by_id(&id)? else {
        println!("Product not found.");
        return Ok(());
    };
    print!("{}", format_record_detail(&found));

    let field = Select::new()
        .with_prompt("Field to modify")
        .items(&FieldUpdate::FIELDS)
        .interact()
        .map_err(input_error)?;
    let change = match FieldUpdate::FIELDS[field] {
        "name" => FieldUpdate::Name(ask_text("New name")?),
        "price" => FieldUpdate::Price(ask_price("New price")?),
        "stock" => FieldUpdate::Stock(ask_stock("New stock")?),
        _ => FieldUpdate::Description(ask_optional_text("New description")?),
    };
    let outcome = service.update(&id, change)?;
    println!("Change saved.");
    print!("{}", format_dropped_text(&outcome.dropped_rows));
    Ok(())
}

fn delete(service: &RecordService) -> Result<(), ApiError> {
    let id = ask_text("Id of the product to delete")?;
    let Some(found) = service.find_by_id(&id)? else {
        println!("Product not found.");
        return Ok(());
    };
    let confirmed = Confirm::new()
        .with_prompt(format!("Delete '{}' from {}?", found.record.name, found.location))
        .default(false)
        .interact()
        .map_err(input_error)?;
    if confirmed {
        let outcome = service.delete(&id)?;
        println!("Product deleted.");
        print!("{}", format_dropped_text(&outcome.dropped_rows));
    }
    Ok(())
}

fn sort(service: &RecordService) -> Result<(), ApiError> {
    let names: Vec<&str> = SortField::ALL.iter().map(|f| f.as_str()).collect();
    let field = Select::new()
        .with_prompt("Sort by")
        .items(&names[..])
        .interact()
        .map_err(input_error)?;
    let ascending = Select::new()
        .with_prompt("Direction")
        .items(&["Ascending", "Descending"])
        .default(0)
        .interact()
        .map_err(input_error)?
        == 0;
    let records = service.sort(names[field], ascending)?;
    print!("{}", format_records_text("Sorted products", &records));
    Ok(())
}

fn statistics(service: &RecordService) -> Result<(), ApiError> {
    print!("{}", format_statistics_text(&service.statistics()?));
    Ok(())
}
