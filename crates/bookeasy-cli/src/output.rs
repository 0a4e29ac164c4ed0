use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{} {}", "failed to render json:".red(), e),
    }
}

fn print_table<T: Tabled>(items: Vec<T>) {
    let table = Table::new(items).with(Style::rounded()).to_string();
    println!("{}", table);
}

pub fn print_single<T: Tabled>(item: T) {
    print_table(vec![item]);
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// `what` names the resource in the table-mode banner, e.g. "Booking".
pub fn print_created<T: Serialize + Tabled>(item: T, what: &str, format: Format) {
    match format {
        Format::Json => print_json(&item),
        Format::Table => {
            print_success(&format!("{} created", what));
            print_single(item);
        }
    }
}

pub fn print_item<T: Serialize + Tabled>(item: T, format: Format) {
    match format {
        Format::Json => print_json(&item),
        Format::Table => print_single(item),
    }
}

pub fn print_items<T: Serialize + Tabled>(items: Vec<T>, format: Format) {
    match format {
        Format::Json => print_json(&items),
        Format::Table if items.is_empty() => println!("{}", "No results".dimmed()),
        Format::Table => {
            println!("{} result(s)", items.len());
            print_table(items);
        }
    }
}
