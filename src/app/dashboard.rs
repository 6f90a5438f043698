//! One user interaction in, one rendered outcome out.
//!
//! `Dashboard::handle` is the boundary errors never cross: whatever fails
//! inside an action comes back as `Outcome::Error` and the session goes on.

use crate::app::render;
use crate::config::AppConfig;
use crate::core::catalog::{CatalogEntry, ChartHint};
use crate::core::executor::QueryExecutor;
use crate::domain::model::{NewListing, ResultTable};
use crate::utils::error::{Result, TrackerError};
use crate::utils::validation::parse_iso_date;
use std::io::{self, BufRead, Write};

const HELP: &str = r#"
Commands:
  catalog                       Show the analysis options
  run <n> [city]                Run analysis <n> (city applies to entry 3)
  listings [city, city, ...]    Show food listings, optionally filtered by city
  cities                        List provider cities
  add <name>; <qty>; <YYYY-MM-DD>; <provider id>[; <location>]
                                Add a food listing
  sql <statement>               Run one SQL statement
  help                          Show this help message
  quit                          Exit
"#;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ListCatalog,
    RunEntry { number: usize, city: Option<String> },
    Listings(Vec<String>),
    Cities,
    AddListing(NewListing),
    Sql(String),
}

impl Action {
    /// Parse one line typed into the interactive session.
    ///
    /// ```text
    /// catalog
    /// run 3 [city]
    /// listings [city, city, ...]
    /// cities
    /// add <food name>; <quantity>; <YYYY-MM-DD>; <provider id>[; <location>]
    /// sql <statement>
    /// ```
    pub fn parse(line: &str) -> Result<Action> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_ascii_lowercase().as_str() {
            "catalog" | "menu" => Ok(Action::ListCatalog),
            "run" => {
                let (number, city) = match rest.split_once(char::is_whitespace) {
                    Some((number, city)) => (number, Some(city.trim().to_string())),
                    None => (rest, None),
                };
                let number = number.parse::<usize>().map_err(|_| TrackerError::ValidationError {
                    message: format!("'{}' is not a catalog number", number),
                })?;
                Ok(Action::RunEntry { number, city })
            }
            "listings" => Ok(Action::Listings(
                rest.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect(),
            )),
            "cities" => Ok(Action::Cities),
            "add" => parse_listing(rest).map(Action::AddListing),
            "sql" if !rest.is_empty() => Ok(Action::Sql(rest.to_string())),
            _ => Err(TrackerError::ValidationError {
                message: format!("Unknown command '{}'; type 'help' for the list", line),
            }),
        }
    }
}

fn parse_listing(raw: &str) -> Result<NewListing> {
    let fields: Vec<&str> = raw.split(';').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(TrackerError::ValidationError {
            message: "Expected: add <food name>; <quantity>; <YYYY-MM-DD>; <provider id>[; <location>]"
                .to_string(),
        });
    }

    let quantity = fields[1].parse::<u32>().map_err(|_| TrackerError::ValidationError {
        message: format!("Quantity must be a whole number, got '{}'", fields[1]),
    })?;
    let expiry_date = parse_iso_date("Expiry_Date", fields[2])?;
    let provider_id = fields[3].parse::<i64>().map_err(|_| TrackerError::ValidationError {
        message: format!("Provider_ID must be a number, got '{}'", fields[3]),
    })?;

    let mut listing = NewListing::new(fields[0], quantity, expiry_date, provider_id);
    listing.location = fields
        .get(4)
        .filter(|location| !location.is_empty())
        .map(|location| location.to_string());
    Ok(listing)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Catalog(Vec<String>),
    Table {
        title: String,
        table: ResultTable,
        chart: Option<String>,
    },
    Cities(Vec<String>),
    Inserted { food_id: i64 },
    Error(String),
}

pub struct Dashboard {
    executor: QueryExecutor,
    config: AppConfig,
}

impl Dashboard {
    pub fn new(executor: QueryExecutor, config: AppConfig) -> Self {
        Self { executor, config }
    }

    pub fn handle(&self, action: Action) -> Outcome {
        match self.dispatch(action) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    "Action failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                Outcome::Error(format!(
                    "{}\n💡 {}",
                    e.user_friendly_message(),
                    e.recovery_suggestion()
                ))
            }
        }
    }

    fn dispatch(&self, action: Action) -> Result<Outcome> {
        match action {
            Action::ListCatalog => Ok(Outcome::Catalog(
                CatalogEntry::ALL.iter().map(|e| e.to_string()).collect(),
            )),
            Action::RunEntry { number, city } => {
                let entry = CatalogEntry::from_number(number).ok_or_else(|| {
                    TrackerError::ValidationError {
                        message: format!(
                            "No catalog entry {}; choose 1-{}",
                            number,
                            CatalogEntry::ALL.len()
                        ),
                    }
                })?;
                let city = city.unwrap_or_else(|| self.config.contact_city().to_string());
                let table = self.executor.run_entry(entry, &city)?;

                let chart = match entry.chart_hint() {
                    ChartHint::Bar => render::format_bar_chart(&table, self.config.output.chart_width),
                    ChartHint::None => None,
                };
                let title = if entry.takes_city() {
                    format!("{} ({})", entry, city)
                } else {
                    entry.to_string()
                };
                Ok(Outcome::Table { title, table, chart })
            }
            Action::Listings(cities) => {
                let title = if cities.is_empty() {
                    "All Food Listings".to_string()
                } else {
                    format!("Food Listings in {}", cities.join(", "))
                };
                let table = self.executor.filter_listings(&cities)?;
                Ok(Outcome::Table {
                    title,
                    table,
                    chart: None,
                })
            }
            Action::Cities => Ok(Outcome::Cities(self.executor.distinct_cities()?)),
            Action::AddListing(listing) => {
                let food_id = self.executor.insert_listing(&listing)?;
                Ok(Outcome::Inserted { food_id })
            }
            Action::Sql(statement) => {
                let table = self.executor.execute(&statement)?;
                Ok(Outcome::Table {
                    title: statement,
                    table,
                    chart: None,
                })
            }
        }
    }

    /// Line-oriented session over any reader and writer.
    ///
    /// A line that fails to parse, decode or execute prints its error and the
    /// session carries on. Only a failing `output` ends it with an error.
    pub fn run_session<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> io::Result<()> {
        writeln!(output, "Local Food Wastage Management System")?;
        writeln!(output, "Type 'help' for commands, 'quit' to exit.")?;
        write!(output, "{}", self.present(&self.handle(Action::ListCatalog)))?;

        let mut buf = Vec::new();
        loop {
            write!(output, "foodshare> ")?;
            output.flush()?;

            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    writeln!(output)?;
                    break;
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // 輸入端已經壞了，結束這次工作階段
                    tracing::warn!("Reading dashboard input failed: {}", e);
                    write!(output, "{}", self.present(&Outcome::Error(format!("Input error: {}", e))))?;
                    break;
                }
            }

            let line = String::from_utf8_lossy(&buf);
            match line.trim() {
                "" => continue,
                "quit" | "exit" | ".quit" => break,
                "help" | ".help" => writeln!(output, "{}", HELP)?,
                command => {
                    let outcome = match Action::parse(command) {
                        Ok(action) => self.handle(action),
                        Err(e) => Outcome::Error(e.user_friendly_message()),
                    };
                    write!(output, "{}", self.present(&outcome))?;
                }
            }
        }

        writeln!(output, "Goodbye!")?;
        Ok(())
    }

    /// Turn an outcome into text for the terminal.
    pub fn present(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::Catalog(entries) => {
                let mut out = String::from("Analysis Options\n");
                for entry in entries {
                    out.push_str(&format!("  {}\n", entry));
                }
                out
            }
            Outcome::Table { title, table, chart } => {
                let body = match render::render(table, self.config.output.format) {
                    Ok(body) => body,
                    Err(e) => return format!("❌ {}", e.user_friendly_message()),
                };
                let mut out = format!("== {} ==\n{}", title, body);
                if let Some(chart) = chart {
                    out.push_str("\n--- Chart ---\n");
                    out.push_str(chart);
                }
                out
            }
            Outcome::Cities(cities) if cities.is_empty() => "No cities found.\n".to_string(),
            Outcome::Cities(cities) => format!("Cities: {}\n", cities.join(", ")),
            Outcome::Inserted { food_id } => format!("✅ Listing added with Food_ID {}\n", food_id),
            Outcome::Error(message) => format!("❌ {}\n", message),
        }
    }
}
