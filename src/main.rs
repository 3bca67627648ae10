//! roster CLI - student records manager

use clap::{Parser, Subcommand};
use roster::view::{export_dashboard, render, RosterScreen, YEAR_LEVELS};
use roster::{Fields, Record, Store, Value};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "A file-backed student records manager", long_about = None)]
struct Cli {
    /// Store directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new roster store
    Init,

    /// Print the student table
    List {
        #[arg(long, default_value = "students")]
        collection: String,
    },

    /// Add a student
    Add {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        year_level: String,
        #[arg(long)]
        email: String,
    },

    /// Update fields of an existing student (only the provided flags change)
    Edit {
        /// Record id
        id: String,
        #[arg(long)]
        student_id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        year_level: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Delete a student (asks for confirmation unless --yes)
    Delete {
        /// Record id
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Print one record
    Get {
        /// Record id
        id: String,
        #[arg(long, default_value = "students")]
        collection: String,
    },

    /// Run a filtered query, e.g. `yearLevel == "2nd Year" and units >= 18`
    Query {
        /// Filter expression (omit to match everything)
        filter: Option<String>,
        /// Order ascending by this field
        #[arg(long)]
        order_by: Option<String>,
        /// Cap the number of results
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value = "students")]
        collection: String,
    },

    /// Subscribe to a collection and reprint the table on every change
    Watch {
        /// Filter expression (omit to match everything)
        filter: Option<String>,
        #[arg(long, default_value = "students")]
        collection: String,
    },

    /// Write the HTML/JSON dashboard under views/
    Export {
        #[arg(long, default_value = "students")]
        collection: String,
    },

    /// Interactive record management screen
    Manage,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => init_store(&cli.database).await,
        Commands::List { collection } => list_students(&cli.database, &collection).await,
        Commands::Add {
            student_id,
            name,
            course,
            year_level,
            email,
        } => add_student(&cli.database, student_id, name, course, year_level, email).await,
        Commands::Edit {
            id,
            student_id,
            name,
            course,
            year_level,
            email,
        } => edit_student(&cli.database, &id, student_id, name, course, year_level, email).await,
        Commands::Delete { id, yes } => delete_student(&cli.database, &id, yes).await,
        Commands::Get { id, collection } => get_record(&cli.database, &collection, &id).await,
        Commands::Query {
            filter,
            order_by,
            limit,
            collection,
        } => run_query(&cli.database, &collection, filter, order_by, limit).await,
        Commands::Watch { filter, collection } => watch(&cli.database, &collection, filter).await,
        Commands::Export { collection } => export(&cli.database, &collection).await,
        Commands::Manage => run_manage(&cli.database).await,
    }
}

async fn init_store(path: &PathBuf) -> anyhow::Result<()> {
    println!("Initializing roster store at {:?}...", path);

    let _store = Store::open(path).await?;
    tokio::fs::create_dir_all(path.join("views")).await?;
    tokio::fs::create_dir_all(path.join(".roster/templates")).await?;

    println!("Store initialized successfully!");
    println!();
    println!("Directory structure:");
    println!("  collections/      - Record collections (one YAML file per record)");
    println!("  views/            - Generated dashboard outputs");
    println!("  .roster/templates - Custom HTML templates for exports");
    println!();
    println!("Get started:");
    println!("  roster add --student-id 2021-12345 --name \"Juan Dela Cruz\" \\");
    println!("    --course \"BS Computer Science\" --year-level \"2nd Year\" \\");
    println!("    --email juan@g.msuiit.edu.ph");
    println!("  roster list");
    println!("  roster manage");

    Ok(())
}

async fn list_students(path: &PathBuf, collection: &str) -> anyhow::Result<()> {
    let store = Store::open(path).await?;
    let records = store.query(collection, &[], Some("name"), None).await?;
    print!("{}", render::render_table(&records));
    Ok(())
}

async fn add_student(
    path: &PathBuf,
    student_id: String,
    name: String,
    course: String,
    year_level: String,
    email: String,
) -> anyhow::Result<()> {
    let store = Store::open(path).await?;
    let mut screen = RosterScreen::new(store);

    screen.open_create();
    screen.form.student_id = student_id;
    screen.form.name = name;
    screen.form.course = course;
    screen.form.year_level = year_level;
    screen.form.email = email;

    if screen.submit().await {
        println!("Student added.");
        print!("{}", render::render_table(&screen.records));
    } else if let Some(message) = screen.take_error() {
        anyhow::bail!("{}", message);
    }
    Ok(())
}

async fn edit_student(
    path: &PathBuf,
    id: &str,
    student_id: Option<String>,
    name: Option<String>,
    course: Option<String>,
    year_level: Option<String>,
    email: Option<String>,
) -> anyhow::Result<()> {
    if let Some(level) = &year_level {
        if !YEAR_LEVELS.contains(&level.as_str()) {
            anyhow::bail!("Year Level must be one of: {}", YEAR_LEVELS.join(", "));
        }
    }

    let mut fields = Fields::new();
    let pairs = [
        ("studentId", student_id),
        ("name", name),
        ("course", course),
        ("yearLevel", year_level),
        ("email", email),
    ];
    for (key, value) in pairs {
        if let Some(value) = value {
            fields.insert(key.to_string(), Value::from(value));
        }
    }
    if fields.is_empty() {
        anyhow::bail!("Nothing to change; pass at least one field flag");
    }

    let store = Store::open(path).await?;
    store.update("students", id, fields).await?;
    println!("Student updated.");

    let records = store.query("students", &[], Some("name"), None).await?;
    print!("{}", render::render_table(&records));
    Ok(())
}

async fn delete_student(path: &PathBuf, id: &str, yes: bool) -> anyhow::Result<()> {
    let store = Store::open(path).await?;

    let Some(record) = store.get("students", id).await? else {
        println!("No student with id '{}'.", id);
        return Ok(());
    };
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(id)
        .to_string();

    let confirmed = yes || confirm(&format!("Delete student '{}'? [y/N] ", name))?;
    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    store.delete("students", id).await?;
    println!("Student deleted.");

    let records = store.query("students", &[], Some("name"), None).await?;
    print!("{}", render::render_table(&records));
    Ok(())
}

async fn get_record(path: &PathBuf, collection: &str, id: &str) -> anyhow::Result<()> {
    let store = Store::open(path).await?;
    match store.get(collection, id).await? {
        Some(record) => print_record(&record),
        None => println!("No record with id '{}' in '{}'.", id, collection),
    }
    Ok(())
}

async fn run_query(
    path: &PathBuf,
    collection: &str,
    filter: Option<String>,
    order_by: Option<String>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let conditions = rosterq::parse(filter.as_deref().unwrap_or(""))?;

    let store = Store::open(path).await?;
    let records = store
        .query(collection, &conditions, order_by.as_deref(), limit)
        .await?;

    if records.is_empty() {
        println!("(0 records)");
    } else {
        for record in &records {
            print_record(record);
        }
        println!("({} record(s))", records.len());
    }
    Ok(())
}

async fn watch(path: &PathBuf, collection: &str, filter: Option<String>) -> anyhow::Result<()> {
    let conditions = rosterq::parse(filter.as_deref().unwrap_or(""))?;

    let store = Store::open(path).await?;
    let mut subscription = store.subscribe(collection, conditions).await?;
    // Pick up edits made by other processes too
    let _watcher = store.watch_files()?;

    println!("Watching '{}'; press Ctrl-C to stop.", collection);
    while let Some(snapshot) = subscription.next().await {
        match snapshot {
            Ok(records) => {
                println!();
                print!("{}", render::render_table(&records));
            }
            Err(e) => {
                eprintln!("Subscription ended: {}", e);
                break;
            }
        }
    }
    Ok(())
}

async fn export(path: &PathBuf, collection: &str) -> anyhow::Result<()> {
    let store = Store::open(path).await?;
    let out = export_dashboard(&store, collection).await?;
    println!("Dashboard written to {:?}", out);
    Ok(())
}

// ============================================================================
// Interactive management screen
// ============================================================================

async fn run_manage(path: &PathBuf) -> anyhow::Result<()> {
    let store = Store::open(path).await?;
    let mut screen = RosterScreen::new(store);

    println!("Roster Management");
    println!("Type 'help' for commands, 'quit' to exit.");
    println!();

    screen.reload().await;
    report_error(&mut screen);
    print!("{}", render::render_table(&screen.records));

    let stdin = io::stdin();
    loop {
        print!("roster> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, arg) = match line.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "quit" | "exit" | "\\q" => break,
            "help" | "\\h" => {
                println!("Commands:");
                println!("  list         - Reload and print the table");
                println!("  add          - Add a student (prompts for each field)");
                println!("  edit <row>   - Edit the student at a table row number");
                println!("  delete <row> - Delete the student at a table row number");
                println!("  help         - Show this help");
                println!("  quit         - Exit");
            }
            "list" => {
                screen.reload().await;
                report_error(&mut screen);
                print!("{}", render::render_table(&screen.records));
            }
            "add" => {
                screen.open_create();
                if prompt_form(&mut screen, false)? {
                    submit_with_retry(&mut screen).await?;
                } else {
                    screen.cancel();
                    println!("Cancelled.");
                }
            }
            "edit" => {
                let Some(id) = resolve_row(&screen, arg) else {
                    println!("Usage: edit <row>  (see the # column)");
                    continue;
                };
                if !screen.open_edit(&id) {
                    println!("Row no longer exists; run 'list'.");
                    continue;
                }
                if prompt_form(&mut screen, true)? {
                    submit_with_retry(&mut screen).await?;
                } else {
                    screen.cancel();
                    println!("Cancelled.");
                }
            }
            "delete" => {
                let Some(id) = resolve_row(&screen, arg) else {
                    println!("Usage: delete <row>  (see the # column)");
                    continue;
                };
                let name = screen
                    .records
                    .iter()
                    .find(|r| r.id == id)
                    .and_then(|r| r.get("name").and_then(Value::as_str))
                    .unwrap_or(id.as_str())
                    .to_string();
                let confirmed = confirm(&format!("Delete student '{}'? [y/N] ", name))?;
                if screen.delete(&id, confirmed).await {
                    println!("Student deleted.");
                    print!("{}", render::render_table(&screen.records));
                } else if confirmed {
                    report_error(&mut screen);
                } else {
                    println!("Cancelled.");
                }
            }
            _ => println!("Unknown command '{}'; type 'help'.", command),
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Prompt for every form field. In edit mode an empty answer keeps the shown
/// value; in create mode an empty answer cancels the form. Returns false on
/// cancel.
fn prompt_form(screen: &mut RosterScreen, editing: bool) -> io::Result<bool> {
    let year_levels = YEAR_LEVELS.join("/");
    let prompts: [(&str, fn(&mut RosterScreen) -> &mut String); 5] = [
        ("Student ID", |s| &mut s.form.student_id),
        ("Name", |s| &mut s.form.name),
        ("Course", |s| &mut s.form.course),
        ("Year Level", |s| &mut s.form.year_level),
        ("Email", |s| &mut s.form.email),
    ];

    for (label, field) in prompts {
        let current = field(screen).clone();
        let hint = if label == "Year Level" {
            format!(" ({})", year_levels)
        } else {
            String::new()
        };
        let prompt = if editing && !current.is_empty() {
            format!("{}{} [{}]: ", label, hint, current)
        } else {
            format!("{}{}: ", label, hint)
        };

        let answer = prompt_line(&prompt)?;
        if answer.is_empty() {
            if editing && !current.is_empty() {
                continue; // keep the existing value
            }
            return Ok(false);
        }
        *field(screen) = answer;
    }
    Ok(true)
}

/// Submit the form; on store failure offer one path back to a stable state.
async fn submit_with_retry(screen: &mut RosterScreen) -> anyhow::Result<()> {
    loop {
        if screen.submit().await {
            println!("Saved.");
            print!("{}", render::render_table(&screen.records));
            return Ok(());
        }
        report_error(screen);
        // The form stays open and populated; retry or discard
        if !confirm("Retry submit? [y/N] ")? {
            screen.cancel();
            println!("Discarded.");
            return Ok(());
        }
    }
}

fn resolve_row(screen: &RosterScreen, arg: &str) -> Option<String> {
    let row: usize = arg.parse().ok()?;
    screen.records.get(row.checked_sub(1)?).map(|r| r.id.clone())
}

fn report_error(screen: &mut RosterScreen) {
    if let Some(message) = screen.take_error() {
        println!("Error: {}", message);
    }
}

fn print_record(record: &Record) {
    println!("--- {} ---", record.id);
    let mut keys: Vec<_> = record.fields.keys().collect();
    keys.sort();
    for key in keys {
        println!("  {}: {:?}", key, record.fields[key]);
    }
    println!("  created: {}", record.created_at.to_rfc3339());
    println!("  updated: {}", record.updated_at.to_rfc3339());
    println!();
}

fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    let answer = prompt_line(prompt)?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}
