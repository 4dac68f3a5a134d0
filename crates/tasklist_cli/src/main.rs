use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_cli::cli::{Cli, Command, collect_config_overrides, split_command_line};
use tasklist_core::config::{
    Config, Palette, load_config_with_fallback, merge_overrides, palette_for_theme,
};
use tasklist_core::error::AppError;
use tasklist_core::model::{Task, TaskId};
use tasklist_core::storage::FileStorage;
use tasklist_core::storage::file_store::store_dir;
use tasklist_core::task_api::TaskManager;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TASKLIST_LOG";

struct Session {
    manager: TaskManager<FileStorage>,
    palette: Palette,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

fn status_label(task: &Task) -> &'static str {
    if task.completed { "done" } else { "pending" }
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "title": task.title,
        "completed": task.completed,
    })
}

fn print_tasks_json(tasks: &[&Task]) {
    let payload = tasks.iter().map(|task| task_json(task)).collect();
    println!("{}", serde_json::Value::Array(payload));
}

fn print_tasks_table(tasks: &[&Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id.to_string(),
        title: task.title.clone(),
        status: status_label(task),
    });
    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");
}

fn print_matches_plain(tasks: &[&Task], query: &str, palette: &Palette) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    for task in tasks {
        println!(
            "{} | {} | {}",
            palette.mutedize(task.id.as_str()),
            palette.highlight_matches(&task.title, query),
            status_label(task)
        );
    }
}

fn print_outcome(json: bool, verb: &str, id: &TaskId, affected: usize) {
    if json {
        println!("{}", serde_json::json!({ "id": id, "affected": affected }));
    } else if affected == 0 {
        println!("No task with id {id}");
    } else {
        println!("{verb} task {id}");
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(cli: Cli, session: &mut Session) -> Result<(), AppError> {
    let manager = &mut session.manager;
    match cli.command {
        Command::Add { title } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };

            let id = manager.add_new_task(title)?;
            if let Some(task) = manager.find(&id) {
                if cli.json {
                    println!("{}", task_json(task));
                } else {
                    println!("Added task: {} ({})", task.title, task.id);
                }
            }
        }
        Command::Rename { id, new_title } => {
            let id = TaskId::new(id.trim());
            let affected = manager.update_existing_task(&id, new_title)?;
            print_outcome(cli.json, "Renamed", &id, affected);
        }
        Command::Delete { id } => {
            let id = TaskId::new(id.trim());
            let affected = manager.delete_task_by_id(&id)?;
            print_outcome(cli.json, "Deleted", &id, affected);
        }
        Command::Done { id, undo } => {
            let id = TaskId::new(id.trim());
            let affected = manager.set_task_completed(&id, !undo)?;
            let verb = if undo { "Reopened" } else { "Completed" };
            print_outcome(cli.json, verb, &id, affected);
        }
        Command::Search { query } => {
            manager.set_search_query(query.unwrap_or_default());
            let matches = manager.search();
            if cli.json {
                print_tasks_json(&matches);
            } else {
                print_matches_plain(&matches, manager.search_query(), &session.palette);
            }
        }
        Command::List => {
            let visible = manager.search();
            if cli.json {
                print_tasks_json(&visible);
            } else {
                print_tasks_table(&visible);
                if !manager.search_query().is_empty() {
                    let summary = format!(
                        "{} of {} tasks match \"{}\"",
                        visible.len(),
                        manager.tasks().len(),
                        manager.search_query()
                    );
                    println!("{}", session.palette.mutedize(&summary));
                }
            }
        }
    }

    Ok(())
}

fn run_interactive(session: &mut Session) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasklist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, session) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool, configured: Option<&str>) {
    let fallback = if verbose {
        "debug"
    } else {
        configured.unwrap_or("warn")
    };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed when embedded in a test harness.
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}

fn resolve_config(raw_overrides: &[String]) -> Result<(Config, Option<AppError>), AppError> {
    let loaded = load_config_with_fallback();
    let overrides = collect_config_overrides(raw_overrides)?;
    Ok((merge_overrides(&loaded.config, &overrides), loaded.error))
}

fn open_session(config: &Config) -> Result<Session, AppError> {
    let dir = store_dir(config.store_dir.as_deref())?;
    debug!(store_dir = %dir.display(), "opening task store");
    let manager = TaskManager::open(FileStorage::new(dir))?;
    Ok(Session {
        manager,
        palette: palette_for_theme(config.theme.as_deref()),
    })
}

fn start(cli: Option<Cli>) -> Result<(), AppError> {
    let (verbose, raw_overrides) = match cli.as_ref() {
        Some(cli) => (cli.verbose, cli.config_override.clone()),
        None => (false, Vec::new()),
    };

    let (config, config_error) = resolve_config(&raw_overrides)?;
    setup_logging(verbose, config.log_level.as_deref());
    if let Some(err) = config_error {
        warn!(error = %err, "ignoring unreadable config");
    }

    let mut session = open_session(&config)?;
    match cli {
        Some(cli) => run_command(cli, &mut session),
        None => run_interactive(&mut session),
    }
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    let cli = if args.next().is_none() {
        None
    } else {
        match Cli::try_parse() {
            Ok(cli) => Some(cli),
            Err(err) if !err.use_stderr() => {
                // --help and --version
                let _ = err.print();
                return;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                std::process::exit(1);
            }
        }
    };

    if let Err(err) = start(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
