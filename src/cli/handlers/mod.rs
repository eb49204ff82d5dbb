use std::fs;
use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::codec::TzMap;
use crate::io::config_io;
use crate::model::config::OnError;
use crate::model::line::{Container, ContainerItem};
use crate::model::todo::{Todo, TodoError};
use crate::parse::line_parser::{self, find_components};
use crate::parse::line_serializer::serialize_components;
use crate::parse::todo_parser::{COMPONENT, parse_todo};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Everything a command needs besides its own arguments
struct Context {
    tz: TzMap,
    on_error: OnError,
    json: bool,
}

pub fn dispatch(cli: Cli) -> CmdResult {
    let (config, tz) = config_io::load(cli.config.as_deref())?;
    let ctx = Context {
        tz,
        on_error: config.parse.on_error,
        json: cli.json,
    };

    match cli.command {
        Commands::Show(args) => cmd_show(&ctx, &args.file),
        Commands::Normalize(args) => cmd_normalize(&ctx, &args.file, args.output.as_deref()),
        Commands::Check(args) => cmd_check(&ctx, &args.file),
        Commands::Overlaps(args) => cmd_overlaps(&ctx, &args.file),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_calendar(path: &Path) -> Result<Vec<Container>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("could not read {}: {}", path.display(), e))?;
    Ok(line_parser::parse_components(&text)?)
}

/// Extract every VTODO in document order, applying the error policy
fn read_todos(ctx: &Context, roots: &[Container]) -> Result<Vec<Todo>, Box<dyn std::error::Error>> {
    let mut todos = Vec::new();
    for (i, container) in find_components(roots, COMPONENT).into_iter().enumerate() {
        match parse_todo(container, &ctx.tz) {
            Ok(todo) => todos.push(todo),
            Err(e) => match ctx.on_error {
                OnError::Abort => return Err(format!("VTODO #{}: {}", i + 1, e).into()),
                OnError::Skip => {
                    tracing::warn!(index = i + 1, error = %e, "skipping malformed VTODO");
                }
            },
        }
    }
    Ok(todos)
}

/// Replace every VTODO below `container` with its normalized form.
/// Returns the number of todos rewritten.
fn normalize_children(ctx: &Context, container: &mut Container) -> Result<usize, TodoError> {
    let mut count = 0;
    for item in &mut container.items {
        let ContainerItem::Component(child) = item else {
            continue;
        };
        if child.name == COMPONENT {
            if let Some(normalized) = normalize_one(ctx, child)? {
                *child = normalized;
                count += 1;
            }
        } else {
            count += normalize_children(ctx, child)?;
        }
    }
    Ok(count)
}

/// `None` when the todo is malformed and the policy says to leave it as is
fn normalize_one(ctx: &Context, container: &Container) -> Result<Option<Container>, TodoError> {
    match parse_todo(container, &ctx.tz) {
        Ok(todo) => Ok(Some(todo.to_container())),
        Err(e) if ctx.on_error == OnError::Skip => {
            tracing::warn!(error = %e, "leaving malformed VTODO unchanged");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_show(ctx: &Context, path: &Path) -> CmdResult {
    let roots = read_calendar(path)?;
    let mut todos = read_todos(ctx, &roots)?;
    todos.sort_by(|a, b| a.schedule_cmp(b));

    if ctx.json {
        let out: Vec<TodoJson> = todos.iter().map(todo_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if todos.is_empty() {
        println!("No todos.");
    } else {
        for todo in &todos {
            println!("{}", format_todo_line(todo));
        }
    }
    Ok(())
}

fn cmd_normalize(ctx: &Context, path: &Path, output: Option<&Path>) -> CmdResult {
    let mut roots = read_calendar(path)?;
    let mut count = 0;
    for root in &mut roots {
        if root.name == COMPONENT {
            if let Some(normalized) = normalize_one(ctx, root)? {
                *root = normalized;
                count += 1;
            }
        } else {
            count += normalize_children(ctx, root)?;
        }
    }
    tracing::debug!(count, "normalized todos");

    let text = serialize_components(&roots);
    match output {
        Some(out) => fs::write(out, text)
            .map_err(|e| format!("could not write {}: {}", out.display(), e))?,
        None => print!("{}", text),
    }
    Ok(())
}

fn cmd_check(ctx: &Context, path: &Path) -> CmdResult {
    let roots = read_calendar(path)?;
    let containers = find_components(&roots, COMPONENT);

    let mut failures = Vec::new();
    for (i, container) in containers.iter().enumerate() {
        if let Err(e) = parse_todo(container, &ctx.tz) {
            failures.push(CheckFailureJson {
                index: i + 1,
                uid: container.line("UID").map(|l| l.value.clone()),
                error: e.to_string(),
            });
        }
    }
    let result = CheckJson {
        total: containers.len(),
        valid: containers.len() - failures.len(),
        failures,
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for failure in &result.failures {
            match &failure.uid {
                Some(uid) => println!("  #{} [{}]: {}", failure.index, uid, failure.error),
                None => println!("  #{}: {}", failure.index, failure.error),
            }
        }
        println!("{} of {} todos valid", result.valid, result.total);
    }

    if result.failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} malformed todo(s)", result.failures.len()).into())
    }
}

fn cmd_overlaps(ctx: &Context, path: &Path) -> CmdResult {
    let roots = read_calendar(path)?;
    let todos = read_todos(ctx, &roots)?;

    let mut pairs = Vec::new();
    for (i, a) in todos.iter().enumerate() {
        for b in &todos[i + 1..] {
            if a ^ b {
                pairs.push((a, b));
            }
        }
    }

    if ctx.json {
        let out: Vec<OverlapJson> = pairs
            .iter()
            .map(|(a, b)| OverlapJson {
                first: a.uid().to_string(),
                second: b.uid().to_string(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if pairs.is_empty() {
        println!("No overlapping todos.");
    } else {
        for (a, b) in &pairs {
            println!("{}  ^  {}", todo_label(a), todo_label(b));
        }
    }
    Ok(())
}
