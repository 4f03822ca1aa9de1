//! Command-line front end for `navi_core`.
//!
//! Usage: `navi_cli <db-path> [command] [args...]`
//!
//! Each invocation opens the database, restores the last location, applies at
//! most one command, and prints both axes. Logging is enabled only when
//! `NAVI_LOG_DIR` is set; `NAVI_LOG_LEVEL` overrides the default level.

use navi_core::db::open_db;
use navi_core::{
    default_log_level, init_logging, AxisModel, NavCommand, NavPresenter, NavSession, NavState,
    NavView, NavigationService, SqliteKvStore, StaticTemplateCatalog,
};
use std::process::ExitCode;
use uuid::Uuid;

const USAGE: &str = "usage: navi_cli <db-path> [command]

commands:
  show                          print both axes (default)
  templates                     list journal templates
  add-space [title]             create a sibling of the active space
  add-subspace [title]          create a child of the active space
  add-journal <template> [idx]  create a level-1 journal in the active space
  add-subjournal <template> [idx]
                                create a child of the active journal
  go-space <id>...              switch to a space path
  go-journal <id>...            switch to a journal path
  rm-space <id>                 delete a space subtree and its journals
  rm-journal <id>               delete a journal subtree";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let Some((db_path, rest)) = args.split_first() else {
        return Err(USAGE.to_string());
    };
    setup_logging()?;

    let conn = open_db(db_path).map_err(|err| format!("failed to open `{db_path}`: {err}"))?;
    let service =
        NavigationService::new(SqliteKvStore::new(&conn), StaticTemplateCatalog::builtin());
    let mut session =
        NavSession::start(service, TextPresenter { quiet: true }).map_err(|err| err.to_string())?;

    let (name, params) = match rest.split_first() {
        Some((name, params)) => (name.as_str(), params),
        None => ("show", &[][..]),
    };

    let command = match name {
        "show" => None,
        "templates" => {
            for template in session.templates() {
                println!("{}\t{}", template.id, template.title);
            }
            return Ok(());
        }
        "add-space" => Some(NavCommand::CreateSiblingSpace {
            parent_id: active_space_parent(session.state()),
            title: params.join(" "),
        }),
        "add-subspace" => Some(NavCommand::CreateChildSpace {
            parent_id: session.state().space_id,
            title: params.join(" "),
        }),
        "add-journal" => {
            let (template_id, index) = template_args(params)?;
            let space_id = session.state().space_id;
            Some(NavCommand::CreateLevelJournal {
                space_id,
                parent_id: space_id,
                template_id,
                index,
            })
        }
        "add-subjournal" => {
            let (template_id, index) = template_args(params)?;
            Some(NavCommand::CreateChildJournal {
                active_journal_id: session.state().journal_path.last().copied(),
                template_id,
                index,
            })
        }
        "go-space" => Some(NavCommand::GoSpacePath(parse_ids(params)?)),
        "go-journal" => Some(NavCommand::GoJournalPath(parse_ids(params)?)),
        "rm-space" => Some(NavCommand::DeleteSpaceSubtree {
            space_id: Some(parse_single_id(params)?),
        }),
        "rm-journal" => Some(NavCommand::DeleteJournalSubtree {
            journal_id: Some(parse_single_id(params)?),
        }),
        other => return Err(format!("unknown command `{other}`\n\n{USAGE}")),
    };

    session.presenter_mut().quiet = false;
    match command {
        Some(command) => {
            log::info!("event=cli_command module=cli command={}", command.name());
            session.dispatch(command).map_err(|err| err.to_string())
        }
        None => {
            let view = session.view();
            session.presenter().render_now(&view);
            Ok(())
        }
    }
}

fn setup_logging() -> Result<(), String> {
    let Ok(log_dir) = std::env::var("NAVI_LOG_DIR") else {
        return Ok(());
    };
    let level =
        std::env::var("NAVI_LOG_LEVEL").unwrap_or_else(|_| default_log_level().to_string());
    init_logging(&level, &log_dir)
}

/// Parent of the active space, so `add-space` lands next to it.
fn active_space_parent(state: &NavState) -> Option<Uuid> {
    let space_id = state.space_id?;
    state
        .space_nodes
        .iter()
        .find(|node| node.id == space_id)
        .and_then(|node| node.parent_id)
}

fn template_args(params: &[String]) -> Result<(String, Option<String>), String> {
    let Some((template_id, rest)) = params.split_first() else {
        return Err("template id is required; see `templates`".to_string());
    };
    let index = (!rest.is_empty()).then(|| rest.join(" "));
    Ok((template_id.clone(), index))
}

fn parse_ids(params: &[String]) -> Result<Vec<Uuid>, String> {
    params
        .iter()
        .map(|value| Uuid::parse_str(value).map_err(|err| format!("invalid id `{value}`: {err}")))
        .collect()
}

fn parse_single_id(params: &[String]) -> Result<Uuid, String> {
    match parse_ids(params)?.as_slice() {
        [id] => Ok(*id),
        _ => Err("exactly one id is required".to_string()),
    }
}

/// Prints both axes as indented text.
struct TextPresenter {
    quiet: bool,
}

impl TextPresenter {
    fn render_now(&self, view: &NavView) {
        print_axis("spaces", &view.space_axis);
        println!();
        print_axis("journals", &view.journal_axis);
    }
}

impl NavPresenter for TextPresenter {
    fn render(&mut self, _state: &NavState, view: &NavView) {
        if !self.quiet {
            self.render_now(view);
        }
    }
}

fn print_axis(name: &str, axis: &AxisModel) {
    let back = if axis.can_go_prev { " [back]" } else { "" };
    println!("{name}{back}");
    if axis.siblings.is_empty() {
        println!("  (empty)");
        return;
    }
    for sibling in &axis.siblings {
        let marker = if Some(sibling.id) == axis.active_id { '>' } else { ' ' };
        println!("{marker} {}  ({})  {}", sibling.label, sibling.child_count, sibling.id);
    }
    for child in &axis.children {
        println!("    - {}  {}", child.label, child.id);
    }
}
