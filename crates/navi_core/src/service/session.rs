//! Presentation boundary: state accessor, command dispatch, re-render.
//!
//! # Responsibility
//! - Hold the current [`NavState`] between user actions.
//! - Translate [`NavCommand`] values into orchestrator transitions.
//! - Re-render after every successful transition.
//!
//! # Invariants
//! - A failed command leaves the held state unchanged and skips rendering.

use crate::model::node::{JournalId, NodeId, SpaceId};
use crate::model::template::JournalTemplate;
use crate::repo::kv_repo::KvStore;
use crate::service::navigation_service::{
    NavError, NavResult, NavState, NavView, NavigationService,
};
use crate::service::template_catalog::TemplateCatalog;
use log::debug;

/// Receives a fresh view after every committed transition.
pub trait NavPresenter {
    fn render(&mut self, state: &NavState, view: &NavView);
}

/// User-level navigation commands.
///
/// Ids are optional because presentation may not have a selection; a
/// missing required id is rejected as `InvalidArgument`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCommand {
    GoSpacePath(Vec<SpaceId>),
    GoJournalPath(Vec<JournalId>),
    CreateSiblingSpace {
        parent_id: Option<SpaceId>,
        title: String,
    },
    CreateChildSpace {
        parent_id: Option<SpaceId>,
        title: String,
    },
    DeleteSpaceSubtree {
        space_id: Option<SpaceId>,
    },
    CreateLevelJournal {
        space_id: Option<SpaceId>,
        parent_id: Option<NodeId>,
        template_id: String,
        index: Option<String>,
    },
    CreateChildJournal {
        active_journal_id: Option<JournalId>,
        template_id: String,
        index: Option<String>,
    },
    DeleteJournalSubtree {
        journal_id: Option<JournalId>,
    },
}

impl NavCommand {
    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GoSpacePath(_) => "go_space_path",
            Self::GoJournalPath(_) => "go_journal_path",
            Self::CreateSiblingSpace { .. } => "create_sibling_space",
            Self::CreateChildSpace { .. } => "create_child_space",
            Self::DeleteSpaceSubtree { .. } => "delete_space_subtree",
            Self::CreateLevelJournal { .. } => "create_level_journal",
            Self::CreateChildJournal { .. } => "create_child_journal",
            Self::DeleteJournalSubtree { .. } => "delete_journal_subtree",
        }
    }
}

/// Running navigation session bound to one presenter.
pub struct NavSession<K: KvStore, T: TemplateCatalog, P: NavPresenter> {
    service: NavigationService<K, T>,
    presenter: P,
    state: NavState,
}

impl<K: KvStore, T: TemplateCatalog, P: NavPresenter> NavSession<K, T, P> {
    /// Bootstraps state and performs the first render.
    pub fn start(service: NavigationService<K, T>, mut presenter: P) -> NavResult<Self> {
        let state = service.bootstrap()?;
        presenter.render(&state, &service.view(&state));
        Ok(Self {
            service,
            presenter,
            state,
        })
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn view(&self) -> NavView {
        self.service.view(&self.state)
    }

    pub fn templates(&self) -> Vec<JournalTemplate> {
        self.service.templates()
    }

    pub fn service(&self) -> &NavigationService<K, T> {
        &self.service
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Applies one command, replaces the held state, and re-renders.
    pub fn dispatch(&mut self, command: NavCommand) -> NavResult<()> {
        debug!("event=nav_dispatch module=session command={}", command.name());
        let next = self.apply(command)?;
        self.state = next;
        let view = self.service.view(&self.state);
        self.presenter.render(&self.state, &view);
        Ok(())
    }

    fn apply(&self, command: NavCommand) -> NavResult<NavState> {
        let service = &self.service;
        let state = &self.state;
        match command {
            NavCommand::GoSpacePath(path) => service.navigate_space(state, path),
            NavCommand::GoJournalPath(path) => service.navigate_journal(state, path),
            NavCommand::CreateSiblingSpace { parent_id, title } => {
                service.create_sibling_space(state, parent_id, &title)
            }
            NavCommand::CreateChildSpace { parent_id, title } => {
                service.create_child_space(state, required(parent_id, "parent_id")?, &title)
            }
            NavCommand::DeleteSpaceSubtree { space_id } => {
                service.delete_space_subtree(state, required(space_id, "space_id")?)
            }
            NavCommand::CreateLevelJournal {
                space_id,
                parent_id,
                template_id,
                index,
            } => service.create_level_journal(
                state,
                space_id,
                required(parent_id, "parent_id")?,
                &template_id,
                index.as_deref(),
            ),
            NavCommand::CreateChildJournal {
                active_journal_id,
                template_id,
                index,
            } => service.create_child_journal(
                state,
                active_journal_id,
                &template_id,
                index.as_deref(),
            ),
            NavCommand::DeleteJournalSubtree { journal_id } => {
                service.delete_journal_subtree(state, required(journal_id, "journal_id")?)
            }
        }
    }
}

fn required(id: Option<NodeId>, name: &str) -> NavResult<NodeId> {
    id.ok_or_else(|| NavError::InvalidArgument(format!("{name} is required")))
}
