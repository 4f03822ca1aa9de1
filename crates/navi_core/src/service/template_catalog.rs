//! Journal template lookup.
//!
//! The catalog is injected into the navigation service so title resolution
//! never depends on global state.

use crate::model::template::JournalTemplate;

/// Source of journal templates shown when creating journals.
pub trait TemplateCatalog {
    /// All templates in display order.
    fn list(&self) -> Vec<JournalTemplate>;
    /// Looks up one template by id.
    fn get_by_id(&self, id: &str) -> Option<JournalTemplate>;
}

/// Fixed in-memory template list.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateCatalog {
    templates: Vec<JournalTemplate>,
}

impl StaticTemplateCatalog {
    pub fn new(templates: Vec<JournalTemplate>) -> Self {
        Self { templates }
    }

    /// Built-in document journal templates.
    pub fn builtin() -> Self {
        Self::new(vec![
            JournalTemplate::new("tmpl_in", "Incoming"),
            JournalTemplate::new("tmpl_out", "Outgoing"),
            JournalTemplate::new("tmpl_ord", "Orders"),
            JournalTemplate::new("tmpl_req", "Requests"),
            JournalTemplate::new("tmpl_act", "Acts"),
            JournalTemplate::new("tmpl_note", "Memos"),
            JournalTemplate::new("tmpl_misc", "Other"),
        ])
    }
}

impl TemplateCatalog for StaticTemplateCatalog {
    fn list(&self) -> Vec<JournalTemplate> {
        self.templates.clone()
    }

    fn get_by_id(&self, id: &str) -> Option<JournalTemplate> {
        let id = id.trim();
        self.templates
            .iter()
            .find(|template| template.id == id)
            .cloned()
    }
}

impl<T: TemplateCatalog> TemplateCatalog for &T {
    fn list(&self) -> Vec<JournalTemplate> {
        (**self).list()
    }

    fn get_by_id(&self, id: &str) -> Option<JournalTemplate> {
        (**self).get_by_id(id)
    }
}
