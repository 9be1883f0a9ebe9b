use std::collections::HashSet;

use crate::model::Project;

/// Identifiers already delivered under the active filter.
#[derive(Debug, Default, Clone)]
pub struct DedupSet {
    seen: HashSet<String>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }

    /// Keep only projects not seen before, recording them as seen. Order is
    /// preserved, and a repeat inside `incoming` itself is dropped too.
    pub fn admit(&mut self, incoming: Vec<Project>) -> Vec<Project> {
        incoming
            .into_iter()
            .filter(|p| self.seen.insert(p.id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OwnerSummary;

    fn p(id: &str) -> Project {
        Project {
            id: id.into(),
            title: format!("Project {id}"),
            description: String::new(),
            image: String::new(),
            live_site_url: None,
            github_url: None,
            category: "Mobile".into(),
            created_by: OwnerSummary::default(),
        }
    }

    #[test]
    fn admit_filters_repeats_and_keeps_order() {
        let mut set = DedupSet::new();
        let first: Vec<_> = set.admit(vec![p("5"), p("4"), p("4")]).into_iter().map(|p| p.id).collect();
        assert_eq!(first, ["5", "4"]);
        let second: Vec<_> = set.admit(vec![p("4"), p("3")]).into_iter().map(|p| p.id).collect();
        assert_eq!(second, ["3"]);
        assert_eq!(set.len(), 3);
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains("5"));
    }
}
