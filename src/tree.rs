use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::curriculum::{ComponentDef, ComponentKind};
use crate::error::TreeError;
use crate::exercises;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Story,
    Theory,
    Summary,
    Exercises,
    Reference,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Story => "Story",
            Tab::Theory => "Theory",
            Tab::Summary => "Summary",
            Tab::Exercises => "Exercises",
            Tab::Reference => "Reference",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "story" => Some(Tab::Story),
            "theory" => Some(Tab::Theory),
            "summary" => Some(Tab::Summary),
            "exercises" | "exercise" => Some(Tab::Exercises),
            "reference" => Some(Tab::Reference),
            _ => None,
        }
    }
}

/// Validated curriculum graph. Components are kept in topological order:
/// every component comes after all of its prerequisites.
#[derive(Debug)]
pub struct ContentTree {
    components: Vec<ComponentDef>,
    index: HashMap<&'static str, usize>,
    follow_ups: HashMap<&'static str, Vec<&'static str>>,
}

impl ContentTree {
    pub fn load(defs: &[ComponentDef]) -> Result<Self, TreeError> {
        let mut position: HashMap<&'static str, usize> = HashMap::new();
        for (i, def) in defs.iter().enumerate() {
            if position.insert(def.id, i).is_some() {
                return Err(TreeError::DuplicateComponent(def.id.to_string()));
            }
        }

        for def in defs {
            if let Some(missing) = def.prerequisites.iter().find(|p| !position.contains_key(*p)) {
                return Err(TreeError::UnknownPrerequisite {
                    component: def.id.to_string(),
                    prerequisite: missing.to_string(),
                });
            }
        }

        let order = topological_order(defs)?;
        let components: Vec<ComponentDef> = order.iter().map(|&i| defs[i]).collect();
        let index = components
            .iter()
            .enumerate()
            .map(|(i, def)| (def.id, i))
            .collect();

        let mut follow_ups: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for def in &components {
            for prerequisite in def.prerequisites {
                follow_ups.entry(*prerequisite).or_default().push(def.id);
            }
        }

        Ok(Self {
            components,
            index,
            follow_ups,
        })
    }

    pub fn get(&self, id: &str) -> Option<&ComponentDef> {
        self.index.get(id).map(|&i| &self.components[i])
    }

    pub fn components(&self) -> &[ComponentDef] {
        &self.components
    }

    pub fn skills(&self) -> impl Iterator<Item = &ComponentDef> {
        self.components
            .iter()
            .filter(|c| c.kind == ComponentKind::Skill)
    }

    pub fn concepts(&self) -> impl Iterator<Item = &ComponentDef> {
        self.components
            .iter()
            .filter(|c| c.kind == ComponentKind::Concept)
    }

    pub fn prerequisites(&self, id: &str) -> &[&'static str] {
        self.get(id).map(|c| c.prerequisites).unwrap_or(&[])
    }

    pub fn follow_ups(&self, id: &str) -> &[&'static str] {
        self.follow_ups.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tabs that have something to show, in display order.
    pub fn tabs(&self, id: &str) -> Vec<Tab> {
        let Some(def) = self.get(id) else {
            return Vec::new();
        };

        let content = &def.content;
        let has_exercises =
            def.kind == ComponentKind::Skill && exercises::descriptor(def.id).is_some();

        [
            (Tab::Story, content.story.is_some()),
            (Tab::Theory, content.theory.is_some()),
            (Tab::Summary, content.summary.is_some()),
            (Tab::Exercises, has_exercises),
            (Tab::Reference, content.reference.is_some()),
        ]
        .into_iter()
        .filter(|(_, present)| *present)
        .map(|(tab, _)| tab)
        .collect()
    }

    pub fn tab_text(&self, id: &str, tab: Tab) -> Option<&'static str> {
        let content = &self.get(id)?.content;
        match tab {
            Tab::Story => content.story,
            Tab::Theory => content.theory,
            Tab::Summary => content.summary,
            Tab::Reference => content.reference,
            Tab::Exercises => None,
        }
    }

    /// A component is unlocked once all of its prerequisites are complete.
    pub fn is_unlocked(&self, id: &str, is_complete: impl Fn(&str) -> bool) -> bool {
        match self.get(id) {
            Some(def) => def.prerequisites.iter().all(|p| is_complete(p)),
            None => false,
        }
    }

    /// First unlocked, incomplete component in course order.
    pub fn next_up(&self, is_complete: impl Fn(&str) -> bool) -> Option<&ComponentDef> {
        self.components
            .iter()
            .find(|c| !is_complete(c.id) && c.prerequisites.iter().all(|p| is_complete(p)))
    }
}

// Kahn's algorithm; ties keep definition order.
fn topological_order(defs: &[ComponentDef]) -> Result<Vec<usize>, TreeError> {
    let mut placed: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(defs.len());

    while order.len() < defs.len() {
        let ready: Vec<usize> = defs
            .iter()
            .enumerate()
            .filter(|(_, d)| !placed.contains(d.id))
            .filter(|(_, d)| d.prerequisites.iter().all(|p| placed.contains(p)))
            .map(|(i, _)| i)
            .collect();

        if ready.is_empty() {
            return Err(TreeError::Cycle(find_cycle(defs, &placed)));
        }

        for i in ready {
            placed.insert(defs[i].id);
            order.push(i);
        }
    }

    Ok(order)
}

// Every unplaced component waits on another unplaced one, so following
// prerequisites from any of them must come back around.
fn find_cycle(defs: &[ComponentDef], placed: &HashSet<&str>) -> Vec<String> {
    let by_id: HashMap<&str, &ComponentDef> = defs.iter().map(|d| (d.id, d)).collect();
    let Some(mut current) = defs.iter().find(|d| !placed.contains(d.id)) else {
        return Vec::new();
    };

    let mut path: Vec<&str> = Vec::new();
    loop {
        if let Some(start) = path.iter().position(|id| *id == current.id) {
            let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
            cycle.push(current.id.to_string());
            return cycle;
        }
        path.push(current.id);

        let next = current
            .prerequisites
            .iter()
            .find(|p| !placed.contains(*p))
            .and_then(|p| by_id.get(p).copied());
        match next {
            Some(def) => current = def,
            None => return path.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::{Content, CURRICULUM};

    fn def(id: &'static str, prerequisites: &'static [&'static str]) -> ComponentDef {
        ComponentDef {
            id,
            name: id,
            kind: ComponentKind::Concept,
            prerequisites,
            content: Content::default(),
        }
    }

    fn setup_tree() -> ContentTree {
        ContentTree::load(CURRICULUM).expect("curriculum should load")
    }

    mod load_tests {
        use super::*;

        #[test]
        fn curriculum_loads() {
            let tree = setup_tree();
            assert_eq!(tree.components().len(), CURRICULUM.len());
            assert_eq!(tree.concepts().count(), 5);
            assert_eq!(tree.skills().count(), 15);
        }

        #[test]
        fn order_respects_prerequisites() {
            let tree = setup_tree();
            let seen: Vec<&str> = tree.components().iter().map(|c| c.id).collect();
            for (i, c) in tree.components().iter().enumerate() {
                for p in c.prerequisites {
                    assert!(seen[..i].contains(p), "{} before {}", p, c.id);
                }
            }
        }

        #[test]
        fn ties_keep_definition_order() {
            let defs = [def("b", &[]), def("a", &[]), def("c", &["a"])];
            let tree = ContentTree::load(&defs).unwrap();
            let ids: Vec<&str> = tree.components().iter().map(|c| c.id).collect();
            assert_eq!(ids, vec!["b", "a", "c"]);
        }

        #[test]
        fn duplicate_rejected() {
            let defs = [def("a", &[]), def("a", &[])];
            assert_eq!(
                ContentTree::load(&defs).unwrap_err(),
                TreeError::DuplicateComponent("a".into())
            );
        }

        #[test]
        fn unknown_prerequisite_rejected() {
            let defs = [def("a", &["ghost"])];
            assert_eq!(
                ContentTree::load(&defs).unwrap_err(),
                TreeError::UnknownPrerequisite {
                    component: "a".into(),
                    prerequisite: "ghost".into(),
                }
            );
        }

        #[test]
        fn cycle_rejected_with_path() {
            let defs = [def("root", &[]), def("a", &["b"]), def("b", &["c"]), def("c", &["a", "root"])];
            let err = ContentTree::load(&defs).unwrap_err();
            assert_eq!(
                err,
                TreeError::Cycle(vec!["a".into(), "b".into(), "c".into(), "a".into()])
            );
            assert_eq!(err.to_string(), "prerequisite cycle: a -> b -> c -> a");
        }

        #[test]
        fn self_reference_is_a_cycle() {
            let defs = [def("a", &["a"])];
            assert_eq!(
                ContentTree::load(&defs).unwrap_err(),
                TreeError::Cycle(vec!["a".into(), "a".into()])
            );
        }
    }

    mod graph_tests {
        use super::*;

        #[test]
        fn follow_ups_invert_prerequisites() {
            let tree = setup_tree();
            let follow = tree.follow_ups("insert-rows");
            assert!(follow.contains(&"update-rows"));
            assert!(follow.contains(&"delete-rows"));
            assert!(tree.follow_ups("explore-data").is_empty());
            assert!(tree.follow_ups("nope").is_empty());
        }

        #[test]
        fn unlocking_follows_completion() {
            let tree = setup_tree();
            assert!(tree.is_unlocked("database", |_| false));
            assert!(!tree.is_unlocked("database-table", |_| false));
            assert!(tree.is_unlocked("database-table", |id| id == "database"));
            assert!(!tree.is_unlocked("nope", |_| true));
        }

        #[test]
        fn next_up_walks_the_course() {
            let tree = setup_tree();
            assert_eq!(tree.next_up(|_| false).unwrap().id, "database");
            assert_eq!(tree.next_up(|id| id == "database").unwrap().id, "database-table");
            assert!(tree.next_up(|_| true).is_none());
        }
    }

    mod tab_tests {
        use super::*;

        #[test]
        fn concept_tabs() {
            let tree = setup_tree();
            assert_eq!(
                tree.tabs("database"),
                vec![Tab::Story, Tab::Theory, Tab::Summary]
            );
        }

        #[test]
        fn skill_tabs_include_exercises() {
            let tree = setup_tree();
            assert_eq!(
                tree.tabs("filter-rows"),
                vec![Tab::Theory, Tab::Exercises, Tab::Reference]
            );
            assert!(tree.tab_text("filter-rows", Tab::Theory).unwrap().contains("WHERE"));
            assert!(tree.tab_text("filter-rows", Tab::Exercises).is_none());
        }

        #[test]
        fn unknown_component_has_no_tabs() {
            assert!(setup_tree().tabs("nope").is_empty());
        }

        #[test]
        fn tab_names_parse() {
            assert_eq!(Tab::from_str("Theory"), Some(Tab::Theory));
            assert_eq!(Tab::from_str("exercise"), Some(Tab::Exercises));
            assert_eq!(Tab::from_str("diagram"), None);
        }
    }

    mod catalog_tests {
        use super::*;

        #[test]
        fn every_skill_has_a_descriptor() {
            let tree = setup_tree();
            for s in tree.skills() {
                assert!(exercises::descriptor(s.id).is_some(), "{}", s.id);
            }
        }

        #[test]
        fn every_descriptor_is_in_the_curriculum() {
            let tree = setup_tree();
            for d in exercises::CATALOG {
                let c = tree.get(d.skill_id).unwrap_or_else(|| panic!("{}", d.skill_id));
                assert_eq!(c.kind, ComponentKind::Skill);
            }
        }
    }
}
