use std::{collections::HashMap, fmt, sync::Arc};

use thiserror::Error;
use tracing::trace;

use crate::{
    messages::ValidationMessages,
    rules::{ErrorKey, Rule, evaluate},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("field {0} is a group, not a control")]
    NotAControl(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

/// Called with the form and the new value after a control's value changes.
pub type ValueListener = Arc<dyn Fn(&mut Form, &str) + Send + Sync>;

#[derive(Clone, Debug)]
pub struct Control {
    value: String,
    initial: String,
    rules: Vec<Rule>,
    errors: Vec<ErrorKey>,
    dirty: bool,
    touched: bool,
}

impl Control {
    fn new(initial: String, rules: Vec<Rule>) -> Self {
        let errors = evaluate(&rules, &initial);
        Self {
            value: initial.clone(),
            initial,
            rules,
            errors,
            dirty: false,
            touched: false,
        }
    }

    fn revalidate(&mut self) {
        self.errors = evaluate(&self.rules, &self.value);
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Failing rule keys as of the last validation pass.
    pub fn errors(&self) -> &[ErrorKey] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Invalid controls surface errors only after user interaction.
    pub fn shows_errors(&self) -> bool {
        !self.is_valid() && (self.touched || self.dirty)
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Control(Control),
    Group { children: Vec<NodeId> },
}

#[derive(Clone, Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// Declarative shape of a group, consumed by [`Form::build`].
#[derive(Clone, Debug, Default)]
pub struct GroupSpec {
    entries: Vec<(String, FieldSpec)>,
}

#[derive(Clone, Debug)]
enum FieldSpec {
    Control { initial: String, rules: Vec<Rule> },
    Group(GroupSpec),
}

impl GroupSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn control(mut self, name: &str, initial: &str, rules: Vec<Rule>) -> Self {
        self.entries.push((
            name.to_string(),
            FieldSpec::Control {
                initial: initial.to_string(),
                rules,
            },
        ));
        self
    }

    pub fn group(mut self, name: &str, group: GroupSpec) -> Self {
        self.entries.push((name.to_string(), FieldSpec::Group(group)));
        self
    }
}

/// Field tree with per-control validation state.
#[derive(Clone)]
pub struct Form {
    nodes: Vec<Node>,
    listeners: HashMap<NodeId, Vec<ValueListener>>,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("nodes", &self.nodes)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Form {
    pub fn build(spec: GroupSpec) -> Self {
        let mut form = Self {
            nodes: vec![Node {
                name: String::new(),
                parent: None,
                kind: NodeKind::Group {
                    children: Vec::new(),
                },
            }],
            listeners: HashMap::new(),
        };
        form.insert_group(ROOT, spec);
        form
    }

    fn insert_group(&mut self, parent: NodeId, spec: GroupSpec) {
        for (name, field) in spec.entries {
            let id = NodeId(self.nodes.len());
            let (kind, nested) = match field {
                FieldSpec::Control { initial, rules } => {
                    (NodeKind::Control(Control::new(initial, rules)), None)
                }
                FieldSpec::Group(group) => (
                    NodeKind::Group {
                        children: Vec::new(),
                    },
                    Some(group),
                ),
            };
            self.nodes.push(Node {
                name,
                parent: Some(parent),
                kind,
            });
            if let NodeKind::Group { children } = &mut self.nodes[parent.0].kind {
                children.push(id);
            }
            if let Some(group) = nested {
                self.insert_group(id, group);
            }
        }
    }

    /// Resolves a dotted path such as `skill.skillName`.
    pub fn resolve(&self, path: &str) -> Result<NodeId, FormError> {
        let mut current = ROOT;
        for segment in path.split('.') {
            let NodeKind::Group { children } = &self.nodes[current.0].kind else {
                return Err(FormError::UnknownField(path.to_string()));
            };
            current = children
                .iter()
                .copied()
                .find(|child| self.nodes[child.0].name == segment)
                .ok_or_else(|| FormError::UnknownField(path.to_string()))?;
        }
        Ok(current)
    }

    /// Dotted path of a node, the inverse of [`Form::resolve`].
    pub fn path_of(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(node_id) = cursor {
            let node = &self.nodes[node_id.0];
            if node.parent.is_some() {
                segments.push(node.name.as_str());
            }
            cursor = node.parent;
        }
        segments.reverse();
        segments.join(".")
    }

    pub fn control(&self, path: &str) -> Result<&Control, FormError> {
        let id = self.resolve(path)?;
        match &self.nodes[id.0].kind {
            NodeKind::Control(control) => Ok(control),
            NodeKind::Group { .. } => Err(FormError::NotAControl(path.to_string())),
        }
    }

    fn control_mut(&mut self, path: &str) -> Result<(NodeId, &mut Control), FormError> {
        let id = self.resolve(path)?;
        match &mut self.nodes[id.0].kind {
            NodeKind::Control(control) => Ok((id, control)),
            NodeKind::Group { .. } => Err(FormError::NotAControl(path.to_string())),
        }
    }

    pub fn value(&self, path: &str) -> Result<&str, FormError> {
        self.control(path).map(Control::value)
    }

    pub fn errors(&self, path: &str) -> Result<&[ErrorKey], FormError> {
        self.control(path).map(Control::errors)
    }

    /// User edit: marks the control dirty, revalidates it and notifies its listeners.
    pub fn set_value(&mut self, path: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.write_value(path, value.into(), true)
    }

    /// Programmatic fill: like [`Form::set_value`] but leaves the dirty flag alone.
    pub fn patch_value(&mut self, path: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.write_value(path, value.into(), false)
    }

    fn write_value(&mut self, path: &str, value: String, dirty: bool) -> Result<(), FormError> {
        let (id, control) = self.control_mut(path)?;
        control.value = value.clone();
        control.dirty |= dirty;
        control.revalidate();
        trace!(field = path, errors = ?control.errors, "field revalidated");
        self.notify(id, &value);
        Ok(())
    }

    fn notify(&mut self, id: NodeId, value: &str) {
        let Some(listeners) = self.listeners.get(&id).cloned() else {
            return;
        };
        for listener in listeners {
            listener(self, value);
        }
    }

    pub fn subscribe(&mut self, path: &str, listener: ValueListener) -> Result<(), FormError> {
        let (id, _) = self.control_mut(path)?;
        self.listeners.entry(id).or_default().push(listener);
        Ok(())
    }

    /// Blur: marks the control touched and revalidates it.
    pub fn mark_touched(&mut self, path: &str) -> Result<(), FormError> {
        let (_, control) = self.control_mut(path)?;
        control.touched = true;
        control.revalidate();
        Ok(())
    }

    pub fn mark_all_touched(&mut self) {
        for control in self.controls_mut() {
            control.touched = true;
        }
    }

    /// Replaces the rules; call [`Form::update_validity`] to apply them.
    pub fn set_rules(&mut self, path: &str, rules: Vec<Rule>) -> Result<(), FormError> {
        let (_, control) = self.control_mut(path)?;
        control.rules = rules;
        Ok(())
    }

    pub fn clear_rules(&mut self, path: &str) -> Result<(), FormError> {
        self.set_rules(path, Vec::new())
    }

    pub fn update_validity(&mut self, path: &str) -> Result<(), FormError> {
        let (_, control) = self.control_mut(path)?;
        control.revalidate();
        Ok(())
    }

    /// Restores initial values and pristine/untouched flags, then notifies listeners.
    pub fn reset(&mut self) {
        let mut restored = Vec::new();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if let NodeKind::Control(control) = &mut node.kind {
                control.value = control.initial.clone();
                control.dirty = false;
                control.touched = false;
                control.revalidate();
                restored.push((NodeId(index), control.value.clone()));
            }
        }
        for (id, value) in restored {
            self.notify(id, &value);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.controls().all(Control::is_valid)
    }

    pub fn is_dirty(&self) -> bool {
        self.controls().any(Control::is_dirty)
    }

    fn controls(&self) -> impl Iterator<Item = &Control> {
        self.nodes.iter().filter_map(|node| match &node.kind {
            NodeKind::Control(control) => Some(control),
            NodeKind::Group { .. } => None,
        })
    }

    fn controls_mut(&mut self) -> impl Iterator<Item = &mut Control> {
        self.nodes.iter_mut().filter_map(|node| match &mut node.kind {
            NodeKind::Control(control) => Some(control),
            NodeKind::Group { .. } => None,
        })
    }

    /// Walks the tree depth-first and renders the visible errors of every control.
    pub fn collect_errors(&self, messages: &ValidationMessages) -> FormErrors {
        let mut out = FormErrors::default();
        self.collect_into(ROOT, messages, &mut out);
        out
    }

    fn collect_into(&self, id: NodeId, messages: &ValidationMessages, out: &mut FormErrors) {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Group { children } => {
                for child in children {
                    self.collect_into(*child, messages, out);
                }
            }
            NodeKind::Control(control) => {
                let mut text = String::new();
                if control.shows_errors() {
                    for key in control.errors() {
                        text.push_str(messages.message(&node.name, key));
                    }
                }
                out.entries.push((node.name.clone(), text));
            }
        }
    }
}

/// Display text per leaf field name, in tree order. Empty text means no visible error.
///
/// Entries carry the leaf name only. When two groups hold a control with the
/// same name, [`FormErrors::get`] answers for the first in tree order and
/// [`FormErrors::iter`] yields both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors {
    entries: Vec<(String, String)>,
}

impl FormErrors {
    pub fn get(&self, field: &str) -> &str {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, text)| text.as_str())
            .unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, text)| (name.as_str(), text.as_str()))
    }

    pub fn visible(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(_, text)| !text.is_empty())
    }

    pub fn has_visible(&self) -> bool {
        self.visible().next().is_some()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, text)) in self.visible().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{name}: {text}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{MIN_LENGTH, REQUIRED};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn messages() -> ValidationMessages {
        ValidationMessages::new()
            .with("name", "required", "Name is Required.")
            .with("name", "minlength", "Name is too short.")
            .with("level", "required", "Level is Required.")
    }

    fn sample() -> Form {
        Form::build(
            GroupSpec::new()
                .control("name", "", vec![Rule::Required, Rule::MinLength(2)])
                .control("mode", "a", vec![])
                .group(
                    "detail",
                    GroupSpec::new().control("level", "", vec![Rule::Required]),
                ),
        )
    }

    #[test]
    fn dotted_paths_reach_nested_controls() {
        let form = sample();
        let id = form.resolve("detail.level").unwrap();
        assert_eq!(form.path_of(id), "detail.level");
        assert_eq!(
            form.resolve("detail.missing"),
            Err(FormError::UnknownField("detail.missing".into()))
        );
        assert_eq!(
            form.resolve("name.inner"),
            Err(FormError::UnknownField("name.inner".into()))
        );
        assert!(matches!(form.control("detail"), Err(FormError::NotAControl(_))));
    }

    #[test]
    fn pristine_invalid_fields_show_nothing() {
        let form = sample();
        assert!(!form.is_valid());
        let errors = form.collect_errors(&messages());
        assert_eq!(errors.get("name"), "");
        assert_eq!(errors.get("level"), "");
        assert!(!errors.has_visible());
    }

    #[test]
    fn touching_reveals_errors() {
        let mut form = sample();
        form.mark_touched("name").unwrap();
        let errors = form.collect_errors(&messages());
        assert_eq!(errors.get("name"), "Name is Required.");
        assert_eq!(errors.get("level"), "");
    }

    #[test]
    fn editing_marks_dirty_and_revalidates() {
        let mut form = sample();
        form.set_value("name", "x").unwrap();
        let control = form.control("name").unwrap();
        assert!(control.is_dirty());
        assert!(!control.is_touched());
        assert_eq!(control.errors(), &[MIN_LENGTH]);
        assert_eq!(form.collect_errors(&messages()).get("name"), "Name is too short.");

        form.set_value("name", "Ann").unwrap();
        assert!(form.control("name").unwrap().is_valid());
        assert_eq!(form.collect_errors(&messages()).get("name"), "");
    }

    #[test]
    fn nested_group_errors_are_collected() {
        let mut form = sample();
        form.mark_touched("detail.level").unwrap();
        let errors = form.collect_errors(&messages());
        assert_eq!(errors.get("level"), "Level is Required.");
        let names: Vec<_> = errors.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["name", "mode", "level"]);
    }

    #[test]
    fn multiple_failures_concatenate_in_rule_order() {
        let mut form = Form::build(GroupSpec::new().control(
            "name",
            "",
            vec![Rule::MinLength(2), Rule::custom("shout", |v| v != v.to_lowercase())],
        ));
        form.set_value("name", "a").unwrap();
        let msgs = messages().with("name", "shout", "Use capitals.");
        assert_eq!(
            form.collect_errors(&msgs).get("name"),
            "Name is too short.Use capitals."
        );
    }

    #[test]
    fn patch_value_keeps_control_pristine() {
        let mut form = sample();
        form.patch_value("name", "x").unwrap();
        let control = form.control("name").unwrap();
        assert!(!control.is_dirty());
        assert_eq!(control.errors(), &[MIN_LENGTH]);
        assert!(!form.collect_errors(&messages()).has_visible());
    }

    #[test]
    fn listeners_can_rewrite_dependent_rules() {
        let mut form = sample();
        form.subscribe(
            "mode",
            Arc::new(|form: &mut Form, value: &str| {
                let rules = if value == "strict" {
                    vec![Rule::Required]
                } else {
                    Vec::new()
                };
                form.set_rules("detail.level", rules).unwrap();
                form.update_validity("detail.level").unwrap();
            }),
        )
        .unwrap();

        form.set_value("mode", "lax").unwrap();
        assert!(form.control("detail.level").unwrap().is_valid());
        form.set_value("mode", "strict").unwrap();
        assert_eq!(form.errors("detail.level").unwrap(), &[REQUIRED]);
    }

    #[test]
    fn set_rules_waits_for_update_validity() {
        let mut form = sample();
        form.clear_rules("name").unwrap();
        assert_eq!(form.errors("name").unwrap(), &[REQUIRED]);
        form.update_validity("name").unwrap();
        assert!(form.errors("name").unwrap().is_empty());
    }

    #[test]
    fn reset_restores_initial_state_and_notifies() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut form = sample();
        let seen = calls.clone();
        form.subscribe(
            "mode",
            Arc::new(move |_: &mut Form, _: &str| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
        form.set_value("mode", "b").unwrap();
        form.mark_all_touched();
        assert!(form.is_dirty());

        form.reset();
        assert_eq!(form.value("mode").unwrap(), "a");
        assert!(!form.is_dirty());
        assert!(!form.control("name").unwrap().is_touched());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn mark_all_touched_reveals_every_invalid_field() {
        let mut form = sample();
        form.mark_all_touched();
        let errors = form.collect_errors(&messages());
        let visible: Vec<_> = errors.visible().map(|(name, _)| name).collect();
        assert_eq!(visible, vec!["name", "level"]);
        assert_eq!(
            errors.to_string(),
            "name: Name is Required.\nlevel: Level is Required."
        );
    }

    #[test]
    fn shared_leaf_names_resolve_to_the_first_in_tree_order() {
        let mut form = Form::build(
            GroupSpec::new()
                .group("home", GroupSpec::new().control("city", "", vec![Rule::Required]))
                .group("work", GroupSpec::new().control("city", "", vec![Rule::Required])),
        );
        form.mark_touched("work.city").unwrap();
        let msgs = ValidationMessages::new().with("city", "required", "City is Required.");
        let errors = form.collect_errors(&msgs);

        assert_eq!(errors.get("city"), "");
        let cities: Vec<_> = errors.iter().filter(|(name, _)| *name == "city").collect();
        assert_eq!(cities, vec![("city", ""), ("city", "City is Required.")]);
    }

    #[test]
    fn subscribing_to_a_group_is_rejected() {
        let mut form = sample();
        let err = form
            .subscribe("detail", Arc::new(|_: &mut Form, _: &str| {}))
            .unwrap_err();
        assert_eq!(err, FormError::NotAControl("detail".into()));
    }
}
