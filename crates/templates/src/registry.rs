//! Named template registry and field compilation.
//!
//! A field typed `*template` is replaced by deep copies of the registry
//! entries it names. Copies are taken at compile time, so later changes to
//! the registry never reach fields that were already compiled.

use std::collections::{BTreeMap, HashMap};

use eventex_core::{ConfigError, Result};
use tracing::debug;

use crate::model::{FcTemplateJsonCfg, TemplateField};

/// Template id → ordered field list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateRegistry {
    templates: HashMap<String, Vec<TemplateField>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a map of JSON templates. References between templates are
    /// left unresolved here and inlined when a field uses them.
    pub fn from_json(
        templates: &BTreeMap<String, Vec<FcTemplateJsonCfg>>,
        sep: &str,
    ) -> Result<Self> {
        let mut registry = Self::new();
        for (id, fields) in templates {
            let compiled = fields
                .iter()
                .map(|f| TemplateField::from_json(f, sep))
                .collect::<Result<Vec<_>>>()?;
            registry.insert(id, compiled);
        }
        Ok(registry)
    }

    /// Register a template, returning the entry it replaced.
    pub fn insert(&mut self, id: &str, fields: Vec<TemplateField>) -> Option<Vec<TemplateField>> {
        self.templates.insert(id.to_string(), fields)
    }

    pub fn remove(&mut self, id: &str) -> Option<Vec<TemplateField>> {
        self.templates.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&[TemplateField]> {
        self.templates.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Compile one JSON field, inlining it if it references a template.
pub fn compile(
    json: &FcTemplateJsonCfg,
    sep: &str,
    registry: &TemplateRegistry,
) -> Result<Vec<TemplateField>> {
    inflate(vec![TemplateField::from_json(json, sep)?], registry)
}

/// Compile a JSON field list in order, inlining template references.
pub fn compile_fields(
    jsons: &[FcTemplateJsonCfg],
    sep: &str,
    registry: &TemplateRegistry,
) -> Result<Vec<TemplateField>> {
    let fields = jsons
        .iter()
        .map(|j| TemplateField::from_json(j, sep))
        .collect::<Result<Vec<_>>>()?;
    inflate(fields, registry)
}

/// Replace every `*template` field with the entries it names, recursively.
pub fn inflate(fields: Vec<TemplateField>, registry: &TemplateRegistry) -> Result<Vec<TemplateField>> {
    let mut out = Vec::with_capacity(fields.len());
    let mut expanding = Vec::new();
    for field in fields {
        expand(field, registry, &mut expanding, &mut out)?;
    }
    Ok(out)
}

fn expand(
    field: TemplateField,
    registry: &TemplateRegistry,
    expanding: &mut Vec<String>,
    out: &mut Vec<TemplateField>,
) -> Result<()> {
    if !field.is_template_ref() {
        out.push(field);
        return Ok(());
    }
    let id = template_id(&field)?;
    if expanding.contains(&id) {
        return Err(ConfigError::TemplateCycle(id));
    }
    let entries = registry
        .get(&id)
        .ok_or_else(|| ConfigError::TemplateNotFound(id.clone()))?;
    if entries.is_empty() {
        return Err(ConfigError::EmptyTemplate(id));
    }
    debug!(template = %id, fields = entries.len(), "inlining template");
    expanding.push(id);
    for entry in entries {
        let mut copy = entry.clone();
        copy.compute_path();
        expand(copy, registry, expanding, out)?;
    }
    expanding.pop();
    Ok(())
}

/// The id a `*template` field names: its value evaluated as a constant.
fn template_id(field: &TemplateField) -> Result<String> {
    match &field.value {
        Some(rules) => rules.parse_value("").map_err(|e| {
            ConfigError::InvalidSyntax(format!("cannot resolve template id: {e}"))
        }),
        None => Ok(String::new()),
    }
}
