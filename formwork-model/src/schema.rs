use std::collections::BTreeMap;

use crate::field::FieldSpec;
use crate::fragment::RawFragment;
use crate::hook::{HookChain, HookRegistry};
use crate::{SchemaError, SchemaResult};

/// Key of the legend synthesized when no fragment declares a palette.
pub const GENERATED_LEGEND: &str = "config_legend";

/// Name of the fallback palette.
pub const DEFAULT_PALETTE: &str = "default";

/// The merged field + palette definitions for one editable entity type.
///
/// Built once per editing session via [`Schema::merge`]; read-only
/// thereafter. Field declaration order is preserved — the synthesized
/// default palette and selector evaluation depend on it.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    index: BTreeMap<String, usize>,
    palettes: BTreeMap<String, String>,
    selectors: Vec<String>,
    subpalettes: BTreeMap<String, String>,
}

impl Schema {
    /// Merges an ordered sequence of fragments into one schema and binds
    /// every referenced hook against `registry`.
    ///
    /// Later fragments win on scalar field attributes; list attributes
    /// concatenate; colliding palette templates concatenate in order (no
    /// separator normalization — trailing or leading commas are the
    /// template author's responsibility). Fails with
    /// [`SchemaError::NoFragments`] on an empty sequence and
    /// [`SchemaError::UnknownHook`] when a hook name has no registration.
    pub fn merge(fragments: Vec<RawFragment>, registry: &HookRegistry) -> SchemaResult<Self> {
        if fragments.is_empty() {
            return Err(SchemaError::NoFragments);
        }

        let mut schema = Schema::default();
        for fragment in fragments {
            schema.absorb(fragment);
        }

        if schema.palettes.is_empty() {
            let names: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
            schema.palettes.insert(
                DEFAULT_PALETTE.to_string(),
                format!("{{{GENERATED_LEGEND}}},{};", names.join(",")),
            );
        }

        schema.bind_hooks(registry)?;
        Ok(schema)
    }

    fn absorb(&mut self, fragment: RawFragment) {
        for incoming in fragment.fields {
            match self.index.get(&incoming.name) {
                Some(&i) => self.fields[i].merge_from(&incoming),
                None => {
                    self.index.insert(incoming.name.clone(), self.fields.len());
                    self.fields.push(incoming);
                }
            }
        }

        for (name, template) in fragment.palettes {
            self.palettes
                .entry(name)
                .and_modify(|existing| existing.push_str(&template))
                .or_insert(template);
        }

        for (key, template) in fragment.subpalettes {
            self.subpalettes
                .entry(key)
                .and_modify(|existing| existing.push_str(&template))
                .or_insert(template);
        }

        for selector in fragment.selectors {
            if !self.selectors.contains(&selector) {
                self.selectors.push(selector);
            }
        }
    }

    fn bind_hooks(&mut self, registry: &HookRegistry) -> SchemaResult<()> {
        for field in &mut self.fields {
            field.bound_load_hooks = Self::resolve(&field.name, &field.load_hooks, registry)?;
            field.bound_save_hooks = Self::resolve(&field.name, &field.save_hooks, registry)?;
        }
        Ok(())
    }

    fn resolve(
        field: &str,
        names: &[String],
        registry: &HookRegistry,
    ) -> SchemaResult<HookChain> {
        let mut bound = Vec::with_capacity(names.len());
        for name in names {
            let hook = registry.get(name).ok_or_else(|| SchemaError::UnknownHook {
                field: field.to_string(),
                hook: name.clone(),
            })?;
            bound.push(hook.clone());
        }
        Ok(HookChain::new(bound))
    }

    /// Looks a field up by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Raw template string of a named palette.
    #[must_use]
    pub fn palette(&self, name: &str) -> Option<&str> {
        self.palettes.get(name).map(String::as_str)
    }

    /// Selector field names in declaration order.
    #[must_use]
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// Subpalette template for a selector-derived key
    /// (`name` for checkbox selectors, `name_value` otherwise).
    #[must_use]
    pub fn subpalette(&self, key: &str) -> Option<&str> {
        self.subpalettes.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
