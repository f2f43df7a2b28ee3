//! Type resolution and object-shape descriptors
//!
//! Tenants address collections by alias (usually a plural path segment).
//! [`TypeResolver`] maps an alias to its canonical type using the tenant's
//! alias table layered over the built-in types, and owns the descriptors used
//! to validate payloads of known types.

use std::collections::{BTreeMap, HashMap};

use crate::core::app::App;
use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::field::{FieldFormat, FieldRule};
use crate::core::object::DomainObject;
use crate::core::pluralize::Pluralizer;

/// Shape of a known canonical type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: String,
    pub plural: String,
    pub fields: Vec<FieldRule>,
}

impl TypeDescriptor {
    pub fn new(name: &str, fields: Vec<FieldRule>) -> Self {
        Self {
            name: name.to_string(),
            plural: Pluralizer::pluralize(name),
            fields,
        }
    }

    /// Check every field rule, collecting all failures
    pub fn validate(&self, object: &DomainObject) -> Result<(), ValidationError> {
        let errors: Vec<FieldValidationError> = self
            .fields
            .iter()
            .filter_map(|rule| rule.check(object.properties.get(rule.name)))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(errors))
        }
    }
}

/// Resolves tenant-facing type names to canonical ones
///
/// Built once at startup and shared read-only. Resolution never modifies the
/// tenant's alias table.
#[derive(Debug, Clone)]
pub struct TypeResolver {
    descriptors: HashMap<String, TypeDescriptor>,
    builtin_aliases: HashMap<String, String>,
}

impl TypeResolver {
    /// Resolver preloaded with the built-in types
    pub fn new() -> Self {
        let mut resolver = Self {
            descriptors: HashMap::new(),
            builtin_aliases: HashMap::new(),
        };
        for descriptor in builtin_descriptors() {
            resolver.register(descriptor);
        }
        resolver
    }

    /// Add (or replace) a type descriptor
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.builtin_aliases
            .insert(descriptor.plural.clone(), descriptor.name.clone());
        self.descriptors.insert(descriptor.name.clone(), descriptor);
    }

    /// Canonical type for a path segment
    ///
    /// Tenant aliases win over built-in ones; an unknown segment is already
    /// canonical.
    pub fn resolve(&self, app: &App, segment: &str) -> String {
        app.datatypes
            .get(segment)
            .or_else(|| self.builtin_aliases.get(segment))
            .cloned()
            .unwrap_or_else(|| segment.to_string())
    }

    /// Every alias visible to the tenant, plural -> canonical
    pub fn all_types(&self, app: &App) -> BTreeMap<String, String> {
        let mut types: BTreeMap<String, String> = self
            .builtin_aliases
            .iter()
            .map(|(plural, name)| (plural.clone(), name.clone()))
            .collect();
        types.extend(app.datatypes.clone());
        types
    }

    pub fn descriptor(&self, canonical: &str) -> Option<&TypeDescriptor> {
        self.descriptors.get(canonical)
    }

    pub fn is_builtin(&self, canonical: &str) -> bool {
        self.descriptors.contains_key(canonical)
    }

    /// Validate an object against its type's descriptor
    ///
    /// Types without a descriptor only need a non-blank type name.
    pub fn validate(&self, object: &DomainObject) -> Result<(), ValidationError> {
        if object.object_type.trim().is_empty() {
            return Err(ValidationError::MissingArgument {
                argument: "type".to_string(),
            });
        }
        match self.descriptor(&object.object_type) {
            Some(descriptor) => descriptor.validate(object),
            None => Ok(()),
        }
    }

    /// The alias a tenant should gain when it first stores an undeclared type
    pub fn alias_for_new_type(&self, app: &App, canonical: &str) -> Option<(String, String)> {
        if canonical.trim().is_empty() || self.is_builtin(canonical) {
            return None;
        }
        if app.datatypes.values().any(|t| t == canonical) {
            return None;
        }
        Some((Pluralizer::pluralize(canonical), canonical.to_string()))
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_descriptors() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::new("app", vec![FieldRule::required("name")]),
        TypeDescriptor::new(
            "user",
            vec![
                FieldRule::required("email").with_format(FieldFormat::Email),
                FieldRule::optional("picture").with_format(FieldFormat::Url),
            ],
        ),
        TypeDescriptor::new("tag", vec![FieldRule::required("tag")]),
        TypeDescriptor::new(
            "address",
            vec![
                FieldRule::required("address"),
                FieldRule::optional("latlng").with_format(FieldFormat::LatLng),
            ],
        ),
        TypeDescriptor::new("sysprop", vec![]),
        TypeDescriptor::new(
            "translation",
            vec![
                FieldRule::required("locale"),
                FieldRule::required("thekey"),
                FieldRule::required("value"),
            ],
        ),
        TypeDescriptor::new("vote", vec![FieldRule::required("votevalue")]),
    ]
}
