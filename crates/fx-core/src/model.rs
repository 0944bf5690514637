//! Model descriptors: the per-table semantics the embellisher relies on.
//!
//! Descriptors come from the `models:` section of `fixtures.yml` through
//! [`ModelRegistry`], or from any other [`ModelProvider`] a consumer plugs in.

use crate::error::IntegrityError;
use crate::value::FixtureValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Kind of association a model declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// Many-to-one, foreign key on this table
    BelongsTo,
    HasOne,
    HasMany,
    HasAndBelongsToMany,
}

impl std::fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssociationKind::BelongsTo => write!(f, "belongs_to"),
            AssociationKind::HasOne => write!(f, "has_one"),
            AssociationKind::HasMany => write!(f, "has_many"),
            AssociationKind::HasAndBelongsToMany => write!(f, "has_and_belongs_to_many"),
        }
    }
}

/// An association declared on a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Association {
    pub name: String,

    #[serde(default = "default_association_kind")]
    pub kind: AssociationKind,

    /// Explicit foreign key column; defaults to `<name>_id`
    #[serde(default)]
    pub foreign_key: Option<String>,

    #[serde(default)]
    pub polymorphic: bool,

    /// Explicit polymorphic type column; defaults to `<name>_type`
    #[serde(default)]
    pub foreign_type: Option<String>,

    /// Target model class, informational only
    #[serde(default)]
    pub class_name: Option<String>,
}

fn default_association_kind() -> AssociationKind {
    AssociationKind::BelongsTo
}

impl Association {
    pub fn belongs_to(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AssociationKind::BelongsTo,
            foreign_key: None,
            polymorphic: false,
            foreign_type: None,
            class_name: None,
        }
    }

    pub fn foreign_key_column(&self) -> String {
        self.foreign_key
            .clone()
            .unwrap_or_else(|| format!("{}_id", self.name))
    }

    pub fn foreign_type_column(&self) -> String {
        self.foreign_type
            .clone()
            .unwrap_or_else(|| format!("{}_type", self.name))
    }
}

/// Model section of `fixtures.yml` for one fixture name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Class name used for inheritance lookups (default: the fixture name)
    #[serde(default)]
    pub class_name: Option<String>,

    /// Target table (default: the fixture name)
    #[serde(default)]
    pub table: Option<String>,

    /// Primary key column; `null` declares a table without one
    #[serde(default = "default_primary_key")]
    pub primary_key: Option<String>,

    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Single-table inheritance discriminator; `null` disables it
    #[serde(default = "default_inheritance_column")]
    pub inheritance_column: Option<String>,

    /// column -> (enum name -> stored value)
    #[serde(default)]
    pub enums: BTreeMap<String, BTreeMap<String, serde_yaml::Value>>,

    #[serde(default)]
    pub associations: Vec<Association>,
}

fn default_primary_key() -> Option<String> {
    Some("id".to_string())
}

fn default_inheritance_column() -> Option<String> {
    Some("type".to_string())
}

fn default_true() -> bool {
    true
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            class_name: None,
            table: None,
            primary_key: default_primary_key(),
            timestamps: true,
            inheritance_column: default_inheritance_column(),
            enums: BTreeMap::new(),
            associations: Vec::new(),
        }
    }
}

/// Resolved model semantics for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub class_name: String,
    pub table_name: String,
    pub primary_key: Option<String>,
    pub record_timestamps: bool,
    pub inheritance_column: Option<String>,
    pub enums: BTreeMap<String, BTreeMap<String, FixtureValue>>,
    pub associations: Vec<Association>,
}

impl ModelDescriptor {
    /// A descriptor with conventional defaults, mostly useful in tests.
    pub fn new(class_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            table_name: table_name.into(),
            primary_key: default_primary_key(),
            record_timestamps: true,
            inheritance_column: default_inheritance_column(),
            enums: BTreeMap::new(),
            associations: Vec::new(),
        }
    }

    /// Build a descriptor from its config section.
    pub fn from_config(fixture_name: &str, config: &ModelConfig) -> Self {
        let enums = config
            .enums
            .iter()
            .map(|(column, values)| {
                let values = values
                    .iter()
                    .map(|(name, v)| (name.clone(), FixtureValue::from_yaml(v.clone())))
                    .collect();
                (column.clone(), values)
            })
            .collect();

        Self {
            class_name: config
                .class_name
                .clone()
                .unwrap_or_else(|| fixture_name.to_string()),
            table_name: config
                .table
                .clone()
                .unwrap_or_else(|| fixture_name.to_string()),
            primary_key: config.primary_key.clone(),
            record_timestamps: config.timestamps,
            inheritance_column: config.inheritance_column.clone(),
            enums,
            associations: config.associations.clone(),
        }
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.name == name)
    }

    pub fn with_association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    pub fn with_enum<I, K>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, FixtureValue)>,
        K: Into<String>,
    {
        self.enums.insert(
            column.into(),
            values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        );
        self
    }
}

/// Supplies model semantics per fixture.
pub trait ModelProvider {
    /// Model for the fixture with the given logical name.
    fn model_for(&self, fixture_name: &str) -> Result<ModelDescriptor, IntegrityError>;

    /// Model registered under a class name, used to resolve inheritance
    /// subtypes named by a discriminator column.
    fn model_for_class(&self, class_name: &str) -> Result<ModelDescriptor, IntegrityError>;
}

/// In-memory [`ModelProvider`] keyed by fixture name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `models:` config section.
    pub fn from_config(models: &HashMap<String, ModelConfig>) -> Self {
        let models = models
            .iter()
            .map(|(name, config)| (name.clone(), ModelDescriptor::from_config(name, config)))
            .collect();
        Self { models }
    }

    pub fn register(&mut self, fixture_name: impl Into<String>, model: ModelDescriptor) {
        self.models.insert(fixture_name.into(), model);
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelProvider for ModelRegistry {
    fn model_for(&self, fixture_name: &str) -> Result<ModelDescriptor, IntegrityError> {
        self.models
            .get(fixture_name)
            .cloned()
            .ok_or_else(|| IntegrityError::ModelNotFound {
                fixture: fixture_name.to_string(),
            })
    }

    fn model_for_class(&self, class_name: &str) -> Result<ModelDescriptor, IntegrityError> {
        self.models
            .values()
            .find(|m| m.class_name == class_name)
            .cloned()
            .ok_or_else(|| IntegrityError::UnknownClass {
                class_name: class_name.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
