//! Row embellishment: the per-row pipeline run before compilation.
//!
//! Steps run in a fixed order, each one may rely on the previous ones:
//! primary key, `$LABEL` substitution, timestamps, enum translation and
//! association resolution.

use crate::error::{FixtureResult, FormatError};
use crate::row::{Attributes, LABEL_PLACEHOLDER};
use chrono::NaiveDateTime;
use fx_core::{
    identify, AssociationKind, ColumnCatalog, FixtureValue, IdKind, ModelDescriptor,
    ModelProvider,
};
use regex::Regex;
use std::sync::OnceLock;

/// Key columns tried, in order, for tables without a model
pub const CONVENTIONAL_KEY_COLUMNS: [&str; 2] = ["id", "uuid"];

/// Columns receiving the run instant
pub const TIMESTAMP_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// Columns receiving the run date
pub const DATE_STAMP_COLUMNS: [&str; 2] = ["created_on", "updated_on"];

/// `"<label> (<TypeName>)"` suffix on polymorphic association values
static POLYMORPHIC_TYPE_RE: OnceLock<Regex> = OnceLock::new();

fn polymorphic_type_re() -> &'static Regex {
    POLYMORPHIC_TYPE_RE.get_or_init(|| Regex::new(r"\s*\(([^)]*)\)\s*$").expect("valid regex"))
}

/// Everything the pipeline needs to know about one table.
pub struct Embellisher<'a> {
    pub table_name: &'a str,
    /// Base model, absent when the provider could not resolve one
    pub model: Option<&'a ModelDescriptor>,
    pub columns: &'a ColumnCatalog,
    /// Used to resolve inheritance subtypes named by the discriminator
    pub models: &'a dyn ModelProvider,
    pub loaded_at: NaiveDateTime,
}

impl<'a> Embellisher<'a> {
    /// Run the full pipeline over one row's attributes.
    pub fn embellish(&self, label: &str, mut attributes: Attributes) -> FixtureResult<Attributes> {
        self.fill_primary_key(label, &mut attributes);
        substitute_label(label, &mut attributes);
        if let Some(model) = self.model {
            if model.record_timestamps {
                self.fill_timestamps(&mut attributes);
            }
            translate_enums(model, &mut attributes);
            self.resolve_associations(model, label, &mut attributes)?;
        }
        Ok(attributes)
    }

    fn fill_primary_key(&self, label: &str, attributes: &mut Attributes) {
        let key_column = match self.model {
            Some(model) => model
                .primary_key
                .as_deref()
                .filter(|pk| self.columns.contains(pk)),
            None => CONVENTIONAL_KEY_COLUMNS
                .iter()
                .copied()
                .find(|c| self.columns.contains(c)),
        };

        let Some(column) = key_column else {
            return;
        };
        if attributes.contains_key(column) {
            return;
        }
        let id = identify(label, self.id_kind_of(column));
        attributes.shift_insert(0, column.to_string(), id.into());
    }

    fn fill_timestamps(&self, attributes: &mut Attributes) {
        for column in TIMESTAMP_COLUMNS {
            let Some(info) = self.columns.get(column) else {
                continue;
            };
            if attributes.contains_key(column) {
                continue;
            }
            let value = if info.is_date_only() {
                FixtureValue::Date(self.loaded_at.date())
            } else {
                FixtureValue::DateTime(self.loaded_at)
            };
            attributes.insert(column.to_string(), value);
        }

        for column in DATE_STAMP_COLUMNS {
            if self.columns.contains(column) && !attributes.contains_key(column) {
                attributes.insert(
                    column.to_string(),
                    FixtureValue::Date(self.loaded_at.date()),
                );
            }
        }
    }

    fn resolve_associations(
        &self,
        model: &ModelDescriptor,
        label: &str,
        attributes: &mut Attributes,
    ) -> FixtureResult<()> {
        let references: Vec<String> = attributes
            .keys()
            .filter(|key| !self.columns.contains(key))
            .cloned()
            .collect();
        if references.is_empty() {
            return Ok(());
        }

        let subtype = self.effective_model(model, attributes);
        let reflection = subtype.as_ref().unwrap_or(model);

        for name in references {
            let Some(association) = reflection.association(&name) else {
                return Err(FormatError::MissingColumn {
                    column: name,
                    table: self.table_name.to_string(),
                    label: label.to_string(),
                }
                .into());
            };
            if association.kind != AssociationKind::BelongsTo {
                return Err(FormatError::UnsupportedAssociation {
                    column: name,
                    table: self.table_name.to_string(),
                    kind: association.kind,
                    label: label.to_string(),
                }
                .into());
            }

            let Some((position, _, value)) = attributes.shift_remove_full(&name) else {
                continue;
            };
            let foreign_key = association.foreign_key_column();

            let mut target = value;
            let mut polymorphic_type = None;
            if association.polymorphic {
                if let FixtureValue::String(text) = &target {
                    if let Some(captures) = polymorphic_type_re().captures(text) {
                        polymorphic_type = Some(captures[1].to_string());
                        let stripped = polymorphic_type_re().replace(text, "").into_owned();
                        target = FixtureValue::String(stripped);
                    }
                }
            }

            let resolved = resolve_target(&target, self.id_kind_of(&foreign_key));
            place(attributes, position, foreign_key, resolved);
            if let Some(type_name) = polymorphic_type {
                place(
                    attributes,
                    position + 1,
                    association.foreign_type_column(),
                    FixtureValue::String(type_name),
                );
            }
        }

        Ok(())
    }

    /// Subtype model named by the row's inheritance column, if any.
    fn effective_model(
        &self,
        model: &ModelDescriptor,
        attributes: &Attributes,
    ) -> Option<ModelDescriptor> {
        let column = model.inheritance_column.as_deref()?;
        let class_name = attributes.get(column)?.as_str()?;
        if class_name == model.class_name {
            return None;
        }
        match self.models.model_for_class(class_name) {
            Ok(subtype) => Some(subtype),
            Err(e) => {
                log::warn!(
                    "{} in table '{}', using base model {}",
                    e,
                    self.table_name,
                    model.class_name
                );
                None
            }
        }
    }

    fn id_kind_of(&self, column: &str) -> IdKind {
        self.columns
            .get(column)
            .map(|c| c.id_kind())
            .unwrap_or(IdKind::Integer)
    }
}

/// Replace `$LABEL` in every string value with the row label.
fn substitute_label(label: &str, attributes: &mut Attributes) {
    for value in attributes.values_mut() {
        if let FixtureValue::String(text) = value {
            if text.contains(LABEL_PLACEHOLDER) {
                *text = text.replace(LABEL_PLACEHOLDER, label);
            }
        }
    }
}

/// Swap enum names for their stored values; unknown names pass through.
fn translate_enums(model: &ModelDescriptor, attributes: &mut Attributes) {
    for (column, values) in &model.enums {
        let Some(value) = attributes.get_mut(column) else {
            continue;
        };
        let stored = value.as_str().and_then(|name| values.get(name)).cloned();
        if let Some(stored) = stored {
            *value = stored;
        }
    }
}

/// Foreign key value for an association target label.
fn resolve_target(target: &FixtureValue, kind: IdKind) -> FixtureValue {
    match target {
        FixtureValue::Null | FixtureValue::Raw(_) => target.clone(),
        FixtureValue::String(label) => identify(label, kind).into(),
        FixtureValue::Integer(i) => identify(&i.to_string(), kind).into(),
        FixtureValue::Bool(b) => identify(&b.to_string(), kind).into(),
        FixtureValue::Uuid(u) => identify(&u.to_string(), kind).into(),
        other => match other.to_yaml_string() {
            Ok(text) => identify(text.trim_end(), kind).into(),
            Err(_) => other.clone(),
        },
    }
}

/// Set `key`, keeping an existing entry in place or inserting at `position`.
fn place(attributes: &mut Attributes, position: usize, key: String, value: FixtureValue) {
    if let Some(slot) = attributes.get_mut(&key) {
        *slot = value;
    } else {
        let position = position.min(attributes.len());
        attributes.shift_insert(position, key, value);
    }
}

#[cfg(test)]
#[path = "embellish_test.rs"]
mod tests;
