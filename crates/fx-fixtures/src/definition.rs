//! One fixture definition file and its memoized embellished rows.

use crate::embellish::Embellisher;
use crate::error::FixtureResult;
use crate::loader::load_fixture_file;
use crate::row::{Attributes, FixtureRow};
use chrono::NaiveDateTime;
use fx_core::{
    ColumnCatalog, FixtureFile, FixtureName, Identifier, ModelDescriptor, ModelProvider,
};
use fx_jinja::{FileContext, JinjaEnvironment};
use indexmap::IndexMap;

/// Shared inputs for loading and embellishing a definition's rows.
pub struct RowContext<'a, 'env> {
    pub jinja: &'a JinjaEnvironment<'env>,
    pub models: &'a dyn ModelProvider,
    pub columns: &'a ColumnCatalog,
    pub loaded_at: NaiveDateTime,
}

/// A discovered fixture file bound to its target table.
#[derive(Debug, Clone)]
pub struct FixtureDefinition {
    file: FixtureFile,
    table_name: String,
    model: Option<ModelDescriptor>,
    rows: Option<IndexMap<String, FixtureRow>>,
}

impl FixtureDefinition {
    /// Bind a file to the model's table, or to its logical name without one.
    pub fn new(file: FixtureFile, model: Option<ModelDescriptor>) -> Self {
        let table_name = model
            .as_ref()
            .map(|m| m.table_name.clone())
            .unwrap_or_else(|| file.name.to_string());
        Self {
            file,
            table_name,
            model,
            rows: None,
        }
    }

    pub fn name(&self) -> &FixtureName {
        &self.file.name
    }

    pub fn file(&self) -> &FixtureFile {
        &self.file
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn model(&self) -> Option<&ModelDescriptor> {
        self.model.as_ref()
    }

    pub fn is_embellished(&self) -> bool {
        self.rows.is_some()
    }

    /// Load and embellish the file's rows once; later calls are no-ops.
    pub fn ensure_embellished(&mut self, ctx: &RowContext<'_, '_>) -> FixtureResult<()> {
        if self.rows.is_some() {
            return Ok(());
        }

        let file_context =
            FileContext::new(self.file.name.as_str(), &self.file.path, ctx.loaded_at);
        let raw = load_fixture_file(&self.file, ctx.jinja, &file_context)?;
        let embellisher = self.embellisher(ctx.models, ctx.columns, ctx.loaded_at);

        let mut rows = IndexMap::with_capacity(raw.len());
        for row in raw {
            let attributes = embellisher.embellish(&row.label, row.attributes)?;
            rows.insert(row.label.clone(), FixtureRow::new(row.label, attributes));
        }
        log::debug!(
            "Embellished {} rows from {}",
            rows.len(),
            self.file.path.display()
        );

        self.rows = Some(rows);
        Ok(())
    }

    /// Embellish and append one row; an existing row with the same label is
    /// replaced in place.
    pub fn add_row(
        &mut self,
        label: &str,
        attributes: Attributes,
        ctx: &RowContext<'_, '_>,
    ) -> FixtureResult<&FixtureRow> {
        self.ensure_embellished(ctx)?;
        let attributes = self
            .embellisher(ctx.models, ctx.columns, ctx.loaded_at)
            .embellish(label, attributes)?;
        let rows = self.rows.get_or_insert_with(IndexMap::new);
        let (index, _) = rows.insert_full(label.to_string(), FixtureRow::new(label, attributes));
        Ok(&rows[index])
    }

    /// Embellished rows in file order, empty before embellishment.
    pub fn rows(&self) -> impl Iterator<Item = &FixtureRow> {
        self.rows.iter().flat_map(|rows| rows.values())
    }

    pub fn row(&self, label: &str) -> Option<&FixtureRow> {
        self.rows.as_ref().and_then(|rows| rows.get(label))
    }

    pub fn row_count(&self) -> usize {
        self.rows.as_ref().map_or(0, IndexMap::len)
    }

    /// Label to identifier, read from the `id` column or else `uuid`.
    pub fn fixture_ids(&self) -> IndexMap<String, Identifier> {
        self.rows()
            .filter_map(|row| {
                let id = row
                    .get("id")
                    .or_else(|| row.get("uuid"))
                    .and_then(|v| v.to_identifier())?;
                Some((row.label.clone(), id))
            })
            .collect()
    }

    fn embellisher<'a>(
        &'a self,
        models: &'a dyn ModelProvider,
        columns: &'a ColumnCatalog,
        loaded_at: NaiveDateTime,
    ) -> Embellisher<'a> {
        Embellisher {
            table_name: &self.table_name,
            model: self.model.as_ref(),
            columns,
            models,
            loaded_at,
        }
    }
}

#[cfg(test)]
#[path = "definition_test.rs"]
mod tests;
