#![forbid(unsafe_code)]

//! The field registry: owner of every placed field.
//!
//! All mutation funnels through the command methods here. Each command is
//! synchronous and atomic: it either commits, bumps [`FieldRegistry::version`]
//! and notifies subscribers, or returns a [`FieldModelError`] with the
//! registry unchanged. Callers that follow the "silent no-op" policy simply
//! ignore the error.
//!
//! # Invariants
//!
//! 1. Field ids are unique and never reused; they come from a monotonic
//!    counter.
//! 2. `size >= kind minimum` on both axes for every field.
//! 3. Every table grid satisfies [`TableGrid::check_invariants`].
//! 4. The selection names an existing field or nothing.
//! 5. Iteration order is insertion order; deletion does not reorder.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::field::{Field, FieldId, FieldKind, FieldModelError, FieldPosition, FieldSize};
use crate::grid::{CellKey, CellType, GridError, TableGrid};
use crate::notify::{ChangeNotifier, RegistryChange, Subscription};
use crate::selection::{Selection, SelectionView};
use crate::settings::SettingsPatch;

/// How the registry treats page-relative positions outside `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPolicy {
    /// Clamp both axes into `[0, 100]` on create and move.
    #[default]
    Clamp,
    /// Store positions as given, allowing fields to hang off the page.
    Unclamped,
}

impl PositionPolicy {
    fn admit(self, position: FieldPosition) -> Result<FieldPosition, FieldModelError> {
        if !position.is_finite() {
            return Err(FieldModelError::NonFinitePosition {
                x: position.x,
                y: position.y,
            });
        }
        Ok(match self {
            Self::Clamp => FieldPosition::on_page(position.page_index, position.relative().clamped()),
            Self::Unclamped => position,
        })
    }
}

/// Ordered collection of fields plus the selection.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: Vec<Field>,
    next_id: FieldId,
    selection: Selection,
    policy: PositionPolicy,
    version: u64,
    notifier: ChangeNotifier,
}

impl FieldRegistry {
    /// Empty registry with the default clamping policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry with an explicit position policy.
    #[must_use]
    pub fn with_policy(policy: PositionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn position_policy(&self) -> PositionPolicy {
        self.policy
    }

    // --- reads -------------------------------------------------------------

    #[must_use]
    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: FieldId) -> bool {
        self.get(id).is_some()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.iter().map(Field::id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Mutation counter; increments once per emitted [`RegistryChange`].
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    // --- commands ----------------------------------------------------------

    /// Place a new field with the default size and settings of `kind`.
    ///
    /// The new field is appended and becomes the selected field.
    pub fn create(
        &mut self,
        kind: FieldKind,
        label: impl Into<String>,
        position: FieldPosition,
    ) -> Result<FieldId, FieldModelError> {
        let position = self.policy.admit(position)?;
        let id = self.next_id;
        self.next_id = id.checked_next()?;
        self.fields.push(Field::new(id, kind, label.into(), position));
        debug!(
            target: "pagefield.registry",
            id = id.get(),
            kind = kind.as_str(),
            page = position.page_index.get(),
            x = position.x,
            y = position.y,
            "field created"
        );
        self.commit(RegistryChange::Created {
            id,
            kind,
            page: position.page_index,
        });
        self.set_selection(Some(id));
        Ok(id)
    }

    /// Replace the position of `id`. Id, kind, size and settings are kept.
    pub fn move_to(&mut self, id: FieldId, position: FieldPosition) -> Result<(), FieldModelError> {
        let position = self.policy.admit(position)?;
        let field = self.field_mut(id)?;
        if field.position() == position {
            return Ok(());
        }
        field.set_position(position);
        debug!(
            target: "pagefield.registry",
            id = id.get(),
            page = position.page_index.get(),
            x = position.x,
            y = position.y,
            "field moved"
        );
        self.commit(RegistryChange::Moved { id, position });
        Ok(())
    }

    /// Replace the size of `id`, floored to the kind minimum. Returns the
    /// stored size.
    pub fn resize(&mut self, id: FieldId, size: FieldSize) -> Result<FieldSize, FieldModelError> {
        if !size.is_finite() {
            return Err(FieldModelError::NonFiniteSize {
                width: size.width,
                height: size.height,
            });
        }
        let field = self.field_mut(id)?;
        let size = size.at_least(field.kind().spec().min_size());
        if field.size() == size {
            return Ok(size);
        }
        field.set_size(size);
        debug!(
            target: "pagefield.registry",
            id = id.get(),
            width = size.width,
            height = size.height,
            "field resized"
        );
        self.commit(RegistryChange::Resized { id, size });
        Ok(size)
    }

    pub fn update_title(&mut self, id: FieldId, title: impl Into<String>) -> Result<(), FieldModelError> {
        let title = title.into();
        let field = self.field_mut(id)?;
        if field.title() == title {
            return Ok(());
        }
        field.set_title(title);
        debug!(target: "pagefield.registry", id = id.get(), "field title updated");
        self.commit(RegistryChange::TitleChanged { id });
        Ok(())
    }

    /// Shallow-merge `patch` into the settings of `id`.
    pub fn update_settings(&mut self, id: FieldId, patch: &SettingsPatch) -> Result<(), FieldModelError> {
        let field = self.field_mut(id)?;
        let next = field.settings().merged(patch)?;
        if *field.settings() == next {
            return Ok(());
        }
        field.replace_settings(next);
        debug!(target: "pagefield.registry", id = id.get(), ?patch, "field settings updated");
        self.commit(RegistryChange::SettingsChanged { id });
        Ok(())
    }

    pub fn update_cell_title(
        &mut self,
        id: FieldId,
        key: CellKey,
        title: impl Into<String>,
    ) -> Result<(), FieldModelError> {
        let title = title.into();
        self.edit_grid(id, "cell title updated", |grid| grid.set_cell_title(key, title))
    }

    pub fn update_cell_type(
        &mut self,
        id: FieldId,
        key: CellKey,
        cell_type: CellType,
    ) -> Result<(), FieldModelError> {
        self.edit_grid(id, "cell type updated", |grid| grid.set_cell_type(key, cell_type))
    }

    /// Set the width of one column, floored to the cell minimum.
    pub fn resize_column(&mut self, id: FieldId, col: u32, width: u32) -> Result<u32, FieldModelError> {
        self.edit_grid(id, "column resized", |grid| grid.set_column_width(col, width))
    }

    /// Set the height of one row, floored to the cell minimum.
    pub fn resize_row(&mut self, id: FieldId, row: u32, height: u32) -> Result<u32, FieldModelError> {
        self.edit_grid(id, "row resized", |grid| grid.set_row_height(row, height))
    }

    /// Make `key` the active cell of table `id`.
    ///
    /// The field-level selection is not changed.
    pub fn select_cell(&mut self, id: FieldId, key: CellKey) -> Result<(), FieldModelError> {
        self.edit_grid(id, "cell selected", |grid| grid.select_cell(key))?;
        if self.selection.is_selected(id) {
            self.commit(RegistryChange::SelectionChanged {
                field: Some(id),
                cell: Some(key),
            });
        }
        Ok(())
    }

    /// Remove `id`, keeping the order of the remaining fields. Clears the
    /// selection if it referenced the field.
    pub fn delete(&mut self, id: FieldId) -> Result<Field, FieldModelError> {
        let index = self.index_of(id)?;
        let removed = self.fields.remove(index);
        debug!(
            target: "pagefield.registry",
            id = id.get(),
            kind = removed.kind().as_str(),
            "field deleted"
        );
        self.commit(RegistryChange::Deleted { id });
        if self.selection.release(id) {
            self.commit(RegistryChange::SelectionChanged {
                field: None,
                cell: None,
            });
        }
        Ok(removed)
    }

    // --- selection ---------------------------------------------------------

    /// Select `id`, or clear the selection with `None`.
    pub fn select_field(&mut self, id: Option<FieldId>) -> Result<(), FieldModelError> {
        if let Some(id) = id {
            self.index_of(id)?;
        }
        self.set_selection(id);
        Ok(())
    }

    /// Click-outside path.
    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    #[must_use]
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    #[must_use]
    pub fn selected_field_id(&self) -> Option<FieldId> {
        self.selection.field()
    }

    /// The selected field and its active cell.
    #[must_use]
    pub fn selected(&self) -> Option<SelectionView<'_>> {
        self.selection
            .field()
            .and_then(|id| self.get(id))
            .map(SelectionView::of)
    }

    // --- notification ------------------------------------------------------

    /// Observe every committed change. Dropping the guard unsubscribes.
    pub fn subscribe(&mut self, callback: impl Fn(&RegistryChange) + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.notifier.len()
    }

    // --- diagnostics -------------------------------------------------------

    /// Verify the registry-wide invariants listed in the module docs.
    pub fn check_invariants(&self) -> Result<(), FieldModelError> {
        let invariant = |detail: String| Err(FieldModelError::Invariant { detail });
        let mut seen = std::collections::BTreeSet::new();
        for field in &self.fields {
            let id = field.id();
            if !seen.insert(id) {
                return invariant(format!("duplicate id {id}"));
            }
            if id >= self.next_id {
                return invariant(format!("id {id} not below counter {}", self.next_id));
            }
            let min = field.kind().spec().min_size();
            let size = field.size();
            if size.width < min.width || size.height < min.height {
                return invariant(format!(
                    "field {id} is {}x{}, below the {} minimum",
                    size.width,
                    size.height,
                    field.kind()
                ));
            }
            if field.settings().detail.kind() != field.kind() {
                return invariant(format!("field {id} settings do not match its kind"));
            }
            if let Some(grid) = field.grid() {
                grid.check_invariants()?;
            }
        }
        if let Some(id) = self.selection.field()
            && !seen.contains(&id)
        {
            return invariant(format!("selection references missing field {id}"));
        }
        Ok(())
    }

    // --- internals ---------------------------------------------------------

    fn index_of(&self, id: FieldId) -> Result<usize, FieldModelError> {
        self.fields
            .iter()
            .position(|f| f.id() == id)
            .ok_or(FieldModelError::UnknownField { id })
    }

    fn field_mut(&mut self, id: FieldId) -> Result<&mut Field, FieldModelError> {
        let index = self.index_of(id)?;
        Ok(&mut self.fields[index])
    }

    fn edit_grid<R>(
        &mut self,
        id: FieldId,
        what: &'static str,
        edit: impl FnOnce(&mut TableGrid) -> Result<R, GridError>,
    ) -> Result<R, FieldModelError> {
        let grid = self.field_mut(id)?.grid_mut()?;
        let out = edit(grid)?;
        debug!(target: "pagefield.registry", id = id.get(), what, "table edited");
        self.commit(RegistryChange::SettingsChanged { id });
        Ok(out)
    }

    fn set_selection(&mut self, field: Option<FieldId>) {
        if !self.selection.set(field) {
            return;
        }
        let cell = self.selected().and_then(|view| view.cell);
        debug!(
            target: "pagefield.registry",
            field = field.map(FieldId::get),
            "selection changed"
        );
        self.commit(RegistryChange::SelectionChanged { field, cell });
    }

    fn commit(&mut self, change: RegistryChange) {
        self.version += 1;
        self.notifier.notify(&change);
    }
}
