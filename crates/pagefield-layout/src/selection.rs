//! Active-field selection.
//!
//! At most one field is selected. The active cell of a table is not stored
//! here: it lives in the table's own settings (`selectedCell`) and survives
//! switching the selected field away and back.

use crate::field::{Field, FieldId, selected_cell_of};
use crate::grid::CellKey;

/// Which field, if any, the settings surface is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    field: Option<FieldId>,
}

impl Selection {
    #[must_use]
    pub const fn field(&self) -> Option<FieldId> {
        self.field
    }

    #[must_use]
    pub fn is_selected(&self, id: FieldId) -> bool {
        self.field == Some(id)
    }

    /// Returns `true` when the selection changed.
    pub(crate) fn set(&mut self, field: Option<FieldId>) -> bool {
        let changed = self.field != field;
        self.field = field;
        changed
    }

    /// Clear the selection if it references `id`. Returns `true` if cleared.
    pub(crate) fn release(&mut self, id: FieldId) -> bool {
        if self.is_selected(id) {
            self.field = None;
            return true;
        }
        false
    }
}

/// What the settings surface shows: the selected field and, for tables,
/// its active cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionView<'a> {
    pub field: &'a Field,
    /// `None` for non-table fields and for keys that name no cell.
    pub cell: Option<CellKey>,
}

impl<'a> SelectionView<'a> {
    pub(crate) fn of(field: &'a Field) -> Self {
        Self {
            field,
            cell: selected_cell_of(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_only_clears_matching_id() {
        let a = FieldId::new(1).unwrap();
        let b = FieldId::new(2).unwrap();
        let mut selection = Selection::default();
        assert!(selection.set(Some(a)));
        assert!(!selection.set(Some(a)));
        assert!(!selection.release(b));
        assert_eq!(selection.field(), Some(a));
        assert!(selection.release(a));
        assert_eq!(selection.field(), None);
    }
}
