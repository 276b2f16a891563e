//! Kind-dependent field settings and partial updates.
//!
//! [`FieldSettings`] is polymorphic over the field kind through
//! [`KindSettings`]; [`SettingsPatch`] is the shallow-merge update the
//! settings surface sends. A patch is applied to a copy and committed only
//! when every member applies to the field's kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::field::{FieldKind, FieldModelError};
use crate::grid::{Cell, CellKey, TableGrid};

/// Settings of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSettings {
    /// Whether the form filler must complete the field.
    pub required: bool,
    /// Kind-specific part.
    pub detail: KindSettings,
}

/// Kind-specific settings.
#[derive(Debug, Clone, PartialEq)]
pub enum KindSettings {
    Text,
    Date,
    Signature,
    Number { min: Option<f64>, max: Option<f64> },
    Multiline { max_lines: Option<u32> },
    Table(TableGrid),
}

impl KindSettings {
    /// Default settings for a freshly created field of `kind`.
    #[must_use]
    pub fn for_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => Self::Text,
            FieldKind::Date => Self::Date,
            FieldKind::Signature => Self::Signature,
            FieldKind::Number => Self::Number {
                min: None,
                max: None,
            },
            FieldKind::Multiline => Self::Multiline { max_lines: None },
            FieldKind::Table => Self::Table(TableGrid::default()),
        }
    }

    /// The kind these settings belong to.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text => FieldKind::Text,
            Self::Date => FieldKind::Date,
            Self::Signature => FieldKind::Signature,
            Self::Number { .. } => FieldKind::Number,
            Self::Multiline { .. } => FieldKind::Multiline,
            Self::Table(_) => FieldKind::Table,
        }
    }
}

impl FieldSettings {
    /// Defaults for `kind`: required, no bounds, 4x4 grid for tables.
    #[must_use]
    pub fn for_kind(kind: FieldKind) -> Self {
        Self {
            required: true,
            detail: KindSettings::for_kind(kind),
        }
    }

    #[must_use]
    pub fn grid(&self) -> Option<&TableGrid> {
        match &self.detail {
            KindSettings::Table(grid) => Some(grid),
            _ => None,
        }
    }

    pub(crate) fn grid_mut(&mut self) -> Option<&mut TableGrid> {
        match &mut self.detail {
            KindSettings::Table(grid) => Some(grid),
            _ => None,
        }
    }

    /// Merge `patch` into a copy of these settings.
    ///
    /// Fails with [`FieldModelError::KindMismatch`] when a member does not
    /// apply to this kind, or with a grid error when a table member breaks
    /// the grid shape. `self` is never modified.
    pub fn merged(&self, patch: &SettingsPatch) -> Result<Self, FieldModelError> {
        let kind = self.detail.kind();
        if let Some(member) = patch.first_foreign_member(kind) {
            return Err(FieldModelError::KindMismatch { kind, member });
        }

        let mut next = self.clone();
        if let Some(required) = patch.required {
            next.required = required;
        }
        match &mut next.detail {
            KindSettings::Number { min, max } => {
                if let Some(next_min) = patch.min {
                    *min = next_min;
                }
                if let Some(next_max) = patch.max {
                    *max = next_max;
                }
            }
            KindSettings::Multiline { max_lines } => {
                if let Some(next) = patch.max_lines {
                    *max_lines = next;
                }
            }
            KindSettings::Table(grid) => {
                if let Some(rows) = patch.rows {
                    grid.set_rows(rows)?;
                }
                if let Some(columns) = patch.columns {
                    grid.set_columns(columns)?;
                }
                if let Some(widths) = &patch.cell_widths {
                    grid.set_cell_widths(widths.clone())?;
                }
                if let Some(heights) = &patch.cell_heights {
                    grid.set_cell_heights(heights.clone())?;
                }
                if let Some(key) = patch.selected_cell {
                    grid.select_cell(key)?;
                }
            }
            KindSettings::Text | KindSettings::Date | KindSettings::Signature => {}
        }
        Ok(next)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsRecord<'a> {
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cell_widths: Option<&'a [u32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cell_heights: Option<&'a [u32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cells: Option<&'a BTreeMap<CellKey, Cell>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_cell: Option<CellKey>,
}

impl<'a> SettingsRecord<'a> {
    fn new(required: bool) -> Self {
        Self {
            required,
            min: None,
            max: None,
            max_lines: None,
            rows: None,
            columns: None,
            cell_widths: None,
            cell_heights: None,
            cells: None,
            selected_cell: None,
        }
    }
}

impl Serialize for FieldSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = SettingsRecord::new(self.required);
        match &self.detail {
            KindSettings::Number { min, max } => {
                record.min = *min;
                record.max = *max;
            }
            KindSettings::Multiline { max_lines } => record.max_lines = *max_lines,
            KindSettings::Table(grid) => {
                record.rows = Some(grid.rows());
                record.columns = Some(grid.columns());
                record.cell_widths = Some(grid.cell_widths());
                record.cell_heights = Some(grid.cell_heights());
                record.cells = Some(grid.cells());
                record.selected_cell = grid.selected_cell();
            }
            KindSettings::Text | KindSettings::Date | KindSettings::Signature => {}
        }
        record.serialize(serializer)
    }
}

/// Partial settings update. Absent members are left unchanged.
///
/// `min`, `max` and `maxLines` are tri-state: absent keeps the current
/// value, `null` clears it, a value replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub required: Option<bool>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub min: Option<Option<f64>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub max: Option<Option<f64>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<Option<u32>>,
    pub rows: Option<u32>,
    pub columns: Option<u32>,
    pub cell_widths: Option<Vec<u32>>,
    pub cell_heights: Option<Vec<u32>>,
    pub selected_cell: Option<CellKey>,
}

impl SettingsPatch {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(Some(min));
        self
    }

    #[must_use]
    pub fn clear_min(mut self) -> Self {
        self.min = Some(None);
        self
    }

    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(Some(max));
        self
    }

    #[must_use]
    pub fn clear_max(mut self) -> Self {
        self.max = Some(None);
        self
    }

    #[must_use]
    pub fn max_lines(mut self, max_lines: u32) -> Self {
        self.max_lines = Some(Some(max_lines));
        self
    }

    #[must_use]
    pub fn clear_max_lines(mut self) -> Self {
        self.max_lines = Some(None);
        self
    }

    #[must_use]
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    #[must_use]
    pub fn columns(mut self, columns: u32) -> Self {
        self.columns = Some(columns);
        self
    }

    #[must_use]
    pub fn cell_widths(mut self, widths: Vec<u32>) -> Self {
        self.cell_widths = Some(widths);
        self
    }

    #[must_use]
    pub fn cell_heights(mut self, heights: Vec<u32>) -> Self {
        self.cell_heights = Some(heights);
        self
    }

    #[must_use]
    pub fn selected_cell(mut self, key: CellKey) -> Self {
        self.selected_cell = Some(key);
        self
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// First member (by wire name) that does not apply to `kind`.
    fn first_foreign_member(&self, kind: FieldKind) -> Option<&'static str> {
        let number = [("min", self.min.is_some()), ("max", self.max.is_some())];
        let multiline = [("maxLines", self.max_lines.is_some())];
        let table = [
            ("rows", self.rows.is_some()),
            ("columns", self.columns.is_some()),
            ("cellWidths", self.cell_widths.is_some()),
            ("cellHeights", self.cell_heights.is_some()),
            ("selectedCell", self.selected_cell.is_some()),
        ];
        let groups: [(FieldKind, &[(&'static str, bool)]); 3] = [
            (FieldKind::Number, &number),
            (FieldKind::Multiline, &multiline),
            (FieldKind::Table, &table),
        ];
        groups
            .into_iter()
            .filter(|(owner, _)| *owner != kind)
            .flat_map(|(_, members)| members.iter())
            .find_map(|&(name, present)| present.then_some(name))
    }
}

// A present key, `null` included, maps to `Some`; `#[serde(default)]`
// covers the absent case.
fn clearable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridError;
    use serde_json::json;

    #[test]
    fn defaults_are_required() {
        for kind in FieldKind::ALL {
            let settings = FieldSettings::for_kind(kind);
            assert!(settings.required);
            assert_eq!(settings.detail.kind(), kind);
        }
    }

    #[test]
    fn required_applies_to_every_kind() {
        for kind in FieldKind::ALL {
            let next = FieldSettings::for_kind(kind)
                .merged(&SettingsPatch::new().required(false))
                .unwrap();
            assert!(!next.required);
        }
    }

    #[test]
    fn number_bounds_merge() {
        let base = FieldSettings::for_kind(FieldKind::Number);
        let next = base.merged(&SettingsPatch::new().min(0.0)).unwrap();
        let next = next.merged(&SettingsPatch::new().max(10.0)).unwrap();
        assert_eq!(
            next.detail,
            KindSettings::Number {
                min: Some(0.0),
                max: Some(10.0)
            }
        );
    }

    #[test]
    fn optional_bounds_clear_with_null() {
        let number = FieldSettings::for_kind(FieldKind::Number)
            .merged(&SettingsPatch::new().min(5.0).max(9.0))
            .unwrap();
        let patch: SettingsPatch = serde_json::from_value(json!({ "min": null })).unwrap();
        assert_eq!(patch, SettingsPatch::new().clear_min());
        assert_eq!(
            number.merged(&patch).unwrap().detail,
            KindSettings::Number {
                min: None,
                max: Some(9.0)
            }
        );

        let multiline = FieldSettings::for_kind(FieldKind::Multiline)
            .merged(&SettingsPatch::new().max_lines(6))
            .unwrap();
        let patch: SettingsPatch = serde_json::from_value(json!({ "maxLines": null })).unwrap();
        let cleared = multiline.merged(&patch).unwrap();
        assert_eq!(cleared.detail, KindSettings::Multiline { max_lines: None });
        assert_eq!(serde_json::to_value(&cleared).unwrap(), json!({ "required": true }));

        let untouched = multiline.merged(&SettingsPatch::new().required(false)).unwrap();
        assert_eq!(untouched.detail, KindSettings::Multiline { max_lines: Some(6) });
    }

    #[test]
    fn cleared_member_serializes_as_null_and_absent_as_missing() {
        let patch = SettingsPatch::new().clear_max().required(true);
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value["max"], serde_json::Value::Null);
        assert!(value.get("min").is_none());
        assert_eq!(serde_json::from_value::<SettingsPatch>(value).unwrap(), patch);
    }

    #[test]
    fn clearing_a_foreign_member_is_rejected() {
        let err = FieldSettings::for_kind(FieldKind::Text)
            .merged(&SettingsPatch::new().clear_max_lines())
            .unwrap_err();
        assert!(matches!(err, FieldModelError::KindMismatch { member: "maxLines", .. }));
    }

    #[test]
    fn oversized_table_patch_is_rejected_atomically() {
        let base = FieldSettings::for_kind(FieldKind::Table);
        let patch: SettingsPatch =
            serde_json::from_value(json!({ "required": false, "rows": 4_294_967_295u32 })).unwrap();
        let err = base.merged(&patch).unwrap_err();
        assert!(matches!(
            err,
            FieldModelError::Grid(GridError::DimensionTooLarge { requested: u32::MAX, .. })
        ));
        assert!(base.required);
        assert_eq!(base.grid().unwrap().rows(), 4);
    }

    #[test]
    fn foreign_member_is_rejected_without_change() {
        let base = FieldSettings::for_kind(FieldKind::Text);
        let err = base
            .merged(&SettingsPatch::new().required(false).rows(3))
            .unwrap_err();
        assert_eq!(
            err,
            FieldModelError::KindMismatch {
                kind: FieldKind::Text,
                member: "rows"
            }
        );
        assert!(base.required);

        let err = FieldSettings::for_kind(FieldKind::Table)
            .merged(&SettingsPatch::new().max_lines(4))
            .unwrap_err();
        assert!(matches!(err, FieldModelError::KindMismatch { member: "maxLines", .. }));
    }

    #[test]
    fn table_members_route_through_grid() {
        let base = FieldSettings::for_kind(FieldKind::Table);
        let next = base
            .merged(
                &SettingsPatch::new()
                    .rows(2)
                    .columns(3)
                    .cell_widths(vec![10, 120, 80])
                    .selected_cell(CellKey::new(1, 2)),
            )
            .unwrap();
        let grid = next.grid().unwrap();
        assert_eq!(grid.cell_widths(), &[30, 120, 80]);
        assert_eq!(grid.cell_heights(), &[30, 30]);
        assert_eq!(grid.cells().len(), 6);
        assert_eq!(grid.selected_cell(), Some(CellKey::new(1, 2)));
        grid.check_invariants().unwrap();
    }

    #[test]
    fn bad_extent_length_leaves_original_untouched() {
        let base = FieldSettings::for_kind(FieldKind::Table);
        let result = base.merged(&SettingsPatch::new().rows(6).cell_heights(vec![30; 4]));
        assert!(matches!(result, Err(FieldModelError::Grid(_))));
        assert_eq!(base.grid().unwrap().rows(), 4);
    }

    #[test]
    fn patch_parses_camel_case_and_rejects_unknown() {
        let patch: SettingsPatch =
            serde_json::from_value(json!({ "maxLines": 5, "required": false })).unwrap();
        assert_eq!(patch, SettingsPatch::new().max_lines(5).required(false));
        assert!(serde_json::from_value::<SettingsPatch>(json!({ "colour": "red" })).is_err());
        assert!(SettingsPatch::new().is_empty());
    }

    #[test]
    fn serialized_shape_per_kind() {
        let text = serde_json::to_value(FieldSettings::for_kind(FieldKind::Text)).unwrap();
        assert_eq!(text, json!({ "required": true }));

        let number = FieldSettings::for_kind(FieldKind::Number)
            .merged(&SettingsPatch::new().max(9.5))
            .unwrap();
        assert_eq!(
            serde_json::to_value(number).unwrap(),
            json!({ "required": true, "max": 9.5 })
        );

        let table = FieldSettings::for_kind(FieldKind::Table)
            .merged(&SettingsPatch::new().rows(1).columns(1))
            .unwrap();
        assert_eq!(
            serde_json::to_value(table).unwrap(),
            json!({
                "required": true,
                "rows": 1,
                "columns": 1,
                "cellWidths": [100],
                "cellHeights": [30],
                "cells": { "0-0": { "type": "number", "title": "" } },
            })
        );
    }
}
