//! Property tests for registry and table-grid invariants.
//!
//! Arbitrary command sequences are applied to a registry; after every step
//! the size floors, grid shape, id uniqueness, and selection rules must hold,
//! and rejected commands must leave the registry untouched.

use pagefield_core::PageIndex;
use pagefield_layout::{
    CellKey, FieldId, FieldKind, FieldPosition, FieldRegistry, FieldSize, MIN_CELL_HEIGHT,
    MIN_CELL_WIDTH, SettingsPatch, TableGrid,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create(FieldKind, f64, f64),
    Move(usize, f64, f64),
    Resize(usize, f64, f64),
    Rows(usize, u32),
    Columns(usize, u32),
    ColumnWidth(usize, u32, i64),
    RowHeight(usize, u32, i64),
    SelectCell(usize, u32, u32),
    Select(usize),
    ClearSelection,
    Delete(usize),
}

fn kind() -> impl Strategy<Value = FieldKind> {
    prop::sample::select(FieldKind::ALL.to_vec())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (kind(), -50.0f64..150.0, -50.0f64..150.0).prop_map(|(k, x, y)| Op::Create(k, x, y)),
        (0usize..8, -50.0f64..150.0, -50.0f64..150.0).prop_map(|(i, x, y)| Op::Move(i, x, y)),
        (0usize..8, -5_000.0f64..5_000.0, -5_000.0f64..5_000.0)
            .prop_map(|(i, w, h)| Op::Resize(i, w, h)),
        (0usize..8, 0u32..9).prop_map(|(i, n)| Op::Rows(i, n)),
        (0usize..8, 0u32..9).prop_map(|(i, n)| Op::Columns(i, n)),
        (0usize..8, 0u32..9, -500i64..500).prop_map(|(i, c, d)| Op::ColumnWidth(i, c, d)),
        (0usize..8, 0u32..9, -500i64..500).prop_map(|(i, r, d)| Op::RowHeight(i, r, d)),
        (0usize..8, 0u32..9, 0u32..9).prop_map(|(i, r, c)| Op::SelectCell(i, r, c)),
        (0usize..8).prop_map(Op::Select),
        Just(Op::ClearSelection),
        (0usize..8).prop_map(Op::Delete),
    ]
}

fn nth_id(reg: &FieldRegistry, index: usize) -> FieldId {
    // Out-of-range indices produce an id no field carries.
    reg.ids()
        .nth(index)
        .unwrap_or_else(|| FieldId::new(u64::MAX).unwrap())
}

fn apply_delta(base: u32, delta: i64) -> u32 {
    u32::try_from((i64::from(base) + delta).max(0)).unwrap()
}

fn apply(reg: &mut FieldRegistry, op: &Op) {
    let page = PageIndex::FIRST;
    match *op {
        Op::Create(kind, x, y) => {
            reg.create(kind, kind.spec().label, FieldPosition::new(page, x, y))
                .unwrap();
        }
        Op::Move(i, x, y) => {
            let _ = reg.move_to(nth_id(reg, i), FieldPosition::new(page, x, y));
        }
        Op::Resize(i, w, h) => {
            let id = nth_id(reg, i);
            if let Some(field) = reg.get(id) {
                let start = field.size();
                let _ = reg.resize(id, FieldSize::new(start.width + w, start.height + h));
            }
        }
        Op::Rows(i, n) => {
            let _ = reg.update_settings(nth_id(reg, i), &SettingsPatch::new().rows(n));
        }
        Op::Columns(i, n) => {
            let _ = reg.update_settings(nth_id(reg, i), &SettingsPatch::new().columns(n));
        }
        Op::ColumnWidth(i, col, delta) => {
            let id = nth_id(reg, i);
            let base = reg
                .get(id)
                .and_then(|f| f.grid())
                .and_then(|g| g.column_width(col))
                .unwrap_or(0);
            let _ = reg.resize_column(id, col, apply_delta(base, delta));
        }
        Op::RowHeight(i, row, delta) => {
            let id = nth_id(reg, i);
            let base = reg
                .get(id)
                .and_then(|f| f.grid())
                .and_then(|g| g.row_height(row))
                .unwrap_or(0);
            let _ = reg.resize_row(id, row, apply_delta(base, delta));
        }
        Op::SelectCell(i, row, col) => {
            let _ = reg.select_cell(nth_id(reg, i), CellKey::new(row, col));
        }
        Op::Select(i) => {
            let _ = reg.select_field(Some(nth_id(reg, i)));
        }
        Op::ClearSelection => reg.clear_selection(),
        Op::Delete(i) => {
            let _ = reg.delete(nth_id(reg, i));
        }
    }
}

fn assert_grid_shape(grid: &TableGrid) {
    assert_eq!(grid.cell_widths().len(), grid.columns() as usize);
    assert_eq!(grid.cell_heights().len(), grid.rows() as usize);
    assert_eq!(grid.cells().len(), (grid.rows() * grid.columns()) as usize);
    assert!(grid.cell_widths().iter().all(|&w| w >= MIN_CELL_WIDTH));
    assert!(grid.cell_heights().iter().all(|&h| h >= MIN_CELL_HEIGHT));
}

proptest! {
    #[test]
    fn invariants_hold_after_every_command(ops in prop::collection::vec(op(), 1..60)) {
        let mut reg = FieldRegistry::new();
        for op in &ops {
            apply(&mut reg, op);
            prop_assert!(reg.check_invariants().is_ok(), "{:?} after {:?}", reg.check_invariants(), op);
            for field in reg.iter() {
                let min = field.kind().spec();
                prop_assert!(field.size().width >= min.min_width);
                prop_assert!(field.size().height >= min.min_height);
                let pos = field.position();
                prop_assert!((0.0..=100.0).contains(&pos.x) && (0.0..=100.0).contains(&pos.y));
                if let Some(grid) = field.grid() {
                    assert_grid_shape(grid);
                }
            }
        }
    }

    #[test]
    fn resize_never_goes_below_minimum(
        kind in kind(),
        dx in -1.0e6f64..1.0e6,
        dy in -1.0e6f64..1.0e6,
    ) {
        let mut reg = FieldRegistry::new();
        let id = reg.create(kind, "f", FieldPosition::new(PageIndex::FIRST, 1.0, 1.0)).unwrap();
        let start = reg.get(id).unwrap().size();
        let stored = reg.resize(id, FieldSize::new(start.width + dx, start.height + dy)).unwrap();
        prop_assert!(stored.width >= kind.spec().min_width);
        prop_assert!(stored.height >= kind.spec().min_height);
        prop_assert_eq!(reg.get(id).unwrap().size(), stored);
    }

    #[test]
    fn move_preserves_identity_kind_and_settings(
        kind in kind(),
        x in -20.0f64..120.0,
        y in -20.0f64..120.0,
        page in 1u32..20,
    ) {
        let mut reg = FieldRegistry::new();
        let id = reg.create(kind, "f", FieldPosition::new(PageIndex::FIRST, 50.0, 50.0)).unwrap();
        if kind == FieldKind::Table {
            reg.update_settings(id, &SettingsPatch::new().rows(2).selected_cell(CellKey::new(1, 3))).unwrap();
        }
        let before = reg.get(id).unwrap().clone();
        reg.move_to(id, FieldPosition::new(PageIndex::new(page).unwrap(), x, y)).unwrap();
        let after = reg.get(id).unwrap();
        prop_assert_eq!(after.id(), before.id());
        prop_assert_eq!(after.kind(), before.kind());
        prop_assert_eq!(after.settings(), before.settings());
        prop_assert_eq!(after.size(), before.size());
        prop_assert_eq!(after.position().page_index.get(), page);
    }

    #[test]
    fn delete_clears_only_matching_selection(count in 2usize..6, victim in 0usize..6, selected in 0usize..6) {
        let victim = victim % count;
        let selected = selected % count;
        let mut reg = FieldRegistry::new();
        let ids: Vec<FieldId> = (0..count)
            .map(|_| reg.create(FieldKind::Text, "t", FieldPosition::new(PageIndex::FIRST, 0.0, 0.0)).unwrap())
            .collect();
        reg.select_field(Some(ids[selected])).unwrap();
        reg.delete(ids[victim]).unwrap();
        if victim == selected {
            prop_assert_eq!(reg.selected_field_id(), None);
        } else {
            prop_assert_eq!(reg.selected_field_id(), Some(ids[selected]));
        }
        let remaining: Vec<FieldId> = ids.iter().copied().filter(|&id| id != ids[victim]).collect();
        prop_assert_eq!(reg.ids().collect::<Vec<_>>(), remaining);
    }
}
