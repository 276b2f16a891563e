//! Registry change notification.
//!
//! Subscribers register a callback and receive every [`RegistryChange`] in
//! registration order. The notifier holds callbacks weakly; the returned
//! [`Subscription`] guard owns the only strong reference, so dropping the
//! guard unsubscribes. Dead entries are pruned on the next notification.
//!
//! Callbacks run synchronously inside the mutating command and cannot reach
//! back into the registry, which is exclusively borrowed at that point.

use std::fmt;
use std::rc::{Rc, Weak};

use pagefield_core::PageIndex;

use crate::field::{FieldId, FieldKind, FieldPosition, FieldSize};
use crate::grid::CellKey;

/// One committed registry mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryChange {
    Created { id: FieldId, kind: FieldKind, page: PageIndex },
    Moved { id: FieldId, position: FieldPosition },
    Resized { id: FieldId, size: FieldSize },
    TitleChanged { id: FieldId },
    /// Settings changed, including cell-scoped edits on table fields.
    SettingsChanged { id: FieldId },
    Deleted { id: FieldId },
    SelectionChanged {
        field: Option<FieldId>,
        cell: Option<CellKey>,
    },
}

impl RegistryChange {
    /// The field the change is about, if any.
    #[must_use]
    pub fn field_id(&self) -> Option<FieldId> {
        match self {
            Self::Created { id, .. }
            | Self::Moved { id, .. }
            | Self::Resized { id, .. }
            | Self::TitleChanged { id }
            | Self::SettingsChanged { id }
            | Self::Deleted { id } => Some(*id),
            Self::SelectionChanged { field, .. } => *field,
        }
    }
}

type CallbackRc = Rc<dyn Fn(&RegistryChange)>;
type CallbackWeak = Weak<dyn Fn(&RegistryChange)>;

/// Fan-out list of weakly held change callbacks.
#[derive(Default)]
pub(crate) struct ChangeNotifier {
    subscribers: Vec<CallbackWeak>,
}

impl ChangeNotifier {
    pub(crate) fn subscribe(&mut self, callback: impl Fn(&RegistryChange) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.subscribers.push(Rc::downgrade(&strong));
        Subscription { _guard: strong }
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn notify(&mut self, change: &RegistryChange) {
        self.subscribers.retain(|w| w.strong_count() > 0);
        let callbacks: Vec<CallbackRc> = self.subscribers.iter().filter_map(Weak::upgrade).collect();
        for cb in &callbacks {
            cb(change);
        }
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscriber_count", &self.subscribers.len())
            .finish()
    }
}

/// RAII guard for a registry subscriber. Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: CallbackRc,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn deleted(raw: u64) -> RegistryChange {
        RegistryChange::Deleted {
            id: FieldId::new(raw).unwrap(),
        }
    }

    #[test]
    fn subscribers_fire_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = ChangeNotifier::default();
        let a = Rc::clone(&log);
        let _s1 = notifier.subscribe(move |_| a.borrow_mut().push("first"));
        let b = Rc::clone(&log);
        let _s2 = notifier.subscribe(move |_| b.borrow_mut().push("second"));
        notifier.notify(&deleted(1));
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn dropped_subscription_is_pruned() {
        let hits = Rc::new(RefCell::new(0));
        let mut notifier = ChangeNotifier::default();
        let h = Rc::clone(&hits);
        let sub = notifier.subscribe(move |_| *h.borrow_mut() += 1);
        notifier.notify(&deleted(1));
        drop(sub);
        assert_eq!(notifier.len(), 1);
        notifier.notify(&deleted(2));
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(notifier.len(), 0);
    }

    #[test]
    fn field_id_of_changes() {
        assert_eq!(deleted(3).field_id().map(FieldId::get), Some(3));
        let cleared = RegistryChange::SelectionChanged {
            field: None,
            cell: None,
        };
        assert_eq!(cleared.field_id(), None);
    }
}
