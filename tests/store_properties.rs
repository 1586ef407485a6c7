mod common;

use proptest::prelude::*;

use common::{sheet, user};
use timesheets::entities::{timesheet, user as user_rel, EntityId, Link, Timesheet, User};
use timesheets::store::{RootStore, SliceAction};

#[derive(Debug, Clone)]
enum Op {
    UpsertUser(usize),
    UpsertUserWithSheets(usize, Vec<usize>),
    UpsertSheet(usize, Option<usize>),
    RemoveUser(usize),
    RemoveSheet(usize),
    SetUsers(Vec<usize>),
}

fn user_id(n: usize) -> String {
    format!("u{n}")
}

fn sheet_id(n: usize) -> String {
    format!("t{n}")
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize).prop_map(Op::UpsertUser),
        (0..4usize, prop::collection::vec(0..6usize, 0..4)).prop_map(|(u, ts)| Op::UpsertUserWithSheets(u, ts)),
        (0..6usize, prop::option::of(0..4usize)).prop_map(|(t, u)| Op::UpsertSheet(t, u)),
        (0..4usize).prop_map(Op::RemoveUser),
        (0..6usize).prop_map(Op::RemoveSheet),
        prop::collection::vec(0..4usize, 0..4).prop_map(Op::SetUsers),
    ]
}

fn apply(store: &mut RootStore, op: &Op) {
    let result = match op {
        Op::UpsertUser(u) => store.dispatch(SliceAction::Upsert(user(&user_id(*u)))),
        Op::UpsertUserWithSheets(u, sheets) => {
            let entity = user(&user_id(*u)).with_children(user_rel::TIMESHEETS, sheets.iter().map(|t| sheet_id(*t)));
            store.dispatch(SliceAction::Upsert(entity))
        }
        Op::UpsertSheet(t, owner) => {
            let link = Link::One(owner.map(|u| EntityId::new(user_id(u))));
            let entity = sheet(&sheet_id(*t), "unused").with_link(timesheet::USER, link);
            store.dispatch(SliceAction::Upsert(entity))
        }
        Op::RemoveUser(u) => store.dispatch(SliceAction::<User>::Remove(EntityId::new(user_id(*u)))),
        Op::RemoveSheet(t) => store.dispatch(SliceAction::<Timesheet>::Remove(EntityId::new(sheet_id(*t)))),
        Op::SetUsers(users) => store.dispatch(SliceAction::Set(users.iter().map(|u| user(&user_id(*u))).collect())),
    };
    result.unwrap();
}

fn check_invariants(store: &RootStore) -> Result<(), TestCaseError> {
    let users = store.state().slice::<User>();
    let sheets = store.state().slice::<Timesheet>();

    for slice_ids in [users.all_ids(), sheets.all_ids()] {
        let mut unique = slice_ids.to_vec();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), slice_ids.len(), "duplicate ids in {:?}", slice_ids);
    }
    prop_assert_eq!(users.all_ids().len(), users.by_id().len());
    prop_assert_eq!(sheets.all_ids().len(), sheets.by_id().len());

    for owner in users.iter() {
        let listed = owner.child_ids(user_rel::TIMESHEETS);
        for child in listed {
            prop_assert_eq!(listed.iter().filter(|id| *id == child).count(), 1);
            if let Some(entry) = sheets.get(child) {
                prop_assert_eq!(
                    entry.parent_id(timesheet::USER),
                    Some(&owner.id),
                    "{} lists {} which points elsewhere",
                    owner.id,
                    child
                );
            }
        }
    }

    for entry in sheets.iter() {
        if let Some(owner) = entry.parent_id(timesheet::USER).and_then(|id| users.get(id)) {
            prop_assert!(
                owner.child_ids(user_rel::TIMESHEETS).contains(&entry.id),
                "{} points at {} which does not list it",
                entry.id,
                owner.id
            );
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_back_references_stay_consistent(ops in prop::collection::vec(op(), 1..40)) {
        let mut store = RootStore::new();
        for op in &ops {
            apply(&mut store, op);
            check_invariants(&store)?;
        }
    }

    #[test]
    fn prop_removed_ids_are_never_referenced(ops in prop::collection::vec(op(), 1..30), victim in 0..4usize) {
        let mut store = RootStore::new();
        for op in &ops {
            apply(&mut store, op);
        }

        let removed = EntityId::new(user_id(victim));
        store.dispatch(SliceAction::<User>::Remove(removed.clone())).unwrap();

        for entry in store.state().slice::<Timesheet>().iter() {
            prop_assert_ne!(entry.parent_id(timesheet::USER), Some(&removed));
        }
        prop_assert!(!store.state().slice::<User>().all_ids().contains(&removed));
    }
}
