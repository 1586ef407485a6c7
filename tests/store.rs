mod common;

use common::{ids, sheet, user};
use timesheets::entities::{timesheet, user as user_rel, Entity, EntityId, EntityKind, Link, Timesheet, User};
use timesheets::store::{Action, RootStore, SliceAction, Status, StoreError, SCHEMA};

fn id(value: &str) -> EntityId {
    EntityId::new(value)
}

fn user_sheets<'a>(store: &'a RootStore, user_id: &str) -> Vec<&'a str> {
    ids(store.state().get::<User>(&id(user_id)).unwrap().child_ids(user_rel::TIMESHEETS))
}

fn owner<'a>(store: &'a RootStore, sheet_id: &str) -> Option<&'a str> {
    store
        .state()
        .get::<Timesheet>(&id(sheet_id))
        .unwrap()
        .parent_id(timesheet::USER)
        .map(|id| id.as_str())
}

#[test]
fn test_schema_is_consistent() {
    assert_eq!(SCHEMA.check(), Ok(()));
}

#[test]
fn test_schema_referencing_user() {
    let owners: Vec<EntityKind> = SCHEMA.referencing(EntityKind::User).into_iter().map(|(kind, _)| kind).collect();
    assert_eq!(owners, vec![EntityKind::Timesheet, EntityKind::Preset]);
}

#[test]
fn test_new_store_is_idle_and_empty() {
    let store = RootStore::new();
    for kind in EntityKind::ALL {
        assert_eq!(store.state().status(kind), Status::Idle);
        assert_eq!(store.state().generation(kind), 0);
    }
    assert!(store.state().slice::<User>().is_empty());
}

#[test]
fn test_upsert_same_entity_twice_keeps_one_copy() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();

    let mut renamed = user("u1");
    renamed.attributes.name = "Renamed".to_string();
    store.dispatch(SliceAction::Upsert(renamed)).unwrap();

    let users = store.state().slice::<User>();
    assert_eq!(ids(users.all_ids()), vec!["u1"]);
    assert_eq!(users.by_id().len(), 1);
    assert_eq!(users.get(&id("u1")).unwrap().attributes.name, "Renamed");
}

#[test]
fn test_upsert_child_registers_with_parent() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t1", "u1"))).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t1", "u1"))).unwrap();

    assert_eq!(user_sheets(&store, "u1"), vec!["t1"]);
}

#[test]
fn test_reparenting_child_moves_it_between_lists() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::UpsertMany(vec![user("u1"), user("u2")])).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t1", "u1"))).unwrap();

    store.dispatch(SliceAction::Upsert(sheet("t1", "u2"))).unwrap();

    assert!(user_sheets(&store, "u1").is_empty());
    assert_eq!(user_sheets(&store, "u2"), vec!["t1"]);
}

#[test]
fn test_child_upsert_without_link_keeps_parent() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t1", "u1"))).unwrap();

    let mut bare = sheet("t1", "u1");
    bare.relationships.clear();
    bare.attributes.notes = Some("late".to_string());
    store.dispatch(SliceAction::Upsert(bare)).unwrap();

    assert_eq!(owner(&store, "t1"), Some("u1"));
    assert_eq!(user_sheets(&store, "u1"), vec!["t1"]);
}

#[test]
fn test_fresh_parent_adopts_loaded_children() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Set(vec![sheet("t1", "u1"), sheet("t2", "u1"), sheet("t3", "u2")])).unwrap();

    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();

    assert_eq!(user_sheets(&store, "u1"), vec!["t1", "t2"]);
}

#[test]
fn test_parent_update_listing_children_is_authoritative() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();
    store.dispatch(SliceAction::Set(vec![sheet("t1", "u1"), sheet("t2", "u1")])).unwrap();
    assert_eq!(user_sheets(&store, "u1"), vec!["t1", "t2"]);

    store
        .dispatch(SliceAction::Upsert(user("u1").with_children(user_rel::TIMESHEETS, ["t1"])))
        .unwrap();

    assert_eq!(user_sheets(&store, "u1"), vec!["t1"]);
    assert_eq!(owner(&store, "t1"), Some("u1"));
    assert_eq!(owner(&store, "t2"), None);
}

#[test]
fn test_parent_claiming_child_detaches_it_from_previous_parent() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::UpsertMany(vec![user("u1"), user("u2")])).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t1", "u2"))).unwrap();

    store
        .dispatch(SliceAction::Upsert(user("u1").with_children(user_rel::TIMESHEETS, ["t1"])))
        .unwrap();

    assert_eq!(owner(&store, "t1"), Some("u1"));
    assert_eq!(user_sheets(&store, "u1"), vec!["t1"]);
    assert!(user_sheets(&store, "u2").is_empty());
}

#[test]
fn test_child_loaded_after_parent_list_fixes_stale_list() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u2"))).unwrap();
    store
        .dispatch(SliceAction::Upsert(user("u1").with_children(user_rel::TIMESHEETS, ["t1", "t9"])))
        .unwrap();

    store.dispatch(SliceAction::Upsert(sheet("t1", "u2"))).unwrap();

    assert_eq!(user_sheets(&store, "u1"), vec!["t9"]);
    assert_eq!(user_sheets(&store, "u2"), vec!["t1"]);
}

#[test]
fn test_duplicate_child_ids_are_collapsed() {
    let mut store = RootStore::new();
    store
        .dispatch(SliceAction::Upsert(user("u1").with_children(user_rel::TIMESHEETS, ["t1", "t2", "t1"])))
        .unwrap();

    assert_eq!(user_sheets(&store, "u1"), vec!["t1", "t2"]);
}

#[test]
fn test_remove_user_clears_timesheet_references() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();
    store.dispatch(SliceAction::Set(vec![sheet("t1", "u1"), sheet("t2", "u1")])).unwrap();

    store.dispatch(SliceAction::<User>::Remove(id("u1"))).unwrap();

    assert!(store.state().get::<User>(&id("u1")).is_none());
    assert_eq!(ids(store.state().slice::<Timesheet>().all_ids()), vec!["t1", "t2"]);
    assert_eq!(owner(&store, "t1"), None);
    assert_eq!(owner(&store, "t2"), None);
}

#[test]
fn test_remove_child_strips_it_from_parent_list() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();
    store.dispatch(SliceAction::Set(vec![sheet("t1", "u1"), sheet("t2", "u1")])).unwrap();

    store.dispatch(SliceAction::<Timesheet>::Remove(id("t1"))).unwrap();

    assert_eq!(user_sheets(&store, "u1"), vec!["t2"]);
}

#[test]
fn test_remove_unknown_id_is_a_no_op() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();

    store.dispatch(SliceAction::<User>::Remove(id("nobody"))).unwrap();

    assert_eq!(ids(store.state().slice::<User>().all_ids()), vec!["u1"]);
}

#[test]
fn test_set_keeps_response_order_and_marks_ready() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::<User>::SetPending).unwrap();
    store.dispatch(SliceAction::Set(vec![user("u3"), user("u1"), user("u2")])).unwrap();

    let users = store.state().slice::<User>();
    assert_eq!(ids(users.all_ids()), vec!["u3", "u1", "u2"]);
    assert_eq!(users.status(), Status::Ready);
    assert_eq!(users.error(), None);
}

#[test]
fn test_set_drops_missing_entities_and_their_references() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Set(vec![user("u1"), user("u2")])).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t1", "u1"))).unwrap();

    store.dispatch(SliceAction::Set(vec![user("u2")])).unwrap();

    assert_eq!(ids(store.state().slice::<User>().all_ids()), vec!["u2"]);
    assert_eq!(owner(&store, "t1"), None);
}

#[test]
fn test_set_keeps_links_the_response_does_not_carry() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t1", "u1"))).unwrap();

    store.dispatch(SliceAction::Set(vec![user("u1")])).unwrap();

    assert_eq!(user_sheets(&store, "u1"), vec!["t1"]);
}

#[test]
fn test_clear_then_empty_set_is_ready() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Set(vec![user("u1")])).unwrap();

    store.dispatch(SliceAction::<User>::Clear).unwrap();
    let users = store.state().slice::<User>();
    assert!(users.is_empty());
    assert_eq!(users.status(), Status::Idle);
    assert_eq!(users.generation(), 1);

    store.dispatch(SliceAction::<User>::Set(vec![])).unwrap();
    let users = store.state().slice::<User>();
    assert!(users.is_empty());
    assert_eq!(users.status(), Status::Ready);
}

#[test]
fn test_clear_all_resets_every_kind() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Set(vec![user("u1")])).unwrap();
    store.dispatch(SliceAction::Set(vec![sheet("t1", "u1")])).unwrap();

    store.dispatch(Action::ClearAll).unwrap();

    for kind in EntityKind::ALL {
        assert_eq!(store.state().status(kind), Status::Idle);
        assert_eq!(store.state().generation(kind), 1);
    }
    assert!(store.state().slice::<User>().is_empty());
    assert!(store.state().slice::<Timesheet>().is_empty());
}

#[test]
fn test_error_and_pending_transitions() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::<User>::SetPending).unwrap();
    assert_eq!(store.state().status(EntityKind::User), Status::Pending);

    store.dispatch(SliceAction::<User>::SetError("boom".to_string())).unwrap();
    assert_eq!(store.state().status(EntityKind::User), Status::Error);
    assert_eq!(store.state().slice::<User>().error(), Some("boom"));

    store.dispatch(SliceAction::<User>::SetPending).unwrap();
    assert_eq!(store.state().status(EntityKind::User), Status::Pending);
    assert_eq!(store.state().slice::<User>().error(), None);
}

#[test]
fn test_commit_replaces_provisional_id_in_place() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t1", "u1"))).unwrap();

    let draft = Entity::draft(Timesheet::for_week_of(common::monday())).with_parent(timesheet::USER, "u1");
    let provisional = draft.id.clone();
    store.dispatch(SliceAction::Upsert(draft)).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t2", "u1"))).unwrap();
    assert_eq!(user_sheets(&store, "u1"), vec!["t1", provisional.as_str(), "t2"]);

    store
        .dispatch(SliceAction::Commit {
            provisional: provisional.clone(),
            entity: sheet("t9", "u1"),
        })
        .unwrap();

    assert_eq!(ids(store.state().slice::<Timesheet>().all_ids()), vec!["t1", "t9", "t2"]);
    assert!(store.state().get::<Timesheet>(&provisional).is_none());
    assert_eq!(user_sheets(&store, "u1"), vec!["t1", "t9", "t2"]);
}

#[test]
fn test_commit_unknown_provisional_id_fails() {
    let mut store = RootStore::new();
    let missing = EntityId::provisional();

    let result = store.dispatch(SliceAction::Commit {
        provisional: missing.clone(),
        entity: user("u1"),
    });

    assert_eq!(
        result,
        Err(StoreError::NotFound {
            kind: EntityKind::User,
            id: missing,
        })
    );
    assert!(store.state().slice::<User>().is_empty());
}

#[test]
fn test_commit_onto_existing_id_is_rejected() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();
    let draft = Entity::draft(Timesheet::for_week_of(common::monday())).with_parent(timesheet::USER, "u1");
    let provisional = draft.id.clone();
    store.dispatch(SliceAction::Upsert(draft)).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t9", "u1"))).unwrap();

    let result = store.dispatch(SliceAction::Commit {
        provisional: provisional.clone(),
        entity: sheet("t9", "u1"),
    });

    assert_eq!(result, Err(StoreError::DuplicateId(id("t9"))));
    assert!(store.state().get::<Timesheet>(&provisional).is_some());
    assert_eq!(user_sheets(&store, "u1"), vec![provisional.as_str(), "t9"]);
}

#[test]
fn test_explicit_null_parent_detaches_child() {
    let mut store = RootStore::new();
    store.dispatch(SliceAction::Upsert(user("u1"))).unwrap();
    store.dispatch(SliceAction::Upsert(sheet("t1", "u1"))).unwrap();

    let orphan = sheet("t1", "u1").with_link(timesheet::USER, Link::One(None));
    store.dispatch(SliceAction::Upsert(orphan)).unwrap();

    assert_eq!(owner(&store, "t1"), None);
    assert!(user_sheets(&store, "u1").is_empty());
}

#[test]
fn test_action_routing() {
    let action = Action::of(SliceAction::<User>::Clear);
    assert_eq!(action.kind(), Some(EntityKind::User));
    assert_eq!(Action::from(SliceAction::<Timesheet>::SetPending).kind(), Some(EntityKind::Timesheet));
    assert_eq!(Action::ClearAll.kind(), None);
}
