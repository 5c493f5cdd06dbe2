use taskboard_core::{
    EntitySchema, EntityStore, FieldMap, FieldSpec, FieldValue, OnDelete, Relation,
    RelationError, StoreError,
};

const NOW: i64 = 1_700_000_000_000;

/// org 1—N team (cascade), team 1—N member (cascade), org 1—N audit
/// (restrict), org 1—N draft (set-null).
fn org_store() -> EntityStore {
    let mut store = EntityStore::new();
    store
        .register_entity(
            EntitySchema::new("org", vec![FieldSpec::text("name").unique()]).unwrap(),
        )
        .unwrap();
    store
        .register_entity(
            EntitySchema::new(
                "team",
                vec![FieldSpec::text("name"), FieldSpec::integer("org_id").indexed()],
            )
            .unwrap(),
        )
        .unwrap();
    store
        .register_entity(
            EntitySchema::new(
                "member",
                vec![FieldSpec::text("name"), FieldSpec::integer("team_id").indexed()],
            )
            .unwrap(),
        )
        .unwrap();
    store
        .register_entity(
            EntitySchema::new(
                "audit",
                vec![FieldSpec::text("note"), FieldSpec::integer("org_id")],
            )
            .unwrap(),
        )
        .unwrap();
    store
        .register_entity(
            EntitySchema::new(
                "draft",
                vec![
                    FieldSpec::text("name"),
                    FieldSpec::integer("org_id").nullable().indexed(),
                ],
            )
            .unwrap(),
        )
        .unwrap();

    store
        .register_relation(Relation::one_to_many(
            "org_teams",
            "org",
            "team",
            "org_id",
            OnDelete::Cascade,
        ))
        .unwrap();
    store
        .register_relation(Relation::one_to_many(
            "team_members",
            "team",
            "member",
            "team_id",
            OnDelete::Cascade,
        ))
        .unwrap();
    store
        .register_relation(Relation::one_to_many(
            "org_audits",
            "org",
            "audit",
            "org_id",
            OnDelete::Restrict,
        ))
        .unwrap();
    store
        .register_relation(Relation::one_to_many(
            "org_drafts",
            "org",
            "draft",
            "org_id",
            OnDelete::SetNull,
        ))
        .unwrap();
    store
}

fn named(name: &str) -> FieldMap {
    FieldMap::from([("name".to_string(), FieldValue::from(name))])
}

fn child(name: &str, fk: &str, id: i64) -> FieldMap {
    FieldMap::from([
        ("name".to_string(), FieldValue::from(name)),
        (fk.to_string(), FieldValue::from(id)),
    ])
}

#[test]
fn create_rejects_dangling_foreign_key() {
    let store = org_store();
    let err = store
        .create_at("team", child("core", "org_id", 999), NOW)
        .unwrap_err();
    match err {
        StoreError::DanglingReference { field, target, id } => {
            assert_eq!(field, "org_id");
            assert_eq!(target, "org");
            assert_eq!(id, 999);
        }
        other => panic!("expected DanglingReference, got {other}"),
    }
}

#[test]
fn update_rechecks_foreign_keys() {
    let store = org_store();
    let org = store.create_at("org", named("acme"), NOW).unwrap();
    let team = store
        .create_at("team", child("core", "org_id", org.id), NOW)
        .unwrap();

    let patch = FieldMap::from([("org_id".to_string(), FieldValue::from(12345))]);
    let err = store.update_at("team", team.id, patch, NOW).unwrap_err();
    assert!(matches!(err, StoreError::DanglingReference { .. }));
}

#[test]
fn cascade_delete_removes_every_descendant() {
    let store = org_store();
    let org = store.create_at("org", named("acme"), NOW).unwrap();
    let team_a = store
        .create_at("team", child("core", "org_id", org.id), NOW)
        .unwrap();
    let team_b = store
        .create_at("team", child("infra", "org_id", org.id), NOW)
        .unwrap();
    let member = store
        .create_at("member", child("ada", "team_id", team_a.id), NOW)
        .unwrap();

    store.delete_at("org", org.id, NOW).unwrap();

    assert!(matches!(
        store.get("org", org.id).unwrap_err(),
        StoreError::NotFound { .. }
    ));
    assert!(store.get("team", team_a.id).is_err());
    assert!(store.get("team", team_b.id).is_err());
    assert!(store.get("member", member.id).is_err());
    assert_eq!(store.count("team").unwrap(), 0);
    assert_eq!(store.count("member").unwrap(), 0);
}

#[test]
fn restrict_blocks_delete_and_leaves_records_untouched() {
    let store = org_store();
    let org = store.create_at("org", named("acme"), NOW).unwrap();
    let team = store
        .create_at("team", child("core", "org_id", org.id), NOW)
        .unwrap();
    store
        .create_at("audit", {
            let mut fields = FieldMap::from([(
                "note".to_string(),
                FieldValue::from("q3 review"),
            )]);
            fields.insert("org_id".to_string(), FieldValue::from(org.id));
            fields
        }, NOW)
        .unwrap();

    let err = store.delete_at("org", org.id, NOW).unwrap_err();
    match err {
        StoreError::ReferencedByChildren {
            entity,
            id,
            child_entity,
            count,
        } => {
            assert_eq!(entity, "org");
            assert_eq!(id, org.id);
            assert_eq!(child_entity, "audit");
            assert_eq!(count, 1);
        }
        other => panic!("expected ReferencedByChildren, got {other}"),
    }

    // Nothing was deleted, including cascade-eligible children.
    assert!(store.get("org", org.id).is_ok());
    assert!(store.get("team", team.id).is_ok());
    assert_eq!(store.count("audit").unwrap(), 1);
}

#[test]
fn set_null_clears_child_references_and_keeps_children() {
    let store = org_store();
    let org = store.create_at("org", named("acme"), NOW).unwrap();
    let draft = store
        .create_at("draft", child("roadmap", "org_id", org.id), NOW)
        .unwrap();
    assert_eq!(draft.int("org_id"), Some(org.id));

    store.delete_at("org", org.id, NOW + 50).unwrap();

    let survivor = store.get("draft", draft.id).unwrap();
    assert!(survivor.is_null("org_id"));
    assert_eq!(survivor.updated_at, NOW + 50);
}

#[test]
fn set_null_registration_requires_nullable_foreign_key() {
    let mut store = EntityStore::new();
    store
        .register_entity(EntitySchema::new("org", vec![FieldSpec::text("name")]).unwrap())
        .unwrap();
    store
        .register_entity(
            EntitySchema::new(
                "draft",
                vec![FieldSpec::text("name"), FieldSpec::integer("org_id")],
            )
            .unwrap(),
        )
        .unwrap();

    let err = store
        .register_relation(Relation::one_to_many(
            "org_drafts",
            "org",
            "draft",
            "org_id",
            OnDelete::SetNull,
        ))
        .unwrap_err();
    assert!(matches!(err, RelationError::SetNullRequiresNullable { .. }));
}

#[test]
fn cascade_cycle_is_detected_not_looped() {
    let mut store = EntityStore::new();
    store
        .register_entity(
            EntitySchema::new(
                "alpha",
                vec![
                    FieldSpec::text("name"),
                    FieldSpec::integer("beta_id").nullable().indexed(),
                ],
            )
            .unwrap(),
        )
        .unwrap();
    store
        .register_entity(
            EntitySchema::new(
                "beta",
                vec![
                    FieldSpec::text("name"),
                    FieldSpec::integer("alpha_id").nullable().indexed(),
                ],
            )
            .unwrap(),
        )
        .unwrap();
    store
        .register_relation(Relation::one_to_many(
            "alpha_betas",
            "alpha",
            "beta",
            "alpha_id",
            OnDelete::Cascade,
        ))
        .unwrap();
    store
        .register_relation(Relation::one_to_many(
            "beta_alphas",
            "beta",
            "alpha",
            "beta_id",
            OnDelete::Cascade,
        ))
        .unwrap();

    let alpha = store.create_at("alpha", named("a1"), NOW).unwrap();
    let beta = store
        .create_at("beta", child("b1", "alpha_id", alpha.id), NOW)
        .unwrap();
    let close_cycle = FieldMap::from([("beta_id".to_string(), FieldValue::from(beta.id))]);
    store.update_at("alpha", alpha.id, close_cycle, NOW).unwrap();

    let err = store.delete_at("alpha", alpha.id, NOW).unwrap_err();
    match err {
        StoreError::CascadeCycle { path } => {
            assert_eq!(path.first().map(String::as_str), Some("alpha#1"));
            assert_eq!(path.last().map(String::as_str), Some("alpha#1"));
        }
        other => panic!("expected CascadeCycle, got {other}"),
    }

    // The rejected delete left both records in place.
    assert!(store.get("alpha", alpha.id).is_ok());
    assert!(store.get("beta", beta.id).is_ok());
}

fn tagged_store() -> EntityStore {
    let mut store = EntityStore::new();
    store
        .register_entity(EntitySchema::new("post", vec![FieldSpec::text("title")]).unwrap())
        .unwrap();
    store
        .register_entity(
            EntitySchema::new("label", vec![FieldSpec::text("name").unique()]).unwrap(),
        )
        .unwrap();
    store
        .register_relation(Relation::many_to_many(
            "post_labels",
            "post",
            "label",
            "post_labels",
        ))
        .unwrap();
    store
}

#[test]
fn linking_twice_leaves_one_membership_pair() {
    let store = tagged_store();
    let post = store
        .create_at("post", FieldMap::from([("title".to_string(), FieldValue::from("hello"))]), NOW)
        .unwrap();
    let label = store.create_at("label", named("rust"), NOW).unwrap();

    assert!(store.link("post_labels", post.id, label.id).unwrap());
    assert!(!store.link("post_labels", post.id, label.id).unwrap());
    assert_eq!(store.links_of("post_labels", post.id).unwrap(), vec![label.id]);

    assert!(store.unlink("post_labels", post.id, label.id).unwrap());
    assert!(!store.unlink("post_labels", post.id, label.id).unwrap());
}

#[test]
fn link_rejects_dangling_endpoints() {
    let store = tagged_store();
    let post = store
        .create_at("post", FieldMap::from([("title".to_string(), FieldValue::from("hello"))]), NOW)
        .unwrap();

    let err = store.link("post_labels", post.id, 42).unwrap_err();
    assert!(matches!(err, StoreError::DanglingReference { .. }));
    let err = store.link("post_labels", 42, post.id).unwrap_err();
    assert!(matches!(err, StoreError::DanglingReference { .. }));
}

#[test]
fn deleting_either_side_purges_join_rows() {
    let store = tagged_store();
    let post = store
        .create_at("post", FieldMap::from([("title".to_string(), FieldValue::from("hello"))]), NOW)
        .unwrap();
    let rust = store.create_at("label", named("rust"), NOW).unwrap();
    let db = store.create_at("label", named("db"), NOW).unwrap();
    store.link("post_labels", post.id, rust.id).unwrap();
    store.link("post_labels", post.id, db.id).unwrap();

    store.delete_at("label", rust.id, NOW).unwrap();
    assert_eq!(store.links_of("post_labels", post.id).unwrap(), vec![db.id]);

    store.delete_at("post", post.id, NOW).unwrap();
    assert!(store.backlinks_of("post_labels", db.id).unwrap().is_empty());
}
