use mailfolk_core::{Identity, IdentityStore, LinkOutcome};

fn identity_of(addresses: &[&str]) -> Identity {
    let mut identity = Identity::new(None, addresses[0]).unwrap();
    for address in &addresses[1..] {
        identity.add_email(address).unwrap();
    }
    identity
}

#[test]
fn lookup_normalizes_address() {
    let mut store = IdentityStore::new();
    let id = store.upsert(Identity::new(None, "foo@example.com").unwrap()).unwrap();

    assert_eq!(store.lookup("Foo@Example.COM"), Some(id));
    assert_eq!(store.lookup(" foo@example.com "), Some(id));
    assert_eq!(store.lookup("bar@example.com"), None);
    assert_eq!(store.lookup(""), None);
}

#[test]
fn upsert_same_address_returns_existing_record() {
    let mut store = IdentityStore::new();
    let first = store.upsert(Identity::new(None, "Foo@Example.COM").unwrap()).unwrap();
    let second = store.upsert(Identity::new(Some("Foo"), "foo@example.com").unwrap()).unwrap();

    assert_eq!(first, second);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(first).unwrap().name(), "Foo");
    store.validate().unwrap();
}

#[test]
fn upsert_folds_overlapping_records_in_any_order() {
    let orders: [[&[&str]; 3]; 3] = [
        [&["e1@x.com"], &["e1@x.com", "e2@x.com"], &["e2@x.com", "e3@x.com"]],
        [&["e2@x.com", "e3@x.com"], &["e1@x.com"], &["e1@x.com", "e2@x.com"]],
        [&["e1@x.com"], &["e2@x.com", "e3@x.com"], &["e1@x.com", "e2@x.com"]],
    ];

    for order in orders {
        let mut store = IdentityStore::new();
        for addresses in order {
            store.upsert(identity_of(addresses)).unwrap();
        }

        assert_eq!(store.len(), 1);
        let id = store.lookup("e1@x.com").unwrap();
        assert_eq!(store.lookup("e2@x.com"), Some(id));
        assert_eq!(store.lookup("e3@x.com"), Some(id));
        assert_eq!(store.get(id).unwrap().emails().len(), 3);
        store.validate().unwrap();
    }
}

#[test]
fn merging_two_canonical_records_repoints_every_address() {
    let mut store = IdentityStore::new();
    let a = store.upsert(identity_of(&["a1@x.com", "a2@x.com"])).unwrap();
    let b = store.upsert(identity_of(&["b1@x.com", "b2@x.com"])).unwrap();
    assert_eq!(store.len(), 2);

    let bridge = store.upsert(identity_of(&["a2@x.com", "b1@x.com"])).unwrap();

    assert_eq!(bridge, a);
    assert_eq!(store.len(), 1);
    for address in ["a1@x.com", "a2@x.com", "b1@x.com", "b2@x.com"] {
        assert_eq!(store.lookup(address), Some(a), "{address} not repointed");
    }
    assert_eq!(store.resolve(b), Some(a));
    assert!(store.same_identity(a, b));
    store.validate().unwrap();
}

#[test]
fn merge_rewrites_existing_edges_to_the_survivor() {
    let mut store = IdentityStore::new();
    let me = store.upsert(Identity::new(None, "me@x.com").unwrap()).unwrap();
    let alias = store.upsert(Identity::new(None, "alias@x.com").unwrap()).unwrap();
    let carol = store.upsert(Identity::new(None, "carol@x.com").unwrap()).unwrap();
    let dave = store.upsert(Identity::new(None, "dave@x.com").unwrap()).unwrap();

    store.link(me, carol).unwrap();
    store.link(alias, carol).unwrap();
    store.link(alias, dave).unwrap();

    let merged = store.upsert(identity_of(&["me@x.com", "alias@x.com"])).unwrap();
    assert_eq!(merged, me);

    let me_relations = store.get(me).unwrap().relations().clone();
    assert_eq!(me_relations.len(), 2);
    assert!(me_relations.contains(&carol));
    assert!(me_relations.contains(&dave));

    let carol_relations = store.get(carol).unwrap().relations();
    assert_eq!(carol_relations.len(), 1);
    assert!(carol_relations.contains(&me));
    assert!(store.get(dave).unwrap().relations().contains(&me));
    store.validate().unwrap();
}

#[test]
fn survivor_is_the_earliest_record_so_filename_is_stable() {
    let mut store = IdentityStore::new();
    let zed = store.upsert(Identity::new(None, "zed@x.com").unwrap()).unwrap();
    let filename = store.get(zed).unwrap().filename();

    store.upsert(identity_of(&["alpha@x.com", "zed@x.com"])).unwrap();
    store.upsert(Identity::new(None, "beta@x.com").unwrap()).unwrap();
    store.upsert(identity_of(&["beta@x.com", "alpha@x.com"])).unwrap();

    let canonical = store.lookup("beta@x.com").unwrap();
    assert_eq!(canonical, zed);
    assert_eq!(store.get(canonical).unwrap().filename(), filename);
    assert_eq!(filename, "zed@x.com.html");
}

#[test]
fn link_is_symmetric_and_deduplicated() {
    let mut store = IdentityStore::new();
    let a = store.upsert(Identity::new(None, "a@x.com").unwrap()).unwrap();
    let b = store.upsert(identity_of(&["b@x.com", "b2@x.com"])).unwrap();

    assert_eq!(store.link(a, b).unwrap(), LinkOutcome::Added);
    assert_eq!(store.link(b, a).unwrap(), LinkOutcome::AlreadyLinked);

    assert!(store.get(a).unwrap().relations().contains(&b));
    assert!(store.get(b).unwrap().relations().contains(&a));
    assert_eq!(store.get(a).unwrap().relations().len(), 1);
}

#[test]
fn upsert_redraws_carried_relations_symmetrically() {
    let mut store = IdentityStore::new();
    let a = store.upsert(Identity::new(None, "a@x.com").unwrap()).unwrap();
    let b = store.upsert(Identity::new(None, "b@x.com").unwrap()).unwrap();
    store.link(a, b).unwrap();

    let mut copy = store.get(a).unwrap().clone();
    copy.add_email("a2@x.com").unwrap();
    let c = store.upsert(Identity::new(None, "c@x.com").unwrap()).unwrap();
    let merged = store.upsert(copy).unwrap();

    assert_eq!(merged, a);
    assert_eq!(store.lookup("a2@x.com"), Some(a));
    assert!(store.get(b).unwrap().relations().contains(&a));
    assert!(!store.get(c).unwrap().relations().contains(&a));
    store.validate().unwrap();
}

#[test]
fn identities_lists_only_live_records_in_creation_order() {
    let mut store = IdentityStore::new();
    store.upsert(Identity::new(None, "a@x.com").unwrap()).unwrap();
    store.upsert(Identity::new(None, "b@x.com").unwrap()).unwrap();
    store.upsert(Identity::new(None, "c@x.com").unwrap()).unwrap();
    store.upsert(identity_of(&["a@x.com", "c@x.com"])).unwrap();

    let primaries = store
        .identities()
        .map(|(_, identity)| identity.primary_email().to_string())
        .collect::<Vec<_>>();
    assert_eq!(primaries, vec!["a@x.com", "b@x.com"]);
    assert_eq!(store.address_count(), 3);
    assert!(!store.is_empty());
}
