use mailfolk_core::{AddressPair, Identity, IdentityError, NameSource};
use std::collections::BTreeSet;

fn emails(identity: &Identity) -> Vec<&str> {
    identity.emails().iter().map(String::as_str).collect()
}

fn identity_of(addresses: &[&str]) -> Identity {
    let mut identity = Identity::new(None, addresses[0]).unwrap();
    for address in &addresses[1..] {
        identity.add_email(address).unwrap();
    }
    identity
}

#[test]
fn new_normalizes_address_and_derives_name() {
    let identity = Identity::new(None, "  Foo@Example.COM ").unwrap();

    assert_eq!(identity.primary_email(), "foo@example.com");
    assert_eq!(emails(&identity), vec!["foo@example.com"]);
    assert_eq!(identity.name(), "foo");
    assert_eq!(identity.name_source(), NameSource::LocalPart);
    assert!(identity.relations().is_empty());
    assert!(identity.owns("FOO@example.com"));
}

#[test]
fn new_keeps_header_name() {
    let identity = Identity::new(Some("Alice Liddell"), "alice@x.com").unwrap();
    assert_eq!(identity.name(), "Alice Liddell");
    assert_eq!(identity.name_source(), NameSource::Header);
}

#[test]
fn new_rejects_empty_address() {
    assert_eq!(
        Identity::new(Some("Ghost"), "").unwrap_err(),
        IdentityError::EmptyAddress
    );
    let mut identity = Identity::new(None, "a@x.com").unwrap();
    assert_eq!(identity.add_email("  ").unwrap_err(), IdentityError::EmptyAddress);
}

#[test]
fn from_pair_matches_new() {
    let pair = AddressPair::new(Some("Bob"), "BOB@x.com").unwrap();
    assert_eq!(
        Identity::from_pair(&pair),
        Identity::new(Some("Bob"), "bob@x.com").unwrap()
    );
}

#[test]
fn filename_uses_primary_email() {
    let mut identity = Identity::new(None, "zed@x.com").unwrap();
    identity.add_email("alpha@x.com").unwrap();

    assert_eq!(identity.filename(), "zed@x.com.html");
}

#[test]
fn merge_with_itself_is_identity() {
    let identity = identity_of(&["a@x.com", "b@x.com"]);
    assert_eq!(identity.clone().merge(identity.clone()), identity);
}

#[test]
fn merge_is_associative_and_commutative_over_emails() {
    let a = identity_of(&["e1@x.com"]);
    let b = identity_of(&["e1@x.com", "e2@x.com"]);
    let c = identity_of(&["e2@x.com", "e3@x.com"]);
    let expected = BTreeSet::from([
        "e1@x.com".to_string(),
        "e2@x.com".to_string(),
        "e3@x.com".to_string(),
    ]);

    let left = a.clone().merge(b.clone()).merge(c.clone());
    let right = a.clone().merge(b.clone().merge(c.clone()));
    let swapped = c.merge(a).merge(b);

    assert_eq!(left.emails(), &expected);
    assert_eq!(right.emails(), &expected);
    assert_eq!(swapped.emails(), &expected);
    assert_eq!(left, right);
}

#[test]
fn merge_keeps_left_primary_email() {
    let merged = identity_of(&["late@x.com"]).merge(identity_of(&["early@x.com"]));
    assert_eq!(merged.primary_email(), "late@x.com");
    assert_eq!(merged.filename(), "late@x.com.html");
}

#[test]
fn merge_replaces_placeholder_name_with_header_name() {
    let placeholder = Identity::new(None, "carol@x.com").unwrap();
    let named = Identity::new(Some("Carol"), "carol@x.com").unwrap();

    let merged = placeholder.merge(named.clone());
    assert_eq!(merged.name(), "Carol");

    let kept = named.merge(Identity::new(Some("C. Someone"), "carol@x.com").unwrap());
    assert_eq!(kept.name(), "Carol");
}
