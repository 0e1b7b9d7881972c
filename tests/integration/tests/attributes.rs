//! Attribute extraction from signed assertions.

use sp_integration_tests::fixture;
use sp_saml::{AttributeLookup, Response};

use crate::common::{idp_settings, in_window, init_tracing, load};

fn multi_value(name: &str) -> anyhow::Result<Response> {
    init_tracing();
    Ok(Response::new(
        &fixture(name)?,
        in_window().with_single_value_compatibility(false),
    )?
    .with_settings(idp_settings()))
}

fn values(items: &[Option<&str>]) -> Vec<Option<String>> {
    items.iter().map(|v| v.map(str::to_string)).collect()
}

#[test]
fn compatibility_mode_returns_first_values() -> anyhow::Result<()> {
    let attributes = load("response_signed_assertion.xml")?.attributes();
    assert!(attributes.single_value_compatibility());
    assert_eq!(attributes.get("uid"), Some(AttributeLookup::Single(Some("demo"))));
    assert_eq!(
        attributes.get("another_value"),
        Some(AttributeLookup::Single(Some("value1")))
    );
    assert_eq!(attributes.get("role").and_then(AttributeLookup::first), Some("role1"));
    assert_eq!(attributes.get("missing"), None);
    Ok(())
}

#[test]
fn multi_value_mode_returns_every_value() -> anyhow::Result<()> {
    let attributes = multi_value("response_signed_assertion.xml")?.attributes();
    assert!(!attributes.single_value_compatibility());
    assert_eq!(
        attributes.get("uid"),
        Some(AttributeLookup::Multi(&values(&[Some("demo")])))
    );
    assert_eq!(
        attributes.multi("another_value"),
        Some(values(&[Some("value1"), Some("value2")]).as_slice())
    );
    assert_eq!(
        attributes.multi("role"),
        Some(values(&[Some("role1"), Some("role2"), Some("role3")]).as_slice())
    );
    Ok(())
}

#[test]
fn nil_values_are_kept_as_none() -> anyhow::Result<()> {
    let attributes = multi_value("response_signed_assertion.xml")?.attributes();
    assert!(attributes.contains("attribute_with_nil_value"));
    assert_eq!(
        attributes.multi("attribute_with_nil_value"),
        Some(values(&[None]).as_slice())
    );
    assert_eq!(
        attributes.multi("attribute_with_nils_and_empty_strings"),
        Some(values(&[Some(""), Some("valuePresent"), None, None]).as_slice())
    );
    assert_eq!(attributes.single("attribute_with_nil_value"), None);
    Ok(())
}

#[test]
fn names_keep_document_order() -> anyhow::Result<()> {
    let attributes = load("response_signed_assertion.xml")?.attributes();
    let names: Vec<_> = attributes.names().collect();
    assert_eq!(
        names,
        [
            "uid",
            "another_value",
            "role",
            "attribute_with_nil_value",
            "attribute_with_nils_and_empty_strings",
        ]
    );
    Ok(())
}

#[test]
fn statements_are_combined() -> anyhow::Result<()> {
    let response = multi_value("response_multiple_attribute_statements.xml")?;
    response.validate()?;
    let attributes = response.attributes();
    assert_eq!(attributes.single("surname"), Some("smith"));
    assert_eq!(attributes.single("firstname"), Some("bob"));
    assert_eq!(
        attributes.multi("role"),
        Some(values(&[Some("role1"), Some("role2"), Some("role3")]).as_slice())
    );
    Ok(())
}

#[test]
fn comments_cannot_truncate_text() -> anyhow::Result<()> {
    let response = load("response_node_text_attack.xml")?;
    response.validate()?;
    assert_eq!(response.name_id().as_deref(), Some("support@onelogin.com"));
    assert_eq!(response.attributes().single("surname"), Some("smith"));
    Ok(())
}

#[test]
fn nested_value_elements_yield_their_text() -> anyhow::Result<()> {
    init_tracing();
    let response = Response::new(
        &fixture("response_signed_response.xml")?,
        in_window(),
    )?
    .with_settings(idp_settings());
    let attributes = response.attributes();
    assert_eq!(attributes.single("mail"), Some("someone@example.com"));
    assert_eq!(attributes.single("manager"), Some("boss@example.com"));
    Ok(())
}

#[test]
fn merging_overrides_and_shift_pops_in_order() -> anyhow::Result<()> {
    let attributes = load("response_signed_assertion.xml")?.attributes();
    let merged = attributes.merge([
        ("uid".to_string(), values(&[Some("override")])),
        ("department".to_string(), values(&[Some("sales")])),
    ]);
    assert_eq!(attributes.single("uid"), Some("demo"));
    assert_eq!(merged.single("uid"), Some("override"));
    assert_eq!(merged.single("department"), Some("sales"));
    assert_eq!(merged.len(), attributes.len() + 1);

    let mut popped = merged;
    let (name, first) = popped.shift().expect("non-empty");
    assert_eq!(name, "uid");
    assert_eq!(first, values(&[Some("override")]));
    assert!(!popped.contains("uid"));
    Ok(())
}

#[test]
fn rejected_responses_expose_no_attributes() -> anyhow::Result<()> {
    let response = load("response_wrapped_assertion.xml")?;
    assert!(!response.is_valid());
    assert!(response.attributes().is_empty());
    Ok(())
}
