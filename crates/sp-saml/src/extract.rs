//! Safe text and node extraction.
//!
//! Elements are found by walking [`FixedPath`]s: static lists of
//! (namespace URI, local name) steps. A path is a `&'static` slice, so it
//! cannot be assembled from document content, and matching by namespace URI
//! makes it indifferent to whichever prefix the IdP chose (`ds:`, `dsig:`,
//! a default namespace, ...). Prefix-to-URI resolution is done by the parser
//! while it builds the tree, so lookups never consult prefixes at all.

use roxmltree::Node;

use crate::constants::{SAMLP_NS, SAML_NS, XMLDSIG_NS};

/// One step of a fixed path: an element's namespace URI and local name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// Namespace URI.
    pub namespace: &'static str,
    /// Local name.
    pub local: &'static str,
}

impl PathStep {
    /// Creates a path step.
    #[must_use]
    pub const fn new(namespace: &'static str, local: &'static str) -> Self {
        Self { namespace, local }
    }

    /// Returns true if `node` is an element with this step's expanded name.
    #[must_use]
    pub fn matches(&self, node: Node<'_, '_>) -> bool {
        node.is_element()
            && node.tag_name().name() == self.local
            && node.tag_name().namespace() == Some(self.namespace)
    }
}

/// A path of child steps, fixed at compile time.
pub type FixedPath = &'static [PathStep];

/// Returns true if `node` is the element `{namespace}local`.
#[must_use]
pub fn is_element(node: Node<'_, '_>, namespace: &str, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace() == Some(namespace)
}

/// Returns the concatenation of `node`'s direct text children.
///
/// Comments, processing instructions and nested elements are skipped, so
/// `a<!-- x -->b` yields `ab` and a value cannot be truncated or extended
/// by markup injected inside it.
#[must_use]
pub fn text_content(node: Node<'_, '_>) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

/// Returns every element reached by following `path` through child elements.
#[must_use]
pub fn find_all<'a, 'input>(root: Node<'a, 'input>, path: FixedPath) -> Vec<Node<'a, 'input>> {
    let mut current = vec![root];
    for step in path {
        current = current
            .into_iter()
            .flat_map(|n| n.children().filter(|c| step.matches(*c)))
            .collect();
        if current.is_empty() {
            break;
        }
    }
    current
}

/// Returns the first element reached by following `path`, in document order.
#[must_use]
pub fn find_first<'a, 'input>(root: Node<'a, 'input>, path: FixedPath) -> Option<Node<'a, 'input>> {
    find_all(root, path).into_iter().next()
}

/// Returns the safe text of the first element reached by `path`.
#[must_use]
pub fn find_text(root: Node<'_, '_>, path: FixedPath) -> Option<String> {
    find_first(root, path).map(text_content)
}

/// Returns an attribute of the first element reached by `path`.
#[must_use]
pub fn find_attribute<'a>(root: Node<'a, '_>, path: FixedPath, attribute: &str) -> Option<&'a str> {
    find_first(root, path).and_then(|n| n.attribute(attribute))
}

/// Fixed paths used by the validator.
pub mod paths {
    use super::{PathStep, SAMLP_NS, SAML_NS, XMLDSIG_NS};

    const fn p(local: &'static str) -> PathStep {
        PathStep::new(SAMLP_NS, local)
    }

    const fn a(local: &'static str) -> PathStep {
        PathStep::new(SAML_NS, local)
    }

    const fn ds(local: &'static str) -> PathStep {
        PathStep::new(XMLDSIG_NS, local)
    }

    /// `Status/StatusCode` relative to a Response.
    pub const STATUS_CODE: &[PathStep] = &[p("Status"), p("StatusCode")];
    /// `Status/StatusMessage` relative to a Response.
    pub const STATUS_MESSAGE: &[PathStep] = &[p("Status"), p("StatusMessage")];
    /// `Status` relative to a Response.
    pub const STATUS: &[PathStep] = &[p("Status")];
    /// `Issuer` relative to a Response or Assertion.
    pub const ISSUER: &[PathStep] = &[a("Issuer")];
    /// `Assertion` relative to a Response.
    pub const ASSERTION: &[PathStep] = &[a("Assertion")];
    /// `Subject/NameID` relative to an Assertion.
    pub const NAME_ID: &[PathStep] = &[a("Subject"), a("NameID")];
    /// `Conditions` relative to an Assertion.
    pub const CONDITIONS: &[PathStep] = &[a("Conditions")];
    /// `Conditions/AudienceRestriction` relative to an Assertion.
    pub const AUDIENCE_RESTRICTION: &[PathStep] = &[a("Conditions"), a("AudienceRestriction")];
    /// `Audience` relative to an AudienceRestriction.
    pub const AUDIENCE: &[PathStep] = &[a("Audience")];
    /// `AuthnStatement` relative to an Assertion.
    pub const AUTHN_STATEMENT: &[PathStep] = &[a("AuthnStatement")];
    /// `AttributeStatement/Attribute` relative to an Assertion.
    pub const ATTRIBUTE: &[PathStep] = &[a("AttributeStatement"), a("Attribute")];
    /// `AttributeValue` relative to an Attribute.
    pub const ATTRIBUTE_VALUE: &[PathStep] = &[a("AttributeValue")];

    /// `SignedInfo` relative to a Signature.
    pub const SIGNED_INFO: &[PathStep] = &[ds("SignedInfo")];
    /// `SignedInfo/CanonicalizationMethod` relative to a Signature.
    pub const CANONICALIZATION_METHOD: &[PathStep] =
        &[ds("SignedInfo"), ds("CanonicalizationMethod")];
    /// `SignedInfo/SignatureMethod` relative to a Signature.
    pub const SIGNATURE_METHOD: &[PathStep] = &[ds("SignedInfo"), ds("SignatureMethod")];
    /// `SignedInfo/Reference` relative to a Signature.
    pub const REFERENCE: &[PathStep] = &[ds("SignedInfo"), ds("Reference")];
    /// `Transforms/Transform` relative to a Reference.
    pub const TRANSFORM: &[PathStep] = &[ds("Transforms"), ds("Transform")];
    /// `DigestMethod` relative to a Reference.
    pub const DIGEST_METHOD: &[PathStep] = &[ds("DigestMethod")];
    /// `DigestValue` relative to a Reference.
    pub const DIGEST_VALUE: &[PathStep] = &[ds("DigestValue")];
    /// `SignatureValue` relative to a Signature.
    pub const SIGNATURE_VALUE: &[PathStep] = &[ds("SignatureValue")];
    /// `KeyInfo/X509Data/X509Certificate` relative to a Signature.
    pub const X509_CERTIFICATE: &[PathStep] =
        &[ds("KeyInfo"), ds("X509Data"), ds("X509Certificate")];
}
