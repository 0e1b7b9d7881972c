//! Signed-assertion location.
//!
//! Every `ds:Signature` in the document is accounted for. A signature takes
//! part only when it is enveloped in the single element its `#id` reference
//! names, and that element is either the `Response` root or an `Assertion`
//! directly under it. Anything else (detached references, duplicated IDs,
//! signatures moved into a wrapper element) makes the document ambiguous
//! rather than being skipped, so an attacker cannot add an element the
//! locator would quietly pass over.

use roxmltree::Node;
use tracing::debug;

use crate::constants::{SAMLP_NS, SAML_NS, XMLDSIG_NS};
use crate::document::SamlDocument;
use crate::error::ValidationError;
use crate::extract::{find_all, is_element, paths};

/// What a participating signature covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScope {
    /// The whole `Response`.
    Response,
    /// One `Assertion` directly under the `Response`.
    Assertion,
}

/// A signature together with the element it is enveloped in and references.
#[derive(Debug, Clone, Copy)]
pub struct SignedElement<'a, 'input> {
    /// The `ds:Signature` element.
    pub signature: Node<'a, 'input>,
    /// The referenced element, the signature's parent.
    pub element: Node<'a, 'input>,
    /// Whether the element is the Response or an Assertion.
    pub scope: SignatureScope,
}

/// The authoritative assertion and the signatures that vouch for it.
#[derive(Debug, Clone)]
pub struct SignedAssertion<'a, 'input> {
    /// The `Response` root.
    pub response: Node<'a, 'input>,
    /// The assertion identity data may be read from.
    pub assertion: Node<'a, 'input>,
    /// All participating signatures, in document order.
    pub signatures: Vec<SignedElement<'a, 'input>>,
}

impl SignedAssertion<'_, '_> {
    /// Returns true if a signature covers the whole Response.
    #[must_use]
    pub fn response_signed(&self) -> bool {
        self.signatures
            .iter()
            .any(|s| s.scope == SignatureScope::Response)
    }
}

const NO_SIGNED_ASSERTION: &str = "No signed assertion found";

fn ambiguous(reason: &str) -> ValidationError {
    debug!(reason, "rejecting signature layout");
    ValidationError::structure(format!("Ambiguous signature reference: {reason}"))
}

/// Finds the assertion covered by the document's signatures.
///
/// This is purely structural: digests and signature values are checked
/// afterwards by [`super::verifier`].
///
/// # Errors
///
/// Returns a [`crate::ValidationErrorKind::Structure`] error if the root is
/// not a Response, the document is unsigned, or the signature layout is
/// ambiguous.
pub fn locate<'a, 'input>(
    doc: &'a SamlDocument<'input>,
) -> Result<SignedAssertion<'a, 'input>, ValidationError> {
    let response = doc.root();
    if !is_element(response, SAMLP_NS, "Response") {
        return Err(ValidationError::structure("Missing Response element"));
    }

    let signatures: Vec<Node<'a, 'input>> = doc
        .tree()
        .descendants()
        .filter(|n| is_element(*n, XMLDSIG_NS, "Signature"))
        .collect();
    if signatures.is_empty() {
        return Err(ValidationError::structure(NO_SIGNED_ASSERTION));
    }

    let mut signed: Vec<SignedElement<'a, 'input>> = Vec::with_capacity(signatures.len());
    for signature in signatures {
        let entry = classify(doc, response, signature)?;
        if signed.iter().any(|s| s.element.id() == entry.element.id()) {
            return Err(ambiguous("element signed more than once"));
        }
        signed.push(entry);
    }

    let mut signed_assertions = signed
        .iter()
        .filter(|s| s.scope == SignatureScope::Assertion)
        .map(|s| s.element);
    let assertion = match (signed_assertions.next(), signed_assertions.next()) {
        (Some(assertion), None) => assertion,
        (Some(_), Some(_)) => return Err(ambiguous("more than one signed assertion")),
        (None, _) => {
            let mut assertions = find_all(response, paths::ASSERTION);
            match assertions.len() {
                0 => return Err(ValidationError::structure(NO_SIGNED_ASSERTION)),
                1 => assertions.remove(0),
                _ => return Err(ambiguous("signed response holds several assertions")),
            }
        }
    };

    debug!(
        assertion_id = assertion.attribute("ID").unwrap_or_default(),
        signatures = signed.len(),
        "located signed assertion"
    );

    Ok(SignedAssertion {
        response,
        assertion,
        signatures: signed,
    })
}

fn classify<'a, 'input>(
    doc: &'a SamlDocument<'input>,
    response: Node<'a, 'input>,
    signature: Node<'a, 'input>,
) -> Result<SignedElement<'a, 'input>, ValidationError> {
    let references = find_all(signature, paths::REFERENCE);
    if references.len() != 1 {
        return Err(ambiguous("signature must carry exactly one reference"));
    }

    let id = references[0]
        .attribute("URI")
        .and_then(|uri| uri.strip_prefix('#'))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ambiguous("reference URI is not a same-document ID"))?;

    let mut targets = doc.elements_with_id(id);
    if targets.len() != 1 {
        return Err(ambiguous("reference target is not unique"));
    }
    let element = targets.remove(0);

    if signature.parent_element().map(|p| p.id()) != Some(element.id()) {
        return Err(ambiguous("signature is not enveloped in its referenced element"));
    }

    let scope = if element.id() == response.id() {
        SignatureScope::Response
    } else if is_element(element, SAML_NS, "Assertion")
        && element.parent_element().map(|p| p.id()) == Some(response.id())
    {
        SignatureScope::Assertion
    } else {
        return Err(ambiguous("signed element is neither the response nor a top-level assertion"));
    };

    Ok(SignedElement {
        signature,
        element,
        scope,
    })
}
