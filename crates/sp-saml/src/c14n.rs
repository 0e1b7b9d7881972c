//! XML canonicalization of signed subtrees.
//!
//! Canonical output comes from `bergshamra-c14n`, which works on its own
//! `uppsala` tree. The source text behind a `roxmltree` node is reparsed
//! once and the element is located by its byte offset. The selected node
//! set is the element subtree without comments, the set an XML-DSig
//! same-document reference dereferences to. The enveloped-signature
//! transform removes the `ds:Signature` subtree from that set.

use bergshamra_c14n::C14nMode;
use bergshamra_xml::{uppsala, NodeId, NodeSet};
use roxmltree::Node;

use crate::error::ValidationError;

/// Canonicalization algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalizationAlgorithm {
    /// Canonical XML 1.0 (omits comments).
    Inclusive,
    /// Canonical XML 1.0 with comments.
    InclusiveWithComments,
    /// Exclusive XML Canonicalization 1.0 (omits comments).
    Exclusive,
    /// Exclusive XML Canonicalization 1.0 with comments.
    ExclusiveWithComments,
}

impl CanonicalizationAlgorithm {
    /// Returns the algorithm URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Inclusive => "http://www.w3.org/TR/2001/REC-xml-c14n-20010315",
            Self::InclusiveWithComments => {
                "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments"
            }
            Self::Exclusive => "http://www.w3.org/2001/10/xml-exc-c14n#",
            Self::ExclusiveWithComments => "http://www.w3.org/2001/10/xml-exc-c14n#WithComments",
        }
    }

    /// Parses an algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/TR/2001/REC-xml-c14n-20010315" => Some(Self::Inclusive),
            "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments" => {
                Some(Self::InclusiveWithComments)
            }
            "http://www.w3.org/2001/10/xml-exc-c14n#" => Some(Self::Exclusive),
            "http://www.w3.org/2001/10/xml-exc-c14n#WithComments" => {
                Some(Self::ExclusiveWithComments)
            }
            _ => None,
        }
    }

    const fn mode(self) -> C14nMode {
        match self {
            Self::Inclusive => C14nMode::Inclusive,
            Self::InclusiveWithComments => C14nMode::InclusiveWithComments,
            Self::Exclusive => C14nMode::Exclusive,
            Self::ExclusiveWithComments => C14nMode::ExclusiveWithComments,
        }
    }
}

/// Canonicalizes element subtrees.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    algorithm: CanonicalizationAlgorithm,
    inclusive_prefixes: Vec<String>,
    /// Source offset of the excluded element.
    exclude: Option<usize>,
}

impl Canonicalizer {
    /// Creates a canonicalizer for `algorithm`.
    #[must_use]
    pub fn new(algorithm: CanonicalizationAlgorithm) -> Self {
        Self {
            algorithm,
            inclusive_prefixes: Vec::new(),
            exclude: None,
        }
    }

    /// Sets the exclusive c14n `InclusiveNamespaces` prefix list.
    /// `#default` names the default namespace.
    #[must_use]
    pub fn with_inclusive_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.inclusive_prefixes = prefixes;
        self
    }

    /// Leaves `element` and its subtree out of the output.
    #[must_use]
    pub fn excluding(mut self, element: Node<'_, '_>) -> Self {
        self.exclude = Some(element.range().start);
        self
    }

    /// Returns the algorithm in use.
    #[must_use]
    pub fn algorithm(&self) -> CanonicalizationAlgorithm {
        self.algorithm
    }

    /// Canonicalizes `node` and its descendants.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ValidationErrorKind::SignatureInvalid`] error when
    /// the source cannot be reparsed, an element cannot be located in it, or
    /// canonicalization fails.
    pub fn canonicalize(&self, node: Node<'_, '_>) -> Result<Vec<u8>, ValidationError> {
        let doc = uppsala::parse(node.document().input_text())
            .map_err(|e| ValidationError::signature(format!("Canonicalization failed: {e}")))?;

        let root = locate(&doc, node)?;
        let mut nodes = NodeSet::tree_without_comments(root, &doc);
        if let Some(offset) = self.exclude {
            if let Some(excluded) = element_at(&doc, offset) {
                nodes.remove_id(excluded);
                for id in doc.descendants(excluded) {
                    nodes.remove_id(id);
                }
            }
        }

        bergshamra_c14n::canonicalize_doc(
            &doc,
            self.algorithm.mode(),
            Some(&nodes),
            &self.inclusive_prefixes,
        )
        .map_err(|e| ValidationError::signature(format!("Canonicalization failed: {e}")))
    }
}

fn element_at(doc: &uppsala::Document<'_>, offset: usize) -> Option<NodeId> {
    std::iter::once(doc.root())
        .chain(doc.descendants(doc.root()))
        .find(|&id| {
            doc.element(id).is_some() && doc.node_range(id).is_some_and(|r| r.start == offset)
        })
}

fn locate(doc: &uppsala::Document<'_>, node: Node<'_, '_>) -> Result<NodeId, ValidationError> {
    element_at(doc, node.range().start)
        .filter(|&id| {
            doc.element(id)
                .is_some_and(|e| e.name.local_name == node.tag_name().name())
        })
        .ok_or_else(|| {
            ValidationError::signature(format!(
                "Canonicalization failed: element {} not found",
                node.tag_name().name()
            ))
        })
}
