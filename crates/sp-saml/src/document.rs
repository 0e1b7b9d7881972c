//! Payload decoding and XML parsing.
//!
//! A Response arrives either Base64-encoded (the HTTP-POST binding form
//! field) or as raw XML. [`decode_payload`] settles which one it is once, at
//! construction time; [`SamlDocument::parse`] turns the resulting text into a
//! read-only tree whenever a caller needs it.

use base64::Engine;
use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{SamlError, SamlResult};

/// Upper bound on nodes in a single Response.
const MAX_NODES: u32 = 100_000;

/// Decodes a transport payload into XML text.
///
/// The payload is first treated as Base64 (embedded whitespace ignored, as
/// IdPs line-wrap the form value). If that fails, or the decoded bytes are
/// not well-formed UTF-8 XML, the payload itself is returned unchanged.
#[must_use]
pub fn decode_payload(payload: &str) -> String {
    decode_base64_xml(payload).unwrap_or_else(|| payload.to_string())
}

fn decode_base64_xml(payload: &str) -> Option<String> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .ok()?;
    let xml = String::from_utf8(bytes).ok()?;
    parse_xml(&xml).ok()?;
    Some(xml)
}

fn parse_xml(xml: &str) -> Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: false,
        nodes_limit: MAX_NODES,
    };
    Document::parse_with_options(xml, options)
}

/// A parsed SAML document.
///
/// Borrows the XML text it was parsed from and is never mutated.
#[derive(Debug)]
pub struct SamlDocument<'input> {
    doc: Document<'input>,
}

impl<'input> SamlDocument<'input> {
    /// Parses XML text. DTDs are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::XmlParse`] if the text is not well-formed XML.
    pub fn parse(xml: &'input str) -> SamlResult<Self> {
        if xml.trim().is_empty() {
            return Err(SamlError::XmlParse("empty document".to_string()));
        }
        let doc = parse_xml(xml)?;
        Ok(Self { doc })
    }

    /// Returns the underlying tree.
    #[must_use]
    pub fn tree(&self) -> &Document<'input> {
        &self.doc
    }

    /// Returns the document element.
    #[must_use]
    pub fn root(&self) -> Node<'_, 'input> {
        self.doc.root_element()
    }

    /// Returns every element whose `ID` attribute equals `id`.
    #[must_use]
    pub fn elements_with_id<'a>(&'a self, id: &str) -> Vec<Node<'a, 'input>> {
        self.doc
            .descendants()
            .filter(|n| n.is_element() && n.attribute("ID") == Some(id))
            .collect()
    }
}
