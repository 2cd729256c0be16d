//! Namespace-agnostic walk over the XML documents returned by the service.
//!
//! Every WCS reply is small, so parsers are written as visitors over a stream of
//! opened elements and text nodes, each carrying the path of local names from the
//! document root.

use crate::wcs::error::WcsError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub(crate) enum XmlNode<'p> {
    Open {
        path: &'p [String],
        attributes: Vec<(String, String)>,
    },
    Text {
        path: &'p [String],
        text: String,
    },
}

pub(crate) fn walk<F>(xml: &str, document: &'static str, mut visit: F) -> Result<(), WcsError>
where
    F: FnMut(XmlNode<'_>),
{
    let parse_err = |source: quick_xml::Error| WcsError::XmlParse { document, source };

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut path: Vec<String> = Vec::new();
    loop {
        match reader.read_event().map_err(parse_err)? {
            Event::Start(e) => {
                let attributes = read_attributes(&e).map_err(parse_err)?;
                path.push(local_name(&e));
                visit(XmlNode::Open {
                    path: &path,
                    attributes,
                });
            }
            Event::Empty(e) => {
                let attributes = read_attributes(&e).map_err(parse_err)?;
                path.push(local_name(&e));
                visit(XmlNode::Open {
                    path: &path,
                    attributes,
                });
                path.pop();
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(parse_err)?;
                let text = text.trim();
                if !text.is_empty() {
                    visit(XmlNode::Text {
                        path: &path,
                        text: text.to_string(),
                    });
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).trim().to_string();
                if !text.is_empty() {
                    visit(XmlNode::Text { path: &path, text });
                }
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn read_attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, quick_xml::Error> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

pub(crate) fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

pub(crate) fn ends_with(path: &[String], name: &str) -> bool {
    path.last().is_some_and(|last| last == name)
}

/// `(exceptionCode, ExceptionText)` if `xml` is an OWS exception report.
pub(crate) fn exception_report(xml: &str) -> Option<(String, String)> {
    let mut is_report = false;
    let mut code = String::new();
    let mut texts = Vec::new();
    walk(xml, "exception report", |node| match node {
        XmlNode::Open { path, attributes } => {
            if path.len() == 1 && ends_with(path, "ExceptionReport") {
                is_report = true;
            }
            if ends_with(path, "Exception") && code.is_empty() {
                code = attribute(&attributes, "exceptionCode")
                    .unwrap_or_default()
                    .to_string();
            }
        }
        XmlNode::Text { path, text } => {
            if ends_with(path, "ExceptionText") {
                texts.push(text);
            }
        }
    })
    .ok()?;
    is_report.then(|| (code, texts.join(" ")))
}
