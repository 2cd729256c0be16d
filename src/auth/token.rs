use crate::wcs::error::WcsError;
use crate::wcs::xml::{walk, XmlNode};
use std::fmt;

const DOCUMENT: &str = "GetAPIKey reply";

/// Opaque access token, inserted in every data request URL.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Token(token.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(*** {} chars)", self.0.len())
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::new(value)
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::new(value)
    }
}

/// Extracts the token from a reply such as
/// `<Token xmlns="http://ws.apache.org/ns/synapse">__abc__</Token>`.
pub fn parse_token_response(xml: &str) -> Result<Token, WcsError> {
    let mut token = None;
    walk(xml, DOCUMENT, |node| {
        if let XmlNode::Text { path, text } = node {
            if path.len() == 1 && token.is_none() {
                token = Some(text);
            }
        }
    })?;
    token
        .filter(|t| !t.is_empty())
        .map(Token::new)
        .ok_or(WcsError::MissingElement {
            document: DOCUMENT,
            element: "Token",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <Token xmlns="http://ws.apache.org/ns/synapse">__Sk9ZRTEyMw==__</Token>"#;
        assert_eq!(
            parse_token_response(xml).unwrap().as_str(),
            "__Sk9ZRTEyMw==__"
        );
    }

    #[test]
    fn test_empty_token_is_missing() {
        let err = parse_token_response("<Token/>").unwrap_err();
        assert!(matches!(err, WcsError::MissingElement { element: "Token", .. }));
    }

    #[test]
    fn test_debug_hides_token() {
        let token = Token::new("__secret__");
        assert!(!format!("{token:?}").contains("secret"));
    }
}
