//! Placeholder token substitution
//!
//! Template files embed fixed prototype identifiers (`rfPrototypeCtrl`,
//! `CustomerPortal`, ...) that are renamed per application. A [`TokenMap`]
//! holds the ordered `(token, replacement)` pairs; compiling it yields a
//! [`Substitution`] that rewrites content in a single left-to-right pass, so
//! text produced by one replacement is never searched again.

use crate::error::{ReactforceError, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How tokens are located inside template content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Match only whole identifiers (`\b` on both sides)
    #[default]
    Identifier,
    /// Match any occurrence, including inside longer words
    Literal,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identifier" | "word" => Ok(MatchMode::Identifier),
            "literal" | "substring" => Ok(MatchMode::Literal),
            other => Err(format!(
                "unknown match mode '{other}' (expected identifier or literal)"
            )),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Identifier => f.write_str("identifier"),
            MatchMode::Literal => f.write_str("literal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub token: String,
    pub replacement: String,
}

/// Ordered mapping from prototype token to its replacement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenMap {
    pairs: Vec<TokenPair>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair. A token already present keeps its first replacement.
    pub fn with(mut self, token: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.push(token, replacement);
        self
    }

    pub fn push(&mut self, token: impl Into<String>, replacement: impl Into<String>) {
        let token = token.into();
        if self.pairs.iter().any(|p| p.token == token) {
            return;
        }
        self.pairs.push(TokenPair {
            token,
            replacement: replacement.into(),
        });
    }

    pub fn pairs(&self) -> &[TokenPair] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Replacement registered for `token`, if any
    pub fn get(&self, token: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.token == token)
            .map(|p| p.replacement.as_str())
    }

    pub fn compile(&self, mode: MatchMode) -> Result<Substitution> {
        if self.pairs.is_empty() {
            return Ok(Substitution {
                matcher: None,
                replacements: HashMap::new(),
            });
        }

        for pair in &self.pairs {
            validate_token(&pair.token, mode)?;
        }

        // Longer tokens first so a token that prefixes another cannot shadow
        // it; the sort is stable, so equal lengths keep their given order.
        let mut ordered: Vec<&TokenPair> = self.pairs.iter().collect();
        ordered.sort_by(|a, b| b.token.len().cmp(&a.token.len()));

        let alternation = ordered
            .iter()
            .map(|p| regex::escape(&p.token))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = match mode {
            MatchMode::Identifier => format!(r"\b(?:{alternation})\b"),
            MatchMode::Literal => format!("(?:{alternation})"),
        };
        let matcher = Regex::new(&pattern)
            .map_err(|e| ReactforceError::Manifest(format!("token pattern rejected: {e}")))?;

        let replacements = self
            .pairs
            .iter()
            .map(|p| (p.token.clone(), p.replacement.clone()))
            .collect();

        Ok(Substitution {
            matcher: Some(matcher),
            replacements,
        })
    }

    /// Compile and apply in one step
    pub fn apply(&self, content: &str, mode: MatchMode) -> Result<String> {
        Ok(self.compile(mode)?.apply(content).into_owned())
    }
}

fn validate_token(token: &str, mode: MatchMode) -> Result<()> {
    if token.is_empty() {
        return Err(ReactforceError::Manifest("empty placeholder token".to_string()));
    }
    if mode == MatchMode::Identifier {
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        let edges_are_word = token.chars().next().is_some_and(is_word)
            && token.chars().last().is_some_and(is_word);
        if !edges_are_word {
            return Err(ReactforceError::Manifest(format!(
                "token '{token}' cannot be matched as an identifier"
            )));
        }
    }
    Ok(())
}

/// A compiled token map
#[derive(Debug, Clone)]
pub struct Substitution {
    matcher: Option<Regex>,
    replacements: HashMap<String, String>,
}

impl Substitution {
    pub fn apply<'a>(&self, content: &'a str) -> Cow<'a, str> {
        let Some(matcher) = &self.matcher else {
            return Cow::Borrowed(content);
        };
        matcher.replace_all(content, |caps: &Captures| {
            let matched = &caps[0];
            self.replacements
                .get(matched)
                .cloned()
                .unwrap_or_else(|| matched.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_every_occurrence() {
        let tokens = TokenMap::new().with("rfPrototypeCtrl", "AcmeCtrl");
        let out = tokens
            .apply(
                "public class rfPrototypeCtrl { rfPrototypeCtrl() {} }",
                MatchMode::Identifier,
            )
            .unwrap();
        assert_eq!(out, "public class AcmeCtrl { AcmeCtrl() {} }");
    }

    #[test]
    fn test_identifier_mode_skips_partial_words() {
        let tokens = TokenMap::new().with("CustomerPortal", "Acme");
        let content = "$Resource.CustomerPortal CustomerPortalLegacy";

        let bounded = tokens.apply(content, MatchMode::Identifier).unwrap();
        assert_eq!(bounded, "$Resource.Acme CustomerPortalLegacy");

        let literal = tokens.apply(content, MatchMode::Literal).unwrap();
        assert_eq!(literal, "$Resource.Acme AcmeLegacy");
    }

    #[test]
    fn test_replacement_is_not_rescanned() {
        // A sequential replace would turn "X" into "XY" and then "XY" into "oops".
        let tokens = TokenMap::new().with("X", "XY").with("XY", "oops");
        assert_eq!(tokens.apply("a X b", MatchMode::Identifier).unwrap(), "a XY b");
        assert_eq!(tokens.apply("XX", MatchMode::Literal).unwrap(), "XYXY");
    }

    #[test]
    fn test_longer_token_wins_over_prefix() {
        let tokens = TokenMap::new()
            .with("rfPrototypeLtg", "AcmeLtg")
            .with("rfPrototypeLtgCtrl", "AcmeLtgCtrl");
        let out = tokens
            .apply(
                r#"<aura:component controller="rfPrototypeLtgCtrl"> c:rfPrototypeLtg"#,
                MatchMode::Literal,
            )
            .unwrap();
        assert_eq!(out, r#"<aura:component controller="AcmeLtgCtrl"> c:AcmeLtg"#);
    }

    #[test]
    fn test_duplicate_token_keeps_first_replacement() {
        let tokens = TokenMap::new().with("Tok", "First").with("Tok", "Second");
        assert_eq!(tokens.pairs().len(), 1);
        assert_eq!(tokens.get("Tok"), Some("First"));
    }

    #[test]
    fn test_empty_map_leaves_content_untouched() {
        let sub = TokenMap::new().compile(MatchMode::Identifier).unwrap();
        assert!(matches!(sub.apply("unchanged"), Cow::Borrowed("unchanged")));
    }

    #[test]
    fn test_rejects_tokens_that_cannot_be_bounded() {
        assert!(TokenMap::new().with("", "x").compile(MatchMode::Literal).is_err());
        assert!(TokenMap::new()
            .with("-dash", "x")
            .compile(MatchMode::Identifier)
            .is_err());
        assert!(TokenMap::new()
            .with("-dash", "x")
            .compile(MatchMode::Literal)
            .is_ok());
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let tokens = TokenMap::new().with("a.b", "ok");
        assert_eq!(tokens.apply("a.b axb", MatchMode::Identifier).unwrap(), "ok axb");
    }

    #[test]
    fn test_match_mode_parsing() {
        assert_eq!("literal".parse::<MatchMode>().unwrap(), MatchMode::Literal);
        assert_eq!("Identifier".parse::<MatchMode>().unwrap(), MatchMode::Identifier);
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }
}
