//! Identity references, RDF terms and statements.

use std::fmt;

use reqwest::Url;

use crate::vocab;

/// An absolute HTTP(S) IRI naming a profile document and the agent it describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WebId {
    iri: Url,
}

/// Reasons an identity reference is rejected.
#[derive(Debug, thiserror::Error)]
pub enum WebIdError {
    /// The reference is relative or syntactically invalid.
    #[error("`{reference}` is not an absolute IRI: {reason}")]
    Invalid {
        /// The rejected reference.
        reference: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// The IRI cannot be dereferenced over HTTP.
    #[error("`{0}` must use the http or https scheme")]
    UnsupportedScheme(String),
}

impl WebId {
    /// Parses an identity reference.
    ///
    /// # Errors
    ///
    /// Returns [`WebIdError`] if `reference` is relative, malformed, or not
    /// an `http`/`https` IRI.
    pub fn parse(reference: &str) -> Result<Self, WebIdError> {
        let iri = Url::parse(reference).map_err(|e| WebIdError::Invalid {
            reference: reference.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(iri.scheme(), "http" | "https") {
            return Err(WebIdError::UnsupportedScheme(reference.to_owned()));
        }
        Ok(Self { iri })
    }

    /// The IRI as a string. Also the key under which its challenge is stored.
    pub fn as_str(&self) -> &str {
        self.iri.as_str()
    }

    /// The profile document location: the WebID without its fragment.
    pub fn document_url(&self) -> Url {
        let mut url = self.iri.clone();
        url.set_fragment(None);
        url
    }
}

impl fmt::Display for WebId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WebId {
    type Err = WebIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An RDF term as it appears in a parsed statement.
///
/// Literals typed `xsd:string` are stored without a datatype, so a simple
/// literal and its explicitly typed form compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// An absolute IRI.
    Iri(String),
    /// A literal value.
    Literal {
        /// Lexical form.
        value: String,
        /// Datatype IRI, absent for plain strings and language-tagged literals.
        datatype: Option<String>,
        /// Language tag, lowercased.
        language: Option<String>,
    },
    /// A blank node, identified by its document-local label.
    BlankNode(String),
}

impl Term {
    /// An IRI term.
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// A plain string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// A typed literal; `xsd:string` collapses to a plain string.
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        Term::Literal {
            value: value.into(),
            datatype: (datatype != vocab::XSD_STRING).then_some(datatype),
            language: None,
        }
    }

    /// A language-tagged literal.
    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: Some(language.into().to_ascii_lowercase()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(id) => write!(f, "_:{id}"),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                f.write_str("\"")?;
                for c in value.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")?;
                if let Some(language) = language {
                    write!(f, "@{language}")?;
                } else if let Some(datatype) = datatype {
                    write!(f, "^^<{datatype}>")?;
                }
                Ok(())
            }
        }
    }
}

/// A subject-predicate-object triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    /// Subject term.
    pub subject: Term,
    /// Predicate term.
    pub predicate: Term,
    /// Object term.
    pub object: Term,
}

impl Statement {
    /// Builds a statement from its three terms.
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// The statement that proves `webid` owns `token`.
    pub fn ownership_proof(webid: &WebId, token: &str) -> Self {
        Self::new(
            Term::iri(webid.as_str()),
            Term::iri(vocab::OIDC_ISSUER_REGISTRATION_TOKEN),
            Term::string(token),
        )
    }

    /// The statement as a single Turtle/N-Triples line, terminated by `.`.
    pub fn to_line(&self) -> String {
        format!("{self}.")
    }
}

/// Renders `<s> <p> o` without the terminating dot.
impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}
