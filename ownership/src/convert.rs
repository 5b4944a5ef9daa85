//! Conversion of RDF documents into [`Statement`]s.
//!
//! Supported serializations:
//! - **Turtle** (`text/turtle`), with relative IRIs resolved against the
//!   document location
//! - **N-Triples** (`application/n-triples`)

use sophia_api::parser::TripleParser;
use sophia_api::source::TripleSource;
use sophia_api::term::{Term as RdfTerm, TermKind};
use sophia_api::triple::Triple;
use sophia_iri::Iri;
use sophia_turtle::parser::nt::NTriplesParser;
use sophia_turtle::parser::turtle::TurtleParser;

use crate::error::ConvertError;
use crate::model::{Statement, Term};
use crate::vocab;

/// Turns a document body into the statements it asserts.
pub trait StatementConverter: Send + Sync {
    /// Parses `body` as `media_type` (lowercased, without parameters).
    /// Relative references resolve against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if the media type is unsupported or the body
    /// does not parse.
    fn convert(
        &self,
        body: &[u8],
        media_type: &str,
        base: &str,
    ) -> Result<Vec<Statement>, ConvertError>;
}

/// Turtle and N-Triples converter built on `sophia_turtle`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RdfConverter;

impl StatementConverter for RdfConverter {
    fn convert(
        &self,
        body: &[u8],
        media_type: &str,
        base: &str,
    ) -> Result<Vec<Statement>, ConvertError> {
        let text = std::str::from_utf8(body)?;
        match media_type {
            vocab::TEXT_TURTLE => {
                let base = Iri::new(base.to_owned())
                    .map_err(|_| ConvertError::InvalidBase(base.to_owned()))?;
                let parser = TurtleParser { base: Some(base) };
                collect(parser.parse_str(text))
            }
            vocab::APPLICATION_N_TRIPLES => collect(NTriplesParser {}.parse_str(text)),
            other => Err(ConvertError::UnsupportedContentType(other.to_owned())),
        }
    }
}

fn collect<S: TripleSource>(mut source: S) -> Result<Vec<Statement>, ConvertError> {
    let mut statements = Vec::new();
    source
        .for_each_triple(|t| {
            if let (Some(s), Some(p), Some(o)) = (term(t.s()), term(t.p()), term(t.o())) {
                statements.push(Statement::new(s, p, o));
            }
        })
        .map_err(|e| ConvertError::Syntax(e.to_string()))?;
    Ok(statements)
}

/// Maps a parsed term onto [`Term`]; RDF-star and variables have no counterpart.
fn term<T: RdfTerm>(t: T) -> Option<Term> {
    match t.kind() {
        TermKind::Iri => t.iri().map(|iri| Term::iri(iri.as_str())),
        TermKind::BlankNode => t.bnode_id().map(|id| Term::BlankNode(id.as_str().to_owned())),
        TermKind::Literal => {
            let lexical = t.lexical_form()?;
            let value = String::from(&*lexical);
            if let Some(tag) = t.language_tag() {
                return Some(Term::lang(value, tag.as_str()));
            }
            match t.datatype() {
                Some(datatype) => Some(Term::typed(value, datatype.as_str())),
                None => Some(Term::string(value)),
            }
        }
        _ => None,
    }
}
