//! IRIs of the vocabulary terms the ownership proof relies on.

/// Solid terms namespace.
pub const SOLID: &str = "http://www.w3.org/ns/solid/terms#";

/// Predicate marking the registration token inside a WebID profile.
pub const OIDC_ISSUER_REGISTRATION_TOKEN: &str =
    "http://www.w3.org/ns/solid/terms#oidcIssuerRegistrationToken";

pub(crate) const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

pub(crate) const TEXT_TURTLE: &str = "text/turtle";
pub(crate) const APPLICATION_N_TRIPLES: &str = "application/n-triples";
