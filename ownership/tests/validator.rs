//! End-to-end behaviour of the token ownership validator against mock
//! collaborators.

use std::sync::Arc;
use std::time::Duration;

use webid_ownership::{
    ExpiringStore, FetchedDocument, FileStore, MemoryStore, PendingReason, RdfConverter,
    TokenGenerator, TokenOwnershipValidator, ValidatorConfig, WebId,
};
use webid_ownership_test_helpers::{
    CountingStore, FixedTokens, MockFetcher, Response, SequenceTokens, YieldingStore,
};

const WEBID: &str = "http://alice.test.com/#me";
const DOCUMENT: &str = "http://alice.test.com/";
const TOKEN: &str = "randomlyGeneratedToken";
const PREDICATE: &str = "http://www.w3.org/ns/solid/terms#oidcIssuerRegistrationToken";

fn token_line(token: &str) -> String {
    format!("<{WEBID}> <{PREDICATE}> \"{token}\".")
}

fn webid() -> WebId {
    WebId::parse(WEBID).unwrap()
}

struct Fixture<G: TokenGenerator> {
    validator: TokenOwnershipValidator<
        RdfConverter,
        Arc<CountingStore<MemoryStore>>,
        Arc<MockFetcher>,
        G,
    >,
    store: Arc<CountingStore<MemoryStore>>,
    fetcher: Arc<MockFetcher>,
}

fn fixture<G: TokenGenerator>(tokens: G) -> Fixture<G> {
    let store = Arc::new(CountingStore::new(MemoryStore::new()));
    let fetcher = Arc::new(MockFetcher::new());
    let validator = TokenOwnershipValidator::with_tokens(
        RdfConverter,
        store.clone(),
        fetcher.clone(),
        tokens,
        ValidatorConfig::default(),
    );
    Fixture {
        validator,
        store,
        fetcher,
    }
}

fn fixed() -> Fixture<FixedTokens> {
    fixture(FixedTokens::new(TOKEN))
}

fn reason(err: &webid_ownership::OwnershipError) -> &PendingReason {
    &err.pending().unwrap().reason
}

#[tokio::test]
async fn errors_if_no_token_is_stored() {
    let f = fixed();
    // The profile already holds the statement, but no challenge exists yet.
    f.fetcher.serve_turtle(DOCUMENT, token_line(TOKEN));

    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(err.to_string(), token_line(TOKEN));
    assert!(matches!(reason(&err), PendingReason::Issued));
    assert_eq!(f.fetcher.request_count(), 0);
    assert_eq!(f.store.inner().get(WEBID).await.unwrap().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn errors_if_the_expected_triple_is_missing() {
    let f = fixed();
    f.fetcher.serve_turtle(DOCUMENT, "");

    let first = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(f.fetcher.request_count(), 0);

    let second = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(f.fetcher.request_count(), 1);
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(second.to_string(), token_line(TOKEN));
    assert!(matches!(reason(&second), PendingReason::StatementMissing));
}

#[tokio::test]
async fn resolves_if_the_webid_contains_the_verification_triple() {
    let f = fixed();
    f.fetcher.serve_turtle(DOCUMENT, token_line(TOKEN));

    f.validator.validate(&webid()).await.unwrap_err();
    f.validator.validate(&webid()).await.unwrap();

    assert_eq!(f.fetcher.requests(), vec![DOCUMENT.to_owned()]);
    assert_eq!(f.store.calls().delete, 1);
    assert_eq!(f.store.inner().get(WEBID).await.unwrap(), None);
}

#[tokio::test]
async fn fails_if_the_webid_contains_the_wrong_verification_triple() {
    let f = fixed();
    f.fetcher
        .serve_turtle(DOCUMENT, format!("<{WEBID}> <{PREDICATE}> \"wrongToken\" ."));

    f.validator.validate(&webid()).await.unwrap_err();
    let err = f.validator.validate(&webid()).await.unwrap_err();

    assert_eq!(err.to_string(), token_line(TOKEN));
    assert!(matches!(reason(&err), PendingReason::StatementMissing));
    assert_eq!(f.store.calls().delete, 0);
    assert_eq!(f.store.inner().get(WEBID).await.unwrap().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn success_consumes_the_challenge() {
    let f = fixture(SequenceTokens::new("tok"));

    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(err.to_string(), token_line("tok-0"));

    f.fetcher.serve_turtle(DOCUMENT, token_line("tok-0"));
    f.validator.validate(&webid()).await.unwrap();

    // The old statement is still published, but it no longer proves anything.
    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(err.to_string(), token_line("tok-1"));
    assert!(matches!(reason(&err), PendingReason::Issued));
    assert_eq!(f.fetcher.request_count(), 1);

    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(err.to_string(), token_line("tok-1"));
    assert!(matches!(reason(&err), PendingReason::StatementMissing));
}

#[tokio::test]
async fn accepts_relative_iris_in_turtle_profiles() {
    let f = fixed();
    f.fetcher.serve_turtle(
        DOCUMENT,
        format!(
            "@prefix solid: <http://www.w3.org/ns/solid/terms#> .\n\
             @prefix foaf: <http://xmlns.com/foaf/0.1/> .\n\
             <#me> a foaf:Person ;\n    solid:oidcIssuerRegistrationToken \"{TOKEN}\" .\n"
        ),
    );

    f.validator.validate(&webid()).await.unwrap_err();
    f.validator.validate(&webid()).await.unwrap();
}

#[tokio::test]
async fn accepts_ntriples_profiles() {
    let f = fixed();
    f.fetcher.respond(
        DOCUMENT,
        Response::Document(FetchedDocument::ok(
            format!("<{WEBID}> <{PREDICATE}> \"{TOKEN}\" .\n"),
            "application/n-triples",
        )),
    );

    f.validator.validate(&webid()).await.unwrap_err();
    f.validator.validate(&webid()).await.unwrap();
}

#[tokio::test]
async fn language_tagged_token_does_not_match() {
    let f = fixed();
    f.fetcher
        .serve_turtle(DOCUMENT, format!("<{WEBID}> <{PREDICATE}> \"{TOKEN}\"@en ."));

    f.validator.validate(&webid()).await.unwrap_err();
    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert!(matches!(reason(&err), PendingReason::StatementMissing));
}

#[tokio::test]
async fn error_status_is_transport_failure() {
    let f = fixed();
    f.fetcher.respond(
        DOCUMENT,
        Response::Document(FetchedDocument {
            status: 404,
            ..FetchedDocument::ok(token_line(TOKEN), "text/turtle")
        }),
    );

    f.validator.validate(&webid()).await.unwrap_err();
    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(err.to_string(), token_line(TOKEN));
    assert!(matches!(reason(&err), PendingReason::Transport(msg) if msg.contains("404")));
}

#[tokio::test]
async fn missing_content_type_is_transport_failure() {
    let f = fixed();
    f.fetcher.respond(
        DOCUMENT,
        Response::Document(FetchedDocument {
            content_type: None,
            ..FetchedDocument::ok(token_line(TOKEN), "text/turtle")
        }),
    );

    f.validator.validate(&webid()).await.unwrap_err();
    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert!(matches!(reason(&err), PendingReason::Transport(_)));
}

#[tokio::test]
async fn network_error_is_transport_failure() {
    let f = fixed();
    f.fetcher
        .respond(DOCUMENT, Response::Fail("dns lookup failed".to_owned()));

    f.validator.validate(&webid()).await.unwrap_err();
    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert!(matches!(reason(&err), PendingReason::Transport(msg) if msg.contains("dns")));
    assert_eq!(f.store.inner().get(WEBID).await.unwrap().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn malformed_profile_is_conversion_failure() {
    let f = fixed();
    f.fetcher.serve_turtle(DOCUMENT, "<#me> <#p> \"unterminated .");

    f.validator.validate(&webid()).await.unwrap_err();
    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(err.to_string(), token_line(TOKEN));
    assert!(matches!(reason(&err), PendingReason::Conversion(_)));
}

#[tokio::test(start_paused = true)]
async fn hanging_fetch_times_out_as_pending() {
    let f = fixed();
    f.fetcher.respond(DOCUMENT, Response::Hang);

    f.validator.validate(&webid()).await.unwrap_err();
    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(err.to_string(), token_line(TOKEN));
    assert!(matches!(reason(&err), PendingReason::Transport(_)));
    assert_eq!(f.store.calls().delete, 0);
}

#[tokio::test(start_paused = true)]
async fn expired_challenge_is_reissued() {
    let f = fixture(SequenceTokens::new("tok"));
    let ttl = f.validator.config().token_ttl;

    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(err.to_string(), token_line("tok-0"));

    tokio::time::advance(ttl + Duration::from_secs(1)).await;
    f.fetcher.serve_turtle(DOCUMENT, token_line("tok-0"));

    let err = f.validator.validate(&webid()).await.unwrap_err();
    assert_eq!(err.to_string(), token_line("tok-1"));
    assert!(matches!(reason(&err), PendingReason::Issued));
    assert_eq!(f.fetcher.request_count(), 0);
}

#[tokio::test]
async fn concurrent_first_calls_agree_on_one_secret() {
    let f = fixture(SequenceTokens::new("tok"));
    let id = webid();

    let (a, b, c) = tokio::join!(
        f.validator.validate(&id),
        f.validator.validate(&id),
        f.validator.validate(&id),
    );

    let stored = f.store.inner().get(WEBID).await.unwrap().unwrap();
    for result in [a, b, c] {
        assert_eq!(result.unwrap_err().to_string(), token_line(&stored));
    }
}

#[tokio::test]
async fn racing_first_calls_reuse_the_winning_secret() {
    let store = Arc::new(YieldingStore::new(MemoryStore::new()));
    let validator = TokenOwnershipValidator::with_tokens(
        RdfConverter,
        store.clone(),
        Arc::new(MockFetcher::new()),
        SequenceTokens::new("tok"),
        ValidatorConfig::default(),
    );
    let id = webid();

    // Both calls miss on lookup and generate tok-0 and tok-1 before either
    // inserts; the loser must report the stored tok-0.
    let (a, b) = tokio::join!(validator.validate(&id), validator.validate(&id));

    for result in [a, b] {
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), token_line("tok-0"));
        assert!(matches!(reason(&err), PendingReason::Issued));
    }
    assert_eq!(store.inner().get(WEBID).await.unwrap().as_deref(), Some("tok-0"));
}

#[tokio::test]
async fn challenges_are_scoped_per_identity() {
    let f = fixture(SequenceTokens::new("tok"));
    let bob = WebId::parse("http://bob.test.com/profile#me").unwrap();

    let alice_err = f.validator.validate(&webid()).await.unwrap_err();
    let bob_err = f.validator.validate(&bob).await.unwrap_err();

    assert_eq!(alice_err.to_string(), token_line("tok-0"));
    assert!(bob_err.to_string().starts_with("<http://bob.test.com/profile#me> "));
    assert!(bob_err.to_string().ends_with("\"tok-1\"."));
}

#[tokio::test]
async fn file_store_keeps_challenge_across_validators() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("challenges.json");
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.serve_turtle(DOCUMENT, token_line("tok-0"));

    let first = TokenOwnershipValidator::with_tokens(
        RdfConverter,
        FileStore::new(&path),
        fetcher.clone(),
        SequenceTokens::new("tok"),
        ValidatorConfig::default(),
    );
    let err = first.validate(&webid()).await.unwrap_err();
    assert_eq!(err.to_string(), token_line("tok-0"));
    drop(first);

    let second = TokenOwnershipValidator::with_tokens(
        RdfConverter,
        FileStore::new(&path),
        fetcher.clone(),
        SequenceTokens::new("other"),
        ValidatorConfig::default(),
    );
    second.validate(&webid()).await.unwrap();
    assert_eq!(FileStore::new(&path).get(WEBID).await.unwrap(), None);
}
