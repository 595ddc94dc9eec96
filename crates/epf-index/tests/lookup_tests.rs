//! Suggestion box behaviour against scripted candidate sources

use async_trait::async_trait;
use epf_collection::RecordId;
use epf_index::{
    CandidateSource, LookupConfig, LookupError, QueryOutcome, RawCandidate, SuggestionBox,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Answers every term with candidates labelled `<term> <n>`; the term
/// "slow" waits on `gate` first and the term "down" fails
#[derive(Default)]
struct ScriptedSource {
    calls: AtomicUsize,
    gate: Notify,
}

#[async_trait]
impl CandidateSource for ScriptedSource {
    async fn search(&self, term: &str) -> Result<Vec<RawCandidate>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match term {
            "down" => Err(LookupError::Transport("503".into())),
            "slow" => {
                self.gate.notified().await;
                Ok(vec![RawCandidate::labelled(1, "slow 1")])
            }
            _ => Ok(vec![
                RawCandidate::labelled(1, format!("{term} 1")),
                RawCandidate::labelled(2, format!("{term} 2")),
                RawCandidate::labelled(0, "bad id"),
                RawCandidate::labelled(3, ""),
            ]),
        }
    }
}

fn suggestion_box(source: &Arc<ScriptedSource>) -> SuggestionBox {
    let source: Arc<dyn CandidateSource> = source.clone();
    SuggestionBox::new(source, LookupConfig::default())
}

fn labels(sbox: &SuggestionBox) -> Vec<String> {
    sbox.suggestions().into_iter().map(|c| c.label).collect()
}

#[tokio::test]
async fn empty_term_issues_no_request() {
    let source = Arc::new(ScriptedSource::default());
    let sbox = suggestion_box(&source);

    assert_eq!(sbox.query("   ").await, QueryOutcome::Skipped);
    assert_eq!(sbox.query("").await, QueryOutcome::Skipped);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert_eq!(sbox.issued(), 0);
    assert!(sbox.suggestions().is_empty());
}

#[tokio::test]
async fn empty_term_keeps_previous_suggestions() {
    let source = Arc::new(ScriptedSource::default());
    let sbox = suggestion_box(&source);

    sbox.query("liver").await;
    sbox.query(" ").await;

    assert_eq!(labels(&sbox), vec!["liver 1", "liver 2"]);
}

#[tokio::test]
async fn invalid_candidates_are_discarded() {
    let source = Arc::new(ScriptedSource::default());
    let sbox = suggestion_box(&source);

    assert_eq!(sbox.query("kidney").await, QueryOutcome::Applied(2));
    assert_eq!(labels(&sbox), vec!["kidney 1", "kidney 2"]);
}

#[tokio::test]
async fn failure_leaves_list_unchanged() {
    let source = Arc::new(ScriptedSource::default());
    let sbox = suggestion_box(&source);

    sbox.query("liver").await;
    assert_eq!(sbox.query("down").await, QueryOutcome::Failed);

    assert_eq!(labels(&sbox), vec!["liver 1", "liver 2"]);
}

#[tokio::test]
async fn repeated_term_served_from_cache() {
    let source = Arc::new(ScriptedSource::default());
    let sbox = suggestion_box(&source);

    sbox.query("Liver").await;
    sbox.query("liver").await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(sbox.issued(), 2);
}

#[tokio::test]
async fn stale_response_is_dropped() {
    let source = Arc::new(ScriptedSource::default());
    let sbox = suggestion_box(&source);

    let (slow, fast) = tokio::join!(sbox.query("slow"), async {
        let outcome = sbox.query("fast").await;
        source.gate.notify_one();
        outcome
    });

    assert_eq!(fast, QueryOutcome::Applied(2));
    assert_eq!(slow, QueryOutcome::Stale);
    assert_eq!(labels(&sbox), vec!["fast 1", "fast 2"]);
}

#[tokio::test]
async fn clear_invalidates_in_flight() {
    let source = Arc::new(ScriptedSource::default());
    let sbox = suggestion_box(&source);

    let (slow, ()) = tokio::join!(sbox.query("slow"), async {
        tokio::task::yield_now().await;
        sbox.clear();
        source.gate.notify_one();
    });

    assert_eq!(slow, QueryOutcome::Stale);
    assert!(sbox.suggestions().is_empty());
}

#[tokio::test]
async fn pick_resolves_current_suggestion() {
    let source = Arc::new(ScriptedSource::default());
    let sbox = suggestion_box(&source);
    sbox.query("liver").await;

    let picked = sbox.pick(RecordId::new(2).unwrap()).unwrap();
    assert_eq!(picked.label, "liver 2");
    assert!(sbox.pick(RecordId::new(9).unwrap()).is_none());
}

#[tokio::test]
async fn min_term_len_is_respected() {
    let source = Arc::new(ScriptedSource::default());
    let dyn_source: Arc<dyn CandidateSource> = source.clone();
    let sbox = SuggestionBox::new(dyn_source, LookupConfig::default().with_min_term_len(3));

    assert_eq!(sbox.query("li").await, QueryOutcome::Skipped);
    assert_eq!(sbox.query("liv").await, QueryOutcome::Applied(2));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}
