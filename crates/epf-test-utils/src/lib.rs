//! Testing utilities for EPF workspace
//!
//! Shared fixtures and fake collaborators.

#![allow(missing_docs)]

use async_trait::async_trait;
use epf_index::{CandidateSource, LookupError, RawCandidate};
use epf_tree::{EditorConfig, EvidenceProfile, FlatForm, PersistenceSink, ProfileRecord, TreeError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Two streams; the first has two outcomes, two scenarios and a tagged
/// study, the second is empty
pub fn sample_json() -> &'static str {
    r#"{
        "id": 42,
        "title": "Hepatic effects of chemical X",
        "slug": "hepatic-x",
        "caption": "",
        "one_scenario_per_stream": false,
        "cross_stream_inferences": [
            {"title": "Coherent across species", "description": "Both streams agree."}
        ],
        "streams": [
            {
                "pk": 1,
                "stream_type": 1,
                "stream_title": "Human",
                "confidence_judgement": {"title": "Moderate", "score": "3", "name": "Moderate", "explanation": ""},
                "outcomes": [
                    {"title": "Liver weight", "score": 3, "explanation": ""},
                    {"title": "Necrosis", "score": 1, "explanation": "single study"}
                ],
                "scenarios": [
                    {
                        "pk": 10,
                        "scenario_name": "Low dose",
                        "outcome": {"title": "Liver weight", "score": 3},
                        "summary_of_findings": {"score": 3, "explanation": "dose related"},
                        "studies": [{"effecttag_id": 7, "studies": [100, 101]}],
                        "confidencefactors_increase": [
                            {"confidencefactor_id": 2, "name": "Dose response", "explanation": "clear gradient"}
                        ],
                        "confidencefactors_decrease": []
                    },
                    {
                        "pk": 11,
                        "scenario_name": "High dose",
                        "outcome": null,
                        "summary_of_findings": {"score": "", "explanation": ""},
                        "studies": [],
                        "confidencefactors_increase": [],
                        "confidencefactors_decrease": [
                            {"confidencefactor_id": 5, "name": "Imprecision", "explanation": "small samples"}
                        ]
                    }
                ]
            },
            {
                "pk": 2,
                "stream_type": 2,
                "stream_title": "Animal",
                "outcomes": [],
                "scenarios": []
            }
        ],
        "scope": {
            "effect_tags": [{"id": 7, "label": "hepatic"}],
            "studies": [
                {"id": 100, "label": "Smith 2010"},
                {"id": 101, "label": "Jones 2012"}
            ],
            "confidence_factors": [
                {"id": 2, "label": "Dose response", "detail": "clear gradient"},
                {"id": 5, "label": "Imprecision", "detail": "small samples"}
            ],
            "confidence_judgements": [
                {"value": 1, "name": "Indeterminate"},
                {"value": 3, "name": "Moderate"},
                {"value": 5, "name": "Robust"}
            ]
        }
    }"#
}

/// A profile as the server stores it: no option lists shipped, factor
/// labels only on the factor rows, string-typed numbers from form posts
pub fn server_json() -> &'static str {
    r#"{
        "id": "7",
        "title": "Renal effects",
        "slug": "renal",
        "caption": "",
        "one_scenario_per_stream": true,
        "cross_stream_inferences": [],
        "streams": [
            {
                "pk": "3",
                "stream_type": "2",
                "stream_title": "Animal",
                "confidence_judgement": {"title": "", "score": "", "explanation": ""},
                "outcomes": [{"title": "Kidney weight", "score": "2", "explanation": ""}],
                "scenarios": [
                    {
                        "pk": 30,
                        "scenario_name": "",
                        "outcome": {"title": "Kidney weight", "score": "2"},
                        "summary_of_findings": {"title": "", "score": "", "explanation": ""},
                        "studies": [{"effecttag_id": 9, "studies": [200]}],
                        "confidencefactors_increase": [
                            {"confidencefactor_id": 2, "name": "Dose response", "explanation": "clear gradient"},
                            {"confidencefactor_id": 3, "name": "Consistency", "explanation": ""}
                        ],
                        "confidencefactors_decrease": [
                            {"confidencefactor_id": 6, "name": "Risk of bias", "explanation": "unblinded"}
                        ]
                    }
                ]
            }
        ]
    }"#
}

pub fn sample_record() -> ProfileRecord {
    serde_json::from_str(sample_json()).unwrap()
}

pub fn sample_profile() -> EvidenceProfile {
    sample_profile_with(EditorConfig::default())
}

pub fn sample_profile_with(config: EditorConfig) -> EvidenceProfile {
    EvidenceProfile::from_record(sample_record(), Arc::new(config)).unwrap()
}

pub fn blank_profile() -> EvidenceProfile {
    EvidenceProfile::new(Arc::new(EditorConfig::default())).unwrap()
}

/// Candidate source answering from a fixed list by case-insensitive
/// substring match
#[derive(Debug, Default)]
pub struct StaticSource {
    candidates: Vec<RawCandidate>,
    calls: AtomicUsize,
    fail: bool,
}

impl StaticSource {
    pub fn new(candidates: Vec<RawCandidate>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateSource for StaticSource {
    async fn search(&self, term: &str) -> Result<Vec<RawCandidate>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LookupError::Transport("connection refused".into()));
        }

        let term = term.to_lowercase();
        Ok(self
            .candidates
            .iter()
            .filter(|candidate| candidate.display_label().to_lowercase().contains(&term))
            .cloned()
            .collect())
    }
}

/// Persistence sink remembering every submission
#[derive(Debug, Default)]
pub struct RecordingSink {
    submissions: Mutex<Vec<FlatForm>>,
    reject: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn submissions(&self) -> Vec<FlatForm> {
        self.submissions.lock().clone()
    }
}

#[async_trait]
impl PersistenceSink for RecordingSink {
    async fn submit(&self, form: &FlatForm) -> Result<(), TreeError> {
        if self.reject {
            return Err(TreeError::Persist("server returned 400".into()));
        }
        self.submissions.lock().push(form.clone());
        Ok(())
    }
}
