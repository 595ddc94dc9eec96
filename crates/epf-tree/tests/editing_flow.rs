//! End-to-end editing sessions over a whole profile

use epf_collection::{RecordId, Visibility};
use epf_index::{LookupConfig, QueryOutcome, RawCandidate, SuggestionBox};
use epf_test_utils::{blank_profile, sample_profile, server_json, RecordingSink, StaticSource};
use epf_tree::{
    Action, ActionKind, Dispatch, EditorConfig, EvidenceProfile, IgnoreReason, ItemPath, Level,
    Outcome, OutcomeKey, TreeError,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn scenario_names(profile: &EvidenceProfile, stream: u32) -> Vec<String> {
    profile
        .stream(stream)
        .unwrap()
        .scenarios
        .iter()
        .map(|item| item.payload().scenario_name.clone())
        .collect()
}

#[test]
fn stream_scenario_lifecycle() {
    let mut profile = blank_profile();
    assert!(profile.apply_id("streamButton_add").is_changed());

    // the new stream came with one placeholder scenario
    let scenarios = &profile.stream(2).unwrap().scenarios;
    assert_eq!(scenarios.len(), 1);
    let placeholder = scenarios.get(0).unwrap();
    assert!(placeholder.identity().is_none());
    assert_eq!(placeholder.display_order(), 1);

    profile.scenario_mut(2, 1).unwrap().scenario_name = "first".into();
    assert!(profile.apply_id("scenarioButton_2_add").is_changed());
    profile.scenario_mut(2, 2).unwrap().scenario_name = "second".into();
    assert_eq!(profile.stream(2).unwrap().scenarios.display_orders(), vec![1, 2]);

    assert!(profile.apply_id("scenarioButton_2_2_moveup").is_changed());
    assert_eq!(profile.stream(2).unwrap().scenarios.display_orders(), vec![1, 2]);
    assert_eq!(scenario_names(&profile, 2), vec!["second", "first"]);

    // slot 2 is the moved scenario, now at the front
    assert!(profile.apply_id("scenarioButton_2_2_remove").is_changed());
    let scenarios = &profile.stream(2).unwrap().scenarios;
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios.get(0).unwrap().display_order(), 1);
    assert_eq!(scenario_names(&profile, 2), vec!["first"]);

    assert!(profile.check_invariants().is_ok());
}

#[test]
fn outcome_options_track_outcome_edits() {
    let mut profile = blank_profile();
    let stream = profile.stream_mut(1).unwrap();
    *stream.outcomes.get_mut(0).unwrap().payload_mut() = Outcome::new("A", Some(1));
    stream.outcomes.append(Outcome::new("B", Some(2)));

    let keys: Vec<String> = profile
        .stream(1)
        .unwrap()
        .outcome_options()
        .keys()
        .map(ToString::to_string)
        .collect();
    assert_eq!(keys, vec!["A|1", "B|2"]);

    assert!(profile.apply_id("outcomeButton_1_1_remove").is_changed());
    let options = profile.stream(1).unwrap().outcome_options();
    assert_eq!(options.len(), 1);
    assert!(options.contains_key(&OutcomeKey::new("B", Some(2))));
}

#[test]
fn removed_outcome_is_not_posted_as_a_pick() {
    let mut profile = blank_profile();
    *profile.stream_mut(1).unwrap().outcomes.get_mut(0).unwrap().payload_mut() =
        Outcome::new("A", Some(1));
    profile.scenario_mut(1, 1).unwrap().outcome = Some(OutcomeKey::new("A", Some(1)));
    assert_eq!(profile.flatten()["stream_1_1_scenario_outcome"], "A|1");

    assert!(profile.apply_id("outcomeButton_1_1_remove").is_changed());
    assert!(profile.stream(1).unwrap().outcome_options().is_empty());
    assert_eq!(profile.scenario(1, 1).unwrap().outcome, None);
    assert_eq!(profile.flatten()["stream_1_1_scenario_outcome"], "");
}

#[test]
fn retitled_outcome_drops_the_old_pick() {
    let mut profile = sample_profile();
    profile.stream_mut(1).unwrap().outcomes.get_mut(0).unwrap().payload_mut().title =
        "Liver mass".into();

    let record = profile.to_record();
    assert_eq!(record.streams[0].scenarios[0].outcome, None);

    let form = profile.flatten();
    assert_eq!(form["stream_1_1_scenario_outcome"], "");
    assert_eq!(profile.scenario(1, 1).unwrap().outcome, None);
}

#[test]
fn server_shaped_profile_imports() {
    let profile =
        EvidenceProfile::from_json(server_json(), Arc::new(EditorConfig::default())).unwrap();

    assert_eq!(profile.id, RecordId::new(7));
    assert!(profile.one_scenario_per_stream());

    let stream = profile.stream(1).unwrap();
    assert_eq!(stream.stream_type, Some(2));
    let scenario = stream.scenarios.get(0).unwrap();
    assert_eq!(scenario.identity(), RecordId::new(30));
    assert_eq!(
        scenario.payload().outcome,
        Some(OutcomeKey::new("Kidney weight", Some(2)))
    );

    let increase = ItemPath::new(Level::IncreaseFactor, vec![1, 1], 1);
    assert_eq!(profile.selected_id(&increase), RecordId::new(2));
    assert_eq!(profile.selected_label(&increase), Some("Dose response"));
    let decrease = ItemPath::new(Level::DecreaseFactor, vec![1, 1], 1);
    assert_eq!(profile.selected_label(&decrease), Some("Risk of bias"));
    let tag = ItemPath::new(Level::EffectTag, vec![1, 1], 1);
    assert_eq!(profile.selected_id(&tag), RecordId::new(9));

    let view = profile.view();
    let scenario_view = &view.streams.rows[0].children.scenarios.rows[0];
    let factors = &scenario_view.children.increase_factors.rows;
    assert_eq!(factors[0].caption, "Dose response");
    assert_eq!(factors[1].caption, "Consistency");
    assert_eq!(factors[0].fields["stream_1_1_increase_1_confidenceFactor_pk"], "2");
    assert_eq!(scenario_view.children.effect_tags.rows[0].caption, "[No Tag Yet]");
    assert!(profile.check_invariants().is_ok());
}

#[test]
fn server_shaped_profile_writes_server_keys() {
    let profile =
        EvidenceProfile::from_json(server_json(), Arc::new(EditorConfig::default())).unwrap();
    let json: serde_json::Value = serde_json::from_str(&profile.to_json().unwrap()).unwrap();

    let scenario = &json["streams"][0]["scenarios"][0];
    assert_eq!(scenario["studies"][0]["effecttag_id"], 9);
    assert_eq!(scenario["confidencefactors_increase"][0]["confidencefactor_id"], 2);
    assert_eq!(scenario["confidencefactors_increase"][0]["name"], "Dose response");
    assert_eq!(scenario["confidencefactors_decrease"][0]["explanation"], "unblinded");
    assert_eq!(scenario["outcome"]["title"], "Kidney weight");

    let again = EvidenceProfile::from_json(
        &profile.to_json().unwrap(),
        Arc::new(EditorConfig::default()),
    )
    .unwrap();
    assert_eq!(again.to_record(), profile.to_record());
}

#[test]
fn imported_profile_shape() {
    let profile = sample_profile();

    assert_eq!(profile.id, RecordId::new(42));
    assert_eq!(profile.streams().len(), 3);
    assert_eq!(profile.inferences().len(), 2);

    let human = profile.stream(1).unwrap();
    assert_eq!(human.confidence_judgement.score, Some(3));
    assert_eq!(human.outcomes.len(), 3);
    assert_eq!(human.scenarios.len(), 3);

    // an empty persisted stream still gets its trailing placeholders
    let animal = profile.stream(2).unwrap();
    assert_eq!(animal.scenarios.len(), 1);
    assert_eq!(animal.outcomes.len(), 1);

    let path = ItemPath::new(Level::Study, vec![1, 1, 1], 2);
    assert_eq!(profile.selected_label(&path), Some("Jones 2012"));
    assert_eq!(profile.scope().judgement_name(5), Some("Robust"));
}

#[test]
fn loaded_rows_start_collapsed_where_collapsible() {
    let profile = sample_profile();
    let scenarios = profile.stream(1).unwrap().scenarios.views();

    assert_eq!(scenarios[0].visibility, Visibility::Collapsed);
    assert!(profile
        .streams()
        .views()
        .iter()
        .all(|view| view.visibility == Visibility::Expanded));
}

#[test]
fn one_scenario_flag_from_import() {
    let mut record = epf_test_utils::sample_record();
    record.one_scenario_per_stream = true;
    let mut profile =
        EvidenceProfile::from_record(record, Arc::new(EditorConfig::default())).unwrap();

    assert_eq!(scenario_names(&profile, 1), vec!["Low dose"]);
    assert_eq!(
        profile.apply_id("scenarioButton_1_add"),
        Dispatch::Ignored(IgnoreReason::LimitReached)
    );
    let view = profile.view();
    assert_eq!(view.streams.rows[0].children.scenarios.add_button, None);
}

#[test]
fn structural_edits_deep_in_the_tree() {
    let mut profile = sample_profile();

    assert!(profile.apply_id("studyButton_1_1_1_2_moveup").is_changed());
    let path = ItemPath::new(Level::Study, vec![1, 1, 1], 2);
    let form = profile.flatten();
    assert_eq!(form["stream_1_1_1_2_study_order"], "1");
    assert_eq!(profile.selected_label(&path), Some("Jones 2012"));

    assert!(profile
        .apply(&Action::row(Level::DecreaseFactor, vec![1, 2], 1, ActionKind::Remove))
        .is_changed());
    // emptied factor collections are re-provisioned
    assert_eq!(profile.scenario(1, 2).unwrap().decrease_factors.len(), 1);
    assert!(profile.scenario(1, 2).unwrap().decrease_factors.get(0).unwrap().is_placeholder());
}

#[tokio::test]
async fn lookup_then_select_study() {
    let source = Arc::new(StaticSource::new(vec![
        RawCandidate::study(200, "Brown 2015", "Brown et al."),
        RawCandidate::study(201, "Green 2018", "Green et al."),
        RawCandidate::study(-1, "Broken", ""),
    ]));
    let lookup = SuggestionBox::new(source.clone(), LookupConfig::default());
    let mut profile = blank_profile();

    assert_eq!(lookup.query("  ").await, QueryOutcome::Skipped);
    assert_eq!(source.calls(), 0);

    assert_eq!(lookup.query("brown").await, QueryOutcome::Applied(1));
    let picked = lookup.pick(RecordId::new(200).unwrap()).unwrap();
    assert_eq!(picked.label, "Brown 2015 (Brown et al.)");

    assert!(profile.select_study(1, 1, 1, 1, picked).is_changed());
    let path = ItemPath::new(Level::Study, vec![1, 1, 1], 1);
    assert_eq!(profile.selected_label(&path), Some("Brown 2015 (Brown et al.)"));

    let view = profile.view();
    let study = &view.streams.rows[0].children.scenarios.rows[0].children.effect_tags.rows[0]
        .children
        .studies
        .rows[0];
    assert_eq!(study.caption, "Brown 2015 (Brown et al.)");
}

#[tokio::test]
async fn submit_hands_flat_form_to_sink() {
    let sink = RecordingSink::new();
    let mut profile = sample_profile();
    profile.title = "Renamed".into();

    profile.submit(&sink).await.unwrap();

    let submissions = sink.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["title"], "Renamed");
    assert_eq!(submissions[0]["stream_1_pk"], "1");
    assert_eq!(submissions[0]["stream_1_1_scenario_outcome"], "Liver weight|3");
}

#[tokio::test]
async fn rejected_submission_surfaces_error() {
    let sink = RecordingSink::rejecting();
    let mut profile = sample_profile();

    let err = profile.submit(&sink).await.unwrap_err();
    assert!(matches!(err, TreeError::Persist(_)));
}

#[test]
fn custom_prefixes_drive_identifiers() {
    let mut config = EditorConfig::default();
    config.scenario.button_prefix = "scen".into();
    let mut profile = EvidenceProfile::new(Arc::new(config)).unwrap();

    assert_eq!(
        profile.apply_id("scenarioButton_1_add"),
        Dispatch::Ignored(IgnoreReason::Malformed)
    );
    assert!(profile.apply_id("scen_1_add").is_changed());
    assert_eq!(
        profile.view().streams.rows[0].children.scenarios.add_button.as_deref(),
        Some("scen_1_add")
    );
}
