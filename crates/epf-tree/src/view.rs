//! Render models
//!
//! [`EvidenceProfile::view`] snapshots the whole tree into plain values: one
//! [`RowView`] per row with its structural state, caption, button
//! identifiers and named field values. A renderer needs nothing else, and
//! the flattened form posted to the server is read straight off the same
//! field maps.

use crate::action::{ActionKind, ItemPath};
use crate::config::EditorConfig;
use crate::level::Level;
use crate::model::{ConfidenceFactor, JudgementLevel, Scenario, Stream};
use crate::naming::Naming;
use crate::tree::{EvidenceProfile, SelectionScope};
use epf_collection::{ItemView, OrderedCollection, OrderedItem, Payload};
use indexmap::IndexMap;
use serde::Serialize;

const NO_TITLE: &str = "[No Title Yet]";
const NO_NAME: &str = "[No Name Yet]";
const NO_TAG: &str = "[No Tag Yet]";

/// Whole editor snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    /// Profile-level fields
    pub fields: IndexMap<String, String>,
    /// Confidence judgement scale offered for every score
    pub judgements: Vec<JudgementLevel>,
    /// Cross-stream inferences
    pub inferences: LevelView<()>,
    /// Streams
    pub streams: LevelView<StreamView>,
}

/// One collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelView<T> {
    /// "Add new" identifier; `None` at the cardinality limit
    pub add_button: Option<String>,
    /// Rows in display order
    pub rows: Vec<RowView<T>>,
}

impl<T> LevelView<T> {
    /// Rows that are not placeholders
    pub fn filled(&self) -> impl Iterator<Item = &RowView<T>> {
        self.rows.iter().filter(|row| !row.item.is_placeholder)
    }
}

/// One row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView<T> {
    /// Structural state
    pub item: ItemView,
    /// Collapsed caption
    pub caption: String,
    /// Row button identifiers
    pub buttons: Vec<String>,
    /// Form field name to current value
    pub fields: IndexMap<String, String>,
    /// Nested collections
    pub children: T,
}

/// Nested collections of a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamView {
    /// Outcome choices for scenarios, key and label
    pub outcome_options: Vec<(String, String)>,
    /// Outcomes
    pub outcomes: LevelView<()>,
    /// Scenarios
    pub scenarios: LevelView<ScenarioView>,
}

/// Nested collections of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioView {
    /// Effect tags
    pub effect_tags: LevelView<EffectTagView>,
    /// Factors increasing confidence
    pub increase_factors: LevelView<()>,
    /// Factors decreasing confidence
    pub decrease_factors: LevelView<()>,
}

/// Nested collection of an effect tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectTagView {
    /// Studies
    pub studies: LevelView<()>,
}

fn or_placeholder(text: &str, fallback: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

fn opt(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

struct Builder<'a> {
    config: &'a EditorConfig,
    naming: Naming<'a>,
    scope: &'a SelectionScope,
}

/// Caption, field values and nested view of one row
type RowParts<T> = (String, Vec<String>, T);

impl Builder<'_> {
    fn level<P, T, F>(
        &self,
        level: Level,
        ancestors: &[u32],
        collection: &OrderedCollection<P>,
        mut row: F,
    ) -> LevelView<T>
    where
        P: Payload,
        F: FnMut(&ItemPath, &OrderedItem<P>) -> RowParts<T>,
    {
        let collapsible = self.config.level(level).collapsible;

        let rows = collection
            .views()
            .into_iter()
            .zip(collection.iter())
            .map(|(view, item)| {
                let path = ItemPath::new(level, ancestors, view.slot);
                let (caption, values, children) = row(&path, item);

                let fields = Naming::fields(level)
                    .iter()
                    .zip(values)
                    .map(|(name, value)| (self.naming.field(&path, name), value))
                    .collect();

                let mut kinds = Vec::with_capacity(4);
                if view.can_move_up {
                    kinds.push(ActionKind::MoveUp);
                }
                if view.can_move_down {
                    kinds.push(ActionKind::MoveDown);
                }
                kinds.push(ActionKind::Remove);
                if collapsible {
                    kinds.push(if view.visibility.is_expanded() {
                        ActionKind::Hide
                    } else {
                        ActionKind::Show
                    });
                }
                let buttons = kinds
                    .into_iter()
                    .filter_map(|kind| self.naming.row_button(&path, kind))
                    .collect();

                RowView {
                    item: view,
                    caption,
                    buttons,
                    fields,
                    children,
                }
            })
            .collect();

        LevelView {
            add_button: collection
                .can_add()
                .then(|| self.naming.add_button(level, ancestors)),
            rows,
        }
    }

    fn stream(&self, path: &ItemPath, item: &OrderedItem<Stream>) -> RowParts<StreamView> {
        let stream = item.payload();
        let slots = path.slots();
        let judgement = &stream.confidence_judgement;

        let values = vec![
            opt(item.identity()),
            opt(stream.stream_type),
            stream.stream_title.clone(),
            judgement.title.clone(),
            opt(judgement.score),
            judgement.explanation.clone(),
            item.display_order().to_string(),
        ];

        let outcomes = self.level(Level::Outcome, &slots, &stream.outcomes, |_, item| {
            let outcome = item.payload();
            (
                or_placeholder(&outcome.title, NO_TITLE),
                vec![
                    outcome.title.clone(),
                    opt(outcome.score),
                    outcome.explanation.clone(),
                    item.display_order().to_string(),
                ],
                (),
            )
        });

        let scenarios = self.level(Level::Scenario, &slots, &stream.scenarios, |path, scenario| {
            self.scenario(path, stream, scenario)
        });

        let view = StreamView {
            outcome_options: stream
                .outcome_options()
                .into_iter()
                .map(|(key, label)| (key.to_string(), label))
                .collect(),
            outcomes,
            scenarios,
        };

        (or_placeholder(&stream.stream_title, NO_TITLE), values, view)
    }

    fn scenario(
        &self,
        path: &ItemPath,
        stream: &Stream,
        item: &OrderedItem<Scenario>,
    ) -> RowParts<ScenarioView> {
        let scenario = item.payload();
        let slots = path.slots();
        let summary = &scenario.summary_of_findings;

        let values = vec![
            opt(item.identity()),
            scenario.scenario_name.clone(),
            opt(stream.resolved_outcome(scenario)),
            opt(summary.score),
            summary.explanation.clone(),
            item.display_order().to_string(),
        ];

        let effect_tags = self.level(Level::EffectTag, &slots, &scenario.effect_tags, |path, tag| {
            let tag_slots = path.slots();
            let studies = self.level(Level::Study, &tag_slots, &tag.payload().studies, |_, study| {
                (
                    self.label(Level::Study, study, NO_TITLE),
                    vec![opt(study.identity()), study.display_order().to_string()],
                    (),
                )
            });

            (
                self.label(Level::EffectTag, tag, NO_TAG),
                vec![opt(tag.identity()), tag.display_order().to_string()],
                EffectTagView { studies },
            )
        });

        let view = ScenarioView {
            effect_tags,
            increase_factors: self.factors(Level::IncreaseFactor, &slots, &scenario.increase_factors),
            decrease_factors: self.factors(Level::DecreaseFactor, &slots, &scenario.decrease_factors),
        };

        (or_placeholder(&scenario.scenario_name, NO_NAME), values, view)
    }

    fn factors(
        &self,
        level: Level,
        ancestors: &[u32],
        factors: &OrderedCollection<ConfidenceFactor>,
    ) -> LevelView<()> {
        self.level(level, ancestors, factors, |_, factor| {
            (
                self.label(level, factor, NO_TITLE),
                vec![
                    opt(factor.identity()),
                    factor.payload().explanation.clone(),
                    factor.display_order().to_string(),
                ],
                (),
            )
        })
    }

    fn label<P: Payload>(&self, level: Level, item: &OrderedItem<P>, fallback: &str) -> String {
        item.identity()
            .and_then(|id| self.scope.index(level)?.label(id))
            .unwrap_or(fallback)
            .to_string()
    }
}

impl EvidenceProfile {
    /// Snapshot the tree for rendering
    #[must_use]
    pub fn view(&self) -> ProfileView {
        let builder = Builder {
            config: self.config(),
            naming: self.naming(),
            scope: self.scope(),
        };

        let inferences = builder.level(Level::Inference, &[], self.inferences(), |_, item| {
            let inference = item.payload();
            (
                or_placeholder(&inference.title, NO_TITLE),
                vec![
                    inference.title.clone(),
                    inference.description.clone(),
                    item.display_order().to_string(),
                ],
                (),
            )
        });

        let streams = builder.level(Level::Stream, &[], self.streams(), |path, item| {
            builder.stream(path, item)
        });

        let mut fields = IndexMap::new();
        fields.insert("title".to_string(), self.title.clone());
        fields.insert("slug".to_string(), self.slug.clone());
        fields.insert("caption".to_string(), self.caption.clone());
        fields.insert(
            "one_scenario_per_stream".to_string(),
            self.one_scenario_per_stream().to_string(),
        );

        ProfileView {
            fields,
            judgements: self.scope().judgements.clone(),
            inferences,
            streams,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Outcome;
    use epf_collection::{RecordId, Stripe};
    use epf_index::Choice;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn profile() -> EvidenceProfile {
        EvidenceProfile::new(Arc::new(EditorConfig::default())).unwrap()
    }

    #[test]
    fn blank_profile_captions_and_buttons() {
        let view = profile().view();

        assert_eq!(view.streams.add_button.as_deref(), Some("streamButton_add"));
        let stream = &view.streams.rows[0];
        assert_eq!(stream.caption, "[No Title Yet]");
        // streams are not collapsible
        assert_eq!(stream.buttons, vec!["streamButton_1_remove".to_string()]);

        let scenario = &stream.children.scenarios.rows[0];
        assert_eq!(scenario.caption, "[No Name Yet]");
        assert_eq!(
            scenario.buttons,
            vec![
                "scenarioButton_1_1_remove".to_string(),
                "scenarioButton_1_1_hidescenario".to_string(),
            ]
        );
        assert_eq!(
            stream.children.scenarios.add_button.as_deref(),
            Some("scenarioButton_1_add")
        );

        let tag = &scenario.children.effect_tags.rows[0];
        assert_eq!(tag.caption, "[No Tag Yet]");
        assert_eq!(
            tag.children.studies.add_button.as_deref(),
            Some("studyButton_1_1_1_add")
        );
    }

    #[test]
    fn move_buttons_follow_position() {
        let mut profile = profile();
        let stream = profile.stream_mut(1).unwrap();
        stream.outcomes.append(Outcome::new("B", Some(2)));

        let view = profile.view();
        let outcomes = &view.streams.rows[0].children.outcomes;

        assert_eq!(outcomes.rows[0].buttons[0], "outcomeButton_1_1_movedown");
        assert_eq!(outcomes.rows[1].buttons[0], "outcomeButton_1_2_moveup");
        assert_eq!(outcomes.rows[1].item.stripe, Stripe::Secondary);
        assert_eq!(outcomes.rows[1].caption, "B");
    }

    #[test]
    fn field_values_and_names() {
        let mut profile = profile();
        profile.stream_mut(1).unwrap().stream_title = "Animal".into();
        profile.scenario_mut(1, 1).unwrap().scenario_name = "Low dose".into();

        let view = profile.view();
        let stream = &view.streams.rows[0];
        assert_eq!(stream.fields["stream_1_stream_title"], "Animal");
        assert_eq!(stream.fields["stream_1_pk"], "");
        assert_eq!(stream.fields["stream_1_order"], "1");

        let scenario = &stream.children.scenarios.rows[0];
        assert_eq!(scenario.fields["stream_1_1_scenario_scenario_name"], "Low dose");
        assert_eq!(scenario.fields.len(), Naming::fields(Level::Scenario).len());
    }

    #[test]
    fn labels_resolve_through_scope() {
        let mut profile = profile();
        let id = RecordId::new(7).unwrap();
        profile.select_effect_tag(1, 1, 1, Choice::new(id, "hepatic"));

        let view = profile.view();
        let tag = &view.streams.rows[0].children.scenarios.rows[0].children.effect_tags.rows[0];
        assert_eq!(tag.caption, "hepatic");
        assert_eq!(tag.fields["stream_1_1_1_effectTag_pk"], "7");
    }

    #[test]
    fn outcome_options_listed() {
        let mut profile = profile();
        let stream = profile.stream_mut(1).unwrap();
        let first = stream.outcomes.get_mut(0).unwrap();
        *first.payload_mut() = Outcome::new("A", Some(1));

        let view = profile.view();
        assert_eq!(
            view.streams.rows[0].children.outcome_options,
            vec![("A|1".to_string(), "A".to_string())]
        );
    }
}
