//! Saving a profile
//!
//! Two shapes leave the editor: the flat field map a form post carries, and
//! the nested [`ProfileRecord`] the editor was loaded from.

use crate::error::TreeError;
use crate::model::{ConfidenceFactor, Scenario, Stream};
use crate::record::{
    EffectTagRecord, FactorRecord, InferenceRecord, OutcomeRecord, OutcomeRefRecord,
    ProfileRecord, ScenarioRecord, StreamRecord,
};
use crate::tree::EvidenceProfile;
use crate::view::{LevelView, RowView};
use async_trait::async_trait;
use epf_collection::{OrderedCollection, OrderedItem, Payload};
use epf_index::SelectionIndex;
use indexmap::IndexMap;

/// Form field name to value, in render order
pub type FlatForm = IndexMap<String, String>;

/// Receives the flattened form on save
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Store one submission
    async fn submit(&self, form: &FlatForm) -> Result<(), TreeError>;
}

fn collect_rows<T>(form: &mut FlatForm, level: &LevelView<T>, nested: impl Fn(&mut FlatForm, &T)) {
    for row in &level.rows {
        collect_row(form, row);
        nested(form, &row.children);
    }
}

fn collect_row<T>(form: &mut FlatForm, row: &RowView<T>) {
    form.extend(row.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
}

fn filled<P: Payload>(collection: &OrderedCollection<P>) -> impl Iterator<Item = &OrderedItem<P>> {
    collection.iter().filter(|item| !item.is_placeholder())
}

fn signed(item: &OrderedItem<impl Payload>) -> Option<i64> {
    item.identity().and_then(|id| i64::try_from(id.get()).ok())
}

fn factor_records(
    labels: &SelectionIndex,
    factors: &OrderedCollection<ConfidenceFactor>,
) -> Vec<FactorRecord> {
    factors
        .iter()
        .filter_map(|item| {
            let id = item.identity()?;
            Some(FactorRecord {
                id: i64::try_from(id.get()).ok()?,
                name: labels.label(id).unwrap_or_default().to_string(),
                explanation: item.payload().explanation.clone(),
            })
        })
        .collect()
}

fn scenario_record(
    stream: &Stream,
    factor_labels: &SelectionIndex,
    item: &OrderedItem<Scenario>,
) -> ScenarioRecord {
    let scenario = item.payload();

    ScenarioRecord {
        pk: signed(item),
        scenario_name: scenario.scenario_name.clone(),
        outcome: stream.resolved_outcome(scenario).map(|key| OutcomeRefRecord {
            title: key.title.clone(),
            score: key.score,
        }),
        summary_of_findings: scenario.summary_of_findings.clone(),
        effect_tags: scenario
            .effect_tags
            .iter()
            .filter_map(|tag| {
                Some(EffectTagRecord {
                    effect_tag_id: signed(tag)?,
                    studies: tag.payload().studies.iter().filter_map(signed).collect(),
                })
            })
            .collect(),
        increase_factors: factor_records(factor_labels, &scenario.increase_factors),
        decrease_factors: factor_records(factor_labels, &scenario.decrease_factors),
    }
}

fn stream_record(factor_labels: &SelectionIndex, item: &OrderedItem<Stream>) -> StreamRecord {
    let stream = item.payload();

    StreamRecord {
        pk: signed(item),
        stream_type: stream.stream_type,
        stream_title: stream.stream_title.clone(),
        confidence_judgement: stream.confidence_judgement.clone(),
        outcomes: filled(&stream.outcomes)
            .map(|outcome| {
                let outcome = outcome.payload();
                OutcomeRecord {
                    title: outcome.title.clone(),
                    score: outcome.score,
                    explanation: outcome.explanation.clone(),
                }
            })
            .collect(),
        scenarios: filled(&stream.scenarios)
            .map(|scenario| scenario_record(stream, factor_labels, scenario))
            .collect(),
    }
}

impl EvidenceProfile {
    /// Every field of every row, placeholders included, after a full
    /// renumber
    pub fn flatten(&mut self) -> FlatForm {
        self.renumber_all();
        let view = self.view();

        let mut form = view.fields;
        collect_rows(&mut form, &view.inferences, |_, _| {});
        collect_rows(&mut form, &view.streams, |form, stream| {
            collect_rows(form, &stream.outcomes, |_, _| {});
            collect_rows(form, &stream.scenarios, |form, scenario| {
                collect_rows(form, &scenario.effect_tags, |form, tag| {
                    collect_rows(form, &tag.studies, |_, _| {});
                });
                collect_rows(form, &scenario.increase_factors, |_, _| {});
                collect_rows(form, &scenario.decrease_factors, |_, _| {});
            });
        });

        form
    }

    /// Nested record of the filled-in rows
    ///
    /// Placeholders are left out, as are lookup rows nothing was picked
    /// for.
    #[must_use]
    pub fn to_record(&self) -> ProfileRecord {
        ProfileRecord {
            id: self.id.and_then(|id| i64::try_from(id.get()).ok()),
            title: self.title.clone(),
            slug: self.slug.clone(),
            caption: self.caption.clone(),
            one_scenario_per_stream: self.one_scenario_per_stream(),
            cross_stream_inferences: filled(self.inferences())
                .map(|item| InferenceRecord {
                    title: item.payload().title.clone(),
                    description: item.payload().description.clone(),
                })
                .collect(),
            streams: filled(self.streams())
                .map(|stream| stream_record(&self.scope().confidence_factors, stream))
                .collect(),
            scope: self.scope().to_record(),
        }
    }

    /// Nested record as JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }

    /// Flatten and hand the form to `sink`
    ///
    /// # Errors
    /// Returns the sink's error
    pub async fn submit(&mut self, sink: &dyn PersistenceSink) -> Result<(), TreeError> {
        let form = self.flatten();
        sink.submit(&form).await?;

        tracing::info!(profile = ?self.id, fields = form.len(), "submitted evidence profile");
        Ok(())
    }
}
