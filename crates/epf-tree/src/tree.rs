//! Evidence profile tree
//!
//! [`EvidenceProfile`] owns every collection of the editor plus the
//! [`SelectionScope`] used to resolve lookup labels. Structural edits go
//! through [`EvidenceProfile::apply`]; field values are edited directly on
//! the payloads.

use crate::action::{Action, ActionKind, ActionParser, Dispatch, IgnoreReason};
use crate::config::EditorConfig;
use crate::error::TreeError;
use crate::level::Level;
use crate::model::{
    ConfidenceFactor, EffectTag, Inference, JudgementLevel, Outcome, Scenario, Stream, StudyRef,
};
use crate::naming::Naming;
use crate::options::OutcomeKey;
use crate::record::{
    EffectTagRecord, FactorRecord, ProfileRecord, ScenarioRecord, ScopeRecord, StreamRecord,
};
use epf_collection::{
    BlankFn, LevelPolicy, OrderedCollection, OrderedItem, ParentState, Payload, RecordId,
};
use epf_index::{Choice, SelectionIndex};
use std::sync::Arc;

/// Option registries shared by the whole tree
#[derive(Debug, Default)]
pub struct SelectionScope {
    /// Effect tags
    pub effect_tags: SelectionIndex,
    /// Studies
    pub studies: SelectionIndex,
    /// Confidence factors, default explanation as detail
    pub confidence_factors: SelectionIndex,
    /// Confidence judgement scale
    pub judgements: Vec<JudgementLevel>,
}

impl SelectionScope {
    /// Build from the option lists shipped with a profile
    #[must_use]
    pub fn from_record(record: &ScopeRecord) -> Self {
        Self {
            effect_tags: record.effect_tags.iter().cloned().collect(),
            studies: record.studies.iter().cloned().collect(),
            confidence_factors: record.confidence_factors.iter().cloned().collect(),
            judgements: record.confidence_judgements.clone(),
        }
    }

    /// Option lists as shipped with a profile
    #[must_use]
    pub fn to_record(&self) -> ScopeRecord {
        let owned = |index: &SelectionIndex| index.choices().into_iter().cloned().collect();

        ScopeRecord {
            effect_tags: owned(&self.effect_tags),
            studies: owned(&self.studies),
            confidence_factors: owned(&self.confidence_factors),
            confidence_judgements: self.judgements.clone(),
        }
    }

    /// Index backing a lookup-assisted level
    #[must_use]
    pub fn index(&self, level: Level) -> Option<&SelectionIndex> {
        match level {
            Level::EffectTag => Some(&self.effect_tags),
            Level::Study => Some(&self.studies),
            Level::IncreaseFactor | Level::DecreaseFactor => Some(&self.confidence_factors),
            _ => None,
        }
    }

    /// Mutable index backing a lookup-assisted level
    pub fn index_mut(&mut self, level: Level) -> Option<&mut SelectionIndex> {
        match level {
            Level::EffectTag => Some(&mut self.effect_tags),
            Level::Study => Some(&mut self.studies),
            Level::IncreaseFactor | Level::DecreaseFactor => Some(&mut self.confidence_factors),
            _ => None,
        }
    }

    /// Display name of a judgement value
    #[must_use]
    pub fn judgement_name(&self, value: i64) -> Option<&str> {
        self.judgements
            .iter()
            .find(|level| level.value == value)
            .map(|level| level.name.as_str())
    }
}

/// Root of the editable tree
#[derive(Debug)]
pub struct EvidenceProfile {
    /// Primary key; `None` until saved
    pub id: Option<RecordId>,
    /// Title
    pub title: String,
    /// URL slug
    pub slug: String,
    /// Caption
    pub caption: String,
    one_scenario_per_stream: bool,
    inferences: OrderedCollection<Inference>,
    streams: OrderedCollection<Stream>,
    scope: SelectionScope,
    config: Arc<EditorConfig>,
    parser: ActionParser,
}

impl EvidenceProfile {
    /// Blank profile with the configured placeholders
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn new(config: Arc<EditorConfig>) -> Result<Self, TreeError> {
        Self::from_record(ProfileRecord::default(), config)
    }

    /// Build from the server JSON shape
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or carries invalid ids
    pub fn from_json(json: &str, config: Arc<EditorConfig>) -> Result<Self, TreeError> {
        let record: ProfileRecord = serde_json::from_str(json)?;
        Self::from_record(record, config)
    }

    /// Build from a decoded record
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or a record carries an
    /// invalid id
    pub fn from_record(record: ProfileRecord, config: Arc<EditorConfig>) -> Result<Self, TreeError> {
        config.validate()?;
        let parser = ActionParser::new(&config)?;

        let id = match record.id {
            Some(raw) => Some(RecordId::from_signed(raw).ok_or(TreeError::InvalidProfileId(raw))?),
            None => None,
        };
        let parent = ParentState::from_identity(id);
        let one_scenario = record.one_scenario_per_stream;

        let mut scope = SelectionScope::from_record(&record.scope);
        for choice in factor_choices(&record.streams) {
            if !scope.confidence_factors.contains(choice.id) {
                scope.confidence_factors.insert(choice);
            }
        }

        let inferences = OrderedCollection::load(
            record.cross_stream_inferences.into_iter().map(|inference| {
                (
                    None,
                    Inference {
                        title: inference.title,
                        description: inference.description,
                    },
                )
            }),
            config.policy(Level::Inference),
            parent,
        );

        let streams = record
            .streams
            .into_iter()
            .map(|stream| import_stream(stream, &config, one_scenario))
            .collect::<Result<Vec<_>, _>>()?;
        let streams = OrderedCollection::load_with(
            streams,
            config.policy(Level::Stream),
            parent,
            stream_blank(&config, one_scenario),
        );

        tracing::info!(
            profile = ?id,
            streams = streams.len(),
            inferences = inferences.len(),
            "imported evidence profile"
        );

        Ok(Self {
            id,
            title: record.title,
            slug: record.slug,
            caption: record.caption,
            one_scenario_per_stream: one_scenario,
            inferences,
            streams,
            scope,
            config,
            parser,
        })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Name builder for the active configuration
    #[inline]
    #[must_use]
    pub fn naming(&self) -> Naming<'_> {
        Naming::new(&self.config)
    }

    /// Identifier parser for the active configuration
    #[inline]
    #[must_use]
    pub fn parser(&self) -> &ActionParser {
        &self.parser
    }

    /// Option registries
    #[inline]
    #[must_use]
    pub fn scope(&self) -> &SelectionScope {
        &self.scope
    }

    /// Mutable option registries
    #[inline]
    pub fn scope_mut(&mut self) -> &mut SelectionScope {
        &mut self.scope
    }

    /// Cross-stream inferences
    #[inline]
    #[must_use]
    pub fn inferences(&self) -> &OrderedCollection<Inference> {
        &self.inferences
    }

    /// Mutable cross-stream inferences
    #[inline]
    pub fn inferences_mut(&mut self) -> &mut OrderedCollection<Inference> {
        &mut self.inferences
    }

    /// Streams
    #[inline]
    #[must_use]
    pub fn streams(&self) -> &OrderedCollection<Stream> {
        &self.streams
    }

    /// Mutable streams
    #[inline]
    pub fn streams_mut(&mut self) -> &mut OrderedCollection<Stream> {
        &mut self.streams
    }

    /// Stream by 1-based slot
    #[must_use]
    pub fn stream(&self, slot: u32) -> Option<&Stream> {
        lookup(&self.streams, slot)
    }

    /// Mutable stream by 1-based slot
    pub fn stream_mut(&mut self, slot: u32) -> Option<&mut Stream> {
        lookup_mut(&mut self.streams, slot).ok()
    }

    /// Scenario by stream and scenario slots
    #[must_use]
    pub fn scenario(&self, stream: u32, scenario: u32) -> Option<&Scenario> {
        lookup(&self.stream(stream)?.scenarios, scenario)
    }

    /// Mutable scenario by stream and scenario slots
    pub fn scenario_mut(&mut self, stream: u32, scenario: u32) -> Option<&mut Scenario> {
        self.scenario_at(stream, scenario).ok()
    }

    /// Whether every stream is limited to one scenario
    #[inline]
    #[must_use]
    pub fn one_scenario_per_stream(&self) -> bool {
        self.one_scenario_per_stream
    }

    /// Turn the one-scenario-per-stream restriction on or off
    ///
    /// Turning it on truncates every stream to its first scenario.
    pub fn set_one_scenario_per_stream(&mut self, enabled: bool) {
        if self.one_scenario_per_stream == enabled {
            return;
        }

        self.one_scenario_per_stream = enabled;
        let limit = scenario_policy(&self.config, enabled).cardinality_limit;
        for item in self.streams.iter_mut() {
            item.payload_mut().scenarios.set_cardinality_limit(limit);
        }
        self.streams.set_blank(stream_blank(&self.config, enabled));

        tracing::info!(enabled, "one scenario per stream changed");
    }

    /// Apply a structural edit
    pub fn apply(&mut self, action: &Action) -> Dispatch {
        match self.try_apply(action) {
            Ok(()) => {
                tracing::debug!(?action, "action applied");
                Dispatch::Changed
            }
            Err(reason) => {
                tracing::debug!(?action, %reason, "action ignored");
                Dispatch::Ignored(reason)
            }
        }
    }

    /// Parse a button identifier and apply it
    pub fn apply_id(&mut self, id: &str) -> Dispatch {
        match self.parser.parse(id) {
            Some(action) => self.apply(&action),
            None => {
                tracing::warn!(id, "unrecognised button identifier");
                Dispatch::Ignored(IgnoreReason::Malformed)
            }
        }
    }

    /// Apply an identifier on behalf of the handler of one collection
    ///
    /// Identifiers addressed to any other collection are ignored.
    pub fn apply_scoped(&mut self, id: &str, level: Level, ancestors: &[u32]) -> Dispatch {
        match self.parser.parse_scoped(id, level, ancestors) {
            Some(action) => self.apply(&action),
            None => {
                tracing::debug!(id, %level, ?ancestors, "identifier outside handler scope");
                Dispatch::Ignored(IgnoreReason::NotApplicable)
            }
        }
    }

    fn try_apply(&mut self, action: &Action) -> Result<(), IgnoreReason> {
        if action.ancestors.len() != action.level.depth() {
            return Err(IgnoreReason::NotApplicable);
        }
        if (action.kind == ActionKind::Add) != action.target.is_none() {
            return Err(IgnoreReason::NotApplicable);
        }

        let collapsible = self.config.level(action.level).collapsible;
        let a = &action.ancestors;

        match action.level {
            Level::Inference => edit(&mut self.inferences, action, collapsible),
            Level::Stream => edit(&mut self.streams, action, collapsible),
            Level::Outcome => {
                let stream = lookup_mut(&mut self.streams, a[0])?;
                edit(&mut stream.outcomes, action, collapsible)?;
                stream.clear_stale_outcomes();
                Ok(())
            }
            Level::Scenario => {
                let stream = lookup_mut(&mut self.streams, a[0])?;
                edit(&mut stream.scenarios, action, collapsible)
            }
            Level::EffectTag => {
                let scenario = self.scenario_at(a[0], a[1])?;
                edit(&mut scenario.effect_tags, action, collapsible)
            }
            Level::Study => {
                let tag = self.effect_tag_at(a[0], a[1], a[2])?;
                edit(&mut tag.studies, action, collapsible)
            }
            Level::IncreaseFactor => {
                let scenario = self.scenario_at(a[0], a[1])?;
                edit(&mut scenario.increase_factors, action, collapsible)
            }
            Level::DecreaseFactor => {
                let scenario = self.scenario_at(a[0], a[1])?;
                edit(&mut scenario.decrease_factors, action, collapsible)
            }
        }
    }

    pub(crate) fn scenario_at(
        &mut self,
        stream: u32,
        scenario: u32,
    ) -> Result<&mut Scenario, IgnoreReason> {
        let stream = lookup_mut(&mut self.streams, stream)?;
        lookup_mut(&mut stream.scenarios, scenario)
    }

    pub(crate) fn effect_tag_at(
        &mut self,
        stream: u32,
        scenario: u32,
        tag: u32,
    ) -> Result<&mut EffectTag, IgnoreReason> {
        let scenario = self.scenario_at(stream, scenario)?;
        lookup_mut(&mut scenario.effect_tags, tag)
    }

    /// Reassign display order in every collection
    ///
    /// Scenario outcome picks that no longer name one of their stream's
    /// outcomes are cleared on the way.
    pub fn renumber_all(&mut self) {
        self.inferences.renumber();
        self.streams.renumber();

        for stream in self.streams.iter_mut() {
            let stream = stream.payload_mut();
            stream.outcomes.renumber();
            stream.scenarios.renumber();
            stream.clear_stale_outcomes();

            for scenario in stream.scenarios.iter_mut() {
                let scenario = scenario.payload_mut();
                scenario.increase_factors.renumber();
                scenario.decrease_factors.renumber();
                scenario.effect_tags.renumber();

                for tag in scenario.effect_tags.iter_mut() {
                    tag.payload_mut().studies.renumber();
                }
            }
        }
    }

    /// Verify the invariants of every collection
    ///
    /// # Errors
    /// Returns the first broken invariant with the level it was found at
    pub fn check_invariants(&self) -> Result<(), TreeError> {
        check(Level::Inference, &self.inferences)?;
        check(Level::Stream, &self.streams)?;

        for stream in &self.streams {
            let stream = stream.payload();
            check(Level::Outcome, &stream.outcomes)?;
            check(Level::Scenario, &stream.scenarios)?;

            for scenario in &stream.scenarios {
                let scenario = scenario.payload();
                check(Level::EffectTag, &scenario.effect_tags)?;
                check(Level::IncreaseFactor, &scenario.increase_factors)?;
                check(Level::DecreaseFactor, &scenario.decrease_factors)?;

                for tag in &scenario.effect_tags {
                    check(Level::Study, &tag.payload().studies)?;
                }
            }
        }

        Ok(())
    }
}

fn check<P: Payload>(level: Level, collection: &OrderedCollection<P>) -> Result<(), TreeError> {
    collection
        .check_invariants()
        .map_err(|source| TreeError::Invariant { level, source })
}

fn lookup<P: Payload>(collection: &OrderedCollection<P>, slot: u32) -> Option<&P> {
    let index = collection.find_by_display_index(i64::from(slot))?;
    collection.get(index).map(OrderedItem::payload)
}

fn lookup_mut<P: Payload>(
    collection: &mut OrderedCollection<P>,
    slot: u32,
) -> Result<&mut P, IgnoreReason> {
    let index = collection
        .find_by_display_index(i64::from(slot))
        .ok_or(IgnoreReason::UnknownAncestor)?;
    collection
        .get_mut(index)
        .map(OrderedItem::payload_mut)
        .ok_or(IgnoreReason::UnknownAncestor)
}

fn changed(done: bool, otherwise: IgnoreReason) -> Result<(), IgnoreReason> {
    if done {
        Ok(())
    } else {
        Err(otherwise)
    }
}

fn edit<P: Payload>(
    collection: &mut OrderedCollection<P>,
    action: &Action,
    collapsible: bool,
) -> Result<(), IgnoreReason> {
    if action.kind == ActionKind::Add {
        return collection
            .append_blank()
            .map(|_| ())
            .ok_or(IgnoreReason::LimitReached);
    }

    let slot = action.target.ok_or(IgnoreReason::NotApplicable)?;
    let index = collection
        .find_by_display_index(i64::from(slot))
        .ok_or(IgnoreReason::NotFound)?;

    match action.kind {
        ActionKind::MoveUp => changed(collection.move_up(index), IgnoreReason::AtBoundary),
        ActionKind::MoveDown => changed(collection.move_down(index), IgnoreReason::AtBoundary),
        ActionKind::Remove => changed(collection.remove(index).is_some(), IgnoreReason::NotFound),
        ActionKind::Show | ActionKind::Hide if !collapsible => Err(IgnoreReason::NotApplicable),
        ActionKind::Show => changed(collection.show(index), IgnoreReason::NotApplicable),
        ActionKind::Hide => changed(collection.hide(index), IgnoreReason::NotApplicable),
        ActionKind::Add => Err(IgnoreReason::NotApplicable),
    }
}

fn scenario_policy(config: &EditorConfig, one_scenario: bool) -> LevelPolicy {
    let policy = config.policy(Level::Scenario);
    if one_scenario {
        policy.with_limit(Some(1))
    } else {
        policy
    }
}

fn stream_blank(config: &Arc<EditorConfig>, one_scenario: bool) -> BlankFn<Stream> {
    let config = Arc::clone(config);
    Arc::new(move || blank_stream(&config, one_scenario))
}

fn scenario_blank(config: &Arc<EditorConfig>) -> BlankFn<Scenario> {
    let config = Arc::clone(config);
    Arc::new(move || blank_scenario(&config))
}

fn effect_tag_blank(config: &Arc<EditorConfig>) -> BlankFn<EffectTag> {
    let config = Arc::clone(config);
    Arc::new(move || blank_effect_tag(&config))
}

fn blank_stream(config: &Arc<EditorConfig>, one_scenario: bool) -> Stream {
    Stream {
        outcomes: OrderedCollection::load(
            Vec::new(),
            config.policy(Level::Outcome),
            ParentState::New,
        ),
        scenarios: OrderedCollection::load_with(
            Vec::new(),
            scenario_policy(config, one_scenario),
            ParentState::New,
            scenario_blank(config),
        ),
        ..Stream::default()
    }
}

fn blank_scenario(config: &Arc<EditorConfig>) -> Scenario {
    Scenario {
        effect_tags: OrderedCollection::load_with(
            Vec::new(),
            config.policy(Level::EffectTag),
            ParentState::New,
            effect_tag_blank(config),
        ),
        increase_factors: OrderedCollection::load(
            Vec::new(),
            config.policy(Level::IncreaseFactor),
            ParentState::New,
        ),
        decrease_factors: OrderedCollection::load(
            Vec::new(),
            config.policy(Level::DecreaseFactor),
            ParentState::New,
        ),
        ..Scenario::default()
    }
}

fn blank_effect_tag(config: &Arc<EditorConfig>) -> EffectTag {
    EffectTag {
        studies: OrderedCollection::load(Vec::new(), config.policy(Level::Study), ParentState::New),
    }
}

fn optional_id(level: Level, raw: Option<i64>) -> Result<Option<RecordId>, TreeError> {
    raw.map(|raw| required_id(level, raw)).transpose()
}

fn required_id(level: Level, raw: i64) -> Result<RecordId, TreeError> {
    RecordId::from_signed(raw).ok_or_else(|| TreeError::InvalidRecord {
        level,
        reason: format!("id must be positive, got {raw}"),
    })
}

fn import_stream(
    record: StreamRecord,
    config: &Arc<EditorConfig>,
    one_scenario: bool,
) -> Result<(Option<RecordId>, Stream), TreeError> {
    let identity = optional_id(Level::Stream, record.pk)?;
    let parent = ParentState::from_identity(identity);

    let outcomes = OrderedCollection::load(
        record.outcomes.into_iter().map(|outcome| {
            (
                None,
                Outcome {
                    title: outcome.title,
                    score: outcome.score,
                    explanation: outcome.explanation,
                },
            )
        }),
        config.policy(Level::Outcome),
        parent,
    );

    let scenarios = record
        .scenarios
        .into_iter()
        .map(|scenario| import_scenario(scenario, config))
        .collect::<Result<Vec<_>, _>>()?;
    let scenarios = OrderedCollection::load_with(
        scenarios,
        scenario_policy(config, one_scenario),
        parent,
        scenario_blank(config),
    );

    let stream = Stream {
        stream_type: record.stream_type,
        stream_title: record.stream_title,
        confidence_judgement: record.confidence_judgement,
        outcomes,
        scenarios,
    };

    Ok((identity, stream))
}

fn import_scenario(
    record: ScenarioRecord,
    config: &Arc<EditorConfig>,
) -> Result<(Option<RecordId>, Scenario), TreeError> {
    let identity = optional_id(Level::Scenario, record.pk)?;
    let parent = ParentState::from_identity(identity);

    let outcome = record
        .outcome
        .filter(|outcome| !outcome.title.trim().is_empty())
        .map(|outcome| OutcomeKey::new(outcome.title.trim(), outcome.score));

    let effect_tags = record
        .effect_tags
        .into_iter()
        .map(|tag| import_effect_tag(tag, config))
        .collect::<Result<Vec<_>, _>>()?;

    let scenario = Scenario {
        scenario_name: record.scenario_name,
        outcome,
        summary_of_findings: record.summary_of_findings,
        effect_tags: OrderedCollection::load_with(
            effect_tags,
            config.policy(Level::EffectTag),
            parent,
            effect_tag_blank(config),
        ),
        increase_factors: import_factors(
            record.increase_factors,
            Level::IncreaseFactor,
            config,
            parent,
        )?,
        decrease_factors: import_factors(
            record.decrease_factors,
            Level::DecreaseFactor,
            config,
            parent,
        )?,
    };

    Ok((identity, scenario))
}

fn import_effect_tag(
    record: EffectTagRecord,
    config: &EditorConfig,
) -> Result<(Option<RecordId>, EffectTag), TreeError> {
    let identity = required_id(Level::EffectTag, record.effect_tag_id)?;

    let studies = record
        .studies
        .into_iter()
        .map(|study| required_id(Level::Study, study).map(|id| (Some(id), StudyRef)))
        .collect::<Result<Vec<_>, _>>()?;

    let tag = EffectTag {
        studies: OrderedCollection::load(studies, config.policy(Level::Study), ParentState::Persisted),
    };

    Ok((Some(identity), tag))
}

/// Factor labels carried on the factor rows themselves
fn factor_choices(streams: &[StreamRecord]) -> Vec<Choice> {
    streams
        .iter()
        .flat_map(|stream| &stream.scenarios)
        .flat_map(|scenario| scenario.increase_factors.iter().chain(&scenario.decrease_factors))
        .filter_map(|factor| Choice::try_new(factor.id, &factor.name, None).ok())
        .collect()
}

fn import_factors(
    records: Vec<FactorRecord>,
    level: Level,
    config: &EditorConfig,
    parent: ParentState,
) -> Result<OrderedCollection<ConfidenceFactor>, TreeError> {
    let factors = records
        .into_iter()
        .map(|factor| {
            required_id(level, factor.id).map(|id| {
                (
                    Some(id),
                    ConfidenceFactor {
                        explanation: factor.explanation,
                    },
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OrderedCollection::load(factors, config.policy(level), parent))
}
