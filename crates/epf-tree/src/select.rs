//! Lookup-assisted selection
//!
//! Effect tags, studies and confidence factors are chosen from a suggestion
//! list rather than typed. Picking a [`Choice`] stores its id as the row
//! identity and registers its label in the profile's [`SelectionScope`],
//! from which captions are resolved later.
//!
//! [`SelectionScope`]: crate::SelectionScope

use crate::action::{Dispatch, IgnoreReason, ItemPath};
use crate::level::Level;
use crate::tree::EvidenceProfile;
use epf_collection::{OrderedCollection, OrderedItem, Payload, RecordId};
use epf_index::Choice;

fn slot_mut<P: Payload>(
    collection: &mut OrderedCollection<P>,
    slot: u32,
) -> Result<&mut OrderedItem<P>, IgnoreReason> {
    let index = collection
        .find_by_display_index(i64::from(slot))
        .ok_or(IgnoreReason::NotFound)?;
    collection.get_mut(index).ok_or(IgnoreReason::NotFound)
}

fn slot_identity<P: Payload>(collection: &OrderedCollection<P>, slot: u32) -> Option<RecordId> {
    let index = collection.find_by_display_index(i64::from(slot))?;
    collection.get(index)?.identity()
}

impl EvidenceProfile {
    /// Record the effect tag picked for one effect tag row
    pub fn select_effect_tag(&mut self, stream: u32, scenario: u32, tag: u32, choice: Choice) -> Dispatch {
        self.select(&ItemPath::new(Level::EffectTag, vec![stream, scenario], tag), choice)
    }

    /// Record the study picked for one study row
    pub fn select_study(
        &mut self,
        stream: u32,
        scenario: u32,
        tag: u32,
        study: u32,
        choice: Choice,
    ) -> Dispatch {
        self.select(&ItemPath::new(Level::Study, vec![stream, scenario, tag], study), choice)
    }

    /// Record the confidence factor picked for one factor row
    ///
    /// The factor's default explanation, carried as the choice detail,
    /// replaces the row's explanation.
    pub fn select_confidence_factor(
        &mut self,
        increase: bool,
        stream: u32,
        scenario: u32,
        factor: u32,
        choice: Choice,
    ) -> Dispatch {
        let level = if increase {
            Level::IncreaseFactor
        } else {
            Level::DecreaseFactor
        };
        self.select(&ItemPath::new(level, vec![stream, scenario], factor), choice)
    }

    /// Record a picked choice for any lookup-assisted row
    pub fn select(&mut self, path: &ItemPath, choice: Choice) -> Dispatch {
        match self.try_select(path, &choice) {
            Ok(()) => {
                tracing::debug!(?path, id = choice.id.get(), label = %choice.label, "selection recorded");
                if let Some(index) = self.scope_mut().index_mut(path.level) {
                    index.insert(choice);
                }
                Dispatch::Changed
            }
            Err(reason) => {
                tracing::debug!(?path, %reason, "selection ignored");
                Dispatch::Ignored(reason)
            }
        }
    }

    fn try_select(&mut self, path: &ItemPath, choice: &Choice) -> Result<(), IgnoreReason> {
        if path.ancestors.len() != path.level.depth() {
            return Err(IgnoreReason::NotApplicable);
        }
        let a = &path.ancestors;

        match path.level {
            Level::EffectTag => {
                let scenario = self.scenario_at(a[0], a[1])?;
                slot_mut(&mut scenario.effect_tags, path.slot)?.set_identity(Some(choice.id));
            }
            Level::Study => {
                let tag = self.effect_tag_at(a[0], a[1], a[2])?;
                slot_mut(&mut tag.studies, path.slot)?.set_identity(Some(choice.id));
            }
            Level::IncreaseFactor | Level::DecreaseFactor => {
                let scenario = self.scenario_at(a[0], a[1])?;
                let factors = scenario.factors_mut(path.level == Level::IncreaseFactor);
                let item = slot_mut(factors, path.slot)?;
                item.set_identity(Some(choice.id));
                item.payload_mut().explanation = choice.detail.clone().unwrap_or_default();
            }
            _ => return Err(IgnoreReason::NotApplicable),
        }

        Ok(())
    }

    /// Identity recorded for a lookup-assisted row
    #[must_use]
    pub fn selected_id(&self, path: &ItemPath) -> Option<RecordId> {
        if path.ancestors.len() != path.level.depth() {
            return None;
        }
        let a = &path.ancestors;

        match path.level {
            Level::EffectTag => slot_identity(&self.scenario(a[0], a[1])?.effect_tags, path.slot),
            Level::Study => {
                let scenario = self.scenario(a[0], a[1])?;
                let index = scenario.effect_tags.find_by_display_index(i64::from(a[2]))?;
                let tag = scenario.effect_tags.get(index)?.payload();
                slot_identity(&tag.studies, path.slot)
            }
            Level::IncreaseFactor | Level::DecreaseFactor => {
                let scenario = self.scenario(a[0], a[1])?;
                slot_identity(scenario.factors(path.level == Level::IncreaseFactor), path.slot)
            }
            _ => None,
        }
    }

    /// Caption of a lookup-assisted row, resolved through the scope index
    #[must_use]
    pub fn selected_label(&self, path: &ItemPath) -> Option<&str> {
        let id = self.selected_id(path)?;
        self.scope().index(path.level)?.label(id)
    }
}
