use pdp_core::{
    CombinerParameter, CombiningAlgorithm, CombiningElement, Decision, Effect, Evaluatable,
    EvaluationContext, EvaluationResult, Identifier, Result,
};
use tracing::trace;

/// deny-overrides and permit-overrides
///
/// The overriding effect wins as soon as one child produces it. Otherwise an
/// Indeterminate child that could have produced the overriding effect makes
/// the whole result Indeterminate; failing that, the other effect wins over
/// Indeterminate children that could only have produced it.
///
/// Whether an Indeterminate child "could have" produced an effect is read
/// from [`Evaluatable::declared_effect`]: a rule only ever produces its own
/// effect, and a policy node declares one when its algorithm and children
/// leave no other. Undeclared nodes may produce either.
#[derive(Debug)]
pub struct Overrides {
    id: Identifier,
    overriding: Effect,
}

impl Overrides {
    /// deny-overrides under `id`
    #[must_use]
    pub fn deny(id: impl Into<Identifier>) -> Self {
        Self {
            id: id.into(),
            overriding: Effect::Deny,
        }
    }

    /// permit-overrides under `id`
    #[must_use]
    pub fn permit(id: impl Into<Identifier>) -> Self {
        Self {
            id: id.into(),
            overriding: Effect::Permit,
        }
    }

    /// The effect that overrides
    #[must_use]
    pub const fn overriding(&self) -> Effect {
        self.overriding
    }
}

impl<T: Evaluatable + ?Sized> CombiningAlgorithm<T> for Overrides {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn combine(
        &self,
        context: &dyn EvaluationContext,
        elements: &[CombiningElement<T>],
        _parameters: &[CombinerParameter],
    ) -> Result<EvaluationResult> {
        let overriding = self.overriding.decision();
        let mut overridden: Option<EvaluationResult> = None;
        let mut blocking_error: Option<EvaluationResult> = None;
        let mut overridden_error: Option<EvaluationResult> = None;

        for element in elements {
            let result = element.evaluate(context)?;
            match result.decision() {
                decision if decision == overriding => {
                    trace!(
                        algorithm = self.id.short(),
                        child = element.evaluatable().id().short(),
                        "overriding decision"
                    );
                    return Ok(result);
                }
                Decision::NotApplicable => {}
                Decision::Indeterminate => {
                    let could_override = element
                        .evaluatable()
                        .declared_effect()
                        .map_or(true, |effect| effect == self.overriding);
                    let slot = if could_override {
                        &mut blocking_error
                    } else {
                        &mut overridden_error
                    };
                    if slot.is_none() {
                        *slot = Some(result);
                    }
                }
                _ => match overridden.as_mut() {
                    Some(combined) => combined.merge(result),
                    None => overridden = Some(result),
                },
            }
        }

        Ok(blocking_error
            .or(overridden)
            .or(overridden_error)
            .unwrap_or_else(EvaluationResult::not_applicable))
    }
}
