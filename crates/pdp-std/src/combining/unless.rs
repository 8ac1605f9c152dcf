use pdp_core::{
    CombinerParameter, CombiningAlgorithm, CombiningElement, Effect, Evaluatable,
    EvaluationContext, EvaluationResult, Identifier, Result,
};

/// deny-unless-permit and permit-unless-deny
///
/// Never NotApplicable, never Indeterminate: the first child producing the
/// winning effect decides, otherwise the fallback effect is returned with
/// whatever the children that produced it attached.
#[derive(Debug)]
pub struct Unless {
    id: Identifier,
    winning: Effect,
    fallback: Effect,
}

impl Unless {
    /// deny-unless-permit under `id`
    #[must_use]
    pub fn deny_unless_permit(id: impl Into<Identifier>) -> Self {
        Self {
            id: id.into(),
            winning: Effect::Permit,
            fallback: Effect::Deny,
        }
    }

    /// permit-unless-deny under `id`
    #[must_use]
    pub fn permit_unless_deny(id: impl Into<Identifier>) -> Self {
        Self {
            id: id.into(),
            winning: Effect::Deny,
            fallback: Effect::Permit,
        }
    }
}

impl<T: Evaluatable + ?Sized> CombiningAlgorithm<T> for Unless {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn combine(
        &self,
        context: &dyn EvaluationContext,
        elements: &[CombiningElement<T>],
        _parameters: &[CombinerParameter],
    ) -> Result<EvaluationResult> {
        let mut combined = EvaluationResult::from(self.fallback);

        for element in elements {
            let result = element.evaluate(context)?;
            if result.decision() == self.winning.decision() {
                return Ok(result);
            }
            if result.decision() == self.fallback.decision() {
                combined.merge(result);
            }
        }

        Ok(combined)
    }

    // Only the fallback is certain, and only when no child can produce the winner.
    fn declared_effect(&self, elements: &[CombiningElement<T>]) -> Option<Effect> {
        elements
            .iter()
            .all(|element| element.evaluatable().declared_effect() == Some(self.fallback))
            .then_some(self.fallback)
    }
}
