use pdp_core::{
    CombinerParameter, CombiningAlgorithm, CombiningElement, Decision, Evaluatable,
    EvaluationContext, EvaluationResult, Identifier, Result,
};

/// first-applicable: the first child whose decision is not NotApplicable
#[derive(Debug)]
pub struct FirstApplicable {
    id: Identifier,
}

impl FirstApplicable {
    /// Create the algorithm under `id`
    #[must_use]
    pub fn new(id: impl Into<Identifier>) -> Self {
        Self { id: id.into() }
    }
}

impl<T: Evaluatable + ?Sized> CombiningAlgorithm<T> for FirstApplicable {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn combine(
        &self,
        context: &dyn EvaluationContext,
        elements: &[CombiningElement<T>],
        _parameters: &[CombinerParameter],
    ) -> Result<EvaluationResult> {
        for element in elements {
            let result = element.evaluate(context)?;
            if result.decision() != Decision::NotApplicable {
                return Ok(result);
            }
        }
        Ok(EvaluationResult::not_applicable())
    }
}
