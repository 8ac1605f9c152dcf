use pdp_core::{
    CombinerParameter, CombiningAlgorithm, CombiningElement, Evaluatable, EvaluationContext,
    EvaluationResult, Identifier, MatchCode, Result, Status,
};
use tracing::debug;

/// only-one-applicable: exactly one child's target may match
///
/// Targets are matched first without evaluating anything. A target that
/// cannot be matched, or a second matching target, makes the result
/// Indeterminate; otherwise the single applicable child is evaluated.
#[derive(Debug)]
pub struct OnlyOneApplicable {
    id: Identifier,
}

impl OnlyOneApplicable {
    /// Create the algorithm under `id`
    #[must_use]
    pub fn new(id: impl Into<Identifier>) -> Self {
        Self { id: id.into() }
    }
}

impl<T: Evaluatable + ?Sized> CombiningAlgorithm<T> for OnlyOneApplicable {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn combine(
        &self,
        context: &dyn EvaluationContext,
        elements: &[CombiningElement<T>],
        _parameters: &[CombinerParameter],
    ) -> Result<EvaluationResult> {
        let mut selected: Option<&CombiningElement<T>> = None;

        for element in elements {
            let matched = element.match_request(context);
            match matched.code() {
                MatchCode::NoMatch => {}
                MatchCode::Indeterminate => {
                    return Ok(EvaluationResult::indeterminate(matched.into_status()));
                }
                MatchCode::Match if selected.is_some() => {
                    debug!(
                        algorithm = self.id.short(),
                        child = element.evaluatable().id().short(),
                        "second applicable child"
                    );
                    return Ok(EvaluationResult::indeterminate(
                        Status::processing_error("Too many applicable policies")
                            .prefixed(self.id.short()),
                    ));
                }
                MatchCode::Match => selected = Some(element),
            }
        }

        match selected {
            Some(element) => element.evaluate(context),
            None => Ok(EvaluationResult::not_applicable()),
        }
    }
}
