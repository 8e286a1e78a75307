//! One-shot reduction facade over a private copy of the input tree.

use crate::engine::{FormulaEngine, GuardEngine};
use crate::expand::VarResolver;
use crate::reducer::Reducer;
use crate::{ConfigNode, MatchPolicy, ParamGenError, ReductionState};
use log::{debug, info};

/// Parameter generator.
///
/// Holds its own deep copy of the input tree. `reduce` (or `reduce_with`)
/// may succeed at most once; afterwards the tree is read-only through
/// [`ParamGen::data`]. A failed reduction leaves both the tree and the state
/// untouched.
///
/// There is no internal locking: one instance must not be reduced from two
/// threads at once, while separate instances are fully independent.
#[derive(Debug, Clone)]
pub struct ParamGen<E = FormulaEngine> {
    data: ConfigNode,
    policy: MatchPolicy,
    state: ReductionState,
    engine: E,
}

impl ParamGen<FormulaEngine> {
    /// Create a generator with the default guard engine.
    pub fn new(data: &ConfigNode, policy: MatchPolicy) -> Result<Self, ParamGenError> {
        Self::with_engine(data, policy, FormulaEngine)
    }

    /// Create a generator from a policy name (`"first"` or `"last"`).
    pub fn with_match(data: &ConfigNode, policy: &str) -> Result<Self, ParamGenError> {
        Self::new(data, policy.parse()?)
    }
}

impl<E: GuardEngine> ParamGen<E> {
    /// Create a generator with a custom guard engine.
    pub fn with_engine(
        data: &ConfigNode,
        policy: MatchPolicy,
        engine: E,
    ) -> Result<Self, ParamGenError> {
        if !data.is_mapping() {
            return Err(ParamGenError::Schema {
                kind: data.kind().to_string(),
                value: data.render(),
            });
        }
        Ok(Self {
            data: data.clone(),
            policy,
            state: ReductionState::Unreduced,
            engine,
        })
    }

    /// Current tree: the original copy before reduction, the result after.
    pub fn data(&self) -> &ConfigNode {
        &self.data
    }

    pub fn into_data(self) -> ConfigNode {
        self.data
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn state(&self) -> ReductionState {
        self.state
    }

    pub fn is_reduced(&self) -> bool {
        self.state == ReductionState::Reduced
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Reduce without a resolver; any placeholder in the tree is an error.
    pub fn reduce(&mut self) -> Result<(), ParamGenError> {
        self.reduce_inner(None)
    }

    /// Reduce, expanding placeholders through `resolver`.
    pub fn reduce_with(&mut self, resolver: &dyn VarResolver) -> Result<(), ParamGenError> {
        self.reduce_inner(Some(resolver))
    }

    fn reduce_inner(&mut self, resolver: Option<&dyn VarResolver>) -> Result<(), ParamGenError> {
        if self.state == ReductionState::Reduced {
            return Err(ParamGenError::AlreadyReduced);
        }
        if self.data.as_mapping().is_none_or(|mapping| mapping.is_empty()) {
            return Err(ParamGenError::EmptyData);
        }

        info!(
            "reducing parameter data (policy={}, resolver_set={})",
            self.policy,
            resolver.is_some()
        );
        let reducer = Reducer::new(&self.engine, self.policy);
        let reduced = reducer.reduce_node(self.data.clone(), resolver)?;
        debug!("reduced parameter data to {}", reduced.kind());
        self.data = reduced;
        self.state = ReductionState::Reduced;
        info!("parameter data reduced");
        Ok(())
    }
}
