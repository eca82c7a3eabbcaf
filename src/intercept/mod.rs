//! # Mutation Interceptors
//!
//! Interceptors sit between the mutation candidate generator and the test
//! runner. Each sees the candidates for one class at a time, bracketed by
//! `begin` and `end`, and may remove, modify or report on them.
//!
//! The pipeline orders interceptors by [`InterceptorType`], so removing
//! filters run after anything that rewrites candidates and before
//! reporters.

pub mod features;
pub mod foreach;
mod mutation;

pub use features::{Feature, FeatureSelector, FeatureSetting, InterceptorFactory, InterceptorParams};
pub use foreach::{ForEachLoopFilter, ForEachLoopFilterFactory};
pub use mutation::{MutationDetails, MutationIdentifier};

use crate::bytecode::ClassTree;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What an interceptor does to the candidate list; also its run order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterceptorType {
    /// Unclassified
    Other,
    /// Rewrites candidates
    Modify,
    /// Removes candidates
    Filter,
    /// Removes candidates before any analysis is spent on them
    PreScanFilter,
    /// Observes candidates without changing them
    Report,
}

impl InterceptorType {
    /// Whether this kind only ever removes candidates
    pub fn is_removing(&self) -> bool {
        matches!(self, InterceptorType::Filter | InterceptorType::PreScanFilter)
    }
}

/// One stage of the candidate pipeline.
///
/// A stage is driven one class at a time: `begin`, any number of
/// `intercept` calls, then `end`. Instances hold per-class state and must
/// not be shared between classes processed concurrently.
pub trait MutationInterceptor: Send {
    /// What this stage does
    fn interceptor_type(&self) -> InterceptorType;

    /// Start processing a class
    fn begin(&mut self, class: Arc<ClassTree>);

    /// Transform the candidates for the current class
    fn intercept(&mut self, mutations: Vec<MutationDetails>) -> Result<Vec<MutationDetails>>;

    /// Finish the current class
    fn end(&mut self);
}

/// Runs a list of interceptors in type order, each fed the previous output
pub struct CompoundInterceptor {
    children: Vec<Box<dyn MutationInterceptor>>,
}

impl CompoundInterceptor {
    /// Create a pipeline; children are sorted stably by type
    pub fn new(mut children: Vec<Box<dyn MutationInterceptor>>) -> Self {
        children.sort_by_key(|child| child.interceptor_type());
        Self { children }
    }

    /// Types of the children, in run order
    pub fn interceptor_types(&self) -> Vec<InterceptorType> {
        self.children.iter().map(|c| c.interceptor_type()).collect()
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the pipeline has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl MutationInterceptor for CompoundInterceptor {
    fn interceptor_type(&self) -> InterceptorType {
        InterceptorType::Other
    }

    fn begin(&mut self, class: Arc<ClassTree>) {
        for child in &mut self.children {
            child.begin(Arc::clone(&class));
        }
    }

    fn intercept(&mut self, mut mutations: Vec<MutationDetails>) -> Result<Vec<MutationDetails>> {
        for child in &mut self.children {
            let before = mutations.len();
            mutations = child.intercept(mutations)?;
            let kind = child.interceptor_type();
            if kind.is_removing() && mutations.len() > before {
                tracing::warn!(
                    interceptor = ?kind,
                    before,
                    after = mutations.len(),
                    "removing interceptor added candidates"
                );
            }
        }
        Ok(mutations)
    }

    fn end(&mut self) {
        for child in &mut self.children {
            child.end();
        }
    }
}
