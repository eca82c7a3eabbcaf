//! Filter for compiler generated for-each loop plumbing
//!
//! A source-level `for (T x : items)` loop is lowered into an iterator or
//! index loop. The calls, counters and jumps that lowering introduces have
//! no source counterpart a developer could change, so mutants planted on
//! them are either equivalent or duplicate a mutant of the loop body.
//! This filter recognises the four shapes the lowering produces and drops
//! candidates that land on their plumbing.

use super::features::{Feature, InterceptorFactory, InterceptorParams};
use super::{InterceptorType, MutationDetails, MutationInterceptor};
use crate::bytecode::matchers::{
    a_conditional_jump, a_conditional_jump_to, a_label_node, an_int_store, any_instruction,
    goto_label, increments_variable, int_constant, jumps_to, jumps_to_capture, label_node,
    method_call_that_returns, method_call_to, not_an_instruction, opcode,
};
use crate::bytecode::{
    ClassTree, InsnHandle, Instruction, LabelId, Location, MethodTree, Opcode, TypeRef, ValueKind,
};
use crate::sequence::{Context, Match, QueryParams, QueryStart, SequenceMatcher, SequenceQuery, Slot};
use crate::{Error, Result};
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const ITERATOR: &str = "java/util/Iterator";

/// Feature name used in settings
pub const FEATURE_NAME: &str = "FFEACH";

lazy_static! {
    static ref GRAMMARS: Result<Vec<SequenceMatcher<Instruction>>> = compile_grammars();
}

fn iterator_call() -> Match<Instruction> {
    method_call_that_returns(TypeRef::object(ITERATOR))
}

fn has_next() -> Match<Instruction> {
    method_call_to(ITERATOR, "hasNext")
}

fn next() -> Match<Instruction> {
    method_call_to(ITERATOR, "next")
}

fn body() -> SequenceQuery<Instruction> {
    QueryStart::matching(any_instruction())
}

fn plumbing(m: Match<Instruction>) -> Match<Instruction> {
    m.and(Match::record())
}

/// Iterator loop with the `hasNext` test after the body
fn iterator_test_at_bottom() -> SequenceQuery<Instruction> {
    let loop_start: Slot<LabelId> = Slot::new("loopStart");
    let loop_end: Slot<LabelId> = Slot::new("loopEnd");

    QueryStart::matching(plumbing(iterator_call()))
        .then(opcode(Opcode::Store(ValueKind::Reference)))
        .then(goto_label(loop_end.write()))
        .then(a_label_node(loop_start.write()))
        .then(opcode(Opcode::Load(ValueKind::Reference)))
        .then(plumbing(next()))
        .zero_or_more(body())
        .then(label_node(loop_end.read()))
        .then(opcode(Opcode::Load(ValueKind::Reference)))
        .then(plumbing(has_next()))
        .then(plumbing(a_conditional_jump_to(&loop_start)))
}

/// Iterator loop with the `hasNext` test before the body
fn iterator_test_at_top() -> SequenceQuery<Instruction> {
    let loop_start: Slot<LabelId> = Slot::new("loopStart");
    let loop_end: Slot<LabelId> = Slot::new("loopEnd");

    QueryStart::matching(plumbing(iterator_call()))
        .then(opcode(Opcode::Store(ValueKind::Reference)))
        .then(a_label_node(loop_start.write()))
        .then(opcode(Opcode::Load(ValueKind::Reference)))
        .then(plumbing(has_next()))
        .then(plumbing(
            a_conditional_jump().and(jumps_to_capture(loop_end.write())),
        ))
        .then(opcode(Opcode::Load(ValueKind::Reference)))
        .then(plumbing(next()))
        .zero_or_more(body())
        .then(opcode(Opcode::Goto).and(jumps_to(loop_start.read())))
        .then(label_node(loop_end.read()))
}

/// Index loop over an array with the bound check after the body
fn array_test_at_bottom() -> SequenceQuery<Instruction> {
    let loop_start: Slot<LabelId> = Slot::new("loopStart");
    let loop_end: Slot<LabelId> = Slot::new("loopEnd");
    let counter: Slot<u16> = Slot::new("counter");

    QueryStart::matching(plumbing(opcode(Opcode::ArrayLength)))
        .then(opcode(Opcode::Store(ValueKind::Int)))
        .then(plumbing(int_constant(0)))
        .then(an_int_store(counter.write()))
        .then(goto_label(loop_end.write()))
        .then(a_label_node(loop_start.write()))
        .zero_or_more(body())
        .then(plumbing(increments_variable(counter.read())))
        .then(label_node(loop_end.read()))
        .then(opcode(Opcode::Load(ValueKind::Int)))
        .then(opcode(Opcode::Load(ValueKind::Int)))
        .then(plumbing(a_conditional_jump_to(&loop_start)))
}

/// Index loop over an array with the bound check before the body
fn array_test_at_top() -> SequenceQuery<Instruction> {
    let loop_start: Slot<LabelId> = Slot::new("loopStart");
    let loop_end: Slot<LabelId> = Slot::new("loopEnd");
    let counter: Slot<u16> = Slot::new("counter");

    QueryStart::matching(plumbing(opcode(Opcode::ArrayLength)))
        .then(opcode(Opcode::Store(ValueKind::Int)))
        .then(plumbing(int_constant(0)))
        .then(an_int_store(counter.write()))
        .then(a_label_node(loop_start.write()))
        .then(opcode(Opcode::Load(ValueKind::Int)))
        .then(opcode(Opcode::Load(ValueKind::Int)))
        .then(plumbing(
            a_conditional_jump().and(jumps_to_capture(loop_end.write())),
        ))
        .zero_or_more(body())
        .then(plumbing(increments_variable(counter.read())))
        .then(opcode(Opcode::Goto).and(jumps_to(loop_start.read())))
}

fn compile_grammars() -> Result<Vec<SequenceMatcher<Instruction>>> {
    [
        iterator_test_at_bottom(),
        iterator_test_at_top(),
        array_test_at_bottom(),
        array_test_at_top(),
    ]
    .into_iter()
    .map(|query| query.compile(QueryParams::new().with_ignores(not_an_instruction())))
    .collect()
}

/// Removes mutation candidates that fall on for-each loop plumbing.
///
/// Plumbing sets are computed lazily per method and cached until the class
/// pass ends.
pub struct ForEachLoopFilter {
    grammars: Vec<SequenceMatcher<Instruction>>,
    screen: Match<Instruction>,
    current_class: Option<Arc<ClassTree>>,
    cache: HashMap<Location, Arc<HashSet<InsnHandle>>>,
    debug: bool,
}

impl ForEachLoopFilter {
    /// Create a filter using the shared compiled grammars
    pub fn new() -> Result<Self> {
        let compiled: &Result<Vec<SequenceMatcher<Instruction>>> = &GRAMMARS;
        let grammars = compiled.as_ref().map_err(Clone::clone)?.clone();
        Ok(Self {
            grammars,
            screen: has_next().or(opcode(Opcode::ArrayLength)),
            current_class: None,
            cache: HashMap::new(),
            debug: false,
        })
    }

    /// Trace every matcher step
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Plumbing instructions of a method of the class in progress,
    /// computed on first use
    pub fn plumbing_for(&mut self, location: &Location) -> Result<Arc<HashSet<InsnHandle>>> {
        let class = self.current_class.clone().ok_or(Error::NoClassInProgress)?;
        let method = find_method(&class, location)?;
        Ok(self.cached_plumbing(method))
    }

    fn cached_plumbing(&mut self, method: &MethodTree) -> Arc<HashSet<InsnHandle>> {
        if let Some(found) = self.cache.get(method.location()) {
            return Arc::clone(found);
        }
        let computed = Arc::new(self.compute_plumbing(method));
        self.cache
            .insert(method.location().clone(), Arc::clone(&computed));
        computed
    }

    /// Number of methods analysed in the current class pass
    pub fn cached_methods(&self) -> usize {
        self.cache.len()
    }

    fn might_contain_loop(&self, method: &MethodTree) -> bool {
        method
            .instructions()
            .iter()
            .any(|insn| self.screen.test(Context::start(), insn).is_some())
    }

    fn compute_plumbing(&self, method: &MethodTree) -> HashSet<InsnHandle> {
        if !self.might_contain_loop(method) {
            tracing::trace!(method = %method.location(), "no loop markers, skipping");
            return HashSet::new();
        }

        let instructions = method.instructions();
        let handles: HashSet<InsnHandle> = self
            .grammars
            .iter()
            .flat_map(|grammar| {
                grammar.context_matches(instructions, Context::start().with_debug(self.debug))
            })
            .flat_map(Context::into_recorded)
            .map(|insn| insn.handle())
            .collect();

        tracing::debug!(
            method = %method.location(),
            instructions = instructions.len(),
            plumbing = handles.len(),
            "computed for-each plumbing"
        );
        handles
    }

    fn is_plumbing(&mut self, class: &ClassTree, mutation: &MutationDetails) -> Result<bool> {
        let location = mutation.location();
        let method = find_method(class, location)?;

        let index = mutation.instruction_index();
        let instruction = method
            .instruction(index)
            .ok_or_else(|| Error::InstructionOutOfRange {
                method: location.signature(),
                index,
                length: method.instructions().len(),
            })?;

        let handle = instruction.handle();
        Ok(self.cached_plumbing(method).contains(&handle))
    }
}

fn find_method<'a>(class: &'a ClassTree, location: &Location) -> Result<&'a MethodTree> {
    class.method(location).ok_or_else(|| Error::UnknownMethod {
        class: class.name().to_string(),
        method: location.signature(),
    })
}

impl MutationInterceptor for ForEachLoopFilter {
    fn interceptor_type(&self) -> InterceptorType {
        InterceptorType::Filter
    }

    fn begin(&mut self, class: Arc<ClassTree>) {
        tracing::debug!(class = %class.name(), "for-each filter begin");
        self.cache.clear();
        self.current_class = Some(class);
    }

    fn intercept(&mut self, mutations: Vec<MutationDetails>) -> Result<Vec<MutationDetails>> {
        let class = self.current_class.clone().ok_or(Error::NoClassInProgress)?;

        let mut kept = Vec::with_capacity(mutations.len());
        for mutation in mutations {
            if !self.is_plumbing(&class, &mutation)? {
                kept.push(mutation);
            }
        }
        Ok(kept)
    }

    fn end(&mut self) {
        if let Some(class) = self.current_class.take() {
            tracing::debug!(
                class = %class.name(),
                methods = self.cache.len(),
                "for-each filter end"
            );
        }
        self.cache.clear();
    }
}

/// Publishes [`ForEachLoopFilter`] as the `FFEACH` feature
#[derive(Debug, Clone, Copy, Default)]
pub struct ForEachLoopFilterFactory;

impl InterceptorFactory for ForEachLoopFilterFactory {
    fn provides(&self) -> Feature {
        Feature::named(FEATURE_NAME)
            .with_on_by_default(true)
            .with_description("Filters mutations in compiler generated code in for each loops")
    }

    fn create_interceptor(&self, params: &InterceptorParams) -> Result<Box<dyn MutationInterceptor>> {
        let debug = params.get_bool("debug")?.unwrap_or(false);
        Ok(Box::new(ForEachLoopFilter::new()?.with_debug(debug)))
    }
}
