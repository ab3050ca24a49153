//! Re-entrant check coordination.
//!
//! Checking a synthesized declaration can resolve names that synthesize more
//! declarations, whose checks would resolve more names, and so on. Checking
//! each new declaration on the spot would nest one host check per link of
//! that chain. Instead, requests go into a FIFO queue and only the outermost
//! caller drains it: nested requests return at once, and the host stack
//! stays flat however long the chain gets.
//!
//! Until `pre_check` runs, requests are queued and nothing is checked; the
//! declarations are already bound, so name resolution sees them.

use crate::error::EvalError;
use crate::plugin::ScopedDebugInfoPlugin;
use dbgeval_binder::{ProgramId, ScopeId};
use dbgeval_checker::{CheckAbort, CompilerContext};
use dbgeval_parser::NodeIndex;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::{Level, debug, span, trace};

/// A declaration waiting to be checked, with the context it was bound in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckRequest {
    pub node: NodeIndex,
    pub scope: ScopeId,
    /// Enclosing class declaration for members, `NONE` at top level.
    pub parent_class: NodeIndex,
    pub program: ProgramId,
}

#[derive(Debug, Default)]
pub(crate) struct CheckCoordinator {
    /// A drain is running further up the stack.
    checking: bool,
    prechecked: bool,
    queue: VecDeque<CheckRequest>,
    checked: FxHashSet<u32>,
    order: Vec<NodeIndex>,
    /// Deepest host check nesting seen while draining.
    max_depth: u32,
}

impl ScopedDebugInfoPlugin {
    /// Queue `request` and drain the queue unless a drain is already running
    /// or checking has not started. Returns whether the queue was drained
    /// here.
    pub(crate) fn check_new_node(
        &mut self,
        host: &mut CompilerContext,
        request: CheckRequest,
    ) -> Result<bool, EvalError> {
        self.coordinator.queue.push_back(request);
        if self.coordinator.checking || !self.coordinator.prechecked {
            trace!(
                node = request.node.0,
                queued = self.coordinator.queue.len(),
                checking = self.coordinator.checking,
                "check deferred"
            );
            return Ok(false);
        }
        self.drain_check_queue(host)?;
        Ok(true)
    }

    /// Start checking: anything queued so far is checked now, and later
    /// requests are checked as they arrive.
    pub fn pre_check(&mut self, host: &mut CompilerContext) -> Result<(), EvalError> {
        self.coordinator.prechecked = true;
        if self.coordinator.checking || self.coordinator.queue.is_empty() {
            return Ok(());
        }
        debug!(queued = self.coordinator.queue.len(), "pre_check draining");
        self.drain_check_queue(host)
    }

    /// After the evaluation program is checked, nothing may be pending.
    pub fn post_check(&self) -> Result<(), EvalError> {
        let pending = self.coordinator.queue.len();
        if self.coordinator.checking || pending != 0 {
            return Err(EvalError::CheckerNotIdle { pending });
        }
        Ok(())
    }

    fn drain_check_queue(&mut self, host: &mut CompilerContext) -> Result<(), EvalError> {
        let _span = span!(Level::DEBUG, "drain_check_queue").entered();
        self.coordinator.checking = true;
        let result = self.drain_loop(host);
        self.coordinator.checking = false;
        result
    }

    fn drain_loop(&mut self, host: &mut CompilerContext) -> Result<(), EvalError> {
        while let Some(request) = self.coordinator.queue.pop_front() {
            if !self.coordinator.checked.insert(request.node.0) {
                return Err(EvalError::DoubleCheck {
                    node: request.node.0,
                });
            }
            self.coordinator.order.push(request.node);
            trace!(node = request.node.0, program = request.program.0, "checking synthesized node");
            host.with_stable_state(|host| -> Result<(), CheckAbort> {
                host.handle_custom_nodes(self, request.node)?;
                host.binder
                    .with_scope(request.scope, |binder| binder.resolve_references(&host.arena, request.node));
                if !host.is_checked(request.node) {
                    host.check_node(self, request.node)?;
                }
                Ok(())
            })?;
            self.coordinator.max_depth = self.coordinator.max_depth.max(host.max_check_depth());
        }
        Ok(())
    }

    /// Synthesized declarations in the order they were checked.
    pub fn checked_order(&self) -> &[NodeIndex] {
        &self.coordinator.order
    }

    /// Deepest nesting of host checks observed by any drain. Stays at two
    /// (the evaluation program, then one synthesized declaration) however
    /// long a superclass chain is.
    pub fn max_depth(&self) -> u32 {
        self.coordinator.max_depth
    }

    pub fn pending_checks(&self) -> usize {
        self.coordinator.queue.len()
    }

    pub fn is_prechecked(&self) -> bool {
        self.coordinator.prechecked
    }
}
