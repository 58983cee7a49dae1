//! Reverse-mode evaluation over a [`Graph`].
//!
//! A pass has two phases: a post-order walk collecting every node reachable
//! from the output (each node exactly once), then a walk of that order in
//! reverse, where each node pushes its gradient into its operands. Because a
//! node is emitted only after all of its operands, the reverse walk reaches a
//! node only once every consumer has finished contributing to it.

use std::collections::HashSet;

use log::debug;

use crate::error::{EngineError, Result};
use crate::graph::{Graph, NodeId};
use crate::value::Value;

impl Graph {
    /// Populate gradients of every ancestor of `output`.
    ///
    /// The output gradient is seeded to 1.0. Other gradients accumulate on
    /// top of whatever they already hold, so call [`Graph::reset_gradients`]
    /// between unrelated passes (or enable
    /// [`GraphConfig::zero_grad_on_backward`](crate::GraphConfig)).
    pub fn backward(&self, output: Value<'_>) -> Result<()> {
        if !self.owns(&output) {
            return Err(EngineError::TypeMismatch { op: "backward" });
        }
        self.backward_from(output.id);
        Ok(())
    }

    /// Nodes reachable from `output`, operands before the nodes built from
    /// them. `output` is always last.
    pub fn topological_order(&self, output: Value<'_>) -> Result<Vec<NodeId>> {
        if !self.owns(&output) {
            return Err(EngineError::TypeMismatch {
                op: "topological_order",
            });
        }
        Ok(self.topo(output.id))
    }

    /// Zero the gradient of every node in the graph.
    pub fn reset_gradients(&self) {
        let mut nodes = self.nodes.borrow_mut();
        debug!("resetting gradients of {} nodes", nodes.len());
        for node in nodes.iter_mut() {
            node.grad = 0.0;
        }
    }

    pub(crate) fn backward_from(&self, output: NodeId) {
        if self.config().zero_grad_on_backward {
            self.reset_gradients();
        }

        let order = self.topo(output);
        debug!("backward from {}: {} reachable nodes", output, order.len());

        let mut nodes = self.nodes.borrow_mut();
        nodes[output.0].grad = 1.0;

        let mut inputs = [0.0; 2];
        for &id in order.iter().rev() {
            let node = &nodes[id.0];
            if node.operands.is_empty() {
                continue;
            }
            for (slot, operand) in inputs.iter_mut().zip(&node.operands) {
                *slot = nodes[operand.0].value;
            }
            let contributions = node.op.local_backward(&inputs, node.value, node.grad);
            let operands = node.operands.clone();
            for (operand, contribution) in operands.into_iter().zip(contributions) {
                nodes[operand.0].grad += contribution;
            }
        }
    }

    // Iterative so that long chains cannot overflow the call stack.
    fn topo(&self, root: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut agenda = vec![(root, false)];

        while let Some((id, expanded)) = agenda.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            agenda.push((id, true));
            for &operand in nodes[id.0].operands.iter().rev() {
                if !visited.contains(&operand) {
                    agenda.push((operand, false));
                }
            }
        }
        order
    }
}
