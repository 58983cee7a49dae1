//! The node arena and the operations that grow it.

use std::cell::{Ref, RefCell};
use std::fmt;

use log::trace;

use crate::config::GraphConfig;
use crate::error::{EngineError, Result};
use crate::ops::Op;
use crate::value::{Operand, Value};

/// Stable index of a node inside its [`Graph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) value: f64,
    pub(crate) grad: f64,
    pub(crate) op: Op,
    pub(crate) operands: Vec<NodeId>,
    pub(crate) label: String,
}

/// Arena owning every node of a computation.
///
/// Nodes are appended and never removed, so a node's operands always have
/// smaller indices than the node itself and the graph cannot contain a
/// cycle. Handles ([`Value`]) borrow the graph, which keeps every node alive
/// for as long as anything can still reach it.
///
/// Only gradients change after a node is created. The graph is meant for a
/// single thread; share it across threads only behind your own lock.
#[derive(Debug, Default)]
pub struct Graph {
    pub(crate) nodes: RefCell<Vec<Node>>,
    config: GraphConfig,
}

impl Graph {
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Graph {
            nodes: RefCell::new(Vec::with_capacity(config.capacity)),
            config,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Number of nodes allocated so far, constants included.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Create an input node.
    pub fn leaf(&self, value: f64) -> Value<'_> {
        self.leaf_labeled(value, "")
    }

    /// Create an input node carrying a debug label.
    pub fn leaf_labeled(&self, value: f64, label: impl Into<String>) -> Value<'_> {
        let id = self.push(value, Op::Leaf, Vec::new(), label.into());
        Value::new(self, id)
    }

    pub fn value_of(&self, id: NodeId) -> Option<f64> {
        self.nodes.borrow().get(id.0).map(|node| node.value)
    }

    pub fn grad_of(&self, id: NodeId) -> Option<f64> {
        self.nodes.borrow().get(id.0).map(|node| node.grad)
    }

    pub fn add<'g>(
        &'g self,
        a: impl Into<Operand<'g>>,
        b: impl Into<Operand<'g>>,
    ) -> Result<Value<'g>> {
        let (a, b) = (a.into(), b.into());
        self.check("add", &[a, b])?;
        let (a, b) = (self.resolve(a), self.resolve(b));
        Ok(Value::new(self, self.apply(Op::Add, vec![a, b])))
    }

    pub fn multiply<'g>(
        &'g self,
        a: impl Into<Operand<'g>>,
        b: impl Into<Operand<'g>>,
    ) -> Result<Value<'g>> {
        let (a, b) = (a.into(), b.into());
        self.check("multiply", &[a, b])?;
        let (a, b) = (self.resolve(a), self.resolve(b));
        Ok(Value::new(self, self.apply(Op::Mul, vec![a, b])))
    }

    /// `a * -1`.
    pub fn negate<'g>(&'g self, a: impl Into<Operand<'g>>) -> Result<Value<'g>> {
        let a = a.into();
        self.check("negate", &[a])?;
        let a = self.resolve(a);
        Ok(Value::new(self, self.negated(a)))
    }

    /// `a + (-b)`.
    pub fn subtract<'g>(
        &'g self,
        a: impl Into<Operand<'g>>,
        b: impl Into<Operand<'g>>,
    ) -> Result<Value<'g>> {
        let (a, b) = (a.into(), b.into());
        self.check("subtract", &[a, b])?;
        let a = self.resolve(a);
        let b = self.resolve(b);
        let neg_b = self.negated(b);
        Ok(Value::new(self, self.apply(Op::Add, vec![a, neg_b])))
    }

    /// `a ** p` for a fixed real exponent `p`.
    ///
    /// Node-valued exponents are rejected with [`EngineError::InvalidOperand`].
    pub fn power<'g>(
        &'g self,
        a: impl Into<Operand<'g>>,
        p: impl Into<Operand<'g>>,
    ) -> Result<Value<'g>> {
        let exponent = match p.into() {
            Operand::Scalar(p) => p,
            Operand::Node(_) => {
                return Err(EngineError::invalid_operand(
                    "power",
                    "exponent must be a plain real number, not a node",
                ))
            }
        };
        let a = a.into();
        self.check("power", &[a])?;
        let a = self.resolve(a);
        Ok(Value::new(self, self.apply(Op::Pow(exponent), vec![a])))
    }

    /// `a * b ** -1`.
    pub fn divide<'g>(
        &'g self,
        a: impl Into<Operand<'g>>,
        b: impl Into<Operand<'g>>,
    ) -> Result<Value<'g>> {
        let (a, b) = (a.into(), b.into());
        self.check("divide", &[a, b])?;
        let a = self.resolve(a);
        let b = self.resolve(b);
        let recip = self.apply(Op::Pow(-1.0), vec![b]);
        Ok(Value::new(self, self.apply(Op::Mul, vec![a, recip])))
    }

    pub fn tanh<'g>(&'g self, a: impl Into<Operand<'g>>) -> Result<Value<'g>> {
        self.unary("tanh", Op::Tanh, a.into())
    }

    pub fn exp<'g>(&'g self, a: impl Into<Operand<'g>>) -> Result<Value<'g>> {
        self.unary("exp", Op::Exp, a.into())
    }

    pub fn relu<'g>(&'g self, a: impl Into<Operand<'g>>) -> Result<Value<'g>> {
        self.unary("relu", Op::Relu, a.into())
    }

    pub(crate) fn owns(&self, value: &Value<'_>) -> bool {
        std::ptr::eq(value.graph, self)
    }

    pub(crate) fn node(&self, id: NodeId) -> Ref<'_, Node> {
        Ref::map(self.nodes.borrow(), |nodes| &nodes[id.0])
    }

    fn unary<'g>(&'g self, name: &'static str, op: Op, a: Operand<'g>) -> Result<Value<'g>> {
        self.check(name, &[a])?;
        let a = self.resolve(a);
        Ok(Value::new(self, self.apply(op, vec![a])))
    }

    // Validation runs before anything is allocated.
    fn check(&self, op: &'static str, operands: &[Operand<'_>]) -> Result<()> {
        for operand in operands {
            if let Operand::Node(value) = operand {
                if !self.owns(value) {
                    return Err(EngineError::TypeMismatch { op });
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, operand: Operand<'_>) -> NodeId {
        match operand {
            Operand::Node(value) => value.id,
            Operand::Scalar(x) => self.push(x, Op::Leaf, Vec::new(), String::new()),
        }
    }

    fn negated(&self, a: NodeId) -> NodeId {
        let minus_one = self.push(-1.0, Op::Leaf, Vec::new(), String::new());
        self.apply(Op::Mul, vec![a, minus_one])
    }

    fn apply(&self, op: Op, operands: Vec<NodeId>) -> NodeId {
        debug_assert_eq!(operands.len(), op.arity());
        let value = {
            let nodes = self.nodes.borrow();
            let inputs: Vec<f64> = operands.iter().map(|id| nodes[id.0].value).collect();
            op.forward(&inputs)
        };
        self.push(value, op, operands, op.label().to_string())
    }

    fn push(&self, value: f64, op: Op, operands: Vec<NodeId>, label: String) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len());
        trace!("node {} = {:?}{:?} -> {}", id, op, operands, value);
        nodes.push(Node {
            value,
            grad: 0.0,
            op,
            operands,
            label,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const TEST_RANGE: f64 = 100.0;

    #[test]
    fn test_leaf_has_no_operands() {
        let graph = Graph::new();
        let x = graph.leaf_labeled(3.5, "x");
        assert_eq!(x.value(), 3.5);
        assert_eq!(x.grad(), 0.0);
        assert_eq!(x.label(), "x");
        assert_eq!(x.op(), Op::Leaf);
        assert!(x.operands().is_empty());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_literals_are_promoted_to_leaves() {
        let graph = Graph::new();
        let x = graph.leaf(2.0);
        let y = graph.add(x, 5.0).unwrap();
        assert_eq!(y.value(), 7.0);
        assert_eq!(y.label(), "+");
        assert_eq!(graph.len(), 3);

        let operands = y.operands();
        assert_eq!(operands[0], x);
        assert_eq!(operands[1].value(), 5.0);
        assert_eq!(operands[1].op(), Op::Leaf);
    }

    #[test]
    fn test_negate_expands_to_multiply() {
        let graph = Graph::new();
        let x = graph.leaf(4.0);
        let y = graph.negate(x).unwrap();
        assert_eq!(y.value(), -4.0);
        assert_eq!(y.op(), Op::Mul);
        assert_eq!(y.operands()[1].value(), -1.0);
    }

    #[test]
    fn test_subtract_and_divide_are_not_commutative() {
        let graph = Graph::new();
        let x = graph.leaf(8.0);
        assert_eq!(graph.subtract(x, 3.0).unwrap().value(), 5.0);
        assert_eq!(graph.subtract(3.0, x).unwrap().value(), -5.0);
        assert_relative_eq!(graph.divide(x, 2.0).unwrap().value(), 4.0);
        assert_relative_eq!(graph.divide(2.0, x).unwrap().value(), 0.25);
    }

    #[test]
    fn test_node_exponent_is_rejected() {
        let graph = Graph::new();
        let x = graph.leaf(2.0);
        let p = graph.leaf(3.0);
        let before = graph.len();

        let err = graph.power(x, p).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperand { op: "power", .. }));
        assert_eq!(graph.len(), before);
    }

    #[test]
    fn test_foreign_operand_is_rejected_without_allocating() {
        let graph = Graph::new();
        let other = Graph::new();
        let x = graph.leaf(1.0);
        let y = other.leaf(2.0);

        assert_eq!(
            graph.add(x, y).unwrap_err(),
            EngineError::TypeMismatch { op: "add" }
        );
        assert_eq!(
            graph.subtract(3.0, y).unwrap_err(),
            EngineError::TypeMismatch { op: "subtract" }
        );
        assert_eq!(
            graph.tanh(y).unwrap_err(),
            EngineError::TypeMismatch { op: "tanh" }
        );
        assert_eq!(graph.len(), 1);
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_lookup_by_id() {
        let graph = Graph::new();
        let x = graph.leaf(1.25);
        assert_eq!(graph.value_of(x.id()), Some(1.25));
        assert_eq!(graph.grad_of(x.id()), Some(0.0));
        assert_eq!(graph.value_of(NodeId(42)), None);
    }

    #[test]
    fn test_capacity_from_config() {
        let graph = Graph::with_config(GraphConfig::new().with_capacity(16));
        assert!(graph.is_empty());
        assert_eq!(graph.config().capacity, 16);
        assert!(graph.nodes.borrow().capacity() >= 16);
    }

    proptest! {
        #[test]
        fn test_forward_values(x in -TEST_RANGE..TEST_RANGE, y in -TEST_RANGE..TEST_RANGE) {
            let graph = Graph::new();
            let a = graph.leaf(x);
            let b = graph.leaf(y);
            prop_assert_eq!(graph.add(a, b).unwrap().value(), x + y);
            prop_assert_eq!(graph.multiply(a, b).unwrap().value(), x * y);
            prop_assert_eq!(graph.add(y, a).unwrap().value(), y + x);
            prop_assert_eq!(graph.multiply(y, a).unwrap().value(), y * x);
            prop_assert_eq!(graph.subtract(a, b).unwrap().value(), x + y * -1.0);
            prop_assert_eq!(graph.tanh(a).unwrap().value(), x.tanh());
        }

        #[test]
        fn test_power_value(x in 0.1..10.0f64, p in -3.0..3.0f64) {
            let graph = Graph::new();
            let a = graph.leaf(x);
            let out = graph.power(a, p).unwrap();
            prop_assert_eq!(out.value(), x.powf(p));
            prop_assert_eq!(out.op(), Op::Pow(p));
        }
    }
}
