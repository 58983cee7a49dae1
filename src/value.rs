use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::Result;
use crate::graph::{Graph, NodeId};
use crate::ops::Op;

/// Handle to a node of a [`Graph`].
///
/// Handles are `Copy` and compare by identity: two handles are equal when
/// they point at the same node of the same graph, whatever their values.
#[derive(Clone, Copy)]
pub struct Value<'g> {
    pub(crate) graph: &'g Graph,
    pub(crate) id: NodeId,
}

/// Either a bare number or an existing node.
///
/// Bare numbers are promoted to constant leaf nodes by the operation that
/// consumes them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand<'g> {
    Scalar(f64),
    Node(Value<'g>),
}

impl<'g> From<Value<'g>> for Operand<'g> {
    fn from(value: Value<'g>) -> Self {
        Operand::Node(value)
    }
}

impl From<f64> for Operand<'_> {
    fn from(x: f64) -> Self {
        Operand::Scalar(x)
    }
}

impl From<f32> for Operand<'_> {
    fn from(x: f32) -> Self {
        Operand::Scalar(f64::from(x))
    }
}

impl From<i32> for Operand<'_> {
    fn from(x: i32) -> Self {
        Operand::Scalar(f64::from(x))
    }
}

impl<'g> Value<'g> {
    pub(crate) fn new(graph: &'g Graph, id: NodeId) -> Self {
        Value { graph, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The forward result. Never changes once the node exists.
    pub fn value(&self) -> f64 {
        self.graph.node(self.id).value
    }

    /// Accumulated derivative of the last backward output with respect to
    /// this node.
    pub fn grad(&self) -> f64 {
        self.graph.node(self.id).grad
    }

    pub fn label(&self) -> String {
        self.graph.node(self.id).label.clone()
    }

    pub fn op(&self) -> Op {
        self.graph.node(self.id).op
    }

    pub fn operands(&self) -> Vec<Value<'g>> {
        self.graph
            .node(self.id)
            .operands
            .iter()
            .map(|&id| Value::new(self.graph, id))
            .collect()
    }

    pub fn is_leaf(&self) -> bool {
        self.graph.node(self.id).operands.is_empty()
    }

    /// Raise to a fixed real exponent.
    pub fn powf(self, exponent: f64) -> Value<'g> {
        built(self.graph.power(self, exponent))
    }

    /// Raise to `exponent`, which must be a plain number.
    pub fn pow(self, exponent: impl Into<Operand<'g>>) -> Result<Value<'g>> {
        self.graph.power(self, exponent)
    }

    pub fn tanh(self) -> Value<'g> {
        built(self.graph.tanh(self))
    }

    pub fn exp(self) -> Value<'g> {
        built(self.graph.exp(self))
    }

    pub fn relu(self) -> Value<'g> {
        built(self.graph.relu(self))
    }

    /// Run a backward pass with this node as the output.
    pub fn backward(self) {
        self.graph.backward_from(self.id);
    }

    pub fn zero_grad(self) {
        self.graph.nodes.borrow_mut()[self.id.0].grad = 0.0;
    }
}

// Operator overloads only fail when handles from two graphs are mixed.
fn built(result: Result<Value<'_>>) -> Value<'_> {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{}", err),
    }
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for Value<'_> {}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.graph.node(self.id);
        f.debug_struct("Value")
            .field("id", &self.id)
            .field("value", &node.value)
            .field("grad", &node.grad)
            .field("op", &node.op)
            .field("label", &node.label)
            .finish()
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.graph.node(self.id);
        write!(f, "data: {}, grad: {}", node.value, node.grad)
    }
}

/// Implements `node op node`, `node op f64` and `f64 op node` on top of a
/// fallible `Graph` method.
///
/// # Panics
///
/// `node op node` panics when the two handles belong to different graphs.
macro_rules! binary_op {
    ($trait:ident, $method:ident, $graph_fn:ident) => {
        impl<'g> $trait for Value<'g> {
            type Output = Value<'g>;

            fn $method(self, rhs: Value<'g>) -> Value<'g> {
                built(self.graph.$graph_fn(self, rhs))
            }
        }

        impl<'g> $trait<f64> for Value<'g> {
            type Output = Value<'g>;

            fn $method(self, rhs: f64) -> Value<'g> {
                built(self.graph.$graph_fn(self, rhs))
            }
        }

        impl<'g> $trait<Value<'g>> for f64 {
            type Output = Value<'g>;

            fn $method(self, rhs: Value<'g>) -> Value<'g> {
                built(rhs.graph.$graph_fn(self, rhs))
            }
        }
    };
}

binary_op!(Add, add, add);
binary_op!(Sub, sub, subtract);
binary_op!(Mul, mul, multiply);
binary_op!(Div, div, divide);

impl<'g> Neg for Value<'g> {
    type Output = Value<'g>;

    fn neg(self) -> Value<'g> {
        built(self.graph.negate(self))
    }
}
