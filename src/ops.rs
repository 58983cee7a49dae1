//! Node kinds and their local derivative rules.

/// The operation that produced a node.
///
/// Composite operations (negate, subtract, divide) never appear here; they
/// are expanded into `Mul`, `Add` and `Pow` nodes when the graph is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Op {
    Leaf,
    Add,
    Mul,
    /// Raise to a fixed real exponent.
    Pow(f64),
    Tanh,
    Exp,
    Relu,
}

impl Op {
    /// Debug tag attached to derived nodes.
    pub fn label(&self) -> &'static str {
        match self {
            Op::Leaf => "",
            Op::Add => "+",
            Op::Mul => "*",
            Op::Pow(_) => "**",
            Op::Tanh => "tanh",
            Op::Exp => "exp",
            Op::Relu => "relu",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Op::Leaf => 0,
            Op::Add | Op::Mul => 2,
            Op::Pow(_) | Op::Tanh | Op::Exp | Op::Relu => 1,
        }
    }

    pub(crate) fn forward(&self, inputs: &[f64]) -> f64 {
        match *self {
            Op::Leaf => unreachable!("leaf values are supplied, not computed"),
            Op::Add => inputs[0] + inputs[1],
            Op::Mul => inputs[0] * inputs[1],
            Op::Pow(p) => inputs[0].powf(p),
            Op::Tanh => inputs[0].tanh(),
            Op::Exp => inputs[0].exp(),
            Op::Relu => inputs[0].max(0.0),
        }
    }

    /// Contribution of `out_grad` to each operand's gradient.
    ///
    /// `inputs` are the operand values, `out` is this node's value. Only the
    /// first `arity()` entries of the result are meaningful. Callers add the
    /// contributions; no rule ever overwrites an operand gradient.
    pub(crate) fn local_backward(&self, inputs: &[f64], out: f64, out_grad: f64) -> [f64; 2] {
        match *self {
            Op::Leaf => [0.0, 0.0],
            Op::Add => [out_grad, out_grad],
            Op::Mul => [inputs[1] * out_grad, inputs[0] * out_grad],
            Op::Pow(p) => [p * inputs[0].powf(p - 1.0) * out_grad, 0.0],
            Op::Tanh => [(1.0 - out * out) * out_grad, 0.0],
            Op::Exp => [out * out_grad, 0.0],
            Op::Relu => {
                let slope = if out > 0.0 { 1.0 } else { 0.0 };
                [slope * out_grad, 0.0]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_labels_and_arity() {
        assert_eq!(Op::Add.label(), "+");
        assert_eq!(Op::Pow(2.0).label(), "**");
        assert_eq!(Op::Tanh.label(), "tanh");
        assert_eq!(Op::Leaf.arity(), 0);
        assert_eq!(Op::Mul.arity(), 2);
        assert_eq!(Op::Relu.arity(), 1);
    }

    #[test]
    fn test_forward_values() {
        assert_eq!(Op::Add.forward(&[2.0, 3.0]), 5.0);
        assert_eq!(Op::Mul.forward(&[2.0, -3.0]), -6.0);
        assert_eq!(Op::Pow(3.0).forward(&[2.0]), 8.0);
        assert_eq!(Op::Relu.forward(&[-1.5]), 0.0);
        assert_relative_eq!(Op::Tanh.forward(&[0.5]), 0.5_f64.tanh());
    }

    #[test]
    fn test_mul_rule_swaps_operand_values() {
        let grads = Op::Mul.local_backward(&[2.0, -3.0], -6.0, 0.5);
        assert_eq!(grads, [-1.5, 1.0]);
    }

    #[test]
    fn test_pow_rule() {
        // d/dx x^3 at x = 2 is 12
        let grads = Op::Pow(3.0).local_backward(&[2.0], 8.0, 1.0);
        assert_relative_eq!(grads[0], 12.0);
    }

    #[test]
    fn test_tanh_rule_uses_output_value() {
        let out = 0.3_f64.tanh();
        let grads = Op::Tanh.local_backward(&[0.3], out, 2.0);
        assert_relative_eq!(grads[0], 2.0 * (1.0 - out * out));
    }

    #[test]
    fn test_relu_rule_is_zero_below_origin() {
        assert_eq!(Op::Relu.local_backward(&[-2.0], 0.0, 1.0)[0], 0.0);
        assert_eq!(Op::Relu.local_backward(&[2.0], 2.0, 3.0)[0], 3.0);
    }
}
