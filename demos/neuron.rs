use scalargrad::{Graph, GraphConfig};

fn main() {
    let graph = Graph::with_config(GraphConfig::new().with_capacity(32));

    // inputs
    let x1 = graph.leaf_labeled(2.0, "x1");
    let x2 = graph.leaf_labeled(0.0, "x2");
    // weights
    let w1 = graph.leaf_labeled(-3.0, "w1");
    let w2 = graph.leaf_labeled(1.0, "w2");
    // bias
    let b = graph.leaf_labeled(6.881_373_587_019_543, "b");

    let n = x1 * w1 + x2 * w2 + b;
    let o = n.tanh();
    o.backward();

    println!("o  {o}");
    for v in [x1, w1, x2, w2, b] {
        println!("{:<3}{}", v.label(), v);
    }

    // same neuron with tanh spelled out: (e^2n - 1) / (e^2n + 1)
    graph.reset_gradients();
    let e = (2.0 * n).exp();
    let o = (e - 1.0) / (e + 1.0);
    o.backward();

    println!("o  {o}");
    for v in [x1, w1, x2, w2, b] {
        println!("{:<3}{}", v.label(), v);
    }
    println!("{} nodes in graph", graph.len());
}
