use scalargrad::Graph;

fn main() {
    let graph = Graph::new();
    let x = graph.leaf_labeled(2.0, "x");
    let y = graph.leaf_labeled(3.0, "y");
    let a = 10.0;
    let b = 10.0;
    let z = (a * x) + y;
    let w = (b * x) * y;
    let tanh_in = graph.leaf_labeled(0.0, "t");
    let tanh = tanh_in.tanh();

    // Perform the backward pass wrt `z` and print the gradients
    z.backward();
    println!("Gradient of z w.r.t x: {}", x.grad()); // 10
    println!("Gradient of z w.r.t y: {}", y.grad()); // 1

    // Gradients accumulate, so clear them before the next output
    graph.reset_gradients();
    w.backward();
    println!("Gradient of w w.r.t x: {}", x.grad()); // 30
    println!("Gradient of w w.r.t y: {}", y.grad()); // 20

    graph.reset_gradients();
    tanh.backward();
    println!("Gradient of tanh(0): {}", tanh_in.grad()); // 1

    if let Err(err) = x.pow(y) {
        println!("x ** y rejected: {err}");
    }
}
