//! Arena that owns every node of an expression graph and runs the forward, backward and
//! reset walks over it.

use std::cell::{Cell, RefCell};
use std::fmt;

use log::{debug, trace};

use crate::config::{GraphConfig, Mode};
use crate::errors::{ADError, Result, Stage};
use crate::expr::Expr;
use crate::node::{Node, NodeId, NodeState};
use crate::numeric::{all_finite, filled, zeros, zeros_like, Matrix, Shape};
use crate::operators::Op;

/// Owner of all nodes. Nodes refer to their children by [`NodeId`] and never to their
/// parents, so a sub-expression may feed any number of consumers.
///
/// The graph is single-threaded: every operation borrows the arena for its whole walk.
pub struct Graph {
    nodes: RefCell<Vec<Node>>,
    placeholder: Cell<Option<NodeId>>,
    config: GraphConfig,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates an empty graph in strict mode.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Graph {
            nodes: RefCell::new(Vec::new()),
            placeholder: Cell::new(None),
            config,
        }
    }

    pub fn strict() -> Self {
        Self::with_config(GraphConfig::new().with_mode(Mode::Strict))
    }

    /// Creates a graph that lets NaN and infinity flow through.
    pub fn lenient() -> Self {
        Self::with_config(GraphConfig::new().with_mode(Mode::Lenient))
    }

    #[inline]
    pub fn config(&self) -> GraphConfig {
        self.config
    }

    /// Number of nodes, including the hidden unary placeholder once created.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    #[inline(always)]
    fn push(&self, n: Node) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(n);
        NodeId(nodes.len() - 1)
    }

    /// Adds a differentiable leaf with a zeroed gradient accumulator.
    pub fn variable(&self, value: Matrix) -> Expr<'_> {
        let gradient = zeros_like(&value);
        let id = self.push(Node::Variable { value, gradient });
        Expr::new(self, id)
    }

    pub fn variable_filled(&self, rows: usize, cols: usize, fill: f64) -> Expr<'_> {
        self.variable(filled(Shape::new(rows, cols), fill))
    }

    pub fn variable_zeros(&self, rows: usize, cols: usize) -> Expr<'_> {
        self.variable_filled(rows, cols, 0.0)
    }

    /// Adds a leaf that stops gradient flow.
    pub fn constant(&self, value: Matrix) -> Expr<'_> {
        let id = self.push(Node::Constant { value });
        Expr::new(self, id)
    }

    pub fn constant_filled(&self, rows: usize, cols: usize, fill: f64) -> Expr<'_> {
        self.constant(filled(Shape::new(rows, cols), fill))
    }

    /// The shared right operand of unary operators, created on first use.
    fn placeholder(&self) -> NodeId {
        if let Some(id) = self.placeholder.get() {
            return id;
        }
        let id = self.push(Node::Placeholder {
            value: zeros(Shape::scalar()),
        });
        self.placeholder.set(Some(id));
        id
    }

    fn record(&self, op: Op, a: NodeId, b: NodeId, shape: Shape) -> NodeId {
        let id = self.push(Node::Expression {
            op,
            a,
            b,
            shape,
            cache: None,
            state: NodeState::Uninitialized,
        });
        trace!("record {} = {}({}, {}) : {}", id, op.name(), a, b, shape);
        id
    }

    /// Validates the operand shapes and records a binary node.
    pub(crate) fn binary(&self, op: Op, a: NodeId, b: NodeId) -> Result<NodeId> {
        let (sa, sb) = (self.shape_of(a), self.shape_of(b));
        op.check(sa, sb)?;
        Ok(self.record(op, a, b, op.out_size(sa, sb)))
    }

    /// Validates the operand shape and records a unary node.
    pub(crate) fn unary(&self, op: Op, a: NodeId) -> Result<NodeId> {
        let b = self.placeholder();
        self.binary(op, a, b)
    }

    /// Records a unary node for an operator that accepts every operand shape.
    pub(crate) fn unary_unchecked(&self, op: Op, a: NodeId) -> NodeId {
        let b = self.placeholder();
        let (sa, sb) = (self.shape_of(a), self.shape_of(b));
        debug_assert!(op.check(sa, sb).is_ok());
        self.record(op, a, b, op.out_size(sa, sb))
    }

    #[inline]
    pub(crate) fn shape_of(&self, id: NodeId) -> Shape {
        self.nodes.borrow()[id.0].shape()
    }

    #[inline]
    pub(crate) fn state_of(&self, id: NodeId) -> NodeState {
        self.nodes.borrow()[id.0].state()
    }

    pub(crate) fn is_variable(&self, id: NodeId) -> bool {
        matches!(self.nodes.borrow()[id.0], Node::Variable { .. })
    }

    pub(crate) fn is_constant(&self, id: NodeId) -> bool {
        matches!(self.nodes.borrow()[id.0], Node::Constant { .. })
    }

    /// Cached forward value, if any, without evaluating.
    pub(crate) fn peek(&self, id: NodeId) -> Option<Matrix> {
        self.nodes.borrow()[id.0].value().cloned()
    }

    pub(crate) fn forward(&self, id: NodeId) -> Result<Matrix> {
        let mut nodes = self.nodes.borrow_mut();
        evaluate(&mut nodes, id, self.config.mode)?;
        operand(&nodes, id).cloned()
    }

    /// Runs a backward pass from `id` and adds the result to the variables' accumulators.
    ///
    /// Nothing is written unless the whole pass succeeds: gradients are first gathered in a
    /// scratch buffer, then committed together with the `Differentiated` state flips.
    pub(crate) fn backward(&self, id: NodeId, upstream: &Matrix) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        debug!("backward from {} ({})", id, nodes[id.0].kind());
        let order = topological_order(&nodes, id)?;
        let grads = differentiate(&nodes, &order, id, upstream, self.config.mode)?;

        let mut committed = 0usize;
        for (n, grad) in order.iter().zip(grads) {
            match &mut nodes[n.0] {
                Node::Variable { gradient, .. } => {
                    if let Some(g) = grad {
                        *gradient += &g;
                        committed += 1;
                    }
                }
                Node::Expression { state, .. } => *state = NodeState::Differentiated,
                _ => {}
            }
        }
        debug!("backward from {} reached {} variables", id, committed);
        Ok(())
    }

    /// Invalidates every cached forward value reachable from `id`.
    pub(crate) fn reset(&self, id: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        let mut visited = vec![false; nodes.len()];
        let mut stack = vec![id];
        let mut cleared = 0usize;
        while let Some(n) = stack.pop() {
            if std::mem::replace(&mut visited[n.0], true) {
                continue;
            }
            if let Node::Expression {
                a, b, cache, state, ..
            } = &mut nodes[n.0]
            {
                *cache = None;
                *state = NodeState::Uninitialized;
                cleared += 1;
                stack.push(*a);
                stack.push(*b);
            }
        }
        debug!("reset from {} cleared {} cached values", id, cleared);
    }

    pub(crate) fn leaf_value(&self, id: NodeId) -> Result<Matrix> {
        match &self.nodes.borrow()[id.0] {
            Node::Variable { value, .. } | Node::Constant { value } => Ok(value.clone()),
            _ => Err(ADError::NotALeaf(id)),
        }
    }

    pub(crate) fn set_leaf_value(&self, id: NodeId, new: Matrix) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        match &mut nodes[id.0] {
            Node::Variable { value, .. } | Node::Constant { value } => {
                let (expected, found) = (Shape::of(value), Shape::of(&new));
                if expected != found {
                    return Err(ADError::ValueShape {
                        node: id,
                        expected,
                        found,
                    });
                }
                *value = new;
                Ok(())
            }
            _ => Err(ADError::NotALeaf(id)),
        }
    }

    pub(crate) fn gradient(&self, id: NodeId) -> Result<Matrix> {
        match &self.nodes.borrow()[id.0] {
            Node::Variable { gradient, .. } => Ok(gradient.clone()),
            _ => Err(ADError::NotAVariable(id)),
        }
    }

    pub(crate) fn reset_gradient(&self, id: NodeId) -> Result<()> {
        match &mut self.nodes.borrow_mut()[id.0] {
            Node::Variable { gradient, .. } => {
                gradient.fill(0.0);
                Ok(())
            }
            _ => Err(ADError::NotAVariable(id)),
        }
    }

    /// Zeroes the gradient accumulator of every variable.
    pub fn reset_gradients(&self) {
        for node in self.nodes.borrow_mut().iter_mut() {
            if let Node::Variable { gradient, .. } = node {
                gradient.fill(0.0);
            }
        }
    }

    /// Handles to every variable, in creation order.
    pub fn variables(&self) -> Vec<Expr<'_>> {
        self.nodes
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n, Node::Variable { .. }))
            .map(|(i, _)| Expr::new(self, NodeId(i)))
            .collect()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.nodes.borrow();
        writeln!(f, "Graph ({:?}, {} nodes)", self.config.mode, nodes.len())?;
        for (i, node) in nodes.iter().enumerate() {
            writeln!(f, "{}: {:?}", NodeId(i), node)?;
        }
        Ok(())
    }
}

#[inline]
fn operand(nodes: &[Node], id: NodeId) -> Result<&Matrix> {
    nodes[id.0].value().ok_or(ADError::NotEvaluated(id))
}

fn check_finite(mode: Mode, node: NodeId, stage: Stage, m: &Matrix) -> Result<()> {
    if all_finite(m) {
        return Ok(());
    }
    match mode {
        Mode::Strict => Err(ADError::NonFinite { node, stage }),
        Mode::Lenient => {
            trace!("non-finite {} at {} tolerated", stage, node);
            Ok(())
        }
    }
}

/// Fills the cache of `id` and of every cold expression below it, children first.
///
/// The walk keeps an explicit stack, so graph depth is bounded by memory rather than by the
/// call stack. Values computed before a failure stay cached; they are correct.
fn evaluate(nodes: &mut [Node], id: NodeId, mode: Mode) -> Result<()> {
    let mut stack = vec![(id, false)];
    while let Some((n, expanded)) = stack.pop() {
        let (op, a, b) = match &nodes[n.0] {
            Node::Expression {
                op,
                a,
                b,
                state: NodeState::Uninitialized,
                ..
            } => (*op, *a, *b),
            _ => continue,
        };
        if !expanded {
            stack.push((n, true));
            stack.push((b, false));
            stack.push((a, false));
            continue;
        }

        let value = op.eval(operand(nodes, a)?, operand(nodes, b)?);
        trace!("forward {} {} -> {}", op.name(), n, Shape::of(&value));
        check_finite(mode, n, Stage::Forward, &value)?;

        if let Node::Expression { cache, state, .. } = &mut nodes[n.0] {
            *cache = Some(value);
            *state = NodeState::Evaluated;
        }
    }
    Ok(())
}

/// Differentiable nodes reachable from `root`, every node before its children.
///
/// Fails with [`ADError::NotEvaluated`] if any reachable expression has a cold cache.
fn topological_order(nodes: &[Node], root: NodeId) -> Result<Vec<NodeId>> {
    let mut visited = vec![false; nodes.len()];
    let mut post = Vec::new();
    let mut stack = vec![(root, false)];
    while let Some((n, done)) = stack.pop() {
        if done {
            post.push(n);
            continue;
        }
        if std::mem::replace(&mut visited[n.0], true) || !nodes[n.0].is_differentiable() {
            continue;
        }
        stack.push((n, true));
        if let Node::Expression { a, b, state, .. } = &nodes[n.0] {
            if *state == NodeState::Uninitialized {
                return Err(ADError::NotEvaluated(n));
            }
            stack.push((*b, false));
            stack.push((*a, false));
        }
    }
    post.reverse();
    Ok(post)
}

/// Pushes `up` from `root` down `order`, returning the total gradient reaching each node.
///
/// Each node is visited once, after all of its consumers have contributed, so a shared
/// sub-expression is chained a single time with the sum of its incoming gradients.
/// Local derivatives are recomputed from the children's cached values.
fn differentiate(
    nodes: &[Node],
    order: &[NodeId],
    root: NodeId,
    up: &Matrix,
    mode: Mode,
) -> Result<Vec<Option<Matrix>>> {
    let (expected, found) = (nodes[root.0].shape(), Shape::of(up));
    if expected != found {
        return Err(ADError::GradientShape {
            node: root,
            expected,
            found,
        });
    }
    check_finite(mode, root, Stage::Gradient, up)?;
    if order.is_empty() {
        return Ok(Vec::new());
    }

    let mut slot = vec![usize::MAX; nodes.len()];
    for (i, n) in order.iter().enumerate() {
        slot[n.0] = i;
    }
    let mut grads: Vec<Option<Matrix>> = vec![None; order.len()];
    grads[slot[root.0]] = Some(up.clone());

    for (i, &id) in order.iter().enumerate() {
        let Some(g) = grads[i].take() else {
            continue;
        };
        debug_assert_eq!(nodes[id.0].shape(), Shape::of(&g));
        check_finite(mode, id, Stage::Gradient, &g)?;

        let Node::Expression { op, a, b, .. } = &nodes[id.0] else {
            grads[i] = Some(g);
            continue;
        };
        let (op, a, b) = (*op, *a, *b);
        trace!("backward {} {}", op.name(), id);
        let (va, vb) = (operand(nodes, a)?, operand(nodes, b)?);

        if nodes[a.0].is_differentiable() {
            let d = op.d_a(va, vb);
            check_finite(mode, id, Stage::LocalDerivative, &d)?;
            accumulate(&mut grads[slot[a.0]], op.chain_a(&g, &d));
        }
        if nodes[b.0].is_differentiable() {
            let d = op.d_b(va, vb);
            check_finite(mode, id, Stage::LocalDerivative, &d)?;
            accumulate(&mut grads[slot[b.0]], op.chain_b(&g, &d));
        }
    }
    Ok(grads)
}

#[inline]
fn accumulate(slot: &mut Option<Matrix>, grad: Matrix) {
    match slot {
        Some(acc) => *acc += &grad,
        None => *slot = Some(grad),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{log, matmul, reduce_sum};
    use ndarray::array;

    #[test]
    fn leaves_start_with_zero_gradient() {
        let g = Graph::new();
        let x = g.variable_filled(2, 3, 1.5);
        assert_eq!(x.size(), (2, 3));
        assert_eq!(x.gradient().unwrap(), zeros(Shape::new(2, 3)));
        assert_eq!(x.state(), NodeState::Evaluated);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn forward_is_memoized_until_reset() {
        let g = Graph::new();
        let x = g.variable(array![[1.0, 2.0]]);
        let y = g.variable(array![[3.0, 4.0]]);
        let f = (x * y) + x;

        let first = f.forward().unwrap();
        assert_eq!(first, array![[4.0, 10.0]]);

        // Without a reset the cache wins over the new leaf value.
        x.set_value(array![[10.0, 10.0]]).unwrap();
        assert_eq!(f.forward().unwrap(), first);

        f.reset();
        assert_eq!(f.state(), NodeState::Uninitialized);
        assert_eq!(f.forward().unwrap(), array![[40.0, 50.0]]);
    }

    #[test]
    fn reset_then_forward_reproduces_value() {
        let g = Graph::new();
        let x = g.variable(array![[0.3, -1.2], [2.0, 0.7]]);
        let w = g.constant(array![[1.0, 2.0], [-1.0, 0.5]]);
        let f = reduce_sum(matmul(w, x).unwrap().relu());
        let before = f.forward().unwrap();
        f.reset();
        assert_eq!(f.forward().unwrap(), before);
    }

    #[test]
    fn shared_subexpression_accumulates() {
        let g = Graph::new();
        let x = g.variable(array![[3.0]]);
        let s = x * x;
        let f = s + s;
        f.forward().unwrap();
        f.backward().unwrap();
        // d(2x^2)/dx = 4x
        assert_eq!(x.gradient().unwrap(), array![[12.0]]);
    }

    #[test]
    fn gradients_accumulate_across_passes_until_reset() {
        let g = Graph::new();
        let x = g.variable(array![[2.0]]);
        let f = x * x;
        f.forward().unwrap();
        f.backward().unwrap();
        f.backward().unwrap();
        assert_eq!(x.gradient().unwrap(), array![[8.0]]);
        assert_eq!(f.state(), NodeState::Differentiated);

        g.reset_gradients();
        assert_eq!(x.gradient().unwrap(), array![[0.0]]);
    }

    #[test]
    fn backward_before_forward_fails() {
        let g = Graph::new();
        let x = g.variable(array![[1.0]]);
        let f = x + x;
        assert_eq!(f.backward(), Err(ADError::NotEvaluated(f.id())));
        assert_eq!(x.gradient().unwrap(), array![[0.0]]);
    }

    #[test]
    fn backward_with_cold_child_fails() {
        let g = Graph::new();
        let x = g.variable(array![[1.0]]);
        let inner = x + x;
        let f = inner * x;
        f.forward().unwrap();
        inner.reset();
        assert_eq!(f.backward(), Err(ADError::NotEvaluated(inner.id())));
    }

    #[test]
    fn constants_absorb_gradients() {
        let g = Graph::new();
        let x = g.variable(array![[2.0, 3.0]]);
        let c = g.constant(array![[5.0, 7.0]]);
        let f = x * c;
        f.forward().unwrap();
        f.backward().unwrap();
        assert_eq!(x.gradient().unwrap(), array![[5.0, 7.0]]);
        assert_eq!(c.gradient(), Err(ADError::NotAVariable(c.id())));
    }

    #[test]
    fn upstream_shape_is_checked() {
        let g = Graph::new();
        let x = g.variable(array![[1.0, 2.0]]);
        let f = x.exp();
        f.forward().unwrap();
        let err = f.backward_with(&array![[1.0]]).unwrap_err();
        assert_eq!(
            err,
            ADError::GradientShape {
                node: f.id(),
                expected: Shape::new(1, 2),
                found: Shape::new(1, 1)
            }
        );
    }

    #[test]
    fn strict_mode_rejects_non_finite_forward() {
        let g = Graph::strict();
        let x = g.variable(array![[0.0, 1.0]]);
        let f = log(x);
        assert_eq!(
            f.forward(),
            Err(ADError::NonFinite {
                node: f.id(),
                stage: Stage::Forward
            })
        );
    }

    #[test]
    fn lenient_mode_tolerates_non_finite() {
        let g = Graph::lenient();
        let x = g.variable(array![[0.0, 1.0]]);
        let f = reduce_sum(log(x));
        let v = f.forward().unwrap();
        assert_eq!(v[[0, 0]], f64::NEG_INFINITY);
        f.backward().unwrap();
        assert_eq!(x.gradient().unwrap()[[0, 1]], 1.0);
        assert!(x.gradient().unwrap()[[0, 0]].is_infinite());
    }

    #[test]
    fn strict_mode_rejects_non_finite_local_derivative() {
        let g = Graph::strict();
        let x = g.variable(array![[1e-200]]);
        let y = g.variable(array![[1e-200]]);
        let f = x / y;
        assert_eq!(f.forward().unwrap(), array![[1.0]]);
        // -x / y^2 underflows the denominator to zero.
        assert_eq!(
            f.backward(),
            Err(ADError::NonFinite {
                node: f.id(),
                stage: Stage::LocalDerivative
            })
        );
    }

    #[test]
    fn failed_local_derivative_leaves_no_partial_gradients() {
        let g = Graph::strict();
        let x = g.variable(array![[1.0]]);
        let p = g.variable(array![[1e-200]]);
        let q = g.variable(array![[1e-200]]);
        let ratio = p / q;
        let f = x + ratio;
        assert_eq!(f.forward().unwrap(), array![[2.0]]);
        assert_eq!(
            f.backward(),
            Err(ADError::NonFinite {
                node: ratio.id(),
                stage: Stage::LocalDerivative
            })
        );
        for v in [x, p, q] {
            assert_eq!(v.gradient().unwrap(), array![[0.0]]);
        }
        assert_eq!(f.state(), NodeState::Evaluated);
        assert_eq!(ratio.state(), NodeState::Evaluated);
    }

    #[test]
    fn cold_branch_leaves_no_partial_gradients() {
        let g = Graph::new();
        let x = g.variable(array![[1.0]]);
        let u = g.variable(array![[2.0]]);
        let w = g.variable(array![[3.0]]);
        let inner = w + w;
        let f = x + u * inner;
        f.forward().unwrap();
        inner.reset();
        assert_eq!(f.backward(), Err(ADError::NotEvaluated(inner.id())));
        for v in [x, u, w] {
            assert_eq!(v.gradient().unwrap(), array![[0.0]]);
        }
        assert_eq!(f.state(), NodeState::Evaluated);
    }

    #[test]
    fn strict_mode_rejects_non_finite_upstream() {
        let g = Graph::strict();
        let x = g.variable(array![[1.0]]);
        let f = x.exp();
        f.forward().unwrap();
        assert_eq!(
            f.backward_with(&array![[f64::NAN]]),
            Err(ADError::NonFinite {
                node: f.id(),
                stage: Stage::Gradient
            })
        );
        assert_eq!(x.gradient().unwrap(), array![[0.0]]);
    }

    #[test]
    fn strict_mode_rejects_overflowing_chained_gradient() {
        let g = Graph::strict();
        let x = g.variable(array![[1.0]]);
        let c = g.constant(array![[1e300]]);
        let h = x * c;
        let f = reduce_sum(h);
        assert_eq!(f.forward().unwrap(), array![[1e300]]);
        // h receives 1e300, x would receive 1e300 * 1e300.
        assert_eq!(
            f.backward_with(&array![[1e300]]),
            Err(ADError::NonFinite {
                node: x.id(),
                stage: Stage::Gradient
            })
        );
        assert_eq!(x.gradient().unwrap(), array![[0.0]]);
        assert_eq!(h.state(), NodeState::Evaluated);

        f.backward().unwrap();
        assert_eq!(x.gradient().unwrap(), array![[1e300]]);
    }

    #[test]
    fn deep_chains_do_not_exhaust_the_stack() {
        let g = Graph::new();
        let x = g.variable(array![[0.0]]);
        let mut f = x;
        for _ in 0..50_000 {
            f = f + 1.0;
        }
        assert_eq!(f.forward().unwrap(), array![[50_000.0]]);
        f.backward().unwrap();
        assert_eq!(x.gradient().unwrap(), array![[1.0]]);
        f.reset();
        assert_eq!(f.state(), NodeState::Uninitialized);
    }

    #[test]
    fn repeated_sharing_is_linear() {
        let g = Graph::new();
        let x = g.variable(array![[1.0]]);
        let mut s = x;
        for _ in 0..60 {
            s = s + s;
        }
        let two_60 = 2f64.powi(60);
        assert_eq!(s.forward().unwrap(), array![[two_60]]);
        s.backward().unwrap();
        assert_eq!(x.gradient().unwrap(), array![[two_60]]);
    }

    #[test]
    fn constant_root_backward_is_a_no_op() {
        let g = Graph::new();
        let c = g.constant(array![[1.0, 2.0]]);
        assert!(c.backward().is_ok());
        assert!(matches!(
            c.backward_with(&array![[1.0]]),
            Err(ADError::GradientShape { .. })
        ));
    }

    #[test]
    fn debug_dump_hides_unary_placeholder() {
        let g = Graph::new();
        let x = g.variable(array![[1.0]]);
        let f = x.exp() * x;
        let dump = format!("{:?}", g);
        assert!(dump.contains("op: Exp, a: #0, shape: 1x1"));
        assert!(dump.contains(&format!("op: Mul, a: #2, b: {}", x.id())));
        assert_eq!(f.size(), (1, 1));
    }

    #[test]
    fn set_value_keeps_shape() {
        let g = Graph::new();
        let x = g.variable_zeros(2, 1);
        assert!(x.set_value(array![[1.0], [2.0]]).is_ok());
        assert_eq!(
            x.set_value(array![[1.0, 2.0]]),
            Err(ADError::ValueShape {
                node: x.id(),
                expected: Shape::new(2, 1),
                found: Shape::new(1, 2)
            })
        );
        let f = x.exp();
        assert_eq!(f.value(), Err(ADError::NotALeaf(f.id())));
    }

    #[test]
    fn placeholder_is_shared_and_hidden() {
        let g = Graph::new();
        let x = g.variable(array![[1.0]]);
        let _a = x.exp();
        let _b = x.ln();
        // x, placeholder, exp, log
        assert_eq!(g.len(), 4);
        assert_eq!(g.variables().len(), 1);
    }
}
