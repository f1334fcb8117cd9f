//! Arithmetic operator overloads on [`Expr`].
//!
//! Overloads panic when the operands cannot be combined; use the functions in
//! [`expr`](crate::expr) to get the error back instead.

use std::ops::*;

use crate::expr::{add, div, mul, sub, Expr};

macro_rules! impl_bin_ops {
    ($Trait:ident, $method:ident, $func:ident) => {
        impl<'g> $Trait<Expr<'g>> for Expr<'g> {
            type Output = Expr<'g>;

            /// # Panics
            ///
            /// If the operands differ in shape or come from different graphs.
            fn $method(self, rhs: Expr<'g>) -> Self::Output {
                $func(self, rhs).unwrap_or_else(|e| panic!("{}", e))
            }
        }

        impl<'g> $Trait<f64> for Expr<'g> {
            type Output = Expr<'g>;

            /// Combines with a constant of this node's shape filled with `rhs`.
            fn $method(self, rhs: f64) -> Self::Output {
                let (rows, cols) = self.size();
                let c = self.graph().constant_filled(rows, cols, rhs);
                $func(self, c).unwrap_or_else(|e| panic!("{}", e))
            }
        }

        impl<'g> $Trait<Expr<'g>> for f64 {
            type Output = Expr<'g>;

            fn $method(self, rhs: Expr<'g>) -> Self::Output {
                let (rows, cols) = rhs.size();
                let c = rhs.graph().constant_filled(rows, cols, self);
                $func(c, rhs).unwrap_or_else(|e| panic!("{}", e))
            }
        }
    };
}

impl_bin_ops!(Add, add, add);
impl_bin_ops!(Sub, sub, sub);
impl_bin_ops!(Mul, mul, mul);
impl_bin_ops!(Div, div, div);

impl<'g> Neg for Expr<'g> {
    type Output = Expr<'g>;

    /// `0 - self`, with a zero constant of matching shape.
    fn neg(self) -> Self::Output {
        0.0 - self
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::Graph;
    use ndarray::array;

    #[test]
    fn scalar_operands_become_constants() {
        let g = Graph::new();
        let x = g.variable(array![[1.0, 2.0]]);
        let f = (x + 1.0) * 2.0 - 0.5;
        assert_eq!(f.forward().unwrap(), array![[3.5, 5.5]]);
        let h = 1.0 / x;
        assert_eq!(h.forward().unwrap(), array![[1.0, 0.5]]);

        f.backward().unwrap();
        assert_eq!(x.gradient().unwrap(), array![[2.0, 2.0]]);
        assert_eq!(g.variables().len(), 1);
    }

    #[test]
    fn negation() {
        let g = Graph::new();
        let x = g.variable(array![[3.0], [-1.0]]);
        let f = -x;
        assert_eq!(f.forward().unwrap(), array![[-3.0], [1.0]]);
        f.backward().unwrap();
        assert_eq!(x.gradient().unwrap(), array![[-1.0], [-1.0]]);
    }

    #[test]
    #[should_panic(expected = "incompatible operand shapes")]
    fn mismatched_shapes_panic() {
        let g = Graph::new();
        let a = g.variable_zeros(2, 1);
        let b = g.variable_zeros(1, 2);
        let _ = a + b;
    }
}
