//! Matrix stack for nested local-to-world transforms.
//!
//! [`TransformStack`] always holds at least one matrix; its top is the model
//! transform applied to newly emitted geometry. Nesting is expressed with
//! [`TransformScope`], a guard that pushes on creation and restores the
//! stack depth when dropped:
//!
//! ```
//! use armview::{Transformable, TransformStack, Vec3};
//!
//! let mut stack = TransformStack::new();
//! {
//!     let mut scope = stack.scoped();
//!     scope.translate(Vec3::new(1.0, 0.0, 0.0));
//!     assert_eq!(scope.depth(), 2);
//! }
//! assert_eq!(stack.depth(), 1);
//! ```

use std::ops::{Deref, DerefMut};

use glam::{Mat4, Vec3};

/// A non-empty stack of 4×4 homogeneous matrices.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformStack {
    top: Mat4,
    saved: Vec<Mat4>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self {
            top: Mat4::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to a single identity matrix.
    pub fn load_identity(&mut self) {
        self.saved.clear();
        self.top = Mat4::IDENTITY;
    }

    /// Duplicates the top matrix.
    pub fn push(&mut self) {
        self.saved.push(self.top);
    }

    /// Removes the top matrix. Does nothing at depth 1.
    pub fn pop(&mut self) {
        if let Some(previous) = self.saved.pop() {
            self.top = previous;
        }
    }

    /// Number of matrices on the stack (always at least 1).
    pub fn depth(&self) -> usize {
        self.saved.len() + 1
    }

    /// Pops until the stack is no deeper than `depth`.
    pub fn truncate(&mut self, depth: usize) {
        while self.depth() > depth.max(1) {
            self.pop();
        }
    }

    pub fn translate(&mut self, translation: Vec3) {
        self.top *= Mat4::from_translation(translation);
    }

    /// Rotates around `axis` (normalized here) by `angle` radians.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        self.top *= Mat4::from_axis_angle(axis.normalize(), angle);
    }

    pub fn scale(&mut self, scale: Vec3) {
        self.top *= Mat4::from_scale(scale);
    }

    pub fn multiply(&mut self, matrix: Mat4) {
        self.top *= matrix;
    }

    /// The current model transform.
    pub fn current(&self) -> Mat4 {
        self.top
    }
}

/// Anything that owns a [`TransformStack`] and can open scopes on it.
pub trait Transformable {
    fn transform_stack(&mut self) -> &mut TransformStack;

    /// Pushes the stack and returns a guard that restores the depth on drop.
    fn scoped(&mut self) -> TransformScope<'_, Self>
    where
        Self: Sized,
    {
        TransformScope::new(self)
    }
}

impl Transformable for TransformStack {
    fn transform_stack(&mut self) -> &mut TransformStack {
        self
    }
}

/// Push/pop guard over a [`Transformable`].
///
/// Dereferences to the wrapped value, so drawing calls go through the guard.
/// On drop the stack is truncated to the depth observed before the push,
/// which also discards any unbalanced pushes made inside the scope.
pub struct TransformScope<'a, T: Transformable> {
    target: &'a mut T,
    depth: usize,
}

impl<'a, T: Transformable> TransformScope<'a, T> {
    fn new(target: &'a mut T) -> Self {
        let stack = target.transform_stack();
        let depth = stack.depth();
        stack.push();
        Self { target, depth }
    }
}

impl<T: Transformable> Deref for TransformScope<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.target
    }
}

impl<T: Transformable> DerefMut for TransformScope<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.target
    }
}

impl<T: Transformable> Drop for TransformScope<'_, T> {
    fn drop(&mut self) {
        self.target.transform_stack().truncate(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pop_at_depth_one_is_a_no_op() {
        let mut stack = TransformStack::new();
        stack.translate(Vec3::new(1.0, 2.0, 3.0));
        let before = stack.current();
        stack.pop();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current(), before);
    }

    #[test]
    fn push_then_pop_restores_top_exactly() {
        let mut stack = TransformStack::new();
        stack.rotate(0.3, Vec3::new(1.0, 1.0, 0.0));
        stack.scale(Vec3::new(2.0, 0.5, 1.5));
        let before = stack.current();

        stack.push();
        stack.translate(Vec3::new(4.0, 5.0, 6.0));
        stack.pop();

        assert_eq!(stack.current().to_cols_array(), before.to_cols_array());
    }

    #[test]
    fn operations_post_multiply() {
        let mut stack = TransformStack::new();
        stack.translate(Vec3::new(1.0, 0.0, 0.0));
        stack.scale(Vec3::splat(2.0));
        let p = stack.current().transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert_abs_diff_eq!(p, Vec3::new(3.0, 2.0, 2.0), epsilon = 1e-6);
    }

    #[test]
    fn load_identity_collapses_stack() {
        let mut stack = TransformStack::new();
        stack.push();
        stack.push();
        stack.translate(Vec3::X);
        stack.load_identity();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current(), Mat4::IDENTITY);
    }

    #[test]
    fn scope_restores_depth_even_when_unbalanced() {
        let mut stack = TransformStack::new();
        let before = stack.current();
        {
            let mut scope = stack.scoped();
            scope.translate(Vec3::Z);
            scope.push();
            scope.push();
            assert_eq!(scope.depth(), 4);
        }
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current(), before);
    }

    #[test]
    fn nested_scopes_unwind_in_order() {
        let mut stack = TransformStack::new();
        let mut outer = stack.scoped();
        outer.translate(Vec3::X);
        let outer_top = outer.current();
        {
            let mut inner = outer.scoped();
            inner.translate(Vec3::Y);
            assert_eq!(inner.depth(), 3);
        }
        assert_eq!(outer.depth(), 2);
        assert_eq!(outer.current(), outer_top);
    }
}
