//! Opaque handles for models, variables and constraints.
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a [`Model`](crate::model::Model). Handles carry it so that
/// mixing variables of two models is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ModelId(u64);

impl ModelId {
    /// A model identity never handed out before in this process
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ModelId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

macro_rules! define_handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            model: ModelId,
            index: usize,
        }

        impl $name {
            pub(crate) fn new(model: ModelId, index: usize) -> Self {
                Self { model, index }
            }

            /// Position in registration order within the owning model
            pub fn index(self) -> usize {
                self.index
            }

            /// The model this handle belongs to
            pub fn model(self) -> ModelId {
                self.model
            }
        }
    };
}

define_handle_type!(
    /// Handle of a decision variable. Ordered by registration order within a model.
    VarId
);
define_handle_type!(
    /// Handle of a constraint
    ConstraintId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        assert_ne!(ModelId::fresh(), ModelId::fresh());
    }

    #[test]
    fn handles_order_by_index_within_a_model() {
        let model = ModelId::fresh();
        let a = VarId::new(model, 0);
        let b = VarId::new(model, 7);
        assert!(a < b);
        assert_eq!(b.index(), 7);
        assert_eq!(b.model(), model);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn indices_are_not_truncated() {
        let model = ModelId::fresh();
        let past_u32 = u32::MAX as usize + 1;
        assert_eq!(VarId::new(model, past_u32).index(), past_u32);
        assert_ne!(VarId::new(model, past_u32), VarId::new(model, 0));
    }
}
