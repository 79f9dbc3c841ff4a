use crate::change::ChangeDescriptor;

/// A descriptor placed at its position in the global chronological order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergePlanEntry {
    /// Zero-based index in the merged plan.
    pub position: usize,
    /// Subdirectory of the target that the change is rooted under.
    pub subdirectory: String,
    pub descriptor: ChangeDescriptor,
}

impl MergePlanEntry {
    pub fn new(position: usize, descriptor: ChangeDescriptor) -> Self {
        Self {
            position,
            subdirectory: descriptor.origin().subdirectory().to_string(),
            descriptor,
        }
    }
}
