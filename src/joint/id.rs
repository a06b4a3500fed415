/// Stable handle to a joint stored in a skeleton's arena.
///
/// Handles stay valid for the skeleton's lifetime; they are only invalidated
/// by `Skeleton::destroy`, which drops every joint at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(u32);

impl JointId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Convert to arena index
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
