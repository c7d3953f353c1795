use core::ops::Index;

/// An index that is known to be lower than `LENGTH`, so it can be used to
/// access an array of that length without bounds checks.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundedIndex<const LENGTH: usize>(usize);

impl<const LENGTH: usize> BoundedIndex<LENGTH> {
    pub const fn from_value(val: usize) -> Option<Self> {
        if val < LENGTH { Some(Self(val)) } else { None }
    }
}

impl<A, const LENGTH: usize> Index<BoundedIndex<LENGTH>> for [A; LENGTH] {
    type Output = A;

    fn index(&self, index: BoundedIndex<LENGTH>) -> &Self::Output {
        unsafe {
            // SAFETY: index < LENGTH is checked on construction.
            self.get_unchecked(index.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BoundedIndex;

    #[test]
    fn test_from_value_bounds() {
        assert!(BoundedIndex::<8>::from_value(7).is_some());
        assert!(BoundedIndex::<8>::from_value(8).is_none());
    }

    #[test]
    fn test_index_array() {
        let arr = [10, 20, 30];
        let idx = BoundedIndex::<3>::from_value(2).unwrap();
        assert_eq!(arr[idx], 30);
    }
}
