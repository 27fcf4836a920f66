use crate::Point;

/// Known optima of an objective, when the host has them.
///
/// Used for reporting and regret computation; callers never evaluate these.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Optimum {
    pub argmax: Option<Point>,
    pub maxval: Option<f64>,
    pub argmin: Option<Point>,
    pub minval: Option<f64>,
}

impl Optimum {
    /// Returns a copy with both argument points passed through `map`.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `map`.
    pub fn try_map_points<E, F>(&self, mut map: F) -> Result<Self, E>
    where
        F: FnMut(&Point) -> Result<Point, E>,
    {
        Ok(Self {
            argmax: self.argmax.as_ref().map(&mut map).transpose()?,
            maxval: self.maxval,
            argmin: self.argmin.as_ref().map(&mut map).transpose()?,
            minval: self.minval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn maps_only_present_points() {
        let optimum = Optimum {
            argmax: Some(array![2.0]),
            maxval: Some(4.0),
            ..Optimum::default()
        };

        let doubled = optimum
            .try_map_points(|p| Ok::<_, ()>(p * 2.0))
            .expect("infallible map");

        assert_eq!(doubled.argmax, Some(array![4.0]));
        assert_eq!(doubled.maxval, Some(4.0));
        assert!(doubled.argmin.is_none());
    }
}
