//! Category colors for series, bars and legend entries.

use std::cell::RefCell;
use std::collections::HashMap;

/// A 24-bit color, independent of any rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Maps a category name within a dimension to a display color.
pub trait ColorStrategy {
    /// `name` is `None` for the ungrouped total series.
    fn color(&self, name: Option<&str>, dimension: &str) -> Rgb;
}

pub const TOTAL_COLOR: Rgb = Rgb(0x31, 0x82, 0xbd);

/// Twenty-step categorical scheme: four shades each of blue, orange, green,
/// purple and grey.
pub const CATEGORY_20C: [Rgb; 20] = [
    Rgb(0x31, 0x82, 0xbd),
    Rgb(0x6b, 0xae, 0xd6),
    Rgb(0x9e, 0xca, 0xe1),
    Rgb(0xc6, 0xdb, 0xef),
    Rgb(0xe6, 0x55, 0x0d),
    Rgb(0xfd, 0x8d, 0x3c),
    Rgb(0xfd, 0xae, 0x6b),
    Rgb(0xfd, 0xd0, 0xa2),
    Rgb(0x31, 0xa3, 0x54),
    Rgb(0x74, 0xc4, 0x76),
    Rgb(0xa1, 0xd9, 0x9b),
    Rgb(0xc7, 0xe9, 0xc0),
    Rgb(0x75, 0x6b, 0xb1),
    Rgb(0x9e, 0x9a, 0xc8),
    Rgb(0xbc, 0xbd, 0xdc),
    Rgb(0xda, 0xda, 0xeb),
    Rgb(0x63, 0x63, 0x63),
    Rgb(0x96, 0x96, 0x96),
    Rgb(0xbd, 0xbd, 0xbd),
    Rgb(0xd9, 0xd9, 0xd9),
];

fn well_known(name: &str) -> Option<Rgb> {
    match name.to_lowercase().as_str() {
        "unknown" => Some(Rgb(0x33, 0x33, 0x33)),
        "other" => Some(Rgb(0x99, 0x99, 0x99)),
        "female" => Some(Rgb(0xc7, 0x61, 0xc1)),
        "male" => Some(Rgb(0x72, 0x9c, 0xd1)),
        "no" => Some(Rgb(0xc7, 0x35, 0x31)),
        "yes" => Some(Rgb(0x37, 0xad, 0x27)),
        _ => None,
    }
}

/// Fixed colors for well-known categories; everything else takes the next
/// free palette entry for its dimension, remembered for later calls.
#[derive(Debug, Clone)]
pub struct CategoryPalette {
    scheme: Vec<Rgb>,
    assigned: RefCell<HashMap<String, HashMap<String, usize>>>,
}

impl CategoryPalette {
    pub fn new() -> Self {
        Self::with_scheme(CATEGORY_20C.to_vec())
    }

    /// An empty scheme falls back to [`TOTAL_COLOR`] for every category.
    pub fn with_scheme(scheme: Vec<Rgb>) -> Self {
        Self {
            scheme,
            assigned: RefCell::new(HashMap::new()),
        }
    }

    fn ordinal(&self, name: &str, dimension: &str) -> Rgb {
        if self.scheme.is_empty() {
            return TOTAL_COLOR;
        }
        let mut assigned = self.assigned.borrow_mut();
        let scale = assigned.entry(dimension.to_string()).or_default();
        let next = scale.len();
        let index = *scale.entry(name.to_string()).or_insert(next);
        self.scheme[index % self.scheme.len()]
    }
}

impl Default for CategoryPalette {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorStrategy for CategoryPalette {
    fn color(&self, name: Option<&str>, dimension: &str) -> Rgb {
        let Some(name) = name else {
            return TOTAL_COLOR;
        };
        well_known(name).unwrap_or_else(|| self.ordinal(name, dimension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_names_ignore_case_and_dimension() {
        let palette = CategoryPalette::new();
        assert_eq!(palette.color(Some("Male"), "sex"), Rgb(0x72, 0x9c, 0xd1));
        assert_eq!(palette.color(Some("UNKNOWN"), "race"), Rgb(0x33, 0x33, 0x33));
        assert_eq!(palette.color(None, "sex"), TOTAL_COLOR);
    }

    #[test]
    fn ordinal_assignment_is_stable_per_dimension() {
        let palette = CategoryPalette::new();
        let knife = palette.color(Some("knife"), "weapon");
        let gun = palette.color(Some("gun"), "weapon");
        assert_eq!(knife, CATEGORY_20C[0]);
        assert_eq!(gun, CATEGORY_20C[1]);
        assert_eq!(palette.color(Some("knife"), "weapon"), knife);

        // a fresh dimension starts its own scale
        assert_eq!(palette.color(Some("gauteng"), "region"), CATEGORY_20C[0]);
    }

    #[test]
    fn scale_wraps_around() {
        let palette = CategoryPalette::with_scheme(vec![Rgb(1, 1, 1), Rgb(2, 2, 2)]);
        palette.color(Some("a"), "d");
        palette.color(Some("b"), "d");
        assert_eq!(palette.color(Some("c"), "d"), Rgb(1, 1, 1));
        assert_eq!(
            CategoryPalette::with_scheme(Vec::new()).color(Some("a"), "d"),
            TOTAL_COLOR
        );
    }
}
