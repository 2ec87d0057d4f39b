use bevy::log::debug;
use bevy::math::Vec3;
use std::collections::HashMap;
use std::f32::consts::PI;

/// Tuning for where category clusters sit
#[derive(Debug, Clone, Copy)]
pub struct LayoutPreset {
    /// Radius of the sphere the anchors are spread over
    pub radius: f32,
    /// Half-width of the random box new nodes are seeded in around their anchor
    pub jitter: f32,
}

pub const LAYOUT: LayoutPreset = LayoutPreset {
    radius: 25.0,
    jitter: 5.0,
};

/// Where a lone category (or an unknown one) is anchored
pub const DEFAULT_ANCHOR: Vec3 = Vec3::ZERO;

/// Spread `categories.len()` anchors over a sphere of `radius`.
///
/// Uses a spiral over the polar angle: for index `i` of `k`,
/// `phi = acos(-1 + 2i/k)` and `theta = sqrt(k*pi) * phi`. The output is a
/// pure function of the list length, so the same ordered list always maps
/// to the same points.
pub fn plan_anchors(categories: &[String], radius: f32) -> Vec<Vec3> {
    let k = categories.len();
    match k {
        0 => Vec::new(),
        1 => vec![DEFAULT_ANCHOR],
        _ => {
            let count = k as f32;
            (0..k)
                .map(|i| {
                    let phi = (-1.0 + (2.0 * i as f32) / count).acos();
                    let theta = (count * PI).sqrt() * phi;
                    Vec3::new(
                        radius * theta.cos() * phi.sin(),
                        radius * theta.sin() * phi.sin(),
                        radius * phi.cos(),
                    )
                })
                .collect()
        }
    }
}

/// Cached category -> anchor mapping.
///
/// Re-planning with an unchanged category list is a no-op, so unrelated node
/// churn never moves the clusters.
#[derive(Debug, Clone)]
pub struct CategoryLayout {
    preset: LayoutPreset,
    categories: Vec<String>,
    anchors: HashMap<String, Vec3>,
}

impl Default for CategoryLayout {
    fn default() -> Self {
        Self::new(LAYOUT)
    }
}

impl CategoryLayout {
    pub fn new(preset: LayoutPreset) -> Self {
        CategoryLayout {
            preset,
            categories: Vec::new(),
            anchors: HashMap::new(),
        }
    }

    pub fn preset(&self) -> &LayoutPreset {
        &self.preset
    }

    /// Recompute anchors for `categories`. Returns false when the cached
    /// plan already matches.
    pub fn plan(&mut self, categories: &[String]) -> bool {
        if self.categories == categories {
            return false;
        }

        let points = plan_anchors(categories, self.preset.radius);
        self.anchors = categories.iter().cloned().zip(points).collect();
        self.categories = categories.to_vec();

        debug!("Planned {} category anchors", self.categories.len());
        true
    }

    /// Anchor for a category; unplanned categories fall back to the origin
    pub fn anchor(&self, category: &str) -> Vec3 {
        self.anchors.get(category).copied().unwrap_or(DEFAULT_ANCHOR)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_anchors_are_deterministic() {
        let categories = names(&["Art", "Biology", "Chemistry", "History", "Math"]);
        let first = plan_anchors(&categories, 25.0);
        let second = plan_anchors(&categories, 25.0);

        assert_eq!(first.len(), 5);
        for (a, b) in first.iter().zip(&second) {
            assert!((a.x as f64 - b.x as f64).abs() < 1e-9);
            assert!((a.y as f64 - b.y as f64).abs() < 1e-9);
            assert!((a.z as f64 - b.z as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_anchors_lie_on_sphere() {
        let categories = names(&["a", "b", "c", "d", "e", "f", "g"]);
        for anchor in plan_anchors(&categories, 25.0) {
            assert!((anchor.length() - 25.0).abs() < 1e-3, "{anchor:?}");
        }
    }

    #[test]
    fn test_anchors_are_distinct() {
        let categories = names(&["a", "b", "c", "d"]);
        let anchors = plan_anchors(&categories, 25.0);
        for i in 0..anchors.len() {
            for j in (i + 1)..anchors.len() {
                assert!(anchors[i].distance(anchors[j]) > 1.0);
            }
        }
    }

    #[test]
    fn test_degenerate_category_counts() {
        assert!(plan_anchors(&[], 25.0).is_empty());
        assert_eq!(plan_anchors(&names(&["solo"]), 25.0), vec![DEFAULT_ANCHOR]);
    }

    #[test]
    fn test_plan_is_cached() {
        let mut layout = CategoryLayout::default();
        let categories = names(&["Math", "Physics"]);

        assert!(layout.plan(&categories));
        let math = layout.anchor("Math");

        assert!(!layout.plan(&categories));
        assert_eq!(layout.anchor("Math"), math);
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn test_unknown_category_falls_back_to_origin() {
        let mut layout = CategoryLayout::default();
        layout.plan(&names(&["Math", "Physics"]));
        assert_eq!(layout.anchor("Poetry"), DEFAULT_ANCHOR);

        let empty = CategoryLayout::default();
        assert!(empty.is_empty());
        assert_eq!(empty.anchor("Math"), DEFAULT_ANCHOR);
    }
}
