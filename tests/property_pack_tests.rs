use proptest::prelude::*;
use scatter_pack::core::{HierarchyLeaf, PackedCircle, pack};

const TOLERANCE: f64 = 1e-6;

fn distance(a: &PackedCircle, b: &PackedCircle) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

proptest! {
    #[test]
    fn leaves_stay_inside_their_group_and_never_overlap(
        weights in prop::collection::vec((1.0f64..100.0, 0usize..4), 1..40),
        canvas in 50.0f64..1_000.0
    ) {
        let items: Vec<HierarchyLeaf> = weights
            .iter()
            .enumerate()
            .map(|(index, (weight, group))| {
                HierarchyLeaf::new(format!("leaf-{index}"), format!("group-{group}"), *weight)
            })
            .collect();
        let circles = pack(&items, canvas).expect("pack");

        let (containers, leaves): (Vec<&PackedCircle>, Vec<&PackedCircle>) =
            circles.iter().partition(|circle| circle.container);
        prop_assert_eq!(leaves.len(), items.len());
        let tolerance = TOLERANCE * canvas;

        for leaf in &leaves {
            let parent = containers
                .iter()
                .find(|container| container.id == leaf.group)
                .expect("parent container");
            prop_assert!(distance(parent, leaf) + leaf.r <= parent.r + tolerance);
        }

        for (i, a) in leaves.iter().enumerate() {
            for b in &leaves[(i + 1)..] {
                prop_assert!(distance(a, b) + tolerance >= a.r + b.r);
            }
        }
        for (i, a) in containers.iter().enumerate() {
            for b in &containers[(i + 1)..] {
                prop_assert!(distance(a, b) + tolerance >= a.r + b.r);
            }
            prop_assert!(a.x - a.r >= -tolerance && a.x + a.r <= canvas + tolerance);
            prop_assert!(a.y - a.r >= -tolerance && a.y + a.r <= canvas + tolerance);
        }
    }

    #[test]
    fn leaf_radius_ratio_matches_weight_ratio(
        first in 0.5f64..50.0,
        second in 0.5f64..50.0
    ) {
        let items = vec![
            HierarchyLeaf::new("a", "g", first),
            HierarchyLeaf::new("b", "g", second),
        ];
        let circles = pack(&items, 400.0).expect("pack");
        let (a, b) = (&circles[1], &circles[2]);

        let expected = (first / second).sqrt();
        prop_assert!((a.r / b.r - expected).abs() <= 1e-9 * expected.max(1.0));
    }
}
