use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::HierarchyLeaf;
use crate::core::pack_siblings::{Circle, pack_siblings};
use crate::error::{ChartError, ChartResult};

/// One positioned circle produced by [`pack`].
///
/// `container == true` marks a depth-1 group boundary (drawn as an outline);
/// `container == false` marks a depth-2 leaf (drawn filled). Containers carry
/// the group key as `id` and no color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedCircle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub id: String,
    pub group: String,
    pub color: Option<String>,
    pub depth: u8,
    pub container: bool,
}

#[derive(Debug)]
struct GroupNode<'a> {
    key: &'a str,
    leaves: Vec<&'a HierarchyLeaf>,
    weight: f64,
}

/// Lays out `items` as a two-level circle-packing hierarchy inside a square
/// canvas of side `canvas_size`.
///
/// Groups keep the order in which they first appear. Leaf radii grow with the
/// square root of their weight, every group circle encloses its leaves and
/// siblings never overlap. The result lists all containers first, then all
/// leaves, group by group.
///
/// An empty input yields an empty layout. Negative or non-finite weights are
/// rejected with [`ChartError::InvalidWeight`]. When every weight is zero all
/// circles collapse to the canvas center with zero radius.
pub fn pack(items: &[HierarchyLeaf], canvas_size: f64) -> ChartResult<Vec<PackedCircle>> {
    if !canvas_size.is_finite() || canvas_size <= 0.0 {
        return Err(ChartError::InvalidData(
            "pack canvas size must be finite and > 0".to_owned(),
        ));
    }
    if items.is_empty() {
        return Ok(Vec::new());
    }
    for item in items {
        if !item.value.is_finite() || item.value < 0.0 {
            return Err(ChartError::InvalidWeight {
                id: item.id.clone(),
                value: item.value.to_string(),
            });
        }
    }

    let groups = build_groups(items);

    let mut leaf_circles: Vec<Vec<Circle>> = Vec::with_capacity(groups.len());
    let mut group_circles: Vec<Circle> = Vec::with_capacity(groups.len());
    for group in &groups {
        let mut circles: Vec<Circle> = group
            .leaves
            .iter()
            .map(|leaf| Circle::with_radius(leaf.value.sqrt()))
            .collect();
        let radius = pack_siblings(&mut circles).ok_or_else(enclose_failure)?;
        leaf_circles.push(circles);
        group_circles.push(Circle::with_radius(radius));
    }
    let root_radius = pack_siblings(&mut group_circles).ok_or_else(enclose_failure)?;

    let center = canvas_size / 2.0;
    let scale = if root_radius > 0.0 {
        canvas_size / (2.0 * root_radius)
    } else {
        0.0
    };

    let mut containers = Vec::with_capacity(groups.len());
    let mut leaves = Vec::with_capacity(items.len());
    for ((group, group_circle), circles) in groups.iter().zip(&group_circles).zip(&leaf_circles) {
        let group_x = center + scale * group_circle.x;
        let group_y = center + scale * group_circle.y;
        containers.push(PackedCircle {
            x: group_x,
            y: group_y,
            r: scale * group_circle.r,
            id: group.key.to_owned(),
            group: group.key.to_owned(),
            color: None,
            depth: 1,
            container: true,
        });

        for (leaf, circle) in group.leaves.iter().zip(circles) {
            leaves.push(PackedCircle {
                x: group_x + scale * circle.x,
                y: group_y + scale * circle.y,
                r: scale * circle.r,
                id: leaf.id.clone(),
                group: group.key.to_owned(),
                color: leaf.color.clone(),
                depth: 2,
                container: false,
            });
        }
    }

    debug!(
        groups = groups.len(),
        leaves = leaves.len(),
        total_weight = groups.iter().map(|group| group.weight).sum::<f64>(),
        "packed hierarchy"
    );

    containers.extend(leaves);
    Ok(containers)
}

fn build_groups(items: &[HierarchyLeaf]) -> Vec<GroupNode<'_>> {
    let mut by_key: IndexMap<&str, GroupNode<'_>> = IndexMap::new();
    for item in items {
        let group = by_key
            .entry(item.group.as_str())
            .or_insert_with(|| GroupNode {
                key: item.group.as_str(),
                leaves: Vec::new(),
                weight: 0.0,
            });
        group.leaves.push(item);
    }

    // Bottom-up aggregate: a group weighs the sum of its leaves.
    let mut groups: Vec<GroupNode<'_>> = by_key.into_values().collect();
    for group in &mut groups {
        group.weight = group.leaves.iter().map(|leaf| leaf.value).sum();
    }
    groups
}

fn enclose_failure() -> ChartError {
    ChartError::InvalidData("failed to compute enclosing circle for packed siblings".to_owned())
}
