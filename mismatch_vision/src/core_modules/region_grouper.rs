// THEORY:
// The grouper is the spatial clustering layer. A single visual mismatch (a shifted
// button, a re-wrapped line of text) usually shows up in the difference mask as
// several disconnected specks. The grouper folds nearby specks into one
// `RegionGroup` so that each reported mismatch corresponds to one thing a person
// would point at.
//
// Two strategies are available:
// 1.  **Single pass** (default): regions are visited once, in detection order. Each
//     region walks the existing groups in creation order and joins the first one
//     whose enclosing-rectangle center is closer than the grouping distance. If
//     none qualifies it founds a new group. There is no backtracking and no merge
//     of groups that grow towards each other later; results depend on detection
//     order.
// 2.  **Transitive**: every pair of regions with centroids closer than the grouping
//     distance is linked, and groups are the connected components of that relation
//     (union-find with path halving). The result does not depend on visiting order.
//     Groups are ordered by their earliest member.
//
// In both modes every region ends up in exactly one group.

use crate::config::GroupingMode;
use crate::core_modules::raw_region::RawRegion;
use crate::core_modules::region_group::RegionGroup;

/// Clusters regions according to `mode`. `distance` is exclusive.
pub fn group_regions(regions: &[RawRegion], distance: f64, mode: GroupingMode) -> Vec<RegionGroup> {
    let groups = match mode {
        GroupingMode::SinglePass => group_single_pass(regions, distance),
        GroupingMode::Transitive => group_transitive(regions, distance),
    };
    tracing::debug!(
        regions = regions.len(),
        groups = groups.len(),
        ?mode,
        "region grouping complete"
    );
    groups
}

/// First-match, order-sensitive grouping.
pub fn group_single_pass(regions: &[RawRegion], distance: f64) -> Vec<RegionGroup> {
    let mut groups: Vec<RegionGroup> = Vec::new();

    for region in regions {
        let target = groups
            .iter()
            .position(|group| region.distance_to(group.enclosing_center()) < distance);

        match target {
            Some(index) => groups[index].push(region),
            None => groups.push(RegionGroup::new(region)),
        }
    }

    groups
}

/// Connected components of the "centroids closer than `distance`" relation.
pub fn group_transitive(regions: &[RawRegion], distance: f64) -> Vec<RegionGroup> {
    let mut parent: Vec<usize> = (0..regions.len()).collect();

    for i in 0..regions.len() {
        for j in (i + 1)..regions.len() {
            if regions[i].distance_to(regions[j].centroid) < distance {
                let ri = find(&mut parent, i);
                let rj = find(&mut parent, j);
                if ri != rj {
                    // The smaller index stays root so groups keep first-seen order.
                    parent[ri.max(rj)] = ri.min(rj);
                }
            }
        }
    }

    let mut groups: Vec<RegionGroup> = Vec::new();
    let mut group_of_root: Vec<Option<usize>> = vec![None; regions.len()];
    for (i, region) in regions.iter().enumerate() {
        let root = find(&mut parent, i);
        match group_of_root[root] {
            Some(g) => groups[g].push(region),
            None => {
                group_of_root[root] = Some(groups.len());
                groups.push(RegionGroup::new(region));
            }
        }
    }

    groups
}

/// Union-find with path halving.
fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::bounds::Bounds;

    fn square(id: usize, x: u32, y: u32) -> RawRegion {
        RawRegion::from_bounds(id, Bounds::new(x, y, 10, 10))
    }

    fn assert_partition(regions: &[RawRegion], groups: &[RegionGroup]) {
        let mut seen: Vec<usize> = groups.iter().flat_map(|g| g.members().iter().copied()).collect();
        seen.sort_unstable();
        let expected: Vec<usize> = regions.iter().map(|r| r.id).collect();
        assert_eq!(seen, expected, "every region must be in exactly one group");
    }

    #[test]
    fn no_regions_no_groups() {
        assert!(group_regions(&[], 50.0, GroupingMode::SinglePass).is_empty());
        assert!(group_regions(&[], 50.0, GroupingMode::Transitive).is_empty());
    }

    #[test]
    fn close_regions_merge() {
        let regions = vec![square(0, 100, 100), square(1, 130, 100)];
        let groups = group_single_pass(&regions, 50.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bounds(), Bounds::new(100, 100, 40, 10));
        assert_partition(&regions, &groups);
    }

    #[test]
    fn distant_regions_stay_apart() {
        let regions = vec![square(0, 100, 100), square(1, 300, 100)];
        let groups = group_single_pass(&regions, 50.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].members(), &[0]);
        assert_eq!(groups[1].members(), &[1]);
    }

    #[test]
    fn distance_is_exclusive() {
        // Centroids exactly 50px apart along x.
        let regions = vec![square(0, 0, 0), square(1, 50, 0)];
        let groups = group_transitive(&regions, 50.0);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn exact_distance_is_symmetric() {
        // Newcomer 50px up-left of the group, then 50px down-right: neither joins.
        let up_left = vec![square(0, 150, 150), square(1, 100, 150)];
        assert_eq!(group_single_pass(&up_left, 50.0).len(), 2);

        let down_right = vec![square(0, 150, 150), square(1, 200, 150)];
        assert_eq!(group_single_pass(&down_right, 50.0).len(), 2);

        let just_inside = vec![square(0, 150, 150), square(1, 101, 150)];
        assert_eq!(group_single_pass(&just_inside, 50.0).len(), 1);
    }

    #[test]
    fn first_matching_group_wins() {
        // Two groups are founded far apart; a region that is close to both joins
        // the earlier one only, and the two groups are never merged afterwards.
        let regions = vec![square(0, 0, 0), square(1, 70, 0), square(2, 35, 0)];
        let groups = group_single_pass(&regions, 50.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].members(), &[0, 2]);
        assert_eq!(groups[1].members(), &[1]);
        assert_partition(&regions, &groups);
    }

    #[test]
    fn transitive_mode_merges_chains() {
        let regions = vec![square(0, 0, 0), square(1, 70, 0), square(2, 35, 0)];
        let groups = group_transitive(&regions, 50.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members(), &[0, 1, 2]);
        assert_eq!(groups[0].bounds(), Bounds::new(0, 0, 80, 10));
    }

    #[test]
    fn transitive_groups_keep_first_seen_order() {
        let regions = vec![
            square(0, 500, 500),
            square(1, 0, 0),
            square(2, 520, 500),
            square(3, 20, 0),
        ];
        let groups = group_transitive(&regions, 50.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].members(), &[0, 2]);
        assert_eq!(groups[1].members(), &[1, 3]);
        assert_partition(&regions, &groups);
    }
}
