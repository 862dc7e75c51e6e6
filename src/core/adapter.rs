//! Combines the main and secondary item lists into the single ordered list the engine builds.

use rand::Rng;
use std::cmp::Ordering;

use crate::core::item::PickerItem;

fn by_value_desc(a: &PickerItem, b: &PickerItem) -> Ordering {
    b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal)
}

/// Merge two item lists.
///
/// * Both lists are sorted by descending value (stable for ties).
/// * A main item whose id also appears in the secondary list becomes dual-valued: it takes the
///   secondary entry's value as `secondary_value` and the duplicate is dropped.
/// * Remaining secondary entries are flagged `is_secondary`.
///
/// Output order: main items, then secondary-only items.
pub fn merge_item_sets(mut main: Vec<PickerItem>, mut secondary: Vec<PickerItem>) -> Vec<PickerItem> {
    main.sort_by(by_value_desc);
    secondary.sort_by(by_value_desc);

    for item in main.iter_mut() {
        item.is_secondary = false;
        if let Some(dup) = secondary.iter().find(|s| s.id == item.id) {
            item.secondary_value = Some(dup.value);
        }
    }

    let secondary_only = secondary
        .into_iter()
        .filter(|s| !main.iter().any(|m| m.id == s.id))
        .map(|mut s| {
            s.is_secondary = true;
            s.secondary_value = None;
            s
        })
        .collect::<Vec<_>>();

    main.extend(secondary_only);
    main
}

/// Demo set of `count` items with random values in `1..100`; every third one also carries a
/// secondary value and every fifth lives only in the secondary set.
pub fn random_items(count: usize, rng: &mut impl Rng) -> Vec<PickerItem> {
    let (mut main, mut secondary) = (Vec::new(), Vec::new());
    for i in 0..count {
        let item = PickerItem::new(format!("item-{i}"), rng.gen_range(1.0..100.0))
            .with_title(format!("#{i}"));
        if i % 5 == 4 {
            secondary.push(item);
        } else {
            if i % 3 == 0 {
                secondary.push(PickerItem::new(item.id.0.clone(), rng.gen_range(1.0..100.0)));
            }
            main.push(item);
        }
    }
    merge_item_sets(main, secondary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::ItemId;

    #[test]
    fn duplicates_become_dual_items() {
        let main = vec![PickerItem::new("a", 1.0), PickerItem::new("b", 5.0)];
        let secondary = vec![PickerItem::new("c", 2.0), PickerItem::new("a", 9.0)];
        let merged = merge_item_sets(main, secondary);

        let ids: Vec<_> = merged.iter().map(|i| i.id.0.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
        assert_eq!(merged[1].secondary_value, Some(9.0));
        assert!(!merged[1].is_secondary);
        assert!(merged[2].is_secondary);
        assert_eq!(merged[2].secondary_value, None);
    }

    #[test]
    fn empty_secondary_keeps_main_sorted() {
        let merged = merge_item_sets(
            vec![PickerItem::new("x", 1.0), PickerItem::new("y", 3.0), PickerItem::new("z", 2.0)],
            Vec::new(),
        );
        let ids: Vec<_> = merged.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, [ItemId::new("y"), ItemId::new("z"), ItemId::new("x")]);
        assert!(merged.iter().all(|i| !i.is_dual()));
    }

    #[test]
    fn random_items_have_unique_ids() {
        let mut rng = rand::thread_rng();
        let items = random_items(20, &mut rng);
        assert_eq!(items.len(), 20);
        let mut ids: Vec<_> = items.iter().map(|i| i.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
        assert!(items.iter().any(|i| i.is_dual()));
        assert!(items.iter().any(|i| i.is_secondary));
    }
}
