// Pure sequence arithmetic for ordered collections. No I/O here.
use serde::Deserialize;
use std::collections::HashMap;

use super::item::{ItemId, OrderedItem};

/// A requested change of position for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Shift by a signed number of slots, clamped to the collection.
    By(isize),
    ToStart,
    ToEnd,
}

/// Button-style moves sent by the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Top,
    Bottom,
}

impl From<Direction> for Move {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Move::By(-1),
            Direction::Down => Move::By(1),
            Direction::Top => Move::ToStart,
            Direction::Bottom => Move::ToEnd,
        }
    }
}

/// Target index for moving the item at `from`, or `None` when the move
/// would leave it where it is (first item up, last item down, ...).
pub fn move_target(from: usize, len: usize, mv: Move) -> Option<usize> {
    if from >= len {
        return None;
    }
    let last = len - 1;
    let to = match mv {
        Move::By(0) => return None,
        Move::By(delta) if delta < 0 => {
            if from == 0 {
                return None;
            }
            from.saturating_sub(delta.unsigned_abs())
        }
        Move::By(delta) => {
            if from == last {
                return None;
            }
            from.saturating_add(delta.unsigned_abs()).min(last)
        }
        Move::ToStart => 0,
        Move::ToEnd => last,
    };
    (to != from).then_some(to)
}

/// Remove the element at `from` and reinsert it at `to`, shifting the
/// elements in between by one slot.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Rewrite `display_order` to the 1-based position of every item.
///
/// Returns the `(id, new_order)` pairs whose value actually changed, in
/// ascending position order.
pub fn renumber<P>(items: &mut [OrderedItem<P>]) -> Vec<(ItemId, i64)> {
    let mut changes = Vec::new();
    for (index, item) in items.iter_mut().enumerate() {
        let order = index as i64 + 1;
        if item.display_order != order {
            item.display_order = order;
            changes.push((item.id.clone(), order));
        }
    }
    changes
}

/// Arrange `current` in the order given by `ids`.
///
/// Returns `None` unless `ids` names every current item exactly once.
pub fn permute<P: Clone>(current: &[OrderedItem<P>], ids: &[ItemId]) -> Option<Vec<OrderedItem<P>>> {
    if ids.len() != current.len() {
        return None;
    }
    let mut by_id: HashMap<&ItemId, &OrderedItem<P>> =
        current.iter().map(|item| (&item.id, item)).collect();
    ids.iter()
        .map(|id| by_id.remove(id).cloned())
        .collect::<Option<Vec<_>>>()
}

/// Sort freshly loaded rows by `display_order`.
///
/// Ties keep the relative order from `previous` (the last successful
/// load); rows that `previous` does not know keep the store's order and
/// sort after known rows with the same value.
pub fn sort_by_display_order<P>(
    mut loaded: Vec<OrderedItem<P>>,
    previous: &[OrderedItem<P>],
) -> Vec<OrderedItem<P>> {
    let rank: HashMap<&ItemId, usize> = previous
        .iter()
        .enumerate()
        .map(|(index, item)| (&item.id, index))
        .collect();
    let keys: Vec<(i64, usize)> = loaded
        .iter()
        .map(|item| {
            (
                item.display_order,
                rank.get(&item.id).copied().unwrap_or(usize::MAX),
            )
        })
        .collect();

    let mut order: Vec<usize> = (0..loaded.len()).collect();
    order.sort_by_key(|&index| keys[index]);

    let mut slots: Vec<Option<OrderedItem<P>>> = loaded.drain(..).map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}

/// `display_order` for an item appended to `items`.
pub fn next_display_order<P>(items: &[OrderedItem<P>]) -> i64 {
    items
        .iter()
        .map(|item| item.display_order)
        .max()
        .map_or(1, |max| max + 1)
}

/// True when the values are exactly `1..=N` in array order.
pub fn is_contiguous<P>(items: &[OrderedItem<P>]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(index, item)| item.display_order == index as i64 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(orders: &[i64]) -> Vec<OrderedItem<()>> {
        orders
            .iter()
            .enumerate()
            .map(|(i, &order)| OrderedItem::new(ItemId::new(format!("item-{}", i + 1)), order, ()))
            .collect()
    }

    fn ids(items: &[OrderedItem<()>]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn array_move_is_remove_and_reinsert() {
        let mut seq = vec![1, 2, 3, 4, 5];
        array_move(&mut seq, 0, 3);
        assert_eq!(seq, vec![2, 3, 4, 1, 5]);

        let mut seq = vec![1, 2, 3, 4, 5];
        array_move(&mut seq, 4, 1);
        assert_eq!(seq, vec![1, 5, 2, 3, 4]);
    }

    #[test]
    fn array_move_ignores_out_of_range() {
        let mut seq = vec![1, 2, 3];
        array_move(&mut seq, 0, 7);
        assert_eq!(seq, vec![1, 2, 3]);
    }

    #[test]
    fn move_target_refuses_boundaries() {
        assert_eq!(move_target(0, 4, Move::By(-1)), None);
        assert_eq!(move_target(3, 4, Move::By(1)), None);
        assert_eq!(move_target(0, 4, Move::ToStart), None);
        assert_eq!(move_target(3, 4, Move::ToEnd), None);
        assert_eq!(move_target(2, 4, Move::By(0)), None);
    }

    #[test]
    fn move_target_clamps_large_deltas() {
        assert_eq!(move_target(1, 4, Move::By(-10)), Some(0));
        assert_eq!(move_target(1, 4, Move::By(10)), Some(3));
        assert_eq!(move_target(2, 4, Move::By(-1)), Some(1));
        assert_eq!(move_target(2, 4, Move::ToEnd), Some(3));
    }

    #[test]
    fn move_target_rejects_unknown_index() {
        assert_eq!(move_target(5, 4, Move::ToStart), None);
        assert_eq!(move_target(0, 0, Move::ToEnd), None);
    }

    #[test]
    fn renumber_reports_only_changed_values() {
        let mut seq = items(&[1, 2, 3]);
        assert!(renumber(&mut seq).is_empty());

        let mut seq = items(&[1, 3, 4, 9]);
        let changes = renumber(&mut seq);
        assert_eq!(
            changes,
            vec![
                (ItemId::new("item-2"), 2),
                (ItemId::new("item-3"), 3),
                (ItemId::new("item-4"), 4),
            ]
        );
        assert!(is_contiguous(&seq));
    }

    #[test]
    fn permute_requires_every_id_once() {
        let seq = items(&[1, 2, 3]);
        let reversed = vec![
            ItemId::new("item-3"),
            ItemId::new("item-2"),
            ItemId::new("item-1"),
        ];
        let permuted = permute(&seq, &reversed).unwrap();
        assert_eq!(ids(&permuted), vec!["item-3", "item-2", "item-1"]);

        let duplicated = vec![
            ItemId::new("item-1"),
            ItemId::new("item-1"),
            ItemId::new("item-2"),
        ];
        assert!(permute(&seq, &duplicated).is_none());

        let short = vec![ItemId::new("item-1"), ItemId::new("item-2")];
        assert!(permute(&seq, &short).is_none());

        let unknown = vec![
            ItemId::new("item-1"),
            ItemId::new("item-2"),
            ItemId::new("ghost"),
        ];
        assert!(permute(&seq, &unknown).is_none());
    }

    #[test]
    fn sort_breaks_ties_with_previous_load() {
        let previous = vec![
            OrderedItem::new(ItemId::new("b"), 1, ()),
            OrderedItem::new(ItemId::new("a"), 2, ()),
        ];
        let loaded = vec![
            OrderedItem::new(ItemId::new("a"), 1, ()),
            OrderedItem::new(ItemId::new("c"), 1, ()),
            OrderedItem::new(ItemId::new("b"), 1, ()),
            OrderedItem::new(ItemId::new("d"), 0, ()),
        ];
        let sorted = sort_by_display_order(loaded, &previous);
        assert_eq!(ids(&sorted), vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn next_display_order_follows_max() {
        assert_eq!(next_display_order::<()>(&[]), 1);
        assert_eq!(next_display_order(&items(&[1, 7, 3])), 8);
    }

    #[test]
    fn direction_maps_to_moves() {
        assert_eq!(Move::from(Direction::Up), Move::By(-1));
        assert_eq!(Move::from(Direction::Down), Move::By(1));
        assert_eq!(Move::from(Direction::Top), Move::ToStart);
        assert_eq!(Move::from(Direction::Bottom), Move::ToEnd);
    }
}
