//! Recency matching.
//!
//! Finds the row corresponding to a previous pick after the list was
//! repopulated. Matching is best effort: no match is never an error.

use serde::Serialize;
use serde_json::Value;

use crate::item::{PickItem, PickValue};

/// A previous pick to re-select.
#[derive(Debug, Clone, PartialEq)]
pub enum RecentSelection<T> {
    /// A previously picked row, matched by label
    Item(String),
    /// A previously produced result, matched against immediate item values
    Value(T),
}

impl<T> RecentSelection<T> {
    pub fn from_item(item: &PickItem<T>) -> Self {
        RecentSelection::Item(item.label.clone())
    }
}

/// Index of the first item matching `recent`, if any.
///
/// Values are compared through their canonical JSON form, so structurally
/// equal results match even when they are distinct instances. Deferred
/// values are never matched.
pub fn find_recent<'a, T, I>(items: I, recent: &RecentSelection<T>) -> Option<usize>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a PickItem<T>>,
{
    let mut items = items.into_iter();
    match recent {
        RecentSelection::Item(label) => items.position(|item| &item.label == label),
        RecentSelection::Value(value) => {
            let wanted = canonical(value)?;
            items.position(|item| match &item.value {
                PickValue::Immediate(candidate) => canonical(candidate).is_some_and(|c| c == wanted),
                PickValue::Deferred(_) | PickValue::CustomInput | PickValue::None => false,
            })
        }
    }
}

fn canonical<T: Serialize>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(json) => Some(json),
        Err(err) => {
            tracing::trace!(error = %err, "Recent value is not serializable; skipping match");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Location {
        name: String,
        region: String,
    }

    fn location(name: &str) -> Location {
        Location {
            name: name.to_string(),
            region: "west".to_string(),
        }
    }

    #[test]
    fn test_match_by_label() {
        let items = vec![PickItem::new("a", 1), PickItem::new("b", 2)];
        assert_eq!(find_recent(&items, &RecentSelection::Item("b".into())), Some(1));
        assert_eq!(find_recent(&items, &RecentSelection::Item("z".into())), None);
    }

    #[test]
    fn test_match_by_structural_value() {
        let items = vec![
            PickItem::new("East", location("east")),
            PickItem::new("Other", location("other")),
        ];
        let recent = RecentSelection::Value(location("other"));
        assert_eq!(find_recent(&items, &recent), Some(1));
    }

    #[test]
    fn test_primitive_value_match() {
        let items = vec![PickItem::new("one", 1), PickItem::new("two", 2)];
        assert_eq!(find_recent(&items, &RecentSelection::Value(2)), Some(1));
        assert_eq!(find_recent(&items, &RecentSelection::Value(3)), None);
    }

    #[test]
    fn test_deferred_values_are_excluded() {
        let items = vec![
            PickItem::deferred("lazy", || async { Ok(5) }),
            PickItem::informational("info"),
        ];
        assert_eq!(find_recent(&items, &RecentSelection::Value(5)), None);
    }

    #[test]
    fn test_from_item() {
        let item = PickItem::new("picked", 1);
        assert_eq!(RecentSelection::from_item(&item), RecentSelection::Item("picked".into()));
    }
}
