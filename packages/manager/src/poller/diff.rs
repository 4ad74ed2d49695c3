//! Population differ.

/// Delta between two ordered name lists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopulationDelta {
    pub joined: Vec<String>,
    pub left: Vec<String>,
}

/// Pure set difference over ordered name lists: `joined = new − old`,
/// `left = old − new`, each preserving the relative order of its source.
pub fn diff(old: &[String], new: &[String]) -> PopulationDelta {
    PopulationDelta {
        joined: new
            .iter()
            .filter(|name| !old.contains(name))
            .cloned()
            .collect(),
        left: old
            .iter()
            .filter(|name| !new.contains(name))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_computes_joined_and_left() {
        // given:
        let old = names(&["Alice", "Bob", "Carol"]);
        let new = names(&["Bob", "Dave", "Carol", "Erin"]);

        // when:
        let delta = diff(&old, &new);

        // then: source order preserved in each delta
        assert_eq!(delta.joined, names(&["Dave", "Erin"]));
        assert_eq!(delta.left, names(&["Alice"]));
    }

    #[test]
    fn test_diff_is_pure_and_does_not_mutate_inputs() {
        let old = names(&["Alice"]);
        let new = names(&["Bob"]);

        let _ = diff(&old, &new);

        assert_eq!(old, names(&["Alice"]));
        assert_eq!(new, names(&["Bob"]));
    }

    #[test]
    fn test_diff_of_identical_lists_is_empty() {
        let list = names(&["Alice", "Bob"]);
        let delta = diff(&list, &list);
        assert!(delta.joined.is_empty());
        assert!(delta.left.is_empty());
    }

    #[test]
    fn test_diff_handles_empty_sides() {
        let list = names(&["Alice"]);

        let delta = diff(&[], &list);
        assert_eq!(delta.joined, list);
        assert!(delta.left.is_empty());

        let delta = diff(&list, &[]);
        assert!(delta.joined.is_empty());
        assert_eq!(delta.left, list);
    }
}
