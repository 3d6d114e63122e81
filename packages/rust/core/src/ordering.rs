//! Result ordering and deduplication.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use subjekt_shared::Entity;

/// Name sort key: diacritic-folded lowercase first, full lowercase second.
///
/// "Čistírna" folds to "cistirna" and sorts among the c-names; exact
/// spelling only breaks ties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NameKey {
    folded: String,
    lower: String,
}

impl NameKey {
    pub fn new(name: &str) -> Self {
        let lower = name.trim().to_lowercase();
        let folded = lower.nfd().filter(|c| !is_combining_mark(*c)).collect();
        Self { folded, lower }
    }
}

/// Stable sort by sector priority, then name.
pub fn sort_entities(entities: &mut [Entity]) {
    entities.sort_by_cached_key(|e| (e.sector.rank(), NameKey::new(&e.name)));
}

/// Keep the first entity for each `id`, preserving arrival order.
pub fn dedup_by_id(entities: Vec<Entity>) -> Vec<Entity> {
    let mut seen = HashSet::new();
    entities
        .into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;
    use subjekt_shared::Sector;

    fn order(a: &str, b: &str) -> Ordering {
        NameKey::new(a).cmp(&NameKey::new(b))
    }

    fn entity(id: &str, name: &str, sector: Sector) -> Entity {
        Entity {
            id: id.into(),
            name: name.into(),
            registry_id: String::new(),
            location: Default::default(),
            employee_count_band: String::new(),
            sector,
            contact: Default::default(),
            social_links: Default::default(),
        }
    }

    #[test]
    fn diacritics_fold_for_primary_order() {
        assert_eq!(order("Čistírna", "Dům"), Ordering::Less);
        assert_eq!(order("Žluťoučký kůň", "Zebra"), Ordering::Greater);
        assert_eq!(order("Ábel", "Adam"), Ordering::Less);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(order("alfa", "ALFA"), Ordering::Equal);
        assert_eq!(order("beta", "Alfa"), Ordering::Greater);
    }

    #[test]
    fn sector_priority_comes_first() {
        let mut list = vec![
            entity("1", "Alfa", Sector::Other),
            entity("2", "Zeta", Sector::It),
            entity("3", "Beta", Sector::Retail),
            entity("4", "Delta", Sector::Finance),
        ];
        sort_entities(&mut list);
        let ids: Vec<_> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "3", "1"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut list = vec![
            entity("first", "Acme", Sector::It),
            entity("x", "Aaa", Sector::It),
            entity("second", "ACME", Sector::It),
            entity("third", "acme", Sector::It),
        ];
        sort_entities(&mut list);
        let ids: Vec<_> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "first", "second", "third"]);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let list = vec![
            entity("1", "First", Sector::It),
            entity("2", "Other", Sector::It),
            entity("1", "Duplicate", Sector::Finance),
        ];
        let out = dedup_by_id(list);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "First");
        assert_eq!(out[1].id, "2");
    }
}
