// Default units and conversion edges seeded into every new business.

use super::model::UnitGroup;

#[derive(Debug, Clone, Copy)]
pub struct DefaultUnit {
    pub name: &'static str,
    pub short_name: &'static str,
    pub group: UnitGroup,
    pub is_base_unit: bool,
    pub allow_decimal: bool,
}

/// Edge between two default units, referenced by short name
#[derive(Debug, Clone, Copy)]
pub struct DefaultConversion {
    pub from: &'static str,
    pub to: &'static str,
    pub factor: f64,
}

const fn unit(
    name: &'static str,
    short_name: &'static str,
    group: UnitGroup,
    is_base_unit: bool,
    allow_decimal: bool,
) -> DefaultUnit {
    DefaultUnit { name, short_name, group, is_base_unit, allow_decimal }
}

const fn edge(from: &'static str, to: &'static str, factor: f64) -> DefaultConversion {
    DefaultConversion { from, to, factor }
}

pub const DEFAULT_UNITS: &[DefaultUnit] = &[
    unit("Kilogram", "kg", UnitGroup::Mass, true, true),
    unit("Gram", "g", UnitGroup::Mass, false, true),
    unit("Pound", "lb", UnitGroup::Mass, false, true),
    unit("Meter", "m", UnitGroup::Length, true, true),
    unit("Centimeter", "cm", UnitGroup::Length, false, true),
    unit("Millimeter", "mm", UnitGroup::Length, false, true),
    unit("Liter", "l", UnitGroup::Volume, true, true),
    unit("Milliliter", "ml", UnitGroup::Volume, false, true),
    unit("Pieces", "pcs", UnitGroup::Count, true, false),
    unit("Dozen", "dz", UnitGroup::Count, false, false),
    // Pack sizes differ per product, so box gets no edges
    unit("Box", "box", UnitGroup::Count, false, false),
];

pub const DEFAULT_CONVERSIONS: &[DefaultConversion] = &[
    edge("kg", "g", 1000.0),
    edge("g", "kg", 0.001),
    edge("kg", "lb", 2.20462262185),
    edge("lb", "kg", 1.0 / 2.20462262185),
    edge("g", "lb", 0.00220462262185),
    edge("lb", "g", 1.0 / 0.00220462262185),
    edge("m", "cm", 100.0),
    edge("cm", "m", 0.01),
    edge("m", "mm", 1000.0),
    edge("mm", "m", 0.001),
    edge("cm", "mm", 10.0),
    edge("mm", "cm", 0.1),
    edge("l", "ml", 1000.0),
    edge("ml", "l", 0.001),
    edge("pcs", "dz", 1.0 / 12.0),
    edge("dz", "pcs", 12.0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn catalog_sizes() {
        assert_eq!(DEFAULT_UNITS.len(), 11);
        assert_eq!(DEFAULT_CONVERSIONS.len(), 16);
    }

    #[test]
    fn one_base_unit_per_group() {
        let mut bases: HashMap<UnitGroup, usize> = HashMap::new();
        for u in DEFAULT_UNITS.iter().filter(|u| u.is_base_unit) {
            *bases.entry(u.group).or_default() += 1;
        }
        assert!(bases.values().all(|&n| n == 1));
        assert_eq!(bases.len(), 4);
    }

    #[test]
    fn edges_stay_inside_a_group_and_pair_up() {
        let groups: HashMap<_, _> = DEFAULT_UNITS.iter().map(|u| (u.short_name, u.group)).collect();
        let pairs: HashSet<_> = DEFAULT_CONVERSIONS.iter().map(|e| (e.from, e.to)).collect();
        for e in DEFAULT_CONVERSIONS {
            assert_eq!(groups[e.from], groups[e.to], "{} -> {}", e.from, e.to);
            assert!(pairs.contains(&(e.to, e.from)), "missing reverse of {} -> {}", e.from, e.to);
            let back = DEFAULT_CONVERSIONS.iter().find(|r| r.from == e.to && r.to == e.from).unwrap();
            assert!((e.factor * back.factor - 1.0).abs() < 1e-9);
        }
        assert!(!DEFAULT_CONVERSIONS.iter().any(|e| e.from == "box" || e.to == "box"));
    }
}
