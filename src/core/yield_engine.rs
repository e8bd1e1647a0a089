//! KB-010: Yield engine — recipe scaling and procurement aggregation.
//!
//! Scaling is linear: every ingredient quantity is multiplied by
//! `target_yield / base_yield`. Aggregation scales several recipes and folds
//! their lines into one list keyed by the case-insensitive `(item, unit)`
//! pair; lines with different units are never summed together.
//!
//! Everything here is pure. Quantities are kept unrounded; rounding happens
//! only in [`format_quantity`] for display.

use super::error::YieldError;
use super::types::{AggregatedLine, Recipe, ScaledIngredientLine, ScalingRequest};
use indexmap::IndexMap;
use std::fmt;

/// Lower bound of the yield slider, as a fraction of base yield.
pub const SLIDER_MIN_FACTOR: f64 = 0.1;

/// Upper bound of the yield slider, as a fraction of base yield.
pub const SLIDER_MAX_FACTOR: f64 = 5.0;

fn is_positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

/// Check that a recipe can be scaled.
pub fn check_recipe(recipe: &Recipe) -> Result<(), YieldError> {
    if is_positive(recipe.base_yield) {
        Ok(())
    } else {
        Err(YieldError::InvalidRecipe {
            base_yield: recipe.base_yield,
        })
    }
}

/// Scale a recipe's ingredient lines to `target_yield`, preserving order.
///
/// Fails with [`YieldError::InvalidRecipe`] when the base yield is not
/// positive and [`YieldError::InvalidRequest`] when the target is not.
/// Targets outside the slider range are accepted.
pub fn scale(recipe: &Recipe, target_yield: f64) -> Result<Vec<ScaledIngredientLine>, YieldError> {
    check_recipe(recipe)?;
    if !is_positive(target_yield) {
        return Err(YieldError::InvalidRequest { target_yield });
    }

    let ratio = target_yield / recipe.base_yield;
    Ok(recipe
        .ingredients
        .iter()
        .map(|line| ScaledIngredientLine {
            item: line.item.clone(),
            unit: line.unit.clone(),
            quantity: line.qty * ratio,
        })
        .collect())
}

/// The absolute target for a percentage of base yield (100 = unchanged).
pub fn percent_target(recipe: &Recipe, percent: f64) -> f64 {
    recipe.base_yield * percent / 100.0
}

/// Scale a recipe to a percentage of its base yield.
pub fn scale_percent(recipe: &Recipe, percent: f64) -> Result<Vec<ScaledIngredientLine>, YieldError> {
    check_recipe(recipe)?;
    scale(recipe, percent_target(recipe, percent))
}

/// The conventional slider range `(0.1 × base, 5 × base)` for a recipe.
pub fn slider_bounds(recipe: &Recipe) -> (f64, f64) {
    (
        recipe.base_yield * SLIDER_MIN_FACTOR,
        recipe.base_yield * SLIDER_MAX_FACTOR,
    )
}

/// Whether a target falls inside the slider range. Informational only.
pub fn within_slider(recipe: &Recipe, target_yield: f64) -> bool {
    let (lo, hi) = slider_bounds(recipe);
    target_yield >= lo && target_yield <= hi
}

fn aggregatable<'a>(
    req: &ScalingRequest,
    recipes: &'a IndexMap<String, Recipe>,
) -> Option<&'a Recipe> {
    recipes
        .get(&req.recipe_id)
        .filter(|r| r.is_production() && check_recipe(r).is_ok() && is_positive(req.target_yield))
}

/// Whether a request feeds into [`aggregate`] rather than being skipped.
pub fn contributes(req: &ScalingRequest, recipes: &IndexMap<String, Recipe>) -> bool {
    aggregatable(req, recipes).is_some()
}

/// Aggregate the scaled ingredients of several recipes into one list.
///
/// Missing recipes, plating recipes and requests that fail to scale are
/// skipped. Lines merge on lower-cased `(item, unit)`; the first occurrence
/// fixes the casing kept in the output. The result is in first-seen order,
/// which callers should not rely on.
pub fn aggregate(
    requests: &[ScalingRequest],
    recipes: &IndexMap<String, Recipe>,
) -> Vec<AggregatedLine> {
    let mut acc: IndexMap<(String, String), AggregatedLine> = IndexMap::new();

    for req in requests {
        let Some(recipe) = aggregatable(req, recipes) else {
            continue;
        };
        let Ok(lines) = scale(recipe, req.target_yield) else {
            continue;
        };

        for line in lines {
            let key = (line.item.to_lowercase(), line.unit.to_lowercase());
            acc.entry(key)
                .and_modify(|existing| existing.quantity += line.quantity)
                .or_insert(AggregatedLine {
                    item: line.item,
                    unit: line.unit,
                    quantity: line.quantity,
                });
        }
    }

    acc.into_values().collect()
}

/// Display rounding: no decimals at 10 and above, one decimal below.
pub fn format_quantity(quantity: f64) -> String {
    if quantity >= 10.0 {
        format!("{:.0}", quantity)
    } else {
        format!("{:.1}", quantity)
    }
}

impl fmt::Display for ScaledIngredientLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.item, format_quantity(self.quantity), self.unit)
    }
}

impl fmt::Display for AggregatedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.item, format_quantity(self.quantity), self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Category, IngredientLine};
    use proptest::prelude::*;

    fn line(item: &str, qty: f64, unit: &str) -> IngredientLine {
        IngredientLine {
            item: item.to_string(),
            qty,
            unit: unit.to_string(),
        }
    }

    fn recipe(base_yield: f64, ingredients: Vec<IngredientLine>) -> Recipe {
        Recipe {
            title: "test".to_string(),
            category: Category::Production,
            station: None,
            base_yield,
            yield_unit: "kg".to_string(),
            ingredients,
            instructions: None,
            image_url: None,
        }
    }

    fn sorted(mut lines: Vec<AggregatedLine>) -> Vec<AggregatedLine> {
        lines.sort_by(|a, b| (&a.item, &a.unit).cmp(&(&b.item, &b.unit)));
        lines
    }

    #[test]
    fn test_kb010_identity_scaling() {
        let r = recipe(3.0, vec![line("Beurre", 250.0, "g")]);
        let out = scale(&r, 3.0).unwrap();
        assert_eq!(out[0].quantity, 250.0);
    }

    #[test]
    fn test_kb010_double_scaling() {
        let r = recipe(3.0, vec![line("Beurre", 250.0, "g")]);
        let out = scale(&r, 6.0).unwrap();
        assert_eq!(out[0].quantity, 500.0);
    }

    #[test]
    fn test_kb010_lines_scale_independently() {
        let r = recipe(2.0, vec![line("A", 10.0, "g"), line("B", 5.0, "kg")]);
        let out = scale(&r, 4.0).unwrap();
        assert_eq!(
            out,
            vec![
                ScaledIngredientLine {
                    item: "A".into(),
                    unit: "g".into(),
                    quantity: 20.0
                },
                ScaledIngredientLine {
                    item: "B".into(),
                    unit: "kg".into(),
                    quantity: 10.0
                },
            ]
        );
    }

    #[test]
    fn test_kb010_scale_preserves_order() {
        let r = recipe(
            1.0,
            vec![line("Sel", 1.0, "g"), line("Ail", 2.0, "g"), line("Thym", 3.0, "g")],
        );
        let items: Vec<_> = scale(&r, 2.0).unwrap().into_iter().map(|l| l.item).collect();
        assert_eq!(items, vec!["Sel", "Ail", "Thym"]);
    }

    #[test]
    fn test_kb010_invalid_base_yield() {
        for base in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let r = recipe(base, vec![line("A", 1.0, "g")]);
            assert!(
                matches!(scale(&r, 1.0), Err(YieldError::InvalidRecipe { .. })),
                "base {} should be rejected",
                base
            );
        }
    }

    #[test]
    fn test_kb010_invalid_target_yield() {
        let r = recipe(1.0, vec![line("A", 1.0, "g")]);
        for target in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                scale(&r, target),
                Err(YieldError::InvalidRequest { .. })
            ));
        }
    }

    #[test]
    fn test_kb010_invalid_recipe_checked_before_request() {
        let r = recipe(0.0, vec![]);
        assert!(matches!(scale(&r, -1.0), Err(YieldError::InvalidRecipe { .. })));
    }

    #[test]
    fn test_kb010_outside_slider_is_not_an_error() {
        let r = recipe(2.0, vec![line("A", 1.0, "g")]);
        assert_eq!(scale(&r, 100.0).unwrap()[0].quantity, 50.0);
        assert_eq!(scale(&r, 0.01).unwrap()[0].quantity, 0.005);
        assert!(!within_slider(&r, 100.0));
        assert!(within_slider(&r, 2.0));
    }

    #[test]
    fn test_kb010_slider_bounds() {
        let r = recipe(4.0, vec![]);
        let (lo, hi) = slider_bounds(&r);
        assert!((lo - 0.4).abs() < 1e-12);
        assert_eq!(hi, 20.0);
    }

    #[test]
    fn test_kb010_empty_ingredients() {
        let r = recipe(1.0, vec![]);
        assert!(scale(&r, 5.0).unwrap().is_empty());
    }

    #[test]
    fn test_kb010_scale_percent() {
        let r = recipe(2.0, vec![line("A", 10.0, "g")]);
        assert_eq!(percent_target(&r, 150.0), 3.0);
        assert_eq!(scale_percent(&r, 150.0).unwrap()[0].quantity, 15.0);
        assert!(matches!(
            scale_percent(&r, 0.0),
            Err(YieldError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_kb010_aggregate_case_insensitive_unit_sensitive() {
        let mut recipes = IndexMap::new();
        recipes.insert("pate".to_string(), recipe(1.0, vec![line("Flour", 500.0, "g")]));
        recipes.insert("pain".to_string(), recipe(1.0, vec![line("flour", 300.0, "g")]));
        recipes.insert("brioche".to_string(), recipe(1.0, vec![line("Flour", 1.0, "kg")]));

        let requests = vec![
            ScalingRequest::new("pate", 1.0),
            ScalingRequest::new("pain", 1.0),
            ScalingRequest::new("brioche", 1.0),
        ];
        let out = sorted(aggregate(&requests, &recipes));
        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0],
            AggregatedLine {
                item: "Flour".into(),
                unit: "g".into(),
                quantity: 800.0
            }
        );
        assert_eq!(out[1].unit, "kg");
        assert_eq!(out[1].quantity, 1.0);
    }

    #[test]
    fn test_kb010_aggregate_first_seen_casing() {
        let mut recipes = IndexMap::new();
        recipes.insert("a".to_string(), recipe(1.0, vec![line("beurre", 100.0, "G")]));
        recipes.insert("b".to_string(), recipe(1.0, vec![line("BEURRE", 50.0, "g")]));
        let out = aggregate(
            &[ScalingRequest::new("a", 1.0), ScalingRequest::new("b", 1.0)],
            &recipes,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].item, "beurre");
        assert_eq!(out[0].unit, "G");
        assert_eq!(out[0].quantity, 150.0);
    }

    #[test]
    fn test_kb010_aggregate_scales_before_summing() {
        let mut recipes = IndexMap::new();
        recipes.insert("fond".to_string(), recipe(5.0, vec![line("Carotte", 500.0, "g")]));
        recipes.insert("jus".to_string(), recipe(1.0, vec![line("Carotte", 100.0, "g")]));
        let out = aggregate(
            &[ScalingRequest::new("fond", 10.0), ScalingRequest::new("jus", 0.5)],
            &recipes,
        );
        assert_eq!(out[0].quantity, 1050.0);
    }

    #[test]
    fn test_kb010_aggregate_skips_missing() {
        let mut recipes = IndexMap::new();
        recipes.insert("ok".to_string(), recipe(2.0, vec![line("Sel", 4.0, "g")]));
        let out = aggregate(
            &[ScalingRequest::new("ok", 4.0), ScalingRequest::new("ghost", 1.0)],
            &recipes,
        );
        assert_eq!(
            out,
            vec![AggregatedLine {
                item: "Sel".into(),
                unit: "g".into(),
                quantity: 8.0
            }]
        );
    }

    #[test]
    fn test_kb010_aggregate_skips_plating() {
        let mut recipes = IndexMap::new();
        let mut pass = recipe(1.0, vec![line("Fleur de sel", 1.0, "g")]);
        pass.category = Category::Plating;
        recipes.insert("pass".to_string(), pass);
        assert!(aggregate(&[ScalingRequest::new("pass", 1.0)], &recipes).is_empty());
    }

    #[test]
    fn test_kb010_aggregate_skips_invalid_recipe_and_request() {
        let mut recipes = IndexMap::new();
        recipes.insert("broken".to_string(), recipe(0.0, vec![line("A", 1.0, "g")]));
        recipes.insert("ok".to_string(), recipe(1.0, vec![line("B", 1.0, "g")]));
        let out = aggregate(
            &[
                ScalingRequest::new("broken", 1.0),
                ScalingRequest::new("ok", -2.0),
                ScalingRequest::new("ok", 3.0),
            ],
            &recipes,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].item, "B");
        assert_eq!(out[0].quantity, 3.0);
    }

    #[test]
    fn test_kb010_contributes() {
        let mut recipes = IndexMap::new();
        recipes.insert("broken".to_string(), recipe(0.0, vec![line("A", 1.0, "g")]));
        recipes.insert("ok".to_string(), recipe(1.0, vec![line("B", 1.0, "g")]));
        let mut pass = recipe(1.0, vec![]);
        pass.category = Category::Plating;
        recipes.insert("pass".to_string(), pass);

        assert!(contributes(&ScalingRequest::new("ok", 2.0), &recipes));
        assert!(!contributes(&ScalingRequest::new("ok", 0.0), &recipes));
        assert!(!contributes(&ScalingRequest::new("broken", 2.0), &recipes));
        assert!(!contributes(&ScalingRequest::new("pass", 2.0), &recipes));
        assert!(!contributes(&ScalingRequest::new("ghost", 2.0), &recipes));
    }

    #[test]
    fn test_kb010_aggregate_empty() {
        let recipes = IndexMap::new();
        assert!(aggregate(&[], &recipes).is_empty());

        let mut recipes = IndexMap::new();
        recipes.insert("vide".to_string(), recipe(1.0, vec![]));
        assert!(aggregate(&[ScalingRequest::new("vide", 2.0)], &recipes).is_empty());
    }

    #[test]
    fn test_kb010_format_quantity() {
        assert_eq!(format_quantity(12.4), "12");
        assert_eq!(format_quantity(10.0), "10");
        assert_eq!(format_quantity(9.94), "9.9");
        assert_eq!(format_quantity(0.26), "0.3");
        assert_eq!(format_quantity(3.0), "3.0");
        assert_eq!(format_quantity(1234.7), "1235");
    }

    #[test]
    fn test_kb010_display_line() {
        let l = ScaledIngredientLine {
            item: "Échalote".into(),
            unit: "g".into(),
            quantity: 37.6,
        };
        assert_eq!(l.to_string(), "Échalote 38 g");
    }

    proptest! {
        #[test]
        fn prop_kb010_identity_is_exact(q in 0.0f64..10_000.0, base in 0.01f64..1_000.0) {
            let r = recipe(base, vec![line("x", q, "g")]);
            prop_assert_eq!(scale(&r, base).unwrap()[0].quantity, q);
        }

        #[test]
        fn prop_kb010_doubling_is_exact(q in 0.0f64..10_000.0, base in 0.01f64..1_000.0) {
            let r = recipe(base, vec![line("x", q, "g")]);
            prop_assert_eq!(scale(&r, 2.0 * base).unwrap()[0].quantity, 2.0 * q);
        }

        #[test]
        fn prop_kb010_single_request_aggregate_matches_scale(
            qtys in proptest::collection::vec(0.0f64..1_000.0, 0..8),
            target in 0.1f64..50.0,
        ) {
            let lines: Vec<_> = qtys
                .iter()
                .enumerate()
                .map(|(i, q)| line(&format!("item-{i}"), *q, "g"))
                .collect();
            let r = recipe(1.0, lines);
            let scaled = scale(&r, target).unwrap();
            let mut recipes = IndexMap::new();
            recipes.insert("r".to_string(), r);
            let agg = aggregate(&[ScalingRequest::new("r", target)], &recipes);
            prop_assert_eq!(agg.len(), scaled.len());
            for (a, s) in agg.iter().zip(scaled.iter()) {
                prop_assert_eq!(&a.item, &s.item);
                prop_assert_eq!(a.quantity, s.quantity);
            }
        }
    }
}
