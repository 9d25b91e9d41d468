use bubble_chart_rs::core::{CATEGORY10, CategoryColorizer, Color, FALLBACK_COLOR};
use proptest::prelude::*;

#[test]
fn automatic_colors_follow_first_seen_order_and_cycle() {
    let mut colorizer = CategoryColorizer::automatic();
    assert_eq!(colorizer.color_for("F"), CATEGORY10[0]);
    assert_eq!(colorizer.color_for("M"), CATEGORY10[1]);
    assert_eq!(colorizer.color_for("F"), CATEGORY10[0]);

    for index in 2..11 {
        colorizer.color_for(&format!("category-{index}"));
    }
    // eleventh distinct category wraps around
    assert_eq!(colorizer.assigned()["category-10"], CATEGORY10[0]);
    assert_eq!(colorizer.assigned().len(), 11);
}

#[test]
fn custom_palette_is_an_exact_lookup_with_fallback() {
    let boy = Color::from_hex("#70b7f0").expect("valid hex");
    let girl = Color::from_hex("#e76486").expect("valid hex");
    let mut colorizer = CategoryColorizer::custom(&["M", "F"], &[boy, girl]).expect("valid palette");

    assert!(colorizer.is_custom());
    assert_eq!(colorizer.color_for("F"), girl);
    assert_eq!(colorizer.color_for("M"), boy);
    assert_eq!(colorizer.color_for("U"), FALLBACK_COLOR);
    assert_eq!(colorizer.color_for("m"), FALLBACK_COLOR);
}

#[test]
fn custom_palette_rejects_mismatched_lengths() {
    let one = [Color::rgb(1.0, 0.0, 0.0)];
    assert!(CategoryColorizer::custom(&["M", "F"], &one).is_err());
    assert!(CategoryColorizer::custom::<&str>(&[], &[]).is_err());
    assert!(CategoryColorizer::with_palette(Vec::new()).is_err());
}

proptest! {
    #[test]
    fn automatic_assignment_is_stable_per_label(labels in proptest::collection::vec("[a-e]", 1..40)) {
        let mut colorizer = CategoryColorizer::automatic();
        let first: Vec<Color> = labels.iter().map(|label| colorizer.color_for(label)).collect();
        let second: Vec<Color> = labels.iter().map(|label| colorizer.color_for(label)).collect();
        prop_assert_eq!(&first, &second);

        let mut distinct: Vec<&String> = Vec::new();
        for label in &labels {
            if !distinct.contains(&label) {
                distinct.push(label);
            }
        }
        for (index, label) in distinct.iter().enumerate() {
            prop_assert_eq!(colorizer.assigned()[label.as_str()], CATEGORY10[index % CATEGORY10.len()]);
        }
    }
}
