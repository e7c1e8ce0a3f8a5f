//! Element classifier: free text → one of the five elements.
//!
//! Keyword scoring per element with a constant Aether baseline, so Aether
//! wins whenever nothing else resonates. Pure and total: empty or unknown
//! text always yields Aether.

use crate::shared::Element;

/// Baseline score granted to Aether before keyword counting.
pub const AETHER_BASELINE: f32 = 0.5;

const FIRE_KEYWORDS: &[&str] = &[
    "passion", "energy", "action", "create", "transform", "burn", "ignite",
    "motivation", "drive", "spark", "stuck", "change", "destroy", "vision",
];

const WATER_KEYWORDS: &[&str] = &[
    "feel", "feeling", "emotion", "flow", "intuition", "heal", "release",
    "tears", "grief", "depth", "ocean", "cleanse", "sensitive",
];

const EARTH_KEYWORDS: &[&str] = &[
    "ground", "practical", "build", "stable", "stability", "body", "manifest",
    "money", "home", "routine", "foundation", "patience", "abundance",
];

const AIR_KEYWORDS: &[&str] = &[
    "think", "thought", "idea", "clarity", "communicate", "perspective",
    "mind", "learn", "understand", "breath", "freedom", "curious",
];

const AETHER_KEYWORDS: &[&str] = &[
    "spirit", "soul", "mystery", "whole", "transcend", "unity", "sacred",
    "meaning", "purpose", "cosmos", "divine",
];

fn keywords_for(element: Element) -> &'static [&'static str] {
    match element {
        Element::Fire => FIRE_KEYWORDS,
        Element::Water => WATER_KEYWORDS,
        Element::Earth => EARTH_KEYWORDS,
        Element::Air => AIR_KEYWORDS,
        Element::Aether => AETHER_KEYWORDS,
    }
}

/// Score one element against the input. Case-insensitive.
pub fn score(element: Element, text: &str) -> f32 {
    score_lowered(element, &text.to_lowercase())
}

fn score_lowered(element: Element, lower: &str) -> f32 {
    let hits = keywords_for(element)
        .iter()
        .filter(|k| lower.contains(*k))
        .count() as f32;
    match element {
        Element::Aether => AETHER_BASELINE + hits,
        _ => hits,
    }
}

/// Classify free text into an element. Tie-break: first element in
/// `Element::ALL` order with the maximum score.
pub fn classify(text: &str) -> Element {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return Element::Aether;
    }
    let mut best = Element::Fire;
    let mut best_score = f32::MIN;
    for element in Element::ALL {
        let s = score_lowered(element, &lower);
        if s > best_score {
            best = element;
            best_score = s;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_keywords_classify_as_fire() {
        assert_eq!(classify("I feel no passion, no energy, no drive"), Element::Fire);
        assert_eq!(classify("I need to ignite action and transform"), Element::Fire);
    }

    #[test]
    fn empty_and_unrelated_text_yield_aether() {
        assert_eq!(classify(""), Element::Aether);
        assert_eq!(classify("   "), Element::Aether);
        assert_eq!(classify("xyzzy qwerty"), Element::Aether);
    }

    #[test]
    fn tie_break_follows_enumeration_order() {
        // One fire keyword and one water keyword: fire comes first in order.
        assert_eq!(classify("my passion and my grief"), Element::Fire);
        // One water keyword and one earth keyword: water wins.
        assert_eq!(classify("emotion needs a foundation"), Element::Water);
    }

    #[test]
    fn aether_baseline_beats_zero_but_not_one_hit() {
        assert_eq!(classify("tell me something"), Element::Aether);
        assert_eq!(classify("help me ground myself"), Element::Earth);
    }

    #[test]
    fn score_is_case_insensitive() {
        assert_eq!(
            score(Element::Fire, "PASSION and Energy"),
            score(Element::Fire, "passion and energy")
        );
    }

    #[test]
    fn water_text_classifies_as_water() {
        assert_eq!(classify("these feelings flow like the ocean"), Element::Water);
    }
}
