//! Default filter keys and the predicates behind them.

use super::{
    Atmosphere, AtmosphereFilter, CategoryFilter, MinimumRatingFilter, OpenNowFilter, PriceTier,
    PriceTierFilter,
};
use crate::filter_pipeline::FilterEngine;

pub const RATING_4_PLUS: &str = "rating4Plus";
pub const RATING_4_5_PLUS: &str = "rating4_5Plus";
pub const OPEN_NOW: &str = "openNow";

pub const PRICE_BUDGET: &str = "priceBudget";
pub const PRICE_MODERATE: &str = "priceModerate";
pub const PRICE_UPSCALE: &str = "priceUpscale";

pub const CASUAL: &str = "casual";
pub const TRENDY: &str = "trendy";
pub const HIDDEN_GEM: &str = "hiddenGem";

/// Cuisine keys, each matching `<key>_restaurant` or the key in the name.
const CUISINES: &[(&str, &[&str])] = &[
    ("italian", &["trattoria", "pasta", "osteria"]),
    ("mexican", &["taqueria", "taco", "burrito", "cantina"]),
    ("chinese", &["dim sum", "dumpling", "szechuan", "wok"]),
    ("japanese", &["sushi", "ramen", "izakaya", "udon"]),
    ("indian", &["curry", "tandoori", "masala"]),
    ("thai", &["pad thai", "bangkok"]),
    ("american", &["burger", "diner", "grill", "bbq"]),
    ("pizza", &["pizzeria"]),
    ("seafood", &["fish", "oyster", "crab", "lobster"]),
];

/// (key, tags, name keywords) for meal-time and dietary keys.
const CATEGORIES: &[(&str, &[&str], &[&str])] = &[
    ("breakfast", &["cafe", "bakery", "breakfast_restaurant", "brunch_restaurant"], &["breakfast", "brunch", "pancake", "bagel"]),
    ("lunch", &["sandwich_shop", "meal_takeaway", "cafe"], &["deli", "sandwich", "lunch"]),
    ("dinner", &["steak_house", "fine_dining_restaurant"], &["steakhouse", "bistro", "dinner"]),
    ("lateNight", &["bar", "night_club"], &["late night", "24 hour", "pub", "tavern"]),
    ("takeout", &["meal_takeaway", "meal_delivery"], &["takeout", "to go", "express"]),
    ("vegetarian", &["vegetarian_restaurant", "vegan_restaurant"], &["vegetarian", "veggie", "plant"]),
    ("vegan", &["vegan_restaurant"], &["vegan", "plant based", "plant-based"]),
];

/// Every key registered by [`register_defaults`], in registration order.
pub fn default_keys() -> Vec<&'static str> {
    let mut keys = vec![
        RATING_4_PLUS,
        RATING_4_5_PLUS,
        OPEN_NOW,
        PRICE_BUDGET,
        PRICE_MODERATE,
        PRICE_UPSCALE,
        CASUAL,
        TRENDY,
        HIDDEN_GEM,
    ];
    keys.extend(CUISINES.iter().map(|(key, _)| *key));
    keys.extend(CATEGORIES.iter().map(|(key, _, _)| *key));
    keys
}

pub(crate) fn register_defaults(engine: FilterEngine) -> FilterEngine {
    let mut engine = engine
        .register(RATING_4_PLUS, MinimumRatingFilter::new(4.0, 0))
        .register(RATING_4_5_PLUS, MinimumRatingFilter::new(4.5, 0))
        .register(OPEN_NOW, OpenNowFilter)
        .register(PRICE_BUDGET, PriceTierFilter::new(PriceTier::Budget))
        .register(PRICE_MODERATE, PriceTierFilter::new(PriceTier::Moderate))
        .register(PRICE_UPSCALE, PriceTierFilter::new(PriceTier::Upscale))
        .register(CASUAL, AtmosphereFilter::new(Atmosphere::Casual))
        .register(TRENDY, AtmosphereFilter::new(Atmosphere::Trendy))
        .register(HIDDEN_GEM, AtmosphereFilter::new(Atmosphere::HiddenGem));

    for (cuisine, keywords) in CUISINES {
        engine = engine.register(*cuisine, CategoryFilter::cuisine(cuisine, keywords));
    }
    for (key, tags, keywords) in CATEGORIES {
        engine = engine.register(*key, CategoryFilter::new(*key, tags, keywords));
    }
    engine
}
