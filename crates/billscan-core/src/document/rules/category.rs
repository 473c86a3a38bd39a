//! Keyword-weighted category classification.
//!
//! Each category owns a keyword list. A category scores the sum of
//! `occurrences x keyword length` over its keywords, so specific multi-word
//! keywords outweigh incidental short matches. The tables are plain static
//! data and every scoring function takes its table as a parameter.

use tracing::trace;

use super::{ExtractionMatch, count_word_occurrences};
use crate::models::record::{ItemCategory, ServiceCategory};

/// Category keyword table. Keywords must be lowercase.
pub type CategoryTable<C> = [(C, &'static [&'static str])];

/// Keywords for bill service categories.
pub static SERVICE_KEYWORDS: &CategoryTable<ServiceCategory> = &[
    (
        ServiceCategory::InternetTelecom,
        &[
            "internet", "broadband", "wireless", "cellular", "mobile", "telecom", "telephone",
            "phone service", "fiber", "fibre", "cable", "data plan", "roaming", "wifi", "wi-fi",
            "landline", "long distance", "text messages", "verizon", "at&t", "t-mobile", "comcast",
            "xfinity", "spectrum", "digicel", "sprint",
        ],
    ),
    (
        ServiceCategory::Utilities,
        &[
            "electric", "electricity", "power", "energy", "kwh", "kilowatt", "water", "sewer",
            "natural gas", "gas", "utility", "utilities", "meter", "meter reading", "fuel charge",
            "fuel factor", "waste", "garbage", "trash", "refuse", "cuc", "water authority",
        ],
    ),
    (
        ServiceCategory::Insurance,
        &[
            "insurance", "policy", "premium", "coverage", "deductible", "insured", "underwriting",
            "claim", "liability", "policyholder", "geico", "allstate", "state farm", "progressive",
        ],
    ),
    (
        ServiceCategory::SoftwareSaas,
        &[
            "software", "subscription", "license", "saas", "cloud", "hosting", "domain",
            "user seats", "seats", "annual plan", "monthly plan", "api", "microsoft", "adobe",
            "google workspace", "github", "slack", "zoom", "aws", "dropbox",
        ],
    ),
    (
        ServiceCategory::OfficeSupplies,
        &[
            "office supplies", "paper", "toner", "ink", "printer", "stationery", "pens", "folders",
            "envelopes", "binder", "staples", "office depot",
        ],
    ),
    (
        ServiceCategory::ProfessionalServices,
        &[
            "consulting", "legal", "attorney", "accounting", "audit", "professional services",
            "advisory", "bookkeeping", "retainer", "hourly rate", "billable hours", "design",
            "marketing",
        ],
    ),
    (
        ServiceCategory::Healthcare,
        &[
            "medical", "clinic", "hospital", "doctor", "physician", "dental", "dentist",
            "pharmacy", "prescription", "patient", "health", "laboratory", "copay", "therapy",
        ],
    ),
    (
        ServiceCategory::MaintenanceRepairs,
        &[
            "repair", "repairs", "maintenance", "plumbing", "plumber", "hvac", "air conditioning",
            "electrician", "landscaping", "cleaning", "pest control", "labor", "service call",
            "inspection", "installation",
        ],
    ),
    (
        ServiceCategory::FinancialServices,
        &[
            "bank", "banking", "loan", "mortgage", "interest", "credit card", "finance charge",
            "minimum payment", "investment", "brokerage", "wire transfer", "overdraft",
        ],
    ),
];

/// Keywords for receipt item categories.
pub static ITEM_KEYWORDS: &CategoryTable<ItemCategory> = &[
    (
        ItemCategory::Produce,
        &[
            "apple", "banana", "orange", "lettuce", "tomato", "potato", "onion", "carrot",
            "avocado", "grapes", "berries", "strawberries", "blueberries", "lemon", "lime",
            "spinach", "broccoli", "cucumber", "pepper", "celery", "mango", "pear", "kale",
            "garlic", "salad", "fruit", "vegetable", "produce", "organic",
        ],
    ),
    (
        ItemCategory::MeatSeafood,
        &[
            "chicken", "beef", "ground beef", "pork", "steak", "bacon", "sausage", "turkey", "ham",
            "fish", "salmon", "tuna", "shrimp", "lamb", "meat", "seafood", "fillet", "wings",
            "ribs",
        ],
    ),
    (
        ItemCategory::Dairy,
        &[
            "milk", "cheese", "yogurt", "butter", "cream", "egg", "eggs", "sour cream", "creamer",
            "half & half", "mozzarella", "cheddar", "dairy",
        ],
    ),
    (
        ItemCategory::Pantry,
        &[
            "bread", "rice", "pasta", "flour", "sugar", "cereal", "oil", "olive oil", "sauce",
            "beans", "soup", "canned", "spice", "salt", "peanut butter", "jam", "honey", "oats",
            "tortillas", "ketchup", "mayo", "vinegar", "noodles", "bagel",
        ],
    ),
    (
        ItemCategory::Beverages,
        &[
            "water", "juice", "soda", "coffee", "tea", "beer", "wine", "cola", "drink",
            "sparkling", "lemonade", "kombucha", "energy drink",
        ],
    ),
    (
        ItemCategory::Snacks,
        &[
            "chips", "cookie", "cookies", "crackers", "candy", "chocolate", "popcorn", "pretzels",
            "nuts", "granola", "granola bar", "snack",
        ],
    ),
    (
        ItemCategory::Frozen,
        &["frozen", "ice cream", "ice", "pizza", "waffles", "popsicle"],
    ),
    (
        ItemCategory::HealthBeauty,
        &[
            "shampoo", "conditioner", "soap", "toothpaste", "toothbrush", "deodorant", "lotion",
            "vitamin", "medicine", "razor", "makeup", "sunscreen", "floss", "bandages",
        ],
    ),
    (
        ItemCategory::Household,
        &[
            "paper towels", "toilet paper", "detergent", "bleach", "trash bags", "dish soap",
            "cleaner", "sponge", "foil", "napkins", "batteries", "light bulb", "laundry", "tissue",
        ],
    ),
    (
        ItemCategory::BabyPet,
        &[
            "diapers", "wipes", "baby", "formula", "dog food", "cat food", "pet", "litter", "dog",
            "cat", "puppy", "kitten",
        ],
    ),
];

/// Occurrences of a keyword, tolerating a plural "s"/"es" suffix.
fn count_keyword(haystack: &str, keyword: &str) -> usize {
    count_word_occurrences(haystack, keyword)
        + count_word_occurrences(haystack, &format!("{}s", keyword))
        + count_word_occurrences(haystack, &format!("{}es", keyword))
}

/// Score every category in table order.
pub fn score_categories<C: Copy>(text: &str, table: &CategoryTable<C>) -> Vec<(C, usize)> {
    let haystack = text.to_lowercase();

    table
        .iter()
        .map(|(category, keywords)| {
            let score = keywords
                .iter()
                .map(|k| count_keyword(&haystack, k) * k.len())
                .sum();
            (*category, score)
        })
        .collect()
}

/// Pick the highest-scoring category. Ties go to the earlier table entry;
/// an all-zero score yields `fallback` with confidence 0.
pub fn classify<C: Copy>(
    text: &str,
    table: &CategoryTable<C>,
    fallback: C,
) -> ExtractionMatch<C> {
    let mut best: Option<(C, usize)> = None;
    for (category, score) in score_categories(text, table) {
        if score > 0 && best.is_none_or(|(_, s)| score > s) {
            best = Some((category, score));
        }
    }

    match best {
        Some((category, score)) => {
            trace!("category score {}", score);
            ExtractionMatch::new(category, (score as f32 / 10.0).min(1.0), "keywords")
        }
        None => ExtractionMatch::new(fallback, 0.0, ""),
    }
}

/// Classify a bill, optionally using the vendor name as extra evidence.
pub fn classify_service(text: &str, vendor: Option<&str>) -> ExtractionMatch<ServiceCategory> {
    let combined = match vendor {
        Some(vendor) => format!("{}\n{}", text, vendor),
        None => text.to_string(),
    };
    classify(&combined, SERVICE_KEYWORDS, ServiceCategory::Other)
}

/// Classify a single receipt item by name.
pub fn categorize_item(name: &str) -> ItemCategory {
    classify(name, ITEM_KEYWORDS, ItemCategory::Other).value
}
