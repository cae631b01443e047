//! Expense categories and the keyword classifier.

use std::{cmp::Reverse, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{EngineError, text::fold_key};

/// Closed set of expense categories. The string form is the variant name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Groceries,
    Transport,
    Shopping,
    Entertainment,
    Bills,
    Health,
    Travel,
    Education,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Food,
        Category::Groceries,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Bills,
        Category::Health,
        Category::Travel,
        Category::Education,
        Category::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Groceries => "Groceries",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Bills => "Bills",
            Category::Health => "Health",
            Category::Travel => "Travel",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = fold_key(value);
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(&key))
            .ok_or_else(|| EngineError::InvalidCategory(value.trim().to_string()))
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

const BUILTIN_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &[
            "food", "restaurant", "restaurants", "cafe", "coffee", "tea", "breakfast", "brunch",
            "lunch", "dinner", "meal", "meals", "snack", "snacks", "pizza", "burger", "burgers",
            "sandwich", "shawarma", "biryani", "bakery", "dessert", "ice cream", "juice",
            "takeaway", "takeout", "starbucks", "costa", "mcdonald's", "mcdonalds", "kfc",
            "subway", "domino's", "dominos", "talabat", "deliveroo", "zomato", "swiggy",
            "uber eats",
        ],
    ),
    (
        Category::Groceries,
        &[
            "groceries", "grocery", "supermarket", "hypermarket", "carrefour", "lulu",
            "spinneys", "waitrose", "tesco", "walmart", "costco", "aldi", "lidl", "kirana",
            "bigbasket", "big basket", "vegetables", "fruits", "milk", "bread", "eggs",
        ],
    ),
    (
        Category::Transport,
        &[
            "transport", "taxi", "cab", "uber", "careem", "lyft", "ola", "bus", "metro", "train",
            "tram", "fuel", "petrol", "diesel", "gas station", "parking", "toll", "salik",
            "fare", "rickshaw", "auto rickshaw",
        ],
    ),
    (
        Category::Shopping,
        &[
            "shopping", "amazon", "flipkart", "myntra", "shein", "ikea", "zara", "h&m", "mall",
            "clothes", "clothing", "shoes", "shirt", "dress", "jeans", "electronics", "gift",
            "gifts", "jewellery", "jewelry", "apple store",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "entertainment", "movie", "movies", "cinema", "theatre", "theater", "concert",
            "netflix", "spotify", "disney", "playstation", "xbox", "steam", "game", "games",
            "bowling", "amusement park",
        ],
    ),
    (
        Category::Bills,
        &[
            "bill", "bills", "electricity", "water bill", "gas bill", "internet", "wifi",
            "broadband", "phone bill", "mobile recharge", "recharge", "rent", "utilities",
            "insurance", "subscription", "dewa", "etisalat", "airtel", "jio", "verizon",
        ],
    ),
    (
        Category::Health,
        &[
            "health", "medical", "pharmacy", "chemist", "medicine", "medicines", "vitamins",
            "doctor", "hospital", "clinic", "dentist", "dental", "lab test", "gym", "fitness",
        ],
    ),
    (
        Category::Travel,
        &[
            "travel", "flight", "flights", "airline", "airport", "hotel", "hostel", "resort",
            "airbnb", "booking.com", "expedia", "emirates", "etihad", "flydubai", "air arabia",
            "indigo", "vacation", "holiday", "trip", "luggage",
        ],
    ),
    (
        Category::Education,
        &[
            "education", "school", "school fees", "tuition", "college", "university", "course",
            "courses", "class", "classes", "exam", "book", "books", "textbook", "stationery",
            "udemy", "coursera",
        ],
    ),
];

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    text: String,
    chars: usize,
    category: Category,
}

impl Entry {
    fn new(keyword: &str, category: Category) -> Option<Self> {
        let text = fold_key(keyword);
        if text.is_empty() {
            return None;
        }
        Some(Self {
            chars: text.chars().count(),
            text,
            category,
        })
    }
}

/// Maps merchant and item words to a [`Category`].
///
/// Matching is whole-word on folded text: accents, case and punctuation are
/// ignored, so `Café`, `CAFE` and `cafe!` are the same word. The longest
/// keyword wins, then the earliest one. Aliases added with
/// [`CategoryClassifier::with_aliases`] are consulted before the built-in
/// table.
///
/// ```rust
/// use voice_engine::{Category, CategoryClassifier};
///
/// let classifier = CategoryClassifier::new();
/// assert_eq!(classifier.classify("coffee at Starbucks"), Category::Food);
/// assert_eq!(classifier.classify("dinner plans"), Category::Food);
/// assert_eq!(classifier.classify("something else"), Category::Other);
/// ```
#[derive(Clone, Debug)]
pub struct CategoryClassifier {
    aliases: Vec<Entry>,
    builtin: Vec<Entry>,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryClassifier {
    /// Classifier over the built-in keyword table.
    #[must_use]
    pub fn new() -> Self {
        let mut builtin: Vec<Entry> = BUILTIN_KEYWORDS
            .iter()
            .flat_map(|(category, keywords)| {
                keywords
                    .iter()
                    .filter_map(move |keyword| Entry::new(keyword, *category))
            })
            .collect();
        sort_entries(&mut builtin);
        Self {
            aliases: Vec::new(),
            builtin,
        }
    }

    /// Built-in table plus caller-supplied `alias → category name` pairs.
    ///
    /// Fails on an unknown category name or an alias that folds to nothing.
    pub fn with_aliases<I, K, V>(aliases: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut classifier = Self::new();
        for (alias, category) in aliases {
            let category: Category = category.as_ref().parse()?;
            let entry = Entry::new(alias.as_ref(), category).ok_or_else(|| {
                EngineError::InvalidCategory(format!("empty alias for {category}"))
            })?;
            if let Some(existing) = classifier.aliases.iter_mut().find(|e| e.text == entry.text) {
                *existing = entry;
            } else {
                classifier.aliases.push(entry);
            }
        }
        sort_entries(&mut classifier.aliases);

        tracing::debug!(
            "category classifier built with {} aliases",
            classifier.aliases.len()
        );
        Ok(classifier)
    }

    /// Category of the best keyword in `text`, or [`Category::Other`].
    #[must_use]
    pub fn classify(&self, text: &str) -> Category {
        let folded = fold_key(text);
        if folded.is_empty() {
            return Category::Other;
        }
        best_match(&self.aliases, &folded)
            .or_else(|| best_match(&self.builtin, &folded))
            .unwrap_or_default()
    }

    /// `true` when the whole of `word` is a known keyword.
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        let folded = fold_key(word);
        !folded.is_empty()
            && self
                .aliases
                .iter()
                .chain(self.builtin.iter())
                .any(|entry| entry.text == folded)
    }
}

fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.chars.cmp(&a.chars).then_with(|| a.text.cmp(&b.text)));
}

fn best_match(entries: &[Entry], folded: &str) -> Option<Category> {
    entries
        .iter()
        .enumerate()
        .flat_map(|(rank, entry)| {
            folded
                .match_indices(entry.text.as_str())
                .filter(move |(start, _)| whole_word(folded, *start, *start + entry.text.len()))
                .map(move |(start, _)| (Reverse(entry.chars), start, rank, entry.category))
        })
        .min_by_key(|&(chars, start, rank, _)| (chars, start, rank))
        .map(|(_, _, _, category)| category)
}

fn whole_word(folded: &str, start: usize, end: usize) -> bool {
    (start == 0 || folded[..start].ends_with(' '))
        && (end == folded.len() || folded[end..].starts_with(' '))
}
