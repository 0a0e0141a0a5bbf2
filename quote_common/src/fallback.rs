//! Hand-curated quotes bundled with the service.
//!
//! Used as the last tier of request resolution, when the queue is empty and the direct
//! fetch failed, so the endpoint keeps answering with every upstream down.
use rand::Rng;

use crate::quote::{FALLBACK_SOURCE, Quote};

const BUNDLED: &[(&str, &str)] = &[
    (
        "Shakti Gawain",
        "The more light you allow within you, the brighter the world you live in will be.",
    ),
    (
        "Richard Bach",
        "In order to live free and happily you must sacrifice boredom. It is not always an easy sacrifice.",
    ),
    ("Napoleon Hill", "Ideas are the beginning points of all fortunes."),
];

const BUNDLED_TAG: &str = "Famous Quotes";

/// Immutable, non-empty table of fallback quotes.
#[derive(Debug, Clone)]
pub struct FallbackQuotes {
    quotes: Vec<Quote>,
}

impl FallbackQuotes {
    /// The table compiled into the binary.
    pub fn bundled() -> Self {
        let quotes = BUNDLED
            .iter()
            .map(|(author, text)| {
                Quote::new(*author, *text, vec![BUNDLED_TAG.to_string()], FALLBACK_SOURCE)
            })
            .collect();
        Self { quotes }
    }

    /// Uniformly random entry.
    pub fn choose(&self) -> Quote {
        let index = rand::rng().random_range(0..self.quotes.len());
        self.quotes[index].clone()
    }

    /// All entries.
    pub fn all(&self) -> &[Quote] {
        &self.quotes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bundled_quote_is_tagged_fallback() {
        let table = FallbackQuotes::bundled();
        assert!(!table.all().is_empty());
        assert!(table.all().iter().all(Quote::is_fallback));
    }

    #[test]
    fn choose_returns_a_table_entry() {
        let table = FallbackQuotes::bundled();
        for _ in 0..20 {
            let quote = table.choose();
            assert!(table.all().contains(&quote));
        }
    }
}
