//! Answer synthesis: pick the question type and render the matching fact.

use coinclaw_core::error::Rejection;
use coinclaw_core::record::CoinRecord;

/// What the person is asking about. Detection is keyword-based and
/// checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// "price", "value", "cost"
    Price,
    /// "consensus", "proof"
    Consensus,
    /// "launch", "year", "when"
    Launch,
    /// "about", "tell me", "what is"
    Overview,
    /// Anything else
    Summary,
}

impl QuestionKind {
    pub fn detect(query: &str) -> Self {
        let q = query.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| q.contains(w));

        if has(&["price", "value", "cost"]) {
            Self::Price
        } else if has(&["consensus", "proof"]) {
            Self::Consensus
        } else if has(&["launch", "year", "when"]) {
            Self::Launch
        } else if has(&["about", "tell me", "what is"]) {
            Self::Overview
        } else {
            Self::Summary
        }
    }
}

/// Render the answer text for `kind`, or report the requested fact missing.
pub fn render(kind: QuestionKind, record: &CoinRecord) -> Result<String, Rejection> {
    let name = &record.display_name;
    let symbol = &record.symbol;

    match kind {
        QuestionKind::Price => {
            let price = record.last_price.ok_or(Rejection::FieldUnavailable)?;
            Ok(format!("The price of {name} ({symbol}) is ${price}."))
        }
        QuestionKind::Consensus => {
            let consensus = known_consensus(record).ok_or(Rejection::FieldUnavailable)?;
            Ok(format!("{name} uses {consensus} consensus."))
        }
        QuestionKind::Launch => {
            let year = known_year(record).ok_or(Rejection::FieldUnavailable)?;
            Ok(format!("{name} was launched in {year}."))
        }
        QuestionKind::Overview => Ok(format!(
            "{name} ({symbol}) is a cryptocurrency launched in {} using {}. Current price: {}.",
            known_year(record).map_or_else(|| "an unknown year".to_string(), |y| y.to_string()),
            record.consensus_mechanism,
            price_text(record)
        )),
        QuestionKind::Summary => Ok(format!(
            "{name} ({symbol}): Price {}, Consensus: {}.",
            price_text(record),
            record.consensus_mechanism
        )),
    }
}

fn known_consensus(record: &CoinRecord) -> Option<&str> {
    let consensus = record.consensus_mechanism.trim();
    (!consensus.is_empty() && !consensus.eq_ignore_ascii_case("unknown")).then_some(consensus)
}

fn known_year(record: &CoinRecord) -> Option<i32> {
    (record.launch_year > 0).then_some(record.launch_year)
}

fn price_text(record: &CoinRecord) -> String {
    record
        .last_price
        .map_or_else(|| "unavailable".to_string(), |p| format!("${p}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bitcoin() -> CoinRecord {
        CoinRecord::new("Bitcoin", "BTC", 2009, "Proof of Work").with_price(65000.12, Utc::now())
    }

    #[test]
    fn detects_question_kinds() {
        assert_eq!(QuestionKind::detect("What is the price of BTC?"), QuestionKind::Price);
        assert_eq!(QuestionKind::detect("how much does it cost"), QuestionKind::Price);
        assert_eq!(QuestionKind::detect("Is ETH proof of stake?"), QuestionKind::Consensus);
        assert_eq!(QuestionKind::detect("When was Solana launched?"), QuestionKind::Launch);
        assert_eq!(QuestionKind::detect("Tell me about Bitcoin"), QuestionKind::Overview);
        assert_eq!(QuestionKind::detect("What is Dogecoin"), QuestionKind::Overview);
        assert_eq!(QuestionKind::detect("BTC"), QuestionKind::Summary);
    }

    #[test]
    fn price_wins_over_other_keywords() {
        assert_eq!(
            QuestionKind::detect("Tell me about the price of Bitcoin"),
            QuestionKind::Price
        );
    }

    #[test]
    fn renders_each_template() {
        let btc = bitcoin();
        assert_eq!(
            render(QuestionKind::Price, &btc).unwrap(),
            "The price of Bitcoin (BTC) is $65000.12."
        );
        assert_eq!(
            render(QuestionKind::Consensus, &btc).unwrap(),
            "Bitcoin uses Proof of Work consensus."
        );
        assert_eq!(render(QuestionKind::Launch, &btc).unwrap(), "Bitcoin was launched in 2009.");
        assert_eq!(
            render(QuestionKind::Overview, &btc).unwrap(),
            "Bitcoin (BTC) is a cryptocurrency launched in 2009 using Proof of Work. Current price: $65000.12."
        );
        assert_eq!(
            render(QuestionKind::Summary, &btc).unwrap(),
            "Bitcoin (BTC): Price $65000.12, Consensus: Proof of Work."
        );
    }

    #[test]
    fn missing_facts_are_unavailable() {
        let bare = CoinRecord::new("Mystery", "MYS", 0, "Unknown");
        assert_eq!(render(QuestionKind::Price, &bare), Err(Rejection::FieldUnavailable));
        assert_eq!(render(QuestionKind::Consensus, &bare), Err(Rejection::FieldUnavailable));
        assert_eq!(render(QuestionKind::Launch, &bare), Err(Rejection::FieldUnavailable));
    }

    #[test]
    fn overview_tolerates_missing_price() {
        let record = CoinRecord::new("Cardano", "ADA", 2017, "Proof of Stake");
        let text = render(QuestionKind::Overview, &record).unwrap();
        assert!(text.ends_with("Current price: unavailable."));
        let text = render(QuestionKind::Summary, &record).unwrap();
        assert!(text.contains("Price unavailable"));
    }
}
