//! Fact store implementations for CoinClaw.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;

use coinclaw_core::record::CoinRecord;

/// Shared upsert rule: refresh the record with the same symbol, or append.
/// Returns the stored copy.
pub(crate) fn upsert_into(records: &mut Vec<CoinRecord>, mut incoming: CoinRecord) -> CoinRecord {
    incoming.normalize();
    match records
        .iter_mut()
        .find(|r| r.symbol.eq_ignore_ascii_case(&incoming.symbol))
    {
        Some(existing) => {
            existing.refresh_from(&incoming);
            existing.clone()
        }
        None => {
            records.push(incoming.clone());
            incoming
        }
    }
}

/// Symbol matches win over name matches, so a coin named like another's
/// ticker cannot shadow it.
pub(crate) fn find_in<'a>(records: &'a [CoinRecord], identifier: &str) -> Option<&'a CoinRecord> {
    let needle = identifier.trim();
    if needle.is_empty() {
        return None;
    }
    records
        .iter()
        .find(|r| r.symbol.eq_ignore_ascii_case(needle))
        .or_else(|| records.iter().find(|r| r.matches(needle)))
}
