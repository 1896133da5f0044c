//! Stage 5: household/network inference.
//!
//! Groups rows by (referrer identity, account-holder surname). This is
//! intentionally conservative: a shared referrer alone, or a shared
//! surname alone, never constitutes a network -- both signals must
//! co-occur. Network size counts distinct account ids, so legitimate
//! duplicate certifications for the same account don't inflate it.

use crate::record::EnrichedEvent;
use crate::types::ReferrerId;
use std::collections::{HashMap, HashSet};

/// Annotate every row with its group's synthetic network id
/// (`referrer:surname`) and the group's distinct-account size.
pub fn infer_networks(events: &mut [EnrichedEvent]) {
    let mut accounts: HashMap<(&ReferrerId, &str), HashSet<&str>> = HashMap::new();
    for event in events.iter() {
        accounts
            .entry((&event.referrer, &event.account_surname))
            .or_default()
            .insert(&event.event.account_id);
    }

    let sizes: HashMap<(ReferrerId, String), u32> = accounts
        .into_iter()
        .map(|((referrer, surname), ids)| {
            ((referrer.clone(), surname.to_string()), ids.len() as u32)
        })
        .collect();

    for event in events.iter_mut() {
        let key = (event.referrer.clone(), event.account_surname.clone());
        event.network_size = sizes[&key];
        event.network_id = format!("{}:{}", event.referrer, event.account_surname);
    }
}
