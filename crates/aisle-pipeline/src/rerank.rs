//! Merging AI orderings back into the fused candidate list.
//!
//! AI services may only reorder what they were shown: unknown ids and
//! repeated ids are dropped, and nothing they omit is lost.

use std::collections::HashMap;

use aisle_core::models::{Candidate, ProductId, RerankedItem};
use aisle_scoring::fusion::soft_matches_first;
use tracing::debug;

/// Put up to `max_results` reranked items first, in the reranker's order and
/// carrying its explanations. Only ids among the first `offered` candidates
/// are accepted. Everything else follows in fused order with soft matches
/// floated to the front.
pub fn apply_rerank(
    fused: Vec<Candidate>,
    items: Vec<RerankedItem>,
    offered: usize,
    max_results: usize,
) -> Vec<Candidate> {
    let position: HashMap<ProductId, usize> = fused
        .iter()
        .take(offered)
        .enumerate()
        .map(|(i, c)| (c.id().clone(), i))
        .collect();
    let mut slots: Vec<Option<Candidate>> = fused.into_iter().map(Some).collect();

    let mut head = Vec::new();
    let mut dropped = 0usize;
    for item in items {
        if head.len() >= max_results {
            break;
        }
        let taken = position
            .get(&item.id)
            .and_then(|&i| slots.get_mut(i))
            .and_then(Option::take);
        match taken {
            Some(mut c) => {
                c.explanation = item.explanation;
                head.push(c);
            }
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, "rerank returned ids outside its input");
    }

    let rest: Vec<Candidate> = slots
        .into_iter()
        .flatten()
        .map(|mut c| {
            c.explanation = None;
            c
        })
        .collect();
    head.extend(soft_matches_first(rest));
    head
}

/// Move the selected ids (at most `max`, first occurrence wins) to the front
/// in selection order; the rest keep their order.
pub fn promote_selected(candidates: Vec<Candidate>, selected: &[ProductId], max: usize) -> Vec<Candidate> {
    let position: HashMap<&str, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id().as_str(), i))
        .collect();
    let mut order: Vec<usize> = Vec::new();
    for id in selected {
        if order.len() >= max {
            break;
        }
        if let Some(&i) = position.get(id.as_str()) {
            if !order.contains(&i) {
                order.push(i);
            }
        }
    }

    let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
    let mut out: Vec<Candidate> = order.iter().filter_map(|&i| slots[i].take()).collect();
    out.extend(slots.into_iter().flatten());
    out
}
