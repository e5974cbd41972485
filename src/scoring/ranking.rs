//! Ordering tools by score

use super::{ScoringPolicy, ScoringResult};
use crate::models::ToolEntry;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// One row of a ranked list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTool {
    pub id: String,
    pub score: f64,
}

/// Anything that carries a numeric ranking score
pub trait RankingScore {
    fn ranking_score(&self) -> f64;
}

impl RankingScore for RankedTool {
    fn ranking_score(&self) -> f64 {
        self.score
    }
}

impl<T: RankingScore + ?Sized> RankingScore for &T {
    fn ranking_score(&self) -> f64 {
        (**self).ranking_score()
    }
}

fn descending<T: RankingScore>(a: &T, b: &T) -> Ordering {
    b.ranking_score().total_cmp(&a.ranking_score())
}

/// Score every entry with the default (log-weighted) policy and sort
/// descending. See [`rank_tools_with`].
pub fn rank_tools(entries: &[ToolEntry]) -> ScoringResult<Vec<RankedTool>> {
    rank_tools_with(entries, &ScoringPolicy::default())
}

/// Score every entry with `policy` and sort descending.
///
/// The sort is stable: tools with equal scores keep their input order.
/// An empty input gives an empty list. The first entry that fails to score
/// aborts the whole ranking.
pub fn rank_tools_with(
    entries: &[ToolEntry],
    policy: &ScoringPolicy,
) -> ScoringResult<Vec<RankedTool>> {
    let mut ranked: Vec<RankedTool> = entries
        .par_iter()
        .map(|entry| {
            policy.score(&entry.metrics).map(|score| RankedTool {
                id: entry.id.clone(),
                score,
            })
        })
        .collect::<ScoringResult<Vec<_>>>()?;

    ranked.sort_by(descending);
    debug!("Ranked {} tools with {} policy", ranked.len(), policy.name());
    Ok(ranked)
}

/// Sort by ranking score, highest first, and keep the first `n`.
///
/// Returns everything when `n` exceeds the collection; `n == 0` returns
/// an empty list.
pub fn get_top_n<T: RankingScore>(mut tools: Vec<T>, n: usize) -> Vec<T> {
    if n == 0 {
        return Vec::new();
    }
    tools.sort_by(descending);
    tools.truncate(n);
    tools
}
