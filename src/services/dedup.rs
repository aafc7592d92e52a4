/// Merging of provider results into one candidate list
///
/// Two candidates describe the same title when they share an ID, or when they
/// share a normalized title and release year. The caller only ever merges
/// results for a single category, so the category needs no place in the key.
use std::collections::HashMap;

use crate::models::Candidate;

/// Deduplicates `candidates`, keeping first-seen order
///
/// When two records merge, their `available_platforms` are unioned and the
/// record with the higher `popularity_score` represents the group (the earlier
/// one on ties).
pub fn merge_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = Vec::with_capacity(candidates.len());
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut by_title: HashMap<(String, Option<i32>), usize> = HashMap::new();

    for candidate in candidates {
        let title_key = (candidate.normalized_title(), candidate.release_year);

        let existing = by_id
            .get(&candidate.id)
            .or_else(|| by_title.get(&title_key))
            .copied();

        match existing {
            Some(index) => {
                let kept = &mut merged[index];
                let mut platforms = std::mem::take(&mut kept.available_platforms);
                platforms.extend(candidate.available_platforms.iter().copied());

                if candidate.popularity_score > kept.popularity_score {
                    *kept = candidate;
                    by_id.insert(kept.id.clone(), index);
                    by_title.entry(title_key).or_insert(index);
                }
                kept.available_platforms = platforms;
            }
            None => {
                let index = merged.len();
                by_id.insert(candidate.id.clone(), index);
                by_title.insert(title_key, index);
                merged.push(candidate);
            }
        }
    }

    merged
}
