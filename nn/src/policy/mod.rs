pub mod layers;
pub mod model;

pub use model::PolicyModel;

/// Indices of `scores` ordered by descending score; equal scores keep
/// ascending index order.
pub fn rank_indices(scores: &[f32]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_descending_score() {
        assert_eq!(rank_indices(&[0.1, 0.9, 0.5]), vec![1, 2, 0]);
    }

    #[test]
    fn equal_scores_keep_ascending_index_order() {
        assert_eq!(rank_indices(&[0.5, 0.7, 0.5, 0.5]), vec![1, 0, 2, 3]);
    }

    #[test]
    fn empty_scores_rank_empty() {
        assert!(rank_indices(&[]).is_empty());
    }
}
