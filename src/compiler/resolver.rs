use crate::dsl::Step;

/// Identifier the runtime hands to the first post/page it creates.
pub const FIRST_CREATED_ID: u64 = 2;

/// Predicts the post ID the step `step_id` will get once the script runs.
///
/// The runtime numbers created posts sequentially, so the prediction is
/// `FIRST_CREATED_ID` plus the number of content-creating steps positioned
/// before it. It only holds while the compiler emits creation instructions
/// in list order, one per content-creating step. Media imports also consume
/// IDs and are not accounted for.
///
/// Returns `None` when no step has that id.
pub fn estimate_created_id(step_id: &str, steps: &[Step]) -> Option<u64> {
    let position = steps.iter().position(|s| s.id == step_id)?;
    Some(created_id_at(position, steps))
}

/// Same prediction for the step at `position`, independent of ids.
pub fn created_id_at(position: usize, steps: &[Step]) -> u64 {
    let prior = steps[..position.min(steps.len())]
        .iter()
        .filter(|s| s.kind.creates_content())
        .count();
    FIRST_CREATED_ID + prior as u64
}
