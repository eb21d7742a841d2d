use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::CoreError;
use crate::models::CatalogItem;

/// Pick one candidate uniformly at random.
pub fn pick(candidates: &[CatalogItem]) -> Result<&CatalogItem, CoreError> {
    pick_with(&mut rand::thread_rng(), candidates)
}

/// [`pick`] with a caller-supplied RNG.
pub fn pick_with<'a, R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &'a [CatalogItem],
) -> Result<&'a CatalogItem, CoreError> {
    candidates.choose(rng).ok_or(CoreError::EmptyCandidateSet)
}
