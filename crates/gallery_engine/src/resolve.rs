use std::future::Future;

use crate::fetch::Fetcher;
use crate::record::SourceSet;
use crate::types::{FetchError, FetchOutput};

/// Awaits each fallible attempt in order and returns the first success.
/// When every attempt fails, all errors come back in attempt order. Each
/// attempt runs at most once: this is an ordered alternate-path chain, not a
/// retry loop. Shared by the image-tier fallback and the metadata-format
/// fallback.
pub async fn first_success<T, E, F>(attempts: impl IntoIterator<Item = F>) -> Result<T, Vec<E>>
where
    F: Future<Output = Result<T, E>>,
{
    let mut errors = Vec::new();
    for attempt in attempts {
        match attempt.await {
            Ok(value) => return Ok(value),
            Err(err) => errors.push(err),
        }
    }
    Err(errors)
}

/// Fetches the best available resolution tier: `high`, then `medium`. The
/// `low` tier is a reduced-fidelity format and never substitutes for them.
pub async fn resolve_image(
    fetcher: &dyn Fetcher,
    sources: &SourceSet,
) -> Result<FetchOutput, Vec<FetchError>> {
    first_success([fetcher.fetch(&sources.high), fetcher.fetch(&sources.medium)]).await
}
