//! Identification check answered from the `id_cache` table.
//!
//! The network check that fills the cache runs elsewhere; this reader only
//! trusts entries younger than `max_age`.

use std::future::Future;

use acc_core::collab::IdentificationCheck;
use chrono::{Duration, Utc};
use tracing::debug;

use crate::{Error, SqliteStore};

#[derive(Clone)]
pub struct CachedIdentification {
  store:   SqliteStore,
  max_age: Duration,
}

impl CachedIdentification {
  pub fn new(store: SqliteStore, max_age: Duration) -> Self { Self { store, max_age } }
}

impl IdentificationCheck for CachedIdentification {
  type Error = Error;

  fn is_identified<'a>(
    &'a self,
    on_wiki_name: &'a str,
  ) -> impl Future<Output = Result<bool, Error>> + Send + 'a {
    async move {
      let checked_at = self.store.identification_checked_at(on_wiki_name).await?;
      let identified = checked_at.is_some_and(|at| Utc::now() - at <= self.max_age);
      debug!(on_wiki_name, ?checked_at, identified, "identification cache lookup");
      Ok(identified)
    }
  }
}
