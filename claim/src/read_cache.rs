use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use dashmap::{DashMap, DashSet};
use tracing::{debug, info, warn};

use crate::drop_client::DropReader;
use crate::dto::{ClaimCondition, ContractMetadata, SupplyCounters};
use crate::error::Error;

/// One of the independent reads the claim view needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    Metadata,
    ClaimedSupply,
    TotalSupply,
    ClaimCondition,
}

impl Query {
    pub const ALL: [Query; 4] = [
        Query::Metadata,
        Query::ClaimedSupply,
        Query::TotalSupply,
        Query::ClaimCondition,
    ];

    pub const SUPPLY: [Query; 2] = [Query::ClaimedSupply, Query::TotalSupply];
}

#[derive(Debug, Clone)]
enum Value {
    Metadata(ContractMetadata),
    ClaimedSupply(u64),
    TotalSupply(u64),
    ClaimCondition(Option<ClaimCondition>),
}

struct Entry {
    value: Value,
    fetched_at: Instant,
    stale: bool,
}

/// What a read returns on every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read<T> {
    pub data: Option<T>,
    pub is_loading: bool,
}

/**
 * Non blocking view over a `DropReader`. Reads return whatever is cached and
 * schedule a background fetch when the value is missing or old.
 * Arc on fields to copy the cache into the fetch threads.
 */
pub struct ReadCache<R: DropReader> {
    reader: Arc<R>,
    refresh_interval: Duration,
    entries: Arc<DashMap<Query, Entry>>,
    // to avoid duplicate concurrent fetches
    in_flight: Arc<DashSet<Query>>,
    failed_at: Arc<DashMap<Query, Instant>>,
    // bumped by invalidate, a fetch started under an older one lands stale
    generations: Arc<DashMap<Query, u64>>,
}

impl<R: DropReader> Clone for ReadCache<R> {
    fn clone(&self) -> Self {
        Self {
            reader: Arc::clone(&self.reader),
            refresh_interval: self.refresh_interval,
            entries: Arc::clone(&self.entries),
            in_flight: Arc::clone(&self.in_flight),
            failed_at: Arc::clone(&self.failed_at),
            generations: Arc::clone(&self.generations),
        }
    }
}

impl<R: DropReader> ReadCache<R> {
    pub fn new(reader: Arc<R>, refresh_interval: Duration) -> Self {
        Self {
            reader,
            refresh_interval,
            entries: Arc::new(DashMap::new()),
            in_flight: Arc::new(DashSet::new()),
            failed_at: Arc::new(DashMap::new()),
            generations: Arc::new(DashMap::new()),
        }
    }

    pub fn metadata(&self) -> Read<ContractMetadata> {
        self.read(Query::Metadata, |v| match v {
            Value::Metadata(m) => Some(m.clone()),
            _ => None,
        })
    }

    pub fn claimed_supply(&self) -> Read<u64> {
        self.read(Query::ClaimedSupply, |v| match v {
            Value::ClaimedSupply(n) => Some(*n),
            _ => None,
        })
    }

    pub fn total_supply(&self) -> Read<u64> {
        self.read(Query::TotalSupply, |v| match v {
            Value::TotalSupply(n) => Some(*n),
            _ => None,
        })
    }

    /// `data` is `Some(None)` when the drop has no active condition.
    pub fn claim_condition(&self) -> Read<Option<ClaimCondition>> {
        self.read(Query::ClaimCondition, |v| match v {
            Value::ClaimCondition(c) => Some(*c),
            _ => None,
        })
    }

    /// Both counters, once both have loaded.
    pub fn supply(&self) -> Option<SupplyCounters> {
        let claimed = self.claimed_supply().data?;
        let total = self.total_supply().data?;
        Some(SupplyCounters { claimed, total })
    }

    /// Marks the queries stale so the next read refetches them. A fetch that is
    /// already running stores its result as stale too.
    pub fn invalidate(&self, queries: &[Query]) {
        for query in queries {
            *self.generations.entry(*query).or_insert(0) += 1;
            if let Some(mut entry) = self.entries.get_mut(query) {
                entry.stale = true;
            }
            self.failed_at.remove(query);
        }
    }

    fn read<T>(&self, query: Query, extract: impl Fn(&Value) -> Option<T>) -> Read<T> {
        let (data, needs_fetch) = match self.entries.get(&query) {
            Some(entry) => (
                extract(&entry.value),
                entry.stale || entry.fetched_at.elapsed() >= self.refresh_interval,
            ),
            None => (None, self.retry_due(query)),
        };

        if needs_fetch {
            self.spawn_fetch(query);
        }

        let failed = self.entries.get(&query).is_none() && self.failed_at.contains_key(&query);
        Read {
            is_loading: data.is_none() && !failed,
            data,
        }
    }

    fn retry_due(&self, query: Query) -> bool {
        match self.failed_at.get(&query) {
            Some(at) => at.elapsed() >= self.refresh_interval,
            None => true,
        }
    }

    fn generation(&self, query: Query) -> u64 {
        self.generations.get(&query).map(|g| *g).unwrap_or(0)
    }

    fn spawn_fetch(&self, query: Query) {
        if !self.in_flight.insert(query) {
            return;
        }
        let generation = self.generation(query);
        debug!(?query, generation, "fetch scheduled");

        let cache = self.clone();
        thread::spawn(move || {
            match cache.fetch(query) {
                Ok(value) => {
                    info!(?query, "fetched");
                    // entry lock held while comparing so invalidate cannot slip in between
                    let slot = cache.entries.entry(query);
                    let stale = cache.generation(query) != generation;
                    slot.insert(Entry {
                        value,
                        fetched_at: Instant::now(),
                        stale,
                    });
                    cache.failed_at.remove(&query);
                }
                Err(e) => {
                    warn!(?query, error = %e, "fetch failed");
                    cache.failed_at.insert(query, Instant::now());
                    // keep serving the old value but do not refetch it every frame
                    if let Some(mut entry) = cache.entries.get_mut(&query) {
                        entry.fetched_at = Instant::now();
                        entry.stale = cache.generation(query) != generation;
                    }
                }
            }

            // Remove from in-flight
            cache.in_flight.remove(&query);
        });
    }

    fn fetch(&self, query: Query) -> Result<Value, Error> {
        Ok(match query {
            Query::Metadata => Value::Metadata(self.reader.contract_metadata()?),
            Query::ClaimedSupply => Value::ClaimedSupply(self.reader.claimed_supply()?),
            Query::TotalSupply => Value::TotalSupply(self.reader.total_supply()?),
            Query::ClaimCondition => Value::ClaimCondition(self.reader.active_claim_condition()?),
        })
    }
}
