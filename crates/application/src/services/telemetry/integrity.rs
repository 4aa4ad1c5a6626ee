use super::store::StoreInner;
use sinkhole_domain::{Counters, DomainError, Record, MAGIC_BYTE};

impl StoreInner {
    /// Cross-checks every aggregate against the records it summarises.
    ///
    /// Recomputes the counters from the live queries and compares them with
    /// the stored ones, then checks the per-entity sums and the OverTime
    /// alignment.
    pub fn verify_integrity(&self) -> Result<(), DomainError> {
        check_tags(self.queries.iter())?;
        check_tags(self.clients.iter())?;
        check_tags(self.domains.iter())?;
        check_tags(self.upstreams.iter())?;

        let mut expected = Counters::default();
        for (id, query) in self.queries.iter() {
            expected.count_query(query);
            ensure(self.domains.get(query.domain, false).is_some(), || {
                format!("query {} references missing domain {}", id, query.domain)
            })?;
            ensure(self.clients.get(query.client, false).is_some(), || {
                format!("query {} references missing client {}", id, query.client)
            })?;
            if let Some(upstream) = query.upstream {
                ensure(self.upstreams.get(upstream, false).is_some(), || {
                    format!("query {} references missing upstream {}", id, upstream)
                })?;
            }
        }
        expected.clients = self.clients.count() as u64;
        expected.domains = self.domains.count() as u64;
        expected.upstreams = self.upstreams.count() as u64;
        expected.gravity = self.counters.gravity;
        ensure(expected == self.counters, || {
            format!("counters {:?} do not match live queries {:?}", self.counters, expected)
        })?;

        let (count, blocked) = self
            .domains
            .iter()
            .fold((0, 0), |(c, b), (_, d)| (c + d.count, b + d.blocked_count));
        ensure(count == self.counters.queries && blocked == self.counters.blocked, || {
            format!("domain sums {}/{} vs counters {}/{}", count, blocked, self.counters.queries, self.counters.blocked)
        })?;

        let (count, blocked) = self
            .clients
            .iter()
            .fold((0, 0), |(c, b), (_, cl)| (c + cl.count, b + cl.blocked_count));
        ensure(count == self.counters.queries && blocked == self.counters.blocked, || {
            format!("client sums {}/{} vs counters {}/{}", count, blocked, self.counters.queries, self.counters.blocked)
        })?;

        let forwarded: u64 = self.upstreams.iter().map(|(_, u)| u.count).sum();
        ensure(forwarded == self.counters.forwarded, || {
            format!("upstream sum {} vs forwarded {}", forwarded, self.counters.forwarded)
        })?;

        self.verify_overtime()
    }

    fn verify_overtime(&self) -> Result<(), DomainError> {
        let slots = self.overtime.slots();
        for (id, client) in self.clients.iter() {
            ensure(client.overtime.len() == slots.len(), || {
                format!("client {} has {} slots, window has {}", id, client.overtime.len(), slots.len())
            })?;
        }

        for (i, slot) in slots.iter().enumerate() {
            let per_client: u64 = self.clients.iter().map(|(_, c)| c.overtime[i]).sum();
            ensure(per_client == slot.total, || {
                format!("slot {} total {} vs client sum {}", slot.timestamp, slot.total, per_client)
            })?;
            ensure(slot.blocked <= slot.total, || {
                format!("slot {} blocked {} exceeds total {}", slot.timestamp, slot.blocked, slot.total)
            })?;
        }
        Ok(())
    }
}

fn check_tags<'a, R, I>(records: I) -> Result<(), DomainError>
where
    R: Record + 'a,
    I: Iterator<Item = (R::Id, &'a R)>,
{
    for (id, record) in records {
        if record.magic() != MAGIC_BYTE {
            return Err(DomainError::Corruption {
                table: R::TABLE,
                id: id.into(),
            });
        }
    }
    Ok(())
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), DomainError> {
    if condition {
        Ok(())
    } else {
        Err(DomainError::CounterMismatch(message()))
    }
}
