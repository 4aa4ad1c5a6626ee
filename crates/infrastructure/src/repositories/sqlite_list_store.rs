use async_trait::async_trait;
use sinkhole_application::ports::ListStore;
use sinkhole_domain::{ClientEntry, DomainError, GroupEntry, ListEntry, ListKind};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, instrument};

/// `(id, value, group_id)` with one row per group membership.
type MembershipRow = (i64, String, Option<i64>);

/// Read-only access to the gravity list database.
pub struct SqliteListStore {
    pool: SqlitePool,
}

impl SqliteListStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_memberships(&self, sql: &str, bind: Option<i64>) -> Result<Vec<MembershipRow>, sqlx::Error> {
        let query = sqlx::query_as::<_, MembershipRow>(sql);
        let query = match bind {
            Some(value) => query.bind(value),
            None => query,
        };
        query.fetch_all(&self.pool).await
    }
}

/// Folds consecutive rows sharing a value into one entry.
///
/// Rows must be ordered so that equal values are adjacent.
fn merge_memberships(rows: Vec<MembershipRow>) -> Vec<ListEntry> {
    let mut entries: Vec<ListEntry> = Vec::new();
    for (id, value, group_id) in rows {
        match entries.last_mut() {
            Some(last) if last.value.as_ref() == value => {
                if let Some(g) = group_id {
                    if !last.group_ids.contains(&g) {
                        last.group_ids.push(g);
                    }
                }
            }
            _ => entries.push(ListEntry::new(id, &value, group_id.into_iter().collect())),
        }
    }
    entries
}

#[async_trait]
impl ListStore for SqliteListStore {
    #[instrument(skip(self))]
    async fn load_groups(&self) -> Result<Vec<GroupEntry>, DomainError> {
        let rows = sqlx::query_as::<_, (i64, bool, String)>(
            r#"SELECT id, enabled, name FROM "group" ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load groups");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(|(id, enabled, name)| GroupEntry {
                id,
                enabled,
                name: Arc::from(name.as_str()),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn load_clients(&self) -> Result<Vec<ClientEntry>, DomainError> {
        let rows = self
            .fetch_memberships(
                "SELECT c.id, c.ip, cbg.group_id
                 FROM client c
                 LEFT JOIN client_by_group cbg ON cbg.client_id = c.id
                 ORDER BY c.id",
                None,
            )
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load clients");
                DomainError::DatabaseError(e.to_string())
            })?;

        let mut clients: Vec<ClientEntry> = Vec::new();
        for (id, ip, group_id) in rows {
            match clients.last_mut() {
                Some(last) if last.id == id => last.group_ids.extend(group_id),
                _ => clients.push(ClientEntry {
                    id,
                    ip: Arc::from(ip.trim()),
                    group_ids: group_id.into_iter().collect(),
                }),
            }
        }
        Ok(clients)
    }

    #[instrument(skip(self))]
    async fn load_list(&self, kind: ListKind) -> Result<Vec<ListEntry>, DomainError> {
        let result = match kind.domainlist_type() {
            Some(list_type) => {
                self.fetch_memberships(
                    "SELECT d.id, d.domain, dbg.group_id
                     FROM domainlist d
                     LEFT JOIN domainlist_by_group dbg ON dbg.domainlist_id = d.id
                     WHERE d.type = ? AND d.enabled = 1
                     ORDER BY d.id",
                    Some(list_type),
                )
                .await
            }
            None => {
                self.fetch_memberships(
                    "SELECT g.adlist_id, g.domain, abg.group_id
                     FROM gravity g
                     JOIN adlist a ON a.id = g.adlist_id AND a.enabled = 1
                     LEFT JOIN adlist_by_group abg ON abg.adlist_id = a.id
                     ORDER BY g.domain",
                    None,
                )
                .await
            }
        };

        let rows = result.map_err(|e| DomainError::ListUnavailable {
            list: kind,
            reason: e.to_string(),
        })?;
        Ok(merge_memberships(rows))
    }

    #[instrument(skip(self))]
    async fn load_audit_list(&self) -> Result<Vec<Arc<str>>, DomainError> {
        let rows = sqlx::query_as::<_, (String,)>("SELECT domain FROM domain_audit")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load audit list");
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(rows.into_iter().map(|(d,)| Arc::from(d.as_str())).collect())
    }
}
