use sinkhole_domain::{GravityConfig, ListKind};
use sinkhole_infrastructure::gravity::GravityEngine;
use sinkhole_infrastructure::repositories::SqliteListStore;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE "group" (id INTEGER PRIMARY KEY, enabled BOOLEAN NOT NULL DEFAULT 1, name TEXT UNIQUE NOT NULL)"#,
    "CREATE TABLE domainlist (id INTEGER PRIMARY KEY AUTOINCREMENT, type INTEGER NOT NULL DEFAULT 0, domain TEXT NOT NULL, enabled BOOLEAN NOT NULL DEFAULT 1, UNIQUE(domain, type))",
    "CREATE TABLE domainlist_by_group (domainlist_id INTEGER NOT NULL, group_id INTEGER NOT NULL, PRIMARY KEY (domainlist_id, group_id))",
    "CREATE TABLE adlist (id INTEGER PRIMARY KEY AUTOINCREMENT, address TEXT UNIQUE NOT NULL, enabled BOOLEAN NOT NULL DEFAULT 1)",
    "CREATE TABLE adlist_by_group (adlist_id INTEGER NOT NULL, group_id INTEGER NOT NULL, PRIMARY KEY (adlist_id, group_id))",
    "CREATE TABLE gravity (domain TEXT NOT NULL, adlist_id INTEGER NOT NULL)",
    "CREATE TABLE client (id INTEGER PRIMARY KEY AUTOINCREMENT, ip TEXT NOT NULL UNIQUE)",
    "CREATE TABLE client_by_group (client_id INTEGER NOT NULL, group_id INTEGER NOT NULL, PRIMARY KEY (client_id, group_id))",
    "CREATE TABLE domain_audit (id INTEGER PRIMARY KEY AUTOINCREMENT, domain TEXT UNIQUE NOT NULL)",
    r#"INSERT INTO "group" (id, enabled, name) VALUES (0, 1, 'Default')"#,
];

/// In-memory gravity database with the list schema and the default group.
pub struct GravityDb {
    pub pool: SqlitePool,
}

impl GravityDb {
    pub async fn new() -> Self {
        // One connection: every in-memory connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        Self { pool }
    }

    pub async fn engine(&self, config: &GravityConfig) -> Arc<GravityEngine> {
        let store = SqliteListStore::new(self.pool.clone());
        Arc::new(GravityEngine::new(Arc::new(store), config).await.unwrap())
    }

    pub async fn add_group(&self, id: i64, name: &str) {
        sqlx::query(r#"INSERT INTO "group" (id, enabled, name) VALUES (?, 1, ?)"#)
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn add_client(&self, ip: &str, groups: &[i64]) {
        let id = sqlx::query("INSERT INTO client (ip) VALUES (?)")
            .bind(ip)
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid();
        for group in groups {
            sqlx::query("INSERT INTO client_by_group (client_id, group_id) VALUES (?, ?)")
                .bind(id)
                .bind(group)
                .execute(&self.pool)
                .await
                .unwrap();
        }
    }

    /// Adds a domainlist entry, or an adlist with one domain for gravity.
    pub async fn add(&self, kind: ListKind, value: &str, groups: &[i64]) {
        let (id, link) = match kind.domainlist_type() {
            Some(list_type) => {
                let id = sqlx::query("INSERT INTO domainlist (type, domain) VALUES (?, ?)")
                    .bind(list_type)
                    .bind(value)
                    .execute(&self.pool)
                    .await
                    .unwrap()
                    .last_insert_rowid();
                (id, "INSERT INTO domainlist_by_group (domainlist_id, group_id) VALUES (?, ?)")
            }
            None => {
                let id = sqlx::query("INSERT INTO adlist (address) VALUES (?)")
                    .bind(format!("https://lists.example/{}", value))
                    .execute(&self.pool)
                    .await
                    .unwrap()
                    .last_insert_rowid();
                sqlx::query("INSERT INTO gravity (domain, adlist_id) VALUES (?, ?)")
                    .bind(value)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .unwrap();
                (id, "INSERT INTO adlist_by_group (adlist_id, group_id) VALUES (?, ?)")
            }
        };
        for group in groups {
            sqlx::query(link)
                .bind(id)
                .bind(group)
                .execute(&self.pool)
                .await
                .unwrap();
        }
    }

    pub async fn add_audit(&self, domain: &str) {
        sqlx::query("INSERT INTO domain_audit (domain) VALUES (?)")
            .bind(domain)
            .execute(&self.pool)
            .await
            .unwrap();
    }
}
