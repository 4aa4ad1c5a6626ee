use crate::errors::DomainError;
use crate::query::QueryStatus;
use crate::validators::{
    validate_client_filter, validate_domain_filter, validate_limit, validate_time_range,
};

/// History filter handed in by the presentation layer.
///
/// Must pass [`QueryFilter::validate`] before it reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub status: Option<QueryStatus>,
    /// Client address or host name.
    pub client: Option<String>,
    pub domain: Option<String>,
    /// Only queries with an id strictly below this one.
    pub before_id: Option<usize>,
    pub from: Option<i64>,
    pub until: Option<i64>,
    pub limit: usize,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            status: None,
            client: None,
            domain: None,
            before_id: None,
            from: None,
            until: None,
            limit: 100,
        }
    }
}

impl QueryFilter {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_limit(self.limit).map_err(DomainError::InvalidInput)?;
        validate_time_range(self.from, self.until).map_err(DomainError::InvalidInput)?;
        if let Some(domain) = &self.domain {
            validate_domain_filter(domain).map_err(DomainError::InvalidInput)?;
        }
        if let Some(client) = &self.client {
            validate_client_filter(client).map_err(DomainError::InvalidInput)?;
        }
        Ok(())
    }

    /// Parses a status name coming from a request parameter.
    pub fn parse_status(value: &str) -> Result<QueryStatus, DomainError> {
        QueryStatus::from_str(value)
            .ok_or_else(|| DomainError::InvalidInput(format!("Unknown query status: {value}")))
    }

    pub fn matches_time(&self, timestamp: i64) -> bool {
        self.from.map_or(true, |f| timestamp >= f) && self.until.map_or(true, |u| timestamp <= u)
    }
}
