/// Longest domain name accepted from the presentation layer (RFC 1035).
pub const MAX_DOMAIN_LENGTH: usize = 253;

/// Upper bound for a single history page.
pub const MAX_QUERY_LIMIT: usize = 100_000;

pub fn validate_domain_filter(domain: &str) -> Result<(), String> {
    if domain.is_empty() {
        return Err("Domain filter cannot be empty".to_string());
    }
    if domain.len() > MAX_DOMAIN_LENGTH {
        return Err(format!(
            "Domain filter cannot exceed {MAX_DOMAIN_LENGTH} characters"
        ));
    }
    if domain.contains(char::is_whitespace) || domain.contains('\0') {
        return Err("Domain filter contains invalid characters".to_string());
    }
    Ok(())
}

pub fn validate_client_filter(client: &str) -> Result<(), String> {
    if client.is_empty() {
        return Err("Client filter cannot be empty".to_string());
    }
    if client.len() > 255 {
        return Err("Client filter cannot exceed 255 characters".to_string());
    }
    if client.contains('\0') {
        return Err("Client filter contains invalid characters".to_string());
    }
    Ok(())
}

pub fn validate_time_range(from: Option<i64>, until: Option<i64>) -> Result<(), String> {
    if from.is_some_and(|f| f < 0) || until.is_some_and(|u| u < 0) {
        return Err("Timestamps cannot be negative".to_string());
    }
    if let (Some(f), Some(u)) = (from, until) {
        if f > u {
            return Err(format!("Time range start {f} is after end {u}"));
        }
    }
    Ok(())
}

pub fn validate_limit(limit: usize) -> Result<(), String> {
    if limit == 0 {
        return Err("Limit must be at least 1".to_string());
    }
    if limit > MAX_QUERY_LIMIT {
        return Err(format!("Limit cannot exceed {MAX_QUERY_LIMIT}"));
    }
    Ok(())
}
