use sinkhole_domain::{DomainError, StringHandle};

/// Append-only buffer of NUL-terminated strings addressed by byte offset.
///
/// Offset 0 always holds the empty string. Handles stay valid across
/// reallocation because they are offsets, not pointers.
#[derive(Debug, Clone)]
pub struct StringPool {
    buf: String,
}

impl StringPool {
    pub fn new() -> Self {
        Self {
            buf: String::from("\0"),
        }
    }

    /// Rebuilds a pool from raw contents taken by [`StringPool::contents`].
    pub fn from_contents(contents: String) -> Result<Self, DomainError> {
        if !contents.starts_with('\0') {
            return Err(DomainError::SnapshotRejected(
                "string pool does not start with the empty string".into(),
            ));
        }
        if contents.len() > u32::MAX as usize {
            return Err(DomainError::SnapshotRejected("string pool exceeds 4 GiB".into()));
        }
        Ok(Self { buf: contents })
    }

    pub fn intern(&mut self, text: &str) -> Result<StringHandle, DomainError> {
        if text.is_empty() {
            return Ok(StringHandle::EMPTY);
        }
        self.reserve_for([text])?;

        let offset = self.buf.len();
        self.buf.push_str(text);
        self.buf.push('\0');
        Ok(StringHandle::new(offset as u32))
    }

    /// Checks and reserves room for interning every string in `texts`.
    ///
    /// After it succeeds, interning those strings cannot fail.
    pub fn reserve_for<'a>(&mut self, texts: impl IntoIterator<Item = &'a str>) -> Result<(), DomainError> {
        let mut needed = 0usize;
        for text in texts.into_iter().filter(|t| !t.is_empty()) {
            if text.contains('\0') {
                return Err(DomainError::InvalidInput("string contains NUL byte".into()));
            }
            needed += text.len() + 1;
        }
        if needed == 0 {
            return Ok(());
        }
        if self.buf.len() + needed > u32::MAX as usize {
            return Err(DomainError::ResourceExhausted("string pool offset space".into()));
        }
        self.buf
            .try_reserve(needed)
            .map_err(|e| DomainError::ResourceExhausted(format!("string pool: {}", e)))
    }

    /// Resolves a handle. Handles not produced by this pool resolve to "".
    pub fn resolve(&self, handle: StringHandle) -> &str {
        let rest = match self.buf.get(handle.offset()..) {
            Some(rest) => rest,
            None => return "",
        };
        match rest.find('\0') {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.len() <= 1
    }

    pub fn contents(&self) -> &str {
        &self.buf
    }
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}
