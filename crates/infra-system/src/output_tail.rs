// Bounded trailing excerpt of a process's output

/// Keeps only the last `limit` characters pushed into it
#[derive(Debug, Clone)]
pub struct OutputTail {
    buf: String,
    limit: usize,
}

impl OutputTail {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: String::new(),
            limit,
        }
    }

    pub fn push(&mut self, chunk: &str) {
        self.buf.push_str(chunk);
        let excess = self.buf.chars().count().saturating_sub(self.limit);
        if excess > 0 {
            let cut = self
                .buf
                .char_indices()
                .nth(excess)
                .map(|(i, _)| i)
                .unwrap_or(self.buf.len());
            self.buf.drain(..cut);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_only_trailing_chars() {
        let mut tail = OutputTail::new(5);
        tail.push("hello ");
        tail.push("world");
        assert_eq!(tail.as_str(), "world");
    }

    #[test]
    fn test_cuts_on_char_boundary() {
        let mut tail = OutputTail::new(3);
        tail.push("añoño");
        assert_eq!(tail.as_str(), "oño");
    }

    #[test]
    fn test_short_output_untouched() {
        let mut tail = OutputTail::new(1000);
        tail.push("dnsmasq: started\n");
        assert_eq!(tail.into_string(), "dnsmasq: started\n");
    }
}
