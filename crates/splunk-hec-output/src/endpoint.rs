use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ConfigError;

/// Static pool of indexer addresses with a shared round-robin cursor.
///
/// `next()` is an atomic read-and-increment, so concurrent deliveries each
/// take a distinct slot of the rotation. The cursor always stays within
/// `0..endpoints.len()`.
#[derive(Debug)]
pub struct EndpointPool {
    endpoints: Vec<String>,
    cursor: AtomicUsize,
}

impl EndpointPool {
    pub fn new(endpoints: Vec<String>) -> Result<Self, ConfigError> {
        if endpoints.is_empty() {
            return Err(ConfigError::EmptyEndpoints);
        }
        Ok(EndpointPool {
            endpoints,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the endpoint at the cursor and advances it, wrapping around.
    pub fn next(&self) -> &str {
        let len = self.endpoints.len();
        #[allow(clippy::unwrap_used)] // the closure never returns None
        let i = self
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| Some((c + 1) % len))
            .unwrap();
        &self.endpoints[i]
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::EndpointPool;
    use crate::error::ConfigError;

    #[test]
    fn test_empty_pool_is_rejected() {
        assert!(matches!(
            EndpointPool::new(vec![]),
            Err(ConfigError::EmptyEndpoints)
        ));
    }

    #[test]
    fn test_round_robin_visits_each_endpoint_once_then_wraps() {
        let pool = EndpointPool::new(vec![
            "a:8088".to_string(),
            "b:8088".to_string(),
            "c:8088".to_string(),
        ])
        .unwrap();
        assert_eq!(pool.next(), "a:8088");
        assert_eq!(pool.next(), "b:8088");
        assert_eq!(pool.next(), "c:8088");
        assert_eq!(pool.next(), "a:8088");
    }

    #[test]
    fn test_single_endpoint_always_selected() {
        let pool = EndpointPool::new(vec!["only:8088".to_string()]).unwrap();
        assert_eq!(pool.next(), "only:8088");
        assert_eq!(pool.next(), "only:8088");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_selection_distributes_evenly() {
        let pool = Arc::new(
            EndpointPool::new(vec!["a:8088".to_string(), "b:8088".to_string()]).unwrap(),
        );

        let mut handles = Vec::new();
        for _ in 0..4 {
            let pool = Arc::clone(&pool);
            handles.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                for _ in 0..50 {
                    seen.push(pool.next().to_string());
                }
                seen
            }));
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for handle in handles {
            for endpoint in handle.await.unwrap() {
                *counts.entry(endpoint).or_default() += 1;
            }
        }
        // 200 selections over 2 endpoints: the atomic cursor hands out exactly
        // alternating slots, so the split is exact.
        assert_eq!(counts.get("a:8088"), Some(&100));
        assert_eq!(counts.get("b:8088"), Some(&100));
    }
}
