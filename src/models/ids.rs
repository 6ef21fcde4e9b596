use chrono::Utc;
use std::sync::atomic::{ AtomicI64, Ordering };

/// Hands out millisecond-timestamp ids that strictly increase, even when
/// several are requested within the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(current, candidate, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return candidate.to_string(),
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn ids_strictly_increase() {
        let ids = IdGenerator::new();
        let issued: Vec<i64> = (0..1000).map(|_| ids.next_id().parse().unwrap()).collect();
        assert!(issued.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn ids_unique_across_threads() {
        let ids = Arc::new(IdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
