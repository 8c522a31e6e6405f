use serde::Serialize;

/// Model calls that came back empty, per task and in total
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailureTally {
    per_task: Vec<(String, usize)>,
    total: usize,
}

impl FailureTally {
    pub fn record(&mut self, task_name: &str, failures: usize) {
        match self.per_task.iter_mut().find(|(name, _)| name == task_name) {
            Some((_, count)) => *count += failures,
            None => self.per_task.push((task_name.to_string(), failures)),
        }
        self.total += failures;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn for_task(&self, task_name: &str) -> Option<usize> {
        self.per_task
            .iter()
            .find(|(name, _)| name == task_name)
            .map(|(_, count)| *count)
    }

    /// Per-task counts in run order
    pub fn per_task(&self) -> &[(String, usize)] {
        &self.per_task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let mut tally = FailureTally::default();
        tally.record("a", 2);
        tally.record("b", 0);
        tally.record("a", 1);
        assert_eq!(tally.for_task("a"), Some(3));
        assert_eq!(tally.for_task("b"), Some(0));
        assert_eq!(tally.for_task("c"), None);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.per_task().len(), 2);
    }
}
