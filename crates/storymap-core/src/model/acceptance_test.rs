use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::TestStatus;

/// Given/When/Then acceptance criterion owned by one story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceTest {
    pub id: String,
    pub story_id: String,
    pub title: String,
    pub given: String,
    pub when: String,
    pub then: String,
    pub status: TestStatus,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AcceptanceTest {
    pub fn new(id: String, story_id: String, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            story_id,
            title,
            given: String::new(),
            when: String::new(),
            then: String::new(),
            status: TestStatus::Pending,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// All three Given/When/Then clauses carry text
    pub fn is_complete(&self) -> bool {
        [&self.given, &self.when, &self.then]
            .iter()
            .all(|clause| !clause.trim().is_empty())
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness_requires_all_clauses() {
        let mut test = AcceptanceTest::new("t1".to_string(), "s1".to_string(), "t".to_string());
        assert!(!test.is_complete());

        test.given = "a cart".to_string();
        test.when = "I pay".to_string();
        test.then = "   ".to_string();
        assert!(!test.is_complete());

        test.then = "an order exists".to_string();
        assert!(test.is_complete());
    }
}
