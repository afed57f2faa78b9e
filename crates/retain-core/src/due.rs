//! Due-set selection.

use chrono::{DateTime, Utc};

use crate::error::RetainResult;
use crate::store::QuestionStore;
use crate::types::Question;

/// Keep the questions due at `as_of`, oldest-overdue first.
///
/// The sort is stable: questions with equal `next_review` keep the order they
/// were given in.
pub fn select_due(questions: Vec<Question>, as_of: DateTime<Utc>) -> Vec<Question> {
    let mut due: Vec<Question> = questions.into_iter().filter(|q| q.is_due(as_of)).collect();
    due.sort_by_key(|q| q.next_review);
    due
}

/// Lists a tenant's due questions through a [`QuestionStore`].
pub struct DueSetSelector<'a> {
    store: &'a dyn QuestionStore,
}

impl<'a> DueSetSelector<'a> {
    pub fn new(store: &'a dyn QuestionStore) -> Self {
        Self { store }
    }

    /// All questions of `tenant_id` with `next_review <= as_of`.
    ///
    /// An empty result is not an error.
    pub async fn select(&self, tenant_id: &str, as_of: DateTime<Utc>) -> RetainResult<Vec<Question>> {
        let listed = self.store.list_due(tenant_id, as_of).await?;
        // Stores are trusted for tenancy, not for the due predicate or order.
        Ok(select_due(listed, as_of))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryQuestionStore;
    use crate::types::NewQuestion;
    use chrono::Duration;

    fn at(text: &str, next_review: DateTime<Utc>) -> Question {
        let mut q = Question::new("alice", NewQuestion::new(text, "a", ""), next_review);
        q.next_review = next_review;
        q
    }

    #[test]
    fn test_select_due_filters_and_orders() {
        let now = Utc::now();
        let questions = vec![
            at("soon", now + Duration::minutes(5)),
            at("yesterday", now - Duration::days(1)),
            at("now", now),
            at("last week", now - Duration::weeks(1)),
        ];

        let due = select_due(questions, now);
        let texts: Vec<_> = due.iter().map(|q| q.question_text.as_str()).collect();
        assert_eq!(texts, vec!["last week", "yesterday", "now"]);
    }

    #[test]
    fn test_select_due_is_stable_on_ties() {
        let now = Utc::now();
        let tie = now - Duration::hours(2);
        let questions = vec![at("b", tie), at("a", tie), at("c", tie)];

        let due = select_due(questions, now);
        let texts: Vec<_> = due.iter().map(|q| q.question_text.as_str()).collect();
        assert_eq!(texts, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_selector_empty_tenant() {
        let store = InMemoryQuestionStore::new();
        let selector = DueSetSelector::new(&store);

        let due = selector.select("nobody", Utc::now()).await.unwrap();
        assert!(due.is_empty());
    }

    #[tokio::test]
    async fn test_selector_nothing_due_yet() {
        let store = InMemoryQuestionStore::new();
        let now = Utc::now();
        store
            .create("alice", &at("tomorrow", now + Duration::days(1)))
            .await
            .unwrap();

        let due = DueSetSelector::new(&store).select("alice", now).await.unwrap();
        assert!(due.is_empty());
    }
}
