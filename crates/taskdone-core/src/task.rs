use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived display classification. Never persisted; recomputed from
/// completion state and age every time it is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Upcoming,
    Overdue,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,

    pub title: String,

    pub is_completed: bool,

    pub creation_date: DateTime<Utc>,

    /// Back-reference to the owning category, by id only. The category
    /// owns the task through its collection, never the reverse.
    pub category: Uuid,
}

impl Task {
    pub fn new(title: String, category: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            is_completed: false,
            creation_date: now,
            category,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.creation_date
    }

    /// Age equal to the active window still counts as upcoming; only
    /// tasks strictly past it become overdue.
    pub fn bucket(&self, active_window: Duration, now: DateTime<Utc>) -> Bucket {
        if self.is_completed {
            Bucket::Completed
        } else if self.age(now) > active_window {
            Bucket::Overdue
        } else {
            Bucket::Upcoming
        }
    }

    /// Deep copy with a fresh identity, reattached to `category`.
    /// Title, completion state, and creation date carry over.
    pub fn duplicate(&self, category: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: self.title.clone(),
            is_completed: self.is_completed,
            creation_date: self.creation_date,
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::{Bucket, Task};

    fn fixed_now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
            .single()
            .expect("valid now")
    }

    #[test]
    fn new_task_is_incomplete_and_stamped() {
        let now = fixed_now();
        let category = Uuid::new_v4();
        let task = Task::new("Write spec".to_string(), category, now);

        assert!(!task.is_completed);
        assert_eq!(task.creation_date, now);
        assert_eq!(task.category, category);
    }

    #[test]
    fn bucket_boundary_at_active_window() {
        let now = fixed_now();
        let window = Duration::days(7);

        let mut task = Task::new("t".to_string(), Uuid::new_v4(), now - Duration::days(7));
        assert_eq!(task.bucket(window, now), Bucket::Upcoming);

        task.creation_date = now - Duration::days(7) - Duration::seconds(1);
        assert_eq!(task.bucket(window, now), Bucket::Overdue);

        task.is_completed = true;
        assert_eq!(task.bucket(window, now), Bucket::Completed);
    }

    #[test]
    fn completed_bucket_ignores_age() {
        let now = fixed_now();
        let mut task = Task::new("t".to_string(), Uuid::new_v4(), now - Duration::days(365));
        task.is_completed = true;
        assert_eq!(task.bucket(Duration::days(7), now), Bucket::Completed);
    }

    #[test]
    fn duplicate_keeps_content_but_not_identity() {
        let now = fixed_now();
        let original = Task::new("Review PR".to_string(), Uuid::new_v4(), now);
        let target = Uuid::new_v4();
        let copy = original.duplicate(target);

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.title, original.title);
        assert_eq!(copy.is_completed, original.is_completed);
        assert_eq!(copy.creation_date, original.creation_date);
        assert_eq!(copy.category, target);
    }
}
