use crate::eligibility::{Eligibility, EligibilityReport, EligibilityStore, resolve};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct EligibilityService {
    store: Arc<dyn EligibilityStore>,
}

impl EligibilityService {
    pub fn new(store: Arc<dyn EligibilityStore>) -> Self {
        Self { store }
    }

    /// Check exam access for a student as of now.
    pub async fn check_student(&self, student_id: i64) -> AppResult<Eligibility> {
        self.check_student_at(student_id, Utc::now()).await
    }

    pub async fn check_student_at(
        &self,
        student_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Eligibility> {
        let outcome = resolve(self.store.as_ref(), student_id, now).await?;
        match outcome.reason() {
            Some(reason) => log::info!("Student {student_id} not eligible for exams: {reason}"),
            None => log::debug!("Student {student_id} eligible for exams"),
        }
        Ok(outcome)
    }

    /// Full diagnostic for support and admin tooling.
    pub async fn report(&self, student_id: i64) -> AppResult<EligibilityReport> {
        let now = Utc::now();
        let outcome = self.check_student_at(student_id, now).await?;
        Ok(EligibilityReport::new(student_id, now, outcome))
    }
}
