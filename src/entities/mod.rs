pub mod batch_subscription_assignments;
pub mod batches;
pub mod exam_batches;
pub mod exams;
pub mod student_subscriptions;
pub mod students;
pub mod subscription_plan_colleges;
pub mod subscription_plans;

pub use batch_subscription_assignments as batch_assignment_entity;
pub use batches as batch_entity;
pub use exam_batches as exam_batch_entity;
pub use exams as exam_entity;
pub use student_subscriptions as student_subscription_entity;
pub use students as student_entity;
pub use subscription_plan_colleges as plan_college_entity;
pub use subscription_plans as subscription_plan_entity;

pub use student_subscriptions::SubscriptionStatus;
