pub mod m202608250001_create_users;
pub mod m202608250002_create_categories;
pub mod m202608250003_create_training_sessions;
pub mod m202608250004_create_enrollments;
pub mod m202608250005_create_attendance;
