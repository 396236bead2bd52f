pub mod attendance_record;
pub mod attendance_token;
pub mod category;
pub mod enrollment;
pub mod training_session;
pub mod user;

pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_token::Entity as AttendanceToken;
pub use category::Entity as Category;
pub use enrollment::Entity as Enrollment;
pub use training_session::Entity as TrainingSession;
pub use user::Entity as User;
