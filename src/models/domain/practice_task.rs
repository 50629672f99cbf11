use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PracticeTask {
    pub id: String,
    pub lesson_id: String,
    pub course_id: String,
    pub task_description: String,
    pub starter_code: String,
    /// C# statements that print the expected output when run as a `Main` body.
    pub test_cases: String,
    pub average_time_seconds: i32,
}
