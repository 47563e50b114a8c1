/// Students enrolled in a class, as shown on the roll-call screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRoster {
    pub class_id: String,
    pub student_ids: Vec<String>,
}

impl ClassRoster {
    #[must_use]
    pub fn new<I, S>(class_id: impl Into<String>, student_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class_id: class_id.into(),
            student_ids: student_ids.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, student_id: &str) -> bool {
        self.student_ids.iter().any(|s| s == student_id)
    }
}
