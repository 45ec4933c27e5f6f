//! School and course enrolment.

use chrono::{DateTime, Utc};

use crate::domain::{CoreError, FormField, FormSubmission, Payload};
use crate::feature::{Feature, chosen, required};

pub struct SchoolAndCourse;

const COURSES: &[&str] = &[
    "Airborne",
    "Air assault",
    "Advanced Infantry Training",
    "Ranger School",
    "Combat Life Saver",
    "Drill Instructor Course",
    "NCO Training & Leadership",
    "Squad Designated Marksman (SDM)",
    "Explosive Ordnance Disposal (EOD)",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingPayload {
    pub course: String,
    pub availability: String,
}

impl Payload for TrainingPayload {
    fn dedup_fragment(&self) -> String {
        self.course.clone()
    }

    fn summary(&self) -> String {
        self.course.clone()
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Course", self.course.clone()),
            ("Availability", self.availability.clone()),
        ]
    }
}

impl Feature for SchoolAndCourse {
    type Payload = TrainingPayload;

    const KEY: &'static str = "course";
    const TITLE: &'static str = "School & Course";
    const BUTTON_LABEL: &'static str = "School & Course Request";
    const MENU_PLACEHOLDER: &'static str = "Select a school or course";

    fn choices() -> &'static [&'static str] {
        COURSES
    }

    fn form(_choice: Option<&str>) -> Option<Vec<FormField>> {
        Some(vec![FormField::short("availability", "Availability")])
    }

    fn parse(
        choice: Option<&str>,
        submission: &FormSubmission,
        _submitted_at: DateTime<Utc>,
    ) -> Result<TrainingPayload, CoreError> {
        Ok(TrainingPayload {
            course: chosen::<Self>(choice)?.to_string(),
            availability: required(submission, "availability", "Availability")?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_and_availability_are_kept() {
        let submission = FormSubmission::default().with("availability", "weekends");
        let payload = SchoolAndCourse::parse(Some("Ranger School"), &submission, Utc::now()).unwrap();
        assert_eq!(payload.course, "Ranger School");
        assert_eq!(payload.availability, "weekends");
    }

    #[test]
    fn every_course_is_offered() {
        assert_eq!(SchoolAndCourse::choices().len(), 9);
    }
}
