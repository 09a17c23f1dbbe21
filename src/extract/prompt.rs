/// Builds the fixed instruction set sent alongside every syllabus document.
///
/// The contract the model is held to: a raw JSON array of Google Calendar
/// event objects, category-prefixed summaries, day-after end dates for
/// all-day events, a single RRULE (or none) anchored to the course's own end
/// date, and no office hours. Parsing downstream assumes nothing beyond this.
pub fn build_extraction_prompt(categories: &[String], color_id: &str) -> String {
    let categories_str = if categories.is_empty() {
        "All academic events".to_string()
    } else {
        categories.join(", ")
    };

    format!(
        r#"Analyze the provided syllabus content.
Do NOT output events such as: "The duration of [COURSE] is from [DATE] to [DATE]".

Output ONLY a JSON array of Google Calendar event objects (no prose, no markdown). Each object must match this structure and use valid JSON:
{{
    "summary": "Title of the event",
    "description": "Optional details or context",
    "location": "Venue or room" (omit this key if unknown),
    "colorId": "{color_id}",
    "start": {{
        "dateTime": "YYYY-MM-DDTHH:MM:SS" (timed) OR "date": "YYYY-MM-DD" (all-day)
    }},
    "end": {{
        "dateTime": "YYYY-MM-DDTHH:MM:SS" OR "date": "YYYY-MM-DD"
    }},
    "recurrence": [
    ],
    "reminders": {{
        "useDefault": false,
        "overrides": []
    }}
}}

Rules:
1. For all-day events, set end.date to the day AFTER the event day.
2. Infer the correct year (current or upcoming) if not explicitly present.
3. Output ONLY the raw JSON array (no backticks, no preamble, no trailing text).
4. Keep the "reminders" object exactly as shown for every event.
5. Naming pattern:
    + Assignment -> "ASSIGNMENT: [EVENTNAME]"
    + Exam/midterm -> "EXAM: [EVENTNAME]"
    + Quiz -> "QUIZ: [EVENTNAME]"
    + Project -> "PROJECT DEADLINE: [EVENTNAME]"
    + Lecture/class -> "LECTURE: [EVENTNAME]"
6. Recurrence:
    + If not recurring, omit the recurrence key entirely.
    + If recurring, include one RRULE string, e.g., "RRULE:FREQ=WEEKLY;UNTIL=YYYYMMDD".
    + Find the course end date in the syllabus (last lecture, finals week, or explicit end-of-course date) and use it for UNTIL in YYYYMMDD.
    + If no end date is found, omit recurrence entirely.
7. Ignore ALL office hours.
8. Only include events in these categories: {categories_str}."#
    )
}
