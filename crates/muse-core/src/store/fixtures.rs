//! Seed notes for the offline store.

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{Note, NoteId, NoteTag};

const WELCOME_CONTENT: &str = r#"# Welcome to Mindful Muse

Mindful Muse is your **modern** note-taking companion. Write your thoughts and organize them with ease.

## Getting Started

- Create a new note using the **+** button
- Use *markdown* formatting for rich text
- Organize notes with **tags**

## Features

1. Rich markdown support
2. Tag-based organization
3. Secure cloud storage
4. Beautiful, responsive design

```
// Your notes, organized
const mindfulness = "simple + powerful";
```

> Start writing and let Mindful Muse help you stay organized."#;

const PLANNING_CONTENT: &str = r"## Q1 Planning Meeting

Discussed the roadmap for Q1. **Key priorities** include:

1. Launch new user onboarding flow
2. Improve performance metrics
3. Expand to two new markets

### Action Items

- [ ] Sarah to prepare mockups by Friday
- [ ] Team to review competitor analysis
- [ ] Schedule follow-up for next Tuesday

*Next meeting: January 21st*";

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// The two notes every offline session starts with, newest first.
#[must_use]
pub fn fixture_notes() -> Vec<Note> {
    vec![
        Note {
            id: NoteId::from("1"),
            title: "Welcome to Mindful Muse".to_string(),
            content: WELCOME_CONTENT.to_string(),
            tags: [NoteTag::Ideas].into_iter().collect(),
            created_at: day(2024, 1, 15),
            updated_at: day(2024, 1, 15),
            summary: None,
        },
        Note {
            id: NoteId::from("2"),
            title: "Meeting Notes - Q1 Planning".to_string(),
            content: PLANNING_CONTENT.to_string(),
            tags: [NoteTag::Work, NoteTag::Todo].into_iter().collect(),
            created_at: day(2024, 1, 14),
            updated_at: day(2024, 1, 14),
            summary: None,
        },
    ]
}
