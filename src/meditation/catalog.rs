use serde::Serialize;

/// A guided exercise; completing it credits `duration_minutes`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Exercise {
    pub slug: &'static str,
    pub name: &'static str,
    pub duration_minutes: u32,
    pub description: &'static str,
    pub steps: &'static [&'static str],
}

pub const EXERCISES: &[Exercise] = &[
    Exercise {
        slug: "breathing-exercise",
        name: "Breathing Exercise",
        duration_minutes: 5,
        description: "Focus on your breath. Inhale for 4 counts, hold for 4, exhale for 4.",
        steps: &[
            "Find a comfortable position",
            "Close your eyes",
            "Breathe in through your nose for 4 counts",
            "Hold your breath for 4 counts",
            "Exhale through your mouth for 4 counts",
            "Repeat the cycle",
        ],
    },
    Exercise {
        slug: "body-scan",
        name: "Body Scan",
        duration_minutes: 10,
        description: "Progressively focus attention on different parts of your body.",
        steps: &[
            "Lie down comfortably",
            "Close your eyes",
            "Focus on your toes",
            "Gradually move attention upward",
            "Notice any tensions",
            "Release tension with each exhale",
        ],
    },
    Exercise {
        slug: "loving-kindness",
        name: "Loving-Kindness",
        duration_minutes: 7,
        description: "Direct positive thoughts and wishes to yourself and others.",
        steps: &[
            "Sit comfortably",
            "Think of yourself with kindness",
            "Extend wishes of peace and happiness",
            "Think of loved ones",
            "Extend wishes to them",
            "Gradually extend to all beings",
        ],
    },
];

pub fn find(slug: &str) -> Option<&'static Exercise> {
    EXERCISES.iter().find(|e| e.slug.eq_ignore_ascii_case(slug))
}
