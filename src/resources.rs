//! Static self-help panels. Hard-coded content with no link to the store.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Link {
    pub title: &'static str,
    pub detail: Option<&'static str>,
    pub url: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Section {
    pub slug: &'static str,
    pub title: &'static str,
    pub items: &'static [Link],
}

const fn text(title: &'static str, detail: &'static str) -> Link {
    Link {
        title,
        detail: Some(detail),
        url: None,
    }
}

const fn link(title: &'static str, url: &'static str) -> Link {
    Link {
        title,
        detail: None,
        url: Some(url),
    }
}

pub const SECTIONS: &[Section] = &[
    Section {
        slug: "emergency",
        title: "Emergency Contacts",
        items: &[
            text("National Crisis Line", "988"),
            text("Crisis Text Line", "Text HOME to 741741"),
        ],
    },
    Section {
        slug: "self-help",
        title: "Self-Help Resources",
        items: &[
            link("National Institute of Mental Health", "https://www.nimh.nih.gov"),
            link("Mental Health America", "https://www.mhanational.org"),
            link("Psychology Today", "https://www.psychologytoday.com"),
        ],
    },
    Section {
        slug: "reading",
        title: "Recommended Reading",
        items: &[
            text("The Happiness of Pursuit", "Chris Guillebeau"),
            text("The Mindful Way Through Depression", "Mark Williams"),
            text("The Body Keeps the Score", "Bessel van der Kolk"),
        ],
    },
    Section {
        slug: "apps",
        title: "Mobile Apps",
        items: &[
            text("Headspace", "Guided meditation"),
            text("Calm", "Sleep and relaxation"),
            text("Insight Timer", "Free meditation library"),
        ],
    },
    Section {
        slug: "music",
        title: "Relaxing Music",
        items: &[
            link("Chill Vibes", "https://open.spotify.com/playlist/37i9dQZF1DX4WYpdgoIcn6"),
            link("Relax & Unwind", "https://open.spotify.com/playlist/37i9dQZF1DWU0ScTcjJBdj"),
            link("Calm Vibes", "https://open.spotify.com/playlist/37i9dQZF1DX1s9knjP51Oa"),
        ],
    },
    Section {
        slug: "books",
        title: "Free Books",
        items: &[
            link("Project Gutenberg", "https://www.gutenberg.org/"),
            text("Pride and Prejudice", "Jane Austen"),
            text("Moby Dick", "Herman Melville"),
            text("The Adventures of Sherlock Holmes", "Arthur Conan Doyle"),
        ],
    },
];

pub fn router() -> Router<AppState> {
    Router::new().route("/resources", get(list_resources))
}

pub async fn list_resources() -> Json<&'static [Section]> {
    Json(SECTIONS)
}
